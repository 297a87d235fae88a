mod cli;
mod config;
mod error;
mod output;
mod paths;
mod prompt;

use crate::{
    cli::{Args, Commands, FrameRate, Quality},
    config::AppConfig,
    error::{CliError, Result},
    output::OutputManager,
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::{process, time::Duration};
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use twitch_live::{
    ClientCredentials, CtrlC, Delivery, Endpoints, Outcome, Pipeline, build_http_client,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            #[cfg(feature = "colored-output")]
            {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            #[cfg(not(feature = "colored-output"))]
            {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<i32> {
    if let Some(Commands::Config { show, reset }) = args.command {
        return run_config_command(&args, show, reset);
    }

    let config = AppConfig::load(args.config.as_deref())?;
    debug!("Loaded config: {:?}", config);

    let channel = args
        .channel
        .as_deref()
        .ok_or_else(|| CliError::Config("missing channel".to_string()))?;
    let desired_height = args.quality.map(Quality::height).or(config.quality);
    let frame_rate = args.fps.map(FrameRate::value);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());

    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.timeout_secs));
    let pipeline = Pipeline::new(
        build_http_client(timeout)?,
        ClientCredentials::default(),
        Endpoints::default(),
        config.transcoder(),
    );

    // The output directory is only checked once the user actually wants a file.
    let mut invalid_output_dir = None;
    let outcome = pipeline
        .run(
            channel,
            desired_height,
            |resolved| {
                if args.list || !(args.download || prompt::confirm_download(&resolved.variant)) {
                    return Delivery::PrintUrl;
                }
                match paths::validate_output_dir(&output_dir) {
                    Ok(destination) => Delivery::Download {
                        destination,
                        frame_rate,
                    },
                    Err(e) => {
                        invalid_output_dir = Some(e);
                        Delivery::PrintUrl
                    }
                }
            },
            &mut CtrlC,
        )
        .await;

    if let Some(e) = invalid_output_dir {
        return Err(e);
    }

    let output = OutputManager::new(cfg!(feature = "colored-output"));
    match &outcome {
        Outcome::Url(resolved) if args.list => print!("{}", output.format_catalog(resolved)),
        Outcome::Url(resolved) => println!("{}", output.format_variant(&resolved.variant)),
        Outcome::Downloaded(report) => println!("{}", output.format_report(report)),
        _ => {}
    }

    Ok(if outcome.is_success() { 0 } else { 1 })
}

fn run_config_command(args: &Args, show: bool, reset: bool) -> Result<i32> {
    if reset {
        let path = AppConfig::reset(args.config.as_deref())?;
        println!("✓ Configuration reset to defaults: {}", path.display());
    } else if show {
        let config = AppConfig::load(args.config.as_deref())?;
        println!("{}", config.show()?);
    } else {
        println!("Use --show to display current configuration or --reset to reset to defaults");
    }
    Ok(0)
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}
