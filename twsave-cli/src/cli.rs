use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "twsave",
    version,
    about = "Record a Twitch live stream with ffmpeg, or print the URL of one of its variants",
    subcommand_negates_reqs = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Channel handle or profile URL (e.g. `alice` or `https://www.twitch.tv/alice`)
    #[arg(value_name = "CHANNEL", required = true)]
    pub channel: Option<String>,

    /// Preferred quality; the source variant is used when it is not available
    #[arg(short, long, value_enum)]
    pub quality: Option<Quality>,

    /// Output frame rate; re-encodes when it differs from the variant's
    #[arg(short = 'r', long, value_enum)]
    pub fps: Option<FrameRate>,

    /// Download without asking for confirmation
    #[arg(short, long)]
    pub download: bool,

    /// Directory to save recordings into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// List every available variant and exit
    #[arg(short, long, conflicts_with = "download")]
    pub list: bool,

    /// Configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "TWSAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show or reset the configuration file
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Overwrite the configuration file with defaults
        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Quality {
    #[value(name = "1080")]
    P1080,
    #[value(name = "720")]
    P720,
    #[value(name = "480")]
    P480,
    #[value(name = "360")]
    P360,
    #[value(name = "160")]
    P160,
}

impl Quality {
    pub fn height(self) -> u32 {
        match self {
            Quality::P1080 => 1080,
            Quality::P720 => 720,
            Quality::P480 => 480,
            Quality::P360 => 360,
            Quality::P160 => 160,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrameRate {
    #[value(name = "30")]
    Fps30,
    #[value(name = "60")]
    Fps60,
}

impl FrameRate {
    pub fn value(self) -> u32 {
        match self {
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
        }
    }
}
