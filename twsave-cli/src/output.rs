#[cfg(feature = "colored-output")]
use colored::*;
use twitch_live::{DownloadReport, DownloadStatus, Resolved, StreamVariant};

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// `"<height>p<fps>: <url>"`
    pub fn format_variant(&self, variant: &StreamVariant) -> String {
        format!(
            "{}: {}",
            self.highlight(&variant.to_string()),
            variant.url()
        )
    }

    pub fn format_catalog(&self, resolved: &Resolved) -> String {
        let mut output = String::new();
        output.push_str(&self.highlight(&format!("Variants of {}:", resolved.channel)));
        output.push('\n');

        for variant in &resolved.catalog {
            let marker = if variant == &resolved.variant { "*" } else { " " };
            output.push_str(&format!(
                "{} {:>8} {:>10}  {}\n",
                marker,
                variant.to_string(),
                variant.resolution().to_string(),
                variant.url()
            ));
        }
        output
    }

    pub fn format_report(&self, report: &DownloadReport) -> String {
        let path = report.output_path.display();
        match &report.status {
            DownloadStatus::Finished(status) if status.success() => {
                format!("{} {}", self.highlight("Saved"), path)
            }
            DownloadStatus::Finished(status) => {
                format!("ffmpeg exited with {status}, output may be incomplete: {path}")
            }
            DownloadStatus::Interrupted(_) => {
                format!("{} {}", self.highlight("Stopped, saved"), path)
            }
            DownloadStatus::Failed(e) => format!("Download failed: {e}"),
        }
    }

    #[cfg(feature = "colored-output")]
    fn highlight(&self, text: &str) -> String {
        if self.colored {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    #[cfg(not(feature = "colored-output"))]
    fn highlight(&self, text: &str) -> String {
        let _ = self.colored;
        text.to_string()
    }
}
