use twitch_live::StreamVariant;

/// Ask whether to record `variant`. Anything but an explicit yes is a no,
/// including a terminal that cannot prompt.
#[cfg(feature = "interactive")]
pub fn confirm_download(variant: &StreamVariant) -> bool {
    let answer = inquire::Confirm::new("Do you want to download the stream with ffmpeg?")
        .with_default(false)
        .with_help_message(&format!("Selected variant: {variant}"))
        .prompt();

    match answer {
        Ok(answer) => answer,
        Err(e) => {
            tracing::debug!(error = %e, "Confirmation prompt unavailable");
            false
        }
    }
}

#[cfg(not(feature = "interactive"))]
pub fn confirm_download(_variant: &StreamVariant) -> bool {
    false
}
