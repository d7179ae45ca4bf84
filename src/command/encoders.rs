use crate::{command::args::Tools, encoder::Encoder};
use console::style;

/// Print which H.264 encoders ffmpeg lists & which one would be used.
pub async fn encoders(tools: &Tools) -> anyhow::Result<()> {
    let listing = tools.toolchain().list_encoders().await?;
    let selected = tools.encoder.unwrap_or_else(|| Encoder::select(&listing));

    for encoder in Encoder::HARDWARE.into_iter().chain([Encoder::X264]) {
        let kind = match encoder.is_hardware() {
            true => "hardware",
            false => "software",
        };
        let line = format!("{encoder} {kind}");
        let line = match (listing.contains(encoder.vcodec()), encoder == selected) {
            (true, true) => style(format!("* {line}")).green().bold(),
            (true, false) => style(format!("  {line}")),
            (false, true) => style(format!("* {line}, not listed")).red().bold(),
            (false, false) => style(format!("  {line}, not listed")).dim(),
        };
        println!("{line}");
    }
    Ok(())
}
