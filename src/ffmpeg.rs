//! ffmpeg encoding logic
use crate::{
    encoder::{Encoder, EncoderListing},
    process::{self, CommandExt, FfmpegProgress},
};
use anyhow::Context;
use log::debug;
use std::{path::Path, process::Stdio, time::Duration};
use tokio::process::Command;
use tokio_stream::Stream;

/// Query ffmpeg for the encoders it supports.
pub async fn list_encoders(ffmpeg: &Path, timeout: Duration) -> anyhow::Result<EncoderListing> {
    let out = process::output_with_timeout(
        "ffmpeg -encoders",
        Command::new(ffmpeg).args(["-hide_banner", "-encoders"]),
        timeout,
    )
    .await?;
    process::ensure_success("ffmpeg -encoders", &out)?;
    Ok(EncoderListing::parse(&String::from_utf8_lossy(&out.stdout)))
}

/// ffmpeg conversion to H.264/AAC mp4 with fast start, failing if `output` exists.
pub fn convert_command(ffmpeg: &Path, input: &Path, output: &Path, encoder: Encoder) -> Command {
    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-hide_banner")
        .arg("-n")
        .arg2_opt("-hwaccel", encoder.hwaccel())
        .arg2("-i", input)
        .arg2("-c:v", encoder.vcodec())
        .arg2("-preset", "fast")
        .arg2("-c:a", "aac")
        .arg2("-b:a", "192k")
        .arg2("-movflags", "+faststart")
        .arg(output);
    cmd
}

/// Start converting `input`, writing to `output`.
///
/// The returned stream yields progress & ends with an error if ffmpeg fails.
/// Dropping the stream kills ffmpeg.
pub fn convert(
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    encoder: Encoder,
) -> anyhow::Result<impl Stream<Item = anyhow::Result<FfmpegProgress>>> {
    let mut cmd = convert_command(ffmpeg, input, output, encoder);
    debug!("{}", process::display(&cmd));

    let enc = cmd
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("ffmpeg convert")?;

    Ok(FfmpegProgress::stream(enc, "ffmpeg convert"))
}
