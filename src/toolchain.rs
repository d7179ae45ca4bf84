//! The installed ffmpeg & ffprobe, with timeouts.
use crate::{
    convert::Media,
    encoder::{Encoder, EncoderListing},
    ffmpeg, ffprobe,
    ffprobe::Probe,
    log::ProgressLogger,
};
use anyhow::anyhow;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tokio_stream::StreamExt;

const PROGRESS_CHARS: &str = "##-";

#[derive(Debug, Clone)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Max time for ffprobe & encoder listing.
    pub probe_timeout: Duration,
    /// Max time for a single conversion.
    pub encode_timeout: Duration,
}

impl Toolchain {
    pub async fn list_encoders(&self) -> anyhow::Result<EncoderListing> {
        ffmpeg::list_encoders(&self.ffmpeg, self.probe_timeout).await
    }
}

impl Media for Toolchain {
    async fn probe(&self, file: &Path) -> anyhow::Result<Probe> {
        ffprobe::probe(&self.ffprobe, file, self.probe_timeout).await
    }

    async fn encode(&self, input: &Path, output: &Path, encoder: Encoder) -> anyhow::Result<()> {
        // only used for progress
        let duration = self
            .probe(input)
            .await
            .ok()
            .and_then(|p| p.duration.ok())
            .filter(|d| !d.is_zero());

        let bar = ProgressBar::new(duration.map_or(0, |d| d.as_secs())).with_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan.bold} {elapsed_precise:.bold} {prefix} {wide_bar:.cyan/blue} ({msg}eta {eta})")?
                .progress_chars(PROGRESS_CHARS),
        );
        if let Some(name) = input.file_name() {
            bar.set_prefix(name.to_string_lossy().into_owned());
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        let mut logger = match std::io::stderr().is_terminal() {
            true => None,
            false => Some(ProgressLogger::new("h264_batch::encode", Instant::now())),
        };

        let mut enc = ffmpeg::convert(&self.ffmpeg, input, output, encoder)?;
        let run = async {
            while let Some(progress) = enc.next().await {
                let progress = progress?;
                match duration {
                    None => bar.set_message(format!("frame {}, ", progress.frame)),
                    Some(_) if progress.fps > 0.0 => {
                        bar.set_message(format!("{} fps, ", progress.fps))
                    }
                    Some(_) => {}
                }
                if let Some(total) = duration {
                    bar.set_position(progress.time.as_secs());
                    if let Some(logger) = &mut logger {
                        logger.update(total, progress.time, progress.fps);
                    }
                }
            }
            anyhow::Ok(())
        };

        let result = match tokio::time::timeout(self.encode_timeout, run).await {
            Ok(r) => r,
            Err(_) => Err(anyhow!(
                "ffmpeg convert timed out after {}",
                humantime::format_duration(self.encode_timeout)
            )),
        };
        bar.finish_and_clear();
        result
    }
}
