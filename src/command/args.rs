//! Shared argument logic.
use crate::{encoder::Encoder, toolchain::Toolchain};
use anyhow::{Context, ensure};
use clap::Parser;
use console::style;
use log::warn;
use std::{path::PathBuf, time::Duration};

/// External tool configuration, usable with any subcommand.
#[derive(Parser, Clone, Debug)]
pub struct Tools {
    /// ffmpeg executable.
    #[arg(long, global = true, env = "H264_BATCH_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// ffprobe executable.
    #[arg(long, global = true, env = "H264_BATCH_FFPROBE", default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    /// Use this encoder instead of detecting the best available one.
    ///
    /// By default the first encoder listed by `ffmpeg -encoders` of
    /// qsv, nvenc, amf is used, falling back to x264.
    #[arg(value_enum, short, long, global = true, env = "H264_BATCH_ENCODER")]
    pub encoder: Option<Encoder>,

    /// Max time an ffprobe run or encoder detection may take, e.g. "30s".
    #[arg(
        long,
        global = true,
        env = "H264_BATCH_PROBE_TIMEOUT",
        default_value = "1m",
        value_parser = parse_timeout
    )]
    pub probe_timeout: Duration,

    /// Max time a single conversion may take, e.g. "90m".
    /// ffmpeg is killed after this & the file counts as failed, it is not retried.
    #[arg(
        long,
        global = true,
        env = "H264_BATCH_ENCODE_TIMEOUT",
        default_value = "12h",
        value_parser = parse_timeout
    )]
    pub encode_timeout: Duration,
}

fn parse_timeout(s: &str) -> anyhow::Result<Duration> {
    let timeout = humantime::parse_duration(s)?;
    ensure!(!timeout.is_zero(), "timeout must be greater than 0");
    Ok(timeout)
}

impl Tools {
    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            probe_timeout: self.probe_timeout,
            encode_timeout: self.encode_timeout,
        }
    }

    /// Use the configured encoder or detect the best one ffmpeg supports.
    ///
    /// Fails if ffmpeg cannot list its encoders.
    pub async fn encoder(&self, toolchain: &Toolchain) -> anyhow::Result<Encoder> {
        if let Some(encoder) = self.encoder {
            eprintln!("{} {encoder}", style("Using").dim());
            return Ok(encoder);
        }

        let listing = toolchain
            .list_encoders()
            .await
            .context("encoder detection failed")?;
        let encoder = Encoder::select(&listing);
        match encoder.is_hardware() {
            true => eprintln!("{} {encoder}", style("Using").dim()),
            false => eprintln!(
                "{} {encoder}, no hardware encoder available",
                style("Using").dim()
            ),
        }
        if !listing.contains(encoder.vcodec()) {
            warn!("{} is not listed by ffmpeg, conversions may fail", encoder.vcodec());
        }
        Ok(encoder)
    }
}
