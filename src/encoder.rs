//! H.264 encoder selection.
use std::{collections::HashSet, fmt};

/// H.264 video encoder used for every conversion in a run.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[clap(rename_all = "lower")]
pub enum Encoder {
    /// Intel QuickSync, h264_qsv.
    Qsv,
    /// NVIDIA NVENC, h264_nvenc.
    Nvenc,
    /// AMD AMF, h264_amf.
    Amf,
    /// Software libx264.
    X264,
}

impl Encoder {
    /// Hardware encoders, most preferred first.
    pub const HARDWARE: [Self; 3] = [Self::Qsv, Self::Nvenc, Self::Amf];

    /// ffmpeg `-c:v` value.
    pub fn vcodec(self) -> &'static str {
        match self {
            Self::Qsv => "h264_qsv",
            Self::Nvenc => "h264_nvenc",
            Self::Amf => "h264_amf",
            Self::X264 => "libx264",
        }
    }

    /// ffmpeg `-hwaccel` value to decode the input with.
    pub fn hwaccel(self) -> Option<&'static str> {
        match self {
            Self::Qsv => Some("qsv"),
            _ => None,
        }
    }

    pub fn is_hardware(self) -> bool {
        self != Self::X264
    }

    /// Pick the first listed hardware encoder, falling back to libx264.
    pub fn select(listing: &EncoderListing) -> Self {
        Self::HARDWARE
            .into_iter()
            .find(|e| listing.contains(e.vcodec()))
            .unwrap_or(Self::X264)
    }
}

impl fmt::Display for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Qsv => "Intel QuickSync",
            Self::Nvenc => "NVIDIA NVENC",
            Self::Amf => "AMD AMF",
            Self::X264 => "CPU",
        };
        write!(f, "{name} ({})", self.vcodec())
    }
}

/// Encoder names parsed from `ffmpeg -encoders` output.
#[derive(Debug, Default)]
pub struct EncoderListing(HashSet<String>);

impl EncoderListing {
    /// Parse `ffmpeg -hide_banner -encoders` stdout.
    ///
    /// Encoder lines look like ` V....D h264_nvenc  NVIDIA NVENC H.264 encoder`,
    /// the name being the 2nd column.
    pub fn parse(stdout: &str) -> Self {
        Self(
            stdout
                .lines()
                .filter_map(|line| line.split_whitespace().nth(1))
                .map(|name| name.to_ascii_lowercase())
                .collect(),
        )
    }

    pub fn contains(&self, vcodec: &str) -> bool {
        self.0.contains(vcodec)
    }
}
