//! ffprobe logic
use crate::process;
use anyhow::{Context, anyhow};
use std::{fmt, path::Path, time::Duration};
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    /// Codec of the first video stream, e.g. "h264".
    pub video_codec: Option<String>,
    /// Container duration.
    pub duration: Result<Duration, ProbeError>,
}

impl Probe {
    pub fn is_h264(&self) -> bool {
        self.video_codec
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("h264"))
    }

    /// A usable media file reports a positive duration.
    pub fn ensure_valid(&self) -> anyhow::Result<()> {
        match &self.duration {
            Ok(d) if !d.is_zero() => Ok(()),
            Ok(_) => Err(anyhow!("zero duration")),
            Err(err) => Err(anyhow!("{err}")),
        }
    }
}

/// Run ffprobe on the given input.
///
/// Errors if ffprobe cannot run, exits unsuccessfully or times out.
pub async fn probe(ffprobe: &Path, input: &Path, timeout: Duration) -> anyhow::Result<Probe> {
    let out = process::output_with_timeout(
        "ffprobe",
        Command::new(ffprobe)
            .args(["-v", "quiet", "-show_format", "-show_streams"])
            .args(["-print_format", "json"])
            .arg(input),
        timeout,
    )
    .await?;
    process::ensure_success("ffprobe", &out)?;

    let probe: ffprobe::FfProbe =
        serde_json::from_slice(&out.stdout).context("invalid ffprobe json")?;
    Ok(Probe::from(probe))
}

impl From<ffprobe::FfProbe> for Probe {
    fn from(probe: ffprobe::FfProbe) -> Self {
        let duration = read_duration(&probe).map_err(ProbeError::from);
        let video_codec = probe
            .streams
            .into_iter()
            .filter(|s| s.codec_type.as_deref() == Some("video"))
            .find_map(|s| s.codec_name);
        Self {
            video_codec,
            duration,
        }
    }
}

fn read_duration(probe: &ffprobe::FfProbe) -> anyhow::Result<Duration> {
    let duration_s = probe
        .format
        .duration
        .as_deref()
        .context("ffprobe reported no duration")?;
    let duration_f = duration_s
        .parse::<f64>()
        .with_context(|| format!("invalid ffprobe duration: {duration_s:?}"))?;
    Duration::try_from_secs_f64(duration_f)
        .map_err(|e| anyhow!("{e}: ffprobe duration: {duration_s:?}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeError(String);

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<anyhow::Error> for ProbeError {
    fn from(err: anyhow::Error) -> Self {
        Self(format!("{err}"))
    }
}

impl std::error::Error for ProbeError {}

#[cfg(test)]
mod test {
    use super::*;

    fn probe(duration: Result<Duration, &str>, codec: Option<&str>) -> Probe {
        Probe {
            video_codec: codec.map(Into::into),
            duration: duration.map_err(|e| ProbeError(e.into())),
        }
    }

    #[test]
    fn h264() {
        assert!(probe(Ok(Duration::from_secs(1)), Some("h264")).is_h264());
        assert!(!probe(Ok(Duration::from_secs(1)), Some("hevc")).is_h264());
        assert!(!probe(Ok(Duration::from_secs(1)), None).is_h264());
    }

    #[test]
    fn validity() {
        assert!(probe(Ok(Duration::from_millis(40)), None).ensure_valid().is_ok());
        assert!(probe(Ok(Duration::ZERO), None).ensure_valid().is_err());
        let err = probe(Err("ffprobe reported no duration"), None)
            .ensure_valid()
            .unwrap_err();
        assert_eq!(err.to_string(), "ffprobe reported no duration");
    }
}
