//! Per file conversion decisions & original/converted file lifecycle.
use crate::{
    encoder::Encoder,
    ffprobe::Probe,
    temporary,
    video::{self, ConvertedName},
};
use anyhow::{Context, bail};
use console::style;
use log::{debug, warn};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// External media tools used by conversion.
pub trait Media {
    /// Probe a media file.
    async fn probe(&self, file: &Path) -> anyhow::Result<Probe>;

    /// Convert `input` to H.264/AAC mp4 at `output`.
    async fn encode(&self, input: &Path, output: &Path, encoder: Encoder) -> anyhow::Result<()>;
}

/// What happened to a successfully handled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Encoded into `output`, then the original was deleted.
    Converted { output: PathBuf },
    /// Already H.264 mp4, not encoded. The original is deleted only if a valid
    /// converted output already existed.
    AlreadyH264 { removed_original: bool },
    /// The file is itself a converted output, validated. Its original, if
    /// found, was deleted.
    ConvertedArtifact { removed_original: Option<PathBuf> },
    /// Removed by an earlier step of the same run.
    Missing,
}

impl Outcome {
    fn describe(&self, file: &Path) -> String {
        let name = file_name(file);
        match self {
            Self::Converted { output } => format!("Converted {name} -> {}", output.display()),
            Self::AlreadyH264 {
                removed_original: true,
            } => format!("Skipped {name}, already H.264, removed as already converted"),
            Self::AlreadyH264 {
                removed_original: false,
            } => format!("Skipped {name}, already H.264"),
            Self::ConvertedArtifact {
                removed_original: Some(original),
            } => format!("Verified {name}, removed original {}", file_name(original)),
            Self::ConvertedArtifact {
                removed_original: None,
            } => format!("Verified {name}, no original found"),
            Self::Missing => format!("Skipped {name}, no longer exists"),
        }
    }
}

/// Results of a batch of files.
#[derive(Debug, Default)]
pub struct Summary {
    pub converted: usize,
    pub skipped: usize,
    pub verified: usize,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl Summary {
    fn record(&mut self, file: &Path, result: anyhow::Result<Outcome>) {
        match result {
            Ok(outcome) => {
                let line = style(outcome.describe(file));
                match outcome {
                    Outcome::Converted { .. } => {
                        self.converted += 1;
                        eprintln!("{}", line.green());
                    }
                    Outcome::ConvertedArtifact { .. } => {
                        self.verified += 1;
                        eprintln!("{}", line.dim());
                    }
                    Outcome::AlreadyH264 { .. } | Outcome::Missing => {
                        self.skipped += 1;
                        eprintln!("{}", line.dim());
                    }
                }
            }
            Err(err) => {
                eprintln!(
                    "{} {}: {err:#}",
                    style("Failed").red().bold(),
                    file_name(file)
                );
                self.failed.push((file.to_path_buf(), err));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.verified + self.failed.len()
    }
}

/// Handle each file in order, continuing after per-file failures.
pub async fn convert_all(media: &impl Media, files: &[PathBuf], encoder: Encoder) -> Summary {
    let mut summary = Summary::default();
    for (n, file) in files.iter().enumerate() {
        debug!("[{}/{}] {}", n + 1, files.len(), file.display());
        let result = convert_file(media, file, encoder).await;
        summary.record(file, result);
    }
    summary
}

/// Decide what a single file needs & do it.
pub async fn convert_file(
    media: &impl Media,
    file: &Path,
    encoder: Encoder,
) -> anyhow::Result<Outcome> {
    if fs::metadata(file).await.is_err() {
        return Ok(Outcome::Missing);
    }

    if let Some(converted) = ConvertedName::parse(file) {
        return verify_converted(media, file, &converted).await;
    }

    if video::is_mp4(file) {
        match media.probe(file).await {
            Ok(probe) if probe.is_h264() => return skip_h264(media, file).await,
            Ok(probe) => debug!(
                "{} video codec {:?}, converting",
                file.display(),
                probe.video_codec
            ),
            Err(err) => warn!("{}: {err:#}, converting anyway", file.display()),
        }
    }

    encode(media, file, encoder).await
}

/// `file` is a previous output: check it & remove the original it replaces.
async fn verify_converted(
    media: &impl Media,
    file: &Path,
    converted: &ConvertedName,
) -> anyhow::Result<Outcome> {
    validate(media, file)
        .await
        .context("invalid converted file, original kept")?;

    let removed_original = match find_original(converted, file).await?.as_slice() {
        [] => None,
        [original] => {
            remove(original).await?;
            Some(original.clone())
        }
        many => {
            let names: Vec<_> = many.iter().map(|p| p.display().to_string()).collect();
            warn!(
                "{} matches several originals, none removed: {}",
                file.display(),
                names.join(", ")
            );
            None
        }
    };
    Ok(Outcome::ConvertedArtifact { removed_original })
}

async fn find_original(converted: &ConvertedName, file: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut originals = vec![];
    for dir in converted.original_dirs() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err).with_context(|| format!("read_dir {}", dir.display())),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path != file
                && converted.is_original(&path)
                && entry.file_type().await.is_ok_and(|t| t.is_file())
            {
                originals.push(path);
            }
        }
    }
    Ok(originals)
}

/// `file` is already H.264 mp4: remove it only if a valid output exists from a
/// previous run.
async fn skip_h264(media: &impl Media, file: &Path) -> anyhow::Result<Outcome> {
    let output = video::final_output(file);
    let removed_original = match fs::metadata(&output).await {
        Ok(_) => match validate(media, &output).await {
            Ok(_) => {
                remove(file).await?;
                true
            }
            Err(err) => {
                warn!("{}: {err:#}, original kept", output.display());
                false
            }
        },
        Err(_) => false,
    };
    Ok(Outcome::AlreadyH264 { removed_original })
}

/// Encode next to the input, move into the output dir, validate, then delete
/// the original.
async fn encode(media: &impl Media, file: &Path, encoder: Encoder) -> anyhow::Result<Outcome> {
    let staging = video::staging_output(file);
    let output = video::final_output(file);
    for path in [&staging, &output] {
        ensure_absent(path).await?;
    }

    temporary::add(&staging);
    if let Err(err) = media.encode(file, &staging, encoder).await {
        temporary::remove(&staging).await;
        return Err(err.context("conversion failed, original kept"));
    }

    if let Err(err) = move_to_output_dir(&staging, &output).await {
        temporary::remove(&staging).await;
        return Err(err);
    }
    temporary::unadd(&staging);

    temporary::add(&output);
    if let Err(err) = validate(media, &output).await {
        temporary::remove(&output).await;
        return Err(err.context("converted output is invalid, original kept"));
    }
    temporary::unadd(&output);

    remove(file).await?;
    Ok(Outcome::Converted { output })
}

/// Outputs are never written over files this run did not create, e.g. a
/// same named output of another input.
async fn ensure_absent(path: &Path) -> anyhow::Result<()> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("check {}", path.display()))?;
    if exists {
        bail!("{} already exists, original kept", path.display());
    }
    Ok(())
}

async fn move_to_output_dir(staging: &Path, output: &Path) -> anyhow::Result<()> {
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create {}", dir.display()))?;
    }
    ensure_absent(output).await?;
    fs::rename(staging, output)
        .await
        .with_context(|| format!("move {} -> {}", staging.display(), output.display()))
}

async fn validate(media: &impl Media, file: &Path) -> anyhow::Result<()> {
    let probe = media
        .probe(file)
        .await
        .with_context(|| format!("validate {}", file.display()))?;
    if let Err(err) = probe.ensure_valid() {
        bail!("validate {}: {err}", file.display());
    }
    Ok(())
}

async fn remove(file: &Path) -> anyhow::Result<()> {
    fs::remove_file(file)
        .await
        .with_context(|| format!("remove {}", file.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
