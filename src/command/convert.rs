use crate::{
    command::{Status, args::Tools},
    convert::{self, Summary},
    select::{self, Selection},
};
use clap::Parser;
use console::style;
use indicatif::HumanDuration;
use std::{path::PathBuf, time::Instant};

/// Convert a single video file.
#[derive(Parser)]
pub struct FileArgs {
    /// Video file.
    pub input: PathBuf,
}

/// Convert several video files, invalid ones are reported & skipped.
#[derive(Parser)]
pub struct FilesArgs {
    /// Video files.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

/// Convert every video directly inside a directory (not recursive).
#[derive(Parser)]
pub struct DirArgs {
    /// Directory containing videos.
    pub dir: PathBuf,
}

impl From<FileArgs> for Selection {
    fn from(args: FileArgs) -> Self {
        Self::File(args.input)
    }
}

impl From<FilesArgs> for Selection {
    fn from(args: FilesArgs) -> Self {
        Self::Files(args.inputs)
    }
}

impl From<DirArgs> for Selection {
    fn from(args: DirArgs) -> Self {
        Self::Dir(args.dir)
    }
}

/// Convert the selected files.
///
/// Input is validated before anything is run, so invalid input never
/// starts ffmpeg.
pub async fn convert(selection: Selection, tools: &Tools) -> anyhow::Result<Status> {
    if selection.is_empty() {
        eprintln!("{} no paths given", style("Invalid").red().bold());
        return Ok(Status::InvalidInput);
    }

    let resolved = select::resolve(&selection);
    for rejected in &resolved.rejected {
        eprintln!("{} {rejected}", style("Invalid").red().bold());
    }
    if resolved.is_invalid() {
        return Ok(Status::InvalidInput);
    }
    if resolved.files.is_empty() {
        eprintln!("{}", style("No video files found").dim());
        return Ok(Status::Done);
    }

    let toolchain = tools.toolchain();
    let encoder = tools.encoder(&toolchain).await?;

    let start = Instant::now();
    let summary = convert::convert_all(&toolchain, &resolved.files, encoder).await;
    eprint_summary(&summary, start);

    Ok(match summary.failed.is_empty() {
        true => Status::Done,
        false => Status::Failures,
    })
}

fn eprint_summary(summary: &Summary, start: Instant) {
    if summary.total() < 2 {
        return;
    }
    let failed = match summary.failed.len() {
        0 => style(0).dim(),
        n => style(n).red().bold(),
    };
    eprintln!(
        "\n{} {}{} {}{} {}{} {failed} {}{} {}",
        style("Converted").dim(),
        style(summary.converted).bold(),
        style(", skipped").dim(),
        style(summary.skipped).bold(),
        style(", verified").dim(),
        style(summary.verified).bold(),
        style(", failed").dim(),
        style("(").dim(),
        style(format!("{} files", summary.total())).dim(),
        style(format!("in {})", HumanDuration(start.elapsed()))).dim(),
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encoder::Encoder;
    use std::{fs, time::Duration};

    /// Tools that fail if ffmpeg or ffprobe are ever run.
    fn missing_tools(encoder: Option<Encoder>) -> Tools {
        Tools {
            ffmpeg: "/nonexistent/ffmpeg".into(),
            ffprobe: "/nonexistent/ffprobe".into(),
            encoder,
            probe_timeout: Duration::from_secs(10),
            encode_timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn invalid_input_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, b"x").unwrap();
        let tools = missing_tools(None);

        for selection in [
            Selection::File(dir.path().join("missing.mkv")),
            Selection::File(txt.clone()),
            Selection::Files(vec![txt.clone(), dir.path().join("missing.avi")]),
            Selection::Dir(txt.clone()),
            Selection::files_from_list(" , "),
            Selection::Dir("".into()),
        ] {
            let status = convert(selection.clone(), &tools).await.unwrap();
            assert_eq!(status, Status::InvalidInput, "{selection:?}");
        }
        assert_eq!(fs::read(&txt).unwrap(), b"x");
    }

    #[tokio::test]
    async fn empty_directory_is_done() {
        let dir = tempfile::tempdir().unwrap();
        let status = convert(Selection::Dir(dir.path().into()), &missing_tools(None))
            .await
            .unwrap();
        assert_eq!(status, Status::Done);
    }

    #[tokio::test]
    async fn failed_conversion_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let avi = dir.path().join("a.avi");
        fs::write(&avi, b"video").unwrap();

        let tools = missing_tools(Some(Encoder::X264));
        let status = convert(Selection::File(avi.clone()), &tools).await.unwrap();

        assert_eq!(status, Status::Failures);
        assert_eq!(fs::read(&avi).unwrap(), b"video");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.avi"]);
    }

    #[tokio::test]
    async fn failed_encoder_detection_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let avi = dir.path().join("a.avi");
        fs::write(&avi, b"video").unwrap();

        let result = convert(Selection::File(avi.clone()), &missing_tools(None)).await;

        assert!(result.is_err());
        assert!(avi.exists());
    }
}
