use anyhow::{Context, anyhow, ensure};
use std::{
    ffi::OsStr,
    io,
    process::{ExitStatus, Output, Stdio},
    time::Duration,
};
use time::macros::format_description;
use tokio::process::{Child, Command};
use tokio_process_stream::{Item, ProcessChunkStream};
use tokio_stream::{Stream, StreamExt};

/// Run a command to completion collecting its output, killing it if it takes
/// longer than `timeout`.
pub async fn output_with_timeout(
    name: &'static str,
    cmd: &mut Command,
    timeout: Duration,
) -> anyhow::Result<Output> {
    let run = cmd
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| {
            anyhow!(
                "{name} timed out after {}",
                humantime::format_duration(timeout)
            )
        })?
        .with_context(|| format!("{name} failed to run"))
}

pub fn ensure_success(name: &'static str, out: &Output) -> anyhow::Result<()> {
    ensure!(
        out.status.success(),
        "{name} exit code {:?}\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stderr).trim_end(),
    );
    Ok(())
}

/// Convert exit code result into simple result.
pub fn exit_ok(name: &'static str, done: io::Result<ExitStatus>) -> anyhow::Result<()> {
    let code = done.with_context(|| format!("{name} wait"))?;
    ensure!(code.success(), "{name} exit code {:?}", code.code());
    Ok(())
}

/// Ok -> None, err -> Some(err)
pub fn exit_ok_option<T>(
    name: &'static str,
    done: io::Result<ExitStatus>,
) -> Option<anyhow::Result<T>> {
    match exit_ok(name, done) {
        Ok(_) => None,
        Err(err) => Some(Err(err)),
    }
}

#[derive(Debug, PartialEq)]
pub struct FfmpegProgress {
    pub frame: u64,
    pub fps: f32,
    pub time: Duration,
}

impl FfmpegProgress {
    pub fn try_parse(out: &str) -> Option<Self> {
        if out.starts_with("frame=") && out.ends_with('\r') {
            let frame: u64 = parse_label_substr("frame=", out)?.parse().ok()?;
            let fps: f32 = parse_label_substr("fps=", out)?.parse().ok()?;
            let (h, m, s, ns) = time::Time::parse(
                parse_label_substr("time=", out)?,
                &format_description!("[hour]:[minute]:[second].[subsecond]"),
            )
            .ok()?
            .as_hms_nano();
            return Some(Self {
                frame,
                fps,
                time: Duration::new(h as u64 * 60 * 60 + m as u64 * 60 + s as u64, ns),
            });
        }
        None
    }

    /// Stream progress from a running ffmpeg's stderr, ending with an error
    /// item if ffmpeg exits unsuccessfully.
    ///
    /// The last few stderr lines are kept to describe a failure.
    pub fn stream(
        child: Child,
        name: &'static str,
    ) -> impl Stream<Item = anyhow::Result<FfmpegProgress>> {
        let mut tail = StderrTail::default();
        ProcessChunkStream::from(child).filter_map(move |item| match item {
            Item::Stderr(chunk) => {
                let chunk = String::from_utf8_lossy(&chunk);
                match FfmpegProgress::try_parse(&chunk) {
                    Some(progress) => Some(Ok(progress)),
                    None => {
                        tail.push(&chunk);
                        None
                    }
                }
            }
            Item::Stdout(_) => None,
            Item::Done(code) => {
                exit_ok_option(name, code).map(|r| r.map_err(|e| tail.describe(e)))
            }
        })
    }
}

/// Last lines of non-progress stderr output.
#[derive(Debug, Default)]
struct StderrTail(Vec<String>);

impl StderrTail {
    const MAX_LINES: usize = 5;

    fn push(&mut self, chunk: &str) {
        for line in chunk.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if self.0.len() == Self::MAX_LINES {
                self.0.remove(0);
            }
            self.0.push(line.to_owned());
        }
    }

    /// Append the kept lines to an exit error.
    fn describe(&self, err: anyhow::Error) -> anyhow::Error {
        match self.0.is_empty() {
            true => err,
            false => anyhow!("{err}\n{self}"),
        }
    }
}

impl std::fmt::Display for StderrTail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.join("\n").fmt(f)
    }
}

/// Parse a ffmpeg `label=  value ` type substring.
fn parse_label_substr<'a>(label: &str, line: &'a str) -> Option<&'a str> {
    let line = &line[line.find(label)? + label.len()..];
    let val_start = line.char_indices().find(|(_, c)| !c.is_whitespace())?.0;
    let val_end = val_start
        + line[val_start..]
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| line[val_start..].len());

    Some(&line[val_start..val_end])
}

pub trait CommandExt {
    /// Adds two arguments.
    fn arg2(&mut self, a: impl AsRef<OsStr>, b: impl AsRef<OsStr>) -> &mut Self;

    /// Adds two arguments, the 2nd an option. `None` mean noop.
    fn arg2_opt(&mut self, a: impl AsRef<OsStr>, b: Option<impl AsRef<OsStr>>) -> &mut Self;
}

impl CommandExt for Command {
    fn arg2(&mut self, a: impl AsRef<OsStr>, b: impl AsRef<OsStr>) -> &mut Self {
        self.arg(a).arg(b)
    }

    fn arg2_opt(&mut self, a: impl AsRef<OsStr>, b: Option<impl AsRef<OsStr>>) -> &mut Self {
        match b {
            Some(b) => self.arg2(a, b),
            None => self,
        }
    }
}

/// Display a command's program & args, shell escaped.
pub fn display(cmd: &Command) -> String {
    let cmd = cmd.as_std();
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| shell_escape::escape(a.to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
