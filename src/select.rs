//! Input selection: which files a run should handle.
use crate::video;
use log::warn;
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

/// What the operator asked to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single video file.
    File(PathBuf),
    /// Several video files, each validated independently.
    Files(Vec<PathBuf>),
    /// Every video directly inside a directory (non-recursive).
    Dir(PathBuf),
}

impl Selection {
    /// Parse a comma separated list of paths into [`Selection::Files`].
    /// Entries are trimmed & unquoted, empty entries ignored.
    pub fn files_from_list(list: &str) -> Self {
        Self::Files(
            list.split(',')
                .map(unquote)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect(),
        )
    }

    /// True if no path was given at all, e.g. a blank interactive answer.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::File(path) | Self::Dir(path) => {
                path.as_os_str().to_string_lossy().trim().is_empty()
            }
            Self::Files(paths) => paths.is_empty(),
        }
    }
}

/// Trim whitespace & a single pair of matching surrounding quotes, as added when
/// dragging files into a terminal.
pub fn unquote(s: &str) -> &str {
    let s = s.trim();
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner.trim();
        }
    }
    s
}

/// A path that was not accepted for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub path: PathBuf,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotAFile,
    UnsupportedExtension,
    NotADirectory,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            RejectReason::NotAFile => "file not found",
            RejectReason::UnsupportedExtension => "unsupported extension",
            RejectReason::NotADirectory => "not a directory",
        };
        write!(f, "{}: {reason}", self.path.display())
    }
}

/// Files resolved from a [`Selection`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Existing video files to handle, in selection / listing order.
    pub files: Vec<PathBuf>,
    pub rejected: Vec<Rejected>,
}

impl Resolved {
    /// True if nothing can be done because all of the input was invalid.
    pub fn is_invalid(&self) -> bool {
        self.files.is_empty() && !self.rejected.is_empty()
    }
}

/// Resolve a selection into candidate files. Only touches the file system,
/// never runs any external process.
pub fn resolve(selection: &Selection) -> Resolved {
    match selection {
        Selection::File(path) => check_file(path).into(),
        Selection::Files(paths) => {
            let mut resolved = Resolved::default();
            for path in paths {
                match check_file(path) {
                    Ok(file) => resolved.files.push(file),
                    Err(rejected) => resolved.rejected.push(rejected),
                }
            }
            resolved
        }
        Selection::Dir(dir) => scan_dir(dir),
    }
}

impl From<Result<PathBuf, Rejected>> for Resolved {
    fn from(r: Result<PathBuf, Rejected>) -> Self {
        match r {
            Ok(file) => Self {
                files: vec![file],
                ..<_>::default()
            },
            Err(rejected) => Self {
                rejected: vec![rejected],
                ..<_>::default()
            },
        }
    }
}

fn check_file(path: &Path) -> Result<PathBuf, Rejected> {
    let reject = |reason| Rejected {
        path: path.to_path_buf(),
        reason,
    };
    if !path.is_file() {
        return Err(reject(RejectReason::NotAFile));
    }
    if !video::has_video_extension(path) {
        return Err(reject(RejectReason::UnsupportedExtension));
    }
    Ok(path.to_path_buf())
}

fn scan_dir(dir: &Path) -> Resolved {
    let entries = match fs::read_dir(dir) {
        Ok(entries) if dir.is_dir() => entries,
        _ => {
            return Resolved {
                rejected: vec![Rejected {
                    path: dir.to_path_buf(),
                    reason: RejectReason::NotADirectory,
                }],
                ..<_>::default()
            };
        }
    };

    let files = entries
        .filter_map(|e| ok_or_warn(dir, e))
        .filter(|e| e.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|e| e.path())
        .filter(|p| video::has_video_extension(p))
        .collect();

    Resolved {
        files,
        ..<_>::default()
    }
}

fn ok_or_warn<T>(dir: &Path, entry: io::Result<T>) -> Option<T> {
    entry
        .inspect_err(|err| warn!("{}: {err}, entry skipped", dir.display()))
        .ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn single_file() {
        let dir = tempfile::tempdir().unwrap();
        let avi = touch(dir.path(), "a.AVI");
        let txt = touch(dir.path(), "notes.txt");

        assert_eq!(resolve(&Selection::File(avi.clone())).files, vec![avi]);

        let resolved = resolve(&Selection::File(txt.clone()));
        assert!(resolved.is_invalid());
        assert_eq!(
            resolved.rejected,
            vec![Rejected {
                path: txt,
                reason: RejectReason::UnsupportedExtension
            }]
        );

        let missing = dir.path().join("missing.mkv");
        let resolved = resolve(&Selection::File(missing));
        assert!(resolved.is_invalid());
        assert_eq!(resolved.rejected[0].reason, RejectReason::NotAFile);
    }

    #[test]
    fn directory_as_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub.mkv");
        fs::create_dir(&sub).unwrap();
        let resolved = resolve(&Selection::File(sub));
        assert_eq!(resolved.rejected[0].reason, RejectReason::NotAFile);
    }

    #[test]
    fn multiple_files_continue_past_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mkv");
        let b = touch(dir.path(), "b.webm");
        let bad = dir.path().join("nope.mov");

        let resolved = resolve(&Selection::Files(vec![a.clone(), bad.clone(), b.clone()]));
        assert_eq!(resolved.files, vec![a, b]);
        assert_eq!(resolved.rejected.len(), 1);
        assert_eq!(resolved.rejected[0].path, bad);
        assert!(!resolved.is_invalid());
    }

    #[test]
    fn directory_scan_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.avi");
        let c = touch(dir.path(), "c.MKV");
        touch(dir.path(), "readme.md");
        fs::create_dir(dir.path().join("convertiti")).unwrap();
        touch(&dir.path().join("convertiti"), "a_converted.mp4");
        fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let mut files = resolve(&Selection::Dir(dir.path().into())).files;
        files.sort();
        assert_eq!(files, vec![a, c]);
    }

    #[test]
    fn invalid_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "a.avi");
        for path in [file, dir.path().join("missing")] {
            let resolved = resolve(&Selection::Dir(path));
            assert!(resolved.is_invalid());
            assert_eq!(resolved.rejected[0].reason, RejectReason::NotADirectory);
        }
    }

    #[test]
    fn empty_directory_is_not_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve(&Selection::Dir(dir.path().into()));
        assert_eq!(resolved, Resolved::default());
        assert!(!resolved.is_invalid());
    }

    #[test]
    fn unreadable_entry_is_skipped() {
        let dir = Path::new("/videos");
        assert_eq!(ok_or_warn(dir, Ok(1)), Some(1));
        assert_eq!(
            ok_or_warn::<i32>(dir, Err(io::Error::other("permission denied"))),
            None
        );
    }

    #[test]
    fn empty_selection() {
        assert!(Selection::files_from_list(" , ,").is_empty());
        assert!(Selection::File("".into()).is_empty());
        assert!(Selection::Dir(" ".into()).is_empty());
        assert!(!Selection::Dir("/videos".into()).is_empty());
        assert!(!Selection::Files(vec!["a.mkv".into()]).is_empty());
    }

    #[test]
    fn comma_separated_list() {
        assert_eq!(
            Selection::files_from_list(r#" /a/x.mkv, "/b/with, comma.avi",, '/c/y.mov' "#),
            Selection::Files(vec![
                "/a/x.mkv".into(),
                "\"/b/with".into(),
                "comma.avi\"".into(),
                "/c/y.mov".into(),
            ])
        );
    }

    #[test]
    fn unquote_paths() {
        assert_eq!(unquote("  /a/b.mkv "), "/a/b.mkv");
        assert_eq!(unquote("\"/a/b c.mkv\""), "/a/b c.mkv");
        assert_eq!(unquote("'/a/b.mkv'"), "/a/b.mkv");
        assert_eq!(unquote("\"/a/b.mkv'"), "\"/a/b.mkv'");
        assert_eq!(unquote("\""), "\"");
    }
}
