//! Candidate video files & converted output naming.
use std::path::{Path, PathBuf};

/// Extensions, lowercase without the dot, of files considered videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["avi", "mkv", "mov", "wmv", "flv", "ts", "webm", "mp4"];

/// Subfolder, next to each input, that converted outputs are moved into.
pub const OUTPUT_DIR: &str = "convertiti";

/// File stem suffix marking a converted output.
const CONVERTED_MARKER: &str = "_converted";
const TARGET_EXTENSION: &str = "mp4";

/// Returns the lowercase extension of `path`, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True if the extension is in [`VIDEO_EXTENSIONS`], ignoring case.
pub fn has_video_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// True if the file is already in the target container.
pub fn is_mp4(path: &Path) -> bool {
    extension(path).as_deref() == Some(TARGET_EXTENSION)
}

/// * input: dir/vid.ext -> dir/vid_converted.mp4
///
/// Where ffmpeg writes before the output is moved to [`OUTPUT_DIR`].
pub fn staging_output(input: &Path) -> PathBuf {
    input.with_file_name(converted_file_name(input))
}

/// * input: dir/vid.ext -> dir/convertiti/vid_converted.mp4
pub fn final_output(input: &Path) -> PathBuf {
    let mut out = output_dir(input);
    out.push(converted_file_name(input));
    out
}

/// * input: dir/vid.ext -> dir/convertiti
pub fn output_dir(input: &Path) -> PathBuf {
    input.with_file_name(OUTPUT_DIR)
}

fn converted_file_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}{CONVERTED_MARKER}.{TARGET_EXTENSION}")
}

/// A file named like a converted output, `<stem>_converted.mp4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedName {
    /// Directory containing the converted file.
    pub dir: PathBuf,
    /// Stem of the file it was converted from.
    pub original_stem: String,
}

impl ConvertedName {
    /// Parse a converted output path.
    ///
    /// The name must be exactly `<stem>_converted.mp4` (extension case ignored)
    /// with a non-empty `<stem>`, so `my_converted_notes.mp4` or `_converted.mp4`
    /// are not matches.
    pub fn parse(path: &Path) -> Option<Self> {
        if !is_mp4(path) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let original_stem = stem.strip_suffix(CONVERTED_MARKER)?;
        if original_stem.is_empty() {
            return None;
        }
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Some(Self {
            dir,
            original_stem: original_stem.to_owned(),
        })
    }

    /// Directories that may hold the original: the converted file's own
    /// directory, plus its parent when it lives in [`OUTPUT_DIR`].
    pub fn original_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.dir.clone()];
        if self.dir.file_name().is_some_and(|n| n == OUTPUT_DIR) {
            if let Some(parent) = self.dir.parent() {
                match parent.as_os_str().is_empty() {
                    true => dirs.push(PathBuf::from(".")),
                    false => dirs.push(parent.to_path_buf()),
                }
            }
        }
        dirs
    }

    /// True if `path` looks like the original of this converted file.
    pub fn is_original(&self, path: &Path) -> bool {
        has_video_extension(path)
            && ConvertedName::parse(path).is_none()
            && path
                .file_stem()
                .is_some_and(|s| s.to_str() == Some(&self.original_stem))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn video_extensions_ignore_case() {
        assert!(has_video_extension(Path::new("a.avi")));
        assert!(has_video_extension(Path::new("/x/B.MKV")));
        assert!(has_video_extension(Path::new("clip.Ts")));
        assert!(!has_video_extension(Path::new("notes.txt")));
        assert!(!has_video_extension(Path::new("mkv")));
        assert!(!has_video_extension(Path::new("archive.mp4.zip")));
    }

    #[test]
    fn output_paths() {
        let input = Path::new("/videos/holiday.mkv");
        assert_eq!(
            staging_output(input),
            Path::new("/videos/holiday_converted.mp4")
        );
        assert_eq!(
            final_output(input),
            Path::new("/videos/convertiti/holiday_converted.mp4")
        );
        assert_eq!(
            final_output(Path::new("rel.avi")),
            Path::new("convertiti/rel_converted.mp4")
        );
    }

    #[test]
    fn parse_converted_name() {
        let name = ConvertedName::parse(Path::new("/v/convertiti/a_converted.mp4")).unwrap();
        assert_eq!(name.original_stem, "a");
        assert_eq!(name.dir, Path::new("/v/convertiti"));
        assert_eq!(
            name.original_dirs(),
            vec![PathBuf::from("/v/convertiti"), PathBuf::from("/v")]
        );

        let name = ConvertedName::parse(Path::new("b_converted.MP4")).unwrap();
        assert_eq!(name.original_stem, "b");
        assert_eq!(name.original_dirs(), vec![PathBuf::from(".")]);
    }

    #[test]
    fn not_converted_names() {
        for name in [
            "a.mp4",
            "_converted.mp4",
            "a_converted.mkv",
            "my_converted_notes.mp4",
            "a_converted.mp4.part",
        ] {
            assert_eq!(ConvertedName::parse(Path::new(name)), None, "{name}");
        }
    }

    #[test]
    fn is_original() {
        let name = ConvertedName::parse(Path::new("/v/a_converted.mp4")).unwrap();
        assert!(name.is_original(Path::new("/v/a.avi")));
        assert!(name.is_original(Path::new("/v/a.MP4")));
        assert!(!name.is_original(Path::new("/v/a.txt")));
        assert!(!name.is_original(Path::new("/v/ab.avi")));
        assert!(!name.is_original(Path::new("/v/a_converted.mp4")));
    }
}
