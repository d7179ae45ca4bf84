use crate::select::{Selection, unquote};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

const MENU: &str = "Select an option:
1) Convert a single file
2) Convert multiple files
3) Convert all videos in a folder";

/// Interactive menu option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    File,
    Files,
    Dir,
}

impl MenuChoice {
    pub fn parse(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::File),
            "2" => Some(Self::Files),
            "3" => Some(Self::Dir),
            _ => None,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::File => "Video path: ",
            Self::Files => "Video paths, comma separated: ",
            Self::Dir => "Folder path: ",
        }
    }

    /// Build the selection from the answer to [`Self::prompt`].
    pub fn selection(self, answer: &str) -> Selection {
        match self {
            Self::File => Selection::File(PathBuf::from(unquote(answer))),
            Self::Files => Selection::files_from_list(answer),
            Self::Dir => Selection::Dir(PathBuf::from(unquote(answer))),
        }
    }
}

/// Ask what to convert. `None` if the menu choice is invalid.
pub fn select(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Option<Selection>> {
    writeln!(output, "{MENU}")?;
    let choice = prompt(input, output, "Choice (1/2/3): ")?;
    let Some(choice) = MenuChoice::parse(&choice) else {
        return Ok(None);
    };
    let answer = prompt(input, output, choice.prompt())?;
    Ok(Some(choice.selection(&answer)))
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, text: &str) -> io::Result<String> {
    write!(output, "{text}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> (Option<Selection>, String) {
        let mut out = vec![];
        let selection = select(&mut Cursor::new(input), &mut out).unwrap();
        (selection, String::from_utf8(out).unwrap())
    }

    #[test]
    fn single_file() {
        let (selection, out) = run("1\n\"/videos/my film.mkv\"\n");
        assert_eq!(selection, Some(Selection::File("/videos/my film.mkv".into())));
        assert!(out.starts_with(MENU));
        assert!(out.ends_with("Video path: "));
    }

    #[test]
    fn multiple_files() {
        let (selection, _) = run(" 2 \r\n/a.avi, /b.mov ,\r\n");
        assert_eq!(
            selection,
            Some(Selection::Files(vec!["/a.avi".into(), "/b.mov".into()]))
        );
    }

    #[test]
    fn directory() {
        let (selection, _) = run("3\n /videos \n");
        assert_eq!(selection, Some(Selection::Dir("/videos".into())));
    }

    #[test]
    fn invalid_choice_asks_nothing_else() {
        let (selection, out) = run("4\n/videos\n");
        assert_eq!(selection, None);
        assert!(out.ends_with("Choice (1/2/3): "));

        assert_eq!(run("").0, None);
    }
}
