use std::path::Path;

use crate::error::Result;
use crate::meta::text_sheet;
use crate::options::Options;
use crate::sheet::{Sheet, SheetKind};

use super::{file_stem, parse_delimited, read_text};

/// Plain text, one row per line. A tab near the start of the first line
/// means the file is really TSV.
pub fn open_txt(path: &Path, options: &Options) -> Result<Sheet> {
    let content = read_text(path, &options.encoding)?;
    let name = file_stem(path);
    let tabbed = content
        .lines()
        .next()
        .is_some_and(|line| line.chars().take(32).any(|c| c == '\t'));
    if tabbed {
        return parse_delimited(&name, &content, b'\t', None, options.csv_header);
    }
    Ok(text_sheet(&name, content.lines().map(str::to_string)).with_kind(SheetKind::Table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn tab_in_first_line_reads_as_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a\tb\n1\t2").unwrap();
        let sheet = open_txt(file.path(), &Options::default()).unwrap();
        assert_eq!(sheet.n_cols(), 2);
        assert_eq!(sheet.n_rows(), 2);
    }

    #[test]
    fn plain_lines_are_one_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello world\nsecond line").unwrap();
        let sheet = open_txt(file.path(), &Options::default()).unwrap();
        assert_eq!(sheet.n_cols(), 1);
        assert_eq!(sheet.n_rows(), 2);
    }
}
