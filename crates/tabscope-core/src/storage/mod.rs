//! Loaders and writers for files on disk.

mod delimited;
mod dir;
mod json;
mod text;

pub use delimited::{open_csv, open_tsv, parse_delimited, save_csv, save_tsv};
pub use dir::open_dir;
pub use json::{dive, from_json, open_json, sheet_from_value};
pub use text::open_txt;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::path::Path;

use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::options::Options;
use crate::sheet::{Sheet, Source};

/// Load `path` as a sheet. `format` overrides the file extension; a
/// directory becomes a listing. Unknown formats load as plain text.
pub fn open_path(path: &Path, format: Option<&str>, options: &Options) -> Result<Sheet> {
    let format = format
        .map(str::to_ascii_lowercase)
        .or_else(|| path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default();
    tracing::info!(path = %path.display(), format = %format, "loading");

    let mut sheet = if path.is_dir() {
        open_dir(path)?
    } else {
        match format.as_str() {
            "csv" => open_csv(path, options)?,
            "tsv" | "tab" => open_tsv(path, options)?,
            "json" => open_json(path, options)?,
            "txt" | "" => open_txt(path, options)?,
            other => {
                tracing::warn!(format = other, "no loader for format, reading as text");
                open_txt(path, options)?
            }
        }
    };
    sheet.source = Source::Path {
        path: path.to_path_buf(),
        format: Some(format).filter(|f| !f.is_empty()),
    };
    Ok(sheet)
}

/// Write the visible columns of `sheet` to `path`, as CSV for a `.csv`
/// extension and TSV otherwise.
pub fn save_sheet(sheet: &Sheet, path: &Path, env: &Env) -> Result<()> {
    if env.options.readonly {
        return Err(TabscopeError::ReadOnly);
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => save_csv(sheet, path, env)?,
        _ => save_tsv(sheet, path, env)?,
    }
    tracing::info!(path = %path.display(), rows = sheet.n_rows(), "saved");
    env.status(format!("saved to {}", path.display()));
    Ok(())
}

/// Read a whole file as text in the configured encoding. Invalid UTF-8
/// falls back to Windows-1252, as spreadsheet exports often are.
pub(crate) fn read_text(path: &Path, label: &str) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors && encoding == UTF_8 {
        let (text, _, _) = WINDOWS_1252.decode(&bytes);
        return Ok(text.into_owned());
    }
    Ok(text.into_owned())
}

/// Sheet name for a file: its stem.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
