//! CSV and TSV.
//!
//! TSV is unquoted in both directions, with backslash escapes for tab,
//! newline, carriage return and backslash. CSV honors the quote character.

use std::path::Path;

use tabscope_engine::Value;

use crate::column::{Accessor, Column};
use crate::env::Env;
use crate::error::Result;
use crate::options::Options;
use crate::row::Row;
use crate::sheet::Sheet;

use super::{file_stem, read_text};

pub fn open_csv(path: &Path, options: &Options) -> Result<Sheet> {
    let content = read_text(path, &options.encoding)?;
    parse_delimited(
        &file_stem(path),
        &content,
        options.delimiter_byte(),
        Some(options.quote_byte()),
        options.csv_header,
    )
}

pub fn open_tsv(path: &Path, options: &Options) -> Result<Sheet> {
    let content = read_text(path, &options.encoding)?;
    parse_delimited(&file_stem(path), &content, b'\t', None, options.csv_header)
}

/// Build a sheet from delimited text. With `header`, the first record names
/// the columns; otherwise columns are unnamed. Short records read as `None`
/// in the missing fields. Without a quote character, fields are unescaped.
pub fn parse_delimited(
    name: &str,
    content: &str,
    delimiter: u8,
    quote: Option<u8>,
    header: bool,
) -> Result<Sheet> {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(delimiter).has_headers(false).flexible(true);
    match quote {
        Some(q) => builder.quote(q),
        None => builder.quoting(false),
    };
    let mut reader = builder.from_reader(content.as_bytes());

    let mut records: Vec<Vec<Value>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(match quote {
            Some(_) => record.iter().map(Value::from).collect(),
            None => record.iter().map(|f| Value::from(unescape_tsv(f))).collect(),
        });
    }

    let names: Vec<String> = match header && !records.is_empty() {
        true => records.remove(0).iter().map(Value::to_string).collect(),
        false => Vec::new(),
    };
    let n_cols = records
        .iter()
        .map(Vec::len)
        .chain([names.len()])
        .max()
        .unwrap_or(0);
    let columns = (0..n_cols)
        .map(|i| Column::new(names.get(i).map_or("", String::as_str), Accessor::index(i)))
        .collect();
    tracing::debug!(name, rows = records.len(), cols = n_cols, "parsed delimited text");

    Ok(Sheet::new(name, Default::default())
        .with_columns(columns, 0)
        .with_rows(records.into_iter().map(Row::list).collect()))
}

pub fn save_csv(sheet: &Sheet, path: &Path, env: &Env) -> Result<()> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(env.options.delimiter_byte())
        .quote(env.options.quote_byte());
    write_delimited(sheet, builder, path, env, |text| text.to_string())
}

pub fn save_tsv(sheet: &Sheet, path: &Path, env: &Env) -> Result<()> {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(b'\t').quote_style(csv::QuoteStyle::Never);
    write_delimited(sheet, builder, path, env, escape_tsv)
}

fn escape_tsv(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Undo `escape_tsv`. A backslash before any other character is kept.
fn unescape_tsv(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Visible columns by displayed value. The header line is written only when
/// some column has a name.
fn write_delimited(
    sheet: &Sheet,
    mut builder: csv::WriterBuilder,
    path: &Path,
    env: &Env,
    cell: impl Fn(&str) -> String,
) -> Result<()> {
    let mut writer = builder.flexible(true).from_path(path)?;
    let columns = sheet.visible_columns();
    if columns.iter().any(|c| !c.name().is_empty()) {
        writer.write_record(columns.iter().map(|c| cell(c.name())))?;
    }
    for row in &sheet.rows {
        writer.write_record(columns.iter().map(|c| cell(&c.display_text(row, env))))?;
    }
    writer.flush()?;
    Ok(())
}
