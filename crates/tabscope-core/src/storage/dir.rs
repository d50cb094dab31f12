use std::path::Path;
use std::time::UNIX_EPOCH;

use tabscope_engine::{ColumnType, Value};

use crate::column::{Accessor, Column};
use crate::command::Command;
use crate::error::Result;
use crate::row::Row;
use crate::sheet::{Sheet, SheetKind};

/// One row per directory entry, sorted by name. Modification times are
/// epoch seconds shown as dates.
pub fn open_dir(path: &Path) -> Result<Sheet> {
    let mut entries = std::fs::read_dir(path)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let meta = entry.metadata()?;
        let entry_path = entry.path();
        let kind = if meta.is_dir() {
            "dir".to_string()
        } else {
            entry_path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(Value::None, |d| Value::Int(d.as_secs() as i64));
        rows.push(Row::list(vec![
            Value::Str(entry.file_name().to_string_lossy().into_owned()),
            Value::Str(kind),
            Value::Int(meta.len() as i64),
            mtime,
        ]));
    }

    let columns = vec![
        Column::new("filename", Accessor::index(0)),
        Column::new("type", Accessor::index(1)),
        Column::new("size", Accessor::index(2)).with_type(ColumnType::Int),
        Column::new("mtime", Accessor::index(3)).with_type(ColumnType::Date),
    ];
    let mut sheet = Sheet::new(&path.display().to_string(), Default::default())
        .with_kind(SheetKind::Directory)
        .with_columns(columns, 1)
        .with_rows(rows);
    sheet.commands.bind("", "Enter", Command::OpenEntry);
    Ok(sheet)
}
