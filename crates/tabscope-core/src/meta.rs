//! Sheets about the application itself: the sheet stack, a sheet's
//! columns, options, help and plain text.

use std::collections::HashMap;

use tabscope_engine::{ColumnType, Value};

use crate::column::{Accessor, Column};
use crate::command::{Command, CommandTable};
use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::join::JoinKind;
use crate::options::Options;
use crate::row::{Row, RowData, RowRef};
use crate::sheet::{Sheet, SheetId, SheetKind, Source};

fn list_columns(names: &[(&str, ColumnType)]) -> Vec<Column> {
    names
        .iter()
        .enumerate()
        .map(|(i, (name, ty))| Column::new(name, Accessor::index(i)).with_type(*ty))
        .collect()
}

/// One row of the sheets sheet for each sheet in `stack`, front first.
pub fn sheet_entries(stack: &[Sheet], env: &Env) -> Vec<(SheetId, Vec<Value>)> {
    stack
        .iter()
        .map(|s| {
            let cursor = match (s.cursor_row_ref(), s.cursor_column()) {
                (Ok(row), Ok(col)) => col.display_text(&row, env),
                _ => String::new(),
            };
            let values = vec![
                Value::from(s.name()),
                Value::Int(s.n_rows() as i64),
                Value::Int(s.n_cols() as i64),
                Value::Str(cursor),
                Value::Str(s.key_col_names(&env.options.ch_key_sep)),
                Value::Str(s.source.describe()),
            ];
            (s.id(), values)
        })
        .collect()
}

pub fn sheets_sheet(entries: Vec<(SheetId, Vec<Value>)>) -> Sheet {
    let columns = list_columns(&[
        ("name", ColumnType::Any),
        ("nRows", ColumnType::Int),
        ("nCols", ColumnType::Int),
        ("cursorValue", ColumnType::Any),
        ("keyColNames", ColumnType::Any),
        ("source", ColumnType::Any),
    ]);
    let mut sheet = Sheet::new("sheets", Source::None)
        .with_kind(SheetKind::Sheets {
            by_row: HashMap::new(),
        })
        .with_columns(columns, 1);
    sheet.commands.bind("", "Enter", Command::GotoSheet);
    for (symbol, kind) in "&+*~".chars().filter_map(|c| Some((c, JoinKind::from_symbol(c)?))) {
        sheet
            .commands
            .bind("", &symbol.to_string(), Command::JoinSelected(kind));
    }
    refresh_sheets_sheet(&mut sheet, entries);
    sheet
}

/// Rebuild the rows in stack order. A sheet that already had a row keeps
/// it, so its selection survives.
pub fn refresh_sheets_sheet(sheet: &mut Sheet, entries: Vec<(SheetId, Vec<Value>)>) {
    let SheetKind::Sheets { by_row } = &mut sheet.kind else {
        return;
    };
    let mut existing: HashMap<SheetId, RowRef> = sheet
        .rows
        .iter()
        .filter_map(|r| by_row.get(&r.id()).map(|id| (*id, r.clone())))
        .collect();
    by_row.clear();
    let mut rows = Vec::with_capacity(entries.len());
    for (id, values) in entries {
        let row = match existing.remove(&id) {
            Some(row) => {
                row.replace(RowData::List(values));
                row
            }
            None => Row::list(values),
        };
        by_row.insert(row.id(), id);
        rows.push(row);
    }
    sheet.rows = rows;
}

/// The sheet ids behind the given rows of a sheets sheet.
pub fn sheet_ids(sheet: &Sheet, rows: &[RowRef]) -> Vec<SheetId> {
    match &sheet.kind {
        SheetKind::Sheets { by_row } => rows.iter().filter_map(|r| by_row.get(&r.id()).copied()).collect(),
        _ => Vec::new(),
    }
}

const COLUMN_FIELDS: [(&str, ColumnType); 6] = [
    ("column", ColumnType::Any),
    ("width", ColumnType::Int),
    ("type", ColumnType::Any),
    ("fmtstr", ColumnType::Any),
    ("expr", ColumnType::Any),
    ("value", ColumnType::Any),
];

/// One row per column of `source`, for editing its columns.
pub fn columns_sheet(source: &Sheet, env: &Env) -> Sheet {
    let mut sheet = Sheet::new(&format!("{}_columns", source.name()), Source::Sheet(source.id()))
        .with_kind(SheetKind::Columns {
            by_row: HashMap::new(),
        })
        .with_columns(list_columns(&COLUMN_FIELDS), 1);
    sheet.commands.bind("", "@", Command::SourceColumnType(ColumnType::Date));
    sheet.commands.bind("", "#", Command::SourceColumnType(ColumnType::Int));
    sheet.commands.bind("", "$", Command::SourceColumnType(ColumnType::Str));
    sheet.commands.bind("", "%", Command::SourceColumnType(ColumnType::Float));
    sheet.commands.bind("", "~", Command::SourceColumnDetect);
    sheet.commands.bind("", "!", Command::SourceColumnKey);
    sheet.commands.bind("", "-", Command::SourceColumnHide);
    sheet.commands.bind("", "_", Command::SourceColumnFit);
    refresh_columns_sheet(&mut sheet, source, env);
    sheet
}

/// Rebuild the rows from the source columns, in source order, reusing rows
/// by position.
pub fn refresh_columns_sheet(sheet: &mut Sheet, source: &Sheet, env: &Env) {
    let SheetKind::Columns { by_row } = &mut sheet.kind else {
        return;
    };
    let cursor_row = source.cursor_row_ref().ok();
    by_row.clear();
    let mut rows = Vec::with_capacity(source.columns.len());
    for (idx, col) in source.columns.iter().enumerate() {
        let value = cursor_row
            .as_ref()
            .map(|r| col.display_text(r, env))
            .unwrap_or_default();
        let values = vec![
            Value::from(col.name()),
            col.width.map_or(Value::None, |w| Value::Int(w as i64)),
            Value::from(col.ty.name()),
            col.fmt.clone().map_or(Value::None, Value::Str),
            col.expr.clone().map_or(Value::None, Value::Str),
            Value::Str(value),
        ];
        let row = match sheet.rows.get(idx) {
            Some(row) => {
                row.replace(RowData::List(values));
                row.clone()
            }
            None => Row::list(values),
        };
        by_row.insert(row.id(), idx);
        rows.push(row);
    }
    sheet.rows = rows;
}

/// Source column index behind the cursor row of a columns sheet.
pub fn source_column_index(sheet: &Sheet) -> Result<usize> {
    let row = sheet.cursor_row_ref()?;
    match &sheet.kind {
        SheetKind::Columns { by_row } => by_row
            .get(&row.id())
            .copied()
            .ok_or_else(|| TabscopeError::user("column is gone")),
        _ => Err(TabscopeError::user("not a columns sheet")),
    }
}

/// Apply an edit made on a columns sheet to the source column.
pub fn edit_source_column(source: &mut Sheet, idx: usize, field: &str, text: &str) -> Result<()> {
    let col = source
        .columns
        .get_mut(idx)
        .ok_or_else(|| TabscopeError::user("column is gone"))?;
    let text = text.trim();
    match field {
        "column" => col.set_name(text),
        "width" if text.is_empty() => col.width = None,
        "width" => {
            let width = text
                .parse()
                .map_err(|_| TabscopeError::user(format!("not a width: {}", text)))?;
            col.width = Some(width);
        }
        "type" => {
            col.ty = ColumnType::from_name(text)
                .ok_or_else(|| TabscopeError::user(format!("unknown type: {}", text)))?;
        }
        "fmtstr" if text.is_empty() => col.fmt = None,
        "fmtstr" => col.fmt = Some(text.to_string()),
        _ => return Err(TabscopeError::user("column cannot be changed")),
    }
    Ok(())
}

pub fn options_sheet(options: &Options) -> Sheet {
    let rows = options
        .entries()
        .into_iter()
        .map(|(name, value, help)| Row::list(vec![Value::from(name), Value::Str(value), Value::from(help)]))
        .collect();
    Sheet::new("options", Source::None)
        .with_kind(SheetKind::Options)
        .with_columns(
            list_columns(&[
                ("option", ColumnType::Any),
                ("value", ColumnType::Any),
                ("description", ColumnType::Any),
            ]),
            1,
        )
        .with_rows(rows)
}

/// A one-column sheet of text lines.
pub fn text_sheet(name: &str, lines: impl IntoIterator<Item = String>) -> Sheet {
    Sheet::new(name, Source::None)
        .with_kind(SheetKind::Text)
        .with_columns(vec![Column::new("text", Accessor::index(0))], 0)
        .with_rows(lines.into_iter().map(Row::text).collect())
}

/// The bindings of `table`: each unprefixed key with its command and the
/// command it runs after the `g` prefix. Keys bound only under a prefix
/// follow.
pub fn help_sheet(name: &str, table: &CommandTable) -> Sheet {
    let mut rows = Vec::new();
    let mut seen = Vec::new();
    for binding in table.iter().filter(|b| b.prefix.is_empty()) {
        if matches!(binding.command, Command::Prefix(_)) {
            continue;
        }
        let global = table.get("g", &binding.key).map(|c| c.help()).unwrap_or_default();
        seen.push(binding.key.clone());
        rows.push(Row::list(vec![
            Value::Str(binding.key),
            Value::from(binding.command.help()),
            Value::from(global),
        ]));
    }
    for binding in table.iter().filter(|b| !b.prefix.is_empty()) {
        if binding.prefix == "g" && seen.contains(&binding.key) {
            continue;
        }
        rows.push(Row::list(vec![
            Value::Str(format!("{} {}", binding.prefix, binding.key)),
            Value::from(binding.command.help()),
            Value::None,
        ]));
    }
    Sheet::new(&format!("{}_help", name), Source::None)
        .with_kind(SheetKind::Help)
        .with_columns(
            list_columns(&[
                ("key", ColumnType::Any),
                ("action", ColumnType::Any),
                ("global_action", ColumnType::Any),
            ]),
            1,
        )
        .with_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Sheet {
        Sheet::new(name, Source::None)
            .with_columns(
                vec![
                    Column::new("a", Accessor::index(0)),
                    Column::new("b", Accessor::index(1)).with_type(ColumnType::Int),
                ],
                1,
            )
            .with_rows(vec![Row::list(vec![Value::from("k"), Value::from("7")])])
    }

    #[test]
    fn sheets_sheet_keeps_rows_across_refresh() {
        let env = Env::default();
        let stack = vec![table("one"), table("two")];
        let mut meta = sheets_sheet(sheet_entries(&stack, &env));
        assert_eq!(meta.n_rows(), 2);
        let second = meta.rows[1].clone();
        meta.toggle(&[second.clone()]);

        let reordered = vec![stack[1].id(), stack[0].id()];
        let entries: Vec<_> = sheet_entries(&stack, &env).into_iter().rev().collect();
        refresh_sheets_sheet(&mut meta, entries);
        assert_eq!(meta.rows[0].id(), second.id());
        assert!(meta.is_selected(&meta.rows[0].clone()));
        assert_eq!(sheet_ids(&meta, &meta.rows), reordered);
    }

    #[test]
    fn sheets_sheet_binds_join_symbols() {
        let meta = sheets_sheet(Vec::new());
        assert_eq!(meta.commands.get("", "&"), Some(Command::JoinSelected(JoinKind::Inner)));
        assert_eq!(meta.commands.get("", "+"), Some(Command::JoinSelected(JoinKind::LeftOuter)));
        assert_eq!(meta.commands.get("", "~"), Some(Command::JoinSelected(JoinKind::Diff)));
    }

    #[test]
    fn columns_sheet_describes_and_edits_source() {
        let env = Env::default();
        let mut source = table("t");
        let meta = columns_sheet(&source, &env);
        assert_eq!(meta.name(), "t_columns");
        let type_col = &meta.columns[2];
        assert_eq!(type_col.display_text(&meta.rows[1], &env), "int");
        assert_eq!(meta.columns[5].display_text(&meta.rows[1], &env), "7");

        edit_source_column(&mut source, 1, "column", "count").unwrap();
        edit_source_column(&mut source, 1, "type", "float").unwrap();
        assert_eq!(source.columns[1].name(), "count");
        assert_eq!(source.columns[1].ty, ColumnType::Float);
        assert!(edit_source_column(&mut source, 1, "value", "x").is_err());
    }

    #[test]
    fn help_sheet_pairs_plain_and_global_actions() {
        let env = Env::default();
        let help = help_sheet("t", &CommandTable::base());
        let q = help
            .rows
            .iter()
            .find(|r| help.columns[0].display_text(r, &env) == "q")
            .expect("q row");
        assert_eq!(help.columns[1].display_text(q, &env), "pop this sheet");
        assert_eq!(help.columns[2].display_text(q, &env), "pop all sheets (clean exit)");
    }

    #[test]
    fn options_sheet_lists_every_option() {
        let sheet = options_sheet(&Options::default());
        assert_eq!(sheet.n_rows(), Options::NAMES.len());
    }
}
