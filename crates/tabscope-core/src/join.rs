//! Joining sheets on their key columns.

use indexmap::IndexMap;

use tabscope_engine::Value;

use crate::column::{Accessor, Column};
use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::row::{Row, RowData, RowRef};
use crate::sheet::{Sheet, SheetKind, Source};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Keys present in every sheet.
    Inner,
    /// Keys present in the first sheet.
    LeftOuter,
    /// Every key.
    Full,
    /// Keys missing from at least one sheet.
    Diff,
}

impl JoinKind {
    /// The key that requests this join on the sheets sheet, also used to
    /// name the result.
    pub fn symbol(self) -> char {
        match self {
            JoinKind::Inner => '&',
            JoinKind::LeftOuter => '+',
            JoinKind::Full => '*',
            JoinKind::Diff => '~',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '&' => Some(JoinKind::Inner),
            '+' => Some(JoinKind::LeftOuter),
            '*' => Some(JoinKind::Full),
            '~' => Some(JoinKind::Diff),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::LeftOuter => "outer",
            JoinKind::Full => "full",
            JoinKind::Diff => "diff",
        }
    }

    fn keeps(self, parts: &[Option<RowRef>]) -> bool {
        let all = parts.iter().all(Option::is_some);
        match self {
            JoinKind::Inner => all,
            JoinKind::LeftOuter => parts.first().is_some_and(Option::is_some),
            JoinKind::Full => true,
            JoinKind::Diff => !all,
        }
    }
}

/// Combine `sheets` on their key columns.
///
/// Each result row is `[key tuple, row from sheet 0, row from sheet 1, ...]`
/// with absent slots where a sheet lacks the key. A duplicate key within one
/// sheet replaces the earlier row. Keys keep the order they were first seen
/// in, sheet by sheet.
pub fn join_sheets(sheets: &[&Sheet], kind: JoinKind, env: &Env) -> Result<Sheet> {
    let first = sheets
        .first()
        .ok_or_else(|| TabscopeError::user("no sheets to join"))?;

    let mut combined: IndexMap<Vec<Value>, Vec<Option<RowRef>>> = IndexMap::new();
    for (pos, sheet) in sheets.iter().enumerate() {
        for row in &sheet.rows {
            let key = sheet
                .key_columns()
                .iter()
                .map(|c| c.get_value(row, env))
                .collect::<Result<Vec<_>>>()?;
            combined.entry(key).or_insert_with(|| vec![None; sheets.len()])[pos] = Some(row.clone());
        }
    }

    let rows: Vec<RowRef> = combined
        .into_iter()
        .filter(|(_, parts)| kind.keeps(parts))
        .map(|(key, parts)| {
            let mut slots = Vec::with_capacity(parts.len() + 1);
            slots.push(Some(Row::list(key)));
            slots.extend(parts);
            Row::new(RowData::Combined(slots))
        })
        .collect();

    let mut columns: Vec<Column> = first
        .key_columns()
        .iter()
        .enumerate()
        .map(|(i, c)| Column::new(c.name(), Accessor::subrow(&Accessor::index(i), 0)).with_type(c.ty))
        .collect();
    let n_keys = columns.len();
    for (pos, sheet) in sheets.iter().enumerate() {
        columns.extend(sheet.columns[sheet.key_columns().len()..].iter().map(|c| c.wrapped(pos + 1)));
    }

    let name = sheets
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(&kind.symbol().to_string());
    tracing::info!(kind = kind.name(), sheets = sheets.len(), rows = rows.len(), "joined sheets");

    Ok(Sheet::new(&name, Source::Sheets(sheets.iter().map(|s| s.id()).collect()))
        .with_kind(SheetKind::Join(kind))
        .with_columns(columns, n_keys)
        .with_rows(rows))
}
