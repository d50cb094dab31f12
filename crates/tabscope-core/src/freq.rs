//! Frequency tables: a source sheet's rows grouped by one column.

use indexmap::IndexMap;

use tabscope_engine::{ColumnType, Value};

use crate::column::{Accessor, Column};
use crate::command::Command;
use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::row::{Row, RowData, RowRef};
use crate::sheet::{Sheet, SheetKind, Source};

const HISTOGRAM_WIDTH: usize = 80;

/// Group `source`'s rows by the text of column `col_idx`'s coerced value,
/// largest group first.
pub fn frequency_sheet(source: &Sheet, col_idx: usize, env: &Env) -> Result<Sheet> {
    let col = source
        .columns
        .get(col_idx)
        .ok_or_else(|| TabscopeError::user(format!("no column {}", col_idx)))?;

    let mut groups: IndexMap<String, Vec<RowRef>> = IndexMap::new();
    for row in &source.rows {
        let key = col.get_value(row, env)?.to_string();
        groups.entry(key).or_default().push(row.clone());
    }
    let mut groups: Vec<(String, Vec<RowRef>)> = groups.into_iter().collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let total = source.rows.len();
    let largest = groups.first().map_or(0, |(_, members)| members.len());
    let rows: Vec<RowRef> = groups
        .into_iter()
        .map(|(key, members)| Row::new(RowData::Group { key, members }))
        .collect();

    let columns = vec![
        Column::new(
            col.name(),
            Accessor::new(|row, _| match &*row.data() {
                RowData::Group { key, .. } => Ok(Value::Str(key.clone())),
                _ => Err(TabscopeError::user("not a frequency row")),
            }),
        )
        .with_type(col.ty),
        Column::new("num", Accessor::new(|row, _| Ok(Value::Int(group_len(row) as i64))))
            .with_type(ColumnType::Int),
        Column::new(
            "percent",
            Accessor::new(move |row, _| {
                Ok(Value::Float(group_len(row) as f64 * 100.0 / total.max(1) as f64))
            }),
        )
        .with_type(ColumnType::Float),
        Column::new(
            "histogram",
            Accessor::new(move |row, env| {
                let len = (group_len(row) * HISTOGRAM_WIDTH).checked_div(largest).unwrap_or(0);
                Ok(Value::Str(env.options.ch_histogram.repeat(len)))
            }),
        )
        .with_type(ColumnType::Str)
        .with_width(HISTOGRAM_WIDTH),
    ];

    let name = format!("{}_{}_freq", source.name(), col.name());
    tracing::info!(sheet = %name, groups = rows.len(), "frequency table");

    let mut sheet = Sheet::new(&name, Source::Sheet(source.id()))
        .with_kind(SheetKind::Frequency)
        .with_columns(columns, 1)
        .with_rows(rows);
    sheet.commands.bind("", "Space", Command::ToggleGroup);
    sheet.commands.bind("", "s", Command::SelectGroup);
    sheet.commands.bind("", "u", Command::UnselectGroup);
    sheet.commands.bind("", "Enter", Command::OpenGroup);
    Ok(sheet)
}

fn group_len(row: &Row) -> usize {
    match &*row.data() {
        RowData::Group { members, .. } => members.len(),
        _ => 0,
    }
}

/// A sheet over just the source rows of the group under the cursor.
pub fn open_group(source: &Sheet, freq: &Sheet, env: &Env) -> Result<Sheet> {
    let row = freq.cursor_row_ref()?;
    let key = match &*row.data() {
        RowData::Group { key, .. } => key.clone(),
        _ => return Err(TabscopeError::user("not a frequency row")),
    };
    let name = format!("{}{}{}", source.name(), env.options.subsheet_sep, key);
    Ok(source.derive(&name, row.members()))
}
