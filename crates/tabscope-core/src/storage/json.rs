//! JSON documents and nested values.

use indexmap::{IndexMap, IndexSet};
use std::path::Path;

use tabscope_engine::Value;

use crate::column::{Accessor, Column};
use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::options::Options;
use crate::row::{Row, RowData};
use crate::sheet::{Sheet, Source};

use super::{file_stem, read_text};

pub fn open_json(path: &Path, options: &Options) -> Result<Sheet> {
    let content = read_text(path, &options.encoding)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    Ok(sheet_from_value(&file_stem(path), from_json(json)))
}

pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::None,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::None, Value::Float),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Map(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

/// A sheet over a value: a list of objects becomes one record per object
/// with a column per field; an object becomes key/value rows; any other list
/// one row per item.
pub fn sheet_from_value(name: &str, value: Value) -> Sheet {
    match value {
        Value::List(items) if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Map(_))) => {
            let mut fields: IndexSet<String> = IndexSet::new();
            let rows = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Map(map) => {
                        fields.extend(map.keys().cloned());
                        Some(Row::new(RowData::Record(map)))
                    }
                    _ => None,
                })
                .collect();
            let columns = fields.iter().map(|f| Column::new(f, Accessor::key(f))).collect();
            Sheet::new(name, Source::None).with_columns(columns, 1).with_rows(rows)
        }
        Value::List(items) => Sheet::new(name, Source::None)
            .with_columns(vec![Column::new("value", Accessor::index(0))], 0)
            .with_rows(items.into_iter().map(|v| Row::list(vec![v])).collect()),
        Value::Map(map) => key_value_sheet(name, map),
        scalar => Sheet::new(name, Source::None)
            .with_columns(vec![Column::new("value", Accessor::index(0))], 0)
            .with_rows(vec![Row::list(vec![scalar])]),
    }
}

fn key_value_sheet(name: &str, map: IndexMap<String, Value>) -> Sheet {
    let rows = map
        .into_iter()
        .map(|(k, v)| Row::list(vec![Value::Str(k), v]))
        .collect();
    Sheet::new(name, Source::None)
        .with_columns(
            vec![
                Column::new("key", Accessor::index(0)),
                Column::new("value", Accessor::index(1)),
            ],
            1,
        )
        .with_rows(rows)
}

/// A sheet over the nested value in the cursor cell, or over the whole
/// cursor row when it is a record and the cell holds a plain value.
pub fn dive(sheet: &Sheet, env: &Env) -> Result<Sheet> {
    let row = sheet.cursor_row_ref()?;
    let col = sheet.cursor_column()?;
    let sep = &env.options.subsheet_sep;
    let raw = col.raw_value(&row, env)?;
    let mut derived = match raw {
        Value::List(_) | Value::Map(_) => {
            let key = match (sheet.n_keys, &*row.data()) {
                (0, _) | (_, RowData::Record(_)) => col.name().to_string(),
                _ => sheet.columns[0].display_text(&row, env),
            };
            sheet_from_value(&format!("{}{}{}", sheet.name(), sep, key), raw)
        }
        _ => match &*row.data() {
            RowData::Record(map) => key_value_sheet(
                &format!("{}{}{}", sheet.name(), sep, sheet.cursor_row),
                map.clone(),
            ),
            _ => return Err(TabscopeError::user("nothing to dive into")),
        },
    };
    derived.source = Source::Sheet(sheet.id());
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        from_json(serde_json::from_str(text).unwrap())
    }

    #[test]
    fn list_of_objects_becomes_records() {
        let sheet = sheet_from_value("people", parse(r#"[{"id": 1, "name": "a"}, {"id": 2, "tags": [1]}]"#));
        let names: Vec<_> = sheet.columns.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["id", "name", "tags"]);
        assert_eq!(sheet.n_keys, 1);
        let env = Env::default();
        assert_eq!(sheet.columns[1].display_text(&sheet.rows[1], &env), "");
    }

    #[test]
    fn object_becomes_key_value_rows() {
        let sheet = sheet_from_value("cfg", parse(r#"{"a": 1, "b": {"c": true}}"#));
        assert_eq!(sheet.n_rows(), 2);
        assert_eq!(sheet.columns[0].name(), "key");
    }

    #[test]
    fn dive_into_nested_cell_and_plain_record() {
        let env = Env::default();
        let mut sheet = sheet_from_value("people", parse(r#"[{"id": 1, "tags": ["x", "y"]}]"#));
        sheet.cursor_vcol = 1;
        let tags = dive(&sheet, &env).unwrap();
        assert_eq!(tags.name(), "people~tags");
        assert_eq!(tags.n_rows(), 2);

        sheet.cursor_vcol = 0;
        let record = dive(&sheet, &env).unwrap();
        assert_eq!(record.name(), "people~0");
        assert_eq!(record.columns[1].display_text(&record.rows[0], &env), "1");
    }
}
