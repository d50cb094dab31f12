//! Column kinds, coercion and display formatting.
//!
//! Coercion never panics: a failed conversion is reported as
//! [`EngineError::Coerce`] and callers pick the fallback (the kind's
//! default value for computation, a wrong-type marker for display).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};
use crate::value::{DATE_FORMAT, Value};

/// The declared kind of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// No declared kind; values pass through as their string form.
    #[default]
    Any,
    Int,
    Float,
    Date,
    Str,
}

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DAY_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%b %d %Y", "%B %d, %Y"];

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Any => "",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
            ColumnType::Str => "str",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Some(ColumnType::Any),
            "int" | "integer" => Some(ColumnType::Int),
            "float" | "decimal" => Some(ColumnType::Float),
            "date" | "datetime" => Some(ColumnType::Date),
            "str" | "string" => Some(ColumnType::Str),
            _ => None,
        }
    }

    /// Single character shown at the right edge of a column header.
    pub fn glyph(self) -> char {
        match self {
            ColumnType::Any => ' ',
            ColumnType::Int => '#',
            ColumnType::Float => '%',
            ColumnType::Date => '@',
            ColumnType::Str => '$',
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }

    /// Value used for computation when coercion fails.
    pub fn default_value(self) -> Value {
        match self {
            ColumnType::Int => Value::Int(0),
            ColumnType::Float => Value::Float(0.0),
            ColumnType::Date => Value::None,
            ColumnType::Any | ColumnType::Str => Value::Str(String::new()),
        }
    }

    /// Convert a raw value to this kind.
    pub fn coerce(self, value: &Value) -> Result<Value> {
        match self {
            ColumnType::Any | ColumnType::Str => Ok(Value::Str(value.to_string())),
            ColumnType::Int => to_int(value).map(Value::Int).ok_or_else(|| self.error(value)),
            ColumnType::Float => to_float(value)
                .map(Value::Float)
                .ok_or_else(|| self.error(value)),
            ColumnType::Date => to_date(value)
                .map(Value::Date)
                .ok_or_else(|| self.error(value)),
        }
    }

    fn error(self, value: &Value) -> EngineError {
        EngineError::Coerce {
            value: value.to_string(),
            kind: self.name(),
        }
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Str(s) => s.trim().parse().ok(),
        Value::Bytes(b) => String::from_utf8_lossy(b).trim().parse().ok(),
        Value::Date(d) => Some(d.and_utc().timestamp()),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse().ok(),
        Value::Bytes(b) => String::from_utf8_lossy(b).trim().parse().ok(),
        Value::Date(d) => Some(d.and_utc().timestamp() as f64),
        _ => None,
    }
}

fn to_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Int(n) => DateTime::from_timestamp(*n, 0).map(|d| d.naive_utc()),
        Value::Float(f) if f.is_finite() => {
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9) as u32;
            DateTime::from_timestamp(secs as i64, nanos).map(|d| d.naive_utc())
        }
        Value::Str(s) => parse_date(s),
        Value::Bytes(b) => parse_date(&String::from_utf8_lossy(b)),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_utc());
    }
    for layout in DATE_LAYOUTS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(d);
        }
    }
    for layout in DAY_LAYOUTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, layout) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Guess the natural kind of a value: integer, then float, then timestamp,
/// falling back to string.
pub fn detect_type(value: &Value) -> ColumnType {
    match value {
        Value::Int(_) | Value::Bool(_) => ColumnType::Int,
        Value::Float(_) => ColumnType::Float,
        Value::Date(_) => ColumnType::Date,
        Value::Str(s) => {
            let s = s.trim();
            if s.parse::<i64>().is_ok() {
                ColumnType::Int
            } else if s.parse::<f64>().is_ok() {
                ColumnType::Float
            } else if parse_date(s).is_some() {
                ColumnType::Date
            } else {
                ColumnType::Str
            }
        }
        Value::Bytes(b) => detect_type(&Value::Str(String::from_utf8_lossy(b).into_owned())),
        _ => ColumnType::Str,
    }
}

/// Coerce `value` to `ty` and render it.
///
/// `fmt` is an optional printf-style spec (`%d`, `%.3f`, `%08.2f`, `%s`).
/// Numeric kinds are right-justified in `width - 1` cells when a width is
/// given, leaving room for the column filler.
pub fn format_value(
    ty: ColumnType,
    value: &Value,
    fmt: Option<&str>,
    width: Option<usize>,
) -> Result<String> {
    let coerced = ty.coerce(value)?;
    let text = match fmt {
        Some(spec) => apply_format(spec, &coerced),
        None => match &coerced {
            Value::Float(f) if ty == ColumnType::Float => format!("{:.2}", f),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            other => other.to_string(),
        },
    };
    match width {
        Some(w) if w > 0 && ty.is_numeric() => Ok(format!("{:>1$}", text, w - 1)),
        _ => Ok(text),
    }
}

fn format_spec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"%(-)?(0)?(\d+)?(?:\.(\d+))?([dfsex%])").expect("format spec regex")
    })
}

/// Render a single value through a printf-style spec. Text around the
/// conversion is kept as-is.
pub fn apply_format(spec: &str, value: &Value) -> String {
    format_spec_re()
        .replace_all(spec, |caps: &regex::Captures| {
            let left = caps.get(1).is_some();
            let zero = caps.get(2).is_some();
            let width: usize = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));
            let precision: Option<usize> = caps.get(4).and_then(|m| m.as_str().parse().ok());
            let body = match &caps[5] {
                "%" => return "%".to_string(),
                "d" => match to_int(value) {
                    Some(n) => n.to_string(),
                    None => value.to_string(),
                },
                "f" => match to_float(value) {
                    Some(f) => format!("{:.*}", precision.unwrap_or(6), f),
                    None => value.to_string(),
                },
                "e" => match to_float(value) {
                    Some(f) => format!("{:.*e}", precision.unwrap_or(6), f),
                    None => value.to_string(),
                },
                _ => {
                    let s = value.to_string();
                    match precision {
                        Some(p) => s.chars().take(p).collect(),
                        None => s,
                    }
                }
            };
            pad(&body, width, left, zero)
        })
        .into_owned()
}

fn pad(body: &str, width: usize, left: bool, zero: bool) -> String {
    let len = body.chars().count();
    if len >= width {
        return body.to_string();
    }
    let fill = width - len;
    if left {
        format!("{}{}", body, " ".repeat(fill))
    } else if zero {
        match body.strip_prefix('-') {
            Some(rest) => format!("-{}{}", "0".repeat(fill), rest),
            None => format!("{}{}", "0".repeat(fill), body),
        }
    } else {
        format!("{}{}", " ".repeat(fill), body)
    }
}
