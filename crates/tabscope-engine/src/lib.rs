//! tabscope_engine - Cell values, column type coercion and Rhai column expressions.

pub mod coerce;
pub mod error;
pub mod expr;
pub mod value;

pub use coerce::{ColumnType, detect_type, format_value};
pub use error::{EngineError, Result};
pub use expr::{Expr, ExprEngine, RegexSpec, regex_transform};
pub use value::{DATE_FORMAT, Value};
