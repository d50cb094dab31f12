//! tabscope-core - UI-agnostic sheet model, viewport engine and storage.

pub mod column;
pub mod command;
pub mod env;
pub mod error;
pub mod freq;
pub mod join;
pub mod meta;
pub mod options;
pub mod row;
pub mod search;
pub mod sheet;
pub mod storage;
pub mod viewport;

pub use column::{Accessor, CellState, Column, DisplayValue};
pub use command::{Binding, Command, CommandTable, Dispatcher, Resolution};
pub use env::{Env, ErrorLog, StatusLog};
pub use error::{Result, TabscopeError};
pub use freq::{frequency_sheet, open_group};
pub use join::{JoinKind, join_sheets};
pub use options::Options;
pub use row::{Row, RowData, RowId, RowRef};
pub use search::{SearchOutcome, SearchState, search_regex};
pub use sheet::{Sheet, SheetId, SheetKind, Source};
pub use storage::{open_path, save_sheet};
pub use viewport::Screen;

pub use tabscope_engine::{ColumnType, ExprEngine, Value};
