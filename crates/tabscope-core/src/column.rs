//! Columns: named accessors over rows with a declared kind.

use std::fmt;
use std::rc::Rc;
use unicode_width::UnicodeWidthStr;

use tabscope_engine::{ColumnType, EngineError, ExprEngine, Expr, RegexSpec, Value, format_value, regex_transform};

use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::row::{Row, RowData, RowRef};

pub type Getter = Rc<dyn Fn(&Row, &Env) -> Result<Value>>;
pub type Setter = Rc<dyn Fn(&Row, Value) -> Result<()>>;

/// Reads a value out of a row, and optionally writes one back.
#[derive(Clone)]
pub struct Accessor {
    get: Getter,
    set: Option<Setter>,
}

impl Accessor {
    pub fn new(get: impl Fn(&Row, &Env) -> Result<Value> + 'static) -> Self {
        Self {
            get: Rc::new(get),
            set: None,
        }
    }

    pub fn with_setter(mut self, set: impl Fn(&Row, Value) -> Result<()> + 'static) -> Self {
        self.set = Some(Rc::new(set));
        self
    }

    /// Field `i` of a positional row. Missing trailing fields read as `None`.
    pub fn index(i: usize) -> Self {
        Accessor::new(move |row, _| match &*row.data() {
            RowData::List(values) => Ok(values.get(i).cloned().unwrap_or_default()),
            RowData::Record(map) => Ok(map.get_index(i).map(|(_, v)| v.clone()).unwrap_or_default()),
            RowData::Text(line) if i == 0 => Ok(Value::Str(line.clone())),
            _ => Err(TabscopeError::user(format!("row has no field {}", i))),
        })
        .with_setter(move |row, value| match &mut *row.data_mut() {
            RowData::List(values) => {
                if values.len() <= i {
                    values.resize(i + 1, Value::None);
                }
                values[i] = value;
                Ok(())
            }
            RowData::Text(line) if i == 0 => {
                *line = value.to_string();
                Ok(())
            }
            _ => Err(TabscopeError::user("column cannot be changed")),
        })
    }

    /// Field `name` of a record row.
    pub fn key(name: &str) -> Self {
        let get_name = name.to_string();
        let set_name = name.to_string();
        Accessor::new(move |row, _| match &*row.data() {
            RowData::Record(map) => Ok(map.get(&get_name).cloned().unwrap_or_default()),
            _ => Err(TabscopeError::user(format!("row has no field {}", get_name))),
        })
        .with_setter(move |row, value| match &mut *row.data_mut() {
            RowData::Record(map) => {
                map.insert(set_name.clone(), value);
                Ok(())
            }
            _ => Err(TabscopeError::user("column cannot be changed")),
        })
    }

    /// Apply `inner` to sub-row `pos` of a combined row. An absent sub-row
    /// reads as `None`.
    pub fn subrow(inner: &Accessor, pos: usize) -> Self {
        let get = inner.get.clone();
        let accessor = Accessor::new(move |row, env| match subrow_at(row, pos)? {
            Some(sub) => get(sub.as_ref(), env),
            None => Ok(Value::None),
        });
        match inner.set.clone() {
            Some(set) => accessor.with_setter(move |row, value| match subrow_at(row, pos)? {
                Some(sub) => set(sub.as_ref(), value),
                None => Ok(()),
            }),
            None => accessor,
        }
    }

    pub fn is_settable(&self) -> bool {
        self.set.is_some()
    }
}

fn subrow_at(row: &Row, pos: usize) -> Result<Option<RowRef>> {
    match &*row.data() {
        RowData::Combined(parts) => Ok(parts.get(pos).cloned().flatten()),
        _ => Err(TabscopeError::user("not a joined row")),
    }
}

/// How a cell's text came out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Ok,
    /// The raw value did not convert to the column kind; text is the raw form.
    WrongType,
    /// The accessor failed; text is the function-error marker.
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayValue {
    pub text: String,
    pub state: CellState,
}

impl DisplayValue {
    fn ok(text: String) -> Self {
        Self {
            text,
            state: CellState::Ok,
        }
    }
}

#[derive(Clone)]
pub struct Column {
    name: String,
    pub ty: ColumnType,
    accessor: Accessor,
    /// `None` until first laid out; `Some(0)` hides the column.
    pub width: Option<usize>,
    pub fmt: Option<String>,
    /// Source text of a computed or regex column.
    pub expr: Option<String>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("width", &self.width)
            .field("expr", &self.expr)
            .finish()
    }
}

impl Column {
    pub fn new(name: &str, accessor: Accessor) -> Self {
        Self {
            name: normalize_name(name),
            ty: ColumnType::Any,
            accessor,
            width: None,
            fmt: None,
            expr: None,
        }
    }

    pub fn with_type(mut self, ty: ColumnType) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = normalize_name(name);
    }

    pub fn is_hidden(&self) -> bool {
        self.width == Some(0)
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// The same column read through sub-row `pos` of a combined row.
    pub fn wrapped(&self, pos: usize) -> Column {
        Column {
            accessor: Accessor::subrow(&self.accessor, pos),
            ..self.clone()
        }
    }

    /// The accessor's value, before coercion.
    pub fn raw_value(&self, row: &Row, env: &Env) -> Result<Value> {
        (self.accessor.get)(row, env)
    }

    /// The coerced value. Accessor failures are recorded and returned;
    /// coercion failures are recorded and yield the kind's default.
    pub fn get_value(&self, row: &Row, env: &Env) -> Result<Value> {
        let raw = self
            .raw_value(row, env)
            .inspect_err(|e| env.errors.record(format!("{}: {}", self.name, e)))?;
        let raw = decode_bytes(raw, &env.options.encoding);
        match self.ty.coerce(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                env.errors.record(format!("{}: {}", self.name, e));
                Ok(self.ty.default_value())
            }
        }
    }

    /// Text for a cell. Never fails: problems turn into markers.
    pub fn display_value(&self, row: &Row, width: Option<usize>, env: &Env) -> DisplayValue {
        let raw = match self.raw_value(row, env) {
            Ok(raw) => raw,
            Err(e) => {
                env.errors.record(format!("{}: {}", self.name, e));
                return DisplayValue {
                    text: env.options.ch_function_error.clone(),
                    state: CellState::Error,
                };
            }
        };
        if raw.is_none() {
            return DisplayValue::ok(env.options.ch_visible_none.clone());
        }
        let raw = decode_bytes(raw, &env.options.encoding);
        match format_value(self.ty, &raw, self.fmt.as_deref(), width) {
            Ok(text) => DisplayValue::ok(text),
            Err(e) => {
                env.errors.record(format!("{}: {}", self.name, e));
                DisplayValue {
                    text: raw.to_string(),
                    state: CellState::WrongType,
                }
            }
        }
    }

    pub fn display_text(&self, row: &Row, env: &Env) -> String {
        self.display_value(row, None, env).text
    }

    pub fn set_value(&self, row: &Row, value: Value) -> Result<()> {
        match &self.accessor.set {
            Some(set) => set(row, value),
            None => Err(TabscopeError::user("column cannot be changed")),
        }
    }

    /// Width that fits the name and every displayed value in `rows`, capped
    /// to the screen, plus two cells of padding. Zero for no rows.
    pub fn max_width(&self, rows: &[RowRef], screen_width: usize, env: &Env) -> usize {
        if rows.is_empty() {
            return 0;
        }
        let widest = rows
            .iter()
            .map(|r| self.display_text(r, env).width())
            .max()
            .unwrap_or(0);
        widest.max(self.name.width()).min(screen_width.saturating_sub(3)) + 2
    }

    pub fn values(&self, rows: &[RowRef], env: &Env) -> Result<Vec<Value>> {
        rows.iter().map(|r| self.get_value(r, env)).collect()
    }

    pub fn n_empty(&self, rows: &[RowRef], env: &Env) -> Result<usize> {
        Ok(self.values(rows, env)?.iter().filter(|v| v.is_empty()).count())
    }

    /// A column computed from an expression over `siblings`, referenced by
    /// name.
    pub fn expr(siblings: Vec<Column>, engine: Rc<ExprEngine>, source: &str) -> Result<Column> {
        let expr = engine.compile(source)?;
        let siblings = Rc::new(siblings);
        let accessor = Accessor::new(move |row, env| eval_expr(&engine, &expr, &siblings, row, env));
        let mut col = Column::new(source, accessor);
        col.expr = Some(source.trim().to_string());
        Ok(col)
    }

    /// A column from `expr/search/replace`: the expression's text, rewritten
    /// by the first regex match, or `None` when nothing matches.
    pub fn regex(siblings: Vec<Column>, engine: Rc<ExprEngine>, spec: &str) -> Result<Column> {
        let parsed = RegexSpec::parse(&engine, spec)?;
        let siblings = Rc::new(siblings);
        let accessor = Accessor::new(move |row, env| {
            let base = eval_expr(&engine, &parsed.expr, &siblings, row, env)?;
            Ok(regex_transform(&base.to_string(), &parsed.search, &parsed.replace)
                .map(Value::Str)
                .unwrap_or_default())
        });
        let mut col = Column::new(spec, accessor);
        col.expr = Some(spec.to_string());
        Ok(col)
    }
}

fn eval_expr(
    engine: &ExprEngine,
    expr: &Expr,
    siblings: &[Column],
    row: &Row,
    env: &Env,
) -> Result<Value> {
    let value = engine.eval(expr, |name| match siblings.iter().find(|c| c.name == name) {
        Some(col) => col
            .get_value(row, env)
            .map(Some)
            .map_err(|e| EngineError::Lookup(format!("{}: {}", name, e))),
        None => Ok(None),
    })?;
    Ok(value)
}

fn normalize_name(name: &str) -> String {
    name.replace(' ', "_")
}

fn decode_bytes(value: Value, label: &str) -> Value {
    match value {
        Value::Bytes(bytes) => {
            let encoding =
                encoding_rs::Encoding::for_label(label.as_bytes()).unwrap_or(encoding_rs::UTF_8);
            let (text, _, _) = encoding.decode(&bytes);
            Value::Str(text.into_owned())
        }
        other => other,
    }
}
