//! Sheets: columns over a row store, with cursor, viewport and selection.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use tabscope_engine::{ColumnType, Value, detect_type};

use crate::column::Column;
use crate::command::CommandTable;
use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::join::JoinKind;
use crate::row::{RowId, RowRef};
use crate::search::SearchState;
use crate::viewport::Screen;

static NEXT_SHEET_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(u64);

impl SheetId {
    fn next() -> Self {
        SheetId(NEXT_SHEET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where a sheet's rows came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Source {
    #[default]
    None,
    /// A file or directory, with an explicit format overriding the extension.
    Path {
        path: PathBuf,
        format: Option<String>,
    },
    /// Derived from another sheet.
    Sheet(SheetId),
    /// Derived from several sheets, in order.
    Sheets(Vec<SheetId>),
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Source::None => String::new(),
            Source::Path { path, .. } => path.display().to_string(),
            Source::Sheet(id) => format!("sheet {}", id.0),
            Source::Sheets(ids) => ids
                .iter()
                .map(|id| format!("sheet {}", id.0))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// What a sheet shows, for commands that only make sense on some sheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SheetKind {
    #[default]
    Table,
    /// The navigation stack; rows map back to the sheets they describe.
    Sheets { by_row: HashMap<RowId, SheetId> },
    /// Columns of the source sheet; rows map to source column indices.
    Columns { by_row: HashMap<RowId, usize> },
    Options,
    Join(JoinKind),
    Frequency,
    Help,
    Text,
    Directory,
}

#[derive(Debug)]
pub struct Sheet {
    id: SheetId,
    name: String,
    pub source: Source,
    pub kind: SheetKind,
    pub columns: Vec<Column>,
    /// The first `n_keys` columns are key columns.
    pub n_keys: usize,
    pub rows: Vec<RowRef>,
    pub cursor_row: usize,
    /// Index into the visible columns.
    pub cursor_vcol: usize,
    pub top_row: usize,
    pub left_vcol: usize,
    selected: HashMap<RowId, RowRef>,
    pub(crate) search: SearchState,
    pub commands: CommandTable,
    /// Visible column index to `(x, width)`, from the last layout pass.
    pub layout: BTreeMap<usize, (usize, usize)>,
}

impl Sheet {
    pub fn new(name: &str, source: Source) -> Self {
        Self {
            id: SheetId::next(),
            name: name.replace(' ', "_"),
            source,
            kind: SheetKind::Table,
            columns: Vec::new(),
            n_keys: 0,
            rows: Vec::new(),
            cursor_row: 0,
            cursor_vcol: 0,
            top_row: 0,
            left_vcol: 0,
            selected: HashMap::new(),
            search: SearchState::default(),
            commands: CommandTable::base(),
            layout: BTreeMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: SheetKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>, n_keys: usize) -> Self {
        self.n_keys = n_keys.min(columns.len());
        self.columns = columns;
        self
    }

    pub fn with_rows(mut self, rows: Vec<RowRef>) -> Self {
        self.rows = rows;
        self
    }

    /// A new sheet over `rows` with this sheet's columns and bindings.
    pub fn derive(&self, name: &str, rows: Vec<RowRef>) -> Sheet {
        let mut sheet = Sheet::new(name, Source::Sheet(self.id))
            .with_columns(self.columns.clone(), self.n_keys)
            .with_rows(rows);
        sheet.commands = self.commands.clone();
        if let SheetKind::Join(kind) = self.kind {
            sheet.kind = SheetKind::Join(kind);
        }
        sheet
    }

    pub fn id(&self) -> SheetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.replace(' ', "_");
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Indices into `columns` of the non-hidden columns.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_hidden())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| !c.is_hidden()).collect()
    }

    pub fn n_visible_cols(&self) -> usize {
        self.columns.iter().filter(|c| !c.is_hidden()).count()
    }

    pub fn key_columns(&self) -> &[Column] {
        &self.columns[..self.n_keys.min(self.columns.len())]
    }

    pub fn key_col_names(&self, sep: &str) -> String {
        self.key_columns()
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Index into `columns` of the cursor column.
    pub fn cursor_col_index(&self) -> Option<usize> {
        self.visible_indices().get(self.cursor_vcol).copied()
    }

    pub fn cursor_column(&self) -> Result<&Column> {
        let idx = self
            .cursor_col_index()
            .ok_or_else(|| TabscopeError::user("no columns"))?;
        Ok(&self.columns[idx])
    }

    pub fn cursor_column_mut(&mut self) -> Result<&mut Column> {
        let idx = self
            .cursor_col_index()
            .ok_or_else(|| TabscopeError::user("no columns"))?;
        Ok(&mut self.columns[idx])
    }

    pub fn cursor_row_ref(&self) -> Result<RowRef> {
        self.rows
            .get(self.cursor_row)
            .cloned()
            .ok_or_else(|| TabscopeError::user("no rows"))
    }

    /// Coerced value of the cursor cell.
    pub fn cursor_value(&self, env: &Env) -> Result<Value> {
        let row = self.cursor_row_ref()?;
        self.cursor_column()?.get_value(&row, env)
    }

    pub fn cell_value(&self, row_idx: usize, col_idx: usize, env: &Env) -> Result<Value> {
        let row = self
            .rows
            .get(row_idx)
            .ok_or_else(|| TabscopeError::user(format!("no row {}", row_idx)))?;
        let col = self
            .columns
            .get(col_idx)
            .ok_or_else(|| TabscopeError::user(format!("no column {}", col_idx)))?;
        col.get_value(row, env)
    }

    /// Rows in the current vertical page.
    pub fn visible_rows(&self, screen: Screen) -> &[RowRef] {
        let start = self.top_row.min(self.rows.len());
        let end = (start + screen.n_visible_rows()).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn status_summary(&self) -> String {
        format!(
            "row {}/{} ({} selected); {}/{} columns visible",
            self.cursor_row,
            self.rows.len(),
            self.selected.len(),
            self.n_visible_cols(),
            self.columns.len()
        )
    }

    pub fn cursor_down(&mut self, n: isize) {
        self.cursor_row = self.cursor_row.saturating_add_signed(n);
    }

    pub fn cursor_right(&mut self, n: isize) {
        self.cursor_vcol = self.cursor_vcol.saturating_add_signed(n);
    }

    // Selection

    pub fn is_selected(&self, row: &RowRef) -> bool {
        self.selected.contains_key(&row.id())
    }

    /// Number of selected row ids, including ids of rows since deleted.
    pub fn n_selected(&self) -> usize {
        self.selected.len()
    }

    /// Selected rows still present, in row order.
    pub fn selected_rows(&self) -> Vec<RowRef> {
        self.rows
            .iter()
            .filter(|r| self.selected.contains_key(&r.id()))
            .cloned()
            .collect()
    }

    pub fn toggle(&mut self, rows: &[RowRef]) {
        for row in rows {
            if self.selected.remove(&row.id()).is_none() {
                self.selected.insert(row.id(), row.clone());
            }
        }
    }

    /// Select `rows`, returning how many were newly selected.
    pub fn select(&mut self, rows: &[RowRef], env: &Env) -> usize {
        let before = self.selected.len();
        for row in rows {
            self.selected.insert(row.id(), row.clone());
        }
        let delta = self.selected.len() - before;
        env.status(format!("selected {}/{} rows", delta, rows.len()));
        delta
    }

    /// Unselect `rows`, returning how many were previously selected.
    pub fn unselect(&mut self, rows: &[RowRef], env: &Env) -> usize {
        let before = self.selected.len();
        for row in rows {
            self.selected.remove(&row.id());
        }
        let delta = before - self.selected.len();
        env.status(format!("unselected {}/{} rows", delta, rows.len()));
        delta
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // Row and column structure

    pub fn delete_current_row(&mut self) -> Result<RowRef> {
        if self.cursor_row >= self.rows.len() {
            return Err(TabscopeError::user("no rows"));
        }
        Ok(self.rows.remove(self.cursor_row))
    }

    /// Remove every selected row and clear the selection.
    pub fn delete_selected(&mut self, env: &Env) -> usize {
        let before = self.rows.len();
        let selected = std::mem::take(&mut self.selected);
        self.rows.retain(|r| !selected.contains_key(&r.id()));
        let deleted = before - self.rows.len();
        env.status(format!("deleted {} rows", deleted));
        deleted
    }

    /// Insert a copy of the cursor row above it; the cursor lands on the copy.
    pub fn duplicate_current_row(&mut self) -> Result<RowRef> {
        let copy = self.cursor_row_ref()?.duplicate();
        self.rows.insert(self.cursor_row, copy.clone());
        Ok(copy)
    }

    pub fn move_row(&mut self, from: usize, to: usize) -> Result<usize> {
        if from >= self.rows.len() {
            return Err(TabscopeError::user("no rows"));
        }
        Ok(move_item(&mut self.rows, from, to))
    }

    /// Move a visible column to another visible position, returning the new
    /// visible index.
    pub fn move_visible_column(&mut self, from: usize, to: usize) -> Result<usize> {
        let visible = self.visible_indices();
        if visible.is_empty() {
            return Err(TabscopeError::user("no columns"));
        }
        let from_v = from.min(visible.len() - 1);
        let to_v = to.min(visible.len() - 1);
        move_item(&mut self.columns, visible[from_v], visible[to_v]);
        Ok(to_v)
    }

    /// Make column `idx` a key column, or stop it being one. Key columns
    /// stay a contiguous prefix.
    pub fn toggle_key_column(&mut self, idx: usize) -> Result<()> {
        if idx >= self.columns.len() {
            return Err(TabscopeError::user(format!("no column {}", idx)));
        }
        if idx >= self.n_keys {
            move_item(&mut self.columns, idx, self.n_keys);
            self.n_keys += 1;
        } else {
            self.n_keys -= 1;
            move_item(&mut self.columns, idx, self.n_keys);
        }
        Ok(())
    }

    /// Insert `col` at `idx` (clamped), returning where it landed.
    pub fn add_column(&mut self, idx: usize, col: Column) -> usize {
        let idx = idx.min(self.columns.len());
        self.columns.insert(idx, col);
        idx
    }

    /// Index into `columns` of the column called `name`.
    pub fn find_col_idx(&self, name: &str, env: &Env) -> Result<usize> {
        find_named(self.columns.iter().map(|c| c.name()), name, env)
    }

    /// Visible index of the column called `name`.
    pub fn find_visible_col_idx(&self, name: &str, env: &Env) -> Result<usize> {
        find_named(self.visible_columns().into_iter().map(|c| c.name()), name, env)
    }

    // Column edits

    pub fn set_cursor_type(&mut self, ty: ColumnType) -> Result<()> {
        self.cursor_column_mut()?.ty = ty;
        Ok(())
    }

    /// Set column kinds from the cursor row's raw values.
    pub fn detect_types(&mut self, all: bool, env: &Env) -> Result<()> {
        let row = self.cursor_row_ref()?;
        let targets = match all {
            true => self.visible_indices(),
            false => self.cursor_col_index().into_iter().collect(),
        };
        for idx in targets {
            let raw = self.columns[idx].raw_value(&row, env)?;
            self.columns[idx].ty = detect_type(&raw);
        }
        Ok(())
    }

    pub fn hide_cursor_column(&mut self) -> Result<()> {
        self.cursor_column_mut()?.width = Some(0);
        Ok(())
    }

    /// Fit column widths to the rows on screen.
    pub fn fit_widths(&mut self, all: bool, screen: Screen, env: &Env) -> Result<()> {
        let targets = match all {
            true => self.visible_indices(),
            false => self.cursor_col_index().into_iter().collect(),
        };
        let rows = self.visible_rows(screen).to_vec();
        for idx in targets {
            let width = self.columns[idx].max_width(&rows, screen.width, env);
            self.columns[idx].width = Some(width);
        }
        Ok(())
    }

    /// Rename columns after their displayed value in the cursor row.
    pub fn rename_from_cursor_row(&mut self, all: bool, env: &Env) -> Result<()> {
        let row = self.cursor_row_ref()?;
        let targets = match all {
            true => self.visible_indices(),
            false => self.cursor_col_index().into_iter().collect(),
        };
        for idx in targets {
            let name = self.columns[idx].display_text(&row, env);
            self.columns[idx].set_name(&name);
        }
        Ok(())
    }

    /// Convert `text` to the cursor column's kind and store it in the cursor
    /// row.
    pub fn set_cursor_text(&mut self, text: &str) -> Result<()> {
        let row = self.cursor_row_ref()?;
        let col = self.cursor_column()?;
        let value = match col.ty {
            ColumnType::Any | ColumnType::Str => Value::Str(text.to_string()),
            ty => ty.coerce(&Value::from(text))?,
        };
        col.set_value(&row, value)
    }

    /// Stable sort by the cursor column's coerced values.
    pub fn sort(&mut self, descending: bool, env: &Env) -> Result<()> {
        let col = self.cursor_column()?;
        let mut keyed = self
            .rows
            .iter()
            .map(|r| Ok((col.get_value(r, env)?, r.clone())))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|(a, _), (b, _)| match descending {
            true => b.total_cmp(a),
            false => a.total_cmp(b),
        });
        self.rows = keyed.into_iter().map(|(_, r)| r).collect();
        Ok(())
    }

    pub fn skip_down(&mut self, env: &Env) -> Result<()> {
        let col = self.cursor_column()?.clone();
        let current = self.cursor_value(env)?;
        for i in self.cursor_row + 1..self.rows.len() {
            if col.get_value(&self.rows[i], env)? != current {
                self.cursor_row = i;
                return Ok(());
            }
        }
        env.status("no different value down this column");
        Ok(())
    }

    pub fn skip_up(&mut self, env: &Env) -> Result<()> {
        let col = self.cursor_column()?.clone();
        let current = self.cursor_value(env)?;
        for i in (0..self.cursor_row).rev() {
            if col.get_value(&self.rows[i], env)? != current {
                self.cursor_row = i;
                return Ok(());
            }
        }
        env.status("no different value up this column");
        Ok(())
    }

    /// Replace rows and columns from a fresh load, keeping identity,
    /// bindings and cursor.
    pub fn reload_from(&mut self, fresh: Sheet) {
        self.columns = fresh.columns;
        self.n_keys = fresh.n_keys;
        self.rows = fresh.rows;
        self.kind = fresh.kind;
        self.layout.clear();
    }
}

fn find_named<'a>(names: impl Iterator<Item = &'a str>, name: &str, env: &Env) -> Result<usize> {
    let hits: Vec<usize> = names
        .enumerate()
        .filter(|(_, n)| *n == name)
        .map(|(i, _)| i)
        .collect();
    match hits.as_slice() {
        [] => Err(TabscopeError::user(format!("no column named \"{}\"", name))),
        [only] => Ok(*only),
        [first, ..] => {
            env.status(format!("{} columns named \"{}\"", hits.len(), name));
            Ok(*first)
        }
    }
}

/// Remove the item at `from` and insert it at `to` (clamped), returning its
/// new position.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> usize {
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    to
}
