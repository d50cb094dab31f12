//! Application state and command execution.
//!
//! The [`App`] owns the sheet stack (front sheet at index 0), the shared
//! [`Env`] with options and the status/error logs, and the key dispatcher.
//! Every key is resolved against the front sheet's command table; commands
//! that need text open an [`InputLine`] and run when it is submitted.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tabscope_core::meta::{
    columns_sheet, edit_source_column, help_sheet, options_sheet, refresh_columns_sheet,
    refresh_sheets_sheet, sheet_entries, sheet_ids, sheets_sheet, source_column_index, text_sheet,
};
use tabscope_core::storage::dive;
use tabscope_core::{
    Column, Command, CommandTable, Dispatcher, Env, ExprEngine, Options, Resolution,
    RowRef, Screen, Sheet, SheetId, SheetKind, Source, TabscopeError, frequency_sheet,
    join_sheets, open_group, open_path, save_sheet, search_regex,
};
use tabscope_engine::detect_type;

use super::actions::{ApplyResult, InputLine};
use crate::error::{AppError, Result};

pub const VERSION_STATUS: &str = concat!("tabscope v", env!("CARGO_PKG_VERSION"));

pub struct App {
    /// Front sheet first.
    pub stack: Vec<Sheet>,
    pub env: Env,
    pub engine: Rc<ExprEngine>,
    pub dispatcher: Dispatcher,
    pub screen: Screen,
    /// Extra bindings from the config file, added to every pushed sheet.
    pub bindings: CommandTable,
    /// Open prompt, if a command is waiting for text.
    pub input: Option<InputLine>,
    /// Messages shown on the status line until the next key.
    pub status_line: Vec<String>,
    pub last_key: String,
}

impl App {
    pub fn new(options: Options, bindings: CommandTable) -> Self {
        let env = Env::new(options);
        env.status(VERSION_STATUS);
        let mut app = Self {
            stack: Vec::new(),
            env,
            engine: Rc::new(ExprEngine::new()),
            dispatcher: Dispatcher::new(),
            screen: Screen::default(),
            bindings,
            input: None,
            status_line: Vec::new(),
            last_key: String::new(),
        };
        app.collect_status();
        app
    }

    /// Open each file in order; the first ends up in front. Load failures
    /// are reported and skipped.
    pub fn with_files(options: Options, bindings: CommandTable, files: &[PathBuf]) -> Self {
        let mut app = Self::new(options, bindings);
        for path in files.iter().rev() {
            match open_path(path, None, &app.env.options) {
                Ok(sheet) => app.push_sheet(sheet),
                Err(e) => app.report_error(&format!("open {}", path.display()), &e.into()),
            }
        }
        app.collect_status();
        app
    }

    pub fn sheet(&self) -> Option<&Sheet> {
        self.stack.first()
    }

    fn front(&self) -> Result<&Sheet> {
        self.stack.first().ok_or_else(|| TabscopeError::user("no sheets").into())
    }

    fn front_mut(&mut self) -> Result<&mut Sheet> {
        self.stack
            .first_mut()
            .ok_or_else(|| TabscopeError::user("no sheets").into())
    }

    fn position(&self, id: SheetId) -> Option<usize> {
        self.stack.iter().position(|s| s.id() == id)
    }

    /// Put `sheet` in front. A sheet already on the stack moves to the front
    /// instead of appearing twice.
    pub fn push_sheet(&mut self, mut sheet: Sheet) {
        if let Some(idx) = self.position(sheet.id()) {
            let existing = self.stack.remove(idx);
            self.stack.insert(0, existing);
            return;
        }
        for binding in self.bindings.iter() {
            sheet.commands.bind(&binding.prefix, &binding.key, binding.command);
        }
        tracing::debug!(sheet = sheet.name(), depth = self.stack.len() + 1, "push");
        self.stack.insert(0, sheet);
        self.check_cursor();
    }

    fn move_to_front(&mut self, id: SheetId) -> Result<()> {
        let idx = self
            .position(id)
            .ok_or_else(|| TabscopeError::user("sheet is gone"))?;
        let sheet = self.stack.remove(idx);
        self.stack.insert(0, sheet);
        Ok(())
    }

    pub fn check_cursor(&mut self) {
        let screen = self.screen;
        if let Some(sheet) = self.stack.first_mut() {
            sheet.check_cursor(screen, &self.env);
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.screen = Screen::new(width, height);
        self.check_cursor();
    }

    /// Move the cursor to the row drawn on screen line `y`. Line 0 is the
    /// header.
    pub fn click(&mut self, y: usize) {
        if let Some(sheet) = self.stack.first_mut() {
            sheet.cursor_row = (sheet.top_row + y).saturating_sub(1);
        }
        self.check_cursor();
    }

    /// Move pending status messages onto the status line.
    pub fn collect_status(&mut self) {
        self.status_line = self.env.status.take();
    }

    /// Handle one key press by name.
    pub fn handle_key(&mut self, key: &str) -> Result<ApplyResult> {
        self.last_key = key.to_string();
        let Some(sheet) = self.stack.first() else {
            return Ok(ApplyResult::Quit);
        };
        let result = match self.dispatcher.resolve(&sheet.commands, key) {
            Resolution::Pending(_) => Ok(ApplyResult::Continue),
            Resolution::Run(command) => self.execute(command),
            Resolution::Unbound { key, prefix } => {
                self.env.status(format!(
                    "no command for key \"{}\" with prefixes \"{}\"",
                    key, prefix
                ));
                Ok(ApplyResult::Continue)
            }
        };
        self.check_cursor();
        self.collect_status();
        result
    }

    /// Run `command`, or open its prompt when it needs text.
    pub fn execute(&mut self, command: Command) -> Result<ApplyResult> {
        if let Some(label) = command.prompt() {
            let initial = match self.prompt_initial(command) {
                Ok(initial) => initial,
                Err(e) => return self.fail(command, e),
            };
            self.input = Some(InputLine::new(command, label, initial));
            return Ok(ApplyResult::Continue);
        }
        self.finish(command, None)
    }

    /// Run a prompting command with the submitted text.
    pub fn submit_input(&mut self, command: Command, text: &str) -> Result<ApplyResult> {
        self.input = None;
        let result = self.finish(command, Some(text));
        self.check_cursor();
        self.collect_status();
        result
    }

    /// Close the prompt without running its command.
    pub fn cancel_input(&mut self, key: &str) {
        self.input = None;
        self.dispatcher.reset();
        self.env.status(key);
        self.collect_status();
    }

    fn prompt_initial(&self, command: Command) -> Result<String> {
        let text = match command {
            Command::EditCell => {
                let sheet = self.front()?;
                let row = sheet.cursor_row_ref()?;
                sheet.cursor_column()?.display_text(&row, &self.env)
            }
            Command::SetSourceFormat => match &self.front()?.source {
                Source::Path { format, .. } => format.clone().unwrap_or_default(),
                _ => String::new(),
            },
            _ => String::new(),
        };
        Ok(text)
    }

    fn finish(&mut self, command: Command, input: Option<&str>) -> Result<ApplyResult> {
        match self.run(command, input.unwrap_or_default()) {
            Ok(result) => Ok(result),
            Err(e) => self.fail(command, e),
        }
    }

    /// Record a failed command. In debug mode the error ends the loop.
    fn fail(&mut self, command: Command, e: AppError) -> Result<ApplyResult> {
        if let AppError::Aborted(_) = e {
            return Err(e);
        }
        self.report_error(&command.name(), &e);
        if self.env.options.debug {
            return Err(e);
        }
        Ok(ApplyResult::Continue)
    }

    fn report_error(&self, what: &str, e: &AppError) {
        tracing::warn!(command = what, error = %e, "command failed");
        self.env.errors.record(format!("{}: {}", what, e));
        let text = e.to_string();
        self.env.status(text.lines().last().unwrap_or_default());
        self.env.status(what.to_string());
    }

    fn run(&mut self, command: Command, input: &str) -> Result<ApplyResult> {
        use Command::*;
        let screen = self.screen;
        match command {
            Prefix(_) => {}
            Help => {
                let sheet = self.front()?;
                let help = help_sheet(sheet.name(), &sheet.commands);
                self.push_sheet(help);
            }
            Quit => {
                if !self.stack.is_empty() {
                    self.stack.remove(0);
                }
                if self.stack.is_empty() {
                    return Ok(ApplyResult::Quit);
                }
            }
            QuitAll => {
                self.stack.clear();
                return Ok(ApplyResult::Quit);
            }

            CursorLeft => self.front_mut()?.cursor_right(-1),
            CursorRight => self.front_mut()?.cursor_right(1),
            CursorUp => self.front_mut()?.cursor_down(-1),
            CursorDown => self.front_mut()?.cursor_down(1),
            PageDown => self.front_mut()?.page_down(screen),
            PageUp => self.front_mut()?.page_up(screen),
            GoTop => {
                let sheet = self.front_mut()?;
                sheet.cursor_row = 0;
                sheet.top_row = 0;
            }
            GoBottom => {
                let sheet = self.front_mut()?;
                sheet.cursor_row = sheet.n_rows().saturating_sub(1);
            }
            GoLeftmost => {
                let sheet = self.front_mut()?;
                sheet.cursor_vcol = 0;
                sheet.left_vcol = 0;
            }
            GoRightmost => {
                let sheet = self.front_mut()?;
                sheet.cursor_vcol = sheet.n_visible_cols().saturating_sub(1);
            }

            MoveColumnLeft => self.move_column(|v| v.saturating_sub(1))?,
            MoveColumnRight => self.move_column(|v| v + 1)?,
            MoveColumnFirst => self.move_column(|_| 0)?,
            MoveColumnLast => self.move_column(|_| usize::MAX)?,
            MoveRowUp => self.move_row(|r| r.saturating_sub(1))?,
            MoveRowDown => self.move_row(|r| r + 1)?,
            MoveRowTop => self.move_row(|_| 0)?,
            MoveRowBottom => self.move_row(|_| usize::MAX)?,

            SheetInfo => {
                let summary = self.front()?.status_summary();
                self.env.status(summary);
            }
            PreviousStatus => {
                if let Some(previous) = self.env.status.latest() {
                    self.env.status(previous);
                }
            }
            StatusHistory => {
                let sheet = text_sheet("statuses", self.env.status.history());
                self.push_sheet(sheet);
            }
            Version => self.env.status(VERSION_STATUS),

            ScrollTop => self.front_mut()?.scroll_cursor_to_top(),
            ScrollMiddle => self.front_mut()?.scroll_cursor_to_middle(screen),
            ScrollBottom => self.front_mut()?.scroll_cursor_to_bottom(screen),
            SkipUp => {
                let env = &self.env;
                self.stack
                    .first_mut()
                    .ok_or_else(|| TabscopeError::user("no sheets"))?
                    .skip_up(env)?;
            }
            SkipDown => {
                let env = &self.env;
                self.stack
                    .first_mut()
                    .ok_or_else(|| TabscopeError::user("no sheets"))?
                    .skip_down(env)?;
            }

            FitWidth | FitAllWidths => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    sheet.fit_widths(command == FitAllWidths, screen, env)?;
                }
            }
            HideColumn => self.front_mut()?.hide_cursor_column()?,
            RenameFromCell | RenameAllFromCell => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    sheet.rename_from_cursor_row(command == RenameAllFromCell, env)?;
                }
            }
            ToggleKey => {
                let sheet = self.front_mut()?;
                let idx = sheet
                    .cursor_col_index()
                    .ok_or_else(|| TabscopeError::user("no columns"))?;
                sheet.toggle_key_column(idx)?;
            }
            SetType(ty) => self.front_mut()?.set_cursor_type(ty)?,
            DetectType | DetectAllTypes => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    sheet.detect_types(command == DetectAllTypes, env)?;
                }
            }
            SortAsc | SortDesc => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    sheet.sort(command == SortDesc, env)?;
                }
            }

            AbortWithError => {
                self.env.options.debug = true;
                let last = self.env.errors.last().unwrap_or_else(|| "no error".to_string());
                return Err(AppError::Aborted(last));
            }
            ToggleDebug => {
                self.env.options.debug = !self.env.options.debug;
                let state = if self.env.options.debug { "ON" } else { "OFF" };
                self.env.status(format!("debug {}", state));
            }
            LastError => match self.env.errors.last() {
                Some(last) => {
                    let sheet = text_sheet("last_error", last.lines().map(str::to_string));
                    self.push_sheet(sheet);
                }
                None => self.env.status("no errors"),
            },
            AllErrors => {
                let lines: Vec<String> = self
                    .env
                    .errors
                    .all()
                    .iter()
                    .flat_map(|e| e.lines().map(str::to_string).chain([String::new()]))
                    .collect();
                self.push_sheet(text_sheet("errors", lines));
            }

            Frequency => {
                let sheet = self.front()?;
                let idx = sheet
                    .cursor_col_index()
                    .ok_or_else(|| TabscopeError::user("no columns"))?;
                let freq = frequency_sheet(sheet, idx, &self.env)?;
                self.push_sheet(freq);
            }
            DeleteRow => {
                self.front_mut()?.delete_current_row()?;
            }
            DeleteSelected => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    sheet.delete_selected(env);
                }
            }
            DuplicateRow => {
                self.front_mut()?.duplicate_current_row()?;
            }

            SheetsSheet => self.open_sheets_sheet(),
            ColumnsSheet => {
                let sheet = columns_sheet(self.front()?, &self.env);
                self.push_sheet(sheet);
            }
            OptionsSheet => {
                let sheet = options_sheet(&self.env.options);
                self.push_sheet(sheet);
            }

            Search {
                backward,
                all_columns,
            } => {
                let columns = self.target_columns(all_columns)?;
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    search_regex(sheet, Some(input), Some(columns), backward, true, env)?;
                }
            }
            NextMatch | PrevMatch => {
                let columns = self.target_columns(false)?;
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    search_regex(sheet, None, Some(columns), command == PrevMatch, true, env)?;
                }
            }
            FirstMatch | LastMatch => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    let found = search_regex(sheet, None, None, false, false, env)?;
                    let target = match command {
                        FirstMatch => found.matches.iter().min(),
                        _ => found.matches.iter().max(),
                    };
                    if let Some(row) = target {
                        sheet.cursor_row = *row;
                    }
                }
            }

            ToggleRow | SelectRow | UnselectRow => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    let row = [sheet.cursor_row_ref()?];
                    match command {
                        ToggleRow => sheet.toggle(&row),
                        SelectRow => {
                            sheet.select(&row, env);
                        }
                        _ => {
                            sheet.unselect(&row, env);
                        }
                    }
                    sheet.cursor_down(1);
                }
            }
            ToggleAll => {
                let sheet = self.front_mut()?;
                let rows = sheet.rows.clone();
                sheet.toggle(&rows);
            }
            SelectAll => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    let rows = sheet.rows.clone();
                    sheet.select(&rows, env);
                }
            }
            UnselectAll => {
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    let rows = sheet.rows.clone();
                    sheet.unselect(&rows, env);
                    sheet.clear_selection();
                }
            }
            SelectRegex { all_columns } | UnselectRegex { all_columns } => {
                let columns = self.target_columns(all_columns)?;
                let env = &self.env;
                if let Some(sheet) = self.stack.first_mut() {
                    let found = search_regex(sheet, Some(input), Some(columns), false, false, env)?;
                    let rows: Vec<RowRef> =
                        found.matches.iter().map(|i| sheet.rows[*i].clone()).collect();
                    match command {
                        SelectRegex { .. } => sheet.select(&rows, env),
                        _ => sheet.unselect(&rows, env),
                    };
                }
            }

            Reload => self.reload(None)?,
            Save => {
                let path = non_empty(input, "no filename")?;
                save_sheet(self.front()?, Path::new(path), &self.env)?;
            }
            Open => {
                let path = non_empty(input, "no filename")?;
                let sheet = open_path(Path::new(path), None, &self.env.options)?;
                self.push_sheet(sheet);
            }
            SetSourceFormat => self.reload(Some(input.trim()))?,

            EditCell => self.edit_cell(input)?,
            GotoColumn => {
                let idx = self.front()?.find_visible_col_idx(input.trim(), &self.env)?;
                self.front_mut()?.cursor_vcol = idx;
            }
            GotoRow => {
                let row: usize = input
                    .trim()
                    .parse()
                    .map_err(|_| TabscopeError::user(format!("not a row number: {}", input)))?;
                self.front_mut()?.cursor_row = row;
            }
            AddExprColumn | AddRegexColumn => {
                let engine = Rc::clone(&self.engine);
                let sheet = self.front_mut()?;
                let siblings = sheet.columns.clone();
                let column = match command {
                    AddExprColumn => Column::expr(siblings, engine, input)?,
                    _ => Column::regex(siblings, engine, input)?,
                };
                let at = sheet.cursor_col_index().map_or(sheet.columns.len(), |i| i + 1);
                sheet.add_column(at, column);
                if sheet.n_visible_cols() > 1 {
                    sheet.cursor_vcol += 1;
                }
            }

            SwapSheets => {
                if self.stack.len() < 2 {
                    return Err(TabscopeError::user("no previous sheet").into());
                }
                self.stack.swap(0, 1);
            }
            CycleSheets if !self.stack.is_empty() => self.stack.rotate_left(1),
            CycleSheetsBack if !self.stack.is_empty() => self.stack.rotate_right(1),
            CycleSheets | CycleSheetsBack => {}

            GotoSheet => {
                let sheet = self.front()?;
                let row = sheet.cursor_row_ref()?;
                let id = sheet_ids(sheet, &[row])
                    .first()
                    .copied()
                    .ok_or_else(|| TabscopeError::user("sheet is gone"))?;
                let own = sheet.id();
                self.move_to_front(id)?;
                if let Some(idx) = self.position(own) {
                    self.stack.remove(idx);
                }
            }
            JoinSelected(kind) => {
                let sheet = self.front()?;
                let ids = sheet_ids(sheet, &sheet.selected_rows());
                if ids.is_empty() {
                    return Err(TabscopeError::user("no sheets selected").into());
                }
                let sources = ids
                    .iter()
                    .map(|id| {
                        self.stack
                            .iter()
                            .find(|s| s.id() == *id)
                            .ok_or_else(|| TabscopeError::user("sheet is gone"))
                    })
                    .collect::<std::result::Result<Vec<&Sheet>, TabscopeError>>()?;
                let joined = join_sheets(&sources, kind, &self.env)?;
                self.stack.remove(0);
                self.push_sheet(joined);
            }

            SourceColumnType(_)
            | SourceColumnDetect
            | SourceColumnKey
            | SourceColumnHide
            | SourceColumnFit => self.source_column_command(command)?,

            ToggleGroup | SelectGroup | UnselectGroup => {
                let env = &self.env;
                let (freq, source) = front_and_source(&mut self.stack)?;
                let members = freq.cursor_row_ref()?.members();
                match command {
                    ToggleGroup => source.toggle(&members),
                    SelectGroup => {
                        source.select(&members, env);
                    }
                    _ => {
                        source.unselect(&members, env);
                    }
                }
                freq.cursor_down(1);
            }
            OpenGroup => {
                let (freq, source) = front_and_source(&mut self.stack)?;
                let sheet = open_group(source, freq, &self.env)?;
                self.push_sheet(sheet);
            }

            Dive => {
                let sheet = dive(self.front()?, &self.env)?;
                self.push_sheet(sheet);
            }
            OpenEntry => {
                let sheet = self.front()?;
                let dir = match &sheet.source {
                    Source::Path { path, .. } => path.clone(),
                    _ => return Err(TabscopeError::user("not a directory listing").into()),
                };
                let row = sheet.cursor_row_ref()?;
                let name = first_column(sheet)?.display_text(&row, &self.env);
                let opened = open_path(&dir.join(name), None, &self.env.options)?;
                self.push_sheet(opened);
            }
        }
        Ok(ApplyResult::Continue)
    }

    fn move_column(&mut self, to: impl Fn(usize) -> usize) -> Result<()> {
        let sheet = self.front_mut()?;
        let from = sheet.cursor_vcol;
        sheet.cursor_vcol = sheet.move_visible_column(from, to(from))?;
        Ok(())
    }

    fn move_row(&mut self, to: impl Fn(usize) -> usize) -> Result<()> {
        let sheet = self.front_mut()?;
        let from = sheet.cursor_row;
        sheet.cursor_row = sheet.move_row(from, to(from))?;
        Ok(())
    }

    /// The cursor column, or every visible column.
    fn target_columns(&self, all: bool) -> Result<Vec<Column>> {
        let sheet = self.front()?;
        if all {
            return Ok(sheet.visible_columns().into_iter().cloned().collect());
        }
        Ok(vec![sheet.cursor_column()?.clone()])
    }

    /// Bring the sheets sheet to front, listing the current stack.
    fn open_sheets_sheet(&mut self) {
        let existing = self
            .stack
            .iter()
            .find(|s| matches!(s.kind, SheetKind::Sheets { .. }))
            .map(Sheet::id);
        match existing {
            Some(id) => {
                let idx = self.position(id).unwrap_or(0);
                let sheet = self.stack.remove(idx);
                self.stack.insert(0, sheet);
            }
            None => self.push_sheet(sheets_sheet(Vec::new())),
        }
        let entries = sheet_entries(&self.stack, &self.env);
        refresh_sheets_sheet(&mut self.stack[0], entries);
    }

    /// Reload the front sheet from its file, optionally switching format.
    fn reload(&mut self, format: Option<&str>) -> Result<()> {
        let sheet = self.front()?;
        let (path, current) = match &sheet.source {
            Source::Path { path, format } => (path.clone(), format.clone()),
            _ => return Err(TabscopeError::user("sheet has no file to reload").into()),
        };
        let format = match format {
            Some(f) if !f.is_empty() => Some(f.to_string()),
            _ => current,
        };
        let fresh = open_path(&path, format.as_deref(), &self.env.options)?;
        let sheet = self.front_mut()?;
        sheet.source = fresh.source.clone();
        sheet.reload_from(fresh);
        self.env.status("reloaded");
        Ok(())
    }

    fn edit_cell(&mut self, text: &str) -> Result<()> {
        let kind = self.front()?.kind.clone();
        match kind {
            SheetKind::Options => {
                let sheet = self.front()?;
                let row = sheet.cursor_row_ref()?;
                let name = first_column(sheet)?.display_text(&row, &self.env);
                self.env.options.set(&name, text)?;
                let fresh = options_sheet(&self.env.options);
                self.front_mut()?.rows = fresh.rows;
            }
            SheetKind::Columns { .. } => {
                let env = &self.env;
                let (columns, source) = front_and_source(&mut self.stack)?;
                let idx = source_column_index(columns)?;
                let field = columns.cursor_column()?.name().to_string();
                edit_source_column(source, idx, &field, text)?;
                refresh_columns_sheet(columns, source, env);
            }
            _ => self.front_mut()?.set_cursor_text(text)?,
        }
        self.env.status(format!("\"{}\"", text));
        Ok(())
    }

    /// Columns sheet commands act on the source column under the cursor.
    fn source_column_command(&mut self, command: Command) -> Result<()> {
        let screen = self.screen;
        let env = &self.env;
        let (columns, source) = front_and_source(&mut self.stack)?;
        let idx = source_column_index(columns)?;
        match command {
            Command::SourceColumnType(ty) => {
                source.columns[idx].ty = ty;
                columns.cursor_down(1);
            }
            Command::SourceColumnDetect => {
                let row = source.cursor_row_ref()?;
                let raw = source.columns[idx].raw_value(&row, env)?;
                source.columns[idx].ty = detect_type(&raw);
                columns.cursor_down(1);
            }
            Command::SourceColumnKey => source.toggle_key_column(idx)?,
            Command::SourceColumnHide => source.columns[idx].width = Some(0),
            Command::SourceColumnFit => {
                let width = source.columns[idx].max_width(&source.rows, screen.width, env);
                source.columns[idx].width = Some(width);
            }
            _ => {}
        }
        refresh_columns_sheet(columns, source, env);
        Ok(())
    }
}

/// Split borrow of the front sheet and its source sheet.
fn front_and_source(stack: &mut [Sheet]) -> Result<(&mut Sheet, &mut Sheet)> {
    let id = match stack.first().map(|s| &s.source) {
        Some(Source::Sheet(id)) => *id,
        _ => return Err(TabscopeError::user("no source sheet").into()),
    };
    let idx = stack
        .iter()
        .position(|s| s.id() == id)
        .filter(|idx| *idx > 0)
        .ok_or_else(|| TabscopeError::user("source sheet is gone"))?;
    let (front, rest) = stack.split_at_mut(1);
    Ok((&mut front[0], &mut rest[idx - 1]))
}

fn first_column(sheet: &Sheet) -> Result<&Column> {
    sheet
        .columns
        .first()
        .ok_or_else(|| TabscopeError::user("no columns").into())
}

fn non_empty<'a>(text: &'a str, msg: &str) -> Result<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TabscopeError::user(msg).into());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabscope_core::{Accessor, Row, Value};

    fn keyed(name: &str, pairs: &[(&str, &str)]) -> Sheet {
        let rows = pairs
            .iter()
            .map(|(k, v)| Row::list(vec![Value::from(*k), Value::from(*v)]))
            .collect();
        Sheet::new(name, Source::None)
            .with_columns(
                vec![
                    Column::new("id", Accessor::index(0)),
                    Column::new(&format!("{}_val", name), Accessor::index(1)),
                ],
                1,
            )
            .with_rows(rows)
    }

    fn app_with(sheets: Vec<Sheet>) -> App {
        let mut app = App::new(Options::default(), CommandTable::new());
        for sheet in sheets.into_iter().rev() {
            app.push_sheet(sheet);
        }
        app
    }

    fn keys(app: &mut App, keys: &[&str]) {
        for key in keys {
            app.handle_key(key).unwrap();
        }
    }

    #[test]
    fn starts_with_version_status() {
        let app = App::new(Options::default(), CommandTable::new());
        assert_eq!(app.status_line, [VERSION_STATUS]);
    }

    #[test]
    fn prefix_waits_for_next_key() {
        let mut app = app_with(vec![keyed("a", &[("1", "x"), ("2", "y"), ("3", "z")])]);
        app.handle_key("g").unwrap();
        assert_eq!(app.dispatcher.prefix(), "g");
        app.handle_key("j").unwrap();
        assert_eq!(app.dispatcher.prefix(), "");
        assert_eq!(app.sheet().unwrap().cursor_row, 2);
    }

    #[test]
    fn unbound_key_reports_key_and_prefix() {
        let mut app = app_with(vec![keyed("a", &[("1", "x")])]);
        keys(&mut app, &["g", "F12"]);
        assert_eq!(
            app.status_line,
            ["no command for key \"F12\" with prefixes \"g\""]
        );
    }

    #[test]
    fn select_moves_cursor_down() {
        let mut app = app_with(vec![keyed("a", &[("1", "x"), ("2", "y")])]);
        keys(&mut app, &["s"]);
        let sheet = app.sheet().unwrap();
        assert!(sheet.is_selected(&sheet.rows[0]));
        assert!(!sheet.is_selected(&sheet.rows[1]));
        assert_eq!(sheet.cursor_row, 1);
        assert_eq!(app.status_line, ["selected 1/1 rows"]);
    }

    #[test]
    fn join_from_sheets_sheet_replaces_it() {
        let a = keyed("a", &[("1", "x"), ("2", "y")]);
        let b = keyed("b", &[("1", "p")]);
        let mut app = app_with(vec![a, b]);
        keys(&mut app, &["S"]);
        assert!(matches!(app.stack[0].kind, SheetKind::Sheets { .. }));
        assert_eq!(app.stack[0].n_rows(), 3);

        keys(&mut app, &["j", "s", "s", "&"]);
        assert_eq!(app.stack.len(), 3);
        let joined = &app.stack[0];
        assert_eq!(joined.name(), "a&b");
        assert_eq!(joined.n_rows(), 1);
        assert!(app.stack.iter().all(|s| !matches!(s.kind, SheetKind::Sheets { .. })));
    }

    #[test]
    fn goto_sheet_drops_the_sheets_sheet() {
        let mut app = app_with(vec![keyed("a", &[("1", "x")]), keyed("b", &[("1", "p")])]);
        keys(&mut app, &["S", "j", "j", "Enter"]);
        let names: Vec<_> = app.stack.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn frequency_group_selects_source_rows() {
        let mut app = app_with(vec![keyed("a", &[("k", "1"), ("k", "2"), ("m", "3")])]);
        keys(&mut app, &["F"]);
        assert_eq!(app.stack[0].kind, SheetKind::Frequency);
        keys(&mut app, &["s"]);
        assert_eq!(app.stack[1].selected_rows().len(), 2);
        assert_eq!(app.stack[0].cursor_row, 1);
    }

    #[test]
    fn edit_prompt_starts_with_cell_text() {
        let mut app = app_with(vec![keyed("a", &[("1", "x")])]);
        keys(&mut app, &["l", "e"]);
        let input = app.input.as_ref().unwrap();
        assert_eq!(input.buffer, "x");

        app.submit_input(Command::EditCell, "zz").unwrap();
        assert!(app.input.is_none());
        let sheet = app.sheet().unwrap();
        assert_eq!(sheet.columns[1].display_text(&sheet.rows[0], &app.env), "zz");
        assert_eq!(app.status_line, ["\"zz\""]);
    }

    #[test]
    fn cancelled_prompt_changes_nothing() {
        let mut app = app_with(vec![keyed("a", &[("1", "x"), ("2", "y")])]);
        keys(&mut app, &["r"]);
        assert!(app.input.is_some());
        app.cancel_input("Esc");
        assert!(app.input.is_none());
        assert_eq!(app.status_line, ["Esc"]);
        assert_eq!(app.sheet().unwrap().cursor_row, 0);
    }

    #[test]
    fn empty_search_repeats_last_pattern() {
        let mut app = app_with(vec![keyed("a", &[("x", "1"), ("y", "2"), ("x", "3"), ("y", "4")])]);
        let search = Command::Search {
            backward: false,
            all_columns: false,
        };
        app.submit_input(search, "x").unwrap();
        assert_eq!(app.sheet().unwrap().cursor_row, 2);
        app.submit_input(search, "").unwrap();
        assert_eq!(app.sheet().unwrap().cursor_row, 0);
    }

    #[test]
    fn failures_are_recorded_unless_debugging() {
        let mut app = app_with(vec![keyed("a", &[("1", "x")])]);
        let result = app.submit_input(Command::GotoRow, "abc").unwrap();
        assert_eq!(result, ApplyResult::Continue);
        assert_eq!(app.env.errors.len(), 1);
        assert_eq!(app.status_line.last().map(String::as_str), Some(&*Command::GotoRow.name()));

        keys(&mut app, &["C-d"]);
        assert_eq!(app.status_line, ["debug ON"]);
        assert!(app.submit_input(Command::GotoRow, "abc").is_err());
    }

    #[test]
    fn abort_reports_last_error() {
        let mut app = app_with(vec![keyed("a", &[("1", "x")])]);
        app.submit_input(Command::GotoRow, "abc").unwrap();
        match app.handle_key("C-e") {
            Err(AppError::Aborted(msg)) => assert!(msg.contains("abc"), "{}", msg),
            other => panic!("expected abort, got {:?}", other.map(|_| ())),
        }
        assert!(app.env.options.debug);
    }

    #[test]
    fn quitting_last_sheet_ends() {
        let mut app = app_with(vec![keyed("a", &[("1", "x")]), keyed("b", &[("1", "p")])]);
        assert_eq!(app.handle_key("q").unwrap(), ApplyResult::Continue);
        assert_eq!(app.handle_key("q").unwrap(), ApplyResult::Quit);
        assert!(app.stack.is_empty());
    }

    #[test]
    fn user_bindings_apply_to_pushed_sheets() {
        let mut bindings = CommandTable::new();
        bindings.bind("", "x", Command::GoBottom);
        let mut app = App::new(Options::default(), bindings);
        app.push_sheet(keyed("a", &[("1", "x"), ("2", "y"), ("3", "z")]));
        keys(&mut app, &["x"]);
        assert_eq!(app.sheet().unwrap().cursor_row, 2);
    }
}
