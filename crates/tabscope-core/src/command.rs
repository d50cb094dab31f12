//! Commands, per-sheet key tables and the prefix dispatcher.
//!
//! Keys are named the way the terminal layer prints them: single characters
//! as themselves, `Space`, `Enter`, `Tab`, `BackTab`, arrows as `Left` etc.,
//! function keys as `F1`, and control chords as `C-g`.

use indexmap::IndexMap;
use std::borrow::Cow;

use tabscope_engine::ColumnType;

use crate::error::{Result, TabscopeError};
use crate::join::JoinKind;

/// Every operation a key can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Append a character to the dispatcher prefix and wait for the next key.
    Prefix(char),

    Help,
    Quit,
    QuitAll,

    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    PageDown,
    PageUp,
    GoTop,
    GoBottom,
    GoLeftmost,
    GoRightmost,

    MoveColumnLeft,
    MoveColumnRight,
    MoveColumnFirst,
    MoveColumnLast,
    MoveRowUp,
    MoveRowDown,
    MoveRowTop,
    MoveRowBottom,

    SheetInfo,
    PreviousStatus,
    StatusHistory,
    Version,

    ScrollTop,
    ScrollMiddle,
    ScrollBottom,
    SkipUp,
    SkipDown,

    FitWidth,
    FitAllWidths,
    HideColumn,
    RenameFromCell,
    RenameAllFromCell,
    ToggleKey,
    SetType(ColumnType),
    DetectType,
    DetectAllTypes,
    SortAsc,
    SortDesc,

    AbortWithError,
    ToggleDebug,
    LastError,
    AllErrors,

    Frequency,
    DeleteRow,
    DeleteSelected,
    DuplicateRow,

    SheetsSheet,
    ColumnsSheet,
    OptionsSheet,

    Search { backward: bool, all_columns: bool },
    NextMatch,
    PrevMatch,
    FirstMatch,
    LastMatch,

    ToggleRow,
    SelectRow,
    UnselectRow,
    ToggleAll,
    SelectAll,
    UnselectAll,
    SelectRegex { all_columns: bool },
    UnselectRegex { all_columns: bool },

    Reload,
    Save,
    Open,
    SetSourceFormat,

    EditCell,
    GotoColumn,
    GotoRow,
    AddExprColumn,
    AddRegexColumn,

    SwapSheets,
    CycleSheets,
    CycleSheetsBack,

    /// Sheets sheet: bring the sheet under the cursor to the front.
    GotoSheet,
    /// Sheets sheet: join the selected sheets.
    JoinSelected(JoinKind),

    /// Columns sheet: act on the source column under the cursor.
    SourceColumnType(ColumnType),
    SourceColumnDetect,
    SourceColumnKey,
    SourceColumnHide,
    SourceColumnFit,

    /// Frequency sheet: act on the source rows of the group under the cursor.
    ToggleGroup,
    SelectGroup,
    UnselectGroup,
    OpenGroup,

    /// Open a sheet over the nested value under the cursor.
    Dive,
    /// Directory sheet: open the file under the cursor.
    OpenEntry,
}

const TYPES: [ColumnType; 5] = [
    ColumnType::Any,
    ColumnType::Int,
    ColumnType::Float,
    ColumnType::Date,
    ColumnType::Str,
];

const JOINS: [JoinKind; 4] = [
    JoinKind::Inner,
    JoinKind::LeftOuter,
    JoinKind::Full,
    JoinKind::Diff,
];

impl Command {
    /// Every command except prefixes, for name lookup.
    pub fn all() -> Vec<Command> {
        use Command::*;
        let mut all = vec![
            Help, Quit, QuitAll, CursorLeft, CursorRight, CursorUp, CursorDown, PageDown,
            PageUp, GoTop, GoBottom, GoLeftmost, GoRightmost, MoveColumnLeft, MoveColumnRight,
            MoveColumnFirst, MoveColumnLast, MoveRowUp, MoveRowDown, MoveRowTop, MoveRowBottom,
            SheetInfo, PreviousStatus, StatusHistory, Version, ScrollTop, ScrollMiddle,
            ScrollBottom, SkipUp, SkipDown, FitWidth, FitAllWidths, HideColumn, RenameFromCell,
            RenameAllFromCell, ToggleKey, DetectType, DetectAllTypes, SortAsc, SortDesc,
            AbortWithError, ToggleDebug, LastError, AllErrors, Frequency, DeleteRow,
            DeleteSelected, DuplicateRow, SheetsSheet, ColumnsSheet, OptionsSheet, NextMatch,
            PrevMatch, FirstMatch, LastMatch, ToggleRow, SelectRow, UnselectRow, ToggleAll,
            SelectAll, UnselectAll, Reload, Save, Open, SetSourceFormat, EditCell, GotoColumn,
            GotoRow, AddExprColumn, AddRegexColumn, SwapSheets, CycleSheets, CycleSheetsBack,
            GotoSheet, SourceColumnDetect, SourceColumnKey, SourceColumnHide, SourceColumnFit,
            ToggleGroup, SelectGroup, UnselectGroup, OpenGroup, Dive, OpenEntry,
        ];
        for ty in TYPES {
            all.push(SetType(ty));
            all.push(SourceColumnType(ty));
        }
        for kind in JOINS {
            all.push(JoinSelected(kind));
        }
        for backward in [false, true] {
            for all_columns in [false, true] {
                all.push(Search {
                    backward,
                    all_columns,
                });
            }
        }
        for all_columns in [false, true] {
            all.push(SelectRegex { all_columns });
            all.push(UnselectRegex { all_columns });
        }
        all
    }

    /// Stable name, used in config files and error reports.
    pub fn name(&self) -> Cow<'static, str> {
        use Command::*;
        let name = match self {
            Prefix(c) => return Cow::Owned(format!("prefix_{}", c)),
            SetType(ty) => return Cow::Owned(format!("type_{}", type_name(*ty))),
            SourceColumnType(ty) => return Cow::Owned(format!("source_type_{}", type_name(*ty))),
            JoinSelected(kind) => return Cow::Owned(format!("join_{}", kind.name())),
            Help => "help",
            Quit => "quit",
            QuitAll => "quit_all",
            CursorLeft => "cursor_left",
            CursorRight => "cursor_right",
            CursorUp => "cursor_up",
            CursorDown => "cursor_down",
            PageDown => "page_down",
            PageUp => "page_up",
            GoTop => "go_top",
            GoBottom => "go_bottom",
            GoLeftmost => "go_leftmost",
            GoRightmost => "go_rightmost",
            MoveColumnLeft => "move_column_left",
            MoveColumnRight => "move_column_right",
            MoveColumnFirst => "move_column_first",
            MoveColumnLast => "move_column_last",
            MoveRowUp => "move_row_up",
            MoveRowDown => "move_row_down",
            MoveRowTop => "move_row_top",
            MoveRowBottom => "move_row_bottom",
            SheetInfo => "sheet_info",
            PreviousStatus => "previous_status",
            StatusHistory => "status_history",
            Version => "version",
            ScrollTop => "scroll_top",
            ScrollMiddle => "scroll_middle",
            ScrollBottom => "scroll_bottom",
            SkipUp => "skip_up",
            SkipDown => "skip_down",
            FitWidth => "fit_width",
            FitAllWidths => "fit_all_widths",
            HideColumn => "hide_column",
            RenameFromCell => "rename_from_cell",
            RenameAllFromCell => "rename_all_from_cell",
            ToggleKey => "toggle_key",
            DetectType => "detect_type",
            DetectAllTypes => "detect_all_types",
            SortAsc => "sort_asc",
            SortDesc => "sort_desc",
            AbortWithError => "abort_with_error",
            ToggleDebug => "toggle_debug",
            LastError => "last_error",
            AllErrors => "all_errors",
            Frequency => "frequency",
            DeleteRow => "delete_row",
            DeleteSelected => "delete_selected",
            DuplicateRow => "duplicate_row",
            SheetsSheet => "sheets_sheet",
            ColumnsSheet => "columns_sheet",
            OptionsSheet => "options_sheet",
            Search {
                backward: false,
                all_columns: false,
            } => "search_forward",
            Search {
                backward: true,
                all_columns: false,
            } => "search_backward",
            Search {
                backward: false,
                all_columns: true,
            } => "search_all_forward",
            Search {
                backward: true,
                all_columns: true,
            } => "search_all_backward",
            NextMatch => "next_match",
            PrevMatch => "prev_match",
            FirstMatch => "first_match",
            LastMatch => "last_match",
            ToggleRow => "toggle_row",
            SelectRow => "select_row",
            UnselectRow => "unselect_row",
            ToggleAll => "toggle_all",
            SelectAll => "select_all",
            UnselectAll => "unselect_all",
            SelectRegex { all_columns: false } => "select_regex",
            SelectRegex { all_columns: true } => "select_regex_all",
            UnselectRegex { all_columns: false } => "unselect_regex",
            UnselectRegex { all_columns: true } => "unselect_regex_all",
            Reload => "reload",
            Save => "save",
            Open => "open",
            SetSourceFormat => "set_source_format",
            EditCell => "edit_cell",
            GotoColumn => "goto_column",
            GotoRow => "goto_row",
            AddExprColumn => "add_expr_column",
            AddRegexColumn => "add_regex_column",
            SwapSheets => "swap_sheets",
            CycleSheets => "cycle_sheets",
            CycleSheetsBack => "cycle_sheets_back",
            GotoSheet => "goto_sheet",
            SourceColumnDetect => "source_detect_type",
            SourceColumnKey => "source_toggle_key",
            SourceColumnHide => "source_hide_column",
            SourceColumnFit => "source_fit_width",
            ToggleGroup => "toggle_group",
            SelectGroup => "select_group",
            UnselectGroup => "unselect_group",
            OpenGroup => "open_group",
            Dive => "dive",
            OpenEntry => "open_entry",
        };
        Cow::Borrowed(name)
    }

    pub fn from_name(name: &str) -> Result<Command> {
        let name = name.trim().to_ascii_lowercase();
        if let Some(rest) = name.strip_prefix("prefix_") {
            let mut chars = rest.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(Command::Prefix(c));
            }
        }
        Command::all()
            .into_iter()
            .find(|cmd| cmd.name() == name)
            .ok_or(TabscopeError::UnknownCommand(name))
    }

    /// Label of the input line shown before the command runs, for commands
    /// that take text.
    pub fn prompt(&self) -> Option<&'static str> {
        use Command::*;
        match self {
            Search {
                backward: false, ..
            } => Some("/"),
            Search { backward: true, .. } => Some("?"),
            SelectRegex { .. } => Some("|"),
            UnselectRegex { .. } => Some("\\"),
            Save => Some("save to: "),
            Open => Some("open: "),
            SetSourceFormat => Some("change type to: "),
            EditCell => Some("edit: "),
            GotoColumn => Some("goto column name: "),
            GotoRow => Some("goto row number: "),
            AddExprColumn => Some("new column expr="),
            AddRegexColumn => Some("new column regex:"),
            _ => None,
        }
    }

    pub fn help(&self) -> &'static str {
        use Command::*;
        match self {
            Prefix(_) => "add global prefix",
            Help => "push help sheet",
            Quit => "pop this sheet",
            QuitAll => "pop all sheets (clean exit)",
            CursorLeft => "go one column left",
            CursorRight => "go one column right",
            CursorUp => "go one row up",
            CursorDown => "go one row down",
            PageDown => "scroll one page down",
            PageUp => "scroll one page up",
            GoTop => "go to top row",
            GoBottom => "go to last row",
            GoLeftmost => "go to leftmost column",
            GoRightmost => "go to rightmost column",
            MoveColumnLeft => "move this column one left",
            MoveColumnRight => "move this column one right",
            MoveColumnFirst => "move this column all the way to the left",
            MoveColumnLast => "move this column all the way to the right",
            MoveRowUp => "move this row one up",
            MoveRowDown => "move this row one down",
            MoveRowTop => "move this row all the way to the top",
            MoveRowBottom => "move this row all the way to the bottom",
            SheetInfo => "show this sheet info",
            PreviousStatus => "show previous status line again",
            StatusHistory => "open last 100 statuses",
            Version => "show version information",
            ScrollTop => "scroll cursor row to top of screen",
            ScrollMiddle => "scroll cursor row to middle of screen",
            ScrollBottom => "scroll cursor row to bottom of screen",
            SkipUp => "skip up this column to previous value",
            SkipDown => "skip down this column to next value",
            FitWidth => "set this column width to fit visible cells",
            FitAllWidths => "set width of all columns to fit visible cells",
            HideColumn => "hide this column",
            RenameFromCell => "set this column header to this cell value",
            RenameAllFromCell => "set names of all visible columns to this row",
            ToggleKey => "toggle this column as a key column",
            SetType(ColumnType::Date) => "set column type to ISO8601 datetime",
            SetType(ColumnType::Int) => "set column type to integer",
            SetType(ColumnType::Str) => "set column type to string",
            SetType(ColumnType::Float) => "set column type to float",
            SetType(ColumnType::Any) => "clear column type",
            DetectType => "autodetect type of column by its data",
            DetectAllTypes => "autodetect types of all visible columns by their data",
            SortAsc => "sort by this column ascending",
            SortDesc => "sort by this column descending",
            AbortWithError => "abort and print last error to terminal",
            ToggleDebug => "toggle debug mode",
            LastError => "open most recent error",
            AllErrors => "open last 10 errors",
            Frequency => "open frequency table from values in this column",
            DeleteRow => "delete this row",
            DeleteSelected => "delete all selected rows",
            DuplicateRow => "insert duplicate of this row",
            SheetsSheet => "open Sheet stack",
            ColumnsSheet => "open Columns for this sheet",
            OptionsSheet => "open Options",
            Search {
                backward: false,
                all_columns: false,
            } => "search this column forward for regex",
            Search {
                backward: true,
                all_columns: false,
            } => "search this column backward for regex",
            Search {
                backward: false,
                all_columns: true,
            } => "search regex forward in all visible columns",
            Search {
                backward: true,
                all_columns: true,
            } => "search regex backward in all visible columns",
            NextMatch => "go to next match",
            PrevMatch => "go to previous match",
            FirstMatch => "go to first match",
            LastMatch => "go to last match",
            ToggleRow => "toggle select of this row",
            SelectRow => "select this row",
            UnselectRow => "unselect this row",
            ToggleAll => "toggle select of all rows",
            SelectAll => "select all rows",
            UnselectAll => "unselect all rows",
            SelectRegex { all_columns: false } => "select rows by regex in this column",
            SelectRegex { all_columns: true } => "select rows by regex in all visible columns",
            UnselectRegex { all_columns: false } => "unselect rows by regex in this column",
            UnselectRegex { all_columns: true } => {
                "unselect rows by regex in all visible columns"
            }
            Reload => "reload sheet from source",
            Save => "save this sheet to new file",
            Open => "open local file",
            SetSourceFormat => "set source type of this sheet and reload",
            EditCell => "edit this cell",
            GotoColumn => "goto visible column by name",
            GotoRow => "goto row number",
            AddExprColumn => "add column by expr",
            AddRegexColumn => "add column by regex",
            SwapSheets => "jump to previous sheet",
            CycleSheets => "cycle through sheet stack",
            CycleSheetsBack => "reverse cycle through sheet stack",
            GotoSheet => "go to this sheet",
            JoinSelected(JoinKind::Inner) => "open inner join of selected sheets",
            JoinSelected(JoinKind::LeftOuter) => "open outer join of selected sheets",
            JoinSelected(JoinKind::Full) => "open full join of selected sheets",
            JoinSelected(JoinKind::Diff) => "open diff join of selected sheets",
            SourceColumnType(ColumnType::Date) => "set source column type to datetime",
            SourceColumnType(ColumnType::Int) => "set source column type to integer",
            SourceColumnType(ColumnType::Str) => "set source column type to string",
            SourceColumnType(ColumnType::Float) => "set source column type to decimal",
            SourceColumnType(ColumnType::Any) => "clear source column type",
            SourceColumnDetect => "autodetect type of source column using its data",
            SourceColumnKey => "toggle key column on source sheet",
            SourceColumnHide => "hide column on source sheet",
            SourceColumnFit => "set source column width to max width of its rows",
            ToggleGroup => "toggle these entries",
            SelectGroup => "select these entries",
            UnselectGroup => "unselect these entries",
            OpenGroup => "push new sheet with only this value",
            Dive => "dive into this value",
            OpenEntry => "open file",
        }
    }
}

fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Any => "any",
        other => other.name(),
    }
}

/// One entry of a command table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub prefix: String,
    pub key: String,
    pub command: Command,
}

/// `(prefix, key) -> command`, in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandTable {
    bindings: IndexMap<(String, String), Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bindings every sheet starts with.
    pub fn base() -> Self {
        use Command::*;
        let mut table = Self::new();
        let plain: &[(&str, Command)] = &[
            ("F1", Help),
            ("q", Quit),
            ("Left", CursorLeft),
            ("Down", CursorDown),
            ("Up", CursorUp),
            ("Right", CursorRight),
            ("PageDown", PageDown),
            ("PageUp", PageUp),
            ("Home", GoTop),
            ("End", GoBottom),
            ("h", CursorLeft),
            ("j", CursorDown),
            ("k", CursorUp),
            ("l", CursorRight),
            ("H", MoveColumnLeft),
            ("J", MoveRowDown),
            ("K", MoveRowUp),
            ("L", MoveColumnRight),
            ("C-g", SheetInfo),
            ("C-p", PreviousStatus),
            ("C-v", Version),
            ("t", ScrollTop),
            ("m", ScrollMiddle),
            ("b", ScrollBottom),
            ("<", SkipUp),
            (">", SkipDown),
            ("_", FitWidth),
            ("-", HideColumn),
            ("^", RenameFromCell),
            ("!", ToggleKey),
            ("@", SetType(ColumnType::Date)),
            ("#", SetType(ColumnType::Int)),
            ("$", SetType(ColumnType::Str)),
            ("%", SetType(ColumnType::Float)),
            ("~", DetectType),
            ("[", SortAsc),
            ("]", SortDesc),
            ("C-e", AbortWithError),
            ("C-d", ToggleDebug),
            ("E", LastError),
            ("F", Frequency),
            ("d", DeleteRow),
            ("g", Prefix('g')),
            ("S", SheetsSheet),
            ("C", ColumnsSheet),
            ("O", OptionsSheet),
            (
                "/",
                Search {
                    backward: false,
                    all_columns: false,
                },
            ),
            (
                "?",
                Search {
                    backward: true,
                    all_columns: false,
                },
            ),
            ("n", NextMatch),
            ("p", PrevMatch),
            ("Space", ToggleRow),
            ("s", SelectRow),
            ("u", UnselectRow),
            ("|", SelectRegex { all_columns: false }),
            ("\\", UnselectRegex { all_columns: false }),
            ("R", SetSourceFormat),
            ("C-r", Reload),
            ("C-s", Save),
            ("o", Open),
            ("e", EditCell),
            ("c", GotoColumn),
            ("r", GotoRow),
            ("=", AddExprColumn),
            (":", AddRegexColumn),
            ("C-^", SwapSheets),
            ("Tab", CycleSheets),
            ("BackTab", CycleSheetsBack),
            ("\"", DuplicateRow),
            ("Enter", Dive),
        ];
        for (key, command) in plain {
            table.bind("", key, *command);
        }

        let global: &[(&str, Command)] = &[
            ("q", QuitAll),
            ("h", GoLeftmost),
            ("k", GoTop),
            ("j", GoBottom),
            ("l", GoRightmost),
            ("H", MoveColumnFirst),
            ("J", MoveRowBottom),
            ("K", MoveRowTop),
            ("L", MoveColumnLast),
            ("_", FitAllWidths),
            ("^", RenameAllFromCell),
            ("~", DetectAllTypes),
            ("E", AllErrors),
            (
                "/",
                Search {
                    backward: false,
                    all_columns: true,
                },
            ),
            (
                "?",
                Search {
                    backward: true,
                    all_columns: true,
                },
            ),
            ("n", FirstMatch),
            ("p", LastMatch),
            ("Space", ToggleAll),
            ("s", SelectAll),
            ("u", UnselectAll),
            ("|", SelectRegex { all_columns: true }),
            ("\\", UnselectRegex { all_columns: true }),
            ("d", DeleteSelected),
            ("C-p", StatusHistory),
        ];
        for (key, command) in global {
            table.bind("g", key, *command);
        }
        table
    }

    /// Add or replace a binding.
    pub fn bind(&mut self, prefix: &str, key: &str, command: Command) {
        self.bindings
            .insert((prefix.to_string(), key.to_string()), command);
    }

    pub fn get(&self, prefix: &str, key: &str) -> Option<Command> {
        self.bindings
            .get(&(prefix.to_string(), key.to_string()))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Binding> + '_ {
        self.bindings.iter().map(|((prefix, key), command)| Binding {
            prefix: prefix.clone(),
            key: key.clone(),
            command: *command,
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// What a key press resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A prefix was extended; wait for the next key.
    Pending(String),
    /// Run this command. The prefix has been reset.
    Run(Command),
    /// Nothing bound. The prefix has been reset.
    Unbound { key: String, prefix: String },
}

/// The key-prefix state machine.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    prefix: String,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn reset(&mut self) {
        self.prefix.clear();
    }

    pub fn resolve(&mut self, table: &CommandTable, key: &str) -> Resolution {
        match table.get(&self.prefix, key) {
            Some(Command::Prefix(c)) => {
                self.prefix.push(c);
                tracing::debug!(prefix = %self.prefix, "prefix");
                Resolution::Pending(self.prefix.clone())
            }
            Some(command) => {
                tracing::debug!(prefix = %self.prefix, key, command = %command.name(), "resolved");
                self.prefix.clear();
                Resolution::Run(command)
            }
            None => Resolution::Unbound {
                key: key.to_string(),
                prefix: std::mem::take(&mut self.prefix),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for command in Command::all() {
            assert_eq!(Command::from_name(&command.name()).unwrap(), command);
        }
        assert_eq!(Command::from_name("prefix_g").unwrap(), Command::Prefix('g'));
        assert!(Command::from_name("launch_rockets").is_err());
    }

    #[test]
    fn prefix_accumulates_then_resolves() {
        let table = CommandTable::base();
        let mut dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.resolve(&table, "g"), Resolution::Pending("g".into()));
        assert_eq!(dispatcher.resolve(&table, "q"), Resolution::Run(Command::QuitAll));
        assert_eq!(dispatcher.prefix(), "");
        assert_eq!(dispatcher.resolve(&table, "q"), Resolution::Run(Command::Quit));
    }

    #[test]
    fn unbound_key_resets_prefix() {
        let table = CommandTable::base();
        let mut dispatcher = Dispatcher::new();
        dispatcher.resolve(&table, "g");
        assert_eq!(
            dispatcher.resolve(&table, "z"),
            Resolution::Unbound {
                key: "z".into(),
                prefix: "g".into()
            }
        );
        assert_eq!(dispatcher.prefix(), "");
    }

    #[test]
    fn deeper_prefixes_chain() {
        let mut table = CommandTable::base();
        table.bind("g", "z", Command::Prefix('z'));
        table.bind("gz", "q", Command::Quit);
        let mut dispatcher = Dispatcher::new();
        dispatcher.resolve(&table, "g");
        assert_eq!(dispatcher.resolve(&table, "z"), Resolution::Pending("gz".into()));
        assert_eq!(dispatcher.resolve(&table, "q"), Resolution::Run(Command::Quit));
    }

    #[test]
    fn override_is_per_table() {
        let base = CommandTable::base();
        let mut sheets = base.clone();
        sheets.bind("", "~", Command::JoinSelected(JoinKind::Diff));
        assert_eq!(sheets.get("", "~"), Some(Command::JoinSelected(JoinKind::Diff)));
        assert_eq!(base.get("", "~"), Some(Command::DetectType));
    }

    #[test]
    fn text_commands_have_prompts() {
        assert_eq!(Command::GotoRow.prompt(), Some("goto row number: "));
        assert_eq!(Command::Quit.prompt(), None);
    }
}
