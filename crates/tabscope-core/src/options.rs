//! Named options, read at point of use.

use crate::error::{Result, TabscopeError};

/// Conversion between an option's field type and its textual form.
pub trait OptionValue: Sized {
    fn parse_option(s: &str) -> Option<Self>;
    fn show(&self) -> String;
}

impl OptionValue for bool {
    fn parse_option(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        }
    }

    fn show(&self) -> String {
        self.to_string()
    }
}

impl OptionValue for String {
    fn parse_option(s: &str) -> Option<Self> {
        Some(s.to_string())
    }

    fn show(&self) -> String {
        self.clone()
    }
}

macro_rules! options {
    ($( $field:ident : $ty:ty = $default:expr, $help:literal; )*) => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct Options {
            $( pub $field: $ty, )*
        }

        impl Default for Options {
            fn default() -> Self {
                Self { $( $field: $default.into(), )* }
            }
        }

        impl Options {
            /// Option names in declaration order.
            pub const NAMES: &'static [&'static str] = &[$( stringify!($field) ),*];

            pub fn get(&self, name: &str) -> Option<String> {
                match name {
                    $( stringify!($field) => Some(self.$field.show()), )*
                    _ => None,
                }
            }

            pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = <$ty as OptionValue>::parse_option(value).ok_or_else(|| {
                                TabscopeError::OptionValue {
                                    name: name.to_string(),
                                    value: value.to_string(),
                                }
                            })?;
                            Ok(())
                        }
                    )*
                    _ => Err(TabscopeError::UnknownOption(name.to_string())),
                }
            }

            pub fn help(name: &str) -> Option<&'static str> {
                match name {
                    $( stringify!($field) => Some($help), )*
                    _ => None,
                }
            }
        }
    };
}

options! {
    encoding: String = "utf-8", "text encoding for files and byte values";
    csv_delimiter: String = ",", "field delimiter for CSV files";
    csv_quotechar: String = "\"", "quote character for CSV files";
    csv_header: bool = false, "parse the first row of CSV/TSV as column names";
    debug: bool = false, "abort on error";
    readonly: bool = false, "disable saving";
    subsheet_sep: String = "~", "separator in names of derived sheets";

    sheet_name_fmt: String = "%s| ", "status line prefix";
    ch_visible_none: String = "", "visible contents of a cell whose value is None";
    ch_function_error: String = "¿", "cell contents when computation fails";
    ch_histogram: String = "*", "histogram bar character";
    ch_column_filler: String = " ", "pad character after column value";
    ch_left_more: String = "<", "marks columns scrolled off to the left";
    ch_right_more: String = ">", "marks columns beyond the right edge";
    ch_column_sep: String = "|", "characters between columns";
    ch_ellipsis: String = "…", "marks truncated text";
    ch_status_sep: String = " | ", "separator between status messages";
    ch_key_sep: String = "/", "separator between key column names";
    ch_edit_pad_char: String = "_", "pad character in the input line";
    ch_wrong_type: String = "~", "marks a value that does not convert to the column type";
    ch_error: String = "!", "marks a cell whose computation failed";

    c_default: String = "", "color of ordinary cells";
    c_header: String = "bold", "color of column headers";
    c_cur_hdr: String = "reverse", "color of the cursor column header";
    c_cur_row: String = "reverse", "color of the cursor row";
    c_cur_col: String = "bold", "color of the cursor column";
    c_key_cols: String = "brown", "color of key columns";
    c_status_line: String = "bold", "color of the status line";
    c_selected_row: String = "green", "color of selected rows";
    c_column_sep: String = "blue", "color of column separators";
    c_edit_cell: String = "", "color of the input line";
    c_wrong_type: String = "magenta", "color of the wrong-type marker";
    c_error: String = "red", "color of the error marker";
}

impl Options {
    /// The CSV delimiter as a single byte, defaulting to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        single_byte(&self.csv_delimiter).unwrap_or(b',')
    }

    pub fn quote_byte(&self) -> u8 {
        single_byte(&self.csv_quotechar).unwrap_or(b'"')
    }

    /// `(name, value, help)` for every option.
    pub fn entries(&self) -> Vec<(&'static str, String, &'static str)> {
        Self::NAMES
            .iter()
            .map(|name| {
                (
                    *name,
                    self.get(name).unwrap_or_default(),
                    Self::help(name).unwrap_or_default(),
                )
            })
            .collect()
    }
}

fn single_byte(s: &str) -> Option<u8> {
    match s {
        "\\t" | "tab" => Some(b'\t'),
        _ if s.len() == 1 => s.bytes().next(),
        _ => None,
    }
}
