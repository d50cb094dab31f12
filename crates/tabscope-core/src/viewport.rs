//! Column layout and scroll-to-cursor.
//!
//! Line 0 of the screen is the header, the last line is the status line,
//! and rows occupy everything in between.

use unicode_width::UnicodeWidthStr;

use crate::env::Env;
use crate::sheet::Sheet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    pub width: usize,
    pub height: usize,
}

impl Screen {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Lines available for rows.
    pub fn n_visible_rows(&self) -> usize {
        self.height.saturating_sub(2)
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(80, 25)
    }
}

impl Sheet {
    /// Lay out visible columns left to right from `left_vcol`, with key
    /// columns always included. Unset widths are fitted to the rows on
    /// screen and remembered.
    pub fn calc_col_layout(&mut self, screen: Screen, env: &Env) {
        let more = env.options.ch_left_more.width() + env.options.ch_right_more.width();
        let sep = env.options.ch_column_sep.width();
        let visible_rows = self.visible_rows(screen).to_vec();

        self.layout.clear();
        let mut x = 0;
        for (vcol, idx) in self.visible_indices().into_iter().enumerate() {
            if vcol < self.n_keys || vcol >= self.left_vcol {
                let col = &mut self.columns[idx];
                let w = match col.width {
                    Some(w) => w,
                    // Nothing to measure yet; fit the header without remembering.
                    None if visible_rows.is_empty() => col.name().width() + 2 + more,
                    None => {
                        let w = col.max_width(&visible_rows, screen.width, env) + more;
                        col.width = Some(w);
                        w
                    }
                };
                self.layout
                    .insert(vcol, (x, w.min(screen.width.saturating_sub(x))));
                x += w + sep;
            }
            if x + 1 > screen.width {
                break;
            }
        }
    }

    /// Clamp the cursor and scroll offsets, then scroll so the cursor cell
    /// is on screen.
    pub fn check_cursor(&mut self, screen: Screen, env: &Env) {
        let n_rows = self.rows.len();
        let n_cols = self.n_visible_cols();
        self.cursor_row = self.cursor_row.min(n_rows.saturating_sub(1));
        self.cursor_vcol = self.cursor_vcol.min(n_cols.saturating_sub(1));
        self.top_row = self.top_row.min(n_rows.saturating_sub(1));
        self.left_vcol = self.left_vcol.min(n_cols.saturating_sub(1));

        let page = screen.n_visible_rows().max(1);
        if self.cursor_row < self.top_row {
            self.top_row = self.cursor_row;
        } else if self.cursor_row >= self.top_row + page {
            self.top_row = self.cursor_row + 1 - page;
        }

        if self.cursor_vcol <= self.left_vcol {
            self.left_vcol = self.cursor_vcol;
        } else {
            // Widths vary, so step the left edge until the cursor column fits.
            for _ in 0..=n_cols {
                if self.left_vcol >= self.cursor_vcol {
                    break;
                }
                self.calc_col_layout(screen, env);
                match self.layout.get(&self.cursor_vcol) {
                    Some(&(x, w)) if x + w < screen.width => break,
                    _ => self.left_vcol += 1,
                }
            }
        }

        self.calc_col_layout(screen, env);
    }

    /// Move the cursor and the top row down one page together.
    pub fn page_down(&mut self, screen: Screen) {
        let page = screen.n_visible_rows();
        self.cursor_row += page;
        self.top_row += page;
    }

    pub fn page_up(&mut self, screen: Screen) {
        let page = screen.n_visible_rows();
        self.cursor_row = self.cursor_row.saturating_sub(page);
        self.top_row = self.top_row.saturating_sub(page);
    }

    pub fn scroll_cursor_to_top(&mut self) {
        self.top_row = self.cursor_row;
    }

    pub fn scroll_cursor_to_middle(&mut self, screen: Screen) {
        self.top_row = self.cursor_row.saturating_sub(screen.n_visible_rows() / 2);
    }

    pub fn scroll_cursor_to_bottom(&mut self, screen: Screen) {
        self.top_row = (self.cursor_row + 1).saturating_sub(screen.n_visible_rows());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Accessor, Column};
    use crate::row::Row;
    use crate::sheet::Source;
    use tabscope_engine::Value;

    fn wide_sheet(n_cols: usize, n_rows: usize) -> Sheet {
        let columns = (0..n_cols)
            .map(|i| Column::new(&format!("c{}", i), Accessor::index(i)).with_width(10))
            .collect();
        let rows = (0..n_rows)
            .map(|r| Row::list((0..n_cols).map(|c| Value::Int((r * c) as i64)).collect()))
            .collect();
        Sheet::new("wide", Source::None)
            .with_columns(columns, 1)
            .with_rows(rows)
    }

    #[test]
    fn layout_pins_keys_and_skips_scrolled_columns() {
        let env = Env::default();
        let mut sheet = wide_sheet(6, 3);
        sheet.left_vcol = 3;
        sheet.calc_col_layout(Screen::new(40, 10), &env);
        let placed: Vec<_> = sheet.layout.iter().map(|(v, p)| (*v, *p)).collect();
        assert_eq!(placed, [(0, (0, 10)), (3, (11, 10)), (4, (22, 10)), (5, (33, 7))]);
    }

    #[test]
    fn unset_widths_are_fitted_and_remembered() {
        let env = Env::default();
        let mut sheet = Sheet::new("s", Source::None)
            .with_columns(vec![Column::new("name", Accessor::index(0))], 0)
            .with_rows(vec![Row::list(vec![Value::from("abcdefgh")])]);
        sheet.calc_col_layout(Screen::new(80, 10), &env);
        // 8 cells of text, 2 of padding, one each for the overflow markers.
        assert_eq!(sheet.columns[0].width, Some(12));
    }

    #[test]
    fn cursor_row_stays_on_screen() {
        let env = Env::default();
        let screen = Screen::new(80, 12);
        let mut sheet = wide_sheet(2, 100);
        sheet.cursor_row = 50;
        sheet.check_cursor(screen, &env);
        assert_eq!(sheet.top_row, 41);

        sheet.cursor_row = 10;
        sheet.check_cursor(screen, &env);
        assert_eq!(sheet.top_row, 10);

        sheet.cursor_row = 1000;
        sheet.check_cursor(screen, &env);
        assert_eq!(sheet.cursor_row, 99);
    }

    #[test]
    fn page_down_keeps_relative_position() {
        let env = Env::default();
        let screen = Screen::new(80, 12);
        let mut sheet = wide_sheet(2, 100);
        sheet.cursor_row = 3;
        sheet.page_down(screen);
        sheet.check_cursor(screen, &env);
        assert_eq!((sheet.top_row, sheet.cursor_row), (10, 13));
        sheet.page_up(screen);
        sheet.check_cursor(screen, &env);
        assert_eq!((sheet.top_row, sheet.cursor_row), (0, 3));
    }

    #[test]
    fn horizontal_scroll_brings_cursor_column_into_view() {
        let env = Env::default();
        let screen = Screen::new(40, 10);
        let mut sheet = wide_sheet(8, 3);
        sheet.cursor_vcol = 6;
        sheet.check_cursor(screen, &env);
        let (x, w) = sheet.layout[&6];
        assert!(x + w < screen.width);
        assert!(sheet.layout.contains_key(&0));

        sheet.cursor_vcol = 2;
        sheet.check_cursor(screen, &env);
        assert_eq!(sheet.left_vcol, 2);
    }

    #[test]
    fn empty_sheet_clamps_to_zero() {
        let env = Env::default();
        let mut sheet = Sheet::new("empty", Source::None);
        sheet.cursor_row = 5;
        sheet.cursor_vcol = 2;
        sheet.check_cursor(Screen::default(), &env);
        assert_eq!((sheet.cursor_row, sheet.cursor_vcol), (0, 0));
    }
}
