//! UI rendering

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use tabscope_core::{CellState, ColumnType, Options};

use super::app::App;

pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(area);
    [chunks[0], chunks[1]]
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    app.resize(area.width as usize, area.height as usize);

    let [sheet_area, status_area] = split_main_chunks(area);
    draw_sheet(f, app, sheet_area);
    draw_status_bar(f, app, status_area);
}

fn draw_sheet(f: &mut Frame, app: &App, area: Rect) {
    let Some(sheet) = app.sheet() else {
        return;
    };
    let env = &app.env;
    let opts = &env.options;
    let visible = sheet.visible_indices();
    let sep = Span::styled(opts.ch_column_sep.clone(), parse_style(&opts.c_column_sep));

    let mut header = Vec::new();
    for (&vcol, &(_, width)) in &sheet.layout {
        let idx = visible[vcol];
        let col = &sheet.columns[idx];
        let mut style = parse_style(&opts.c_header);
        if idx < sheet.n_keys {
            style = style.patch(parse_style(&opts.c_key_cols));
        }
        if vcol == sheet.cursor_vcol {
            style = style.patch(parse_style(&opts.c_cur_hdr));
        }
        let name = fit(col.name(), width.saturating_sub(1), opts);
        header.push(Span::styled(format!("{}{}", name, type_glyph(col.ty)), style));
        header.push(sep.clone());
    }

    let mut lines = vec![Line::from(header)];
    for (i, row) in sheet.visible_rows(app.screen).iter().enumerate() {
        let row_idx = sheet.top_row + i;
        let row_style = if row_idx == sheet.cursor_row {
            parse_style(&opts.c_cur_row)
        } else if sheet.is_selected(row) {
            parse_style(&opts.c_selected_row)
        } else {
            parse_style(&opts.c_default)
        };

        let mut spans = Vec::new();
        for (&vcol, &(_, width)) in &sheet.layout {
            let idx = visible[vcol];
            let col = &sheet.columns[idx];
            let mut style = row_style;
            if idx < sheet.n_keys {
                style = parse_style(&opts.c_key_cols).patch(style);
            }
            if vcol == sheet.cursor_vcol && row_idx != sheet.cursor_row {
                style = style.patch(parse_style(&opts.c_cur_col));
            }

            // The last cell of each column holds the wrong-type or error marker.
            let shown = col.display_value(row, Some(width), env);
            spans.push(Span::styled(fit(&shown.text, width.saturating_sub(1), opts), style));
            let marker = match shown.state {
                CellState::Ok => Span::styled(filler(opts, width.min(1)), style),
                CellState::WrongType => {
                    Span::styled(opts.ch_wrong_type.clone(), style.patch(parse_style(&opts.c_wrong_type)))
                }
                CellState::Error => {
                    Span::styled(opts.ch_error.clone(), style.patch(parse_style(&opts.c_error)))
                }
            };
            spans.push(marker);
            spans.push(sep.clone());
        }
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let opts = &app.env.options;
    let right = match app.dispatcher.prefix() {
        "" => app.last_key.clone(),
        prefix => prefix.to_string(),
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(right.width() as u16 + 1),
        ])
        .split(area);

    let status_style = parse_style(&opts.c_status_line);
    let left = match &app.input {
        Some(input) => {
            let (before, after) = input.buffer.split_at(input.cursor);
            Line::from(vec![
                Span::styled(input.label.clone(), status_style),
                Span::styled(
                    format!("{}│{}", before, after),
                    parse_style(&opts.c_edit_cell),
                ),
            ])
        }
        None => Line::from(Span::styled(status_text(app), status_style)),
    };
    f.render_widget(Paragraph::new(left), chunks[0]);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(right, status_style))),
        chunks[1],
    );
}

/// The sheet name, then the messages from the last command.
pub(crate) fn status_text(app: &App) -> String {
    let opts = &app.env.options;
    let Some(sheet) = app.sheet() else {
        return app.status_line.join(&opts.ch_status_sep);
    };
    let mut parts = app.status_line.clone();
    if parts.is_empty() && sheet.n_rows() == 0 {
        parts.push("no rows".to_string());
    }
    format!(
        "{}{}",
        opts.sheet_name_fmt.replace("%s", sheet.name()),
        parts.join(&opts.ch_status_sep)
    )
}

fn type_glyph(ty: ColumnType) -> char {
    match ty {
        ColumnType::Any => ' ',
        other => other.glyph(),
    }
}

/// `text` cut or padded to exactly `width` terminal cells.
fn fit(text: &str, width: usize, opts: &Options) -> String {
    let mut out = String::new();
    if text.width() <= width {
        out.push_str(text);
    } else {
        let room = width.saturating_sub(opts.ch_ellipsis.width());
        let mut used = 0;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > room {
                break;
            }
            used += w;
            out.push(c);
        }
        if room + opts.ch_ellipsis.width() == width {
            out.push_str(&opts.ch_ellipsis);
        }
    }
    let missing = width.saturating_sub(out.width());
    out + filler(opts, missing).as_str()
}

fn filler(opts: &Options, n: usize) -> String {
    let c = opts
        .ch_column_filler
        .chars()
        .find(|c| c.width() == Some(1))
        .unwrap_or(' ');
    std::iter::repeat_n(c, n).collect()
}

/// Style from a color option: space-separated attributes and color names.
pub(crate) fn parse_style(spec: &str) -> Style {
    let mut style = Style::default();
    for word in spec.split_whitespace() {
        style = match word.to_ascii_lowercase().as_str() {
            "bold" => style.add_modifier(Modifier::BOLD),
            "reverse" => style.add_modifier(Modifier::REVERSED),
            "underline" => style.add_modifier(Modifier::UNDERLINED),
            "dim" => style.add_modifier(Modifier::DIM),
            "red" => style.fg(Color::Red),
            "green" => style.fg(Color::Green),
            "yellow" | "brown" => style.fg(Color::Yellow),
            "blue" => style.fg(Color::Blue),
            "magenta" => style.fg(Color::Magenta),
            "cyan" => style.fg(Color::Cyan),
            "white" => style.fg(Color::White),
            "black" => style.fg(Color::Black),
            _ => style,
        };
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use tabscope_core::{Accessor, Column, CommandTable, Row, Sheet, Source, Value};

    fn sample_app() -> App {
        let mut app = App::new(Options::default(), CommandTable::new());
        let sheet = Sheet::new("people", Source::None)
            .with_columns(
                vec![
                    Column::new("name", Accessor::index(0)),
                    Column::new("age", Accessor::index(1)).with_type(ColumnType::Int),
                ],
                1,
            )
            .with_rows(vec![
                Row::list(vec![Value::from("ada"), Value::from("36")]),
                Row::list(vec![Value::from("bob"), Value::from("many")]),
            ]);
        app.push_sheet(sheet);
        app
    }

    #[test]
    fn fit_pads_and_truncates() {
        let opts = Options::default();
        assert_eq!(fit("ab", 4, &opts), "ab  ");
        assert_eq!(fit("abcdef", 4, &opts), "abc…");
        assert_eq!(fit("日本語", 5, &opts), "日本…");
        assert_eq!(fit("abc", 0, &opts), "");
    }

    #[test]
    fn color_options_map_to_styles() {
        let style = parse_style("bold red");
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.fg, Some(Color::Red));
        assert_eq!(parse_style(""), Style::default());
    }

    #[test]
    fn status_starts_with_sheet_name() {
        let mut app = sample_app();
        app.status_line = vec!["one".into(), "two".into()];
        assert_eq!(status_text(&app), "people| one | two");
    }

    #[test]
    fn empty_sheet_says_no_rows() {
        let mut app = App::new(Options::default(), CommandTable::new());
        app.push_sheet(Sheet::new("empty", Source::None));
        app.status_line.clear();
        assert_eq!(status_text(&app), "empty| no rows");
    }

    #[test]
    fn draws_header_rows_and_status() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let buffer = terminal.backend().buffer();
        let line = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(line(0).starts_with("name"), "{:?}", line(0));
        assert!(line(0).contains("age"));
        assert!(line(1).contains("ada"));
        assert!(line(2).contains("many"));
        assert!(line(5).starts_with("people| "), "{:?}", line(5));
    }

    #[test]
    fn numbers_align_against_the_marker_cell() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("36 |"), "{:?}", row);
    }
}
