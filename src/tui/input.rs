use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;

use super::actions::{ApplyResult, Prompt};
use super::app::App;
use super::keymap::key_name;
use super::ui;
use crate::error::Result;

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || app.input.is_some() {
        return;
    }
    app.click(mouse.row as usize);
}

/// Feed one key press to the open prompt or the dispatcher.
pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<ApplyResult> {
    let Some(input) = app.input.as_mut() else {
        return app.handle_key(&key_name(key));
    };
    match input.handle_key(key) {
        Prompt::Editing => Ok(ApplyResult::Continue),
        Prompt::Submitted(text) => {
            let command = input.command;
            app.submit_input(command, &text)
        }
        Prompt::Cancelled(key) => {
            app.cancel_input(&key);
            Ok(ApplyResult::Continue)
        }
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(app, key)? == ApplyResult::Quit {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(app, mouse),
            Event::Resize(width, height) => app.resize(width as usize, height as usize),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use tabscope_core::{Accessor, Column, CommandTable, Options, Row, Sheet, Source, Value};

    fn left_click(col: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: col,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn numbers(n: usize) -> App {
        let mut app = App::new(Options::default(), CommandTable::new());
        let rows = (0..n).map(|i| Row::list(vec![Value::Int(i as i64)])).collect();
        app.push_sheet(
            Sheet::new("numbers", Source::None)
                .with_columns(vec![Column::new("n", Accessor::index(0))], 0)
                .with_rows(rows),
        );
        app
    }

    #[test]
    fn click_moves_cursor_to_row_under_mouse() {
        let mut app = numbers(10);
        handle_mouse_event(&mut app, left_click(3, 4));
        assert_eq!(app.sheet().unwrap().cursor_row, 3);
    }

    #[test]
    fn clicks_ignored_while_prompting() {
        let mut app = numbers(10);
        handle_key_event(&mut app, press('r')).unwrap();
        handle_mouse_event(&mut app, left_click(3, 4));
        assert_eq!(app.sheet().unwrap().cursor_row, 0);
    }

    #[test]
    fn prompt_collects_keys_then_runs_command() {
        let mut app = numbers(10);
        for c in ['r', '7'] {
            handle_key_event(&mut app, press(c)).unwrap();
        }
        assert_eq!(app.input.as_ref().unwrap().buffer, "7");
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        handle_key_event(&mut app, enter).unwrap();
        assert!(app.input.is_none());
        assert_eq!(app.sheet().unwrap().cursor_row, 7);
    }

    #[test]
    fn ctrl_g_cancels_prompt() {
        let mut app = numbers(3);
        handle_key_event(&mut app, press('/')).unwrap();
        let ctrl_g = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL);
        handle_key_event(&mut app, ctrl_g).unwrap();
        assert!(app.input.is_none());
        assert_eq!(app.status_line, ["C-g"]);
    }
}
