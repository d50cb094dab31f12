//! Key names.
//!
//! Command tables are keyed by the printed name of a key: `j`, `G`, `Space`,
//! `Enter`, `PageDown`, `F1`, `C-g`, `M-x`. Terminal events are turned into
//! these names here, and key specs in the config file are parsed back to the
//! same form so both spellings land on the same binding.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys printed by name; everything else prints as its character.
const NAMED_KEYS: [(&str, KeyCode); 16] = [
    ("Backspace", KeyCode::Backspace),
    ("Enter", KeyCode::Enter),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Delete", KeyCode::Delete),
    ("Insert", KeyCode::Insert),
    ("Esc", KeyCode::Esc),
    ("Space", KeyCode::Char(' ')),
];

/// Extra spellings accepted in the config file.
const ALIASES: [(&str, char); 10] = [
    ("spc", ' '),
    ("dash", '-'),
    ("minus", '-'),
    ("plus", '+'),
    ("greater", '>'),
    ("less", '<'),
    ("slash", '/'),
    ("backslash", '\\'),
    ("caret", '^'),
    ("equal", '='),
];

/// A key plus the modifiers that show in its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn display(&self) -> String {
        let ctrl = self.modifiers.contains(KeyModifiers::CONTROL);
        let mut name = String::new();
        if ctrl {
            name.push_str("C-");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            name.push_str("M-");
        }
        // Shifted characters and BackTab already carry the shift.
        let shift = self.modifiers.contains(KeyModifiers::SHIFT);
        if shift && !matches!(self.code, KeyCode::Char(_) | KeyCode::BackTab) {
            name.push_str("S-");
        }
        if let Some((label, _)) = NAMED_KEYS.iter().find(|(_, c)| *c == self.code) {
            name.push_str(label);
            return name;
        }
        match self.code {
            KeyCode::F(n) => name.push_str(&format!("F{}", n)),
            // Terminals report Ctrl-^ as Ctrl-6.
            KeyCode::Char('6') if ctrl => name.push('^'),
            KeyCode::Char(c) if ctrl => name.push(c.to_ascii_lowercase()),
            KeyCode::Char(c) => name.push(c),
            _ => name.push_str("Unknown"),
        }
        name
    }
}

/// Name of a key press as used in command tables.
pub fn key_name(key: KeyEvent) -> String {
    KeyCombo {
        code: key.code,
        modifiers: key.modifiers,
    }
    .display()
}

/// Parse a config key spec into its table name. A spec may start with a
/// prefix separated by whitespace (`"g q"`); the prefix is returned
/// separately as the concatenated prefix characters.
pub fn parse_binding_key(input: &str) -> Result<(String, String), String> {
    let mut parts: Vec<&str> = input.split_whitespace().collect();
    let last = parts.pop().ok_or_else(|| "empty key".to_string())?;
    let mut prefix = String::new();
    for part in parts {
        match single_char(part) {
            Some(c) => prefix.push(c),
            None => return Err(format!("prefix '{}' is not a single character", part)),
        }
    }
    Ok((prefix, parse_key_combo(last)?.display()))
}

/// Parse `C-s`, `Ctrl-Alt-x`, `pagedown` or `C--`. Modifiers come first,
/// each followed by `-`; whatever is left is the key.
pub fn parse_key_combo(input: &str) -> Result<KeyCombo, String> {
    let mut rest = input.trim();
    let mut modifiers = KeyModifiers::empty();
    while let Some((head, tail)) = rest.split_once('-') {
        if tail.is_empty() {
            break;
        }
        let flag = match head.to_ascii_lowercase().as_str() {
            "c" | "ctrl" | "control" => KeyModifiers::CONTROL,
            "m" | "alt" | "meta" => KeyModifiers::ALT,
            "s" | "shift" => KeyModifiers::SHIFT,
            "" => return Err("missing modifier before '-'".to_string()),
            _ => return Err(format!("unknown modifier '{}'", head)),
        };
        if modifiers.contains(flag) {
            return Err(format!("duplicate modifier '{}'", head));
        }
        modifiers.insert(flag);
        rest = tail;
    }
    Ok(KeyCombo {
        code: parse_key_code(rest)?,
        modifiers,
    })
}

fn parse_key_code(input: &str) -> Result<KeyCode, String> {
    if input.is_empty() {
        return Err("empty key".to_string());
    }
    if let Some(c) = single_char(input) {
        return Ok(KeyCode::Char(c));
    }
    let lower = input.to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return Ok(KeyCode::F(n));
    }
    if lower == "escape" {
        return Ok(KeyCode::Esc);
    }
    NAMED_KEYS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(&lower))
        .map(|(_, code)| *code)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, c)| KeyCode::Char(*c))
        })
        .ok_or_else(|| format!("unknown key '{}'", input))
}

fn single_char(input: &str) -> Option<char> {
    let mut chars = input.chars();
    chars.next().filter(|_| chars.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> String {
        key_name(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn names_of_terminal_keys() {
        assert_eq!(press(KeyCode::Char('j'), KeyModifiers::NONE), "j");
        assert_eq!(press(KeyCode::Char('G'), KeyModifiers::SHIFT), "G");
        assert_eq!(press(KeyCode::Char(' '), KeyModifiers::NONE), "Space");
        assert_eq!(press(KeyCode::Char('g'), KeyModifiers::CONTROL), "C-g");
        assert_eq!(press(KeyCode::Char('6'), KeyModifiers::CONTROL), "C-^");
        assert_eq!(press(KeyCode::BackTab, KeyModifiers::SHIFT), "BackTab");
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), "F1");
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), "Enter");
    }

    #[test]
    fn parse_key_combo_ctrl() {
        let combo = parse_key_combo("Ctrl-s").unwrap();
        assert_eq!(combo.code, KeyCode::Char('s'));
        assert_eq!(combo.modifiers, KeyModifiers::CONTROL);
        assert_eq!(combo.display(), "C-s");
    }

    #[test]
    fn parse_key_combo_minus() {
        let combo = parse_key_combo("-").unwrap();
        assert_eq!(combo.code, KeyCode::Char('-'));
        assert_eq!(parse_key_combo("C--").unwrap().display(), "C--");
    }

    #[test]
    fn parse_key_combo_invalid_key() {
        assert!(parse_key_combo("C-nope").is_err());
        assert!(parse_key_combo("X-a").is_err());
        assert!(parse_key_combo("C-C-a").is_err());
        assert!(parse_key_combo("").is_err());
    }

    #[test]
    fn binding_keys_with_prefix() {
        assert_eq!(parse_binding_key("g q").unwrap(), ("g".to_string(), "q".to_string()));
        assert_eq!(parse_binding_key("space").unwrap(), (String::new(), "Space".to_string()));
        assert_eq!(parse_binding_key("f1").unwrap(), (String::new(), "F1".to_string()));
        assert_eq!(parse_binding_key("alt-pagedown").unwrap(), (String::new(), "M-PageDown".to_string()));
        assert_eq!(parse_binding_key("g slash").unwrap(), ("g".to_string(), "/".to_string()));
        assert!(parse_binding_key("gg q").is_err());
        assert!(parse_binding_key("   ").is_err());
    }
}
