//! The config file: option values and extra key bindings.
//!
//! ```toml
//! [options]
//! csv_header = "true"
//! ch_histogram = "#"
//!
//! [bindings]
//! "g q" = "quit_all"
//! "C-s" = "save"
//! ```
//!
//! Problems never stop startup; they come back as warnings.

use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tabscope_core::{Command, CommandTable, Options};

use crate::tui::keymap::parse_binding_key;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const MAX_BINDINGS: usize = 1_024;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    options: Option<BTreeMap<String, String>>,
    bindings: Option<BTreeMap<String, String>>,
}

/// Settings read from the config file.
#[derive(Debug, Default)]
pub struct Config {
    pub options: Options,
    /// Bindings added to every sheet on top of its own table.
    pub bindings: CommandTable,
}

/// Load `path`, or the default config file when none is given. A missing
/// default file is not a problem; a missing explicit file is.
pub fn load_config(path: Option<&Path>) -> (Config, Vec<String>) {
    let explicit = path.is_some();
    let Some(path) = path.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), Vec::new());
    };
    if !path.exists() {
        let warnings = match explicit {
            true => vec![format!("Config file not found: {}", path.display())],
            false => Vec::new(),
        };
        return (Config::default(), warnings);
    }

    let content = match read_config_file(&path) {
        Ok(content) => content,
        Err(err) => return (Config::default(), vec![err]),
    };
    tracing::info!(path = %path.display(), "loaded config");
    config_from_str(&content)
}

/// Parse config text, collecting warnings for anything that does not apply.
fn config_from_str(content: &str) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    match toml::from_str::<ConfigFile>(content) {
        Ok(file) => (parse_config(file, &mut warnings), warnings),
        Err(err) => {
            warnings.push(format!("Failed to parse config: {}", err));
            (Config::default(), warnings)
        }
    }
}

fn read_config_file(path: &Path) -> Result<String, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    std::fs::read_to_string(path).map_err(|err| format!("Failed to read {}: {}", path.display(), err))
}

fn parse_config(file: ConfigFile, warnings: &mut Vec<String>) -> Config {
    let mut config = Config::default();
    for (name, value) in file.options.unwrap_or_default() {
        if let Err(err) = config.options.set(&name, &value) {
            warnings.push(format!("Option {}: {}", name, err));
        }
    }

    let bindings = file.bindings.unwrap_or_default();
    if bindings.len() > MAX_BINDINGS {
        warnings.push(format!(
            "Too many bindings: {} (max {})",
            bindings.len(),
            MAX_BINDINGS
        ));
        return config;
    }
    for (spec, command) in bindings {
        match (parse_binding_key(&spec), Command::from_name(&command)) {
            (Ok((prefix, key)), Ok(command)) => config.bindings.bind(&prefix, &key, command),
            (Ok(_), Err(err)) => warnings.push(format!("Binding '{}': {}", spec, err)),
            (Err(err), _) => warnings.push(format!("Invalid key '{}' in bindings: {}", spec, err)),
        }
    }
    config
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tabscope")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn options_and_bindings_apply() {
        let (config, warnings) = config_from_str(
            r##"
            [options]
            csv_header = "yes"
            ch_histogram = "#"

            [bindings]
            "g q" = "quit_all"
            "C-s" = "save"
            "##,
        );
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert!(config.options.csv_header);
        assert_eq!(config.options.ch_histogram, "#");
        assert_eq!(config.bindings.get("g", "q"), Some(Command::QuitAll));
        assert_eq!(config.bindings.get("", "C-s"), Some(Command::Save));
    }

    #[test]
    fn bad_entries_become_warnings() {
        let (config, warnings) = config_from_str(
            r#"
            [options]
            no_such_option = "1"
            readonly = "maybe"

            [bindings]
            "x" = "launch_rockets"
            "C-nope" = "quit"
            "#,
        );
        assert_eq!(warnings.len(), 4, "{:?}", warnings);
        assert!(!config.options.readonly);
        assert!(config.bindings.is_empty());
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let (_, warnings) = config_from_str("[colors]\nheader = \"red\"\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse config"));
    }

    #[test]
    fn explicit_missing_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (_, warnings) = load_config(Some(&dir.path().join("nope.toml")));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config file not found"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[options]\nreadonly = \"true\"").unwrap();
        let (config, warnings) = load_config(Some(file.path()));
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert!(config.options.readonly);
    }
}
