//! tabscope - a terminal explorer for tabular data

mod config;
mod error;
mod tui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabscope_core::{Env, Options, open_path, save_sheet};

#[derive(Parser, Debug)]
#[command(name = "tabscope", version, about = "Explore tabular data in the terminal")]
struct Cli {
    /// Files or directories to open; the first one is shown first
    files: Vec<PathBuf>,

    /// Treat the first row of CSV/TSV files as column names
    #[arg(long)]
    header: bool,

    /// Field delimiter for CSV files
    #[arg(long, value_name = "CHAR")]
    delimiter: Option<String>,

    /// Refuse to save
    #[arg(long)]
    readonly: bool,

    /// Stop at the first command error
    #[arg(long)]
    debug: bool,

    /// Config file (default: the user config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write log output to FILE; filtered by RUST_LOG, default info
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Write the first file to FILE (CSV or TSV by extension) and exit
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating log {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn apply_flags(cli: &Cli, options: &mut Options) -> anyhow::Result<()> {
    if cli.header {
        options.csv_header = true;
    }
    if let Some(delimiter) = &cli.delimiter {
        options.set("csv_delimiter", delimiter)?;
    }
    if cli.readonly {
        options.readonly = true;
    }
    if cli.debug {
        options.debug = true;
    }
    Ok(())
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let (mut config, warnings) = config::load_config(cli.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    apply_flags(&cli, &mut config.options)?;

    let files = match cli.files.is_empty() {
        true => vec![PathBuf::from(".")],
        false => cli.files.clone(),
    };

    if let Some(output_path) = &cli.output {
        let env = Env::new(config.options);
        let sheet = open_path(&files[0], None, &env.options)
            .with_context(|| format!("loading {}", files[0].display()))?;
        save_sheet(&sheet, output_path, &env)
            .with_context(|| format!("writing {}", output_path.display()))?;
        println!("Exported to {}", output_path.display());
        return Ok(());
    }

    let mut app = tui::App::with_files(config.options, config.bindings, &files);
    if app.stack.is_empty() {
        anyhow::bail!("nothing to show: {}", app.status_line.join(" | "));
    }
    tui::run(&mut app)?;
    Ok(())
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
