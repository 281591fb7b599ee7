mod app;
mod export;
mod renderer;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracetree_core::pipeline::{Source, load};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::export::{ExportOptions, Format, export};

/// Timeline viewer for process trees recorded by `tracetree -f json`.
#[derive(Debug, Parser)]
#[command(name = "tracetree-view", version, about)]
struct Cli {
    /// Process tree JSON to open
    profile: Option<PathBuf>,

    /// Open the bundled demo profile
    #[arg(long, conflicts_with = "profile")]
    demo: bool,

    #[arg(short, long, value_enum, default_value_t = Format::Tui)]
    format: Format,

    /// Write svg/text/json output here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Bar column width in pixels for svg/json output
    #[arg(short, long, default_value_t = 1000.0)]
    width: f64,

    /// Light colours for svg output
    #[arg(long)]
    light: bool,

    /// Write logs to this file (the terminal viewer logs nowhere otherwise)
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Cli {
    fn source(&self) -> Option<Source> {
        match (&self.profile, self.demo) {
            (Some(path), _) => Some(Source::File(path.clone())),
            (None, true) => Some(Source::Demo),
            (None, false) => None,
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match (&cli.log, cli.format) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // Anything written to the terminal would tear the alternate screen.
        (None, Format::Tui) => {}
        (None, _) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    if cli.format == Format::Tui {
        let mut app = App::new(cli.profile.clone());
        if let Some(source) = cli.source() {
            app.request(source);
        }
        return renderer::run(app);
    }

    let source = cli
        .source()
        .context("a profile path or --demo is required for non-interactive output")?;
    let tree = load(&source).with_context(|| format!("failed to load {source}"))?;
    let options = ExportOptions {
        width: cli.width,
        light: cli.light,
    };

    match &cli.out {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export(cli.format, &tree, options, &mut file)
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            export(cli.format, &tree, options, &mut stdout)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
