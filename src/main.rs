use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use stickerboard::config::{self, ComposerConfig, ConfigError};
use stickerboard::loader::{ImageSource, LoadError, Loader};
use stickerboard::palette::{Palette, PaletteEntry};
use stickerboard::script::{self, ScriptError};
use stickerboard::session::{Session, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("loader setup failed: {0}")]
    Loader(#[from] LoadError),
    #[error("script failed: {0}")]
    Script(#[from] ScriptError),
    #[error("export failed: {0}")]
    Session(#[from] SessionError),
}

#[derive(Parser, Debug)]
#[command(name = "stickerboard", about = "Compose stickers over a photo and export a PNG")]
struct Cli {
    /// Edge length of the square canvas in pixels.
    #[arg(long, global = true, env = "STICKERBOARD_CANVAS_SIZE")]
    canvas_size: Option<u32>,

    /// Width the canvas is displayed at; script coordinates use this space.
    #[arg(long, global = true, env = "STICKERBOARD_CLIENT_WIDTH")]
    client_width: Option<f64>,

    #[arg(long, global = true, env = "STICKERBOARD_CLIENT_HEIGHT")]
    client_height: Option<f64>,

    /// Extra palette entry as NAME=SOURCE. Repeatable.
    #[arg(long = "palette-entry", global = true, value_parser = PaletteEntry::parse_pair)]
    palette_entries: Vec<PaletteEntry>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a background and stickers, replay a script, and export.
    Compose(ComposeArgs),
    /// List the sticker palette.
    Palette,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Background image: file path, http(s) URL, or data URL.
    #[arg(long)]
    background: String,

    /// Sticker to add, by palette name or source. Repeatable.
    #[arg(long = "sticker")]
    stickers: Vec<String>,

    /// JSON editing script to replay after loading.
    #[arg(long)]
    script: Option<PathBuf>,

    #[arg(long, env = "STICKERBOARD_OUT_DIR")]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = config::log_filter(std::env::var("RUST_LOG").ok().as_deref());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = apply_overrides(ComposerConfig::from_env()?, &cli)?;

    let mut palette = Palette::builtin();
    for entry in cli.palette_entries {
        palette.insert(entry);
    }

    match cli.command {
        Command::Compose(args) => run_compose(config, &palette, args).await,
        Command::Palette => {
            run_palette(&palette);
            Ok(())
        }
    }
}

fn apply_overrides(mut config: ComposerConfig, cli: &Cli) -> Result<ComposerConfig, CliError> {
    if let Some(size) = cli.canvas_size {
        config = config.with_canvas_size(size)?;
    }
    Ok(config.with_client_size(cli.client_width, cli.client_height)?)
}

async fn run_compose(config: ComposerConfig, palette: &Palette, args: ComposeArgs) -> Result<(), CliError> {
    let out_dir = args.out_dir.unwrap_or_else(|| config.out_dir.clone());
    let loader = Arc::new(Loader::new(config.timeouts)?);
    let mut session = Session::new(config.canvas(), config.client_rect(), loader);

    session.load_background(ImageSource::parse(&args.background));
    session.settle().await;
    for sticker in &args.stickers {
        session.add_sticker(palette.resolve(sticker));
        session.settle().await;
    }

    if let Some(path) = &args.script {
        let steps = script::load(path).await?;
        let report = script::run(&mut session, &steps, palette, &out_dir).await?;
        tracing::info!(steps = report.steps, exports = report.exports.len(), "script replayed");
    }

    for notice in session.take_notices() {
        eprintln!("warning: {}", notice.message);
    }

    match session.export_to(&out_dir).await? {
        Some(path) => println!("{}", path.display()),
        None => eprintln!("nothing exported: no background loaded"),
    }
    Ok(())
}

fn run_palette(palette: &Palette) {
    for entry in palette.entries() {
        println!("{}\t{}", entry.name, ImageSource::parse(&entry.source));
    }
}
