//! Terminal viewer for layered raster containers
//!
//! Prints every layer as a bitmap (opaque black pixels as `█`) followed by its
//! name, or the group/layer outline with `--tree`.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use ora_core::{Container, Item, LoadConfig, RgbaImage};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const INK: char = '█';
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn cli() -> Command {
    Command::new("ora-view")
        .version(ora_core::VERSION)
        .about("Render layered raster containers in the terminal")
        .arg(
            Arg::new("file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Container archive to open"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_parser(value_parser!(usize))
                .help("Worker threads for decoding (default: available parallelism)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("warn")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .action(ArgAction::SetTrue)
                .help("Print the group/layer outline instead of bitmaps"),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = matches
        .get_one::<PathBuf>("file")
        .context("missing container path")?;

    let mut config = LoadConfig::new();
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config = config.with_max_workers(*workers);
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut container = Container::with_config(config);
    container
        .load(std::io::BufReader::new(file))
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(items = container.len(), "loaded {}", path.display());

    if matches.get_flag("tree") {
        if let Some(root) = container.root_group() {
            print!("{}", outline(root));
        }
        return Ok(());
    }

    for layer in container.layers() {
        if let Some(image) = layer.image() {
            print!("{}", render_bitmap(image));
        }
        println!("{}", layer.name());
    }

    Ok(())
}

/// One text row per pixel row, `█` for opaque black, space otherwise
fn render_bitmap(image: &RgbaImage) -> String {
    let mut out = String::with_capacity((image.width() as usize + 1) * image.height() as usize);
    for row in image.rows() {
        out.extend(row.map(|pixel| if pixel.0 == BLACK { INK } else { ' ' }));
        out.push('\n');
    }
    out
}

fn outline(root: &Item) -> String {
    let mut out = String::new();
    for child in root.children() {
        write_outline(child, 0, &mut out);
    }
    out
}

fn write_outline(item: &Item, depth: usize, out: &mut String) {
    let marker = if item.is_group() { '+' } else { '-' };
    let hidden = if item.visible() { "" } else { " (hidden)" };
    let _ = writeln!(
        out,
        "{:indent$}{marker} {} [{}] opacity={}{hidden}",
        "",
        item.name(),
        item.uuid(),
        item.opacity(),
        indent = depth * 2
    );
    for child in item.children() {
        write_outline(child, depth + 1, out);
    }
}
