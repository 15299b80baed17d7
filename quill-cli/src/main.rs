//! Quill CLI - lay out a styled document and print its box tree
//!
//! Usage:
//!   quill <scene.json>                Lay out a scene file
//!   quill --text '<text>'             Lay out one paragraph
//!   quill <scene.json> --width 320    Override the viewport width
//!   quill <scene.json> --verbose      Add box ids, flags and widths

mod scene;

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use quill_common::{Component, clear_warnings, warn_once};
use quill_css::layout::{DumpOptions, FixedAdvanceFont, LayoutConfig, SimpleTextOracle};
use quill_css::{compute_styles, dump, layout_document};

use scene::Scene;

/// Quill - CSS inline formatting and line breaking
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a scene file
    quill quill-cli/scenes/sample.json

    # Lay out one paragraph in a 200px viewport
    quill --text 'The quick brown fox jumps' --width 200

    # Same, with a font where every character is one em wide
    quill --text 'The quick brown fox jumps' --width 200 --monospace

    # Show box ids, flags and minimum content widths
    quill -v quill-cli/scenes/sample.json
"#)]
struct Cli {
    /// Path to a JSON scene file
    #[arg(value_name = "SCENE", conflicts_with = "text")]
    scene: Option<PathBuf>,

    /// Lay out a single paragraph of text instead of a scene
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Viewport width, overriding the scene's
    #[arg(long, value_name = "PX")]
    width: Option<f32>,

    /// Font size of the --text paragraph
    #[arg(long, value_name = "PX", default_value = "16")]
    font_size: f32,

    /// Measure every character as one em wide
    #[arg(long)]
    monospace: bool,

    /// Add box ids, flags and minimum content widths to the dump
    #[arg(short, long)]
    verbose: bool,

    /// Print without ANSI colors
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    clear_warnings();

    let mut scene = load_scene(&cli)?;
    if let Some(width) = cli.width {
        if width > 0.0 {
            scene.viewport.viewport_width = width;
        } else {
            warn_once(Component::Scene, "--width must be positive; keeping the scene's width");
        }
    }

    let (dom, declarations) = scene.build();
    let styles = compute_styles(&dom, &declarations);
    let font = if cli.monospace {
        FixedAdvanceFont::monospace_em()
    } else {
        FixedAdvanceFont::default()
    };
    let oracle = SimpleTextOracle::new(Rc::new(font));
    let tree = layout_document(&dom, &styles, &oracle, &scene.viewport).context("layout failed")?;

    let heading = heading(&scene.viewport);
    let out = dump(&tree, &dom, DumpOptions { verbose: cli.verbose });
    if cli.no_color {
        println!("{heading}\n");
        print!("{out}");
    } else {
        println!("{}\n", heading.bold());
        for line in out.lines() {
            println!("{}", colorize(line));
        }
    }
    Ok(())
}

/// Load the scene named on the command line, or build one from `--text`.
fn load_scene(cli: &Cli) -> Result<Scene> {
    if let Some(ref text) = cli.text {
        return Ok(Scene::paragraph(text, cli.font_size));
    }
    let Some(ref path) = cli.scene else {
        anyhow::bail!("a scene file or --text is required (see --help)")
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing scene '{}'", path.display()))
}

fn heading(viewport: &LayoutConfig) -> String {
    format!(
        "=== Box Tree (viewport: {}x{}) ===",
        viewport.viewport_width, viewport.viewport_height
    )
}

/// Color the box kind at the start of one dump line.
fn colorize(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    let Some(body) = body.strip_prefix("* ") else {
        return line.to_string();
    };
    let (kind, detail) = body.split_once(' ').unwrap_or((body, ""));
    let kind = match kind {
        "block" => kind.cyan().to_string(),
        "line" => kind.dimmed().to_string(),
        "inline" => kind.green().to_string(),
        _ => kind.to_string(),
    };
    format!("{indent}* {kind} {detail}")
}
