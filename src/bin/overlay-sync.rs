use std::{collections::BTreeMap, path::Path, path::PathBuf, rc::Rc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "overlay-sync", version)]
struct Cli {
    /// Print debug diagnostics on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the measured, clipped and clip-directive geometry of the scene target.
    Bounds(SceneArgs),
    /// Run one update pass and print the overlay style it writes.
    Position(PositionArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PositionArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Treat the overlay as inactive (no child renderer draws into it).
    #[arg(long)]
    inactive: bool,
}

#[derive(serde::Serialize)]
struct BoundsReport {
    measured: overlay_sync::GeometrySnapshot,
    live: overlay_sync::GeometrySnapshot,
    clip: String,
}

#[derive(serde::Serialize)]
struct PositionReport {
    placement: Option<overlay_sync::OverlayPlacement>,
    outcome: overlay_sync::SyncOutcome,
    style: BTreeMap<overlay_sync::StyleProp, String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Bounds(args) => cmd_bounds(args),
        Command::Position(args) => cmd_position(args),
    }
}

fn read_scene(path: &Path) -> anyhow::Result<overlay_sync::Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read scene '{}'", path.display()))?;
    let scene = overlay_sync::Scene::from_json(&json).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn cmd_bounds(args: SceneArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let built = scene.build()?;
    let doc = &built.document;

    let tracker = overlay_sync::BoundsTracker::new(built.target, scene.quirks);
    let report = BoundsReport {
        measured: tracker.measure(doc, built.target)?,
        live: tracker.live_bounds(doc)?,
        clip: tracker.clip_string(doc)?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_position(args: PositionArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let built = scene.build()?;
    let mut doc = built.document;

    let tracker = Rc::new(overlay_sync::BoundsTracker::new(built.target, scene.quirks));
    let mut sync = overlay_sync::PositionSynchronizer::new(tracker, scene.settings);
    let state = overlay_sync::StaticRenderState {
        active: !args.inactive,
        visibility_changed: true,
        visibility: scene.visibility,
    };

    let outcome = sync
        .sync(&mut doc, &state)
        .with_context(|| format!("sync overlay for '{}'", scene.target))?;
    let placement = sync.last_placement();
    let style = sync
        .overlay_id()
        .and_then(|id| doc.overlay(id))
        .map(|record| record.style.clone())
        .unwrap_or_default();

    let report = PositionReport {
        placement,
        outcome,
        style,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
