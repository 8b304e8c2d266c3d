// File: crates/pullscope-demo/src/main.rs
// Summary: Fetch one pull's samples, aggregate them, and drive a chart through zoom and reset,
// writing a PNG after each step.

mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pullscope_core::{register_once, ChartRenderer, Gesture, QueryKey};
use pullscope_query::{ChartMount, CsvSource, DataSource, FixtureSource, MountStatus, QueryLoader, DAMAGE};
use pullscope_render_skia::SkiaSurface;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pullscope")]
#[command(about = "Render per-pull metric charts to PNG")]
#[command(version)]
struct Args {
    /// Encounter id
    #[arg(short, long, default_value = "1")]
    encounter: String,

    /// Pull id within the encounter
    #[arg(short, long, default_value = "1")]
    pull: String,

    #[arg(short, long, default_value = DAMAGE)]
    metric: String,

    /// Read samples from this CSV instead of the built-in fixture
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Config file name without extension
    #[arg(long, default_value = "pullscope")]
    config: String,

    /// Overrides `out_dir` from the config
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// List fixture encounters and pulls, then exit
    #[arg(long)]
    list: bool,
}

fn list_fixture() {
    for encounter in FixtureSource::new().encounters() {
        println!("{} ({})", encounter.title, encounter.id);
        for pull in &encounter.pulls {
            println!("  {} [{}] {:?} at {}", pull.title, pull.id, pull.result, pull.started_at);
        }
    }
}

fn write_frame(mount: &mut ChartMount<SkiaSurface>, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(format!("{name}.png"));
    let surface = mount
        .handle_mut()
        .and_then(|h| h.surface_mut())
        .context("chart is not mounted")?;
    surface.write_png(&path).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.list {
        list_fixture();
        return Ok(());
    }

    let cfg = settings::load(&args.config)?;
    let out_dir = args.out_dir.clone().unwrap_or_else(|| cfg.out_dir.clone());

    register_once();
    let renderer = ChartRenderer::new(cfg.chart.clone()).context("chart renderer")?;

    let source: Arc<dyn DataSource> = match &args.csv {
        Some(path) => {
            info!(path = %path.display(), "reading samples from csv");
            Arc::new(CsvSource::new(path))
        }
        None => Arc::new(FixtureSource::new()),
    };
    let loader = QueryLoader::new(source, cfg.load.clone());

    let width = cfg.width.max(1);
    let surface = SkiaSurface::new(width, cfg.chart.height_for(width)).context("allocate raster surface")?;
    let key = QueryKey::new(args.encounter, args.metric, args.pull);
    let mut mount = ChartMount::mount(&renderer, surface, key.clone(), &loader).context("mount chart")?;

    match mount.refresh().await.context("apply loaded data")? {
        MountStatus::Unavailable(message) => warn!(%key, %message, "rendering empty chart"),
        status => info!(%key, ?status, "data loaded"),
    }
    write_frame(&mut mount, &out_dir, "full")?;

    let w = width as f32;
    let handle = mount.handle_mut().context("chart is not mounted")?;
    handle.handle_gesture(Gesture::Wheel { x_px: w * 0.5, lines: 3.0 })?;
    info!(viewport = ?handle.viewport(), show_reset = handle.show_reset(), "wheel zoom");
    write_frame(&mut mount, &out_dir, "wheel_zoom")?;

    let handle = mount.handle_mut().context("chart is not mounted")?;
    handle.handle_gesture(Gesture::DragStart { x_px: w * 0.3 })?;
    handle.handle_gesture(Gesture::DragMove { x_px: w * 0.6 })?;
    write_frame(&mut mount, &out_dir, "drag_band")?;

    let handle = mount.handle_mut().context("chart is not mounted")?;
    handle.handle_gesture(Gesture::DragEnd { x_px: w * 0.6 })?;
    handle.handle_gesture(Gesture::PointerMove { x_px: w * 0.45 })?;
    info!(viewport = ?handle.viewport(), "drag select");
    write_frame(&mut mount, &out_dir, "drag_zoom")?;

    let handle = mount.handle_mut().context("chart is not mounted")?;
    handle.handle_gesture(Gesture::PointerLeave)?;
    handle.reset_zoom()?;
    info!(viewport = ?handle.viewport(), show_reset = handle.show_reset(), "reset");
    write_frame(&mut mount, &out_dir, "reset")?;

    mount.unmount();
    Ok(())
}
