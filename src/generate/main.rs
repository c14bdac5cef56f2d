//! One-shot impact map generator.
//!
//! Loads the campus table, buffers the selected campus and writes the
//! interactive and/or static map to an output directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use impact_zone::config::AppConfig;
use impact_zone::export::{export_optional_png, HeadlessBrowser, OptionalExport};
use impact_zone::render::{InteractiveRenderer, Renderer, StaticRenderer};
use impact_zone::source::{load_campuses, SourceLocation};
use impact_zone::ImpactMapPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RendererChoice {
    Interactive,
    Static,
    All,
}

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Generate a construction impact map for a school campus")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Campus CSV (URL or path), overrides the config
    #[arg(long)]
    source: Option<String>,

    /// List campus labels and exit
    #[arg(long)]
    list: bool,

    /// Campus label to map
    #[arg(long, required_unless_present = "list")]
    campus: Option<String>,

    /// Buffer radius in meters (defaults to the configured slider default)
    #[arg(short, long)]
    radius: Option<f64>,

    /// Which map to produce
    #[arg(long, value_enum, default_value = "interactive")]
    renderer: RendererChoice,

    /// Output directory, overrides the config
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Also capture the interactive map as PNG with a headless browser
    #[arg(long)]
    png: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    let location: SourceLocation = match &args.source {
        Some(s) => s.parse().with_context(|| format!("Invalid campus source: {}", s))?,
        None => config.source.location()?,
    };

    let table = load_campuses(&location, &config.source.columns)
        .await
        .context("Failed to load campus data")?;

    if args.list {
        for label in table.labels() {
            println!("{}", label);
        }
        return Ok(());
    }

    let label = args
        .campus
        .as_deref()
        .context("--campus is required unless --list is given")?;
    let radius = config.radius.check_or_default(args.radius)?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.export.output_dir.clone());

    let interactive = InteractiveRenderer::new(config.interactive.clone());
    let static_map = StaticRenderer::new(config.static_map.clone());
    let renderers: Vec<&dyn Renderer> = match args.renderer {
        RendererChoice::Interactive => vec![&interactive],
        RendererChoice::Static => vec![&static_map],
        RendererChoice::All => vec![&interactive, &static_map],
    };

    let pipeline = ImpactMapPipeline::new(&table, config.geometry.builder());
    let prepared = pipeline.prepare(label, radius)?;
    info!(
        "Campus '{}' at ({}, {}), {} buffer in {}",
        prepared.campus.label,
        prepared.campus.lon,
        prepared.campus.lat,
        radius,
        prepared.zone.crs
    );

    for renderer in renderers {
        let output = pipeline.run(renderer, label, radius)?;
        let path = output.artifact.write_to(&out_dir)?;
        println!("{}", path.display());
    }

    if args.png {
        let html = interactive
            .build_map(prepared.campus, &prepared.zone)
            .to_html();
        let browser = HeadlessBrowser::new(config.export.browser.clone())
            .with_window(config.export.window_width, config.export.window_height)
            .with_delay(Duration::from_secs(config.export.capture_delay_secs));

        match export_optional_png(&browser, &prepared.campus.label, &html).await {
            OptionalExport::Exported(artifact) => {
                let path = artifact.write_to(&out_dir)?;
                println!("{}", path.display());
            }
            // Informational only; already logged by the exporter
            OptionalExport::Skipped(_) => {}
        }
    }

    Ok(())
}
