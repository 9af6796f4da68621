use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use infinity_wall::config::Configuration;
use infinity_wall::export::{self, ExportFormat};
use infinity_wall::layout::GridMode;
use infinity_wall::sources::{DirectorySource, Embedding, ImageSource, StaticSource};
use infinity_wall::tasks::replay::{self, GestureScript};
use infinity_wall::wall::{CellVisual, FrameReport, Wall};

#[derive(Debug, Parser)]
#[command(
    name = "infinity-wall",
    version,
    about = "Draggable photo wall engine with momentum, parallax and snap"
)]
struct Args {
    /// Path to YAML config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Viewport size in CSS pixels
    #[arg(long, value_name = "WxH", default_value = "1280x800", value_parser = parse_viewport)]
    viewport: (f64, f64),
    /// Deterministic seed for the shuffle and cell assignment
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Extra http(s) image URLs, comma- or newline-separated (repeatable)
    #[arg(long = "image", value_name = "URLS")]
    images: Vec<String>,
    /// Scan this directory for images
    #[arg(long, value_name = "DIR")]
    images_dir: Option<PathBuf>,
    /// Embed scanned images as data URIs
    #[arg(long)]
    inline: bool,
    /// Background colour override, e.g. "#181818"
    #[arg(long, value_name = "HEX")]
    background: Option<String>,
    /// Lay out a single-row dock instead of the full wall
    #[arg(long)]
    dock: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the grid and print its geometry
    Layout {
        /// Dump every cell as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a JSON gesture script against the wall
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Pace frames in real time instead of simulating
        #[arg(long)]
        realtime: bool,
        /// Print one JSON frame report per line
        #[arg(long)]
        json: bool,
    },
    /// Render an embeddable snippet or document
    Export {
        #[arg(value_enum)]
        format: ExportKind,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportKind {
    Markup,
    IframeUrl,
    IframeSrcdoc,
    Html,
}

impl From<ExportKind> for ExportFormat {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Markup => ExportFormat::Markup,
            ExportKind::IframeUrl => ExportFormat::IframeUrl,
            ExportKind::IframeSrcdoc => ExportFormat::IframeSrcdoc,
            ExportKind::Html => ExportFormat::Html,
        }
    }
}

fn parse_viewport(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension {v:?}"))
    };
    Ok((parse(w)?, parse(h)?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct LayoutDump {
    mode: GridMode,
    cols: usize,
    rows: usize,
    cell_size: f64,
    gap: f64,
    content_width: f64,
    content_height: f64,
    initial_scroll: (f64, f64),
    placeholders: bool,
    background: String,
    edge_fade: String,
    top_bottom_fade: String,
    cells: Vec<CellVisual>,
}

fn load_config(args: &Args) -> Result<Configuration> {
    let mut cfg = match &args.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(seed) = args.seed {
        cfg.layout_seed = Some(seed);
    }
    if let Some(color) = &args.background {
        cfg.background_color = color.clone();
    }
    if let Some(dir) = &args.images_dir {
        cfg.image_directory = Some(dir.clone());
    }
    if args.inline {
        cfg.inline_images = true;
    }
    if args.dock {
        cfg.mode = GridMode::Dock;
    }
    cfg.validated().context("validating configuration")
}

fn image_source(cfg: &Configuration, pasted: &[String]) -> Result<StaticSource> {
    let mut source = StaticSource::new(cfg.images.clone(), cfg.background_color.clone());
    for raw in pasted {
        if source.add_urls(raw) == 0 {
            warn!(input = %raw, "no new image urls in --image value");
        }
    }
    if let Some(dir) = &cfg.image_directory {
        let embedding = if cfg.inline_images {
            Embedding::Inline
        } else {
            Embedding::FileUrl
        };
        let scanned = DirectorySource::scan(dir, embedding, cfg.background_color.clone())
            .with_context(|| format!("scanning {}", dir.display()))?;
        source.extend(scanned.images());
    }
    Ok(source)
}

fn write_output(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "export written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn print_summary(trace: &[FrameReport]) -> Result<()> {
    let Some(last) = trace.last() else {
        bail!("replay produced no frames");
    };
    let rendered = trace.iter().filter(|r| r.rendered).count();
    let moved = trace.iter().filter(|r| r.moved).count();
    println!(
        "frames={} rendered={} animated={} final-mode={:?} scroll=({:.1}, {:.1})",
        trace.len(),
        rendered,
        moved,
        last.mode,
        last.scroll_x,
        last.scroll_y
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = load_config(&args)?;
    let source = image_source(&cfg, &args.images)?;
    let (width, height) = args.viewport;

    match args.command {
        Command::Layout { json } => {
            let wall = Wall::new(cfg, &source, width, height);
            let layout = wall.layout();
            let geometry = layout.geometry();
            if json {
                let dump = LayoutDump {
                    mode: layout.mode(),
                    cols: geometry.cols,
                    rows: geometry.rows,
                    cell_size: geometry.metrics.cell_size,
                    gap: geometry.metrics.gap,
                    content_width: geometry.content_width,
                    content_height: geometry.content_height,
                    initial_scroll: layout.initial_scroll(),
                    placeholders: layout.uses_placeholders(),
                    background: wall.background().to_string(),
                    edge_fade: wall.background().edge_fade_css(),
                    top_bottom_fade: wall.background().top_bottom_fade_css(),
                    cells: wall.visuals(),
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                println!(
                    "{:?}: {} x {} cells ({}px, gap {}px), content {}x{}, start scroll ({}, {}){}",
                    layout.mode(),
                    geometry.cols,
                    geometry.rows,
                    geometry.metrics.cell_size,
                    geometry.metrics.gap,
                    geometry.content_width,
                    geometry.content_height,
                    layout.initial_scroll().0,
                    layout.initial_scroll().1,
                    if layout.uses_placeholders() {
                        ", placeholder images"
                    } else {
                        ""
                    }
                );
            }
        }
        Command::Replay {
            script,
            realtime,
            json,
        } => {
            let script = GestureScript::from_json_file(&script)
                .with_context(|| format!("reading gesture script {}", script.display()))?;
            let frame_interval = cfg.frame_interval;
            let mut wall = Wall::new(cfg, &source, width, height);

            let print_frame = |report: &FrameReport| {
                if json {
                    match serde_json::to_string(report) {
                        Ok(line) => println!("{line}"),
                        Err(err) => warn!(%err, "could not encode frame report"),
                    }
                }
            };

            let trace = if realtime {
                let cancel = CancellationToken::new();
                let ctrl_c = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        ctrl_c.cancel();
                    }
                });
                replay::run(&mut wall, &script, frame_interval, cancel, print_frame).await
            } else {
                let trace = replay::simulate(
                    &mut wall,
                    &script,
                    frame_interval,
                    std::time::Instant::now(),
                );
                trace.iter().for_each(print_frame);
                trace
            };
            if !json {
                print_summary(&trace)?;
            }
        }
        Command::Export { format, output } => {
            let background = cfg.background();
            let images = source.images();
            let text = export::render(format.into(), &images, background, &cfg.export)
                .context("rendering export")?;
            write_output(output.as_ref(), &text)?;
        }
    }
    Ok(())
}
