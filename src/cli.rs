use crate::config::load_config;
use crate::dataset::GraphData;
use crate::frame_dump::write_frame_dump;
use crate::physics::Simulation;
use crate::pipeline::FramePipeline;
use crate::render::render_svg;
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mvg", version, about = "Force-directed movie graph renderer")]
pub struct Args {
    /// Graph dataset JSON ({ nodes: [...], links: [...] })
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output SVG file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Write the final frame's label state as JSON
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,

    /// Config JSON file (camelCase keys)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Simulation steps before rendering
    #[arg(short = 'f', long = "frames", default_value_t = 300)]
    pub frames: usize,

    /// Zoom level for the rendered frame
    #[arg(short = 's', long = "scale", default_value_t = 2.0)]
    pub scale: f32,

    /// Resolve labels on a background thread
    #[arg(long = "worker")]
    pub worker: bool,

    /// Draw collision rectangles over the output
    #[arg(long = "debug")]
    pub debug: bool,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let scale = args.scale.clamp(config.zoom.min_scale, config.zoom.max_scale);

    let data = GraphData::load(&args.input)
        .with_context(|| format!("loading dataset {}", args.input.display()))?;
    let links = data.links.clone();
    let nodes = data.into_graph_nodes();
    info!(nodes = nodes.len(), links = links.len(), "dataset loaded");

    let mut pipeline = if args.worker {
        FramePipeline::with_worker(config.clone())
    } else {
        FramePipeline::inline(config.clone())
    };
    let mut sim = Simulation::new(nodes, &links, config.physics.clone());

    for _ in 0..args.frames {
        let forces = pipeline
            .on_frame(&sim.nodes, scale, args.width, args.height)
            .forces
            .clone();
        sim.step(&forces);
    }
    // One more pass so the rendered labels match the settled positions.
    pipeline.on_frame(&sim.nodes, scale, args.width, args.height);
    let frame = pipeline.settle().clone();

    let stats = pipeline.stats();
    info!(
        frames = stats.frames,
        visible = frame.visible_nodes.len(),
        node_collisions = stats.node_collisions,
        label_collisions = stats.label_collisions,
        "simulation finished"
    );

    let theme = Theme::dark();
    let svg = render_svg(
        &sim.nodes,
        &sim.link_endpoints(),
        &frame,
        scale,
        &theme,
        &config,
        args.debug,
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, &svg)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(svg.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    if let Some(path) = &args.dump {
        write_frame_dump(path, &sim.nodes, &frame, scale)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
