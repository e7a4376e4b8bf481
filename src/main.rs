use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use graphorbit::snapshot::{LayoutSnapshot, ReplayScript};
use graphorbit::{FrameDriver, GraphSpec, GraphView, ViewConfig, Viewport};

/// Headless driver for the force-directed graph view.
#[derive(Parser)]
#[command(name = "graphorbit")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a graph declaration and report dropped relations
    Validate {
        /// Graph file (.yaml, .yml or .json)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Run the layout and write the final positions as JSON
    Simulate {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Feed a recorded input script through the view
    Replay {
        #[command(flatten)]
        run: RunArgs,

        /// Recorded steps (.yaml, .yml or .json)
        #[arg(short, long)]
        events: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Graph file (.yaml, .yml or .json)
    #[arg(short, long)]
    input: PathBuf,

    /// View configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to run (after the script, when replaying)
    #[arg(short, long, default_value = "600")]
    frames: u64,

    /// Seconds per frame
    #[arg(long, default_value = "0.016666668")]
    dt: f32,

    /// Seed for the layout's random jitter, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Output file for the layout JSON (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long, default_value = "800x600", value_parser = parse_viewport)]
    viewport: Viewport,
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: f32 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f32 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(Viewport::new(width, height))
}

impl RunArgs {
    fn build(&self) -> anyhow::Result<(GraphView, FrameDriver)> {
        let spec = GraphSpec::load(&self.input)
            .with_context(|| format!("loading graph {}", self.input.display()))?;
        let mut config = match &self.config {
            Some(path) => ViewConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ViewConfig::default(),
        };
        if self.seed.is_some() {
            config.layout.seed = self.seed;
        }
        let view = GraphView::new(&spec, &config, self.viewport);
        Ok((view, FrameDriver::new(self.dt)))
    }
}

fn write_json(value: &impl serde::Serialize, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "layout written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn validate(input: &Path) -> anyhow::Result<()> {
    let spec = GraphSpec::load(input)?;
    let graph = graphorbit::Graph::build(&spec, 0.0);
    println!(
        "{}: {} nodes, {} relations",
        input.display(),
        graph.len(),
        graph.relations().len()
    );
    for diagnostic in graph.diagnostics() {
        println!("  warning: {diagnostic}");
    }
    Ok(())
}

fn simulate(run: &RunArgs) -> anyhow::Result<()> {
    let (mut view, mut driver) = run.build()?;
    driver.run(&mut view, run.frames);
    let snapshot = LayoutSnapshot::capture(&view, &driver);
    info!(
        frames = snapshot.frames,
        energy = snapshot.kinetic_energy,
        "simulation finished"
    );
    write_json(&snapshot, run.output.as_deref())
}

fn replay(run: &RunArgs, events: &Path) -> anyhow::Result<()> {
    let script = ReplayScript::load(events)
        .with_context(|| format!("loading events {}", events.display()))?;
    let (view, mut driver) = run.build()?;
    let (mut view, report) = script.run(view, &mut driver);
    driver.run(&mut view, run.frames);

    for selection in &report.selections {
        match selection {
            Some(name) => eprintln!("selected {name}"),
            None => eprintln!("selection cleared"),
        }
    }
    info!(
        events = report.events,
        prevented = report.prevented,
        "replay finished"
    );
    write_json(&LayoutSnapshot::capture(&view, &driver), run.output.as_deref())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => validate(&input),
        Commands::Simulate { run } => simulate(&run),
        Commands::Replay { run, events } => replay(&run, &events),
    }
}
