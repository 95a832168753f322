use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use glam::Vec2;
use lifegrid_common::{CellCoord, LifeConfig};
use lifegrid_input::{Action, dispatch};
use lifegrid_kernel::{GridGeometry, GridSimulation, TickDriver, patterns};
use lifegrid_persist::GridStore;
use lifegrid_render::{CellShading, DebugTextRenderer, InstanceBatch, Renderer};
use lifegrid_tools::SimInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lifegrid-cli", about = "Headless host for the life grid")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// List the built-in patterns
    Patterns,
    /// Drive the simulation for a fixed number of frames
    Run(RunArgs),
    /// Record a seeded run and check that replaying its events matches
    Replay {
        /// Generations to simulate
        #[arg(short, long, default_value = "50")]
        generations: u64,
        /// RNG seed for the initial population
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Probability that a cell starts alive
        #[arg(short, long, default_value = "0.3")]
        density: f64,
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load the latest snapshot from a store and describe it
    Inspect {
        /// Store directory written by `run --save`
        store: PathBuf,
        /// Also describe this grid id
        #[arg(long)]
        cell: Option<usize>,
        /// Check the store's hash chain before loading
        #[arg(long)]
        verify: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Frames to run
    #[arg(short, long, default_value = "120")]
    frames: u64,
    /// Seconds per frame
    #[arg(long, default_value = "0.0166667")]
    dt: f32,
    /// Stamp a built-in pattern
    #[arg(short, long)]
    pattern: Option<String>,
    /// Pattern anchor column (defaults to the grid center)
    #[arg(long, requires = "pattern")]
    anchor_x: Option<i32>,
    /// Pattern anchor row (defaults to the grid center)
    #[arg(long, requires = "pattern")]
    anchor_z: Option<i32>,
    /// Seed a random population with this density
    #[arg(long, conflicts_with = "pattern")]
    random: Option<f64>,
    /// RNG seed for --random
    #[arg(long, default_value = "42")]
    seed: u64,
    /// Script of `<frame> <action>` lines fed as input
    #[arg(long)]
    script: Option<PathBuf>,
    /// Override the tick interval in seconds
    #[arg(long)]
    interval: Option<f32>,
    /// Start paused
    #[arg(long)]
    paused: bool,
    /// Print the grid after every generation
    #[arg(long)]
    render: bool,
    /// Save a snapshot into this store directory when done
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lifegrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lifegrid_common::crate_info());
            println!("kernel: {}", lifegrid_kernel::crate_info());
            println!("render: {}", lifegrid_render::crate_info());
            println!("input: {}", lifegrid_input::crate_info());
            println!("persist: {}", lifegrid_persist::crate_info());
            println!("tools: {}", lifegrid_tools::crate_info());
        }
        Commands::Patterns => {
            for pattern in patterns::PATTERNS {
                println!("{:<20} {} cells", pattern.name, pattern.cells.len());
            }
        }
        Commands::Run(args) => run(args)?,
        Commands::Replay {
            generations,
            seed,
            density,
            config,
        } => replay(generations, seed, density, config.as_deref())?,
        Commands::Inspect {
            store,
            cell,
            verify,
        } => inspect(&store, cell, verify)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LifeConfig> {
    match path {
        Some(path) => LifeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(LifeConfig::default()),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut sim = GridSimulation::from_config(&config.grid).context("invalid grid config")?;
    let mut driver = TickDriver::from_config(&config.tick).context("invalid tick config")?;
    if let Some(interval) = args.interval {
        driver.set_interval(interval)?;
    }
    if args.paused {
        driver.set_paused(true);
    }

    let (columns, rows) = sim.dimensions();
    if let Some(name) = &args.pattern {
        let Some(pattern) = patterns::find(name) else {
            bail!("unknown pattern `{name}` (see `lifegrid-cli patterns`)");
        };
        let anchor = CellCoord::new(
            args.anchor_x.unwrap_or(columns as i32 / 2),
            args.anchor_z.unwrap_or(rows as i32 / 2),
        );
        sim.stamp(pattern, anchor);
    }
    if let Some(density) = args.random {
        if !(0.0..=1.0).contains(&density) {
            bail!("--random density must be within [0, 1], got {density}");
        }
        sim.seed_random(density, args.seed);
    }

    let script = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let mut shading = CellShading::new(sim.cell_count(), &config.palette)?;
    let mut batch = InstanceBatch::build(sim.geometry(), &shading);
    let renderer = DebugTextRenderer::new();

    tracing::info!(
        columns,
        rows,
        frames = args.frames,
        interval = driver.interval(),
        population = sim.population(),
        "run started"
    );

    let mut pending = script.iter().peekable();
    for frame in 0..args.frames {
        while let Some((_, action)) = pending.next_if(|(at, _)| *at == frame) {
            dispatch(*action, &mut sim, &mut driver);
        }

        let events = sim.drain_events();
        shading.observe(&events, sim.cells());
        if !driver.is_paused() {
            shading.fade(sim.cells(), args.dt);
        }
        batch.refresh_colors(&shading);

        if let Some(stats) = driver.advance(args.dt, &mut sim) {
            tracing::debug!(
                frame,
                generation = stats.generation,
                births = stats.births,
                deaths = stats.deaths,
                "tick"
            );
            if args.render {
                println!("{}", renderer.render(&sim));
            }
        }
    }

    println!("{}", SimInspector::summary(&sim, &driver));
    println!(
        "instances: {} ({} bytes)",
        batch.len(),
        batch.as_bytes().len()
    );
    if !args.render {
        println!("{}", renderer.render(&sim));
    }

    if let Some(dir) = &args.save {
        let mut store = GridStore::open(dir)
            .with_context(|| format!("failed to open store {}", dir.display()))?;
        let index = store.save_snapshot(&sim)?;
        println!("saved snapshot {index} to {}", dir.display());
    }

    Ok(())
}

/// Parse `<frame> <action>` lines. Blank lines and `#` comments are skipped.
fn load_script(path: &Path) -> anyhow::Result<Vec<(u64, Action)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let mut script = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (frame, action) = line
            .split_once(char::is_whitespace)
            .with_context(|| format!("line {}: expected `<frame> <action>`", number + 1))?;
        let frame: u64 = frame
            .parse()
            .with_context(|| format!("line {}: bad frame `{frame}`", number + 1))?;
        let action: Action = action
            .parse()
            .with_context(|| format!("line {}: bad action", number + 1))?;
        script.push((frame, action));
    }
    script.sort_by_key(|(frame, _)| *frame);
    tracing::debug!(actions = script.len(), "script loaded");
    Ok(script)
}

fn replay(generations: u64, seed: u64, density: f64, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let geometry = GridGeometry::from_config(&config.grid)?;

    let mut recorded = GridSimulation::new(geometry);
    recorded.seed_random(density, seed);
    for _ in 0..generations {
        recorded.step();
    }

    let replayed = GridSimulation::replay(geometry, recorded.events());
    println!(
        "Recorded: generation={}, population={}, hash={:#018x}",
        recorded.generation(),
        recorded.population(),
        recorded.state_hash()
    );
    println!(
        "Replayed: generation={}, population={}, hash={:#018x}",
        replayed.generation(),
        replayed.population(),
        replayed.state_hash()
    );
    if recorded.state_hash() != replayed.state_hash() {
        bail!("replay diverged from the recorded run");
    }
    println!("Match: OK");
    Ok(())
}

fn inspect(dir: &Path, cell: Option<usize>, verify: bool) -> anyhow::Result<()> {
    let store =
        GridStore::open(dir).with_context(|| format!("failed to open store {}", dir.display()))?;
    if verify {
        store.verify_integrity().context("integrity check failed")?;
        println!("integrity: OK ({} snapshots)", store.meta().snapshot_count);
    }

    let snapshot = store.load_latest()?;
    let geometry = GridGeometry::new(
        Vec2::ZERO,
        Vec2::new(snapshot.columns as f32, snapshot.rows as f32),
        1.0,
    )?;
    let sim = snapshot.restore(geometry)?;
    let mut driver = TickDriver::new(LifeConfig::default().tick.interval)?;
    driver.set_paused(true);

    println!("{}", SimInspector::summary(&sim, &driver));
    if let Some(id) = cell {
        match SimInspector::inspect_cell(&sim, id) {
            Some(info) => println!("{info}"),
            None => println!("cell {id} is outside the grid"),
        }
    }
    println!("{}", DebugTextRenderer::new().render(&sim));
    Ok(())
}
