//! dropbot-sim - headless match harness.
//!
//! - `dropbot-sim run` - board bots onto the transport and play a sandbox match
//! - `dropbot-sim pois` - show how spawn draws spread over the demo map
//! - `dropbot-sim init` - write a config file with every default spelled out

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use dropbot_agents::{
    BotConfig, BotManager, ItemKind, PoiPool, SafeZone, SandboxCommand, SandboxWorld,
};
use dropbot_core::{BotId, DeterministicRng, SplitMix64, TickContext, Vec3};
use dropbot_tools::{TraceLog, TRACE_LOG};

#[derive(Parser)]
#[command(name = "dropbot-sim")]
#[command(about = "Headless drop-in match harness", version)]
struct Cli {
    /// Bot config (YAML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a sandbox match
    Run {
        /// Number of bots to board
        #[arg(long, default_value_t = 20)]
        bots: u32,

        /// Simulated match length
        #[arg(long, default_value_t = 60.0)]
        seconds: f64,

        /// Fixed tick rate
        #[arg(long, default_value_t = 30)]
        tick_hz: u32,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Count trace events per tag
        #[arg(long)]
        trace: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sample spawn POI selection on the demo map
    Pois {
        /// Number of draws
        #[arg(long, default_value_t = 1000)]
        draws: u32,
    },

    /// Write a default config file
    Init {
        /// Destination path
        #[arg(default_value = "dropbot.yaml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            bots,
            seconds,
            tick_hz,
            seed,
            trace,
            json,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            let summary = run_match(config, bots, seconds, tick_hz, trace)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(())
        }
        Commands::Pois { draws } => {
            let config = load_config(cli.config.as_deref())?;
            sample_pois(&config, draws)
        }
        Commands::Init { path } => init_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    match path {
        Some(path) => BotConfig::load(path)
            .with_context(|| format!("loading bot config from {}", path.display())),
        None => Ok(BotConfig::default()),
    }
}

#[derive(Debug, Serialize)]
struct MatchSummary {
    seed: u64,
    bots: u32,
    seconds: f64,
    ticks: u64,
    alive: usize,
    phases: BTreeMap<String, usize>,
    commands: BTreeMap<String, usize>,
    stuck_recoveries: u32,
    poi_reseeds: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    trace: BTreeMap<String, usize>,
}

/// Named anchors for a small square map: a few towns of different sizes plus scattered
/// landmarks that don't group.
fn demo_anchors() -> Vec<(String, Vec3)> {
    let towns = [
        ("Harbor", Vec3::new(-8_000.0, -6_000.0, 0.0), 9),
        ("Mill", Vec3::new(6_000.0, -7_000.0, 0.0), 5),
        ("Ridge", Vec3::new(7_500.0, 6_500.0, 0.0), 4),
        ("Camp", Vec3::new(-6_500.0, 7_000.0, 0.0), 2),
    ];
    let mut anchors = Vec::new();
    for (name, center, count) in towns {
        for i in 0..count {
            let angle = i as f32 * std::f32::consts::TAU / count as f32;
            let at = center + Vec3::new(angle.cos() * 600.0, angle.sin() * 600.0, 0.0);
            anchors.push((format!("{name}_{i}"), at));
        }
    }
    anchors.push(("Lighthouse".to_owned(), Vec3::new(0.0, -9_500.0, 0.0)));
    anchors.push(("Crater".to_owned(), Vec3::ZERO));
    anchors
}

fn demo_world(config: &BotConfig) -> SandboxWorld {
    let mut world = SandboxWorld::new();
    for (name, at) in demo_anchors() {
        world.add_named_anchor(name, at);
    }
    let anchors: Vec<Vec3> = world.named_anchors().iter().map(|(_, at)| *at).collect();
    world.set_spawn_anchors(anchors);

    world.set_transport(
        Some(Vec3::new(-10_000.0, 0.0, 12_000.0)),
        Vec3::new(800.0, 0.0, 0.0),
    );
    world.set_transport_unlocked(true);
    world.set_safe_zone(Some(SafeZone {
        center: Vec3::new(1_000.0, 500.0, 0.0),
        radius: 14_000.0,
    }));
    world.set_zone_shrink(60.0);

    let mut rng = SplitMix64::new(config.seed ^ 0x5eed);
    let kinds = [
        ItemKind::Healing,
        ItemKind::RangedWeapon,
        ItemKind::Ammo,
        ItemKind::Material,
    ];
    for i in 0..120usize {
        let at = Vec3::new(
            rng.range_f32(-10_000.0, 10_000.0),
            rng.range_f32(-10_000.0, 10_000.0),
            0.0,
        );
        if i % 6 == 0 {
            world.add_container(at);
        } else {
            world.add_pickup(at, kinds[i % kinds.len()]);
        }
    }
    world
}

fn demo_pool(world: &SandboxWorld, config: &BotConfig) -> Result<PoiPool> {
    PoiPool::from_named_anchors(
        world
            .named_anchors()
            .iter()
            .map(|(name, at)| (name.as_str(), *at)),
        config.poi.clone(),
    )
    .context("failed to build POI pool from map anchors")
}

fn run_match(
    config: BotConfig,
    bots: u32,
    seconds: f64,
    tick_hz: u32,
    trace: bool,
) -> Result<MatchSummary> {
    anyhow::ensure!(tick_hz > 0, "tick rate must be positive");
    let dt = 1.0 / tick_hz as f32;
    let ticks = (seconds * f64::from(tick_hz)).ceil() as u64;
    let seed = config.seed;

    let mut world = demo_world(&config);
    let pool = demo_pool(&world, &config)?;
    tracing::info!(pois = pool.len(), bots, seed, "starting match");

    let mut manager = BotManager::new(config, pool);
    for i in 0..bots {
        let id = BotId(i);
        world.board_bot(id, Some((i % 4) as u8));
        manager
            .create_agent(id, 0.0)
            .with_context(|| format!("registering bot {id}"))?;
        if trace {
            if let Some(bb) = manager.blackboard_mut(id) {
                bb.set(TRACE_LOG, TraceLog::default());
            }
        }
        manager.spawn_location(Some(id));
    }

    let mut commands: BTreeMap<String, usize> = BTreeMap::new();
    let report_every = u64::from(tick_hz) * 10;
    for tick in 0..ticks {
        let ctx = TickContext::fixed_step(tick, dt, seed);
        manager.tick(&ctx, &mut world);
        world.advance(dt);
        for command in world.take_commands() {
            *commands.entry(command_name(&command).to_owned()).or_insert(0) += 1;
        }
        if tick > 0 && tick % report_every == 0 {
            let phases = phase_names(&manager);
            tracing::info!(at = ctx.now_seconds, ?phases, "match progress");
        }
    }

    let mut trace_counts = BTreeMap::new();
    let mut stuck_recoveries = 0;
    let alive = world
        .bots()
        .filter(|(_, bot)| bot.vitals.is_alive())
        .count();
    for id in manager.agents().collect::<Vec<_>>() {
        if let Some(state) = manager.agent_state(id) {
            stuck_recoveries += state.stuck.recoveries;
        }
        if let Some(log) = manager.blackboard(id).and_then(|bb| bb.get(TRACE_LOG)) {
            for event in &log.events {
                *trace_counts.entry(event.tag.to_string()).or_insert(0) += 1;
            }
        }
    }

    Ok(MatchSummary {
        seed,
        bots,
        seconds,
        ticks,
        alive,
        phases: phase_names(&manager),
        commands,
        stuck_recoveries,
        poi_reseeds: manager.pois().reseeds(),
        trace: trace_counts,
    })
}

fn phase_names(manager: &BotManager<SandboxWorld>) -> BTreeMap<String, usize> {
    manager
        .phase_counts()
        .into_iter()
        .map(|(phase, n)| (phase.as_str().to_owned(), n))
        .collect()
}

fn command_name(command: &SandboxCommand) -> &'static str {
    match command {
        SandboxCommand::MoveTo { .. } => "move_to",
        SandboxCommand::StopMovement(_) => "stop_movement",
        SandboxCommand::Focus(..) => "focus",
        SandboxCommand::StartFire(_) => "start_fire",
        SandboxCommand::StopFire(_) => "stop_fire",
        SandboxCommand::Equip(..) => "equip",
        SandboxCommand::Pickup(..) => "pickup",
        SandboxCommand::OpenContainer(..) => "open_container",
        SandboxCommand::Reload(_) => "reload",
        SandboxCommand::Jump(_) => "jump",
        SandboxCommand::Teleport(..) => "teleport",
        SandboxCommand::BeginDescent(_) => "begin_descent",
        SandboxCommand::SetVitals(..) => "set_vitals",
        SandboxCommand::ThankDriver(_) => "thank_driver",
        SandboxCommand::PlaceBuild { .. } => "place_build",
    }
}

fn print_summary(summary: &MatchSummary) {
    println!("dropbot match summary");
    println!("=====================");
    println!();
    println!(
        "Seed {} | {} bots | {:.1}s over {} ticks",
        summary.seed, summary.bots, summary.seconds, summary.ticks
    );
    println!("Alive: {}", summary.alive);
    println!();
    println!("Phases:");
    for (phase, n) in &summary.phases {
        println!("  {phase:<10} {n}");
    }
    println!();
    println!("Commands:");
    for (name, n) in &summary.commands {
        println!("  {name:<16} {n}");
    }
    println!();
    println!("Stuck recoveries: {}", summary.stuck_recoveries);
    println!("POI reseeds: {}", summary.poi_reseeds);
    if !summary.trace.is_empty() {
        println!();
        println!("Trace events:");
        for (tag, n) in &summary.trace {
            println!("  {tag:<28} {n}");
        }
    }
}

fn sample_pois(config: &BotConfig, draws: u32) -> Result<()> {
    let world = demo_world(config);
    let mut pool = demo_pool(&world, config)?;
    anyhow::ensure!(!pool.is_empty(), "demo map produced no POIs");

    let mut rng = SplitMix64::new(config.seed);
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for _ in 0..draws {
        let placement = pool
            .select(&mut rng)
            .context("POI pool has no selectable entries")?;
        *counts.entry(placement.poi).or_insert(0) += 1;
    }

    println!("{:<12} {:>4} {:>8} {:>6} {:>7}", "POI", "tier", "capacity", "draws", "share");
    for point in pool.points() {
        let n = counts.get(&point.name).copied().unwrap_or(0);
        let share = f64::from(n) / f64::from(draws.max(1));
        println!(
            "{:<12} {:>4} {:>8} {:>6} {:>6.1}%",
            point.name,
            point.tier,
            point.capacity,
            n,
            share * 100.0
        );
    }
    println!();
    println!("Reseeds: {}", pool.reseeds());
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    anyhow::ensure!(
        !path.exists(),
        "{} already exists; refusing to overwrite",
        path.display()
    );
    let yaml = serde_yaml::to_string(&BotConfig::default())?;
    let content = format!("# dropbot bot configuration\n\n{yaml}");
    std::fs::write(path, content)
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote default config to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Tune the sections you care about and delete the rest");
    println!("  2. Run: dropbot-sim run --config {}", path.display());
    Ok(())
}
