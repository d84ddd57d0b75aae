use dropbot_agents::keys::{HAS_LANDED, JUMP_DESTINATION};
use dropbot_agents::{BotConfig, BotManager, Phase, PoiPool, SandboxCommand, SandboxWorld};
use dropbot_core::{BotId, TickContext, Vec3};
use dropbot_tools::{TraceLog, TRACE_LOG};

const BOT: BotId = BotId(1);
const DT: f32 = 0.25;

fn config() -> BotConfig {
    BotConfig {
        seed: 7,
        service_jitter_seconds: 0.0,
        ..BotConfig::default()
    }
}

fn boarded(transport: Vec3, unlocked: bool) -> (BotManager<SandboxWorld>, SandboxWorld) {
    let mut world = SandboxWorld::new();
    world.set_transport(Some(transport), Vec3::ZERO);
    world.set_transport_unlocked(unlocked);
    world.board_bot(BOT, Some(1));

    let mut manager = BotManager::new(config(), PoiPool::default());
    manager.create_agent(BOT, 0.0).unwrap();
    manager
        .blackboard_mut(BOT)
        .unwrap()
        .set(TRACE_LOG, TraceLog::default());
    (manager, world)
}

fn step(manager: &mut BotManager<SandboxWorld>, world: &mut SandboxWorld, tick: u64) {
    manager.tick(&TickContext::fixed_step(tick, DT, 7), world);
    world.advance(DT);
}

fn phase(manager: &BotManager<SandboxWorld>) -> Phase {
    manager.agent_state(BOT).unwrap().phase
}

#[test]
fn jumps_exactly_once_when_delay_elapses_at_five_seconds() {
    let (mut manager, mut world) = boarded(Vec3::new(0.0, 0.0, 20_000.0), true);
    manager.agent_state_mut(BOT).unwrap().jump_ready_at = 5.0;

    let mut left_transport_at = None;
    for tick in 0..=40 {
        step(&mut manager, &mut world, tick);
        if left_transport_at.is_none() && phase(&manager) != Phase::Boarding {
            left_transport_at = Some(tick);
        }
    }

    // Tick 20 is t = 5.0s at 4 Hz.
    assert_eq!(left_transport_at, Some(20));
    let state = manager.agent_state(BOT).unwrap();
    assert_eq!(state.jumps, 1);
    assert_eq!(state.phase, Phase::Falling);

    let log = manager.blackboard(BOT).unwrap().get(TRACE_LOG).unwrap();
    assert_eq!(log.count("bot.phase.jumping"), 1);
    assert_eq!(log.last("bot.phase.jumping").map(|e| e.tick), Some(20));

    let teleports = world
        .commands_for(BOT)
        .filter(|c| matches!(c, SandboxCommand::Teleport(..)))
        .count();
    assert_eq!(teleports, 1);
}

#[test]
fn locked_transport_holds_the_bot() {
    let (mut manager, mut world) = boarded(Vec3::new(0.0, 0.0, 20_000.0), false);
    manager.agent_state_mut(BOT).unwrap().jump_ready_at = 0.0;

    for tick in 0..20 {
        step(&mut manager, &mut world, tick);
    }
    assert_eq!(phase(&manager), Phase::Boarding);

    world.set_transport_unlocked(true);
    step(&mut manager, &mut world, 20);
    assert_eq!(phase(&manager), Phase::Falling);
}

#[test]
fn jump_resets_vitals_to_spawn_values() {
    let (mut manager, mut world) = boarded(Vec3::new(0.0, 0.0, 20_000.0), true);
    manager.agent_state_mut(BOT).unwrap().jump_ready_at = 0.0;
    world.bot_mut(BOT).unwrap().vitals.shield = 75.0;

    step(&mut manager, &mut world, 0);

    let vitals = world.bot(BOT).unwrap().vitals;
    assert_eq!(vitals.health, 100.0);
    assert_eq!(vitals.shield, 0.0);
    assert!(world.bot(BOT).unwrap().airborne);
}

#[test]
fn descent_steers_to_destination_and_lands_once() {
    let (mut manager, mut world) = boarded(Vec3::new(0.0, 0.0, 1_500.0), true);
    manager.agent_state_mut(BOT).unwrap().jump_ready_at = 0.0;
    manager
        .blackboard_mut(BOT)
        .unwrap()
        .set(JUMP_DESTINATION, Vec3::new(2_000.0, 0.0, 0.0));

    for tick in 0..12 {
        step(&mut manager, &mut world, tick);
    }

    assert_eq!(phase(&manager), Phase::Landed);
    let bb = manager.blackboard(BOT).unwrap();
    assert!(bb.is_set(HAS_LANDED));
    assert_eq!(bb.get(TRACE_LOG).unwrap().count("bot.phase.landed"), 1);

    let bot = world.bot(BOT).unwrap();
    assert!(!bot.airborne);
    assert!(bot.position.x > 0.0);
    assert_eq!(
        manager.agent_state(BOT).unwrap().descent_target,
        Some(Vec3::new(2_000.0, 0.0, 0.0))
    );
}

#[test]
fn courtesy_fires_once_while_boarding() {
    let (mut manager, mut world) = boarded(Vec3::new(0.0, 0.0, 20_000.0), false);

    for tick in 0..40 {
        step(&mut manager, &mut world, tick);
    }

    let state = manager.agent_state(BOT).unwrap();
    assert!(state.thanked);
    let thanks = world
        .commands_for(BOT)
        .filter(|c| matches!(c, SandboxCommand::ThankDriver(_)))
        .count();
    assert_eq!(thanks, 1);

    let deadline = state.courtesy_at.unwrap();
    let log = manager.blackboard(BOT).unwrap().get(TRACE_LOG).unwrap();
    let fired_at = log.last("bot.courtesy").unwrap().tick as f64 * f64::from(DT);
    assert!(fired_at >= deadline);
    assert!(fired_at < deadline + f64::from(DT));
}

#[test]
fn courtesy_rate_mode_still_fires_at_most_once() {
    let mut config = config();
    config.lifecycle.courtesy_mode = dropbot_agents::config::CourtesyMode::Rate;
    config.lifecycle.courtesy_rate_per_second = 50.0;

    let mut world = SandboxWorld::new();
    world.set_transport(Some(Vec3::new(0.0, 0.0, 20_000.0)), Vec3::ZERO);
    world.board_bot(BOT, None);
    let mut manager = BotManager::new(config, PoiPool::default());
    manager.create_agent(BOT, 0.0).unwrap();

    for tick in 0..40 {
        step(&mut manager, &mut world, tick);
    }

    let thanks = world
        .commands_for(BOT)
        .filter(|c| matches!(c, SandboxCommand::ThankDriver(_)))
        .count();
    assert_eq!(thanks, 1);
}

#[test]
fn disabled_courtesy_never_fires() {
    let mut config = config();
    config.features.courtesy = false;

    let mut world = SandboxWorld::new();
    world.set_transport(Some(Vec3::new(0.0, 0.0, 20_000.0)), Vec3::ZERO);
    world.board_bot(BOT, None);
    let mut manager = BotManager::new(config, PoiPool::default());
    manager.create_agent(BOT, 0.0).unwrap();

    for tick in 0..40 {
        step(&mut manager, &mut world, tick);
    }
    assert!(!manager.agent_state(BOT).unwrap().thanked);
}
