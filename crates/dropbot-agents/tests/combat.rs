use dropbot_agents::keys::{HAS_TARGET, TARGET_LOCATION, THREAT_NEARBY};
use dropbot_agents::{
    BotConfig, BotManager, ItemKind, PoiPool, SandboxCommand, SandboxWorld,
};
use dropbot_core::{BotId, EntityId, TickContext, Vec3};
use dropbot_tools::{TraceLog, TRACE_LOG};

const BOT: BotId = BotId(1);
const DT: f32 = 0.25;

fn landed_config() -> BotConfig {
    let mut config = BotConfig {
        seed: 5,
        service_jitter_seconds: 0.0,
        ..BotConfig::default()
    };
    config.lifecycle.spawn_in_transport = false;
    config.features.building = false;
    config.features.looting = false;
    config.features.stuck_detection = false;
    config
}

fn setup() -> (BotManager<SandboxWorld>, SandboxWorld) {
    let mut world = SandboxWorld::new();
    world.spawn_bot(BOT, Vec3::ZERO, Some(1));
    world.bot_mut(BOT).unwrap().frozen = true;

    let mut manager = BotManager::new(landed_config(), PoiPool::default());
    manager.create_agent(BOT, 0.0).unwrap();
    manager
        .blackboard_mut(BOT)
        .unwrap()
        .set(TRACE_LOG, TraceLog::default());
    (manager, world)
}

fn step(manager: &mut BotManager<SandboxWorld>, world: &mut SandboxWorld, tick: u64) {
    manager.tick(&TickContext::fixed_step(tick, DT, 5), world);
    world.advance(DT);
}

fn target(manager: &BotManager<SandboxWorld>) -> Option<EntityId> {
    manager.agent_state(BOT).unwrap().target
}

#[test]
fn locked_target_survives_until_cooldown_expires() {
    let (mut manager, mut world) = setup();
    let far = world.add_player(Vec3::new(1_000.0, 0.0, 0.0), Some(2));

    let mut near = None;
    for tick in 0..=8 {
        if tick == 2 {
            near = Some(world.add_player(Vec3::new(100.0, 0.0, 0.0), Some(2)));
        }
        step(&mut manager, &mut world, tick);
        if tick < 8 {
            assert_eq!(target(&manager), Some(far), "tick {tick}");
        }
    }

    // The scan at t = 2.0 is the first one past the lock.
    assert_eq!(target(&manager), near);
    let bb = manager.blackboard(BOT).unwrap();
    assert_eq!(bb.get(TARGET_LOCATION), Some(&Vec3::new(100.0, 0.0, 0.0)));
    let log = bb.get(TRACE_LOG).unwrap();
    assert_eq!(log.count("bot.target.switch"), 2);
    assert_eq!(log.last("bot.target.switch").map(|e| e.tick), Some(8));
}

#[test]
fn dead_target_is_replaced_at_the_next_scan() {
    let (mut manager, mut world) = setup();
    let first = world.add_player(Vec3::new(500.0, 0.0, 0.0), Some(2));
    let second = world.add_player(Vec3::new(0.0, 900.0, 0.0), Some(2));

    step(&mut manager, &mut world, 0);
    assert_eq!(target(&manager), Some(first));

    world.kill(first);
    for tick in 1..=4 {
        step(&mut manager, &mut world, tick);
    }

    // Still inside the lock window, but the old target is gone.
    assert_eq!(target(&manager), Some(second));
}

#[test]
fn empty_scan_clears_the_target() {
    let (mut manager, mut world) = setup();
    let only = world.add_player(Vec3::new(500.0, 0.0, 0.0), Some(2));
    step(&mut manager, &mut world, 0);
    assert!(manager.blackboard(BOT).unwrap().is_set(HAS_TARGET));

    world.remove_entity(only);
    for tick in 1..=4 {
        step(&mut manager, &mut world, tick);
    }

    let bb = manager.blackboard(BOT).unwrap();
    assert!(!bb.is_set(HAS_TARGET));
    assert!(!bb.is_set(THREAT_NEARBY));
    assert_eq!(target(&manager), None);
}

#[test]
fn teammates_are_ignored() {
    let (mut manager, mut world) = setup();
    world.add_player(Vec3::new(50.0, 0.0, 0.0), Some(1));
    for tick in 0..4 {
        step(&mut manager, &mut world, tick);
    }
    assert_eq!(target(&manager), None);
}

#[test]
fn engage_switches_to_ranged_weapon_and_fires() {
    let (mut manager, mut world) = setup();
    let melee = world.give_item(BOT, ItemKind::MeleeWeapon, 0).unwrap();
    let ranged = world.give_item(BOT, ItemKind::RangedWeapon, 12).unwrap();
    world.bot_mut(BOT).unwrap().equipped = Some(melee);
    world.add_player(Vec3::new(800.0, 0.0, 0.0), Some(2));

    // Tick 0 acquires the target, tick 1 engages.
    step(&mut manager, &mut world, 0);
    world.take_commands();
    step(&mut manager, &mut world, 1);

    let commands = world.take_commands();
    let equip = commands
        .iter()
        .position(|c| *c == SandboxCommand::Equip(BOT, ranged));
    let fire = commands
        .iter()
        .position(|c| *c == SandboxCommand::StartFire(BOT));
    assert!(equip.is_some());
    assert!(fire.is_some());
    assert!(equip < fire);

    let bot = world.bot(BOT).unwrap();
    assert_eq!(bot.equipped, Some(ranged));
    assert!(bot.firing);
    assert_eq!(bot.focal_point, Some(Vec3::new(800.0, 0.0, 0.0)));
}

#[test]
fn engage_closes_distance_outside_fire_range() {
    let (mut manager, mut world) = setup();
    world.add_player(Vec3::new(3_000.0, 0.0, 0.0), Some(2));

    step(&mut manager, &mut world, 0);
    world.take_commands();
    step(&mut manager, &mut world, 1);

    let commands = world.take_commands();
    assert!(commands.contains(&SandboxCommand::MoveTo {
        agent: BOT,
        target: Vec3::new(3_000.0, 0.0, 0.0),
        acceptance_radius: 200.0,
    }));
    assert!(!commands.contains(&SandboxCommand::StartFire(BOT)));
}

#[test]
fn engage_skips_empty_guns_and_leaves_a_held_consumable() {
    let (mut manager, mut world) = setup();
    let melee = world.give_item(BOT, ItemKind::MeleeWeapon, 0).unwrap();
    let empty = world.give_item(BOT, ItemKind::RangedWeapon, 0).unwrap();
    world.bot_mut(BOT).unwrap().equipped = Some(melee);
    world.add_player(Vec3::new(800.0, 0.0, 0.0), Some(2));

    for tick in 0..=1 {
        step(&mut manager, &mut world, tick);
    }
    assert!(!world
        .commands()
        .contains(&SandboxCommand::Equip(BOT, empty)));
    assert_eq!(world.bot(BOT).unwrap().equipped, Some(melee));

    let bandage = world.give_item(BOT, ItemKind::Healing, 0).unwrap();
    let loaded = world.give_item(BOT, ItemKind::RangedWeapon, 12).unwrap();
    world.bot_mut(BOT).unwrap().equipped = Some(bandage);
    world.take_commands();
    step(&mut manager, &mut world, 2);

    let commands = world.take_commands();
    assert!(!commands.contains(&SandboxCommand::Equip(BOT, loaded)));
    assert!(commands.contains(&SandboxCommand::StartFire(BOT)));
    assert_eq!(world.bot(BOT).unwrap().equipped, Some(bandage));
}
