use dropbot_agents::config::PoiConfig;
use dropbot_agents::keys::JUMP_DESTINATION;
use dropbot_agents::{
    BotConfig, BotManager, CreateAgentError, Phase, PoiPool, SandboxWorld,
};
use dropbot_core::{BotId, TickContext, Vec3};

fn config() -> BotConfig {
    BotConfig {
        service_jitter_seconds: 0.0,
        ..BotConfig::default()
    }
}

fn solo_pool() -> PoiPool {
    let mut pool = PoiPool::new(PoiConfig::default());
    pool.add("Solo", Vec3::new(1_000.0, 1_000.0, 0.0), 1, 1, false)
        .unwrap();
    pool
}

#[test]
fn duplicate_agents_are_rejected() {
    let mut manager = BotManager::<SandboxWorld>::new(config(), PoiPool::default());
    manager.create_agent(BotId(1), 0.0).unwrap();
    assert_eq!(
        manager.create_agent(BotId(1), 1.0),
        Err(CreateAgentError::AlreadyExists("BotId(1)".into()))
    );
    assert_eq!(manager.len(), 1);
}

#[test]
fn population_is_capped() {
    let config = BotConfig {
        max_agents: 2,
        ..config()
    };
    let mut manager = BotManager::<SandboxWorld>::new(config, PoiPool::default());
    manager.create_agent(BotId(1), 0.0).unwrap();
    manager.create_agent(BotId(2), 0.0).unwrap();
    assert_eq!(
        manager.create_agent(BotId(3), 0.0),
        Err(CreateAgentError::PopulationFull { max: 2 })
    );

    manager.destroy_agent(BotId(1)).unwrap();
    manager.create_agent(BotId(3), 0.0).unwrap();
    assert_eq!(
        manager.agents().collect::<Vec<_>>(),
        vec![BotId(2), BotId(3)]
    );
}

#[test]
fn destroy_returns_final_state() {
    let mut manager = BotManager::<SandboxWorld>::new(config(), PoiPool::default());
    manager.create_agent(BotId(7), 12.0).unwrap();

    let state = manager.destroy_agent(BotId(7)).unwrap();
    assert_eq!(state.phase, Phase::Boarding);
    assert_eq!(state.spawn_time, 12.0);
    assert!(!manager.contains(BotId(7)));
    assert!(manager.destroy_agent(BotId(7)).is_none());
}

#[test]
fn dead_and_missing_bodies_are_skipped() {
    let mut world = SandboxWorld::new();
    let body = world.spawn_bot(BotId(1), Vec3::ZERO, None);
    world.spawn_bot(BotId(2), Vec3::ZERO, None);
    world.spawn_bot(BotId(3), Vec3::ZERO, None);
    assert!(world.remove_bot(BotId(3)).is_some());

    let mut manager = BotManager::new(config(), PoiPool::default());
    for id in 1..=3 {
        manager.create_agent(BotId(id), 0.0).unwrap();
    }
    let ctx = TickContext::fixed_step(0, 0.25, 0);

    // BotId(3) has no body in the world.
    assert_eq!(manager.tick(&ctx, &mut world), 2);

    world.kill(body);
    let ctx = TickContext::fixed_step(1, 0.25, 0);
    assert_eq!(manager.tick(&ctx, &mut world), 1);
    assert_eq!(manager.tick_agent(&ctx, BotId(1), &mut world), None);
    assert!(manager.tick_agent(&ctx, BotId(2), &mut world).is_some());
    assert_eq!(manager.tick_agent(&ctx, BotId(9), &mut world), None);
}

#[test]
fn spawn_location_becomes_the_jump_destination() {
    let mut manager = BotManager::<SandboxWorld>::new(config(), solo_pool());
    manager.create_agent(BotId(1), 0.0).unwrap();

    let placement = manager.spawn_location(Some(BotId(1))).unwrap();
    assert_eq!(placement.poi, "Solo");
    let bb = manager.blackboard(BotId(1)).unwrap();
    assert_eq!(bb.get(JUMP_DESTINATION), Some(&placement.location));
    assert_eq!(manager.pois().get("Solo").unwrap().occupancy, 1);
}

#[test]
fn unlanded_bot_gives_its_poi_slot_back() {
    let mut manager = BotManager::<SandboxWorld>::new(config(), solo_pool());
    manager.create_agent(BotId(1), 0.0).unwrap();
    manager.spawn_location(Some(BotId(1))).unwrap();

    manager.destroy_agent(BotId(1));
    assert_eq!(manager.pois().get("Solo").unwrap().occupancy, 0);
}

#[test]
fn landed_bot_keeps_its_poi_slot_taken() {
    let mut manager = BotManager::<SandboxWorld>::new(config(), solo_pool());
    manager.create_agent(BotId(1), 0.0).unwrap();
    manager.spawn_location(Some(BotId(1))).unwrap();
    manager.agent_state_mut(BotId(1)).unwrap().phase = Phase::Landed;

    manager.destroy_agent(BotId(1));
    assert_eq!(manager.pois().get("Solo").unwrap().occupancy, 1);
}

#[test]
fn phase_counts_cover_every_bot() {
    let mut ground = config();
    ground.lifecycle.spawn_in_transport = false;
    let mut manager = BotManager::<SandboxWorld>::new(config(), PoiPool::default());
    manager.create_agent(BotId(1), 0.0).unwrap();
    manager.create_agent(BotId(2), 0.0).unwrap();
    manager.agent_state_mut(BotId(2)).unwrap().phase = Phase::Falling;

    let counts = manager.phase_counts();
    assert_eq!(counts.get(&Phase::Boarding), Some(&1));
    assert_eq!(counts.get(&Phase::Falling), Some(&1));
    assert_eq!(counts.get(&Phase::Landed), None);

    let mut landed = BotManager::<SandboxWorld>::new(ground, PoiPool::default());
    landed.create_agent(BotId(1), 0.0).unwrap();
    assert_eq!(landed.phase_counts().get(&Phase::Landed), Some(&1));
}
