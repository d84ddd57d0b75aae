use dropbot_agents::tree::{LANDED, ROOT, TRANSPORT};
use dropbot_agents::{BotConfig, BotManager, PoiPool, SandboxWorld};
use dropbot_bt::Node;
use dropbot_core::BotId;

fn landed_children(config: BotConfig) -> (Vec<String>, Vec<String>) {
    let mut manager = BotManager::<SandboxWorld>::new(config, PoiPool::default());
    manager.create_agent(BotId(1), 0.0).unwrap();
    let tree = manager.tree(BotId(1)).unwrap();
    assert_eq!(tree.root().name(), ROOT);

    let landed = tree
        .root()
        .children()
        .iter()
        .find_map(|child| match child {
            Node::Selector(selector) if selector.name() == LANDED => Some(selector),
            _ => None,
        })
        .unwrap();
    let children = landed.children().iter().map(|c| c.name().to_owned()).collect();
    let services = landed.services().iter().map(|s| s.name().to_owned()).collect();
    (children, services)
}

#[test]
fn full_tree_has_every_branch_in_priority_order() {
    let (children, services) = landed_children(BotConfig::default());
    assert_eq!(
        children,
        ["Flee Hazard", "Recover", "Build", "Engage", "Loot", "Wander"]
    );
    assert_eq!(
        services,
        ["Stuck Check", "Target Scan", "Upkeep", "Look Around"]
    );
}

#[test]
fn disabled_features_leave_their_branches_out() {
    let mut config = BotConfig::default();
    config.features.building = false;
    config.features.looting = false;
    config.features.stuck_detection = false;
    config.features.look_around = false;
    let (children, services) = landed_children(config);
    assert_eq!(children, ["Flee Hazard", "Engage", "Wander"]);
    assert_eq!(services, ["Target Scan", "Upkeep"]);

    let mut config = BotConfig::default();
    config.features.combat = false;
    config.features.building = false;
    let (children, services) = landed_children(config);
    assert_eq!(children, ["Flee Hazard", "Recover", "Loot", "Wander"]);
    assert_eq!(services, ["Stuck Check", "Upkeep", "Look Around"]);
}

#[test]
fn transport_branch_is_registered_for_reuse() {
    let mut manager = BotManager::<SandboxWorld>::new(BotConfig::default(), PoiPool::default());
    manager.create_agent(BotId(1), 0.0).unwrap();
    let tree = manager.tree(BotId(1)).unwrap();

    assert_eq!(tree.registered_names().collect::<Vec<_>>(), [TRANSPORT]);
    let transport = tree.find_selector(TRANSPORT).unwrap();
    let transport = transport.borrow();
    assert_eq!(transport.services().len(), 1);
    assert_eq!(transport.services()[0].interval(), 0.0);
}

#[test]
fn service_jitter_never_exceeds_its_bound() {
    let config = BotConfig {
        service_jitter_seconds: 0.5,
        ..BotConfig::default()
    };
    let mut manager = BotManager::<SandboxWorld>::new(config, PoiPool::default());
    for id in 0..20 {
        manager.create_agent(BotId(id), 0.0).unwrap();
    }
    assert_eq!(manager.config().service_jitter_seconds, 0.5);

    for id in 0..20 {
        let tree = manager.tree(BotId(id)).unwrap();
        for child in tree.root().children() {
            if let Node::Selector(selector) = child {
                for service in selector.services() {
                    assert!((0.0..0.5).contains(&service.initial_delay()));
                }
            }
        }
    }
}
