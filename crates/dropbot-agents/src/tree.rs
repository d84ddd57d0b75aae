//! The bot behavior tree.
//!
//! ```text
//! Alive
//! ├── Boarding [Phase == Boarding]
//! │   └── Run Transport ──> Transport (services: Courtesy)
//! │                         ├── Jump
//! │                         └── Idle (wait)
//! ├── Descend [Phase == Falling]
//! └── Landed [Phase == Landed] (services: Stuck Check, Target Scan, Upkeep, Look Around)
//!     ├── Flee Hazard
//!     ├── Recover [IsRecovering]
//!     ├── Build [ThreatNearby]
//!     ├── Engage [HasTarget]
//!     ├── Loot
//!     └── Wander
//! ```
//!
//! Disabled features leave their branch or service out entirely.

use dropbot_bt::{CompositeSelector, Decorator, Node, RunSelector, Service, Tree, Wait};
use dropbot_core::SplitMix64;

use crate::build::DefensiveBuild;
use crate::combat::{Engage, TargetAcquisition};
use crate::config::BotConfig;
use crate::focus::LookAround;
use crate::hazard::FleeHazard;
use crate::keys;
use crate::lifecycle::{Courtesy, Descend, JumpFromTransport};
use crate::loot::Loot;
use crate::state::Phase;
use crate::stuck::{RecoverFromStuck, StuckCheck};
use crate::upkeep::Upkeep;
use crate::wander::Wander;
use crate::world::BotWorldMut;

pub const ROOT: &str = "Alive";
pub const TRANSPORT: &str = "Transport";
pub const LANDED: &str = "Landed";

/// Build one bot's tree. `rng` only jitters service start times.
pub fn build_bot_tree<W>(config: &BotConfig, rng: &mut SplitMix64) -> Tree<W>
where
    W: BotWorldMut + 'static,
{
    let jitter = config.service_jitter_seconds;
    let mut tree = Tree::new(CompositeSelector::new(ROOT));

    let mut transport = CompositeSelector::new(TRANSPORT)
        .with_child(Node::task("Jump", JumpFromTransport::new(&config.lifecycle)))
        .with_child(Node::task(
            "Idle",
            Wait::new(config.lifecycle.boarding_wait_seconds),
        ));
    if config.features.courtesy {
        transport.add_service(Service::new("Courtesy", 0.0, Courtesy::new(&config.lifecycle)));
    }
    let transport = tree.register(transport);

    let boarding = CompositeSelector::new("Boarding")
        .with_decorator(Decorator::enum_equals(keys::PHASE, Phase::Boarding))
        .with_child(Node::task("Run Transport", RunSelector::new(transport)));

    let descend = Node::task("Descend", Descend::new(&config.lifecycle))
        .with_decorator(Decorator::enum_equals(keys::PHASE, Phase::Falling));

    let mut landed = CompositeSelector::new(LANDED)
        .with_decorator(Decorator::enum_equals(keys::PHASE, Phase::Landed))
        .with_child(Node::task("Flee Hazard", FleeHazard::new(&config.hazard)));
    if config.features.stuck_detection {
        landed.add_child(
            Node::task("Recover", RecoverFromStuck::new(&config.stuck))
                .with_decorator(Decorator::is_set(keys::IS_RECOVERING)),
        );
    }
    if config.features.building {
        landed.add_child(
            Node::task("Build", DefensiveBuild::new(&config.build))
                .with_decorator(Decorator::is_set(keys::THREAT_NEARBY)),
        );
    }
    if config.features.combat {
        landed.add_child(
            Node::task("Engage", Engage::new(&config.combat))
                .with_decorator(Decorator::is_set(keys::HAS_TARGET)),
        );
    }
    if config.features.looting {
        landed.add_child(Node::task("Loot", Loot::new(&config.loot)));
    }
    landed.add_child(Node::task("Wander", Wander::new(&config.wander)));

    if config.features.stuck_detection {
        landed.add_service(
            Service::new(
                "Stuck Check",
                config.stuck.check_interval_seconds,
                StuckCheck::new(&config.stuck),
            )
            .with_jitter(rng, jitter),
        );
    }
    if config.features.combat || config.features.building {
        landed.add_service(
            Service::new(
                "Target Scan",
                config.combat.scan_interval_seconds,
                TargetAcquisition::new(&config.combat, &config.build),
            )
            .with_jitter(rng, jitter),
        );
    }
    landed.add_service(
        Service::new(
            "Upkeep",
            config.upkeep.interval_seconds,
            Upkeep::new(&config.upkeep),
        )
        .with_jitter(rng, jitter),
    );
    if config.features.look_around {
        landed.add_service(
            Service::new(
                "Look Around",
                config.focus.interval_seconds,
                LookAround::new(&config.focus),
            )
            .with_jitter(rng, jitter),
        );
    }

    let root = tree.root_mut();
    root.add_child(boarding);
    root.add_child(descend);
    root.add_child(landed);
    tree
}
