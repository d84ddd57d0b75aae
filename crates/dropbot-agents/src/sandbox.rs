//! In-memory world for tests and the headless harness.
//!
//! Movement is a straight-line walk at a fixed speed, airborne bots fall at a fixed rate, and
//! every command is appended to a log that tests can inspect.

use std::collections::BTreeMap;

use dropbot_core::{BotId, EntityId, Vec3, WorldMut, WorldView};

use crate::world::{
    BotWorldMut, BotWorldView, BuildPiece, EntityCategory, EntityKind, InventoryItem, ItemId,
    ItemKind, MoveRequest, MoveStatus, SafeZone, Vitals, WorldEntity,
};

/// Rounds loaded into a ranged weapon by a pickup or reload.
const MAGAZINE: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum SandboxCommand {
    MoveTo {
        agent: BotId,
        target: Vec3,
        acceptance_radius: f32,
    },
    StopMovement(BotId),
    Focus(BotId, Option<Vec3>),
    StartFire(BotId),
    StopFire(BotId),
    Equip(BotId, ItemId),
    Pickup(BotId, EntityId),
    OpenContainer(BotId, EntityId),
    Reload(BotId),
    Jump(BotId),
    Teleport(BotId, Vec3),
    BeginDescent(BotId),
    SetVitals(BotId, Vitals),
    ThankDriver(BotId),
    PlaceBuild {
        agent: BotId,
        piece: BuildPiece,
        location: Vec3,
    },
}

impl SandboxCommand {
    pub fn agent(&self) -> BotId {
        match *self {
            SandboxCommand::MoveTo { agent, .. } | SandboxCommand::PlaceBuild { agent, .. } => {
                agent
            }
            SandboxCommand::StopMovement(a)
            | SandboxCommand::Focus(a, _)
            | SandboxCommand::StartFire(a)
            | SandboxCommand::StopFire(a)
            | SandboxCommand::Equip(a, _)
            | SandboxCommand::Pickup(a, _)
            | SandboxCommand::OpenContainer(a, _)
            | SandboxCommand::Reload(a)
            | SandboxCommand::Jump(a)
            | SandboxCommand::Teleport(a, _)
            | SandboxCommand::BeginDescent(a)
            | SandboxCommand::SetVitals(a, _)
            | SandboxCommand::ThankDriver(a) => a,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxBot {
    pub entity: EntityId,
    pub team: Option<u8>,
    pub position: Vec3,
    pub vitals: Vitals,
    pub in_transport: bool,
    pub airborne: bool,
    pub move_goal: Option<(Vec3, f32)>,
    pub move_status: MoveStatus,
    pub inventory: Vec<InventoryItem>,
    pub equipped: Option<ItemId>,
    pub focal_point: Option<Vec3>,
    pub firing: bool,
    /// Pinned in place: accepts move commands but never gets anywhere.
    pub frozen: bool,
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    bots: BTreeMap<BotId, SandboxBot>,
    entities: BTreeMap<EntityId, WorldEntity>,
    next_entity: u64,
    next_item: u64,
    safe_zone: Option<SafeZone>,
    zone_shrink_per_second: f32,
    transport_unlocked: bool,
    transport: Option<Vec3>,
    transport_velocity: Vec3,
    spawn_anchors: Vec<Vec3>,
    named_anchors: Vec<(String, Vec3)>,
    commands: Vec<SandboxCommand>,
    pub run_speed: f32,
    pub fall_speed: f32,
    pub ground_height: f32,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldView for SandboxWorld {
    type Agent = BotId;
}

impl WorldMut for SandboxWorld {}

impl SandboxWorld {
    pub fn new() -> Self {
        Self {
            bots: BTreeMap::new(),
            entities: BTreeMap::new(),
            next_entity: 1,
            next_item: 1,
            safe_zone: None,
            zone_shrink_per_second: 0.0,
            transport_unlocked: false,
            transport: None,
            transport_velocity: Vec3::ZERO,
            spawn_anchors: Vec::new(),
            named_anchors: Vec::new(),
            commands: Vec::new(),
            run_speed: 600.0,
            fall_speed: 1500.0,
            ground_height: 0.0,
        }
    }

    fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Add a bot body standing at `position` with full health.
    pub fn spawn_bot(&mut self, id: BotId, position: Vec3, team: Option<u8>) -> EntityId {
        let entity = self.alloc_entity();
        self.bots.insert(
            id,
            SandboxBot {
                entity,
                team,
                position,
                vitals: Vitals::new(100.0, 0.0),
                in_transport: false,
                airborne: false,
                move_goal: None,
                move_status: MoveStatus::Idle,
                inventory: Vec::new(),
                equipped: None,
                focal_point: None,
                firing: false,
                frozen: false,
            },
        );
        entity
    }

    /// Add a bot body riding the transport.
    pub fn board_bot(&mut self, id: BotId, team: Option<u8>) -> EntityId {
        let at = self.transport.unwrap_or(Vec3::ZERO);
        let entity = self.spawn_bot(id, at, team);
        if let Some(bot) = self.bots.get_mut(&id) {
            bot.in_transport = true;
        }
        entity
    }

    pub fn remove_bot(&mut self, id: BotId) -> Option<SandboxBot> {
        self.bots.remove(&id)
    }

    /// A non-bot player, e.g. a human opponent.
    pub fn add_player(&mut self, position: Vec3, team: Option<u8>) -> EntityId {
        self.add_entity(position, EntityKind::Player { team, alive: true })
    }

    pub fn add_pickup(&mut self, position: Vec3, item: ItemKind) -> EntityId {
        self.add_entity(position, EntityKind::Pickup { item })
    }

    pub fn add_container(&mut self, position: Vec3) -> EntityId {
        self.add_entity(position, EntityKind::Container { opened: false })
    }

    fn add_entity(&mut self, position: Vec3, kind: EntityKind) -> EntityId {
        let id = self.alloc_entity();
        self.entities.insert(id, WorldEntity { id, position, kind });
        id
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<WorldEntity> {
        self.entities.remove(&id)
    }

    /// Mark a player (or a bot's body) as dead.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            if let EntityKind::Player { alive, .. } = &mut entity.kind {
                *alive = false;
            }
        }
        if let Some(bot) = self.bots.values_mut().find(|b| b.entity == id) {
            bot.vitals.health = 0.0;
        }
    }

    /// Put an item in a bot's inventory.
    pub fn give_item(&mut self, bot: BotId, kind: ItemKind, ammo: u32) -> Option<ItemId> {
        let id = ItemId(self.next_item);
        let bot = self.bots.get_mut(&bot)?;
        self.next_item += 1;
        bot.inventory.push(InventoryItem {
            id,
            kind,
            ammo,
            count: 1,
        });
        Some(id)
    }

    pub fn set_safe_zone(&mut self, zone: Option<SafeZone>) {
        self.safe_zone = zone;
    }

    pub fn set_zone_shrink(&mut self, per_second: f32) {
        self.zone_shrink_per_second = per_second.max(0.0);
    }

    pub fn set_transport(&mut self, location: Option<Vec3>, velocity: Vec3) {
        self.transport = location;
        self.transport_velocity = velocity;
    }

    pub fn set_transport_unlocked(&mut self, unlocked: bool) {
        self.transport_unlocked = unlocked;
    }

    pub fn set_spawn_anchors(&mut self, anchors: Vec<Vec3>) {
        self.spawn_anchors = anchors;
    }

    pub fn add_named_anchor(&mut self, name: impl Into<String>, position: Vec3) {
        self.named_anchors.push((name.into(), position));
    }

    pub fn named_anchors(&self) -> &[(String, Vec3)] {
        &self.named_anchors
    }

    pub fn bot(&self, id: BotId) -> Option<&SandboxBot> {
        self.bots.get(&id)
    }

    pub fn bot_mut(&mut self, id: BotId) -> Option<&mut SandboxBot> {
        self.bots.get_mut(&id)
    }

    pub fn bots(&self) -> impl Iterator<Item = (BotId, &SandboxBot)> + '_ {
        self.bots.iter().map(|(id, bot)| (*id, bot))
    }

    pub fn commands(&self) -> &[SandboxCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SandboxCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands issued by one bot, in order.
    pub fn commands_for(&self, agent: BotId) -> impl Iterator<Item = &SandboxCommand> + '_ {
        self.commands.iter().filter(move |c| c.agent() == agent)
    }

    /// Advance the simulation by `dt_seconds`: move the transport, shrink the zone, walk and
    /// drop bots.
    pub fn advance(&mut self, dt_seconds: f32) {
        if let Some(transport) = &mut self.transport {
            *transport += self.transport_velocity * dt_seconds;
        }
        if let Some(zone) = &mut self.safe_zone {
            zone.radius = (zone.radius - self.zone_shrink_per_second * dt_seconds).max(0.0);
        }

        let step = self.run_speed * dt_seconds;
        for bot in self.bots.values_mut() {
            if bot.in_transport {
                if let Some(transport) = self.transport {
                    bot.position = transport;
                }
                continue;
            }

            if let Some((goal, radius)) = bot.move_goal {
                if !bot.frozen {
                    let to_goal = (goal - bot.position).horizontal();
                    let remaining = to_goal.length();
                    let travel = step.min(remaining);
                    bot.position += to_goal.normalize_or_zero() * travel;
                    if remaining - travel <= radius && !bot.airborne {
                        bot.move_goal = None;
                        bot.move_status = MoveStatus::Arrived;
                    }
                }
            }

            if bot.airborne {
                bot.position.z -= self.fall_speed * dt_seconds;
                if bot.position.z <= self.ground_height {
                    bot.position.z = self.ground_height;
                    bot.airborne = false;
                    bot.move_goal = None;
                    bot.move_status = MoveStatus::Idle;
                }
            }
        }
    }

    fn bot_entity(bot: &SandboxBot) -> WorldEntity {
        WorldEntity {
            id: bot.entity,
            position: bot.position,
            kind: EntityKind::Player {
                team: bot.team,
                alive: bot.vitals.is_alive(),
            },
        }
    }
}

impl BotWorldView for SandboxWorld {
    fn position(&self, agent: BotId) -> Option<Vec3> {
        self.bots.get(&agent).map(|b| b.position)
    }

    fn vitals(&self, agent: BotId) -> Option<Vitals> {
        self.bots.get(&agent).map(|b| b.vitals)
    }

    fn is_airborne(&self, agent: BotId) -> bool {
        self.bots.get(&agent).is_some_and(|b| b.airborne)
    }

    fn move_status(&self, agent: BotId) -> MoveStatus {
        self.bots
            .get(&agent)
            .map_or(MoveStatus::Idle, |b| b.move_status)
    }

    fn inventory(&self, agent: BotId) -> &[InventoryItem] {
        match self.bots.get(&agent) {
            Some(bot) => &bot.inventory,
            None => &[],
        }
    }

    fn equipped(&self, agent: BotId) -> Option<ItemId> {
        self.bots.get(&agent)?.equipped
    }

    fn entity_id(&self, agent: BotId) -> Option<EntityId> {
        self.bots.get(&agent).map(|b| b.entity)
    }

    fn team(&self, agent: BotId) -> Option<u8> {
        self.bots.get(&agent)?.team
    }

    fn entities(&self, category: EntityCategory) -> Vec<WorldEntity> {
        let mut out: Vec<WorldEntity> = self
            .entities
            .values()
            .filter(|e| e.kind.category() == category)
            .copied()
            .collect();
        if category == EntityCategory::Player {
            out.extend(
                self.bots
                    .values()
                    .filter(|b| !b.in_transport)
                    .map(Self::bot_entity),
            );
        }
        out
    }

    fn entity(&self, id: EntityId) -> Option<WorldEntity> {
        if let Some(entity) = self.entities.get(&id) {
            return Some(*entity);
        }
        self.bots
            .values()
            .find(|b| b.entity == id && !b.in_transport)
            .map(Self::bot_entity)
    }

    fn safe_zone(&self) -> Option<SafeZone> {
        self.safe_zone
    }

    fn transport_unlocked(&self) -> bool {
        self.transport_unlocked
    }

    fn transport_location(&self) -> Option<Vec3> {
        self.transport
    }

    fn spawn_anchors(&self) -> &[Vec3] {
        &self.spawn_anchors
    }
}

impl BotWorldMut for SandboxWorld {
    fn move_to(&mut self, agent: BotId, target: Vec3, acceptance_radius: f32) -> MoveRequest {
        self.commands.push(SandboxCommand::MoveTo {
            agent,
            target,
            acceptance_radius,
        });
        let Some(bot) = self.bots.get_mut(&agent) else {
            return MoveRequest::Failed;
        };
        if bot.in_transport {
            return MoveRequest::Failed;
        }
        if !bot.airborne && bot.position.distance_2d(target) <= acceptance_radius {
            bot.move_goal = None;
            bot.move_status = MoveStatus::Arrived;
            return MoveRequest::AlreadyAtGoal;
        }
        bot.move_goal = Some((target, acceptance_radius));
        bot.move_status = MoveStatus::Moving;
        MoveRequest::Accepted
    }

    fn stop_movement(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::StopMovement(agent));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.move_goal = None;
            bot.move_status = MoveStatus::Idle;
        }
    }

    fn set_focal_point(&mut self, agent: BotId, point: Option<Vec3>) {
        self.commands.push(SandboxCommand::Focus(agent, point));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.focal_point = point;
        }
    }

    fn start_fire(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::StartFire(agent));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.firing = true;
        }
    }

    fn stop_fire(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::StopFire(agent));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.firing = false;
        }
    }

    fn equip(&mut self, agent: BotId, item: ItemId) -> bool {
        self.commands.push(SandboxCommand::Equip(agent, item));
        let Some(bot) = self.bots.get_mut(&agent) else {
            return false;
        };
        if !bot.inventory.iter().any(|i| i.id == item) {
            return false;
        }
        bot.equipped = Some(item);
        true
    }

    fn pickup(&mut self, agent: BotId, entity: EntityId) -> bool {
        self.commands.push(SandboxCommand::Pickup(agent, entity));
        let Some(WorldEntity {
            kind: EntityKind::Pickup { item },
            ..
        }) = self.entities.get(&entity).copied()
        else {
            return false;
        };
        if !self.bots.contains_key(&agent) {
            return false;
        }
        self.entities.remove(&entity);
        let ammo = if item == ItemKind::RangedWeapon {
            MAGAZINE
        } else {
            0
        };
        self.give_item(agent, item, ammo).is_some()
    }

    fn open_container(&mut self, agent: BotId, entity: EntityId) -> bool {
        self.commands.push(SandboxCommand::OpenContainer(agent, entity));
        match self.entities.get_mut(&entity) {
            Some(WorldEntity {
                kind: EntityKind::Container { opened },
                ..
            }) if !*opened => {
                *opened = true;
                true
            }
            _ => false,
        }
    }

    fn reload(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::Reload(agent));
        if let Some(bot) = self.bots.get_mut(&agent) {
            let equipped = bot.equipped;
            if let Some(item) = bot.inventory.iter_mut().find(|i| Some(i.id) == equipped) {
                if item.kind == ItemKind::RangedWeapon {
                    item.ammo = MAGAZINE;
                }
            }
        }
    }

    fn jump(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::Jump(agent));
    }

    fn teleport(&mut self, agent: BotId, location: Vec3) {
        self.commands.push(SandboxCommand::Teleport(agent, location));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.in_transport = false;
            bot.position = location;
            bot.move_goal = None;
            bot.move_status = MoveStatus::Idle;
        }
    }

    fn begin_descent(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::BeginDescent(agent));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.airborne = bot.position.z > self.ground_height;
        }
    }

    fn set_vitals(&mut self, agent: BotId, vitals: Vitals) {
        self.commands.push(SandboxCommand::SetVitals(agent, vitals));
        if let Some(bot) = self.bots.get_mut(&agent) {
            bot.vitals = vitals;
        }
    }

    fn thank_driver(&mut self, agent: BotId) {
        self.commands.push(SandboxCommand::ThankDriver(agent));
    }

    fn place_build(
        &mut self,
        agent: BotId,
        piece: BuildPiece,
        location: Vec3,
        _facing: Vec3,
    ) -> bool {
        self.commands.push(SandboxCommand::PlaceBuild {
            agent,
            piece,
            location,
        });
        self.bots.contains_key(&agent)
    }
}
