use dropbot_core::{EntityId, Vec3, WorldMut, WorldView};

/// State of the agent's current movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveStatus {
    #[default]
    Idle,
    Moving,
    Arrived,
    Failed,
}

impl MoveStatus {
    pub fn is_moving(self) -> bool {
        self == MoveStatus::Moving
    }
}

/// Answer to a move-to-point request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRequest {
    Accepted,
    AlreadyAtGoal,
    Failed,
}

impl MoveRequest {
    pub fn is_failed(self) -> bool {
        self == MoveRequest::Failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vitals {
    pub health: f32,
    pub shield: f32,
}

impl Vitals {
    pub fn new(health: f32, shield: f32) -> Self {
        Self { health, shield }
    }

    pub fn is_alive(self) -> bool {
        self.health > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

/// Item classes the decision logic distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Healing,
    RangedWeapon,
    MeleeWeapon,
    Ammo,
    Material,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Loaded rounds for weapons; zero for everything else.
    pub ammo: u32,
    pub count: u32,
}

impl InventoryItem {
    /// A ranged weapon that can fire right now.
    pub fn is_usable_ranged(&self) -> bool {
        self.kind == ItemKind::RangedWeapon && self.ammo > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Player,
    Pickup,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A bot or human player. `team: None` is hostile to everyone.
    Player { team: Option<u8>, alive: bool },
    Pickup { item: ItemKind },
    Container { opened: bool },
}

impl EntityKind {
    pub fn category(self) -> EntityCategory {
        match self {
            EntityKind::Player { .. } => EntityCategory::Player,
            EntityKind::Pickup { .. } => EntityCategory::Pickup,
            EntityKind::Container { .. } => EntityCategory::Container,
        }
    }
}

/// Snapshot of one world entity as returned by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldEntity {
    pub id: EntityId,
    pub position: Vec3,
    pub kind: EntityKind,
}

impl WorldEntity {
    /// Whether this entity is a live player that `team` should fight.
    pub fn is_hostile_to(&self, team: Option<u8>) -> bool {
        match self.kind {
            EntityKind::Player {
                team: other,
                alive: true,
            } => team.is_none() || other.is_none() || other != team,
            _ => false,
        }
    }
}

/// The shrinking playable region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub center: Vec3,
    pub radius: f32,
}

impl SafeZone {
    pub fn contains(&self, point: Vec3) -> bool {
        self.center.distance_2d(point) <= self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPiece {
    Wall,
    Stair,
}

/// Queries the bot behaviors need from the host simulation.
///
/// Every per-agent query returns `None` (or an empty collection) when the agent has no body
/// yet; callers treat that as "can't act this tick", never as an error.
pub trait BotWorldView: WorldView {
    fn position(&self, agent: Self::Agent) -> Option<Vec3>;
    fn vitals(&self, agent: Self::Agent) -> Option<Vitals>;
    /// Skydiving or gliding.
    fn is_airborne(&self, agent: Self::Agent) -> bool;
    fn move_status(&self, agent: Self::Agent) -> MoveStatus;
    fn inventory(&self, agent: Self::Agent) -> &[InventoryItem];
    fn equipped(&self, agent: Self::Agent) -> Option<ItemId>;
    /// The agent's own entity, so scans can skip it.
    fn entity_id(&self, agent: Self::Agent) -> Option<EntityId>;
    fn team(&self, agent: Self::Agent) -> Option<u8>;

    fn entities(&self, category: EntityCategory) -> Vec<WorldEntity>;
    /// Resolve a previously seen entity; `None` once it is gone.
    fn entity(&self, id: EntityId) -> Option<WorldEntity>;
    fn safe_zone(&self) -> Option<SafeZone>;
    fn transport_unlocked(&self) -> bool;
    fn transport_location(&self) -> Option<Vec3>;
    fn spawn_anchors(&self) -> &[Vec3];

    fn equipped_item(&self, agent: Self::Agent) -> Option<InventoryItem> {
        let id = self.equipped(agent)?;
        self.inventory(agent).iter().copied().find(|item| item.id == id)
    }
}

/// Commands the bot behaviors issue into the host simulation.
pub trait BotWorldMut: WorldMut + BotWorldView {
    fn move_to(&mut self, agent: Self::Agent, target: Vec3, acceptance_radius: f32)
        -> MoveRequest;
    fn stop_movement(&mut self, agent: Self::Agent);
    fn set_focal_point(&mut self, agent: Self::Agent, point: Option<Vec3>);
    fn start_fire(&mut self, agent: Self::Agent);
    fn stop_fire(&mut self, agent: Self::Agent);
    fn equip(&mut self, agent: Self::Agent, item: ItemId) -> bool;
    fn pickup(&mut self, agent: Self::Agent, entity: EntityId) -> bool;
    fn open_container(&mut self, agent: Self::Agent, entity: EntityId) -> bool;
    fn reload(&mut self, agent: Self::Agent);
    fn jump(&mut self, agent: Self::Agent);
    fn teleport(&mut self, agent: Self::Agent, location: Vec3);
    fn begin_descent(&mut self, agent: Self::Agent);
    fn set_vitals(&mut self, agent: Self::Agent, vitals: Vitals);
    fn thank_driver(&mut self, agent: Self::Agent);
    fn place_build(
        &mut self,
        agent: Self::Agent,
        piece: BuildPiece,
        location: Vec3,
        facing: Vec3,
    ) -> bool;
}
