//! Run state and core simulation types
//!
//! Everything that must survive a tick (and serialize for replay /
//! inspection) lives here. The `RunState` aggregate is the single owner
//! of the mutable run; components receive only what they need.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Mutually exclusive top-level mode of the run.
///
/// Illegal flag combinations (perk prompt during a boss fight, spawning
/// while dead) are unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Regular play: spawning, firing, scoring
    Active,
    /// A basic perk offer is pending; simulation frozen
    PerkChoice,
    /// A boss-reward perk offer is pending; simulation frozen
    EnhancedPerkChoice,
    /// Boss encounter: regular spawns suppressed, boss attack loop runs
    BossFight,
    /// Settings overlay open; simulation frozen
    Settings,
    /// Terminal: player died, no further mutation until a new run
    GameOver,
}

/// Enemy archetypes. Regular kinds descend from the top edge; `Boss`
/// holds position and is driven by the encounter state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Light,
    Heavy,
    Fast,
    Boss,
}

/// Pending burn damage-over-time schedule on one enemy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BurnState {
    /// Damage ticks still to apply
    pub ticks_left: u32,
    /// Seconds until the next tick fires
    pub next_tick: f32,
}

/// One active hostile. Destroyed on death or off-screen expiry, never
/// reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Unmodified traversal velocity; freeze scales it at integration time
    pub vel: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    /// Remaining freeze window (0 = unfrozen)
    pub freeze_timer: f32,
    pub burn: Option<BurnState>,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    /// Current speed multiplier from status effects
    pub fn speed_factor(&self) -> f32 {
        if self.freeze_timer > 0.0 {
            FREEZE_SPEED_FACTOR
        } else {
            1.0
        }
    }
}

/// Who a projectile belongs to. Boss shots are pure hazards; they never
/// damage enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Boss,
}

/// A single-use projectile: exactly one collision resolution, then gone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub faction: Faction,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds of flight remaining
    pub ttl: f32,
    /// How many ricochet bounces produced this projectile (max 1)
    pub ricochet_depth: u8,
}

/// A dropped coin awaiting magnet pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec2,
    /// Outward scatter velocity, decays to a settle
    pub vel: Vec2,
}

/// Boss attack pattern phase, cycling on a fixed cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    RadialBurst,
    AimedVolley,
}

/// Exists only while a boss is active; at most one at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossSession {
    /// Id of the boss `Enemy` in the arena
    pub enemy_id: u32,
    pub max_hp: i32,
    /// Mirror of the boss enemy's hit points (for HUD / telemetry)
    pub hp: i32,
    pub pattern: AttackPattern,
    /// Seconds until the current pattern fires
    pub attack_timer: f32,
}

/// Run-scoped permanent modifiers choosable from an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerkId {
    FireRate,
    ExtraArrow,
    CritChance,
    CritDamage,
    Magnet,
    Damage,
    // Enhanced catalog, offered only after a boss kill
    Freeze,
    Ricochet,
    Burn,
}

impl PerkId {
    pub fn is_enhanced(&self) -> bool {
        matches!(self, PerkId::Freeze | PerkId::Ricochet | PerkId::Burn)
    }
}

/// An ephemeral 3-option perk offer; destroyed once resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkOffer {
    pub choices: [PerkId; 3],
    pub enhanced: bool,
}

/// Global combat/economy tunables and monotonic run counters.
///
/// Tunables mutate only through perk application (and shop upgrades at
/// run start), always improving within their clamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub kills: u32,
    pub level: u32,
    /// Spendable currency for this run (separate from the persisted
    /// lifetime total)
    pub coins: u32,
    pub elapsed: f32,
    pub perks_taken: u32,
    pub bosses_defeated: u32,
    /// Kill count that opens the next perk offer
    pub next_perk_threshold: u32,

    pub base_damage: i32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub fire_interval: f32,
    pub arrows_per_volley: u32,
    pub magnet_radius: f32,

    pub has_freeze: bool,
    pub has_ricochet: bool,
    pub has_burn: bool,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            kills: 0,
            level: 1,
            coins: 0,
            elapsed: 0.0,
            perks_taken: 0,
            bosses_defeated: 0,
            next_perk_threshold: super::progression::FIRST_PERK_THRESHOLD,
            base_damage: BASE_ARROW_DAMAGE,
            crit_chance: BASE_CRIT_CHANCE,
            crit_multiplier: BASE_CRIT_MULTIPLIER,
            fire_interval: BASE_FIRE_INTERVAL,
            arrows_per_volley: 1,
            magnet_radius: BASE_MAGNET_RADIUS,
            has_freeze: false,
            has_ricochet: false,
            has_burn: false,
        }
    }
}

impl RunContext {
    /// Unified difficulty multiplier for the current counters
    pub fn global_scale(&self) -> f32 {
        super::difficulty::global_scale(
            self.elapsed,
            self.kills,
            self.perks_taken,
            self.bosses_defeated,
        )
    }
}

/// Fire-and-forget notifications for presentation/audio/haptics.
/// The core emits these and never awaits their handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    VolleyFired { count: u32 },
    EnemyHit { enemy: u32, damage: i32, critical: bool },
    EnemyKilled { enemy: u32, kind: EnemyKind },
    RicochetSpawned { from: u32, to: u32 },
    CoinsDropped { count: u32 },
    CoinCollected,
    PerkOffered { enhanced: bool },
    PerkAccepted { perk: PerkId },
    BossSpawned { hp: i32 },
    BossDefeated,
    PlayerDied { kills: u32 },
}

/// Complete run state (deterministic, serializable).
///
/// Single owner of `RunContext` and of every entity collection; no
/// component holds a reference that outlives the owning vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: RunPhase,
    pub context: RunContext,

    /// Player horizontal position (vertical is fixed at `PLAYER_Y`)
    pub player_x: f32,

    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub coins: Vec<Coin>,
    pub boss: Option<BossSession>,
    pub offer: Option<PerkOffer>,

    /// Seconds until the next auto-fire volley
    pub fire_timer: f32,
    /// Seconds until the next regular spawn; `None` while cancelled
    /// (suppressed phases), re-armed from the live difficulty on resume
    pub spawn_timer: Option<f32>,

    /// Pending notifications, drained by the embedder
    pub events: Vec<GameEvent>,

    next_id: u32,
}

impl RunState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Active,
            context: RunContext::default(),
            player_x: ARENA_WIDTH / 2.0,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            coins: Vec::new(),
            boss: None,
            offer: None,
            fire_timer: BASE_FIRE_INTERVAL,
            spawn_timer: Some(BASE_SPAWN_INTERVAL),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a run with permanent shop upgrades folded into the context
    pub fn new_with_meta(seed: u64, store: &dyn crate::persistence::KeyValueStore) -> Self {
        let mut state = Self::new(seed);
        crate::shop::apply_upgrades(&mut state.context, store);
        state.fire_timer = state.context.fire_interval;
        state
    }

    /// Allocate a new entity id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Player position as a point
    pub fn player_pos(&self) -> Vec2 {
        Vec2::new(self.player_x, PLAYER_Y)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn is_boss_active(&self) -> bool {
        self.boss.is_some()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure deterministic iteration order after removals
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.coins.sort_by_key(|c| c.id);
    }
}
