//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Turn rate used when a combatant swings to face its target (degrees per second).
pub const COMBATANT_TURN_RATE_DEG: f32 = 180.0;

/// Hit flash duration (seconds).
pub const HIT_FLASH_SECS: f32 = 0.1;

// --- Rank-and-file behavior ---

/// Time spent retreating before re-engaging (seconds).
pub const RETREAT_DURATION_SECS: f32 = 3.0;

/// Distance of the retreat waypoint projected away from the target.
pub const RETREAT_STEP_DISTANCE: f32 = 5.0;

/// Inner radius of the patrol annulus around the spawn point.
pub const PATROL_RADIUS_MIN: f32 = 3.0;

/// Outer radius of the patrol annulus around the spawn point.
pub const PATROL_RADIUS_MAX: f32 = 8.0;

/// A patrol waypoint counts as reached inside this distance.
pub const PATROL_ARRIVAL_RADIUS: f32 = 1.0;

/// After this long in Patrol the combatant starts glancing at its target.
pub const PATROL_LOOK_AROUND_SECS: f32 = 2.0;

/// A patrol waypoint is abandoned after this long without arriving.
pub const PATROL_RETARGET_SECS: f32 = 5.0;

// --- Boss behavior ---

/// Bosses stop approaching inside attack range times this factor.
pub const BOSS_APPROACH_RANGE_FACTOR: f32 = 1.2;

/// Time in Attack before repositioning (seconds).
pub const BOSS_ATTACK_TIMEOUT_SECS: f32 = 5.0;

/// Special attack wind-up (seconds).
pub const BOSS_WIND_UP_SECS: f32 = 0.5;

/// Time spent in Retreat before circling (seconds).
pub const BOSS_RETREAT_SECS: f32 = 3.0;

/// Retreat waypoint distance for bosses.
pub const BOSS_RETREAT_STEP_DISTANCE: f32 = 8.0;

/// Time spent circling before approaching again (seconds).
pub const BOSS_CIRCLE_SECS: f32 = 4.0;

/// Default cooldown between special attacks (seconds).
pub const BOSS_SPECIAL_COOLDOWN_SECS: f32 = 10.0;

/// Projectiles in a radial spread.
pub const BOSS_SPREAD_COUNT: u32 = 8;

/// Damage factor applied to each spread projectile.
pub const BOSS_SPREAD_DAMAGE_FACTOR: f32 = 0.8;

/// Spread projectiles spawn this far from the boss centre.
pub const BOSS_SPREAD_SPAWN_OFFSET: f32 = 1.0;

/// Shots in a rapid-fire burst.
pub const BOSS_BURST_SHOTS: u32 = 10;

/// Interval between burst shots (seconds).
pub const BOSS_BURST_INTERVAL_SECS: f32 = 0.1;

/// Number of on/off pulses in the phase transition flash.
pub const BOSS_PHASE_FLASH_PULSES: u32 = 6;

/// Duration of each half of a phase flash pulse (seconds).
pub const BOSS_PHASE_FLASH_HALF_SECS: f32 = 0.1;

/// Boss XP reward multiplier relative to its definition.
pub const BOSS_XP_MULTIPLIER: u32 = 5;

/// Boss currency reward multiplier relative to its definition.
pub const BOSS_CURRENCY_MULTIPLIER: u32 = 3;

// --- Projectiles ---

/// Muzzle distance ahead of a combatant's centre.
pub const FIRE_POINT_FORWARD_OFFSET: f32 = 0.75;

/// Lateral spacing between adjacent boss fire points.
pub const FIRE_POINT_SPACING: f32 = 0.6;

/// Extra lifetime a projectile is granted beyond range / speed (seconds).
pub const PROJECTILE_LIFETIME_EPSILON: f32 = 1.0;

// --- Wave scheduling ---

pub const WAVE_BASE_ENEMIES: u32 = 5;
pub const WAVE_SCALING: f32 = 1.2;
/// Hard cap on enemies required per wave.
pub const WAVE_ENEMY_CAP: u32 = 30;
/// Delay before the first wave (seconds).
pub const FIRST_WAVE_DELAY_SECS: f32 = 3.0;
pub const INTER_WAVE_DELAY_SECS: f32 = 10.0;
pub const SPAWN_INTERVAL_SECS: f32 = 1.0;
/// Every Nth wave brings a boss.
pub const BOSS_WAVE_INTERVAL: u32 = 5;
pub const BOSS_SPAWN_DELAY_SECS: f32 = 3.0;
/// Radius of the spawn ring around the player when no fixed spawn points exist.
pub const SPAWN_RADIUS: f32 = 15.0;
/// Boss spawn ring radius relative to `SPAWN_RADIUS`.
pub const BOSS_SPAWN_RADIUS_FACTOR: f32 = 1.5;

// --- Upgrades ---

/// Choices offered per level-up.
pub const UPGRADES_PER_LEVEL_UP: usize = 3;

pub const RARITY_WEIGHT_COMMON: f32 = 50.0;
pub const RARITY_WEIGHT_UNCOMMON: f32 = 30.0;
pub const RARITY_WEIGHT_RARE: f32 = 15.0;
pub const RARITY_WEIGHT_EPIC: f32 = 4.0;
pub const RARITY_WEIGHT_LEGENDARY: f32 = 1.0;

// --- XP ---

pub const XP_BASE_REQUIRED: u32 = 80;
pub const XP_SCALING: f32 = 1.15;
pub const XP_MAX_LEVEL: u32 = 50;

// --- Player tank ---

pub const TANK_MAX_HEALTH: f32 = 100.0;
pub const TANK_ARMOR: f32 = 0.0;
pub const TANK_FIREPOWER: f32 = 25.0;
pub const TANK_MOVEMENT_SPEED: f32 = 5.0;
pub const TANK_ROTATION_SPEED_DEG: f32 = 180.0;
pub const TANK_FIRE_RATE: f32 = 1.0;
pub const TANK_BULLET_SPEED: f32 = 10.0;
pub const TANK_RANGE: f32 = 10.0;
/// Fraction of incoming damage that always penetrates armor.
pub const TANK_MIN_DAMAGE_FRACTION: f32 = 0.1;

// --- Session ---

/// Default run length (seconds).
pub const SESSION_DURATION_SECS: f32 = 900.0;

// --- Meta-progression ---

pub const PERMANENT_UPGRADE_BASE_COST: u32 = 100;
pub const PERMANENT_UPGRADE_COST_MULTIPLIER: f32 = 1.5;
pub const PERMANENT_UPGRADE_MAX_LEVEL: u32 = 10;
/// Bonus per permanent upgrade level (+10%).
pub const PERMANENT_UPGRADE_EFFECT_PER_LEVEL: f32 = 0.1;
