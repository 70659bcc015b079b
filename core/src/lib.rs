#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bulwark simulation.
//!
//! This crate defines the message surface that connects the session
//! scheduler, the authoritative world, and pure systems. The scheduler submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns in the default playing field.
pub const DEFAULT_COLUMNS: u32 = 22;
/// Number of rows in the default playing field.
pub const DEFAULT_ROWS: u32 = 11;
/// Money available when a session starts.
pub const DEFAULT_STARTING_MONEY: u32 = 500;
/// Lives available when a session starts.
pub const DEFAULT_STARTING_LIVES: u32 = 20;
/// Largest slice of real time a single frame may contribute to the simulation.
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(50);

/// Projectile progress gained per simulated second (0.05 per 60 Hz frame).
pub const PROJECTILE_SPEED: f32 = 3.0;
/// Hit radius used by projectiles without an area of effect.
pub const DIRECT_HIT_RADIUS: f32 = 0.5;
/// Half-extent of an enemy used when checking whether a cell is obstructed.
pub const ENEMY_FOOTPRINT: f32 = 0.8;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clocks by the provided frame delta.
    Tick {
        /// Real time that elapsed since the previous frame, before clamping.
        dt: Duration,
    },
    /// Starts a new wave using the provided configuration.
    StartWave {
        /// Roster and pacing generated for the wave.
        config: WaveConfig,
    },
    /// Instantiates the next queued enemy on the requested spawn row.
    SpawnEnemy {
        /// Preferred row within the active spawn band.
        row: u32,
    },
    /// Requests that a tower fires a projectile at a fixed point.
    FireProjectile {
        /// Cell hosting the tower that fires.
        tower: CellCoord,
        /// World position the projectile detonates at.
        aim: CellPoint,
    },
    /// Advances projectiles and resolves detonations, damage and deaths.
    StepProjectiles,
    /// Advances enemies along the flow field and resolves the tick outcome.
    StepEnemies,
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests that the tower on the provided cell is sold.
    SellTower {
        /// Cell hosting the tower.
        cell: CellCoord,
    },
    /// Requests that the tower on the provided cell is upgraded one level.
    UpgradeTower {
        /// Cell hosting the tower.
        cell: CellCoord,
    },
    /// Flips the automatic upgrade flag of the tower on the provided cell.
    ToggleAutoUpgrade {
        /// Cell hosting the tower.
        cell: CellCoord,
    },
    /// Changes the game speed multiplier.
    SetGameSpeed {
        /// Speed to activate.
        speed: GameSpeed,
    },
    /// Flips the automatic advance-to-next-wave flag.
    ToggleAutoWave,
    /// Reinitialises every piece of session state from the configuration.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clocks advanced.
    TimeAdvanced {
        /// Clamped real time contributed by the frame.
        real: Duration,
        /// Real time scaled by the active game speed.
        simulated: Duration,
    },
    /// Announces that a new wave began.
    WaveStarted {
        /// Index of the wave, starting at one.
        wave: u32,
        /// Number of enemies queued for the wave.
        enemies: usize,
    },
    /// Reports that a wave start request was rejected.
    WaveStartRejected {
        /// Specific reason the request failed.
        reason: WaveError,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Spawn cell in column zero.
        cell: CellCoord,
    },
    /// Confirms that a tower fired.
    ProjectileFired {
        /// Cell hosting the tower that fired.
        tower: CellCoord,
        /// Point the projectile travels to.
        aim: CellPoint,
    },
    /// Reports that a projectile reached its target point.
    ProjectileDetonated {
        /// Cell hosting the tower that fired the projectile.
        tower: CellCoord,
        /// Point the projectile detonated at.
        at: CellPoint,
        /// Number of enemies caught in the hit radius.
        hits: usize,
    },
    /// Confirms that an enemy was destroyed.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Money credited for the kill.
        bounty: u32,
        /// Tower credited with the kill.
        tower: CellCoord,
    },
    /// Reports that an enemy reached the exit column.
    EnemyLeaked {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
        /// Lives left after the leak was applied.
        lives: u32,
    },
    /// Announces that every enemy of the wave was resolved.
    WaveCleared {
        /// Index of the cleared wave.
        wave: u32,
    },
    /// Announces that the session ended because no lives remain.
    GameOver {
        /// Wave during which the session ended.
        wave: u32,
    },
    /// Confirms that a tower was built.
    TowerPlaced {
        /// Type of tower that was built.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
        /// Money deducted for the tower.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Cell the tower occupied.
        cell: CellCoord,
        /// Money credited for the sale.
        refund: u32,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Cell hosting the tower.
        cell: CellCoord,
        /// Level reached after the upgrade.
        level: u32,
        /// Money deducted for the upgrade.
        cost: u32,
    },
    /// Confirms that a tower's automatic upgrade flag changed.
    AutoUpgradeToggled {
        /// Cell hosting the tower.
        cell: CellCoord,
        /// Flag value after the toggle.
        enabled: bool,
    },
    /// Reports that an upgrade, sell or toggle request was rejected.
    TowerActionRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: TowerActionError,
    },
    /// Confirms that the game speed changed.
    GameSpeedChanged {
        /// Speed that became active.
        speed: GameSpeed,
    },
    /// Confirms that the automatic wave flag changed.
    AutoWaveToggled {
        /// Flag value after the toggle.
        enabled: bool,
    },
    /// Confirms that the session was reinitialised.
    Restarted,
}

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// No wave is running; the player builds and starts the next wave.
    Idle,
    /// A wave is spawning or enemies remain on the field.
    WaveActive,
    /// Lives reached zero. Only a restart leaves this phase.
    GameOver,
}

/// Discrete game speed multipliers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSpeed {
    /// Real-time speed.
    #[default]
    Normal,
    /// Twice real time.
    Double,
    /// Four times real time.
    Quadruple,
}

impl GameSpeed {
    /// Integer factor applied to simulated time.
    #[must_use]
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
            Self::Quadruple => 4,
        }
    }

    /// Speed following this one in the 1× → 2× → 4× → 1× cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Quadruple,
            Self::Quadruple => Self::Normal,
        }
    }

    /// Resolves a multiplier value into a speed, if it names one.
    #[must_use]
    pub const fn from_multiplier(multiplier: u32) -> Option<Self> {
        match multiplier {
            1 => Some(Self::Normal),
            2 => Some(Self::Double),
            4 => Some(Self::Quadruple),
            _ => None,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell one column to the east.
    #[must_use]
    pub const fn east(&self) -> Self {
        Self::new(self.column.saturating_add(1), self.row)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Continuous world position of the cell.
    #[must_use]
    pub fn to_point(self) -> CellPoint {
        CellPoint::new(self.column as f32, self.row as f32)
    }
}

/// Continuous position measured in cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellPoint {
    column: f32,
    row: f32,
}

impl CellPoint {
    /// Creates a new point from fractional column and row values.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Fractional column of the point.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Fractional row of the point.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: CellPoint) -> f32 {
        let dx = self.column - other.column;
        let dy = self.row - other.row;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward `to` by `t`.
    #[must_use]
    pub fn lerp(self, to: CellPoint, t: f32) -> CellPoint {
        CellPoint::new(
            self.column + (to.column - self.column) * t,
            self.row + (to.row - self.row) * t,
        )
    }
}

/// Contiguous inclusive range of rows used as the spawn or exit opening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Band {
    first: u32,
    last: u32,
}

impl Band {
    /// Creates a band spanning `first..=last`.
    #[must_use]
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Derives the vertically centred band used during `wave`.
    ///
    /// The band holds `min(rows, max(1, wave))` rows around `rows / 2`, with
    /// the extra row of an even-sized band placed below the centre, and is
    /// clamped to the grid.
    #[must_use]
    pub fn for_wave(wave: u32, rows: u32) -> Self {
        if rows == 0 {
            return Self::new(0, 0);
        }

        let count = rows.min(wave.max(1));
        let half = (count - 1) / 2;
        let remainder = (count - 1) % 2;
        let centre = rows / 2;
        let first = centre.saturating_sub(half);
        let last = (centre + half + remainder).min(rows - 1);
        Self::new(first, last)
    }

    /// First row of the band.
    #[must_use]
    pub const fn first(&self) -> u32 {
        self.first
    }

    /// Last row of the band, inclusive.
    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }

    /// Number of rows covered by the band.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    /// Reports whether `row` lies inside the band.
    #[must_use]
    pub const fn contains(&self, row: u32) -> bool {
        row >= self.first && row <= self.last
    }

    /// Iterator over the rows of the band in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

/// Fixed dimensions of the playing field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridGeometry {
    columns: u32,
    rows: u32,
}

impl GridGeometry {
    /// Creates a new geometry description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the field.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the field.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Column enemies must reach to escape.
    #[must_use]
    pub const fn exit_column(&self) -> u32 {
        self.columns.saturating_sub(1)
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let cells = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(cells).unwrap_or(0)
    }

    /// Reports whether the cell lies inside the field.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell lies on the spawn or exit column.
    #[must_use]
    pub const fn is_edge_column(&self, cell: CellCoord) -> bool {
        cell.column() == 0 || cell.column() == self.exit_column()
    }

    /// Row-major index of the cell, if it lies inside the field.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Rows enemies spawn on during `wave`.
    #[must_use]
    pub fn spawn_band(&self, wave: u32) -> Band {
        Band::for_wave(wave, self.rows)
    }

    /// Rows of the exit column that count as exits during `wave`.
    #[must_use]
    pub fn exit_band(&self, wave: u32) -> Band {
        Band::for_wave(wave, self.rows)
    }

    /// Cells of the last column covered by `band`.
    #[must_use]
    pub fn exit_cells(&self, band: Band) -> Vec<CellCoord> {
        let column = self.exit_column();
        band.rows().map(|row| CellCoord::new(column, row)).collect()
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Standard kinetic defence.
    Cannon,
    /// Long range, high damage.
    Sniper,
    /// High fire rate, short range.
    MachineGun,
    /// Area damage around the impact point.
    Frost,
}

impl TowerKind {
    /// Every constructible tower kind in menu order.
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Cannon,
        TowerKind::Sniper,
        TowerKind::MachineGun,
        TowerKind::Frost,
    ];

    /// Display name of the tower.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cannon => "Cannon",
            Self::Sniper => "Sniper",
            Self::MachineGun => "M. Gun",
            Self::Frost => "Ice Tower",
        }
    }

    /// Money required to build the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Cannon => 50,
            Self::Sniper => 120,
            Self::MachineGun => 150,
            Self::Frost => 200,
        }
    }

    /// Damage dealt per projectile at level one.
    #[must_use]
    pub const fn base_damage(self) -> u32 {
        match self {
            Self::Cannon => 20,
            Self::Sniper => 100,
            Self::MachineGun => 8,
            Self::Frost => 40,
        }
    }

    /// Targeting range in cells at level one.
    #[must_use]
    pub const fn base_range(self) -> f32 {
        match self {
            Self::Cannon => 3.5,
            Self::Sniper => 7.0,
            Self::MachineGun => 2.5,
            Self::Frost => 2.0,
        }
    }

    /// Minimum simulated time between two shots.
    #[must_use]
    pub const fn cooldown(self) -> Duration {
        match self {
            Self::Cannon => Duration::from_millis(800),
            Self::Sniper => Duration::from_millis(2_000),
            Self::MachineGun => Duration::from_millis(150),
            Self::Frost => Duration::from_millis(1_500),
        }
    }

    /// Area-of-effect radius of the tower's projectiles; zero for single target.
    #[must_use]
    pub const fn blast_radius(self) -> f32 {
        match self {
            Self::Frost => 1.5,
            Self::Cannon | Self::Sniper | Self::MachineGun => 0.0,
        }
    }

    /// Cost of upgrading a tower of this kind from `level` to `level + 1`.
    ///
    /// Equals `floor(cost × 0.5 × level)`.
    #[must_use]
    pub const fn upgrade_cost(self, level: u32) -> u32 {
        self.cost().saturating_mul(level) / 2
    }

    /// Money returned when selling the tower, `floor(cost × 0.7)` at any level.
    #[must_use]
    pub const fn refund(self) -> u32 {
        self.cost().saturating_mul(7) / 10
    }
}

/// Enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline enemy present in the opening waves.
    Square,
    /// Fast and fragile.
    Triangle,
    /// Slow and sturdy.
    Circle,
    /// Heavily armoured.
    Diamond,
    /// Appears on every fifth wave.
    Boss,
}

impl EnemyKind {
    /// Hit points before the wave multiplier is applied.
    #[must_use]
    pub const fn base_hit_points(self) -> f32 {
        match self {
            Self::Square => 30.0,
            Self::Triangle => 20.0,
            Self::Circle => 80.0,
            Self::Diamond => 150.0,
            Self::Boss => 1_000.0,
        }
    }

    /// Movement speed in cells per simulated second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Square => 2.0,
            Self::Triangle => 3.5,
            Self::Circle => 1.2,
            Self::Diamond => 1.5,
            Self::Boss => 0.8,
        }
    }

    /// Money credited when the enemy is destroyed.
    #[must_use]
    pub const fn bounty(self) -> u32 {
        match self {
            Self::Square => 15,
            Self::Triangle => 25,
            Self::Circle => 45,
            Self::Diamond => 80,
            Self::Boss => 400,
        }
    }
}

/// Unique identifier assigned to an enemy, increasing in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Roster and pacing for a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Index of the wave, starting at one.
    pub wave: u32,
    /// Enemies in spawn order.
    pub roster: Vec<EnemyKind>,
    /// Kinds the roster was sampled from.
    pub eligible: Vec<EnemyKind>,
    /// Simulated time between two spawns.
    pub spawn_interval: Duration,
    /// Factor applied to every spawned enemy's hit points.
    pub hit_point_multiplier: f32,
}

impl WaveConfig {
    /// Number of enemies in the wave.
    #[must_use]
    pub fn count(&self) -> usize {
        self.roster.len()
    }
}

/// Tunables of the authoritative world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of grid columns, including the spawn and exit columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Money available at the start of a session.
    pub starting_money: u32,
    /// Lives available at the start of a session.
    pub starting_lives: u32,
    /// Largest frame delta, in milliseconds, accepted by a single tick.
    pub max_frame_delta_ms: u64,
}

impl WorldConfig {
    /// Geometry of the configured field.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.columns, self.rows)
    }

    /// Largest frame delta accepted by a single tick.
    #[must_use]
    pub const fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            starting_money: DEFAULT_STARTING_MONEY,
            starting_lives: DEFAULT_STARTING_LIVES,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA.as_millis() as u64,
        }
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The session ended; nothing can be built.
    #[error("the game is over")]
    GameOver,
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The requested cell lies on the spawn or exit column.
    #[error("towers cannot be built on the spawn or exit column")]
    EdgeColumn,
    /// The requested cell already hosts a tower.
    #[error("cell already hosts a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("tower costs {required} but only {available} is available")]
    InsufficientFunds {
        /// Money the tower costs.
        required: u32,
        /// Money currently available.
        available: u32,
    },
    /// An enemy currently stands on the requested cell.
    #[error("an enemy occupies the cell")]
    EnemyOverlap,
    /// The tower would cut a spawn row off from the exit.
    #[error("placement would block every path from a spawn row")]
    BlocksPath,
}

/// Reasons an upgrade, sell or toggle request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum TowerActionError {
    /// The session ended; towers are frozen.
    #[error("the game is over")]
    GameOver,
    /// No tower occupies the requested cell.
    #[error("no tower occupies the cell")]
    MissingTower,
    /// The player cannot afford the upgrade.
    #[error("upgrade costs {required} but only {available} is available")]
    InsufficientFunds {
        /// Money the upgrade costs.
        required: u32,
        /// Money currently available.
        available: u32,
    },
}

/// Reasons a wave start request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveError {
    /// The session ended; no further waves can start.
    #[error("the game is over")]
    GameOver,
    /// Enemies of the current wave are still queued for spawning.
    #[error("the current wave is still spawning")]
    StillSpawning,
    /// The configuration targets a wave other than the next one.
    #[error("expected wave {expected} but received wave {requested}")]
    OutOfSequence {
        /// Index of the wave the world expects next.
        expected: u32,
        /// Index carried by the rejected configuration.
        requested: u32,
    },
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Current level, starting at one.
    pub level: u32,
    /// Damage dealt per projectile.
    pub damage: u32,
    /// Targeting range in cells.
    pub range: f32,
    /// Minimum simulated time between shots.
    pub cooldown: Duration,
    /// Simulated timestamp of the last shot, if the tower has fired.
    pub last_fired: Option<Duration>,
    /// Number of enemies credited to the tower.
    pub kills: u32,
    /// Whether the passive sweep upgrades this tower.
    pub auto_upgrade: bool,
}

impl TowerSnapshot {
    /// Money required for the tower's next upgrade.
    #[must_use]
    pub const fn upgrade_cost(&self) -> u32 {
        self.kind.upgrade_cost(self.level)
    }

    /// Simulated time left at `now` before the tower may fire again.
    #[must_use]
    pub fn ready_in(&self, now: Duration) -> Duration {
        match self.last_fired {
            None => Duration::ZERO,
            Some(fired_at) => self.cooldown.saturating_sub(now.saturating_sub(fired_at)),
        }
    }
}

/// Read-only snapshot describing all towers, ordered by cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the tower occupying `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&cell, |snapshot| snapshot.cell)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Grid cell the enemy last arrived at.
    pub cell: CellCoord,
    /// Continuous world position.
    pub position: CellPoint,
    /// Cell the enemy is walking toward, if any.
    pub next: Option<CellCoord>,
    /// Fraction of the current step already covered.
    pub progress: f32,
    /// Remaining hit points.
    pub health: f32,
    /// Hit points at spawn.
    pub max_health: f32,
    /// Money credited when the enemy is destroyed.
    pub bounty: u32,
    /// Remaining slow duration. No tower applies it, so it stays zero.
    pub frozen: Duration,
}

/// Read-only snapshot describing all live enemies, in spawn order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Cell hosting the tower that fired.
    pub tower: CellCoord,
    /// Point the projectile left from.
    pub origin: CellPoint,
    /// Fixed point the projectile detonates at.
    pub target: CellPoint,
    /// Fraction of the flight already covered.
    pub progress: f32,
    /// Progress gained per simulated second.
    pub speed: f32,
    /// Damage applied to every enemy caught by the detonation.
    pub damage: u32,
    /// Area-of-effect radius; zero for single-target projectiles.
    pub blast_radius: f32,
}

impl ProjectileSnapshot {
    /// Current interpolated position of the projectile.
    #[must_use]
    pub fn position(&self) -> CellPoint {
        self.origin.lerp(self.target, self.progress.min(1.0))
    }
}

/// Read-only snapshot of every projectile in flight, in firing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view, preserving the provided order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ProjectileSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Target selected for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Cell hosting the tower.
    pub tower: CellCoord,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Enemy position at selection time; the projectile detonates there.
    pub aim: CellPoint,
    /// Distance between the tower and the aim point.
    pub distance: f32,
}

/// Progress of the active wave's spawn queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnSchedule {
    /// Enemies still waiting to spawn.
    pub pending: usize,
    /// Simulated timestamp at which the next enemy may spawn.
    pub next_spawn_at: Duration,
    /// Current simulated time.
    pub now: Duration,
}

impl SpawnSchedule {
    /// Reports whether an enemy should spawn this tick.
    #[must_use]
    pub fn is_due(&self) -> bool {
        self.pending > 0 && self.now >= self.next_spawn_at
    }
}

/// Economy and lifecycle state of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameStatus {
    /// Money available for building and upgrading.
    pub money: u32,
    /// Lives left before the session ends.
    pub lives: u32,
    /// Index of the most recently started wave; zero before the first.
    pub wave: u32,
    /// Current lifecycle phase.
    pub phase: GamePhase,
    /// Active speed multiplier.
    pub speed: GameSpeed,
    /// Whether the next wave starts automatically after a clear.
    pub auto_wave: bool,
}

impl GameStatus {
    /// Reports whether the session ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
