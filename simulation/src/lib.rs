#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick scheduler that owns the world and every system of a Bulwark session.
//!
//! [`Simulation::advance`] runs one frame of the pipeline in a fixed order:
//! clock, automatic wave start, spawning, targeting and firing, projectiles,
//! movement and outcome, and finally the passive upgrade sweep. The player
//! mutators run between frames and report rejections as typed errors.

mod config;

pub use config::{ConfigError, SessionConfig};

use std::time::Duration;

use bulwark_core::{
    Band, CellCoord, Command, EnemyView, Event, GameSpeed, GameStatus, GridGeometry,
    PlacementError, ProjectileView, TowerActionError, TowerKind, TowerTarget, TowerView,
    WaveError,
};
use bulwark_system_auto_upgrade::AutoUpgrade;
use bulwark_system_spawning::Spawning;
use bulwark_system_tower_targeting::TowerTargeting;
use bulwark_system_wave_generation::WaveGeneration;
use bulwark_world::{self as world, query, World};
use log::debug;

/// Read-only copy of everything an adapter needs to present a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Dimensions of the playing field.
    pub geometry: GridGeometry,
    /// Rows enemies spawn on during the current wave.
    pub spawn_band: Band,
    /// Exit rows of the current wave.
    pub exit_band: Band,
    /// Economy and lifecycle state.
    pub status: GameStatus,
    /// Every tower, ordered by cell.
    pub towers: TowerView,
    /// Every live enemy, in spawn order.
    pub enemies: EnemyView,
    /// Every projectile in flight, in firing order.
    pub projectiles: ProjectileView,
    /// Total clamped real time simulated so far.
    pub real_time: Duration,
    /// Total speed-scaled time simulated so far.
    pub simulated_time: Duration,
}

/// Single owner of a session's world and systems.
#[derive(Debug)]
pub struct Simulation {
    config: SessionConfig,
    world: World,
    waves: WaveGeneration,
    spawning: Spawning,
    targeting: TowerTargeting,
    auto_upgrade: AutoUpgrade,
    targets: Vec<TowerTarget>,
    events: Vec<Event>,
    settled_events: usize,
}

impl Simulation {
    /// Creates a new session from the provided configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            world: World::with_config(config.world),
            waves: WaveGeneration::new(config.seed),
            spawning: Spawning::new(config.seed),
            targeting: TowerTargeting::new(),
            auto_upgrade: AutoUpgrade::new(config.auto_upgrade_interval()),
            targets: Vec::new(),
            events: Vec::new(),
            settled_events: 0,
        }
    }

    /// Configuration the session was built from.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read-only access to the authoritative world for use with [`query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Economy and lifecycle state.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Captures the current state of the session.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            geometry: query::geometry(&self.world),
            spawn_band: query::spawn_band(&self.world),
            exit_band: query::exit_band(&self.world),
            status: query::status(&self.world),
            towers: query::tower_view(&self.world),
            enemies: query::enemy_view(&self.world),
            projectiles: query::projectile_view(&self.world),
            real_time: query::real_time(&self.world),
            simulated_time: query::simulated_time(&self.world),
        }
    }

    /// Removes and returns every event emitted since the previous call.
    ///
    /// Adapters drain once per frame. Events of a completed frame that were
    /// not drained are discarded when the next frame runs, while events of
    /// mutators called between frames are kept.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.settled_events = 0;
        std::mem::take(&mut self.events)
    }

    /// Runs one frame of the tick pipeline for `frame_dt` of real time.
    pub fn advance(&mut self, frame_dt: Duration) {
        let _ = self.events.drain(..self.settled_events);

        let tick_events = self.execute(Command::Tick { dt: frame_dt });

        if query::auto_wave_due(&self.world, self.config.auto_wave_delay()) {
            debug!("auto-wave delay elapsed");
            if let Err(reason) = self.start_next_wave() {
                debug!("automatic wave start rejected: {reason}");
            }
        }

        let mut commands = Vec::new();
        self.spawning.handle(
            &tick_events,
            query::spawn_schedule(&self.world),
            query::spawn_band(&self.world),
            &mut commands,
        );
        self.execute_all(&mut commands);

        self.targeting.handle(
            query::status(&self.world).phase,
            query::simulated_time(&self.world),
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        commands.extend(self.targets.iter().map(|target| Command::FireProjectile {
            tower: target.tower,
            aim: target.aim,
        }));
        self.execute_all(&mut commands);

        let _ = self.execute(Command::StepProjectiles);
        let _ = self.execute(Command::StepEnemies);

        self.auto_upgrade.handle(
            &tick_events,
            query::status(&self.world),
            &query::tower_view(&self.world),
            &mut commands,
        );
        self.execute_all(&mut commands);

        self.settled_events = self.events.len();
    }

    /// Builds a tower of `kind` on `cell`.
    pub fn place_tower(&mut self, kind: TowerKind, cell: CellCoord) -> Result<(), PlacementError> {
        let events = self.execute(Command::PlaceTower { kind, cell });
        for event in events {
            if let Event::TowerPlacementRejected { reason, .. } = event {
                return Err(reason);
            }
        }
        Ok(())
    }

    /// Sells the tower on `cell`, returning the refund.
    pub fn sell_tower(&mut self, cell: CellCoord) -> Result<u32, TowerActionError> {
        let events = self.execute(Command::SellTower { cell });
        tower_action_outcome(events, |event| match event {
            Event::TowerSold { refund, .. } => Some(refund),
            _ => None,
        })
    }

    /// Upgrades the tower on `cell`, returning its new level.
    pub fn upgrade_tower(&mut self, cell: CellCoord) -> Result<u32, TowerActionError> {
        let events = self.execute(Command::UpgradeTower { cell });
        tower_action_outcome(events, |event| match event {
            Event::TowerUpgraded { level, .. } => Some(level),
            _ => None,
        })
    }

    /// Flips the auto-upgrade flag of the tower on `cell`, returning the new value.
    pub fn toggle_auto_upgrade(&mut self, cell: CellCoord) -> Result<bool, TowerActionError> {
        let events = self.execute(Command::ToggleAutoUpgrade { cell });
        tower_action_outcome(events, |event| match event {
            Event::AutoUpgradeToggled { enabled, .. } => Some(enabled),
            _ => None,
        })
    }

    /// Generates and starts the next wave, returning its index.
    pub fn start_next_wave(&mut self) -> Result<u32, WaveError> {
        let next = query::status(&self.world).wave.saturating_add(1);
        let config = self.waves.generate(next);
        let events = self.execute(Command::StartWave { config });
        for event in events {
            match event {
                Event::WaveStarted { wave, .. } => return Ok(wave),
                Event::WaveStartRejected { reason } => return Err(reason),
                _ => {}
            }
        }
        Err(WaveError::OutOfSequence {
            expected: next,
            requested: next,
        })
    }

    /// Activates the provided game speed.
    pub fn set_game_speed(&mut self, speed: GameSpeed) {
        let _ = self.execute(Command::SetGameSpeed { speed });
    }

    /// Advances the game speed through 1×, 2× and 4×, returning the new speed.
    pub fn cycle_game_speed(&mut self) -> GameSpeed {
        let speed = query::status(&self.world).speed.next();
        self.set_game_speed(speed);
        speed
    }

    /// Flips the automatic wave flag, returning the new value.
    pub fn toggle_auto_wave(&mut self) -> bool {
        let _ = self.execute(Command::ToggleAutoWave);
        query::status(&self.world).auto_wave
    }

    /// Rebuilds the world and every system from the session configuration.
    pub fn restart(&mut self) {
        let _ = self.execute(Command::Restart);
        self.waves = WaveGeneration::new(self.config.seed);
        self.spawning = Spawning::new(self.config.seed);
        self.targeting = TowerTargeting::new();
        self.auto_upgrade = AutoUpgrade::new(self.config.auto_upgrade_interval());
        self.targets.clear();
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.events.extend(events.iter().cloned());
        events
    }

    fn execute_all(&mut self, commands: &mut Vec<Command>) {
        for command in commands.drain(..) {
            let _ = self.execute(command);
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

fn tower_action_outcome<T>(
    events: Vec<Event>,
    accepted: impl Fn(Event) -> Option<T>,
) -> Result<T, TowerActionError> {
    for event in events {
        if let Event::TowerActionRejected { reason, .. } = event {
            return Err(reason);
        }
        if let Some(value) = accepted(event) {
            return Ok(value);
        }
    }
    Err(TowerActionError::MissingTower)
}
