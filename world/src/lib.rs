#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bulwark.
//!
//! The world owns towers, enemies, projectiles, the economy, both clocks and
//! the session phase. It only changes in response to [`Command`] values passed
//! to [`apply`], and it reports every accepted or rejected change as an
//! [`Event`]. Read-only access goes through the [`query`] module.

pub mod navigation;

mod enemies;
mod projectiles;
mod towers;

use std::{collections::VecDeque, time::Duration};

use bulwark_core::{
    CellCoord, CellPoint, Command, EnemyId, EnemyKind, Event, GamePhase, GameSpeed, GameStatus,
    GridGeometry, PlacementError, TowerActionError, TowerKind, WaveConfig, WaveError, WorldConfig,
};
use log::{debug, info, trace};

use crate::{
    enemies::{Enemy, Stride},
    navigation::{build_flow_field, is_placement_valid, FlowField},
    projectiles::Projectile,
    towers::{Tower, TowerRegistry},
};

/// Spawn queue and pacing of the wave currently being released.
#[derive(Clone, Debug)]
struct ActiveWave {
    queue: VecDeque<EnemyKind>,
    spawn_interval: Duration,
    hit_point_multiplier: f32,
    next_spawn_at: Duration,
}

/// Real and simulated clocks advanced by every tick.
#[derive(Clone, Copy, Debug, Default)]
struct Clock {
    real: Duration,
    simulated: Duration,
    step: Duration,
}

impl Clock {
    fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }
}

/// Represents the authoritative Bulwark world state.
#[derive(Clone, Debug)]
pub struct World {
    config: WorldConfig,
    geometry: GridGeometry,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    projectiles: Vec<Projectile>,
    flow_field: FlowField,
    status: GameStatus,
    wave: Option<ActiveWave>,
    clock: Clock,
    wave_cleared_at: Option<Duration>,
}

impl World {
    /// Creates a new world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a new world from the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let geometry = config.geometry();
        let mut world = Self {
            config,
            geometry,
            towers: TowerRegistry::default(),
            enemies: Vec::new(),
            next_enemy_id: 0,
            projectiles: Vec::new(),
            flow_field: FlowField::default(),
            status: initial_status(&config),
            wave: None,
            clock: Clock::default(),
            wave_cleared_at: None,
        };
        world.refresh_navigation();
        world
    }

    fn reset(&mut self) {
        *self = Self::with_config(self.config);
    }

    fn refresh_navigation(&mut self) {
        let towers = &self.towers;
        self.flow_field = build_flow_field(
            self.geometry,
            self.geometry.exit_band(self.status.wave),
            |cell| towers.contains(cell),
        );
    }

    fn is_game_over(&self) -> bool {
        self.status.phase == GamePhase::GameOver
    }

    fn placement_check(&self, kind: TowerKind, cell: CellCoord) -> Result<(), PlacementError> {
        if self.is_game_over() {
            return Err(PlacementError::GameOver);
        }

        if !self.geometry.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }

        if self.geometry.is_edge_column(cell) {
            return Err(PlacementError::EdgeColumn);
        }

        if self.towers.contains(cell) {
            return Err(PlacementError::Occupied);
        }

        let cost = kind.cost();
        if self.status.money < cost {
            return Err(PlacementError::InsufficientFunds {
                required: cost,
                available: self.status.money,
            });
        }

        if self.enemies.iter().any(|enemy| enemy.overlaps(cell)) {
            return Err(PlacementError::EnemyOverlap);
        }

        let wave = self.status.wave;
        if !is_placement_valid(
            self.geometry,
            cell,
            self.geometry.spawn_band(wave),
            self.geometry.exit_band(wave),
            |occupied| self.towers.contains(occupied),
        ) {
            return Err(PlacementError::BlocksPath);
        }

        Ok(())
    }

    fn wave_check(&self, config: &WaveConfig) -> Result<(), WaveError> {
        if self.is_game_over() {
            return Err(WaveError::GameOver);
        }

        let still_spawning = self
            .wave
            .as_ref()
            .is_some_and(|wave| !wave.queue.is_empty());
        if self.status.phase == GamePhase::WaveActive && still_spawning {
            return Err(WaveError::StillSpawning);
        }

        let expected = self.status.wave.saturating_add(1);
        if config.wave != expected {
            return Err(WaveError::OutOfSequence {
                expected,
                requested: config.wave,
            });
        }

        Ok(())
    }

    fn tower_check(&self, cell: CellCoord) -> Result<(), TowerActionError> {
        if self.is_game_over() {
            return Err(TowerActionError::GameOver);
        }

        if !self.towers.contains(cell) {
            return Err(TowerActionError::MissingTower);
        }

        Ok(())
    }

    fn resolve_spawn_row(&self, requested: u32) -> u32 {
        let band = self.geometry.spawn_band(self.status.wave);
        let preferred = requested.clamp(band.first(), band.last());
        if self.flow_field.has_route(CellCoord::new(0, preferred)) {
            return preferred;
        }

        let fallback = band
            .rows()
            .filter(|row| self.flow_field.has_route(CellCoord::new(0, *row)))
            .min_by_key(|row| (row.abs_diff(preferred), *row));

        match fallback {
            Some(row) => {
                debug!("spawn row {preferred} has no route; using row {row}");
                row
            }
            None => preferred,
        }
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.is_game_over() {
            return;
        }

        let real = dt.min(self.config.max_frame_delta());
        let simulated = real.saturating_mul(self.status.speed.multiplier());
        self.clock.real = self.clock.real.saturating_add(real);
        self.clock.simulated = self.clock.simulated.saturating_add(simulated);
        self.clock.step = simulated;
        trace!(
            "tick: real {:?} (+{:?}), simulated {:?} (+{:?})",
            self.clock.real,
            real,
            self.clock.simulated,
            simulated
        );
        out_events.push(Event::TimeAdvanced { real, simulated });
    }

    fn start_wave(&mut self, config: WaveConfig, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.wave_check(&config) {
            debug!("wave {} rejected: {reason}", config.wave);
            out_events.push(Event::WaveStartRejected { reason });
            return;
        }

        let enemies = config.count();
        self.status.wave = config.wave;
        self.status.phase = GamePhase::WaveActive;
        self.wave = Some(ActiveWave {
            queue: config.roster.into_iter().collect(),
            spawn_interval: config.spawn_interval,
            hit_point_multiplier: config.hit_point_multiplier,
            next_spawn_at: self.clock.simulated,
        });
        self.wave_cleared_at = None;
        self.refresh_navigation();
        info!("wave {} started with {enemies} enemies", config.wave);
        out_events.push(Event::WaveStarted {
            wave: config.wave,
            enemies,
        });
    }

    fn spawn_enemy(&mut self, row: u32, out_events: &mut Vec<Event>) {
        if self.is_game_over() {
            return;
        }

        let now = self.clock.simulated;
        let Some(wave) = self.wave.as_ref() else {
            return;
        };
        if now < wave.next_spawn_at || wave.queue.is_empty() {
            return;
        }

        let row = self.resolve_spawn_row(row);
        let Some(wave) = self.wave.as_mut() else {
            return;
        };
        let Some(kind) = wave.queue.pop_front() else {
            return;
        };
        wave.next_spawn_at = now.saturating_add(wave.spawn_interval);

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        let cell = CellCoord::new(0, row);
        self.enemies
            .push(Enemy::spawn(id, kind, cell, wave.hit_point_multiplier));
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            cell,
        });
    }

    fn fire_projectile(&mut self, tower: CellCoord, aim: CellPoint, out_events: &mut Vec<Event>) {
        if self.is_game_over() {
            return;
        }

        let now = self.clock.simulated;
        let Some(entry) = self.towers.get_mut(tower) else {
            return;
        };
        if entry.ready_in(now) > Duration::ZERO {
            return;
        }

        entry.last_fired = Some(now);
        self.projectiles.push(Projectile::fire(
            tower,
            tower.to_point(),
            aim,
            entry.damage,
            entry.kind.blast_radius(),
        ));
        out_events.push(Event::ProjectileFired { tower, aim });
    }

    fn step_projectiles(&mut self, out_events: &mut Vec<Event>) {
        if self.is_game_over() || self.projectiles.is_empty() {
            return;
        }

        let step = self.clock.step_secs();
        let mut damage = vec![0_u32; self.enemies.len()];
        let mut credited: Vec<Option<CellCoord>> = vec![None; self.enemies.len()];
        let mut in_flight = Vec::with_capacity(self.projectiles.len());

        for mut projectile in self.projectiles.drain(..) {
            if !projectile.advance(step) {
                in_flight.push(projectile);
                continue;
            }

            let mut hits = 0;
            for (index, enemy) in self.enemies.iter().enumerate() {
                if projectile.catches(enemy.position) {
                    damage[index] = damage[index].saturating_add(projectile.damage);
                    let _ = credited[index].get_or_insert(projectile.tower);
                    hits += 1;
                }
            }

            out_events.push(Event::ProjectileDetonated {
                tower: projectile.tower,
                at: projectile.target,
                hits,
            });
        }
        self.projectiles = in_flight;

        let mut survivors = Vec::with_capacity(self.enemies.len());
        for (index, mut enemy) in self.enemies.drain(..).enumerate() {
            if damage[index] == 0 {
                survivors.push(enemy);
                continue;
            }

            enemy.health -= damage[index] as f32;
            if enemy.health > 0.0 {
                survivors.push(enemy);
                continue;
            }

            let Some(tower) = credited[index] else {
                continue;
            };
            self.status.money = self.status.money.saturating_add(enemy.bounty);
            if let Some(entry) = self.towers.get_mut(tower) {
                entry.kills = entry.kills.saturating_add(1);
            }
            out_events.push(Event::EnemyKilled {
                enemy: enemy.id,
                bounty: enemy.bounty,
                tower,
            });
        }
        self.enemies = survivors;
    }

    fn step_enemies(&mut self, out_events: &mut Vec<Event>) {
        if self.is_game_over() {
            return;
        }

        let step = self.clock.step_secs();
        let geometry = self.geometry;
        let mut survivors = Vec::with_capacity(self.enemies.len());
        for mut enemy in self.enemies.drain(..) {
            match enemy.advance(step, &self.flow_field, geometry) {
                Stride::Walking => survivors.push(enemy),
                Stride::Escaped => {
                    self.status.lives = self.status.lives.saturating_sub(1);
                    out_events.push(Event::EnemyLeaked {
                        enemy: enemy.id,
                        lives: self.status.lives,
                    });
                }
            }
        }
        self.enemies = survivors;

        if self.status.lives == 0 {
            self.status.phase = GamePhase::GameOver;
            self.wave = None;
            info!("game over during wave {}", self.status.wave);
            out_events.push(Event::GameOver {
                wave: self.status.wave,
            });
            return;
        }

        let queue_drained = self
            .wave
            .as_ref()
            .map_or(true, |wave| wave.queue.is_empty());
        if self.status.phase == GamePhase::WaveActive && queue_drained && self.enemies.is_empty() {
            self.status.phase = GamePhase::Idle;
            self.wave = None;
            self.wave_cleared_at = Some(self.clock.real);
            info!("wave {} cleared", self.status.wave);
            out_events.push(Event::WaveCleared {
                wave: self.status.wave,
            });
        }
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.placement_check(kind, cell) {
            debug!("placement of {} at {cell:?} rejected: {reason}", kind.name());
            out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            return;
        }

        let cost = kind.cost();
        if !self.towers.insert(Tower::new(kind, cell)) {
            return;
        }
        self.status.money -= cost;
        self.refresh_navigation();
        out_events.push(Event::TowerPlaced { kind, cell, cost });
    }

    fn sell_tower(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.tower_check(cell) {
            debug!("sale at {cell:?} rejected: {reason}");
            out_events.push(Event::TowerActionRejected { cell, reason });
            return;
        }

        let Some(tower) = self.towers.remove(cell) else {
            return;
        };
        let refund = tower.kind.refund();
        self.status.money = self.status.money.saturating_add(refund);
        self.refresh_navigation();
        out_events.push(Event::TowerSold { cell, refund });
    }

    fn upgrade_tower(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let result = self.tower_check(cell).and_then(|()| {
            let available = self.status.money;
            let cost = self
                .towers
                .get(cell)
                .map_or(0, |tower| tower.upgrade_cost());
            if available < cost {
                Err(TowerActionError::InsufficientFunds {
                    required: cost,
                    available,
                })
            } else {
                Ok(cost)
            }
        });

        let cost = match result {
            Ok(cost) => cost,
            Err(reason) => {
                debug!("upgrade at {cell:?} rejected: {reason}");
                out_events.push(Event::TowerActionRejected { cell, reason });
                return;
            }
        };

        let Some(tower) = self.towers.get_mut(cell) else {
            return;
        };
        tower.upgrade();
        self.status.money -= cost;
        out_events.push(Event::TowerUpgraded {
            cell,
            level: tower.level,
            cost,
        });
    }

    fn toggle_auto_upgrade(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.tower_check(cell) {
            debug!("auto-upgrade toggle at {cell:?} rejected: {reason}");
            out_events.push(Event::TowerActionRejected { cell, reason });
            return;
        }

        if let Some(tower) = self.towers.get_mut(cell) {
            tower.auto_upgrade = !tower.auto_upgrade;
            out_events.push(Event::AutoUpgradeToggled {
                cell,
                enabled: tower.auto_upgrade,
            });
        }
    }

    fn set_game_speed(&mut self, speed: GameSpeed, out_events: &mut Vec<Event>) {
        self.status.speed = speed;
        out_events.push(Event::GameSpeedChanged { speed });
    }

    fn toggle_auto_wave(&mut self, out_events: &mut Vec<Event>) {
        self.status.auto_wave = !self.status.auto_wave;
        out_events.push(Event::AutoWaveToggled {
            enabled: self.status.auto_wave,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn initial_status(config: &WorldConfig) -> GameStatus {
    GameStatus {
        money: config.starting_money,
        lives: config.starting_lives,
        wave: 0,
        phase: GamePhase::Idle,
        speed: GameSpeed::Normal,
        auto_wave: false,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.advance_clock(dt, out_events),
        Command::StartWave { config } => world.start_wave(config, out_events),
        Command::SpawnEnemy { row } => world.spawn_enemy(row, out_events),
        Command::FireProjectile { tower, aim } => world.fire_projectile(tower, aim, out_events),
        Command::StepProjectiles => world.step_projectiles(out_events),
        Command::StepEnemies => world.step_enemies(out_events),
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::SellTower { cell } => world.sell_tower(cell, out_events),
        Command::UpgradeTower { cell } => world.upgrade_tower(cell, out_events),
        Command::ToggleAutoUpgrade { cell } => world.toggle_auto_upgrade(cell, out_events),
        Command::SetGameSpeed { speed } => world.set_game_speed(speed, out_events),
        Command::ToggleAutoWave => world.toggle_auto_wave(out_events),
        Command::Restart => {
            world.reset();
            info!("session restarted");
            out_events.push(Event::Restarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use crate::navigation::FlowField;
    use bulwark_core::{
        Band, CellCoord, EnemyView, GamePhase, GameStatus, GridGeometry, PlacementError,
        ProjectileView, SpawnSchedule, TowerKind, TowerSnapshot, TowerView,
    };

    /// Dimensions of the playing field.
    #[must_use]
    pub fn geometry(world: &World) -> GridGeometry {
        world.geometry
    }

    /// Economy and lifecycle state.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Rows enemies spawn on during the current wave.
    #[must_use]
    pub fn spawn_band(world: &World) -> Band {
        world.geometry.spawn_band(world.status.wave)
    }

    /// Exit rows of the current wave.
    #[must_use]
    pub fn exit_band(world: &World) -> Band {
        world.geometry.exit_band(world.status.wave)
    }

    /// Captures a read-only view of every tower, ordered by cell.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Snapshot of the tower occupying `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerSnapshot> {
        world.towers.get(cell).map(|tower| tower.snapshot())
    }

    /// Captures a read-only view of every live enemy, in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Progress of the active wave's spawn queue.
    #[must_use]
    pub fn spawn_schedule(world: &World) -> SpawnSchedule {
        let now = world.clock.simulated;
        match world.wave.as_ref() {
            Some(wave) => SpawnSchedule {
                pending: wave.queue.len(),
                next_spawn_at: wave.next_spawn_at,
                now,
            },
            None => SpawnSchedule {
                pending: 0,
                next_spawn_at: now,
                now,
            },
        }
    }

    /// Flow field toward the current exit band.
    #[must_use]
    pub fn flow_field(world: &World) -> &FlowField {
        &world.flow_field
    }

    /// Next cell an enemy standing on `cell` walks to.
    #[must_use]
    pub fn next_hop(world: &World, cell: CellCoord) -> Option<CellCoord> {
        world.flow_field.next_hop(cell)
    }

    /// Total clamped real time the world has been ticked for.
    #[must_use]
    pub fn real_time(world: &World) -> Duration {
        world.clock.real
    }

    /// Total speed-scaled time the world has been ticked for.
    #[must_use]
    pub fn simulated_time(world: &World) -> Duration {
        world.clock.simulated
    }

    /// Reports whether the next wave should start automatically.
    ///
    /// Requires an idle session with auto-wave enabled, at least one wave
    /// played, and `delay` of real time elapsed since the last clear.
    #[must_use]
    pub fn auto_wave_due(world: &World, delay: Duration) -> bool {
        let status = world.status;
        if status.phase != GamePhase::Idle || !status.auto_wave || status.wave == 0 {
            return false;
        }

        world
            .wave_cleared_at
            .is_some_and(|cleared_at| world.clock.real >= cleared_at.saturating_add(delay))
    }

    /// Evaluates whether a tower of `kind` could be placed on `cell` right now.
    pub fn placement_check(
        world: &World,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<(), PlacementError> {
        world.placement_check(kind, cell)
    }
}
