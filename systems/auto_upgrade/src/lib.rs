#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Passive upgrade sweep for towers flagged for automatic upgrades.

use std::time::Duration;

use bulwark_core::{Command, Event, GameStatus, TowerView};
use log::debug;

/// Real time between two sweeps when no other cadence is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(1_000);

/// Pure system that periodically upgrades every affordable auto-upgrade tower.
#[derive(Clone, Debug)]
pub struct AutoUpgrade {
    interval: Duration,
    elapsed: Duration,
}

impl AutoUpgrade {
    /// Creates a new sweep running every `interval` of real time.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Accumulates real time and emits `Command::UpgradeTower` batches when a
    /// sweep is due.
    ///
    /// Towers are visited in cell order against a running money total, so each
    /// emitted upgrade is affordable once the earlier ones have been paid for.
    /// A tower is upgraded at most once per sweep.
    pub fn handle(
        &mut self,
        events: &[Event],
        status: GameStatus,
        towers: &TowerView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TimeAdvanced { real, .. } = event {
                self.elapsed = self.elapsed.saturating_add(*real);
            }
        }

        if self.interval.is_zero() || self.elapsed < self.interval {
            return;
        }
        self.elapsed = Duration::ZERO;

        if status.is_game_over() {
            return;
        }

        let mut money = status.money;
        for tower in towers.iter().filter(|tower| tower.auto_upgrade) {
            let cost = tower.upgrade_cost();
            if money < cost {
                continue;
            }

            money -= cost;
            debug!(
                "auto-upgrading {} at {:?} to level {}",
                tower.kind.name(),
                tower.cell,
                tower.level + 1
            );
            out.push(Command::UpgradeTower { cell: tower.cell });
        }
    }
}

impl Default for AutoUpgrade {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}
