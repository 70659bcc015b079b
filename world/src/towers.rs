//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use bulwark_core::{CellCoord, TowerKind, TowerSnapshot};

const DAMAGE_GROWTH_NUMERATOR: u32 = 13;
const DAMAGE_GROWTH_DENOMINATOR: u32 = 10;
const RANGE_GROWTH: f32 = 1.05;

/// Tower stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tower {
    pub(crate) cell: CellCoord,
    pub(crate) kind: TowerKind,
    pub(crate) level: u32,
    pub(crate) damage: u32,
    pub(crate) range: f32,
    pub(crate) cooldown: Duration,
    pub(crate) last_fired: Option<Duration>,
    pub(crate) kills: u32,
    pub(crate) auto_upgrade: bool,
}

impl Tower {
    /// Builds a level-one tower with the kind's base statistics.
    pub(crate) fn new(kind: TowerKind, cell: CellCoord) -> Self {
        Self {
            cell,
            kind,
            level: 1,
            damage: kind.base_damage(),
            range: kind.base_range(),
            cooldown: kind.cooldown(),
            last_fired: None,
            kills: 0,
            auto_upgrade: false,
        }
    }

    /// Money required to reach the next level.
    pub(crate) fn upgrade_cost(&self) -> u32 {
        self.kind.upgrade_cost(self.level)
    }

    /// Raises the level, compounding damage (×1.3, floored) and range (×1.05).
    pub(crate) fn upgrade(&mut self) {
        self.level = self.level.saturating_add(1);
        self.damage = self.damage.saturating_mul(DAMAGE_GROWTH_NUMERATOR) / DAMAGE_GROWTH_DENOMINATOR;
        self.range *= RANGE_GROWTH;
    }

    /// Simulated time left before the tower may fire again.
    pub(crate) fn ready_in(&self, now: Duration) -> Duration {
        self.snapshot().ready_in(now)
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            cell: self.cell,
            kind: self.kind,
            level: self.level,
            damage: self.damage,
            range: self.range,
            cooldown: self.cooldown,
            last_fired: self.last_fired,
            kills: self.kills,
            auto_upgrade: self.auto_upgrade,
        }
    }
}

/// Registry that stores towers keyed by the cell they occupy.
#[derive(Clone, Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<CellCoord, Tower>,
}

impl TowerRegistry {
    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell)
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&Tower> {
        self.entries.get(&cell)
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut Tower> {
        self.entries.get_mut(&cell)
    }

    /// Stores the tower, refusing to overwrite an occupied cell.
    pub(crate) fn insert(&mut self, tower: Tower) -> bool {
        if self.entries.contains_key(&tower.cell) {
            return false;
        }
        let _ = self.entries.insert(tower.cell, tower);
        true
    }

    pub(crate) fn remove(&mut self, cell: CellCoord) -> Option<Tower> {
        self.entries.remove(&cell)
    }

    /// Towers ordered by cell.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }
}
