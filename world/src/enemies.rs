//! Enemy state and flow-field driven movement.

use std::time::Duration;

use bulwark_core::{
    CellCoord, CellPoint, EnemyId, EnemyKind, EnemySnapshot, GridGeometry, ENEMY_FOOTPRINT,
};

use crate::navigation::FlowField;

/// Outcome of advancing an enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stride {
    /// The enemy is still on the field.
    Walking,
    /// The enemy arrived on the exit column.
    Escaped,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) cell: CellCoord,
    origin: CellPoint,
    pub(crate) position: CellPoint,
    next: Option<CellCoord>,
    progress: f32,
    pub(crate) health: f32,
    max_health: f32,
    pub(crate) bounty: u32,
    frozen: Duration,
}

impl Enemy {
    /// Places a new enemy just outside column zero, walking into `cell`.
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, cell: CellCoord, multiplier: f32) -> Self {
        let origin = CellPoint::new(-1.0, cell.row() as f32);
        let health = kind.base_hit_points() * multiplier;
        Self {
            id,
            kind,
            cell,
            origin,
            position: origin,
            next: Some(cell),
            progress: 0.0,
            health,
            max_health: health,
            bounty: kind.bounty(),
            frozen: Duration::ZERO,
        }
    }

    /// Moves the enemy along its current step by `step` simulated seconds.
    ///
    /// Arriving on a cell snaps the enemy onto it and selects the next hop from
    /// `field`, falling back to the cell one column east. Arriving on the exit
    /// column reports [`Stride::Escaped`].
    pub(crate) fn advance(&mut self, step: f32, field: &FlowField, geometry: GridGeometry) -> Stride {
        let Some(next) = self.next else {
            self.next = route(self.cell, field, geometry);
            return Stride::Walking;
        };

        self.progress += self.kind.speed() * step;

        if self.progress >= 1.0 {
            self.cell = next;
            self.origin = next.to_point();
            self.position = self.origin;

            if next.column() >= geometry.exit_column() {
                return Stride::Escaped;
            }

            self.next = route(next, field, geometry);
            let remainder = self.progress - 1.0;
            self.progress = if remainder < 1.0 { remainder } else { 0.0 };
        }

        self.position = match self.next {
            Some(next) => self.origin.lerp(next.to_point(), self.progress),
            None => self.origin,
        };
        Stride::Walking
    }

    /// Reports whether the enemy's body overlaps `cell`.
    pub(crate) fn overlaps(&self, cell: CellCoord) -> bool {
        let point = cell.to_point();
        (self.position.column() - point.column()).abs() < ENEMY_FOOTPRINT
            && (self.position.row() - point.row()).abs() < ENEMY_FOOTPRINT
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            next: self.next,
            progress: self.progress,
            health: self.health,
            max_health: self.max_health,
            bounty: self.bounty,
            frozen: self.frozen,
        }
    }
}

fn route(cell: CellCoord, field: &FlowField, geometry: GridGeometry) -> Option<CellCoord> {
    field.next_hop(cell).or_else(|| {
        let east = cell.east();
        geometry.contains(east).then_some(east)
    })
}
