//! Projectiles travelling toward a fixed detonation point.

use bulwark_core::{CellCoord, CellPoint, ProjectileSnapshot, DIRECT_HIT_RADIUS, PROJECTILE_SPEED};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) tower: CellCoord,
    origin: CellPoint,
    pub(crate) target: CellPoint,
    progress: f32,
    speed: f32,
    pub(crate) damage: u32,
    blast_radius: f32,
}

impl Projectile {
    /// Launches a projectile from `origin` toward the fixed point `target`.
    pub(crate) fn fire(
        tower: CellCoord,
        origin: CellPoint,
        target: CellPoint,
        damage: u32,
        blast_radius: f32,
    ) -> Self {
        Self {
            tower,
            origin,
            target,
            progress: 0.0,
            speed: PROJECTILE_SPEED,
            damage,
            blast_radius,
        }
    }

    /// Moves the projectile by `step` simulated seconds and reports arrival.
    pub(crate) fn advance(&mut self, step: f32) -> bool {
        self.progress += self.speed * step;
        self.progress >= 1.0
    }

    fn hit_radius(&self) -> f32 {
        if self.blast_radius > 0.0 {
            self.blast_radius
        } else {
            DIRECT_HIT_RADIUS
        }
    }

    /// Reports whether an enemy standing at `point` is caught by the detonation.
    pub(crate) fn catches(&self, point: CellPoint) -> bool {
        self.target.distance(point) < self.hit_radius()
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            tower: self.tower,
            origin: self.origin,
            target: self.target,
            progress: self.progress,
            speed: self.speed,
            damage: self.damage,
            blast_radius: self.blast_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cannon_shot() -> Projectile {
        Projectile::fire(
            CellCoord::new(3, 4),
            CellPoint::new(3.0, 4.0),
            CellPoint::new(4.0, 5.0),
            20,
            0.0,
        )
    }

    #[test]
    fn projectile_arrives_after_a_third_of_a_second() {
        let mut projectile = cannon_shot();
        assert!(!projectile.advance(0.2));
        assert!(projectile.advance(0.2));
    }

    #[test]
    fn direct_hit_radius_is_strict() {
        let projectile = cannon_shot();
        assert!(projectile.catches(CellPoint::new(4.2, 5.0)));
        assert!(!projectile.catches(CellPoint::new(4.5, 5.0)));
    }

    #[test]
    fn blast_radius_replaces_the_direct_hit_radius() {
        let projectile = Projectile::fire(
            CellCoord::new(3, 4),
            CellPoint::new(3.0, 4.0),
            CellPoint::new(4.0, 5.0),
            40,
            1.5,
        );
        assert!(projectile.catches(CellPoint::new(5.0, 5.0)));
        assert!(!projectile.catches(CellPoint::new(5.5, 5.0)));
    }

    #[test]
    fn snapshot_reports_the_interpolated_position() {
        let mut projectile = cannon_shot();
        let _ = projectile.advance(0.1);
        let position = projectile.snapshot().position();
        assert!((position.column() - 3.3).abs() < 1e-4);
        assert!((position.row() - 4.3).abs() < 1e-4);
    }
}
