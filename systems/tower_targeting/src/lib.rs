#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks a target for every tower ready to fire.

use std::time::Duration;

use bulwark_core::{CellPoint, EnemyId, EnemyView, GamePhase, TowerTarget, TowerView};

/// Tower targeting system that reuses a scratch buffer to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the nearest in-range enemy of every tower whose cooldown
    /// elapsed by the simulated time `now`.
    ///
    /// Distances run from the tower's cell to the enemy's continuous position,
    /// and equal distances resolve to the earliest spawned enemy. Every
    /// assignment is a shot to fire this tick. The output buffer is cleared
    /// before populating it with the latest assignments.
    pub fn handle(
        &mut self,
        phase: GamePhase,
        now: Duration,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if phase != GamePhase::WaveActive || towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter().filter(|tower| tower.ready_in(now).is_zero()) {
            let origin = tower.cell.to_point();
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance = origin.distance(candidate.position);
                if distance > tower.range {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    enemy: candidate.id,
                    position: candidate.position,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.cell,
                    enemy: best_candidate.enemy,
                    aim: best_candidate.position,
                    distance: best_candidate.distance,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            if snapshot.health <= 0.0 {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: CellPoint,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    enemy: EnemyId,
    position: CellPoint,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::{CellCoord, EnemyKind, EnemySnapshot, TowerKind, TowerSnapshot};

    const NOW: Duration = Duration::from_millis(5_000);

    fn tower(cell: (u32, u32), kind: TowerKind) -> TowerSnapshot {
        TowerSnapshot {
            cell: CellCoord::new(cell.0, cell.1),
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

    fn enemy(id: u32, position: (f32, f32)) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Square,
            cell: CellCoord::new(0, 5),
            position: CellPoint::new(position.0, position.1),
            next: None,
            progress: 0.0,
            health: 30.0,
            max_health: 30.0,
            bounty: 15,
            frozen: Duration::ZERO,
        }
    }

    fn targets(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            GamePhase::WaveActive,
            NOW,
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn targets_enemy_within_range() {
        let out = targets(
            vec![tower((4, 4), TowerKind::Cannon)],
            vec![enemy(2, (6.0, 5.0))],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, CellCoord::new(4, 4));
        assert_eq!(out[0].enemy, EnemyId::new(2));
        assert_eq!(out[0].aim, CellPoint::new(6.0, 5.0));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let out = targets(
            vec![tower((4, 4), TowerKind::MachineGun)],
            vec![enemy(1, (6.5, 4.0)), enemy(2, (7.0, 4.0))],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(1));
    }

    #[test]
    fn nearest_enemy_wins() {
        let out = targets(
            vec![tower((4, 4), TowerKind::Sniper)],
            vec![enemy(1, (10.0, 4.0)), enemy(2, (5.0, 5.0))],
        );
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn earliest_spawned_enemy_breaks_ties() {
        let out = targets(
            vec![tower((4, 4), TowerKind::Cannon)],
            vec![enemy(9, (4.0, 6.0)), enemy(3, (4.0, 2.0))],
        );
        assert_eq!(out[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn idle_phase_clears_output() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: CellCoord::new(1, 1),
            enemy: EnemyId::new(0),
            aim: CellPoint::new(0.0, 0.0),
            distance: 0.0,
        }];
        system.handle(
            GamePhase::Idle,
            NOW,
            &TowerView::from_snapshots(vec![tower((1, 1), TowerKind::Cannon)]),
            &EnemyView::from_snapshots(vec![enemy(0, (1.0, 2.0))]),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn every_tower_picks_independently() {
        let out = targets(
            vec![tower((2, 2), TowerKind::Cannon), tower((10, 8), TowerKind::Cannon)],
            vec![enemy(1, (3.0, 2.0)), enemy(2, (10.0, 7.0))],
        );
        let pairs: Vec<_> = out.iter().map(|target| (target.tower, target.enemy)).collect();
        assert_eq!(
            pairs,
            vec![
                (CellCoord::new(2, 2), EnemyId::new(1)),
                (CellCoord::new(10, 8), EnemyId::new(2)),
            ]
        );
    }

    #[test]
    fn cooling_towers_hold_their_fire() {
        let mut cooling = tower((4, 4), TowerKind::Cannon);
        cooling.last_fired = Some(NOW - Duration::from_millis(300));
        let mut rested = tower((4, 6), TowerKind::Cannon);
        rested.last_fired = Some(NOW - rested.cooldown);

        let out = targets(vec![cooling, rested], vec![enemy(1, (5.0, 5.0))]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, CellCoord::new(4, 6));
        assert_eq!(out[0].enemy, EnemyId::new(1));
    }
}
