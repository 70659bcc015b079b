#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave roster generation.
//!
//! Every wave draws its roster from a ChaCha stream whose seed is derived from
//! the session seed and the wave index, so a wave's composition does not depend
//! on how many waves were generated before it.

use std::time::Duration;

use bulwark_core::{EnemyKind, WaveConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const BASE_ENEMY_COUNT: u32 = 5;
const MAX_SPAWN_INTERVAL_MS: u64 = 1_000;
const MIN_SPAWN_INTERVAL_MS: u64 = 200;
const SPAWN_INTERVAL_STEP_MS: u64 = 50;
const HIT_POINT_GROWTH: f32 = 0.2;
const ROSTER_STREAM: &str = "roster";

/// Pure system that produces the [`WaveConfig`] of any wave index.
#[derive(Clone, Copy, Debug)]
pub struct WaveGeneration {
    seed: u64,
}

impl WaveGeneration {
    /// Creates a generator bound to the provided session seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generates the roster and pacing of `wave`.
    #[must_use]
    pub fn generate(&self, wave: u32) -> WaveConfig {
        let eligible = eligible_kinds(wave);
        let count = enemy_count(wave);
        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.seed, wave));
        let roster = (0..count)
            .map(|_| eligible[rng.gen_range(0..eligible.len())])
            .collect();

        WaveConfig {
            wave,
            roster,
            eligible,
            spawn_interval: spawn_interval(wave),
            hit_point_multiplier: hit_point_multiplier(wave),
        }
    }
}

/// Number of enemies in `wave`: `5 + floor(1.5 × wave)`.
#[must_use]
pub fn enemy_count(wave: u32) -> usize {
    let count = BASE_ENEMY_COUNT.saturating_add(wave.saturating_mul(3) / 2);
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// Simulated time between two spawns of `wave`.
#[must_use]
pub fn spawn_interval(wave: u32) -> Duration {
    let reduction = u64::from(wave).saturating_mul(SPAWN_INTERVAL_STEP_MS);
    let millis = MAX_SPAWN_INTERVAL_MS
        .saturating_sub(reduction)
        .max(MIN_SPAWN_INTERVAL_MS);
    Duration::from_millis(millis)
}

/// Hit point factor applied to enemies of `wave`: `1 + 0.2 × wave`.
#[must_use]
pub fn hit_point_multiplier(wave: u32) -> f32 {
    1.0 + HIT_POINT_GROWTH * wave as f32
}

/// Enemy kinds `wave` samples its roster from.
///
/// Bosses join every fifth wave, triangles from wave three, circles from wave
/// six and diamonds from wave nine. Squares only appear when nothing else is
/// eligible.
#[must_use]
pub fn eligible_kinds(wave: u32) -> Vec<EnemyKind> {
    let mut kinds = Vec::new();
    if wave % 5 == 0 {
        kinds.push(EnemyKind::Boss);
    }
    if wave > 2 {
        kinds.push(EnemyKind::Triangle);
    }
    if wave > 5 {
        kinds.push(EnemyKind::Circle);
    }
    if wave > 8 {
        kinds.push(EnemyKind::Diamond);
    }
    if kinds.is_empty() {
        kinds.push(EnemyKind::Square);
    }
    kinds
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(ROSTER_STREAM.as_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_count_grows_by_one_and_a_half_per_wave() {
        assert_eq!(enemy_count(1), 6);
        assert_eq!(enemy_count(2), 8);
        assert_eq!(enemy_count(5), 12);
        assert_eq!(enemy_count(10), 20);
    }

    #[test]
    fn spawn_interval_shrinks_to_a_floor() {
        assert_eq!(spawn_interval(1), Duration::from_millis(950));
        assert_eq!(spawn_interval(10), Duration::from_millis(500));
        assert_eq!(spawn_interval(16), Duration::from_millis(200));
        assert_eq!(spawn_interval(40), Duration::from_millis(200));
    }

    #[test]
    fn hit_points_scale_linearly() {
        assert!((hit_point_multiplier(1) - 1.2).abs() < 1e-6);
        assert!((hit_point_multiplier(10) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn early_waves_only_field_squares() {
        assert_eq!(eligible_kinds(1), vec![EnemyKind::Square]);
        assert_eq!(eligible_kinds(2), vec![EnemyKind::Square]);
        assert_eq!(eligible_kinds(3), vec![EnemyKind::Triangle]);
    }

    #[test]
    fn fifth_waves_add_a_boss() {
        assert_eq!(eligible_kinds(5), vec![EnemyKind::Boss, EnemyKind::Triangle]);
        assert_eq!(
            eligible_kinds(10),
            vec![
                EnemyKind::Boss,
                EnemyKind::Triangle,
                EnemyKind::Circle,
                EnemyKind::Diamond,
            ]
        );
    }

    #[test]
    fn wave_seeds_differ_per_wave() {
        assert_ne!(derive_wave_seed(7, 1), derive_wave_seed(7, 2));
        assert_ne!(derive_wave_seed(7, 1), derive_wave_seed(8, 1));
    }
}
