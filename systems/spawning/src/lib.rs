#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use bulwark_core::{Band, Command, Event, SpawnSchedule};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SPAWN_ROW_STREAM: u64 = 1;

/// Pure system that releases queued enemies onto random rows of the spawn band.
#[derive(Clone, Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system whose row choices derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(SPAWN_ROW_STREAM);
        Self { rng }
    }

    /// Emits at most one `Command::SpawnEnemy` per tick once the schedule is due.
    pub fn handle(
        &mut self,
        events: &[Event],
        schedule: SpawnSchedule,
        band: Band,
        out: &mut Vec<Command>,
    ) {
        let advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !advanced || !schedule.is_due() {
            return;
        }

        let row = self.rng.gen_range(band.first()..=band.last());
        out.push(Command::SpawnEnemy { row });
    }
}
