use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use bulwark_core::{CellCoord, Event, GameSpeed, TowerKind};
use bulwark_simulation::{SessionConfig, Simulation, Snapshot};

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    snapshots: Vec<Snapshot>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for snapshot in &self.snapshots {
            snapshot.status.hash(&mut hasher);
            snapshot.simulated_time.hash(&mut hasher);
            for enemy in snapshot.enemies.iter() {
                enemy.id.hash(&mut hasher);
                enemy.cell.hash(&mut hasher);
                enemy.health.to_bits().hash(&mut hasher);
                enemy.position.column().to_bits().hash(&mut hasher);
                enemy.position.row().to_bits().hash(&mut hasher);
            }
            for tower in snapshot.towers.iter() {
                tower.cell.hash(&mut hasher);
                tower.level.hash(&mut hasher);
                tower.kills.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut simulation = Simulation::new(SessionConfig {
        seed,
        ..SessionConfig::default()
    });
    let layout = [
        (TowerKind::Cannon, CellCoord::new(4, 4)),
        (TowerKind::Cannon, CellCoord::new(4, 6)),
        (TowerKind::MachineGun, CellCoord::new(8, 4)),
        (TowerKind::Frost, CellCoord::new(12, 6)),
    ];
    for (kind, cell) in layout {
        simulation.place_tower(kind, cell).expect("layout placement");
    }
    let _ = simulation.toggle_auto_upgrade(CellCoord::new(4, 4));
    let _ = simulation.toggle_auto_wave();
    simulation.set_game_speed(GameSpeed::Double);
    let _ = simulation.start_next_wave();

    let mut snapshots = Vec::new();
    let mut events = Vec::new();
    // Irregular frame times exercise clamping and fractional progress.
    let frames = [16_u64, 17, 16, 33, 70, 16];
    for frame in 0..3_000 {
        let dt = Duration::from_millis(frames[frame % frames.len()]);
        simulation.advance(dt);
        events.extend(simulation.drain_events());
        if frame % 25 == 0 {
            snapshots.push(simulation.snapshot());
        }
        if simulation.status().is_game_over() {
            break;
        }
    }
    snapshots.push(simulation.snapshot());
    ReplayOutcome { snapshots, events }
}

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(0xfeed);
    let second = replay(0xfeed);
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn replay_progresses_through_several_waves() {
    let outcome = replay(0xfeed);
    let waves_started = outcome
        .events
        .iter()
        .filter(|event| matches!(event, Event::WaveStarted { .. }))
        .count();
    assert!(waves_started >= 2, "auto-wave never chained waves");
}

#[test]
fn restart_replays_the_same_session() {
    let mut simulation = Simulation::new(SessionConfig {
        seed: 21,
        ..SessionConfig::default()
    });
    let run = |simulation: &mut Simulation| {
        let _ = simulation.start_next_wave();
        for _ in 0..400 {
            simulation.advance(Duration::from_millis(16));
        }
        simulation.drain_events()
    };

    let first = run(&mut simulation);
    simulation.restart();
    let _ = simulation.drain_events();
    let second = run(&mut simulation);
    assert_eq!(first, second);
}
