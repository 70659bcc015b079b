use std::{collections::BTreeSet, time::Duration};

use bulwark_core::{CellCoord, Event, GamePhase, GameSpeed, TowerKind};
use bulwark_simulation::{SessionConfig, Simulation};

const FRAME_PATTERN_MS: [u64; 3] = [16, 70, 5];
const MAX_FRAMES: usize = 50_000;

#[derive(Debug, Default)]
struct Ledger {
    costs: u64,
    refunds: u64,
    bounties: u64,
    waves_started: u32,
    waves_cleared: u32,
    killed: BTreeSet<u32>,
}

impl Ledger {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TowerPlaced { cost, .. } | Event::TowerUpgraded { cost, .. } => {
                    self.costs += u64::from(*cost);
                }
                Event::TowerSold { refund, .. } => self.refunds += u64::from(*refund),
                Event::EnemyKilled { enemy, bounty, .. } => {
                    self.bounties += u64::from(*bounty);
                    assert!(self.killed.insert(enemy.get()), "{enemy:?} killed twice");
                }
                Event::WaveStarted { .. } => self.waves_started += 1,
                Event::WaveCleared { .. } => self.waves_cleared += 1,
                _ => {}
            }
        }
    }

    fn expected_money(&self, starting_money: u32) -> u64 {
        u64::from(starting_money) + self.refunds + self.bounties - self.costs
    }
}

fn play_until_game_over(seed: u64) -> Ledger {
    let config = SessionConfig {
        seed,
        ..SessionConfig::default()
    };
    let starting_money = config.world.starting_money;
    let mut simulation = Simulation::new(config);
    let mut ledger = Ledger::default();

    for row in [4, 6] {
        simulation
            .place_tower(TowerKind::Frost, CellCoord::new(10, row))
            .expect("frost placement");
    }
    let _ = simulation
        .toggle_auto_upgrade(CellCoord::new(10, 4))
        .expect("auto-upgrade toggle");
    simulation.set_game_speed(GameSpeed::Quadruple);
    assert!(simulation.toggle_auto_wave());
    assert_eq!(simulation.start_next_wave(), Ok(1));

    let mut lives = simulation.status().lives;
    let mut rebuilt = false;

    for frame in 0..MAX_FRAMES {
        let dt = Duration::from_millis(FRAME_PATTERN_MS[frame % FRAME_PATTERN_MS.len()]);
        simulation.advance(dt);
        ledger.record(&simulation.drain_events());

        let status = simulation.status();
        assert_eq!(
            u64::from(status.money),
            ledger.expected_money(starting_money),
            "seed {seed}: money drifted on frame {frame}"
        );
        assert!(
            status.lives <= lives,
            "seed {seed}: lives rose from {lives} to {} on frame {frame}",
            status.lives
        );
        assert_eq!(
            status.lives == 0,
            status.phase == GamePhase::GameOver,
            "seed {seed}: lives {} in phase {:?}",
            status.lives,
            status.phase
        );
        lives = status.lives;

        if status.is_game_over() {
            break;
        }

        if ledger.waves_cleared > 0 && !rebuilt {
            rebuilt = true;
            let refund = simulation
                .sell_tower(CellCoord::new(10, 6))
                .expect("frost sale");
            assert_eq!(refund, TowerKind::Frost.refund());
            if status.money + refund >= TowerKind::Cannon.cost() {
                simulation
                    .place_tower(TowerKind::Cannon, CellCoord::new(12, 5))
                    .expect("cannon placement");
            }
        }
    }

    ledger
}

#[test]
fn money_and_lives_hold_across_whole_sessions() {
    for seed in [0, 1, 7, 42, 1_234, 0xdead_beef] {
        let ledger = play_until_game_over(seed);
        assert!(ledger.waves_started >= 2, "seed {seed}: auto-wave never chained");
        assert!(!ledger.killed.is_empty(), "seed {seed}: no enemy was killed");
    }
}
