use bulwark_core::EnemyKind;
use bulwark_system_wave_generation::{eligible_kinds, enemy_count, WaveGeneration};

#[test]
fn rosters_replay_for_the_same_seed() {
    let first = WaveGeneration::new(0x5eed);
    let second = WaveGeneration::new(0x5eed);
    for wave in 1..=20 {
        assert_eq!(first.generate(wave), second.generate(wave), "wave {wave}");
    }
}

#[test]
fn generation_order_does_not_matter() {
    let generator = WaveGeneration::new(99);
    let forward: Vec<_> = (1..=8).map(|wave| generator.generate(wave)).collect();
    let mut backward: Vec<_> = (1..=8).rev().map(|wave| generator.generate(wave)).collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn rosters_only_use_eligible_kinds() {
    let generator = WaveGeneration::new(3);
    for wave in 1..=30 {
        let config = generator.generate(wave);
        assert_eq!(config.count(), enemy_count(wave));
        assert_eq!(config.eligible, eligible_kinds(wave));
        assert!(config
            .roster
            .iter()
            .all(|kind| config.eligible.contains(kind)));
    }
}

#[test]
fn first_wave_is_all_squares() {
    let config = WaveGeneration::new(1).generate(1);
    assert_eq!(config.roster, vec![EnemyKind::Square; 6]);
}
