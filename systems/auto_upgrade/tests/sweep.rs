use std::time::Duration;

use bulwark_core::{CellCoord, Command, Event, GameSpeed, TowerKind};
use bulwark_system_auto_upgrade::AutoUpgrade;
use bulwark_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(50);

fn run_frames(world: &mut World, system: &mut AutoUpgrade, frames: usize) -> Vec<Event> {
    let mut log = Vec::new();
    for _ in 0..frames {
        let mut events = Vec::new();
        world::apply(world, Command::Tick { dt: FRAME }, &mut events);
        let mut commands = Vec::new();
        system.handle(
            &events,
            query::status(world),
            &query::tower_view(world),
            &mut commands,
        );
        for command in commands {
            world::apply(world, command, &mut events);
        }
        log.extend(events);
    }
    log
}

#[test]
fn flagged_towers_level_up_once_per_second() {
    let mut world = World::new();
    let cell = CellCoord::new(4, 2);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Cannon,
            cell,
        },
        &mut events,
    );
    world::apply(&mut world, Command::ToggleAutoUpgrade { cell }, &mut events);

    let mut system = AutoUpgrade::default();
    let log = run_frames(&mut world, &mut system, 60);

    let upgrades: Vec<_> = log
        .iter()
        .filter_map(|event| match event {
            Event::TowerUpgraded { level, cost, .. } => Some((*level, *cost)),
            _ => None,
        })
        .collect();
    assert_eq!(upgrades, vec![(2, 25), (3, 50), (4, 75)]);
    assert_eq!(query::status(&world).money, 500 - 50 - 25 - 50 - 75);
}

#[test]
fn cadence_ignores_game_speed() {
    let mut world = World::new();
    let cell = CellCoord::new(4, 2);
    let mut events = Vec::new();
    for command in [
        Command::PlaceTower {
            kind: TowerKind::Cannon,
            cell,
        },
        Command::ToggleAutoUpgrade { cell },
        Command::SetGameSpeed {
            speed: GameSpeed::Quadruple,
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }

    let mut system = AutoUpgrade::default();
    let _ = run_frames(&mut world, &mut system, 19);
    assert_eq!(query::tower_at(&world, cell).map(|tower| tower.level), Some(1));
    let _ = run_frames(&mut world, &mut system, 1);
    assert_eq!(query::tower_at(&world, cell).map(|tower| tower.level), Some(2));
}
