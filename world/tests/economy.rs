use bulwark_core::{CellCoord, Command, Event, TowerKind};
use bulwark_world::{apply, query, World};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Action {
    Place(TowerKind, CellCoord),
    Sell(CellCoord),
    Upgrade(CellCoord),
}

fn tower_kind() -> impl Strategy<Value = TowerKind> {
    prop::sample::select(TowerKind::ALL.to_vec())
}

fn cell() -> impl Strategy<Value = CellCoord> {
    (0_u32..23, 0_u32..12).prop_map(|(column, row)| CellCoord::new(column, row))
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => (tower_kind(), cell()).prop_map(|(kind, cell)| Action::Place(kind, cell)),
        1 => cell().prop_map(Action::Sell),
        1 => cell().prop_map(Action::Upgrade),
    ]
}

fn command(action: &Action) -> Command {
    match *action {
        Action::Place(kind, cell) => Command::PlaceTower { kind, cell },
        Action::Sell(cell) => Command::SellTower { cell },
        Action::Upgrade(cell) => Command::UpgradeTower { cell },
    }
}

fn spawn_rows_connected(world: &World) -> bool {
    query::spawn_band(world)
        .rows()
        .all(|row| query::next_hop(world, CellCoord::new(0, row)).is_some())
}

proptest! {
    #[test]
    fn accepted_placements_keep_every_spawn_row_connected(
        actions in prop::collection::vec(action(), 1..120)
    ) {
        let mut world = World::new();
        for action in &actions {
            let mut events = Vec::new();
            apply(&mut world, command(action), &mut events);
            prop_assert!(spawn_rows_connected(&world));
        }
    }

    #[test]
    fn money_is_conserved_across_economy_actions(
        actions in prop::collection::vec(action(), 1..120)
    ) {
        let mut world = World::new();
        let mut expected = i64::from(query::status(&world).money);
        for action in &actions {
            let mut events = Vec::new();
            apply(&mut world, command(action), &mut events);
            for event in &events {
                match event {
                    Event::TowerPlaced { cost, .. } | Event::TowerUpgraded { cost, .. } => {
                        expected -= i64::from(*cost);
                    }
                    Event::TowerSold { refund, .. } => expected += i64::from(*refund),
                    _ => {}
                }
            }
            prop_assert_eq!(i64::from(query::status(&world).money), expected);
        }
    }

    #[test]
    fn rejected_actions_leave_the_world_unchanged(
        actions in prop::collection::vec(action(), 1..80)
    ) {
        let mut world = World::new();
        for action in &actions {
            let towers = query::tower_view(&world);
            let status = query::status(&world);
            let mut events = Vec::new();
            apply(&mut world, command(action), &mut events);
            let rejected = events.iter().all(|event| matches!(
                event,
                Event::TowerPlacementRejected { .. } | Event::TowerActionRejected { .. }
            ));
            if rejected {
                prop_assert_eq!(query::tower_view(&world), towers);
                prop_assert_eq!(query::status(&world), status);
            }
        }
    }
}
