//! Flow field builder and placement validation.

use std::collections::VecDeque;

use bulwark_core::{Band, CellCoord, GridGeometry};

/// Dense next-hop grid seeded from the exit cells.
///
/// The field stores, for every cell that can reach an exit, the neighbouring
/// cell an enemy standing there should walk to next. Cells without an entry
/// are either blocked or cut off from every exit. Exit cells themselves carry
/// no entry because enemies leave the field when they arrive there.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowField {
    geometry: Option<GridGeometry>,
    next_hops: Vec<Option<CellCoord>>,
    visited: Vec<bool>,
}

impl FlowField {
    /// Rebuilds the next hops using a multi-source reverse breadth-first search.
    ///
    /// Neighbours are explored in the fixed order east, south, north, west and
    /// the first frontier cell to discover a neighbour becomes its next hop.
    pub fn rebuild_with<F>(
        &mut self,
        geometry: GridGeometry,
        exits: &[CellCoord],
        mut is_blocked: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let cell_count = geometry.cell_count();
        self.geometry = Some(geometry);
        self.next_hops.clear();
        self.next_hops.resize(cell_count, None);
        self.visited.clear();
        self.visited.resize(cell_count, false);

        if cell_count == 0 {
            return;
        }

        let mut queue = VecDeque::new();

        for &exit in exits {
            let Some(index) = geometry.index(exit) else {
                continue;
            };

            if self.visited[index] || is_blocked(exit) {
                continue;
            }

            self.visited[index] = true;
            queue.push_back(exit);
        }

        while let Some(cell) = queue.pop_front() {
            for neighbor in neighbors(cell, geometry) {
                let Some(index) = geometry.index(neighbor) else {
                    continue;
                };

                if self.visited[index] || is_blocked(neighbor) {
                    continue;
                }

                self.visited[index] = true;
                self.next_hops[index] = Some(cell);
                queue.push_back(neighbor);
            }
        }
    }

    /// Next cell an enemy standing on `cell` should move to, if any.
    #[must_use]
    pub fn next_hop(&self, cell: CellCoord) -> Option<CellCoord> {
        let index = self.geometry?.index(cell)?;
        self.next_hops.get(index).copied().flatten()
    }

    /// Reports whether the cell has a defined next hop.
    #[must_use]
    pub fn has_route(&self, cell: CellCoord) -> bool {
        self.next_hop(cell).is_some()
    }

    /// Follows next hops from `start` until a cell without an entry is reached.
    ///
    /// The returned path excludes `start` and ends on an exit cell when the
    /// start is connected. Iteration is bounded by the number of cells.
    #[must_use]
    pub fn trace(&self, start: CellCoord) -> Vec<CellCoord> {
        let limit = self.next_hops.len();
        let mut path = Vec::new();
        let mut cursor = start;
        while let Some(next) = self.next_hop(cursor) {
            path.push(next);
            if path.len() > limit {
                break;
            }
            cursor = next;
        }
        path
    }
}

/// Builds a flow field toward the exit column cells of `exit_band`.
#[must_use]
pub fn build_flow_field<F>(geometry: GridGeometry, exit_band: Band, is_occupied: F) -> FlowField
where
    F: FnMut(CellCoord) -> bool,
{
    let exits = geometry.exit_cells(exit_band);
    let mut field = FlowField::default();
    field.rebuild_with(geometry, &exits, is_occupied);
    field
}

/// Reports whether a tower on `candidate` keeps every spawn row connected.
///
/// A hypothetical field is built with the candidate treated as occupied, and
/// every row of `spawn_band` must still have an entry in column zero.
#[must_use]
pub fn is_placement_valid<F>(
    geometry: GridGeometry,
    candidate: CellCoord,
    spawn_band: Band,
    exit_band: Band,
    mut is_occupied: F,
) -> bool
where
    F: FnMut(CellCoord) -> bool,
{
    let field = build_flow_field(geometry, exit_band, |cell| {
        cell == candidate || is_occupied(cell)
    });

    spawn_band
        .rows()
        .all(|row| field.has_route(CellCoord::new(0, row)))
}

fn neighbors(cell: CellCoord, geometry: GridGeometry) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if cell.column() + 1 < geometry.columns() {
        candidates[count] = Some(CellCoord::new(cell.column() + 1, cell.row()));
        count += 1;
    }

    if cell.row() + 1 < geometry.rows() {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() + 1));
        count += 1;
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
