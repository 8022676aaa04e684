//! Grid-accelerated overlap detection.
//!
//! Cells are checked independently and the per-cell verdicts combine with a
//! logical OR, so the result is deterministic regardless of evaluation
//! order. Rayon's short-circuiting `any` does the reduction across cells.
//!
//! Completeness relies on the cell edge being at least one disk diameter:
//! then any overlapping pair sits in the same cell or in adjacent cells, and
//! the 3x3 periodic neighborhood sweep sees it. `DiskMc::new` warns when the
//! geometry violates that bound.

use rayon::prelude::*;

use crate::geometry::disks_overlap;
use crate::grid::{CellGrid, CellId};

/// True iff any pair of disks overlaps under the periodic minimum image.
pub fn has_overlap(
    xs: &[f64],
    ys: &[f64],
    radii: &[f64],
    grid: &CellGrid,
    width: f64,
    height: f64,
) -> bool {
    (0..grid.num_cells())
        .into_par_iter()
        .any(|cell| cell_has_overlap(cell, xs, ys, radii, grid, width, height))
}

fn pair_overlaps(
    i: usize,
    j: usize,
    xs: &[f64],
    ys: &[f64],
    radii: &[f64],
    width: f64,
    height: f64,
) -> bool {
    disks_overlap(
        xs[i], ys[i], radii[i], xs[j], ys[j], radii[j], width, height,
    )
}

/// Checks one cell: all pairs within the cell, then every tenant against
/// every tenant of the 8 wrapped neighbor cells. A cross-cell pair is owned
/// by the cell holding its lower index (`j > i` filter), so each pair is
/// examined exactly once per sweep.
fn cell_has_overlap(
    cell: CellId,
    xs: &[f64],
    ys: &[f64],
    radii: &[f64],
    grid: &CellGrid,
    width: f64,
    height: f64,
) -> bool {
    let home = grid.tenants_of(cell);
    if home.is_empty() {
        return false;
    }

    for (k, &i) in home.iter().enumerate() {
        for &j in &home[k + 1..] {
            if pair_overlaps(i as usize, j as usize, xs, ys, radii, width, height) {
                return true;
            }
        }
    }

    let (gx, gy) = grid.cell_coords(cell);
    for dx in -1i64..=1 {
        for dy in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbor = grid.wrapped_cell(gx as i64 + dx, gy as i64 + dy);
            // small grids wrap a neighbor offset back onto the home cell;
            // those pairs were already covered above
            if neighbor == cell {
                continue;
            }
            for &i in home {
                for &j in grid.tenants_of(neighbor) {
                    if j <= i {
                        continue;
                    }
                    if pair_overlaps(i as usize, j as usize, xs, ys, radii, width, height) {
                        return true;
                    }
                }
            }
        }
    }

    false
}
