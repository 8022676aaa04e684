//! Uniform cell grid over the periodic box.
//!
//! The grid is rebuilt from scratch for every evaluated configuration and
//! discarded afterwards; it carries no state between evaluations. Tenancy is
//! stored as an arena of particle indices grouped by cell plus a per-cell
//! offset table, filled by a counting sort. This handles worst-case
//! clustering (all particles in one cell) without a per-cell capacity cap.

/// Cell id, row-major: `gx * cells_y + gy`.
pub type CellId = usize;

pub struct CellGrid {
    cells_x: usize,
    cells_y: usize,
    // starts[c]..starts[c + 1] indexes the tenants of cell c
    starts: Vec<usize>,
    tenants: Vec<u32>,
}

impl CellGrid {
    /// Buckets each particle index into its cell. Positions at or beyond the
    /// domain edge wrap via floor-division modulo the cell count.
    ///
    /// Callers guarantee `cells_x > 0 && cells_y > 0` (enforced at system
    /// construction, where a descriptive error is possible).
    pub fn build(
        xs: &[f64],
        ys: &[f64],
        grid_size: f64,
        cells_x: usize,
        cells_y: usize,
    ) -> Self {
        debug_assert!(cells_x > 0 && cells_y > 0);
        debug_assert_eq!(xs.len(), ys.len());
        let num_cells = cells_x * cells_y;

        let cell_ids: Vec<CellId> = xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| {
                let gx = wrap_axis((x / grid_size).floor() as i64, cells_x);
                let gy = wrap_axis((y / grid_size).floor() as i64, cells_y);
                gx * cells_y + gy
            })
            .collect();

        let mut starts = vec![0usize; num_cells + 1];
        for &c in &cell_ids {
            starts[c + 1] += 1;
        }
        for c in 0..num_cells {
            starts[c + 1] += starts[c];
        }

        let mut cursors = starts.clone();
        let mut tenants = vec![0u32; xs.len()];
        for (i, &c) in cell_ids.iter().enumerate() {
            tenants[cursors[c]] = i as u32;
            cursors[c] += 1;
        }

        Self {
            cells_x,
            cells_y,
            starts,
            tenants,
        }
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    pub fn num_cells(&self) -> usize {
        self.cells_x * self.cells_y
    }

    /// Total tenant count across all cells; equals the particle count.
    pub fn num_tenants(&self) -> usize {
        self.tenants.len()
    }

    /// Particle indices bucketed into `cell`.
    pub fn tenants_of(&self, cell: CellId) -> &[u32] {
        &self.tenants[self.starts[cell]..self.starts[cell + 1]]
    }

    pub fn cell_coords(&self, cell: CellId) -> (usize, usize) {
        (cell / self.cells_y, cell % self.cells_y)
    }

    /// Cell id for possibly out-of-range coordinates, wrapped periodically.
    pub fn wrapped_cell(&self, gx: i64, gy: i64) -> CellId {
        wrap_axis(gx, self.cells_x) * self.cells_y + wrap_axis(gy, self.cells_y)
    }
}

fn wrap_axis(idx: i64, count: usize) -> usize {
    idx.rem_euclid(count as i64) as usize
}
