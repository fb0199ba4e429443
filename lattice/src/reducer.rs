//! The neighborhood reducer (spec §4.4). The distilled spec's GPU dispatch
//! tiles the grid into T×T thread groups that cooperatively load a halo into
//! shared memory; this crate's CPU realization partitions the grid into
//! row-bands of `TILE` rows, and each band's worker materializes its own
//! [`BandHalo`] — a `(band_rows + 2·HALO) × (cols + 2·HALO)` scratch buffer —
//! before evaluating any cell in that band. One band is one unit of
//! `rayon` parallelism; building the halo before reading it is the CPU
//! analogue of the "barrier after cooperative load".

use kuramoto_maybe_rayon::MaybeIntoParIter;
use kuramoto_util::ceil_div_usize;

/// Output tile edge length, mirrored from the GPU dispatch's T×T workgroup.
pub const TILE: usize = 16;
/// Halo radius: rules may read up to this many cells away via the cheap
/// scratch-buffer path; beyond that they fall back to a direct wrapped read.
pub const HALO: usize = 8;

/// A materialized halo for one row-band of one layer.
pub struct BandHalo {
    band_start: usize,
    band_rows: usize,
    cols: usize,
    width: usize,
    data: Vec<f32>,
}

impl BandHalo {
    fn build(layer: &[f32], rows: usize, cols: usize, band_start: usize, band_rows: usize) -> Self {
        let width = cols + 2 * HALO;
        let height = band_rows + 2 * HALO;
        let mut data = vec![0.0f32; height * width];
        for local_r in 0..height {
            let src_row = (band_start as i64 + local_r as i64 - HALO as i64).rem_euclid(rows as i64) as usize;
            let row_base = src_row * cols;
            let dst_base = local_r * width;
            for local_c in 0..width {
                let src_col = (local_c as i64 - HALO as i64).rem_euclid(cols as i64) as usize;
                data[dst_base + local_c] = layer[row_base + src_col];
            }
        }
        Self {
            band_start,
            band_rows,
            cols,
            width,
            data,
        }
    }

    #[inline]
    fn get(&self, row: usize, col: usize, dc: i64, dr: i64) -> f32 {
        let local_r = (row - self.band_start) as i64 + HALO as i64 + dr;
        let local_c = col as i64 + HALO as i64 + dc;
        debug_assert!(local_r >= 0 && (local_r as usize) < self.band_rows + 2 * HALO);
        debug_assert!(local_c >= 0 && (local_c as usize) < self.width);
        self.data[local_r as usize * self.width + local_c as usize]
    }
}

/// Wrapped, direct read from a flat layer buffer. Used for offsets beyond
/// the halo radius and for the delay ring's snapshots, which carry no
/// scratch buffer of their own (spec §4.4 `neighbor_global`).
#[inline]
pub fn sample_wrapped(layer: &[f32], rows: usize, cols: usize, row: usize, col: usize, dc: i64, dr: i64) -> f32 {
    let r = (row as i64 + dr).rem_euclid(rows as i64) as usize;
    let c = (col as i64 + dc).rem_euclid(cols as i64) as usize;
    layer[r * cols + c]
}

/// What a rule body sees for one cell: a scratch-buffer read for small
/// offsets, falling back to a direct wrapped read for anything larger
/// (spec §4.4 "the rule falls back to direct wrapped reads from θ_front").
pub struct NeighborhoodView<'a> {
    halo: &'a BandHalo,
    front_layer: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> NeighborhoodView<'a> {
    #[inline]
    pub fn sample(&self, row: usize, col: usize, dc: i64, dr: i64) -> f32 {
        if dc.unsigned_abs() as usize <= HALO && dr.unsigned_abs() as usize <= HALO {
            self.halo.get(row, col, dc, dr)
        } else {
            sample_wrapped(self.front_layer, self.rows, self.cols, row, col, dc, dr)
        }
    }
}

/// Evaluate `cell_fn` for every cell of one layer, in row-bands of `TILE`
/// rows processed independently (and, with the `parallel` feature, in
/// parallel via `rayon`). Returns one `T` per cell in row-major order.
pub fn parallel_for_each_cell<T, F>(front_layer: &[f32], rows: usize, cols: usize, cell_fn: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, usize, &NeighborhoodView) -> T + Sync,
{
    let num_bands = ceil_div_usize(rows, TILE);
    let bands: Vec<Vec<T>> = (0..num_bands)
        .into_par_iter()
        .map(|band_idx| {
            let band_start = band_idx * TILE;
            let band_rows = TILE.min(rows - band_start);
            let halo = BandHalo::build(front_layer, rows, cols, band_start, band_rows);
            let view = NeighborhoodView {
                halo: &halo,
                front_layer,
                rows,
                cols,
            };
            let mut out = Vec::with_capacity(band_rows * cols);
            for local_row in 0..band_rows {
                let row = band_start + local_row;
                for col in 0..cols {
                    out.push(cell_fn(row, col, &view));
                }
            }
            out
        })
        .collect();
    bands.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halo_wraps_toroidally_at_grid_edges() {
        let rows = 4;
        let cols = 4;
        let layer: Vec<f32> = (0..rows * cols).map(|i| i as f32).collect();
        let halo = BandHalo::build(&layer, rows, cols, 0, rows);
        // Cell (0,0)'s neighbor at (dc=-1, dr=-1) should be the wrapped corner (3,3).
        assert_eq!(halo.get(0, 0, -1, -1), layer[3 * cols + 3]);
    }

    #[test]
    fn view_matches_direct_sample_within_and_beyond_halo() {
        let rows = 20;
        let cols = 20;
        let layer: Vec<f32> = (0..rows * cols).map(|i| (i % 7) as f32).collect();
        let results = parallel_for_each_cell(&layer, rows, cols, |row, col, view| {
            let near = view.sample(row, col, 2, -3);
            let far = view.sample(row, col, 12, 0);
            let near_direct = sample_wrapped(&layer, rows, cols, row, col, 2, -3);
            let far_direct = sample_wrapped(&layer, rows, cols, row, col, 12, 0);
            ((near - near_direct).abs() < 1e-6, (far - far_direct).abs() < 1e-6)
        });
        assert!(results.iter().all(|&(a, b)| a && b));
        assert_eq!(results.len(), rows * cols);
    }

    #[test]
    fn cell_order_is_row_major() {
        let rows = 5;
        let cols = 3;
        let layer = vec![0.0f32; rows * cols];
        let results = parallel_for_each_cell(&layer, rows, cols, |row, col, _| row * cols + col);
        let expected: Vec<usize> = (0..rows * cols).collect();
        assert_eq!(results, expected);
    }
}
