// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Message capacity of a cover grid.
//!
//! One character occupies one cluster cell of the placement lattice
//! (3 columns × 2 rows, anchors at `x ≡ 0 mod 3`, `y ≡ 1 mod 2`), whatever its
//! UTF-8 length. Two cells go to the header.

use crate::raster::PixelGrid;
use crate::stego::cluster::{CLUSTER_COLS, CLUSTER_ROWS};
use crate::stego::frame::HEADER_CLUSTERS;
use crate::stego::walk::{self, X_STEP, Y_STEP};
use crate::stego::START_ANCHOR;

/// Lattice cells in a `width × height` grid.
pub fn lattice_anchors(width: usize, height: usize) -> usize {
    if width < CLUSTER_COLS || height < CLUSTER_ROWS {
        return 0;
    }
    let cols = (width - CLUSTER_COLS) / X_STEP + 1;
    let rows = (height - CLUSTER_ROWS) / Y_STEP + 1;
    cols * rows
}

/// Maximum number of characters (of any UTF-8 length) `grid` can carry.
pub fn char_capacity(grid: &PixelGrid) -> usize {
    walk::lattice_size(START_ANCHOR, grid).saturating_sub(HEADER_CLUSTERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_matches_walker_lattice() {
        for (w, h) in [(3, 2), (6, 4), (16, 16), (17, 9), (100, 75), (5, 3), (2, 10)] {
            let grid = PixelGrid::new(w, h);
            assert_eq!(
                lattice_anchors(w, h),
                walk::lattice_size(START_ANCHOR, &grid),
                "{w}x{h}"
            );
        }
    }

    #[test]
    fn header_is_subtracted() {
        assert_eq!(char_capacity(&PixelGrid::new(16, 16)), 5 * 8 - 2);
        assert_eq!(char_capacity(&PixelGrid::new(6, 2)), 0);
        assert_eq!(char_capacity(&PixelGrid::new(3, 2)), 0);
    }

    #[test]
    fn too_small_for_any_cluster() {
        assert_eq!(lattice_anchors(2, 100), 0);
        assert_eq!(lattice_anchors(100, 1), 0);
    }
}
