// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Keyed placement walk over the pixel grid.
//!
//! From the current anchor, two [`keyed_hash`] values (anchor pixel and its
//! right neighbour) give a raw jump `(dx, dy)`. The jump is folded so that
//! `dy` is even and `dx` a multiple of 3, which keeps every anchor of a walk on
//! one lattice of cluster-sized cells: distinct anchors never share a
//! footprint pixel. The jump is clamped to the extreme cells of that lattice,
//! then a bounded sweep looks for a cell not in the [`OccupiedSet`]:
//!
//! 1. rows of the candidate column in the vertical sign, bounce once, sweep
//!    the other way;
//! 2. if the column is full, the next column (±3) in the horizontal sign,
//!    bounce once at the edge, sweep the other way.
//!
//! Every cell of the lattice is visited at most once per call, so the search
//! always terminates and fails with [`StegoError::Exhausted`] only when the
//! lattice is full.
//!
//! The sweep is never stepped cell by cell. [`OccupiedSet`] keeps maximal runs
//! of occupied rows per column, so the first free row in either direction is
//! one ordered-map lookup. A set built with [`OccupiedSet::for_grid`] also
//! keeps runs of full columns, which makes the whole search `O(log n)`.
//! Without that geometry, full columns are skipped one at a time.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::iter::successors;

use tracing::debug;

use crate::raster::{Coord, PixelGrid};
use crate::stego::cluster::{CLUSTER_COLS, CLUSTER_ROWS};
use crate::stego::error::StegoError;
use crate::stego::hash::keyed_hash;

/// Horizontal lattice pitch: one cluster width.
pub const X_STEP: usize = CLUSTER_COLS;
/// Vertical lattice pitch: one cluster height.
pub const Y_STEP: usize = CLUSTER_ROWS;

/// Maximal runs of occupied positions on one axis, `start -> end` inclusive,
/// neighbours `step` apart. All positions of one `Runs` share a residue class.
#[derive(Debug, Clone)]
struct Runs {
    step: i64,
    spans: BTreeMap<i64, i64>,
}

impl Runs {
    fn new(step: usize) -> Self {
        Self { step: step as i64, spans: BTreeMap::new() }
    }

    fn containing(&self, v: i64) -> Option<(i64, i64)> {
        self.spans
            .range(..=v)
            .next_back()
            .filter(|&(_, &end)| end >= v)
            .map(|(&start, &end)| (start, end))
    }

    fn insert(&mut self, v: i64) {
        if self.containing(v).is_some() {
            return;
        }
        let mut start = v;
        let mut end = v;
        if let Some((s, _)) = self.containing(v - self.step) {
            self.spans.remove(&s);
            start = s;
        }
        if let Some(e) = self.spans.remove(&(v + self.step)) {
            end = e;
        }
        self.spans.insert(start, end);
    }

    /// First position from `v` (inclusive) in direction `sign` that is not
    /// in a run.
    fn skip(&self, v: i64, sign: i64) -> i64 {
        match self.containing(v) {
            Some((_, end)) if sign > 0 => end + self.step,
            Some((start, _)) => start - self.step,
            None => v,
        }
    }
}

/// Runs of full columns for one grid size, per lattice class.
#[derive(Debug, Clone)]
struct FullColumns {
    width: usize,
    height: usize,
    by_class: HashMap<(usize, usize), Runs>,
}

/// Anchors already holding a cluster in the current session.
#[derive(Debug, Clone, Default)]
pub struct OccupiedSet {
    anchors: HashSet<Coord>,
    /// `(x, y % Y_STEP)` → occupied rows of that column.
    rows: HashMap<(usize, usize), Runs>,
    full_columns: Option<FullColumns>,
}

impl OccupiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set that also indexes full columns of `grid`'s lattices.
    /// Walks with this set must use a grid of the same size.
    pub fn for_grid(grid: &PixelGrid) -> Self {
        Self {
            full_columns: Some(FullColumns {
                width: grid.width(),
                height: grid.height(),
                by_class: HashMap::new(),
            }),
            ..Self::default()
        }
    }

    /// Record `anchor`. Returns `false` if it was already present.
    pub fn insert(&mut self, anchor: Coord) -> bool {
        if !self.anchors.insert(anchor) {
            return false;
        }
        let y_class = anchor.y % Y_STEP;
        let rows = self
            .rows
            .entry((anchor.x, y_class))
            .or_insert_with(|| Runs::new(Y_STEP));
        rows.insert(anchor.y as i64);

        if let Some(full) = self.full_columns.as_mut() {
            let column_full = row_axis(anchor.y, full.height)
                .is_some_and(|ys| rows.containing(ys.lo).is_some_and(|(_, end)| end >= ys.hi));
            if column_full {
                full.by_class
                    .entry((anchor.x % X_STEP, y_class))
                    .or_insert_with(|| Runs::new(X_STEP))
                    .insert(anchor.x as i64);
            }
        }
        true
    }

    pub fn contains(&self, anchor: Coord) -> bool {
        self.anchors.contains(&anchor)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coord> {
        self.anchors.iter()
    }

    fn rows(&self, x: usize, y_class: usize) -> Option<&Runs> {
        self.rows.get(&(x, y_class))
    }

    /// Full-column index for `grid`, if this set was built for its size.
    fn full_columns(&self, grid: &PixelGrid) -> Option<&HashMap<(usize, usize), Runs>> {
        self.full_columns
            .as_ref()
            .filter(|f| f.width == grid.width() && f.height == grid.height())
            .map(|f| &f.by_class)
    }
}

impl FromIterator<Coord> for OccupiedSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = Self::new();
        for anchor in iter {
            set.insert(anchor);
        }
        set
    }
}

/// Valid positions along one axis for a given residue class.
#[derive(Debug, Clone, Copy)]
struct Axis {
    lo: i64,
    hi: i64,
    step: i64,
}

impl Axis {
    /// Positions `v` in `[min, max]` with `v ≡ origin (mod step)`.
    fn for_class(origin: usize, min: usize, max: usize, step: usize) -> Option<Self> {
        let r = origin % step;
        let lo = min + (r + step - min % step) % step;
        if lo > max {
            return None;
        }
        let hi = max - (max % step + step - r) % step;
        Some(Self { lo: lo as i64, hi: hi as i64, step: step as i64 })
    }

    fn contains(self, v: i64) -> bool {
        (self.lo..=self.hi).contains(&v)
    }

    fn clamp(self, v: i64) -> i64 {
        v.clamp(self.lo, self.hi)
    }

    /// `start`, then onward in `sign` to the boundary, then from just behind
    /// `start` the other way to the opposite boundary.
    fn sweep(self, start: i64, sign: i64) -> impl Iterator<Item = i64> {
        let stride = sign * self.step;
        let ahead = successors(Some(start), move |v| Some(v + stride))
            .take_while(move |&v| self.contains(v));
        let behind = successors(Some(start - stride), move |v| Some(v - stride))
            .take_while(move |&v| self.contains(v));
        ahead.chain(behind)
    }

    /// First position of [`sweep`](Self::sweep) not covered by `taken`.
    fn first_open(self, start: i64, sign: i64, taken: Option<&Runs>) -> Option<i64> {
        let ahead = taken.map_or(start, |runs| runs.skip(start, sign));
        if self.contains(ahead) {
            return Some(ahead);
        }
        let behind = start - sign * self.step;
        let behind = taken.map_or(behind, |runs| runs.skip(behind, -sign));
        self.contains(behind).then_some(behind)
    }
}

fn column_axis(x: usize, width: usize) -> Option<Axis> {
    if width < CLUSTER_COLS {
        return None;
    }
    Axis::for_class(x, 0, width - CLUSTER_COLS, X_STEP)
}

fn row_axis(y: usize, height: usize) -> Option<Axis> {
    if height < CLUSTER_ROWS {
        return None;
    }
    Axis::for_class(y, CLUSTER_ROWS - 1, height - 1, Y_STEP)
}

/// Column and row axes of the lattice that `anchor` belongs to, or `None` if
/// the grid is too small to hold a single full cluster.
fn lattice_axes(anchor: Coord, grid: &PixelGrid) -> Option<(Axis, Axis)> {
    Some((column_axis(anchor.x, grid.width())?, row_axis(anchor.y, grid.height())?))
}

/// Keyed jump from `anchor`, folded onto the lattice: `(dx, dy, h_sign, v_sign)`.
fn keyed_offset(anchor: Coord, grid: &PixelGrid, key: u64) -> (i64, i64, i64, i64) {
    let right = Coord::new((anchor.x + 1).min(grid.width() - 1), anchor.y);
    let h1 = keyed_hash(grid.pixel(anchor), key);
    let h2 = keyed_hash(grid.pixel(right), key);

    let mut dy = i64::from(h1) % grid.height() as i64;
    let mut dx = i64::from(h2) % grid.width() as i64;

    let mut v_sign = 1;
    if dy % 2 == 1 {
        dy = -(dy + 1);
        v_sign = -1;
    }

    let mut h_sign = 1;
    match dx % 3 {
        2 => {
            dx = -(dx + 1);
            h_sign = -1;
        }
        1 => dx += 2,
        _ => {}
    }

    (dx, dy, h_sign, v_sign)
}

/// Next unoccupied anchor after `anchor`.
///
/// Deterministic in `(anchor, grid pixels, key, occupied)`. The result is on
/// the same lattice as `anchor`, never in `occupied`, and leaves room for a
/// full two-row cluster. `anchor` itself must lie inside the grid.
///
/// # Errors
/// [`StegoError::Exhausted`] when every lattice anchor is occupied (or the
/// grid cannot hold a cluster at all).
pub fn next_open(
    anchor: Coord,
    grid: &PixelGrid,
    key: u64,
    occupied: &OccupiedSet,
) -> Result<Coord, StegoError> {
    let (xs, ys) = lattice_axes(anchor, grid).ok_or(StegoError::Exhausted)?;
    let (dx, dy, h_sign, v_sign) = keyed_offset(anchor, grid, key);

    let start_x = xs.clamp(anchor.x as i64 + dx);
    let start_y = ys.clamp(anchor.y as i64 + dy);
    let y_class = anchor.y % Y_STEP;
    let open_row = |x: i64| {
        ys.first_open(start_y, v_sign, occupied.rows(x as usize, y_class))
            .map(|y| Coord::new(x as usize, y as usize))
    };

    let found = match occupied.full_columns(grid) {
        // a column that is not full always has an open row
        Some(full) => xs
            .first_open(start_x, h_sign, full.get(&(anchor.x % X_STEP, y_class)))
            .and_then(open_row),
        None => xs.sweep(start_x, h_sign).find_map(open_row),
    };

    found.ok_or_else(|| {
        debug!(x = anchor.x, y = anchor.y, occupied = occupied.len(), "placement walk exhausted");
        StegoError::Exhausted
    })
}

/// Number of lattice anchors reachable from `origin` in `grid`.
pub fn lattice_size(origin: Coord, grid: &PixelGrid) -> usize {
    lattice_axes(origin, grid).map_or(0, |(xs, ys)| {
        let cols = ((xs.hi - xs.lo) / xs.step + 1) as usize;
        let rows = ((ys.hi - ys.lo) / ys.step + 1) as usize;
        cols * rows
    })
}
