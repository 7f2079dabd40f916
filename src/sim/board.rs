//! One 5x5 grid of obstacles at a forward position
//!
//! A board owns a fixed pool of 25 obstacles, recycles itself once it has
//! scrolled past the camera, and answers per-board collision queries.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::obstacle::Obstacle;
use crate::cell_offset;
use crate::consts::{BOARD_CELLS, COLLISION_Z_BAND, RECYCLE_THRESHOLD_Z};

/// A 25-cell binary occupancy grid, row-major
pub type Pattern = [u8; BOARD_CELLS];

/// The fixed catalog of obstacle layouts
pub const PATTERNS: &[Pattern] = &[
    // Left wall with floor
    [
        1, 0, 0, 0, 0, //
        1, 0, 0, 0, 0, //
        1, 0, 0, 0, 0, //
        1, 0, 0, 0, 0, //
        1, 1, 1, 1, 1,
    ],
    // Ceiling with right wall
    [
        1, 1, 1, 1, 1, //
        0, 0, 0, 0, 1, //
        0, 0, 0, 0, 1, //
        0, 0, 0, 0, 1, //
        0, 0, 0, 0, 1,
    ],
    // Full ring
    [
        1, 1, 1, 1, 1, //
        1, 0, 0, 0, 1, //
        1, 0, 0, 0, 1, //
        1, 0, 0, 0, 1, //
        1, 1, 1, 1, 1,
    ],
    // Inner box
    [
        0, 0, 0, 0, 0, //
        0, 1, 1, 1, 0, //
        0, 1, 0, 1, 0, //
        0, 1, 1, 1, 0, //
        0, 0, 0, 0, 0,
    ],
    // Diagonal cross
    [
        1, 0, 0, 0, 1, //
        0, 1, 0, 1, 0, //
        0, 0, 1, 0, 0, //
        0, 1, 0, 1, 0, //
        1, 0, 0, 0, 1,
    ],
    // Left double wall
    [
        1, 1, 0, 0, 0, //
        1, 1, 0, 0, 0, //
        1, 1, 0, 0, 0, //
        1, 1, 0, 0, 0, //
        1, 1, 0, 0, 0,
    ],
    // Right double wall
    [
        0, 0, 0, 1, 1, //
        0, 0, 0, 1, 1, //
        0, 0, 0, 1, 1, //
        0, 0, 0, 1, 1, //
        0, 0, 0, 1, 1,
    ],
    // Upper half
    [
        1, 1, 1, 1, 1, //
        1, 1, 1, 1, 1, //
        0, 0, 0, 0, 0, //
        0, 0, 0, 0, 0, //
        0, 0, 0, 0, 0,
    ],
    // Lower half
    [
        0, 0, 0, 0, 0, //
        0, 0, 0, 0, 0, //
        0, 0, 0, 0, 0, //
        1, 1, 1, 1, 1, //
        1, 1, 1, 1, 1,
    ],
];

/// Source of pattern indices for board spawns and recycles.
///
/// Gameplay draws uniformly from the seeded run RNG; tests supply fixed
/// sequences to assert exact pattern choices.
pub trait PatternSource {
    /// Pick an index into a catalog of `catalog_len` patterns.
    /// Repeats are allowed.
    fn next_pattern(&mut self, catalog_len: usize) -> usize;
}

impl PatternSource for Pcg32 {
    fn next_pattern(&mut self, catalog_len: usize) -> usize {
        self.random_range(0..catalog_len)
    }
}

/// Fixed pattern sequence for deterministic tests (wraps around)
#[derive(Debug, Clone)]
pub struct SequenceSource {
    indices: Vec<usize>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, cursor: 0 }
    }
}

impl PatternSource for SequenceSource {
    fn next_pattern(&mut self, catalog_len: usize) -> usize {
        let index = self.indices[self.cursor % self.indices.len()] % catalog_len;
        self.cursor += 1;
        index
    }
}

/// A 5x5 grid instance of potential obstacles at a given forward position
#[derive(Debug, Clone)]
pub struct Board {
    catalog: &'static [Pattern],
    /// Index into the shared catalog
    pattern_index: usize,
    /// Forward position of the board's local origin
    z: f32,
    /// Fixed pool, index i maps to cell (row = i/5, col = i%5)
    obstacles: [Obstacle; BOARD_CELLS],
}

impl Board {
    /// Create a board at `start_z` with a pattern drawn from `source`.
    pub fn new(start_z: f32, catalog: &'static [Pattern], source: &mut dyn PatternSource) -> Self {
        let obstacles = std::array::from_fn(|i| {
            let (x, y) = cell_offset(i);
            Obstacle::new(Vec3::new(x, y, start_z))
        });
        Self {
            catalog,
            pattern_index: source.next_pattern(catalog.len()),
            z: start_z,
            obstacles,
        }
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    pub fn pattern(&self) -> &Pattern {
        &self.catalog[self.pattern_index]
    }

    pub fn obstacle(&self, cell: usize) -> &Obstacle {
        &self.obstacles[cell]
    }

    pub fn obstacle_mut(&mut self, cell: usize) -> &mut Obstacle {
        &mut self.obstacles[cell]
    }

    /// Cells with an occupancy bit set, row-major order. Zero cells are
    /// inert placeholders: never checked, never drawn.
    pub fn active_cells(&self) -> impl Iterator<Item = (usize, &Obstacle)> {
        let pattern = self.pattern();
        self.obstacles
            .iter()
            .enumerate()
            .filter(move |(i, _)| pattern[*i] == 1)
    }

    /// Advance every obstacle and the board origin by `speed * dt`,
    /// recycling once the board crosses the camera plane.
    pub fn advance(&mut self, speed: f32, dt: f32, source: &mut dyn PatternSource) {
        let delta_z = speed * dt;
        for obstacle in &mut self.obstacles {
            obstacle.advance(delta_z);
            obstacle.age_fracture(dt);
        }
        self.z += delta_z;
        if self.z >= RECYCLE_THRESHOLD_Z {
            self.recycle(source);
        }
    }

    /// In-place reset to the spawn end of the track: no allocation, the
    /// 25 obstacles keep their identity.
    fn recycle(&mut self, source: &mut dyn PatternSource) {
        self.z -= crate::consts::RECYCLE_DISTANCE;
        self.pattern_index = source.next_pattern(self.catalog.len());
        for obstacle in &mut self.obstacles {
            obstacle.recycle();
        }
    }

    /// First active, non-fractured obstacle overlapping the ship, scanning
    /// cells row-major. The row-major tie-break decides which obstacle
    /// fractures when the ship clips a corner shared by two cells.
    pub fn query_collision(&self, ship_position: Vec3) -> Option<usize> {
        // Boards outside the camera-plane band are not worth checking
        if self.z.abs() > COLLISION_Z_BAND {
            return None;
        }

        let pattern = self.pattern();
        self.obstacles.iter().enumerate().position(|(i, obstacle)| {
            pattern[i] == 1 && !obstacle.is_fractured && obstacle.overlaps(ship_position)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{RECYCLE_DISTANCE, RECYCLE_THRESHOLD_Z};
    use proptest::prelude::*;

    const EMPTY: &[Pattern] = &[[0; BOARD_CELLS]];
    const FULL: &[Pattern] = &[[1; BOARD_CELLS]];

    const CELL_0_ONLY: &[Pattern] = &[{
        let mut p = [0; BOARD_CELLS];
        p[0] = 1;
        p
    }];

    const CELLS_3_AND_7: &[Pattern] = &[{
        let mut p = [0; BOARD_CELLS];
        p[3] = 1;
        p[7] = 1;
        p
    }];

    fn seq(indices: &[usize]) -> SequenceSource {
        SequenceSource::new(indices.to_vec())
    }

    #[test]
    fn catalog_patterns_are_5x5() {
        for pattern in PATTERNS {
            assert_eq!(pattern.len(), BOARD_CELLS);
            assert!(pattern.iter().all(|&bit| bit <= 1));
        }
    }

    #[test]
    fn obstacles_spawn_on_the_grid() {
        let board = Board::new(-100.0, FULL, &mut seq(&[0]));
        assert_eq!(board.obstacle(0).position, Vec3::new(-8.0, 11.0, -100.0));
        assert_eq!(board.obstacle(24).position, Vec3::new(8.0, -5.0, -100.0));
    }

    #[test]
    fn all_zero_pattern_never_collides() {
        let mut board = Board::new(0.0, EMPTY, &mut seq(&[0]));
        // Sweep ship positions across the whole grid
        for i in 0..BOARD_CELLS {
            let (x, y) = crate::cell_offset(i);
            assert_eq!(board.query_collision(Vec3::new(x, y, 0.0)), None);
        }
        // And it stays that way after advancing
        board.advance(80.0, 0.005, &mut seq(&[0]));
        assert_eq!(board.query_collision(Vec3::new(-8.0, 11.0, 0.0)), None);
    }

    #[test]
    fn all_zero_pattern_draws_nothing() {
        let board = Board::new(0.0, EMPTY, &mut seq(&[0]));
        assert_eq!(board.active_cells().count(), 0);
    }

    #[test]
    fn query_rejects_boards_outside_the_z_band() {
        let board = Board::new(-1.5, FULL, &mut seq(&[0]));
        // Ship sits dead center on cell 12 in x/y, but the board is still
        // outside the camera-plane band
        let (x, y) = crate::cell_offset(12);
        assert_eq!(board.query_collision(Vec3::new(x, y, 0.0)), None);
    }

    #[test]
    fn collision_tie_break_is_row_major() {
        let board = Board::new(0.0, CELLS_3_AND_7, &mut seq(&[0]));
        // Cell 3 sits at (4, 11), cell 7 at (0, 7); the midpoint corner
        // (2, 9) overlaps both. Row-major order must pick cell 3.
        assert_eq!(board.query_collision(Vec3::new(2.0, 9.0, 0.0)), Some(3));
    }

    #[test]
    fn fractured_obstacles_are_inert() {
        let mut board = Board::new(0.0, CELL_0_ONLY, &mut seq(&[0]));
        let ship = Vec3::new(-8.0, 11.0, 0.0);
        assert_eq!(board.query_collision(ship), Some(0));

        board.obstacle_mut(0).fracture_at(ship);
        assert_eq!(board.query_collision(ship), None);
    }

    #[test]
    fn single_cell_scenario() {
        let board = Board::new(0.0, CELL_0_ONLY, &mut seq(&[0]));
        // Ship at the origin: obstacle 0 is far away in x/y
        assert_eq!(board.query_collision(Vec3::ZERO), None);
        // Ship moved onto cell 0: hit
        assert_eq!(board.query_collision(Vec3::new(-8.0, 11.0, 0.0)), Some(0));
    }

    #[test]
    fn recycle_jumps_back_and_redraws_pattern() {
        let mut source = seq(&[2, 5]);
        let mut board = Board::new(RECYCLE_THRESHOLD_Z - 0.1, PATTERNS, &mut source);
        assert_eq!(board.pattern_index(), 2);

        board.advance(80.0, 0.005, &mut source); // crosses the threshold
        assert_eq!(board.pattern_index(), 5);
        assert!(board.z() < 0.0);
        assert!((board.z() - (RECYCLE_THRESHOLD_Z + 0.3 - RECYCLE_DISTANCE)).abs() < 1e-3);
        // Obstacles follow the board origin
        assert!((board.obstacle(0).position.z - board.z()).abs() < 1e-3);
    }

    proptest! {
        /// Recycle invariant: no obstacle ever drifts unboundedly forward,
        /// and the pool stays glued to the board origin.
        #[test]
        fn obstacle_z_stays_bounded(
            start_z in -400.0f32..0.0,
            speed in 1.0f32..200.0,
            steps in 1usize..2000,
        ) {
            let mut source = seq(&[0, 3, 7, 1]);
            let mut board = Board::new(start_z, PATTERNS, &mut source);
            let dt = 1.0 / 120.0;
            let max_step = speed * dt;

            for _ in 0..steps {
                board.advance(speed, dt, &mut source);
                prop_assert!(board.z() < RECYCLE_THRESHOLD_Z + max_step);
                prop_assert!(board.z() >= start_z - RECYCLE_DISTANCE);
                for cell in 0..BOARD_CELLS {
                    let dz = board.obstacle(cell).position.z - board.z();
                    prop_assert!(dz.abs() < 1e-2);
                }
            }
        }
    }
}
