//! Track manager: the fixed set of boards spaced along the forward axis

use glam::Vec3;

use super::board::{Board, Pattern, PatternSource};
use super::obstacle::Obstacle;

/// Stable handle to one obstacle cell, valid for the lifetime of a session.
/// Boards and cells are pooled, so the indices never dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub board: usize,
    pub cell: usize,
}

/// Owns the boards of a session and aggregates their collision results.
///
/// Constructed empty: the pre-start idle state simply has zero boards, so
/// `tick` and `encode` are no-ops without special cases downstream.
#[derive(Debug, Clone)]
pub struct Track {
    catalog: &'static [Pattern],
    boards: Vec<Board>,
}

impl Track {
    pub fn new(catalog: &'static [Pattern]) -> Self {
        Self {
            catalog,
            boards: Vec::new(),
        }
    }

    /// Build `board_count` boards staggered down the track, called once per
    /// new game session. Board i spawns at `-start_offset - spacing * i`.
    pub fn start(
        &mut self,
        board_count: usize,
        spacing: f32,
        start_offset: f32,
        source: &mut dyn PatternSource,
    ) {
        self.boards.clear();
        for i in 0..board_count {
            let z = -start_offset - spacing * i as f32;
            self.boards.push(Board::new(z, self.catalog, source));
        }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn obstacle(&self, cell_ref: CellRef) -> &Obstacle {
        self.boards[cell_ref.board].obstacle(cell_ref.cell)
    }

    pub fn obstacle_mut(&mut self, cell_ref: CellRef) -> &mut Obstacle {
        self.boards[cell_ref.board].obstacle_mut(cell_ref.cell)
    }

    /// Advance every board without querying collisions (post-collision
    /// drift, where gameplay has already halted).
    pub fn advance(&mut self, speed: f32, dt: f32, source: &mut dyn PatternSource) {
        for board in &mut self.boards {
            board.advance(speed, dt, source);
        }
    }

    /// Advance every board, then report the first collision across boards:
    /// board array order first, row-major cell order within a board. A
    /// logical OR over the per-board queries. Zero boards: no-op, `None`.
    pub fn tick(
        &mut self,
        speed: f32,
        dt: f32,
        ship_position: Vec3,
        source: &mut dyn PatternSource,
    ) -> Option<CellRef> {
        for board in &mut self.boards {
            board.advance(speed, dt, source);
        }
        self.query_collision(ship_position)
    }

    /// Collision query without advancing, post-advance pre-render state.
    pub fn query_collision(&self, ship_position: Vec3) -> Option<CellRef> {
        self.boards.iter().enumerate().find_map(|(board, b)| {
            b.query_collision(ship_position)
                .map(|cell| CellRef { board, cell })
        })
    }
}
