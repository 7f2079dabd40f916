//! Session state and lifecycle
//!
//! Everything the per-frame tick mutates lives here. State is deterministic
//! for a given seed and input sequence; nothing is persisted across sessions.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::board::PATTERNS;
use super::ship::Ship;
use super::track::{CellRef, Track};
use crate::consts::{BOARD_COUNT, BOARD_SPACING, RUN_SPEED, START_OFFSET};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Pre-start: zero boards, waiting for the start press
    Idle,
    /// Active flight
    Playing,
    /// Collision happened; the world drifts to a stop
    GameOver,
}

/// Events raised during a tick, drained by the driver for logging and the
/// leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    SessionStarted,
    Collided { cell: CellRef },
    RunEnded { score: u64 },
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded RNG; the only randomness source in the sim
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Forward scroll speed; decays to zero after a collision
    pub speed: f32,
    /// Distance survived this run, in world units
    pub distance: f32,
    /// Best score seen this process
    pub high_score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub ship: Ship,
    pub track: Track,
    /// Raised this tick, drained by the driver
    pub events: Vec<GameEvent>,
    /// Guards the one-shot RunEnded event
    pub(crate) run_committed: bool,
}

impl GameState {
    /// Create the idle pre-start state: no boards, nothing moving.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            speed: 0.0,
            distance: 0.0,
            high_score: 0,
            time_ticks: 0,
            ship: Ship::default(),
            track: Track::new(PATTERNS),
            events: Vec::new(),
            run_committed: false,
        }
    }

    /// Begin a fresh session, discarding any in-flight board and ship
    /// state. This is the only cancellation point.
    pub fn start_run(&mut self) {
        self.ship = Ship::default();
        self.speed = RUN_SPEED;
        self.distance = 0.0;
        self.run_committed = false;
        self.track.start(
            BOARD_COUNT,
            BOARD_SPACING,
            START_OFFSET,
            &mut self.rng,
        );
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::SessionStarted);
        log::info!("session started (seed {})", self.seed);
    }

    /// Distance survived, as displayed
    pub fn score(&self) -> u64 {
        self.distance as u64
    }

    /// Read-only flag for the UI layer
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle_with_zero_boards() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.track.is_empty());
        assert_eq!(state.score(), 0);
        assert!(!state.is_playing());
    }

    #[test]
    fn start_run_builds_the_track() {
        let mut state = GameState::new(7);
        state.start_run();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.track.boards().len(), crate::consts::BOARD_COUNT);
        assert_eq!(state.speed, crate::consts::RUN_SPEED);
        assert_eq!(state.events, vec![GameEvent::SessionStarted]);
    }

    #[test]
    fn same_seed_draws_same_patterns() {
        let mut a = GameState::new(42);
        let mut b = GameState::new(42);
        a.start_run();
        b.start_run();
        for (left, right) in a.track.boards().iter().zip(b.track.boards()) {
            assert_eq!(left.pattern_index(), right.pattern_index());
        }
    }
}
