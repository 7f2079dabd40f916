//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, behind the injectable `PatternSource`
//! - Stable iteration order (board order, then row-major cells)
//! - No rendering or platform dependencies

pub mod board;
pub mod obstacle;
pub mod ship;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod track;

pub use board::{Board, PATTERNS, Pattern, PatternSource, SequenceSource};
pub use obstacle::Obstacle;
pub use ship::{CollisionResponse, Rotation, Ship, ShipPhase};
pub use snapshot::{DrawItem, DrawMode, DrawSink, Fracture, MeshId, PassKind, SceneSnapshot};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use track::{CellRef, Track};
