//! Voidlane - an endless corridor-dodging game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (boards, obstacles, ship, collisions)
//! - `renderer`: Two-pass shadow-mapped WebGPU rendering
//! - `settings`: Quality presets and on-disk preferences
//! - `highscores`: Session leaderboard

pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Cells per board side
    pub const BOARD_SIDE: usize = 5;
    /// Cells per board (5x5 grid)
    pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;
    /// World-space spacing between adjacent grid cells
    pub const CELL_SPACING: f32 = 4.0;
    /// X of grid column 0
    pub const GRID_ORIGIN_X: f32 = -8.0;
    /// Y of grid row 0
    pub const GRID_ORIGIN_Y: f32 = 11.0;

    /// Boards recycle once their z crosses this plane behind the camera
    pub const RECYCLE_THRESHOLD_Z: f32 = 50.0;
    /// Distance a board jumps back when recycled
    pub const RECYCLE_DISTANCE: f32 = 300.0;
    /// Number of boards kept in flight
    pub const BOARD_COUNT: usize = 5;
    /// Spacing between boards at spawn (BOARD_COUNT * BOARD_SPACING must
    /// equal RECYCLE_DISTANCE so spacing survives recycling)
    pub const BOARD_SPACING: f32 = 60.0;
    /// Z offset of the nearest board at session start
    pub const START_OFFSET: f32 = 10.0;

    /// Forward scroll speed during normal play
    pub const RUN_SPEED: f32 = 80.0;
    /// Decaying post-collision speed freezes once below this
    pub const SPEED_FREEZE_EPSILON: f32 = 0.5;

    /// Half extent of the square x/y overlap test (ship and obstacle alike)
    pub const COLLISION_HALF_EXTENT: f32 = 1.0;
    /// Collision is only evaluated while a board's |z| is within this band
    pub const COLLISION_Z_BAND: f32 = 1.0;

    /// Ship lateral/vertical speed factor
    pub const SHIP_SPEED: f32 = 20.0;
    /// Steering rate while a direction is held (radians per second)
    pub const TURN_RATE: f32 = 3.0;
    /// Spring return rate once a direction is released
    pub const RETURN_RATE: f32 = 8.0;
    /// Rotations inside this band snap to zero instead of decaying forever
    pub const RETURN_EPSILON: f32 = 0.01;
    /// Steering angles are clamped to this magnitude
    pub const MAX_STEER_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    /// Play-field bounds the ship is clamped to every tick
    pub const FIELD_X_MIN: f32 = -8.5;
    pub const FIELD_X_MAX: f32 = 8.5;
    pub const FIELD_Y_MIN: f32 = -6.5;
    pub const FIELD_Y_MAX: f32 = 12.0;

    /// Light frustum vertical field of view for the depth pass
    pub const LIGHT_FOV: f32 = std::f32::consts::FRAC_PI_2;
    /// Light position while no session is running
    pub const IDLE_LIGHT_POS: [f32; 3] = [0.0, 3.0, 37.0];

    /// Camera anchor and field of view (fixed; interpolation is out of scope)
    pub const CAMERA_POS: [f32; 3] = [0.0, 3.0, 50.0];
    pub const CAMERA_FOV: f32 = std::f32::consts::FRAC_PI_4;
}

/// Grid row of cell index `i` (row-major 5x5)
#[inline]
pub fn cell_row(i: usize) -> usize {
    i / consts::BOARD_SIDE
}

/// Grid column of cell index `i`
#[inline]
pub fn cell_col(i: usize) -> usize {
    i % consts::BOARD_SIDE
}

/// World-space x/y offset of a grid cell
#[inline]
pub fn cell_offset(i: usize) -> (f32, f32) {
    (
        consts::GRID_ORIGIN_X + cell_col(i) as f32 * consts::CELL_SPACING,
        consts::GRID_ORIGIN_Y - cell_row(i) as f32 * consts::CELL_SPACING,
    )
}
