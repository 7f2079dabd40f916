//! Per-frame scene snapshot
//!
//! Both render passes consume one immutable `SceneSnapshot` captured after
//! the tick. Nothing can advance between the depth and shaded passes because
//! neither pass sees the live game state at all, only this value.

use glam::{Mat4, Vec3};

use super::state::{GamePhase, GameState};
use crate::consts::IDLE_LIGHT_POS;

/// The closed set of renderable primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshId {
    Cube,
    CubeOutline,
    ShipHull,
}

impl MeshId {
    /// Outlines are cosmetic and stay out of the light depth pass.
    pub fn casts_shadow(self) -> bool {
        !matches!(self, MeshId::CubeOutline)
    }
}

/// Item colors submitted with the shaded pass
pub mod colors {
    pub const CUBE: [f32; 4] = [0.13, 0.13, 0.13, 1.0];
    pub const CUBE_OUTLINE: [f32; 4] = [0.65, 0.85, 1.0, 1.0];
    pub const SHIP: [f32; 4] = [0.85, 0.9, 1.0, 1.0];
}

/// Fracture animation parameters: impact origin and seconds since impact.
/// Part of the geometry submission so depth and shaded passes displace
/// shards identically and shadows stay glued to them.
pub type Fracture = Option<(Vec3, f32)>;

/// Which of the two per-frame passes a submission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Depth-only, from the light's point of view
    Depth,
    /// Final lit pass, shadow-sampled
    Shaded,
}

/// Submission mode: depth-only, or shaded with a material color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawMode {
    Depth,
    Shaded { color: [f32; 4] },
}

/// Narrow interface the sim exposes to the render collaborator
pub trait DrawSink {
    fn submit_mesh(&mut self, mesh: MeshId, transform: Mat4, fracture: Fracture, mode: DrawMode);
}

/// One recorded draw submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub transform: Mat4,
    pub color: [f32; 4],
    pub fracture: Fracture,
}

/// Read-only scene description for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Ordered submissions: boards in array order, cells row-major (cube
    /// then outline per cell), ship last. Stable for deterministic replay.
    pub items: Vec<DrawItem>,
    /// Light anchor for the depth pass
    pub light_pos: Vec3,
    pub is_playing: bool,
}

impl SceneSnapshot {
    /// Capture the current board/obstacle/ship state. Called exactly once
    /// per frame, after the tick and before either pass.
    pub fn capture(state: &GameState) -> Self {
        let mut items = Vec::new();

        for board in state.track.boards() {
            for (_cell, obstacle) in board.active_cells() {
                let transform = Mat4::from_translation(obstacle.position);
                let fracture = obstacle
                    .is_fractured
                    .then_some((obstacle.fracture_origin, obstacle.fracture_age));

                items.push(DrawItem {
                    mesh: MeshId::Cube,
                    transform,
                    color: colors::CUBE,
                    fracture,
                });
                items.push(DrawItem {
                    mesh: MeshId::CubeOutline,
                    transform,
                    color: colors::CUBE_OUTLINE,
                    fracture,
                });
            }
        }

        // Ship is drawn whenever a session exists (flying or tumbling)
        if !state.track.is_empty() {
            items.push(DrawItem {
                mesh: MeshId::ShipHull,
                transform: state.ship.transform(),
                color: colors::SHIP,
                fracture: None,
            });
        }

        let light_pos = if state.phase == GamePhase::Idle {
            Vec3::from_array(IDLE_LIGHT_POS)
        } else {
            state.ship.position
        };

        Self {
            items,
            light_pos,
            is_playing: state.is_playing(),
        }
    }

    /// Replay the snapshot into a sink for one pass. Depth submissions
    /// skip non-casting meshes and carry no material.
    pub fn encode(&self, sink: &mut dyn DrawSink, pass: PassKind) {
        for item in &self.items {
            match pass {
                PassKind::Depth => {
                    if item.mesh.casts_shadow() {
                        sink.submit_mesh(item.mesh, item.transform, item.fracture, DrawMode::Depth);
                    }
                }
                PassKind::Shaded => {
                    sink.submit_mesh(
                        item.mesh,
                        item.transform,
                        item.fracture,
                        DrawMode::Shaded { color: item.color },
                    );
                }
            }
        }
    }
}
