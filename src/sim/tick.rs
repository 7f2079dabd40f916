//! Fixed timestep simulation tick
//!
//! One tick runs to completion before anything renders: input integration,
//! board advance, collision query, in that order. Collision queries always
//! observe post-advance, pre-render state.

use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::SPEED_FREEZE_EPSILON;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held direction flags
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Edge-triggered start press
    pub start: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Idle => {
            if input.start {
                state.start_run();
            }
        }

        GamePhase::Playing => {
            state.time_ticks += 1;
            state.ship.update(input, dt);
            state.distance += state.speed * dt;

            let hit = state
                .track
                .tick(state.speed, dt, state.ship.position, &mut state.rng);

            if let Some(cell_ref) = hit {
                let impact = state.ship.position;
                state.track.obstacle_mut(cell_ref).fracture_at(impact);
                state.ship.begin_tumble();
                state.phase = GamePhase::GameOver;
                state.events.push(GameEvent::Collided { cell: cell_ref });
                log::info!(
                    "collision: board {} cell {} at distance {}",
                    cell_ref.board,
                    cell_ref.cell,
                    state.score()
                );
            }
        }

        GamePhase::GameOver => {
            state.time_ticks += 1;

            // Decaying drift; the world coasts to a stop
            state.speed -= state.speed * 0.95 * dt;
            if state.speed < SPEED_FREEZE_EPSILON {
                state.speed = 0.0;
            }

            // Gameplay has halted: advance without collision queries
            state.track.advance(state.speed, dt, &mut state.rng);
            if state.ship.phase == crate::sim::ship::ShipPhase::Tumbling {
                state.ship.apply_collision_response(dt, state.speed);
            }

            if state.speed == 0.0 && !state.run_committed {
                state.run_committed = true;
                let score = state.score();
                state.high_score = state.high_score.max(score);
                state.events.push(GameEvent::RunEnded { score });
                log::info!("run ended: score {}, best {}", score, state.high_score);
            }

            // New session is the only way back to flight
            if input.start {
                state.start_run();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{RUN_SPEED, SIM_DT};
    use crate::sim::ship::ShipPhase;
    use glam::Vec3;

    fn start_pressed() -> TickInput {
        TickInput {
            start: true,
            ..TickInput::default()
        }
    }

    /// Drive a board into the collision band under the ship.
    fn force_collision(state: &mut GameState) {
        state.ship.position = Vec3::new(0.0, 3.0, 0.0);
        while state.phase == GamePhase::Playing {
            tick(state, &TickInput::default(), SIM_DT);
            if state.phase != GamePhase::Playing {
                break;
            }
            // Park the ship on the nearest board's first occupied cell once
            // that board approaches the collision band.
            if let Some(board) = state.track.boards().first() {
                if board.z() > -5.0 {
                    if let Some((_cell, obstacle)) = board.active_cells().next() {
                        let p = obstacle.position;
                        state.ship.position = Vec3::new(p.x, p.y, 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn idle_ignores_everything_but_start() {
        let mut state = GameState::new(1);
        for _ in 0..100 {
            tick(
                &mut state,
                &TickInput {
                    up: true,
                    left: true,
                    ..TickInput::default()
                },
                SIM_DT,
            );
        }
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &start_pressed(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn score_tracks_distance() {
        let mut state = GameState::new(1);
        state.start_run();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        // One second at run speed
        assert!((state.distance - RUN_SPEED).abs() < 0.01);
    }

    #[test]
    fn collision_halts_gameplay_and_fractures_the_obstacle() {
        let mut state = GameState::new(3);
        state.start_run();
        force_collision(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.ship.phase, ShipPhase::Tumbling);

        let collided = state.events.iter().find_map(|e| match e {
            GameEvent::Collided { cell } => Some(*cell),
            _ => None,
        });
        let cell_ref = collided.expect("collision event raised");
        let obstacle = state.track.obstacle(cell_ref);
        assert!(obstacle.is_fractured);
        assert_eq!(obstacle.fracture_origin.truncate(), state.ship.position.truncate());
    }

    #[test]
    fn game_over_decays_speed_to_frozen_zero() {
        let mut state = GameState::new(3);
        state.start_run();
        force_collision(&mut state);

        // A minute of coasting is far beyond the decay horizon
        for _ in 0..(120 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.ship.phase, ShipPhase::Idle);

        let ended = state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::RunEnded { .. }));
        assert!(ended);
        // RunEnded fires exactly once
        let count = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(count, 1);
        assert!(state.high_score >= state.score());
    }

    #[test]
    fn start_resets_from_game_over() {
        let mut state = GameState::new(3);
        state.start_run();
        force_collision(&mut state);

        tick(&mut state, &start_pressed(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ship.phase, ShipPhase::Flying);
        assert_eq!(state.distance, 0.0);
        // Fresh boards: nothing fractured
        for board in state.track.boards() {
            for cell in 0..crate::consts::BOARD_CELLS {
                assert!(!board.obstacle(cell).is_fractured);
            }
        }
    }
}
