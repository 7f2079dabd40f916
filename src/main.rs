//! Voidlane entry point
//!
//! Owns the window, the fixed-timestep loop and input mapping. Everything
//! game-related lives in the library crate.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use voidlane::consts::{MAX_SUBSTEPS, SIM_DT};
use voidlane::renderer::Renderer;
use voidlane::sim::{GameEvent, GameState, SceneSnapshot, TickInput, tick};
use voidlane::{HighScores, Settings};

struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    state: GameState,
    highscores: HighScores,
    input: TickInput,
    accumulator: f32,
    last_frame: Option<Instant>,
    // Frame counting for the once-per-second fps log
    frames: u32,
    fps_window: Instant,
}

impl App {
    fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("session seed: {seed}");

        Self {
            settings,
            window: None,
            renderer: None,
            state: GameState::new(seed),
            highscores: HighScores::new(),
            input: TickInput::default(),
            accumulator: 0.0,
            last_frame: None,
            frames: 0,
            fps_window: Instant::now(),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title("Voidlane")
            .with_inner_size(PhysicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone(), &self.settings)) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.window = Some(window);
                self.last_frame = Some(Instant::now());
            }
            Err(e) => {
                log::error!("renderer init failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        match event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW | KeyCode::ArrowUp) => self.input.up = pressed,
            PhysicalKey::Code(KeyCode::KeyS | KeyCode::ArrowDown) => self.input.down = pressed,
            PhysicalKey::Code(KeyCode::KeyA | KeyCode::ArrowLeft) => self.input.left = pressed,
            PhysicalKey::Code(KeyCode::KeyD | KeyCode::ArrowRight) => self.input.right = pressed,
            PhysicalKey::Code(KeyCode::Space | KeyCode::Enter) => {
                if pressed && !event.repeat {
                    self.input.start = true;
                }
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                if pressed {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    /// Run simulation ticks for the elapsed wall time, then drain events.
    fn update(&mut self, dt: f32) {
        // Clamp long stalls so we never spiral
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.start = false;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        let duration_secs = self.state.time_ticks as f32 * SIM_DT;
        let seed = self.state.seed;
        for event in self.state.events.drain(..) {
            match event {
                GameEvent::SessionStarted => {}
                GameEvent::Collided { .. } => {}
                GameEvent::RunEnded { score } => {
                    match self.highscores.add_score(score, duration_secs, seed) {
                        Some(rank) => log::info!("run scored {score}, leaderboard rank {rank}"),
                        None => log::info!("run scored {score}, below the leaderboard"),
                    }
                }
            }
        }
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let snapshot = SceneSnapshot::capture(&self.state);
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        match renderer.render(&snapshot) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    renderer.resize(size.width, size.height);
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {e:?}"),
        }

        if self.settings.show_fps {
            self.frames += 1;
            let elapsed = self.fps_window.elapsed().as_secs_f32();
            if elapsed >= 1.0 {
                log::info!("fps: {:.0}", self.frames as f32 / elapsed);
                self.frames = 0;
                self.fps_window = Instant::now();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.init_window(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, event),

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = self
                    .last_frame
                    .map_or(SIM_DT, |last| now.duration_since(last).as_secs_f32());
                self.last_frame = Some(now);

                self.update(dt);
                self.render(event_loop);

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Voidlane starting");

    let settings = Settings::load();
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop.run_app(&mut app)?;

    app.settings.save();
    Ok(())
}
