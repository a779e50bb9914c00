use color_eyre::Result;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::time::{Duration, Instant};

use crate::audio::AudioManager;
use crate::game::Game;
use crate::input::{InputAction, InputManager};
use crate::renderer::{GameRenderer, RenderView};

/// The main application: owns the game and the terminal-facing components
/// around it.
pub struct App {
    running: bool,
    game: Game,
    /// Frames info
    frame_duration: Duration,
    last_frame_time: Instant,
    fps: u32,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: AudioManager,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(game: Game, input_manager: InputManager, audio_manager: AudioManager) -> Self {
        let fps = game.config().frame_rate();
        Self {
            running: true,
            game,
            frame_duration: Duration::from_micros(1_000_000 / fps as u64),
            last_frame_time: Instant::now(),
            fps: 0,
            input_manager,
            renderer: GameRenderer::new(),
            audio_manager,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        log::info!(
            "starting at level {} of {}",
            self.game.level_id(),
            self.game.max_level_id()
        );

        while self.running {
            let frame_start = Instant::now();

            // Calculate FPS
            let frame_time = frame_start.duration_since(self.last_frame_time);
            self.last_frame_time = frame_start;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            terminal.draw(|frame| {
                let view = RenderView {
                    game: &self.game,
                    area: frame.area(),
                    fps: self.fps,
                };
                self.renderer.render(frame, &view);
            })?;

            self.input_manager.poll_events(self.game.state())?;
            let actions = self.input_manager.actions().to_vec();
            self.process_actions(&actions);

            let events = self.game.update(&self.input_manager.snapshot());
            self.audio_manager.play_events(&events);

            // Hold the configured frame rate
            if let Some(remaining) = self.frame_duration.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        log::info!(
            "quit at level {} with {} death(s)",
            self.game.level_id(),
            self.game.player().deaths
        );
        Ok(())
    }

    /// Process input actions and update game state accordingly
    fn process_actions(&mut self, actions: &[InputAction]) {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.game.pause();
                }
                InputAction::Resume => {
                    self.game.resume();
                }
                InputAction::Restart => {
                    self.game.restart();
                }
            }
        }
    }
}
