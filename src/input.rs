use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::entities::GameState;

/// Semantic one-shot actions triggered by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Pause,
    Resume,
    Restart,
    Quit,
}

/// Keys held during one frame, as the game sees them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub fire: bool,
    /// Debug key: jump straight to the next level
    pub skip_level: bool,
}

/// Frames a key counts as held after a press when the terminal cannot
/// report releases. Key repeat refreshes it while the key stays down.
const HOLD_FRAMES: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldKey {
    Left,
    Right,
    Jump,
    Crouch,
    Fire,
}

/// Tracks the state of keys that can be held down for continuous input.
/// Each entry is the last frame the key still counts as held.
#[derive(Debug, Default)]
struct KeyState {
    left: Option<u64>,
    right: Option<u64>,
    jump: Option<u64>,
    crouch: Option<u64>,
    fire: Option<u64>,
}

impl KeyState {
    fn slot(&mut self, key: HeldKey) -> &mut Option<u64> {
        match key {
            HeldKey::Left => &mut self.left,
            HeldKey::Right => &mut self.right,
            HeldKey::Jump => &mut self.jump,
            HeldKey::Crouch => &mut self.crouch,
            HeldKey::Fire => &mut self.fire,
        }
    }
}

/// Manages input polling and translates raw key events into game input
pub struct InputManager {
    key_state: KeyState,
    oneshot_actions: Vec<InputAction>,
    skip_level: bool,
    /// Terminal reports key releases (keyboard enhancement is active)
    release_events: bool,
    frame: u64,
}

impl InputManager {
    pub fn new(release_events: bool) -> Self {
        Self {
            key_state: KeyState::default(),
            oneshot_actions: Vec::new(),
            skip_level: false,
            release_events,
            frame: 0,
        }
    }

    /// Polls for all input events without blocking.
    /// Should be called once per frame before taking the snapshot
    pub fn poll_events(&mut self, game_state: GameState) -> color_eyre::Result<()> {
        self.begin_frame();

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, game_state);
            }
        }

        Ok(())
    }

    fn begin_frame(&mut self) {
        self.frame += 1;
        self.oneshot_actions.clear();
        self.skip_level = false;
    }

    fn handle_key_event(&mut self, key_event: KeyEvent, game_state: GameState) {
        match key_event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.handle_key_press(key_event, game_state);
            }
            KeyEventKind::Release => {
                if let Some(key) = held_key(key_event.code) {
                    *self.key_state.slot(key) = None;
                }
            }
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, game_state: GameState) {
        // Quit works in any state
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        match game_state {
            GameState::Playing => {
                if matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P')) {
                    self.oneshot_actions.push(InputAction::Pause);
                    return;
                }
                if matches!(key_event.code, KeyCode::Char('n') | KeyCode::Char('N')) {
                    self.skip_level = true;
                    return;
                }
            }
            GameState::Paused => {
                if matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P')) {
                    self.oneshot_actions.push(InputAction::Resume);
                }
                return;
            }
            GameState::Complete => {
                if matches!(key_event.code, KeyCode::Char('r') | KeyCode::Char('R')) {
                    self.oneshot_actions.push(InputAction::Restart);
                }
                return;
            }
        }

        if let Some(key) = held_key(key_event.code) {
            self.hold(key);
        }
    }

    fn hold(&mut self, key: HeldKey) {
        let until = if self.release_events {
            u64::MAX
        } else {
            self.frame + HOLD_FRAMES
        };
        *self.key_state.slot(key) = Some(until);

        // Last pressed horizontal direction wins
        match key {
            HeldKey::Left => self.key_state.right = None,
            HeldKey::Right => self.key_state.left = None,
            _ => {}
        }
    }

    fn is_held(&self, until: Option<u64>) -> bool {
        until.is_some_and(|until| self.frame <= until)
    }

    /// One-shot actions triggered this frame
    pub fn actions(&self) -> &[InputAction] {
        &self.oneshot_actions
    }

    /// Keys held this frame
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.is_held(self.key_state.left),
            right: self.is_held(self.key_state.right),
            jump: self.is_held(self.key_state.jump),
            crouch: self.is_held(self.key_state.crouch),
            fire: self.is_held(self.key_state.fire),
            skip_level: self.skip_level,
        }
    }
}

fn held_key(code: KeyCode) -> Option<HeldKey> {
    match code {
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(HeldKey::Left),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(HeldKey::Right),
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(HeldKey::Jump),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(HeldKey::Crouch),
        KeyCode::Char(' ') => Some(HeldKey::Fire),
        _ => None,
    }
}
