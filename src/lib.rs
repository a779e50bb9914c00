// Library exports for the binary and integration tests
pub use app::App;
pub use assets::{AssetCache, ImageHandle, ImageProvider};
pub use audio::{AudioManager, Sound};
pub use config::{CONFIG_FILE, GameConfig};
pub use entities::{
    Body, Bullet, BulletOwner, Enemy, EntityId, Facing, GameState, Group, Life, Player, Rect,
    Scenery, SpriteKind,
};
pub use game::{FrameEvents, Game};
pub use input::{InputAction, InputManager, InputSnapshot};
pub use level::{LevelLayout, LevelSet};
pub use renderer::{Canvas, GameRenderer, TerminalCanvas};

pub mod app;
pub mod assets;
pub mod audio;
pub mod config;
pub mod entities;
pub mod game;
pub mod input;
pub mod level;
pub mod renderer;
