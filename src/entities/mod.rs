mod body;
mod bullet;
mod enemy;
mod game_state;
mod group;
mod player;
mod scenery;
mod sprite;

// Re-export all public types
pub use body::{Body, Bounded, Obstacles, Rect};
pub use bullet::{Bullet, BulletOwner};
pub use enemy::Enemy;
pub use game_state::GameState;
pub use group::{EntityId, Group};
pub use player::{Facing, Life, Player, PlayerEvents, Surroundings};
pub use scenery::Scenery;
pub use sprite::{Appearance, Renderable, Sprite, SpriteKind};
