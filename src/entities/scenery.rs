use super::body::{Body, Bounded, Rect};
use super::sprite::{Appearance, Renderable, Sprite, SpriteKind};

/// Static level geometry: crates, lava, objectives and booster pads. They
/// never move; what they do depends on which group the level puts them in.
#[derive(Debug, Clone)]
pub struct Scenery {
    pub kind: SpriteKind,
    pub body: Body,
    pub sprite: Sprite,
}

impl Scenery {
    pub fn new(kind: SpriteKind, rect: Rect) -> Self {
        Self {
            kind,
            body: Body::from_rect(rect),
            sprite: Sprite::default(),
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }
}

impl Bounded for Scenery {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Renderable for Scenery {
    fn appearance(&self) -> Appearance<'_> {
        Appearance::Sprite {
            kind: self.kind,
            image: self.sprite.image.as_deref(),
            mirrored: false,
        }
    }

    fn show_hitbox(&self) -> bool {
        self.sprite.show_hitbox
    }
}
