use ratatui::style::Color;
use std::rc::Rc;

use super::body::Bounded;
use crate::assets::ImageHandle;

/// Which sprite sheet an entity is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Player,
    Enemy,
    Collidable,
    Objective,
    Fatal,
    Booster,
}

impl SpriteKind {
    /// Colour used when no image has been attached.
    pub fn fallback_color(&self) -> Color {
        match self {
            SpriteKind::Player => Color::Green,
            SpriteKind::Enemy => Color::Red,
            SpriteKind::Collidable => Color::Rgb(150, 100, 50),
            SpriteKind::Objective => Color::Yellow,
            SpriteKind::Fatal => Color::LightRed,
            SpriteKind::Booster => Color::Cyan,
        }
    }
}

/// Render handle carried by every drawable entity.
#[derive(Debug, Clone, Default)]
pub struct Sprite {
    pub image: Option<Rc<ImageHandle>>,
    pub show_hitbox: bool,
}

impl Sprite {
    pub fn new(image: Option<Rc<ImageHandle>>, show_hitbox: bool) -> Self {
        Self { image, show_hitbox }
    }
}

/// How an entity wants to be drawn this frame.
#[derive(Debug, Clone, Copy)]
pub enum Appearance<'a> {
    Sprite {
        kind: SpriteKind,
        image: Option<&'a ImageHandle>,
        mirrored: bool,
    },
    Fill(Color),
}

pub trait Renderable: Bounded {
    fn appearance(&self) -> Appearance<'_>;

    fn show_hitbox(&self) -> bool;
}
