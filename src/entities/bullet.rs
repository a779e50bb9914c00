use ratatui::style::Color;

use super::body::{Body, Bounded, Obstacles, Rect};
use super::sprite::{Appearance, Renderable};
use crate::config::BulletTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub body: Body,
    /// Horizontal distance per frame, sign gives the direction
    pub x_speed: f32,
    pub owner: BulletOwner,
    /// Frames left before the bullet fizzles out
    pub lifetime: u32,
    blocked: bool,
}

impl Bullet {
    pub fn new(body: Body, x_speed: f32, owner: BulletOwner, lifetime: u32) -> Self {
        Self {
            body,
            x_speed,
            owner,
            lifetime,
            blocked: false,
        }
    }

    /// Spawns a bullet next to `shooter`, vertically centred, flying in the
    /// direction given by `direction` (-1 left, 1 right).
    pub fn fired_from(shooter: Rect, direction: f32, owner: BulletOwner, tuning: &BulletTuning) -> Self {
        let x = if direction < 0.0 {
            shooter.left() - tuning.width
        } else {
            shooter.right()
        };
        let y = shooter.top() + ((shooter.height - tuning.height) / 2.0).floor();

        Self::new(
            Body::new(x, y, tuning.width, tuning.height),
            direction.signum() * tuning.speed,
            owner,
            tuning.lifetime_frames,
        )
    }

    /// Advances one frame. Bullets are stopped by collidables only; a bullet
    /// that could not travel its full distance is marked as blocked.
    pub fn update<O: Obstacles + ?Sized>(&mut self, collidables: &O) {
        self.lifetime = self.lifetime.saturating_sub(1);

        let (dx, _) = self.body.sweep_move(self.x_speed, 0.0, collidables);
        if dx != self.x_speed.trunc() {
            self.blocked = true;
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime == 0
    }

    /// Outside the playfield by more than `margin` on any side.
    pub fn is_out_of_bounds(&self, width: f32, height: f32, margin: f32) -> bool {
        let (x, y) = self.body.position();
        x < -margin || x > width + margin || y < -margin || y > height + margin
    }

    /// Should be removed from its group.
    pub fn is_spent(&self, width: f32, height: f32, margin: f32) -> bool {
        self.is_blocked() || self.is_expired() || self.is_out_of_bounds(width, height, margin)
    }

    pub fn is_hostile(&self) -> bool {
        self.owner == BulletOwner::Enemy
    }
}

impl Bounded for Bullet {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Renderable for Bullet {
    fn appearance(&self) -> Appearance<'_> {
        match self.owner {
            BulletOwner::Player => Appearance::Fill(Color::Yellow),
            BulletOwner::Enemy => Appearance::Fill(Color::Magenta),
        }
    }

    fn show_hitbox(&self) -> bool {
        false
    }
}
