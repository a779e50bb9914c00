use rand::Rng;

use super::body::{Body, Bounded, Rect};
use super::bullet::{Bullet, BulletOwner};
use super::group::Group;
use super::player::Facing;
use super::scenery::Scenery;
use super::sprite::{Appearance, Renderable, Sprite, SpriteKind};
use crate::config::{BulletTuning, EnemyTuning, GameConfig, PlayerTuning};

/// Angry canpooper: patrols back and forth under the same gravity and
/// collision rules as the player and takes pot shots at it.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Body,
    pub y_speed: f32,
    pub facing: Facing,
    pub sprite: Sprite,
    /// Frames since the last firing decision
    pub fire_timer: u32,
    physics: PlayerTuning,
    tuning: EnemyTuning,
    bullet: BulletTuning,
}

impl Enemy {
    pub fn new(rect: Rect, config: &GameConfig) -> Self {
        Self {
            body: Body::from_rect(rect),
            y_speed: 0.0,
            facing: Facing::Left,
            sprite: Sprite::default(),
            fire_timer: 0,
            physics: config.player.clone(),
            tuning: config.enemy.clone(),
            bullet: config.bullet.clone(),
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }

    /// Runs one frame of patrol movement and the firing decision. Ledges and
    /// hazards are edges to turn around at; enemies are never killed by
    /// hazards. Returns a bullet aimed at `target`'s side when the enemy fires.
    pub fn update<R: Rng>(
        &mut self,
        collidables: &Group<Scenery>,
        fatal: &Group<Scenery>,
        target: Rect,
        rng: &mut R,
    ) -> Option<Bullet> {
        let on_ground = self.body.on_ground(collidables);

        if on_ground && self.y_speed > 0.0 {
            self.y_speed = 0.0;
        } else if !on_ground && self.y_speed < self.physics.terminal_velocity {
            self.y_speed = (self.y_speed + self.physics.gravity_step())
                .min(self.physics.terminal_velocity);
        }

        let mut x_speed = self.facing.sign() * self.tuning.speed;
        let step = x_speed.trunc();
        let into_hazard = self.body.colliding_at(step, 0.0, fatal);
        let off_ledge = on_ground && !self.body.on_ground_at(step, collidables);
        if into_hazard || off_ledge {
            self.facing = self.facing.reversed();
            x_speed = 0.0;
        }

        let (dx, _) = self.body.sweep_move(x_speed, self.y_speed, collidables);
        if dx != x_speed.trunc() {
            self.facing = self.facing.reversed();
        }

        self.fire_timer += 1;
        if self.fire_timer < self.tuning.fire_interval_frames {
            return None;
        }
        self.fire_timer = 0;

        if !rng.random_bool(self.tuning.fire_chance.clamp(0.0, 1.0)) {
            return None;
        }

        let direction = if target.center().0 < self.body.rect().center().0 {
            -1.0
        } else {
            1.0
        };
        Some(Bullet::fired_from(
            self.body.rect(),
            direction,
            BulletOwner::Enemy,
            &self.bullet,
        ))
    }
}

impl Bounded for Enemy {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Renderable for Enemy {
    fn appearance(&self) -> Appearance<'_> {
        Appearance::Sprite {
            kind: SpriteKind::Enemy,
            image: self.sprite.image.as_deref(),
            mirrored: self.facing == Facing::Left,
        }
    }

    fn show_hitbox(&self) -> bool {
        self.sprite.show_hitbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn floor() -> Group<Scenery> {
        [Scenery::new(SpriteKind::Collidable, Rect::new(0.0, 100.0, 960.0, 100.0))]
            .into_iter()
            .collect()
    }

    fn config_with(fire_chance: f64, fire_interval_frames: u32) -> GameConfig {
        let mut config = GameConfig::default();
        config.enemy.fire_chance = fire_chance;
        config.enemy.fire_interval_frames = fire_interval_frames;
        config
    }

    fn far_target() -> Rect {
        Rect::new(900.0, 50.0, 50.0, 50.0)
    }

    #[test]
    fn test_enemy_patrols_in_facing_direction() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::new(Rect::new(300.0, 50.0, 50.0, 50.0), &config_with(0.0, 90));

        enemy.update(&floor(), &Group::new(), far_target(), &mut rng);

        assert_eq!(enemy.body.position(), (298.0, 50.0));
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn test_enemy_turns_around_at_wall() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut collidables = floor();
        collidables.insert(Scenery::new(
            SpriteKind::Collidable,
            Rect::new(250.0, 0.0, 50.0, 100.0),
        ));
        let mut enemy = Enemy::new(Rect::new(300.0, 50.0, 50.0, 50.0), &config_with(0.0, 90));

        enemy.update(&collidables, &Group::new(), far_target(), &mut rng);
        assert_eq!(enemy.facing, Facing::Right);
        assert_eq!(enemy.body.position(), (300.0, 50.0));

        enemy.update(&collidables, &Group::new(), far_target(), &mut rng);
        assert_eq!(enemy.body.position(), (302.0, 50.0));
    }

    #[test]
    fn test_enemy_turns_around_before_hazard_and_survives() {
        let mut rng = StdRng::seed_from_u64(1);
        let fatal: Group<Scenery> =
            [Scenery::new(SpriteKind::Fatal, Rect::new(200.0, 60.0, 99.0, 40.0))]
                .into_iter()
                .collect();
        let mut enemy = Enemy::new(Rect::new(300.0, 50.0, 50.0, 50.0), &config_with(0.0, 90));

        enemy.update(&floor(), &fatal, far_target(), &mut rng);

        assert_eq!(enemy.facing, Facing::Right);
        assert_eq!(enemy.body.position(), (300.0, 50.0));
    }

    #[test]
    fn test_enemy_stays_on_platform_above_lava() {
        let mut rng = StdRng::seed_from_u64(1);
        let platform: Group<Scenery> =
            [Scenery::new(SpriteKind::Collidable, Rect::new(300.0, 100.0, 200.0, 40.0))]
                .into_iter()
                .collect();
        let lava: Group<Scenery> =
            [Scenery::new(SpriteKind::Fatal, Rect::new(0.0, 300.0, 960.0, 100.0))]
                .into_iter()
                .collect();
        let mut enemy = Enemy::new(Rect::new(310.0, 50.0, 50.0, 50.0), &config_with(0.0, 90));

        let mut turned = false;
        for _ in 0..400 {
            enemy.update(&platform, &lava, far_target(), &mut rng);
            turned |= enemy.facing == Facing::Right;

            let rect = enemy.body.rect();
            assert_eq!(rect.y, 50.0);
            assert!(rect.right() >= 300.0 && rect.left() <= 500.0);
        }
        assert!(turned);
    }

    #[test]
    fn test_airborne_enemy_does_not_turn_at_ledges() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::new(Rect::new(300.0, 0.0, 50.0, 50.0), &config_with(0.0, 90));

        enemy.update(&floor(), &Group::new(), far_target(), &mut rng);

        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn test_enemy_falls_under_gravity() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::new(Rect::new(300.0, 0.0, 50.0, 50.0), &config_with(0.0, 90));

        for _ in 0..60 {
            enemy.update(&floor(), &Group::new(), far_target(), &mut rng);
        }

        assert_eq!(enemy.body.rect().bottom(), 100.0);
        assert_eq!(enemy.y_speed, 0.0);
    }

    #[test]
    fn test_enemy_fires_toward_target_on_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = Enemy::new(Rect::new(300.0, 50.0, 50.0, 50.0), &config_with(1.0, 3));

        assert!(enemy.update(&floor(), &Group::new(), far_target(), &mut rng).is_none());
        assert!(enemy.update(&floor(), &Group::new(), far_target(), &mut rng).is_none());
        let bullet = enemy
            .update(&floor(), &Group::new(), far_target(), &mut rng)
            .unwrap();

        assert_eq!(bullet.owner, BulletOwner::Enemy);
        assert!(bullet.x_speed > 0.0);
        assert_eq!(enemy.fire_timer, 0);
    }

    #[test]
    fn test_enemy_never_fires_with_zero_chance() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = Enemy::new(Rect::new(300.0, 50.0, 50.0, 50.0), &config_with(0.0, 1));

        for _ in 0..100 {
            assert!(enemy.update(&floor(), &Group::new(), far_target(), &mut rng).is_none());
        }
    }
}
