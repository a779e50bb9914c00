use super::body::{Body, Bounded, Obstacles, Rect};
use super::bullet::{Bullet, BulletOwner};
use super::group::{EntityId, Group};
use super::scenery::Scenery;
use super::sprite::{Appearance, Renderable, Sprite, SpriteKind};
use crate::config::{BulletTuning, GameConfig, PlayerTuning};
use crate::input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Where the player is in the death/respawn cycle. Ticks are game frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Life {
    Alive,
    /// Frozen where it died until `respawn_at`, then put back at the
    /// respawn point
    Dead { respawn_at: u64 },
    /// Already at the respawn point, frozen until `resume_at`
    Respawning { resume_at: u64 },
}

/// The groups the player interacts with during its update.
pub struct Surroundings<'a> {
    pub collidables: &'a Group<Scenery>,
    pub fatal: &'a Group<Scenery>,
    pub boosters: &'a Group<Scenery>,
    pub bullets: &'a Group<Bullet>,
}

/// What happened to the player this frame.
#[derive(Debug, Default)]
pub struct PlayerEvents {
    pub died: bool,
    pub respawned: bool,
    /// Hostile bullet that killed the player, to be removed
    pub killed_by: Option<EntityId>,
    pub fired: Option<Bullet>,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub x_speed: f32,
    pub y_speed: f32,
    pub facing: Facing,
    pub life: Life,
    pub deaths: u32,
    pub respawn_point: (f32, f32),
    pub last_fired: Option<u64>,
    pub sprite: Sprite,
    tuning: PlayerTuning,
    bullet: BulletTuning,
    fire_cooldown_ticks: u64,
    death_pause_ticks: u64,
}

impl Player {
    /// Creates a player whose respawn point is its starting position.
    pub fn new(spawn: Rect, config: &GameConfig) -> Self {
        Self {
            body: Body::from_rect(spawn),
            x_speed: 0.0,
            y_speed: 0.0,
            facing: Facing::Right,
            life: Life::Alive,
            deaths: 0,
            respawn_point: (spawn.x.trunc(), spawn.y.trunc()),
            last_fired: None,
            sprite: Sprite::default(),
            tuning: config.player.clone(),
            bullet: config.bullet.clone(),
            fire_cooldown_ticks: config.fire_cooldown_ticks(),
            death_pause_ticks: config.death_pause_ticks(),
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    /// Runs one frame: death checks, input, gravity, movement and firing.
    /// While dead or respawning the player only waits for its timer.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        tick: u64,
        world: &Surroundings<'_>,
    ) -> PlayerEvents {
        let mut events = PlayerEvents::default();

        match self.life {
            Life::Alive => {}
            Life::Dead { respawn_at: until } | Life::Respawning { resume_at: until } => {
                if tick >= until {
                    self.teleport_to_respawn();
                    self.life = Life::Alive;
                    events.respawned = true;
                    log::debug!("player back in play at {:?}", self.respawn_point);
                }
                return events;
            }
        }

        if self.body.overlaps_any(world.fatal) {
            self.die(tick);
            events.died = true;
            return events;
        }

        if let Some((id, _)) = world
            .bullets
            .iter()
            .find(|(_, b)| b.is_hostile() && b.body.rect().overlaps(&self.body.rect()))
        {
            self.die(tick);
            events.died = true;
            events.killed_by = Some(id);
            return events;
        }

        let on_ground = self.body.on_ground(world.collidables);
        let hitting_ceiling = self.body.hitting_ceiling(world.collidables);

        if input.left {
            self.x_speed = -self.tuning.max_speed;
            self.facing = Facing::Left;
        }
        if input.right {
            self.x_speed = self.tuning.max_speed;
            self.facing = Facing::Right;
        }

        if on_ground {
            if input.jump {
                self.y_speed = self.tuning.jump_impulse();
            } else if self.y_speed > 0.0 {
                // Landed
                self.y_speed = 0.0;
            }
            if input.crouch {
                self.x_speed *= self.tuning.crouch_factor;
            }
        }

        if hitting_ceiling && self.y_speed < 0.0 {
            self.y_speed = 0.0;
        }

        if self.body.overlaps_any(world.boosters) {
            self.y_speed = self.tuning.jump_impulse() * self.tuning.booster_multiplier;
        } else if !on_ground {
            self.apply_gravity();
        }

        self.body
            .sweep_move(self.x_speed, self.y_speed, world.collidables);
        self.x_speed = 0.0;

        if input.fire && self.can_fire(tick) {
            events.fired = Some(self.fire(tick));
        }

        events
    }

    fn apply_gravity(&mut self) {
        if self.y_speed < self.tuning.terminal_velocity {
            self.y_speed =
                (self.y_speed + self.tuning.gravity_step()).min(self.tuning.terminal_velocity);
        }
    }

    pub fn can_fire(&self, tick: u64) -> bool {
        self.last_fired
            .is_none_or(|last| tick.saturating_sub(last) >= self.fire_cooldown_ticks)
    }

    fn fire(&mut self, tick: u64) -> Bullet {
        self.last_fired = Some(tick);
        Bullet::fired_from(
            self.body.rect(),
            self.facing.sign(),
            BulletOwner::Player,
            &self.bullet,
        )
    }

    /// Counts a death, stops all motion and freezes the player in place
    /// until the death pause is over.
    pub fn die(&mut self, tick: u64) {
        self.deaths += 1;
        self.x_speed = 0.0;
        self.y_speed = 0.0;
        self.life = Life::Dead {
            respawn_at: tick + self.death_pause_ticks,
        };
        log::info!("player died (deaths: {})", self.deaths);
    }

    /// Moves the player to a new level's spawn box, taking on its size, and
    /// holds it there until `resume_at`. The player keeps its identity and
    /// counters.
    pub fn relocate(&mut self, spawn: Rect, resume_at: u64) {
        self.body = Body::from_rect(spawn);
        self.respawn_point = (spawn.x.trunc(), spawn.y.trunc());
        self.teleport_to_respawn();
        self.last_fired = None;
        self.life = Life::Respawning { resume_at };
    }

    fn teleport_to_respawn(&mut self) {
        self.x_speed = 0.0;
        self.y_speed = 0.0;
        self.body
            .set_position(self.respawn_point.0, self.respawn_point.1);
    }

    pub fn has_reached_objective<O: Obstacles + ?Sized>(&self, objectives: &O) -> bool {
        self.body.overlaps_any(objectives)
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Renderable for Player {
    fn appearance(&self) -> Appearance<'_> {
        Appearance::Sprite {
            kind: SpriteKind::Player,
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

    struct World {
        collidables: Group<Scenery>,
        fatal: Group<Scenery>,
        boosters: Group<Scenery>,
        bullets: Group<Bullet>,
    }

    impl World {
        fn new() -> Self {
            Self {
                collidables: Group::new(),
                fatal: Group::new(),
                boosters: Group::new(),
                bullets: Group::new(),
            }
        }

        fn with_crate(mut self, rect: Rect) -> Self {
            self.collidables
                .insert(Scenery::new(SpriteKind::Collidable, rect));
            self
        }

        fn with_lava(mut self, rect: Rect) -> Self {
            self.fatal.insert(Scenery::new(SpriteKind::Fatal, rect));
            self
        }

        fn surroundings(&self) -> Surroundings<'_> {
            Surroundings {
                collidables: &self.collidables,
                fatal: &self.fatal,
                boosters: &self.boosters,
                bullets: &self.bullets,
            }
        }
    }

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Rect::new(x, y, 50.0, 50.0), &GameConfig::default())
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    #[test]
    fn test_player_new() {
        let player = player_at(100.0, 50.0);
        assert_eq!(player.body.position(), (100.0, 50.0));
        assert_eq!(player.respawn_point, (100.0, 50.0));
        assert_eq!(player.deaths, 0);
        assert_eq!(player.facing, Facing::Right);
        assert!(player.is_alive());
    }

    #[test]
    fn test_horizontal_speed_is_not_accumulated() {
        let world = World::new().with_crate(Rect::new(0.0, 100.0, 960.0, 100.0));
        let mut player = player_at(100.0, 50.0);
        let right = InputSnapshot {
            right: true,
            ..idle()
        };

        player.update(&right, 1, &world.surroundings());
        assert_eq!(player.body.position().0, 105.0);
        assert_eq!(player.x_speed, 0.0);

        player.update(&idle(), 2, &world.surroundings());
        assert_eq!(player.body.position().0, 105.0);
    }

    #[test]
    fn test_facing_follows_last_direction() {
        let world = World::new().with_crate(Rect::new(0.0, 100.0, 960.0, 100.0));
        let mut player = player_at(100.0, 50.0);
        let left = InputSnapshot {
            left: true,
            ..idle()
        };

        player.update(&left, 1, &world.surroundings());
        assert_eq!(player.facing, Facing::Left);
        assert_eq!(player.body.position().0, 95.0);

        player.update(&idle(), 2, &world.surroundings());
        assert_eq!(player.facing, Facing::Left);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let world = World::new().with_crate(Rect::new(0.0, 100.0, 960.0, 100.0));
        let jump = InputSnapshot {
            jump: true,
            ..idle()
        };

        let mut grounded = player_at(100.0, 50.0);
        grounded.update(&jump, 1, &world.surroundings());
        assert_eq!(grounded.y_speed, -10.0);
        assert_eq!(grounded.body.position().1, 40.0);

        let mut airborne = player_at(100.0, 0.0);
        airborne.update(&jump, 1, &world.surroundings());
        assert!(airborne.y_speed > 0.0);
    }

    #[test]
    fn test_crouch_slows_horizontal_movement() {
        let world = World::new().with_crate(Rect::new(0.0, 100.0, 960.0, 100.0));
        let mut player = player_at(100.0, 50.0);
        let crouch_walk = InputSnapshot {
            right: true,
            crouch: true,
            ..idle()
        };

        player.update(&crouch_walk, 1, &world.surroundings());
        assert_eq!(player.body.position().0, 103.0);
    }

    #[test]
    fn test_falls_and_lands_on_crate() {
        let world = World::new().with_crate(Rect::new(100.0, 200.0, 100.0, 100.0));
        let mut player = player_at(100.0, 50.0);

        for tick in 1..=120 {
            player.update(&idle(), tick, &world.surroundings());
        }

        assert_eq!(player.body.rect().bottom(), 200.0);
        assert!(player.body.on_ground(&world.collidables));
        assert_eq!(player.y_speed, 0.0);
    }

    #[test]
    fn test_ceiling_stops_upward_motion() {
        let world = World::new()
            .with_crate(Rect::new(0.0, 100.0, 960.0, 100.0))
            .with_crate(Rect::new(0.0, 0.0, 960.0, 40.0));
        let mut player = player_at(100.0, 50.0);
        let jump = InputSnapshot {
            jump: true,
            ..idle()
        };

        // Jump: 10 units up would cross the ceiling at y=40
        player.update(&jump, 1, &world.surroundings());
        assert_eq!(player.body.position().1, 40.0);

        player.update(&idle(), 2, &world.surroundings());
        assert!(player.y_speed >= 0.0);
    }

    #[test]
    fn test_fatal_contact_kills_and_respawns() {
        let world = World::new().with_lava(Rect::new(0.0, 300.0, 960.0, 100.0));
        let mut player = player_at(100.0, 50.0);
        player.body.set_position(400.0, 280.0);
        player.y_speed = 7.0;

        let events = player.update(&idle(), 10, &world.surroundings());
        assert!(events.died);
        assert_eq!(player.deaths, 1);
        assert_eq!((player.x_speed, player.y_speed), (0.0, 0.0));
        assert_eq!(player.life, Life::Dead { respawn_at: 70 });
        // Frozen where it died during the pause
        player.update(&idle(), 40, &world.surroundings());
        assert_eq!(player.body.position(), (400.0, 280.0));

        let events = player.update(&idle(), 70, &world.surroundings());
        assert!(events.respawned);
        assert!(player.is_alive());
        assert_eq!(player.body.position(), (100.0, 50.0));
        assert_eq!((player.x_speed, player.y_speed), (0.0, 0.0));
        assert_eq!(player.deaths, 1);
    }

    #[test]
    fn test_hostile_bullet_kills() {
        let mut world = World::new();
        let id = world.bullets.insert(Bullet::new(
            Body::new(110.0, 60.0, 12.0, 6.0),
            -12.0,
            BulletOwner::Enemy,
            90,
        ));
        let mut player = player_at(100.0, 50.0);

        let events = player.update(&idle(), 1, &world.surroundings());
        assert!(events.died);
        assert_eq!(events.killed_by, Some(id));
        assert_eq!(player.deaths, 1);
    }

    #[test]
    fn test_own_bullet_is_harmless() {
        let mut world = World::new();
        world.bullets.insert(Bullet::new(
            Body::new(110.0, 60.0, 12.0, 6.0),
            12.0,
            BulletOwner::Player,
            90,
        ));
        let mut player = player_at(100.0, 50.0);

        let events = player.update(&idle(), 1, &world.surroundings());
        assert!(!events.died);
    }

    #[test]
    fn test_fire_cooldown() {
        let world = World::new();
        let mut player = player_at(100.0, 50.0);
        let fire = InputSnapshot {
            fire: true,
            ..idle()
        };

        let first = player.update(&fire, 1, &world.surroundings());
        assert!(first.fired.is_some());
        assert_eq!(player.last_fired, Some(1));

        let blocked = player.update(&fire, 2, &world.surroundings());
        assert!(blocked.fired.is_none());

        // 400 ms at 60 fps
        let again = player.update(&fire, 25, &world.surroundings());
        assert!(again.fired.is_some());
    }

    #[test]
    fn test_bullet_travels_in_facing_direction() {
        let world = World::new();
        let mut player = player_at(100.0, 50.0);
        let fire_left = InputSnapshot {
            left: true,
            fire: true,
            ..idle()
        };

        let events = player.update(&fire_left, 1, &world.surroundings());
        let bullet = events.fired.unwrap();
        assert!(bullet.x_speed < 0.0);
        assert_eq!(bullet.owner, BulletOwner::Player);
        assert!(bullet.body.rect().right() <= player.body.rect().left());
    }

    #[test]
    fn test_booster_launches_upward() {
        let mut world = World::new().with_crate(Rect::new(0.0, 100.0, 960.0, 100.0));
        world.boosters.insert(Scenery::new(
            SpriteKind::Booster,
            Rect::new(90.0, 90.0, 100.0, 10.0),
        ));
        let mut player = player_at(100.0, 50.0);

        player.update(&idle(), 1, &world.surroundings());
        assert_eq!(player.y_speed, -16.0);
        assert_eq!(player.body.position().1, 34.0);
    }

    #[test]
    fn test_relocate_keeps_deaths() {
        let mut player = player_at(100.0, 50.0);
        player.die(1);
        player.relocate(Rect::new(300.0, 20.0, 50.0, 50.0), 100);

        assert_eq!(player.deaths, 1);
        assert_eq!(player.body.position(), (300.0, 20.0));
        assert_eq!(player.life, Life::Respawning { resume_at: 100 });
    }

    #[test]
    fn test_relocate_takes_new_spawn_size() {
        let mut player = player_at(100.0, 50.0);
        player.relocate(Rect::new(300.0, 20.0, 30.0, 40.0), 100);

        assert_eq!(player.body.rect(), Rect::new(300.0, 20.0, 30.0, 40.0));
        assert_eq!(player.respawn_point, (300.0, 20.0));
    }

    #[test]
    fn test_objective_overlap() {
        let player = player_at(100.0, 50.0);
        let near = vec![Rect::new(120.0, 60.0, 50.0, 50.0)];
        let far = vec![Rect::new(500.0, 60.0, 50.0, 50.0)];
        assert!(player.has_reached_objective(&near));
        assert!(!player.has_reached_objective(&far));
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_gravity_accumulates_up_to_terminal_velocity(frames in 0u64..80) {
                let world = World::new();
                let mut player = player_at(100.0, -5000.0);

                for tick in 1..=frames {
                    player.update(&idle(), tick, &world.surroundings());
                }

                let expected = (frames as f32 * 9.807 * 0.06).min(15.0);
                prop_assert!((player.y_speed - expected).abs() < 1e-3);
                prop_assert!(player.y_speed <= 15.0);
            }
        }
    }
}
