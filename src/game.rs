//! The playing field: one level's entity groups plus the player, advanced a
//! frame at a time. Nothing here touches the terminal, so the whole game can
//! be driven from tests.

use color_eyre::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::style::Color;

use crate::assets::ImageProvider;
use crate::config::GameConfig;
use crate::entities::{
    Appearance, Bullet, BulletOwner, Enemy, GameState, Group, Life, Player, Rect, Renderable,
    Scenery, Sprite, SpriteKind, Surroundings,
};
use crate::input::InputSnapshot;
use crate::level::{LevelLayout, LevelSet, Placement, default_size};
use crate::renderer::Canvas;

/// What happened during a frame, for sound effects and logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvents {
    pub fired: bool,
    pub died: bool,
    pub level_complete: bool,
    /// The final level's objective was reached
    pub game_complete: bool,
}

/// A level with every sprite resolved, ready to be stamped into the groups.
#[derive(Debug, Clone)]
struct Blueprint {
    spawn: Rect,
    player_sprite: Sprite,
    collidables: Vec<Scenery>,
    fatal: Vec<Scenery>,
    objectives: Vec<Scenery>,
    boosters: Vec<Scenery>,
    enemies: Vec<Enemy>,
}

impl Blueprint {
    fn build(
        layout: &LevelLayout,
        config: &GameConfig,
        images: &mut impl ImageProvider,
    ) -> Result<Self> {
        let mut scenery = |placements: &[Placement], kind: SpriteKind, size: (f32, f32)| {
            placements
                .iter()
                .map(|placement| {
                    let rect = placement.rect(size);
                    let sprite = load_sprite(config, images, kind, rect, placement.hitbox)?;
                    Ok(Scenery::new(kind, rect).with_sprite(sprite))
                })
                .collect::<Result<Vec<_>>>()
        };

        let collidables = scenery(
            &layout.collidables,
            SpriteKind::Collidable,
            default_size::COLLIDABLE,
        )?;
        let fatal = scenery(&layout.fatal, SpriteKind::Fatal, default_size::FATAL)?;
        let objectives = scenery(
            &layout.objectives,
            SpriteKind::Objective,
            default_size::OBJECTIVE,
        )?;
        let boosters = scenery(&layout.boosters, SpriteKind::Booster, default_size::BOOSTER)?;

        let enemies = layout
            .enemies
            .iter()
            .map(|placement| {
                let rect = placement.rect(default_size::ENEMY);
                let sprite =
                    load_sprite(config, images, SpriteKind::Enemy, rect, placement.hitbox)?;
                Ok(Enemy::new(rect, config).with_sprite(sprite))
            })
            .collect::<Result<Vec<_>>>()?;

        let spawn = layout.player_spawn();
        let player_sprite = load_sprite(
            config,
            images,
            SpriteKind::Player,
            spawn,
            layout.player.hitbox,
        )?;

        Ok(Self {
            spawn,
            player_sprite,
            collidables,
            fatal,
            objectives,
            boosters,
            enemies,
        })
    }
}

fn load_sprite(
    config: &GameConfig,
    images: &mut impl ImageProvider,
    kind: SpriteKind,
    rect: Rect,
    hitbox: bool,
) -> Result<Sprite> {
    let image = images.get_image(
        config.sprites.path(kind),
        rect.width as u32,
        rect.height as u32,
    )?;
    Ok(Sprite::new(Some(image), hitbox || config.show_hitboxes))
}

pub struct Game {
    config: GameConfig,
    blueprints: Vec<Blueprint>,
    state: GameState,
    level_id: u32,
    tick: u64,
    player: Player,
    collidables: Group<Scenery>,
    fatal: Group<Scenery>,
    objectives: Group<Scenery>,
    boosters: Group<Scenery>,
    enemies: Group<Enemy>,
    bullets: Group<Bullet>,
    rng: StdRng,
}

impl Game {
    /// Builds every level up front, fetching each sprite through `images`,
    /// so a missing asset fails here rather than in the middle of play.
    pub fn new(
        config: GameConfig,
        levels: &LevelSet,
        images: &mut impl ImageProvider,
    ) -> Result<Self> {
        let blueprints = levels
            .iter()
            .map(|layout| Blueprint::build(layout, &config, images))
            .collect::<Result<Vec<_>>>()?;

        let first = blueprints
            .first()
            .ok_or_else(|| color_eyre::eyre::eyre!("a game needs at least one level"))?;
        let player =
            Player::new(first.spawn, &config).with_sprite(first.player_sprite.clone());
        let mut game = Self {
            config,
            blueprints,
            state: GameState::Playing,
            level_id: 1,
            tick: 0,
            player,
            collidables: Group::new(),
            fatal: Group::new(),
            objectives: Group::new(),
            boosters: Group::new(),
            enemies: Group::new(),
            bullets: Group::new(),
            rng: StdRng::from_os_rng(),
        };
        game.load_level(1);
        Ok(game)
    }

    /// Replaces the random source enemies fire with.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.state = GameState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Playing;
        }
    }

    /// Starts over from level 1 with a fresh player.
    pub fn restart(&mut self) {
        let first = &self.blueprints[0];
        self.player =
            Player::new(first.spawn, &self.config).with_sprite(first.player_sprite.clone());
        self.state = GameState::Playing;
        self.load_level(1);
        log::info!("game restarted");
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn max_level_id(&self) -> u32 {
        self.blueprints.len() as u32
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &Group<Enemy> {
        &self.enemies
    }

    pub fn bullets(&self) -> &Group<Bullet> {
        &self.bullets
    }

    pub fn collidables(&self) -> &Group<Scenery> {
        &self.collidables
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Tears down the current groups and stamps level `id` into fresh ones.
    fn load_level(&mut self, id: u32) {
        let Some(blueprint) = id
            .checked_sub(1)
            .and_then(|index| self.blueprints.get(index as usize))
        else {
            return;
        };

        self.collidables = blueprint.collidables.iter().cloned().collect();
        self.fatal = blueprint.fatal.iter().cloned().collect();
        self.objectives = blueprint.objectives.iter().cloned().collect();
        self.boosters = blueprint.boosters.iter().cloned().collect();
        self.enemies = blueprint.enemies.iter().cloned().collect();
        self.bullets.clear();
        self.level_id = id;

        log::info!(
            "level {} loaded: {} collidables, {} hazards, {} objectives, {} enemies",
            id,
            self.collidables.len(),
            self.fatal.len(),
            self.objectives.len(),
            self.enemies.len()
        );
    }

    /// Moves on to the next level, or finishes the game after the last one.
    fn advance_level(&mut self, events: &mut FrameEvents) {
        events.level_complete = true;

        if self.level_id >= self.max_level_id() {
            self.state = GameState::Complete;
            events.game_complete = true;
            log::info!("final level complete with {} death(s)", self.player.deaths);
            return;
        }

        let next = self.level_id + 1;
        self.load_level(next);
        let blueprint = &self.blueprints[(next - 1) as usize];
        self.player.sprite = blueprint.player_sprite.clone();
        self.player.relocate(blueprint.spawn, self.tick + self.config.level_pause_ticks());
    }

    /// Advances the game by one frame: enemies, then the player, then
    /// bullets. While the player is dead or respawning the rest of the world
    /// stays frozen.
    pub fn update(&mut self, input: &InputSnapshot) -> FrameEvents {
        let mut events = FrameEvents::default();
        if self.state != GameState::Playing {
            return events;
        }
        self.tick += 1;

        if !self.player.is_alive() {
            let world = Surroundings {
                collidables: &self.collidables,
                fatal: &self.fatal,
                boosters: &self.boosters,
                bullets: &self.bullets,
            };
            self.player.update(input, self.tick, &world);
            return events;
        }

        if input.skip_level {
            log::info!("skipping level {}", self.level_id);
            self.advance_level(&mut events);
            return events;
        }

        self.update_enemies();

        let player_events = self.player.update(
            input,
            self.tick,
            &Surroundings {
                collidables: &self.collidables,
                fatal: &self.fatal,
                boosters: &self.boosters,
                bullets: &self.bullets,
            },
        );
        if let Some(id) = player_events.killed_by {
            self.bullets.remove(id);
        }
        if let Some(bullet) = player_events.fired {
            self.bullets.insert(bullet);
            events.fired = true;
        }
        events.died = player_events.died;

        if self.player.is_alive() && self.player.has_reached_objective(&self.objectives) {
            self.advance_level(&mut events);
            return events;
        }

        self.update_bullets();
        events
    }

    fn update_enemies(&mut self) {
        let target = self.player.body.rect();
        let (width, height, margin) = self.playfield();
        let mut lost = Vec::new();

        for (id, enemy) in self.enemies.iter_mut() {
            if let Some(bullet) = enemy.update(&self.collidables, &self.fatal, target, &mut self.rng)
            {
                self.bullets.insert(bullet);
            }
            if outside_playfield(enemy.body.rect(), width, height, margin) {
                lost.push(id);
            }
        }

        if !lost.is_empty() {
            log::debug!("{} enemy(s) left the playfield", lost.len());
        }
        self.enemies.remove_all(lost);
    }

    fn update_bullets(&mut self) {
        let (width, height, margin) = self.playfield();
        let mut spent = Vec::new();
        let mut defeated = Vec::new();

        for (id, bullet) in self.bullets.iter_mut() {
            bullet.update(&self.collidables);
            if bullet.is_spent(width, height, margin) {
                spent.push(id);
                continue;
            }

            if bullet.owner == BulletOwner::Player {
                let hit = self.enemies.iter().find(|(enemy_id, enemy)| {
                    !defeated.contains(enemy_id) && enemy.body.rect().overlaps(&bullet.body.rect())
                });
                if let Some((enemy_id, _)) = hit {
                    spent.push(id);
                    defeated.push(enemy_id);
                }
            }
        }

        if !defeated.is_empty() {
            log::debug!("{} enemy(s) shot down", defeated.len());
        }
        self.bullets.remove_all(spent);
        self.enemies.remove_all(defeated);
    }

    /// Playfield size and the cull margin around it.
    fn playfield(&self) -> (f32, f32, f32) {
        (
            self.config.screen_width,
            self.config.screen_height,
            self.config.cull_margin,
        )
    }

    /// Issues draw calls back to front: collidables, boosters, hazards,
    /// objectives, bullets, enemies and finally the player.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for scenery in self.collidables.values() {
            draw(canvas, scenery);
        }
        for booster in self.boosters.values() {
            draw(canvas, booster);
        }
        for hazard in self.fatal.values() {
            draw(canvas, hazard);
        }
        for objective in self.objectives.values() {
            draw(canvas, objective);
        }
        for bullet in self.bullets.values() {
            draw(canvas, bullet);
        }
        for enemy in self.enemies.values() {
            draw(canvas, enemy);
        }
        draw(canvas, &self.player);

        if let Life::Respawning { .. } = self.player.life {
            let title = format!("Level {}", self.level_id);
            canvas.text(
                self.config.screen_width / 2.0,
                self.config.screen_height / 3.0,
                &title,
                Color::Yellow,
            );
        }
    }
}

fn outside_playfield(rect: Rect, width: f32, height: f32, margin: f32) -> bool {
    rect.x < -margin || rect.x > width + margin || rect.y < -margin || rect.y > height + margin
}

fn draw<C: Canvas + ?Sized, E: Renderable>(canvas: &mut C, entity: &E) {
    let rect = entity.bounds();
    match entity.appearance() {
        Appearance::Sprite {
            image: Some(image),
            mirrored,
            ..
        } => canvas.blit(image, rect, mirrored),
        Appearance::Sprite {
            kind, image: None, ..
        } => canvas.fill_rect(rect, kind.fallback_color()),
        Appearance::Fill(color) => canvas.fill_rect(rect, color),
    }
    if entity.show_hitbox() {
        canvas.stroke_rect(rect, Color::Red);
    }
}
