/// The levels and sprites that ship with the game must load the same way
/// `main` loads them.
use poopland::{AssetCache, Game, GameConfig, InputSnapshot, LevelSet};
use std::path::{Path, PathBuf};

fn root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn shipped_config() -> GameConfig {
    let mut config = GameConfig::default();
    let sprites = &mut config.sprites;
    for path in [
        &mut sprites.player,
        &mut sprites.enemy,
        &mut sprites.collidable,
        &mut sprites.objective,
        &mut sprites.fatal,
        &mut sprites.booster,
    ] {
        *path = root().join(&*path);
    }
    config
}

#[test]
fn test_shipped_levels_load() {
    let levels = LevelSet::load_dir(&root().join("levels")).unwrap();
    assert_eq!(levels.max_level_id(), 3);
}

#[test]
fn test_shipped_sprites_load_for_every_level() {
    let levels = LevelSet::load_dir(&root().join("levels")).unwrap();
    let mut assets = AssetCache::new();

    let mut game = Game::new(shipped_config(), &levels, &mut assets).unwrap();

    assert!(!assets.is_empty());
    let skip = InputSnapshot {
        skip_level: true,
        ..Default::default()
    };
    for expected in 2..=3 {
        // Levels start with a short pause before play resumes
        while !game.player().is_alive() {
            game.update(&InputSnapshot::default());
        }
        game.update(&skip);
        assert_eq!(game.level_id(), expected);
    }
}

#[test]
fn test_shipped_enemies_keep_to_their_ground() {
    let levels = LevelSet::load_dir(&root().join("levels")).unwrap();
    let mut config = shipped_config();
    config.enemy.fire_chance = 0.0;
    let mut game = Game::new(config, &levels, &mut AssetCache::new())
        .unwrap()
        .with_seed(7);
    let idle = InputSnapshot::default();
    let skip = InputSnapshot {
        skip_level: true,
        ..Default::default()
    };

    for level in 2..=3 {
        while !game.player().is_alive() {
            game.update(&idle);
        }
        game.update(&skip);
        assert_eq!(game.level_id(), level);

        let placed = game.enemies().len();
        assert!(placed > 0);
        for _ in 0..600 {
            game.update(&idle);
        }
        assert_eq!(game.enemies().len(), placed, "level {level}");
    }
}

#[test]
fn test_sample_config_parses() {
    let path: PathBuf = root().join("platformer.ron");
    let config = GameConfig::load(&path).unwrap();
    assert_eq!(config.fps, 60);
    assert_eq!(config.levels_dir, PathBuf::from("levels"));
}
