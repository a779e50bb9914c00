//! Level files: one RON document per level, `levels/<id>.ron`, ids counting
//! up from 1.

use color_eyre::{Result, eyre::WrapErr, eyre::eyre};
use ron::Options;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::entities::Rect;

/// Sizes used when a placement leaves width or height out.
pub mod default_size {
    pub const PLAYER: (f32, f32) = (50.0, 50.0);
    pub const ENEMY: (f32, f32) = (50.0, 50.0);
    pub const COLLIDABLE: (f32, f32) = (100.0, 100.0);
    pub const FATAL: (f32, f32) = (960.0, 100.0);
    pub const OBJECTIVE: (f32, f32) = (50.0, 50.0);
    pub const BOOSTER: (f32, f32) = (100.0, 20.0);
}

/// RON options shared by every file the game reads. `width: 100` is
/// accepted for an optional field without wrapping it in `Some(..)`.
pub(crate) fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// One entity's placement in a level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    /// Draw the bounding box outline for this entity
    #[serde(default)]
    pub hitbox: bool,
}

impl Placement {
    pub fn rect(&self, default: (f32, f32)) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.width.unwrap_or(default.0),
            self.height.unwrap_or(default.1),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelLayout {
    pub player: Placement,
    #[serde(default)]
    pub enemies: Vec<Placement>,
    #[serde(default)]
    pub collidables: Vec<Placement>,
    #[serde(default)]
    pub fatal: Vec<Placement>,
    #[serde(default)]
    pub objectives: Vec<Placement>,
    #[serde(default)]
    pub boosters: Vec<Placement>,
}

impl LevelLayout {
    pub fn from_ron(contents: &str) -> Result<Self> {
        Ok(ron_options().from_str(contents)?)
    }

    pub fn player_spawn(&self) -> Rect {
        self.player.rect(default_size::PLAYER)
    }
}

/// Every level of the game, loaded and parsed up front.
#[derive(Debug, Clone)]
pub struct LevelSet {
    levels: Vec<LevelLayout>,
}

impl LevelSet {
    /// Level 1 is the first layout.
    pub fn from_layouts(levels: Vec<LevelLayout>) -> Result<Self> {
        if levels.is_empty() {
            return Err(eyre!("a game needs at least one level"));
        }
        Ok(Self { levels })
    }

    /// Loads `<dir>/1.ron`, `<dir>/2.ron`, ... up to the first missing id.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let ids = discover_level_ids(dir)?;
        let max_level_id = contiguous_max(&ids);
        if max_level_id == 0 {
            return Err(eyre!("no level 1 found in {}", dir.display()));
        }
        if let Some(stray) = ids.iter().find(|&&id| id > max_level_id) {
            log::warn!(
                "level {} in {} is unreachable: level {} is missing",
                stray,
                dir.display(),
                max_level_id + 1
            );
        }

        let mut levels = Vec::with_capacity(max_level_id as usize);
        for id in 1..=max_level_id {
            let path = dir.join(format!("{id}.ron"));
            let contents = fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read level {}", path.display()))?;
            let layout = LevelLayout::from_ron(&contents)
                .wrap_err_with(|| format!("failed to parse level {}", path.display()))?;
            levels.push(layout);
        }

        log::info!("loaded {} level(s) from {}", levels.len(), dir.display());
        Self::from_layouts(levels)
    }

    pub fn max_level_id(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn get(&self, id: u32) -> Option<&LevelLayout> {
        id.checked_sub(1)
            .and_then(|index| self.levels.get(index as usize))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelLayout> {
        self.levels.iter()
    }
}

/// Ids of every `<n>.ron` file in `dir`, sorted.
pub fn discover_level_ids(dir: &Path) -> Result<Vec<u32>> {
    let entries = fs::read_dir(dir)
        .wrap_err_with(|| format!("failed to read level directory {}", dir.display()))?;

    let mut ids = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "ron")
            && let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u32>().ok())
        {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Largest n such that 1..=n are all present in sorted `ids`.
fn contiguous_max(ids: &[u32]) -> u32 {
    let mut max = 0;
    for &id in ids {
        if id == max + 1 {
            max = id;
        } else if id > max + 1 {
            break;
        }
    }
    max
}
