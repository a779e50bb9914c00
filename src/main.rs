use color_eyre::{Result, eyre::WrapErr};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::stdout;
use std::path::Path;

use poopland::{
    App, AssetCache, AudioManager, CONFIG_FILE, Game, GameConfig, InputManager, LevelSet,
};

/// The terminal belongs to the game, so logs go to a file instead.
fn init_logging() -> Result<()> {
    let log_file = File::create("debug.log").wrap_err("failed to create debug.log")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging()?;

    // Everything that can fail on bad content happens before the terminal
    // is taken over
    let config = GameConfig::load(Path::new(CONFIG_FILE))?;
    let levels = LevelSet::load_dir(&config.levels_dir)?;
    let mut assets = AssetCache::new();
    let game = Game::new(config, &levels, &mut assets)?;
    log::info!("{} sprite(s) loaded", assets.len());
    let audio = AudioManager::new(&game.config().sounds);

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    log::info!("keyboard enhancement supported: {supports_keyboard_enhancement}");

    // Setup terminal manually for full control
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Enable keyboard enhancement AFTER entering alternate screen
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let input = InputManager::new(supports_keyboard_enhancement);
    let result = App::new(game, input, audio).run(&mut terminal);

    // Cleanup
    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
