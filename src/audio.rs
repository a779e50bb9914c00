use color_eyre::{Result, eyre::WrapErr};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, source::Buffered};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::SoundPaths;
use crate::game::FrameEvents;

type SoundBuffer = Buffered<Decoder<BufReader<File>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Fire,
    Death,
    LevelComplete,
}

impl Sound {
    /// Sounds to play for what happened during a frame.
    pub fn for_events(events: &FrameEvents) -> Vec<Sound> {
        let mut sounds = Vec::new();
        if events.fired {
            sounds.push(Sound::Fire);
        }
        if events.died {
            sounds.push(Sound::Death);
        }
        if events.level_complete {
            sounds.push(Sound::LevelComplete);
        }
        sounds
    }

    fn volume(&self) -> f32 {
        match self {
            Sound::Fire => 0.1,
            Sound::Death => 0.4,
            Sound::LevelComplete => 0.4,
        }
    }
}

/// Audio manager for playing sound effects. Sound is optional: without an
/// output device or sound files the game simply runs silent.
pub struct AudioManager {
    output: Option<(OutputStream, OutputStreamHandle)>,
    fire: Option<SoundBuffer>,
    death: Option<SoundBuffer>,
    level_complete: Option<SoundBuffer>,
}

impl AudioManager {
    /// Opens the default output device and pre-loads every sound. Failures
    /// are logged and leave the affected sound (or all sound) disabled.
    pub fn new(paths: &SoundPaths) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                log::warn!("no audio output, continuing without sound: {err}");
                return Self::disabled();
            }
        };

        Self {
            output,
            fire: load_or_warn(&paths.fire),
            death: load_or_warn(&paths.death),
            level_complete: load_or_warn(&paths.level_complete),
        }
    }

    /// An audio manager that never plays anything.
    pub fn disabled() -> Self {
        Self {
            output: None,
            fire: None,
            death: None,
            level_complete: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some()
    }

    pub fn play(&self, sound: Sound) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        let buffer = match sound {
            Sound::Fire => &self.fire,
            Sound::Death => &self.death,
            Sound::LevelComplete => &self.level_complete,
        };

        // Playback errors are not worth interrupting the game for
        if let Some(buffer) = buffer
            && let Ok(sink) = Sink::try_new(handle)
        {
            sink.set_volume(sound.volume());
            sink.append(buffer.clone());
            sink.detach();
        }
    }

    pub fn play_events(&self, events: &FrameEvents) {
        for sound in Sound::for_events(events) {
            self.play(sound);
        }
    }
}

fn load_sound(path: &Path) -> Result<SoundBuffer> {
    let file =
        File::open(path).wrap_err_with(|| format!("failed to open sound {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .wrap_err_with(|| format!("failed to decode sound {}", path.display()))?;
    Ok(source.buffered())
}

fn load_or_warn(path: &Path) -> Option<SoundBuffer> {
    match load_sound(path) {
        Ok(buffer) => Some(buffer),
        Err(err) => {
            log::warn!("{err:#}");
            None
        }
    }
}
