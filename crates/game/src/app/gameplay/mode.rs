use std::fmt;

use tilejump_engine::LevelMode;

/// Top-level game state; the level only runs while editing or playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum GameMode {
    #[default]
    Editing,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModeEvent {
    Toggle,
    FellOut,
    Restart,
}

impl GameMode {
    pub(crate) fn level_mode(self) -> Option<LevelMode> {
        match self {
            GameMode::Editing => Some(LevelMode::Edit),
            GameMode::Playing => Some(LevelMode::Play),
            GameMode::GameOver => None,
        }
    }

    /// Next mode after `event`. Events with no edge from the current mode are ignored.
    pub(crate) fn on(self, event: ModeEvent) -> GameMode {
        match (self, event) {
            (GameMode::Editing, ModeEvent::Toggle) => GameMode::Playing,
            (GameMode::Playing, ModeEvent::Toggle) => GameMode::Editing,
            (GameMode::Playing, ModeEvent::FellOut) => GameMode::GameOver,
            (GameMode::GameOver, ModeEvent::Restart) => GameMode::Playing,
            (GameMode::GameOver, ModeEvent::Toggle) => GameMode::Editing,
            (mode, _) => mode,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameMode::Editing => "editing",
            GameMode::Playing => "playing",
            GameMode::GameOver => "game over",
        };
        f.write_str(label)
    }
}
