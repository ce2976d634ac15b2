//! Background music playback state.
//!
//! Browsers may refuse to start audio without a user gesture. A refused
//! autoplay leaves the track paused; the page's toggle can start it later.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// No track configured, or it failed to load.
    Unavailable,
    /// `play()` issued, waiting for the browser's answer.
    Starting,
    Playing,
    Paused,
    /// Autoplay policy rejected the last `play()`.
    Blocked,
}

/// What the browser binding has to do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCommand {
    Play,
    Pause,
    Nothing,
}

#[derive(Debug, Clone)]
pub struct Music {
    state: Playback,
}

impl Music {
    pub fn new(available: bool) -> Self {
        Self {
            state: if available {
                Playback::Paused
            } else {
                Playback::Unavailable
            },
        }
    }

    pub fn state(&self) -> Playback {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == Playback::Playing
    }

    /// Attempt playback on mount.
    pub fn autoplay(&mut self) -> AudioCommand {
        match self.state {
            Playback::Paused | Playback::Blocked => {
                self.state = Playback::Starting;
                AudioCommand::Play
            }
            _ => AudioCommand::Nothing,
        }
    }

    /// Outcome of the promise returned by `play()`.
    pub fn play_settled(&mut self, ok: bool) {
        if self.state == Playback::Starting {
            self.state = if ok { Playback::Playing } else { Playback::Blocked };
        }
    }

    /// The user pressed the music button.
    pub fn toggle(&mut self) -> AudioCommand {
        match self.state {
            Playback::Playing | Playback::Starting => {
                self.state = Playback::Paused;
                AudioCommand::Pause
            }
            Playback::Paused | Playback::Blocked => {
                self.state = Playback::Starting;
                AudioCommand::Play
            }
            Playback::Unavailable => AudioCommand::Nothing,
        }
    }

    /// The media element reported a load error.
    pub fn failed(&mut self) {
        self.state = Playback::Unavailable;
    }

    /// Teardown: stop unconditionally.
    pub fn stop(&mut self) -> AudioCommand {
        let was_active = matches!(self.state, Playback::Playing | Playback::Starting);
        if self.state != Playback::Unavailable {
            self.state = Playback::Paused;
        }
        if was_active {
            AudioCommand::Pause
        } else {
            AudioCommand::Nothing
        }
    }
}
