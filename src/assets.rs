//! Load state of the external resources the scene can use.
//!
//! None of these is required. A failed font hides captions, a failed logo
//! hides the sprite, and the animation keeps running either way.

use crate::config::AssetConfig;
use crate::error::FieldError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState {
    /// Not configured.
    Absent,
    Pending,
    Ready,
    Failed(String),
}

impl AssetState {
    fn requested(url: &Option<String>) -> Self {
        match url {
            Some(_) => AssetState::Pending,
            None => AssetState::Absent,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AssetState::Ready)
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, AssetState::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assets {
    pub font: AssetState,
    pub logo: AssetState,
    pub music: AssetState,
}

impl Assets {
    pub fn new(cfg: &AssetConfig) -> Self {
        Self {
            // Without a URL the family is expected to be installed or
            // declared by the page, so it is usable right away.
            font: match cfg.font_url {
                Some(_) => AssetState::Pending,
                None => AssetState::Ready,
            },
            logo: AssetState::requested(&cfg.logo_url),
            music: AssetState::requested(&cfg.music_url),
        }
    }

    /// Captions are drawn only with their font in place.
    pub fn text_enabled(&self) -> bool {
        self.font.is_ready()
    }

    pub fn logo_enabled(&self) -> bool {
        self.logo.is_ready()
    }

    /// The frame loop waits for the font to either load or fail.
    pub fn ready_to_start(&self) -> bool {
        self.font.is_settled()
    }

    pub fn settle(slot: &mut AssetState, result: Result<(), FieldError>) {
        *slot = match result {
            Ok(()) => AssetState::Ready,
            Err(FieldError::AssetLoad { reason, .. }) => AssetState::Failed(reason),
            Err(err) => AssetState::Failed(err.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_starts_immediately() {
        let assets = Assets::new(&AssetConfig::default());
        assert!(assets.ready_to_start());
        assert!(assets.text_enabled());
        assert_eq!(assets.logo, AssetState::Absent);
        assert_eq!(assets.music, AssetState::Absent);
    }

    #[test]
    fn font_failure_degrades_text_but_starts() {
        let cfg = AssetConfig {
            font_url: Some("url(missing.woff2)".into()),
            ..AssetConfig::default()
        };
        let mut assets = Assets::new(&cfg);
        assert!(!assets.ready_to_start());
        Assets::settle(
            &mut assets.font,
            Err(FieldError::AssetLoad {
                asset: "Love".into(),
                reason: "404".into(),
            }),
        );
        assert!(assets.ready_to_start());
        assert!(!assets.text_enabled());
        assert_eq!(assets.font, AssetState::Failed("404".into()));
    }

    #[test]
    fn logo_follows_its_own_state() {
        let cfg = AssetConfig {
            logo_url: Some("images/logo.png".into()),
            ..AssetConfig::default()
        };
        let mut assets = Assets::new(&cfg);
        assert!(!assets.logo_enabled());
        Assets::settle(&mut assets.logo, Ok(()));
        assert!(assets.logo_enabled());
    }

    #[test]
    fn other_errors_keep_their_message() {
        let mut slot = AssetState::Pending;
        Assets::settle(&mut slot, Err(FieldError::Js("no FontFace".into())));
        assert_eq!(slot, AssetState::Failed("browser call failed: no FontFace".into()));
        assert!(slot.is_settled());
    }
}
