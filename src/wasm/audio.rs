use std::cell::RefCell;
use std::rc::{Rc, Weak};

use web_sys::HtmlAudioElement;

use super::assets::{describe, PromiseHook};
use super::listener::EventListener;
use crate::audio::{AudioCommand, Music};
use crate::config::AssetConfig;
use crate::error::{FieldError, Result};

/// Looping background track bound to an `<audio>` element.
pub struct Player {
    element: HtmlAudioElement,
    music: Music,
    pending: Vec<PromiseHook>,
    _error: Option<EventListener>,
}

pub type SharedPlayer = Rc<RefCell<Player>>;

fn with_player(weak: &Weak<RefCell<Player>>, f: impl FnOnce(&mut Player)) {
    if let Some(player) = weak.upgrade() {
        if let Ok(mut player) = player.try_borrow_mut() {
            f(&mut player);
        }
    }
}

impl Player {
    /// `None` when no track is configured.
    pub fn open(cfg: &AssetConfig) -> Result<Option<SharedPlayer>> {
        let Some(url) = cfg.music_url.as_deref() else {
            return Ok(None);
        };
        let element = HtmlAudioElement::new_with_src(url)?;
        element.set_loop(true);
        element.set_volume(cfg.music_volume.clamp(0.0, 1.0));

        let player = Rc::new(RefCell::new(Player {
            element: element.clone(),
            music: Music::new(true),
            pending: Vec::new(),
            _error: None,
        }));
        let weak = Rc::downgrade(&player);
        let asset = url.to_string();
        let listener = EventListener::new(&element, "error", move |_| {
            with_player(&weak, |p| {
                let reason = p
                    .element
                    .error()
                    .map_or_else(|| "unknown media error".to_string(), |e| e.message());
                let err = FieldError::AssetLoad {
                    asset: asset.clone(),
                    reason,
                };
                log::warn!("{err}; music off");
                p.music.failed();
            });
        })?;
        player.borrow_mut()._error = Some(listener);
        Ok(Some(player))
    }

    pub fn is_playing(&self) -> bool {
        self.music.is_playing()
    }
}

fn apply(player: &SharedPlayer, command: AudioCommand) {
    match command {
        AudioCommand::Play => {
            let played = player.borrow().element.play();
            let promise = match played {
                Ok(promise) => promise,
                Err(err) => {
                    log::warn!("audio play() threw: {}", describe(&err));
                    player.borrow_mut().music.play_settled(false);
                    return;
                }
            };
            let weak = Rc::downgrade(player);
            let hook = PromiseHook::attach(&promise, move |result| {
                with_player(&weak, |p| match result {
                    Ok(_) => p.music.play_settled(true),
                    Err(reason) => {
                        log::info!("music paused until toggled: {reason}");
                        p.music.play_settled(false);
                    }
                });
            });
            let mut p = player.borrow_mut();
            p.pending.retain(|hook| !hook.is_settled());
            p.pending.push(hook);
        }
        AudioCommand::Pause => {
            if let Err(err) = player.borrow().element.pause() {
                log::warn!("audio pause() threw: {}", describe(&err));
            }
        }
        AudioCommand::Nothing => {}
    }
}

pub fn autoplay(player: &SharedPlayer) {
    let command = player.borrow_mut().music.autoplay();
    apply(player, command);
}

/// Returns `true` when playback was requested.
pub fn toggle(player: &SharedPlayer) -> bool {
    let command = player.borrow_mut().music.toggle();
    apply(player, command);
    command == AudioCommand::Play
}

pub fn stop(player: &SharedPlayer) {
    let command = player.borrow_mut().music.stop();
    apply(player, command);
}
