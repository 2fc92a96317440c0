//! Speech output: at most one utterance at a time.

use crate::conversation::MessageId;
use crate::errors::ClientError;

pub type HandleId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
}

/// How an utterance ended, as reported by the speech engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEnd {
    Completed,
    Failed(String),
}

/// A text-to-speech engine. `speak` starts one utterance tagged with
/// `handle`; the engine reports its end back through whatever channel the
/// owner wired up, quoting the same handle.
pub trait SpeechOutput {
    fn speak(&mut self, handle: HandleId, text: &str) -> Result<(), ClientError>;
    fn cancel(&mut self);
}

/// The currently speaking utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackHandle {
    pub id: HandleId,
    /// Message being read, if the utterance belongs to one.
    pub message: Option<MessageId>,
}

pub struct Playback<O> {
    output: O,
    active: Option<PlaybackHandle>,
    next_handle: HandleId,
}

impl<O: SpeechOutput> Playback<O> {
    pub fn new(output: O) -> Self {
        Self { output, active: None, next_handle: 1 }
    }

    pub fn state(&self) -> PlaybackState {
        if self.active.is_some() {
            PlaybackState::Speaking
        } else {
            PlaybackState::Idle
        }
    }

    pub fn active(&self) -> Option<PlaybackHandle> {
        self.active
    }

    #[cfg(test)]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Starts reading `text`, cancelling whatever was playing first.
    pub fn start(&mut self, text: &str, message: Option<MessageId>) -> Result<HandleId, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::Playback("nothing to speak".to_string()));
        }
        self.stop();

        let id = self.next_handle;
        self.next_handle += 1;
        self.output.speak(id, text)?;
        self.active = Some(PlaybackHandle { id, message });
        log::debug!("Playback {id} started");
        Ok(id)
    }

    /// Cancels the active utterance. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            log::debug!("Playback {} cancelled", handle.id);
            self.output.cancel();
        }
    }

    /// Applies an end report from the engine. Reports for anything but the
    /// active handle are stale (a cancelled utterance) and ignored.
    pub fn finished(&mut self, handle: HandleId, end: &PlaybackEnd) -> bool {
        match self.active {
            Some(active) if active.id == handle => {
                self.active = None;
                if let PlaybackEnd::Failed(reason) = end {
                    log::warn!("Playback {handle} failed: {reason}");
                }
                true
            }
            _ => false,
        }
    }
}
