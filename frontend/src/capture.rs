//! Speech input: idle → listening → transcribing → idle.

use crate::errors::ClientError;

pub type SessionId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Listening,
    Transcribing,
}

/// Terminal and intermediate reports from a recognition session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A final transcript.
    Final(String),
    /// Permission denied, no speech, network, ...
    Error(String),
    /// The engine stopped on its own (timeout, silence).
    Ended,
}

/// A speech-recognition engine. `start` begins continuous capture for
/// `session`; events come back tagged with the same session.
pub trait SpeechInput {
    fn start(&mut self, session: SessionId) -> Result<(), ClientError>;
    fn stop(&mut self);
}

pub struct Capture<I> {
    input: I,
    state: CaptureState,
    session: Option<SessionId>,
    next_session: SessionId,
}

impl<I: SpeechInput> Capture<I> {
    pub fn new(input: I) -> Self {
        Self { input, state: CaptureState::Idle, session: None, next_session: 1 }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    #[cfg(test)]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Begins listening. Returns `Ok(false)` without doing anything if a
    /// session is already running.
    pub fn start(&mut self) -> Result<bool, ClientError> {
        if self.state != CaptureState::Idle {
            log::debug!("Capture already active, ignoring start");
            return Ok(false);
        }
        let session = self.next_session;
        self.next_session += 1;
        self.input.start(session)?;
        self.session = Some(session);
        self.state = CaptureState::Listening;
        log::debug!("Capture session {session} listening");
        Ok(true)
    }

    /// User cancellation: back to idle, nothing submitted.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            self.input.stop();
        }
        self.state = CaptureState::Idle;
    }

    /// Applies an engine event. A final transcript moves the machine to
    /// `Transcribing` and is returned; the caller hands it on and then calls
    /// [`Capture::finish_transcription`]. Errors and engine stops return to
    /// idle. Events from old sessions are ignored.
    pub fn handle(
        &mut self,
        session: SessionId,
        event: CaptureEvent,
    ) -> Result<Option<String>, ClientError> {
        if self.session != Some(session) || self.state != CaptureState::Listening {
            log::debug!("Ignoring event from stale capture session {session}");
            return Ok(None);
        }

        match event {
            CaptureEvent::Final(transcript) => {
                let transcript = transcript.trim().to_string();
                if transcript.is_empty() {
                    return Ok(None);
                }
                self.state = CaptureState::Transcribing;
                self.session = None;
                self.input.stop();
                Ok(Some(transcript))
            }
            CaptureEvent::Error(reason) => {
                self.cancel();
                Err(ClientError::Capture(reason))
            }
            CaptureEvent::Ended => {
                self.cancel();
                Ok(None)
            }
        }
    }

    pub fn finish_transcription(&mut self) {
        if self.state == CaptureState::Transcribing {
            self.state = CaptureState::Idle;
        }
    }
}
