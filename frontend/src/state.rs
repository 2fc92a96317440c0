use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::browser::{clipboard, BrowserRecognizer, BrowserSynthesizer};
use crate::capture::{CaptureEvent, CaptureState, SessionId};
use crate::config::ClientConfig;
use crate::conversation::{Message, MessageId};
use crate::errors::ClientError;
use crate::playback::{HandleId, PlaybackEnd, PlaybackState};
use crate::session::{ChatSession, Submission};

type BrowserSession = ChatSession<BrowserSynthesizer, BrowserRecognizer>;

/// How long the copy indicator stays up.
const COPY_FEEDBACK_MS: u32 = 1_500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

/// Everything the view needs, copied out of the session after each change.
struct Snapshot {
    messages: Vec<Message>,
    draft: String,
    capture_state: CaptureState,
    playback_state: PlaybackState,
    speaking_message: Option<MessageId>,
    auto_speak: bool,
}

/// Shared application state, provided via Leptos context.
///
/// The [`ChatSession`] is the single source of truth; the signals below are
/// a render copy refreshed from it after every mutation, so a late answer
/// re-renders the whole ordered list rather than being appended.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub messages: ReadSignal<Vec<Message>>,
    pub draft: ReadSignal<String>,
    pub capture_state: ReadSignal<CaptureState>,
    pub playback_state: ReadSignal<PlaybackState>,
    pub speaking_message: ReadSignal<Option<MessageId>>,
    pub auto_speak: ReadSignal<bool>,
    pub copy_feedback: ReadSignal<Option<(MessageId, CopyOutcome)>>,
    pub notice: ReadSignal<Option<String>>,

    // --- Write signals (for mutating state) ---
    set_messages: WriteSignal<Vec<Message>>,
    set_draft: WriteSignal<String>,
    set_capture_state: WriteSignal<CaptureState>,
    set_playback_state: WriteSignal<PlaybackState>,
    set_speaking_message: WriteSignal<Option<MessageId>>,
    set_auto_speak: WriteSignal<bool>,
    set_copy_feedback: WriteSignal<Option<(MessageId, CopyOutcome)>>,
    set_notice: WriteSignal<Option<String>>,

    session: StoredValue<Option<BrowserSession>, LocalStorage>,
}

impl AppState {
    /// Create a new `AppState`, wire the browser speech engines to it, and
    /// provide it in the current Leptos context.
    pub fn provide() -> Self {
        let config = ClientConfig::default();

        let (messages, set_messages) = signal(Vec::<Message>::new());
        let (draft, set_draft) = signal(String::new());
        let (capture_state, set_capture_state) = signal(CaptureState::Idle);
        let (playback_state, set_playback_state) = signal(PlaybackState::Idle);
        let (speaking_message, set_speaking_message) = signal(None::<MessageId>);
        let (auto_speak, set_auto_speak) = signal(config.auto_speak);
        let (copy_feedback, set_copy_feedback) = signal(None::<(MessageId, CopyOutcome)>);
        let (notice, set_notice) = signal(None::<String>);

        let state = Self {
            messages,
            draft,
            capture_state,
            playback_state,
            speaking_message,
            auto_speak,
            copy_feedback,
            notice,
            set_messages,
            set_draft,
            set_capture_state,
            set_playback_state,
            set_speaking_message,
            set_auto_speak,
            set_copy_feedback,
            set_notice,
            session: StoredValue::new_local(None),
        };

        // Engine callbacks are deferred to the task queue so they never run
        // while the session is already borrowed.
        let synthesizer = BrowserSynthesizer::new(&config.speech_lang, move |handle, end| {
            spawn_local(async move { state.playback_finished(handle, end) });
        });
        let recognizer = BrowserRecognizer::new(&config.speech_lang, move |session, event| {
            spawn_local(async move { state.capture_event(session, event) });
        });
        state
            .session
            .set_value(Some(ChatSession::new(config, synthesizer, recognizer)));

        provide_context(state);
        state
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut BrowserSession) -> R) -> Option<R> {
        self.session.try_update_value(|slot| slot.as_mut().map(f)).flatten()
    }

    /// Copy the session's state into the render signals.
    fn sync(&self) {
        let snapshot = self
            .session
            .try_with_value(|slot| {
                slot.as_ref().map(|s| Snapshot {
                    messages: s.conversation().messages().to_vec(),
                    draft: s.draft().to_string(),
                    capture_state: s.capture_state(),
                    playback_state: s.playback_state(),
                    speaking_message: s.speaking_message(),
                    auto_speak: s.config().auto_speak,
                })
            })
            .flatten();
        let Some(snapshot) = snapshot else {
            return;
        };

        self.set_messages.set(snapshot.messages);
        if self.draft.get_untracked() != snapshot.draft {
            self.set_draft.set(snapshot.draft);
        }
        self.set_capture_state.set(snapshot.capture_state);
        self.set_playback_state.set(snapshot.playback_state);
        self.set_speaking_message.set(snapshot.speaking_message);
        self.set_auto_speak.set(snapshot.auto_speak);
    }

    fn show_notice(&self, err: &ClientError) {
        log::warn!("{err}");
        self.set_notice.set(Some(err.to_string()));
    }

    pub fn dismiss_notice(&self) {
        self.set_notice.set(None);
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn set_draft(&self, text: String) {
        self.with_session(|s| s.set_draft(text.clone()));
        self.set_draft.set(text);
    }

    /// Send whatever is in the input box. Blank input is ignored.
    pub fn send_draft(&self) {
        match self.with_session(|s| s.submit_draft()) {
            Some(Ok(submission)) => {
                self.sync();
                self.dispatch(submission);
            }
            Some(Err(err)) => log::debug!("Not sending: {err}"),
            None => {}
        }
    }

    /// Fire the relay request; its answer is applied to the placeholder it was
    /// created for, whenever it arrives.
    fn dispatch(&self, submission: Submission) {
        let state = *self;
        let Some(api_base) = self.with_session(|s| s.config().api_base.clone()) else {
            return;
        };

        spawn_local(async move {
            let outcome = api::ask(&api_base, &submission.message).await;
            if let Some(Err(err)) = state.with_session(|s| s.complete(submission.placeholder, outcome)) {
                state.show_notice(&err);
            }
            state.sync();
        });
    }

    // ── Speech input ─────────────────────────────────────────────────────────

    pub fn toggle_capture(&self) {
        let result = self.with_session(|s| {
            if s.capture_state() == CaptureState::Idle {
                s.start_capture().map(|_| ())
            } else {
                s.cancel_capture();
                Ok(())
            }
        });
        if let Some(Err(err)) = result {
            self.show_notice(&err);
        }
        self.sync();
    }

    fn capture_event(&self, session: SessionId, event: CaptureEvent) {
        match self.with_session(|s| s.capture_event(session, event)) {
            Some(Ok(Some(submission))) => {
                self.sync();
                self.dispatch(submission);
            }
            Some(Err(err)) => {
                self.show_notice(&err);
                self.sync();
            }
            _ => self.sync(),
        }
    }

    // ── Speech output ────────────────────────────────────────────────────────

    pub fn speak(&self, id: MessageId) {
        if let Some(Err(err)) = self.with_session(|s| s.speak(id)) {
            self.show_notice(&err);
        }
        self.sync();
    }

    pub fn stop_playback(&self) {
        self.with_session(|s| s.stop_playback());
        self.sync();
    }

    pub fn set_auto_speak(&self, enabled: bool) {
        self.with_session(|s| s.set_auto_speak(enabled));
        self.sync();
    }

    fn playback_finished(&self, handle: HandleId, end: PlaybackEnd) {
        if let Some(Err(err)) = self.with_session(|s| s.playback_finished(handle, end)) {
            self.show_notice(&err);
        }
        self.sync();
    }

    // ── Clipboard ────────────────────────────────────────────────────────────

    pub fn copy(&self, id: MessageId) {
        let Some(text) = self.with_session(|s| s.copy_text(id)).flatten() else {
            return;
        };
        let state = *self;

        spawn_local(async move {
            let outcome = match clipboard::write_text(&text).await {
                Ok(()) => CopyOutcome::Copied,
                Err(err) => {
                    log::warn!("{err}");
                    CopyOutcome::Failed
                }
            };
            state.set_copy_feedback.set(Some((id, outcome)));

            TimeoutFuture::new(COPY_FEEDBACK_MS).await;
            if state.copy_feedback.get_untracked() == Some((id, outcome)) {
                state.set_copy_feedback.set(None);
            }
        });
    }
}
