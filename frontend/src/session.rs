//! `ChatSession` owns everything that changes during a page session: the
//! conversation, the input draft, speech playback and speech capture.
//!
//! It is deliberately free of browser types. The UI layer feeds it user
//! actions and engine/network completions, then re-renders from its state.

use crate::capture::{Capture, CaptureEvent, CaptureState, SessionId, SpeechInput};
use crate::config::ClientConfig;
use crate::conversation::{Conversation, MessageId, MessageStatus};
use crate::errors::ClientError;
use crate::models::AskResponse;
use crate::playback::{HandleId, Playback, PlaybackEnd, PlaybackState, SpeechOutput};

/// A request the caller must send to the relay, and the placeholder its
/// answer belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub placeholder: MessageId,
    pub message: String,
}

/// Text shown in a failed bubble.
pub fn failure_text(err: &ClientError) -> String {
    format!("⚠️ Sorry, I couldn't get an answer ({err}). Please try again.")
}

pub struct ChatSession<O, I> {
    config: ClientConfig,
    conversation: Conversation,
    draft: String,
    playback: Playback<O>,
    capture: Capture<I>,
}

impl<O: SpeechOutput, I: SpeechInput> ChatSession<O, I> {
    pub fn new(config: ClientConfig, output: O, input: I) -> Self {
        Self {
            config,
            conversation: Conversation::new(),
            draft: String::new(),
            playback: Playback::new(output),
            capture: Capture::new(input),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn set_auto_speak(&mut self, enabled: bool) {
        self.config.auto_speak = enabled;
        if !enabled {
            self.playback.stop();
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Message currently being read aloud, if any.
    pub fn speaking_message(&self) -> Option<MessageId> {
        self.playback.active().and_then(|h| h.message)
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    // ── Conversation ─────────────────────────────────────────────────────────

    /// Appends the question and its pending placeholder. Blank text is
    /// rejected and leaves the conversation untouched.
    pub fn submit(&mut self, text: &str) -> Result<Submission, ClientError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ClientError::InvalidRequest);
        }
        let exchange = self.conversation.push_exchange(message);
        log::debug!("Submitted message {} (placeholder {})", exchange.question, exchange.placeholder);
        Ok(Submission { placeholder: exchange.placeholder, message: message.to_string() })
    }

    /// Submits the draft and clears it on success.
    pub fn submit_draft(&mut self) -> Result<Submission, ClientError> {
        let draft = std::mem::take(&mut self.draft);
        match self.submit(&draft) {
            Ok(submission) => Ok(submission),
            Err(err) => {
                self.draft = draft;
                Err(err)
            }
        }
    }

    /// Settles the placeholder addressed by `placeholder` with the relay's
    /// outcome. A successful answer is read aloud when auto-speak is on; an
    /// `Err` return only ever reports that playback could not start.
    pub fn complete(
        &mut self,
        placeholder: MessageId,
        outcome: Result<AskResponse, ClientError>,
    ) -> Result<(), ClientError> {
        match outcome {
            Ok(response) => {
                let Some(message) =
                    self.conversation.resolve(placeholder, response.text, response.citations)
                else {
                    return Ok(());
                };
                if self.config.auto_speak && !message.text.trim().is_empty() {
                    let text = message.text.clone();
                    self.playback.start(&text, Some(placeholder))?;
                }
                Ok(())
            }
            Err(err) => {
                log::warn!("Request for placeholder {placeholder} failed: {err}");
                self.conversation.fail(placeholder, failure_text(&err));
                Ok(())
            }
        }
    }

    pub fn copy_text(&self, id: MessageId) -> Option<String> {
        self.conversation.get(id).map(|m| m.copy_text().to_string())
    }

    // ── Playback ─────────────────────────────────────────────────────────────

    /// Reads a resolved message aloud again.
    pub fn speak(&mut self, id: MessageId) -> Result<HandleId, ClientError> {
        let text = match self.conversation.get(id) {
            Some(m) if m.status == MessageStatus::Resolved => m.text.clone(),
            _ => return Err(ClientError::Playback(format!("message {id} has no answer to read"))),
        };
        self.playback.start(&text, Some(id))
    }

    pub fn stop_playback(&mut self) {
        self.playback.stop();
    }

    pub fn playback_finished(&mut self, handle: HandleId, end: PlaybackEnd) -> Result<(), ClientError> {
        match (self.playback.finished(handle, &end), end) {
            (true, PlaybackEnd::Failed(reason)) => Err(ClientError::Playback(reason)),
            _ => Ok(()),
        }
    }

    // ── Capture ──────────────────────────────────────────────────────────────

    pub fn start_capture(&mut self) -> Result<bool, ClientError> {
        self.capture.start()
    }

    pub fn cancel_capture(&mut self) {
        self.capture.cancel();
    }

    /// Applies a recognition event. A final transcript becomes the draft and,
    /// with auto-send on, is submitted like typed input.
    pub fn capture_event(
        &mut self,
        session: SessionId,
        event: CaptureEvent,
    ) -> Result<Option<Submission>, ClientError> {
        let Some(transcript) = self.capture.handle(session, event)? else {
            return Ok(None);
        };
        self.draft = transcript;
        self.capture.finish_transcription();

        if self.config.auto_send_transcript {
            self.submit_draft().map(Some)
        } else {
            Ok(None)
        }
    }

    #[cfg(test)]
    fn playback(&self) -> &Playback<O> {
        &self.playback
    }

    #[cfg(test)]
    fn capture(&self) -> &Capture<I> {
        &self.capture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::{InputCall, RecordingInput};
    use crate::conversation::Role;
    use crate::models::Citation;
    use crate::playback::testing::{OutputCall, RecordingOutput};

    type TestSession = ChatSession<RecordingOutput, RecordingInput>;

    fn session() -> TestSession {
        ChatSession::new(
            ClientConfig {
                api_base: "http://relay.test".into(),
                speech_lang: "en-US".into(),
                auto_send_transcript: true,
                auto_speak: true,
            },
            RecordingOutput::default(),
            RecordingInput::default(),
        )
    }

    fn answer(text: &str) -> AskResponse {
        AskResponse { text: text.into(), citations: vec![] }
    }

    fn spoken(session: &TestSession) -> Vec<String> {
        session
            .playback()
            .output()
            .calls
            .iter()
            .filter_map(|c| match c {
                OutputCall::Speak(_, text) => Some(text.clone()),
                OutputCall::Cancel => None,
            })
            .collect()
    }

    #[test]
    fn answered_question_renders_citation_and_is_spoken() {
        let mut session = session();
        let submission = session.submit("What is the capital of France?").unwrap();
        assert_eq!(submission.message, "What is the capital of France?");

        let citation = Citation {
            label: "Wikipedia".into(),
            url: "https://en.wikipedia.org/wiki/Paris".into(),
        };
        session
            .complete(
                submission.placeholder,
                Ok(AskResponse {
                    text: "Paris is the capital of France.".into(),
                    citations: vec![citation.clone()],
                }),
            )
            .unwrap();

        let reply = session.conversation().get(submission.placeholder).unwrap();
        assert_eq!(reply.role, Role::Bot);
        assert_eq!(reply.status, MessageStatus::Resolved);
        assert_eq!(reply.citations, vec![citation]);
        assert_eq!(spoken(&session), ["Paris is the capital of France."]);
        assert_eq!(session.playback_state(), PlaybackState::Speaking);
        assert_eq!(session.speaking_message(), Some(submission.placeholder));
    }

    #[test]
    fn blank_submission_creates_nothing() {
        let mut session = session();
        assert_eq!(session.submit("   \n\t"), Err(ClientError::InvalidRequest));
        assert!(session.conversation().messages().is_empty());

        session.set_draft("  ");
        assert!(session.submit_draft().is_err());
        assert_eq!(session.draft(), "  ");
    }

    #[test]
    fn later_question_answered_first_keeps_pair_order() {
        let mut session = session();
        let a = session.submit("A").unwrap();
        let b = session.submit("B").unwrap();

        session.complete(b.placeholder, Ok(answer("answer B"))).unwrap();
        session.complete(a.placeholder, Ok(answer("answer A"))).unwrap();

        let texts: Vec<_> =
            session.conversation().messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["A", "answer A", "B", "answer B"]);
        // Each resolution took over the speaker, cancelling the previous one.
        assert_eq!(spoken(&session), ["answer B", "answer A"]);
        assert_eq!(session.speaking_message(), Some(a.placeholder));
    }

    #[test]
    fn failed_request_is_not_spoken_and_does_not_block_others() {
        let mut session = session();
        let first = session.submit("first").unwrap();
        let second = session.submit("second").unwrap();

        session
            .complete(first.placeholder, Err(ClientError::Upstream("Network error".into())))
            .unwrap();

        let failed = session.conversation().get(first.placeholder).unwrap();
        assert_eq!(failed.status, MessageStatus::Failed);
        assert!(failed.text.contains("Network error"));
        assert!(spoken(&session).is_empty());
        assert_eq!(session.playback_state(), PlaybackState::Idle);

        let third = session.submit("third").unwrap();
        session.complete(second.placeholder, Ok(answer("ok two"))).unwrap();
        session.complete(third.placeholder, Ok(answer("ok three"))).unwrap();
        assert_eq!(session.conversation().pending_count(), 0);
    }

    #[test]
    fn auto_speak_off_resolves_silently() {
        let mut session = session();
        session.set_auto_speak(false);
        let submission = session.submit("hi").unwrap();
        session.complete(submission.placeholder, Ok(answer("hello"))).unwrap();
        assert!(spoken(&session).is_empty());

        // Replay still works on demand.
        session.speak(submission.placeholder).unwrap();
        assert_eq!(spoken(&session), ["hello"]);
    }

    #[test]
    fn empty_answer_is_not_spoken() {
        let mut session = session();
        let submission = session.submit("hi").unwrap();
        session.complete(submission.placeholder, Ok(answer(""))).unwrap();
        assert!(spoken(&session).is_empty());
    }

    #[test]
    fn stop_playback_when_idle_is_a_no_op() {
        let mut session = session();
        session.stop_playback();
        session.stop_playback();
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        assert!(session.playback().output().calls.is_empty());
    }

    #[test]
    fn playback_failure_is_reported_once_and_returns_to_idle() {
        let mut session = session();
        let submission = session.submit("hi").unwrap();
        session.complete(submission.placeholder, Ok(answer("hello"))).unwrap();
        let handle = session.playback().active().unwrap().id;

        let err = session
            .playback_finished(handle, PlaybackEnd::Failed("synthesis-failed".into()))
            .unwrap_err();
        assert_eq!(err, ClientError::Playback("synthesis-failed".into()));
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        assert!(session.playback_finished(handle, PlaybackEnd::Completed).is_ok());
    }

    #[test]
    fn spoken_transcript_is_auto_sent() {
        let mut session = session();
        assert!(session.start_capture().unwrap());

        let submission = session
            .capture_event(1, CaptureEvent::Final("what time is it".into()))
            .unwrap()
            .expect("transcript should be submitted");

        assert_eq!(submission.message, "what time is it");
        assert_eq!(session.draft(), "");
        assert_eq!(session.capture_state(), CaptureState::Idle);
        assert_eq!(session.conversation().messages().len(), 2);
        assert_eq!(session.capture().input().calls, vec![InputCall::Start(1), InputCall::Stop]);
    }

    #[test]
    fn transcript_fills_draft_when_auto_send_is_off() {
        let mut session = session();
        session.config.auto_send_transcript = false;
        session.start_capture().unwrap();

        let submitted = session.capture_event(1, CaptureEvent::Final("hello".into())).unwrap();

        assert_eq!(submitted, None);
        assert_eq!(session.draft(), "hello");
        assert!(session.conversation().messages().is_empty());
    }

    #[test]
    fn cancelled_capture_submits_nothing() {
        let mut session = session();
        session.start_capture().unwrap();
        session.cancel_capture();

        assert_eq!(session.capture_event(1, CaptureEvent::Final("late".into())).unwrap(), None);
        assert!(session.conversation().messages().is_empty());
        assert_eq!(session.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn copy_uses_message_text_only() {
        let mut session = session();
        let submission = session.submit("two paragraphs").unwrap();
        session
            .complete(
                submission.placeholder,
                Ok(AskResponse {
                    text: "Para one.\n\nPara two.".into(),
                    citations: vec![Citation { label: "x".into(), url: "https://x.test".into() }],
                }),
            )
            .unwrap();

        assert_eq!(session.copy_text(submission.placeholder).as_deref(), Some("Para one.\n\nPara two."));
        assert_eq!(session.copy_text(42), None);
    }
}
