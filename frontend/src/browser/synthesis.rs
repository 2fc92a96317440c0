use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{SpeechSynthesis, SpeechSynthesisErrorEvent, SpeechSynthesisUtterance};

use crate::errors::ClientError;
use crate::playback::{HandleId, PlaybackEnd, SpeechOutput};

type OnFinished = Rc<dyn Fn(HandleId, PlaybackEnd)>;

/// An utterance together with the callbacks that must outlive it.
struct LiveUtterance {
    utterance: SpeechSynthesisUtterance,
    _on_end: Closure<dyn FnMut(JsValue)>,
    _on_error: Closure<dyn FnMut(SpeechSynthesisErrorEvent)>,
}

impl LiveUtterance {
    /// Detaches the callbacks so a cancelled utterance never reports back.
    fn detach(&self) {
        self.utterance.set_onend(None);
        self.utterance.set_onerror(None);
    }
}

/// `window.speechSynthesis` behind [`SpeechOutput`].
pub struct BrowserSynthesizer {
    synth: Option<SpeechSynthesis>,
    lang: String,
    on_finished: OnFinished,
    current: Option<LiveUtterance>,
}

impl BrowserSynthesizer {
    pub fn new(lang: &str, on_finished: impl Fn(HandleId, PlaybackEnd) + 'static) -> Self {
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            log::warn!("Speech synthesis is not available in this browser");
        }
        Self {
            synth,
            lang: lang.to_string(),
            on_finished: Rc::new(on_finished),
            current: None,
        }
    }
}

impl SpeechOutput for BrowserSynthesizer {
    fn speak(&mut self, handle: HandleId, text: &str) -> Result<(), ClientError> {
        let synth = self
            .synth
            .as_ref()
            .ok_or_else(|| ClientError::Playback("speech synthesis unsupported".into()))?;

        let utterance = SpeechSynthesisUtterance::new_with_text(text)
            .map_err(|e| ClientError::Playback(format!("{e:?}")))?;
        utterance.set_lang(&self.lang);

        let on_finished = self.on_finished.clone();
        let on_end = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            on_finished(handle, PlaybackEnd::Completed);
        });
        let on_finished = self.on_finished.clone();
        let on_error =
            Closure::<dyn FnMut(SpeechSynthesisErrorEvent)>::new(move |ev: SpeechSynthesisErrorEvent| {
                let reason = format!("{:?}", ev.error());
                on_finished(handle, PlaybackEnd::Failed(reason));
            });
        utterance.set_onend(Some(on_end.as_ref().unchecked_ref()));
        utterance.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        if let Some(previous) = self.current.take() {
            previous.detach();
        }
        synth.speak(&utterance);
        self.current = Some(LiveUtterance { utterance, _on_end: on_end, _on_error: on_error });
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(current) = self.current.take() {
            current.detach();
        }
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}
