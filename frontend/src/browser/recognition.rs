use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{SpeechRecognition, SpeechRecognitionEvent};

use crate::capture::{CaptureEvent, SessionId, SpeechInput};
use crate::errors::ClientError;

type OnEvent = Rc<dyn Fn(SessionId, CaptureEvent)>;

// Chrome and Safari only expose the prefixed constructor.
const CONSTRUCTORS: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

struct LiveRecognition {
    recognition: SpeechRecognition,
    _on_result: Closure<dyn FnMut(SpeechRecognitionEvent)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
    _on_end: Closure<dyn FnMut(JsValue)>,
}

impl LiveRecognition {
    fn detach(&self) {
        self.recognition.set_onresult(None);
        self.recognition.set_onerror(None);
        self.recognition.set_onend(None);
    }
}

/// Browser speech recognition behind [`SpeechInput`].
pub struct BrowserRecognizer {
    lang: String,
    on_event: OnEvent,
    current: Option<LiveRecognition>,
}

impl BrowserRecognizer {
    pub fn new(lang: &str, on_event: impl Fn(SessionId, CaptureEvent) + 'static) -> Self {
        Self { lang: lang.to_string(), on_event: Rc::new(on_event), current: None }
    }

    fn construct() -> Result<SpeechRecognition, ClientError> {
        let window = web_sys::window()
            .ok_or_else(|| ClientError::Capture("no window".into()))?;
        let constructor = CONSTRUCTORS
            .iter()
            .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
            .find(|value| value.is_function())
            .ok_or_else(|| ClientError::Capture("speech recognition unsupported".into()))?;
        let instance = Reflect::construct(constructor.unchecked_ref::<Function>(), &Array::new())
            .map_err(|e| ClientError::Capture(format!("{e:?}")))?;
        Ok(instance.unchecked_into())
    }
}

/// Concatenates the final transcripts carried by one result event.
fn final_transcript(event: &SpeechRecognitionEvent) -> String {
    let Some(results) = event.results() else {
        return String::new();
    };
    (event.result_index()..results.length())
        .filter_map(|i| results.get(i))
        .filter(|result| result.is_final())
        .filter_map(|result| result.get(0))
        .map(|alternative| alternative.transcript())
        .collect::<Vec<_>>()
        .join(" ")
}

impl SpeechInput for BrowserRecognizer {
    fn start(&mut self, session: SessionId) -> Result<(), ClientError> {
        self.stop();

        let recognition = Self::construct()?;
        recognition
            .set_continuous(true)
            .map_err(|e| ClientError::Capture(format!("{e:?}")))?;
        recognition.set_interim_results(false);
        recognition.set_lang(&self.lang);

        let on_event = self.on_event.clone();
        let on_result =
            Closure::<dyn FnMut(SpeechRecognitionEvent)>::new(move |ev: SpeechRecognitionEvent| {
                let transcript = final_transcript(&ev);
                if !transcript.trim().is_empty() {
                    on_event(session, CaptureEvent::Final(transcript));
                }
            });
        let on_event = self.on_event.clone();
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |ev: JsValue| {
            let code = Reflect::get(&ev, &JsValue::from_str("error"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown".to_string());
            on_event(session, CaptureEvent::Error(code));
        });
        let on_event = self.on_event.clone();
        let on_end = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            on_event(session, CaptureEvent::Ended);
        });

        recognition.set_onresult(Some(on_result.as_ref().unchecked_ref()));
        recognition.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        recognition.set_onend(Some(on_end.as_ref().unchecked_ref()));

        let live = LiveRecognition {
            recognition,
            _on_result: on_result,
            _on_error: on_error,
            _on_end: on_end,
        };
        if let Err(e) = live.recognition.start() {
            live.detach();
            return Err(ClientError::Capture(format!("{e:?}")));
        }
        self.current = Some(live);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.detach();
            current.recognition.abort();
        }
    }
}
