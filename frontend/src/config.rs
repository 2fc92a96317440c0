/// Base URL of the relay server.
const DEFAULT_API_BASE: &str = "http://localhost:3000";
const DEFAULT_SPEECH_LANG: &str = "en-US";

/// Client settings. Endpoints and language are fixed at build time
/// (`RELAY_API_BASE`, `SPEECH_LANG`); the toggles can change at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub speech_lang: String,
    /// Submit a final transcript straight away instead of leaving it in the
    /// input box.
    pub auto_send_transcript: bool,
    /// Read each resolved answer aloud.
    pub auto_speak: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: option_env!("RELAY_API_BASE")
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            speech_lang: option_env!("SPEECH_LANG").unwrap_or(DEFAULT_SPEECH_LANG).to_string(),
            auto_send_transcript: true,
            auto_speak: true,
        }
    }
}
