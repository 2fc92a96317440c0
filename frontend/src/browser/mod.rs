//! Bindings from the session's speech/clipboard seams to browser APIs.

pub mod clipboard;
pub mod recognition;
pub mod synthesis;

pub use recognition::BrowserRecognizer;
pub use synthesis::BrowserSynthesizer;
