use leptos::prelude::*;

use crate::playback::PlaybackState;
use crate::state::AppState;

/// Header with the speaking indicator, stop control and auto-speak toggle.
#[component]
pub fn Toolbar() -> impl IntoView {
    let state = expect_context::<AppState>();
    let speaking = move || state.playback_state.get() == PlaybackState::Speaking;

    view! {
        <header class="toolbar">
            <h2>"Voice Chat"</h2>
            <span class="speaking-indicator" class:active=speaking>
                {move || if speaking() { "🔊 Speaking…" } else { "" }}
            </span>
            <button
                class="stop-btn"
                on:click=move |_| state.stop_playback()
                disabled=move || !speaking()
            >
                "Stop"
            </button>
            <label class="toggle">
                <input
                    type="checkbox"
                    prop:checked=move || state.auto_speak.get()
                    on:change=move |ev| state.set_auto_speak(event_target_checked(&ev))
                />
                "Read answers aloud"
            </label>
        </header>
    }
}
