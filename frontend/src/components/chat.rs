use leptos::ev;
use leptos::prelude::*;

use crate::capture::CaptureState;
use crate::components::toolbar::Toolbar;
use crate::conversation::{Message, MessageStatus, Role};
use crate::state::{AppState, CopyOutcome};

/// Main chat area with notices, message history, and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            <Toolbar />

            // Transient notice (capture / playback problems)
            {move || {
                state.notice.get().map(|notice| {
                    view! {
                        <div class="notice-banner">
                            {notice}
                            <button class="dismiss-btn" on:click=move |_| state.dismiss_notice()>
                                "×"
                            </button>
                        </div>
                    }
                })
            }}

            // Messages, always in sequence order
            <div class="messages-container">
                {move || {
                    if state.messages.get().is_empty() {
                        view! {
                            <div class="empty-state">
                                "Type or speak a question to start chatting"
                            </div>
                        }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || state.messages.get()
                                key=|m| (m.id, m.status)
                                let:msg
                            >
                                <MessageBubble message=msg />
                            </For>
                        }.into_any()
                    }
                }}
            </div>

            <ChatInput />
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(message: Message) -> impl IntoView {
    let state = expect_context::<AppState>();
    let id = message.id;
    let css_class = format!("message {} {}", message.role.as_str(), message.status.as_str());
    let replayable = message.role == Role::Bot && message.status == MessageStatus::Resolved;
    let copyable = !message.is_pending();
    let text = if message.is_pending() { "…".to_string() } else { message.text };
    let citations = message.citations;

    view! {
        <div class=css_class class:speaking=move || state.speaking_message.get() == Some(id)>
            <div class="role-label">{message.role.as_str()}</div>
            <div class="message-text">{text}</div>
            {(!citations.is_empty()).then(|| {
                view! {
                    <div class="citations">
                        {citations
                            .into_iter()
                            .map(|c| {
                                view! {
                                    <a href=c.url target="_blank" rel="noopener noreferrer">
                                        {c.label}
                                    </a>
                                }
                            })
                            .collect_view()}
                    </div>
                }
            })}
            <div class="message-actions">
                {copyable.then(|| {
                    view! {
                        <button class="copy-btn" on:click=move |_| state.copy(id)>"Copy"</button>
                    }
                })}
                {replayable.then(|| {
                    view! {
                        <button class="speak-btn" on:click=move |_| state.speak(id)>"🔊"</button>
                    }
                })}
                {move || {
                    state.copy_feedback.get().filter(|(m, _)| *m == id).map(|(_, outcome)| {
                        let label = match outcome {
                            CopyOutcome::Copied => "Copied",
                            CopyOutcome::Failed => "Copy failed",
                        };
                        view! { <span class="copy-feedback">{label}</span> }
                    })
                }}
            </div>
        </div>
    }
}

/// Input row: textarea, microphone toggle and send button. Never disabled
/// while answers are outstanding.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            state.send_draft();
        }
    };

    let listening = move || state.capture_state.get() != CaptureState::Idle;
    let mic_label = move || match state.capture_state.get() {
        CaptureState::Idle => "🎤",
        CaptureState::Listening => "⏹ Listening…",
        CaptureState::Transcribing => "✍ Transcribing…",
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type or speak a message… (Enter to send, Shift+Enter for newline)"
                    prop:value=move || state.draft.get()
                    on:input=move |ev| state.set_draft(event_target_value(&ev))
                    on:keydown=on_keydown
                />
                <button class="mic-btn" class:active=listening on:click=move |_| state.toggle_capture()>
                    {mic_label}
                </button>
                <button
                    class="send-btn"
                    on:click=move |_| state.send_draft()
                    disabled=move || state.draft.get().trim().is_empty()
                >
                    "Send"
                </button>
            </div>
        </div>
    }
}
