use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};
use mimic_chat::PendingAttachment;

use crate::chat::events::{AttachRequested, AttachmentRemoved, InputEdited, Stop, Submit};
use crate::chat::thumbnail::ThumbnailCache;

const PENDING_THUMBNAIL_SIZE: f32 = 56.0;

/// Input-area view of the reducer state.
#[derive(Debug, Clone, Default)]
pub struct MessageInputSnapshot {
    pub loading: bool,
    pub can_send: bool,
    pub placeholder: &'static str,
    pub pending: Vec<PendingAttachment>,
    pub attachment_capacity: usize,
}

pub struct MessageInput {
    input_state: Entity<InputState>,
    snapshot: MessageInputSnapshot,
    thumbnails: ThumbnailCache,
    last_content: String,
    pending_newline: bool,
}

impl EventEmitter<Submit> for MessageInput {}
impl EventEmitter<Stop> for MessageInput {}
impl EventEmitter<InputEdited> for MessageInput {}
impl EventEmitter<AttachRequested> for MessageInput {}
impl EventEmitter<AttachmentRemoved> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Type a message (Enter to send, Shift+Enter for a new line)")
                .auto_grow(1, 8)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| match event {
                InputEvent::PressEnter { secondary } => {
                    if *secondary {
                        this.pending_newline = false;
                        return;
                    }

                    if this.pending_newline {
                        // Shift+Enter inserts the newline itself and still reports PressEnter.
                        this.pending_newline = false;
                    } else {
                        this.trim_trailing_newline(window, cx);
                        this.handle_submit(cx);
                    }
                }
                _ => this.publish_content(cx),
            },
        )
        .detach();

        Self {
            input_state,
            snapshot: MessageInputSnapshot::default(),
            thumbnails: ThumbnailCache::new(),
            last_content: String::new(),
            pending_newline: false,
        }
    }

    pub fn set_snapshot(
        &mut self,
        snapshot: MessageInputSnapshot,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if snapshot.placeholder != self.snapshot.placeholder {
            let placeholder = snapshot.placeholder;
            self.input_state.update(cx, |state, cx| {
                state.set_placeholder(placeholder, window, cx);
            });
        }

        self.thumbnails.retain(
            snapshot
                .pending
                .iter()
                .map(|attachment| attachment.url.as_str()),
        );
        self.snapshot = snapshot;
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.last_content.clear();
        self.pending_newline = false;
    }

    fn publish_content(&mut self, cx: &mut Context<Self>) {
        let content = self.input_state.read(cx).value().to_string();
        if content != self.last_content {
            self.last_content = content.clone();
            cx.emit(InputEdited { content });
        }
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        // The reducer re-checks; this only avoids emitting while send is disabled.
        if self.snapshot.loading {
            return;
        }

        let content = self.input_state.read(cx).value().to_string();
        if content.trim().is_empty() && self.snapshot.pending.is_empty() {
            return;
        }

        cx.emit(Submit { content });
    }

    fn handle_stop(&mut self, cx: &mut Context<Self>) {
        if !self.snapshot.loading {
            return;
        }

        cx.emit(Stop);
        self.pending_newline = false;
        cx.notify();
    }

    fn hint(&self) -> String {
        let count = self.snapshot.pending.len();
        if count == 0 {
            "Enter to send, Shift+Enter for a new line".to_string()
        } else {
            format!("Enter to send, Shift+Enter for a new line • {count} attached")
        }
    }

    fn render_pending(&mut self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let thumbnails = &mut self.thumbnails;
        let items = self
            .snapshot
            .pending
            .iter()
            .map(|attachment| {
                let attachment_id = attachment.id;
                let preview = match thumbnails.get(&attachment.url) {
                    Some(image) => img(image)
                        .size_full()
                        .object_fit(ObjectFit::Cover)
                        .into_any_element(),
                    None => div()
                        .size_full()
                        .p_1()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .truncate()
                        .child(attachment.name.clone())
                        .into_any_element(),
                };

                div()
                    .id(SharedString::from(format!("pending-{attachment_id}")))
                    .relative()
                    .size(px(PENDING_THUMBNAIL_SIZE))
                    .rounded_md()
                    .overflow_hidden()
                    .border_1()
                    .border_color(theme.border)
                    .child(preview)
                    .child(
                        div().absolute().top_0().right_0().child(
                            Button::new(SharedString::from(format!("remove-{attachment_id}")))
                                .ghost()
                                .xsmall()
                                .icon(IconName::Close)
                                .on_click(cx.listener(move |_, _, _window, cx| {
                                    cx.emit(AttachmentRemoved { attachment_id });
                                })),
                        ),
                    )
            })
            .collect::<Vec<_>>();

        h_flex()
            .flex_wrap()
            .gap_2()
            .children(items)
            .into_any_element()
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let loading = self.snapshot.loading;
        let can_send = self.snapshot.can_send;
        let has_pending = !self.snapshot.pending.is_empty();
        let attach_disabled = self.snapshot.attachment_capacity == 0;
        let hint = self.hint();
        let pending = has_pending.then(|| self.render_pending(cx));
        let theme = cx.theme();

        let action = if loading {
            Button::new("stop")
                .small()
                .danger()
                .icon(IconName::CircleX)
                .child("Stop")
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.handle_stop(cx);
                }))
                .into_any_element()
        } else {
            Button::new("send")
                .small()
                .primary()
                .icon(IconName::ArrowUp)
                .child("Send")
                .disabled(!can_send)
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.handle_submit(cx);
                }))
                .into_any_element()
        };

        v_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_end()
                    .child(
                        Button::new("attach")
                            .ghost()
                            .small()
                            .icon(IconName::Plus)
                            .tooltip("Add images")
                            .disabled(attach_disabled)
                            .on_click(cx.listener(|_, _, _window, cx| {
                                cx.emit(AttachRequested);
                            })),
                    )
                    .child(
                        div()
                            .flex_1()
                            .min_w_0()
                            .px_3()
                            .py_2()
                            .rounded_lg()
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                                if event.keystroke.key == "enter" && event.keystroke.modifiers.shift
                                {
                                    this.handle_shift_enter(window, cx);
                                }
                            }))
                            .child(Input::new(&self.input_state).w_full()),
                    )
                    .child(action),
            )
            .when_some(pending, |area, pending| area.child(pending))
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(hint),
            )
    }
}
