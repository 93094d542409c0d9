use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, Theme, h_flex, label::Label, v_flex};
use mimic_chat::search;
use mimic_chat::{Message, MessageId, MessageStatus, Role};

use crate::chat::scroll_manager::ScrollManager;
use crate::chat::thumbnail::ThumbnailCache;

const THUMBNAIL_SIZE: f32 = 96.0;
const AVATAR_SIZE: f32 = 28.0;

/// What the list needs from `ChatState` to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct MessageListSnapshot {
    pub messages: Vec<Message>,
    pub query: String,
    pub highlighted: Option<MessageId>,
    pub typing: bool,
}

pub struct MessageList {
    snapshot: MessageListSnapshot,
    scroll: ScrollManager,
    thumbnails: ThumbnailCache,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            snapshot: MessageListSnapshot::default(),
            scroll: ScrollManager::new(),
            thumbnails: ThumbnailCache::new(),
        }
    }

    pub fn set_snapshot(&mut self, snapshot: MessageListSnapshot, cx: &mut Context<Self>) {
        if snapshot.messages.len() > self.snapshot.messages.len() {
            self.scroll.request_scroll_for_new_message();
        }

        self.thumbnails.retain(
            snapshot
                .messages
                .iter()
                .flat_map(|message| message.attachments.iter())
                .map(|attachment| attachment.url.as_str()),
        );
        self.snapshot = snapshot;
        cx.notify();
    }

    /// Keeps the tail in view while text grows, unless the user scrolled away.
    pub fn follow_tail(&mut self, cx: &mut Context<Self>) {
        self.scroll.request_scroll_to_bottom_if_following();
        cx.notify();
    }

    pub fn jump_to(&mut self, index: usize, cx: &mut Context<Self>) {
        self.scroll.request_jump(index);
        cx.notify();
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll.update_follow_state();
        self.scroll.apply_pending_scroll();

        let theme = cx.theme();
        let snapshot = &self.snapshot;
        let thumbnails = &mut self.thumbnails;
        let rows = snapshot
            .messages
            .iter()
            .map(|message| {
                render_row(
                    message,
                    &snapshot.query,
                    snapshot.highlighted == Some(message.id),
                    thumbnails,
                    theme,
                )
            })
            .collect::<Vec<_>>();

        v_flex()
            .id("message-list")
            .size_full()
            .min_h_0()
            .gap_3()
            .p_4()
            .overflow_y_scroll()
            .track_scroll(self.scroll.handle())
            .on_scroll_wheel(cx.listener(|_, _: &ScrollWheelEvent, _window, cx| {
                cx.notify();
            }))
            .children(rows)
            .when(snapshot.typing, |list| list.child(render_typing_row(theme)))
    }
}

fn render_row(
    message: &Message,
    query: &str,
    highlighted: bool,
    thumbnails: &mut ThumbnailCache,
    theme: &Theme,
) -> AnyElement {
    let is_user = message.role == Role::User;
    let images = message
        .attachments
        .iter()
        .filter_map(|attachment| thumbnails.get(&attachment.url))
        .collect::<Vec<_>>();

    let content = v_flex()
        .max_w(relative(0.75))
        .gap_1()
        .when(is_user, |content| content.items_end())
        .child(
            Label::new(message.role.label())
                .text_xs()
                .text_color(theme.muted_foreground),
        )
        .when(message.has_text(), |content| {
            content.child(render_bubble(message, query, theme))
        })
        .when(!images.is_empty(), |content| {
            content.child(
                h_flex().flex_wrap().gap_2().children(images.into_iter().map(|image| {
                    img(image)
                        .size(px(THUMBNAIL_SIZE))
                        .rounded_md()
                        .object_fit(ObjectFit::Cover)
                })),
            )
        })
        .when(message.status == MessageStatus::Cancelled, |content| {
            content.child(
                Label::new("stopped")
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
        });

    h_flex()
        .id(SharedString::from(format!("message-{}", message.id)))
        .w_full()
        .items_start()
        .gap_2()
        .p_1()
        .rounded_lg()
        .border_2()
        .border_color(if highlighted {
            theme.primary
        } else {
            transparent_black()
        })
        .when(is_user, |row| row.flex_row_reverse())
        .child(render_avatar(message.role, theme))
        .child(content)
        .into_any_element()
}

fn render_bubble(message: &Message, query: &str, theme: &Theme) -> AnyElement {
    let (background, foreground) = match message.role {
        Role::User => (theme.primary, theme.primary_foreground),
        Role::Assistant => (theme.muted, theme.foreground),
    };

    let text = SharedString::from(message.text.clone());
    let styled = match search::highlight(&message.text, query) {
        Some(spans) => {
            let start = spans.before.len();
            let end = start + spans.matched.len();
            StyledText::new(text).with_highlights([(
                start..end,
                HighlightStyle {
                    background_color: Some(theme.warning.opacity(0.45)),
                    font_weight: Some(FontWeight::SEMIBOLD),
                    ..Default::default()
                },
            )])
        }
        None => StyledText::new(text),
    };

    div()
        .px_3()
        .py_2()
        .rounded_lg()
        .bg(background)
        .text_color(foreground)
        .text_sm()
        .child(styled)
        .into_any_element()
}

fn render_avatar(role: Role, theme: &Theme) -> impl IntoElement {
    let avatar = div()
        .size(px(AVATAR_SIZE))
        .flex_shrink_0()
        .rounded_full()
        .border_1()
        .border_color(theme.border)
        .bg(theme.muted)
        .flex()
        .items_center()
        .justify_center();

    match role {
        Role::User => avatar.child(
            Icon::new(IconName::CircleUser)
                .size(px(16.))
                .text_color(theme.foreground),
        ),
        Role::Assistant => avatar
            .text_xs()
            .font_weight(FontWeight::SEMIBOLD)
            .text_color(theme.foreground)
            .child("AI"),
    }
}

fn render_typing_row(theme: &Theme) -> impl IntoElement {
    h_flex()
        .id("message-list-typing")
        .gap_2()
        .items_center()
        .child(render_avatar(Role::Assistant, theme))
        .child(
            Label::new("typing…")
                .text_sm()
                .text_color(theme.muted_foreground),
        )
}
