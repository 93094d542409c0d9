use std::rc::Rc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable, VirtualListScrollHandle,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    list::ListItem,
    v_flex, v_virtual_list,
};
use mimic_chat::History;

use crate::chat::events::{HistoryCommand, HistoryEntrySelected};

const HISTORY_ROW_HEIGHT: f32 = 36.0;
const CHECK_BOX_SIZE: f32 = 16.0;

/// Sidebar listing the most recent questions.
pub struct HistoryPanel {
    history: History,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_handle: VirtualListScrollHandle,
}

impl EventEmitter<HistoryEntrySelected> for HistoryPanel {}
impl EventEmitter<HistoryCommand> for HistoryPanel {}

impl HistoryPanel {
    pub fn new(_window: &mut Window, _cx: &mut Context<Self>) -> Self {
        Self {
            history: History::default(),
            item_sizes: Rc::new(Vec::new()),
            scroll_handle: VirtualListScrollHandle::new(),
        }
    }

    pub fn set_history(&mut self, history: History, cx: &mut Context<Self>) {
        if history.len() != self.item_sizes.len() {
            self.item_sizes = Rc::new(vec![
                size(px(0.), px(HISTORY_ROW_HEIGHT));
                history.len()
            ]);
        }
        self.history = history;
        cx.notify();
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let edit_label = if self.history.is_editing() {
            "Done"
        } else {
            "Edit"
        };

        h_flex()
            .w_full()
            .min_w_0()
            .items_center()
            .justify_between()
            .px_3()
            .pt(px(8.))
            .pb_2()
            .child(
                Label::new("Recent questions")
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground),
            )
            .when(!self.history.is_empty(), |header| {
                header.child(
                    Button::new("history-edit")
                        .ghost()
                        .small()
                        .child(edit_label)
                        .on_click(cx.listener(|_, _, _window, cx| {
                            cx.emit(HistoryCommand::ToggleEdit);
                        })),
                )
            })
    }

    fn render_empty_state(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .flex_1()
            .items_center()
            .justify_center()
            .px_4()
            .child(
                Label::new("No questions yet.")
                    .text_sm()
                    .text_color(theme.foreground.opacity(0.55)),
            )
            .into_any_element()
    }

    fn render_list(&self, cx: &Context<Self>) -> AnyElement {
        if self.history.is_empty() {
            return self.render_empty_state(cx);
        }

        let history = self.history.clone();
        let editing = history.is_editing();

        v_flex()
            .flex_1()
            .min_h_0()
            .child(
                v_virtual_list(
                    cx.entity().clone(),
                    "history-list",
                    self.item_sizes.clone(),
                    move |_this, visible_range, _scroll_handle, cx| {
                        let theme = cx.theme();

                        visible_range
                            .filter_map(|index| history.entries().get(index).map(|e| (index, e)))
                            .map(|(index, entry)| {
                                let message_id = entry.id;
                                let is_selected = editing && history.is_selected(message_id);
                                let check_box = div()
                                    .size(px(CHECK_BOX_SIZE))
                                    .flex_shrink_0()
                                    .rounded_sm()
                                    .border_1()
                                    .border_color(theme.border)
                                    .flex()
                                    .items_center()
                                    .justify_center()
                                    .when(is_selected, |check_box| {
                                        check_box.bg(theme.primary).child(
                                            Icon::new(IconName::Check)
                                                .size(px(12.))
                                                .text_color(theme.primary_foreground),
                                        )
                                    });

                                div()
                                    .w_full()
                                    .h(px(HISTORY_ROW_HEIGHT))
                                    .px_2()
                                    .child(
                                        ListItem::new(("history-entry", index))
                                            .w_full()
                                            .h_full()
                                            .px_3()
                                            .py_2()
                                            .rounded_md()
                                            .selected(is_selected)
                                            .on_click(cx.listener(
                                                move |_, _event: &ClickEvent, _window, cx| {
                                                    cx.emit(HistoryEntrySelected { message_id });
                                                },
                                            ))
                                            .child(
                                                h_flex()
                                                    .w_full()
                                                    .gap_2()
                                                    .items_center()
                                                    .when(editing, |row| row.child(check_box))
                                                    .child(
                                                        div().flex_1().min_w_0().truncate().child(
                                                            Label::new(entry.text.clone())
                                                                .text_sm(),
                                                        ),
                                                    ),
                                            ),
                                    )
                                    .into_any_element()
                            })
                            .collect()
                    },
                )
                .w_full()
                .flex_1()
                .track_scroll(&self.scroll_handle),
            )
            .into_any_element()
    }

    fn render_footer(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let editing = self.history.is_editing();
        let selected = self.history.selected_count();
        let delete_selected_label = if selected > 0 {
            format!("Delete selected ({selected})")
        } else {
            "Delete selected".to_string()
        };

        h_flex()
            .w_full()
            .min_w_0()
            .items_center()
            .justify_end()
            .gap_1()
            .px_3()
            .py_2()
            .border_t_1()
            .border_color(theme.border)
            .when(editing, |footer| {
                footer.child(
                    Button::new("history-delete-selected")
                        .ghost()
                        .small()
                        .icon(IconName::Close)
                        .child(delete_selected_label)
                        .disabled(selected == 0)
                        .on_click(cx.listener(|_, _, _window, cx| {
                            cx.emit(HistoryCommand::DeleteSelected);
                        })),
                )
            })
            .child(
                Button::new("history-delete-all")
                    .ghost()
                    .small()
                    .icon(IconName::Close)
                    .child("Delete all")
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(HistoryCommand::Clear);
                    })),
            )
    }
}

impl Render for HistoryPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .min_w_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.render_header(cx))
            .child(self.render_list(cx))
            .when(!self.history.is_empty(), |panel| {
                panel.child(self.render_footer(cx))
            })
    }
}
