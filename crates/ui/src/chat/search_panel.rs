use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    list::ListItem,
    v_flex,
};
use mimic_chat::SearchResult;
use mimic_chat::search;

use crate::chat::events::{QueryCleared, QueryEdited, SearchResultSelected};

const RESULTS_MAX_HEIGHT: f32 = 240.0;

pub struct SearchPanel {
    search_input: Entity<InputState>,
    query: String,
    results: Vec<SearchResult>,
}

impl EventEmitter<QueryEdited> for SearchPanel {}
impl EventEmitter<QueryCleared> for SearchPanel {}
impl EventEmitter<SearchResultSelected> for SearchPanel {}

impl SearchPanel {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let search_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Search the conversation…"));

        cx.subscribe_in(
            &search_input,
            window,
            |this, _, _event: &InputEvent, _window, cx| {
                let query = this.search_input.read(cx).value().to_string();
                if query != this.query {
                    this.query = query.clone();
                    cx.emit(QueryEdited { query });
                    cx.notify();
                }
            },
        )
        .detach();

        Self {
            search_input,
            query: String::new(),
            results: Vec::new(),
        }
    }

    pub fn set_results(&mut self, results: Vec<SearchResult>, cx: &mut Context<Self>) {
        self.results = results;
        cx.notify();
    }

    fn clear_query(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.query.clear();
        self.search_input.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        cx.emit(QueryCleared);
        cx.notify();
    }

    fn render_results(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let rows = self
            .results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let message_id = result.id;
                let snippet = result.snippet();

                ListItem::new(("search-result", index))
                    .w_full()
                    .px_2()
                    .py_1()
                    .rounded_md()
                    .on_click(cx.listener(move |_, _event: &ClickEvent, _window, cx| {
                        cx.emit(SearchResultSelected { message_id });
                    }))
                    .child(
                        h_flex()
                            .w_full()
                            .min_w_0()
                            .gap_2()
                            .text_sm()
                            .child(
                                div()
                                    .flex_shrink_0()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(result.role.label()),
                            )
                            .child(
                                h_flex()
                                    .min_w_0()
                                    .truncate()
                                    .child(snippet.before.to_string())
                                    .child(
                                        div()
                                            .px_0p5()
                                            .rounded_sm()
                                            .bg(theme.warning.opacity(0.45))
                                            .font_weight(FontWeight::SEMIBOLD)
                                            .child(snippet.matched.to_string()),
                                    )
                                    .child(snippet.after.to_string()),
                            ),
                    )
            })
            .collect::<Vec<_>>();

        v_flex()
            .id("search-results")
            .w_full()
            .max_h(px(RESULTS_MAX_HEIGHT))
            .overflow_y_scroll()
            .children(rows)
    }
}

impl Render for SearchPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let summary = search::summary(&self.query, self.results.len());
        let has_query = !self.query.is_empty();
        let has_results = !self.results.is_empty();

        v_flex()
            .w_full()
            .gap_2()
            .px_4()
            .py_3()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_center()
                    .child(
                        Icon::new(IconName::Search)
                            .size(px(16.))
                            .text_color(theme.muted_foreground),
                    )
                    .child(
                        div()
                            .flex_1()
                            .min_w_0()
                            .child(Input::new(&self.search_input).w_full().small()),
                    )
                    .when(has_query, |row| {
                        row.child(
                            Button::new("search-clear")
                                .ghost()
                                .small()
                                .icon(IconName::Close)
                                .tooltip("Clear")
                                .on_click(cx.listener(|this, _, window, cx| {
                                    this.clear_query(window, cx);
                                })),
                        )
                    }),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(summary),
            )
            .when(has_results, |panel| panel.child(self.render_results(cx)))
    }
}
