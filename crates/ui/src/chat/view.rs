use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, v_flex};
use gpui_tokio_bridge::Tokio;
use mimic_chat::{
    Action, AttachmentLoadHandle, AttachmentStream, ChatConfig, ChatState, Effect,
    HighlightToken, StreamSessionId, load_attachments,
};

use crate::chat::events::{
    AttachRequested, AttachmentRemoved, HistoryCommand, HistoryEntrySelected, InputEdited,
    QueryCleared, QueryEdited, SearchResultSelected, Stop, Submit,
};
use crate::chat::message_input::MessageInputSnapshot;
use crate::chat::message_list::MessageListSnapshot;
use crate::chat::{HistoryPanel, MessageInput, MessageList, SearchPanel};
use crate::theme::apply_theme;

/// Tasks for one picked batch: the tokio-side reads and the gpui-side reader.
struct AttachmentLoad {
    _worker: Task<Result<(), gpui_tokio_bridge::JoinError>>,
    _reader: Task<()>,
}

/// Coordinator that owns `ChatState` and turns its effects into timers, reads and scrolling.
pub struct ChatView {
    state: ChatState,
    history_panel: Entity<HistoryPanel>,
    search_panel: Entity<SearchPanel>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    reply_task: Option<Task<()>>,
    reveal_task: Option<Task<()>>,
    highlight_task: Option<Task<()>>,
    attachment_loads: HashMap<u64, AttachmentLoad>,
    next_load_id: u64,
}

impl ChatView {
    pub fn new(config: ChatConfig, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let state = ChatState::from_config(config);
        let history_panel = cx.new(|cx| HistoryPanel::new(window, cx));
        let search_panel = cx.new(|cx| SearchPanel::new(window, cx));
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe_in(&message_input, window, |this, _, event: &Submit, window, cx| {
            this.dispatch(Action::InputChanged(event.content.clone()), window, cx);
            this.dispatch(Action::Submit, window, cx);
        })
        .detach();

        cx.subscribe_in(&message_input, window, |this, _, event: &Stop, window, cx| {
            this.dispatch(event.into_action(), window, cx);
        })
        .detach();

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &InputEdited, window, cx| {
                this.dispatch(event.clone().into_action(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, _event: &AttachRequested, window, cx| {
                this.pick_files(window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &AttachmentRemoved, window, cx| {
                this.dispatch(event.into_action(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &search_panel,
            window,
            |this, _, event: &QueryEdited, window, cx| {
                this.dispatch(event.clone().into_action(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &search_panel,
            window,
            |this, _, event: &QueryCleared, window, cx| {
                this.dispatch(event.into_action(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &search_panel,
            window,
            |this, _, event: &SearchResultSelected, window, cx| {
                this.dispatch(event.into_action(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &history_panel,
            window,
            |this, _, event: &HistoryEntrySelected, window, cx| {
                this.dispatch(event.into_action(), window, cx);
            },
        )
        .detach();

        cx.subscribe_in(
            &history_panel,
            window,
            |this, _, event: &HistoryCommand, window, cx| {
                this.dispatch(event.into_action(), window, cx);
            },
        )
        .detach();

        let mut this = Self {
            state,
            history_panel,
            search_panel,
            message_list,
            message_input,
            reply_task: None,
            reveal_task: None,
            highlight_task: None,
            attachment_loads: HashMap::new(),
            next_load_id: 1,
        };
        this.sync_children(window, cx);
        this
    }

    pub fn history_panel(&self) -> &Entity<HistoryPanel> {
        &self.history_panel
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn toggle_search(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch(Action::ToggleSearch, window, cx);
    }

    pub fn toggle_theme(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch(Action::ToggleTheme, window, cx);
    }

    /// Applies one action and runs whatever the reducer asks for.
    fn dispatch(&mut self, action: Action, window: &mut Window, cx: &mut Context<Self>) {
        let stopping = matches!(action, Action::Stop);
        let effects = self.state.apply(action);

        if stopping && !self.state.is_loading() {
            self.reply_task = None;
        }

        for effect in effects {
            self.run_effect(effect, window, cx);
        }

        self.sync_children(window, cx);
        cx.notify();
    }

    fn run_effect(&mut self, effect: Effect, window: &mut Window, cx: &mut Context<Self>) {
        match effect {
            Effect::ScheduleReply { session, delay } => {
                self.schedule_reply(session, delay, window, cx)
            }
            Effect::StartRevealTicker { interval } => {
                self.start_reveal_ticker(interval, window, cx)
            }
            Effect::LoadAttachments(paths) => self.spawn_attachment_load(paths, window, cx),
            Effect::ClearInput => {
                self.message_input.update(cx, |input, cx| input.clear(window, cx));
            }
            Effect::ScrollToBottom => {
                self.message_list.update(cx, |list, cx| list.follow_tail(cx));
            }
            Effect::JumpTo(message_id) => {
                if let Some(index) = self.state.message_index(message_id) {
                    self.message_list.update(cx, |list, cx| list.jump_to(index, cx));
                }
            }
            Effect::ExpireHighlight { token, after } => {
                self.schedule_highlight_expiry(token, after, window, cx)
            }
            Effect::ApplyTheme(choice) => {
                apply_theme(choice, Some(window), cx);
                cx.refresh_windows();
            }
        }
    }

    fn schedule_reply(
        &mut self,
        session: StreamSessionId,
        delay: Duration,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.reply_task = Some(cx.spawn_in(window, async move |this, cx| {
            cx.background_executor().timer(delay).await;

            let _ = this.update_in(cx, |this, window, cx| {
                this.reply_task = None;
                this.dispatch(Action::ReplyDue(session), window, cx);
            });
        }));
    }

    fn start_reveal_ticker(
        &mut self,
        interval: Duration,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.reveal_task.is_some() {
            return;
        }

        self.reveal_task = Some(cx.spawn_in(window, async move |this, cx| {
            loop {
                cx.background_executor().timer(interval).await;

                let revealing = this.update_in(cx, |this, window, cx| {
                    this.dispatch(Action::RevealTick, window, cx);
                    if !this.state.is_revealing() {
                        this.reveal_task = None;
                    }
                    this.state.is_revealing()
                });

                if !matches!(revealing, Ok(true)) {
                    break;
                }
            }
        }));
    }

    fn schedule_highlight_expiry(
        &mut self,
        token: HighlightToken,
        after: Duration,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.highlight_task = Some(cx.spawn_in(window, async move |this, cx| {
            cx.background_executor().timer(after).await;

            let _ = this.update_in(cx, |this, window, cx| {
                this.highlight_task = None;
                this.dispatch(Action::HighlightExpired(token), window, cx);
            });
        }));
    }

    fn pick_files(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.state.attachment_capacity() == 0 {
            tracing::debug!("attachment capacity reached; picker not opened");
            return;
        }

        let paths = cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: true,
            prompt: Some("Add images".into()),
        });

        cx.spawn_in(window, async move |this, cx| {
            let picked = match paths.await {
                Ok(Ok(Some(paths))) => paths,
                Ok(Ok(None)) => return,
                Ok(Err(error)) => {
                    tracing::error!("file picker failed: {}", error);
                    return;
                }
                Err(_) => return,
            };

            let _ = this.update_in(cx, |this, window, cx| {
                this.dispatch(Action::FilesPicked(picked), window, cx);
            });
        })
        .detach();
    }

    fn spawn_attachment_load(
        &mut self,
        paths: Vec<PathBuf>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let load_id = self.next_load_id;
        self.next_load_id = self.next_load_id.saturating_add(1);

        let AttachmentLoadHandle { stream, worker } = load_attachments(paths);
        let worker = Tokio::spawn(cx, worker);
        let reader = self.spawn_attachment_reader(load_id, stream, window, cx);

        self.attachment_loads.insert(
            load_id,
            AttachmentLoad {
                _worker: worker,
                _reader: reader,
            },
        );
    }

    fn spawn_attachment_reader(
        &mut self,
        load_id: u64,
        mut stream: AttachmentStream,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Task<()> {
        cx.spawn_in(window, async move |this, cx| {
            while let Some(attachment) = stream.recv().await {
                let _ = this.update_in(cx, |this, window, cx| {
                    this.dispatch(Action::AttachmentLoaded(attachment), window, cx);
                });
            }

            let _ = this.update(cx, |this, _cx| {
                this.attachment_loads.remove(&load_id);
            });
        })
    }

    fn sync_children(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let state = &self.state;

        let list_snapshot = MessageListSnapshot {
            messages: state.messages().to_vec(),
            query: state.query().to_string(),
            highlighted: state.highlighted(),
            typing: state.is_loading(),
        };
        let input_snapshot = MessageInputSnapshot {
            loading: state.is_loading(),
            can_send: state.can_send(),
            placeholder: state.placeholder(),
            pending: state.pending_attachments().to_vec(),
            attachment_capacity: state.attachment_capacity(),
        };
        let history = state.history().clone();
        let results = state.results().to_vec();

        self.message_list
            .update(cx, |list, cx| list.set_snapshot(list_snapshot, cx));
        self.message_input
            .update(cx, |input, cx| input.set_snapshot(input_snapshot, window, cx));
        self.history_panel
            .update(cx, |panel, cx| panel.set_history(history, cx));
        self.search_panel
            .update(cx, |panel, cx| panel.set_results(results, cx));
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let search_open = self.state.is_search_open();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .when(search_open, |view| view.child(self.search_panel.clone()))
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
