use std::path::PathBuf;

use mimic_chat::{
    Action, ChatConfig, ChatState, Effect, MessageStatus, PendingAttachment, Role,
    StreamSessionId, load_attachments, search,
};

fn send(state: &mut ChatState, text: &str) -> StreamSessionId {
    state.apply(Action::InputChanged(text.to_string()));
    state
        .apply(Action::Submit)
        .into_iter()
        .find_map(|effect| match effect {
            Effect::ScheduleReply { session, .. } => Some(session),
            _ => None,
        })
        .expect("reply scheduled")
}

fn finish_reply(state: &mut ChatState, session: StreamSessionId) -> usize {
    state.apply(Action::ReplyDue(session));
    let mut ticks = 0;
    while state.is_revealing() {
        state.apply(Action::RevealTick);
        ticks += 1;
    }
    ticks
}

fn image(name: &str) -> PendingAttachment {
    PendingAttachment::new(name, "data:image/png;base64,iVBORw0KGgo=")
}

#[test]
fn greeting_reply_is_revealed_one_char_per_tick() {
    let mut state = ChatState::default();
    let session = send(&mut state, "hi");

    let effects = state.apply(Action::ReplyDue(session));
    assert!(effects.iter().any(|effect| matches!(effect, Effect::StartRevealTicker { .. })));
    let reply_id = state.messages().last().unwrap().id;
    assert_eq!(state.messages().last().unwrap().text, "");

    let expected = "Hello! What shall we build today?";
    let mut seen = Vec::new();
    while state.is_revealing() {
        state.apply(Action::RevealTick);
        seen.push(state.message(reply_id).unwrap().text.clone());
    }

    assert_eq!(seen.len(), expected.chars().count());
    assert_eq!(seen[0], "H");
    assert!(seen.windows(2).all(|pair| pair[1].starts_with(&pair[0])));
    let reply = state.message(reply_id).unwrap();
    assert_eq!(reply.text, expected);
    assert_eq!(reply.status, MessageStatus::Done);
    assert!(!state.is_loading());
}

#[test]
fn each_send_adds_exactly_one_user_and_one_assistant_message() {
    let mut state = ChatState::default();
    for text in ["hello", "what about the api", "tell me a joke"] {
        let before = state.messages().len();
        let session = send(&mut state, text);
        finish_reply(&mut state, session);

        let added = &state.messages()[before..];
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].role, Role::User);
        assert_eq!(added[1].role, Role::Assistant);
    }
    assert!(
        state
            .messages()
            .last()
            .unwrap()
            .text
            .starts_with("Good question!")
    );
}

#[test]
fn six_picked_images_keep_five_and_label_the_message() {
    let mut state = ChatState::default();
    let picked = (1..=6)
        .map(|index| PathBuf::from(format!("name{index}")))
        .collect::<Vec<_>>();

    let effects = state.apply(Action::FilesPicked(picked));
    let Some(Effect::LoadAttachments(accepted)) = effects.first() else {
        panic!("expected a load effect, got {effects:?}");
    };
    assert_eq!(accepted.len(), 5);

    for path in accepted {
        let name = path.file_name().unwrap().to_str().unwrap();
        state.apply(Action::AttachmentLoaded(image(name)));
    }
    assert_eq!(state.pending_attachments().len(), 5);

    send(&mut state, "");
    let sent = state
        .messages()
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .unwrap();
    assert_eq!(sent.text, "");
    assert_eq!(sent.attachments.len(), 5);
    assert_eq!(sent.label, "images ×5 (name1, name2 and others)");
    assert_eq!(
        state.history().entries()[0].text,
        "images ×5 (name1, name2 and others)"
    );
    assert!(state.pending_attachments().is_empty());

    let found = search::search(state.messages(), "name2");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, sent.id);
}

#[test]
fn history_keeps_ten_newest_and_delete_all_leaves_edit_mode() {
    let mut state = ChatState::default();
    for index in 0..12 {
        let session = send(&mut state, &format!("question {index}"));
        finish_reply(&mut state, session);
    }

    let history = state.history();
    assert_eq!(history.len(), 10);
    assert_eq!(history.entries()[0].text, "question 11");
    assert_eq!(history.entries()[9].text, "question 2");

    state.apply(Action::ToggleHistoryEdit);
    let ids = state
        .history()
        .entries()
        .iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    for id in ids {
        state.apply(Action::SelectHistoryEntry(id));
    }
    assert_eq!(state.history().selected_count(), 10);

    state.apply(Action::DeleteSelectedHistory);
    assert!(state.history().is_empty());
    assert!(!state.history().is_editing());
    // History is a view over messages; the conversation itself is untouched.
    assert_eq!(state.messages().len(), 25);
}

#[test]
fn search_results_point_at_real_messages_in_order() {
    let mut state = ChatState::default();
    for text in ["Rust is fun", "unrelated", "I said RUST again"] {
        let session = send(&mut state, text);
        finish_reply(&mut state, session);
    }

    state.apply(Action::QueryChanged("rust".to_string()));
    let results = state.results().to_vec();
    let positions = results
        .iter()
        .map(|result| state.message_index(result.id).unwrap())
        .collect::<Vec<_>>();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    for result in &results {
        let matched = &result.text[result.range()];
        assert_eq!(matched.to_lowercase(), "rust");
    }

    let target = results[0].id;
    let effects = state.apply(Action::SelectSearchResult(target));
    assert_eq!(effects[0], Effect::JumpTo(target));
    assert_eq!(state.highlighted(), Some(target));
}

#[test]
fn stop_during_delay_discards_the_reply() {
    let mut state = ChatState::default();
    let session = send(&mut state, "hello");
    assert!(!state.can_send());

    state.apply(Action::Stop);
    assert!(!state.is_loading());
    assert!(state.apply(Action::ReplyDue(session)).is_empty());
    assert_eq!(state.messages().len(), 2);

    let next = send(&mut state, "hello again");
    assert_ne!(next, session);
    finish_reply(&mut state, next);
    assert_eq!(state.messages().len(), 4);
}

#[test]
fn configured_timings_flow_into_effects() {
    let config = ChatConfig {
        reply_delay_ms: 5,
        reveal_interval_ms: 40,
        ..ChatConfig::default()
    };
    let mut state = ChatState::from_config(config);
    state.apply(Action::InputChanged("hi".to_string()));
    let effects = state.apply(Action::Submit);
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::ScheduleReply { delay, .. } if delay.as_millis() == 5
    )));

    let session = state.stream_state().active_session().unwrap();
    let effects = state.apply(Action::ReplyDue(session));
    assert!(effects.contains(&Effect::StartRevealTicker {
        interval: std::time::Duration::from_millis(40),
    }));
}

#[tokio::test]
async fn picked_files_load_into_pending_attachments() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for name in ["a.png", "b.jpg"] {
        let path = dir.path().join(name);
        std::fs::write(&path, name.as_bytes()).unwrap();
        paths.push(path);
    }

    let mut state = ChatState::default();
    let effects = state.apply(Action::FilesPicked(paths));
    let Some(Effect::LoadAttachments(accepted)) = effects.into_iter().next() else {
        panic!("expected a load effect");
    };

    let handle = load_attachments(accepted);
    handle.worker.await;
    let mut stream = handle.stream;
    while let Some(attachment) = stream.recv().await {
        state.apply(Action::AttachmentLoaded(attachment));
    }

    let mut names = state
        .pending_attachments()
        .iter()
        .map(|attachment| attachment.name.clone())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["a.png", "b.jpg"]);
    assert!(
        state
            .pending_attachments()
            .iter()
            .any(|attachment| attachment.url.starts_with("data:image/jpeg;base64,"))
    );
}
