use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time;
use workdeck_app::WorkdeckApp;
use workdeck_bridge::{command_ids, event_ids, BridgeError, ShellInvoker};
use workdeck_config::WorkdeckConfig;
use workdeck_dashboard::{compose_cards, Selection};

/// Invoker whose responses can be swapped mid-test, keyed by command plus
/// the worktree parameter for session listings.
#[derive(Default)]
struct ScriptedInvoker {
    responses: Mutex<HashMap<String, Value>>,
}

impl ScriptedInvoker {
    fn set(&self, key: &str, value: Value) {
        self.responses
            .lock()
            .expect("response lock poisoned")
            .insert(key.to_owned(), value);
    }
}

#[async_trait]
impl ShellInvoker for ScriptedInvoker {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        let key = match command {
            command_ids::SESSION_LIST => format!(
                "{command}:{}",
                args.get("worktreeId").and_then(Value::as_str).unwrap_or("")
            ),
            _ => command.to_owned(),
        };
        self.responses
            .lock()
            .expect("response lock poisoned")
            .get(&key)
            .cloned()
            .ok_or_else(|| BridgeError::backend(command, "no scripted response"))
    }
}

fn worktree(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("{id} checkout"),
        "branch": format!("ap/{id}"),
        "path": format!("/tmp/worktrees/{id}"),
    })
}

fn session(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "status": "running",
        "dateCreated": "1700000000000",
    })
}

#[tokio::test]
async fn dashboard_feed_composes_and_selection_survives_session_changes() {
    let invoker = Arc::new(ScriptedInvoker::default());
    invoker.set(
        command_ids::WORKTREE_LIST,
        json!([worktree("wt-a"), worktree("wt-b")]),
    );
    invoker.set(
        "session.list:wt-a",
        json!([session("a1", "auth refactor"), session("a2", "flaky test")]),
    );
    invoker.set("session.list:wt-b", json!([session("b1", "release notes")]));

    let config = WorkdeckConfig::default();
    let app = WorkdeckApp::bootstrap(&config, Some(invoker.clone()))
        .expect("bootstrap succeeds");

    let input = app.sessions().dashboard_input().await;
    let cards = compose_cards(&input);
    let ids: Vec<&str> = cards.iter().map(|card| card.session_id.as_str()).collect();
    assert_eq!(ids, ["a1", "a2", "b1"]);

    let mut selection = Selection::default();
    selection.select_index(&cards, 2);

    // a2 closes in the backend; the change event invalidates the feed.
    invoker.set("session.list:wt-a", json!([session("a1", "auth refactor")]));
    app.events().emit(event_ids::SESSION_CHANGED, json!({}));
    time::sleep(Duration::from_millis(20)).await;

    // First read after invalidation serves the stale list and revalidates.
    let stale = app.sessions().dashboard_input().await;
    assert_eq!(compose_cards(&stale).len(), 3);
    time::sleep(Duration::from_millis(40)).await;

    let refreshed = app.sessions().dashboard_input().await;
    let cards = compose_cards(&refreshed);
    let ids: Vec<&str> = cards.iter().map(|card| card.session_id.as_str()).collect();
    assert_eq!(ids, ["a1", "b1"]);

    // The selected session still exists, so selection follows it by
    // identity to its new index.
    selection.reconcile(&cards);
    assert_eq!(selection.index(), Some(1));
}
