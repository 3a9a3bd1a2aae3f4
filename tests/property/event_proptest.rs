//! Property-based tests for workspace events and the hub

use std::sync::{Arc, Mutex};

use kontexted_collab::backend::realtime::WorkspaceEventHub;
use kontexted_collab::shared::{EventType, WorkspaceEvent};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn test_event_type_tag_roundtrip(tag in "[a-z]{1,10}(\\.[a-z]{1,10})?") {
        let event = WorkspaceEvent::new(1, tag.as_str(), json!({}));
        let value = serde_json::to_value(&event).unwrap();
        prop_assert_eq!(value["type"].as_str(), Some(tag.as_str()));
        prop_assert_eq!(EventType::from(tag.clone()).to_string(), tag);
    }

    #[test]
    fn test_each_workspace_sees_only_its_events(
        publishes in proptest::collection::vec((1i64..4, 0u32..1000), 0..40)
    ) {
        let hub = WorkspaceEventHub::new();
        let seen: Arc<Mutex<Vec<(i64, i64)>>> = Arc::default();

        let subscriptions: Vec<_> = (1i64..4)
            .map(|workspace| {
                let seen = seen.clone();
                hub.subscribe(workspace, move |event| {
                    let n = event.data["n"].as_i64().unwrap();
                    seen.lock().unwrap().push((workspace, n));
                    assert_eq!(event.workspace_id, workspace);
                })
            })
            .collect();

        for (workspace, n) in &publishes {
            hub.publish(WorkspaceEvent::new(*workspace, "note.updated", json!({ "n": n })));
        }

        let seen = seen.lock().unwrap().clone();
        let expected: Vec<(i64, i64)> = publishes.iter().map(|(w, n)| (*w, i64::from(*n))).collect();
        prop_assert_eq!(seen, expected);
        drop(subscriptions);
        prop_assert_eq!(hub.workspace_count(), 0);
    }
}
