use mirror_core::{plan_creator, CreatorPlan, PublishState, RunReport, RunResult, SkipReason};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn missing_item_is_fetch_unavailable() {
    let state = PublishState::new();
    assert_eq!(
        plan_creator(&state, "alice", None),
        CreatorPlan::Skip(SkipReason::FetchUnavailable)
    );
    assert_eq!(
        plan_creator(&state, "alice", Some("  ")),
        CreatorPlan::Skip(SkipReason::FetchUnavailable)
    );
}

#[test]
fn unchanged_item_is_no_update() {
    let mut state = PublishState::new();
    state.record_published("alice", "C1");

    assert_eq!(
        plan_creator(&state, "alice", Some("C1")),
        CreatorPlan::Skip(SkipReason::NoUpdate)
    );
    assert_eq!(
        plan_creator(&state, "alice", Some("C2")),
        CreatorPlan::Publish {
            item_id: "C2".to_string()
        }
    );
    assert_eq!(
        plan_creator(&state, "bob", Some("C1")),
        CreatorPlan::Publish {
            item_id: "C1".to_string()
        }
    );
}

#[test]
fn state_round_trips_unknown_keys() {
    let raw = json!({
        "lastSeen": { "alice": "C1" },
        "schedule": { "hour": 8 },
        "note": "keep me"
    });
    let mut state: PublishState = serde_json::from_value(raw).unwrap();
    assert_eq!(state.last_published("alice"), Some("C1"));
    assert_eq!(state.extra().len(), 2);

    state.record_published("bob", "D1");
    let saved = serde_json::to_value(&state).unwrap();
    assert_eq!(
        saved,
        json!({
            "lastSeen": { "alice": "C1", "bob": "D1" },
            "schedule": { "hour": 8 },
            "note": "keep me"
        })
    );
}

#[test]
fn report_serializes_per_status_fields() {
    let report = RunReport::completed(vec![
        RunResult::published("a", "C1", "MEDIA1"),
        RunResult::skipped("b", SkipReason::NoUpdate),
        RunResult::error("c", Some("C3"), "upload failed"),
        RunResult::error("d", None, "probe crashed"),
    ]);

    assert_eq!(report.count("published"), 1);
    assert_eq!(report.count("skipped"), 1);
    assert_eq!(report.count("error"), 2);
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "ok": true,
            "results": [
                { "creator": "a", "status": "published", "item": "C1", "draft": "MEDIA1" },
                { "creator": "b", "status": "skipped", "reason": "no update" },
                { "creator": "c", "status": "error", "item": "C3", "error": "upload failed" },
                { "creator": "d", "status": "error", "error": "probe crashed" }
            ]
        })
    );
}
