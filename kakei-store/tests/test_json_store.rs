use chrono::{NaiveDate, TimeZone, Utc};
use kakei_budget::HouseholdBudget;
use kakei_core::{
    EventKind, EventPatch, ForecastWindow, FutureEvent, OverrideChange, RecurringBaseline,
    YearMonth,
};
use kakei_store::{AccountRecord, ForecastState, ForecastStore, JsonStore, StoreError};
use tempfile::TempDir;

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

fn setup() -> (TempDir, JsonStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path().join("users")).unwrap();
    let account = AccountRecord::new(Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap(), 100_000);
    store.save_account("alice", &account).unwrap();
    store
        .save_baseline("alice", &RecurringBaseline::new(300_000, 250_000))
        .unwrap();
    (dir, store)
}

#[test]
fn test_unknown_user_is_reported() {
    let (_dir, store) = setup();
    let err = store.load_account("bob").unwrap_err();
    assert!(matches!(err, StoreError::UnknownUser(ref u) if u == "bob"));

    let err = store.save_baseline("bob", &RecurringBaseline::default()).unwrap_err();
    assert!(matches!(err, StoreError::UnknownUser(_)));
}

#[test]
fn test_invalid_user_id_rejected() {
    let (_dir, store) = setup();
    assert!(matches!(
        store.load_account("../alice"),
        Err(StoreError::InvalidUserId(_))
    ));
}

#[test]
fn test_event_upsert_and_delete() {
    let (_dir, store) = setup();
    let mut trip = FutureEvent::new("e1", "Trip", ym(2026, 5), 80_000, EventKind::Expense);
    store.upsert_event("alice", &trip).unwrap();
    store
        .upsert_event("alice", &FutureEvent::new("e2", "Bonus", ym(2026, 6), 400_000, EventKind::Income))
        .unwrap();

    trip.amount = 90_000;
    store.upsert_event("alice", &trip).unwrap();

    let events = store.load_events("alice").unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events.get("e1").unwrap().amount, 90_000);
    assert_eq!(events.as_slice()[0].id, "e1");

    assert!(store.delete_event("alice", "e1").unwrap());
    assert!(!store.delete_event("alice", "e1").unwrap());
    assert_eq!(store.load_events("alice").unwrap().len(), 1);
}

#[test]
fn test_override_rows_upsert_and_delete() {
    let (_dir, store) = setup();
    store.upsert_income_override("alice", ym(2026, 3), 350_000).unwrap();
    store.upsert_income_override("alice", ym(2026, 3), 360_000).unwrap();
    store.upsert_balance_override("alice", ym(2026, 4), 1_000_000).unwrap();

    let income = store.load_income_overrides("alice").unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income.get(ym(2026, 3)), Some(360_000));
    assert_eq!(store.load_balance_overrides("alice").unwrap().get(ym(2026, 4)), Some(1_000_000));

    assert!(store.delete_income_override("alice", ym(2026, 3)).unwrap());
    assert!(store.load_income_overrides("alice").unwrap().is_empty());
    assert!(store.delete_balance_override("alice", ym(2026, 4)).unwrap());
}

#[test]
fn test_budget_round_trip() {
    let (_dir, store) = setup();
    assert!(store.load_budget("alice").unwrap().is_none());

    let budget = HouseholdBudget::with_defaults(300_000);
    store.save_budget("alice", &budget).unwrap();
    assert_eq!(store.load_budget("alice").unwrap(), Some(budget));
}

#[test]
fn test_save_account_keeps_other_data() {
    let (_dir, store) = setup();
    store
        .upsert_event("alice", &FutureEvent::new("e1", "Trip", ym(2026, 5), 1, EventKind::Expense))
        .unwrap();

    let mut account = store.load_account("alice").unwrap();
    account.current_balance = 5;
    store.save_account("alice", &account).unwrap();

    assert_eq!(store.load_account("alice").unwrap().current_balance, 5);
    assert_eq!(store.load_events("alice").unwrap().len(), 1);
    assert_eq!(store.load_baseline("alice").unwrap().monthly_income, 300_000);
}

#[test]
fn test_invalid_override_rows_on_disk_are_ignored() {
    let (_dir, store) = setup();
    store.upsert_income_override("alice", ym(2026, 2), 1).unwrap();

    let path = store.user_path("alice").unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["income_overrides"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({ "year": 2026, "month": 14, "value": 9 }));
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let income = store.load_income_overrides("alice").unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income.get(ym(2026, 2)), Some(1));
}

#[test]
fn test_state_mutations_mirror_to_store() {
    let (_dir, store) = setup();
    let mut state = ForecastState::load(&store, "alice").unwrap();

    state
        .add_event(&store, FutureEvent::new("e1", "Trip", ym(2026, 2), 80_000, EventKind::Expense))
        .unwrap();
    let patch = EventPatch {
        amount: Some(60_000),
        ..Default::default()
    };
    let edited = state.edit_event(&store, "e1", patch).unwrap().unwrap();
    assert_eq!(edited.amount, 60_000);
    assert!(state.edit_event(&store, "nope", EventPatch::default()).unwrap().is_none());
    assert!(state.delete_event(&store, "nope").unwrap().is_none());

    assert_eq!(state.set_income(&store, ym(2026, 3), 350_000).unwrap(), OverrideChange::Inserted);
    assert_eq!(state.set_balance(&store, ym(2026, 4), 2_000_000).unwrap(), OverrideChange::Inserted);

    let reloaded = ForecastState::load(&store, "alice").unwrap();
    assert_eq!(reloaded, state);

    // Setting income back to the baseline deletes the stored row.
    assert_eq!(state.set_income(&store, ym(2026, 3), 300_000).unwrap(), OverrideChange::Removed);
    assert!(store.load_income_overrides("alice").unwrap().is_empty());

    assert_eq!(state.clear_balance(&store, ym(2026, 4)).unwrap(), OverrideChange::Removed);
    assert!(store.load_balance_overrides("alice").unwrap().is_empty());
}

#[test]
fn test_state_projects_in_user_timezone() {
    let (_dir, store) = setup();
    let state = ForecastState::load(&store, "alice").unwrap();

    // 2026-01-31 20:00 UTC is already February in UTC+9.
    let now = Utc.with_ymd_and_hms(2026, 1, 31, 20, 0, 0).unwrap();
    let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
    let ctx = state.context_in(now, &tokyo);
    assert_eq!(ctx.today, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    assert_eq!(ctx.account_created_at, NaiveDate::from_ymd_opt(2026, 1, 3).unwrap());

    let out = state.project(&ctx, ForecastWindow::default());
    assert_eq!(out[0].year_month(), Some(ym(2026, 1)));
    assert!(out[0].is_past);
    assert_eq!(out[0].ending_balance, 150_000);
    assert_eq!(out.len(), 61);
}

#[test]
fn test_state_load_reports_unknown_user() {
    let (_dir, store) = setup();
    assert!(matches!(
        ForecastState::load(&store, "bob"),
        Err(StoreError::UnknownUser(ref u)) if u == "bob"
    ));

    let record = store.load_user("alice").unwrap();
    let state = ForecastState::load(&store, "alice").unwrap();
    assert_eq!(state.account, record.account);
    assert_eq!(state.baseline, record.baseline);
}

#[test]
fn test_adding_same_event_id_twice_keeps_one() {
    let (_dir, store) = setup();
    let mut state = ForecastState::load(&store, "alice").unwrap();

    let trip = FutureEvent::new("e1", "Trip", ym(2026, 5), 80_000, EventKind::Expense);
    state.add_event(&store, trip.clone()).unwrap();
    state
        .add_event(&store, FutureEvent { amount: 95_000, ..trip })
        .unwrap();

    assert_eq!(state.events.len(), 1);
    assert_eq!(state.events.get("e1").unwrap().amount, 95_000);
    let stored = store.load_events("alice").unwrap();
    assert_eq!(stored, state.events);
}

#[test]
fn test_failed_save_leaves_state_untouched() {
    let (_dir, store) = setup();
    let mut state = ForecastState::load(&store, "alice").unwrap();
    state
        .add_event(&store, FutureEvent::new("e1", "Trip", ym(2026, 5), 80_000, EventKind::Expense))
        .unwrap();
    state.set_balance(&store, ym(2026, 4), 500_000).unwrap();
    let before = state.clone();

    // With the document gone every write fails with UnknownUser.
    std::fs::remove_file(store.user_path("alice").unwrap()).unwrap();

    let patch = EventPatch {
        amount: Some(1),
        ..Default::default()
    };
    assert!(state.edit_event(&store, "e1", patch).is_err());
    assert!(state.delete_event(&store, "e1").is_err());
    assert!(
        state
            .add_event(&store, FutureEvent::new("e2", "Gift", ym(2026, 6), 5_000, EventKind::Expense))
            .is_err()
    );
    assert!(state.set_income(&store, ym(2026, 3), 350_000).is_err());
    assert!(state.set_balance(&store, ym(2026, 4), 1).is_err());
    assert!(state.clear_balance(&store, ym(2026, 4)).is_err());
    assert!(state.set_baseline(&store, RecurringBaseline::new(1, 1)).is_err());
    assert_eq!(state, before);
}
