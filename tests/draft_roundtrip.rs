use std::rc::Rc;
use std::time::{Duration, Instant};

use onboarding_core::config::Config;
use onboarding_core::form::{BusinessTypeId, FormCommand, FormOrchestrator};
use onboarding_core::notify::RecordingNotifier;
use onboarding_core::storage::{DraftStore, JsonDraftStore, MemoryDraftStore};
use tempfile::TempDir;

fn file_store() -> (JsonDraftStore, TempDir) {
    let temp = TempDir::new().expect("temp dir");
    let store =
        JsonDraftStore::new(Some(temp.path().to_path_buf()), "draft.json").expect("store");
    (store, temp)
}

fn populate<S: DraftStore>(form: &mut FormOrchestrator<S, RecordingNotifier>, now: Instant) {
    form.apply(
        FormCommand::SelectBusinessType(BusinessTypeId::Partnership),
        now,
    );
    for (key, value) in [
        ("name", "Bell & Sons"),
        ("address", "1 High Street, York"),
        ("partners", "A. Bell, B. Bell"),
    ] {
        form.apply(
            FormCommand::EditBusinessField {
                key: key.into(),
                value: value.into(),
            },
            now,
        );
    }
    for (key, value) in [
        ("name", "Jane Doe"),
        ("position", "Superintendent"),
        ("email", "jane@example.org"),
        ("telephone", "07123456789"),
    ] {
        form.apply(
            FormCommand::EditContactField {
                key: key.into(),
                value: value.into(),
            },
            now,
        );
    }
    for code in ["AB123", "XY45"] {
        form.apply(FormCommand::AddPharmacy { code: code.into() }, now);
    }
    for (gphc, name) in [
        ("1234567", "Jane Doe"),
        ("2345678", "John Smith"),
        ("3456789", "Amrit Kaur"),
    ] {
        form.apply(
            FormCommand::AddPharmacist {
                gphc: gphc.into(),
                name: name.into(),
            },
            now,
        );
    }
}

#[test]
fn full_state_survives_a_reload() {
    let (store, _guard) = file_store();
    let now = Instant::now();

    let mut form = FormOrchestrator::new(store.clone(), RecordingNotifier::new(), Config::default());
    populate(&mut form, now);
    // Field edits are debounced; settle the pending write.
    form.poll_autosave(now + Duration::from_secs(1));
    let before = form.snapshot();

    let mut reloaded =
        FormOrchestrator::new(store, RecordingNotifier::new(), Config::default());
    assert!(reloaded.hydrate());
    assert_eq!(reloaded.snapshot(), before);
    assert_eq!(reloaded.business_type(), Some(BusinessTypeId::Partnership));
    assert_eq!(
        reloaded.codes().values(),
        vec!["AB123".to_string(), "XY45".to_string()]
    );
    let roster: Vec<&str> = reloaded
        .roster()
        .records()
        .iter()
        .map(|record| record.gphc.as_str())
        .collect();
    assert_eq!(roster, vec!["1234567", "2345678", "3456789"]);
}

#[test]
fn hydrate_without_a_draft_renders_an_empty_form() {
    let (store, _guard) = file_store();
    let mut form = FormOrchestrator::new(store, RecordingNotifier::new(), Config::default());
    assert!(!form.hydrate());
    assert!(form.business_type().is_none());
    assert!(form.codes().is_empty());
    assert!(form.roster().is_empty());
}

#[test]
fn legacy_drafts_with_missing_keys_hydrate_cleanly() {
    let (store, guard) = file_store();
    std::fs::write(
        guard.path().join("draft.json"),
        r#"{"businessType":"soleTrader"}"#,
    )
    .expect("seed legacy draft");
    let mut form = FormOrchestrator::new(store, RecordingNotifier::new(), Config::default());
    assert!(form.hydrate());
    assert_eq!(form.business_type(), Some(BusinessTypeId::SoleTrader));
    assert!(form.codes().is_empty());
    assert!(form.roster().is_empty());
}

#[test]
fn reorder_survives_persistence() {
    let (store, _guard) = file_store();
    let now = Instant::now();
    let mut form = FormOrchestrator::new(store.clone(), RecordingNotifier::new(), Config::default());
    populate(&mut form, now);

    // Drag the last pharmacist above everyone else.
    let boxes = vec![
        onboarding_core::form::roster::RowBox {
            top: 0.0,
            height: 40.0,
        },
        onboarding_core::form::roster::RowBox {
            top: 40.0,
            height: 40.0,
        },
    ];
    form.apply(
        FormCommand::ReorderRoster {
            from_index: 2,
            pointer_y: 3.0,
            row_boxes: boxes,
        },
        now,
    );

    let mut reloaded =
        FormOrchestrator::new(store, RecordingNotifier::new(), Config::default());
    assert!(reloaded.hydrate());
    let roster: Vec<&str> = reloaded
        .roster()
        .records()
        .iter()
        .map(|record| record.gphc.as_str())
        .collect();
    assert_eq!(roster, vec!["3456789", "1234567", "2345678"]);
}

#[test]
fn storage_failures_never_reach_the_user_or_block_the_edit() {
    let store = Rc::new(MemoryDraftStore::new());
    let now = Instant::now();
    let mut form =
        FormOrchestrator::new(store.clone(), RecordingNotifier::new(), Config::default());
    store.poison();

    form.apply(
        FormCommand::SelectBusinessType(BusinessTypeId::SoleTrader),
        now,
    );
    form.apply(
        FormCommand::AddPharmacist {
            gphc: "1234567".into(),
            name: "Jane Doe".into(),
        },
        now,
    );

    // The in-memory mutations applied even though every write failed.
    assert_eq!(form.business_type(), Some(BusinessTypeId::SoleTrader));
    assert_eq!(form.roster().len(), 1);
}

#[test]
fn clear_form_wipes_store_and_state() {
    let store = Rc::new(MemoryDraftStore::new());
    let now = Instant::now();
    let notifier = RecordingNotifier::new();
    let mut form = FormOrchestrator::new(store.clone(), notifier, Config::default());
    form.apply(
        FormCommand::SelectBusinessType(BusinessTypeId::SoleTrader),
        now,
    );
    form.apply(
        FormCommand::AddPharmacy {
            code: "AB123".into(),
        },
        now,
    );
    assert!(store.snapshot().is_some());

    form.apply(FormCommand::ClearForm, now);
    assert!(store.snapshot().is_none());
    assert!(form.business_type().is_none());
    assert!(form.codes().is_empty());
    assert!(form.snapshot().is_empty());
}
