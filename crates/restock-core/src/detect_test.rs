use chrono::{TimeZone, Utc};

use super::*;
use crate::product::Currency;

fn observed(available: bool) -> Product {
    Product {
        name: "RTX 3080 FE".to_owned(),
        url: "https://www.ldlc.com/fiche/PB123.html".to_owned(),
        price: 719.0,
        currency: Currency::Eur,
        available,
    }
}

fn persisted(available: bool, thread_id: Option<i64>) -> PersistedProduct {
    PersistedProduct {
        name: "RTX 3080 FE".to_owned(),
        url: "https://www.ldlc.com/fiche/PB123.html".to_owned(),
        price: 719.0,
        currency: Currency::Eur,
        available,
        updated_at: Utc.with_ymd_and_hms(2021, 2, 1, 8, 0, 0).unwrap(),
        thread_id,
    }
}

#[test]
fn create_available_opens_thread() {
    let decision = decide(None, &observed(true), Utc::now());
    assert_eq!(
        decision,
        Decision::Create {
            action: Some(ThreadAction::Open)
        }
    );
}

#[test]
fn create_unavailable_stays_silent() {
    let decision = decide(None, &observed(false), Utc::now());
    assert_eq!(decision, Decision::Create { action: None });
}

#[test]
fn identical_records_are_a_noop() {
    let existing = persisted(true, Some(42));
    let decision = decide(Some(&existing), &observed(true), Utc::now());
    assert_eq!(decision, Decision::Noop);
}

#[test]
fn stable_unavailable_is_a_noop() {
    let existing = persisted(false, None);
    let decision = decide(Some(&existing), &observed(false), Utc::now());
    assert_eq!(decision, Decision::Noop);
}

#[test]
fn restock_without_thread_opens_one() {
    let existing = persisted(false, None);
    let decision = decide(Some(&existing), &observed(true), Utc::now());
    let Decision::Update { changes, action } = decision else {
        panic!("expected Update");
    };
    assert!(changes.available);
    assert_eq!(action, Some(ThreadAction::Open));
}

#[test]
fn restock_with_lingering_thread_does_not_open_another() {
    // A thread id can linger when a close-thread delivery failed; becoming
    // available again must not reply into a conversation believed open.
    let existing = persisted(false, Some(42));
    let decision = decide(Some(&existing), &observed(true), Utc::now());
    let Decision::Update { action, .. } = decision else {
        panic!("expected Update");
    };
    assert_eq!(action, None);
}

#[test]
fn out_of_stock_closes_thread_with_duration() {
    let existing = persisted(true, Some(42));
    let now = existing.updated_at + Duration::hours(26) + Duration::minutes(5);
    let decision = decide(Some(&existing), &observed(false), now);
    let Decision::Update { changes, action } = decision else {
        panic!("expected Update");
    };
    assert!(changes.available);
    assert_eq!(
        action,
        Some(ThreadAction::Close {
            thread_id: 42,
            open_duration: Duration::hours(26) + Duration::minutes(5),
        })
    );
}

#[test]
fn out_of_stock_without_thread_updates_silently() {
    let existing = persisted(true, None);
    let decision = decide(Some(&existing), &observed(false), Utc::now());
    let Decision::Update { action, .. } = decision else {
        panic!("expected Update");
    };
    assert_eq!(action, None);
}

#[test]
fn price_only_change_never_notifies() {
    let existing = persisted(true, Some(42));
    let mut incoming = observed(true);
    incoming.price = 999.0;
    let decision = decide(Some(&existing), &incoming, Utc::now());
    let Decision::Update { changes, action } = decision else {
        panic!("expected Update");
    };
    assert!(changes.price);
    assert!(!changes.available);
    assert_eq!(action, None);
}

#[test]
fn url_only_change_never_notifies() {
    let existing = persisted(false, None);
    let mut incoming = observed(false);
    incoming.url = "https://www.ldlc.com/fiche/PB456.html".to_owned();
    let decision = decide(Some(&existing), &incoming, Utc::now());
    let Decision::Update { changes, action } = decision else {
        panic!("expected Update");
    };
    assert!(changes.url);
    assert_eq!(action, None);
}

#[test]
fn currency_change_is_detected() {
    let existing = persisted(true, None);
    let mut incoming = observed(true);
    incoming.currency = Currency::Usd;
    let decision = decide(Some(&existing), &incoming, Utc::now());
    let Decision::Update { changes, .. } = decision else {
        panic!("expected Update");
    };
    assert!(changes.currency);
}

#[test]
fn diff_reports_no_changes_for_identical_state() {
    let existing = persisted(true, None);
    assert!(!diff(&existing, &observed(true)).any());
}
