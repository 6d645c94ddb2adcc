//! Change detection between a freshly extracted product and its persisted
//! counterpart.
//!
//! The decision procedure is pure: callers (the store) fetch the persisted
//! row keyed by `(name, shop)`, ask [`decide`] what to do, then perform the
//! store mutation and notification side effects the decision names.

use chrono::{DateTime, Duration, Utc};

use crate::product::{PersistedProduct, Product};

/// Field-level comparison result between a persisted row and a new
/// observation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldChanges {
    pub name: bool,
    pub price: bool,
    pub currency: bool,
    pub available: bool,
    pub url: bool,
}

impl FieldChanges {
    /// Returns `true` when at least one compared field differs.
    #[must_use]
    pub fn any(self) -> bool {
        self.name || self.price || self.currency || self.available || self.url
    }
}

/// Compares the fields that participate in change detection.
///
/// Price equality is exact: both sides come from the same parsing rules, so a
/// repeated observation of an unchanged page yields bit-identical values.
#[must_use]
pub fn diff(existing: &PersistedProduct, incoming: &Product) -> FieldChanges {
    FieldChanges {
        name: existing.name != incoming.name,
        price: existing.price != incoming.price,
        currency: existing.currency != incoming.currency,
        available: existing.available != incoming.available,
        url: existing.url != incoming.url,
    }
}

/// Notification side effect attached to a [`Decision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadAction {
    /// Open a new availability thread for the product.
    Open,
    /// Close the currently open thread; `open_duration` is how long the
    /// product stayed available.
    Close {
        thread_id: i64,
        open_duration: Duration,
    },
}

/// What the store should do with a freshly extracted product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No persisted row exists; insert one. `action` is `Some(Open)` exactly
    /// when the new product is available.
    Create { action: Option<ThreadAction> },
    /// The persisted row differs; overwrite its mutable fields. The stored
    /// thread id becomes the id produced by an `Open` action this cycle, or
    /// null otherwise — closing a thread deliberately forgets its id so a
    /// later restock opens a fresh thread.
    Update {
        changes: FieldChanges,
        action: Option<ThreadAction>,
    },
    /// Nothing changed: no store write, no notification.
    Noop,
}

/// Decides CREATE / UPDATE / NO-OP for one extracted product.
///
/// Only availability transitions ever produce a [`ThreadAction`]; price,
/// name, and URL changes update the row silently.
#[must_use]
pub fn decide(
    existing: Option<&PersistedProduct>,
    incoming: &Product,
    now: DateTime<Utc>,
) -> Decision {
    let Some(existing) = existing else {
        let action = incoming.available.then_some(ThreadAction::Open);
        return Decision::Create { action };
    };

    let changes = diff(existing, incoming);
    if !changes.any() {
        return Decision::Noop;
    }

    let action = if changes.available {
        if incoming.available && existing.thread_id.is_none() {
            Some(ThreadAction::Open)
        } else if !incoming.available && existing.available {
            existing.thread_id.map(|thread_id| ThreadAction::Close {
                thread_id,
                open_duration: now - existing.updated_at,
            })
        } else {
            None
        }
    } else {
        None
    };

    Decision::Update { changes, action }
}

#[cfg(test)]
#[path = "detect_test.rs"]
mod tests;
