//! One-off dated cash movements and the list operations the UI drives.

use serde::{Deserialize, Serialize};

use crate::Yen;
use crate::month::YearMonth;

/// Direction of a one-off event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

/// Display grouping for events. Never used in computation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventCategory {
    #[serde(rename = "travel")]
    Travel,
    #[serde(rename = "gift")]
    Gift,
    #[serde(rename = "hobby")]
    Hobby,
    /// Weddings, funerals, moving house.
    #[serde(rename = "life")]
    Life,
    #[serde(rename = "bonus")]
    Bonus,
    /// Windfall / irregular salary.
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "other")]
    Other,
}

impl EventCategory {
    pub const EXPENSE: [EventCategory; 5] = [
        EventCategory::Travel,
        EventCategory::Gift,
        EventCategory::Hobby,
        EventCategory::Life,
        EventCategory::Other,
    ];

    pub const INCOME: [EventCategory; 3] = [
        EventCategory::Bonus,
        EventCategory::Salary,
        EventCategory::Other,
    ];

    /// Categories offered for a given event kind.
    pub fn for_kind(kind: EventKind) -> &'static [EventCategory] {
        match kind {
            EventKind::Income => &Self::INCOME,
            EventKind::Expense => &Self::EXPENSE,
        }
    }

    /// Category a fresh event of `kind` starts with.
    pub fn default_for(kind: EventKind) -> EventCategory {
        match kind {
            EventKind::Income => EventCategory::Bonus,
            EventKind::Expense => EventCategory::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Travel => "Travel",
            EventCategory::Gift => "Gifts",
            EventCategory::Hobby => "Hobbies",
            EventCategory::Life => "Life events & moving",
            EventCategory::Bonus => "Bonus",
            EventCategory::Salary => "Windfall income",
            EventCategory::Other => "Other",
        }
    }
}

/// A one-off income or expense landing in a specific calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FutureEvent {
    /// Stable across edits.
    pub id: String,
    pub label: String,
    pub year: i32,
    /// 1-12. Out-of-range values never match a projected month.
    pub month: u32,
    /// Non-negative magnitude; `kind` carries the sign.
    pub amount: Yen,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub category: EventCategory,
}

impl FutureEvent {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        at: YearMonth,
        amount: Yen,
        kind: EventKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            year: at.year(),
            month: at.month(),
            amount,
            kind,
            category: EventCategory::default_for(kind),
        }
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = category;
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == EventKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EventKind::Expense
    }

    /// True if this event lands in `ym`.
    pub fn lands_in(&self, ym: YearMonth) -> bool {
        ym.matches(self.year, self.month)
    }

    /// Signed contribution to the month's net.
    pub fn signed_amount(&self) -> Yen {
        match self.kind {
            EventKind::Income => self.amount,
            EventKind::Expense => -self.amount,
        }
    }
}

/// Partial replacement for an existing event. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    pub label: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub amount: Option<Yen>,
    pub kind: Option<EventKind>,
    pub category: Option<EventCategory>,
}

impl EventPatch {
    fn apply(self, event: &mut FutureEvent) {
        if let Some(label) = self.label {
            event.label = label;
        }
        if let Some(year) = self.year {
            event.year = year;
        }
        if let Some(month) = self.month {
            event.month = month;
        }
        if let Some(amount) = self.amount {
            event.amount = amount;
        }
        if let Some(kind) = self.kind {
            event.kind = kind;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
    }
}

/// Insertion-ordered list of a user's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventList {
    events: Vec<FutureEvent>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[FutureEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &FutureEvent> {
        self.events.iter()
    }

    pub fn get(&self, id: &str) -> Option<&FutureEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Append. No validation happens here; the input boundary owns that.
    pub fn add(&mut self, event: FutureEvent) {
        self.events.push(event);
    }

    /// Remove by id. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str) -> Option<FutureEvent> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(pos))
    }

    /// Patch the matching event in place, keeping its position.
    /// Returns false if no event has `id`.
    pub fn edit(&mut self, id: &str, patch: EventPatch) -> bool {
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                patch.apply(event);
                true
            }
            None => false,
        }
    }

    /// Replace an event wholesale (same id), or append if absent.
    pub fn upsert(&mut self, event: FutureEvent) {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => *slot = event,
            None => self.events.push(event),
        }
    }

    /// Events landing in `ym`, in insertion order.
    pub fn in_month(&self, ym: YearMonth) -> impl Iterator<Item = &FutureEvent> {
        self.events.iter().filter(move |e| e.lands_in(ym))
    }

    /// Sum of all event amounts of one kind.
    pub fn total_amount(&self, kind: EventKind) -> Yen {
        self.events
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
            .sum()
    }
}

impl From<Vec<FutureEvent>> for EventList {
    fn from(events: Vec<FutureEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<FutureEvent> for EventList {
    fn from_iter<I: IntoIterator<Item = FutureEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
