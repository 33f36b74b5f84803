//! Salary audit trail models.
//!
//! Audit entries are append-only: the store never mutates or removes them.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditEntryId, EmployeeId};

/// How the basic salary was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// The salary was set when the employee was created.
    Create,
    /// An existing salary was changed to a different value.
    Update,
}

impl ChangeKind {
    /// The stored spelling, matching the serialized form.
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Update => "UPDATE",
        }
    }

    pub(crate) fn from_sql(value: &str) -> Option<Self> {
        match value {
            "CREATE" => Some(ChangeKind::Create),
            "UPDATE" => Some(ChangeKind::Update),
            _ => None,
        }
    }
}

/// The principal performing a write.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Actor;
///
/// let actor = Actor::new("hr.admin");
/// assert_eq!(actor.as_str(), "hr.admin");
/// assert_eq!(Actor::system().as_str(), "system");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Creates an actor from its identity string.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// The actor used for writes with no identified principal.
    pub fn system() -> Self {
        Self::new("system")
    }

    /// Returns the actor's identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorded basic-salary assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic identity of the entry.
    pub id: AuditEntryId,
    /// The employee whose salary was assigned.
    pub employee_id: EmployeeId,
    /// The salary before the write; `None` on creation.
    pub previous_salary: Option<Decimal>,
    /// The salary after the write.
    pub new_salary: Decimal,
    /// Who performed the write.
    pub changed_by: Actor,
    /// When the write happened.
    pub changed_at: DateTime<Utc>,
    /// Whether this was a creation or an update.
    pub change_kind: ChangeKind,
}
