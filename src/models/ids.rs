//! Typed identifiers allocated by the store.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The id as an SQLite integer. Ids beyond `i64::MAX` are never
            /// allocated, so they map to a key no row has.
            pub(crate) fn to_sql(self) -> i64 {
                i64::try_from(self.0).unwrap_or(-1)
            }

            /// The id from an SQLite rowid, which is always positive.
            pub(crate) fn from_sql(value: i64) -> Self {
                Self(value.unsigned_abs())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an employee.
    EmployeeId
);
define_id!(
    /// Identifier of a department.
    DepartmentId
);
define_id!(
    /// Identifier of a salary period record.
    SalaryRecordId
);
define_id!(
    /// Identifier of an audit entry.
    AuditEntryId
);
