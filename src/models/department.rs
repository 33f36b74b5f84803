//! Department model.

use serde::{Deserialize, Serialize};

use super::{DepartmentId, EmployeeId};

/// An organizational unit employees belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier for the department.
    pub id: DepartmentId,
    /// The department name.
    pub name: String,
    /// Where the department is based.
    pub location: String,
    /// The managing employee. Not checked for existence.
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
}

/// Fields required to create a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    /// The department name.
    pub name: String,
    /// Where the department is based.
    pub location: String,
    /// The managing employee, if any.
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
}

impl Department {
    pub(crate) fn from_new(id: DepartmentId, fields: NewDepartment) -> Self {
        Department {
            id,
            name: fields.name,
            location: fields.location,
            manager_id: fields.manager_id,
        }
    }
}
