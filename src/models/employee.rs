//! Employee model and related types.
//!
//! This module defines the stored [`Employee`] record together with the
//! [`NewEmployee`] and [`EmployeeUpdate`] inputs accepted by the employee store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DepartmentId, EmployeeId};

/// Represents an employee on the payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// The employee's display name.
    pub name: String,
    /// The employee's email address, unique across employees.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// The department the employee belongs to.
    pub department_id: DepartmentId,
    /// Job title, free text.
    #[serde(default)]
    pub designation: String,
    /// Monthly basic salary. Always positive, at most two decimal places.
    pub basic_salary: Decimal,
}

/// Fields required to create an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// The employee's display name.
    pub name: String,
    /// The employee's email address.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// The department the employee belongs to.
    pub department_id: DepartmentId,
    /// Job title, free text.
    #[serde(default)]
    pub designation: String,
    /// Initial monthly basic salary.
    pub basic_salary: Decimal,
}

/// A partial update to an employee. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New hire date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    /// New department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    /// New job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    /// New monthly basic salary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_salary: Option<Decimal>,
}

impl EmployeeUpdate {
    /// Returns an update that only changes the basic salary.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::EmployeeUpdate;
    /// use rust_decimal::Decimal;
    ///
    /// let update = EmployeeUpdate::basic_salary(Decimal::new(3500000, 2));
    /// assert_eq!(update.basic_salary, Some(Decimal::new(3500000, 2)));
    /// assert!(update.name.is_none());
    /// ```
    pub fn basic_salary(amount: Decimal) -> Self {
        Self {
            basic_salary: Some(amount),
            ..Self::default()
        }
    }
}

impl Employee {
    /// Builds the stored record for a newly allocated id.
    pub(crate) fn from_new(id: EmployeeId, fields: NewEmployee) -> Self {
        Employee {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            hire_date: fields.hire_date,
            department_id: fields.department_id,
            designation: fields.designation,
            basic_salary: fields.basic_salary,
        }
    }

    /// Applies a partial update and returns the previous basic salary.
    pub(crate) fn apply(&mut self, update: EmployeeUpdate) -> Decimal {
        let previous_salary = self.basic_salary;
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(hire_date) = update.hire_date {
            self.hire_date = hire_date;
        }
        if let Some(department_id) = update.department_id {
            self.department_id = department_id;
        }
        if let Some(designation) = update.designation {
            self.designation = designation;
        }
        if let Some(basic_salary) = update.basic_salary {
            self.basic_salary = basic_salary;
        }
        previous_salary
    }
}
