use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employment status as stored by the directory.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
    Terminated,
}

impl EmployeeStatus {
    /// Only active employees are placed on the org chart.
    pub fn is_active(self) -> bool {
        matches!(self, EmployeeStatus::Active)
    }
}

/// Resolved department reference embedded in a listing record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct DepartmentRef {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub department: Option<DepartmentRef>,
    #[serde(default)]
    pub manager_id: Option<String>,
    pub status: EmployeeStatus,
    pub hire_date: DateTime<Utc>,
}

impl Employee {
    /// Department key used for grouping. The explicit `department_id` wins over
    /// the embedded reference.
    pub fn department_key(&self) -> Option<&str> {
        self.department_id
            .as_deref()
            .or_else(|| self.department.as_ref().map(|d| d.id.as_str()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_department_id: Option<String>,
}

impl Department {
    pub fn to_ref(&self) -> DepartmentRef {
        DepartmentRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Body of the employee listing endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct EmployeeListing {
    pub employees: Vec<Employee>,
}

/// Status filter accepted by the listing endpoint.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    Active,
    All,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListingQuery {
    #[serde(default)]
    pub status: StatusFilter,
}
