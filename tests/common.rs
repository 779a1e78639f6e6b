#![allow(dead_code)]

use actix_web::web;
use chrono::{DateTime, Utc};
use org_directory_server::db::directory::{DirectorySeed, OrganizationDirectory};
use org_directory_server::db::InMemoryDirectory;
use org_directory_server::employee::model::{Department, Employee, EmployeeStatus};
use org_directory_server::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const ORG_ID: &str = "acme";

pub fn employee(id: &str, name: &str, manager: Option<&str>, dept: Option<&str>) -> Employee {
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        title: "Staff".to_string(),
        email: format!("{}@acme.test", id),
        department_id: dept.map(str::to_string),
        department: None,
        manager_id: manager.map(str::to_string),
        status: EmployeeStatus::Active,
        hire_date: DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap(),
    }
}

pub fn department(id: &str, name: &str) -> Department {
    Department {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} department", name),
        parent_department_id: None,
    }
}

/// Acme: an engineering chain, a sales team, one unassigned employee and one
/// terminated employee.
pub fn acme() -> OrganizationDirectory {
    let mut terminated = employee("e-9", "Trent", Some("e-1"), Some("eng"));
    terminated.status = EmployeeStatus::Terminated;

    OrganizationDirectory {
        id: ORG_ID.to_string(),
        name: "Acme".to_string(),
        departments: vec![department("sales", "Sales"), department("eng", "Engineering")],
        employees: vec![
            employee("e-1", "Ada", None, Some("eng")),
            employee("e-2", "Brian", Some("e-1"), Some("eng")),
            employee("e-3", "Chen", Some("e-2"), Some("eng")),
            employee("e-4", "Dana", None, Some("sales")),
            employee("e-5", "Eve", Some("e-4"), Some("sales")),
            employee("e-6", "Finn", Some("e-1"), None),
            terminated,
        ],
    }
}

/// An organization whose manager references form a loop.
pub fn looped() -> OrganizationDirectory {
    OrganizationDirectory {
        id: "loop".to_string(),
        name: "Loop".to_string(),
        departments: vec![],
        employees: vec![
            employee("a", "A", Some("b"), None),
            employee("b", "B", Some("a"), None),
        ],
    }
}

pub fn seed() -> DirectorySeed {
    DirectorySeed {
        organizations: vec![acme(), looped()],
    }
}

pub fn directory() -> Arc<InMemoryDirectory> {
    Arc::new(InMemoryDirectory::new(seed()))
}

pub fn app_state(directory: Arc<InMemoryDirectory>) -> web::Data<AppState> {
    web::Data::new(AppState::new_with_directory(
        directory,
        Duration::from_secs(60),
    ))
}
