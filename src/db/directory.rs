//! Directory collaborator: the source of per-organization employee and
//! department listings.
//!
//! The server only reads from the directory. `InMemoryDirectory` is seeded
//! from a JSON file at startup and can be replaced wholesale at runtime.

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::employee::model::{Department, Employee};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("organization '{0}' not found")]
    OrganizationNotFound(String),
    #[error("directory backend failure: {0}")]
    Backend(String),
}

/// Read access to the employee directory, scoped to one organization.
#[async_trait]
pub trait DirectorySource {
    /// All employees of the organization, any status. Each record embeds its
    /// resolved department reference when it has one.
    async fn list_employees(&self, org_id: &str) -> Result<Vec<Employee>, DirectoryError>;

    async fn list_departments(&self, org_id: &str) -> Result<Vec<Department>, DirectoryError>;
}

/// One organization as stored in the seed file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrganizationDirectory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DirectorySeed {
    pub organizations: Vec<OrganizationDirectory>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    organizations: RwLock<HashMap<String, OrganizationDirectory>>,
}

impl InMemoryDirectory {
    pub fn new(seed: DirectorySeed) -> Self {
        let directory = Self::default();
        directory.replace(seed);
        directory
    }

    /// Loads a seed file. A missing file yields an empty directory; any other
    /// read failure is an error.
    pub async fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "Directory seed file {} not found, starting with an empty directory",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read directory seed {}", path.display()))
            }
        };
        let seed: DirectorySeed = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse directory seed {}", path.display()))?;

        log::info!(
            "Loaded directory seed {} ({} organizations)",
            path.display(),
            seed.organizations.len()
        );
        Ok(Self::new(seed))
    }

    /// Swaps the whole directory content.
    pub fn replace(&self, seed: DirectorySeed) {
        let organizations = seed
            .organizations
            .into_iter()
            .map(|org| (org.id.clone(), with_resolved_departments(org)))
            .collect();
        *self.organizations.write() = organizations;
    }

    pub fn organization_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.organizations.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Fills in each employee's embedded department reference from the
/// organization's departments, the way the listing endpoint returns them.
fn with_resolved_departments(mut org: OrganizationDirectory) -> OrganizationDirectory {
    let by_id: HashMap<&str, &Department> =
        org.departments.iter().map(|d| (d.id.as_str(), d)).collect();
    for employee in &mut org.employees {
        if employee.department.is_none() {
            employee.department = employee
                .department_id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .map(|dept| dept.to_ref());
        }
    }
    org
}

#[async_trait]
impl DirectorySource for InMemoryDirectory {
    async fn list_employees(&self, org_id: &str) -> Result<Vec<Employee>, DirectoryError> {
        self.organizations
            .read()
            .get(org_id)
            .map(|org| org.employees.clone())
            .ok_or_else(|| DirectoryError::OrganizationNotFound(org_id.to_string()))
    }

    async fn list_departments(&self, org_id: &str) -> Result<Vec<Department>, DirectoryError> {
        self.organizations
            .read()
            .get(org_id)
            .map(|org| org.departments.clone())
            .ok_or_else(|| DirectoryError::OrganizationNotFound(org_id.to_string()))
    }
}
