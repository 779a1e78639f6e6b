//! Cached listing reads

use super::{AppState, DirectoryError};
use crate::employee::model::{Department, Employee};

impl AppState {
    /// Every employee of the organization, any status. Served from the
    /// listing cache when present.
    pub async fn get_employees(&self, org_id: &str) -> Result<Vec<Employee>, DirectoryError> {
        if let Some(employees) = self.listing_cache.get(org_id).await {
            log::debug!("Employee listing for {} served from cache", org_id);
            return Ok(employees);
        }

        let employees = self.directory.list_employees(org_id).await?;
        self.listing_cache
            .insert(org_id.to_string(), employees.clone())
            .await;
        log::info!(
            "Employee listing cache updated for {} ({} employees)",
            org_id,
            employees.len()
        );
        Ok(employees)
    }

    /// Active employees only, the canonical input of the org chart.
    pub async fn get_active_employees(
        &self,
        org_id: &str,
    ) -> Result<Vec<Employee>, DirectoryError> {
        let employees = self.get_employees(org_id).await?;
        Ok(employees
            .into_iter()
            .filter(|e| e.status.is_active())
            .collect())
    }

    pub async fn get_departments(&self, org_id: &str) -> Result<Vec<Department>, DirectoryError> {
        let mut departments = self.directory.list_departments(org_id).await?;
        departments.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        Ok(departments)
    }

    /// Drops the cached listing so the next read goes to the directory.
    pub async fn invalidate_listing(&self, org_id: &str) {
        self.listing_cache.invalidate(org_id).await;
        log::debug!("Employee listing cache invalidated for {}", org_id);
    }
}
