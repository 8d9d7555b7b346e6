use crate::error::{CertifyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const BUILTIN_PROJECTS: &str = include_str!("../data/projects.json");

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    InProgress,
    UnderReview,
    Certified,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::UnderReview => "under_review",
            ProjectStatus::Certified => "certified",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = CertifyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "in_progress" | "in-progress" => Ok(ProjectStatus::InProgress),
            "under_review" | "under-review" => Ok(ProjectStatus::UnderReview),
            "certified" => Ok(ProjectStatus::Certified),
            _ => Err(CertifyError::InvalidValue {
                field: "status".to_string(),
                reason: format!("unknown status '{s}'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub organization: String,
    /// Free-form; compared by exact, case-sensitive equality.
    pub certification_type: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 0–100.
    pub progress: u8,
    pub location: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only list of mock projects shown on the landing dashboard.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// The embedded mock project list.
    pub fn builtin() -> Result<Self> {
        let projects: Vec<Project> = serde_json::from_str(BUILTIN_PROJECTS)?;
        Ok(Self::new(projects))
    }

    pub fn all(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CertifyError::ProjectNotFound(id.to_string()))
    }

    /// Projects whose certification type equals `ty` exactly, in list order.
    pub fn by_certification_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = &'a Project> {
        self.projects
            .iter()
            .filter(move |p| p.certification_type == ty)
    }

    pub fn by_status(&self, status: ProjectStatus) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(move |p| p.status == status)
    }

    /// Distinct certification types, first-seen order.
    pub fn certification_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for p in &self.projects {
            if !types.contains(&p.certification_type.as_str()) {
                types.push(&p.certification_type);
            }
        }
        types
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, ty: &str) -> Project {
        let at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            organization: "Acme".to_string(),
            certification_type: ty.to_string(),
            status: ProjectStatus::Draft,
            created_at: at,
            updated_at: at,
            progress: 0,
            location: "Oslo".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.all().len(), 7);
        assert!(catalog.all().iter().all(|p| p.progress <= 100));
        assert!(catalog.all().iter().all(|p| p.updated_at >= p.created_at));
    }

    #[test]
    fn filter_by_building_keeps_order() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<&str> = catalog
            .by_certification_type("building")
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["proj-001", "proj-003", "proj-006"]);
    }

    #[test]
    fn filter_is_case_sensitive() {
        let catalog = Catalog::new(vec![
            project("a", "building"),
            project("b", "Building"),
            project("c", "product"),
            project("d", "building"),
        ]);
        let ids: Vec<&str> = catalog
            .by_certification_type("building")
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(catalog.by_certification_type("BUILDING").count(), 0);
    }

    #[test]
    fn get_unknown_project_fails() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.get("proj-002").unwrap().organization, "Fjord Logistics");
        assert!(matches!(
            catalog.get("proj-999"),
            Err(CertifyError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn filter_by_status() {
        let catalog = Catalog::builtin().unwrap();
        let certified: Vec<&str> = catalog
            .by_status(ProjectStatus::Certified)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(certified, vec!["proj-003"]);
    }

    #[test]
    fn distinct_types_in_first_seen_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.certification_types(),
            vec!["building", "organization", "product", "event"]
        );
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&project("a", "event")).unwrap();
        assert!(json.contains("\"certificationType\":\"event\""));
        assert!(json.contains("\"status\":\"draft\""));
    }
}
