use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StepId
// ---------------------------------------------------------------------------

/// The ordered steps of the project-creation wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Details,
    Owner,
    Address,
    Agreement,
}

impl StepId {
    pub fn all() -> &'static [StepId] {
        &[
            StepId::Details,
            StepId::Owner,
            StepId::Address,
            StepId::Agreement,
        ]
    }

    /// 1-based position, matching the wizard cursor.
    pub fn position(self) -> usize {
        self as usize + 1
    }

    pub fn at(position: usize) -> Option<StepId> {
        position
            .checked_sub(1)
            .and_then(|i| StepId::all().get(i))
            .copied()
    }

    pub fn next(self) -> Option<StepId> {
        StepId::at(self.position() + 1)
    }

    pub fn prev(self) -> Option<StepId> {
        StepId::at(self.position() - 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Details => "details",
            StepId::Owner => "owner",
            StepId::Address => "address",
            StepId::Agreement => "agreement",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StepId::Details => "Project Details",
            StepId::Owner => "Owner Info",
            StepId::Address => "Address",
            StepId::Agreement => "Agreement",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StepId::Details => "Name the project and choose what is being certified",
            StepId::Owner => "Who owns the project and how to reach them",
            StepId::Address => "Where the certified asset is located",
            StepId::Agreement => "Accept the certification terms and data handling",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepId {
    type Err = crate::error::CertifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "details" => Ok(StepId::Details),
            "owner" => Ok(StepId::Owner),
            "address" => Ok(StepId::Address),
            "agreement" => Ok(StepId::Agreement),
            _ => Err(crate::error::CertifyError::InvalidStep(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// Dashboard tabs. Unlike wizard steps they carry no ordering dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Overview,
    Organization,
    Location,
    Energy,
    Emissions,
    Disclosure,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Overview,
            Tab::Organization,
            Tab::Location,
            Tab::Energy,
            Tab::Emissions,
            Tab::Disclosure,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Organization => "organization",
            Tab::Location => "location",
            Tab::Energy => "energy",
            Tab::Emissions => "emissions",
            Tab::Disclosure => "disclosure",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Organization => "Organization",
            Tab::Location => "Location",
            Tab::Energy => "Energy",
            Tab::Emissions => "Emissions",
            Tab::Disclosure => "Disclosure",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tab {
    type Err = crate::error::CertifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Tab::Overview),
            "organization" => Ok(Tab::Organization),
            "location" => Ok(Tab::Location),
            "energy" => Ok(Tab::Energy),
            "emissions" => Ok(Tab::Emissions),
            "disclosure" => Ok(Tab::Disclosure),
            _ => Err(crate::error::CertifyError::InvalidTab(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Flag,
    Number,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Text => "text",
            FieldKind::Flag => "flag",
            FieldKind::Number => "number",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn step_positions_are_one_based() {
        assert_eq!(StepId::Details.position(), 1);
        assert_eq!(StepId::Agreement.position(), 4);
        assert_eq!(StepId::at(0), None);
        assert_eq!(StepId::at(2), Some(StepId::Owner));
        assert_eq!(StepId::at(5), None);
    }

    #[test]
    fn step_next_and_prev() {
        assert_eq!(StepId::Details.next(), Some(StepId::Owner));
        assert_eq!(StepId::Agreement.next(), None);
        assert_eq!(StepId::Details.prev(), None);
        assert_eq!(StepId::Address.prev(), Some(StepId::Owner));
    }

    #[test]
    fn step_ordering() {
        assert!(StepId::Details < StepId::Owner);
        assert!(StepId::Agreement > StepId::Address);
    }

    #[test]
    fn step_parse() {
        for step in StepId::all() {
            assert_eq!(StepId::from_str(step.as_str()).unwrap(), *step);
        }
        assert!(StepId::from_str("payment").is_err());
    }

    #[test]
    fn tab_parse() {
        assert_eq!(Tab::from_str("energy").unwrap(), Tab::Energy);
        assert!(Tab::from_str("Energy").is_err());
        assert_eq!(Tab::all().len(), 6);
    }
}
