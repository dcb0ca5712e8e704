use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Role a user holds inside one project.
///
/// The display names are part of the persisted vocabulary (membership rows
/// store them verbatim), so they must not change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectRole {
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Leader")]
    Leader,
    #[serde(rename = "Tester")]
    Tester,
    #[serde(rename = "Member")]
    Member,
}

impl ProjectRole {
    pub const ALL: [ProjectRole; 4] = [
        ProjectRole::ProjectManager,
        ProjectRole::Leader,
        ProjectRole::Tester,
        ProjectRole::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::ProjectManager => "Project Manager",
            ProjectRole::Leader => "Leader",
            ProjectRole::Tester => "Tester",
            ProjectRole::Member => "Member",
        }
    }
}

impl core::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| DomainError::UnknownRole(s.to_string()))
    }
}
