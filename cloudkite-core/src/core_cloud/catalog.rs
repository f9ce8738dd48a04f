//! Immutable snapshot of discovered organizations and spaces

use super::types::SpaceRecord;

/// Organization/space topology discovered from one listing call.
///
/// Built fresh for every resolution request and never persisted. Read-only
/// after construction.
#[derive(Debug, Clone)]
pub struct OrgSpaceCatalog {
    spaces: Vec<SpaceRecord>,
}

impl OrgSpaceCatalog {
    /// Build a catalog from a discovery result, preserving listing order.
    ///
    /// An empty listing yields no catalog at all; callers treat that the same
    /// as a catalog without the space they wanted.
    pub fn from_records(spaces: Vec<SpaceRecord>) -> Option<Self> {
        if spaces.is_empty() {
            None
        } else {
            Some(OrgSpaceCatalog { spaces })
        }
    }

    /// Exact, case-sensitive lookup by organization and space name
    pub fn find_space(&self, org_name: &str, space_name: &str) -> Option<&SpaceRecord> {
        self.spaces
            .iter()
            .find(|record| record.org_name == org_name && record.space_name == space_name)
    }

    /// Distinct organization names, in discovery order
    pub fn organizations(&self) -> Vec<&str> {
        let mut orgs: Vec<&str> = Vec::new();
        for record in &self.spaces {
            if !orgs.contains(&record.org_name.as_str()) {
                orgs.push(record.org_name.as_str());
            }
        }
        orgs
    }

    /// All spaces belonging to one organization, in discovery order
    pub fn spaces_in_org(&self, org_name: &str) -> Vec<&SpaceRecord> {
        self.spaces
            .iter()
            .filter(|record| record.org_name == org_name)
            .collect()
    }

    /// Every discovered record, in discovery order
    pub fn records(&self) -> &[SpaceRecord] {
        &self.spaces
    }
}
