//! Request DTOs for the HTTP API

use serde::Deserialize;

use crate::error::Result;
use crate::upstream::Resource;

/// Query string for `GET /resource/batch`.
///
/// `?resources=users,posts` selects a subset; absent or blank means all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchQuery {
    #[serde(default)]
    pub resources: Option<String>,
}

impl BatchQuery {
    /// Resolves the requested resources in order, dropping duplicates.
    ///
    /// Any unknown name rejects the whole query.
    pub fn resolve(&self) -> Result<Vec<Resource>> {
        let raw = self.resources.as_deref().unwrap_or_default();
        let mut resources = Vec::new();

        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let resource: Resource = name.parse()?;
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }

        if resources.is_empty() {
            return Ok(Resource::ALL.to_vec());
        }
        Ok(resources)
    }
}
