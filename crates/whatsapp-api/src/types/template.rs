//! Template catalog types.

use serde::{Deserialize, Serialize};

/// A message template as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateDescriptor {
    pub name: String,
    #[serde(default)]
    pub language: String,
    /// Approval status (e.g. "APPROVED").
    #[serde(default)]
    pub status: Option<String>,
}

impl std::fmt::Display for TemplateDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.language)?;
        if let Some(status) = &self.status {
            write!(f, " – {}", status)?;
        }
        Ok(())
    }
}

/// Response of the template list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateList {
    #[serde(default)]
    pub templates: Vec<TemplateDescriptor>,
}
