//! Template selection.
//!
//! Templates come from the messaging service's catalog and are referenced
//! by name only. Sendouts never fill template parameters.

use whatsapp_api::TemplateDescriptor;

use crate::error::SendoutError;

/// Opaque reference to the template a sendout uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub name: String,
    pub language: String,
}

impl From<&TemplateDescriptor> for TemplateRef {
    fn from(descriptor: &TemplateDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            language: descriptor.language.clone(),
        }
    }
}

/// The template list offered for selection.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<TemplateDescriptor>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<TemplateDescriptor>) -> Self {
        Self { templates }
    }

    /// The first listed template, preselected when nothing was chosen.
    pub fn default_selection(&self) -> Option<TemplateRef> {
        self.templates.first().map(TemplateRef::from)
    }

    /// Look up a template by exact name.
    pub fn select(&self, name: &str) -> Result<TemplateRef, SendoutError> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .map(TemplateRef::from)
            .ok_or_else(|| SendoutError::UnknownTemplate(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
