use std::collections::BTreeMap;

use getset::CopyGetters;

use crate::{MonodbError, MonodbResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A named, read-only text template.
#[derive(Debug, Clone, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub with_prefix")]
pub struct Template {
    /// The name the template is looked up by.
    name: &'static str,

    /// What the rendered text is for.
    description: &'static str,

    /// Free-form notes for people editing the template.
    notes: &'static str,

    /// The template text.
    contents: &'static str,
}

/// A set of templates keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateCollection {
    templates: BTreeMap<&'static str, Template>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Template {
    /// Creates a new template.
    pub const fn new(
        name: &'static str,
        description: &'static str,
        notes: &'static str,
        contents: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            notes,
            contents,
        }
    }
}

impl TemplateCollection {
    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> MonodbResult<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| MonodbError::TemplateNotFound(name.to_string()))
    }

    /// Returns `true` if the collection holds a template called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// The template names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }

    /// The number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromIterator<Template> for TemplateCollection {
    fn from_iter<T: IntoIterator<Item = Template>>(iter: T) -> Self {
        Self {
            templates: iter.into_iter().map(|t| (t.name, t)).collect(),
        }
    }
}

impl<const N: usize> From<[Template; N]> for TemplateCollection {
    fn from(templates: [Template; N]) -> Self {
        templates.into_iter().collect()
    }
}
