//! Schema Registry holding every content type and global field of a stack.
//!
//! The registry is populated once before generation and is read-only while
//! the emission engine runs. Definitions keep their registration order, which
//! is the order models are generated in.

use std::collections::HashMap;

use crate::schema::{ContentTypeDef, SchemaOrigin};

/// Uid-keyed store of schema definitions.
///
/// Registering a uid that is already present replaces the stored definition
/// in place, so the last write wins while the original position is kept.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Definitions in registration order
    entries: Vec<ContentTypeDef>,

    /// uid -> position in `entries`
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, returning the one it replaced.
    pub fn register(&mut self, definition: ContentTypeDef) -> Option<ContentTypeDef> {
        match self.index.get(&definition.uid) {
            Some(&position) => {
                tracing::warn!(
                    uid = %definition.uid,
                    origin = ?definition.origin,
                    "duplicate schema uid, replacing earlier definition"
                );
                Some(std::mem::replace(&mut self.entries[position], definition))
            }
            None => {
                self.index
                    .insert(definition.uid.clone(), self.entries.len());
                self.entries.push(definition);
                None
            }
        }
    }

    /// Look up a definition by uid.
    pub fn lookup(&self, uid: &str) -> Option<&ContentTypeDef> {
        self.index.get(uid).map(|&position| &self.entries[position])
    }

    /// Check if a uid is registered.
    pub fn contains(&self, uid: &str) -> bool {
        self.index.contains_key(uid)
    }

    /// All definitions in registration order.
    pub fn all(&self) -> &[ContentTypeDef] {
        &self.entries
    }

    /// Definitions fetched from the content types collection.
    pub fn content_types(&self) -> impl Iterator<Item = &ContentTypeDef> {
        self.by_origin(SchemaOrigin::ContentType)
    }

    /// Definitions fetched from the global fields collection.
    pub fn global_fields(&self) -> impl Iterator<Item = &ContentTypeDef> {
        self.by_origin(SchemaOrigin::GlobalField)
    }

    /// Get the number of registered definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn by_origin(&self, origin: SchemaOrigin) -> impl Iterator<Item = &ContentTypeDef> {
        self.entries.iter().filter(move |def| def.origin == origin)
    }
}

impl Extend<ContentTypeDef> for SchemaRegistry {
    fn extend<I: IntoIterator<Item = ContentTypeDef>>(&mut self, iter: I) {
        for definition in iter {
            self.register(definition);
        }
    }
}

impl FromIterator<ContentTypeDef> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = ContentTypeDef>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}
