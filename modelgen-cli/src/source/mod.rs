//! Schema sources.
//!
//! A [`SchemaSource`] serves the stack description and paged schema
//! collections. [`load_registry`] drains both collections into a
//! [`SchemaRegistry`] before any generation starts.

mod client;
mod file;

pub use client::{Auth, ContentstackClient, Credentials};
pub use file::FileSource;

use chrono::{DateTime, NaiveDate};
use modelgen::{ContentTypeDef, SchemaOrigin, SchemaRegistry};
use serde::Deserialize;

use crate::error::FetchError;

/// Number of definitions requested per page.
pub const PAGE_SIZE: usize = 100;

/// A paged schema collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    ContentTypes,
    GlobalFields,
}

impl Collection {
    /// API path segment and response key.
    pub fn key(self) -> &'static str {
        match self {
            Self::ContentTypes => "content_types",
            Self::GlobalFields => "global_fields",
        }
    }

    /// Origin recorded on definitions from this collection.
    pub fn origin(self) -> SchemaOrigin {
        match self {
            Self::ContentTypes => SchemaOrigin::ContentType,
            Self::GlobalFields => SchemaOrigin::GlobalField,
        }
    }

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::ContentTypes => "content types",
            Self::GlobalFields => "global fields",
        }
    }
}

/// One page of a collection.
#[derive(Debug, Clone, Default)]
pub struct SchemaPage {
    pub items: Vec<ContentTypeDef>,
    /// Total size of the collection.
    pub count: usize,
}

/// Stack description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub master_locale: Option<String>,
    #[serde(default)]
    pub settings: StackSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackSettings {
    /// Schema version timestamp.
    #[serde(default)]
    pub version: Option<String>,
}

impl StackInfo {
    /// Date of the stack's schema version, if it can be read.
    pub fn schema_version(&self) -> Option<NaiveDate> {
        let raw = self.settings.version.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
    }
}

/// Something that serves schema definitions.
pub trait SchemaSource {
    /// Describe the stack.
    fn stack(&self) -> Result<StackInfo, FetchError>;

    /// Fetch the page of `collection` starting at `skip`.
    fn fetch_page(&self, collection: Collection, skip: usize) -> Result<SchemaPage, FetchError>;
}

/// Fetch every definition of one collection.
pub fn fetch_collection(
    source: &dyn SchemaSource,
    collection: Collection,
) -> Result<Vec<ContentTypeDef>, FetchError> {
    let mut items = Vec::new();

    loop {
        let page = source.fetch_page(collection, items.len())?;
        let fetched = page.items.len();
        tracing::info!(
            collection = collection.key(),
            skip = items.len(),
            fetched,
            total = page.count,
            "fetched schema page"
        );

        if fetched == 0 {
            if items.len() < page.count {
                tracing::warn!(
                    collection = collection.key(),
                    fetched = items.len(),
                    total = page.count,
                    "empty page before reaching the reported count"
                );
            }
            break;
        }

        items.extend(page.items.into_iter().map(|def| def.with_origin(collection.origin())));
        if items.len() >= page.count {
            break;
        }
    }

    Ok(items)
}

/// Fetch content types then global fields into a registry.
pub fn load_registry(source: &dyn SchemaSource) -> Result<SchemaRegistry, FetchError> {
    let mut registry = SchemaRegistry::new();
    for collection in [Collection::ContentTypes, Collection::GlobalFields] {
        registry.extend(fetch_collection(source, collection)?);
    }
    Ok(registry)
}
