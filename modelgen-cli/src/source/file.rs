use std::path::{Path, PathBuf};

use modelgen::ContentTypeDef;
use serde::Deserialize;

use super::{Collection, SchemaPage, SchemaSource, StackInfo, PAGE_SIZE};
use crate::error::FetchError;

/// Stack export on disk.
///
/// ```json
/// { "stack": { "name": "Demo" }, "content_types": [...], "global_fields": [...] }
/// ```
#[derive(Debug, Default, Deserialize)]
struct Export {
    #[serde(default)]
    stack: Option<StackInfo>,
    #[serde(default)]
    content_types: Vec<ContentTypeDef>,
    #[serde(default)]
    global_fields: Vec<ContentTypeDef>,
}

/// Serves schemas from a JSON export instead of the API.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    export: Export,
}

impl FileSource {
    /// Read and parse an export file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_json(path, &content)
    }

    /// Parse export content already in memory.
    pub fn from_json(path: impl Into<PathBuf>, content: &str) -> Result<Self, FetchError> {
        let path = path.into();
        let export = serde_json::from_str(content).map_err(|source| FetchError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, export })
    }

    /// File the export was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn collection(&self, collection: Collection) -> &[ContentTypeDef] {
        match collection {
            Collection::ContentTypes => &self.export.content_types,
            Collection::GlobalFields => &self.export.global_fields,
        }
    }
}

impl SchemaSource for FileSource {
    fn stack(&self) -> Result<StackInfo, FetchError> {
        Ok(self.export.stack.clone().unwrap_or_default())
    }

    fn fetch_page(&self, collection: Collection, skip: usize) -> Result<SchemaPage, FetchError> {
        let all = self.collection(collection);
        let items = all.iter().skip(skip).take(PAGE_SIZE).cloned().collect();
        Ok(SchemaPage {
            items,
            count: all.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::load_registry;

    const EXPORT: &str = r#"{
        "stack": { "name": "Demo", "settings": { "version": "2020-01-01T00:00:00.000Z" } },
        "content_types": [
            { "uid": "article", "title": "Article", "schema": [
                { "uid": "title", "display_name": "Title", "data_type": "text" },
                { "uid": "seo", "display_name": "SEO", "data_type": "global_field", "reference_to": "seo" }
            ] }
        ],
        "global_fields": [
            { "uid": "seo", "title": "SEO", "schema": [
                { "uid": "meta_title", "display_name": "Meta title", "data_type": "text" }
            ] }
        ]
    }"#;

    #[test]
    fn test_file_source_loads_registry() {
        let source = FileSource::from_json("stack.json", EXPORT).unwrap();
        let registry = load_registry(&source).unwrap();

        assert_eq!(registry.content_types().count(), 1);
        assert_eq!(registry.global_fields().count(), 1);
        assert!(registry.lookup("seo").is_some());
    }

    #[test]
    fn test_file_source_stack() {
        let source = FileSource::from_json("stack.json", EXPORT).unwrap();
        let stack = source.stack().unwrap();
        assert_eq!(stack.name, "Demo");
        assert!(stack.schema_version().is_some());

        let bare = FileSource::from_json("bare.json", r#"{"content_types": []}"#).unwrap();
        assert_eq!(bare.stack().unwrap().schema_version(), None);
    }

    #[test]
    fn test_file_source_pages() {
        let types: Vec<String> = (0..(PAGE_SIZE + 5))
            .map(|i| format!(r#"{{"uid":"ct{i}","title":"Ct {i}","schema":[]}}"#))
            .collect();
        let json = format!(r#"{{"content_types":[{}]}}"#, types.join(","));
        let source = FileSource::from_json("big.json", &json).unwrap();

        let first = source.fetch_page(Collection::ContentTypes, 0).unwrap();
        assert_eq!(first.items.len(), PAGE_SIZE);
        assert_eq!(first.count, PAGE_SIZE + 5);

        let second = source.fetch_page(Collection::ContentTypes, PAGE_SIZE).unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.items[0].uid, format!("ct{PAGE_SIZE}"));
    }

    #[test]
    fn test_invalid_export() {
        let err = FileSource::from_json("broken.json", "{ not json").unwrap_err();
        assert!(matches!(err, FetchError::Json { .. }));

        let err = FileSource::open("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
