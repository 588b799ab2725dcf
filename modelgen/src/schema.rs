//! Content schema data model.
//!
//! These types mirror the JSON documents the Content Management API returns
//! for content types and global fields. Both collections share one shape; the
//! only difference is the [`SchemaOrigin`] recorded when a page is decoded.
//!
//! Decoding is lenient where the API is loose: `null` lists decode as empty,
//! unknown `data_type` strings are kept as [`DataKind::Other`], and a
//! `reference_to` value of an unexpected shape decodes as absent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which collection a schema definition was fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaOrigin {
    /// Fetched from the `content_types` collection.
    #[default]
    ContentType,
    /// Fetched from the `global_fields` collection.
    GlobalField,
}

/// A content type or global field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeDef {
    /// Unique identifier within the stack.
    pub uid: String,

    /// Human readable title, the source of the generated type name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Ordered field schema.
    #[serde(default, rename = "schema", deserialize_with = "null_as_default")]
    pub fields: Vec<FieldDef>,

    /// Global field uid when this definition is a block variant that reuses a
    /// global field instead of declaring its own schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,

    /// Collection this definition came from.
    #[serde(skip)]
    pub origin: SchemaOrigin,
}

impl ContentTypeDef {
    /// Create a content type definition.
    pub fn new(uid: impl Into<String>, title: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            fields,
            reference_to: None,
            origin: SchemaOrigin::ContentType,
        }
    }

    /// Mark this definition as coming from the given collection.
    pub fn with_origin(mut self, origin: SchemaOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Make this definition a block variant backed by a global field.
    pub fn referencing(mut self, global_field_uid: impl Into<String>) -> Self {
        self.reference_to = Some(global_field_uid.into());
        self
    }

    /// Whether any text field reachable from this schema embeds entries.
    pub fn embeds_entries(&self) -> bool {
        embeds_entries(&self.fields)
    }
}

/// Declared data kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataKind {
    Text,
    Number,
    Date,
    File,
    Boolean,
    Json,
    Link,
    Reference,
    GlobalField,
    Blocks,
    Group,
    /// A data type this generator does not know.
    Other(String),
}

impl DataKind {
    /// Decode the API's `data_type` string.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "number" => Self::Number,
            "isodate" => Self::Date,
            "file" => Self::File,
            "boolean" => Self::Boolean,
            "json" => Self::Json,
            "link" => Self::Link,
            "reference" => Self::Reference,
            "global_field" => Self::GlobalField,
            "blocks" => Self::Blocks,
            "group" => Self::Group,
            other => Self::Other(other.to_string()),
        }
    }

    /// The API's `data_type` string for this kind.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "isodate",
            Self::File => "file",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Link => "link",
            Self::Reference => "reference",
            Self::GlobalField => "global_field",
            Self::Blocks => "blocks",
            Self::Group => "group",
            Self::Other(other) => other,
        }
    }

    /// Kinds whose values are nested schemas with their own generated units.
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Blocks | Self::Group)
    }
}

impl From<String> for DataKind {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<DataKind> for String {
    fn from(kind: DataKind) -> Self {
        kind.as_wire().to_string()
    }
}

/// Target of a `reference` or `global_field` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReferenceTarget {
    /// A single content type uid.
    Single(String),
    /// A set of content type uids.
    Many(Vec<String>),
}

impl ReferenceTarget {
    /// The only uid this target names, if it names exactly one.
    pub fn sole(&self) -> Option<&str> {
        match self {
            Self::Single(uid) => Some(uid),
            Self::Many(uids) if uids.len() == 1 => Some(&uids[0]),
            Self::Many(_) => None,
        }
    }

    /// All uids this target names.
    pub fn uids(&self) -> Vec<&str> {
        match self {
            Self::Single(uid) => vec![uid.as_str()],
            Self::Many(uids) => uids.iter().map(String::as_str).collect(),
        }
    }
}

/// Metadata flags that modulate type resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMetadata {
    /// Reference field accepting several entries.
    #[serde(deserialize_with = "null_as_default")]
    pub ref_multiple: bool,

    /// Reference field accepting entries of several content types.
    #[serde(rename = "ref_multiple_content_types", deserialize_with = "null_as_default")]
    pub ref_multiple_targets: bool,

    /// HTML rich text editor.
    #[serde(rename = "allow_rich_text", deserialize_with = "null_as_default")]
    pub rich_text: bool,

    /// Markdown editor.
    #[serde(deserialize_with = "null_as_default")]
    pub markdown: bool,

    /// Custom field extension.
    #[serde(deserialize_with = "null_as_default")]
    pub extension: bool,

    /// JSON rich text editor.
    #[serde(rename = "allow_json_rte", deserialize_with = "null_as_default")]
    pub json_rich_text: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// A single field of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub uid: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,

    #[serde(rename = "data_type")]
    pub data_kind: DataKind,

    #[serde(default, rename = "multiple", deserialize_with = "null_as_default")]
    pub is_multiple: bool,

    #[serde(
        default,
        rename = "reference_to",
        deserialize_with = "lenient_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_target: Option<ReferenceTarget>,

    #[serde(default, rename = "field_metadata", deserialize_with = "null_as_default")]
    pub metadata: FieldMetadata,

    /// Nested fields of a group, or the inline schema of a global field.
    #[serde(default, rename = "schema", deserialize_with = "null_as_default")]
    pub nested_schema: Vec<FieldDef>,

    /// Variants of a modular blocks field.
    #[serde(default, rename = "blocks", deserialize_with = "null_as_default")]
    pub block_variants: Vec<ContentTypeDef>,
}

impl FieldDef {
    /// Create a single-valued field with no metadata.
    pub fn new(uid: impl Into<String>, data_kind: DataKind) -> Self {
        let uid = uid.into();
        Self {
            display_name: uid.clone(),
            uid,
            data_kind,
            is_multiple: false,
            reference_target: None,
            metadata: FieldMetadata::default(),
            nested_schema: Vec::new(),
            block_variants: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn named(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Mark the field as accepting several values.
    pub fn multiple(mut self) -> Self {
        self.is_multiple = true;
        self
    }

    /// Replace the metadata flags.
    pub fn with_metadata(mut self, metadata: FieldMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the reference target.
    pub fn with_reference(mut self, target: ReferenceTarget) -> Self {
        self.reference_target = Some(target);
        self
    }

    /// Set the nested schema.
    pub fn with_schema(mut self, fields: Vec<FieldDef>) -> Self {
        self.nested_schema = fields;
        self
    }

    /// Set the block variants.
    pub fn with_blocks(mut self, variants: Vec<ContentTypeDef>) -> Self {
        self.block_variants = variants;
        self
    }

    /// Label used when deriving nested type names.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.uid
        } else {
            &self.display_name
        }
    }

    /// Whether this is a markdown text field.
    pub fn is_markdown(&self) -> bool {
        self.data_kind == DataKind::Text && self.metadata.markdown
    }
}

/// Whether any text field in `fields`, looking through blocks, groups and
/// inline global field schemas, references entries (rich text with embeds).
pub fn embeds_entries(fields: &[FieldDef]) -> bool {
    fields.iter().any(|field| match field.data_kind {
        DataKind::Text => field.reference_target.is_some(),
        DataKind::Blocks => field
            .block_variants
            .iter()
            .any(|variant| embeds_entries(&variant.fields)),
        DataKind::Group | DataKind::GlobalField => embeds_entries(&field.nested_schema),
        _ => false,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_reference<'de, D>(deserializer: D) -> Result<Option<ReferenceTarget>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(uid)) => Some(ReferenceTarget::Single(uid)),
        Some(Value::Array(items)) => Some(ReferenceTarget::Many(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(uid) => Some(uid),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    })
}
