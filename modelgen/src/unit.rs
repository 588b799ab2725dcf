//! Generated unit intermediate representation.
//!
//! A [`GeneratedUnit`] is one output file worth of type declaration. Units are
//! language neutral; a [`UnitRenderer`](crate::render::UnitRenderer) turns
//! them into source text.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::resolver::TypeRef;

/// Capability every top-level model implements.
pub const EMBEDDED_OBJECT: &str = "IEmbeddedObject";

/// Capability of models that may contain embedded entries in rich text.
pub const ENTRY_EMBEDDABLE: &str = "IEntryEmbedable";

/// Members every top-level model declares ahead of its fields.
pub const ENTRY_MEMBERS: [&str; 3] = ["ContentType", "Uid", "ContentTypeUid"];

/// Tag member block variants inherit from their wrapper.
pub const BLOCK_TYPE_MEMBER: &str = "BlockType";

/// Suffix of the backing field of a markdown property.
pub const MARKDOWN_STORE_SUFFIX: &str = "Store";

/// Flat classification of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Model,
    PolymorphicWrapper,
    TagEnum,
    Converter,
    Link,
    Helper,
}

impl UnitKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::PolymorphicWrapper => "wrapper",
            Self::TagEnum => "enum",
            Self::Converter => "converter",
            Self::Link => "link",
            Self::Helper => "helper",
        }
    }
}

/// One arm of a block tag enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantTag {
    /// Wire key of the variant.
    pub uid: String,
    /// Enum member name.
    pub member: String,
    /// Generated variant type.
    pub variant_type: String,
}

/// How a converter selects the concrete type to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The first variant key present in the object wins.
    KeyPresence {
        wrapper: String,
        tag_enum: String,
        arms: Vec<VariantTag>,
    },
    /// The `_content_type_uid` value selects the model; `(uid, type)` pairs.
    ContentTypeUid { arms: Vec<(String, String)> },
}

/// Fixed helper units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperKind {
    /// Reflection helpers used by converters.
    Helper,
    /// Markdown to HTML string extensions.
    StringExtension,
    /// Attribute carrying a tag's wire name.
    DisplayNameAttribute,
}

/// Kind specific content of a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitBody {
    /// A data model. Top-level models carry their content type uid.
    Model {
        content_type_uid: Option<String>,
    },
    PolymorphicWrapper,
    TagEnum {
        tags: Vec<VariantTag>,
    },
    Converter(Dispatch),
    Link,
    Helper(HelperKind),
}

impl UnitBody {
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Model { .. } => UnitKind::Model,
            Self::PolymorphicWrapper => UnitKind::PolymorphicWrapper,
            Self::TagEnum { .. } => UnitKind::TagEnum,
            Self::Converter(_) => UnitKind::Converter,
            Self::Link => UnitKind::Link,
            Self::Helper(_) => UnitKind::Helper,
        }
    }
}

/// How a property is exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Accessor {
    #[default]
    Plain,
    /// Stored as markdown, read as HTML.
    Markdown,
}

/// A member of a generated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    /// Key in the delivery payload.
    pub wire_name: String,
    pub ty: TypeRef,
    pub accessor: Accessor,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, wire_name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            wire_name: wire_name.into(),
            ty,
            accessor: Accessor::Plain,
        }
    }

    pub fn with_accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = accessor;
        self
    }

    /// Whether the wire name differs from the property name beyond casing.
    pub fn needs_wire_name(&self) -> bool {
        !self.wire_name.eq_ignore_ascii_case(&self.name)
    }
}

/// One generated type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub name: String,
    pub namespace_path: Vec<String>,
    pub directory_path: Vec<String>,
    pub body: UnitBody,
    pub members: Vec<PropertyDecl>,
    /// Namespaces of nested types this unit refers to.
    pub imports: BTreeSet<String>,
    /// Base type and implemented capabilities.
    pub extends: Vec<String>,
}

impl GeneratedUnit {
    /// Create a unit with no members, imports or base types.
    pub fn new(
        name: impl Into<String>,
        namespace_path: Vec<String>,
        directory_path: Vec<String>,
        body: UnitBody,
    ) -> Self {
        Self {
            name: name.into(),
            namespace_path,
            directory_path,
            body,
            members: Vec::new(),
            imports: BTreeSet::new(),
            extends: Vec::new(),
        }
    }

    pub fn kind(&self) -> UnitKind {
        self.body.kind()
    }

    /// Dotted namespace.
    pub fn namespace(&self) -> String {
        self.namespace_path.join(".")
    }

    /// Namespace qualified name, unique per unit in one generation.
    pub fn qualified_name(&self) -> String {
        if self.namespace_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace(), self.name)
        }
    }

    /// Output path relative to the output root.
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.directory_path.iter().collect();
        path.push(format!("{}.{}", self.name, extension));
        path
    }

    pub fn member(&self, name: &str) -> Option<&PropertyDecl> {
        self.members.iter().find(|member| member.name == name)
    }
}
