//! Field to type resolution.
//!
//! [`TypeResolver`] maps a [`FieldDef`] to a language-neutral [`TypeRef`].
//!
//! # Type Mappings
//!
//! | Data type | Type |
//! |-----------|------|
//! | `text` | [`TypeRef::String`] |
//! | `number` | [`TypeRef::Double`] |
//! | `isodate` | [`TypeRef::DateTime`] |
//! | `file` | [`TypeRef::Asset`] |
//! | `boolean` | [`TypeRef::Bool`] |
//! | `json` | [`TypeRef::RichTextNode`] for JSON RTE, else [`TypeRef::Dynamic`] |
//! | `link` | [`TypeRef::Link`] |
//! | `reference`, `global_field` | the referenced model, or [`TypeRef::Opaque`] |
//! | `blocks` | `{MB}{Owner}{Field}` |
//! | `group` | `{Group}{Owner}{Field}` |
//! | anything else | [`TypeRef::Opaque`] |
//!
//! The result is wrapped in [`TypeRef::List`] when the field is multiple, the
//! reference allows several entries, or the [`ReferencePolicy`] forces lists.

use chrono::NaiveDate;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::naming::{definition_name, nested_type_name, NamingPrefixes, NestedRole};
use crate::registry::SchemaRegistry;
use crate::schema::{DataKind, FieldDef, ReferenceTarget};

/// Language-neutral type of a generated member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    String,
    Double,
    DateTime,
    Asset,
    Bool,
    RichTextNode,
    Dynamic,
    Link,
    /// A generated type.
    Named(String),
    /// Untyped value.
    Opaque,
    List(Box<TypeRef>),
}

impl TypeRef {
    /// Wrap a type in a list.
    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    /// Create a named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The element type of a list, or the type itself.
    pub fn element(&self) -> &TypeRef {
        match self {
            Self::List(inner) => inner.element(),
            other => other,
        }
    }
}

/// How single-valued reference fields are typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// Follow the field's own multiplicity flags.
    #[default]
    AsDeclared,
    /// Every reference is a list, as stacks return since the 2019-04-04 version.
    AlwaysList,
}

impl ReferencePolicy {
    /// Policy for a stack of the given schema version.
    ///
    /// Unknown versions keep the declared multiplicity.
    pub fn for_stack_version(version: Option<NaiveDate>) -> Self {
        let cutoff = NaiveDate::from_ymd_opt(2019, 4, 4);
        match (version, cutoff) {
            (Some(version), Some(cutoff)) if version >= cutoff => Self::AlwaysList,
            _ => Self::AsDeclared,
        }
    }
}

/// Result of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub ty: TypeRef,
    pub diagnostic: Option<Diagnostic>,
}

/// Maps fields to types against a registry.
#[derive(Debug, Clone)]
pub struct TypeResolver<'a> {
    registry: &'a SchemaRegistry,
    prefixes: NamingPrefixes,
    policy: ReferencePolicy,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver with default prefixes and the declared reference policy.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            prefixes: NamingPrefixes::default(),
            policy: ReferencePolicy::default(),
        }
    }

    /// Use custom nested type prefixes.
    pub fn with_prefixes(mut self, prefixes: NamingPrefixes) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Use a reference policy.
    pub fn with_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve `field`, declared on the type named `owner`.
    pub fn resolve(&self, field: &FieldDef, owner: &str) -> Resolution {
        let (base, diagnostic) = self.resolve_base(field, owner);
        let ty = if self.is_sequence(field) {
            TypeRef::list(base)
        } else {
            base
        };
        Resolution { ty, diagnostic }
    }

    /// Whether `field` resolves to a list.
    pub fn is_sequence(&self, field: &FieldDef) -> bool {
        field.is_multiple
            || field.metadata.ref_multiple
            || (field.data_kind == DataKind::Reference && self.policy == ReferencePolicy::AlwaysList)
    }

    fn resolve_base(&self, field: &FieldDef, owner: &str) -> (TypeRef, Option<Diagnostic>) {
        let ty = match &field.data_kind {
            DataKind::Text => TypeRef::String,
            DataKind::Number => TypeRef::Double,
            DataKind::Date => TypeRef::DateTime,
            DataKind::File => TypeRef::Asset,
            DataKind::Boolean => TypeRef::Bool,
            DataKind::Json if field.metadata.json_rich_text => TypeRef::RichTextNode,
            DataKind::Json => TypeRef::Dynamic,
            DataKind::Link => TypeRef::Link,
            DataKind::Reference | DataKind::GlobalField => {
                return self.resolve_reference(field, owner)
            }
            DataKind::Blocks => {
                TypeRef::Named(nested_type_name(&self.prefixes, NestedRole::Blocks, owner, field))
            }
            DataKind::Group => {
                TypeRef::Named(nested_type_name(&self.prefixes, NestedRole::Group, owner, field))
            }
            DataKind::Other(kind) => {
                return (
                    TypeRef::Opaque,
                    Some(Diagnostic::new(
                        DiagnosticKind::UnknownDataKind,
                        subject(owner, field),
                        format!("data type '{kind}' is not supported, using an untyped member"),
                    )),
                );
            }
        };
        (ty, None)
    }

    fn resolve_reference(&self, field: &FieldDef, owner: &str) -> (TypeRef, Option<Diagnostic>) {
        let Some(target) = &field.reference_target else {
            return (
                TypeRef::Opaque,
                Some(Diagnostic::new(
                    DiagnosticKind::UnresolvedReference,
                    subject(owner, field),
                    "no reference target declared",
                )),
            );
        };

        // A lone uid on a field flagged for several content types stays untyped.
        let truncated = field.data_kind == DataKind::Reference
            && field.metadata.ref_multiple_targets
            && matches!(target, ReferenceTarget::Single(_));

        let Some(uid) = target.sole().filter(|_| !truncated) else {
            return (
                TypeRef::Opaque,
                Some(Diagnostic::new(
                    DiagnosticKind::AmbiguousReference,
                    subject(owner, field),
                    format!("references [{}], using an untyped member", target.uids().join(", ")),
                )),
            );
        };

        match self.registry.lookup(uid) {
            Some(definition) => (
                TypeRef::Named(definition_name(&definition.title, &definition.uid)),
                None,
            ),
            None => (
                TypeRef::Opaque,
                Some(Diagnostic::new(
                    DiagnosticKind::UnresolvedReference,
                    subject(owner, field),
                    format!("'{uid}' is not registered"),
                )),
            ),
        }
    }
}

fn subject(owner: &str, field: &FieldDef) -> String {
    format!("{owner}.{}", field.uid)
}
