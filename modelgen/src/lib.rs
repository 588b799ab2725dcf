//! # modelgen
//!
//! Schema-to-model code generation for Contentstack stacks.
//!
//! The crate turns the content types and global fields of a stack into typed
//! model classes:
//!
//! 1. [`SchemaRegistry`] holds every definition, keyed by uid.
//! 2. [`TypeResolver`] maps each field to a language-neutral [`TypeRef`].
//! 3. [`ModelEmitter`] walks the schemas recursively and produces
//!    [`GeneratedUnit`]s for models, modular block variants, wrappers, tag
//!    enums, converters and groups.
//! 4. A [`UnitRenderer`] such as [`CSharpRenderer`] turns units into source text.
//!
//! ## Example
//!
//! ```
//! use modelgen::{generate, ContentTypeDef, DataKind, EmitOptions, FieldDef, SchemaRegistry};
//! use modelgen::render::{CSharpRenderer, UnitRenderer};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(ContentTypeDef::new(
//!     "article",
//!     "Article",
//!     vec![FieldDef::new("title", DataKind::Text)],
//! ));
//!
//! let output = generate(&registry, EmitOptions::default()).unwrap();
//! let article = output.unit("Article").unwrap();
//! let code = CSharpRenderer::new().render(article);
//! assert!(code.contains("public string Title { get; set; }"));
//! ```

pub mod emitter;
pub mod error;
pub mod naming;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod schema;
pub mod support;
pub mod unit;

pub use emitter::{generate, EmitOptions, GenerationOutput, ModelEmitter, Scope};
pub use error::{Diagnostic, DiagnosticKind, GenerateError, GenerateResult};
pub use naming::{type_name, MemberNames, NamingPrefixes};
pub use registry::SchemaRegistry;
pub use render::{CSharpRenderer, RenderedUnit, UnitRenderer};
pub use resolver::{ReferencePolicy, Resolution, TypeRef, TypeResolver};
pub use schema::{
    ContentTypeDef, DataKind, FieldDef, FieldMetadata, ReferenceTarget, SchemaOrigin,
};
pub use unit::{Accessor, GeneratedUnit, PropertyDecl, UnitBody, UnitKind};
