//! Recursive emission engine.
//!
//! [`ModelEmitter`] walks every registered schema and produces the full set of
//! [`GeneratedUnit`]s. Each schema is emitted in three steps:
//!
//! 1. every `blocks` field: one unit per variant (recursing into the variant's
//!    schema), then the tag enum, the polymorphic wrapper and its converter;
//! 2. every `group` field: one unit per group (recursing into its schema);
//! 3. the unit for the schema itself, importing the nested namespaces created
//!    by steps 1 and 2.
//!
//! Nested units live in a directory named after their owner
//! (`<Owner>Blocks`, `<Owner>Group`) below the owner's directory, and their
//! namespace follows the directory path.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{Diagnostic, DiagnosticKind, GenerateError, GenerateResult};
use crate::naming::{
    converter_name, definition_name, nested_directory, nested_type_name, property_name,
    tag_enum_name, tag_member_name, type_name, variant_type_name, MemberNames, NamingPrefixes,
    NestedRole,
};
use crate::registry::SchemaRegistry;
use crate::resolver::{ReferencePolicy, TypeRef, TypeResolver};
use crate::schema::{embeds_entries, ContentTypeDef, DataKind, FieldDef};
use crate::support::support_units;
use crate::unit::{
    Accessor, Dispatch, GeneratedUnit, PropertyDecl, UnitBody, UnitKind, VariantTag,
    BLOCK_TYPE_MEMBER, EMBEDDED_OBJECT, ENTRY_EMBEDDABLE, ENTRY_MEMBERS, MARKDOWN_STORE_SUFFIX,
};

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Root namespace.
    pub namespace: String,
    /// Root output directory, also the first namespace segment after the root.
    pub root_directory: String,
    pub prefixes: NamingPrefixes,
    pub reference_policy: ReferencePolicy,
    /// Emit the link, helper and embedded object converter units.
    pub support_units: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            namespace: "ContentstackModels".to_string(),
            root_directory: "Models".to_string(),
            prefixes: NamingPrefixes::default(),
            reference_policy: ReferencePolicy::default(),
            support_units: true,
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Units in emission order.
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationOutput {
    /// Find a unit by name.
    pub fn unit(&self, name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|unit| unit.name == name)
    }

    /// Units of one kind.
    pub fn units_of(&self, kind: UnitKind) -> impl Iterator<Item = &GeneratedUnit> {
        self.units.iter().filter(move |unit| unit.kind() == kind)
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// Location of a unit: its directory below the output root.
///
/// The namespace of a unit is the root namespace followed by the directory
/// segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    directory: Vec<String>,
}

impl Scope {
    /// Scope of top-level models.
    pub fn root(directory: impl Into<String>) -> Self {
        Self {
            directory: vec![directory.into()],
        }
    }

    /// A child directory of this scope.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut directory = self.directory.clone();
        directory.push(segment.into());
        Self { directory }
    }

    pub fn directory(&self) -> &[String] {
        &self.directory
    }

    /// Namespace segments below `root_namespace`.
    pub fn namespace(&self, root_namespace: &str) -> Vec<String> {
        std::iter::once(root_namespace.to_string())
            .chain(self.directory.iter().cloned())
            .collect()
    }
}

/// Role a schema is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    Entry,
    BlockVariant,
    BlockSet,
    Group,
    Support,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EmissionKey {
    uid: String,
    role: Role,
    qualified: String,
}

/// A schema about to be emitted.
struct Subject<'s> {
    uid: &'s str,
    /// Title or display name `name` was derived from.
    label: &'s str,
    name: String,
    fields: &'s [FieldDef],
    role: Role,
    content_type_uid: Option<&'s str>,
}

/// Recursive unit emitter for one registry.
pub struct ModelEmitter<'a> {
    registry: &'a SchemaRegistry,
    resolver: TypeResolver<'a>,
    options: EmitOptions,
    completed: HashSet<EmissionKey>,
    in_progress: Vec<EmissionKey>,
    /// qualified name -> key of the unit that claimed it
    claimed: HashMap<String, EmissionKey>,
    units: Vec<GeneratedUnit>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ModelEmitter<'a> {
    /// Create an emitter over a fully populated registry.
    pub fn new(registry: &'a SchemaRegistry, options: EmitOptions) -> Self {
        let resolver = TypeResolver::new(registry)
            .with_prefixes(options.prefixes.clone())
            .with_policy(options.reference_policy);
        Self {
            registry,
            resolver,
            options,
            completed: HashSet::new(),
            in_progress: Vec::new(),
            claimed: HashMap::new(),
            units: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Emit support units and every registered schema, in registry order.
    pub fn generate(mut self) -> GenerateResult<GenerationOutput> {
        if self.options.support_units {
            self.emit_support_units();
        }

        let registry = self.registry;
        for definition in registry.all() {
            self.emit(definition)?;
        }

        tracing::debug!(
            units = self.units.len(),
            diagnostics = self.diagnostics.len(),
            "generation finished"
        );
        Ok(self.finish())
    }

    /// Emit the support units into the root scope.
    pub fn emit_support_units(&mut self) {
        let scope = self.root_scope();
        let namespace = scope.namespace(&self.options.namespace);
        for unit in support_units(self.registry, &namespace, scope.directory()) {
            let key = EmissionKey {
                uid: unit.name.clone(),
                role: Role::Support,
                qualified: unit.qualified_name(),
            };
            if self.completed.insert(key.clone()) {
                self.push_unit(unit, &key);
            }
        }
    }

    /// Emit a top-level content type or global field and everything nested in it.
    ///
    /// Returns the name of the generated model.
    pub fn emit(&mut self, definition: &ContentTypeDef) -> GenerateResult<String> {
        let name = definition_name(&definition.title, &definition.uid);
        let subject = Subject {
            uid: &definition.uid,
            label: &definition.title,
            name: name.clone(),
            fields: &definition.fields,
            role: Role::Entry,
            content_type_uid: Some(&definition.uid),
        };
        let scope = self.root_scope();
        self.emit_schema(subject, &scope, None)?;
        Ok(name)
    }

    /// Emit the registered schema with the given uid.
    pub fn emit_uid(&mut self, uid: &str) -> GenerateResult<String> {
        let registry = self.registry;
        let definition = registry
            .lookup(uid)
            .ok_or_else(|| GenerateError::UnknownContentType {
                uid: uid.to_string(),
            })?;
        self.emit(definition)
    }

    /// Consume the emitter, returning the units and diagnostics so far.
    pub fn finish(self) -> GenerationOutput {
        GenerationOutput {
            units: self.units,
            diagnostics: self.diagnostics,
        }
    }

    fn root_scope(&self) -> Scope {
        Scope::root(self.options.root_directory.clone())
    }

    fn key(&self, uid: &str, role: Role, name: &str, scope: &Scope) -> EmissionKey {
        let mut qualified = scope.namespace(&self.options.namespace);
        qualified.push(name.to_string());
        EmissionKey {
            uid: uid.to_string(),
            role,
            qualified: qualified.join("."),
        }
    }

    /// Mark `key` as in progress. Returns `false` when it is already complete.
    fn begin(&mut self, key: &EmissionKey) -> GenerateResult<bool> {
        if self.completed.contains(key) {
            tracing::debug!(unit = %key.qualified, "already emitted, skipping");
            return Ok(false);
        }
        if self.in_progress.contains(key) {
            let path = self
                .in_progress
                .iter()
                .map(|k| k.qualified.clone())
                .chain(std::iter::once(key.qualified.clone()))
                .collect();
            return Err(GenerateError::cycle(key.qualified.clone(), path));
        }
        self.in_progress.push(key.clone());
        Ok(true)
    }

    fn end(&mut self, key: EmissionKey) {
        self.in_progress.retain(|k| k != &key);
        self.completed.insert(key);
    }

    fn emit_schema(
        &mut self,
        subject: Subject<'_>,
        scope: &Scope,
        base_type: Option<&str>,
    ) -> GenerateResult<()> {
        let key = self.key(subject.uid, subject.role, &subject.name, scope);
        if !self.begin(&key)? {
            return Ok(());
        }
        self.check_derived(subject.label, &subject.name, &key.qualified);

        let mut imports = BTreeSet::new();
        imports.extend(self.emit_blocks(&subject.name, subject.fields, scope)?);
        imports.extend(self.emit_groups(&subject.name, subject.fields, scope)?);

        let mut extends: Vec<String> = base_type.map(str::to_string).into_iter().collect();
        if subject.role == Role::Entry {
            if embeds_entries(subject.fields) {
                extends.push(ENTRY_EMBEDDABLE.to_string());
            }
            extends.push(EMBEDDED_OBJECT.to_string());
        }

        let mut unit = GeneratedUnit::new(
            subject.name.clone(),
            scope.namespace(&self.options.namespace),
            scope.directory().to_vec(),
            UnitBody::Model {
                content_type_uid: subject.content_type_uid.map(str::to_string),
            },
        );
        let reserved = match subject.role {
            Role::Entry => member_names(&subject.name, &ENTRY_MEMBERS),
            Role::BlockVariant => member_names(&subject.name, &[BLOCK_TYPE_MEMBER]),
            _ => member_names(&subject.name, &[]),
        };
        unit.members = self.members(&subject.name, &subject.name, subject.fields, reserved);
        unit.imports = imports;
        unit.extends = extends;

        self.push_unit(unit, &key);
        self.end(key);
        Ok(())
    }

    /// Step 1. Returns the namespace of the blocks directory if one was needed.
    fn emit_blocks(
        &mut self,
        owner: &str,
        fields: &[FieldDef],
        scope: &Scope,
    ) -> GenerateResult<Option<String>> {
        let block_fields: Vec<&FieldDef> = fields
            .iter()
            .filter(|field| field.data_kind == DataKind::Blocks)
            .collect();
        if block_fields.is_empty() {
            return Ok(None);
        }

        tracing::debug!(owner, count = block_fields.len(), "extracting modular blocks");
        let child = scope.child(nested_directory(owner, NestedRole::Blocks));

        for field in block_fields {
            let wrapper = nested_type_name(&self.options.prefixes, NestedRole::Blocks, owner, field);
            self.check_derived(field.label(), &wrapper, &format!("{owner}.{}", field.uid));
            let tag_enum = tag_enum_name(&wrapper);
            let mut tags = Vec::new();
            let mut seen = HashSet::new();
            let mut tag_members = MemberNames::default();

            for variant in &field.block_variants {
                if !seen.insert(variant.uid.as_str()) {
                    self.report(Diagnostic::new(
                        DiagnosticKind::DuplicateVariant,
                        format!("{owner}.{}", field.uid),
                        format!("variant '{}' is declared more than once", variant.uid),
                    ));
                    continue;
                }

                let variant_type = variant_type_name(&wrapper, &variant.title, &variant.uid);
                match &variant.reference_to {
                    Some(global_field) => self.emit_global_field_variant(
                        variant,
                        global_field,
                        &variant_type,
                        &child,
                        &wrapper,
                    )?,
                    None => self.emit_schema(
                        Subject {
                            uid: &variant.uid,
                            label: &variant.title,
                            name: variant_type.clone(),
                            fields: &variant.fields,
                            role: Role::BlockVariant,
                            content_type_uid: None,
                        },
                        &child,
                        Some(&wrapper),
                    )?,
                }

                let subject = format!("{tag_enum}.{}", variant.uid);
                let derived = tag_member_name(&variant.uid, &variant.title);
                self.check_derived(&variant.uid, &derived, &subject);
                let member = self.claim(&mut tag_members, &derived, &[], &variant.uid, &subject);
                tags.push(VariantTag {
                    uid: variant.uid.clone(),
                    member,
                    variant_type,
                });
            }

            self.emit_block_set(field, &child, wrapper, tag_enum, tags);
        }

        Ok(Some(child.namespace(&self.options.namespace).join(".")))
    }

    /// The tag enum, wrapper and converter of one blocks field.
    fn emit_block_set(
        &mut self,
        field: &FieldDef,
        scope: &Scope,
        wrapper: String,
        tag_enum: String,
        tags: Vec<VariantTag>,
    ) {
        let namespace = scope.namespace(&self.options.namespace);
        let directory = scope.directory().to_vec();

        let enum_unit = GeneratedUnit::new(
            tag_enum.clone(),
            namespace.clone(),
            directory.clone(),
            UnitBody::TagEnum { tags: tags.clone() },
        );

        let mut wrapper_unit = GeneratedUnit::new(
            wrapper.clone(),
            namespace.clone(),
            directory.clone(),
            UnitBody::PolymorphicWrapper,
        );
        wrapper_unit.members = vec![PropertyDecl::new(
            BLOCK_TYPE_MEMBER,
            BLOCK_TYPE_MEMBER,
            TypeRef::named(tag_enum.clone()),
        )];

        let converter_unit = GeneratedUnit::new(
            converter_name(&wrapper),
            namespace,
            directory,
            UnitBody::Converter(Dispatch::KeyPresence {
                wrapper,
                tag_enum,
                arms: tags,
            }),
        );

        for unit in [enum_unit, wrapper_unit, converter_unit] {
            let key = self.key(&field.uid, Role::BlockSet, &unit.name, scope);
            if self.completed.insert(key.clone()) {
                self.push_unit(unit, &key);
            }
        }
    }

    /// A block variant backed by a global field.
    ///
    /// Members come from the global field's schema with the global field as
    /// owner, so nested type references point at the units its own top-level
    /// emission produces. Nothing below the variant is emitted here.
    fn emit_global_field_variant(
        &mut self,
        variant: &ContentTypeDef,
        global_field_uid: &str,
        variant_type: &str,
        scope: &Scope,
        wrapper: &str,
    ) -> GenerateResult<()> {
        let key = self.key(&variant.uid, Role::BlockVariant, variant_type, scope);
        if !self.begin(&key)? {
            return Ok(());
        }
        self.check_derived(&variant.title, variant_type, &key.qualified);

        let mut unit = GeneratedUnit::new(
            variant_type,
            scope.namespace(&self.options.namespace),
            scope.directory().to_vec(),
            UnitBody::Model {
                content_type_uid: None,
            },
        );
        unit.extends = vec![wrapper.to_string()];

        let registry = self.registry;
        match registry.lookup(global_field_uid) {
            Some(global_field) => {
                let owner = definition_name(&global_field.title, &global_field.uid);
                let root = self.root_scope();
                for role in [NestedRole::Blocks, NestedRole::Group] {
                    let kind = match role {
                        NestedRole::Blocks => DataKind::Blocks,
                        NestedRole::Group => DataKind::Group,
                    };
                    if global_field.fields.iter().any(|f| f.data_kind == kind) {
                        let nested = root.child(nested_directory(&owner, role));
                        unit.imports
                            .insert(nested.namespace(&self.options.namespace).join("."));
                    }
                }
                let reserved = member_names(variant_type, &[BLOCK_TYPE_MEMBER]);
                unit.members = self.members(&owner, variant_type, &global_field.fields, reserved);
            }
            None => self.report(Diagnostic::new(
                DiagnosticKind::UnresolvedReference,
                format!("{wrapper}.{}", variant.uid),
                format!("global field '{global_field_uid}' is not registered"),
            )),
        }

        self.push_unit(unit, &key);
        self.end(key);
        Ok(())
    }

    /// Step 2. Returns the namespace of the group directory if one was needed.
    fn emit_groups(
        &mut self,
        owner: &str,
        fields: &[FieldDef],
        scope: &Scope,
    ) -> GenerateResult<Option<String>> {
        let groups: Vec<&FieldDef> = fields
            .iter()
            .filter(|field| field.data_kind == DataKind::Group)
            .collect();
        if groups.is_empty() {
            return Ok(None);
        }

        tracing::debug!(owner, count = groups.len(), "extracting groups");
        let child = scope.child(nested_directory(owner, NestedRole::Group));

        for field in groups {
            let name = nested_type_name(&self.options.prefixes, NestedRole::Group, owner, field);
            self.emit_schema(
                Subject {
                    uid: &field.uid,
                    label: field.label(),
                    name,
                    fields: &field.nested_schema,
                    role: Role::Group,
                    content_type_uid: None,
                },
                &child,
                None,
            )?;
        }

        Ok(Some(child.namespace(&self.options.namespace).join(".")))
    }

    /// Properties of `unit_name`, one per field.
    ///
    /// `owner` is the name nested type references are derived from. Member
    /// names are unique within the unit; a later field whose uid derives a
    /// taken name gets a numeric suffix.
    fn members(
        &mut self,
        owner: &str,
        unit_name: &str,
        fields: &[FieldDef],
        mut names: MemberNames,
    ) -> Vec<PropertyDecl> {
        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let resolution = self.resolver.resolve(field, owner);
            if let Some(diagnostic) = resolution.diagnostic {
                self.report(diagnostic);
            }
            let (accessor, companions): (_, &[&str]) = if field.is_markdown() {
                (Accessor::Markdown, &[MARKDOWN_STORE_SUFFIX])
            } else {
                (Accessor::Plain, &[])
            };

            let subject = format!("{unit_name}.{}", field.uid);
            let derived = property_name(&field.uid);
            self.check_derived(&field.uid, &derived, &subject);
            let name = self.claim(&mut names, &derived, companions, &field.uid, &subject);

            members.push(
                PropertyDecl::new(name, field.uid.clone(), resolution.ty).with_accessor(accessor),
            );
        }
        members
    }

    /// Claim `derived` in `names`, reporting a collision when it was renamed.
    fn claim(
        &mut self,
        names: &mut MemberNames,
        derived: &str,
        companions: &[&str],
        uid: &str,
        subject: &str,
    ) -> String {
        let name = names.claim(derived, companions);
        if name != derived {
            self.report(Diagnostic::new(
                DiagnosticKind::NameCollision,
                subject,
                format!("'{uid}' derives '{derived}' which is already used, renamed to '{name}'"),
            ));
        }
        name
    }

    /// Report when `label` derived no identifier and `name` is a fallback.
    fn check_derived(&mut self, label: &str, name: &str, subject: &str) {
        if type_name(label).is_empty() {
            self.report(Diagnostic::new(
                DiagnosticKind::EmptyName,
                subject,
                format!("'{label}' derives no identifier, using '{name}'"),
            ));
        }
    }

    fn push_unit(&mut self, unit: GeneratedUnit, key: &EmissionKey) {
        let qualified = unit.qualified_name();
        match self.claimed.get(&qualified) {
            Some(owner) if owner != key => {
                self.report(Diagnostic::new(
                    DiagnosticKind::NameCollision,
                    qualified,
                    format!(
                        "'{}' derives the same name as '{}', keeping the first",
                        key.uid, owner.uid
                    ),
                ));
            }
            Some(_) => {}
            None => {
                tracing::debug!(unit = %qualified, kind = unit.kind().label(), "emitting unit");
                self.claimed.insert(qualified, key.clone());
                self.units.push(unit);
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind.is_warning() {
            tracing::warn!(subject = %diagnostic.subject, "{}", diagnostic.message);
        } else {
            tracing::debug!(subject = %diagnostic.subject, "{}", diagnostic.message);
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Names taken in a unit before its fields: the unit's own name and `fixed`.
fn member_names(unit_name: &str, fixed: &[&str]) -> MemberNames {
    MemberNames::reserving(std::iter::once(unit_name).chain(fixed.iter().copied()))
}

/// Generate all units for `registry`.
pub fn generate(registry: &SchemaRegistry, options: EmitOptions) -> GenerateResult<GenerationOutput> {
    ModelEmitter::new(registry, options).generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> EmitOptions {
        EmitOptions {
            support_units: false,
            ..EmitOptions::default()
        }
    }

    #[test]
    fn test_scope_namespace() {
        let scope = Scope::root("Models").child("ArticleBlocks");
        assert_eq!(scope.directory(), ["Models", "ArticleBlocks"]);
        assert_eq!(
            scope.namespace("ContentstackModels"),
            vec!["ContentstackModels", "Models", "ArticleBlocks"]
        );
    }

    #[test]
    fn test_flat_content_type() {
        let registry: SchemaRegistry = [ContentTypeDef::new(
            "article",
            "Article",
            vec![FieldDef::new("title", DataKind::Text)],
        )]
        .into_iter()
        .collect();

        let output = generate(&registry, options()).unwrap();
        assert_eq!(output.units.len(), 1);
        let article = &output.units[0];
        assert_eq!(article.name, "Article");
        assert_eq!(article.namespace(), "ContentstackModels.Models");
        assert_eq!(article.extends, vec![EMBEDDED_OBJECT.to_string()]);
        assert!(article.imports.is_empty());
        assert_eq!(
            article.body,
            UnitBody::Model {
                content_type_uid: Some("article".into())
            }
        );
    }

    #[test]
    fn test_emit_twice_is_skipped() {
        let registry: SchemaRegistry = [ContentTypeDef::new("page", "Page", Vec::new())]
            .into_iter()
            .collect();
        let mut emitter = ModelEmitter::new(&registry, options());
        emitter.emit_uid("page").unwrap();
        emitter.emit_uid("page").unwrap();
        let output = emitter.finish();
        assert_eq!(output.units.len(), 1);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_emit_unknown_uid() {
        let registry = SchemaRegistry::new();
        let mut emitter = ModelEmitter::new(&registry, options());
        assert_eq!(
            emitter.emit_uid("missing"),
            Err(GenerateError::UnknownContentType {
                uid: "missing".into()
            })
        );
    }

    #[test]
    fn test_in_progress_reentry_is_a_cycle() {
        let registry = SchemaRegistry::new();
        let mut emitter = ModelEmitter::new(&registry, options());
        let key = emitter.key("a", Role::Group, "GroupA", &Scope::root("Models"));
        assert_eq!(emitter.begin(&key), Ok(true));
        assert!(matches!(
            emitter.begin(&key),
            Err(GenerateError::RecursionCycle { .. })
        ));
        emitter.end(key.clone());
        assert_eq!(emitter.begin(&key), Ok(false));
    }
}
