//! Model generator tying the schema source, engine and renderer together.
//!
//! The registry is fully loaded before the engine runs; rendering happens
//! only after the engine succeeded, so a fatal error writes nothing.

use crate::config::Config;
use crate::error::CliResult;
use crate::source::{load_registry, SchemaSource, StackInfo};
use modelgen::render::render_all;
use modelgen::{
    generate, CSharpRenderer, Diagnostic, ReferencePolicy, RenderedUnit, SchemaRegistry,
};

/// Everything produced by one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedModels {
    /// Stack the schemas were read from.
    pub stack: StackInfo,

    /// Number of content types in the registry.
    pub content_types: usize,

    /// Number of global fields in the registry.
    pub global_fields: usize,

    /// Reference policy the run used.
    pub reference_policy: ReferencePolicy,

    /// Rendered units in emission order.
    pub units: Vec<RenderedUnit>,

    /// Non-fatal problems found by the engine.
    pub diagnostics: Vec<Diagnostic>,
}

/// Generates C# models for a configured stack.
pub struct ModelGenerator {
    config: Config,
}

impl ModelGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load every schema from `source` and generate models.
    pub fn generate(&self, source: &dyn SchemaSource) -> CliResult<GeneratedModels> {
        let stack = source.stack()?;
        tracing::info!(stack = %stack.name, version = ?stack.settings.version, "loaded stack");

        let registry = load_registry(source)?;
        self.generate_from_registry(stack, &registry)
    }

    /// Generate models from an already populated registry.
    pub fn generate_from_registry(
        &self,
        stack: StackInfo,
        registry: &SchemaRegistry,
    ) -> CliResult<GeneratedModels> {
        let reference_policy = self
            .config
            .features
            .references
            .policy(stack.schema_version());
        tracing::debug!(?reference_policy, "resolved reference policy");

        let output = generate(registry, self.config.emit_options(reference_policy))?;

        let renderer = CSharpRenderer::new().with_nullable(self.config.features.nullable);
        let units = render_all(&renderer, &output.units);

        Ok(GeneratedModels {
            stack,
            content_types: registry.content_types().count(),
            global_fields: registry.global_fields().count(),
            reference_policy,
            units,
            diagnostics: output.diagnostics,
        })
    }
}
