//! Rendering of generated units into source text.
//!
//! The [`UnitRenderer`] trait is the seam between the language-neutral engine
//! and a target language. [`CSharpRenderer`] targets the Contentstack .NET SDK.

mod csharp;

pub use csharp::CSharpRenderer;

use std::path::PathBuf;

use crate::unit::GeneratedUnit;

/// Trait for target language renderers.
///
/// Rendering is pure: the same unit always renders to the same text.
pub trait UnitRenderer: Send + Sync {
    /// Returns the unique identifier for this renderer (e.g. "csharp").
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of this renderer.
    fn name(&self) -> &'static str;

    /// Returns the file extension for rendered units.
    fn file_extension(&self) -> &'static str;

    /// Render one unit.
    fn render(&self, unit: &GeneratedUnit) -> String;

    /// Output path of `unit` relative to the output root.
    fn relative_path(&self, unit: &GeneratedUnit) -> PathBuf {
        unit.relative_path(self.file_extension())
    }
}

/// A rendered unit ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    pub name: String,
    /// Path relative to the output root.
    pub path: PathBuf,
    pub content: String,
}

/// Render every unit with `renderer`.
pub fn render_all(renderer: &dyn UnitRenderer, units: &[GeneratedUnit]) -> Vec<RenderedUnit> {
    units
        .iter()
        .map(|unit| RenderedUnit {
            name: unit.name.clone(),
            path: renderer.relative_path(unit),
            content: renderer.render(unit),
        })
        .collect()
}
