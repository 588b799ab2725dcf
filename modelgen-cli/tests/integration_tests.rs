//! Integration tests for modelgen-cli.
//!
//! These tests drive the full pipeline from a schema export on disk through
//! the registry, the engine and the renderer into a temporary output tree.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use modelgen::{DiagnosticKind, ReferencePolicy};
use modelgen_cli::{
    config::{CliArgs, Config, ConfigManager, ReferenceMode},
    error::CliError,
    generator::{GeneratedModels, ModelGenerator},
    source::{load_registry, FileSource, SchemaSource},
    writer::{AlwaysOverwrite, NeverOverwrite, UnitWriter, WriteResult},
};

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_source() -> FileSource {
    FileSource::open(fixtures_path().join("stack.json")).unwrap()
}

fn config_for(dir: &Path) -> Config {
    let mut config = Config::default();
    config.output.path = dir.to_path_buf();
    config
}

fn generate_into(dir: &Path) -> GeneratedModels {
    ModelGenerator::new(config_for(dir))
        .generate(&fixture_source())
        .unwrap()
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
}

// =============================================================================
// Schema Source Tests
// =============================================================================

#[test]
fn test_fixture_loads_into_registry() {
    let source = fixture_source();
    let registry = load_registry(&source).unwrap();

    assert_eq!(registry.content_types().count(), 2);
    assert_eq!(registry.global_fields().count(), 1);
    assert_eq!(
        registry.all().iter().map(|d| d.uid.as_str()).collect::<Vec<_>>(),
        vec!["author", "blog_post", "seo"]
    );

    let stack = source.stack().unwrap();
    assert_eq!(stack.name, "Demo Stack");
    assert_eq!(
        ReferenceMode::Auto.policy(stack.schema_version()),
        ReferencePolicy::AlwaysList
    );
}

// =============================================================================
// End-to-End Generation Tests
// =============================================================================

#[test]
fn test_generate_writes_expected_tree() {
    let dir = TempDir::new().unwrap();
    let models = generate_into(dir.path());

    let writer = UnitWriter::new(dir.path()).with_policy(NeverOverwrite);
    let results = writer.write_all(&models.units).unwrap();
    assert!(results.iter().all(WriteResult::was_written));

    for expected in [
        "Models/ContentstackLink.cs",
        "Models/ContentstackHelper.cs",
        "Models/ContentstackStringExtension.cs",
        "Models/DisplayNameAttribute.cs",
        "Models/IEmbeddedObjectConverter.cs",
        "Models/Author.cs",
        "Models/BlogPost.cs",
        "Models/SEO.cs",
        "Models/BlogPostBlocks/MBBlogPostSections.cs",
        "Models/BlogPostBlocks/MBBlogPostSectionsEnum.cs",
        "Models/BlogPostBlocks/MBBlogPostSectionsConverter.cs",
        "Models/BlogPostBlocks/MBBlogPostSectionsHero.cs",
        "Models/BlogPostBlocks/MBBlogPostSectionsQuote.cs",
        "Models/BlogPostBlocks/MBBlogPostSectionsSEO.cs",
        "Models/BlogPostBlocks/MBBlogPostSectionsQuoteGroup/GroupMBBlogPostSectionsQuoteAttribution.cs",
        "Models/SEOGroup/GroupSEOSocial.cs",
    ] {
        assert!(dir.path().join(expected).is_file(), "missing {expected}");
    }

    assert_eq!(results.len(), 16);
}

#[test]
fn test_blog_post_model_content() {
    let dir = TempDir::new().unwrap();
    let models = generate_into(dir.path());
    UnitWriter::new(dir.path())
        .with_policy(NeverOverwrite)
        .write_all(&models.units)
        .unwrap();

    let code = read(dir.path(), "Models/BlogPost.cs");
    assert!(code.contains("using ContentstackModels.Models.BlogPostBlocks;"));
    assert!(code.contains("namespace ContentstackModels.Models"));
    assert!(code.contains("public partial class BlogPost : IEntryEmbedable, IEmbeddedObject"));
    assert!(code.contains("public const string ContentType = \"blog_post\";"));
    assert!(code.contains("public List<Author> Author { get; set; }"));
    assert!(code.contains("public MBBlogPostSections Sections { get; set; }"));
    assert!(code.contains("public SEO Seo { get; set; }"));
    assert!(code.contains("[JsonProperty(propertyName: \"published_on\")]"));
    assert!(code.contains("public DateTime PublishedOn { get; set; }"));
    assert!(code.contains("return this.SummaryStore.ToHtml();"));
    assert!(code.contains("public object Legacy { get; set; }"));
    assert!(code.contains("_embedded_items"));

    let variant = read(dir.path(), "Models/BlogPostBlocks/MBBlogPostSectionsSEO.cs");
    assert!(variant.contains("public partial class MBBlogPostSectionsSEO : MBBlogPostSections"));
    assert!(variant.contains("using ContentstackModels.Models.SEOGroup;"));
    assert!(variant.contains("public GroupSEOSocial Social { get; set; }"));

    let tags = read(dir.path(), "Models/BlogPostBlocks/MBBlogPostSectionsEnum.cs");
    assert!(tags.contains("[DisplayName(displayName: \"seo_block\")]"));
}

#[test]
fn test_diagnostics_are_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let models = generate_into(dir.path());

    let unknown: Vec<_> = models
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnknownDataKind)
        .collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].subject, "BlogPost.legacy");
}

#[test]
fn test_generation_is_repeatable() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let a = generate_into(first.path());
    let b = generate_into(second.path());

    assert_eq!(a.units.len(), b.units.len());
    for (x, y) in a.units.iter().zip(&b.units) {
        assert_eq!(x.path, y.path);
        assert_eq!(x.content, y.content);
    }
}

// =============================================================================
// Writer Integration Tests
// =============================================================================

#[test]
fn test_second_run_skips_existing_files() {
    let dir = TempDir::new().unwrap();
    let models = generate_into(dir.path());

    let writer = UnitWriter::new(dir.path()).with_policy(NeverOverwrite);
    writer.write_all(&models.units).unwrap();

    let article = dir.path().join("Models/Author.cs");
    fs::write(&article, "// edited by hand").unwrap();

    let results = writer.write_all(&models.units).unwrap();
    assert!(results
        .iter()
        .all(|r| matches!(r, WriteResult::Skipped { .. })));
    assert_eq!(fs::read_to_string(&article).unwrap(), "// edited by hand");
}

#[test]
fn test_confirmed_or_forced_overwrite_replaces_files() {
    let dir = TempDir::new().unwrap();
    let models = generate_into(dir.path());
    let author = dir.path().join("Models/Author.cs");

    UnitWriter::new(dir.path())
        .with_policy(NeverOverwrite)
        .write_all(&models.units)
        .unwrap();

    fs::write(&author, "stale").unwrap();
    UnitWriter::new(dir.path())
        .with_policy(AlwaysOverwrite)
        .write_all(&models.units)
        .unwrap();
    assert!(fs::read_to_string(&author).unwrap().contains("class Author"));

    fs::write(&author, "stale").unwrap();
    UnitWriter::new(dir.path())
        .with_policy(NeverOverwrite)
        .with_force(true)
        .write_all(&models.units)
        .unwrap();
    assert!(fs::read_to_string(&author).unwrap().contains("class Author"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let models = generate_into(dir.path());

    let results = UnitWriter::new(dir.path())
        .with_dry_run(true)
        .write_all(&models.units)
        .unwrap();

    assert_eq!(results.len(), models.units.len());
    assert!(results.iter().all(|r| !r.was_written() && r.bytes() == 0));
    assert!(!dir.path().join("Models").exists());
}

// =============================================================================
// Configuration Integration Tests
// =============================================================================

#[test]
fn test_config_file_and_cli_args_shape_output() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("modelgen.toml");
    fs::write(
        &config_path,
        r#"
[output]
namespace = "Acme.Cms"
directory = "Entities"

[naming]
modular_block_prefix = "Blocks"

[features]
references = "declared"
nullable = true
"#,
    )
    .unwrap();

    let config = ConfigManager::load(Some(&config_path)).unwrap();
    let config = ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            path: Some(dir.path().to_path_buf()),
            group_prefix: Some("Grp".into()),
            ..Default::default()
        },
    );
    ConfigManager::validate(&config).unwrap();

    let models = ModelGenerator::new(config).generate(&fixture_source()).unwrap();
    assert_eq!(models.reference_policy, ReferencePolicy::AsDeclared);

    let blog_post = models.units.iter().find(|u| u.name == "BlogPost").unwrap();
    assert_eq!(blog_post.path, PathBuf::from("Entities/BlogPost.cs"));
    assert!(blog_post.content.contains("namespace Acme.Cms.Entities"));
    assert!(blog_post.content.contains("public Author? Author { get; set; }"));
    assert!(blog_post.content.contains("public BlocksBlogPostSections? Sections { get; set; }"));

    assert!(models
        .units
        .iter()
        .any(|u| u.path == Path::new("Entities/BlogPostBlocks/BlocksBlogPostSectionsQuoteGroup/GrpBlocksBlogPostSectionsQuoteAttribution.cs")));
}

#[test]
fn test_invalid_config_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("modelgen.toml");
    fs::write(&config_path, "[output]\nnamespace = \"Not A Namespace\"\n").unwrap();

    let config = ConfigManager::load(Some(&config_path)).unwrap();
    let err = ConfigManager::validate(&config).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_missing_export_is_a_fetch_error() {
    let err = FileSource::open(fixtures_path().join("missing.json")).unwrap_err();
    let err = CliError::from(err);
    assert!(matches!(err, CliError::Fetch(_)));
    assert_eq!(err.exit_code(), 1);
}
