//! C# renderer for the Contentstack .NET SDK.
//!
//! # Type Mappings
//!
//! | Type | C# |
//! |------|----|
//! | `String` | `string` |
//! | `Double` | `double` |
//! | `DateTime` | `DateTime` |
//! | `Asset` | `Asset` |
//! | `Bool` | `bool` |
//! | `RichTextNode` | `Node` |
//! | `Dynamic` | `dynamic` |
//! | `Link` | `ContentstackLink` |
//! | `Named(T)` | `T` |
//! | `Opaque` | `object` |
//! | `List(T)` | `List<T>` |

use super::UnitRenderer;
use crate::resolver::TypeRef;
use crate::support::{DISPLAY_NAME_ATTRIBUTE, HELPER, LINK_TYPE, STRING_EXTENSION};
use crate::unit::{
    Accessor, Dispatch, GeneratedUnit, HelperKind, PropertyDecl, UnitBody, VariantTag,
    ENTRY_EMBEDDABLE, MARKDOWN_STORE_SUFFIX,
};

const MODEL_USINGS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Text",
    "System.Threading.Tasks",
    "Contentstack.Core.Models",
    "Contentstack.Utils.Models",
    "Contentstack.Utils.Interfaces",
    "Newtonsoft.Json",
    "Newtonsoft.Json.Converters",
    "Newtonsoft.Json.Linq",
];

const CONVERTER_USINGS: &[&str] = &[
    "System",
    "Newtonsoft.Json",
    "System.Reflection",
    "Newtonsoft.Json.Linq",
    "System.ComponentModel",
    "Contentstack.Core",
];

const EMBEDDED_CONVERTER_USINGS: &[&str] = &[
    "System",
    "Newtonsoft.Json",
    "Contentstack.Core",
    "Newtonsoft.Json.Linq",
    "Contentstack.Core.Models",
    "System.Collections.Generic",
    "Contentstack.Utils.Interfaces",
];

/// Renders units as C# source files.
#[derive(Debug, Clone, Default)]
pub struct CSharpRenderer {
    /// Emit nullable reference annotations (`string?`).
    nullable: bool,
}

impl CSharpRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable nullable annotations.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// C# spelling of a type.
    pub fn type_name(ty: &TypeRef) -> String {
        match ty {
            TypeRef::String => "string".to_string(),
            TypeRef::Double => "double".to_string(),
            TypeRef::DateTime => "DateTime".to_string(),
            TypeRef::Asset => "Asset".to_string(),
            TypeRef::Bool => "bool".to_string(),
            TypeRef::RichTextNode => "Node".to_string(),
            TypeRef::Dynamic => "dynamic".to_string(),
            TypeRef::Link => LINK_TYPE.to_string(),
            TypeRef::Named(name) => name.clone(),
            TypeRef::Opaque => "object".to_string(),
            TypeRef::List(inner) => format!("List<{}>", Self::type_name(inner)),
        }
    }

    fn q(&self) -> &'static str {
        if self.nullable {
            "?"
        } else {
            ""
        }
    }

    // =========================================================================
    // Models
    // =========================================================================

    fn render_model(&self, unit: &GeneratedUnit, content_type_uid: Option<&str>) -> String {
        let mut src = Source::new();
        src.usings(MODEL_USINGS);
        src.usings(unit.imports.iter().map(String::as_str));
        src.blank();

        src.open(format!("namespace {}", unit.namespace()));
        src.open(class_header("public partial class", &unit.name, &unit.extends));

        let q = self.q();
        if let Some(uid) = content_type_uid {
            src.line(format!("public const string ContentType = \"{uid}\";"));
            src.line(format!("public string{q} Uid {{ get; set; }}"));
            src.line("[JsonProperty(propertyName: \"_content_type_uid\")]");
            src.line(format!("public string{q} ContentTypeUid {{ get; set; }}"));
        }

        for member in &unit.members {
            self.render_property(&mut src, member);
        }

        if unit.extends.iter().any(|e| e == ENTRY_EMBEDDABLE) {
            src.line("[JsonProperty(propertyName: \"_embedded_items\")]");
            src.line(format!(
                "public Dictionary<string, List<IEmbeddedObject>>{q} embeddedItems {{ get; set; }}"
            ));
        }

        src.close();
        src.close();
        src.finish()
    }

    fn render_property(&self, src: &mut Source, member: &PropertyDecl) {
        if member.needs_wire_name() {
            src.line(format!(
                "[JsonProperty(propertyName: \"{}\")]",
                member.wire_name
            ));
        }

        let ty = Self::type_name(&member.ty);
        match member.accessor {
            Accessor::Plain => {
                src.line(format!(
                    "public {ty}{} {} {{ get; set; }}",
                    self.q(),
                    member.name
                ));
            }
            Accessor::Markdown => {
                let store = format!("{}{MARKDOWN_STORE_SUFFIX}", member.name);
                let (to_html, initial) = if member.ty.is_list() {
                    ("ToListHtml()", format!("new {ty}()"))
                } else {
                    ("ToHtml()", "\"\"".to_string())
                };
                src.open(format!("public {ty} {}", member.name));
                src.line(format!("set {{ this.{store} = value; }}"));
                src.line(format!("get {{ return this.{store}.{to_html}; }}"));
                src.close();
                src.line(format!("private {ty} {store} = {initial};"));
            }
        }
    }

    // =========================================================================
    // Modular blocks
    // =========================================================================

    fn render_wrapper(&self, unit: &GeneratedUnit) -> String {
        let mut src = Source::new();
        src.open(format!("namespace {}", unit.namespace()));
        src.open(class_header("public partial class", &unit.name, &unit.extends));
        for member in &unit.members {
            src.line(format!(
                "public {} {} {{ get; set; }}",
                Self::type_name(&member.ty),
                member.name
            ));
        }
        src.close();
        src.close();
        src.finish()
    }

    fn render_tag_enum(&self, unit: &GeneratedUnit, tags: &[VariantTag]) -> String {
        let mut src = Source::new();
        src.usings(["System.ComponentModel"]);
        src.blank();
        src.open(format!("namespace {}", unit.namespace()));
        src.open(format!("public enum {}", unit.name));
        for (i, tag) in tags.iter().enumerate() {
            let separator = if i + 1 < tags.len() { "," } else { "" };
            src.line(format!("[DisplayName(displayName: \"{}\")]", tag.uid));
            src.line(format!("{}{separator}", tag.member));
        }
        src.close();
        src.close();
        src.finish()
    }

    fn render_block_converter(
        &self,
        unit: &GeneratedUnit,
        wrapper: &str,
        tag_enum: &str,
        arms: &[VariantTag],
    ) -> String {
        let q = self.q();
        let mut src = Source::new();
        src.usings(CONVERTER_USINGS);
        src.blank();
        src.open(format!("namespace {}", unit.namespace()));
        src.line(format!("[CSJsonConverter(\"{}\")]", unit.name));
        src.open(format!(
            "public partial class {} : JsonConverter<{wrapper}>",
            unit.name
        ));

        src.open(format!(
            "protected {wrapper} Create(Type objectType, JObject jObject)"
        ));
        for arm in arms {
            let tag = format!("{tag_enum}.{}", arm.member);
            src.open(format!(
                "if (ContentstackHelper.FieldExists(ContentstackHelper.GetDescription({tag}), jObject))"
            ));
            src.line(format!(
                "{} block = new {}();",
                arm.variant_type, arm.variant_type
            ));
            src.line(format!("block.BlockType = {tag};"));
            src.line("return block;");
            src.close();
        }
        src.line(format!("return new {wrapper}();"));
        src.close();
        src.blank();

        src.open(format!(
            "public override {wrapper}{q} ReadJson(JsonReader reader, Type objectType, {wrapper}{q} existingValue, bool hasExistingValue, JsonSerializer serializer)"
        ));
        src.line("JObject jObject = JObject.Load(reader);");
        src.line(format!("{wrapper} target = Create(objectType, jObject);"));
        src.line("var token = jObject.GetValue(ContentstackHelper.GetDescription(target.BlockType));");
        src.open("if (token != null)");
        src.line("serializer.Populate(token.CreateReader(), target);");
        src.close();
        src.line("return target;");
        src.close();
        src.blank();

        self.render_write_json(&mut src, wrapper);

        src.close();
        src.close();
        src.finish()
    }

    fn render_write_json(&self, src: &mut Source, ty: &str) {
        src.open(format!(
            "public override void WriteJson(JsonWriter writer, {ty}{} value, JsonSerializer serializer)",
            self.q()
        ));
        src.open("if (value != null)");
        src.line("JToken t = JToken.FromObject(value);");
        src.line("t.WriteTo(writer);");
        src.close();
        src.close();
    }

    // =========================================================================
    // Support units
    // =========================================================================

    fn render_embedded_converter(&self, unit: &GeneratedUnit, arms: &[(String, String)]) -> String {
        let q = self.q();
        let list = "List<IEmbeddedObject>";
        let mut src = Source::new();
        src.usings(EMBEDDED_CONVERTER_USINGS);
        src.blank();
        src.open(format!("namespace {}", unit.namespace()));
        src.line(format!("[CSJsonConverter(\"{}\")]", unit.name));
        src.open(format!(
            "public partial class {} : JsonConverter<{list}>",
            unit.name
        ));

        src.open(format!("protected {list} Create(Type objectType, JArray jArray)"));
        src.line(format!("return new {list}();"));
        src.close();
        src.blank();

        src.open(format!(
            "public override {list}{q} ReadJson(JsonReader reader, Type objectType, {list}{q} existingValue, bool hasExistingValue, JsonSerializer serializer)"
        ));
        src.line("JArray jArray = JArray.Load(reader);");
        src.line(format!("{list} target = Create(objectType, jArray);"));
        src.open("foreach (JObject obj in jArray)");
        src.line(format!(
            "string{q} contentTypeUid = (string{q})obj.GetValue(\"_content_type_uid\");"
        ));
        let all_arms = arms
            .iter()
            .map(|(uid, ty)| (uid.as_str(), ty.as_str()))
            .chain(std::iter::once(("sys_assets", "Asset")));
        for (i, (uid, ty)) in all_arms.enumerate() {
            let keyword = if i == 0 { "if" } else { "else if" };
            src.open(format!("{keyword} (contentTypeUid == \"{uid}\")"));
            src.line(format!("{ty}{q} item = obj.ToObject<{ty}>();"));
            src.open("if (item != null)");
            src.line("target.Add(item);");
            src.close();
            src.close();
        }
        src.close();
        src.line("return target;");
        src.close();
        src.blank();

        self.render_write_json(&mut src, list);

        src.close();
        src.close();
        src.finish()
    }

    fn render_link(&self, unit: &GeneratedUnit) -> String {
        let mut src = Source::new();
        src.usings(MODEL_USINGS);
        src.blank();
        src.open(format!("namespace {}", unit.namespace()));
        src.open(format!("public partial class {LINK_TYPE}"));
        for member in &unit.members {
            self.render_property(&mut src, member);
        }
        src.close();
        src.close();
        src.finish()
    }

    fn render_helper(&self, unit: &GeneratedUnit, kind: HelperKind) -> String {
        let mut src = Source::new();
        match kind {
            HelperKind::Helper => {
                src.usings(MODEL_USINGS);
                src.usings(["System.ComponentModel", "System.Reflection"]);
                src.blank();
                src.open(format!("namespace {}", unit.namespace()));
                src.open(format!("public partial class {HELPER}"));
                src.open("public static string GetDescription(Enum en)");
                src.line("Type type = en.GetType();");
                src.line("MemberInfo[] memInfo = type.GetMember(en.ToString());");
                src.open("if (memInfo != null && memInfo.Length > 0)");
                src.line(format!(
                    "object[] attrs = memInfo[0].GetCustomAttributes(typeof({DISPLAY_NAME_ATTRIBUTE}), false);"
                ));
                src.open("if (attrs != null && attrs.Length > 0)");
                src.line(format!(
                    "return (({DISPLAY_NAME_ATTRIBUTE})attrs[0]).DisplayName;"
                ));
                src.close();
                src.close();
                src.line("return en.ToString();");
                src.close();
                src.blank();
                src.open("public static bool FieldExists(string fieldName, JObject jObject)");
                src.line("return jObject[fieldName] != null;");
                src.close();
            }
            HelperKind::StringExtension => {
                src.usings(["Markdig"]);
                src.usings(MODEL_USINGS);
                src.blank();
                src.open(format!("namespace {}", unit.namespace()));
                src.open(format!("public static class {STRING_EXTENSION}"));
                src.open("public static string ToHtml(this String str)");
                src.open("if (str != null)");
                src.line("var pipeline = new MarkdownPipelineBuilder().UseAdvancedExtensions().Build();");
                src.line("return Markdown.ToHtml(str, pipeline);");
                src.close();
                src.line("return string.Empty;");
                src.close();
                src.blank();
                src.open("public static List<string> ToListHtml(this List<string> str)");
                src.line("List<string> result = new List<string>();");
                src.open("foreach (var value in str)");
                src.line("result.Add(value.ToHtml());");
                src.close();
                src.line("return result;");
                src.close();
            }
            HelperKind::DisplayNameAttribute => {
                src.usings(["System"]);
                src.blank();
                src.open(format!("namespace {}", unit.namespace()));
                src.line("[AttributeUsage(AttributeTargets.Field)]");
                src.open(format!(
                    "public partial class {DISPLAY_NAME_ATTRIBUTE} : Attribute"
                ));
                src.line("private string displayName;");
                src.open("public string DisplayName");
                src.line("get { return displayName; }");
                src.close();
                src.blank();
                src.open(format!("public {DISPLAY_NAME_ATTRIBUTE}(string displayName)"));
                src.line("this.displayName = displayName;");
                src.close();
            }
        }
        src.close();
        src.close();
        src.finish()
    }
}

impl UnitRenderer for CSharpRenderer {
    fn id(&self) -> &'static str {
        "csharp"
    }

    fn name(&self) -> &'static str {
        "C# Model Renderer"
    }

    fn file_extension(&self) -> &'static str {
        "cs"
    }

    fn render(&self, unit: &GeneratedUnit) -> String {
        match &unit.body {
            UnitBody::Model { content_type_uid } => {
                self.render_model(unit, content_type_uid.as_deref())
            }
            UnitBody::PolymorphicWrapper => self.render_wrapper(unit),
            UnitBody::TagEnum { tags } => self.render_tag_enum(unit, tags),
            UnitBody::Converter(Dispatch::KeyPresence {
                wrapper,
                tag_enum,
                arms,
            }) => self.render_block_converter(unit, wrapper, tag_enum, arms),
            UnitBody::Converter(Dispatch::ContentTypeUid { arms }) => {
                self.render_embedded_converter(unit, arms)
            }
            UnitBody::Link => self.render_link(unit),
            UnitBody::Helper(kind) => self.render_helper(unit, *kind),
        }
    }
}

fn class_header(keyword: &str, name: &str, extends: &[String]) -> String {
    if extends.is_empty() {
        format!("{keyword} {name}")
    } else {
        format!("{keyword} {name} : {}", extends.join(", "))
    }
}

/// Indentation-aware line buffer.
struct Source {
    out: String,
    depth: usize,
}

impl Source {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn usings<S: AsRef<str>>(&mut self, namespaces: impl IntoIterator<Item = S>) {
        for namespace in namespaces {
            self.line(format!("using {};", namespace.as_ref()));
        }
    }

    fn open(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.line("{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitKind;

    fn model(name: &str, members: Vec<PropertyDecl>) -> GeneratedUnit {
        let mut unit = GeneratedUnit::new(
            name,
            vec!["ContentstackModels".into(), "Models".into()],
            vec!["Models".into()],
            UnitBody::Model {
                content_type_uid: Some("article".into()),
            },
        );
        unit.members = members;
        unit.extends = vec!["IEmbeddedObject".into()];
        unit
    }

    #[test]
    fn test_type_names() {
        assert_eq!(CSharpRenderer::type_name(&TypeRef::Opaque), "object");
        assert_eq!(CSharpRenderer::type_name(&TypeRef::Link), "ContentstackLink");
        assert_eq!(
            CSharpRenderer::type_name(&TypeRef::list(TypeRef::named("Author"))),
            "List<Author>"
        );
        assert_eq!(CSharpRenderer::type_name(&TypeRef::RichTextNode), "Node");
    }

    #[test]
    fn test_render_model() {
        let unit = model(
            "Article",
            vec![
                PropertyDecl::new("Title", "title", TypeRef::String),
                PropertyDecl::new("HeroImage", "hero_image", TypeRef::Asset),
            ],
        );
        let code = CSharpRenderer::new().render(&unit);

        assert!(code.contains("namespace ContentstackModels.Models\n{"));
        assert!(code.contains("    public partial class Article : IEmbeddedObject\n"));
        assert!(code.contains("        public const string ContentType = \"article\";"));
        assert!(code.contains("        public string Title { get; set; }"));
        assert!(code.contains("        [JsonProperty(propertyName: \"hero_image\")]\n        public Asset HeroImage { get; set; }"));
        assert!(!code.contains("propertyName: \"title\""));
        assert!(!code.contains("embeddedItems"));
    }

    #[test]
    fn test_render_nullable() {
        let unit = model("Article", vec![PropertyDecl::new("Title", "title", TypeRef::String)]);
        let code = CSharpRenderer::new().with_nullable(true).render(&unit);
        assert!(code.contains("public string? Title { get; set; }"));
        assert!(code.contains("public string? Uid { get; set; }"));
    }

    #[test]
    fn test_render_markdown_property() {
        let unit = model(
            "Article",
            vec![
                PropertyDecl::new("Body", "body", TypeRef::String).with_accessor(Accessor::Markdown),
                PropertyDecl::new("Notes", "notes", TypeRef::list(TypeRef::String))
                    .with_accessor(Accessor::Markdown),
            ],
        );
        let code = CSharpRenderer::new().render(&unit);
        assert!(code.contains("get { return this.BodyStore.ToHtml(); }"));
        assert!(code.contains("private string BodyStore = \"\";"));
        assert!(code.contains("get { return this.NotesStore.ToListHtml(); }"));
        assert!(code.contains("private List<string> NotesStore = new List<string>();"));
    }

    #[test]
    fn test_render_embeddable_model() {
        let mut unit = model("Article", Vec::new());
        unit.extends = vec![ENTRY_EMBEDDABLE.into(), "IEmbeddedObject".into()];
        unit.imports.insert("ContentstackModels.Models.ArticleGroup".into());
        let code = CSharpRenderer::new().render(&unit);
        assert!(code.contains("public partial class Article : IEntryEmbedable, IEmbeddedObject"));
        assert!(code.contains("using ContentstackModels.Models.ArticleGroup;"));
        assert!(code.contains("[JsonProperty(propertyName: \"_embedded_items\")]"));
    }

    #[test]
    fn test_render_tag_enum() {
        let unit = GeneratedUnit::new(
            "MBPageSectionsEnum",
            vec!["Ns".into(), "Models".into(), "PageBlocks".into()],
            vec!["Models".into(), "PageBlocks".into()],
            UnitBody::TagEnum {
                tags: vec![
                    VariantTag {
                        uid: "hero".into(),
                        member: "Hero".into(),
                        variant_type: "MBPageSectionsHero".into(),
                    },
                    VariantTag {
                        uid: "text_block".into(),
                        member: "TextBlock".into(),
                        variant_type: "MBPageSectionsText".into(),
                    },
                ],
            },
        );
        assert_eq!(unit.kind(), UnitKind::TagEnum);
        let code = CSharpRenderer::new().render(&unit);
        assert!(code.contains("public enum MBPageSectionsEnum"));
        assert!(code.contains("[DisplayName(displayName: \"hero\")]\n        Hero,\n"));
        assert!(code.contains("[DisplayName(displayName: \"text_block\")]\n        TextBlock\n"));
    }

    #[test]
    fn test_render_block_converter() {
        let unit = GeneratedUnit::new(
            "MBPageSectionsConverter",
            vec!["Ns".into()],
            Vec::new(),
            UnitBody::Converter(Dispatch::KeyPresence {
                wrapper: "MBPageSections".into(),
                tag_enum: "MBPageSectionsEnum".into(),
                arms: vec![VariantTag {
                    uid: "hero".into(),
                    member: "Hero".into(),
                    variant_type: "MBPageSectionsHero".into(),
                }],
            }),
        );
        let code = CSharpRenderer::new().render(&unit);
        assert!(code.contains("[CSJsonConverter(\"MBPageSectionsConverter\")]"));
        assert!(code.contains("public partial class MBPageSectionsConverter : JsonConverter<MBPageSections>"));
        assert!(code.contains("GetDescription(MBPageSectionsEnum.Hero), jObject)"));
        assert!(code.contains("MBPageSectionsHero block = new MBPageSectionsHero();"));
        assert!(code.contains("return new MBPageSections();"));
        assert!(code.contains("if (token != null)"));
    }

    #[test]
    fn test_render_embedded_converter() {
        let unit = GeneratedUnit::new(
            "IEmbeddedObjectConverter",
            vec!["Ns".into()],
            Vec::new(),
            UnitBody::Converter(Dispatch::ContentTypeUid {
                arms: vec![("article".into(), "Article".into())],
            }),
        );
        let code = CSharpRenderer::new().render(&unit);
        assert!(code.contains("if (contentTypeUid == \"article\")"));
        assert!(code.contains("Article item = obj.ToObject<Article>();"));
        assert!(code.contains("else if (contentTypeUid == \"sys_assets\")"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let unit = model("Article", vec![PropertyDecl::new("Title", "title", TypeRef::String)]);
        let renderer = CSharpRenderer::new();
        assert_eq!(renderer.render(&unit), renderer.render(&unit));
        assert_eq!(renderer.id(), "csharp");
        assert_eq!(
            renderer.relative_path(&unit),
            std::path::PathBuf::from("Models/Article.cs")
        );
    }
}
