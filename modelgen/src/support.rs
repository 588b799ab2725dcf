//! Support units emitted once per run, ahead of any content type.

use crate::naming::definition_name;
use crate::registry::SchemaRegistry;
use crate::resolver::TypeRef;
use crate::unit::{Dispatch, GeneratedUnit, HelperKind, PropertyDecl, UnitBody};

pub const LINK_TYPE: &str = "ContentstackLink";
pub const HELPER: &str = "ContentstackHelper";
pub const STRING_EXTENSION: &str = "ContentstackStringExtension";
pub const DISPLAY_NAME_ATTRIBUTE: &str = "DisplayNameAttribute";
pub const EMBEDDED_OBJECT_CONVERTER: &str = "IEmbeddedObjectConverter";

/// Build the support units for `registry` in the given root location.
///
/// The embedded object converter gets one arm per content type (global fields
/// are never embedded) in registry order.
pub fn support_units(
    registry: &SchemaRegistry,
    namespace_path: &[String],
    directory_path: &[String],
) -> Vec<GeneratedUnit> {
    let unit = |name: &str, body: UnitBody| {
        GeneratedUnit::new(name, namespace_path.to_vec(), directory_path.to_vec(), body)
    };

    let mut link = unit(LINK_TYPE, UnitBody::Link);
    link.members = vec![
        PropertyDecl::new("Title", "title", TypeRef::String),
        PropertyDecl::new("Href", "href", TypeRef::String),
    ];

    let arms = registry
        .content_types()
        .map(|def| (def.uid.clone(), definition_name(&def.title, &def.uid)))
        .collect();

    vec![
        link,
        unit(HELPER, UnitBody::Helper(HelperKind::Helper)),
        unit(STRING_EXTENSION, UnitBody::Helper(HelperKind::StringExtension)),
        unit(
            DISPLAY_NAME_ATTRIBUTE,
            UnitBody::Helper(HelperKind::DisplayNameAttribute),
        ),
        unit(
            EMBEDDED_OBJECT_CONVERTER,
            UnitBody::Converter(Dispatch::ContentTypeUid { arms }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContentTypeDef, SchemaOrigin};
    use crate::unit::UnitKind;

    #[test]
    fn test_support_units() {
        let registry: SchemaRegistry = [
            ContentTypeDef::new("article", "Article", Vec::new()),
            ContentTypeDef::new("seo", "SEO", Vec::new()).with_origin(SchemaOrigin::GlobalField),
            ContentTypeDef::new("blog_post", "Blog Post", Vec::new()),
        ]
        .into_iter()
        .collect();

        let units = support_units(&registry, &["Ns".into(), "Models".into()], &["Models".into()]);
        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                LINK_TYPE,
                HELPER,
                STRING_EXTENSION,
                DISPLAY_NAME_ATTRIBUTE,
                EMBEDDED_OBJECT_CONVERTER
            ]
        );
        assert_eq!(units[0].kind(), UnitKind::Link);
        assert_eq!(units[0].members.len(), 2);

        match &units[4].body {
            UnitBody::Converter(Dispatch::ContentTypeUid { arms }) => assert_eq!(
                arms,
                &vec![
                    ("article".to_string(), "Article".to_string()),
                    ("blog_post".to_string(), "BlogPost".to_string()),
                ]
            ),
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
