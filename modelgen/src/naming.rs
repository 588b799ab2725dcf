//! Name and path derivation.
//!
//! Every generated identifier, directory and namespace segment comes from the
//! functions here, so the resolver and the emitter always agree on the name of
//! a nested type.

use std::collections::HashSet;

use crate::schema::FieldDef;

/// Prefixes for nested type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPrefixes {
    /// Prefix of modular block wrapper types.
    pub modular_block: String,
    /// Prefix of group types.
    pub group: String,
}

impl Default for NamingPrefixes {
    fn default() -> Self {
        Self {
            modular_block: "MB".to_string(),
            group: "Group".to_string(),
        }
    }
}

impl NamingPrefixes {
    /// Prefix for the given nested role.
    pub fn for_role(&self, role: NestedRole) -> &str {
        match role {
            NestedRole::Blocks => &self.modular_block,
            NestedRole::Group => &self.group,
        }
    }
}

/// Kind of nested schema a directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestedRole {
    Blocks,
    Group,
}

impl NestedRole {
    /// Directory suffix for this role.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Blocks => "Blocks",
            Self::Group => "Group",
        }
    }
}

/// Convert a raw title or uid into a PascalCase type name.
///
/// Digits, hyphens, underscores and whitespace are word boundaries and are
/// removed. Any other character outside `[A-Za-z]` is dropped without
/// starting a new word. The first letter of each word is upper-cased and the
/// rest is kept as written, which makes the function idempotent.
///
/// ```
/// use modelgen::naming::type_name;
///
/// assert_eq!(type_name("my_field-2"), "MyField");
/// assert_eq!(type_name("Hero Banner"), "HeroBanner");
/// assert_eq!(type_name(""), "");
/// ```
pub fn type_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut word_start = true;

    for c in raw.chars() {
        if c.is_ascii_alphabetic() {
            if word_start {
                out.push(c.to_ascii_uppercase());
                word_start = false;
            } else {
                out.push(c);
            }
        } else if c.is_ascii_digit() || c == '-' || c == '_' || c.is_whitespace() {
            word_start = true;
        }
    }

    out
}

/// Type name derived from `label`, falling back to `uid`.
///
/// When neither derives an identifier (e.g. a `null` or purely numeric title
/// with a numeric uid) the result is [`placeholder_name`] of the uid.
pub fn type_name_or(label: &str, uid: &str) -> String {
    [label, uid]
        .iter()
        .map(|raw| type_name(raw))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| placeholder_name(uid))
}

/// Name of the model generated for a content type or global field.
pub fn definition_name(title: &str, uid: &str) -> String {
    type_name_or(title, uid)
}

/// Stable identifier for something whose label and uid derive nothing.
///
/// `Type` followed by the 32-bit FNV-1a hash of `key` in hex.
///
/// ```
/// use modelgen::naming::placeholder_name;
///
/// assert_eq!(placeholder_name("2024"), placeholder_name("2024"));
/// assert!(placeholder_name("2024").starts_with("Type"));
/// ```
pub fn placeholder_name(key: &str) -> String {
    let hash = key.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    });
    format!("Type{hash:08x}")
}

/// Property name for a field uid.
pub fn property_name(uid: &str) -> String {
    type_name_or(uid, uid)
}

/// Tag enum member for a block variant: its uid, else its title.
pub fn tag_member_name(uid: &str, title: &str) -> String {
    [uid, title]
        .iter()
        .map(|raw| type_name(raw))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| placeholder_name(uid))
}

/// Name of the type generated for a blocks or group field.
///
/// The result is `prefix + owner + typeName(displayName)` with spaces removed.
pub fn block_group_type_name(prefix: &str, owner: &str, display_name: &str) -> String {
    format!("{prefix}{owner}{}", type_name(display_name)).replace(' ', "")
}

/// Name of the type generated for a nested field of `owner`.
pub fn nested_type_name(
    prefixes: &NamingPrefixes,
    role: NestedRole,
    owner: &str,
    field: &FieldDef,
) -> String {
    block_group_type_name(
        prefixes.for_role(role),
        owner,
        &type_name_or(field.label(), &field.uid),
    )
}

/// Directory (and namespace segment) holding the nested types of `owner`.
pub fn nested_directory(owner: &str, role: NestedRole) -> String {
    format!("{owner}{}", role.suffix())
}

/// Name of a block variant type.
pub fn variant_type_name(wrapper: &str, variant_title: &str, variant_uid: &str) -> String {
    format!("{wrapper}{}", type_name_or(variant_title, variant_uid))
}

/// Name of the tag enum for a block wrapper.
pub fn tag_enum_name(wrapper: &str) -> String {
    format!("{wrapper}Enum")
}

/// Name of the converter for a block wrapper.
pub fn converter_name(wrapper: &str) -> String {
    format!("{wrapper}Converter")
}

/// Identifiers already taken inside one generated unit.
///
/// Candidates are tried as `base`, `base2`, `base3` and so on. Names from
/// [`type_name`] never contain digits, so a numeric suffix cannot clash with
/// a later derived name.
#[derive(Debug, Clone, Default)]
pub struct MemberNames {
    used: HashSet<String>,
}

impl MemberNames {
    /// Start with `names` already taken.
    pub fn reserving<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Claim the first free candidate for `base`.
    ///
    /// `companions` are suffixes whose `candidate + suffix` names must be free
    /// too and are claimed with it (e.g. `Store` for a markdown backing
    /// field).
    pub fn claim(&mut self, base: &str, companions: &[&str]) -> String {
        let mut n = 1usize;
        loop {
            let candidate = if n == 1 {
                base.to_string()
            } else {
                format!("{base}{n}")
            };
            let names: Vec<String> = std::iter::once(candidate.clone())
                .chain(companions.iter().map(|suffix| format!("{candidate}{suffix}")))
                .collect();
            if names.iter().all(|name| !self.used.contains(name)) {
                self.used.extend(names);
                return candidate;
            }
            n += 1;
        }
    }
}
