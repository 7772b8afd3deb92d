//! Wildcard lexicon.
//!
//! A wildcard identifier is encoded on the wire as `<PREFIX><decimal-id>`.
//! The prefix is opaque to everything except [`decode`]; the id is looked
//! up in an ambient [`WildcardRegistry`] populated by the pattern-source
//! parser (`patternsrc.rs`) as it lexes `$name(...)` constraint lists.

use regex::Regex;

use crate::ast::Expr;

/// Wire-format prefix for a wildcard identifier. Chosen to never collide
/// with a legal identifier a user would write in the object language.
pub const WILDCARD_PREFIX: &str = "zzwild_";

/// Reserved identifier standing for "case body" in case-list sugar.
pub const CASE_BODY_SENTINEL: &str = "zzwild_case_body";

/// Decode a wildcard identifier's wire form into its registry id.
/// Returns `None` for any identifier that is not a wildcard.
pub fn decode(text: &str) -> Option<u32> {
    text.strip_prefix(WILDCARD_PREFIX)?.parse::<u32>().ok()
}

/// Encode a registry id back into its wire-format identifier text.
pub fn encode(id: u32) -> String {
    format!("{WILDCARD_PREFIX}{id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOp {
    /// Structurally identical to the constraint type.
    Type,
    /// Assignable to the constraint type.
    Asgn,
    /// Convertible to the constraint type.
    Conv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderlyingKind {
    Basic,
    Array,
    Slice,
    Struct,
    Interface,
    Pointer,
    Func,
    Map,
    Chan,
}

/// Metadata for one wildcard occurrence group, keyed by info id.
#[derive(Debug, Clone, Default)]
pub struct WildcardInfo {
    /// Binding name, or `"_"` for discard.
    pub name: String,
    /// Whether this is a variadic "any-of" wildcard (`$*name`).
    pub any: bool,
    pub name_rxs: Vec<Regex>,
    pub types: Vec<(TypeOp, Expr)>,
    pub comparable: bool,
    pub addressable: bool,
    pub underlying: Option<UnderlyingKind>,
}

impl WildcardInfo {
    pub fn discard(any: bool) -> Self {
        WildcardInfo {
            name: "_".to_string(),
            any,
            ..Default::default()
        }
    }

    pub fn is_discard(&self) -> bool {
        self.name == "_"
    }

    pub fn has_side_conditions(&self) -> bool {
        !self.name_rxs.is_empty()
            || !self.types.is_empty()
            || self.comparable
            || self.addressable
            || self.underlying.is_some()
    }
}

/// Ambient store of wildcard info records, populated while parsing a
/// pattern and consulted by the unifier and list matcher during matching.
#[derive(Debug, Clone, Default)]
pub struct WildcardRegistry {
    infos: Vec<WildcardInfo>,
}

impl WildcardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, info: WildcardInfo) -> u32 {
        let id = self.infos.len() as u32;
        self.infos.push(info);
        id
    }

    /// Resolve an info id to its complete record. Every id produced by
    /// [`register`] resolves — the registry never drops entries.
    pub fn get(&self, id: u32) -> &WildcardInfo {
        &self.infos[id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_wildcard_decodes_to_none() {
        assert_eq!(decode("foo"), None);
        assert_eq!(decode("zzwild_"), None);
        assert_eq!(decode("zzwild_x"), None);
    }

    #[test]
    fn wildcard_round_trips() {
        assert_eq!(decode(&encode(7)), Some(7));
    }

    #[test]
    fn registry_resolves_every_registered_id() {
        let mut reg = WildcardRegistry::new();
        let id = reg.register(WildcardInfo {
            name: "x".to_string(),
            any: false,
            ..Default::default()
        });
        assert_eq!(reg.get(id).name, "x");
    }
}
