//! `#define` collection and one-level substitution.
//!
//! A single pass over the recorded preprocessor directives builds a plain
//! name → value map. Lookup during extraction is by identifier equality;
//! substitution is one-level and non-recursive, and no conditional
//! directive is ever evaluated.

use indexmap::IndexMap;
use zmk_layout_ast::{walk_nodes, DtNode};

/// Map of `#define NAME VALUE` directives.
#[derive(Debug, Clone, Default)]
pub struct Defines {
    map: IndexMap<String, String>,
}

impl Defines {
    /// Collect every `define` conditional recorded in the tree.
    ///
    /// The condition is split at the first whitespace: `BASE 0` maps
    /// `BASE` to `0`; a bare `#define FLAG` maps to an empty value.
    pub fn collect(roots: &[DtNode]) -> Self {
        let mut map = IndexMap::new();
        walk_nodes(roots, &mut |node| {
            for conditional in &node.conditionals {
                if conditional.directive != "define" {
                    continue;
                }
                match conditional.condition.split_once(char::is_whitespace) {
                    Some((name, value)) => {
                        map.insert(name.to_string(), value.trim().to_string());
                    }
                    None if !conditional.condition.is_empty() => {
                        map.insert(conditional.condition.clone(), String::new());
                    }
                    None => {}
                }
            }
        });
        Self { map }
    }

    /// Look up a defined value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// Substitute a defined identifier, or return it unchanged.
    ///
    /// One level only: the substituted value is not resolved again.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// Resolve an identifier to an integer, if its substitution is one.
    pub fn resolve_int(&self, name: &str) -> Option<i64> {
        parse_int(self.resolve(name))
    }

    /// Number of collected defines.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no defines were collected.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Parse a decimal or `0x`-prefixed integer literal.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zmk_layout_lexer::lex;
    use zmk_layout_parser::parse;

    fn defines_of(source: &str) -> Defines {
        let tokens = lex(source).unwrap();
        let roots = parse(&tokens).unwrap();
        Defines::collect(&roots)
    }

    #[test]
    fn test_collects_file_scope_defines() {
        let defines = defines_of("#define BASE 0\n#define NAV 1\n/ { };");
        assert_eq!(defines.get("BASE"), Some("0"));
        assert_eq!(defines.get("NAV"), Some("1"));
        assert_eq!(defines.len(), 2);
    }

    #[test]
    fn test_collects_nested_defines() {
        let defines = defines_of("/ {\n#define TIMEOUT 30\ncombos { };\n};");
        assert_eq!(defines.get("TIMEOUT"), Some("30"));
    }

    #[test]
    fn test_bare_flag_define() {
        let defines = defines_of("#define HAS_RGB\n/ { };");
        assert_eq!(defines.get("HAS_RGB"), Some(""));
    }

    #[test]
    fn test_resolution_is_one_level() {
        let defines = defines_of("#define A B\n#define B 7\n/ { };");
        assert_eq!(defines.resolve("A"), "B");
        assert_eq!(defines.resolve_int("A"), None);
        assert_eq!(defines.resolve_int("B"), Some(7));
    }

    #[test]
    fn test_unknown_passes_through() {
        let defines = defines_of("/ { };");
        assert_eq!(defines.resolve("MISSING"), "MISSING");
        assert!(defines.is_empty());
    }

    #[test]
    fn test_parse_int_hex() {
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("TAB"), None);
    }

    #[test]
    fn test_conditionals_not_evaluated() {
        let defines = defines_of("#ifdef FOO\n#define X 1\n#endif\n/ { };");
        // both branches are recorded, the define inside is still collected
        assert_eq!(defines.get("X"), Some("1"));
    }
}
