//! Binding strings and their structured form.
//!
//! A ZMK binding invokes a behavior with parameters: `&kp A`,
//! `&mt LCTRL ESC`, `&kp LC(LS(TAB))`. Parameters nest through
//! parentheses, so the structured form is recursive.
//!
//! Parsing and formatting are inverses: `format(parse(s))` is the
//! canonical spelling of `s` (single spaces, arguments space-joined inside
//! parentheses).

use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parameter value: either a keycode-style keyword or a plain integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer parameter (layer index, timeout, ...).
    Number(i64),
    /// Keyword parameter (`A`, `LCTRL`, `LC`, ...).
    Keyword(String),
}

impl ParamValue {
    fn from_word(word: &str) -> Self {
        match word.parse::<i64>() {
            Ok(n) => ParamValue::Number(n),
            Err(_) => ParamValue::Keyword(word.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Keyword(k) => f.write_str(k),
        }
    }
}

/// A binding parameter, possibly carrying nested parameters
/// (`LC(LA(DEL))`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutParam {
    /// Parameter value.
    pub value: ParamValue,
    /// Nested parameters, empty for plain parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<LayoutParam>,
}

impl LayoutParam {
    /// A keyword parameter without nesting.
    pub fn keyword(value: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Keyword(value.into()),
            params: Vec::new(),
        }
    }

    /// A numeric parameter.
    pub fn number(value: i64) -> Self {
        Self {
            value: ParamValue::Number(value),
            params: Vec::new(),
        }
    }

    /// A keyword parameter with nested parameters.
    pub fn nested(value: impl Into<String>, params: Vec<LayoutParam>) -> Self {
        Self {
            value: ParamValue::Keyword(value.into()),
            params,
        }
    }
}

impl fmt::Display for LayoutParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if !self.params.is_empty() {
            let inner: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, "({})", inner.join(" "))?;
        }
        Ok(())
    }
}

/// A behavior invocation: `&behavior param param ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBinding {
    /// Behavior reference including the `&` (`&kp`, `&mt`).
    pub value: String,
    /// Top-level parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<LayoutParam>,
}

impl LayoutBinding {
    /// Create a binding without parameters.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            params: Vec::new(),
        }
    }

    /// Create a binding with parameters.
    pub fn with_params(value: impl Into<String>, params: Vec<LayoutParam>) -> Self {
        Self {
            value: value.into(),
            params,
        }
    }

    /// The transparent binding used to pad layers.
    pub fn transparent() -> Self {
        Self::new("&trans")
    }

    /// The behavior name without the leading `&`.
    pub fn behavior(&self) -> &str {
        self.value.trim_start_matches('&')
    }
}

impl fmt::Display for LayoutBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}

impl FromStr for LayoutBinding {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingParser::new(s).parse()
    }
}

/// Character scanner for binding strings.
struct BindingParser {
    chars: Vec<char>,
    pos: usize,
}

impl BindingParser {
    fn new(s: &str) -> Self {
        Self {
            chars: s.trim().chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error(&self, reason: impl Into<String>) -> LayoutError {
        LayoutError::InvalidBinding {
            reason: reason.into(),
            position: self.pos,
        }
    }

    fn skip_separators(&mut self, in_args: bool) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() || (in_args && c == ',')) {
            self.pos += 1;
        }
    }

    /// A run of characters up to whitespace, parens or comma.
    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' || c == ',' {
                break;
            }
            word.push(c);
            self.pos += 1;
        }
        word
    }

    fn parse(&mut self) -> Result<LayoutBinding, LayoutError> {
        self.skip_separators(false);
        if self.peek() != Some('&') {
            return Err(self.error("binding must start with '&'"));
        }
        self.pos += 1;
        let head = self.word();
        if head.is_empty() {
            return Err(self.error("expected behavior name after '&'"));
        }

        let mut binding = LayoutBinding::new(format!("&{head}"));
        loop {
            self.skip_separators(false);
            match self.peek() {
                None => break,
                Some(')') => return Err(self.error("unbalanced ')'")),
                Some('(') => return Err(self.error("argument list without a parameter")),
                Some(_) => binding.params.push(self.parse_param()?),
            }
        }
        Ok(binding)
    }

    fn parse_param(&mut self) -> Result<LayoutParam, LayoutError> {
        let word = self.word();
        if word.is_empty() {
            return Err(self.error("expected parameter"));
        }
        let mut param = LayoutParam {
            value: ParamValue::from_word(&word),
            params: Vec::new(),
        };
        if self.peek() == Some('(') {
            self.pos += 1;
            loop {
                self.skip_separators(true);
                match self.peek() {
                    None => return Err(self.error("unterminated argument list")),
                    Some(')') => {
                        self.pos += 1;
                        break;
                    }
                    Some('(') => return Err(self.error("argument list without a parameter")),
                    Some(_) => param.params.push(self.parse_param()?),
                }
            }
        }
        Ok(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> LayoutBinding {
        s.parse().expect("binding should parse")
    }

    #[test]
    fn test_simple_binding() {
        let binding = parse("&kp A");
        assert_eq!(binding.value, "&kp");
        assert_eq!(binding.params, vec![LayoutParam::keyword("A")]);
        assert_eq!(binding.behavior(), "kp");
    }

    #[test]
    fn test_two_params() {
        let binding = parse("&mt LCTRL ESC");
        assert_eq!(binding.value, "&mt");
        assert_eq!(
            binding.params,
            vec![LayoutParam::keyword("LCTRL"), LayoutParam::keyword("ESC")]
        );
    }

    #[test]
    fn test_numeric_param() {
        let binding = parse("&mo 2");
        assert_eq!(binding.params, vec![LayoutParam::number(2)]);
    }

    #[test]
    fn test_nested_params() {
        let binding = parse("&kp LC(LA(DEL))");
        assert_eq!(
            binding,
            LayoutBinding::with_params(
                "&kp",
                vec![LayoutParam::nested(
                    "LC",
                    vec![LayoutParam::nested("LA", vec![LayoutParam::keyword("DEL")])]
                )]
            )
        );
        assert_eq!(binding.to_string(), "&kp LC(LA(DEL))");
    }

    #[test]
    fn test_no_params() {
        let binding = parse("&trans");
        assert!(binding.params.is_empty());
        assert_eq!(binding, LayoutBinding::transparent());
    }

    #[test]
    fn test_format_canonicalizes_whitespace() {
        let binding = parse("  &kp   LC( LS(TAB) )  ");
        assert_eq!(binding.to_string(), "&kp LC(LS(TAB))");
    }

    #[test]
    fn test_comma_separated_arguments() {
        let binding = parse("&macro_param F(A, B)");
        assert_eq!(
            binding.params[0].params,
            vec![LayoutParam::keyword("A"), LayoutParam::keyword("B")]
        );
        assert_eq!(binding.to_string(), "&macro_param F(A B)");
    }

    #[test]
    fn test_roundtrip() {
        for s in ["&kp A", "&mt LCTRL ESC", "&kp LC(LA(DEL))", "&trans", "&mo 3"] {
            let binding = parse(s);
            assert_eq!(binding.to_string(), s);
            assert_eq!(parse(&binding.to_string()), binding);
        }
    }

    #[test]
    fn test_missing_ampersand() {
        let err = "kp A".parse::<LayoutBinding>().unwrap_err();
        assert!(matches!(err, LayoutError::InvalidBinding { position: 0, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!("".parse::<LayoutBinding>().is_err());
        assert!("&".parse::<LayoutBinding>().is_err());
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!("&kp LC(A".parse::<LayoutBinding>().is_err());
        assert!("&kp A)".parse::<LayoutBinding>().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let binding = parse("&kp LC(A)");
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["value"], "&kp");
        assert_eq!(json["params"][0]["value"], "LC");
        assert_eq!(json["params"][0]["params"][0]["value"], "A");
        let back: LayoutBinding = serde_json::from_value(json).unwrap();
        assert_eq!(back, binding);
    }
}
