//! Devicetree AST node definitions.
//!
//! The AST is a plain tree: each node owns its properties and children
//! exclusively. Cross-node references (`&name`) are symbolic and resolved
//! during extraction, never as pointers into the tree.

use serde::{Deserialize, Serialize};

/// A devicetree node.
///
/// Corresponds to `label: name@unit { ... };` in source. Preprocessor
/// directives encountered in the node's scope are lifted into
/// `conditionals` without being evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtNode {
    /// Node name (`/` for a root node).
    pub name: String,

    /// Optional node label (the `hm` in `hm: homerow_mods { ... }`).
    pub label: Option<String>,

    /// Optional unit address (the `0` in `partition@0`).
    pub unit_address: Option<String>,

    /// Properties in source order.
    pub properties: Vec<DtProperty>,

    /// Child nodes in source order.
    pub children: Vec<DtNode>,

    /// Preprocessor directives recorded in this node's scope.
    ///
    /// Stored verbatim and never evaluated; both branches of an `#ifdef`
    /// parse into the tree.
    pub conditionals: Vec<DtConditional>,

    /// Comments associated with this node.
    pub comments: Vec<DtComment>,

    /// 1-based source line of the node name.
    pub line: u32,

    /// 1-based source column of the node name.
    pub column: u32,
}

impl DtNode {
    /// Create a new empty node.
    pub fn new(name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            label: None,
            unit_address: None,
            properties: Vec::new(),
            children: Vec::new(),
            conditionals: Vec::new(),
            comments: Vec::new(),
            line,
            column,
        }
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&DtProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&DtNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The node's `compatible` string property, if present.
    pub fn compatible(&self) -> Option<&str> {
        match self.property("compatible").and_then(|p| p.value.as_ref()) {
            Some(DtValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The name a reference (`&name`) would use for this node: the label
    /// when present, the node name otherwise.
    pub fn reference_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Whether a boolean property is present (`name;` with no value).
    pub fn has_bool_property(&self, name: &str) -> bool {
        matches!(self.property(name), Some(p) if p.value.is_none())
    }
}

/// A devicetree property.
///
/// `value` is `None` for boolean properties written as a bare `name;`.
/// A property with several comma-separated values (`bindings = <&kp>,
/// <&kp>;`) stores them as a `DtValue::Array` of the individual values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtProperty {
    /// Property name (may start with `#`, e.g. `#binding-cells`).
    pub name: String,

    /// Property value, absent for boolean properties.
    pub value: Option<DtValue>,

    /// Comments associated with this property.
    pub comments: Vec<DtComment>,

    /// 1-based source line of the property name.
    pub line: u32,

    /// 1-based source column of the property name.
    pub column: u32,
}

impl DtProperty {
    /// Create a new property.
    pub fn new(name: impl Into<String>, value: Option<DtValue>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            value,
            comments: Vec::new(),
            line,
            column,
        }
    }
}

/// A devicetree property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DtValue {
    /// Quoted string, escape-processed.
    String(String),
    /// Integer literal (decimal or hex in source).
    Integer(i64),
    /// Angle-bracketed cell array, or the list of a multi-value property.
    Array(Vec<DtValue>),
    /// Symbol reference without the leading `&`.
    Reference(String),
    /// Boolean value.
    Boolean(bool),
    /// Call-shaped cell such as `LC(A)`.
    FunctionCall {
        /// Function name.
        name: String,
        /// Arguments, possibly nested calls.
        args: Vec<DtValue>,
    },
    /// Fallback for bare identifiers and anything not otherwise typed.
    Raw(String),
}

impl DtValue {
    /// The integer carried by this value, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DtValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The string carried by this value, if it is one.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DtValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Flatten this value into its cell sequence.
    ///
    /// A multi-value property (`bindings = <&kp>, <&kp>;`) parses as an
    /// array of arrays; extraction works over the flat cell stream.
    pub fn cells(&self) -> Vec<&DtValue> {
        match self {
            DtValue::Array(items) => items.iter().flat_map(|v| v.cells()).collect(),
            other => vec![other],
        }
    }
}

/// A source comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtComment {
    /// Comment text without delimiters, trimmed.
    pub text: String,
    /// True for `/* ... */`, false for `// ...`.
    pub is_block: bool,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
}

/// A recorded preprocessor directive.
///
/// Directives are stored, never evaluated; `condition` is the remainder of
/// the line after the directive word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtConditional {
    /// Directive word without the `#` (`define`, `ifdef`, `include`, ...).
    pub directive: String,
    /// Rest of the directive line, trimmed.
    pub condition: String,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
}
