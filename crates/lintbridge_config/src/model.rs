//! Immutable rule configuration tree.
//!
//! A [`RuleConfig`] node is never changed in place. Every "mutation" builds a
//! new node that shares the untouched children with the original through
//! `Arc`, so rebuilding a node deep in the tree only copies the path to it.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of the structural module that hosts per-file checks.
pub const TREE_WALKER: &str = "TreeWalker";

/// One `module` of a rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleConfig {
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<Arc<RuleConfig>>,
    #[serde(default)]
    messages: BTreeMap<String, String>,
}

impl RuleConfig {
    /// Creates a node without attributes, children or messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            messages: BTreeMap::new(),
        }
    }

    /// Starts building a node.
    pub fn builder(name: impl Into<String>) -> RuleConfigBuilder {
        RuleConfigBuilder {
            node: Self::new(name),
        }
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes, sorted by name.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Child modules in document order.
    pub fn children(&self) -> &[Arc<RuleConfig>] {
        &self.children
    }

    /// Custom messages keyed by message key.
    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    /// First direct child with the given module name.
    pub fn child(&self, name: &str) -> Option<&RuleConfig> {
        self.children
            .iter()
            .map(Arc::as_ref)
            .find(|child| child.name == name)
    }

    /// First module with the given name anywhere in this subtree, in
    /// pre-order.
    pub fn find_module(&self, name: &str) -> Option<&RuleConfig> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_module(name))
    }

    /// Returns a copy with `name` set to `value`. Children and messages are
    /// shared with `self`.
    #[must_use]
    pub fn with_attribute(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let mut builder = Self::builder(self.name.clone());
        for child in &self.children {
            builder = builder.shared_child(Arc::clone(child));
        }
        for (key, message) in &self.messages {
            builder = builder.message(key.clone(), message.clone());
        }
        for (key, existing) in &self.attributes {
            if *key != name {
                builder = builder.attribute(key.clone(), existing.clone());
            }
        }
        builder.attribute(name, value).build()
    }

    /// Returns a copy without the given attribute.
    #[must_use]
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.attributes.remove(name);
        copy
    }

    /// Returns a copy whose child at `index` is `child`.
    ///
    /// An out-of-range index leaves the children unchanged.
    #[must_use]
    pub fn with_child_replaced(&self, index: usize, child: Arc<RuleConfig>) -> Self {
        let mut copy = self.clone();
        if let Some(slot) = copy.children.get_mut(index) {
            *slot = child;
        }
        copy
    }

    /// Returns a copy without the child at `index`.
    #[must_use]
    pub fn without_child(&self, index: usize) -> Self {
        let mut copy = self.clone();
        if index < copy.children.len() {
            copy.children.remove(index);
        }
        copy
    }

    /// Content hash of the whole subtree.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        self.hash_into(&mut hasher);
        hasher.finalize().to_hex().to_string()
    }

    fn hash_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(b"module\0");
        hasher.update(self.name.as_bytes());
        for (key, value) in &self.attributes {
            hasher.update(b"\0a\0");
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
        }
        for (key, value) in &self.messages {
            hasher.update(b"\0m\0");
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
        }
        for child in &self.children {
            child.hash_into(hasher);
        }
        hasher.update(b"\0end\0");
    }

    /// Renders the tree in the engine's XML rule configuration format.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(XML_PROLOGUE);
        self.write_xml(&mut out, 0);
        out
    }

    fn write_xml(&self, out: &mut String, depth: usize) {
        let indent = "    ".repeat(depth);
        let _ = writeln!(out, "{indent}<module name=\"{}\">", escape(&self.name));
        for (name, value) in &self.attributes {
            let _ = writeln!(
                out,
                "{indent}    <property name=\"{}\" value=\"{}\"/>",
                escape(name),
                escape(value)
            );
        }
        for (key, value) in &self.messages {
            let _ = writeln!(
                out,
                "{indent}    <message key=\"{}\" value=\"{}\"/>",
                escape(key),
                escape(value)
            );
        }
        for child in &self.children {
            child.write_xml(out, depth + 1);
        }
        let _ = writeln!(out, "{indent}</module>");
    }
}

const XML_PROLOGUE: &str = "<?xml version=\"1.0\"?>\n<!DOCTYPE module PUBLIC \"-//Checkstyle//DTD Checkstyle Configuration 1.3//EN\" \"https://checkstyle.org/dtds/configuration_1_3.dtd\">\n";

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builder for [`RuleConfig`] nodes.
#[derive(Debug, Clone)]
pub struct RuleConfigBuilder {
    node: RuleConfig,
}

impl RuleConfigBuilder {
    /// Sets an attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node.attributes.insert(name.into(), value.into());
        self
    }

    /// Adds a custom message.
    pub fn message(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node.messages.insert(key.into(), value.into());
        self
    }

    /// Appends a child module.
    pub fn child(self, child: RuleConfig) -> Self {
        self.shared_child(Arc::new(child))
    }

    /// Appends a child module that is already shared with another tree.
    pub fn shared_child(mut self, child: Arc<RuleConfig>) -> Self {
        self.node.children.push(child);
        self
    }

    /// Finishes the node.
    pub fn build(self) -> RuleConfig {
        self.node
    }
}
