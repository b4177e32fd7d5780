//! Formatting side table.
//!
//! In verbatim mode the parser records the exact whitespace (including
//! comments and blank lines) that preceded each statement, keyed by
//! [`NodeId`] so the tree itself stays compact. A couple of boolean
//! markers capture surface details the tree normalizes away: whether a
//! node was written in an alternate form and whether its closing
//! delimiter was missing. Round-trip tooling joins this bag with the
//! arena to reproduce the source byte-for-byte.

use pylon_ir::NodeId;
use rustc_hash::FxHashMap;

/// Formatting facts for one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    /// Whitespace, comments and blank lines before the node's first
    /// token.
    pub preceding_whitespace: Box<str>,
    /// The node was written in an alternate surface form, e.g. a
    /// parenthesized `from m import (a, b)` alias list.
    pub alt_form: bool,
    /// The node's closing delimiter was missing from the source.
    pub missing_terminator: bool,
}

/// Side table mapping nodes to their formatting attributes.
#[derive(Clone, Debug, Default)]
pub struct AttributeBag {
    entries: FxHashMap<NodeId, NodeAttributes>,
    /// Whitespace, comments and blank lines after the last statement.
    trailing_whitespace: Box<str>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_preceding(&mut self, id: impl Into<NodeId>, whitespace: impl Into<Box<str>>) {
        self.entries
            .entry(id.into())
            .or_default()
            .preceding_whitespace = whitespace.into();
    }

    pub fn mark_alt_form(&mut self, id: impl Into<NodeId>) {
        self.entries.entry(id.into()).or_default().alt_form = true;
    }

    pub fn mark_missing_terminator(&mut self, id: impl Into<NodeId>) {
        self.entries.entry(id.into()).or_default().missing_terminator = true;
    }

    pub fn set_trailing(&mut self, whitespace: impl Into<Box<str>>) {
        self.trailing_whitespace = whitespace.into();
    }

    pub fn get(&self, id: impl Into<NodeId>) -> Option<&NodeAttributes> {
        self.entries.get(&id.into())
    }

    /// Whitespace before the node, if recorded.
    pub fn preceding(&self, id: impl Into<NodeId>) -> Option<&str> {
        self.get(id).map(|a| &*a.preceding_whitespace)
    }

    pub fn alt_form(&self, id: impl Into<NodeId>) -> bool {
        self.get(id).is_some_and(|a| a.alt_form)
    }

    pub fn missing_terminator(&self, id: impl Into<NodeId>) -> bool {
        self.get(id).is_some_and(|a| a.missing_terminator)
    }

    /// Whitespace after the last statement in the module.
    pub fn trailing(&self) -> &str {
        &self.trailing_whitespace
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
