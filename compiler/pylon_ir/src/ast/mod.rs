//! AST node definitions.
//!
//! Nodes are allocated in `AstArena` pools and reference children by
//! 4-byte ids/ranges. Every node carries a span; spans are stamped
//! bottom-up by the parser once all children are known. Formatting
//! metadata (verbatim mode) lives outside the tree in a side table keyed
//! by `NodeId`.

mod expr;
mod operators;
mod stmt;

pub use expr::{
    Arg, ArgKind, ArgRange, Comparator, CompareRange, CompClause, CompClauseRange, Constant,
    DictEntry, DictEntryRange, Expr, ExprKind, Param, ParamKind, ParamRange,
};
pub use operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
pub use stmt::{
    AliasRange, ExceptHandler, HandlerRange, IfClause, IfClauseRange, ImportAlias, NameRange,
    RelativeModule, Stmt, StmtKind, WithItem, WithItemRange,
};

use crate::{Span, StmtRange};

/// A parsed module: the root of the tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Module {
    /// Top-level statements.
    pub body: StmtRange,
    /// Span covering the entire input.
    pub span: Span,
}
