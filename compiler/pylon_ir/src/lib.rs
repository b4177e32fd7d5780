//! Pylon IR - Shared Types for the Python Parser
//!
//! This crate contains the core data structures shared by the tokenizer
//! and the parser:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Tokens (the tokenizer's output, one at a time)
//! - AST nodes allocated in a flat arena
//! - The language-version enum and `from __future__` option flags
//! - The newline-offset table for offset → line/column resolution
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifier and string text → `Name(u32)`
//! - **Flatten Everything**: no `Box<Expr>`, use `ExprId(u32)` indices
//! - **Spans are cheap**: 8 bytes, `Copy`, stamped on every node
//!
//! Types that contain floats store them as u64 bits for Hash compatibility.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod interner;
mod name;
mod newline;
mod node_id;
mod span;
mod token;
mod version;

pub use arena::AstArena;
pub use ast::{
    AliasRange, Arg, ArgKind, ArgRange, BinaryOp, BoolOp, CmpOp, Comparator, CompareRange,
    CompClause, CompClauseRange, Constant, DictEntry, DictEntryRange, ExceptHandler, Expr,
    ExprKind, HandlerRange, IfClause, IfClauseRange, ImportAlias, Module, NameRange, Param,
    ParamKind, ParamRange, RelativeModule, Stmt, StmtKind, UnaryOp, WithItem, WithItemRange,
};
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use newline::{LineCol, NewlineKind, NewlineTable};
pub use node_id::{ExprId, ExprRange, NodeId, StmtId, StmtRange};
pub use span::Span;
pub use token::{StringFlags, Token, TokenKind, TokenTag};
pub use version::{FutureOptions, PythonVersion};
