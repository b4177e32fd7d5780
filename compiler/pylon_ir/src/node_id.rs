//! Arena node indices.
//!
//! Expressions and statements live in flat pools inside `AstArena`;
//! nodes reference children through these 4-byte indices instead of
//! boxed pointers. `NodeId` unifies both pools into one key for side
//! tables (the verbatim attribute bag).

use std::fmt;

/// Index of an expression in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ExprId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Index of a statement in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct StmtId(u32);

impl StmtId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        StmtId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StmtId({})", self.0)
    }
}

/// A contiguous run of expression ids in the arena's list pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExprRange {
    pub start: u32,
    pub len: u32,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        ExprRange { start, len }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for ExprRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprRange({}+{})", self.start, self.len)
    }
}

/// A contiguous run of statement ids in the arena's list pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StmtRange {
    pub start: u32,
    pub len: u32,
}

impl StmtRange {
    pub const EMPTY: StmtRange = StmtRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        StmtRange { start, len }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for StmtRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StmtRange({}+{})", self.start, self.len)
    }
}

/// A stable key identifying either an expression or a statement node.
///
/// Bit 31 tags the pool (0 = expr, 1 = stmt); the low 31 bits are the
/// arena index. Side tables key on this instead of node identity so the
/// mapping survives moves and clones of the arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

const STMT_TAG: u32 = 1 << 31;

impl NodeId {
    #[inline]
    pub const fn expr(id: ExprId) -> Self {
        NodeId(id.raw())
    }

    #[inline]
    pub const fn stmt(id: StmtId) -> Self {
        NodeId(id.raw() | STMT_TAG)
    }

    #[inline]
    pub const fn is_stmt(self) -> bool {
        self.0 & STMT_TAG != 0
    }

    /// The expression id, if this key tags an expression.
    #[inline]
    pub const fn as_expr(self) -> Option<ExprId> {
        if self.0 & STMT_TAG == 0 {
            Some(ExprId::from_raw(self.0))
        } else {
            None
        }
    }

    /// The statement id, if this key tags a statement.
    #[inline]
    pub const fn as_stmt(self) -> Option<StmtId> {
        if self.0 & STMT_TAG != 0 {
            Some(StmtId::from_raw(self.0 & !STMT_TAG))
        } else {
            None
        }
    }
}

impl From<ExprId> for NodeId {
    fn from(id: ExprId) -> Self {
        NodeId::expr(id)
    }
}

impl From<StmtId> for NodeId {
    fn from(id: StmtId) -> Self {
        NodeId::stmt(id)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_stmt() {
            write!(f, "NodeId(stmt {})", self.0 & !STMT_TAG)
        } else {
            write!(f, "NodeId(expr {})", self.0)
        }
    }
}

mod size_asserts {
    use super::{ExprId, ExprRange, NodeId, StmtId};
    crate::static_assert_size!(ExprId, 4);
    crate::static_assert_size!(StmtId, 4);
    crate::static_assert_size!(NodeId, 4);
    crate::static_assert_size!(ExprRange, 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_round_trip() {
        let e = ExprId::from_raw(42);
        let s = StmtId::from_raw(42);

        let ne = NodeId::expr(e);
        let ns = NodeId::stmt(s);

        assert_ne!(ne, ns);
        assert_eq!(ne.as_expr(), Some(e));
        assert_eq!(ne.as_stmt(), None);
        assert_eq!(ns.as_stmt(), Some(s));
        assert_eq!(ns.as_expr(), None);
    }

    #[test]
    fn ranges() {
        let r = ExprRange::new(4, 3);
        assert_eq!(r.len(), 3);
        assert!(!r.is_empty());
        assert!(ExprRange::EMPTY.is_empty());
        assert!(StmtRange::EMPTY.is_empty());
    }
}
