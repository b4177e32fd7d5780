//! Expression nodes.

use num_bigint::BigInt;

use super::operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
use crate::{ExprId, ExprRange, Name, Span};

/// A decoded literal value.
///
/// Floats and complex parts store f64 bits for Eq/Hash; text and byte
/// payloads are interned/owned respectively.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Constant {
    None,
    Ellipsis,
    Bool(bool),
    Int(i64),
    BigInt(Box<BigInt>),
    /// f64 bits.
    Float(u64),
    /// Imaginary part's f64 bits; the real part is always zero.
    Complex(u64),
    Str(Name),
    Bytes(Vec<u8>),
}

/// A contiguous run of dict entries in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DictEntryRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of comprehension clauses in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct CompClauseRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of call arguments in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct ArgRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of parameters in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct ParamRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of comparison links in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct CompareRange {
    pub start: u32,
    pub len: u32,
}

/// One `{key: value}` or `{**mapping}` entry of a dict display.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DictEntry {
    /// `None` for a `**mapping` unpack entry (3.5+).
    pub key: Option<ExprId>,
    pub value: ExprId,
}

/// One `for target in iter` or `if cond` clause of a comprehension.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompClause {
    For {
        target: ExprId,
        iter: ExprId,
        is_async: bool,
        span: Span,
    },
    If {
        test: ExprId,
        span: Span,
    },
}

/// How a call argument is passed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArgKind {
    Positional,
    /// `name=value`
    Keyword(Name),
    /// `*iterable`
    Star,
    /// `**mapping`
    DoubleStar,
}

/// One call argument.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Arg {
    pub kind: ArgKind,
    pub value: ExprId,
    pub span: Span,
}

/// How a parameter binds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParamKind {
    /// Plain positional-or-keyword parameter.
    Normal,
    /// Keyword-only parameter (after `*` in 3.x lists).
    KeywordOnly,
    /// `*args`, or a bare `*` separator when `name` is `None`.
    Star,
    /// `**kwargs`
    DoubleStar,
    /// 2.x nested tuple-unpack parameter; `sublist` holds the tuple.
    Sublist,
}

/// One function/lambda parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    /// `None` for a bare `*` separator or a sublist parameter.
    pub name: Option<Name>,
    pub kind: ParamKind,
    /// Default value expression, if any.
    pub default: Option<ExprId>,
    /// Annotation (3.x `def` only).
    pub annotation: Option<ExprId>,
    /// 2.x tuple-unpack target for `Sublist` parameters.
    pub sublist: Option<ExprId>,
    pub span: Span,
}

/// One `<op> <comparator>` link of a chained comparison.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comparator {
    pub op: CmpOp,
    pub value: ExprId,
}

/// An expression node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression node kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExprKind {
    /// Identifier reference.
    Name(Name),
    /// Literal constant (number/string/bytes/bool/None/Ellipsis).
    Constant(Constant),
    /// `(a, b)` or bare `a, b`. Paren-free form is recorded in the
    /// verbatim side table, not here.
    Tuple { elts: ExprRange },
    /// `[a, b]`
    List { elts: ExprRange },
    /// `{a, b}`
    Set { elts: ExprRange },
    /// `{k: v, **m}`
    Dict { entries: DictEntryRange },
    /// `[x for y in z if c]`
    ListComp {
        elt: ExprId,
        clauses: CompClauseRange,
    },
    /// `{x for y in z}`
    SetComp {
        elt: ExprId,
        clauses: CompClauseRange,
    },
    /// `{k: v for y in z}`
    DictComp {
        key: ExprId,
        value: ExprId,
        clauses: CompClauseRange,
    },
    /// `(x for y in z)`
    Generator {
        elt: ExprId,
        clauses: CompClauseRange,
    },
    /// `lambda params: body`
    Lambda { params: ParamRange, body: ExprId },
    /// `body if test else orelse`
    IfExp {
        test: ExprId,
        body: ExprId,
        orelse: ExprId,
    },
    /// Binary arithmetic/bitwise operation.
    BinOp {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// `and`/`or` chain (short-circuit).
    BoolOp { op: BoolOp, values: ExprRange },
    /// Unary prefix operation.
    UnaryOp { op: UnaryOp, operand: ExprId },
    /// Chained comparison: `left op1 c1 op2 c2 ...`.
    Compare {
        left: ExprId,
        comparators: CompareRange,
    },
    /// `func(args)`
    Call { func: ExprId, args: ArgRange },
    /// `value.attr`
    Attribute { value: ExprId, attr: Name },
    /// `value[index]`. Extended slices arrive as a `Tuple` index.
    Subscript { value: ExprId, index: ExprId },
    /// `lower:upper:step` inside a subscript.
    Slice {
        lower: Option<ExprId>,
        upper: Option<ExprId>,
        step: Option<ExprId>,
    },
    /// `*value` (3.x assignment targets and displays).
    Starred { value: ExprId },
    /// `yield [value]`
    Yield { value: Option<ExprId> },
    /// `yield from value` (3.3+)
    YieldFrom { value: ExprId },
    /// `await value` (3.5+)
    Await { value: ExprId },
    /// `` `value` `` (2.x repr).
    Repr { value: ExprId },
    /// Placeholder produced by error recovery; parsing continued after it.
    Error,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// True for the recovery placeholder.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, ExprKind::Error)
    }

    /// Error text when this expression cannot be a deletion target,
    /// mirroring the interpreter's messages.
    pub fn check_delete(&self) -> Option<&'static str> {
        match self.kind {
            ExprKind::Name(_)
            | ExprKind::Attribute { .. }
            | ExprKind::Subscript { .. }
            | ExprKind::Tuple { .. }
            | ExprKind::List { .. }
            | ExprKind::Error => None,
            ExprKind::Constant(_) => Some("can't delete literal"),
            ExprKind::Generator { .. } => Some("can't delete generator expression"),
            _ => Some("can't delete this expression"),
        }
    }

    /// Error text when this expression cannot be an assignment target.
    pub fn check_assign(&self) -> Option<&'static str> {
        match self.kind {
            ExprKind::Name(_)
            | ExprKind::Attribute { .. }
            | ExprKind::Subscript { .. }
            | ExprKind::Starred { .. }
            | ExprKind::Tuple { .. }
            | ExprKind::List { .. }
            | ExprKind::Error => None,
            ExprKind::Constant(Constant::None) => Some("cannot assign to None"),
            ExprKind::Constant(_) => Some("can't assign to literal"),
            ExprKind::Call { .. } => Some("can't assign to function call"),
            ExprKind::BinOp { .. } | ExprKind::UnaryOp { .. } | ExprKind::BoolOp { .. } => {
                Some("can't assign to operator")
            }
            ExprKind::Compare { .. } => Some("can't assign to comparison"),
            ExprKind::IfExp { .. } => Some("can't assign to conditional expression"),
            ExprKind::Lambda { .. } => Some("can't assign to lambda"),
            ExprKind::Yield { .. } | ExprKind::YieldFrom { .. } => Some("can't assign to yield expression"),
            ExprKind::Generator { .. } => Some("can't assign to generator expression"),
            ExprKind::ListComp { .. } | ExprKind::SetComp { .. } | ExprKind::DictComp { .. } => {
                Some("can't assign to comprehension")
            }
            _ => Some("can't assign to this expression"),
        }
    }
}
