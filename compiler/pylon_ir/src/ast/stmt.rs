//! Statement nodes.

use super::expr::{ArgRange, ParamRange};
use crate::{ExprId, ExprRange, Name, Span, StmtId, StmtRange};

/// A contiguous run of import aliases in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct AliasRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of interned names in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct NameRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of except handlers in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct HandlerRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of with items in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct WithItemRange {
    pub start: u32,
    pub len: u32,
}

/// A contiguous run of if/elif clauses in the arena pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct IfClauseRange {
    pub start: u32,
    pub len: u32,
}

/// One `name` or `dotted.name [as alias]` of an import statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportAlias {
    /// Dotted path components.
    pub path: NameRange,
    /// Rename, if `as` was used.
    pub asname: Option<Name>,
    pub span: Span,
}

/// The module part of `from <module> import ...`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelativeModule {
    /// Number of leading dots (relative import level).
    pub dots: u32,
    /// Dotted path after the dots; may be empty (`from . import x`).
    pub path: NameRange,
    pub span: Span,
}

/// One `except [type [as target]]:` clause.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExceptHandler {
    pub test: Option<ExprId>,
    /// 3.x `as name`, or the 2.x `, target` form.
    pub target: Option<ExprId>,
    pub body: StmtId,
    pub span: Span,
}

/// One `context [as target]` item of a `with` statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithItem {
    pub context: ExprId,
    pub target: Option<ExprId>,
    pub span: Span,
}

/// One `if`/`elif` arm.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IfClause {
    pub test: ExprId,
    pub body: StmtId,
    pub span: Span,
}

/// A statement node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement node kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StmtKind {
    /// Bare expression statement (includes docstrings).
    Expr { value: ExprId },
    /// `a = b = value` — one or more targets.
    Assign { targets: ExprRange, value: ExprId },
    /// `target op= value`
    AugAssign {
        target: ExprId,
        op: super::BinaryOp,
        value: ExprId,
    },
    /// A run of small statements joined by `;`, or an indented block.
    Suite { body: StmtRange },
    /// `if`/`elif` chain with optional `else`.
    If {
        branches: IfClauseRange,
        orelse: Option<StmtId>,
    },
    While {
        test: ExprId,
        body: StmtId,
        orelse: Option<StmtId>,
    },
    For {
        target: ExprId,
        iter: ExprId,
        body: StmtId,
        orelse: Option<StmtId>,
        is_async: bool,
    },
    Try {
        body: StmtId,
        handlers: HandlerRange,
        orelse: Option<StmtId>,
        finally: Option<StmtId>,
    },
    With {
        items: WithItemRange,
        body: StmtId,
        is_async: bool,
    },
    FuncDef {
        name: Name,
        params: ParamRange,
        returns: Option<ExprId>,
        body: StmtId,
        decorators: ExprRange,
        is_async: bool,
    },
    ClassDef {
        name: Name,
        /// Bases plus (3.x) keyword arguments, in call-argument form.
        bases: ArgRange,
        body: StmtId,
        decorators: ExprRange,
    },
    Return { value: Option<ExprId> },
    Pass,
    Break,
    Continue,
    /// `import a.b as c, d`
    Import { names: AliasRange },
    /// `from mod import x as y, z` / `from mod import *`
    FromImport {
        module: RelativeModule,
        names: AliasRange,
        is_star: bool,
    },
    Global { names: NameRange },
    /// 3.x only.
    Nonlocal { names: NameRange },
    /// `raise [exc [, value [, traceback]]]` (2.x) /
    /// `raise [exc [from cause]]` (3.x).
    Raise {
        exc: Option<ExprId>,
        cause: Option<ExprId>,
        value: Option<ExprId>,
        traceback: Option<ExprId>,
    },
    Assert {
        test: ExprId,
        msg: Option<ExprId>,
    },
    Del { targets: ExprRange },
    /// 2.x `print [>> dest,] values [,]`.
    Print {
        dest: Option<ExprId>,
        values: ExprRange,
        trailing_comma: bool,
    },
    /// 2.x `exec code [in globals [, locals]]`.
    Exec {
        code: ExprId,
        globals: Option<ExprId>,
        locals: Option<ExprId>,
    },
    /// Placeholder produced by error recovery. `preceding` holds any
    /// statements parsed before the error.
    Error { preceding: StmtRange },
}

impl Stmt {
    #[inline]
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    /// True for the recovery placeholder.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, StmtKind::Error { .. })
    }
}
