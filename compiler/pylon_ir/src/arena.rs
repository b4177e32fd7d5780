//! Flat arena for AST nodes.
//!
//! All nodes and child lists live in growable pools; nodes reference each
//! other with 4-byte ids and `(start, len)` ranges. Child lists are
//! collected into scratch vectors during parsing and copied in as one
//! contiguous run when the construct completes, so a range always denotes
//! a contiguous slice.

use crate::ast::{
    AliasRange, Arg, ArgRange, Comparator, CompareRange, CompClause, CompClauseRange, DictEntry,
    DictEntryRange, ExceptHandler, Expr, HandlerRange, IfClause, IfClauseRange, ImportAlias,
    NameRange, Param, ParamRange, Stmt, WithItem, WithItemRange,
};
use crate::{ExprId, ExprRange, Name, StmtId, StmtRange};

/// Arena holding every node of one parse.
///
/// The parser exclusively owns the arena while building; consumers get
/// shared read access afterwards.
#[derive(Default)]
pub struct AstArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    dict_entries: Vec<DictEntry>,
    comp_clauses: Vec<CompClause>,
    args: Vec<Arg>,
    params: Vec<Param>,
    comparators: Vec<Comparator>,
    aliases: Vec<ImportAlias>,
    names: Vec<Name>,
    handlers: Vec<ExceptHandler>,
    with_items: Vec<WithItem>,
    if_clauses: Vec<IfClause>,
}

// Range allocation is the same shape for every pool; a macro keeps the
// fourteen accessor pairs from drifting apart.
macro_rules! pool_range {
    ($alloc:ident, $get:ident, $field:ident, $elem:ty, $range:ident) => {
        pub fn $alloc(&mut self, items: impl IntoIterator<Item = $elem>) -> $range {
            let start = u32::try_from(self.$field.len()).unwrap_or(u32::MAX);
            self.$field.extend(items);
            let len = u32::try_from(self.$field.len()).unwrap_or(u32::MAX) - start;
            $range { start, len }
        }

        pub fn $get(&self, range: $range) -> &[$elem] {
            &self.$field[range.start as usize..(range.start + range.len) as usize]
        }
    };
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate one expression.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::from_raw(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    /// Allocate one statement.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::from_raw(u32::try_from(self.stmts.len()).unwrap_or(u32::MAX));
        self.stmts.push(stmt);
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// Re-stamp an expression's span (location patching once children are
    /// known).
    pub fn set_expr_span(&mut self, id: ExprId, span: crate::Span) {
        self.exprs[id.index()].span = span;
    }

    /// Re-stamp a statement's span.
    pub fn set_stmt_span(&mut self, id: StmtId, span: crate::Span) {
        self.stmts[id.index()].span = span;
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pool_range!(alloc_expr_list, expr_list, expr_lists, ExprId, ExprRange);
    pool_range!(alloc_stmt_list, stmt_list, stmt_lists, StmtId, StmtRange);
    pool_range!(
        alloc_dict_entries,
        dict_entries,
        dict_entries,
        DictEntry,
        DictEntryRange
    );
    pool_range!(
        alloc_comp_clauses,
        comp_clauses,
        comp_clauses,
        CompClause,
        CompClauseRange
    );
    pool_range!(alloc_args, args, args, Arg, ArgRange);
    pool_range!(alloc_params, params, params, Param, ParamRange);
    pool_range!(
        alloc_comparators,
        comparators,
        comparators,
        Comparator,
        CompareRange
    );
    pool_range!(alloc_aliases, aliases, aliases, ImportAlias, AliasRange);
    pool_range!(alloc_names, name_list, names, Name, NameRange);
    pool_range!(alloc_handlers, handlers, handlers, ExceptHandler, HandlerRange);
    pool_range!(alloc_with_items, with_items, with_items, WithItem, WithItemRange);
    pool_range!(alloc_if_clauses, if_clauses, if_clauses, IfClause, IfClauseRange);
}
