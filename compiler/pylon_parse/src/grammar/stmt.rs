//! Statement productions.
//!
//! `parse_statement` is the recovery boundary: a failed line becomes a
//! `StmtKind::Error` node holding whatever parsed before the failure,
//! and the parser skips to the next statement-ending or
//! statement-starting token. Compound statements parse their suites
//! through [`Parser::parse_suite`], which accepts both the inline form
//! (`if x: pass`) and an indented block.

use pylon_ir::{
    BinaryOp, ExceptHandler, ExprKind, ExprRange, FutureOptions, IfClause, ImportAlias, Name,
    NameRange, PythonVersion, RelativeModule, Span, StmtId, StmtKind, TokenTag, WithItem,
};

use super::ParamStyle;
use crate::recovery::{STATEMENT_END, STATEMENT_START};
use crate::Parser;

impl Parser<'_> {
    /// One statement, simple or compound, with verbatim whitespace
    /// stamped onto the result.
    pub(crate) fn parse_statement(&mut self) -> StmtId {
        let whitespace = self.take_preceding();
        let stmt = self.parse_statement_inner();
        self.stamp_preceding(stmt, whitespace);
        stmt
    }

    fn parse_statement_inner(&mut self) -> StmtId {
        match self.tag() {
            TokenTag::If => self.parse_if(),
            TokenTag::While => self.parse_while(),
            TokenTag::For => self.parse_for(false, self.span()),
            TokenTag::Try => self.parse_try(),
            TokenTag::With => self.parse_with(false, self.span()),
            TokenTag::Def => self.parse_funcdef(false, ExprRange::default(), self.span()),
            TokenTag::Class => self.parse_classdef(ExprRange::default()),
            TokenTag::At => self.parse_decorated(),
            TokenTag::Async => self.parse_async_statement(),
            _ => self.parse_simple_line(),
        }
    }

    /// `async def`/`async for`/`async with`, or (before 3.7) `async` as
    /// a plain name at the start of an expression statement.
    fn parse_async_statement(&mut self) -> StmtId {
        let start = self.span();
        match self.peek() {
            TokenTag::Def => {
                self.bump();
                self.parse_funcdef(true, ExprRange::default(), start)
            }
            TokenTag::For => {
                self.bump();
                if !self.context.in_async_function() {
                    self.syntax_error(start, "'async for' outside async function");
                }
                self.parse_for(true, start)
            }
            TokenTag::With => {
                self.bump();
                if !self.context.in_async_function() {
                    self.syntax_error(start, "'async with' outside async function");
                }
                self.parse_with(true, start)
            }
            _ => self.parse_simple_line(),
        }
    }

    /// A logical line of small statements joined by `;`, then the
    /// newline.
    fn parse_simple_line(&mut self) -> StmtId {
        let start = self.span();
        let mut stmts = vec![self.parse_small_statement()];
        while self.eat(TokenTag::Semicolon) {
            if !self.at_expression_start() && !STATEMENT_START.contains(self.kind()) {
                break;
            }
            stmts.push(self.parse_small_statement());
        }
        let stmt = match stmts.as_slice() {
            [single] => *single,
            _ => {
                let span = Span::new(start.start, self.last_end());
                let body = self.arena.alloc_stmt_list(stmts);
                self.add_stmt(StmtKind::Suite { body }, span)
            }
        };
        self.end_line(stmt, start)
    }

    /// Consume the statement-ending newline, or report and recover.
    fn end_line(&mut self, stmt: StmtId, start: Span) -> StmtId {
        if self.eat(TokenTag::Newline)
            || self.at(TokenTag::EndOfFile)
            || self.at(TokenTag::Dedent)
        {
            return stmt;
        }
        let found = self.token_image();
        self.syntax_error(self.span(), format!("unexpected token '{found}'"));
        self.recover_line(vec![stmt], start)
    }

    /// Skip to the next statement boundary and leave an `Error` node
    /// carrying whatever parsed before the failure.
    fn recover_line(&mut self, preceding: Vec<StmtId>, start: Span) -> StmtId {
        tracing::trace!(offset = self.span().start, "statement recovery");
        loop {
            if STATEMENT_END.contains(self.kind()) {
                if self.at(TokenTag::Newline) || self.at(TokenTag::Semicolon) {
                    self.bump();
                }
                break;
            }
            if STATEMENT_START.contains(self.kind()) {
                break;
            }
            self.bump();
        }
        let span = Span::new(start.start, self.last_end().max(start.start));
        let preceding = self.arena.alloc_stmt_list(preceding);
        self.add_stmt(StmtKind::Error { preceding }, span)
    }

    fn parse_small_statement(&mut self) -> StmtId {
        match self.tag() {
            TokenTag::Pass => self.parse_leaf(StmtKind::Pass),
            TokenTag::Break => self.parse_break(),
            TokenTag::Continue => self.parse_continue(),
            TokenTag::Return => self.parse_return(),
            TokenTag::Raise => self.parse_raise(),
            TokenTag::Import => self.parse_import(),
            TokenTag::From => self.parse_from_import(),
            TokenTag::Global => self.parse_scope_decl(false),
            TokenTag::Nonlocal => self.parse_scope_decl(true),
            TokenTag::Assert => self.parse_assert(),
            TokenTag::Del => self.parse_del(),
            TokenTag::Exec => self.parse_exec(),
            TokenTag::Print => self.parse_print(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_leaf(&mut self, kind: StmtKind) -> StmtId {
        let span = self.span();
        self.bump();
        self.add_stmt(kind, span)
    }

    fn parse_break(&mut self) -> StmtId {
        let span = self.span();
        if self.context.loop_depth == 0 {
            self.syntax_error(span, "'break' outside loop");
        }
        self.parse_leaf(StmtKind::Break)
    }

    fn parse_continue(&mut self) -> StmtId {
        let span = self.span();
        if self.context.loop_depth == 0 {
            self.syntax_error(span, "'continue' not properly in loop");
        } else if self.context.finally_depth > 0 {
            self.syntax_error(span, "'continue' not supported inside 'finally' clause");
        }
        self.parse_leaf(StmtKind::Continue)
    }

    fn parse_return(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        if !self.context.in_function() {
            self.syntax_error(start, "'return' outside function");
        }
        let value = if self.at_expression_start() {
            Some(self.parse_test_list())
        } else {
            None
        };
        if let Some(value) = value {
            let full = Span::new(start.start, self.expr_span(value).end);
            let version = self.version();
            let mut generator_conflict = false;
            if let Some(frame) = self.context.function_mut() {
                if frame.return_value_span.is_none() {
                    frame.return_value_span = Some(full);
                }
                if version < PythonVersion::V33 && frame.yield_span.is_some() {
                    generator_conflict = true;
                }
            }
            if generator_conflict {
                self.syntax_error(full, "'return' with argument inside generator");
            }
        }
        let end = value.map_or(start.end, |v| self.expr_span(v).end);
        self.add_stmt(StmtKind::Return { value }, Span::new(start.start, end))
    }

    fn parse_raise(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let mut cause = None;
        let mut value = None;
        let mut traceback = None;
        let exc = if self.at_expression_start() {
            Some(self.parse_test())
        } else {
            None
        };
        if exc.is_some() {
            if self.at(TokenTag::From) {
                let from_span = self.span();
                self.bump();
                if !self.version().is_3x() {
                    self.syntax_error(from_span, "unexpected token 'from'");
                }
                cause = Some(self.parse_test());
            } else if self.at(TokenTag::Comma) {
                let comma = self.span();
                self.bump();
                if self.version().is_3x() {
                    self.syntax_error(comma, "unexpected token ','");
                }
                value = Some(self.parse_test());
                if self.eat(TokenTag::Comma) {
                    traceback = Some(self.parse_test());
                }
            }
        }
        let span = Span::new(start.start, self.last_end().max(start.end));
        self.add_stmt(
            StmtKind::Raise {
                exc,
                cause,
                value,
                traceback,
            },
            span,
        )
    }

    /// `global`/`nonlocal` name lists.
    fn parse_scope_decl(&mut self, nonlocal: bool) -> StmtId {
        let start = self.span();
        self.bump();
        if nonlocal && !self.context.in_function() && self.context.current_class().is_none() {
            self.syntax_error(start, "nonlocal declaration not allowed at module level");
        }
        let mut names = Vec::new();
        loop {
            let Some(name) = self.parse_raw_name() else { break };
            names.push(name);
            if !self.eat(TokenTag::Comma) {
                break;
            }
        }
        let span = Span::new(start.start, self.last_end());
        let names = self.arena.alloc_names(names);
        let kind = if nonlocal {
            StmtKind::Nonlocal { names }
        } else {
            StmtKind::Global { names }
        };
        self.add_stmt(kind, span)
    }

    fn parse_assert(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let test = self.parse_test();
        let msg = if self.eat(TokenTag::Comma) {
            Some(self.parse_test())
        } else {
            None
        };
        let span = Span::new(start.start, self.last_end());
        self.add_stmt(StmtKind::Assert { test, msg }, span)
    }

    fn parse_del(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let mut targets = Vec::new();
        loop {
            let target = self.parse_primary();
            if let Some(message) = self.arena.expr(target).check_delete() {
                let span = self.expr_span(target);
                self.syntax_error(span, message);
            }
            targets.push(target);
            if !self.eat(TokenTag::Comma) || !self.at_expression_start() {
                break;
            }
        }
        let span = Span::new(start.start, self.last_end());
        let targets = self.arena.alloc_expr_list(targets);
        self.add_stmt(StmtKind::Del { targets }, span)
    }

    /// 2.x `exec code [in globals [, locals]]`. The code operand stops
    /// below comparison level so the `in` is not swallowed.
    fn parse_exec(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let code = self.parse_binary(1);
        let globals = if self.eat(TokenTag::In) {
            Some(self.parse_test())
        } else {
            None
        };
        let locals = if globals.is_some() && self.eat(TokenTag::Comma) {
            Some(self.parse_test())
        } else {
            None
        };
        let span = Span::new(start.start, self.last_end());
        self.add_stmt(
            StmtKind::Exec {
                code,
                globals,
                locals,
            },
            span,
        )
    }

    /// 2.x print statement. The tokenizer only keywords `print` when the
    /// `print_function` future is off.
    fn parse_print(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let mut dest = None;
        let mut values = Vec::new();
        let mut trailing_comma = false;
        if self.eat(TokenTag::RightShift) {
            dest = Some(self.parse_test());
            if !self.eat(TokenTag::Comma) {
                let span = Span::new(start.start, self.last_end());
                let values = self.arena.alloc_expr_list(values);
                return self.add_stmt(
                    StmtKind::Print {
                        dest,
                        values,
                        trailing_comma,
                    },
                    span,
                );
            }
        }
        while self.at_expression_start() {
            values.push(self.parse_test());
            if self.eat(TokenTag::Comma) {
                trailing_comma = true;
            } else {
                trailing_comma = false;
                break;
            }
        }
        let span = Span::new(start.start, self.last_end().max(start.end));
        let values = self.arena.alloc_expr_list(values);
        self.add_stmt(
            StmtKind::Print {
                dest,
                values,
                trailing_comma,
            },
            span,
        )
    }

    /// Expression statement, assignment chain, or augmented assignment.
    fn parse_expression_statement(&mut self) -> StmtId {
        let start = self.span();
        let first = self.parse_test_list_star();
        if self.kind().is_aug_assign() {
            let op = aug_op(self.tag());
            self.bump();
            if !matches!(
                self.arena.expr(first).kind,
                ExprKind::Name(_)
                    | ExprKind::Attribute { .. }
                    | ExprKind::Subscript { .. }
                    | ExprKind::Error
            ) {
                let span = self.expr_span(first);
                self.syntax_error(span, "illegal expression for augmented assignment");
            }
            let value = if self.at(TokenTag::Yield) {
                self.parse_yield_expr()
            } else {
                self.parse_test_list()
            };
            let span = Span::new(start.start, self.expr_span(value).end);
            return self.add_stmt(
                StmtKind::AugAssign {
                    target: first,
                    op,
                    value,
                },
                span,
            );
        }
        if !self.at(TokenTag::Assign) {
            let span = self.expr_span(first);
            return self.add_stmt(StmtKind::Expr { value: first }, span);
        }
        let mut chain = vec![first];
        while self.eat(TokenTag::Assign) {
            if self.at(TokenTag::Yield) {
                chain.push(self.parse_yield_expr());
                break;
            }
            chain.push(self.parse_test_list_star());
        }
        let value = chain.pop().unwrap_or(first);
        for &target in &chain {
            self.check_assign_target(target);
        }
        let span = Span::new(start.start, self.expr_span(value).end);
        let targets = self.arena.alloc_expr_list(chain);
        self.add_stmt(StmtKind::Assign { targets, value }, span)
    }

    // --- imports ---

    fn parse_import(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let mut aliases = Vec::new();
        loop {
            let alias_start = self.span();
            let Some(path) = self.parse_dotted_name() else { break };
            let asname = if self.eat(TokenTag::As) {
                self.parse_raw_name()
            } else {
                None
            };
            aliases.push(ImportAlias {
                path,
                asname,
                span: Span::new(alias_start.start, self.last_end()),
            });
            if !self.eat(TokenTag::Comma) {
                break;
            }
        }
        let span = Span::new(start.start, self.last_end());
        let names = self.arena.alloc_aliases(aliases);
        self.add_stmt(StmtKind::Import { names }, span)
    }

    fn parse_dotted_name(&mut self) -> Option<NameRange> {
        let mut parts = vec![self.parse_raw_name()?];
        while self.eat(TokenTag::Dot) {
            match self.parse_raw_name() {
                Some(part) => parts.push(part),
                None => break,
            }
        }
        Some(self.arena.alloc_names(parts))
    }

    fn parse_from_import(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let module_start = self.span();
        let mut dots: u32 = 0;
        loop {
            if self.eat(TokenTag::Dot) {
                dots += 1;
            } else if self.eat(TokenTag::Ellipsis) {
                // The tokenizer fuses '...' even here.
                dots += 3;
            } else {
                break;
            }
        }
        let path = if self.at(TokenTag::Import) || (dots > 0 && !self.at_expression_start()) {
            NameRange::default()
        } else {
            self.parse_dotted_name().unwrap_or_default()
        };
        let module = RelativeModule {
            dots,
            path,
            span: Span::new(module_start.start, self.last_end().max(module_start.start)),
        };
        let sole_module = if dots == 0 && path.len == 1 {
            self.arena.name_list(path).first().copied()
        } else {
            None
        };
        let is_future = sole_module.map_or(false, |name| self.is_future_module(name));
        if is_future && !self.allows_future_import() {
            self.syntax_error(
                start,
                "from __future__ imports must occur at the beginning of the file",
            );
        }
        self.expect(TokenTag::Import);
        if self.at(TokenTag::Star) {
            let star = self.span();
            self.bump();
            if is_future {
                self.syntax_error(star, "future statement does not support import *");
            }
            let span = Span::new(start.start, self.last_end());
            let names = self.arena.alloc_aliases([]);
            return self.add_stmt(
                StmtKind::FromImport {
                    module,
                    names,
                    is_star: true,
                },
                span,
            );
        }
        let parenthesized = self.eat(TokenTag::LParen);
        let mut aliases = Vec::new();
        loop {
            let alias_start = self.span();
            let Some(name) = self.parse_raw_name() else { break };
            let asname = if self.eat(TokenTag::As) {
                self.parse_raw_name()
            } else {
                None
            };
            if is_future && self.allows_future_import() {
                self.process_future_feature(name, alias_start);
            }
            let path = self.arena.alloc_names([name]);
            aliases.push(ImportAlias {
                path,
                asname,
                span: Span::new(alias_start.start, self.last_end()),
            });
            if !self.eat(TokenTag::Comma) {
                break;
            }
            if parenthesized && self.at(TokenTag::RParen) {
                break;
            }
        }
        let closed = !parenthesized || self.expect(TokenTag::RParen);
        let span = Span::new(start.start, self.last_end());
        let names = self.arena.alloc_aliases(aliases);
        let stmt = self.add_stmt(
            StmtKind::FromImport {
                module,
                names,
                is_star: false,
            },
            span,
        );
        if parenthesized {
            self.mark_alt_form(stmt);
        }
        if !closed {
            self.mark_missing_terminator(stmt);
        }
        stmt
    }

    fn process_future_feature(&mut self, name: Name, span: Span) {
        let text = self.lookup(name);
        match FutureOptions::from_feature_name(text) {
            Some(flag) => self.add_future(flag),
            None => {
                let message = if text == "braces" {
                    "not a chance".to_owned()
                } else {
                    format!("future feature is not defined: {text}")
                };
                self.syntax_error(span, message);
            }
        }
    }

    // --- compound statements ---

    /// `: suite` — inline small statements or an indented block.
    fn parse_suite(&mut self) -> StmtId {
        let start = self.span();
        if !self.expect(TokenTag::Colon) {
            return self.recover_line(Vec::new(), start);
        }
        if !self.eat(TokenTag::Newline) {
            return self.parse_simple_line();
        }
        if !self.at(TokenTag::Indent) {
            self.indentation_error(self.span(), "expected an indented block");
            let span = Span::new(start.start, self.last_end());
            let preceding = self.arena.alloc_stmt_list([]);
            return self.add_stmt(StmtKind::Error { preceding }, span);
        }
        self.bump();
        let mut body = Vec::new();
        loop {
            match self.tag() {
                TokenTag::Dedent => {
                    self.bump();
                    break;
                }
                TokenTag::EndOfFile => break,
                TokenTag::Newline => {
                    self.bump();
                }
                TokenTag::Indent => {
                    self.indentation_error(self.span(), "unexpected indent");
                    self.bump();
                }
                _ => {
                    let stmt = self.parse_statement();
                    body.push(stmt);
                }
            }
        }
        let span = Span::new(start.start, self.last_end());
        let body = self.arena.alloc_stmt_list(body);
        self.add_stmt(StmtKind::Suite { body }, span)
    }

    fn parse_if(&mut self) -> StmtId {
        let start = self.span();
        let mut branches = Vec::new();
        loop {
            let clause_start = self.span();
            self.bump(); // 'if' / 'elif'
            let test = self.parse_test();
            let body = self.parse_suite();
            branches.push(IfClause {
                test,
                body,
                span: Span::new(clause_start.start, self.last_end()),
            });
            if !self.at(TokenTag::Elif) {
                break;
            }
        }
        let orelse = if self.eat(TokenTag::Else) {
            Some(self.parse_suite())
        } else {
            None
        };
        let span = Span::new(start.start, self.last_end());
        let branches = self.arena.alloc_if_clauses(branches);
        self.add_stmt(StmtKind::If { branches, orelse }, span)
    }

    fn parse_while(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let test = self.parse_test();
        self.context.loop_depth += 1;
        let body = self.parse_suite();
        self.context.loop_depth -= 1;
        let orelse = if self.eat(TokenTag::Else) {
            Some(self.parse_suite())
        } else {
            None
        };
        let span = Span::new(start.start, self.last_end());
        self.add_stmt(StmtKind::While { test, body, orelse }, span)
    }

    fn parse_for(&mut self, is_async: bool, start: Span) -> StmtId {
        self.bump(); // 'for'
        let target = self.parse_target_list();
        self.expect(TokenTag::In);
        let iter = self.parse_test_list();
        self.context.loop_depth += 1;
        let body = self.parse_suite();
        self.context.loop_depth -= 1;
        let orelse = if self.eat(TokenTag::Else) {
            Some(self.parse_suite())
        } else {
            None
        };
        let span = Span::new(start.start, self.last_end());
        self.add_stmt(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            },
            span,
        )
    }

    fn parse_try(&mut self) -> StmtId {
        let start = self.span();
        self.bump();
        let body = self.parse_suite();
        let mut handlers = Vec::new();
        let mut saw_default = false;
        while self.at(TokenTag::Except) {
            let handler_start = self.span();
            self.bump();
            if saw_default {
                self.syntax_error(handler_start, "default 'except' must be last");
            }
            let mut test = None;
            let mut target = None;
            if self.at_expression_start() {
                test = Some(self.parse_test());
                if self.eat(TokenTag::As) {
                    let name_span = self.span();
                    if let Some(name) = self.parse_name() {
                        target = Some(self.add_expr(ExprKind::Name(name), name_span));
                    }
                } else if self.at(TokenTag::Comma) {
                    let comma = self.span();
                    self.bump();
                    if self.version().is_3x() {
                        self.syntax_error(comma, "unexpected token ','");
                    }
                    target = Some(self.parse_target());
                }
            } else {
                saw_default = true;
            }
            let handler_body = self.parse_suite();
            handlers.push(ExceptHandler {
                test,
                target,
                body: handler_body,
                span: Span::new(handler_start.start, self.last_end()),
            });
        }
        let orelse = if self.eat(TokenTag::Else) {
            Some(self.parse_suite())
        } else {
            None
        };
        let finally = if self.eat(TokenTag::Finally) {
            self.context.finally_depth += 1;
            let suite = self.parse_suite();
            self.context.finally_depth -= 1;
            Some(suite)
        } else {
            None
        };
        if handlers.is_empty() && finally.is_none() {
            self.syntax_error(start, "expected 'except' or 'finally' block");
        }
        let span = Span::new(start.start, self.last_end());
        let handlers = self.arena.alloc_handlers(handlers);
        self.add_stmt(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finally,
            },
            span,
        )
    }

    fn parse_with(&mut self, is_async: bool, start: Span) -> StmtId {
        self.bump(); // 'with'
        let mut items = Vec::new();
        loop {
            let item_start = self.span();
            let context = self.parse_test();
            let target = if self.eat(TokenTag::As) {
                Some(self.parse_target())
            } else {
                None
            };
            items.push(WithItem {
                context,
                target,
                span: Span::new(item_start.start, self.last_end()),
            });
            if !self.eat(TokenTag::Comma) {
                break;
            }
        }
        let body = self.parse_suite();
        let span = Span::new(start.start, self.last_end());
        let items = self.arena.alloc_with_items(items);
        self.add_stmt(
            StmtKind::With {
                items,
                body,
                is_async,
            },
            span,
        )
    }

    fn parse_funcdef(&mut self, is_async: bool, decorators: ExprRange, start: Span) -> StmtId {
        self.bump(); // 'def'
        let name = self.parse_name().unwrap_or(Name::EMPTY);
        self.expect(TokenTag::LParen);
        let params = self.parse_param_list(ParamStyle::Function);
        self.expect(TokenTag::RParen);
        let returns = if self.at(TokenTag::Arrow) {
            let arrow = self.span();
            self.bump();
            if !self.version().is_3x() {
                self.syntax_error(arrow, "unexpected token '->'");
            }
            Some(self.parse_test())
        } else {
            None
        };
        self.context.enter_function(is_async);
        let body = self.parse_suite();
        self.context.exit_function();
        let span = Span::new(start.start, self.last_end());
        self.add_stmt(
            StmtKind::FuncDef {
                name,
                params,
                returns,
                body,
                decorators,
                is_async,
            },
            span,
        )
    }

    fn parse_classdef(&mut self, decorators: ExprRange) -> StmtId {
        let start = self.span();
        self.bump(); // 'class'
        let name = self.parse_name().unwrap_or(Name::EMPTY);
        let bases = if self.eat(TokenTag::LParen) {
            self.parse_call_args()
        } else {
            self.arena.alloc_args([])
        };
        self.context.enter_class(name);
        let body = self.parse_suite();
        self.context.exit_class();
        let span = Span::new(start.start, self.last_end());
        self.add_stmt(
            StmtKind::ClassDef {
                name,
                bases,
                body,
                decorators,
            },
            span,
        )
    }

    /// One or more `@decorator` lines, then the decorated `def`,
    /// `async def` or `class`.
    fn parse_decorated(&mut self) -> StmtId {
        let start = self.span();
        let mut decorators = Vec::new();
        while self.at(TokenTag::At) {
            self.bump();
            let decorator = self.parse_primary();
            decorators.push(decorator);
            if !self.eat(TokenTag::Newline) {
                let found = self.token_image();
                self.syntax_error(self.span(), format!("unexpected token '{found}'"));
                return self.recover_line(Vec::new(), start);
            }
        }
        let decorators = self.arena.alloc_expr_list(decorators);
        match self.tag() {
            TokenTag::Def => self.parse_funcdef(false, decorators, start),
            TokenTag::Class => self.parse_classdef_decorated(decorators, start),
            TokenTag::Async if self.peek() == TokenTag::Def => {
                self.bump();
                self.parse_funcdef(true, decorators, start)
            }
            _ => {
                let found = self.token_image();
                self.syntax_error(self.span(), format!("unexpected token '{found}'"));
                self.recover_line(Vec::new(), start)
            }
        }
    }

    fn parse_classdef_decorated(&mut self, decorators: ExprRange, start: Span) -> StmtId {
        let stmt = self.parse_classdef(decorators);
        let span = Span::new(start.start, self.stmt_span(stmt).end);
        self.arena.set_stmt_span(stmt, span);
        stmt
    }
}

fn aug_op(tag: TokenTag) -> BinaryOp {
    match tag {
        TokenTag::PlusAssign => BinaryOp::Add,
        TokenTag::MinusAssign => BinaryOp::Sub,
        TokenTag::StarAssign => BinaryOp::Mul,
        TokenTag::SlashAssign => BinaryOp::Div,
        TokenTag::SlashSlashAssign => BinaryOp::FloorDiv,
        TokenTag::PercentAssign => BinaryOp::Mod,
        TokenTag::AndAssign => BinaryOp::BitAnd,
        TokenTag::OrAssign => BinaryOp::BitOr,
        TokenTag::XorAssign => BinaryOp::BitXor,
        TokenTag::LeftShiftAssign => BinaryOp::LeftShift,
        TokenTag::RightShiftAssign => BinaryOp::RightShift,
        TokenTag::PowAssign => BinaryOp::Pow,
        _ => BinaryOp::MatMul,
    }
}
