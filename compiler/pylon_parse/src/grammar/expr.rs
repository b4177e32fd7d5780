//! Expression productions.
//!
//! The boolean/comparison layers follow the reference grammar shape
//! (`or_test` → `and_test` → `not_test` → `comparison`); arithmetic and
//! bitwise operators below them are one precedence-climbing loop over
//! [`BinaryOp::precedence`]. `**` binds tighter than unary and is
//! right-associative, so it hangs off the power production instead.
//!
//! A failed atom reports and returns an `Error` placeholder WITHOUT
//! consuming the offending token; every enclosing loop only continues
//! past a separator, and the statement layer's recovery is what skips
//! input, so a stuck token can never loop.

use pylon_ir::{
    Arg, ArgKind, ArgRange, BinaryOp, BoolOp, CmpOp, Comparator, CompClause, CompClauseRange,
    Constant, DictEntry, ExprId, ExprKind, Name, PythonVersion, Span, TokenKind, TokenTag, UnaryOp,
};

use super::ParamStyle;
use crate::Parser;

impl Parser<'_> {
    /// `testlist`: one or more tests, a bare comma making a tuple.
    pub(crate) fn parse_test_list(&mut self) -> ExprId {
        let first = self.parse_test();
        self.finish_test_list(first, false)
    }

    /// `testlist_star_expr`: like [`Self::parse_test_list`] but allowing
    /// 3.x `*x` elements.
    pub(crate) fn parse_test_list_star(&mut self) -> ExprId {
        let first = self.parse_star_test();
        self.finish_test_list(first, true)
    }

    fn finish_test_list(&mut self, first: ExprId, allow_star: bool) -> ExprId {
        if !self.at(TokenTag::Comma) {
            return first;
        }
        let mut elts = vec![first];
        while self.eat(TokenTag::Comma) {
            if !self.at_expression_start() {
                break;
            }
            elts.push(if allow_star {
                self.parse_star_test()
            } else {
                self.parse_test()
            });
        }
        let span = Span::new(self.expr_span(first).start, self.last_end());
        let elts = self.arena.alloc_expr_list(elts);
        self.add_expr(ExprKind::Tuple { elts }, span)
    }

    /// `test`: lambda, or `or_test` with an optional conditional tail.
    pub(crate) fn parse_test(&mut self) -> ExprId {
        if self.at(TokenTag::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_or_test();
        if !self.at(TokenTag::If) {
            return body;
        }
        let if_span = self.span();
        if self.version() < PythonVersion::V25 {
            self.syntax_error(if_span, "unexpected token 'if'");
        }
        self.bump();
        let test = self.parse_or_test();
        self.expect(TokenTag::Else);
        let orelse = self.parse_test();
        let span = Span::new(self.expr_span(body).start, self.expr_span(orelse).end);
        self.add_expr(ExprKind::IfExp { test, body, orelse }, span)
    }

    /// `*x` (3.x) or a plain test.
    pub(crate) fn parse_star_test(&mut self) -> ExprId {
        if self.at(TokenTag::Star) && self.version().is_3x() {
            let start = self.span();
            self.bump();
            let value = self.parse_binary(1);
            let span = Span::new(start.start, self.expr_span(value).end);
            return self.add_expr(ExprKind::Starred { value }, span);
        }
        self.parse_test()
    }

    fn parse_or_test(&mut self) -> ExprId {
        let first = self.parse_and_test();
        if !self.at(TokenTag::Or) {
            return first;
        }
        let mut values = vec![first];
        while self.eat(TokenTag::Or) {
            values.push(self.parse_and_test());
        }
        self.finish_bool_op(BoolOp::Or, values)
    }

    fn parse_and_test(&mut self) -> ExprId {
        let first = self.parse_not_test();
        if !self.at(TokenTag::And) {
            return first;
        }
        let mut values = vec![first];
        while self.eat(TokenTag::And) {
            values.push(self.parse_not_test());
        }
        self.finish_bool_op(BoolOp::And, values)
    }

    fn finish_bool_op(&mut self, op: BoolOp, values: Vec<ExprId>) -> ExprId {
        let span = match (values.first().copied(), values.last().copied()) {
            (Some(first), Some(last)) => self.expr_span(first).merge(self.expr_span(last)),
            _ => Span::DUMMY,
        };
        let values = self.arena.alloc_expr_list(values);
        self.add_expr(ExprKind::BoolOp { op, values }, span)
    }

    fn parse_not_test(&mut self) -> ExprId {
        if self.at(TokenTag::Not) {
            let start = self.span();
            self.bump();
            let operand = self.parse_not_test();
            let span = Span::new(start.start, self.expr_span(operand).end);
            return self.add_expr(
                ExprKind::UnaryOp {
                    op: UnaryOp::Not,
                    operand,
                },
                span,
            );
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ExprId {
        let left = self.parse_binary(1);
        let mut links: Vec<Comparator> = Vec::new();
        loop {
            let op = if self.eat(TokenTag::Is) {
                if self.eat(TokenTag::Not) {
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                }
            } else if self.at(TokenTag::Not) && self.peek() == TokenTag::In {
                self.bump();
                self.bump();
                CmpOp::NotIn
            } else {
                let op = match self.tag() {
                    TokenTag::Less => CmpOp::Lt,
                    TokenTag::Greater => CmpOp::Gt,
                    TokenTag::LessEq => CmpOp::LtEq,
                    TokenTag::GreaterEq => CmpOp::GtEq,
                    TokenTag::EqEq => CmpOp::Eq,
                    TokenTag::NotEq => CmpOp::NotEq,
                    TokenTag::LessGreater => {
                        if self.version().is_3x() {
                            self.syntax_error(self.span(), "unexpected token '<>'");
                        }
                        CmpOp::NotEq
                    }
                    TokenTag::In => CmpOp::In,
                    _ => break,
                };
                self.bump();
                op
            };
            let value = self.parse_binary(1);
            links.push(Comparator { op, value });
        }
        if links.is_empty() {
            return left;
        }
        let last = links.last().map_or(left, |link| link.value);
        let span = self.expr_span(left).merge(self.expr_span(last));
        let comparators = self.arena.alloc_comparators(links);
        self.add_expr(ExprKind::Compare { left, comparators }, span)
    }

    /// Precedence climbing over the arithmetic/bitwise ladder.
    pub(crate) fn parse_binary(&mut self, min_prec: u8) -> ExprId {
        let mut left = self.parse_unary();
        loop {
            let Some(op) = self.binary_op() else { break };
            if op.precedence() < min_prec {
                break;
            }
            self.bump();
            let right = self.parse_binary(op.precedence() + 1);
            let span = self.expr_span(left).merge(self.expr_span(right));
            left = self.add_expr(ExprKind::BinOp { op, left, right }, span);
        }
        left
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        Some(match self.tag() {
            TokenTag::Pipe => BinaryOp::BitOr,
            TokenTag::Caret => BinaryOp::BitXor,
            TokenTag::Ampersand => BinaryOp::BitAnd,
            TokenTag::LeftShift => BinaryOp::LeftShift,
            TokenTag::RightShift => BinaryOp::RightShift,
            TokenTag::Plus => BinaryOp::Add,
            TokenTag::Minus => BinaryOp::Sub,
            TokenTag::Star => BinaryOp::Mul,
            TokenTag::At if self.version().supports_matmul() => BinaryOp::MatMul,
            TokenTag::Slash => BinaryOp::Div,
            TokenTag::SlashSlash => BinaryOp::FloorDiv,
            TokenTag::Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> ExprId {
        let op = match self.tag() {
            TokenTag::Plus => UnaryOp::Pos,
            TokenTag::Minus => UnaryOp::Neg,
            TokenTag::Tilde => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        let start = self.span();
        self.bump();
        let operand = self.parse_unary();
        let span = Span::new(start.start, self.expr_span(operand).end);
        self.add_expr(ExprKind::UnaryOp { op, operand }, span)
    }

    /// `power`: `[await] primary ['**' factor]`. `await x ** 2` is
    /// `(await x) ** 2`, and the exponent re-enters at unary so `**` is
    /// right-associative.
    fn parse_power(&mut self) -> ExprId {
        let base = if self.at(TokenTag::Await)
            && (self.context.in_async_function() || !self.soft_async_names())
        {
            let start = self.span();
            self.bump();
            if !self.context.in_async_function() {
                self.syntax_error(start, "'await' outside async function");
            }
            let value = self.parse_primary();
            let span = Span::new(start.start, self.expr_span(value).end);
            self.add_expr(ExprKind::Await { value }, span)
        } else {
            self.parse_primary()
        };
        if self.eat(TokenTag::StarStar) {
            let right = self.parse_unary();
            let span = self.expr_span(base).merge(self.expr_span(right));
            return self.add_expr(
                ExprKind::BinOp {
                    op: BinaryOp::Pow,
                    left: base,
                    right,
                },
                span,
            );
        }
        base
    }

    /// Atom plus any run of call/subscript/attribute trailers.
    pub(crate) fn parse_primary(&mut self) -> ExprId {
        let atom = self.parse_atom();
        self.parse_trailers(atom)
    }

    fn parse_trailers(&mut self, mut value: ExprId) -> ExprId {
        loop {
            match self.tag() {
                TokenTag::LParen => {
                    self.bump();
                    let args = self.parse_call_args();
                    let span = Span::new(self.expr_span(value).start, self.last_end());
                    value = self.add_expr(ExprKind::Call { func: value, args }, span);
                }
                TokenTag::LBracket => {
                    self.bump();
                    let index = self.parse_subscript_index();
                    self.expect(TokenTag::RBracket);
                    let span = Span::new(self.expr_span(value).start, self.last_end());
                    value = self.add_expr(ExprKind::Subscript { value, index }, span);
                }
                TokenTag::Dot => {
                    self.bump();
                    let Some(attr) = self.parse_name() else { break };
                    let span = Span::new(self.expr_span(value).start, self.last_end());
                    value = self.add_expr(ExprKind::Attribute { value, attr }, span);
                }
                _ => break,
            }
        }
        value
    }

    pub(crate) fn parse_atom(&mut self) -> ExprId {
        let start = self.span();
        match self.tag() {
            TokenTag::Str | TokenTag::Bytes | TokenTag::IncompleteStr => {
                return self.parse_string_group()
            }
            TokenTag::LParen => return self.parse_group(),
            TokenTag::LBracket => return self.parse_list_display(),
            TokenTag::LBrace => return self.parse_dict_or_set(),
            TokenTag::Lambda => return self.parse_lambda(),
            TokenTag::Yield => return self.parse_yield_expr(),
            TokenTag::Backquote => return self.parse_repr(),
            _ => {}
        }
        let kind = match self.kind().clone() {
            TokenKind::Name(name) => ExprKind::Name(self.fix_name(name)),
            TokenKind::Int(value) => ExprKind::Constant(Constant::Int(value)),
            TokenKind::BigInt(value) => ExprKind::Constant(Constant::BigInt(value)),
            TokenKind::Float(bits) => ExprKind::Constant(Constant::Float(bits)),
            TokenKind::Complex(bits) => ExprKind::Constant(Constant::Complex(bits)),
            TokenKind::TrueKw => ExprKind::Constant(Constant::Bool(true)),
            TokenKind::FalseKw => ExprKind::Constant(Constant::Bool(false)),
            TokenKind::NoneKw => ExprKind::Constant(Constant::None),
            TokenKind::Ellipsis => ExprKind::Constant(Constant::Ellipsis),
            TokenKind::Async if self.soft_async_names() => {
                let name = self.intern("async");
                ExprKind::Name(self.fix_name(name))
            }
            TokenKind::Await if self.soft_async_names() => {
                let name = self.intern("await");
                ExprKind::Name(self.fix_name(name))
            }
            TokenKind::Error(_) => {
                // Already reported by the tokenizer.
                self.bump();
                return self.error_expr(start);
            }
            _ => {
                let found = self.token_image();
                self.syntax_error(start, format!("unexpected token '{found}'"));
                return self.error_expr(start);
            }
        };
        self.bump();
        self.add_expr(kind, start)
    }

    /// `(...)`: empty tuple, parenthesized expression or yield,
    /// generator expression, or tuple display.
    fn parse_group(&mut self) -> ExprId {
        let start = self.span();
        self.bump();
        if self.eat(TokenTag::RParen) {
            let span = Span::new(start.start, self.last_end());
            let elts = self.arena.alloc_expr_list([]);
            return self.add_expr(ExprKind::Tuple { elts }, span);
        }
        if self.at(TokenTag::Yield) {
            let value = self.parse_yield_expr();
            if !self.expect(TokenTag::RParen) {
                self.mark_missing_terminator(value);
            }
            return value;
        }
        let first = self.parse_star_test();
        if self.at_comp_for() {
            let clauses = self.parse_comp_clauses();
            let closed = self.expect(TokenTag::RParen);
            let span = Span::new(start.start, self.last_end());
            let generator = self.add_expr(ExprKind::Generator { elt: first, clauses }, span);
            if !closed {
                self.mark_missing_terminator(generator);
            }
            return generator;
        }
        if self.at(TokenTag::Comma) {
            let mut elts = vec![first];
            while self.eat(TokenTag::Comma) {
                if self.at(TokenTag::RParen) {
                    break;
                }
                elts.push(self.parse_star_test());
            }
            let closed = self.expect(TokenTag::RParen);
            let span = Span::new(start.start, self.last_end());
            let elts = self.arena.alloc_expr_list(elts);
            let tuple = self.add_expr(ExprKind::Tuple { elts }, span);
            if !closed {
                self.mark_missing_terminator(tuple);
            }
            return tuple;
        }
        if !self.expect(TokenTag::RParen) {
            self.mark_missing_terminator(first);
        }
        first
    }

    fn parse_list_display(&mut self) -> ExprId {
        let start = self.span();
        self.bump();
        if self.eat(TokenTag::RBracket) {
            let span = Span::new(start.start, self.last_end());
            let elts = self.arena.alloc_expr_list([]);
            return self.add_expr(ExprKind::List { elts }, span);
        }
        let first = self.parse_star_test();
        if self.at_comp_for() {
            let clauses = self.parse_comp_clauses();
            let closed = self.expect(TokenTag::RBracket);
            let span = Span::new(start.start, self.last_end());
            let comp = self.add_expr(ExprKind::ListComp { elt: first, clauses }, span);
            if !closed {
                self.mark_missing_terminator(comp);
            }
            return comp;
        }
        let mut elts = vec![first];
        while self.eat(TokenTag::Comma) {
            if self.at(TokenTag::RBracket) {
                break;
            }
            elts.push(self.parse_star_test());
        }
        let closed = self.expect(TokenTag::RBracket);
        let span = Span::new(start.start, self.last_end());
        let elts = self.arena.alloc_expr_list(elts);
        let list = self.add_expr(ExprKind::List { elts }, span);
        if !closed {
            self.mark_missing_terminator(list);
        }
        list
    }

    /// `{...}`: dict or set display/comprehension. Set literals and
    /// dict/set comprehensions arrived in 2.7; `**` unpacking in 3.5.
    fn parse_dict_or_set(&mut self) -> ExprId {
        let start = self.span();
        self.bump();
        if self.eat(TokenTag::RBrace) {
            let span = Span::new(start.start, self.last_end());
            let entries = self.arena.alloc_dict_entries([]);
            return self.add_expr(ExprKind::Dict { entries }, span);
        }
        if self.at(TokenTag::StarStar) {
            if self.version() < PythonVersion::V35 {
                self.syntax_error(self.span(), "unexpected token '**'");
            }
            self.bump();
            let value = self.parse_binary(1);
            return self.finish_dict(start, vec![DictEntry { key: None, value }]);
        }
        if self.at(TokenTag::Star) && self.version().is_3x() {
            let first = self.parse_star_test();
            return self.finish_set(start, first);
        }
        let key = self.parse_test();
        if self.eat(TokenTag::Colon) {
            let value = self.parse_test();
            if self.at_comp_for() {
                if self.version() < PythonVersion::V27 {
                    self.syntax_error(start, "invalid syntax");
                }
                let clauses = self.parse_comp_clauses();
                let closed = self.expect(TokenTag::RBrace);
                let span = Span::new(start.start, self.last_end());
                let comp = self.add_expr(ExprKind::DictComp { key, value, clauses }, span);
                if !closed {
                    self.mark_missing_terminator(comp);
                }
                return comp;
            }
            return self.finish_dict(start, vec![DictEntry { key: Some(key), value }]);
        }
        if self.at_comp_for() {
            if self.version() < PythonVersion::V27 {
                self.syntax_error(start, "invalid syntax");
            }
            let clauses = self.parse_comp_clauses();
            let closed = self.expect(TokenTag::RBrace);
            let span = Span::new(start.start, self.last_end());
            let comp = self.add_expr(ExprKind::SetComp { elt: key, clauses }, span);
            if !closed {
                self.mark_missing_terminator(comp);
            }
            return comp;
        }
        self.finish_set(start, key)
    }

    fn finish_dict(&mut self, start: Span, mut entries: Vec<DictEntry>) -> ExprId {
        while self.eat(TokenTag::Comma) {
            if self.at(TokenTag::RBrace) {
                break;
            }
            if self.at(TokenTag::StarStar) {
                if self.version() < PythonVersion::V35 {
                    self.syntax_error(self.span(), "unexpected token '**'");
                }
                self.bump();
                let value = self.parse_binary(1);
                entries.push(DictEntry { key: None, value });
            } else {
                let key = self.parse_test();
                self.expect(TokenTag::Colon);
                let value = self.parse_test();
                entries.push(DictEntry { key: Some(key), value });
            }
        }
        let closed = self.expect(TokenTag::RBrace);
        let span = Span::new(start.start, self.last_end());
        let entries = self.arena.alloc_dict_entries(entries);
        let dict = self.add_expr(ExprKind::Dict { entries }, span);
        if !closed {
            self.mark_missing_terminator(dict);
        }
        dict
    }

    fn finish_set(&mut self, start: Span, first: ExprId) -> ExprId {
        if self.version() < PythonVersion::V27 {
            self.syntax_error(start, "invalid syntax");
        }
        let mut elts = vec![first];
        while self.eat(TokenTag::Comma) {
            if self.at(TokenTag::RBrace) {
                break;
            }
            elts.push(self.parse_star_test());
        }
        let closed = self.expect(TokenTag::RBrace);
        let span = Span::new(start.start, self.last_end());
        let elts = self.arena.alloc_expr_list(elts);
        let set = self.add_expr(ExprKind::Set { elts }, span);
        if !closed {
            self.mark_missing_terminator(set);
        }
        set
    }

    /// Adjacent string literals concatenate into one constant. Mixing
    /// bytes and text pieces is an error.
    fn parse_string_group(&mut self) -> ExprId {
        let start = self.span();
        let mut text: Option<String> = None;
        let mut bytes: Option<Vec<u8>> = None;
        let mut mixed = false;
        loop {
            match self.kind().clone() {
                TokenKind::Str { value, .. } => {
                    self.bump();
                    if bytes.is_some() {
                        mixed = true;
                    } else {
                        text.get_or_insert_with(String::new).push_str(self.lookup(value));
                    }
                }
                TokenKind::Bytes { value, .. } => {
                    self.bump();
                    if text.is_some() {
                        mixed = true;
                    } else {
                        bytes.get_or_insert_with(Vec::new).extend_from_slice(&value);
                    }
                }
                TokenKind::IncompleteStr(_) => {
                    // Already reported by the tokenizer.
                    self.bump();
                    return self.error_expr(Span::new(start.start, self.last_end()));
                }
                _ => break,
            }
        }
        let span = Span::new(start.start, self.last_end());
        if mixed {
            self.syntax_error(span, "cannot mix bytes and nonbytes literals");
            return self.error_expr(span);
        }
        let constant = match (text, bytes) {
            (Some(text), _) => Constant::Str(self.intern_owned(text)),
            (None, Some(bytes)) => Constant::Bytes(bytes),
            (None, None) => return self.error_expr(span),
        };
        self.add_expr(ExprKind::Constant(constant), span)
    }

    /// 2.x backquote repr.
    fn parse_repr(&mut self) -> ExprId {
        let start = self.span();
        self.bump();
        if self.version().is_3x() {
            self.syntax_error(start, "unexpected token '`'");
        }
        let value = self.parse_test_list();
        self.expect(TokenTag::Backquote);
        let span = Span::new(start.start, self.last_end());
        self.add_expr(ExprKind::Repr { value }, span)
    }

    pub(crate) fn parse_lambda(&mut self) -> ExprId {
        let start = self.span();
        self.bump();
        let params = self.parse_param_list(ParamStyle::Lambda);
        self.expect(TokenTag::Colon);
        let body = self.parse_test();
        let span = Span::new(start.start, self.expr_span(body).end);
        self.add_expr(ExprKind::Lambda { params, body }, span)
    }

    /// `yield [from] ...` as an expression; also flips the enclosing
    /// function into a generator.
    pub(crate) fn parse_yield_expr(&mut self) -> ExprId {
        let start = self.span();
        self.bump();
        if self.context.in_function() {
            let version = self.version();
            let mut stale_return: Option<Span> = None;
            if let Some(frame) = self.context.function_mut() {
                if frame.yield_span.is_none() {
                    frame.yield_span = Some(start);
                }
                if version < PythonVersion::V33 {
                    stale_return = frame.return_value_span.take();
                }
            }
            if let Some(return_span) = stale_return {
                self.syntax_error(return_span, "'return' with argument inside generator");
            }
        } else {
            self.syntax_error(start, "misplaced yield");
        }
        if self.at(TokenTag::From) {
            if !self.version().supports_yield_from() {
                self.syntax_error(self.span(), "unexpected token 'from'");
            }
            self.bump();
            let value = self.parse_test();
            let span = Span::new(start.start, self.expr_span(value).end);
            return self.add_expr(ExprKind::YieldFrom { value }, span);
        }
        let value = if self.at_expression_start() {
            Some(self.parse_test_list())
        } else {
            None
        };
        let end = value.map_or(start.end, |v| self.expr_span(v).end);
        self.add_expr(ExprKind::Yield { value }, Span::new(start.start, end))
    }

    /// True at `for`, or at `async for` where async comprehensions
    /// exist (3.6+).
    fn at_comp_for(&mut self) -> bool {
        if self.at(TokenTag::For) {
            return true;
        }
        self.at(TokenTag::Async)
            && self.version() >= PythonVersion::V36
            && self.peek() == TokenTag::For
    }

    /// One or more `for`/`if` comprehension clauses.
    pub(crate) fn parse_comp_clauses(&mut self) -> CompClauseRange {
        let mut clauses = Vec::new();
        loop {
            let start = self.span();
            let is_async = if self.at(TokenTag::Async) && self.peek() == TokenTag::For {
                if self.version() < PythonVersion::V36 {
                    self.syntax_error(start, "unexpected token 'async'");
                }
                self.bump();
                true
            } else {
                false
            };
            if !self.eat(TokenTag::For) {
                break;
            }
            let target = self.parse_target_list();
            self.expect(TokenTag::In);
            let iter = self.parse_or_test();
            let span = Span::new(start.start, self.expr_span(iter).end);
            clauses.push(CompClause::For {
                target,
                iter,
                is_async,
                span,
            });
            while self.at(TokenTag::If) {
                let if_start = self.span();
                self.bump();
                let test = self.parse_or_test();
                let span = Span::new(if_start.start, self.expr_span(test).end);
                clauses.push(CompClause::If { test, span });
            }
        }
        self.arena.alloc_comp_clauses(clauses)
    }

    /// Call argument list, ending at (and consuming) `)`.
    pub(crate) fn parse_call_args(&mut self) -> ArgRange {
        let mut args: Vec<Arg> = Vec::new();
        let mut seen_keywords: Vec<Name> = Vec::new();
        let mut saw_keyword = false;
        loop {
            if self.at(TokenTag::RParen) {
                break;
            }
            let start = self.span();
            if self.eat(TokenTag::Star) {
                let value = self.parse_test();
                args.push(Arg {
                    kind: ArgKind::Star,
                    value,
                    span: Span::new(start.start, self.last_end()),
                });
            } else if self.eat(TokenTag::StarStar) {
                let value = self.parse_test();
                args.push(Arg {
                    kind: ArgKind::DoubleStar,
                    value,
                    span: Span::new(start.start, self.last_end()),
                });
            } else if self.at(TokenTag::Name) && self.peek() == TokenTag::Assign {
                let name = match *self.kind() {
                    TokenKind::Name(name) => name,
                    _ => Name::EMPTY,
                };
                self.bump();
                self.bump();
                if seen_keywords.contains(&name) {
                    self.syntax_error(start, "keyword argument repeated");
                }
                seen_keywords.push(name);
                saw_keyword = true;
                let value = self.parse_test();
                args.push(Arg {
                    kind: ArgKind::Keyword(name),
                    value,
                    span: Span::new(start.start, self.last_end()),
                });
            } else {
                let value = self.parse_test();
                if self.at_comp_for() {
                    let clauses = self.parse_comp_clauses();
                    let span = Span::new(start.start, self.last_end());
                    let generator = self.add_expr(ExprKind::Generator { elt: value, clauses }, span);
                    if !args.is_empty() || self.at(TokenTag::Comma) {
                        self.syntax_error(
                            span,
                            "Generator expression must be parenthesized if not sole argument",
                        );
                    }
                    args.push(Arg {
                        kind: ArgKind::Positional,
                        value: generator,
                        span,
                    });
                } else {
                    if saw_keyword {
                        let span = self.expr_span(value);
                        self.syntax_error(span, "non-keyword arg after keyword arg");
                    }
                    args.push(Arg {
                        kind: ArgKind::Positional,
                        value,
                        span: self.expr_span(value),
                    });
                }
            }
            if !self.eat(TokenTag::Comma) {
                break;
            }
        }
        self.expect(TokenTag::RParen);
        self.arena.alloc_args(args)
    }

    /// Subscript content between `[` and `]`; a comma makes an extended
    /// slice (tuple index).
    fn parse_subscript_index(&mut self) -> ExprId {
        let start = self.span();
        let first = self.parse_subscript();
        if !self.at(TokenTag::Comma) {
            return first;
        }
        let mut elts = vec![first];
        while self.eat(TokenTag::Comma) {
            if self.at(TokenTag::RBracket) {
                break;
            }
            elts.push(self.parse_subscript());
        }
        let span = Span::new(start.start, self.last_end());
        let elts = self.arena.alloc_expr_list(elts);
        self.add_expr(ExprKind::Tuple { elts }, span)
    }

    fn parse_subscript(&mut self) -> ExprId {
        let start = self.span();
        let lower = if self.at(TokenTag::Colon) {
            None
        } else {
            Some(self.parse_test())
        };
        if !self.at(TokenTag::Colon) {
            return match lower {
                Some(expr) => expr,
                None => self.error_expr(start),
            };
        }
        self.bump();
        let upper = if self.at_expression_start() {
            Some(self.parse_test())
        } else {
            None
        };
        let step = if self.eat(TokenTag::Colon) {
            if self.at_expression_start() {
                Some(self.parse_test())
            } else {
                None
            }
        } else {
            None
        };
        let span = Span::new(start.start, self.last_end());
        self.add_expr(ExprKind::Slice { lower, upper, step }, span)
    }

    /// Assignment/loop target list: `a, b.c, d[e]` with 3.x `*rest`.
    pub(crate) fn parse_target_list(&mut self) -> ExprId {
        let start = self.span();
        let first = self.parse_target();
        if !self.at(TokenTag::Comma) {
            return first;
        }
        let mut elts = vec![first];
        while self.eat(TokenTag::Comma) {
            if !self.at_expression_start() {
                break;
            }
            elts.push(self.parse_target());
        }
        let span = Span::new(start.start, self.last_end());
        let elts = self.arena.alloc_expr_list(elts);
        self.add_expr(ExprKind::Tuple { elts }, span)
    }

    pub(crate) fn parse_target(&mut self) -> ExprId {
        if self.at(TokenTag::Star) && self.version().is_3x() {
            let start = self.span();
            self.bump();
            let value = self.parse_target();
            let span = Span::new(start.start, self.expr_span(value).end);
            return self.add_expr(ExprKind::Starred { value }, span);
        }
        let target = self.parse_primary();
        self.check_assign_target(target);
        target
    }

    /// Report when `target` cannot be assigned to, with the
    /// interpreter's wording.
    pub(crate) fn check_assign_target(&mut self, target: ExprId) {
        if let Some(message) = self.arena.expr(target).check_assign() {
            let span = self.expr_span(target);
            self.syntax_error(span, message);
        }
    }
}
