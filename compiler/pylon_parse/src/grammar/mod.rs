//! Grammar productions.
//!
//! Split the way the language reference splits: statements, expressions
//! and parameter lists. All productions are methods on [`Parser`]; the
//! token plumbing lives in the crate root. Version differences (2.4
//! through 3.7) are handled inline where the grammars diverge rather
//! than behind separate entry points.

mod expr;
mod params;
mod stmt;

pub(crate) use params::ParamStyle;

use pylon_ir::{Name, PythonVersion, TokenKind};

use crate::recovery::EXPRESSION_START;
use crate::Parser;

impl Parser<'_> {
    /// True while `async`/`await` are contextual keywords usable as
    /// identifiers (3.5/3.6; they became reserved in 3.7).
    pub(crate) fn soft_async_names(&self) -> bool {
        self.version() < PythonVersion::V37
    }

    /// True when the current token can begin an expression.
    pub(crate) fn at_expression_start(&self) -> bool {
        EXPRESSION_START.contains(self.kind())
    }

    /// Read an identifier, applying private-name mangling inside class
    /// bodies.
    pub(crate) fn parse_name(&mut self) -> Option<Name> {
        let name = self.raw_name()?;
        Some(self.fix_name(name))
    }

    /// Read an identifier without mangling (import paths, aliases).
    pub(crate) fn parse_raw_name(&mut self) -> Option<Name> {
        self.raw_name()
    }

    fn raw_name(&mut self) -> Option<Name> {
        match *self.kind() {
            TokenKind::Name(name) => {
                self.bump();
                Some(name)
            }
            TokenKind::Async if self.soft_async_names() => {
                self.bump();
                Some(self.intern("async"))
            }
            TokenKind::Await if self.soft_async_names() => {
                self.bump();
                Some(self.intern("await"))
            }
            _ => {
                let found = self.token_image();
                self.syntax_error(self.span(), format!("unexpected token '{found}'"));
                None
            }
        }
    }

    /// Apply class-private name mangling: inside `class C`, `__x`
    /// becomes `_C__x`. Names with trailing double underscores and
    /// all-underscore class names are left alone.
    pub(crate) fn fix_name(&self, name: Name) -> Name {
        let Some(class) = self.context.current_class().or(self.private_prefix) else {
            return name;
        };
        let text = self.lookup(name);
        if !text.starts_with("__") || text.ends_with("__") {
            return name;
        }
        let class_text = self.lookup(class).trim_start_matches('_');
        if class_text.is_empty() {
            return name;
        }
        self.intern_owned(format!("_{class_text}{text}"))
    }
}
