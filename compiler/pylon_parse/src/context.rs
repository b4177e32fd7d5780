//! Statement-legality context.
//!
//! Tracks where the parser currently is — inside which function, class,
//! loop and `finally` clause — so `break`, `continue`, `return` and
//! `yield` can be checked without a second pass. Loop and finally depth
//! are per-function: entering a `def` saves and zeroes them, because a
//! `break` inside a nested function does not belong to the enclosing
//! loop. Class bodies do the same.

use pylon_ir::{Name, Span};
use smallvec::SmallVec;

/// State for one enclosing `def`/`async def`.
#[derive(Clone, Debug)]
pub(crate) struct FunctionFrame {
    pub is_async: bool,
    /// First `yield`/`yield from` span; `Some` marks a generator.
    pub yield_span: Option<Span>,
    /// First `return <value>` span.
    pub return_value_span: Option<Span>,
    saved_loop_depth: u32,
    saved_finally_depth: u32,
}

#[derive(Clone, Debug)]
struct ClassFrame {
    name: Name,
    saved_loop_depth: u32,
    saved_finally_depth: u32,
}

/// The parser's scope stack.
#[derive(Clone, Debug, Default)]
pub(crate) struct ParseContext {
    functions: SmallVec<[FunctionFrame; 4]>,
    classes: SmallVec<[ClassFrame; 2]>,
    pub loop_depth: u32,
    pub finally_depth: u32,
}

impl ParseContext {
    pub fn enter_function(&mut self, is_async: bool) {
        self.functions.push(FunctionFrame {
            is_async,
            yield_span: None,
            return_value_span: None,
            saved_loop_depth: self.loop_depth,
            saved_finally_depth: self.finally_depth,
        });
        self.loop_depth = 0;
        self.finally_depth = 0;
    }

    pub fn exit_function(&mut self) {
        if let Some(frame) = self.functions.pop() {
            self.loop_depth = frame.saved_loop_depth;
            self.finally_depth = frame.saved_finally_depth;
        }
    }

    pub fn enter_class(&mut self, name: Name) {
        self.classes.push(ClassFrame {
            name,
            saved_loop_depth: self.loop_depth,
            saved_finally_depth: self.finally_depth,
        });
        self.loop_depth = 0;
        self.finally_depth = 0;
    }

    pub fn exit_class(&mut self) {
        if let Some(frame) = self.classes.pop() {
            self.loop_depth = frame.saved_loop_depth;
            self.finally_depth = frame.saved_finally_depth;
        }
    }

    pub fn in_function(&self) -> bool {
        !self.functions.is_empty()
    }

    pub fn in_async_function(&self) -> bool {
        self.functions.last().map_or(false, |f| f.is_async)
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionFrame> {
        self.functions.last_mut()
    }

    /// Innermost enclosing class name, for private-name mangling.
    pub fn current_class(&self) -> Option<Name> {
        self.classes.last().map(|f| f.name)
    }
}
