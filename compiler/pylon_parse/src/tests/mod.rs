//! End-to-end parser tests, grouped by grammar area.

mod expressions;
mod statements;

use pylon_diagnostic::CollectingSink;
use pylon_ir::{ExprId, ExprKind, Name, PythonVersion, SharedInterner, StmtId, StmtKind};

use crate::{parse_module, ParsedModule, ParserOptions};

/// Everything a test needs from one parse.
struct Outcome {
    parsed: ParsedModule,
    sink: CollectingSink,
    interner: SharedInterner,
}

impl Outcome {
    fn body(&self) -> &[StmtId] {
        self.parsed.body()
    }

    fn stmt(&self, index: usize) -> &StmtKind {
        &self.parsed.arena.stmt(self.body()[index]).kind
    }

    fn stmt_kind(&self, id: StmtId) -> &StmtKind {
        &self.parsed.arena.stmt(id).kind
    }

    fn expr(&self, id: ExprId) -> &ExprKind {
        &self.parsed.arena.expr(id).kind
    }

    fn errors(&self) -> Vec<&str> {
        self.sink
            .diagnostics()
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.as_str())
            .collect()
    }

    fn text(&self, name: Name) -> &'static str {
        self.interner.lookup_static(name)
    }

    /// The statements of a `Suite` node.
    fn suite(&self, id: StmtId) -> Vec<StmtId> {
        match &self.parsed.arena.stmt(id).kind {
            StmtKind::Suite { body } => self.parsed.arena.stmt_list(*body).to_vec(),
            other => panic!("expected suite, got {other:?}"),
        }
    }

    /// The value of the `index`th top-level expression statement.
    fn expr_stmt(&self, index: usize) -> ExprId {
        match self.stmt(index) {
            StmtKind::Expr { value } => *value,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }
}

fn parse(source: &str, version: PythonVersion) -> Outcome {
    parse_with(source, ParserOptions::new(version))
}

fn parse_with(source: &str, options: ParserOptions) -> Outcome {
    let interner = SharedInterner::new();
    let mut sink = CollectingSink::new();
    let parsed = parse_module(source, &interner, &options, &mut sink);
    Outcome {
        parsed,
        sink,
        interner,
    }
}

fn parse_ok(source: &str, version: PythonVersion) -> Outcome {
    let outcome = parse(source, version);
    assert!(
        !outcome.sink.has_errors(),
        "unexpected errors for {source:?}: {:?}",
        outcome.sink.diagnostics()
    );
    outcome
}
