use pretty_assertions::assert_eq;
use pylon_ir::{
    ArgKind, BinaryOp, ExprKind, FutureOptions, ParamKind, PythonVersion, StmtKind,
};

use super::{parse, parse_ok, parse_with};
use crate::ParserOptions;

#[test]
fn if_elif_else_shape() {
    let source = "if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n";
    let out = parse_ok(source, PythonVersion::V37);
    let StmtKind::If { branches, orelse } = out.stmt(0) else {
        panic!("expected if");
    };
    assert_eq!(branches.len, 2);
    assert!(orelse.is_some());
}

#[test]
fn loops_with_else() {
    let source = "while a:\n    pass\nelse:\n    pass\nfor x in y:\n    pass\nelse:\n    pass\n";
    let out = parse_ok(source, PythonVersion::V37);
    let StmtKind::While { orelse, .. } = out.stmt(0) else {
        panic!("expected while");
    };
    assert!(orelse.is_some());
    let StmtKind::For { orelse, is_async, .. } = out.stmt(1) else {
        panic!("expected for");
    };
    assert!(orelse.is_some());
    assert!(!is_async);
}

#[test]
fn try_with_all_clauses() {
    let source = "\
try:
    pass
except ValueError as e:
    pass
except:
    pass
else:
    pass
finally:
    pass
";
    let out = parse_ok(source, PythonVersion::V37);
    let StmtKind::Try {
        handlers,
        orelse,
        finally,
        ..
    } = out.stmt(0)
    else {
        panic!("expected try");
    };
    let handlers = out.parsed.arena.handlers(*handlers);
    assert_eq!(handlers.len(), 2);
    assert!(handlers[0].test.is_some());
    assert!(handlers[0].target.is_some());
    assert!(handlers[1].test.is_none());
    assert!(orelse.is_some());
    assert!(finally.is_some());
}

#[test]
fn default_except_must_be_last() {
    let source = "try:\n    pass\nexcept:\n    pass\nexcept ValueError:\n    pass\n";
    let out = parse(source, PythonVersion::V37);
    assert_eq!(out.errors(), ["default 'except' must be last"]);
}

#[test]
fn try_without_except_or_finally() {
    let out = parse("try:\n    pass\nx = 1\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["expected 'except' or 'finally' block"]);
}

#[test]
fn old_style_except_target() {
    let source = "try:\n    pass\nexcept ValueError, e:\n    pass\n";
    let out = parse_ok(source, PythonVersion::V27);
    let StmtKind::Try { handlers, .. } = out.stmt(0) else {
        panic!("expected try");
    };
    assert!(out.parsed.arena.handlers(*handlers)[0].target.is_some());
}

#[test]
fn with_statement_items() {
    let out = parse_ok("with a as b, c:\n    pass\n", PythonVersion::V37);
    let StmtKind::With { items, is_async, .. } = out.stmt(0) else {
        panic!("expected with");
    };
    let items = out.parsed.arena.with_items(*items);
    assert_eq!(items.len(), 2);
    assert!(items[0].target.is_some());
    assert!(items[1].target.is_none());
    assert!(!is_async);
}

#[test]
fn async_statements_need_async_context() {
    let out = parse_ok(
        "async def f():\n    async with a:\n        async for x in y:\n            pass\n",
        PythonVersion::V37,
    );
    let StmtKind::FuncDef { is_async, .. } = out.stmt(0) else {
        panic!("expected async def");
    };
    assert!(*is_async);

    let out = parse("async for x in y:\n    pass\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["'async for' outside async function"]);

    let out = parse("async with a:\n    pass\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["'async with' outside async function"]);
}

#[test]
fn parameter_list_kinds() {
    let out = parse_ok("def f(a, b=1, *args, c, **kw):\n    pass\n", PythonVersion::V37);
    let StmtKind::FuncDef { params, .. } = out.stmt(0) else {
        panic!("expected def");
    };
    let params = out.parsed.arena.params(*params);
    let kinds: Vec<_> = params.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        [
            ParamKind::Normal,
            ParamKind::Normal,
            ParamKind::Star,
            ParamKind::KeywordOnly,
            ParamKind::DoubleStar,
        ]
    );
    assert!(params[1].default.is_some());
}

#[test]
fn bare_star_marks_keyword_only() {
    let out = parse_ok("def f(a, *, b):\n    pass\n", PythonVersion::V37);
    let StmtKind::FuncDef { params, .. } = out.stmt(0) else {
        panic!("expected def");
    };
    let params = out.parsed.arena.params(*params);
    assert_eq!(params.len(), 2);
    assert_eq!(params[1].kind, ParamKind::KeywordOnly);
}

#[test]
fn non_default_after_default() {
    let out = parse("def f(a=1, b):\n    pass\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["non-default argument follows default argument"]);
}

#[test]
fn duplicate_parameter_name() {
    let out = parse("def f(a, a):\n    pass\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["duplicate argument 'a' in function definition"]);
}

#[test]
fn sublist_parameters_on_2x() {
    let out = parse_ok("def f(a, (b, c)):\n    pass\n", PythonVersion::V27);
    let StmtKind::FuncDef { params, .. } = out.stmt(0) else {
        panic!("expected def");
    };
    let params = out.parsed.arena.params(*params);
    assert_eq!(params[1].kind, ParamKind::Sublist);
    assert!(params[1].sublist.is_some());
}

#[test]
fn annotations_and_return_type() {
    let out = parse_ok("def f(a: int, b: str = 'x') -> bool:\n    pass\n", PythonVersion::V37);
    let StmtKind::FuncDef { params, returns, .. } = out.stmt(0) else {
        panic!("expected def");
    };
    let params = out.parsed.arena.params(*params);
    assert!(params[0].annotation.is_some());
    assert!(params[1].annotation.is_some());
    assert!(params[1].default.is_some());
    assert!(returns.is_some());
}

#[test]
fn decorated_definitions() {
    let source = "@dec\n@mod.attr\ndef f():\n    pass\n@wrap\nclass C:\n    pass\n";
    let out = parse_ok(source, PythonVersion::V37);
    let StmtKind::FuncDef { decorators, .. } = out.stmt(0) else {
        panic!("expected def");
    };
    assert_eq!(decorators.len, 2);
    let StmtKind::ClassDef { decorators, .. } = out.stmt(1) else {
        panic!("expected class");
    };
    assert_eq!(decorators.len, 1);
}

#[test]
fn class_bases_in_call_form() {
    let out = parse_ok("class C(A, metaclass=M):\n    pass\n", PythonVersion::V37);
    let StmtKind::ClassDef { bases, .. } = out.stmt(0) else {
        panic!("expected class");
    };
    let bases = out.parsed.arena.args(*bases);
    assert_eq!(bases.len(), 2);
    assert_eq!(bases[0].kind, ArgKind::Positional);
    assert!(matches!(bases[1].kind, ArgKind::Keyword(_)));
}

#[test]
fn return_break_continue_context_checks() {
    let out = parse("return 1\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["'return' outside function"]);

    let out = parse("break\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["'break' outside loop"]);

    let out = parse("continue\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["'continue' not properly in loop"]);
}

#[test]
fn loop_context_does_not_cross_def() {
    let source = "for x in y:\n    def f():\n        break\n";
    let out = parse(source, PythonVersion::V37);
    assert_eq!(out.errors(), ["'break' outside loop"]);
}

#[test]
fn continue_inside_finally() {
    let source = "\
def f():
    for x in y:
        try:
            pass
        finally:
            continue
";
    let out = parse(source, PythonVersion::V37);
    assert_eq!(out.errors(), ["'continue' not supported inside 'finally' clause"]);
}

#[test]
fn generator_return_value_conflict_before_33() {
    let source = "def f():\n    yield 1\n    return 2\n";
    let out = parse(source, PythonVersion::V27);
    assert_eq!(out.errors(), ["'return' with argument inside generator"]);

    let out = parse_ok(source, PythonVersion::V37);
    assert!(!out.sink.has_errors());

    // Also detected when the return comes first.
    let source = "def f():\n    return 2\n    yield 1\n";
    let out = parse(source, PythonVersion::V27);
    assert_eq!(out.errors(), ["'return' with argument inside generator"]);
}

#[test]
fn scope_declarations() {
    let out = parse_ok("def f():\n    global a, b\n", PythonVersion::V37);
    let StmtKind::FuncDef { body, .. } = out.stmt(0) else {
        panic!("expected def");
    };
    let body = out.suite(*body);
    let StmtKind::Global { names } = out.stmt_kind(body[0]) else {
        panic!("expected global");
    };
    assert_eq!(names.len, 2);

    let out = parse("nonlocal x\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["nonlocal declaration not allowed at module level"]);
}

#[test]
fn import_aliases() {
    let out = parse_ok("import a.b as c, d\n", PythonVersion::V37);
    let StmtKind::Import { names } = out.stmt(0) else {
        panic!("expected import");
    };
    let aliases = out.parsed.arena.aliases(*names);
    assert_eq!(aliases.len(), 2);
    assert_eq!(aliases[0].path.len, 2);
    assert!(aliases[0].asname.is_some());
    assert_eq!(aliases[1].path.len, 1);
    assert!(aliases[1].asname.is_none());
}

#[test]
fn relative_imports() {
    let out = parse_ok("from . import x\nfrom ..pkg import (a, b,)\n", PythonVersion::V37);
    let StmtKind::FromImport { module, names, .. } = out.stmt(0) else {
        panic!("expected from-import");
    };
    assert_eq!(module.dots, 1);
    assert_eq!(module.path.len, 0);
    assert_eq!(out.parsed.arena.aliases(*names).len(), 1);

    let StmtKind::FromImport { module, names, .. } = out.stmt(1) else {
        panic!("expected from-import");
    };
    assert_eq!(module.dots, 2);
    assert_eq!(module.path.len, 1);
    assert_eq!(out.parsed.arena.aliases(*names).len(), 2);
}

#[test]
fn star_import() {
    let out = parse_ok("from m import *\n", PythonVersion::V37);
    let StmtKind::FromImport { is_star, .. } = out.stmt(0) else {
        panic!("expected from-import");
    };
    assert!(*is_star);
}

#[test]
fn future_import_changes_the_grammar_mid_file() {
    let source = "from __future__ import print_function\nprint(1)\n";
    let out = parse_ok(source, PythonVersion::V27);
    assert!(out.parsed.future.contains(FutureOptions::PRINT_FUNCTION));
    // `print` is now a plain name: the second statement is a call.
    let value = out.expr_stmt(1);
    assert!(matches!(out.expr(value), ExprKind::Call { .. }));
}

#[test]
fn print_statement_without_the_future() {
    let out = parse_ok("print >>f, 1, 2\nprint 3,\n", PythonVersion::V27);
    let StmtKind::Print {
        dest,
        values,
        trailing_comma,
    } = out.stmt(0)
    else {
        panic!("expected print");
    };
    assert!(dest.is_some());
    assert_eq!(values.len, 2);
    assert!(!trailing_comma);

    let StmtKind::Print {
        dest,
        values,
        trailing_comma,
    } = out.stmt(1)
    else {
        panic!("expected print");
    };
    assert!(dest.is_none());
    assert_eq!(values.len, 1);
    assert!(*trailing_comma);
}

#[test]
fn future_import_must_lead_the_file() {
    let out = parse("x = 1\nfrom __future__ import division\n", PythonVersion::V27);
    assert_eq!(
        out.errors(),
        ["from __future__ imports must occur at the beginning of the file"]
    );
}

#[test]
fn docstring_may_precede_future_imports() {
    let source = "'''module doc'''\nfrom __future__ import division\n";
    let out = parse_ok(source, PythonVersion::V27);
    assert!(out.parsed.future.contains(FutureOptions::TRUE_DIVISION));
}

#[test]
fn unknown_future_features() {
    let out = parse("from __future__ import quantum\n", PythonVersion::V27);
    assert_eq!(out.errors(), ["future feature is not defined: quantum"]);

    let out = parse("from __future__ import braces\n", PythonVersion::V27);
    assert_eq!(out.errors(), ["not a chance"]);
}

#[test]
fn future_star_import_rejected() {
    let out = parse("from __future__ import *\n", PythonVersion::V27);
    assert_eq!(out.errors(), ["future statement does not support import *"]);
}

#[test]
fn exec_statement() {
    let out = parse_ok("exec code in g, l\n", PythonVersion::V27);
    let StmtKind::Exec {
        globals, locals, ..
    } = out.stmt(0)
    else {
        panic!("expected exec");
    };
    assert!(globals.is_some());
    assert!(locals.is_some());
}

#[test]
fn del_targets() {
    let out = parse_ok("del x, y[0]\n", PythonVersion::V37);
    let StmtKind::Del { targets } = out.stmt(0) else {
        panic!("expected del");
    };
    assert_eq!(targets.len, 2);

    let out = parse("del 1\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["can't delete literal"]);
}

#[test]
fn assert_with_message() {
    let out = parse_ok("assert x, 'failed'\n", PythonVersion::V37);
    let StmtKind::Assert { msg, .. } = out.stmt(0) else {
        panic!("expected assert");
    };
    assert!(msg.is_some());
}

#[test]
fn raise_forms() {
    let out = parse_ok("raise E() from cause\n", PythonVersion::V37);
    let StmtKind::Raise { exc, cause, .. } = out.stmt(0) else {
        panic!("expected raise");
    };
    assert!(exc.is_some());
    assert!(cause.is_some());

    let out = parse_ok("raise E, v, tb\n", PythonVersion::V27);
    let StmtKind::Raise {
        value, traceback, ..
    } = out.stmt(0)
    else {
        panic!("expected raise");
    };
    assert!(value.is_some());
    assert!(traceback.is_some());
}

#[test]
fn chained_assignment() {
    let out = parse_ok("a = b = 1\n", PythonVersion::V37);
    let StmtKind::Assign { targets, value } = out.stmt(0) else {
        panic!("expected assignment");
    };
    assert_eq!(targets.len, 2);
    assert!(matches!(out.expr(*value), ExprKind::Constant(_)));
}

#[test]
fn augmented_assignment() {
    let out = parse_ok("x += 1\n", PythonVersion::V37);
    let StmtKind::AugAssign { op, .. } = out.stmt(0) else {
        panic!("expected augmented assignment");
    };
    assert_eq!(*op, BinaryOp::Add);

    let out = parse("x + y += 1\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["illegal expression for augmented assignment"]);
}

#[test]
fn assigning_to_a_literal() {
    let out = parse("1 = x\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["can't assign to literal"]);
}

#[test]
fn semicolons_make_a_suite() {
    let out = parse_ok("x = 1; y = 2\n", PythonVersion::V37);
    assert_eq!(out.body().len(), 1);
    let StmtKind::Suite { body } = out.stmt(0) else {
        panic!("expected suite");
    };
    assert_eq!(body.len, 2);
}

#[test]
fn recovery_leaves_an_error_node_and_continues() {
    let out = parse("def )\ny = 2\n", PythonVersion::V37);
    assert!(out.sink.has_errors());
    assert_eq!(out.body().len(), 2);
    assert!(matches!(out.stmt(0), StmtKind::FuncDef { .. }));
    assert!(matches!(out.stmt(1), StmtKind::Assign { .. }));
}

#[test]
fn garbage_line_is_skipped_to_the_next_statement() {
    let out = parse("x = 1 )\ny = 2\n", PythonVersion::V37);
    assert!(out.sink.has_errors());
    assert_eq!(out.body().len(), 2);
    let StmtKind::Error { preceding } = out.stmt(0) else {
        panic!("expected error node");
    };
    assert_eq!(preceding.len, 1);
    assert!(matches!(out.stmt(1), StmtKind::Assign { .. }));
}

#[test]
fn unexpected_indent_reported_and_skipped() {
    let out = parse("x = 1\n    y = 2\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["unexpected indent"]);
    assert_eq!(out.body().len(), 2);
}

#[test]
fn missing_indented_block() {
    let out = parse("if x:\ny = 2\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["expected an indented block"]);
    assert!(matches!(out.stmt(1), StmtKind::Assign { .. }));
}

#[test]
fn verbatim_mode_records_preceding_whitespace() {
    let options = ParserOptions::new(PythonVersion::V37).verbatim(true);
    let out = parse_with("# note\n\nx = 1\n", options);
    assert!(!out.sink.has_errors());
    let attributes = out.parsed.attributes.as_ref().unwrap();
    let preceding = attributes.preceding(out.body()[0]).unwrap();
    assert!(preceding.contains("# note"));
    assert!(preceding.contains("\n\n") || preceding.matches('\n').count() >= 2);
}

#[test]
fn verbatim_metadata_reconstructs_the_source() {
    // Preceding whitespace plus statement spans plus trailing
    // whitespace must account for every byte, comments, blank lines
    // and CRLF endings included.
    let source = "# header\r\n\r\nx = 1  # trailing\r\nif x:\r\n    y = 2\r\n\r\nz = 3\r\n";
    let options = ParserOptions::new(PythonVersion::V37).verbatim(true);
    let out = parse_with(source, options);
    assert!(!out.sink.has_errors());
    let attributes = out.parsed.attributes.as_ref().unwrap();
    let mut rebuilt = String::new();
    for &stmt in out.body() {
        rebuilt.push_str(attributes.preceding(stmt).unwrap_or(""));
        rebuilt.push_str(&source[out.parsed.arena.stmt(stmt).span.to_range()]);
    }
    rebuilt.push_str(attributes.trailing());
    assert_eq!(rebuilt, source);
}

#[test]
fn verbatim_marks_parenthesized_import_lists() {
    let options = ParserOptions::new(PythonVersion::V37).verbatim(true);
    let out = parse_with("from os import (path, sep)\nfrom os import curdir\n", options);
    assert!(!out.sink.has_errors());
    let attributes = out.parsed.attributes.as_ref().unwrap();
    assert!(attributes.alt_form(out.body()[0]));
    assert!(!attributes.alt_form(out.body()[1]));
}

#[test]
fn verbatim_marks_unclosed_displays() {
    let options = ParserOptions::new(PythonVersion::V37).verbatim(true);
    let out = parse_with("x = [1, 2\n", options);
    assert!(out.sink.has_errors());
    let StmtKind::Assign { value, .. } = out.stmt(0) else {
        panic!("expected assignment, got {:?}", out.stmt(0));
    };
    let attributes = out.parsed.attributes.as_ref().unwrap();
    assert!(attributes.missing_terminator(*value));
}

#[test]
fn inline_suites() {
    let out = parse_ok("if x: y = 1; z = 2\n", PythonVersion::V37);
    let StmtKind::If { branches, .. } = out.stmt(0) else {
        panic!("expected if");
    };
    let clause = &out.parsed.arena.if_clauses(*branches)[0];
    let body = out.suite(clause.body);
    assert_eq!(body.len(), 2);
}

#[test]
fn stub_files_always_use_the_newest_grammar() {
    // The version says 2.7, but annotations and matrix multiply parse
    // anyway because stub files get the newest grammar.
    let options = ParserOptions::new(PythonVersion::V27).stub_file(true);
    let out = parse_with("def f(x: int) -> int:\n    return x @ x\n", options);
    assert!(out.errors().is_empty(), "{:?}", out.errors());
}

#[test]
fn private_prefix_option_mangles_top_level_names() {
    let options = ParserOptions::new(PythonVersion::V37).private_prefix("Outer");
    let out = parse_with("__secret = 1\n", options);
    assert!(out.errors().is_empty());
    let StmtKind::Assign { targets, .. } = out.stmt(0) else {
        panic!("expected assignment");
    };
    let target = out.parsed.arena.expr_list(*targets)[0];
    let ExprKind::Name(name) = out.expr(target) else {
        panic!("expected name");
    };
    assert_eq!(out.text(*name), "_Outer__secret");
}

#[test]
fn comment_callback_fires_per_comment() {
    use pylon_diagnostic::CollectingSink;
    use pylon_ir::SharedInterner;
    use pylon_lexer_core::SourceBuffer;

    use crate::Parser;

    let buffer = SourceBuffer::new("x = 1  # keep\ny = 2  # drop\n");
    let interner = SharedInterner::new();
    let mut sink = CollectingSink::new();
    let mut seen = Vec::new();
    let options = ParserOptions::new(PythonVersion::V37);
    let mut parser = Parser::new(&buffer, interner, options, &mut sink);
    parser.set_comment_callback(Box::new(|_, text| seen.push(text.to_owned())));
    let parsed = parser.parse();
    assert_eq!(parsed.body().len(), 2);
    assert_eq!(seen, vec![" keep", " drop"]);
}

#[test]
fn simple_assignment_parses_cleanly() {
    let out = parse_ok("x = 1 + 2\n", PythonVersion::V37);
    let StmtKind::Assign { targets, value } = out.stmt(0) else {
        panic!("expected assignment");
    };
    let target = out.parsed.arena.expr_list(*targets)[0];
    assert!(matches!(out.expr(target), ExprKind::Name(_)));
    assert!(matches!(
        out.expr(*value),
        ExprKind::BinOp { op: BinaryOp::Add, .. }
    ));
}

#[test]
fn minimal_if_block() {
    let out = parse_ok("if x:\n    y\n", PythonVersion::V37);
    let StmtKind::If { branches, orelse } = out.stmt(0) else {
        panic!("expected if");
    };
    assert_eq!(branches.len, 1);
    assert!(orelse.is_none());
}
