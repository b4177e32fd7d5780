use pretty_assertions::assert_eq;
use pylon_ir::{
    ArgKind, BinaryOp, BoolOp, CmpOp, Constant, ExprKind, ParamKind, PythonVersion, StmtKind,
};

use super::{parse, parse_ok, Outcome};

fn value_of_assign(out: &Outcome, index: usize) -> pylon_ir::ExprId {
    match out.stmt(index) {
        StmtKind::Assign { value, .. } => *value,
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let out = parse_ok("x = 1 + 2 * 3\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::BinOp {
        op: BinaryOp::Add,
        left,
        right,
    } = out.expr(value)
    else {
        panic!("expected addition at the top");
    };
    assert!(matches!(
        out.expr(*left),
        ExprKind::Constant(Constant::Int(1))
    ));
    assert!(matches!(
        out.expr(*right),
        ExprKind::BinOp {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn power_is_right_associative() {
    let out = parse_ok("x = 2 ** 3 ** 2\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::BinOp {
        op: BinaryOp::Pow,
        left,
        right,
    } = out.expr(value)
    else {
        panic!("expected power at the top");
    };
    assert!(matches!(
        out.expr(*left),
        ExprKind::Constant(Constant::Int(2))
    ));
    assert!(matches!(
        out.expr(*right),
        ExprKind::BinOp {
            op: BinaryOp::Pow,
            ..
        }
    ));
}

#[test]
fn unary_minus_applies_to_whole_power() {
    // -2 ** 2 is -(2 ** 2)
    let out = parse_ok("x = -2 ** 2\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::UnaryOp { operand, .. } = out.expr(value) else {
        panic!("expected unary at the top");
    };
    assert!(matches!(
        out.expr(*operand),
        ExprKind::BinOp {
            op: BinaryOp::Pow,
            ..
        }
    ));
}

#[test]
fn matmul_gated_on_version() {
    let out = parse_ok("x = a @ b\n", PythonVersion::V35);
    let value = value_of_assign(&out, 0);
    assert!(matches!(
        out.expr(value),
        ExprKind::BinOp {
            op: BinaryOp::MatMul,
            ..
        }
    ));
}

#[test]
fn chained_comparison_is_one_node() {
    let out = parse_ok("x = a < b <= c\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::Compare { comparators, .. } = out.expr(value) else {
        panic!("expected comparison");
    };
    let links = out.parsed.arena.comparators(*comparators);
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].op, CmpOp::Lt);
    assert_eq!(links[1].op, CmpOp::LtEq);
}

#[test]
fn two_word_comparison_operators() {
    let out = parse_ok("x = a is not b not in c\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::Compare { comparators, .. } = out.expr(value) else {
        panic!("expected comparison");
    };
    let links = out.parsed.arena.comparators(*comparators);
    assert_eq!(links[0].op, CmpOp::IsNot);
    assert_eq!(links[1].op, CmpOp::NotIn);
}

#[test]
fn diamond_operator_is_2x_only() {
    let out = parse_ok("x = a <> b\n", PythonVersion::V27);
    let value = value_of_assign(&out, 0);
    let ExprKind::Compare { comparators, .. } = out.expr(value) else {
        panic!("expected comparison");
    };
    assert_eq!(out.parsed.arena.comparators(*comparators)[0].op, CmpOp::NotEq);
}

#[test]
fn boolean_chain_collapses_into_one_node() {
    let out = parse_ok("x = a or b or c\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::BoolOp {
        op: BoolOp::Or,
        values,
    } = out.expr(value)
    else {
        panic!("expected boolop");
    };
    assert_eq!(values.len, 3);
}

#[test]
fn not_has_its_own_level() {
    let out = parse_ok("x = not a == b\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    // `not` applies to the whole comparison.
    let ExprKind::UnaryOp { operand, .. } = out.expr(value) else {
        panic!("expected unary not");
    };
    assert!(matches!(out.expr(*operand), ExprKind::Compare { .. }));
}

#[test]
fn conditional_expression() {
    let out = parse_ok("x = a if b else c\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    assert!(matches!(out.expr(value), ExprKind::IfExp { .. }));
}

#[test]
fn conditional_expression_rejected_on_24() {
    let out = parse("x = a if b else c\n", PythonVersion::V24);
    assert_eq!(out.errors(), ["unexpected token 'if'"]);
}

#[test]
fn lambda_with_defaults() {
    let out = parse_ok("f = lambda a, b=1: a\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::Lambda { params, .. } = out.expr(value) else {
        panic!("expected lambda");
    };
    let params = out.parsed.arena.params(*params);
    assert_eq!(params.len(), 2);
    assert!(params[0].default.is_none());
    assert!(params[1].default.is_some());
    assert_eq!(params[0].kind, ParamKind::Normal);
}

#[test]
fn call_argument_kinds() {
    let out = parse_ok("f(1, x=2, *a, **k)\n", PythonVersion::V37);
    let value = out.expr_stmt(0);
    let ExprKind::Call { args, .. } = out.expr(value) else {
        panic!("expected call");
    };
    let args = out.parsed.arena.args(*args);
    assert_eq!(args.len(), 4);
    assert_eq!(args[0].kind, ArgKind::Positional);
    assert!(matches!(args[1].kind, ArgKind::Keyword(_)));
    assert_eq!(args[2].kind, ArgKind::Star);
    assert_eq!(args[3].kind, ArgKind::DoubleStar);
}

#[test]
fn repeated_keyword_argument() {
    let out = parse("f(x=1, x=2)\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["keyword argument repeated"]);
}

#[test]
fn positional_after_keyword_argument() {
    let out = parse("f(x=1, 2)\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["non-keyword arg after keyword arg"]);
}

#[test]
fn sole_generator_argument_needs_no_parens() {
    let out = parse_ok("f(x for x in y)\n", PythonVersion::V37);
    let value = out.expr_stmt(0);
    let ExprKind::Call { args, .. } = out.expr(value) else {
        panic!("expected call");
    };
    let args = out.parsed.arena.args(*args);
    assert_eq!(args.len(), 1);
    assert!(matches!(
        out.expr(args[0].value),
        ExprKind::Generator { .. }
    ));
}

#[test]
fn generator_argument_must_be_sole() {
    let out = parse("f(1, x for x in y)\n", PythonVersion::V37);
    assert_eq!(
        out.errors(),
        ["Generator expression must be parenthesized if not sole argument"]
    );
}

#[test]
fn slice_forms() {
    let out = parse_ok("a[1:2:3]\nb[:]\nc[1:]\n", PythonVersion::V37);
    let first = out.expr_stmt(0);
    let ExprKind::Subscript { index, .. } = out.expr(first) else {
        panic!("expected subscript");
    };
    let ExprKind::Slice { lower, upper, step } = out.expr(*index) else {
        panic!("expected slice");
    };
    assert!(lower.is_some() && upper.is_some() && step.is_some());

    let second = out.expr_stmt(1);
    let ExprKind::Subscript { index, .. } = out.expr(second) else {
        panic!("expected subscript");
    };
    let ExprKind::Slice { lower, upper, step } = out.expr(*index) else {
        panic!("expected slice");
    };
    assert!(lower.is_none() && upper.is_none() && step.is_none());

    let third = out.expr_stmt(2);
    let ExprKind::Subscript { index, .. } = out.expr(third) else {
        panic!("expected subscript");
    };
    let ExprKind::Slice { lower, upper, .. } = out.expr(*index) else {
        panic!("expected slice");
    };
    assert!(lower.is_some() && upper.is_none());
}

#[test]
fn extended_slice_is_a_tuple_index() {
    let out = parse_ok("a[1:2, 3]\n", PythonVersion::V37);
    let value = out.expr_stmt(0);
    let ExprKind::Subscript { index, .. } = out.expr(value) else {
        panic!("expected subscript");
    };
    let ExprKind::Tuple { elts } = out.expr(*index) else {
        panic!("expected tuple index");
    };
    let elts = out.parsed.arena.expr_list(*elts);
    assert_eq!(elts.len(), 2);
    assert!(matches!(out.expr(elts[0]), ExprKind::Slice { .. }));
}

#[test]
fn attribute_chain() {
    let out = parse_ok("a.b.c\n", PythonVersion::V37);
    let value = out.expr_stmt(0);
    let ExprKind::Attribute { value: inner, attr } = out.expr(value) else {
        panic!("expected attribute");
    };
    assert_eq!(out.text(*attr), "c");
    let ExprKind::Attribute { attr, .. } = out.expr(*inner) else {
        panic!("expected attribute");
    };
    assert_eq!(out.text(*attr), "b");
}

#[test]
fn adjacent_strings_concatenate() {
    let out = parse_ok("x = 'ab' \"cd\"\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::Constant(Constant::Str(text)) = out.expr(value) else {
        panic!("expected string constant");
    };
    assert_eq!(out.text(*text), "abcd");
}

#[test]
fn adjacent_bytes_concatenate() {
    let out = parse_ok("x = b'ab' b'cd'\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::Constant(Constant::Bytes(bytes)) = out.expr(value) else {
        panic!("expected bytes constant");
    };
    assert_eq!(bytes, b"abcd");
}

#[test]
fn mixing_bytes_and_text_literals() {
    let out = parse("x = b'a' 'b'\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["cannot mix bytes and nonbytes literals"]);
}

#[test]
fn dict_display_with_unpacking() {
    let out = parse_ok("d = {1: 2, **m}\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::Dict { entries } = out.expr(value) else {
        panic!("expected dict");
    };
    let entries = out.parsed.arena.dict_entries(*entries);
    assert_eq!(entries.len(), 2);
    assert!(entries[0].key.is_some());
    assert!(entries[1].key.is_none());
}

#[test]
fn set_literals_arrive_in_27() {
    let out = parse_ok("s = {1, 2}\n", PythonVersion::V27);
    let value = value_of_assign(&out, 0);
    let ExprKind::Set { elts } = out.expr(value) else {
        panic!("expected set");
    };
    assert_eq!(elts.len, 2);

    let out = parse("s = {1, 2}\n", PythonVersion::V26);
    assert_eq!(out.errors(), ["invalid syntax"]);
}

#[test]
fn comprehension_clauses() {
    let out = parse_ok("x = [a for b in c if d if e]\n", PythonVersion::V37);
    let value = value_of_assign(&out, 0);
    let ExprKind::ListComp { clauses, .. } = out.expr(value) else {
        panic!("expected list comprehension");
    };
    assert_eq!(clauses.len, 3);
}

#[test]
fn dict_and_set_comprehensions() {
    let out = parse_ok("d = {k: v for k in x}\ns = {k for k in x}\n", PythonVersion::V37);
    assert!(matches!(
        out.expr(value_of_assign(&out, 0)),
        ExprKind::DictComp { .. }
    ));
    assert!(matches!(
        out.expr(value_of_assign(&out, 1)),
        ExprKind::SetComp { .. }
    ));
}

#[test]
fn parenthesized_forms() {
    let out = parse_ok("a = ()\nb = (1,)\nc = (1)\nd = (x for x in y)\n", PythonVersion::V37);
    let ExprKind::Tuple { elts } = out.expr(value_of_assign(&out, 0)) else {
        panic!("expected empty tuple");
    };
    assert_eq!(elts.len, 0);
    let ExprKind::Tuple { elts } = out.expr(value_of_assign(&out, 1)) else {
        panic!("expected one-element tuple");
    };
    assert_eq!(elts.len, 1);
    assert!(matches!(
        out.expr(value_of_assign(&out, 2)),
        ExprKind::Constant(Constant::Int(1))
    ));
    assert!(matches!(
        out.expr(value_of_assign(&out, 3)),
        ExprKind::Generator { .. }
    ));
}

#[test]
fn bare_tuple_with_trailing_comma() {
    let out = parse_ok("x = 1, 2,\n", PythonVersion::V37);
    let ExprKind::Tuple { elts } = out.expr(value_of_assign(&out, 0)) else {
        panic!("expected tuple");
    };
    assert_eq!(elts.len, 2);
}

#[test]
fn backquote_repr_on_2x() {
    let out = parse_ok("x = `y`\n", PythonVersion::V27);
    assert!(matches!(
        out.expr(value_of_assign(&out, 0)),
        ExprKind::Repr { .. }
    ));
}

#[test]
fn starred_assignment_target() {
    let out = parse_ok("a, *b = c\n", PythonVersion::V37);
    let StmtKind::Assign { targets, .. } = out.stmt(0) else {
        panic!("expected assignment");
    };
    let targets = out.parsed.arena.expr_list(*targets);
    let ExprKind::Tuple { elts } = out.expr(targets[0]) else {
        panic!("expected tuple target");
    };
    let elts = out.parsed.arena.expr_list(*elts);
    assert!(matches!(out.expr(elts[1]), ExprKind::Starred { .. }));

    let out = parse("a, *b = c\n", PythonVersion::V27);
    assert!(out.sink.has_errors());
}

#[test]
fn yield_outside_function() {
    let out = parse("yield 1\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["misplaced yield"]);
}

#[test]
fn yield_from_needs_33() {
    let out = parse_ok("def f():\n    yield from g()\n", PythonVersion::V33);
    assert!(!out.sink.has_errors());

    let out = parse("def f():\n    yield from g()\n", PythonVersion::V32);
    assert_eq!(out.errors(), ["unexpected token 'from'"]);
}

#[test]
fn await_outside_async_function() {
    let out = parse("def f():\n    await g()\n", PythonVersion::V37);
    assert_eq!(out.errors(), ["'await' outside async function"]);

    let out = parse_ok("async def f():\n    await g()\n", PythonVersion::V35);
    assert!(!out.sink.has_errors());
}

#[test]
fn private_names_are_mangled_in_class_bodies() {
    let source = "class Cls:\n    def m(self):\n        self.__x = __y\n";
    let out = parse_ok(source, PythonVersion::V37);
    let StmtKind::ClassDef { body, .. } = out.stmt(0) else {
        panic!("expected class");
    };
    let class_body = out.suite(*body);
    let StmtKind::FuncDef { body, .. } = out.stmt_kind(class_body[0]) else {
        panic!("expected method");
    };
    let method_body = out.suite(*body);
    let StmtKind::Assign { targets, value } = out.stmt_kind(method_body[0]) else {
        panic!("expected assignment");
    };
    let targets = out.parsed.arena.expr_list(*targets);
    let ExprKind::Attribute { attr, .. } = out.expr(targets[0]) else {
        panic!("expected attribute target");
    };
    assert_eq!(out.text(*attr), "_Cls__x");
    let ExprKind::Name(name) = out.expr(*value) else {
        panic!("expected name value");
    };
    assert_eq!(out.text(*name), "_Cls__y");
}

#[test]
fn dunder_names_are_not_mangled() {
    let source = "class Cls:\n    x = __init__\n";
    let out = parse_ok(source, PythonVersion::V37);
    let StmtKind::ClassDef { body, .. } = out.stmt(0) else {
        panic!("expected class");
    };
    let class_body = out.suite(*body);
    let StmtKind::Assign { value, .. } = out.stmt_kind(class_body[0]) else {
        panic!("expected assignment");
    };
    let ExprKind::Name(name) = out.expr(*value) else {
        panic!("expected name");
    };
    assert_eq!(out.text(*name), "__init__");
}

#[test]
fn digit_separators_are_version_gated() {
    let out = parse_ok("x = 1_000_000\n", PythonVersion::V37);
    assert!(matches!(
        out.expr(value_of_assign(&out, 0)),
        ExprKind::Constant(Constant::Int(1_000_000))
    ));
    // Before 3.6 the literal still lexes as one number, with a
    // diagnostic naming the version gate.
    let old = parse("x = 1_000_000\n", PythonVersion::V35);
    assert_eq!(
        old.errors(),
        ["underscores in numeric literals require Python 3.6 or greater"]
    );
    assert!(matches!(
        old.expr(value_of_assign(&old, 0)),
        ExprKind::Constant(Constant::Int(1_000_000))
    ));
}

#[test]
fn big_integer_literals_do_not_truncate() {
    let out = parse_ok("x = 99999999999999999999\n", PythonVersion::V37);
    let ExprKind::Constant(Constant::BigInt(value)) = out.expr(value_of_assign(&out, 0)) else {
        panic!("expected big integer");
    };
    assert_eq!(value.to_string(), "99999999999999999999");
}
