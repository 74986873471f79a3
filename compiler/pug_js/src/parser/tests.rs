use super::*;
use pretty_assertions::assert_eq;

fn parse(src: &str) -> Expr {
    match Parser::new(src).and_then(|mut p| p.parse_complete()) {
        Ok(expr) => expr,
        Err(err) => panic!("{src:?} failed to parse: {err}"),
    }
}

fn parse_err(src: &str) -> SyntaxError {
    match Parser::new(src).and_then(|mut p| p.parse_complete()) {
        Ok(expr) => panic!("{src:?} parsed as {expr:?}"),
        Err(err) => err,
    }
}

fn ident(name: &str) -> Box<Expr> {
    Box::new(Expr::Ident(name.to_string()))
}

#[test]
fn precedence() {
    assert_eq!(
        parse("a + b * c"),
        Expr::Binary {
            op: BinaryOp::Add,
            left: ident("a"),
            right: Box::new(Expr::Binary {
                op: BinaryOp::Mul,
                left: ident("b"),
                right: ident("c"),
            }),
        }
    );
}

#[test]
fn exponent_is_right_associative() {
    assert_eq!(
        parse("a ** b ** c"),
        Expr::Binary {
            op: BinaryOp::Exp,
            left: ident("a"),
            right: Box::new(Expr::Binary {
                op: BinaryOp::Exp,
                left: ident("b"),
                right: ident("c"),
            }),
        }
    );
}

#[test]
fn unary_before_exponent_is_rejected() {
    assert_eq!(parse_err("-a ** 2").message, "Unexpected token");
    parse("(-a) ** 2");
    parse("2 ** -a");
}

#[test]
fn member_and_call_chains() {
    assert_eq!(
        parse("a.b[c](d)"),
        Expr::Call {
            callee: Box::new(Expr::Member {
                object: Box::new(Expr::Member {
                    object: ident("a"),
                    property: MemberProperty::Ident("b".to_string()),
                    optional: false,
                }),
                property: MemberProperty::Computed(ident("c")),
                optional: false,
            }),
            args: vec![Argument::Expr(Expr::Ident("d".to_string()))],
            optional: false,
        }
    );
}

#[test]
fn keywords_are_valid_member_names() {
    parse("a.class.if.new");
    parse("{ if: 1, class: 2 }");
}

#[test]
fn optional_chaining() {
    assert!(matches!(parse("a?.b"), Expr::Member { optional: true, .. }));
    assert!(matches!(parse("a?.(b)"), Expr::Call { optional: true, .. }));
    assert!(matches!(parse("a?.[0]"), Expr::Member { optional: true, .. }));
    assert!(matches!(parse("a?.5:1"), Expr::Conditional { .. }));
    assert_eq!(
        parse_err("a?.b = 1").message,
        "Optional chaining cannot appear in left-hand side"
    );
}

#[test]
fn literals() {
    assert_eq!(parse("'x'"), Expr::String("x".to_string()));
    assert_eq!(parse("0x10"), Expr::Number(16.0));
    assert_eq!(parse("null"), Expr::Null);
    assert_eq!(parse("true"), Expr::Bool(true));
    assert_eq!(parse("10n"), Expr::Opaque("bigint"));
    assert_eq!(
        parse("/a+/g"),
        Expr::Regex {
            pattern: "a+".to_string(),
            flags: "g".to_string(),
        }
    );
}

#[test]
fn regex_versus_division() {
    assert!(matches!(
        parse("a / b / c"),
        Expr::Binary {
            op: BinaryOp::Div,
            ..
        }
    ));
    assert!(matches!(parse("x = /=/"), Expr::Assign { .. }));
}

#[test]
fn template_literals() {
    assert_eq!(
        parse("`a${b}c`"),
        Expr::Template {
            quasis: vec!["a".to_string(), "c".to_string()],
            exprs: vec![Expr::Ident("b".to_string())],
        }
    );
    parse("`${ {a: 1}.a }`");
    parse("`${`${x}`}`");
    assert_eq!(parse("tag`x`"), Expr::Opaque("tagged template"));
}

#[test]
fn arrays_with_holes_and_spread() {
    assert_eq!(
        parse("[, a, ...b,]"),
        Expr::Array(vec![
            ArrayElement::Hole,
            ArrayElement::Expr(Expr::Ident("a".to_string())),
            ArrayElement::Spread(Expr::Ident("b".to_string())),
        ])
    );
}

#[test]
fn object_literals() {
    assert_eq!(
        parse("{a: 1, 'b': 2, [c]: 3, d, ...e, f() {}, get g() { return 1 }}"),
        Expr::Object(vec![
            Property::Init {
                key: PropertyKey::Ident("a".to_string()),
                value: Expr::Number(1.0),
            },
            Property::Init {
                key: PropertyKey::String("b".to_string()),
                value: Expr::Number(2.0),
            },
            Property::Init {
                key: PropertyKey::Computed(ident("c")),
                value: Expr::Number(3.0),
            },
            Property::Shorthand("d".to_string()),
            Property::Spread(Expr::Ident("e".to_string())),
            Property::Method,
            Property::Method,
        ])
    );
    parse("{get: 1, set: 2, async: 3}");
    parse("{async *gen() {}}");
}

#[test]
fn shorthand_initializer_only_in_patterns() {
    parse("({a = 1} = b)");
    parse("[{a = 1}] = b");
    parse("({a = 1}) => a");
    assert_eq!(
        parse_err("({a = 1})").message,
        "Shorthand property assignments are valid only in destructuring patterns"
    );
    assert!(Parser::new("f({a = 1})")
        .and_then(|mut p| p.parse_complete())
        .is_err());
    assert!(Parser::new("[{a = 1}.b] = c")
        .and_then(|mut p| p.parse_complete())
        .is_err());
}

#[test]
fn arrow_functions() {
    assert_eq!(parse("x => x + 1"), Expr::Opaque("arrow function"));
    assert_eq!(parse("(a, b) => { return a }"), Expr::Opaque("arrow function"));
    parse("() => 1");
    parse("(a = 1, ...rest) => rest");
    parse("({a, b: [c]}) => c");
    parse("async x => x");
    parse("async (x) => x");
    parse("list.map(item => item.name)");
    assert_eq!(parse_err("(a, a) => 1").message, "Argument name clash");
    assert!(Parser::new("(a.b) => 1")
        .and_then(|mut p| p.parse_complete())
        .is_err());
    assert!(Parser::new("x => {} + 1")
        .and_then(|mut p| p.parse_complete())
        .is_err());
}

#[test]
fn async_as_identifier() {
    assert!(matches!(parse("async(1)"), Expr::Call { .. }));
    assert_eq!(parse("async"), Expr::Ident("async".to_string()));
}

#[test]
fn empty_parens_need_an_arrow() {
    assert_eq!(parse_err("()").message, "Unexpected token");
    assert!(Parser::new("(a,)")
        .and_then(|mut p| p.parse_complete())
        .is_err());
}

#[test]
fn functions_and_classes_are_opaque() {
    assert_eq!(parse("function () { return '}' }"), Expr::Opaque("function"));
    assert_eq!(parse("function* gen(a, b) {}"), Expr::Opaque("function"));
    assert_eq!(parse("class A extends B.c { m() {} }"), Expr::Opaque("class"));
    assert_eq!(parse("new Foo(1, 2)"), Expr::Opaque("new"));
    assert_eq!(parse("new Foo"), Expr::Opaque("new"));
    assert!(matches!(parse("new Foo().bar"), Expr::Member { .. }));
}

#[test]
fn assignment_targets() {
    parse("a = 1");
    parse("a.b += 1");
    parse("a[0]++");
    parse("--a");
    parse("[a, b] = [b, a]");
    assert_eq!(parse_err("1 = a").message, "Assigning to rvalue");
    assert_eq!(parse_err("a + b += 1").message, "Assigning to rvalue");
    assert_eq!(parse_err("f()++").message, "Assigning to rvalue");
}

#[test]
fn reserved_words() {
    assert_eq!(parse_err("if").message, "Unexpected keyword 'if'");
    assert_eq!(parse_err("a + var").message, "Unexpected keyword 'var'");
    assert_eq!(parse_err("enum").message, "The keyword 'enum' is reserved");
    assert_eq!(
        parse_err("super.x").message,
        "'super' keyword outside a method"
    );
    parse("let + yield");
}

#[test]
fn await_operator() {
    assert!(matches!(
        parse("await foo()"),
        Expr::Unary {
            op: UnaryOp::Await,
            ..
        }
    ));
    assert_eq!(parse("await"), Expr::Ident("await".to_string()));
}

#[test]
fn mixing_nullish_with_logical_needs_parens() {
    assert!(parse_err("a ?? b || c").message.starts_with("Logical expressions"));
    assert!(parse_err("a && b ?? c").message.starts_with("Logical expressions"));
    parse("(a && b) ?? c");
    parse("a ?? b ?? c");
}

#[test]
fn sequence_and_conditional() {
    assert!(matches!(parse("a, b, c"), Expr::Sequence(items) if items.len() == 3));
    assert!(matches!(parse("a ? b : c ? d : e"), Expr::Conditional { .. }));
    assert!(matches!(parse("a in b"), Expr::Binary { op: BinaryOp::In, .. }));
}

#[test]
fn dynamic_import() {
    assert_eq!(parse("import('./x')"), Expr::Opaque("import"));
    assert!(Parser::new("import.meta")
        .and_then(|mut p| p.parse_complete())
        .is_err());
}

#[test]
fn trailing_input_is_an_error() {
    let err = parse_err("a b");
    assert_eq!(err.message, "Unexpected token");
    assert_eq!((err.line, err.column, err.offset), (1, 2, 2));
    parse("a /* trailing */  ");
}

#[test]
fn error_positions_count_lines() {
    let err = parse_err("a +\n  +\n  )");
    assert_eq!((err.line, err.column), (3, 2));
}

#[test]
fn private_names_outside_classes() {
    assert_eq!(
        parse_err("this.#x").message,
        "Private field '#x' must be declared in an enclosing class"
    );
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let mut expr = parse(&src);
    let mut seen = 0;
    while let Expr::Paren(inner) = expr {
        expr = *inner;
        seen += 1;
    }
    assert_eq!(seen, depth);
}
