mod common;

use slang::ast::{Expr, LiteralValue, Stmt};
use slang::ast_printer::AstPrinter;
use slang::error::Diagnostics;
use slang::lexer::Lexer;
use slang::parser::Parser;

fn parse_and_print(source: &str) -> Result<String, Vec<String>> {
    let mut diags = Diagnostics::new();

    let tokens = Lexer::new(source).scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    if diags.had_error() {
        return Err(diags.errors().iter().map(|e| e.to_string()).collect());
    }

    Ok(AstPrinter::print_program(&statements))
}

/// Parse → print → parse must be a fixed point on already-canonical text.
fn assert_print_fixed_point(source: &str) {
    let first = parse_and_print(source).expect("source must parse");
    let second = parse_and_print(&first).expect("canonical output must re-parse");

    assert_eq!(first, second, "printer output is not a parse fixed point");
}

#[test]
fn precedence_binds_factor_over_term() {
    let printed = parse_and_print("1 + 2 * 3;").unwrap();

    assert_eq!(printed, "1 + 2 * 3;\n");

    // The grouping node keeps explicit parentheses intact.
    let printed = parse_and_print("(1 + 2) * 3;").unwrap();

    assert_eq!(printed, "(1 + 2) * 3;\n");
}

#[test]
fn print_parse_fixed_point_on_a_full_program() {
    assert_print_fixed_point(
        r#"var total = 0;
fun add(a, b) {
    return a + b;
}
class Counter {
    bump(n) {
        this.count = this.count + n;
        return this.count;
    }
}
var c = Counter();
c.count = 0;
while (c.count < 10 and total >= 0) {
    total = add(total, c.bump(2));
}
if (!(total == 30) or total != 30)
    print "unexpected";
else
    print total;
"#,
    );
}

#[test]
fn for_loop_desugars_to_while_in_a_block() {
    let mut diags = Diagnostics::new();
    let tokens = Lexer::new("for (var i = 0; i < 3; i = i + 1) print i;").scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    assert!(!diags.had_error());
    assert_eq!(statements.len(), 1);

    // { var i = 0; while (i < 3) { print i; i = i + 1; } }
    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected desugared block, got {:?}", statements[0]);
    };

    assert!(matches!(outer[0], Stmt::Var { .. }));

    let Stmt::While { body, .. } = &outer[1] else {
        panic!("expected while loop, got {:?}", outer[1]);
    };

    let Stmt::Block(loop_body) = body.as_ref() else {
        panic!("expected loop body block");
    };

    assert!(matches!(loop_body[0], Stmt::Print(_)));
    assert!(matches!(
        loop_body[1],
        Stmt::Expression(Expr::Assign { .. })
    ));
}

#[test]
fn for_loop_without_condition_defaults_to_true() {
    let mut diags = Diagnostics::new();
    let tokens = Lexer::new("for (;;) print 1;").scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    assert!(!diags.had_error());

    let Stmt::While { condition, .. } = &statements[0] else {
        panic!("expected bare while, got {:?}", statements[0]);
    };

    assert_eq!(*condition, Expr::Literal(LiteralValue::True));
}

#[test]
fn invalid_assignment_target_is_reported() {
    let errors = parse_and_print("1 = 2;").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Invalid assignment target."));
}

#[test]
fn invalid_assignment_target_does_not_abort_the_statement() {
    // The bad target is reported in place; the surrounding `if` (including
    // its `else` branch) still parses as one statement, with no follow-on
    // diagnostics from an orphaned `else`.
    let mut diags = Diagnostics::new();
    let tokens =
        Lexer::new("if (true) 1 = 2; else print \"e\";").scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    let errors: Vec<String> = diags.errors().iter().map(|e| e.to_string()).collect();
    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].contains("Invalid assignment target."));

    assert_eq!(statements.len(), 1);
    let Stmt::If { else_branch, .. } = &statements[0] else {
        panic!("expected if statement, got {:?}", statements[0]);
    };
    assert!(else_branch.is_some());
}

#[test]
fn assignment_is_right_associative() {
    let printed = parse_and_print("a = b = 2;").unwrap();

    assert_eq!(printed, "a = b = 2;\n");
}

#[test]
fn property_chains_parse_as_calls_and_gets() {
    assert_print_fixed_point("a.b().c(1, 2).d;\n");
}

#[test]
fn synchronize_bounds_errors_to_one_per_statement() {
    // Two broken statements, one good one in between and one after.
    let errors = parse_and_print("var 1;\nprint 7;\nvar = 3;\nprint 8;").unwrap_err();

    assert_eq!(errors.len(), 2, "got: {:?}", errors);
    assert!(errors[0].contains("Expected variable name."));
    assert!(errors[1].contains("Expected variable name."));
}

#[test]
fn statements_after_an_error_still_parse() {
    let mut diags = Diagnostics::new();
    let tokens = Lexer::new("var 1;\nprint 7;").scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    assert!(diags.had_error());
    assert_eq!(statements.len(), 1);
    assert!(matches!(statements[0], Stmt::Print(_)));
}

#[test]
fn argument_count_is_capped_at_255() {
    let args = vec!["1"; 256].join(", ");
    let source = format!("f({});", args);

    // The cap is a report, not an abort: exactly one diagnostic and the
    // call statement still parses.
    let mut diags = Diagnostics::new();
    let tokens = Lexer::new(&source).scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    let errors: Vec<String> = diags.errors().iter().map(|e| e.to_string()).collect();
    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].contains("Cannot have more than 255 arguments."));

    assert_eq!(statements.len(), 1);
    assert!(matches!(statements[0], Stmt::Expression(Expr::Call { .. })));
}

#[test]
fn parameter_count_is_capped_at_255() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let mut diags = Diagnostics::new();
    let tokens = Lexer::new(&source).scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    let errors: Vec<String> = diags.errors().iter().map(|e| e.to_string()).collect();
    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].contains("Cannot have more than 255 parameters."));

    assert_eq!(statements.len(), 1);
    assert!(matches!(statements[0], Stmt::Function { .. }));
}

#[test]
fn parse_error_at_end_of_input() {
    let errors = parse_and_print("print 1 +").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(" at end"), "got: {}", errors[0]);
}

#[test]
fn expression_ids_stay_unique_across_parsers_with_a_base() {
    let mut diags = Diagnostics::new();

    let first_tokens = Lexer::new("a; b;").scan_tokens(&mut diags);
    let mut first = Parser::new(&first_tokens, &mut diags);
    first.parse();

    let watermark = first.next_id();
    assert!(watermark >= 2);

    let second_tokens = Lexer::new("c;").scan_tokens(&mut diags);
    let mut second = Parser::with_base_id(&second_tokens, &mut diags, watermark);
    let statements = second.parse();

    assert!(!diags.had_error());

    let Stmt::Expression(Expr::Variable { id, .. }) = &statements[0] else {
        panic!("expected variable expression");
    };

    assert_eq!(*id, watermark);
}
