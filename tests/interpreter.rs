mod common;

use common::{run_err, run_ok};

// ───────────────────────── arithmetic & values ─────────────────────────

#[test]
fn numeric_addition() {
    assert_eq!(run_ok("print 1 + 2;"), "3\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok("print \"a\" + \"b\";"), "ab\n");
}

#[test]
fn mixed_plus_is_a_type_error() {
    let error = run_err("print 1 + \"a\";");

    assert_eq!(
        error,
        "[line 1] Error at '+': Operands must be two numbers or two strings."
    );
}

#[test]
fn division_by_zero_is_distinct_from_a_type_error() {
    let by_zero = run_err("print 1 / 0;");
    assert!(by_zero.contains("Cannot divide by zero."));

    let type_error = run_err("print 1 / \"a\";");
    assert!(type_error.contains("Operands must be numbers."));

    assert_ne!(by_zero, type_error);
}

#[test]
fn unary_minus_requires_a_number() {
    assert_eq!(run_ok("print -(3);"), "-3\n");

    let error = run_err("print -\"a\";");
    assert!(error.contains("Operand must be a number."));
}

#[test]
fn comparison_operators() {
    assert_eq!(run_ok("print 1 < 2; print 2 <= 2; print 3 > 4;"), "true\ntrue\nfalse\n");
}

#[test]
fn equality_semantics() {
    assert_eq!(run_ok("print nil == nil;"), "true\n");
    assert_eq!(run_ok("print nil == 0;"), "false\n");
    assert_eq!(run_ok("print 1 == 1; print \"a\" == \"a\";"), "true\ntrue\n");
    assert_eq!(run_ok("print 1 == \"1\";"), "false\n");
    assert_eq!(run_ok("print 1 != 2;"), "true\n");
}

#[test]
fn number_display_drops_integral_fraction() {
    assert_eq!(run_ok("print 4 / 2; print 5 / 2;"), "2\n2.5\n");
}

// ───────────────────────── truthiness & logic ─────────────────────────

#[test]
fn zero_and_empty_string_are_truthy() {
    assert_eq!(run_ok("if (0) print \"yes\"; if (\"\") print \"also\";"), "yes\nalso\n");
}

#[test]
fn nil_and_false_are_falsy() {
    assert_eq!(run_ok("print !nil; print !false; print !0;"), "true\ntrue\nfalse\n");
}

#[test]
fn logical_operators_return_the_deciding_operand() {
    assert_eq!(run_ok("print \"hi\" or 2;"), "hi\n");
    assert_eq!(run_ok("print nil or \"fallback\";"), "fallback\n");
    assert_eq!(run_ok("print nil and 1;"), "nil\n");
    assert_eq!(run_ok("print 1 and 2;"), "2\n");
}

#[test]
fn logical_operators_short_circuit_side_effects() {
    let output = run_ok(
        r#"fun loud() {
    print "evaluated";
    return true;
}
var x = false and loud();
var y = true or loud();
print x;
print y;
"#,
    );

    assert_eq!(output, "false\ntrue\n");
}

// ───────────────────────── variables & scope ─────────────────────────

#[test]
fn shadowing_prints_inner_then_outer() {
    assert_eq!(
        run_ok("var a = 1; { var a = 2; print a; } print a;"),
        "2\n1\n"
    );
}

#[test]
fn uninitialized_variables_are_nil() {
    assert_eq!(run_ok("var a; print a;"), "nil\n");
}

#[test]
fn assignment_is_an_expression_yielding_the_value() {
    assert_eq!(run_ok("var a = 1; print a = 7;"), "7\n");
}

#[test]
fn undefined_variable_read_is_a_runtime_error() {
    let error = run_err("print ghost;");

    assert_eq!(error, "[line 1] Error at 'ghost': Undefined variable 'ghost'.");
}

#[test]
fn undefined_variable_assignment_is_a_runtime_error() {
    let error = run_err("ghost = 1;");

    assert!(error.contains("Undefined variable 'ghost'."));
}

#[test]
fn globals_may_be_referenced_before_definition_inside_functions() {
    // `later` does not exist when `f` is declared, only when it is called.
    let output = run_ok(
        r#"fun f() {
    print later;
}
var later = "bound late";
f();
"#,
    );

    assert_eq!(output, "bound late\n");
}

// ───────────────────────── control flow ─────────────────────────

#[test]
fn if_else_branches() {
    assert_eq!(
        run_ok("if (1 < 2) print \"then\"; else print \"else\";"),
        "then\n"
    );
    assert_eq!(
        run_ok("if (1 > 2) print \"then\"; else print \"else\";"),
        "else\n"
    );
}

#[test]
fn while_loop_accumulates() {
    let output = run_ok(
        r#"var sum = 0;
var i = 1;
while (i <= 4) {
    sum = sum + i;
    i = i + 1;
}
print sum;
"#,
    );

    assert_eq!(output, "10\n");
}

#[test]
fn for_loop_runs_as_desugared_while() {
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

// ───────────────────────── functions & closures ─────────────────────────

#[test]
fn closures_capture_by_reference_not_by_copy() {
    let output = run_ok(
        r#"var x = 1;
fun f() {
    print x;
}
x = 2;
f();
"#,
    );

    assert_eq!(output, "2\n");
}

#[test]
fn function_returns_nil_without_an_explicit_return() {
    assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
}

#[test]
fn return_unwinds_out_of_nested_blocks_and_loops() {
    let output = run_ok(
        r#"fun firstOver(limit) {
    var i = 0;
    while (true) {
        if (i > limit) {
            return i;
        }
        i = i + 1;
    }
}
print firstOver(3);
"#,
    );

    assert_eq!(output, "4\n");
}

#[test]
fn recursion_works() {
    let output = run_ok(
        r#"fun fib(n) {
    if (n < 2) return n;
    return fib(n - 2) + fib(n - 1);
}
print fib(10);
"#,
    );

    assert_eq!(output, "55\n");
}

#[test]
fn arity_mismatch_fails_before_the_body_runs() {
    let error = run_err(
        r#"fun f(a, b) {
    print "should not run";
}
f(1);
"#,
    );

    assert!(error.contains("Expected 2 arguments but got 1."));
    // run_err would have panicked on success; the body printing nothing is
    // implied by the error taking the place of any output.
}

#[test]
fn calling_a_non_callable_is_a_type_error() {
    let error = run_err("var x = 1; x();");

    assert!(error.contains("Can only call functions and classes."));
}

#[test]
fn functions_are_first_class_values() {
    let output = run_ok(
        r#"fun twice(f, x) {
    return f(f(x));
}
fun inc(n) {
    return n + 1;
}
print twice(inc, 5);
print inc;
"#,
    );

    assert_eq!(output, "7\n<fn inc>\n");
}

#[test]
fn native_clock_returns_a_number_and_checks_arity() {
    assert_eq!(run_ok("print clock() >= 0;"), "true\n");
    assert_eq!(run_ok("print clock;"), "<native fn clock>\n");

    let error = run_err("clock(1);");
    assert!(error.contains("Expected 0 arguments but got 1."));
}

// ───────────────────────── classes & instances ─────────────────────────

#[test]
fn class_and_instance_display() {
    assert_eq!(
        run_ok("class Box {} print Box; print Box();"),
        "Box\nBox instance\n"
    );
}

#[test]
fn fields_live_per_instance() {
    let output = run_ok(
        r#"class Box {
    label() {
        return this.name;
    }
}
var a = Box();
var b = Box();
a.name = "first";
print a.label();
"#,
    );

    assert_eq!(output, "first\n");

    // Same program, but reading through the instance that was never set.
    let error = run_err(
        r#"class Box {
    label() {
        return this.name;
    }
}
var a = Box();
var b = Box();
a.name = "first";
print b.label();
"#,
    );

    assert!(error.contains("Undefined property 'name'."));
}

#[test]
fn set_writes_fields_and_yields_the_value() {
    assert_eq!(
        run_ok("class C {} var c = C(); print c.x = 3; print c.x;"),
        "3\n3\n"
    );
}

#[test]
fn methods_bind_this_at_access_time() {
    let output = run_ok(
        r#"class Greeter {
    greet() {
        print "hello, " + this.name;
    }
}
var g = Greeter();
g.name = "world";
var method = g.greet;
method();
"#,
    );

    assert_eq!(output, "hello, world\n");
}

#[test]
fn fields_shadow_methods() {
    let output = run_ok(
        r#"class C {
    speak() {
        return "method";
    }
}
var c = C();
print c.speak();
c.speak = clock;
print c.speak;
"#,
    );

    assert_eq!(output, "method\n<native fn clock>\n");
}

#[test]
fn property_access_on_non_instances_is_an_error() {
    let error = run_err("var x = 1; print x.field;");
    assert!(error.contains("Only instances have properties."));

    let error = run_err("var x = 1; x.field = 2;");
    assert!(error.contains("Only instances have fields."));
}

#[test]
fn class_name_is_visible_inside_its_own_methods() {
    let output = run_ok(
        r#"class Factory {
    spawn() {
        return Factory();
    }
}
print Factory().spawn();
"#,
    );

    assert_eq!(output, "Factory instance\n");
}

#[test]
fn class_call_takes_no_arguments() {
    let error = run_err("class C {} C(1);");

    assert!(error.contains("Expected 0 arguments but got 1."));
}

#[test]
fn instance_equality_is_identity() {
    let output = run_ok(
        r#"class C {}
var a = C();
var b = C();
var alias = a;
print a == b;
print a == alias;
"#,
    );

    assert_eq!(output, "false\ntrue\n");
}

// ───────────────────────── error reporting ─────────────────────────

#[test]
fn runtime_errors_carry_line_and_lexeme_context() {
    let error = run_err("var a = 1;\nvar b = 2;\nprint a + \"x\";");

    assert_eq!(
        error,
        "[line 3] Error at '+': Operands must be two numbers or two strings."
    );
}

#[test]
fn nil_operand_in_addition_is_a_type_error() {
    let error = run_err("print \"before\"; print 1 + nil;");

    assert!(error.contains("Operands must be two numbers or two strings."));
}
