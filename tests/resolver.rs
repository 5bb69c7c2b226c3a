mod common;

use common::{run_ok, static_errors};

#[test]
fn duplicate_declaration_in_same_scope_is_an_error() {
    let errors = static_errors("{ var a = 1; var a = 2; }");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Already a variable with this name in this scope."));
    assert!(errors[0].contains(" at 'a'"));
}

#[test]
fn shadowing_in_a_nested_scope_is_legal() {
    let errors = static_errors("{ var a = 1; { var a = 2; } }");

    assert!(errors.is_empty(), "got: {:?}", errors);
}

#[test]
fn global_redeclaration_is_legal() {
    // The top level is not a block scope; REPL-style redefinition stands.
    let errors = static_errors("var a = 1; var a = 2;");

    assert!(errors.is_empty(), "got: {:?}", errors);
}

#[test]
fn return_outside_a_function_is_an_error() {
    let errors = static_errors("return 1;");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Cannot return from top-level code."));
    assert!(errors[0].contains(" at 'return'"));
}

#[test]
fn return_inside_a_function_is_fine() {
    let errors = static_errors("fun f() { return 1; }");

    assert!(errors.is_empty(), "got: {:?}", errors);
}

#[test]
fn this_outside_a_class_is_an_error() {
    let errors = static_errors("print this;");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Cannot use 'this' outside of a class."));

    // Also rejected inside a plain function.
    let errors = static_errors("fun f() { return this; }");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Cannot use 'this' outside of a class."));
}

#[test]
fn this_inside_a_method_is_fine() {
    let errors = static_errors("class C { m() { return this; } }");

    assert!(errors.is_empty(), "got: {:?}", errors);
}

#[test]
fn reading_a_local_in_its_own_initializer_is_an_error() {
    let errors = static_errors("{ var a = 1; { var a = a; } }");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Cannot read local variable in its own initializer."));
}

#[test]
fn resolution_continues_past_the_first_error() {
    let errors = static_errors("return 1;\n{ var a = 1; var a = 2; }");

    assert_eq!(errors.len(), 2, "got: {:?}", errors);
}

#[test]
fn resolution_is_skipped_when_parsing_failed() {
    // Once the parse has failed the run is already doomed; resolving the
    // partial tree would pile a top-level-return diagnostic on top of the
    // parse error.
    let errors = static_errors("var 1;\nreturn 2;");

    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].contains("Expected variable name."));
}

// Binding fidelity: a reference must keep pointing at the declaration that
// was in scope where the reference appeared, even when a later declaration
// shadows it — the distance-indexed lookup must behave exactly like a
// lexical scope-chain search.

#[test]
fn closure_keeps_the_binding_from_its_definition_site() {
    // The classic: `a` inside showA resolves to the global even though the
    // block later declares its own `a`.
    let output = run_ok(
        r#"var a = "global";
{
    fun showA() {
        print a;
    }
    showA();
    var a = "block";
    showA();
    print a;
}
"#,
    );

    assert_eq!(output, "global\nglobal\nblock\n");
}

#[test]
fn parameters_shadow_enclosing_variables() {
    let output = run_ok(
        r#"var x = "outer";
fun echo(x) {
    print x;
}
echo("inner");
print x;
"#,
    );

    assert_eq!(output, "inner\nouter\n");
}

#[test]
fn each_loop_iteration_sees_the_same_captured_frame() {
    let output = run_ok(
        r#"fun make() {
    var n = 0;
    fun tick() {
        n = n + 1;
        print n;
    }
    return tick;
}
var t = make();
t();
t();
"#,
    );

    assert_eq!(output, "1\n2\n");
}
