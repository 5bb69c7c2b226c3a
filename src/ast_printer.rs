//! Canonical source printer for the Slang AST.
//!
//! Renders a parsed program back to source text with fixed spacing, one
//! statement header per line, and four-space indentation.  The output is
//! itself valid Slang, and printing is a fixed point over parsing: parsing
//! canonical text and printing the result reproduces the text exactly.
//! Grouping nodes keep their parentheses, so no precedence reconstruction is
//! needed.  Desugared forms print as what they became (a `for` loop prints
//! as its `while` form).
//!
//! Also doubles as the CLI's AST dump.

use std::fmt::Write;

use crate::ast::{Expr, LiteralValue, Stmt};

const INDENT: &str = "    ";

pub struct AstPrinter;

impl AstPrinter {
    /// Render a whole program, one top-level statement per line group.
    pub fn print_program(statements: &[Stmt<'_>]) -> String {
        let mut out = String::new();

        for stmt in statements {
            Self::write_stmt(&mut out, stmt, 0);
            out.push('\n');
        }

        out
    }

    // ───────────────────────── statements ─────────────────────────

    fn write_stmt(out: &mut String, stmt: &Stmt<'_>, depth: usize) {
        let pad = INDENT.repeat(depth);

        match stmt {
            Stmt::Expression(expr) => {
                let _ = write!(out, "{}", pad);
                Self::write_expr(out, expr);
                out.push(';');
            }

            Stmt::Print(expr) => {
                let _ = write!(out, "{}print ", pad);
                Self::write_expr(out, expr);
                out.push(';');
            }

            Stmt::Var { name, initializer } => {
                let _ = write!(out, "{}var {}", pad, name.lexeme);

                if let Some(init) = initializer {
                    out.push_str(" = ");
                    Self::write_expr(out, init);
                }

                out.push(';');
            }

            Stmt::Block(statements) => {
                let _ = write!(out, "{}{{", pad);

                for inner in statements {
                    out.push('\n');
                    Self::write_stmt(out, inner, depth + 1);
                }

                let _ = write!(out, "\n{}}}", pad);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let _ = write!(out, "{}if (", pad);
                Self::write_expr(out, condition);
                out.push_str(")\n");
                Self::write_stmt(out, then_branch, depth + 1);

                if let Some(else_stmt) = else_branch {
                    let _ = write!(out, "\n{}else\n", pad);
                    Self::write_stmt(out, else_stmt, depth + 1);
                }
            }

            Stmt::While { condition, body } => {
                let _ = write!(out, "{}while (", pad);
                Self::write_expr(out, condition);
                out.push_str(")\n");
                Self::write_stmt(out, body, depth + 1);
            }

            Stmt::Function { .. } => {
                let _ = write!(out, "{}fun ", pad);
                Self::write_function(out, stmt, depth);
            }

            Stmt::Return { value, .. } => {
                let _ = write!(out, "{}return", pad);

                if let Some(expr) = value {
                    out.push(' ');
                    Self::write_expr(out, expr);
                }

                out.push(';');
            }

            Stmt::Class { name, methods } => {
                let _ = write!(out, "{}class {} {{", pad, name.lexeme);

                for method in methods {
                    out.push('\n');
                    let _ = write!(out, "{}{}", pad, INDENT);
                    Self::write_function(out, method, depth + 1);
                }

                let _ = write!(out, "\n{}}}", pad);
            }
        }
    }

    /// Shared tail of function declarations and methods: the `fun` keyword
    /// (functions only) is already written by the caller.
    fn write_function(out: &mut String, stmt: &Stmt<'_>, depth: usize) {
        let Stmt::Function { name, params, body } = stmt else {
            unreachable!("write_function takes only Function nodes");
        };

        let _ = write!(out, "{}(", name.lexeme);

        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(param.lexeme);
        }

        out.push_str(") {");

        for inner in body {
            out.push('\n');
            Self::write_stmt(out, inner, depth + 1);
        }

        let _ = write!(out, "\n{}}}", INDENT.repeat(depth));
    }

    // ───────────────────────── expressions ────────────────────────

    fn write_expr(out: &mut String, expr: &Expr<'_>) {
        match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        let _ = write!(out, "{:.0}", n);
                    } else {
                        let _ = write!(out, "{}", n);
                    }
                }
                LiteralValue::Str(s) => {
                    let _ = write!(out, "\"{}\"", s);
                }
                LiteralValue::True => out.push_str("true"),
                LiteralValue::False => out.push_str("false"),
                LiteralValue::Nil => out.push_str("nil"),
            },

            Expr::Grouping(inner) => {
                out.push('(');
                Self::write_expr(out, inner);
                out.push(')');
            }

            Expr::Unary { operator, right } => {
                out.push_str(operator.lexeme);
                Self::write_expr(out, right);
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => {
                Self::write_expr(out, left);
                let _ = write!(out, " {} ", operator.lexeme);
                Self::write_expr(out, right);
            }

            Expr::Variable { name, .. } => out.push_str(name.lexeme),

            Expr::Assign { name, value, .. } => {
                let _ = write!(out, "{} = ", name.lexeme);
                Self::write_expr(out, value);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                Self::write_expr(out, callee);
                out.push('(');

                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    Self::write_expr(out, argument);
                }

                out.push(')');
            }

            Expr::Get { object, name } => {
                Self::write_expr(out, object);
                let _ = write!(out, ".{}", name.lexeme);
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                Self::write_expr(out, object);
                let _ = write!(out, ".{} = ", name.lexeme);
                Self::write_expr(out, value);
            }

            Expr::This { .. } => out.push_str("this"),
        }
    }
}
