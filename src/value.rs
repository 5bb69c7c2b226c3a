//! Runtime value and object model.
//!
//! Scalars (numbers, strings, booleans, `nil`) are plain values copied on
//! clone.  Functions, classes, and instances are reference types: cloning a
//! [`Value`] clones an `Rc` handle, so identity and mutable state are shared
//! — two variables holding the same instance observe each other's field
//! writes, and equality on reference types is identity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::Stmt;
use crate::environment::Environment;
use crate::error::{Result, SlangError};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;

/// Signature of a native function: takes evaluated arguments, returns a
/// value or a plain error message (the interpreter attaches the location).
pub type NativeFn = for<'a> fn(&[Value<'a>]) -> std::result::Result<Value<'a>, String>;

/// Every value a Slang program can produce or store.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,

    /// Host-provided callable registered in the global environment.
    NativeFunction {
        name: &'static str,
        arity: usize,
        func: NativeFn,
    },

    /// User-defined function or bound method.
    Function(Rc<SlangFunction<'a>>),

    /// Class object; calling it allocates an instance.
    Class(Rc<SlangClass<'a>>),

    /// Instance of a user-defined class.
    Instance(Rc<RefCell<SlangInstance<'a>>>),
}

impl<'a> Value<'a> {
    /// `nil` and `false` are falsy; everything else (including `0` and `""`)
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Value equality for scalars, identity for reference types.
    pub fn equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // Integral values print without a fractional part: 3, not 3.0.
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Class(class) => write!(f, "{}", class.name),
            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),
        }
    }
}

/// A user-defined function: parameter tokens, body, and the environment that
/// was active at its definition site.
///
/// The closure is held by reference (`Rc`), never copied, so mutations to
/// enclosing variables made after the function was defined are visible
/// inside later calls.
#[derive(Debug)]
pub struct SlangFunction<'a> {
    pub name: String,
    pub params: Vec<&'a Token<'a>>,

    /// Shared so that binding a method does not clone the statement tree.
    pub body: Rc<Vec<Stmt<'a>>>,

    pub closure: Rc<RefCell<Environment<'a>>>,
}

impl<'a> SlangFunction<'a> {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Run the function body: bind each parameter in a fresh environment
    /// chained to the captured closure, execute, and translate a `Return`
    /// unwind into the call's result.  Yields `nil` when the body falls off
    /// the end.
    ///
    /// The caller has already checked arity.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("calling <fn {}> with {} arg(s)", self.name, arguments.len());

        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.params.iter().zip(arguments) {
            frame.define(param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&self.body, Rc::new(RefCell::new(frame)))?;

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    /// Produce a fresh function whose closure is extended with one frame
    /// binding `this` to `instance`.  Called once per method access, so each
    /// access yields a distinct bound-function value.
    pub fn bind(&self, instance: Rc<RefCell<SlangInstance<'a>>>) -> Rc<SlangFunction<'a>> {
        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));
        frame.define("this", Value::Instance(instance));

        Rc::new(SlangFunction {
            name: self.name.clone(),
            params: self.params.clone(),
            body: Rc::clone(&self.body),
            closure: Rc::new(RefCell::new(frame)),
        })
    }
}

/// A class: a name and a method table.  Methods close over the class's
/// defining environment and are bound to an instance lazily at lookup time.
#[derive(Debug)]
pub struct SlangClass<'a> {
    pub name: String,
    pub methods: HashMap<String, Rc<SlangFunction<'a>>>,
}

impl<'a> SlangClass<'a> {
    pub fn find_method(&self, name: &str) -> Option<&Rc<SlangFunction<'a>>> {
        self.methods.get(name)
    }

    /// Calling a class allocates a new, empty instance.  There are no
    /// constructors, so class arity is always zero.
    pub fn arity(&self) -> usize {
        0
    }

    pub fn instantiate(class: &Rc<SlangClass<'a>>) -> Value<'a> {
        debug!("instantiating class {}", class.name);

        Value::Instance(Rc::new(RefCell::new(SlangInstance {
            class: Rc::clone(class),
            fields: HashMap::new(),
        })))
    }
}

/// An instance: its originating class and a mutable field map.  Fields and
/// methods share a namespace at lookup time; fields shadow methods.
#[derive(Debug)]
pub struct SlangInstance<'a> {
    pub class: Rc<SlangClass<'a>>,
    fields: HashMap<String, Value<'a>>,
}

impl<'a> SlangInstance<'a> {
    /// Property read: instance fields first, then the class's method table.
    /// A method hit produces a freshly bound copy per access.
    pub fn get(instance: &Rc<RefCell<SlangInstance<'a>>>, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = instance.borrow().fields.get(name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = instance.borrow().class.find_method(name.lexeme) {
            return Ok(Value::Function(method.bind(Rc::clone(instance))));
        }

        Err(SlangError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    /// Property write: always straight into the field map, never through a
    /// method.
    pub fn set(&mut self, name: &Token<'a>, value: Value<'a>) {
        self.fields.insert(name.lexeme.to_owned(), value);
    }
}
