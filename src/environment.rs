//! Lexical environments: one scope's name→value bindings plus a link to the
//! enclosing scope.
//!
//! Environments are the only shared mutable runtime resource.  A block's
//! environment is also captured by every closure created while it was
//! active, so frames live behind `Rc<RefCell<_>>`: reference counting keeps
//! a frame alive as long as any closure holds it, and the `RefCell` lets the
//! block and the closure both mutate it after capture.
//!
//! Two lookup paths coexist.  `get`/`assign` walk the enclosing chain by
//! name and are used only for globals (the resolver records no distance for
//! them).  `get_at`/`assign_at` hop a resolver-computed number of frames and
//! then index a single map — the O(1) path every resolved local takes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{Result, SlangError};
use crate::token::Token;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    /// A root environment with no parent (the global scope).
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child environment chained to `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this frame, overwriting any existing binding.
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        debug!("define '{}' = {}", name, value);

        self.values.insert(name.to_owned(), value);
    }

    /// Chain-walking read, used for unresolved (global) references.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(SlangError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Chain-walking write, used for unresolved (global) references.
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<()> {
        if self.values.contains_key(name.lexeme) {
            self.values.insert(name.lexeme.to_owned(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(SlangError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// The frame `distance` hops up the enclosing chain from `env`.
    ///
    /// The resolver guarantees the chain is deep enough for every distance
    /// it hands out, so a short chain is a resolver bug, not a user error.
    fn ancestor(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
    ) -> Rc<RefCell<Environment<'a>>> {
        let mut frame = Rc::clone(env);

        for _ in 0..distance {
            let parent = frame
                .borrow()
                .enclosing
                .as_ref()
                .map(Rc::clone)
                .unwrap_or_else(|| {
                    unreachable!("resolver recorded a distance deeper than the environment chain")
                });

            frame = parent;
        }

        frame
    }

    /// Indexed read at a resolver-computed distance.
    pub fn get_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &Token<'a>,
    ) -> Result<Value<'a>> {
        let frame = Self::ancestor(env, distance);
        let borrowed = frame.borrow();

        match borrowed.values.get(name.lexeme) {
            Some(value) => Ok(value.clone()),
            None => Err(SlangError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    /// Indexed write at a resolver-computed distance.
    pub fn assign_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &Token<'a>,
        value: Value<'a>,
    ) -> Result<()> {
        let frame = Self::ancestor(env, distance);

        frame
            .borrow_mut()
            .values
            .insert(name.lexeme.to_owned(), value);

        Ok(())
    }
}
