//! The evaluator's scope chain: an explicit stack of frames, pushed on rule
//! entry and popped on exit (spec.md §9 "Scope chain"). Deliberately not a
//! thread-local global the way the teacher's older `scope.rs` models it --
//! spec.md §5 requires no shared mutable state across compiles, and an
//! explicit stack makes mixin recursion and nested rule bodies trivially
//! reentrant.

use std::collections::HashMap;
use std::rc::Rc;

use crate::parser::ast::Rule;
use crate::value::Value;

#[derive(Default)]
struct Frame {
    variables: HashMap<String, Value>,
    mixins: HashMap<String, Vec<Rc<Rule>>>,
}

pub struct Scope {
    frames: Vec<Frame>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope { frames: vec![Frame::default()] }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "popped the root scope frame");
    }

    pub fn declare_variable(&mut self, name: impl Into<String>, value: Value) {
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .variables
            .insert(name.into(), value);
    }

    /// Innermost frame wins: search from the top of the stack down.
    pub fn lookup_variable(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|f| f.variables.get(name))
    }

    pub fn declare_mixin(&mut self, selector_key: impl Into<String>, rule: Rc<Rule>) {
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .mixins
            .entry(selector_key.into())
            .or_default()
            .push(rule);
    }

    /// Returns every overload visible under `selector_key`, from the
    /// nearest frame that defines any (mixin overloads within one frame
    /// combine for multi-dispatch; frames don't merge across levels --
    /// spec.md §4.4 "Mixin invocation").
    pub fn lookup_mixins(&self, selector_key: &str) -> Option<&[Rc<Rule>]> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.mixins.get(selector_key))
            .map(Vec::as_slice)
    }
}
