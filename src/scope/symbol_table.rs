use std::collections::HashMap;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

#[derive(Debug, Clone)]
struct Frame<T> {
    variables: HashMap<String, T>,
    statics: HashMap<String, T>,
}

impl<T> Frame<T> {
    fn new() -> Self {
        Frame {
            variables: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    fn get(&self, name: &str) -> Option<&T> {
        self.variables.get(name).or_else(|| self.statics.get(name))
    }
}

/// A stack of name scopes.
///
/// Every `start_frame` must be matched by exactly one `end_frame`. A popped
/// frame is gone for good.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    frames: Vec<Frame<T>>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        SymbolTable { frames: vec![] }
    }

    pub fn start_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    pub fn end_frame(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Binds `name` in the innermost frame. Does nothing without a frame.
    pub fn add_variable(&mut self, name: &str, value: T) {
        if let Some(frame) = self.frames.last_mut() {
            frame.variables.insert(name.to_string(), value);
        }
    }

    /// Binds a value that is used directly rather than loaded, such as a
    /// function parameter.
    pub fn add_static(&mut self, name: &str, value: T) {
        if let Some(frame) = self.frames.last_mut() {
            frame.statics.insert(name.to_string(), value);
        }
    }

    /// Nearest binding of `name`, searching from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn find_variable(&self, name: &str, position: &Position) -> Result<&T, Error> {
        self.lookup(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownVariable {
                    variable: name.to_string(),
                },
                position.clone(),
            )
        })
    }

    /// Only the innermost frame is searched, so shadowing an outer binding
    /// is not reported.
    pub fn contains_in_current_frame(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.get(name).is_some())
    }
}
