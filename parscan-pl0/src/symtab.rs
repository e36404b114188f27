//! # symtab
//!
//! Block-scoped PL/0 symbol table.
//!
//! The table is a stack of frames, one per open block, each an
//! [`IndexMap`] holding only that block's own declarations. Lookup walks the
//! frames from innermost to outermost, so an inner declaration shadows an
//! outer one. Leaving a block drops its frame.
//!
//! ## Example
//! ```rust
//! # use parscan_pl0::{SymTab, Symbol};
//! let mut st = SymTab::new();
//! st.declare("n", Symbol::Const(10)).unwrap();
//! st.enter();
//! st.declare("n", Symbol::Var).unwrap();
//! assert_eq!(st.lookup("n").unwrap(), Symbol::Var);
//! st.leave();
//! assert_eq!(st.lookup("n").unwrap(), Symbol::Const(10));
//! ```

use indexmap::IndexMap;
use smartstring::alias::String;
use thiserror::Error;

/// What a name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A named constant and its value.
    Const(i64),
    /// A variable.
    Var,
    /// A procedure.
    Procedure,
}

impl Symbol {
    /// Lower-case noun for messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Symbol::Const(_) => "constant",
            Symbol::Var => "variable",
            Symbol::Procedure => "procedure",
        }
    }
}

/// Errors that can occur when operating on a [`SymTab`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymTabError {
    /// The name is already declared in the innermost block.
    #[error("duplicate declaration of {name}")]
    Duplicate {
        /// The name declared twice.
        name: String,
    },

    /// No enclosing block declares the name.
    #[error("undefined symbol {name}")]
    Undefined {
        /// The unknown name.
        name: String,
    },
}

/// A stack of per-block declaration frames.
///
/// Always holds at least the outermost frame.
#[derive(Debug, Clone)]
pub struct SymTab {
    frames: Vec<IndexMap<String, Symbol>>,
}

impl SymTab {
    /// Creates a table with one empty outermost frame.
    pub fn new() -> Self {
        Self {
            frames: vec![IndexMap::new()],
        }
    }

    /// Opens a frame for a nested block.
    pub fn enter(&mut self) {
        self.frames.push(IndexMap::new());
        log::trace!("enter scope {}", self.frames.len());
    }

    /// Closes the innermost frame. The outermost frame is never removed.
    pub fn leave(&mut self) {
        if self.frames.len() > 1 {
            log::trace!("leave scope {}", self.frames.len());
            self.frames.pop();
        }
    }

    /// Returns `true` if the innermost frame declares `name`.
    pub fn is_local(&self, name: &str) -> bool {
        self.frames.last().is_some_and(|f| f.contains_key(name))
    }

    /// Declares `name` in the innermost frame.
    ///
    /// # Errors
    /// [`SymTabError::Duplicate`] if the innermost frame already has it.
    /// Shadowing a name from an enclosing frame is allowed.
    pub fn declare(&mut self, name: impl AsRef<str>, symbol: Symbol) -> Result<(), SymTabError> {
        let name = name.as_ref();
        if self.is_local(name) {
            return Err(SymTabError::Duplicate { name: name.into() });
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(String::from(name), symbol);
        }
        Ok(())
    }

    /// Resolves `name`, innermost frame first.
    ///
    /// # Errors
    /// [`SymTabError::Undefined`] if no open frame declares it.
    pub fn lookup(&self, name: &str) -> Result<Symbol, SymTabError> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.get(name).copied())
            .ok_or_else(|| SymTabError::Undefined { name: name.into() })
    }
}

impl Default for SymTab {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_empty() {
        let st = SymTab::new();
        assert!(!st.is_local("x"));
        assert!(st.lookup("x").is_err());
    }

    #[test]
    fn duplicate_in_same_frame_is_rejected() {
        let mut st = SymTab::new();
        st.declare("x", Symbol::Var).unwrap();
        assert_eq!(
            st.declare("x", Symbol::Const(1)).unwrap_err(),
            SymTabError::Duplicate { name: "x".into() }
        );
    }

    #[test]
    fn inner_frame_shadows_and_leave_restores() {
        let mut st = SymTab::new();
        st.declare("x", Symbol::Var).unwrap();
        st.declare("p", Symbol::Procedure).unwrap();
        st.enter();
        assert!(!st.is_local("x"));
        st.declare("x", Symbol::Const(3)).unwrap();
        assert!(st.is_local("x"));
        assert!(!st.is_local("p"));
        assert_eq!(st.lookup("x").unwrap(), Symbol::Const(3));
        assert_eq!(st.lookup("p").unwrap(), Symbol::Procedure);
        st.leave();
        assert_eq!(st.lookup("x").unwrap(), Symbol::Var);
    }

    #[test]
    fn inner_declarations_vanish_on_leave() {
        let mut st = SymTab::new();
        st.enter();
        st.declare("tmp", Symbol::Var).unwrap();
        st.leave();
        assert_eq!(
            st.lookup("tmp").unwrap_err().to_string(),
            "undefined symbol tmp"
        );
    }

    #[test]
    fn outermost_frame_survives_extra_leave() {
        let mut st = SymTab::new();
        st.declare("g", Symbol::Var).unwrap();
        st.leave();
        st.leave();
        assert_eq!(st.lookup("g").unwrap(), Symbol::Var);
        assert!(st.is_local("g"));
    }
}
