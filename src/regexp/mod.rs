//! Pattern side of the engine: character classes, the pattern parser and the
//! NFA compiler.
//!
//! Patterns are parsed with [`parse_pattern`] into a flat [`Symbol`]
//! sequence, then compiled into a [`StateArena`](crate::automaton::StateArena)
//! with [`compile`].

mod char_class;
mod nfa;
mod parser;

pub use char_class::{parse_char_class, simplify_rune_range, CharClass, RunePair};
pub use nfa::{compile, Fragment};
pub use parser::{
    parse_pattern, ParsedPattern, MAX_REPEAT, RegexpError, RegexpErrorKind, Symbol, SymbolKind,
};
