//! Automaton side of the engine.
//!
//! - `arena`: the shared state pool (`StateArena`, `StateId`, `Step`)
//! - `nfa`: capture-aware traversal (`find_first`, `find_all`)
//! - `trie`: literal-prefix dispatch used by the registry

mod arena;
mod nfa;
mod trie;

pub use arena::{Accept, NfaState, StateArena, StateId, Step};

pub use nfa::{find_all, find_first, ActiveState, Capture, Captures, Match, MatchMode};

pub use trie::PrefixTrie;

#[cfg(test)]
mod tests;
