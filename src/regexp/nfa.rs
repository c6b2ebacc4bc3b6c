//! NFA building for parsed patterns.
//!
//! Thompson-style construction into a shared [`StateArena`]. Quantifiers are
//! expanded structurally: `{m,n}` becomes `m` mandatory copies of the symbol's
//! fragment followed by `n - m` optional ones; an unbounded maximum adds one
//! optional copy whose exits loop back to its own start. Copies are made with
//! [`StateArena::clone_reachable`], so each repetition is traversed
//! independently and carries its own group markers.

use smallvec::{smallvec, SmallVec};

use crate::automaton::{StateArena, StateId, Step};

use super::parser::{Symbol, SymbolKind};

/// A compiled sub-automaton: one start state and its exit states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub start: StateId,
    pub exits: SmallVec<[StateId; 2]>,
}

impl Fragment {
    /// A single state that is both start and sole exit; accepts "".
    fn empty<X>(arena: &mut StateArena<X>) -> Self {
        let s = arena.alloc();
        Fragment {
            start: s,
            exits: smallvec![s],
        }
    }
}

/// Compile a symbol sequence into one fragment representing its concatenation.
pub fn compile<X: Clone>(arena: &mut StateArena<X>, symbols: &[Symbol]) -> Fragment {
    let mut result: Option<Fragment> = None;
    for symbol in symbols {
        let next = compile_symbol(arena, symbol);
        result = Some(match result {
            Some(acc) => concat(arena, acc, next),
            None => next,
        });
    }
    result.unwrap_or_else(|| Fragment::empty(arena))
}

/// Wire every exit of `first` to the start of `second`.
fn concat<X>(arena: &mut StateArena<X>, first: Fragment, second: Fragment) -> Fragment {
    for &exit in &first.exits {
        arena.add_epsilon(exit, second.start);
    }
    Fragment {
        start: first.start,
        exits: second.exits,
    }
}

fn compile_symbol<X: Clone>(arena: &mut StateArena<X>, symbol: &Symbol) -> Fragment {
    if symbol.quant_max == Some(0) {
        return Fragment::empty(arena);
    }
    let base = compile_single(arena, &symbol.kind);
    if symbol.is_singleton() {
        return base;
    }
    repeat(arena, base, symbol.quant_min, symbol.quant_max)
}

/// Compile a symbol as if its quantifier were `(1,1)`.
fn compile_single<X: Clone>(arena: &mut StateArena<X>, kind: &SymbolKind) -> Fragment {
    let step = match kind {
        SymbolKind::Literal(c) => Step::Char(*c),
        SymbolKind::Digit => Step::Digit,
        SymbolKind::Class(class) => Step::Class(class.clone()),
        SymbolKind::Group { index, children } => {
            let sub = compile(arena, children);
            arena.mark_group_start(sub.start, *index);
            for &exit in &sub.exits {
                arena.mark_group_end(exit, *index);
            }
            return sub;
        }
    };
    let start = arena.alloc();
    let exit = arena.alloc();
    arena.add_step(start, step, exit);
    Fragment {
        start,
        exits: smallvec![exit],
    }
}

/// Copy a not-yet-wired fragment.
fn duplicate<X: Clone>(arena: &mut StateArena<X>, base: &Fragment) -> Fragment {
    let map = arena.clone_reachable(base.start);
    Fragment {
        start: map[&base.start],
        exits: base.exits.iter().map(|exit| map[exit]).collect(),
    }
}

/// Expand `base` to match between `min` and `max` times (`None` = unbounded).
fn repeat<X: Clone>(
    arena: &mut StateArena<X>,
    base: Fragment,
    min: u32,
    max: Option<u32>,
) -> Fragment {
    // An unbounded maximum adds one looping copy after the mandatory ones.
    // The loop never re-enters the first copy's start, which may carry the
    // start marker of an enclosing group.
    let optional = match max {
        Some(max) => max.saturating_sub(min) as usize,
        None => 1,
    };
    let total = min as usize + optional;

    // All copies are taken before any wiring, while `base` is still closed.
    let mut copies: Vec<Fragment> = (1..total).map(|_| duplicate(arena, &base)).collect();
    copies.push(base);
    let mut copies = copies.into_iter();

    let mut mandatory: Option<Fragment> = None;
    for copy in copies.by_ref().take(min as usize) {
        mandatory = Some(match mandatory {
            Some(acc) => concat(arena, acc, copy),
            None => copy,
        });
    }

    let (start, mut pending) = match mandatory {
        Some(frag) if optional == 0 => return frag,
        Some(frag) => (frag.start, frag.exits),
        None => {
            let s = arena.alloc();
            (s, smallvec![s])
        }
    };
    let exit = arena.alloc();

    for copy in copies {
        for &p in &pending {
            arena.add_epsilon(p, copy.start);
            arena.add_epsilon(p, exit);
        }
        if max.is_none() {
            for &e in &copy.exits {
                arena.add_epsilon(e, copy.start);
            }
        }
        pending = copy.exits;
    }
    for &p in &pending {
        arena.add_epsilon(p, exit);
    }

    Fragment {
        start,
        exits: smallvec![exit],
    }
}
