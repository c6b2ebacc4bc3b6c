//! Capture-aware NFA traversal.
//!
//! The simulation walks the input one character at a time, keeping a
//! frontier of [`ActiveState`]s: an automaton state paired with the group
//! offsets recorded on the path that reached it. Two paths that reach the
//! same state with different offsets stay separate; identical pairs are
//! merged, which bounds the frontier and terminates epsilon cycles.
//!
//! There is no backtracking, so matching time is polynomial in the input
//! and automaton size.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::{smallvec, SmallVec};

use super::arena::{Accept, NfaState, StateArena, StateId};

/// When the scan is allowed to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The whole input must be consumed; trailing input is never ignored.
    #[default]
    Exact,
    /// The longest prefix of the input that reaches an accepting state wins.
    LongestPrefix,
}

/// Recorded group offsets for one path through the automaton.
///
/// Copied on every fork, never shared between paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Captures {
    starts: SmallVec<[Option<usize>; 4]>,
    ends: SmallVec<[Option<usize>; 4]>,
}

impl Captures {
    pub fn new(slots: usize) -> Self {
        Self {
            starts: smallvec![None; slots],
            ends: smallvec![None; slots],
        }
    }

    pub fn record_start(&mut self, group: usize, pos: usize) {
        record(&mut self.starts, group, pos);
    }

    pub fn record_end(&mut self, group: usize, pos: usize) {
        record(&mut self.ends, group, pos);
    }

    /// The `(start, end)` offsets of a group, if both were recorded in order.
    pub fn span(&self, group: usize) -> Option<(usize, usize)> {
        let start = self.starts.get(group).copied().flatten()?;
        let end = self.ends.get(group).copied().flatten()?;
        (start <= end).then_some((start, end))
    }

    /// Record every marker carried by `state` at `pos`.
    fn enter<X>(&mut self, state: &NfaState<X>, pos: usize) {
        for &g in &state.group_starts {
            self.record_start(g, pos);
        }
        for &g in &state.group_ends {
            self.record_end(g, pos);
        }
    }
}

fn record(slots: &mut SmallVec<[Option<usize>; 4]>, group: usize, pos: usize) {
    if group >= slots.len() {
        slots.resize(group + 1, None);
    }
    slots[group] = Some(pos);
}

/// A simulation-time pair of automaton state and capture bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveState {
    pub state: StateId,
    pub captures: Captures,
}

/// An insertion-ordered set of active states.
///
/// `seen` maps the hash of an active state to its positions in `states`, so
/// each state is stored once and compared in place on collision.
#[derive(Default)]
struct Frontier {
    states: Vec<ActiveState>,
    seen: FxHashMap<u64, SmallVec<[usize; 1]>>,
}

impl Frontier {
    fn insert(&mut self, active: ActiveState) -> bool {
        let mut hasher = FxHasher::default();
        active.hash(&mut hasher);
        let slots = self.seen.entry(hasher.finish()).or_default();
        if slots.iter().any(|&i| self.states[i] == active) {
            return false;
        }
        slots.push(self.states.len());
        self.states.push(active);
        true
    }

    fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Extend the frontier with everything reachable over epsilon edges.
    ///
    /// The state vector doubles as the work queue.
    fn close<X>(&mut self, arena: &StateArena<X>, pos: usize) {
        let mut i = 0;
        while i < self.states.len() {
            let state = self.states[i].state;
            for &target in &arena[state].epsilons {
                let mut captures = self.states[i].captures.clone();
                captures.enter(&arena[target], pos);
                self.insert(ActiveState {
                    state: target,
                    captures,
                });
            }
            i += 1;
        }
    }

    fn accepting<X>(&self, arena: &StateArena<X>) -> Vec<ActiveState> {
        self.states
            .iter()
            .filter(|a| arena[a.state].is_accepting())
            .cloned()
            .collect()
    }
}

/// The input, indexed by character.
struct Text<'t> {
    input: &'t str,
    chars: Vec<char>,
    /// Byte offset of each character, plus the input length
    bounds: Vec<usize>,
}

impl<'t> Text<'t> {
    fn new(input: &'t str) -> Self {
        let mut chars = Vec::with_capacity(input.len());
        let mut bounds = Vec::with_capacity(input.len() + 1);
        for (at, c) in input.char_indices() {
            chars.push(c);
            bounds.push(at);
        }
        bounds.push(input.len());
        Self {
            input,
            chars,
            bounds,
        }
    }

    fn slice(&self, start: usize, end: usize) -> &'t str {
        &self.input[self.bounds[start]..self.bounds[end]]
    }
}

/// One captured group: character offsets and the text between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capture<'t> {
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
}

/// A successful match: the pattern's payload and its captured groups.
///
/// Group 0 is always present and spans the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match<'t, X> {
    payload: X,
    groups: BTreeMap<usize, Capture<'t>>,
}

impl<'t, X> Match<'t, X> {
    pub fn payload(&self) -> &X {
        &self.payload
    }

    pub fn into_payload(self) -> X {
        self.payload
    }

    /// Text captured by a group, if that group participated.
    pub fn group(&self, index: usize) -> Option<&'t str> {
        self.groups.get(&index).map(|c| c.text)
    }

    /// Character offsets of a group, if that group participated.
    pub fn span(&self, index: usize) -> Option<(usize, usize)> {
        self.groups.get(&index).map(|c| (c.start, c.end))
    }

    /// All participating groups in index order.
    pub fn groups(&self) -> impl Iterator<Item = (usize, &Capture<'t>)> + '_ {
        self.groups.iter().map(|(i, c)| (*i, c))
    }
}

fn build_match<'t, X: Clone>(
    text: &Text<'t>,
    active: &ActiveState,
    accept: &Accept<X>,
    end: usize,
) -> Match<'t, X> {
    let mut groups = BTreeMap::new();
    groups.insert(
        0,
        Capture {
            start: 0,
            end,
            text: text.slice(0, end),
        },
    );
    for g in 1..=accept.group_count {
        if let Some((start, stop)) = active.captures.span(g) {
            if stop <= end {
                groups.insert(
                    g,
                    Capture {
                        start,
                        end: stop,
                        text: text.slice(start, stop),
                    },
                );
            }
        }
    }
    Match {
        payload: accept.payload.clone(),
        groups,
    }
}

/// Run the simulation; returns the accepting active states and the
/// character offset where the accepted scan ends.
fn scan<X>(
    arena: &StateArena<X>,
    start: StateId,
    text: &Text<'_>,
    offset: usize,
    mode: MatchMode,
) -> Option<(Vec<ActiveState>, usize)> {
    if offset > text.chars.len() || arena.get(start).is_none() {
        return None;
    }

    let mut captures = Captures::new(arena.group_slots());
    captures.enter(&arena[start], offset);
    let mut frontier = Frontier::default();
    frontier.insert(ActiveState {
        state: start,
        captures,
    });
    frontier.close(arena, offset);

    let mut best = None;
    if mode == MatchMode::LongestPrefix {
        best = Some((frontier.accepting(arena), offset)).filter(|(acc, _)| !acc.is_empty());
    }

    for pos in offset..text.chars.len() {
        let c = text.chars[pos];
        let mut next = Frontier::default();

        for active in &frontier.states {
            for (step, to) in &arena[active.state].steps {
                if !step.accepts(c) {
                    continue;
                }
                let mut captures = active.captures.clone();
                for &g in &arena[*to].group_ends {
                    captures.record_end(g, pos + 1);
                }
                next.insert(ActiveState {
                    state: *to,
                    captures,
                });
            }
        }

        if next.is_empty() {
            return best;
        }
        next.close(arena, pos + 1);
        frontier = next;

        if mode == MatchMode::LongestPrefix {
            let accepting = frontier.accepting(arena);
            if !accepting.is_empty() {
                best = Some((accepting, pos + 1));
            }
        }
    }

    match mode {
        MatchMode::Exact => {
            let accepting = frontier.accepting(arena);
            (!accepting.is_empty()).then_some((accepting, text.chars.len()))
        }
        MatchMode::LongestPrefix => best,
    }
}

/// Find the first match reachable from `start`.
///
/// Scanning begins at character `offset`; group offsets and group 0 are
/// relative to the start of `input`. Which payload wins when several
/// patterns accept is decided by frontier order and carries no ranking.
pub fn find_first<'t, X: Clone>(
    arena: &StateArena<X>,
    start: StateId,
    input: &'t str,
    offset: usize,
    mode: MatchMode,
) -> Option<Match<'t, X>> {
    let text = Text::new(input);
    let (accepting, end) = scan(arena, start, &text, offset, mode)?;
    accepting.iter().find_map(|active| {
        arena[active.state]
            .accepts
            .first()
            .map(|accept| build_match(&text, active, accept, end))
    })
}

/// Find every distinct (payload, captures) match reachable from `start`.
pub fn find_all<'t, X: Clone + Eq + Hash>(
    arena: &StateArena<X>,
    start: StateId,
    input: &'t str,
    offset: usize,
    mode: MatchMode,
) -> Vec<Match<'t, X>> {
    let text = Text::new(input);
    let Some((accepting, end)) = scan(arena, start, &text, offset, mode) else {
        return Vec::new();
    };

    let mut seen = FxHashSet::default();
    let mut matches = Vec::new();
    for active in &accepting {
        for accept in &arena[active.state].accepts {
            let m = build_match(&text, active, accept, end);
            if seen.insert(m.clone()) {
                matches.push(m);
            }
        }
    }
    matches
}
