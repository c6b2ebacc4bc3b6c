//! Arena-based state allocation for cyclic NFA structures.
//!
//! `StateId` is just an index (u32), so states can reference each other
//! cyclically without ownership issues. Unbounded quantifiers compile to
//! true cycles:
//!
//! ```text
//!   start --(a)--> exit --epsilon--> start
//! ```
//!
//! Every edge is a handle-to-handle reference into one [`StateArena`], which
//! also makes structural cloning of sub-graphs a plain index remap.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::regexp::CharClass;

/// A state identifier - just an index into the arena.
///
/// This can be freely copied and allows cyclic references.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a consuming transition accepts.
#[derive(Debug, Clone)]
pub enum Step {
    /// Exactly this character.
    Char(char),
    /// Any ASCII decimal digit.
    Digit,
    /// Any character the class accepts.
    Class(Arc<CharClass>),
}

impl Step {
    #[inline]
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Step::Char(want) => *want == c,
            Step::Digit => c.is_ascii_digit(),
            Step::Class(class) => class.matches(c),
        }
    }
}

/// An accepting record: the payload of a registered pattern and the number
/// of capturing groups that pattern declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accept<X> {
    pub payload: X,
    pub group_count: usize,
}

/// A state in the arena-based automaton.
#[derive(Debug, Clone)]
pub struct NfaState<X> {
    /// Consuming transitions
    pub steps: SmallVec<[(Step, StateId); 1]>,
    /// Epsilon transitions (taken without consuming input)
    pub epsilons: SmallVec<[StateId; 2]>,
    /// Groups whose span starts when this state is entered
    pub group_starts: SmallVec<[usize; 1]>,
    /// Groups whose span ends when this state is entered
    pub group_ends: SmallVec<[usize; 1]>,
    /// Patterns that accept when the scan ends on this state
    pub accepts: Vec<Accept<X>>,
}

impl<X> Default for NfaState<X> {
    fn default() -> Self {
        Self {
            steps: SmallVec::new(),
            epsilons: SmallVec::new(),
            group_starts: SmallVec::new(),
            group_ends: SmallVec::new(),
            accepts: Vec::new(),
        }
    }
}

impl<X> NfaState<X> {
    #[inline]
    pub fn is_accepting(&self) -> bool {
        !self.accepts.is_empty()
    }
}

/// Arena for allocating NFA states.
///
/// States are allocated contiguously and referenced by `StateId`.
/// The arena owns all state memory and frees it when dropped.
#[derive(Clone)]
pub struct StateArena<X> {
    states: Vec<NfaState<X>>,
    /// One past the highest group index carried by any marker
    group_slots: usize,
}

impl<X> Default for StateArena<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X> std::fmt::Debug for StateArena<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateArena")
            .field("states_count", &self.states.len())
            .field("group_slots", &self.group_slots)
            .finish()
    }
}

impl<X> StateArena<X> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            group_slots: 1,
        }
    }

    /// Allocate a new state with no transitions, returning its ID.
    pub fn alloc(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(NfaState::default());
        id
    }

    /// Get a reference to a state by ID.
    #[inline]
    pub fn get(&self, id: StateId) -> Option<&NfaState<X>> {
        self.states.get(id.index())
    }

    /// Number of states in the arena.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of capture slots a simulation over this arena needs.
    pub fn group_slots(&self) -> usize {
        self.group_slots
    }

    /// Add a consuming transition.
    pub fn add_step(&mut self, from: StateId, step: Step, to: StateId) {
        self[from].steps.push((step, to));
    }

    /// Add an epsilon transition, ignoring duplicates.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        let epsilons = &mut self[from].epsilons;
        if !epsilons.contains(&to) {
            epsilons.push(to);
        }
    }

    pub fn mark_group_start(&mut self, state: StateId, group: usize) {
        self.group_slots = self.group_slots.max(group + 1);
        self[state].group_starts.push(group);
    }

    pub fn mark_group_end(&mut self, state: StateId, group: usize) {
        self.group_slots = self.group_slots.max(group + 1);
        self[state].group_ends.push(group);
    }

    pub fn add_accept(&mut self, state: StateId, accept: Accept<X>) {
        self[state].accepts.push(accept);
    }
}

impl<X: Clone> StateArena<X> {
    /// Copy every state reachable from `start` into fresh states.
    ///
    /// Internal sharing and cycles are preserved within the copy. Returns the
    /// mapping from original to copied state IDs; the copy of `start` is
    /// `map[&start]`.
    pub fn clone_reachable(&mut self, start: StateId) -> FxHashMap<StateId, StateId> {
        let mut map = FxHashMap::default();
        let mut order = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            if map.contains_key(&id) {
                continue;
            }
            let copy = self.alloc();
            map.insert(id, copy);
            order.push(id);

            let state = &self[id];
            stack.extend(state.steps.iter().map(|(_, to)| *to));
            stack.extend(state.epsilons.iter().copied());
        }

        for id in order {
            let original = &self[id];
            let mut copy = NfaState {
                steps: original
                    .steps
                    .iter()
                    .map(|(step, to)| (step.clone(), map[to]))
                    .collect(),
                epsilons: original.epsilons.iter().map(|to| map[to]).collect(),
                group_starts: original.group_starts.clone(),
                group_ends: original.group_ends.clone(),
                accepts: original.accepts.clone(),
            };
            std::mem::swap(&mut self[map[&id]], &mut copy);
        }

        map
    }
}

impl<X> std::ops::Index<StateId> for StateArena<X> {
    type Output = NfaState<X>;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}

impl<X> std::ops::IndexMut<StateId> for StateArena<X> {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        &mut self.states[id.index()]
    }
}
