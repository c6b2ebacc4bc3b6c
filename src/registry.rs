//! Multi-pattern registry.
//!
//! Every registered pattern is compiled into one shared [`StateArena`] and
//! linked from a synthetic root with an epsilon edge; its exit states carry
//! an accepting record with the caller's payload. With
//! [`Config::prefix_index`] enabled, each pattern's leading literals are
//! dispatched through a [`PrefixTrie`] instead, and only the remainder is
//! compiled, rooted at a per-prefix state.

use std::cmp::Ordering;
use std::hash::Hash;

use log::{debug, trace};

use crate::automaton::{
    find_all, find_first, Accept, Match, MatchMode, PrefixTrie, StateArena, StateId,
};
use crate::regexp::{compile, parse_pattern};
use crate::RulexError;

/// Registry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Index patterns by their literal prefix before compiling.
    pub prefix_index: bool,
    /// When a scan may accept.
    pub match_mode: MatchMode,
}

impl Config {
    pub fn with_prefix_index(mut self, enabled: bool) -> Self {
        self.prefix_index = enabled;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }
}

/// A set of compiled patterns sharing one automaton.
///
/// Registry is Clone, so a snapshot can be taken before further
/// registration:
/// ```
/// # use rulex::Registry;
/// let mut reg = Registry::new();
/// reg.register(r"(\d+)-(\d+)", "range").unwrap();
///
/// let m = reg.lookup("12-345").unwrap();
/// assert_eq!(m.payload(), &"range");
/// assert_eq!(m.group(1), Some("12"));
/// assert_eq!(m.group(2), Some("345"));
/// ```
#[derive(Debug, Clone)]
pub struct Registry<X> {
    arena: StateArena<X>,
    root: StateId,
    prefixes: PrefixTrie<StateId>,
    config: Config,
    pattern_count: usize,
}

impl<X: Clone + Eq + Hash> Default for Registry<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: Clone + Eq + Hash> Registry<X> {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut arena = StateArena::new();
        let root = arena.alloc();
        Registry {
            arena,
            root,
            prefixes: PrefixTrie::new(),
            config,
            pattern_count: 0,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Parse and compile `pattern`, accepting with `payload`.
    ///
    /// A pattern that fails to parse leaves the registry unchanged.
    pub fn register(&mut self, pattern: &str, payload: X) -> Result<(), RulexError> {
        let parsed = parse_pattern(pattern).map_err(|source| {
            debug!("rejected pattern {:?}: {}", pattern, source);
            RulexError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        let states_before = self.arena.len();
        let (prefix, rest) = if self.config.prefix_index {
            parsed.literal_prefix()
        } else {
            (String::new(), parsed.symbols.as_slice())
        };
        let root = if self.config.prefix_index {
            let arena = &mut self.arena;
            *self.prefixes.get_or_insert_with(&prefix, || arena.alloc())
        } else {
            self.root
        };

        let frag = compile(&mut self.arena, rest);
        self.arena.add_epsilon(root, frag.start);
        for &exit in &frag.exits {
            self.arena.add_accept(
                exit,
                Accept {
                    payload: payload.clone(),
                    group_count: parsed.group_count,
                },
            );
        }
        self.pattern_count += 1;

        debug!(
            "registered pattern {:?}: {} groups, {} new states, prefix {:?}",
            pattern,
            parsed.group_count,
            self.arena.len() - states_before,
            prefix
        );
        Ok(())
    }

    /// The first match for `input`, if any.
    ///
    /// When several patterns match, which one is returned is unspecified;
    /// use [`lookup_all`](Self::lookup_all) to rank them. In
    /// [`MatchMode::LongestPrefix`] the match covers the longest prefix any
    /// pattern accepts, whether or not the prefix index is enabled.
    pub fn lookup<'t>(&self, input: &'t str) -> Option<Match<'t, X>> {
        let mode = self.config.match_mode;
        let found = if self.config.prefix_index {
            let mut best: Option<Match<'t, X>> = None;
            for (len, &root) in self.prefixes.prefixes_of(input) {
                let Some(m) = find_first(&self.arena, root, input, len, mode) else {
                    continue;
                };
                if best.as_ref().map_or(true, |b| match_end(&m) > match_end(b)) {
                    best = Some(m);
                }
            }
            best
        } else {
            find_first(&self.arena, self.root, input, 0, mode)
        };
        trace!(
            "lookup over {} chars: {}",
            input.chars().count(),
            if found.is_some() { "matched" } else { "no match" }
        );
        found
    }

    /// Every distinct match for `input`.
    ///
    /// All returned matches end at the same offset: the end of the input in
    /// [`MatchMode::Exact`], the longest accepted prefix otherwise.
    pub fn lookup_all<'t>(&self, input: &'t str) -> Vec<Match<'t, X>> {
        let mode = self.config.match_mode;
        let matches = if self.config.prefix_index {
            let mut matches: Vec<Match<'t, X>> = Vec::new();
            let mut end = 0;
            for (len, &root) in self.prefixes.prefixes_of(input) {
                for m in find_all(&self.arena, root, input, len, mode) {
                    // Each root reports its own longest prefix; only the
                    // longest overall survives.
                    match match_end(&m).cmp(&end) {
                        Ordering::Less => continue,
                        Ordering::Greater => {
                            end = match_end(&m);
                            matches.clear();
                        }
                        Ordering::Equal => {}
                    }
                    if !matches.contains(&m) {
                        matches.push(m);
                    }
                }
            }
            matches
        } else {
            find_all(&self.arena, self.root, input, 0, mode)
        };
        trace!(
            "lookup over {} chars: {} matches",
            input.chars().count(),
            matches.len()
        );
        matches
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.pattern_count
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }

    /// Number of automaton states, including roots.
    pub fn state_count(&self) -> usize {
        self.arena.len()
    }
}

/// Character offset where a match's group 0 ends.
fn match_end<X>(m: &Match<'_, X>) -> usize {
    m.span(0).map_or(0, |(_, end)| end)
}
