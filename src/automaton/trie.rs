//! Literal-prefix dispatch trie.
//!
//! Patterns that open with a run of plain literals are indexed here by that
//! run; only the remainder is compiled into the automaton. A lookup walks the
//! input through the trie once and yields every registered prefix it passes.
//!
//! All nodes are stored in a Vec and referenced by index, the same way the
//! automaton arena stores states.

use smallvec::SmallVec;

/// Index into the trie arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
struct TrieIdx(u32);

impl TrieIdx {
    fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct TrieNode<V> {
    /// Children as (char, index) pairs, kept sorted by char
    children: SmallVec<[(char, TrieIdx); 4]>,
    value: Option<V>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            children: SmallVec::new(),
            value: None,
        }
    }
}

/// A character trie mapping literal prefixes to values.
#[derive(Clone, Debug)]
pub struct PrefixTrie<V> {
    nodes: Vec<TrieNode<V>>,
    len: usize,
}

impl<V> Default for PrefixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PrefixTrie<V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            len: 0,
        }
    }

    /// Number of prefixes holding a value.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn child(&self, parent: TrieIdx, c: char) -> Option<TrieIdx> {
        let children = &self.nodes[parent.get()].children;
        children
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|pos| children[pos].1)
    }

    fn get_or_create_child(&mut self, parent: TrieIdx, c: char) -> TrieIdx {
        let children = &self.nodes[parent.get()].children;
        match children.binary_search_by_key(&c, |&(k, _)| k) {
            Ok(pos) => children[pos].1,
            Err(pos) => {
                let child = TrieIdx(self.nodes.len() as u32);
                self.nodes.push(TrieNode::default());
                self.nodes[parent.get()].children.insert(pos, (c, child));
                child
            }
        }
    }

    /// The value stored for exactly `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&V> {
        let mut node = TrieIdx::default();
        for c in prefix.chars() {
            node = self.child(node, c)?;
        }
        self.nodes[node.get()].value.as_ref()
    }

    /// The value for `prefix`, creating it with `make` if absent.
    pub fn get_or_insert_with(&mut self, prefix: &str, make: impl FnOnce() -> V) -> &V {
        let mut node = TrieIdx::default();
        for c in prefix.chars() {
            node = self.get_or_create_child(node, c);
        }
        let slot = &mut self.nodes[node.get()].value;
        if slot.is_none() {
            self.len += 1;
        }
        slot.get_or_insert_with(make)
    }

    /// Every stored prefix of `input`, shortest first, with its length in
    /// characters.
    pub fn prefixes_of(&self, input: &str) -> Vec<(usize, &V)> {
        let mut found = Vec::new();
        let mut node = TrieIdx::default();
        if let Some(v) = &self.nodes[node.get()].value {
            found.push((0, v));
        }
        for (i, c) in input.chars().enumerate() {
            match self.child(node, c) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(v) = &self.nodes[node.get()].value {
                found.push((i + 1, v));
            }
        }
        found
    }
}
