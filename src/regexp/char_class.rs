//! Bracketed character classes: `[a-z]`, `[^abc]`, `[a-z&&[^aeiou]]`.

use rustc_hash::FxHashSet;

use super::parser::{RegexpError, RegexpParse};

/// A pair of runes representing an inclusive range [lo, hi].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunePair {
    pub lo: char,
    pub hi: char,
}

impl RunePair {
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.lo <= c && c <= self.hi
    }
}

/// A predicate over a single character.
///
/// A character matches when it is in the union of `singles` and `ranges`
/// and every intersected sub-class also matches it; `negated` flips the
/// result.
#[derive(Debug, Clone, Default)]
pub struct CharClass {
    singles: FxHashSet<char>,
    ranges: Vec<RunePair>,
    intersections: Vec<CharClass>,
    negated: bool,
}

impl CharClass {
    pub fn matches(&self, c: char) -> bool {
        let in_union = self.singles.contains(&c) || self.ranges.iter().any(|rp| rp.contains(c));
        let hit = in_union && self.intersections.iter().all(|sub| sub.matches(c));
        hit != self.negated
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn ranges(&self) -> &[RunePair] {
        &self.ranges
    }
}

/// Parse a complete bracket expression such as `[^a-c]`.
///
/// The whole string must be consumed.
pub fn parse_char_class(s: &str) -> Result<CharClass, RegexpError> {
    let mut parse = RegexpParse::new(s);
    match parse.peek() {
        Some('[') => {
            parse.next_rune()?;
        }
        _ => return Err(RegexpError::syntax("expected '['", 0)),
    }
    let class = read_char_class(&mut parse, 0)?;
    if !parse.is_empty() {
        return Err(RegexpError::syntax(
            "unexpected characters after ']'",
            parse.index(),
        ));
    }
    Ok(class)
}

/// Read a class body; the opening `[` at `open_at` has been consumed.
pub(crate) fn read_char_class(
    parse: &mut RegexpParse,
    open_at: usize,
) -> Result<CharClass, RegexpError> {
    let unclosed = || RegexpError::syntax("unclosed character class", open_at);

    let mut class = CharClass::default();
    if parse.peek() == Some('^') {
        parse.next_rune()?;
        class.negated = true;
    }

    loop {
        match parse.peek() {
            None => return Err(unclosed()),
            Some(']') => break,
            Some('&') if parse.peek_at(1) == Some('&') => break,
            Some(_) => read_item(parse, &mut class, open_at)?,
        }
    }

    while parse.peek() == Some('&') && parse.peek_at(1) == Some('&') {
        parse.next_rune()?;
        parse.next_rune()?;
        let sub_at = parse.index();
        parse.require('[')?;
        let sub = read_char_class(parse, sub_at)?;
        class.intersections.push(sub);
    }

    if parse.is_empty() {
        return Err(unclosed());
    }
    parse.require(']')?;

    class.ranges = simplify_rune_range(std::mem::take(&mut class.ranges));
    Ok(class)
}

/// Read a single character or `first-second` range into `class`.
fn read_item(
    parse: &mut RegexpParse,
    class: &mut CharClass,
    open_at: usize,
) -> Result<(), RegexpError> {
    let lo = read_class_char(parse, open_at)?;

    // A '-' right before ']' is a literal.
    if parse.peek() != Some('-') || matches!(parse.peek_at(1), Some(']') | None) {
        class.singles.insert(lo);
        return Ok(());
    }
    parse.next_rune()?;
    let hi_at = parse.index();
    let hi = read_class_char(parse, open_at)?;
    if hi < lo {
        return Err(RegexpError::validation(
            format!("invalid range {}-{}", lo, hi),
            hi_at,
        ));
    }
    class.ranges.push(RunePair { lo, hi });
    Ok(())
}

/// Read one possibly-escaped character inside a class.
fn read_class_char(parse: &mut RegexpParse, open_at: usize) -> Result<char, RegexpError> {
    let unclosed = || RegexpError::syntax("unclosed character class", open_at);
    let c = parse.next_rune().map_err(|_| unclosed())?;
    if c == '\\' {
        return parse.next_rune().map_err(|_| unclosed());
    }
    Ok(c)
}

/// Sort and merge overlapping or adjacent rune ranges.
pub fn simplify_rune_range(mut ranges: Vec<RunePair>) -> Vec<RunePair> {
    if ranges.is_empty() {
        return ranges;
    }
    ranges.sort_by_key(|rp| rp.lo);

    let mut out: Vec<RunePair> = Vec::with_capacity(ranges.len());
    for rp in ranges {
        match out.last_mut() {
            Some(last) if (rp.lo as u32) <= (last.hi as u32).saturating_add(1) => {
                if rp.hi > last.hi {
                    last.hi = rp.hi;
                }
            }
            _ => out.push(rp),
        }
    }
    out
}
