//! Pattern parsing for rule patterns.
//!
//! This module parses pattern strings into a flat sequence of symbols for NFA
//! construction. Supports:
//! - literal characters
//! - `\d` any decimal digit
//! - `[...]` character classes with ranges, negation and `&&` intersection
//! - `(...)` capturing groups, numbered by the order of their `(`
//! - `+` one-or-more quantifier
//! - `?` optional quantifier
//! - `{m}`, `{m,}`, `{,n}`, `{m,n}` range quantifiers
//!
//! There is no alternation, no `.` and no `*` quantifier; those characters
//! are plain literals.

use std::sync::Arc;

use super::char_class::{read_char_class, CharClass};

/// The escape character.
const ESCAPE: char = '\\';

/// Characters that stand for themselves when escaped.
const SELF_ESCAPES: &[char] = &['\\', '{', '+', '?', '(', ')'];

/// Largest bound accepted in a `{m,n}` quantifier.
///
/// Quantifiers are expanded into copies of the repeated fragment, so the
/// bound directly sizes the automaton.
pub const MAX_REPEAT: u32 = 1000;

/// What a symbol matches.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// A single literal character.
    Literal(char),
    /// `\d`: one ASCII decimal digit.
    Digit,
    /// A bracketed character class.
    Class(Arc<CharClass>),
    /// A capturing group with its children and group index (1-based).
    Group { index: usize, children: Vec<Symbol> },
}

/// A quantified symbol in the pattern.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Minimum number of times to match
    pub quant_min: u32,
    /// Maximum number of times to match, `None` for unbounded
    pub quant_max: Option<u32>,
}

impl Symbol {
    pub fn new(kind: SymbolKind) -> Self {
        Self {
            kind,
            quant_min: 1,
            quant_max: Some(1),
        }
    }

    /// Returns true if this symbol matches exactly once (no quantifier).
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.quant_min == 1 && self.quant_max == Some(1)
    }

    /// Returns the literal character if this is an unquantified literal.
    #[inline]
    pub fn as_fixed_literal(&self) -> Option<char> {
        match self.kind {
            SymbolKind::Literal(c) if self.is_singleton() => Some(c),
            _ => None,
        }
    }
}

/// The result of parsing a pattern.
#[derive(Debug, Clone, Default)]
pub struct ParsedPattern {
    /// Top-level symbols, in order
    pub symbols: Vec<Symbol>,
    /// Number of capturing groups declared anywhere in the pattern
    pub group_count: usize,
}

impl ParsedPattern {
    /// Split off the maximal leading run of unquantified literals.
    ///
    /// Returns the literal prefix and the symbols that follow it.
    pub fn literal_prefix(&self) -> (String, &[Symbol]) {
        let mut prefix = String::new();
        for (i, symbol) in self.symbols.iter().enumerate() {
            match symbol.as_fixed_literal() {
                Some(c) => prefix.push(c),
                None => return (prefix, &self.symbols[i..]),
            }
        }
        (prefix, &[])
    }
}

/// Broad category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexpErrorKind {
    /// Malformed pattern, bracket expression or quantifier.
    Syntax,
    /// Well-formed but meaningless, e.g. `z-a` or `{3,1}`.
    Validation,
}

/// Error type for pattern parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexpError {
    pub kind: RegexpErrorKind,
    pub message: String,
    /// Character offset in the pattern
    pub offset: usize,
}

impl RegexpError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self {
            kind: RegexpErrorKind::Syntax,
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn validation(message: impl Into<String>, offset: usize) -> Self {
        Self {
            kind: RegexpErrorKind::Validation,
            message: message.into(),
            offset,
        }
    }
}

impl std::fmt::Display for RegexpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for RegexpError {}

/// Parser state shared by the pattern and character-class readers.
pub(crate) struct RegexpParse {
    chars: Vec<char>,
    index: usize,
    last_index: usize,
    next_group: usize,
}

impl RegexpParse {
    pub(crate) fn new(re: &str) -> Self {
        Self {
            chars: re.chars().collect(),
            index: 0,
            last_index: 0,
            next_group: 1,
        }
    }

    pub(crate) fn next_rune(&mut self) -> Result<char, RegexpError> {
        let c = self
            .chars
            .get(self.index)
            .copied()
            .ok_or_else(|| RegexpError::syntax("end of string", self.index))?;
        self.last_index = self.index;
        self.index += 1;
        Ok(c)
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    pub(crate) fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).copied()
    }

    pub(crate) fn require(&mut self, wanted: char) -> Result<(), RegexpError> {
        match self.peek() {
            Some(got) if got == wanted => {
                self.next_rune()?;
                Ok(())
            }
            Some(got) => Err(RegexpError::syntax(
                format!("expected '{}', got '{}'", wanted, got),
                self.index,
            )),
            None => Err(RegexpError::syntax(
                format!("expected '{}', got end of string", wanted),
                self.index,
            )),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.index >= self.chars.len()
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn last_index(&self) -> usize {
        self.last_index
    }
}

/// Parse a pattern string into its symbol sequence.
pub fn parse_pattern(re: &str) -> Result<ParsedPattern, RegexpError> {
    let mut parse = RegexpParse::new(re);
    let symbols = read_sequence(&mut parse, 0)?;
    Ok(ParsedPattern {
        symbols,
        group_count: parse.next_group - 1,
    })
}

/// Read symbols until end of input (level 0) or a closing `)` (nested).
///
/// The closing `)` is left for the caller.
fn read_sequence(parse: &mut RegexpParse, level: usize) -> Result<Vec<Symbol>, RegexpError> {
    let mut sequence = Vec::new();

    while let Some(c) = parse.peek() {
        if c == ')' {
            if level == 0 {
                return Err(RegexpError::syntax("unbalanced ')'", parse.index()));
            }
            return Ok(sequence);
        }
        let mut symbol = read_atom(parse, level)?;
        read_quantifier(parse, &mut symbol)?;
        sequence.push(symbol);
    }

    Ok(sequence)
}

/// Read one atom, without its quantifier.
fn read_atom(parse: &mut RegexpParse, level: usize) -> Result<Symbol, RegexpError> {
    let b = parse.next_rune()?;

    match b {
        '(' => {
            let open_at = parse.last_index();
            let index = parse.next_group;
            parse.next_group += 1;
            let children = read_sequence(parse, level + 1)?;
            if parse.is_empty() {
                return Err(RegexpError::syntax("unclosed '('", open_at));
            }
            parse.require(')')?;
            Ok(Symbol::new(SymbolKind::Group { index, children }))
        }
        '[' => {
            let open_at = parse.last_index();
            let class = read_char_class(parse, open_at)?;
            Ok(Symbol::new(SymbolKind::Class(Arc::new(class))))
        }
        '+' | '?' | '{' => Err(RegexpError::syntax(
            format!("quantifier '{}' without a preceding symbol", b),
            parse.last_index(),
        )),
        ESCAPE => {
            let at = parse.last_index();
            let next = parse
                .next_rune()
                .map_err(|_| RegexpError::syntax("'\\' at end of pattern", at))?;
            if next == 'd' {
                Ok(Symbol::new(SymbolKind::Digit))
            } else if SELF_ESCAPES.contains(&next) {
                Ok(Symbol::new(SymbolKind::Literal(next)))
            } else {
                Err(RegexpError::syntax(
                    format!("invalid escape '\\{}'", next),
                    at,
                ))
            }
        }
        c => Ok(Symbol::new(SymbolKind::Literal(c))),
    }
}

/// Read a quantifier (`+`, `?`, `{m,n}`) if one follows.
fn read_quantifier(parse: &mut RegexpParse, symbol: &mut Symbol) -> Result<(), RegexpError> {
    match parse.peek() {
        Some('+') => {
            parse.next_rune()?;
            symbol.quant_min = 1;
            symbol.quant_max = None;
        }
        Some('?') => {
            parse.next_rune()?;
            symbol.quant_min = 0;
            symbol.quant_max = Some(1);
        }
        Some('{') => {
            parse.next_rune()?;
            read_range_quantifier(parse, symbol)?;
        }
        _ => {}
    }
    Ok(())
}

/// Read a range quantifier body, after the `{`.
fn read_range_quantifier(parse: &mut RegexpParse, symbol: &mut Symbol) -> Result<(), RegexpError> {
    let open_at = parse.last_index();
    let lo = read_bound(parse, open_at)?;

    let next = parse
        .next_rune()
        .map_err(|_| RegexpError::syntax("unclosed '{'", open_at))?;
    let (min, max) = match next {
        '}' => match lo {
            Some(m) => (m, Some(m)),
            None => {
                return Err(RegexpError::syntax(
                    "invalid range quantifier, expecting digits",
                    parse.last_index(),
                ))
            }
        },
        ',' => {
            let hi = read_bound(parse, open_at)?;
            let close = parse
                .next_rune()
                .map_err(|_| RegexpError::syntax("unclosed '{'", open_at))?;
            if close != '}' {
                return Err(RegexpError::syntax(
                    format!("invalid character '{}' in quantifier", close),
                    parse.last_index(),
                ));
            }
            match (lo, hi) {
                (None, None) => {
                    return Err(RegexpError::syntax(
                        "invalid range quantifier, expecting digits",
                        open_at,
                    ))
                }
                (Some(m), None) => (m, None),
                (None, Some(n)) => (0, Some(n)),
                (Some(m), Some(n)) => {
                    if m > n {
                        return Err(RegexpError::validation(
                            format!("invalid range quantifier {{{},{}}}", m, n),
                            open_at,
                        ));
                    }
                    (m, Some(n))
                }
            }
        }
        other => {
            return Err(RegexpError::syntax(
                format!("invalid character '{}' in quantifier", other),
                parse.last_index(),
            ))
        }
    };

    symbol.quant_min = min;
    symbol.quant_max = max;
    Ok(())
}

/// Read an optional run of decimal digits.
fn read_bound(parse: &mut RegexpParse, open_at: usize) -> Result<Option<u32>, RegexpError> {
    let start = parse.index();
    let mut digits = String::new();
    while let Some(c) = parse.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        parse.next_rune()?;
    }
    if parse.is_empty() {
        return Err(RegexpError::syntax("unclosed '{'", open_at));
    }
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.parse::<u32>() {
        Ok(n) if n <= MAX_REPEAT => Ok(Some(n)),
        _ => Err(RegexpError::validation(
            format!("quantifier bound {} exceeds {}", digits, MAX_REPEAT),
            start,
        )),
    }
}
