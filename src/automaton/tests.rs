use super::*;
use crate::regexp::{compile, parse_pattern};

use proptest::prelude::*;

/// Compile one pattern with payload `"p"` and return its arena and start.
fn build(re: &str) -> (StateArena<&'static str>, StateId) {
    let parsed = parse_pattern(re).unwrap();
    let mut arena = StateArena::new();
    let frag = compile(&mut arena, &parsed.symbols);
    for &exit in &frag.exits {
        arena.add_accept(
            exit,
            Accept {
                payload: "p",
                group_count: parsed.group_count,
            },
        );
    }
    (arena, frag.start)
}

fn exact<'t>(re: &str, input: &'t str) -> Option<Match<'t, &'static str>> {
    let (arena, start) = build(re);
    find_first(&arena, start, input, 0, MatchMode::Exact)
}

fn all<'t>(re: &str, input: &'t str) -> Vec<Match<'t, &'static str>> {
    let (arena, start) = build(re);
    find_all(&arena, start, input, 0, MatchMode::Exact)
}

fn is_match(re: &str, input: &str) -> bool {
    exact(re, input).is_some()
}

#[test]
fn test_literal() {
    assert!(is_match("abc", "abc"));
    assert!(!is_match("abc", "abd"));
    assert!(!is_match("abc", "ab"));
    assert!(!is_match("abc", "abcd"));
}

#[test]
fn test_empty_pattern() {
    let m = exact("", "").unwrap();
    assert_eq!(m.group(0), Some(""));
    assert!(!is_match("", "a"));
}

#[test]
fn test_digit() {
    assert!(is_match(r"\d\d", "42"));
    assert!(!is_match(r"\d", "x"));
}

#[test]
fn test_bounded_range() {
    let m = exact("a{2,3}", "aaa").unwrap();
    assert_eq!(m.group(0), Some("aaa"));
    assert!(is_match("a{2,3}", "aa"));
    assert!(!is_match("a{2,3}", "a"));
    // Full-string consumption: no early acceptance.
    assert!(!is_match("a{2,3}", "aaaa"));
}

#[test]
fn test_longest_prefix_mode() {
    let (arena, start) = build("a{2,3}");
    let m = find_first(&arena, start, "aaaa", 0, MatchMode::LongestPrefix).unwrap();
    assert_eq!(m.group(0), Some("aaa"));
    assert!(find_first(&arena, start, "ab", 0, MatchMode::LongestPrefix).is_none());

    let (arena, start) = build("[a-c]+");
    let m = find_first(&arena, start, "abcx", 0, MatchMode::LongestPrefix).unwrap();
    assert_eq!(m.group(0), Some("abc"));
    assert_eq!(m.span(0), Some((0, 3)));
    assert!(find_first(&arena, start, "abcx", 0, MatchMode::Exact).is_none());
}

#[test]
fn test_optional_and_plus() {
    assert!(is_match("ab?c", "ac"));
    assert!(is_match("ab?c", "abc"));
    assert!(!is_match("ab?c", "abbc"));
    assert!(is_match("ab+c", "abbbbc"));
    assert!(!is_match("ab+c", "ac"));
}

#[test]
fn test_upper_bound_only() {
    assert!(is_match("xa{,2}", "x"));
    assert!(is_match("xa{,2}", "xaa"));
    assert!(!is_match("xa{,2}", "xaaa"));
}

#[test]
fn test_zero_repeat() {
    assert!(is_match("ab{0}c", "ac"));
    assert!(!is_match("ab{0}c", "abc"));
}

#[test]
fn test_char_class_pattern() {
    assert!(is_match("[a-z&&[^aeiou]]+", "rhythm"));
    assert!(!is_match("[a-z&&[^aeiou]]+", "rhyme"));
    assert!(is_match("[^0-9]", "x"));
    assert!(!is_match("[^0-9]", "5"));
}

#[test]
fn test_two_groups() {
    let m = exact(r"(\d+)-(\d+)", "12-345").unwrap();
    assert_eq!(m.group(0), Some("12-345"));
    assert_eq!(m.group(1), Some("12"));
    assert_eq!(m.group(2), Some("345"));
    assert_eq!(m.span(2), Some((3, 6)));
}

#[test]
fn test_nested_groups() {
    let m = exact("x((a+)(b))y", "xaaby").unwrap();
    assert_eq!(m.group(1), Some("aab"));
    assert_eq!(m.group(2), Some("aa"));
    assert_eq!(m.group(3), Some("b"));
}

#[test]
fn test_repeated_group_keeps_last_occurrence() {
    let m = exact("(ab){2}", "abab").unwrap();
    assert_eq!(m.group(1), Some("ab"));
    assert_eq!(m.span(1), Some((2, 4)));

    let m = exact(r"(\d)+", "123").unwrap();
    assert_eq!(m.group(1), Some("3"));
    assert_eq!(m.span(1), Some((2, 3)));

    let m = exact("(a|b){1,3}", "a|ba|b").unwrap();
    assert_eq!(m.span(1), Some((3, 6)));
}

#[test]
fn test_optional_group_not_taken() {
    let m = exact("a(b)?c", "ac").unwrap();
    assert_eq!(m.group(1), None);
    let m = exact("a(b)?c", "abc").unwrap();
    assert_eq!(m.group(1), Some("b"));
}

#[test]
fn test_empty_group() {
    let m = exact("a()b", "ab").unwrap();
    assert_eq!(m.group(1), Some(""));
    assert_eq!(m.span(1), Some((1, 1)));
}

#[test]
fn test_group_at_pattern_start() {
    let m = exact("(ab)c", "abc").unwrap();
    assert_eq!(m.group(1), Some("ab"));
}

#[test]
fn test_ambiguous_split_reports_every_path() {
    // (a+)(a+) over "aaa" splits two ways.
    let matches = all("(a+)(a+)", "aaa");
    let mut splits: Vec<_> = matches
        .iter()
        .map(|m| (m.group(1).unwrap(), m.group(2).unwrap()))
        .collect();
    splits.sort();
    assert_eq!(splits, vec![("a", "aa"), ("aa", "a")]);
}

#[test]
fn test_multibyte_input() {
    let m = exact("(é+)x", "ééx").unwrap();
    assert_eq!(m.group(1), Some("éé"));
    assert_eq!(m.span(1), Some((0, 2)));
}

#[test]
fn test_offset_scanning() {
    let (arena, start) = build(r"(\d+)");
    let m = find_first(&arena, start, "id42", 2, MatchMode::Exact).unwrap();
    assert_eq!(m.group(0), Some("id42"));
    assert_eq!(m.group(1), Some("42"));
    assert!(find_first(&arena, start, "id42", 9, MatchMode::Exact).is_none());
}

#[test]
fn test_nullable_loop_terminates() {
    assert!(is_match("(a?)+b", "aab"));
    assert!(is_match("(a?)+b", "b"));
    assert!(is_match("((a?){2,})+", ""));
}

#[test]
fn test_long_input_stays_linear() {
    let input = "a".repeat(2000);
    assert!(is_match("a+a+a+", &input));
    assert!(!is_match("a+b", &input));
}

#[test]
fn test_nested_unbounded_groups() {
    let input = format!("{}b", "a".repeat(40));
    let m = exact("((a+)+)+b", &input).unwrap();
    assert_eq!(m.group(0), Some(input.as_str()));
    assert!(!is_match("((a+)+)+b", &"a".repeat(40)));

    let matches = all("((a+)+)+b", "aab");
    assert!(!matches.is_empty());
    for m in &matches {
        assert_eq!(m.span(1).map(|(_, end)| end), Some(2));
    }
}

#[test]
fn test_idempotent() {
    let (arena, start) = build(r"(\d+)-(\d+)?");
    let first = find_all(&arena, start, "7-88", 0, MatchMode::Exact);
    let second = find_all(&arena, start, "7-88", 0, MatchMode::Exact);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[test]
fn test_quantified_group_copies_are_independent() {
    let (arena, start) = build("(ab){2,3}");
    let before = arena.len();
    assert!(find_first(&arena, start, "ababab", 0, MatchMode::Exact).is_some());
    assert!(find_first(&arena, start, "abab", 0, MatchMode::Exact).is_some());
    assert!(find_first(&arena, start, "ab", 0, MatchMode::Exact).is_none());
    assert!(find_first(&arena, start, "abababab", 0, MatchMode::Exact).is_none());
    assert_eq!(arena.len(), before);
}

proptest! {
    #[test]
    fn prop_bounded_quantifier_counts(min in 0u32..5, extra in 0u32..4, k in 0usize..10) {
        let max = min + extra;
        let re = format!("xa{{{},{}}}y", min, max);
        let input = format!("x{}y", "a".repeat(k));
        let expected = (min as usize) <= k && k <= max as usize;
        prop_assert_eq!(is_match(&re, &input), expected);
    }

    #[test]
    fn prop_unbounded_quantifier_counts(min in 0u32..5, k in 0usize..12) {
        let re = format!("(ab){{{},}}", min);
        let input = "ab".repeat(k);
        prop_assert_eq!(is_match(&re, &input), k >= min as usize);
    }

    #[test]
    fn prop_group_span_matches_consumed_text(a in "[0-9]{1,6}", b in "[a-c]{0,6}") {
        let input = format!("{a}:{b}");
        let m = exact(r"(\d+):([a-c]{0,6})", &input).unwrap();
        prop_assert_eq!(m.group(1), Some(a.as_str()));
        prop_assert_eq!(m.group(2), Some(b.as_str()));
    }

    #[test]
    fn prop_matching_is_idempotent(input in "[ab0-9-]{0,8}") {
        let (arena, start) = build(r"([ab]+)?-?(\d{1,3})?");
        let first = find_all(&arena, start, &input, 0, MatchMode::Exact);
        let second = find_all(&arena, start, &input, 0, MatchMode::Exact);
        prop_assert_eq!(first, second);
    }
}
