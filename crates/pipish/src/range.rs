//! Range specs for field- and line-selection builtins.
//!
//! A spec like `"2-4,6"` (as understood by `cut -f`) parses into a list of
//! closed, 1-indexed [`Range`]s. An open end (`"3-"`) selects everything
//! from the start position onwards.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::PipeError;

/// Sentinel upper bound meaning "unbounded".
pub const RANGE_MAX: usize = usize::MAX;

/// A closed interval `[lo, hi]`, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub lo: usize,
    pub hi: usize,
}

impl Range {
    /// True if the 1-indexed position falls inside this range.
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.lo && pos <= self.hi
    }
}

fn item_regex() -> &'static Regex {
    static ITEM_RE: OnceLock<Regex> = OnceLock::new();
    ITEM_RE.get_or_init(|| {
        Regex::new(r"^([1-9][0-9]*)?-([1-9][0-9]*)?$").unwrap()
    })
}

/// Parse a comma-separated range spec: `N`, `N-M`, `N-` or `-M`.
pub fn parse_range_spec(spec: &str) -> Result<Vec<Range>, PipeError> {
    let mut ranges = Vec::new();
    for item in spec.split(',') {
        ranges.push(parse_single_range(item, item_regex())?);
    }
    Ok(ranges)
}

fn parse_single_range(item: &str, item_re: &Regex) -> Result<Range, PipeError> {
    // special case: a bare number selects just that position
    if !item.starts_with('-') {
        if let Ok(n) = item.parse::<usize>() {
            if n > 0 {
                return Ok(Range { lo: n, hi: n });
            }
        }
    }

    let caps = item_re
        .captures(item)
        .ok_or_else(|| PipeError::InvalidRange(item.to_string()))?;

    let lo = caps.get(1).map(|m| m.as_str());
    let hi = caps.get(2).map(|m| m.as_str());

    // "-" on its own selects nothing and is rejected
    if lo.is_none() && hi.is_none() {
        return Err(PipeError::InvalidRange(
            "start and end cannot both be empty".to_string(),
        ));
    }

    let lo = lo.map_or(1, |s| s.parse().unwrap_or(1));
    let hi = hi.map_or(RANGE_MAX, |s| s.parse().unwrap_or(RANGE_MAX));

    Ok(Range { lo, hi })
}
