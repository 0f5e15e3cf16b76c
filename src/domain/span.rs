//! Verse spans: inclusive, 1-based ranges encoded as `"start-end"` or `"n"`.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::{DomainError, DomainResult};

/// An inclusive verse range.
///
/// The single form `"n"` and the range form `"a-b"` are kept apart so that a
/// span is written back in the encoding it was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Span {
    Single(u32),
    Range { start: u32, end: u32 },
}

impl Span {
    pub fn range(start: u32, end: u32) -> DomainResult<Self> {
        if start == 0 {
            return Err(DomainError::invalid_span(
                format!("{start}-{end}"),
                "spans are 1-based",
            ));
        }
        if end < start {
            return Err(DomainError::invalid_span(
                format!("{start}-{end}"),
                "end precedes start",
            ));
        }
        Ok(Self::Range { start, end })
    }

    pub fn start(&self) -> u32 {
        match *self {
            Span::Single(n) => n,
            Span::Range { start, .. } => start,
        }
    }

    pub fn end(&self) -> u32 {
        match *self {
            Span::Single(n) => n,
            Span::Range { end, .. } => end,
        }
    }

    /// Shift both bounds by `offset`, keeping the encoding.
    ///
    /// `None` when a bound would exceed `u32::MAX`.
    pub fn checked_shift(&self, offset: u32) -> Option<Self> {
        match *self {
            Span::Single(n) => n.checked_add(offset).map(Span::Single),
            Span::Range { start, end } => Some(Span::Range {
                start: start.checked_add(offset)?,
                end: end.checked_add(offset)?,
            }),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Single(n) => write!(f, "{n}"),
            Span::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

fn parse_bound(raw: &str, part: &str) -> DomainResult<u32> {
    part.trim()
        .parse::<u32>()
        .map_err(|e| DomainError::invalid_span(raw, format!("bad bound '{}': {e}", part.trim())))
}

impl FromStr for Span {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((start, end)) => {
                if end.contains('-') {
                    return Err(DomainError::invalid_span(s, "more than two bounds"));
                }
                let start = parse_bound(s, start)?;
                let end = parse_bound(s, end)?;
                Span::range(start, end).map_err(|e| match e {
                    DomainError::InvalidSpan { reason, .. } => DomainError::invalid_span(s, reason),
                    other => other,
                })
            }
            None => {
                let n = parse_bound(s, s)?;
                if n == 0 {
                    return Err(DomainError::invalid_span(s, "spans are 1-based"));
                }
                Ok(Span::Single(n))
            }
        }
    }
}

/// A node's span as read from input: parsed, or kept verbatim when it does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanValue {
    Valid(Span),
    Malformed(String),
}

impl SpanValue {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Span>() {
            Ok(span) => SpanValue::Valid(span),
            Err(_) => SpanValue::Malformed(raw.to_string()),
        }
    }

    pub fn as_span(&self) -> Option<Span> {
        match self {
            SpanValue::Valid(span) => Some(*span),
            SpanValue::Malformed(_) => None,
        }
    }

    /// A range whose end precedes its start, e.g. `"9-3"`.
    pub fn is_inverted(&self) -> bool {
        let SpanValue::Malformed(raw) = self else {
            return false;
        };
        raw.split_once('-')
            .and_then(|(a, b)| Some((a.trim().parse::<u32>().ok()?, b.trim().parse::<u32>().ok()?)))
            .is_some_and(|(start, end)| end < start)
    }

    /// Re-parse to recover the reason a malformed span was rejected.
    pub fn error(&self) -> Option<DomainError> {
        match self {
            SpanValue::Valid(_) => None,
            SpanValue::Malformed(raw) => raw.parse::<Span>().err(),
        }
    }
}

impl From<Span> for SpanValue {
    fn from(span: Span) -> Self {
        SpanValue::Valid(span)
    }
}

impl fmt::Display for SpanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanValue::Valid(span) => span.fmt(f),
            SpanValue::Malformed(raw) => f.write_str(raw),
        }
    }
}
