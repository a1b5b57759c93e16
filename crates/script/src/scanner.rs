//! Bracket scanner.
//!
//! Finds the next directive to resolve. Offsets are byte offsets; `{` and `}`
//! are ASCII so every offset lands on a char boundary.

use crate::error::{Error, Result};

/// Deepest allowed directive nesting.
pub const MAX_DEPTH: usize = 10;

/// Byte offsets of a directive's opening and closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Text between the braces.
    pub fn interior<'a>(&self, script: &'a str) -> &'a str {
        &script[self.start + 1..self.end]
    }
}

/// The first innermost closed directive, plus the opening braces that
/// enclose it (outermost first).
struct Found {
    span: Span,
    enclosing: Vec<usize>,
}

fn locate(script: &str) -> Result<Option<Found>> {
    let mut open: Vec<usize> = Vec::new();
    let mut found: Option<Found> = None;

    for (i, byte) in script.bytes().enumerate() {
        match byte {
            b'{' => {
                open.push(i);
                if open.len() > MAX_DEPTH {
                    return Err(Error::DepthExceeded { max: MAX_DEPTH });
                }
            },
            // A `}` with nothing open is literal text.
            b'}' => {
                if let Some(start) = open.pop()
                    && found.is_none()
                {
                    found = Some(Found {
                        span: Span { start, end: i },
                        enclosing: open.clone(),
                    });
                }
            },
            _ => {},
        }
    }

    if !open.is_empty() {
        return Err(Error::UnbalancedBrackets);
    }
    Ok(found)
}

/// Locate the first innermost directive.
///
/// Scanning left to right, the first `}` that closes an open `{` marks the
/// span, which makes resolution innermost-first, left-to-right. The whole
/// script is checked, so an unclosed `{` anywhere fails even when an earlier
/// directive is complete.
pub fn scan(script: &str) -> Result<Option<Span>> {
    Ok(locate(script)?.map(|f| f.span))
}

/// The span the engine should dispatch next.
///
/// Same as [`scan`], except that a span nested inside an `if` directive is
/// widened to the outermost enclosing `if`, whose branches are resolved
/// lazily by the conditional.
pub fn next_directive(script: &str) -> Result<Option<Span>> {
    let Some(found) = locate(script)? else {
        return Ok(None);
    };
    for &start in &found.enclosing {
        if is_conditional(script, start) {
            return Ok(Some(Span {
                start,
                end: matching_close(script, start),
            }));
        }
    }
    Ok(Some(found.span))
}

fn is_conditional(script: &str, start: usize) -> bool {
    script[start + 1..]
        .trim_start()
        .strip_prefix("if")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Offset of the `}` matching the `{` at `start`. Only called on scripts that
/// [`locate`] has already checked for balance.
fn matching_close(script: &str, start: usize) -> usize {
    let mut depth = 0usize;
    for (i, byte) in script.bytes().enumerate().skip(start) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            },
            _ => {},
        }
    }
    script.len() - 1
}
