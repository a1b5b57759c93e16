//! `if <condition>|<then>|<else>` parsing.
//!
//! Only pipes at brace depth 0 separate segments; a pipe inside a nested
//! directive belongs to that directive. There is no escape for a literal `|`
//! in a branch.

use crate::error::{Error, Result};

/// The three trimmed segments of a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branches<'a> {
    pub condition: &'a str,
    pub then: &'a str,
    pub otherwise: &'a str,
}

/// Split the arguments of an `if` directive.
pub fn split_branches(args: &str) -> Result<Branches<'_>> {
    let mut segments = Vec::with_capacity(3);
    let mut depth = 0usize;
    let mut from = 0;

    for (i, byte) in args.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'|' if depth == 0 => {
                segments.push(args[from..i].trim());
                from = i + 1;
            },
            _ => {},
        }
    }
    segments.push(args[from..].trim());

    match *segments.as_slice() {
        [condition, then, otherwise] => Ok(Branches {
            condition,
            then,
            otherwise,
        }),
        _ => Err(Error::MalformedConditional {
            segments: segments.len(),
        }),
    }
}

/// A resolved condition must be exactly `True` or `False`.
pub fn parse_condition(value: &str) -> Result<bool> {
    match value {
        "True" => Ok(true),
        "False" => Ok(false),
        other => Err(Error::NonBooleanCondition {
            value: other.to_string(),
        }),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn splits_and_trims() {
        let b = split_branches(" True | yes | no ").unwrap();
        assert_eq!(b, Branches {
            condition: "True",
            then: "yes",
            otherwise: "no",
        });
    }

    #[test]
    fn nested_pipes_stay_in_their_directive() {
        let b = split_branches("{var exists a}|{if False|x|y}|z").unwrap();
        assert_eq!(b.condition, "{var exists a}");
        assert_eq!(b.then, "{if False|x|y}");
        assert_eq!(b.otherwise, "z");
    }

    #[test]
    fn empty_branches_are_allowed() {
        let b = split_branches("True||").unwrap();
        assert_eq!(b.then, "");
        assert_eq!(b.otherwise, "");
    }

    #[rstest]
    #[case("True", 1)]
    #[case("True|yes", 2)]
    #[case("True|a|b|c", 4)]
    fn wrong_segment_count(#[case] args: &str, #[case] found: usize) {
        match split_branches(args) {
            Err(Error::MalformedConditional { segments }) => assert_eq!(segments, found),
            other => panic!("expected MalformedConditional, got {other:?}"),
        }
    }

    #[rstest]
    #[case("True", Some(true))]
    #[case("False", Some(false))]
    #[case("true", None)]
    #[case("1", None)]
    #[case(" True", None)]
    #[case("False ", None)]
    #[case("", None)]
    fn condition_values(#[case] value: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_condition(value).ok(), expected);
    }
}
