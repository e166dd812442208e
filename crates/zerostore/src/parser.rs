//! Header and identifier parsers using nom
//!
//! Namespace identifier format:
//! ```text
//! name::version
//! ```
//!
//! Vary header format (RFC 9110):
//! ```text
//! Vary: Accept, Accept-Encoding
//! Vary: *
//! ```

use nom::{
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0},
    combinator::{rest, verify},
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::error::Result;

/// Separator between cache name and version tag
pub const NAMESPACE_SEPARATOR: &str = "::";

fn namespace_parts(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        verify(take_until(NAMESPACE_SEPARATOR), |s: &str| !s.is_empty()),
        tag(NAMESPACE_SEPARATOR),
        verify(rest, |s: &str| !s.is_empty()),
    )(input)
}

/// Split a namespace identifier into `(name, version)`
///
/// Fails when the identifier does not contain a non-empty name and version
/// joined by `::`.
pub fn parse_namespace(input: &str) -> Result<(&str, &str)> {
    let (_, parts) = namespace_parts(input)?;
    Ok(parts)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ',' && !c.is_whitespace())(input)
}

/// Parse the field names listed in a `Vary` header value
///
/// Names are returned as written; callers compare them case-insensitively.
pub fn parse_vary(input: &str) -> Vec<&str> {
    let list = separated_list0(
        delimited(multispace0, char(','), multispace0),
        field_name,
    );
    match delimited(multispace0, list, multispace0)(input) {
        Ok((_, names)) => names,
        Err(_) => Vec::new(),
    }
}
