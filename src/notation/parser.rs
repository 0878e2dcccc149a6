//! Einsum equation parser.
//!
//! Parses strings like "ij,jk->ik" into an unresolved [`EinsumNotation`].

use alloc::string::String;
use alloc::vec::Vec;

use super::notation::EinsumNotation;
use super::subscript::Subscript;
use crate::error::{EinsumError, EinsumResult};

/// Parses an einsum equation string.
///
/// # Grammar
///
/// ```text
/// equation    ::= inputs ('->' output)?
/// inputs      ::= subscript (',' subscript)*
/// output      ::= subscript
/// subscript   ::= (label | '...')*        at most one '...'
/// label       ::= [a-zA-Z]
/// ```
///
/// Whitespace anywhere in the equation is ignored. Subscripts may be empty
/// (scalar operands), but the input section may not.
pub fn parse_einsum(equation: &str) -> EinsumResult<EinsumNotation> {
    let compact: String = equation.chars().filter(|c| !c.is_whitespace()).collect();

    let (inputs_str, output_str) = match compact.find("->") {
        Some(arrow_pos) => (&compact[..arrow_pos], Some(&compact[arrow_pos + 2..])),
        None => (compact.as_str(), None),
    };

    if inputs_str.is_empty() {
        return Err(EinsumError::syntax(alloc::format!(
            "missing input subscripts in '{}'",
            equation
        )));
    }

    let mut inputs = Vec::new();
    for input_str in inputs_str.split(',') {
        inputs.push(parse_subscript(input_str)?);
    }

    let output = match output_str {
        Some(out_str) => {
            if out_str.contains(',') {
                return Err(EinsumError::syntax("output subscript may not contain ','"));
            }
            if out_str.contains("->") {
                return Err(EinsumError::syntax("more than one '->' in equation"));
            }
            Some(parse_subscript(out_str)?)
        }
        None => None,
    };

    Ok(EinsumNotation::new(inputs, output).with_original(compact.as_str()))
}

/// Parses a single subscript string.
fn parse_subscript(s: &str) -> EinsumResult<Subscript> {
    let mut subscript = Subscript::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if chars.next() != Some('.') || chars.next() != Some('.') {
                    return Err(EinsumError::syntax(alloc::format!(
                        "period '.' found outside of ellipsis in '{}'",
                        s
                    )));
                }
                if !subscript.push_ellipsis() {
                    return Err(EinsumError::syntax(alloc::format!(
                        "more than one ellipsis in subscript '{}'",
                        s
                    )));
                }
            }
            'a'..='z' | 'A'..='Z' => subscript.push_named(c),
            _ => {
                return Err(EinsumError::syntax(alloc::format!(
                    "invalid character '{}' in subscript '{}'",
                    c, s
                )));
            }
        }
    }

    Ok(subscript)
}
