//! Resolution of parsed equations against operand ranks.
//!
//! Expands every ellipsis into fresh labels, infers the output when the
//! equation has no `->` and checks that the labels are usable.

use alloc::collections::BTreeSet;
use alloc::string::ToString;
use alloc::vec::Vec;

use super::notation::{EinsumNotation, ResolvedEquation};
use super::parser::parse_einsum;
use crate::error::{EinsumError, EinsumResult};
use crate::shape::{Dim, Labels};

/// Parses and resolves an equation in one step.
///
/// `shapes[i]` is `None` when the rank of operand `i` is not statically known.
pub fn resolve_equation(
    equation: &str,
    shapes: &[Option<&[Dim]>],
) -> EinsumResult<ResolvedEquation> {
    let notation = parse_einsum(equation)?;
    resolve(&notation, shapes)
}

/// Resolves a parsed equation.
pub fn resolve(
    notation: &EinsumNotation,
    shapes: &[Option<&[Dim]>],
) -> EinsumResult<ResolvedEquation> {
    if shapes.len() != notation.num_inputs() {
        return Err(EinsumError::EquationArity {
            expected: notation.num_inputs(),
            got: shapes.len(),
        });
    }

    let (inputs, broadcast) = expand_inputs(notation, shapes)?;

    let explicit_output = notation.output().is_some();
    let mut output = match notation.output() {
        Some(out) => out.expand_ellipsis(&broadcast),
        None => infer_output(&inputs, &broadcast),
    };

    let present: BTreeSet<char> = inputs.iter().flat_map(|l| l.iter().copied()).collect();
    if let Some(&label) = output.iter().find(|c| !present.contains(c)) {
        return Err(EinsumError::UnknownOutputAxis { label });
    }

    let self_trace = !explicit_output && inputs.len() == 1 && is_self_trace(&inputs[0]);
    if self_trace {
        output.clear();
    } else {
        for labels in &inputs {
            if let Some(label) = first_duplicate(labels) {
                return Err(EinsumError::DuplicateAxis {
                    label,
                    subscript: labels.iter().collect(),
                });
            }
        }
    }

    Ok(ResolvedEquation {
        inputs,
        output,
        broadcast,
        self_trace,
    })
}

/// Expands ellipses and checks operand ranks.
///
/// Returns the expanded inputs and the longest wildcard expansion.
fn expand_inputs(
    notation: &EinsumNotation,
    shapes: &[Option<&[Dim]>],
) -> EinsumResult<(Vec<Labels>, Labels)> {
    let fresh = fresh_labels(notation);
    let mut broadcast = Labels::new();
    let mut inputs = Vec::with_capacity(notation.num_inputs());

    for (subscript, shape) in notation.inputs().iter().zip(shapes) {
        let explicit = subscript.explicit_count();
        let rank = shape.map(|s| s.len());

        if !subscript.has_ellipsis() {
            if let Some(rank) = rank {
                if rank != explicit {
                    return Err(EinsumError::RankMismatch {
                        subscript: subscript.to_string(),
                        expected: explicit,
                        got: rank,
                    });
                }
            }
            inputs.push(subscript.expand_ellipsis(&[]));
            continue;
        }

        let rank = rank.ok_or_else(|| {
            EinsumError::shape_inference(alloc::format!(
                "rank of operand '{}' is unknown",
                subscript
            ))
        })?;
        if rank < explicit {
            return Err(EinsumError::RankMismatch {
                subscript: subscript.to_string(),
                expected: explicit,
                got: rank,
            });
        }
        let n = rank - explicit;
        if n > fresh.len() {
            return Err(EinsumError::shape_inference(alloc::format!(
                "'{}' needs {} broadcast labels, only {} unused",
                subscript,
                n,
                fresh.len()
            )));
        }

        let replacement = &fresh[fresh.len() - n..];
        if replacement.len() > broadcast.len() {
            broadcast = replacement.iter().copied().collect();
        }
        inputs.push(subscript.expand_ellipsis(replacement));
    }

    Ok((inputs, broadcast))
}

/// ASCII letters, lowercase first, that the equation does not use.
fn fresh_labels(notation: &EinsumNotation) -> Vec<char> {
    let used = notation.named_labels();
    ('a'..='z')
        .chain('A'..='Z')
        .filter(|c| !used.contains(c))
        .collect()
}

/// Broadcast labels, then every other label occurring exactly once, sorted.
fn infer_output(inputs: &[Labels], broadcast: &Labels) -> Labels {
    let mut counts = alloc::collections::BTreeMap::<char, usize>::new();
    for c in inputs.iter().flat_map(|l| l.iter()) {
        if !broadcast.contains(c) {
            *counts.entry(*c).or_insert(0) += 1;
        }
    }

    let mut output = broadcast.clone();
    output.extend(
        counts
            .into_iter()
            .filter(|&(_, count)| count == 1)
            .map(|(c, _)| c),
    );
    output
}

/// A non-empty palindrome where every label occurs exactly twice.
fn is_self_trace(labels: &Labels) -> bool {
    if labels.is_empty() || labels.len() % 2 != 0 {
        return false;
    }
    let palindrome = labels.iter().eq(labels.iter().rev());
    palindrome && labels.iter().all(|c| labels.iter().filter(|x| *x == c).count() == 2)
}

fn first_duplicate(labels: &Labels) -> Option<char> {
    let mut seen = BTreeSet::new();
    labels.iter().copied().find(|c| !seen.insert(*c))
}
