//! Parser and resolver tests for einsum equations.

use einsum_planner::notation::{Subscript, resolve};
use einsum_planner::{Dim, EinsumError, Labels, parse_einsum, resolve_equation};
use pretty_assertions::assert_eq;

fn labels(text: &str) -> Labels {
    text.chars().collect()
}

fn known(shapes: &[&[usize]]) -> Vec<Vec<Dim>> {
    shapes
        .iter()
        .map(|s| s.iter().map(|&d| Dim::Known(d)).collect())
        .collect()
}

fn resolve_known(equation: &str, shapes: &[&[usize]]) -> Result<einsum_planner::ResolvedEquation, EinsumError> {
    let shapes = known(shapes);
    let refs: Vec<Option<&[Dim]>> = shapes.iter().map(|s| Some(s.as_slice())).collect();
    resolve_equation(equation, &refs)
}

#[test]
fn test_parse_basic_matmul() {
    let notation = parse_einsum("ij,jk->ik").unwrap();
    assert_eq!(notation.num_inputs(), 2);
    assert!(notation.has_explicit_output());
    assert!(!notation.has_ellipsis());
}

#[test]
fn test_parse_attention() {
    let notation = parse_einsum("bhqd,bhkd->bhqk").unwrap();
    assert_eq!(notation.num_inputs(), 2);
    assert_eq!(notation.inputs()[1].to_string(), "bhkd");
    assert!(notation.named_labels().contains(&'q'));
}

#[test]
fn test_parse_keeps_compact_text() {
    let notation = parse_einsum("ij , jk -> ik").unwrap();
    assert_eq!(notation.original(), Some("ij,jk->ik"));
}

#[test]
fn test_parse_errors() {
    for equation in ["", "->ij", "ij,jk->i,k", "ij->j->", "i.j->ij", "...i...->i", "i$j"] {
        assert!(
            matches!(parse_einsum(equation), Err(EinsumError::EquationSyntax { .. })),
            "{equation} should not parse"
        );
    }
}

#[test]
fn test_resolve_batched_attention() {
    let eq = resolve_known("bhqd,bhkd->bhqk", &[&[2, 4, 8, 16], &[2, 4, 8, 16]]).unwrap();
    assert_eq!(eq.output(), &labels("bhqk"));
    assert_eq!(eq.summed_labels().into_iter().collect::<Vec<_>>(), vec!['d']);
}

#[test]
fn test_implicit_output() {
    // Labels occurring once, sorted.
    let eq = resolve_known("ij,jk", &[&[2, 3], &[3, 4]]).unwrap();
    assert_eq!(eq.output(), &labels("ik"));

    let eq = resolve_known("ba,ca", &[&[2, 3], &[4, 3]]).unwrap();
    assert_eq!(eq.output(), &labels("bc"));

    let eq = resolve_known("ji", &[&[2, 3]]).unwrap();
    assert_eq!(eq.output(), &labels("ij"));

    // A label repeated across operands is summed.
    let eq = resolve_known("ij,ij", &[&[2, 3], &[2, 3]]).unwrap();
    assert!(eq.output().is_empty());
}

#[test]
fn test_ellipsis_expansion() {
    let eq = resolve_known("...ij,...jk->...ik", &[&[7, 5, 2, 3], &[5, 3, 4]]).unwrap();
    assert_eq!(eq.inputs()[0], labels("YZij"));
    assert_eq!(eq.inputs()[1], labels("Zjk"));
    assert_eq!(eq.output(), &labels("YZik"));
    assert_eq!(eq.to_string(), "YZij,Zjk->YZik");
}

#[test]
fn test_ellipsis_covering_no_axes() {
    let eq = resolve_known("...ij,jk->...ik", &[&[2, 3], &[3, 4]]).unwrap();
    assert_eq!(eq.to_string(), "ij,jk->ik");
    assert!(eq.broadcast_labels().is_empty());
}

#[test]
fn test_ellipsis_in_middle() {
    let eq = resolve_known("i...j->ij...", &[&[2, 3, 4, 5]]).unwrap();
    assert_eq!(eq.inputs()[0], labels("iYZj"));
    assert_eq!(eq.output(), &labels("ijYZ"));
}

#[test]
fn test_unknown_rank() {
    let shapes = known(&[&[2, 3]]);
    let err = resolve_equation("...j,jk->k", &[None, Some(shapes[0].as_slice())]).unwrap_err();
    assert!(matches!(err, EinsumError::ShapeInference { .. }));
}

#[test]
fn test_resolution_errors() {
    assert_eq!(
        resolve_known("ij,jk->ik", &[&[2, 3]]).unwrap_err(),
        EinsumError::EquationArity { expected: 2, got: 1 }
    );
    assert_eq!(
        resolve_known("ij,jk->il", &[&[2, 3], &[3, 4]]).unwrap_err(),
        EinsumError::UnknownOutputAxis { label: 'l' }
    );
    assert!(matches!(
        resolve_known("ij,jk->ik", &[&[2, 3, 1], &[3, 4]]),
        Err(EinsumError::RankMismatch { .. })
    ));
    assert!(matches!(
        resolve_known("iij,jk->ik", &[&[2, 2, 3], &[3, 4]]),
        Err(EinsumError::DuplicateAxis { label: 'i', .. })
    ));
}

#[test]
fn test_self_trace_requires_implicit_output() {
    assert!(resolve_known("ii", &[&[3, 3]]).unwrap().is_self_trace());
    assert!(resolve_known("ijji", &[&[2, 3, 3, 2]]).unwrap().is_self_trace());
    assert!(resolve_known("ijij", &[&[2, 3, 2, 3]]).is_err());
    assert!(resolve_known("ii->", &[&[3, 3]]).is_err());
}

#[test]
fn test_resolve_built_notation() {
    let notation = einsum_planner::EinsumNotation::new(
        vec![Subscript::from_chars(['i', 'j'])],
        Some(Subscript::from_chars(['j'])),
    );
    let shapes = known(&[&[2, 3]]);
    let eq = resolve(&notation, &[Some(shapes[0].as_slice())]).unwrap();
    assert_eq!(eq.to_string(), "ij->j");
}
