//! Route recognition tests.

use einsum_planner::pattern::recognize_route;
use einsum_planner::{Dim, Route, einsum_path, resolve_equation};

fn route(equation: &str, shapes: &[&[usize]]) -> Route {
    let shapes: Vec<Vec<Dim>> = shapes
        .iter()
        .map(|s| s.iter().map(|&d| Dim::Known(d)).collect())
        .collect();
    let refs: Vec<Option<&[Dim]>> = shapes.iter().map(|s| Some(s.as_slice())).collect();
    recognize_route(&resolve_equation(equation, &refs).unwrap())
}

#[test]
fn test_recognize_pairwise() {
    assert_eq!(route("ij,jk->ik", &[&[2, 3], &[3, 4]]), Route::Pairwise);
    assert_eq!(route("ij->ji", &[&[2, 3]]), Route::Pairwise);
    assert_eq!(route("ij,ij->ij", &[&[2, 3], &[2, 3]]), Route::Pairwise);
    assert!(route("i,j->ij", &[&[2], &[3]]).is_pairwise());
}

#[test]
fn test_shared_output_label_stays_pairwise() {
    // `b` is in every operand but kept in the output.
    assert_eq!(
        route("bi,bj,bk->bijk", &[&[2, 3], &[2, 4], &[2, 5]]),
        Route::Pairwise
    );
}

#[test]
fn test_recognize_exponential_space() {
    assert_eq!(
        route("ij,ik,il->jkl", &[&[2, 3], &[2, 4], &[2, 5]]),
        Route::ExponentialSpace { label: 'i' }
    );
    // The first such label in alphabetical order is reported.
    assert_eq!(
        route("bj,bj,bj->", &[&[2, 3], &[2, 3], &[2, 3]]),
        Route::ExponentialSpace { label: 'b' }
    );
}

#[test]
fn test_recognize_self_trace() {
    assert_eq!(route("ii", &[&[3, 3]]), Route::SelfTrace);
    assert_eq!(route("ijji", &[&[2, 3, 3, 2]]), Route::SelfTrace);
}

#[test]
fn test_route_display() {
    assert_eq!(Route::Pairwise.to_string(), "pairwise");
    assert_eq!(Route::SelfTrace.to_string(), "self-trace");
}

#[test]
fn test_plan_reports_route() {
    let shapes: Vec<Vec<Dim>> = (0..3).map(|_| vec![Dim::Known(2), Dim::Known(3)]).collect();
    let refs: Vec<&[Dim]> = shapes.iter().map(|s| s.as_slice()).collect();
    let plan = einsum_path("ij,ij,ij->j", &refs, None).unwrap();
    assert_eq!(plan.route(), Route::ExponentialSpace { label: 'i' });
}
