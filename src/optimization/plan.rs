//! Execution plan for einsum operations.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use super::cost::CostModel;
use super::dynamic::optimal_sequence;
use super::greedy::greedy_sequence;
use super::path::{ContractionSequence, ContractionStep};
use crate::error::{EinsumError, EinsumResult};
use crate::launch::{Diagnostic, DiagnosticObserver, EinsumConfig, TracingObserver};
use crate::notation::{
    ResolvedEquation, SizeRule, ValidationResult, describe_shapes, resolve_equation,
    validate_shapes_with,
};
use crate::pattern::{Route, recognize_route};
use crate::shape::{Dim, Labels, Shape, has_deferred};

/// Strategy for ordering pairwise contractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptimizeStrategy {
    /// Dynamic programming per connected component, without outer products.
    #[default]
    Exact,
    /// Repeatedly contract the cheapest pair.
    Greedy,
    /// Contract left to right.
    None,
}

/// Orders the pairwise contractions of `shapes.len()` operands.
///
/// Only [`OptimizeStrategy::Exact`] consults `cost_ceiling`; it fails with
/// the recoverable [`EinsumError::CostCeilingExceeded`] when no order fits.
pub fn optimize_order(
    shapes: &[&[Dim]],
    input_labels: &[Labels],
    output_labels: &[char],
    strategy: OptimizeStrategy,
    cost_ceiling: Option<u64>,
) -> EinsumResult<ContractionSequence> {
    if shapes.len() != input_labels.len() {
        return Err(EinsumError::EquationArity {
            expected: input_labels.len(),
            got: shapes.len(),
        });
    }

    let cost_model = CostModel::new(output_labels);
    match strategy {
        OptimizeStrategy::None => Ok(ContractionSequence::left_to_right(shapes.len())),
        OptimizeStrategy::Greedy => Ok(greedy_sequence(shapes, input_labels, &cost_model)),
        OptimizeStrategy::Exact => {
            optimal_sequence(shapes, input_labels, &cost_model, cost_ceiling)
        }
    }
}

/// Complete execution plan for an einsum operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    route: Route,
    /// Strategy actually used to order the steps.
    strategy: OptimizeStrategy,
    sequence: ContractionSequence,
    steps: Vec<ContractionStep>,
    /// Labels of the last operand that are summed before the final transpose.
    trailing_sum: Labels,
    total_cost: Dim,
    output_shape: Shape,
}

impl ExecutionPlan {
    pub fn route(&self) -> Route {
        self.route
    }

    pub fn strategy(&self) -> OptimizeStrategy {
        self.strategy
    }

    pub fn sequence(&self) -> &ContractionSequence {
        &self.sequence
    }

    pub fn steps(&self) -> &[ContractionStep] {
        &self.steps
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn trailing_sum(&self) -> &Labels {
        &self.trailing_sum
    }

    /// Estimated multiply-adds over all steps.
    ///
    /// For the self-trace and exponential-space routes this is the size of
    /// the full label space.
    pub fn total_cost(&self) -> Dim {
        self.total_cost
    }

    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "route: {}, cost: {}", self.route, self.total_cost)?;
        for step in &self.steps {
            let contracted: alloc::string::String = step.contracted.iter().collect();
            let result: alloc::string::String = step.result.iter().collect();
            writeln!(
                f,
                "  {:?} sum [{}] -> {} (cost {})",
                step.inputs, contracted, result, step.cost
            )?;
        }
        Ok(())
    }
}

/// Creates an execution plan for a resolved equation.
///
/// Any deferred input size disables ordering (`OptimizeStrategy::None`). If
/// the cost ceiling rules out every order, `observer` receives
/// [`Diagnostic::CostCeilingRelaxed`] and planning is repeated without it.
pub fn create_plan(
    equation: &ResolvedEquation,
    shapes: &[&[Dim]],
    config: &EinsumConfig,
    observer: &dyn DiagnosticObserver,
) -> EinsumResult<ExecutionPlan> {
    let route = recognize_route(equation);
    tracing::debug!("einsum '{}' takes the {} route", equation, route);

    let described = if config.validate_shapes {
        let rule = match route {
            Route::ExponentialSpace { .. } | Route::Pairwise => SizeRule::Broadcast,
            Route::SelfTrace => SizeRule::Exact,
        };
        validate_shapes_with(equation, shapes, rule)?
    } else {
        describe_shapes(equation, shapes)
    };

    match route {
        Route::Pairwise => plan_pairwise(equation, shapes, config, observer, described),
        Route::SelfTrace | Route::ExponentialSpace { .. } => Ok(ExecutionPlan {
            route,
            strategy: OptimizeStrategy::None,
            sequence: ContractionSequence::new(),
            steps: Vec::new(),
            trailing_sum: Labels::new(),
            total_cost: described.naive_cost(),
            output_shape: described.output_shape,
        }),
    }
}

fn plan_pairwise(
    equation: &ResolvedEquation,
    shapes: &[&[Dim]],
    config: &EinsumConfig,
    observer: &dyn DiagnosticObserver,
    described: ValidationResult,
) -> EinsumResult<ExecutionPlan> {
    let strategy = if shapes.iter().any(|s| has_deferred(s)) {
        tracing::debug!("input sizes are not all known, contracting left to right");
        OptimizeStrategy::None
    } else {
        config.strategy
    };

    let inputs = equation.inputs();
    let output = equation.output();
    let sequence = match optimize_order(shapes, inputs, output, strategy, config.cost_ceiling) {
        Ok(sequence) => sequence,
        Err(EinsumError::CostCeilingExceeded { ceiling }) => {
            observer.emit(&Diagnostic::CostCeilingRelaxed { ceiling });
            optimize_order(shapes, inputs, output, strategy, None)?
        }
        Err(err) => return Err(err),
    };

    let cost_model = CostModel::new(output);
    let items: Vec<(Shape, Labels)> = shapes
        .iter()
        .zip(inputs)
        .map(|(s, l)| (Shape::from_slice(s), l.clone()))
        .collect();

    let mut steps = Vec::with_capacity(sequence.len());
    let mut survivors = sequence.replay(items, |pair, (lhs_shape, lhs_labels), (rhs_shape, rhs_labels)| {
        let contraction = cost_model.contract(&lhs_shape, &lhs_labels, &rhs_shape, &rhs_labels);
        tracing::debug!("step {:?} costs {}", pair, contraction.cost);
        steps.push(ContractionStep {
            inputs: pair,
            contracted: contraction.contracted,
            result: contraction.labels.clone(),
            shape: contraction.shape.clone(),
            cost: contraction.cost,
        });
        Ok::<_, EinsumError>((contraction.shape, contraction.labels))
    })?;

    let (_, survivor_labels) = match (survivors.pop(), survivors.is_empty()) {
        (Some(survivor), true) => survivor,
        _ => {
            return Err(EinsumError::invalid_sequence(
                sequence.len(),
                "sequence does not reduce the operands to one",
            ));
        }
    };

    let trailing_sum = survivor_labels
        .iter()
        .copied()
        .filter(|c| !output.contains(c))
        .collect();
    let total_cost = Dim::sum(steps.iter().map(|s| s.cost));

    Ok(ExecutionPlan {
        route: Route::Pairwise,
        strategy,
        sequence,
        steps,
        trailing_sum,
        total_cost,
        output_shape: described.output_shape,
    })
}

/// Plans an equation without executing it.
///
/// Diagnostics go to [`TracingObserver`].
pub fn einsum_path(
    equation: &str,
    shapes: &[&[Dim]],
    config: Option<EinsumConfig>,
) -> EinsumResult<ExecutionPlan> {
    let config = config.unwrap_or_default();
    let ranks: Vec<Option<&[Dim]>> = shapes.iter().map(|s| Some(*s)).collect();
    let resolved = resolve_equation(equation, &ranks)?;
    create_plan(&resolved, shapes, &config, &TracingObserver)
}
