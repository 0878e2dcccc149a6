//! Randomized equations checked against brute force.

use std::collections::BTreeSet;

use einsum_planner::{
    Dim, EinsumConfig, EinsumError, Labels, NdArrayBackend, OptimizeStrategy, einsum,
    optimize_order,
};
use ndarray::ArrayD;
use proptest::prelude::*;

use super::reference::{naive_einsum, operand};

const ALPHABET: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];

#[derive(Debug, Clone)]
struct Problem {
    inputs: Vec<Vec<char>>,
    output: Vec<char>,
    sizes: Vec<usize>,
}

impl Problem {
    fn equation(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|l| l.iter().collect()).collect();
        let output: String = self.output.iter().collect();
        format!("{}->{}", inputs.join(","), output)
    }

    fn size(&self, c: char) -> usize {
        self.sizes[ALPHABET.iter().position(|&x| x == c).unwrap()]
    }

    fn shapes(&self) -> Vec<Vec<usize>> {
        self.inputs
            .iter()
            .map(|l| l.iter().map(|&c| self.size(c)).collect())
            .collect()
    }
}

/// Operands of one to three distinct labels; the output keeps a random,
/// shuffled subset of the labels present.
fn problem() -> impl Strategy<Value = Problem> {
    let operands = prop::collection::vec(
        prop::sample::subsequence(ALPHABET.to_vec(), 1..=3).prop_shuffle(),
        1..=4,
    );
    let sizes = prop::collection::vec(1usize..=3, ALPHABET.len());
    let keep = prop::collection::vec(any::<bool>(), ALPHABET.len());

    (operands, sizes, keep)
        .prop_flat_map(|(inputs, sizes, keep)| {
            let present: BTreeSet<char> = inputs.iter().flatten().copied().collect();
            let output: Vec<char> = present
                .into_iter()
                .filter(|c| keep[ALPHABET.iter().position(|x| x == c).unwrap()])
                .collect();
            (Just(inputs), Just(output).prop_shuffle(), Just(sizes))
        })
        .prop_map(|(inputs, output, sizes)| Problem {
            inputs,
            output,
            sizes,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_strategy_matches_brute_force(problem in problem()) {
        let backend = NdArrayBackend::<f64>::new();
        let equation = problem.equation();
        let inputs: Vec<ArrayD<f64>> = problem
            .shapes()
            .iter()
            .enumerate()
            .map(|(seed, s)| operand(s, seed))
            .collect();
        let expected = naive_einsum(&equation, &inputs);

        for strategy in [OptimizeStrategy::Exact, OptimizeStrategy::Greedy, OptimizeStrategy::None] {
            let config = EinsumConfig::new().with_strategy(strategy);
            let actual = einsum(&backend, &equation, &inputs, Some(config)).unwrap();
            prop_assert_eq!(actual.shape(), expected.shape());
            for (a, e) in actual.iter().zip(expected.iter()) {
                prop_assert!((a - e).abs() < 1e-9, "{} with {:?}: {} vs {}", equation, strategy, a, e);
            }
        }
    }

    #[test]
    fn prop_orders_reduce_to_one_operand(problem in problem()) {
        let labels: Vec<Labels> = problem.inputs.iter().map(|l| l.iter().copied().collect()).collect();
        let shapes: Vec<Vec<Dim>> = problem
            .shapes()
            .iter()
            .map(|s| s.iter().map(|&d| Dim::Known(d)).collect())
            .collect();
        let refs: Vec<&[Dim]> = shapes.iter().map(|s| s.as_slice()).collect();

        for strategy in [OptimizeStrategy::Exact, OptimizeStrategy::Greedy, OptimizeStrategy::None] {
            let seq = optimize_order(&refs, &labels, &problem.output, strategy, None).unwrap();
            prop_assert_eq!(seq.len(), labels.len() - 1);

            let survivors = seq
                .replay((0..labels.len()).collect::<Vec<_>>(), |_, a, b| Ok::<_, EinsumError>(a + b))
                .unwrap();
            prop_assert_eq!(survivors, vec![(0..labels.len()).sum::<usize>()]);
        }
    }
}
