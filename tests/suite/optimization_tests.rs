//! Contraction order optimization tests.

use einsum_planner::optimization::{
    CostModel, MAX_DP_TENSORS, find_subgraphs, greedy_sequence, optimal_sequence,
};
use einsum_planner::{
    ContractionSequence, ContractionTree, Dim, EinsumConfig, EinsumError, Labels,
    OptimizeStrategy, einsum_path, optimize_order,
};
use pretty_assertions::assert_eq;

struct Network {
    shapes: Vec<Vec<Dim>>,
    labels: Vec<Labels>,
    output: Labels,
}

impl Network {
    fn new(shapes: &[&[usize]], labels: &[&str], output: &str) -> Self {
        Self {
            shapes: shapes
                .iter()
                .map(|s| s.iter().map(|&d| Dim::Known(d)).collect())
                .collect(),
            labels: labels.iter().map(|l| l.chars().collect()).collect(),
            output: output.chars().collect(),
        }
    }

    fn refs(&self) -> Vec<&[Dim]> {
        self.shapes.iter().map(|s| s.as_slice()).collect()
    }

    fn order(&self, strategy: OptimizeStrategy, ceiling: Option<u64>) -> Result<ContractionSequence, EinsumError> {
        optimize_order(&self.refs(), &self.labels, &self.output, strategy, ceiling)
    }
}

#[test]
fn test_two_tensors_every_strategy() {
    let network = Network::new(&[&[100, 200], &[200, 300]], &["ij", "jk"], "ik");
    for strategy in [OptimizeStrategy::Exact, OptimizeStrategy::Greedy, OptimizeStrategy::None] {
        assert_eq!(network.order(strategy, None).unwrap().pairs(), &[(0, 1)]);
    }
}

#[test]
fn test_exact_beats_greedy_on_skewed_chain() {
    // Greedy takes the locally cheap (1, 2) and pays 30060 in total;
    // (0, 1) first costs 26000.
    let network = Network::new(&[&[1000, 10], &[10, 2], &[2, 3]], &["ij", "jk", "kl"], "il");
    let model = CostModel::new(&network.output);

    let greedy = greedy_sequence(&network.refs(), &network.labels, &model);
    assert_eq!(greedy.pairs(), &[(1, 2), (0, 1)]);

    let exact = optimal_sequence(&network.refs(), &network.labels, &model, None).unwrap();
    assert_eq!(exact.pairs(), &[(0, 1), (0, 1)]);
}

#[test]
fn test_outer_products_are_deferred() {
    // 0 and 2 share `j`; 1 is only joined to them through the output.
    let network = Network::new(&[&[2, 3], &[4], &[3, 5]], &["ij", "k", "jl"], "ikl");
    let seq = network.order(OptimizeStrategy::Exact, None).unwrap();
    assert_eq!(seq.pairs(), &[(0, 2), (0, 1)]);
}

#[test]
fn test_cost_ceiling() {
    let network = Network::new(&[&[10, 10], &[10, 10], &[10, 10]], &["ij", "jk", "kl"], "il");

    let err = network.order(OptimizeStrategy::Exact, Some(1500)).unwrap_err();
    assert_eq!(err, EinsumError::CostCeilingExceeded { ceiling: 1500 });
    assert!(err.is_recoverable());

    assert!(network.order(OptimizeStrategy::Exact, Some(2000)).is_ok());
    // Other strategies ignore the ceiling.
    assert!(network.order(OptimizeStrategy::Greedy, Some(1)).is_ok());
}

#[test]
fn test_large_components_fall_back_to_greedy() {
    let n = MAX_DP_TENSORS + 4;
    let letters: Vec<char> = ('a'..='z').collect();
    let labels: Vec<String> = (0..n).map(|i| format!("{}{}", letters[i], letters[i + 1])).collect();
    let labels: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
    let shapes = vec![&[2usize, 2][..]; n];
    let output = format!("{}{}", letters[0], letters[n]);

    let network = Network::new(&shapes, &labels, &output);
    let seq = network.order(OptimizeStrategy::Exact, None).unwrap();
    assert_eq!(seq.len(), n - 1);
}

#[test]
fn test_find_subgraphs() {
    let labels: Vec<Labels> = ["ij", "kl", "jm", "ln", "o"]
        .iter()
        .map(|l| l.chars().collect())
        .collect();
    let components = find_subgraphs(&labels, &[]);
    assert_eq!(components, vec![vec![0, 2], vec![1, 3], vec![4]]);
}

#[test]
fn test_linearize_tree() {
    use ContractionTree::{Leaf, Node};

    let tree = Node(
        Box::new(Node(Box::new(Leaf(0)), Box::new(Leaf(1)))),
        Box::new(Node(
            Box::new(Leaf(2)),
            Box::new(Node(Box::new(Leaf(3)), Box::new(Leaf(4)))),
        )),
    );
    let seq = tree.linearize(5).unwrap();
    assert_eq!(seq.len(), 4);

    // Replaying the sequence over the leaves rebuilds the same tree.
    let leaves: Vec<ContractionTree> = (0..5).map(Leaf).collect();
    let rebuilt = seq
        .replay(leaves, |_, lhs, rhs| Ok::<_, EinsumError>(ContractionTree::node(lhs, rhs)))
        .unwrap();
    assert_eq!(rebuilt.len(), 1);
    let mut rebuilt_leaves = rebuilt[0].leaves();
    rebuilt_leaves.sort_unstable();
    assert_eq!(rebuilt_leaves, vec![0, 1, 2, 3, 4]);
    assert_eq!(rebuilt[0].num_contractions(), 4);
}

#[test]
fn test_replay_rejects_out_of_range_pairs() {
    let seq = ContractionSequence::from_pairs(vec![(0, 1), (0, 2)]);
    let err = seq
        .replay(vec![1, 2, 3], |_, a, b| Ok::<_, EinsumError>(a + b))
        .unwrap_err();
    assert!(matches!(err, EinsumError::InvalidSequence { step: 1, .. }));
}

#[test]
fn test_replay_normalizes_pair_order() {
    let seq = ContractionSequence::from_pairs(vec![(2, 0)]);
    let out = seq
        .replay(vec!["a", "b", "c"], |pair, lhs, rhs| {
            assert_eq!(pair, (0, 2));
            Ok::<_, EinsumError>(if lhs < rhs { "ac" } else { "ca" })
        })
        .unwrap();
    assert_eq!(out, vec!["ac", "b"]);
}

#[test]
fn test_plan_serializes() {
    let shapes = [vec![Dim::Known(2), Dim::Known(3)], vec![Dim::Known(3), Dim::Known(4)]];
    let refs: Vec<&[Dim]> = shapes.iter().map(|s| s.as_slice()).collect();
    let plan = einsum_path("ij,jk->ik", &refs, None).unwrap();

    let json = serde_json::to_string(&plan).unwrap();
    let decoded: einsum_planner::ExecutionPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, plan);

    let config = EinsumConfig::fast().with_cost_ceiling(Some(10));
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<EinsumConfig>(&json).unwrap(), config);
    // Missing fields take their defaults.
    assert_eq!(serde_json::from_str::<EinsumConfig>("{}").unwrap(), EinsumConfig::default());
}
