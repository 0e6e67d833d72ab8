use std::ops::ControlFlow;
use std::sync::Arc;

use ruleboosts::prelude::*;
use ruleboosts::research::CurrentHypothesis;
use ruleboosts::sample::{support_from, Pattern};


fn itemset(id: i64, class_1: &[usize], class_2: &[usize]) -> Arc<Itemset> {
    let pattern: Pattern = [id as usize].into_iter().collect();
    let support = support_from([(1, class_1.to_vec()), (2, class_2.to_vec())]);
    Arc::new(Itemset::new(id, pattern, support))
}


// Instances 0..5 are labeled 1, instances 5..10 are labeled 2.
fn balanced() -> TrainingSet {
    TrainingSet::from_labels((0..10).map(|i| if i < 5 { 1 } else { 2 }))
}


/// Tests for `DiscreteBoost`.
#[cfg(test)]
pub mod discrete_boost_tests {
    use super::*;

    #[test]
    fn first_round_picks_the_least_erring_rule() {
        let train = balanced();
        let itemsets = vec![itemset(0, &[0, 1, 2], &[5])];

        let mut booster = DiscreteBoost::init(&train, &itemsets);
        booster.preprocess();
        let flow = booster.boost(1);
        assert_eq!(flow, ControlFlow::Continue(()));

        // error = 0.5 - 0.3 + 0.1
        let f = booster.current_hypothesis();
        assert_eq!(f.len(), 1);
        assert_eq!(f.hypotheses[0].predicted_class(), Some(1));
        let alpha = (0.7f64 / 0.3).ln() / 2.0;
        assert!((f.weights[0] - alpha).abs() < 1e-9);

        // The covered instance of class 2 was misclassified.
        let dist = booster.distribution();
        assert!(dist[5] > 0.1);
        assert!(dist[0] < 0.1);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stops_once_the_error_reaches_one_half() {
        let train = balanced();
        let itemsets = vec![itemset(0, &[0, 1, 2], &[5])];

        let f = DiscreteBoost::init(&train, &itemsets).run();

        // After one round the same rule errs on exactly half of the mass.
        assert_eq!(f.len(), 1);
        assert!(f.weights[0] > 0.0);
    }

    #[test]
    fn weak_candidates_give_the_default_rule() {
        let train = balanced();
        let itemsets = vec![itemset(0, &[0], &[5])];

        let mut booster = DiscreteBoost::init(&train, &itemsets).gamma(0.01);
        let f = booster.run();

        assert_eq!(booster.terminated(), 1);
        assert_eq!(f.len(), 1);
        assert!(f.hypotheses[0].itemset().is_default());
        assert_eq!(f.hypotheses[0].predicted_class(), None);
    }

    #[test]
    fn a_perfect_rule_is_degenerate() {
        let train = balanced();
        let itemsets = vec![
            itemset(0, &[0, 1], &[5]),
            itemset(1, &[0, 1, 2, 3, 4], &[]),
        ];

        let f = DiscreteBoost::init(&train, &itemsets).run();
        assert_eq!(f.len(), 1);
        assert!(f.hypotheses[0].itemset().is_default());
    }

    #[test]
    fn renormalizes_every_round() {
        let train = balanced();
        let itemsets = vec![
            itemset(0, &[0, 1, 2], &[5]),
            itemset(1, &[3, 4], &[6, 7]),
            itemset(2, &[1], &[8, 9]),
            itemset(3, &[0, 4], &[]),
        ];

        let mut booster = DiscreteBoost::init(&train, &itemsets)
            .max_rounds(20);
        booster.preprocess();
        for t in 1.. {
            let flow = booster.boost(t);
            let dist = booster.distribution();
            assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            let classes = booster.class_distribution().values().sum::<f64>();
            assert!((classes - 1.0).abs() < 1e-9);
            if flow.is_break() { break; }
        }

        let f = booster.current_hypothesis();
        assert!(f.len() <= 20);
    }

    #[test]
    fn never_exceeds_max_rounds() {
        let train = balanced();
        let itemsets = vec![
            itemset(0, &[0, 1, 2], &[5]),
            itemset(1, &[3, 4], &[6]),
            itemset(2, &[0], &[7, 8, 9]),
        ];

        let mut booster = DiscreteBoost::init(&train, &itemsets)
            .max_rounds(2);
        let f = booster.run();
        assert!(f.len() <= 2);
        assert!(booster.terminated() <= 2);
    }

    #[test]
    fn same_seed_same_model() {
        let train = balanced();
        let itemsets = vec![
            itemset(0, &[0, 1, 2], &[5]),
            itemset(1, &[2, 3, 4], &[9]),
            itemset(2, &[0, 1], &[6, 7, 8]),
        ];

        let run = |seed| {
            let f = DiscreteBoost::init(&train, &itemsets)
                .seed(seed)
                .max_rounds(10)
                .run();
            serde_json::to_string(&f).unwrap()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn empty_inputs_give_an_empty_model() {
        let train = balanced();
        let none: Vec<Arc<Itemset>> = Vec::new();
        let f = DiscreteBoost::init(&train, &none).run();
        assert!(f.is_empty());
    }
}
