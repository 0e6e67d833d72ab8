use std::sync::Arc;

use ruleboosts::prelude::*;
use ruleboosts::sample::{support_from, Pattern};


fn itemset(id: usize, support: &[(Label, Vec<usize>)]) -> Arc<Itemset> {
    let pattern: Pattern = [id].into_iter().collect();
    Arc::new(Itemset::new(id as i64, pattern, support_from(support.to_vec())))
}


// Instances 0..3 are labeled 1, instances 3..5 are labeled 2.
fn toy() -> (TrainingSet, Vec<Arc<Itemset>>) {
    let train = TrainingSet::from_labels([1, 1, 1, 2, 2]);
    let itemsets = vec![
        itemset(0, &[(1, vec![0, 1]), (2, vec![3])]),
        itemset(1, &[(1, vec![2])]),
        itemset(2, &[(2, vec![3, 4])]),
    ];
    (train, itemsets)
}


/// Tests for `BoostCar` and `ExperimentalBoostCar`.
#[cfg(test)]
pub mod boostcar_tests {
    use super::*;

    #[test]
    fn rules_are_visited_by_decreasing_confidence() {
        let (train, itemsets) = toy();

        let mut booster = BoostCar::init(&train, &itemsets)
            .coverage_threshold(0.5);
        let f = booster.run();

        // Ranking: r1->1 (1.0), r2->2 (1.0), r0->1 (2/3), ...
        let ids = f.hypotheses.iter()
            .map(|h| (h.itemset().id(), h.predicted_class()))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![(1, Some(1)), (2, Some(2)), (0, Some(1))]);
        assert!(f.weights.iter().all(|&w| w == 1.0));

        // Every instance left after the third rule.
        assert_eq!(booster.n_active(), 0);
        assert_eq!(booster.terminated(), 3);
    }

    #[test]
    fn rules_without_active_instances_are_skipped() {
        let (train, itemsets) = toy();

        let f = BoostCar::init(&train, &itemsets)
            .coverage_threshold(1.0)
            .run();

        // r0->2 still covers instance 3, r1->2 and r2->1 cover nothing.
        let ids = f.hypotheses.iter()
            .map(|h| (h.itemset().id(), h.predicted_class()))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![
            (1, Some(1)), (2, Some(2)), (0, Some(1)), (0, Some(2)),
        ]);
    }

    #[test]
    fn experimental_weights_only_decay() {
        let (train, itemsets) = toy();

        let mut booster = ExperimentalBoostCar::init(&train, &itemsets)
            .weight_cutoff(0.1)
            .seed(5);
        let f = booster.run();

        assert!(!f.is_empty());
        assert!(f.weights.iter().all(|&w| w == 1.0));
        assert!(booster.weights().iter().all(|&w| w > 0.0 && w <= 1.0));

        // Instance 2 is covered only by r1, whose confidence for class 1 is 1.
        assert!((booster.weights()[2] - (-1f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn experimental_is_reproducible() {
        let (train, itemsets) = toy();

        let run = |seed| {
            let f = ExperimentalBoostCar::init(&train, &itemsets)
                .seed(seed)
                .run();
            serde_json::to_string(&f).unwrap()
        };
        assert_eq!(run(21), run(21));
    }

    #[test]
    fn a_high_cutoff_empties_the_active_set() {
        let (train, itemsets) = toy();

        let mut booster = ExperimentalBoostCar::init(&train, &itemsets)
            .weight_cutoff(2.0);
        let f = booster.run();

        // Every instance is covered for its own class, and leaves at once.
        assert_eq!(booster.n_active(), 0);
        assert!((1..=itemsets.len()).contains(&booster.terminated()));
        assert!(!f.is_empty() && f.len() <= 4);
    }
}
