use std::collections::BTreeMap;
use std::sync::Arc;

use ruleboosts::prelude::*;
use ruleboosts::research::CurrentHypothesis;
use ruleboosts::sample::{support_from, Pattern};


fn itemset(id: usize, support: &[(Label, Vec<usize>)]) -> Arc<Itemset> {
    let pattern: Pattern = [id].into_iter().collect();
    Arc::new(Itemset::new(id as i64, pattern, support_from(support.to_vec())))
}


/// Tests for `Slipper`.
#[cfg(test)]
pub mod slipper_tests {
    use super::*;

    #[test]
    fn smoothing_keeps_the_confidence_finite() {
        let train = TrainingSet::from_labels([1, 1, 2, 2]);
        let itemsets = vec![itemset(0, &[(1, vec![0, 1])])];

        let f = Slipper::init(&train, &itemsets)
            .max_rounds(3)
            .run();

        assert_eq!(f.len(), 3);
        // No weight on class 2 inside the rule: conf = ln((0.5 + s) / s) / 2.
        let first = f.hypotheses[0].confidence();
        assert!((first - 5f64.ln() / 2.0).abs() < 1e-9);
        for (h, w) in f.iter() {
            assert!(h.confidence().is_finite() && h.confidence() > 0.0);
            assert_eq!(h.predicted_class(), Some(1));
            assert_eq!(w, 1.0);
        }
    }

    #[test]
    fn only_covered_instances_are_reweighted() {
        let train = TrainingSet::from_labels([1, 1, 2, 2]);
        let itemsets = vec![itemset(0, &[(1, vec![0])])];

        let mut booster = Slipper::init(&train, &itemsets);
        booster.preprocess();
        let _ = booster.boost(1);

        let dist = booster.distribution();
        assert!(dist[0] < 0.25);
        assert_eq!(&dist[1..], &[0.25, 0.25, 0.25]);
    }

    #[test]
    fn covered_instances_of_other_classes_gain_weight() {
        let train = TrainingSet::from_labels([1, 1, 2, 2]);
        let itemsets = vec![itemset(0, &[(1, vec![0, 1]), (2, vec![2])])];

        let mut booster = Slipper::init(&train, &itemsets);
        booster.preprocess();
        let _ = booster.boost(1);

        let f = booster.current_hypothesis();
        let h = &f.hypotheses[0];
        assert_eq!(h.predicted_class(), Some(1));
        // w[1] = 0.5, w[2] = 0.25, s = 1/8.
        let conf = (0.625f64 / 0.375).ln() / 2.0;
        assert!((h.confidence() - conf).abs() < 1e-12);

        let dist = booster.distribution();
        assert!((dist[0] - 0.25 * (-conf).exp()).abs() < 1e-12);
        assert!((dist[1] - 0.25 * (-conf).exp()).abs() < 1e-12);
        assert!((dist[2] - 0.25 * conf.exp()).abs() < 1e-12);
        assert_eq!(dist[3], 0.25);
    }

    #[test]
    fn the_default_rule_absorbs_the_extra_mass() {
        let train = TrainingSet::from_labels([1, 1, 2, 2]);
        let itemsets = vec![
            Arc::new(Itemset::default_rule(train.full_support())),
            itemset(0, &[(1, vec![0])]),
        ];
        let extra = BTreeMap::from([(1, 0.0), (2, 4.0)]);

        let mut booster = Slipper::init(&train, &itemsets)
            .extra_mass(extra);
        booster.preprocess();
        let _ = booster.boost(1);

        let f = booster.current_hypothesis();
        let h = &f.hypotheses[0];
        assert!(h.itemset().is_default());
        assert_eq!(h.predicted_class(), Some(2));
        let conf = ((0.9f64 + 0.125) / (0.1 + 0.125)).ln() / 2.0;
        assert!((h.confidence() - conf).abs() < 1e-9);

        let eweights = booster.extra_weights();
        assert!(eweights[&2] < eweights[&1]);
    }

    #[test]
    fn extra_mass_comes_from_original_sizes() {
        let train = TrainingSet::from_labels([1, 1, 2, 2]);
        let sizes = BTreeMap::from([(1, 2), (2, 7)]);
        let extra = Slipper::extra_from_sizes(&train, &sizes);
        assert_eq!(extra, BTreeMap::from([(1, 0.0), (2, 5.0)]));
    }

    #[test]
    fn a_single_class_gives_a_default_rule() {
        let train = TrainingSet::from_labels([3, 3, 3]);
        let itemsets = vec![itemset(0, &[(3, vec![0, 1])])];

        let f = Slipper::init(&train, &itemsets).run();
        assert_eq!(f.len(), 1);
        assert!(f.hypotheses[0].itemset().is_default());
        assert_eq!(f.hypotheses[0].predicted_class(), Some(3));
        assert_eq!(f.hypotheses[0].confidence(), 1.0);
    }

    #[test]
    fn no_positive_objective_gives_a_default_rule() {
        let train = TrainingSet::from_labels([1, 2]);
        let itemsets = vec![itemset(0, &[(1, vec![0]), (2, vec![1])])];

        let f = Slipper::init(&train, &itemsets).run();
        assert_eq!(f.len(), 1);
        assert!(f.hypotheses[0].itemset().is_default());
        assert_eq!(f.hypotheses[0].predicted_class(), None);
    }

    #[test]
    fn zero_weights_stop_boosting() {
        let train = TrainingSet::from_labels([1, 2]);
        let itemsets = vec![itemset(0, &[(1, vec![0])])];

        let mut booster = Slipper::init(&train, &itemsets)
            .initial_weights(vec![0.0, 0.0]);
        let f = booster.run();
        assert_eq!(booster.terminated(), 1);
        assert_eq!(f.len(), 1);
        assert!(f.hypotheses[0].itemset().is_default());
    }

    #[test]
    fn similarity_weights_steer_the_first_rule() {
        let train = TrainingSet::from_labels([1, 1, 2, 2]);
        let itemsets = vec![
            itemset(0, &[(1, vec![0])]),
            itemset(1, &[(2, vec![2])]),
        ];

        let f = Slipper::init(&train, &itemsets)
            .initial_weights(vec![0.1, 0.1, 1.0, 0.1])
            .max_rounds(1)
            .run();
        assert_eq!(f.len(), 1);
        assert_eq!(f.hypotheses[0].predicted_class(), Some(2));
    }
}
