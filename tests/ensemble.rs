use std::sync::Arc;

use ruleboosts::prelude::*;
use ruleboosts::sample::{support_from, Pattern};


// An itemset with pattern `items`, covering training instance 0 (class 1).
fn itemset(id: i64, items: &[usize]) -> Arc<Itemset> {
    let pattern: Pattern = items.iter().copied().collect();
    Arc::new(Itemset::new(id, pattern, support_from([(1, vec![0])])))
}


/// Tests for `RuleEnsemble`, `RuleClassifier` and `PartitionClassifier`.
#[cfg(test)]
pub mod ensemble_tests {
    use super::*;

    #[test]
    fn abstaining_rules_do_not_vote() {
        let x = Instance::new(0, [1, 2, 3], 7);

        let rule_a = RuleClassifier::new(itemset(0, &[1, 2]), Some(7), 0.5);
        let rule_b = RuleClassifier::new(itemset(1, &[1, 2]), None, 0.9);

        let mut f = RuleEnsemble::new();
        f.push(1.0, rule_a);
        f.push(2.0, rule_b);

        assert_eq!(f.predict(Target::Instance(&x), false), Some(7));
        assert_eq!(f.predict(Target::Instance(&x), true), Some(7));
        assert_eq!(
            f.predict_rounds(Target::Instance(&x), false, 4),
            vec![Some(7); 4],
        );
    }

    #[test]
    fn uncovered_targets_abstain() {
        let x = Instance::new(0, [1, 3], 1);
        let h = RuleClassifier::new(itemset(0, &[1, 2]), Some(1), 1.0);

        assert_eq!(h.classify(Target::Instance(&x)), Vote::ABSTAIN);
        assert!(h.classify(Target::Id(0)).is(1));
        assert_eq!(h.classify(Target::Id(1)), Vote::ABSTAIN);

        let mut f = RuleEnsemble::new();
        f.push(1.0, h);
        assert_eq!(f.predict(Target::Instance(&x), false), None);
    }

    #[test]
    fn sum_and_average_can_disagree() {
        let x = Instance::new(0, [1], 1);

        let mut f = RuleEnsemble::new();
        f.push(1.0, RuleClassifier::new(itemset(0, &[1]), Some(1), 1.0));
        f.push(1.0, RuleClassifier::new(itemset(1, &[1]), Some(2), 0.6));
        f.push(1.0, RuleClassifier::new(itemset(2, &[1]), Some(2), 0.6));

        // Total: 1.0 vs 1.2. Mean: 1.0 vs 0.6.
        assert_eq!(f.predict(Target::Instance(&x), false), Some(2));
        assert_eq!(f.predict(Target::Instance(&x), true), Some(1));
        assert_eq!(
            f.predict_each_round(Target::Instance(&x), false),
            vec![Some(1), Some(1), Some(2)],
        );
    }

    #[test]
    fn ties_go_to_the_smallest_label() {
        let x = Instance::new(0, [4], 1);

        let mut f = RuleEnsemble::new();
        f.push(1.0, RuleClassifier::new(itemset(0, &[4]), Some(5), 0.5));
        f.push(0.5, RuleClassifier::new(itemset(1, &[4]), Some(3), 1.0));

        assert_eq!(f.predict(Target::Instance(&x), false), Some(3));
    }

    #[test]
    fn default_rule_covers_everything() {
        let x = Instance::new(0, [42], 1);
        let h = RuleClassifier::default_rule(Some(2), 0.3);

        assert!(h.covers(Target::Instance(&x)));
        assert!(h.covers(Target::Id(123)));
        assert_eq!(h.classify(Target::Instance(&x)), Vote::new(Some(2), 0.3));
    }

    #[test]
    fn prefix_truncates_the_rounds() {
        let x = Instance::new(0, [1], 1);

        let mut f = RuleEnsemble::new();
        f.push(1.0, RuleClassifier::new(itemset(0, &[1]), Some(1), 1.0));
        f.push(3.0, RuleClassifier::new(itemset(1, &[1]), Some(2), 1.0));

        assert_eq!(f.prefix(1).len(), 1);
        assert_eq!(f.prefix(1).predict(Target::Instance(&x), false), Some(1));
        assert_eq!(f.prefix(10).len(), 2);
        assert_eq!(f.predict(Target::Instance(&x), false), Some(2));
    }

    #[test]
    fn empty_ensemble_predicts_nothing() {
        let x = Instance::new(0, [1], 1);
        let f: RuleEnsemble<RuleClassifier> = RuleEnsemble::new();

        assert!(f.is_empty());
        assert_eq!(f.predict(Target::Instance(&x), false), None);
        assert_eq!(f.predict_rounds(Target::Instance(&x), false, 3), vec![None; 3]);
        assert!(f.predict_each_round(Target::Id(0), true).is_empty());
    }

    #[test]
    fn partition_votes_inside_and_outside() {
        let inside = Vote::new(Some(1), 0.8);
        let outside = Vote::new(Some(2), 0.4);
        let h = PartitionClassifier::new(itemset(0, &[1, 2]), inside, outside);

        let covered = Instance::new(0, [1, 2, 5], 1);
        let uncovered = Instance::new(1, [2, 5], 2);
        assert_eq!(h.classify(Target::Instance(&covered)), inside);
        assert_eq!(h.classify(Target::Instance(&uncovered)), outside);
        assert_eq!(h.classify(Target::Id(0)), inside);
        assert_eq!(h.classify(Target::Id(3)), outside);
    }

    #[test]
    fn default_partition_has_no_outside() {
        let inside = Vote::new(Some(1), 0.8);
        let default = Arc::new(Itemset::synthetic_default());
        let h = PartitionClassifier::new(default, inside, Vote::new(Some(2), 0.1));

        let x = Instance::new(0, [9], 2);
        assert_eq!(h.outside(), inside);
        assert_eq!(h.classify(Target::Instance(&x)), inside);
    }

    #[test]
    fn predict_all_matches_predict() {
        let test = vec![
            Instance::new(0, [1, 2], 1),
            Instance::new(1, [2], 2),
            Instance::new(2, [1], 1),
        ];

        let mut f = RuleEnsemble::new();
        f.push(1.0, RuleClassifier::new(itemset(0, &[1]), Some(1), 1.0));
        f.push(1.0, RuleClassifier::new(itemset(1, &[2]), Some(2), 0.5));

        let expected = test.iter()
            .map(|x| f.predict(Target::Instance(x), false))
            .collect::<Vec<_>>();
        assert_eq!(f.predict_all(&test, false), expected);
        assert_eq!(expected, vec![Some(1), Some(2), Some(1)]);
    }
}
