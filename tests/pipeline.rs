use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use ruleboosts::prelude::*;
use ruleboosts::research::{InternalCv, Logger};
use ruleboosts::sample::{reader, ReadError};


fn dataset(name: &str) -> PathBuf {
    let mut path = env::current_dir().unwrap();
    path.push("tests/dataset");
    path.push(name);
    path
}


fn toy() -> (TrainingSet, Vec<Instance>, Vec<Arc<Itemset>>) {
    let train = reader::read_train(&[dataset("toy.1"), dataset("toy.2")])
        .unwrap();
    let test = reader::read_test(dataset("toy.test")).unwrap();
    let itemsets = ItemsetReader::new(&train)
        .read(dataset("toy.itemsets"))
        .unwrap();
    (train, test, itemsets)
}


/// Tests that read the toy dataset and run every booster on it.
#[cfg(test)]
pub mod pipeline_tests {
    use super::*;

    #[test]
    fn read_toy_dataset() {
        let (train, test, itemsets) = toy();

        assert_eq!(train.len(), 10);
        assert_eq!(train.classes(), vec![1, 2]);
        assert_eq!(train.label(train.index_of("7").unwrap()), 2);

        assert_eq!(test.len(), 5);
        assert_eq!(test[4].features().len(), 3);
        assert_eq!(test[4].label(), 2);

        // The last two rows share a support and are merged.
        assert_eq!(itemsets.len(), 4);
        assert_eq!(itemsets[0].coverage(1), 3);
        assert_eq!(itemsets[0].coverage(2), 1);
        assert_eq!(itemsets[2].patterns().len(), 2);
        assert!(itemsets[3].is_default());
        assert_eq!(itemsets[3].total_coverage(), 10);
    }

    #[test]
    fn free_itemsets_keep_minimal_patterns() {
        let (train, _, _) = toy();
        let itemsets = ItemsetReader::new(&train)
            .free(true)
            .read(dataset("toy.itemsets"))
            .unwrap();

        assert_eq!(itemsets[2].patterns().len(), 1);
        assert_eq!(itemsets[2].size(), vec![1]);
    }

    #[test]
    fn read_sizes_and_similarity() {
        let (train, _, _) = toy();

        let sizes = reader::read_sizes(dataset("toy.sizes")).unwrap();
        assert_eq!(sizes[&1], 5);
        assert_eq!(sizes[&2], 9);

        let extra = Slipper::extra_from_sizes(&train, &sizes);
        assert_eq!(extra[&1], 0.0);
        assert_eq!(extra[&2], 4.0);

        let weights = reader::read_similarity(dataset("toy.similarity"), &train)
            .unwrap();
        assert_eq!(weights.len(), 10);
        assert_eq!(weights[train.index_of("1").unwrap()], 0.5);
        assert_eq!(weights[train.index_of("9").unwrap()], 0.75);
    }

    #[test]
    fn missing_file_is_an_error() {
        let (train, _, _) = toy();
        let err = ItemsetReader::new(&train)
            .read(dataset("no-such-file"))
            .unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }

    #[test]
    fn lac_votes_by_average_confidence() {
        let (train, test, itemsets) = toy();
        let f = Lac::init(&train, &itemsets).run();

        assert_eq!(f.len(), 2 * itemsets.len());
        assert_eq!(
            f.predict_all(&test, true),
            vec![Some(1), Some(2), Some(1), Some(1), Some(2)],
        );
    }

    #[test]
    fn zero_abstains_everywhere() {
        let (_, test, _) = toy();
        let f = Zero::init().run();

        assert_eq!(f.len(), 1);
        assert!(f.predict_all(&test, false).iter().all(Option::is_none));
    }

    #[test]
    fn every_booster_runs_on_the_toy_dataset() {
        let (train, test, itemsets) = toy();
        let rounds = 5;

        let f = Slipper::init(&train, &itemsets).max_rounds(rounds).run();
        assert!(!f.is_empty() && f.len() <= rounds);

        let f = DiscreteBoost::init(&train, &itemsets).max_rounds(rounds).run();
        assert!(!f.is_empty() && f.len() <= rounds);

        for rule in [ConfidenceRule::Margin, ConfidenceRule::Fraction, ConfidenceRule::StaticFraction] {
            let f = ConfidenceBoost::init(&train, &itemsets)
                .rule(rule)
                .max_rounds(rounds)
                .run();
            assert!(!f.is_empty() && f.len() <= rounds);
            for x in &test {
                assert_eq!(f.predict_rounds(Target::Instance(x), false, rounds).len(), rounds);
            }
        }

        let f = BoostCar::init(&train, &itemsets).run();
        assert!(!f.is_empty());

        let f = ExperimentalBoostCar::init(&train, &itemsets).run();
        assert!(!f.is_empty());
    }

    #[test]
    fn internal_cv_scores_every_round() {
        let (train, _, itemsets) = toy();
        let rounds = 4;

        let curve = InternalCv::new(&train)
            .n_folds(5)
            .max_rounds(rounds)
            .run(|weights| {
                Slipper::init(&train, &itemsets)
                    .initial_weights(weights)
                    .max_rounds(rounds)
                    .run()
            });

        assert_eq!(curve.len(), rounds);
        assert!(curve.accuracy.iter().all(|&a| (0.0..=10.0).contains(&a)));

        let best = curve.best_rounds();
        assert_eq!(best.len(), rounds);
        assert!(best.iter().enumerate().all(|(i, &t)| 1 <= t && t <= i + 1));
    }

    #[test]
    fn internal_cv_counts_abstentions_as_the_fold_default() {
        let train = TrainingSet::from_labels([1, 1, 1, 1, 1, 1, 2, 2, 2, 2]);

        // Class 1 outweighs class 2 outside every fold,
        // so only the instances of class 1 score.
        let curve = InternalCv::new(&train)
            .n_folds(2)
            .max_rounds(3)
            .run(|_| Zero::init().run());

        assert_eq!(curve.accuracy, vec![6.0; 3]);
        assert_eq!(curve.best_rounds(), vec![1, 1, 1]);
    }

    #[test]
    fn internal_cv_needs_enough_instances() {
        let train = TrainingSet::from_labels([1, 2, 1]);
        let mut calls = 0;

        let curve = InternalCv::new(&train)
            .n_folds(5)
            .max_rounds(3)
            .run(|_| {
                calls += 1;
                RuleEnsemble::<RuleClassifier>::new()
            });

        assert_eq!(calls, 0);
        assert_eq!(curve.accuracy, vec![0.0; 3]);
    }

    #[test]
    fn logger_writes_one_row_per_round() {
        let (train, test, itemsets) = toy();
        let mut path = env::temp_dir();
        path.push(format!("ruleboosts-{}-logger.csv", process::id()));

        let booster = Slipper::init(&train, &itemsets).max_rounds(3);
        let f = Logger::new(booster, &train, &test)
            .print_every(usize::MAX)
            .run(&path)
            .unwrap();

        let log = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let mut lines = log.lines();
        assert_eq!(lines.next(), Some("Round,Rules,TrainAccuracy,TestAccuracy,Time"));
        let rows = lines.collect::<Vec<_>>();
        assert!(!rows.is_empty() && rows.len() <= 4);
        assert!(rows.iter().all(|row| row.split(',').count() == 5));

        let last = rows[rows.len() - 1].split(',').collect::<Vec<_>>();
        assert_eq!(last[1].parse::<usize>().unwrap(), f.len());
    }
}
