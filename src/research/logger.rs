use colored::Colorize;

use std::fs::File;
use std::io::prelude::*;
use std::io::BufWriter;
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Instant;

use crate::{
    Booster,
    Instance,
    Label,
    RuleEnsemble,
    RuleHypothesis,
    Target,
    TrainingSet,
    constants::PRINT_WIDTH,
};

const HEADER: &str = "Round,Rules,TrainAccuracy,TestAccuracy,Time\n";
const DEFAULT_PRINT_EVERY: usize = 10;


/// Implementing this trait allows you to use [`Logger`] to
/// log the behavior of a booster.
pub trait CurrentHypothesis {
    /// The model at the current round.
    type Output;

    /// Returns the model built so far.
    fn current_hypothesis(&self) -> Self::Output;
}


/// Struct `Logger` runs a booster round by round
/// and logs the size of the model, the train / test accuracy,
/// and the cumulative running time of each round.
///
/// Abstentions count as the default class.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::research::Logger;
/// use ruleboosts::sample::reader;
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let test = reader::read_test("data/test").unwrap();
/// let itemsets = ItemsetReader::new(&train).read("data/itemsets").unwrap();
///
/// let booster = ConfidenceBoost::init(&train, &itemsets);
/// let f = Logger::new(booster, &train, &test)
///     .print_every(5)
///     .run("cboost.csv")
///     .unwrap();
/// ```
pub struct Logger<'a, B> {
    booster: B,
    train: &'a TrainingSet,
    test: &'a [Instance],
    default_class: Option<Label>,
    round: usize,
}


impl<'a, B> Logger<'a, B> {
    /// Create a new instance of `Logger`.
    pub fn new(booster: B, train: &'a TrainingSet, test: &'a [Instance]) -> Self {
        let default_class = train.default_class();
        Self { booster, train, test, default_class, round: DEFAULT_PRINT_EVERY }
    }


    /// Set the interval to print the current status.
    /// Set `usize::MAX` to stay quiet.
    pub fn print_every(mut self, round: usize) -> Self {
        self.round = round.max(1);
        self
    }
}


impl<'a, B, H> Logger<'a, B>
    where B: Booster<Output = RuleEnsemble<H>>
            + CurrentHypothesis<Output = RuleEnsemble<H>>,
          H: RuleHypothesis + Sync,
{
    /// Run the given boosting algorithm with logging.
    /// Note that this method is almost the same as `Booster::run`.
    pub fn run<P: AsRef<Path>>(&mut self, filename: P)
        -> std::io::Result<RuleEnsemble<H>>
    {
        let mut file = BufWriter::new(File::create(filename)?);
        file.write_all(HEADER.as_bytes())?;

        self.print_info();

        self.booster.preprocess();

        // Cumulative time
        let mut time_acc = 0;

        for iter in 1.. {
            let now = Instant::now();
            let flow = self.booster.boost(iter);
            time_acc += now.elapsed().as_millis();

            let f = self.booster.current_hypothesis();
            let train = self.train_accuracy(&f);
            let test = self.test_accuracy(&f);

            let line = format!("{iter},{},{train},{test},{time_acc}\n", f.len());
            file.write_all(line.as_bytes())?;

            if iter % self.round == 0 {
                self.print_round(iter, f.len(), train, test);
            }

            if let ControlFlow::Break(_) = flow { break; }
        }
        file.flush()?;

        Ok(self.booster.postprocess())
    }


    fn train_accuracy(&self, f: &RuleEnsemble<H>) -> f64 {
        let n_sample = self.train.len();
        if n_sample == 0 { return 0f64; }

        let correct = (0..n_sample)
            .filter(|&i| {
                let p = f.predict(Target::Id(i), false).or(self.default_class);
                p == Some(self.train.label(i))
            })
            .count();
        correct as f64 / n_sample as f64
    }


    fn test_accuracy(&self, f: &RuleEnsemble<H>) -> f64 {
        if self.test.is_empty() { return 0f64; }

        let correct = f.predict_all(self.test, false)
            .into_iter()
            .zip(self.test)
            .filter(|(p, x)| p.or(self.default_class) == Some(x.label()))
            .count();
        correct as f64 / self.test.len() as f64
    }


    fn print_info(&self) {
        eprintln!("{}", format!("[{}]", self.booster.name()).bold().red());
        if let Some(info) = self.booster.info() {
            for (key, value) in info {
                eprintln!("    {: <20} {}", key.bold(), value);
            }
        }
    }


    fn print_round(&self, iter: usize, n_rules: usize, train: f64, test: f64) {
        eprintln!(
            "{}    {}    {}    {}",
            format!("  [ROUND {iter:>PRINT_WIDTH$}]").bold().red(),
            format!("[RULES {n_rules:>PRINT_WIDTH$}]").bold().blue(),
            format!("[TRAIN {train:>PRINT_WIDTH$.4}]").bold().green(),
            format!("[TEST {test:>PRINT_WIDTH$.4}]").bold().yellow(),
        );
    }
}
