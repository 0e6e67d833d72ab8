//! ruleboosts CLI: train rule ensembles and print their predictions.
//!
//! Each row of the output is
//! ```txt
//! <label> ~<model> <p1> <p2> ... ~<model> <p1> ...
//! ```
//! where per-round models list one prediction per round prefix.
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ruleboosts::prelude::*;
use ruleboosts::common::metrics;
use ruleboosts::constants::{
    DEFAULT_COVERAGE_THRESHOLD,
    DEFAULT_GAMMA,
    DEFAULT_MAX_ROUNDS,
    DEFAULT_N_FOLDS,
    DEFAULT_SEED,
    DEFAULT_WEIGHT_CUTOFF,
};
use ruleboosts::research::{CurrentHypothesis, InternalCv, Logger};
use ruleboosts::sample::reader;


#[derive(Parser)]
#[command(name = "ruleboosts")]
#[command(about = "Boosting association rules into ensemble classifiers")]
#[command(version)]
struct Cli {
    /// Training files, one per class (class = suffix after the last `.`)
    #[arg(short = 's', required = true, num_args = 1..)]
    train: Vec<PathBuf>,

    /// Test file (feature ids, class last)
    #[arg(short = 't')]
    test: PathBuf,

    /// Itemset file
    #[arg(short = 'i')]
    itemsets: PathBuf,

    /// Maximum number of rounds
    #[arg(short = 'b', default_value_t = DEFAULT_MAX_ROUNDS)]
    rounds: usize,

    /// Original size of each class (`class size` per line)
    #[arg(short = 'o')]
    sizes: Option<PathBuf>,

    /// Similarity weight of each training instance (`id weight` per line)
    #[arg(short = 'j')]
    similarity: Option<PathBuf>,

    /// Internal cross validation of SLIPPER
    #[arg(short = 'c')]
    icv: bool,

    /// ZERO classifier
    #[arg(short = 'Z')]
    zero: bool,

    /// Lazy associative classifier
    #[arg(short = 'A')]
    lac: bool,

    /// Discrete boosting
    #[arg(short = 'D')]
    dboost: bool,

    /// Confidence-rated boosting
    #[arg(short = 'C')]
    cboost: bool,

    /// SLIPPER
    #[arg(short = 'S')]
    slipper: bool,

    /// BoostCAR
    #[arg(short = 'R')]
    boostcar: bool,

    /// Keep only free itemsets when merging
    #[arg(long)]
    free: bool,

    /// Itemset file layout (`multidupehack` or `lcm`)
    #[arg(long, default_value = "multidupehack")]
    rmode: ItemsetFormat,

    /// Seed of every random tie-break and shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Margin of discrete boosting
    #[arg(long, default_value_t = DEFAULT_GAMMA)]
    gamma: f64,

    /// Number of folds of the internal cross validation
    #[arg(long, default_value_t = DEFAULT_N_FOLDS)]
    folds: usize,

    /// Cumulative confidence above which BoostCAR drops an instance
    #[arg(long, default_value_t = DEFAULT_COVERAGE_THRESHOLD)]
    cvth: f64,

    /// Weight below which experimental BoostCAR drops an instance
    #[arg(long, default_value_t = DEFAULT_WEIGHT_CUTOFF)]
    cutoff: f64,

    /// Write the internal cross validation curve as JSON
    #[arg(long)]
    icv_report: Option<PathBuf>,

    /// Write one CSV log per boosting run into this directory
    #[arg(long)]
    log: Option<PathBuf>,
}


/// Predictions of one model, one row per test instance.
struct Column {
    name: String,
    rows: Vec<Vec<Option<Label>>>,
}


impl Column {
    fn new<H>(name: &str, f: &RuleEnsemble<H>, test: &[Instance], ceiling: Option<usize>, average: bool)
        -> Self
        where H: RuleHypothesis,
    {
        let rows = test.iter()
            .map(|x| match ceiling {
                Some(rounds) => f.predict_rounds(Target::Instance(x), average, rounds),
                None => vec![f.predict(Target::Instance(x), average)],
            })
            .collect();
        Self { name: name.to_string(), rows }
    }
}


/// Runs boosters, through a [`Logger`] when a log directory is set.
struct Session<'a> {
    train: &'a TrainingSet,
    test: &'a [Instance],
    log: Option<&'a Path>,
}


impl Session<'_> {
    fn fit<B, H>(&self, name: &str, mut booster: B) -> std::io::Result<RuleEnsemble<H>>
        where B: Booster<Output = RuleEnsemble<H>>
                + CurrentHypothesis<Output = RuleEnsemble<H>>,
              H: RuleHypothesis + Sync,
    {
        let f = match self.log {
            Some(dir) => {
                let path = dir.join(format!("{name}.csv"));
                Logger::new(booster, self.train, self.test)
                    .print_every(usize::MAX)
                    .run(path)?
            },
            None => booster.run(),
        };
        info!(model = name, rules = f.len(), "trained");
        Ok(f)
    }
}


fn prepare_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


/// Static confidence of the class a rule predicts.
fn static_confidence(h: &RuleClassifier, classes: &[Label]) -> f64 {
    h.predicted_class()
        .map(|y| metrics::confidence(h.itemset(), classes)[&y])
        .unwrap_or(0f64)
}


fn main() -> Result<(), Box<dyn Error>> {
    prepare_logging();
    let cli = Cli::parse();

    let train = reader::read_train(cli.train.as_slice())?;
    let test = reader::read_test(&cli.test)?;
    let itemsets: Vec<Arc<Itemset>> = ItemsetReader::new(&train)
        .format(cli.rmode)
        .free(cli.free)
        .read(&cli.itemsets)?;

    let extra: Option<BTreeMap<Label, f64>> = match &cli.sizes {
        Some(path) => {
            let sizes = reader::read_sizes(path)?;
            Some(Slipper::extra_from_sizes(&train, &sizes))
        },
        None => None,
    };
    let similarity = match &cli.similarity {
        Some(path) => Some(reader::read_similarity(path, &train)?),
        None => None,
    };

    if let Some(dir) = &cli.log {
        std::fs::create_dir_all(dir)?;
    }
    let session = Session { train: &train, test: &test, log: cli.log.as_deref() };

    let classes = train.classes();
    let default_class = train.default_class();
    let rounds = cli.rounds;
    let mut columns = Vec::new();


    // LAC
    if cli.lac {
        let f = Lac::init(&train, &itemsets).run();
        columns.push(Column::new("lac", &f, &test, None, true));
    }


    // SLIPPER
    let slipper = |weights: Option<Vec<f64>>, extra: Option<BTreeMap<Label, f64>>| {
        let mut booster = Slipper::init(&train, &itemsets)
            .seed(cli.seed)
            .max_rounds(rounds);
        if let Some(w) = weights { booster = booster.initial_weights(w); }
        if let Some(e) = extra { booster = booster.extra_mass(e); }
        booster
    };
    let mut tmax = None;
    if cli.slipper {
        let f = session.fit("black", slipper(None, None))?;
        columns.push(Column::new("black", &f, &test, Some(rounds), false));

        let mut chosen = f;
        if let Some(w) = &similarity {
            let f = session.fit("black_jacc", slipper(Some(w.clone()), None))?;
            columns.push(Column::new("black_jacc", &f, &test, Some(rounds), false));
            chosen = f;
        }
        if let Some(e) = &extra {
            let f = session.fit("black_extra", slipper(None, Some(e.clone())))?;
            columns.push(Column::new("black_extra", &f, &test, Some(rounds), false));
            chosen = f;
        }
        if let (Some(w), Some(e)) = (&similarity, &extra) {
            let f = session.fit("black_jacc_extra", slipper(Some(w.clone()), Some(e.clone())))?;
            columns.push(Column::new("black_jacc_extra", &f, &test, Some(rounds), false));
            chosen = f;
        }

        if cli.icv {
            let mut cv = InternalCv::new(&train)
                .n_folds(cli.folds)
                .seed(cli.seed)
                .max_rounds(rounds);
            if let Some(w) = &similarity {
                cv = cv.weights(w.clone());
            }
            let curve = cv.run(|weights| {
                slipper(Some(weights), extra.clone()).run()
            });
            if let Some(path) = &cli.icv_report {
                curve.write_json(path)?;
            }

            let models = curve.best_rounds()
                .into_iter()
                .map(|t| chosen.prefix(t))
                .collect::<Vec<_>>();
            let rows = test.iter()
                .map(|x| {
                    models.iter()
                        .map(|f| f.predict(Target::Instance(x), false))
                        .collect()
                })
                .collect();
            tmax = Some(Column { name: "Tmax".to_string(), rows });
        }
    }


    // Discrete boosting
    if cli.dboost {
        if classes.len() == 2 {
            let booster = DiscreteBoost::init(&train, &itemsets)
                .gamma(cli.gamma)
                .seed(cli.seed)
                .max_rounds(rounds);
            let f = session.fit("dboost", booster)?;
            columns.push(Column::new("dboost", &f, &test, Some(rounds), false));

            // Rules rated by their static confidence.
            let mut conf = RuleEnsemble::new();
            let mut conf_alpha = RuleEnsemble::new();
            for (h, alpha) in f.iter() {
                let c = static_confidence(h, &classes);
                let h = h.with_confidence(c);
                conf.push(c, h.clone());
                conf_alpha.push(c * alpha, h);
            }
            columns.push(Column::new("dboost-conf", &conf, &test, Some(rounds), false));
            columns.push(Column::new("dboost-conf-alpha", &conf_alpha, &test, Some(rounds), false));
        } else {
            warn!(n_classes = classes.len(), "discrete boosting needs two classes, skipped");
        }
    }


    // Confidence-rated boosting
    if cli.cboost {
        let variants = [
            ("cboost", ConfidenceRule::Margin),
            ("cboost-frac", ConfidenceRule::Fraction),
            ("cboost-static", ConfidenceRule::StaticFraction),
        ];
        for (name, rule) in variants {
            let booster = ConfidenceBoost::init(&train, &itemsets)
                .rule(rule)
                .seed(cli.seed)
                .max_rounds(rounds);
            let f = session.fit(name, booster)?;
            columns.push(Column::new(name, &f, &test, Some(rounds), false));
        }
    }


    // BoostCAR
    if cli.boostcar {
        let booster = BoostCar::init(&train, &itemsets)
            .coverage_threshold(cli.cvth);
        let f = session.fit("carboost", booster)?;
        columns.push(Column::new("carboost", &f, &test, None, false));

        let booster = ExperimentalBoostCar::init(&train, &itemsets)
            .weight_cutoff(cli.cutoff)
            .seed(cli.seed);
        let f = session.fit("carboost-exp", booster)?;
        columns.push(Column::new("carboost-exp", &f, &test, None, false));
    }


    // ZERO
    if cli.zero {
        let f = Zero::init().run();
        columns.push(Column::new("zero", &f, &test, None, false));
    }


    columns.extend(tmax);
    let show = |p: Option<Label>| match p.or(default_class) {
        Some(y) => y.to_string(),
        None => "_".to_string(),
    };
    for (k, x) in test.iter().enumerate() {
        let mut line = x.label().to_string();
        for column in &columns {
            line.push_str(&format!(" ~{}", column.name));
            for &p in &column.rows[k] {
                line.push(' ');
                line.push_str(&show(p));
            }
        }
        println!("{line}");
    }

    Ok(())
}
