//! Readers for the training, test, itemset, class-size and similarity files.
use fixedbitset::FixedBitSet;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::Label;
use super::{
    Instance,
    Itemset,
    Pattern,
    Support,
    TrainingSet,
};

/// Marks the empty pattern in multidupehack/d-peeler outputs.
const EMPTY_PATTERN: &str = "ø";

/// Errors raised while reading input files.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A line does not follow the expected layout.
    #[error("{path}:{line}: {reason}")]
    Malformed {
        /// File being read.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },
    /// A support or weight refers to an instance absent from the training set.
    #[error("{path}:{line}: unknown training instance `{name}`")]
    UnknownInstance {
        /// File being read.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Unresolved instance name.
        name: String,
    },
    /// A training file name does not end with `.<class>`.
    #[error("cannot infer a class from the file name {path}")]
    ClassSuffix {
        /// File being read.
        path: PathBuf,
    },
}

/// Layout of an itemset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemsetFormat {
    /// One itemset per row: `s,s,s f,f,f`
    /// (multidupehack and d-peeler outputs).
    /// Consecutive rows with the same support are merged.
    #[default]
    Multidupehack,
    /// LCM output: a row of features followed by a row of
    /// support indices into the numerically sorted training names.
    Lcm,
}

impl FromStr for ItemsetFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lcm" => Ok(Self::Lcm),
            "multidupehack" | "dpeeler" | "d-peeler" => Ok(Self::Multidupehack),
            _ => Err(format!("unknown itemset format `{s}`")),
        }
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, ReadError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ReadError::Io { path: path.to_path_buf(), source })?;
    Ok(text.lines().map(str::to_string).collect())
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> ReadError {
    ReadError::Malformed {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse<T: FromStr>(path: &Path, line: usize, token: &str) -> Result<T, ReadError> {
    token.trim()
        .parse::<T>()
        .map_err(|_| malformed(path, line, format!("cannot parse `{token}`")))
}

/// Read the training files, one file per class.
/// The class is the suffix after the last `.` of the file name,
/// each row holds one instance name.
/// A row with several tokens keeps everything after the first space.
pub fn read_train<P: AsRef<Path>>(files: &[P]) -> Result<TrainingSet, ReadError> {
    let mut train = TrainingSet::new();
    for file in files {
        let path = file.as_ref();
        let class = path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, suffix)| suffix.parse::<Label>().ok())
            .ok_or_else(|| ReadError::ClassSuffix { path: path.to_path_buf() })?;
        train.add_class(class);

        for row in read_lines(path)? {
            let row = row.trim();
            if row.is_empty() { continue; }
            let name = row.split_once(' ')
                .map_or(row, |(_, rest)| rest.trim());
            train.push(name, class);
        }
    }
    Ok(train)
}

/// Read a LUCS-KDD test file.
/// Each row lists feature ids, the last one being the class.
pub fn read_test<P: AsRef<Path>>(file: P) -> Result<Vec<Instance>, ReadError> {
    let path = file.as_ref();
    let mut instances = Vec::new();
    for (line, row) in read_lines(path)?.into_iter().enumerate() {
        let tokens = row.split_whitespace().collect::<Vec<_>>();
        let Some((class, features)) = tokens.split_last() else { continue; };

        let label = parse::<Label>(path, line + 1, class)?;
        let features = features.iter()
            .map(|f| parse::<usize>(path, line + 1, f))
            .collect::<Result<Vec<_>, _>>()?;
        instances.push(Instance::new(instances.len(), features, label));
    }
    Ok(instances)
}

/// Read the original class sizes: one `class size` pair per row.
pub fn read_sizes<P: AsRef<Path>>(file: P)
    -> Result<BTreeMap<Label, usize>, ReadError>
{
    let path = file.as_ref();
    let mut sizes = BTreeMap::new();
    for (line, row) in read_lines(path)?.into_iter().enumerate() {
        let tokens = row.split_whitespace().collect::<Vec<_>>();
        match tokens[..] {
            [] => continue,
            [class, size, ..] => {
                let class = parse::<Label>(path, line + 1, class)?;
                let size = parse::<usize>(path, line + 1, size)?;
                sizes.insert(class, size);
            },
            _ => return Err(malformed(path, line + 1, "expected `class size`")),
        }
    }
    Ok(sizes)
}

/// Read similarity weights: one `name weight` pair per row.
/// Instances without a row get a zero weight.
pub fn read_similarity<P: AsRef<Path>>(file: P, train: &TrainingSet)
    -> Result<Vec<f64>, ReadError>
{
    let path = file.as_ref();
    let mut weights = vec![0f64; train.len()];
    for (line, row) in read_lines(path)?.into_iter().enumerate() {
        let tokens = row.split_whitespace().collect::<Vec<_>>();
        match tokens[..] {
            [] => continue,
            [name, weight, ..] => {
                let i = train.index_of(name)
                    .ok_or_else(|| ReadError::UnknownInstance {
                        path: path.to_path_buf(),
                        line: line + 1,
                        name: name.to_string(),
                    })?;
                weights[i] = parse::<f64>(path, line + 1, weight)?;
            },
            _ => return Err(malformed(path, line + 1, "expected `id weight`")),
        }
    }
    Ok(weights)
}

/// Reads itemset files against a training set.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::sample::reader::{self, ItemsetFormat};
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let itemsets = ItemsetReader::new(&train)
///     .format(ItemsetFormat::Lcm)
///     .free(true)
///     .read("data/itemsets.lcm")
///     .unwrap();
/// ```
pub struct ItemsetReader<'a> {
    train: &'a TrainingSet,
    format: ItemsetFormat,
    free: bool,
}

impl<'a> ItemsetReader<'a> {
    /// Construct a new reader resolving supports against `train`.
    pub fn new(train: &'a TrainingSet) -> Self {
        Self { train, format: ItemsetFormat::default(), free: false }
    }

    /// Set the file layout.
    /// Default is [`ItemsetFormat::Multidupehack`].
    pub fn format(mut self, format: ItemsetFormat) -> Self {
        self.format = format;
        self
    }

    /// Keep only free (minimal) patterns when merging.
    /// Default is `false`.
    pub fn free(mut self, free: bool) -> Self {
        self.free = free;
        self
    }

    /// Read the itemsets.
    /// A default itemset covering the whole training set is appended
    /// if the file holds none.
    pub fn read<P: AsRef<Path>>(self, file: P)
        -> Result<Vec<Arc<Itemset>>, ReadError>
    {
        let path = file.as_ref();
        let rows = read_lines(path)?;
        let mut itemsets = match self.format {
            ItemsetFormat::Multidupehack => self.read_multidupehack(path, rows)?,
            ItemsetFormat::Lcm => self.read_lcm(path, rows)?,
        };

        if !itemsets.iter().any(Itemset::is_default) {
            itemsets.push(Itemset::default_rule(self.train.full_support()));
        }

        tracing::info!("read {} itemsets from {}", itemsets.len(), path.display());
        Ok(itemsets.into_iter().map(Arc::new).collect())
    }

    fn empty_support(&self) -> Support {
        let n_sample = self.train.len();
        self.train.classes()
            .into_iter()
            .map(|y| (y, FixedBitSet::with_capacity(n_sample)))
            .collect()
    }

    fn read_multidupehack(&self, path: &Path, rows: Vec<String>)
        -> Result<Vec<Itemset>, ReadError>
    {
        let mut itemsets: Vec<Itemset> = Vec::new();
        let mut last: Option<String> = None;

        for (line, row) in rows.into_iter().enumerate() {
            let line = line + 1;
            let tokens = row.split_whitespace().collect::<Vec<_>>();
            let (support, features) = match tokens[..] {
                [] => continue,
                [support, features, ..] => (support, features),
                _ => return Err(malformed(path, line, "expected `s,s,s f,f,f`")),
            };

            let is_empty = features.split(',').next() == Some(EMPTY_PATTERN);
            let pattern = if is_empty {
                Pattern::new()
            } else {
                features.split(',')
                    .map(|f| parse::<usize>(path, line, f))
                    .collect::<Result<Pattern, _>>()?
            };

            // Rows sharing a support are printed consecutively.
            let same_support = last.as_deref() == Some(support);
            if let Some(prev) = itemsets.last_mut() {
                if same_support && !prev.is_default() {
                    prev.append(pattern, self.free);
                    continue;
                }
            }
            last = Some(support.to_string());

            let mut supp = self.empty_support();
            let mut length = 0_usize;
            for name in support.split(',') {
                let i = self.train.index_of(name)
                    .ok_or_else(|| ReadError::UnknownInstance {
                        path: path.to_path_buf(),
                        line,
                        name: name.to_string(),
                    })?;
                if let Some(bits) = supp.get_mut(&self.train.label(i)) {
                    bits.insert(i);
                }
                length += 1;
            }

            let id = itemsets.len() as i64;
            let itemset = Itemset::new(id, pattern, supp);
            let itemset = if is_empty || length == self.train.len() {
                itemset.into_default()
            } else {
                itemset
            };
            itemsets.push(itemset);
        }
        Ok(itemsets)
    }

    fn read_lcm(&self, path: &Path, rows: Vec<String>)
        -> Result<Vec<Itemset>, ReadError>
    {
        // LCM refers to instances by their rank among the sorted names.
        let mut ranked = (0..self.train.len())
            .map(|i| {
                let name = self.train.name(i);
                name.parse::<u64>()
                    .map(|key| (key, i))
                    .map_err(|_| malformed(
                        path, 0, format!("LCM needs numeric instance names, got `{name}`")
                    ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ranked.sort_unstable();
        let ranked = ranked.into_iter().map(|(_, i)| i).collect::<Vec<_>>();

        let mut itemsets = Vec::new();
        let mut pending: Option<Pattern> = None;
        for (line, row) in rows.into_iter().enumerate() {
            let line = line + 1;
            let Some(pattern) = pending.take() else {
                let pattern = row.split_whitespace()
                    .map(|f| parse::<usize>(path, line, f))
                    .collect::<Result<Pattern, _>>()?;
                pending = Some(pattern);
                continue;
            };

            let mut supp = self.empty_support();
            let mut length = 0_usize;
            for token in row.split_whitespace() {
                let rank = parse::<usize>(path, line, token)?;
                let i = *ranked.get(rank)
                    .ok_or_else(|| malformed(path, line, format!("rank {rank} out of range")))?;
                if let Some(bits) = supp.get_mut(&self.train.label(i)) {
                    bits.insert(i);
                }
                length += 1;
            }

            let is_default = pattern.is_empty() || length == self.train.len();
            let itemset = Itemset::new(itemsets.len() as i64, pattern, supp);
            itemsets.push(if is_default { itemset.into_default() } else { itemset });
        }

        if pending.is_some() {
            return Err(malformed(path, 0, "missing support row after the last itemset"));
        }
        Ok(itemsets)
    }
}
