use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::document::RgbColor;

/// The two fixed letter sets subjects are trained on. The distribution CSV
/// columns are laid out in this order, so trained letters are reordered to
/// match before pairing.
pub const LETTER_SET_ONE: [char; 8] = ['e', 's', 'm', 'q', 'x', 'c', 'h', 'o'];
pub const LETTER_SET_TWO: [char; 8] = ['a', 'n', 'w', 'z', 'j', 'f', 'r', 'i'];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LetterSet {
    One,
    Two,
}

impl LetterSet {
    pub fn name(self) -> &'static str {
        match self {
            Self::One => "set1",
            Self::Two => "set2",
        }
    }

    pub fn letters(self) -> &'static [char] {
        match self {
            Self::One => &LETTER_SET_ONE,
            Self::Two => &LETTER_SET_TWO,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: no trained letters (train == \"yes\")", path.display())]
    NoTrainedLetters { path: PathBuf },

    #[error("letter value {letter:?} is not a single character")]
    BadLetter { letter: String },

    #[error("trained letters {letters:?} match neither letter set")]
    UnknownSet { letters: Vec<char> },

    #[error("trained letter {letter:?} does not belong to {set}")]
    LetterOutsideSet { letter: char, set: &'static str },

    #[error("colour id {colour_id} has no RGB entry in {}", path.display())]
    MissingColour { colour_id: u32, path: PathBuf },

    #[error("{}: no distribution column for letter {letter:?}", path.display())]
    MissingDistribution { letter: char, path: PathBuf },

    #[error("distribution for letter {letter:?} has {got} weights, expected {expected}")]
    WeightCount {
        letter: char,
        got: usize,
        expected: usize,
    },

    #[error("distribution for letter {letter:?} is not a usable probability vector")]
    BadWeights { letter: char },
}

#[derive(Debug, Deserialize)]
struct LetterPairRow {
    letter: String,
    colour_id: u32,
    train: String,
}

#[derive(Debug, Deserialize)]
struct PaletteRow {
    colour_id: u32,
    rgb_r: u8,
    rgb_g: u8,
    // some palette files in the wild carry a misspelled blue column
    #[serde(alias = "rbg_b")]
    rgb_b: u8,
}

/// One letter a subject trains on, with its sampling weights over the
/// subject's colour codes.
#[derive(Clone, Debug)]
pub struct TrainedLetter {
    pub letter: char,

    /// The letter's own colour code (where a fully consistent distribution
    /// puts all of its mass)
    pub colour_id: u32,

    /// Weights aligned with `SubjectPalette::colour_ids`
    pub weights: Vec<f64>,
}

/// Everything needed to recolor one subject's book: trained letters in set
/// order, their distributions, and the RGB palette.
#[derive(Clone, Debug)]
pub struct SubjectPalette {
    pub set: LetterSet,
    pub letters: Vec<TrainedLetter>,

    /// The subject's colour codes, in letter-set order; distribution weights
    /// index into this
    pub colour_ids: Vec<u32>,

    pub colors: HashMap<u32, RgbColor>,
}

impl SubjectPalette {
    pub fn color_of(&self, colour_id: u32) -> Option<RgbColor> {
        self.colors.get(&colour_id).copied()
    }
}

/// Load the palette for one subject from the colors directory:
/// `sub-<subject>_letter_colour_pairs_sorted.csv`, `rgb_colors.csv` and
/// `probability_distributions_<set>.csv`.
pub fn load_subject_palette(
    colors_dir: &Path,
    subject: &str,
) -> Result<SubjectPalette, PaletteError> {
    let pairs_path = colors_dir.join(format!("sub-{subject}_letter_colour_pairs_sorted.csv"));
    let mut pairs = read_rows::<LetterPairRow>(&pairs_path)?;
    pairs.retain(|row| row.train == "yes");
    if pairs.is_empty() {
        return Err(PaletteError::NoTrainedLetters { path: pairs_path });
    }

    let mut trained: Vec<(char, u32)> = Vec::with_capacity(pairs.len());
    for row in pairs {
        let mut chars = row.letter.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => trained.push((letter, row.colour_id)),
            _ => return Err(PaletteError::BadLetter { letter: row.letter }),
        }
    }

    let set = infer_letter_set(&trained)?;
    if let Some(&(letter, _)) = trained.iter().find(|(l, _)| !set.letters().contains(l)) {
        return Err(PaletteError::LetterOutsideSet {
            letter,
            set: set.name(),
        });
    }

    // reorder to the set order; distribution columns are paired by it
    let mut ordered: Vec<(char, u32)> = Vec::with_capacity(trained.len());
    for &letter in set.letters() {
        if let Some(&pair) = trained.iter().find(|(l, _)| *l == letter) {
            ordered.push(pair);
        }
    }

    let palette_path = colors_dir.join("rgb_colors.csv");
    let mut colors = HashMap::new();
    for row in read_rows::<PaletteRow>(&palette_path)? {
        colors.insert(row.colour_id, RgbColor::new(row.rgb_r, row.rgb_g, row.rgb_b));
    }
    for &(_, colour_id) in &ordered {
        if !colors.contains_key(&colour_id) {
            return Err(PaletteError::MissingColour {
                colour_id,
                path: palette_path,
            });
        }
    }

    let dist_path = colors_dir.join(format!("probability_distributions_{}.csv", set.name()));
    let columns = read_distribution_columns(&dist_path)?;

    let colour_ids: Vec<u32> = ordered.iter().map(|&(_, id)| id).collect();
    let mut letters = Vec::with_capacity(ordered.len());
    for (letter, colour_id) in ordered {
        let weights = columns
            .get(&letter)
            .cloned()
            .ok_or_else(|| PaletteError::MissingDistribution {
                letter,
                path: dist_path.clone(),
            })?;
        if weights.len() != colour_ids.len() {
            return Err(PaletteError::WeightCount {
                letter,
                got: weights.len(),
                expected: colour_ids.len(),
            });
        }
        let degenerate = weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || weights.iter().sum::<f64>() <= 0.0;
        if degenerate {
            return Err(PaletteError::BadWeights { letter });
        }
        letters.push(TrainedLetter {
            letter,
            colour_id,
            weights,
        });
    }

    debug!(set = set.name(), letters = letters.len(), "palette loaded");
    Ok(SubjectPalette {
        set,
        letters,
        colour_ids,
        colors,
    })
}

fn infer_letter_set(trained: &[(char, u32)]) -> Result<LetterSet, PaletteError> {
    if trained.iter().any(|&(letter, _)| letter == 'e') {
        return Ok(LetterSet::One);
    }
    if trained.iter().any(|&(letter, _)| letter == 'a') {
        return Ok(LetterSet::Two);
    }
    Err(PaletteError::UnknownSet {
        letters: trained.iter().map(|&(letter, _)| letter).collect(),
    })
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, PaletteError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| PaletteError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.map_err(|source| PaletteError::Read {
            path: path.to_path_buf(),
            source,
        })?);
    }
    Ok(rows)
}

/// Read the distribution CSV as one weight column per single-character
/// header; other columns (an unnamed index, say) are ignored.
fn read_distribution_columns(path: &Path) -> Result<HashMap<char, Vec<f64>>, PaletteError> {
    let read_err = |source| PaletteError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    let mut keys: Vec<(usize, char)> = Vec::new();
    for (idx, field) in headers.iter().enumerate() {
        let mut chars = field.trim().chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            keys.push((idx, letter));
        }
    }

    let mut columns: HashMap<char, Vec<f64>> =
        keys.iter().map(|&(_, letter)| (letter, Vec::new())).collect();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        for &(idx, letter) in &keys {
            let field = record.get(idx).unwrap_or("").trim();
            let weight: f64 = field
                .parse()
                .map_err(|_| PaletteError::BadWeights { letter })?;
            if let Some(column) = columns.get_mut(&letter) {
                column.push(weight);
            }
        }
    }
    Ok(columns)
}

#[cfg(test)]
#[path = "palette_tests.rs"]
mod palette_tests;
