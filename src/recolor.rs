use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use thiserror::Error;
use tracing::{debug, info};

use crate::document::{Document, IsolateError};
use crate::palette::SubjectPalette;

#[derive(Debug, Error)]
pub enum RecolorError {
    #[error(transparent)]
    Isolate(#[from] IsolateError),

    #[error("distribution for letter {letter:?} cannot be sampled: {source}")]
    Weights {
        letter: char,
        #[source]
        source: rand::distributions::WeightedError,
    },

    #[error("sampled colour id {colour_id} has no RGB entry")]
    MissingColour { colour_id: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecolorOutcome {
    /// Letter occurrences that received a color
    pub recolored: usize,

    /// Isolation calls performed
    pub isolated: usize,
}

/// Color every occurrence of each trained letter, drawing its colour from
/// the letter's probability distribution. Matching is case-sensitive.
///
/// Each letter pass walks every character of every paragraph and isolates it
/// into its own run before checking it; re-isolating a run a previous pass
/// already minimized leaves the paragraph untouched.
pub fn recolor_document<R: Rng>(
    document: &mut Document,
    palette: &SubjectPalette,
    rng: &mut R,
) -> Result<RecolorOutcome, RecolorError> {
    let mut outcome = RecolorOutcome::default();

    for trained in &palette.letters {
        let weights =
            WeightedIndex::new(&trained.weights).map_err(|source| RecolorError::Weights {
                letter: trained.letter,
                source,
            })?;
        let needle = trained.letter.to_string();
        info!(
            letter = %trained.letter,
            colour_id = trained.colour_id,
            "searching for letter"
        );

        let mut hits = 0usize;
        for paragraph in document.paragraphs_mut() {
            let char_len = paragraph.char_len();
            for start in 0..char_len {
                let run = paragraph.isolate(start, start + 1)?;
                outcome.isolated += 1;
                if run.text == needle {
                    let colour_id = palette.colour_ids[weights.sample(rng)];
                    let color = palette
                        .color_of(colour_id)
                        .ok_or(RecolorError::MissingColour { colour_id })?;
                    run.props.set_color(color);
                    hits += 1;
                }
            }
        }

        debug!(letter = %trained.letter, hits, "letter pass finished");
        outcome.recolored += hits;
    }

    Ok(outcome)
}

/// Replace every run's typeface and size across the whole document. Returns
/// the number of runs touched.
pub fn normalize_fonts(document: &mut Document, font: &str, size_points: f32) -> usize {
    let half_points = (size_points * 2.0).round() as u32;
    let mut touched = 0;
    for paragraph in document.paragraphs_mut() {
        for run in paragraph.runs_mut() {
            run.props.set_font(font);
            run.props.set_size(half_points);
            touched += 1;
        }
    }
    info!(font, size_points, touched, "fonts normalized");
    touched
}

#[cfg(test)]
#[path = "recolor_tests.rs"]
mod recolor_tests;
