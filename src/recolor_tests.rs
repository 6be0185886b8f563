use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::document::{Paragraph, RgbColor, Run};
use crate::palette::{LetterSet, TrainedLetter};

fn certain(letter: char, colour_id: u32, colour_ids: &[u32]) -> TrainedLetter {
    let weights = colour_ids
        .iter()
        .map(|&id| if id == colour_id { 1.0 } else { 0.0 })
        .collect();
    TrainedLetter {
        letter,
        colour_id,
        weights,
    }
}

fn test_palette(letters: Vec<TrainedLetter>, colour_ids: Vec<u32>) -> SubjectPalette {
    let mut colors = HashMap::new();
    colors.insert(1, RgbColor::new(0xFF, 0x00, 0x00));
    colors.insert(2, RgbColor::new(0x00, 0x80, 0x00));
    SubjectPalette {
        set: LetterSet::Two,
        letters,
        colour_ids,
        colors,
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn trained_letters_receive_their_colour() {
    let palette = test_palette(vec![certain('a', 1, &[1, 2])], vec![1, 2]);
    let mut document = Document::with_paragraphs(vec![Paragraph::with_runs(vec![Run::new(
        "banana",
    )])]);

    let outcome = recolor_document(&mut document, &palette, &mut rng()).unwrap();

    assert_eq!(outcome.recolored, 3);
    assert_eq!(outcome.isolated, 6);

    let paragraph = document.paragraphs().next().unwrap();
    assert_eq!(paragraph.text(), "banana");
    let red = RgbColor::new(0xFF, 0x00, 0x00);
    for run in paragraph.runs() {
        if run.text == "a" {
            assert_eq!(run.props.color, Some(red));
        } else {
            assert_eq!(run.props.color, None);
        }
    }
}

#[test]
fn matching_is_case_sensitive() {
    let palette = test_palette(vec![certain('a', 1, &[1])], vec![1]);
    let mut document =
        Document::with_paragraphs(vec![Paragraph::with_runs(vec![Run::new("Aha")])]);

    let outcome = recolor_document(&mut document, &palette, &mut rng()).unwrap();

    assert_eq!(outcome.recolored, 1);
    let paragraph = document.paragraphs().next().unwrap();
    let colored: Vec<&Run> = paragraph
        .runs()
        .filter(|run| run.props.color.is_some())
        .collect();
    assert_eq!(colored.len(), 1);
    assert_eq!(colored[0].text, "a");
}

#[test]
fn every_letter_pass_runs_over_every_paragraph() {
    let palette = test_palette(
        vec![certain('a', 1, &[1, 2]), certain('n', 2, &[1, 2])],
        vec![1, 2],
    );
    let mut document = Document::with_paragraphs(vec![
        Paragraph::with_runs(vec![Run::new("an")]),
        Paragraph::with_runs(vec![Run::new("na")]),
    ]);

    let outcome = recolor_document(&mut document, &palette, &mut rng()).unwrap();

    assert_eq!(outcome.recolored, 4);
    // two passes, two characters per paragraph, two paragraphs
    assert_eq!(outcome.isolated, 8);

    let red = RgbColor::new(0xFF, 0x00, 0x00);
    let green = RgbColor::new(0x00, 0x80, 0x00);
    for paragraph in document.paragraphs() {
        for run in paragraph.runs() {
            match run.text.as_str() {
                "a" => assert_eq!(run.props.color, Some(red)),
                "n" => assert_eq!(run.props.color, Some(green)),
                other => panic!("unexpected run text {other:?}"),
            }
        }
    }
}

#[test]
fn text_survives_recoloring_unchanged() {
    let palette = test_palette(vec![certain('a', 1, &[1, 2])], vec![1, 2]);
    let mut document = Document::with_paragraphs(vec![Paragraph::with_runs(vec![
        Run::new("Alle Anfänge "),
        Run::new("sind schwer").with_bold(),
    ])]);
    let before: Vec<String> = document.paragraphs().map(Paragraph::text).collect();

    recolor_document(&mut document, &palette, &mut rng()).unwrap();

    let after: Vec<String> = document.paragraphs().map(Paragraph::text).collect();
    assert_eq!(before, after);
}

#[test]
fn sampling_is_reproducible_for_a_fixed_seed() {
    let palette = test_palette(
        vec![TrainedLetter {
            letter: 'a',
            colour_id: 1,
            weights: vec![0.5, 0.5],
        }],
        vec![1, 2],
    );
    let text = "aaaaaaaaaaaaaaaa";

    let color_sequence = |seed: u64| {
        let mut document =
            Document::with_paragraphs(vec![Paragraph::with_runs(vec![Run::new(text)])]);
        let mut rng = StdRng::seed_from_u64(seed);
        recolor_document(&mut document, &palette, &mut rng).unwrap();
        document
            .paragraphs()
            .next()
            .unwrap()
            .runs()
            .map(|run| run.props.color.unwrap())
            .collect::<Vec<_>>()
    };

    assert_eq!(color_sequence(42), color_sequence(42));
}

#[test]
fn mixed_weights_draw_from_both_colours() {
    let palette = test_palette(
        vec![TrainedLetter {
            letter: 'a',
            colour_id: 1,
            weights: vec![0.5, 0.5],
        }],
        vec![1, 2],
    );
    let mut document = Document::with_paragraphs(vec![Paragraph::with_runs(vec![Run::new(
        "a".repeat(64),
    )])]);

    recolor_document(&mut document, &palette, &mut rng()).unwrap();

    let mut seen = std::collections::HashSet::new();
    for run in document.paragraphs().next().unwrap().runs() {
        seen.insert(run.props.color.unwrap());
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn normalize_fonts_touches_every_run() {
    let mut document = Document::with_paragraphs(vec![
        Paragraph::with_runs(vec![Run::new("one"), Run::new("two")]),
        Paragraph::with_runs(vec![Run::new("three")]),
    ]);

    let touched = normalize_fonts(&mut document, "Arial Black", 11.0);

    assert_eq!(touched, 3);
    for paragraph in document.paragraphs() {
        for run in paragraph.runs() {
            assert_eq!(run.props.font.as_deref(), Some("Arial Black"));
            assert_eq!(run.props.size, Some(22));
        }
    }
}

#[test]
fn normalize_fonts_replaces_an_existing_typeface() {
    let mut run = Run::new("x");
    run.props.set_font("Times New Roman");
    run.props.set_size(28);
    let mut document = Document::with_paragraphs(vec![Paragraph::with_runs(vec![run])]);

    normalize_fonts(&mut document, "Arial", 12.0);

    let run = document.paragraphs().next().unwrap().runs().next().unwrap();
    assert_eq!(run.props.font.as_deref(), Some("Arial"));
    assert_eq!(run.props.size, Some(24));
}
