//! Recolors individual letter occurrences inside DOCX books according to
//! per-letter, per-subject probability distributions over a fixed palette,
//! and optionally normalizes the whole document's typeface and size.
//!
//! The interesting part lives in [`document`]: isolating an arbitrary
//! character range of a paragraph into its own run so a single letter can be
//! formatted independently. Everything else is loading and saving.

pub mod document;
pub mod docx;
pub mod palette;
pub mod recolor;
