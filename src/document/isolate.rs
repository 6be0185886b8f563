use thiserror::Error;

use super::{Inline, Paragraph, Run, char_to_byte_idx};

/// Failure of a single isolation call. Both variants are raised before any
/// run is touched, so the paragraph is unchanged on every error path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IsolateError {
    #[error("character range {start}..{end} is not a valid span of a {len}-character paragraph")]
    Range { start: usize, end: usize, len: usize },

    #[error("no run contains character offset {offset}")]
    MissingRun { offset: usize },
}

impl Paragraph {
    /// Rework the paragraph's runs so that the character range `start..end`
    /// of `self.text()` occupies exactly one run, and return that run.
    ///
    /// Runs are split as required; a range already occupying its own run
    /// leaves the paragraph unchanged. `start` and `end` are character
    /// offsets with slice semantics: the first three characters of the
    /// paragraph are `(0, 3)`.
    ///
    /// The paragraph text is identical before and after the call. Runs
    /// outside the range keep their text and formatting, though a run
    /// overlapping the range boundary is split in two.
    pub fn isolate(&mut self, start: usize, end: usize) -> Result<&mut Run, IsolateError> {
        let len = self.char_len();
        if start >= end || end > len {
            return Err(IsolateError::Range { start, end, len });
        }

        let (node_idx, skipped) = self
            .locate_run(start)
            .ok_or(IsolateError::MissingRun { offset: start })?;
        let local_start = start - skipped;
        let local_end = end - skipped;

        let node_idx = self
            .split_off_prefix(node_idx, local_start)
            .ok_or(IsolateError::MissingRun { offset: start })?;
        let local_end = local_end - local_start;

        let run_len = self
            .run_char_len(node_idx)
            .ok_or(IsolateError::MissingRun { offset: start })?;
        if run_len > local_end {
            self.split_off_suffix(node_idx, local_end)
                .ok_or(IsolateError::MissingRun { offset: start })?;
        } else if run_len < local_end {
            self.lengthen_run(node_idx, local_end)
                .ok_or(IsolateError::MissingRun { offset: start })?;
        }

        match self.children.get_mut(node_idx) {
            Some(Inline::Run(run)) => Ok(run),
            _ => Err(IsolateError::MissingRun { offset: start }),
        }
    }

    /// Find the run containing the global character offset `start`. Returns
    /// the child index of that run and the total character length of the
    /// runs before it.
    ///
    /// The comparison against each cumulative end is strict, so an offset
    /// sitting exactly on a run boundary lands in the run that begins there,
    /// and zero-length runs at the boundary are passed over.
    fn locate_run(&self, start: usize) -> Option<(usize, usize)> {
        let mut skipped = 0;
        for (idx, child) in self.children.iter().enumerate() {
            let Inline::Run(run) = child else { continue };
            let run_end = skipped + run.char_len();
            if start < run_end {
                return Some((idx, skipped));
            }
            skipped = run_end;
        }
        None
    }

    fn run_char_len(&self, node_idx: usize) -> Option<usize> {
        match self.children.get(node_idx)? {
            Inline::Run(run) => Some(run.char_len()),
            Inline::Raw(_) => None,
        }
    }

    /// Split the leading `start` characters off into a separate run inserted
    /// before this one, keeping the run's formatting on both halves. Returns
    /// the child index the target run ends up at. Does nothing if the run
    /// already begins at the isolation start.
    fn split_off_prefix(&mut self, node_idx: usize, start: usize) -> Option<usize> {
        if start == 0 {
            return Some(node_idx);
        }
        let prefix = {
            let Inline::Run(run) = self.children.get_mut(node_idx)? else {
                return None;
            };
            let byte_idx = char_to_byte_idx(&run.text, start);
            let mut prefix = run.clone_format();
            prefix.text = run.text[..byte_idx].to_string();
            run.text.drain(..byte_idx);
            prefix
        };
        self.children.insert(node_idx, Inline::Run(prefix));
        Some(node_idx + 1)
    }

    /// Split the run at `end` such that the suffix lands in a separate
    /// following run with the same formatting.
    fn split_off_suffix(&mut self, node_idx: usize, end: usize) -> Option<()> {
        let suffix = {
            let Inline::Run(run) = self.children.get_mut(node_idx)? else {
                return None;
            };
            let byte_idx = char_to_byte_idx(&run.text, end);
            let mut suffix = run.clone_format();
            suffix.text = run.text.split_off(byte_idx);
            suffix
        };
        self.children.insert(node_idx + 1, Inline::Run(suffix));
        Some(())
    }

    /// Grow the run by consuming following runs until it is `end` characters
    /// long. A following run that fits entirely is absorbed and removed; one
    /// that is longer than the remaining deficit gives up its leading
    /// characters and keeps its own formatting for the rest.
    fn lengthen_run(&mut self, node_idx: usize, end: usize) -> Option<()> {
        loop {
            let have = self.run_char_len(node_idx)?;
            if have >= end {
                return Some(());
            }
            let deficit = end - have;

            let next_idx = self.next_run_index(node_idx)?;
            let next_len = self.run_char_len(next_idx)?;

            if next_len <= deficit {
                let Inline::Run(absorbed) = self.children.remove(next_idx) else {
                    return None;
                };
                let Inline::Run(run) = self.children.get_mut(node_idx)? else {
                    return None;
                };
                run.text.push_str(&absorbed.text);
            } else {
                let head = {
                    let Inline::Run(next) = self.children.get_mut(next_idx)? else {
                        return None;
                    };
                    let byte_idx = char_to_byte_idx(&next.text, deficit);
                    next.text.drain(..byte_idx).collect::<String>()
                };
                let Inline::Run(run) = self.children.get_mut(node_idx)? else {
                    return None;
                };
                run.text.push_str(&head);
            }
        }
    }

    fn next_run_index(&self, node_idx: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .skip(node_idx + 1)
            .find_map(|(idx, child)| match child {
                Inline::Run(_) => Some(idx),
                Inline::Raw(_) => None,
            })
    }
}
