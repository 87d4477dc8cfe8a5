//! Exact suffix/prefix overlap primitives used by the greedy assembler.
//!
//! All comparisons operate on bytes and every window is taken through a
//! checked slice, so a trial length longer than either string simply fails to
//! match instead of panicking.

use serde::Serialize;

/// End of the superstring a fragment was glued onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Superstring suffix matched the fragment prefix; the fragment tail is appended.
    Append,
    /// Superstring prefix matched the fragment suffix; the fragment head is prepended.
    Prepend,
}

/// A confirmed overlap between the superstring and one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub side: Side,
    pub length: usize,
}

/// Smallest admissible overlap for a fragment of `len` bytes: `⌈len / 2⌉`.
#[inline]
pub fn half_length(len: usize) -> usize {
    len.div_ceil(2)
}

/// Number of widening steps a fragment of `len` bytes tolerates beyond its half length.
#[inline]
pub fn max_widening(len: usize) -> usize {
    len - half_length(len)
}

/// Trial length for a fragment at a given widening step, or `None` once the
/// fragment's full length has been exhausted.
#[inline]
pub fn trial_length(len: usize, widening: usize) -> Option<usize> {
    let trial = half_length(len).checked_add(widening)?;
    (trial <= len).then_some(trial)
}

/// Bounded iterator over the trial lengths `⌈len / 2⌉ ..= len`.
#[derive(Debug, Clone)]
pub struct TrialLengths {
    next: usize,
    end: usize,
}

impl Iterator for TrialLengths {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next > self.end {
            return None;
        }
        let current = self.next;
        self.next += 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrialLengths {}

pub fn trial_lengths(len: usize) -> TrialLengths {
    TrialLengths {
        next: half_length(len),
        end: len,
    }
}

/// True when the last `trial` bytes of `superstring` equal the first `trial` bytes of `fragment`.
pub fn suffix_prefix_overlap(superstring: &str, fragment: &str, trial: usize) -> bool {
    fragment
        .as_bytes()
        .get(..trial)
        .is_some_and(|prefix| superstring.as_bytes().ends_with(prefix))
}

/// True when the first `trial` bytes of `superstring` equal the last `trial` bytes of `fragment`.
pub fn prefix_suffix_overlap(superstring: &str, fragment: &str, trial: usize) -> bool {
    let bytes = fragment.as_bytes();
    bytes
        .len()
        .checked_sub(trial)
        .and_then(|start| bytes.get(start..))
        .is_some_and(|suffix| superstring.as_bytes().starts_with(suffix))
}

/// Test one fragment against the superstring at the given widening step.
///
/// The append direction is checked before the prepend direction.
pub fn find_overlap(superstring: &str, fragment: &str, widening: usize) -> Option<Overlap> {
    let length = trial_length(fragment.len(), widening)?;
    if suffix_prefix_overlap(superstring, fragment, length) {
        Some(Overlap {
            side: Side::Append,
            length,
        })
    } else if prefix_suffix_overlap(superstring, fragment, length) {
        Some(Overlap {
            side: Side::Prepend,
            length,
        })
    } else {
        None
    }
}
