//! Fragment reads and the mutable store the assembler drains.

use std::fmt;

/// A single read: the identifier taken from its header line plus its sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    id: String,
    sequence: String,
}

impl Fragment {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Identifier from the record's header line.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Length in bytes; sequences are expected to be ASCII nucleotide symbols.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn into_sequence(self) -> String {
        self.sequence
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bp)", self.id, self.len())
    }
}

/// Unordered collection of fragments supporting removal of any element.
///
/// Iteration order is the insertion order and is what the assembler uses to
/// break ties between fragments matching at the same trial length.
#[derive(Debug, Clone, Default)]
pub struct FragmentStore {
    fragments: Vec<Fragment>,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from bare sequences, numbering identifiers from 1.
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragments = sequences
            .into_iter()
            .enumerate()
            .map(|(idx, seq)| Fragment::new(format!("fragment_{}", idx + 1), seq))
            .collect();
        Self { fragments }
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    pub fn as_slice(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Remove the fragment at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<Fragment> {
        if index < self.fragments.len() {
            Some(self.fragments.remove(index))
        } else {
            None
        }
    }

    /// Remove the first fragment in iteration order.
    pub fn take_first(&mut self) -> Option<Fragment> {
        self.remove(0)
    }

    /// Identifiers of all fragments still held, in order.
    pub fn ids(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.id.clone()).collect()
    }

    /// Sum of all fragment lengths.
    pub fn total_len(&self) -> usize {
        self.fragments.iter().map(Fragment::len).sum()
    }
}

impl FromIterator<Fragment> for FragmentStore {
    fn from_iter<T: IntoIterator<Item = Fragment>>(iter: T) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FragmentStore {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_iter()
    }
}

impl From<Vec<Fragment>> for FragmentStore {
    fn from(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }
}
