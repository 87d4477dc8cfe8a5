//! Greedy overlap assembly.
//!
//! The superstring is seeded with the first fragment of the store. Each step
//! scans the remaining fragments at a uniform widening step `w`, testing every
//! fragment at trial length `⌈L/2⌉ + w`. The first fragment (in store order)
//! that overlaps either end of the superstring is merged and removed, and the
//! widening step resets to zero. When `w` exceeds every remaining fragment's
//! length without a hit the assembly fails instead of spinning.
//!
//! Cost is O(m² · k) for `m` fragments of length `k`.

use log::{debug, info, trace, warn};
use serde::Serialize;
use thiserror::Error;

use crate::fragment::{Fragment, FragmentStore};
use crate::overlap::{find_overlap, max_widening, Overlap, Side};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Failures raised by the assembler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("no fragments to assemble")]
    Empty,
    #[error(
        "assembly incomplete: {remaining} fragment(s) share no half-length overlap with the superstring: {}",
        .ids.join(", ")
    )]
    Incomplete { remaining: usize, ids: Vec<String> },
    #[error("slice {start}..{end} is out of range for fragment {id}")]
    SliceOutOfRange { id: String, start: usize, end: usize },
    #[error("candidate index {index} is past the {remaining} fragment(s) left in the store")]
    StaleCandidate { index: usize, remaining: usize },
}

/// Options that govern the candidate search.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyConfig {
    /// Search candidates on a rayon pool (requires the `parallel` feature).
    pub use_threads: bool,
    /// Worker count for the search pool when threading is enabled.
    pub max_workers: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            use_threads: false,
            max_workers: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyState {
    /// Fragments remain to be merged.
    Accumulating,
    /// Every fragment has been merged.
    Done,
    /// A full widening pass found no overlap.
    Failed,
}

/// One merge applied to the superstring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRecord {
    pub fragment_id: String,
    pub side: Side,
    /// Number of bytes shared between the fragment and the superstring.
    pub overlap: usize,
    /// Widening step at which the overlap was found.
    pub widening: usize,
    /// Superstring length after the merge.
    pub superstring_len: usize,
}

/// Final product of a completed assembly.
#[derive(Debug, Clone, Serialize)]
pub struct Assembly {
    pub superstring: String,
    pub seed_id: String,
    pub merges: Vec<MergeRecord>,
}

impl Assembly {
    /// Sum of the overlap lengths consumed by all merges.
    pub fn overlap_total(&self) -> usize {
        self.merges.iter().map(|m| m.overlap).sum()
    }
}

/// Step-wise greedy assembler owning the fragment store and the superstring.
#[derive(Debug)]
pub struct OverlapAssembler {
    store: FragmentStore,
    superstring: String,
    seed_id: String,
    merges: Vec<MergeRecord>,
    state: AssemblyState,
    failure: Option<AssemblyError>,
    config: AssemblyConfig,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl OverlapAssembler {
    pub fn new(store: FragmentStore) -> Result<Self, AssemblyError> {
        Self::with_config(store, AssemblyConfig::default())
    }

    /// Seed the superstring with the first fragment of `store`.
    pub fn with_config(
        mut store: FragmentStore,
        config: AssemblyConfig,
    ) -> Result<Self, AssemblyError> {
        let seed = store.take_first().ok_or(AssemblyError::Empty)?;

        #[cfg(not(feature = "parallel"))]
        if config.use_threads {
            warn!(
                "Threaded candidate search requested, but the 'parallel' feature is not enabled; falling back to sequential mode"
            );
        }

        #[cfg(feature = "parallel")]
        let pool = if config.use_threads {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.max_workers.max(1))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!("Failed to build rayon thread pool ({err}); searching sequentially");
                    None
                }
            }
        } else {
            None
        };

        debug!("Seeding superstring with {}", seed);
        let state = if store.is_empty() {
            AssemblyState::Done
        } else {
            AssemblyState::Accumulating
        };
        let seed_id = seed.id().to_string();

        Ok(Self {
            store,
            superstring: seed.into_sequence(),
            seed_id,
            merges: Vec::new(),
            state,
            failure: None,
            config,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn superstring(&self) -> &str {
        &self.superstring
    }

    /// Fragments not yet merged.
    pub fn remaining(&self) -> &FragmentStore {
        &self.store
    }

    pub fn merges(&self) -> &[MergeRecord] {
        &self.merges
    }

    pub fn seed_id(&self) -> &str {
        &self.seed_id
    }

    pub fn config(&self) -> AssemblyConfig {
        self.config
    }

    /// Merge one fragment into the superstring.
    ///
    /// Returns the state after the merge. Once the assembler has failed every
    /// further call returns the same error.
    pub fn step(&mut self) -> Result<AssemblyState, AssemblyError> {
        match self.state {
            AssemblyState::Done => return Ok(AssemblyState::Done),
            AssemblyState::Failed => return Err(self.failure_or_incomplete()),
            AssemblyState::Accumulating => {}
        }

        let widest = self
            .store
            .iter()
            .map(|f| max_widening(f.len()))
            .max()
            .unwrap_or(0);

        for widening in 0..=widest {
            trace!(
                "Scanning {} fragment(s) at widening step {}",
                self.store.len(),
                widening
            );
            let Some((index, overlap)) = self.scan(widening) else {
                continue;
            };
            let merged = self
                .take_candidate(index)
                .and_then(|fragment| self.merge(fragment, overlap, widening));
            if let Err(err) = merged {
                return Err(self.fail(err));
            }
            if self.store.is_empty() {
                self.state = AssemblyState::Done;
            }
            return Ok(self.state);
        }

        let err = self.incomplete();
        warn!("{err}");
        Err(self.fail(err))
    }

    /// Drive the assembler until the store is empty or no overlap remains.
    pub fn run(&mut self) -> Result<(), AssemblyError> {
        let total = self.store.len();
        info!("Assembling {} fragment(s) onto seed {}", total + 1, self.seed_id);
        while self.step()? == AssemblyState::Accumulating {}
        info!(
            "Assembly complete: {} merge(s), superstring length {}",
            self.merges.len(),
            self.superstring.len()
        );
        Ok(())
    }

    /// Consume the assembler, returning whatever has been built so far.
    pub fn into_assembly(self) -> Assembly {
        Assembly {
            superstring: self.superstring,
            seed_id: self.seed_id,
            merges: self.merges,
        }
    }

    /// Hand back the fragments that were never merged.
    pub fn take_remaining(&mut self) -> FragmentStore {
        std::mem::take(&mut self.store)
    }

    /// Read-only pass: first fragment in store order overlapping at `widening`.
    fn scan(&self, widening: usize) -> Option<(usize, Overlap)> {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            let superstring = self.superstring.as_str();
            let fragments = self.store.as_slice();
            return pool.install(|| {
                fragments.par_iter().enumerate().find_map_first(|(idx, f)| {
                    find_overlap(superstring, f.sequence(), widening).map(|o| (idx, o))
                })
            });
        }

        self.store.iter().enumerate().find_map(|(idx, f)| {
            find_overlap(&self.superstring, f.sequence(), widening).map(|o| (idx, o))
        })
    }

    fn take_candidate(&mut self, index: usize) -> Result<Fragment, AssemblyError> {
        let remaining = self.store.len();
        self.store
            .remove(index)
            .ok_or(AssemblyError::StaleCandidate { index, remaining })
    }

    fn merge(
        &mut self,
        fragment: Fragment,
        overlap: Overlap,
        widening: usize,
    ) -> Result<(), AssemblyError> {
        let sequence = fragment.sequence();
        let len = sequence.len();
        let out_of_range = |start: usize, end: usize| AssemblyError::SliceOutOfRange {
            id: fragment.id().to_string(),
            start,
            end,
        };

        match overlap.side {
            Side::Append => {
                let tail = sequence
                    .get(overlap.length..)
                    .ok_or_else(|| out_of_range(overlap.length, len))?;
                self.superstring.push_str(tail);
            }
            Side::Prepend => {
                let cut = len
                    .checked_sub(overlap.length)
                    .ok_or_else(|| out_of_range(0, overlap.length))?;
                let head = sequence.get(..cut).ok_or_else(|| out_of_range(0, cut))?;
                self.superstring.insert_str(0, head);
            }
        }

        debug!(
            "Merged {} ({:?}, overlap {}, widening {}); superstring now {} bp, {} left",
            fragment,
            overlap.side,
            overlap.length,
            widening,
            self.superstring.len(),
            self.store.len()
        );
        self.merges.push(MergeRecord {
            fragment_id: fragment.id().to_string(),
            side: overlap.side,
            overlap: overlap.length,
            widening,
            superstring_len: self.superstring.len(),
        });
        Ok(())
    }

    fn incomplete(&self) -> AssemblyError {
        AssemblyError::Incomplete {
            remaining: self.store.len(),
            ids: self.store.ids(),
        }
    }

    fn fail(&mut self, err: AssemblyError) -> AssemblyError {
        self.state = AssemblyState::Failed;
        self.failure = Some(err.clone());
        err
    }

    fn failure_or_incomplete(&self) -> AssemblyError {
        self.failure.clone().unwrap_or_else(|| self.incomplete())
    }
}

/// Assemble `fragments` into a single superstring.
///
/// On success the store is left empty. On failure it holds the fragments that
/// could not be merged.
pub fn assemble(fragments: &mut FragmentStore) -> Result<String, AssemblyError> {
    assemble_with_config(fragments, AssemblyConfig::default()).map(|a| a.superstring)
}

/// Like [`assemble`], returning the merge log alongside the superstring.
pub fn assemble_with_config(
    fragments: &mut FragmentStore,
    config: AssemblyConfig,
) -> Result<Assembly, AssemblyError> {
    let mut assembler = OverlapAssembler::with_config(std::mem::take(fragments), config)?;
    let outcome = assembler.run();
    *fragments = assembler.take_remaining();
    outcome.map(|()| assembler.into_assembly())
}
