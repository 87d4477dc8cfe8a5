//! superstring_rs
//!
//! Greedy reconstruction of a single superstring from overlapping fragment
//! reads. Fragments are merged one at a time onto a growing superstring
//! whenever they overlap one of its ends by at least half their own length.

pub mod assembly;
pub mod fragment;
pub mod output;
pub mod overlap;
pub mod read_source;

pub use assembly::{
    assemble, assemble_with_config, Assembly, AssemblyConfig, AssemblyError, AssemblyState,
    MergeRecord, OverlapAssembler,
};
pub use fragment::{Fragment, FragmentStore};
pub use output::{write_atomic, write_superstring, OutputError, DEFAULT_OUTPUT};
pub use overlap::{find_overlap, half_length, trial_lengths, Overlap, Side};
pub use read_source::{parse_fragments, read_fragments, ParseConfig, ReadSourceError};
