//! Loading fragment records from FASTA-style delimited text.
//!
//! A record starts with a `>` header line whose first word is the fragment
//! identifier; every following line up to the next header is concatenated into
//! that record's sequence. Gzip-compressed inputs are detected by extension.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use bio::alphabets::dna;
use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use log::{debug, info};

use crate::fragment::{Fragment, FragmentStore};

/// Errors returned while loading fragments.
#[derive(thiserror::Error, Debug)]
pub enum ReadSourceError {
    #[error("input file not found: {}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("input file {} could not be read: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed input at record {record}: {reason}")]
    Malformed { record: usize, reason: String },
    #[error("fragment {id} contains non-nucleotide symbol {symbol:?} at position {position}")]
    InvalidSymbol {
        id: String,
        symbol: char,
        position: usize,
    },
}

impl ReadSourceError {
    /// True when the input itself could not be opened or read, as opposed to
    /// being readable but malformed.
    pub fn is_unreadable_input(&self) -> bool {
        matches!(self, Self::InputNotFound { .. } | Self::Unreadable { .. })
    }
}

/// Options for the record parser.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Prefix stripped from each header identifier (e.g. `Rosalind_`).
    pub id_prefix: String,
    /// Reject symbols outside the IUPAC DNA alphabet.
    pub validate_alphabet: bool,
    /// Upper-case sequence symbols while reading.
    pub uppercase: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            id_prefix: String::new(),
            validate_alphabet: false,
            uppercase: true,
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, ReadSourceError> {
    let file = File::open(path).map_err(|source| ReadSourceError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every fragment record from the file at `path`.
///
/// I/O failures after the file was opened (a directory, invalid UTF-8, a
/// corrupt gzip stream) are reported as [`ReadSourceError::Unreadable`].
pub fn read_fragments<P: AsRef<Path>>(
    path: P,
    config: &ParseConfig,
) -> Result<FragmentStore, ReadSourceError> {
    let path = path.as_ref();
    let reader = open_reader(path)?;
    let store = parse_fragments(reader, config).map_err(|err| match err {
        ReadSourceError::Io(source) => ReadSourceError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    info!(
        "Loaded {} fragment(s), {} bp total, from {}",
        store.len(),
        store.total_len(),
        path.display()
    );
    Ok(store)
}

/// Parse FASTA-style fragment records from any reader.
///
/// Sequence lines are concatenated with trailing whitespace removed; blank
/// lines contribute nothing. Content before the first header is rejected.
pub fn parse_fragments<R: Read>(
    reader: R,
    config: &ParseConfig,
) -> Result<FragmentStore, ReadSourceError> {
    let fasta_reader = fasta::Reader::new(reader);
    let mut store = FragmentStore::new();

    for record in fasta_reader.records() {
        let record = record.map_err(|err| classify_error(err, store.len() + 1))?;
        let id = record
            .id()
            .strip_prefix(config.id_prefix.as_str())
            .unwrap_or(record.id())
            .to_string();
        let sequence = sequence_string(record.seq(), config.uppercase)?;
        if config.validate_alphabet {
            validate_symbols(&id, &sequence)?;
        }
        store.push(Fragment::new(id, sequence));
    }

    debug!("Parsed {} record(s)", store.len());
    Ok(store)
}

/// The FASTA reader signals syntax violations with `ErrorKind::Other`; all
/// other kinds come from the underlying stream.
fn classify_error(err: io::Error, record: usize) -> ReadSourceError {
    if err.kind() == io::ErrorKind::Other {
        ReadSourceError::Malformed {
            record,
            reason: err.to_string(),
        }
    } else {
        ReadSourceError::Io(err)
    }
}

fn sequence_string(bytes: &[u8], uppercase: bool) -> Result<String, ReadSourceError> {
    let bytes = if uppercase {
        bytes
            .iter()
            .map(|b| b.to_ascii_uppercase())
            .collect::<Vec<u8>>()
    } else {
        bytes.to_vec()
    };
    String::from_utf8(bytes)
        .map_err(|err| ReadSourceError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Check every symbol against the IUPAC DNA alphabet.
pub fn validate_symbols(id: &str, sequence: &str) -> Result<(), ReadSourceError> {
    let alphabet = dna::iupac_alphabet();
    for (position, symbol) in sequence.char_indices() {
        let known = symbol.is_ascii() && alphabet.symbols.contains(symbol as usize);
        if !known {
            return Err(ReadSourceError::InvalidSymbol {
                id: id.to_string(),
                symbol,
                position,
            });
        }
    }
    Ok(())
}
