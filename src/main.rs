use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use serde_json::json;

use superstring_rs::{
    assemble_with_config, read_fragments, write_atomic, write_superstring, Assembly,
    AssemblyConfig, ParseConfig, ReadSourceError, DEFAULT_OUTPUT,
};

/// Greedy superstring assembler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delimited fragment file (plain or gzip)
    input: PathBuf,

    /// Destination for the assembled superstring
    #[arg(long, short, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Prefix stripped from record identifiers (e.g. `Rosalind_`)
    #[arg(long, default_value = "")]
    id_prefix: String,

    /// Reject fragments with symbols outside the IUPAC DNA alphabet
    #[arg(long)]
    validate_alphabet: bool,

    /// Optional JSON file describing every merge
    #[arg(long)]
    merge_report: Option<PathBuf>,

    /// Search candidates on a thread pool (needs the `parallel` feature)
    #[arg(long, default_value_t = false)]
    threads: bool,

    /// Worker threads for the candidate search (default: max available - 1)
    #[arg(long, default_value_t = num_cpus::get().saturating_sub(1).max(1))]
    max_workers: usize,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

fn main() {
    let args = Args::parse();
    let log_level = if args.trace {
        "trace"
    } else if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "error"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(error) = run(&args) {
        if let Some(message) = input_usage_message(&error) {
            println!("{message}");
            std::process::exit(2);
        }
        eprintln!("Assembly failed: {error:?}");
        std::process::exit(1);
    }
}

/// Usage text for errors caused by a missing or unreadable input file.
fn input_usage_message(error: &anyhow::Error) -> Option<String> {
    let source = error.downcast_ref::<ReadSourceError>()?;
    let problem = match source {
        ReadSourceError::InputNotFound { path, .. } => {
            format!("fragment file {} was not found", path.display())
        }
        ReadSourceError::Unreadable { path, source } => {
            format!("fragment file {} could not be read ({source})", path.display())
        }
        _ => return None,
    };
    Some(format!(
        "ERROR: {problem}\nUsage: superstring <INPUT> [--output {DEFAULT_OUTPUT}]"
    ))
}

fn run(args: &Args) -> Result<()> {
    info!("input: {}", args.input.display());
    let parse_config = ParseConfig {
        id_prefix: args.id_prefix.clone(),
        validate_alphabet: args.validate_alphabet,
        ..ParseConfig::default()
    };
    let mut fragments = read_fragments(&args.input, &parse_config)?;
    let fragment_count = fragments.len();

    let config = AssemblyConfig {
        use_threads: args.threads,
        max_workers: args.max_workers,
    };
    let assembly = assemble_with_config(&mut fragments, config).with_context(|| {
        format!(
            "Failed to assemble {} fragment(s) from {}",
            fragment_count,
            args.input.display()
        )
    })?;
    debug!("Superstring: {}", assembly.superstring);

    // the report goes first so a failure there leaves no superstring behind
    if let Some(report) = &args.merge_report {
        write_merge_report(report, &args.input, fragment_count, &assembly)
            .with_context(|| format!("Failed to write merge report {}", report.display()))?;
    }

    if let Err(err) = write_superstring(&args.output, &assembly.superstring) {
        if let Some(report) = &args.merge_report {
            let _ = std::fs::remove_file(report);
        }
        return Err(err.into());
    }
    Ok(())
}

fn write_merge_report(
    path: &Path,
    input: &Path,
    fragment_count: usize,
    assembly: &Assembly,
) -> Result<()> {
    let report = json!({
        "input": input.display().to_string(),
        "fragments": fragment_count,
        "seed": assembly.seed_id,
        "superstring_len": assembly.superstring.len(),
        "overlap_total": assembly.overlap_total(),
        "merges": assembly.merges,
    });
    let mut rendered = serde_json::to_string_pretty(&report)?;
    rendered.push('\n');
    write_atomic(path, rendered.as_bytes())?;
    info!("Merge report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod smoke {
    use super::*;

    fn args_for(input: PathBuf, output: PathBuf, merge_report: Option<PathBuf>) -> Args {
        Args {
            input,
            output,
            id_prefix: String::new(),
            validate_alphabet: true,
            merge_report,
            threads: false,
            max_workers: 1,
            verbose: false,
            debug: false,
            trace: false,
        }
    }

    #[test]
    fn smoke_run() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let input = dir.path().join("rosalind.txt");
        let output = dir.path().join("superstring.txt");
        let report = dir.path().join("report").join("merges.json");
        std::fs::write(
            &input,
            ">Rosalind_56\nATTAGACCTG\n>Rosalind_57\nCCTGCCGGAA\n>Rosalind_58\nAGACCTGCCG\n>Rosalind_59\nGCCGGAATAC\n",
        )
        .unwrap();

        run(&args_for(input, output.clone(), Some(report.clone()))).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "ATTAGACCTGCCGGAATAC"
        );
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(report["fragments"], 4);
        assert_eq!(report["seed"], "Rosalind_56");
        assert_eq!(report["merges"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn missing_input_produces_no_output() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let output = dir.path().join("superstring.txt");
        let err = run(&args_for(dir.path().join("absent.txt"), output.clone(), None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReadSourceError>(),
            Some(ReadSourceError::InputNotFound { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn incomplete_assembly_leaves_no_output() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let input = dir.path().join("reads.txt");
        let output = dir.path().join("superstring.txt");
        std::fs::write(&input, ">a\nAAAA\n>b\nCCCC\n").unwrap();

        let err = run(&args_for(input, output.clone(), None)).unwrap_err();
        assert!(err.downcast_ref::<superstring_rs::AssemblyError>().is_some());
        assert!(!output.exists());
    }

    #[test]
    fn unreadable_input_takes_the_usage_path() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let output = dir.path().join("superstring.txt");

        // a directory opens fine but cannot be read as text
        let err = run(&args_for(dir.path().to_path_buf(), output.clone(), None)).unwrap_err();
        let message = input_usage_message(&err).expect("usage message");
        assert!(message.contains("could not be read"));
        assert!(message.contains("Usage: superstring"));
        assert!(!output.exists());

        let missing = run(&args_for(dir.path().join("absent.txt"), output.clone(), None))
            .unwrap_err();
        assert!(input_usage_message(&missing)
            .expect("usage message")
            .contains("was not found"));
    }

    #[test]
    fn assembly_failure_is_not_a_usage_error() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let input = dir.path().join("reads.txt");
        std::fs::write(&input, ">a\nAAAA\n>b\nCCCC\n").unwrap();

        let err = run(&args_for(input, dir.path().join("out.txt"), None)).unwrap_err();
        assert!(input_usage_message(&err).is_none());
    }

    #[test]
    fn failed_merge_report_leaves_no_output() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let input = dir.path().join("reads.txt");
        let output = dir.path().join("superstring.txt");
        let report = dir.path().join("report_dir");
        std::fs::create_dir(&report).unwrap();
        std::fs::write(&input, ">a\nAAAATTTT\n>b\nTTTTGGGG\n").unwrap();

        let err = run(&args_for(input, output.clone(), Some(report.clone()))).unwrap_err();
        assert!(err.to_string().contains("merge report"));
        assert!(!output.exists());
        assert!(report.is_dir());
        assert!(!dir.path().join("report_dir.tmp").exists());
    }
}
