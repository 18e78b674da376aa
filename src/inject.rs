//! Running the substitution engine over a directory of files

use crate::Result;
use crate::files::{self, InputFile, OutputDir};
use colored::Colorize;
use secretsub_core::{Engine, Outcome, SecretSet, SubstitutionReport};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The result of processing one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub report: SubstitutionReport,
    /// Where the rewritten file was written, if it was
    pub written: Option<PathBuf>,
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files read and processed
    pub processed: usize,
    /// Files written to the output directory
    pub written: usize,
    /// Files with no resolved secret, left unwritten
    pub skipped: usize,
    /// Files that could not be read or written, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Substitutes one secret set into every file of an input tree.
///
/// Without an output directory the injector only reports what it would do.
pub struct Injector<'a> {
    engine: Engine,
    secrets: &'a SecretSet,
    output: Option<OutputDir>,
}

impl<'a> Injector<'a> {
    pub fn new(engine: Engine, secrets: &'a SecretSet) -> Self {
        Self {
            engine,
            secrets,
            output: None,
        }
    }

    /// Writes files with at least one resolved secret below `output`.
    pub fn write_to(mut self, output: OutputDir) -> Self {
        self.output = Some(output);
        self
    }

    /// Reads, substitutes and (if anything resolved) writes a single file.
    pub fn process_file(&self, file: &InputFile) -> Result<FileOutcome> {
        let text = file.read()?;
        let substitution = self.engine.process(&text, self.secrets)?;
        debug!(
            path = %file.path.display(),
            substituted = substitution.report.substituted,
            replacements = substitution.report.replacements,
            "processed file"
        );

        let written = match &self.output {
            Some(output) if substitution.report.should_write() => {
                Some(output.write(&file.relative, &substitution.text)?)
            }
            _ => None,
        };

        Ok(FileOutcome {
            report: substitution.report,
            written,
        })
    }

    /// Processes every file under `input`, printing a report per file.
    ///
    /// A file that cannot be listed, read or written is reported and skipped;
    /// only a failure to open `input` itself aborts the run.
    pub fn run(&self, input: &Path) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let tree = files::walk(input)?;

        for err in tree.errors {
            println!("Skipping {}", err.path.display().to_string().bold());
            println!("\t{} {}", "!".yellow(), err.message.red());
            summary.failed.push((err.path, err.message));
        }

        for file in tree.files {
            println!("Reading {}", file.path.display().to_string().bold());
            match self.process_file(&file) {
                Ok(outcome) => {
                    print_file_report(&outcome, self.output.is_some());
                    summary.processed += 1;
                    if outcome.written.is_some() {
                        summary.written += 1;
                    } else if !outcome.report.should_write() {
                        summary.skipped += 1;
                    }
                }
                Err(err) => {
                    warn!(path = %file.path.display(), error = %err, "skipping file");
                    println!("\t{} {}", "!".yellow(), err.to_string().red());
                    summary.failed.push((file.path.clone(), err.to_string()));
                }
            }
        }

        print_summary(&summary);
        Ok(summary)
    }
}

fn print_file_report(outcome: &FileOutcome, writing: bool) {
    let report = &outcome.report;
    println!("\tSecrets matched:");
    if report.is_empty() {
        println!("\t\t--NONE--");
    }
    for m in &report.matches {
        match &m.outcome {
            Outcome::Resolved => println!("\t\t{}\t{}", m.name, "✓".green()),
            Outcome::Missing => println!("\t\t{}\t{}", m.name, "✗".red()),
            Outcome::Failed(err) => println!(
                "\t\t{}\t{} {}",
                m.name,
                "✗".red(),
                format!("({})", err).yellow()
            ),
        }
    }

    if !report.should_write() {
        println!("\tNo secrets matched, and file not written");
        return;
    }

    println!(
        "\tTotal variables matched: {} ({} replacements)",
        report.substituted.to_string().green(),
        report.replacements
    );
    match &outcome.written {
        Some(path) => println!("\tSecrets written to {}", path.display()),
        None if !writing => println!("\t{}", "Dry run, file not written".yellow()),
        None => {}
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\nSummary: {} processed, {} written, {} without secrets, {} failed",
        summary.processed,
        summary.written.to_string().green(),
        summary.skipped.to_string().yellow(),
        summary.failed.len().to_string().red()
    );
}
