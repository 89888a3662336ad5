//! Error types for invalid input and failing collaborators.
//!
//! I/O and network problems are not mapped here; they travel as `anyhow::Error`
//! with the context of the operation that failed.

use std::process::ExitStatus;

/// Errors raised by the download/annotation pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sample identifier is not in the configured URL table.
    #[error(
        "sample {sample:?} not in allowed list of samples: {}\nSee: {dataset_url}",
        valid.join(", ")
    )]
    UnknownSample {
        sample: String,
        valid: Vec<String>,
        dataset_url: String,
    },
    /// The genome build is not one we can download ClinVar for.
    #[error(
        "genome {genome:?} not in allowed list of genomes for download: {}",
        allowed.join(", ")
    )]
    UnsupportedGenome { genome: String, allowed: Vec<String> },
    /// The external annotation tool exited with a non-zero status.
    #[error("annotation command {program:?} failed: {status}")]
    AnnotationFailed { program: String, status: ExitStatus },
    /// Records were requested before an annotated VCF was produced.
    #[error("sample {sample:?} has no annotated VCF, annotate it first")]
    NotAnnotated { sample: String },
}
