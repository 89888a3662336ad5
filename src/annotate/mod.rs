//! Annotation of sample VCF files with ClinVar through an external tool.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::config::AnnotationToolConfig;
use crate::error::Error;

pub mod records;

pub use records::VariantRecord;

/// Suffix of the annotated VCF file name, after the sample identifier.
pub const ANNOTATED_VCF_SUFFIX: &str = "_annotated.vcf";

/// The variants of one sample, from download through annotation to flat records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleVariants {
    /// Identifier of the sample.
    pub sample_id: String,
    /// Path to the downloaded sample VCF file.
    pub path_vcf: PathBuf,
    /// Path to the annotated VCF file, set by [`Annotator::annotate`].
    pub path_annotated_vcf: Option<PathBuf>,
    /// Flat records, set by [`records::extract_records`].
    pub records: Vec<VariantRecord>,
}

impl SampleVariants {
    pub fn new(sample_id: &str, path_vcf: impl Into<PathBuf>) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            path_vcf: path_vcf.into(),
            path_annotated_vcf: None,
            records: Vec::new(),
        }
    }
}

/// An external program that annotates a VCF file with a reference VCF file.
pub trait AnnotationTool {
    /// Annotate `path_input_vcf` with `path_annotation_vcf` and write the result to
    /// `path_output_vcf`.
    fn annotate(
        &self,
        path_annotation_vcf: &Path,
        path_input_vcf: &Path,
        path_output_vcf: &Path,
    ) -> Result<(), anyhow::Error>;
}

/// Runs `SnpSift annotate` (or any command following its conventions) as a subprocess.
///
/// The two VCF paths are passed as separate arguments, no shell is involved.  The standard
/// output of the process becomes the output file; standard error is passed through.
#[derive(Debug, Clone)]
pub struct SnpSift {
    config: AnnotationToolConfig,
}

impl SnpSift {
    pub fn new(config: AnnotationToolConfig) -> Self {
        Self { config }
    }
}

impl AnnotationTool for SnpSift {
    fn annotate(
        &self,
        path_annotation_vcf: &Path,
        path_input_vcf: &Path,
        path_output_vcf: &Path,
    ) -> Result<(), anyhow::Error> {
        let output = File::create(path_output_vcf)
            .with_context(|| format!("could not create {}", path_output_vcf.display()))?;

        tracing::debug!(
            "Running: {} {} {} {} > {}",
            &self.config.program,
            self.config.args.join(" "),
            path_annotation_vcf.display(),
            path_input_vcf.display(),
            path_output_vcf.display()
        );
        let status = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(path_annotation_vcf)
            .arg(path_input_vcf)
            .stdin(Stdio::null())
            .stdout(Stdio::from(output))
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| {
                format!(
                    "could not run {:?}, is it installed and on the PATH?",
                    &self.config.program
                )
            })?;

        if !status.success() {
            return Err(Error::AnnotationFailed {
                program: self.config.program.clone(),
                status,
            }
            .into());
        }

        Ok(())
    }
}

/// Annotates samples into an output directory, skipping samples annotated before.
pub struct Annotator<T> {
    tool: T,
}

impl<T> Annotator<T>
where
    T: AnnotationTool,
{
    pub fn new(tool: T) -> Self {
        Self { tool }
    }

    #[cfg(test)]
    pub(crate) fn tool(&self) -> &T {
        &self.tool
    }

    /// Annotate `sample` with `path_annotation_vcf`, writing to
    /// `<output_dir>/<sample_id>_annotated.vcf`.
    ///
    /// An existing output file is kept unless `force_overwrite` is set.  In both cases the
    /// output path is recorded in `sample`.
    pub fn annotate(
        &self,
        sample: &mut SampleVariants,
        path_annotation_vcf: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<(), anyhow::Error> {
        let path_output_vcf =
            output_dir.join(format!("{}{}", &sample.sample_id, ANNOTATED_VCF_SUFFIX));

        if path_output_vcf.exists() && !force_overwrite {
            tracing::info!(
                "Skipping annotation of {}. File {} already exists.",
                &sample.sample_id,
                path_output_vcf.display()
            );
        } else {
            tracing::info!(
                "Annotating {} with {}",
                &sample.sample_id,
                path_annotation_vcf.display()
            );
            self.tool
                .annotate(path_annotation_vcf, &sample.path_vcf, &path_output_vcf)
                .with_context(|| format!("annotation of sample {} failed", &sample.sample_id))?;
        }

        sample.path_annotated_vcf = Some(path_output_vcf);
        Ok(())
    }
}
