//! Download sample VCFs and ClinVar, annotate each sample, and merge all records into one CSV.

use std::path::{Path, PathBuf};

use clap::Parser;
use indexmap::IndexSet;
use thousands::Separable;

use crate::annotate::records::extract_records;
use crate::annotate::{AnnotationTool, Annotator, SampleVariants, SnpSift, VariantRecord};
use crate::config::{Config, VariantSet, SNPEFF_PATH_ENV};
use crate::download::{Downloader, Fetch, HttpFetcher};

/// Sub directories created below the output directory.
pub mod sub_dirs {
    /// Downloaded sample VCF files.
    pub const VARIANTS_VCF: &str = "raw_vcf_files";
    /// Downloaded ClinVar VCF files.
    pub const CLINVAR_ANNOTATIONS: &str = "clinvar_annotations";
    /// Sample VCF files annotated with ClinVar.
    pub const CLINVAR_ANNOTATED_FILES: &str = "clinvar_annotated_files";

    pub const ALL: &[&str] = &[VARIANTS_VCF, CLINVAR_ANNOTATIONS, CLINVAR_ANNOTATED_FILES];
}

/// Name of the merged output table.
pub const OUTPUT_CSV: &str = "all_variants.csv";

/// Command line arguments of the download and annotation pipeline.
#[derive(Parser, Debug, Clone)]
#[command(
    about = "Download variant files and annotate them with ClinVar annotations",
    long_about = None
)]
pub struct Args {
    /// Path to the output directory.
    pub path_output: PathBuf,

    /// Space-separated samples to annotate. Options: JAS_N36, JAS_P18, M46, M48
    #[arg(short, long, required = true, num_args = 1..)]
    pub samples: Vec<String>,

    /// Genome to annotate.
    #[arg(short, long, default_value = "GRCh38", value_parser = ["GRCh38"])]
    pub genome: String,

    /// The published call set to download for each sample.
    #[arg(long, value_enum, default_value_t = VariantSet::Snp)]
    pub variant_set: VariantSet,

    /// Download and annotate again even if the files exist already.
    #[arg(long, alias = "force_overwrite_download_files")]
    pub force_overwrite_download_files: bool,

    /// Path prefix of `SnpSift.jar`.
    #[arg(long, env = SNPEFF_PATH_ENV)]
    pub snpeff_path: Option<String>,
}

/// Create the output sub directories, existing ones are fine.
pub fn create_sub_dirs(path_output: &Path) -> Result<(), anyhow::Error> {
    for dir_name in sub_dirs::ALL {
        let path = path_output.join(dir_name);
        std::fs::create_dir_all(&path)
            .map_err(|e| anyhow::anyhow!("could not create {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Write `records` as CSV, the columns are the union of all keys in order of appearance.
pub fn write_csv(records: &[VariantRecord], path: &Path) -> Result<(), anyhow::Error> {
    let columns = records
        .iter()
        .flat_map(VariantRecord::keys)
        .collect::<IndexSet<_>>();

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| anyhow::anyhow!("could not open {} for writing: {}", path.display(), e))?;
    if !columns.is_empty() {
        writer.write_record(&columns)?;
        for record in records {
            writer.write_record(
                columns
                    .iter()
                    .map(|column| record.get(column).unwrap_or_default()),
            )?;
        }
    }
    writer.flush()?;

    Ok(())
}

/// Run the pipeline with the given downloader and annotator.
///
/// Returns the path of the written CSV file.
pub fn run_with<F, T>(
    downloader: &Downloader<F>,
    annotator: &Annotator<T>,
    args: &Args,
) -> Result<PathBuf, anyhow::Error>
where
    F: Fetch,
    T: AnnotationTool,
{
    tracing::info!("Creating output paths for downloaded variant files");
    create_sub_dirs(&args.path_output)?;

    tracing::info!("Downloading sample variant files.");
    let mut samples = Vec::new();
    for sample in &args.samples {
        let path_vcf = args
            .path_output
            .join(sub_dirs::VARIANTS_VCF)
            .join(format!("{}.vcf", sample));
        downloader.download_variants(
            sample,
            &path_vcf,
            false,
            args.force_overwrite_download_files,
        )?;
        samples.push(SampleVariants::new(sample, path_vcf));
    }

    tracing::info!("Downloading ClinVar annotations.");
    let path_clinvar = args
        .path_output
        .join(sub_dirs::CLINVAR_ANNOTATIONS)
        .join(format!("{}_clinvar.vcf.gz", &args.genome));
    downloader.download_clinvar(
        &args.genome,
        &path_clinvar,
        args.force_overwrite_download_files,
    )?;

    tracing::info!("Annotating sample vcf's with ClinVar annotations.");
    let path_annotated = args.path_output.join(sub_dirs::CLINVAR_ANNOTATED_FILES);
    let mut all_records = Vec::new();
    for sample in samples.iter_mut() {
        annotator.annotate(
            sample,
            &path_clinvar,
            &path_annotated,
            args.force_overwrite_download_files,
        )?;
        extract_records(sample)?;
        all_records.append(&mut sample.records);
    }

    tracing::info!("Writing out merged variant records to file.");
    let path_csv = args.path_output.join(OUTPUT_CSV);
    write_csv(&all_records, &path_csv)?;
    tracing::info!(
        "Output file at: {} ({} records)",
        path_csv.display(),
        all_records.len().separate_with_commas()
    );

    Ok(path_csv)
}

/// Main entry point for the pipeline.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!(
        "Downloading and annotating variants\ncommon args: {:#?}\nargs: {:#?}",
        common,
        args
    );

    if args.snpeff_path.is_none() {
        tracing::warn!(
            "{} is not set, expecting SnpSift.jar in the working directory",
            SNPEFF_PATH_ENV
        );
    }
    let config = Config::with_snpeff_path(args.snpeff_path.as_deref());
    let annotator = Annotator::new(SnpSift::new(config.annotation_tool.clone()));
    let downloader =
        Downloader::new(config, HttpFetcher::new()?).with_variant_set(args.variant_set);

    run_with(&downloader, &annotator, args)?;

    Ok(())
}
