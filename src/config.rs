//! Static download locations and the annotation tool command line.
//!
//! The shipped defaults describe the public whole exome data set on figshare and the NCBI ClinVar
//! FTP site.  Everything is carried by a [`Config`] value that is handed to the downloader and the
//! annotator.

use std::path::Path;

use indexmap::IndexMap;
use strum::VariantArray;

use crate::common::GenomeRelease;

/// Name of the environment variable holding the path prefix of `SnpSift.jar`.
pub const SNPEFF_PATH_ENV: &str = "SNPEFF_PATH";

/// Landing page of the exome data set, shown when a sample is unknown.
pub const DATASET_URL: &str =
    "https://figshare.com/articles/dataset/Whole_Exome_Data_VCF_files/13696750";

/// Template for the ClinVar VCF URL, `{genome}` is replaced by the genome release name.
pub const CLINVAR_VCF_URL_TEMPLATE: &str =
    "https://ftp.ncbi.nlm.nih.gov/pub/clinvar/vcf_{genome}/clinvar.vcf.gz";

/// Name of the SnpSift jar file below the `SNPEFF_PATH` prefix.
const SNPSIFT_JAR: &str = "SnpSift.jar";

/// SNP-only calls of the exome data set (hg38 aligned).
const SNP_VCF_URLS: &[(&str, &str)] = &[
    ("JAS_N36", "https://figshare.com/ndownloader/files/26347618"),
    ("JAS_P18", "https://figshare.com/ndownloader/files/26347624"),
    ("M46", "https://figshare.com/ndownloader/files/26347630"),
    ("M48", "https://figshare.com/ndownloader/files/26347645"),
];

/// SNP and indel calls of the exome data set (hg38 aligned).
const SNP_INDEL_VCF_URLS: &[(&str, &str)] = &[
    ("JAS_N36", "https://figshare.com/ndownloader/files/26347615"),
    ("JAS_P18", "https://figshare.com/ndownloader/files/26347621"),
    ("M46", "https://figshare.com/ndownloader/files/26347627"),
    ("M48", "https://figshare.com/ndownloader/files/26347633"),
];

/// Which of the published call sets to download for a sample.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum VariantSet {
    /// SNP calls only.
    #[default]
    Snp,
    /// SNP and small indel calls.
    SnpIndel,
}

/// Command line of the external annotation tool.
///
/// The tool is invoked as `program args... <annotation VCF> <input VCF>` and must write the
/// annotated VCF to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationToolConfig {
    /// The executable to run.
    pub program: String,
    /// Arguments placed before the two VCF paths.
    pub args: Vec<String>,
}

impl AnnotationToolConfig {
    /// `java -Xmx12g -jar <prefix>SnpSift.jar annotate`.
    ///
    /// `snpeff_path` is used as a plain prefix unless it names a directory, in which case the
    /// jar is looked up inside of it.
    pub fn snpsift(snpeff_path: &str) -> Self {
        let jar = if snpeff_path.is_empty() {
            SNPSIFT_JAR.to_string()
        } else if snpeff_path.ends_with(std::path::MAIN_SEPARATOR) || Path::new(snpeff_path).is_dir()
        {
            Path::new(snpeff_path)
                .join(SNPSIFT_JAR)
                .to_string_lossy()
                .into_owned()
        } else {
            format!("{}{}", snpeff_path, SNPSIFT_JAR)
        };

        Self {
            program: "java".to_string(),
            args: vec![
                "-Xmx12g".to_string(),
                "-jar".to_string(),
                jar,
                "annotate".to_string(),
            ],
        }
    }
}

impl Default for AnnotationToolConfig {
    fn default() -> Self {
        Self::snpsift("")
    }
}

/// Configuration of the downloader and annotator.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(pattern = "immutable", default)]
pub struct Config {
    /// Sample identifier to URL of the SNP call set.
    pub snp_vcf_urls: IndexMap<String, String>,
    /// Sample identifier to URL of the SNP and indel call set.
    pub snp_indel_vcf_urls: IndexMap<String, String>,
    /// Where users can look up the valid sample identifiers.
    #[builder(setter(into))]
    pub dataset_url: String,
    /// ClinVar VCF URL with a `{genome}` placeholder.
    #[builder(setter(into))]
    pub clinvar_url_template: String,
    /// Genome releases that ClinVar may be downloaded for.
    pub clinvar_genomes: Vec<GenomeRelease>,
    /// The external annotation command.
    pub annotation_tool: AnnotationToolConfig,
}

fn url_table(entries: &[(&str, &str)]) -> IndexMap<String, String> {
    entries
        .iter()
        .map(|(sample, url)| (sample.to_string(), url.to_string()))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snp_vcf_urls: url_table(SNP_VCF_URLS),
            snp_indel_vcf_urls: url_table(SNP_INDEL_VCF_URLS),
            dataset_url: DATASET_URL.to_string(),
            clinvar_url_template: CLINVAR_VCF_URL_TEMPLATE.to_string(),
            clinvar_genomes: GenomeRelease::VARIANTS.to_vec(),
            annotation_tool: AnnotationToolConfig::default(),
        }
    }
}

impl Config {
    /// Default configuration with the given SnpSift location, see [`AnnotationToolConfig::snpsift`].
    pub fn with_snpeff_path(snpeff_path: Option<&str>) -> Self {
        Self {
            annotation_tool: AnnotationToolConfig::snpsift(snpeff_path.unwrap_or_default()),
            ..Default::default()
        }
    }

    /// The sample URL table for the given variant set.
    pub fn sample_urls(&self, variant_set: VariantSet) -> &IndexMap<String, String> {
        match variant_set {
            VariantSet::Snp => &self.snp_vcf_urls,
            VariantSet::SnpIndel => &self.snp_indel_vcf_urls,
        }
    }

    /// The ClinVar VCF URL for the given genome release.
    pub fn clinvar_url(&self, genome: GenomeRelease) -> String {
        self.clinvar_url_template
            .replace("{genome}", &genome.name())
    }
}
