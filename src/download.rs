//! Download of sample variant files and ClinVar annotation files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use crate::common::GenomeRelease;
use crate::config::{Config, VariantSet};
use crate::error::Error;

/// Suffix of the tabix index next to a compressed VCF file.
pub const INDEX_SUFFIX: &str = ".tbi";

/// Fetching of a remote resource into a local file.
pub trait Fetch {
    /// Fetch `url` and write the body to `path_out`.
    fn fetch(&self, url: &str, path_out: &Path) -> Result<(), anyhow::Error>;
}

/// Blocking HTTP(S) fetcher that shows a progress bar while streaming to disk.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, anyhow::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| anyhow::anyhow!("could not build HTTP client: {}", e))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, path_out: &Path) -> Result<(), anyhow::Error> {
        tracing::debug!("GET {} -> {}", url, path_out.display());
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("could not download {}", url))?;

        let bar = match response.content_length() {
            Some(len) => ProgressBar::new(len).with_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {bytes:>10}/{total_bytes:10} {bytes_per_sec}",
                )?
                .progress_chars("##-"),
            ),
            None => ProgressBar::new_spinner().with_style(ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bytes} {bytes_per_sec}",
            )?),
        };

        let mut writer = BufWriter::new(
            File::create(path_out)
                .with_context(|| format!("could not create {}", path_out.display()))?,
        );
        std::io::copy(&mut bar.wrap_read(response), &mut writer)
            .with_context(|| format!("could not write {} to {}", url, path_out.display()))?;
        writer
            .flush()
            .with_context(|| format!("could not flush {}", path_out.display()))?;
        bar.finish_and_clear();

        Ok(())
    }
}

/// Appends `suffix` to the file name of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut path = path.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Resolves sample and genome identifiers to URLs and downloads them.
pub struct Downloader<F> {
    config: Config,
    variant_set: VariantSet,
    fetcher: F,
}

impl<F> Downloader<F>
where
    F: Fetch,
{
    /// Construct a new downloader for the SNP call set.
    pub fn new(config: Config, fetcher: F) -> Self {
        Self {
            config,
            variant_set: VariantSet::default(),
            fetcher,
        }
    }

    /// Select the call set that sample identifiers are resolved in.
    pub fn with_variant_set(mut self, variant_set: VariantSet) -> Self {
        self.variant_set = variant_set;
        self
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Download `url` to `path_out` unless the file exists already.
    ///
    /// Pass `force_overwrite` to download in any case.
    pub fn download_file(
        &self,
        url: &str,
        path_out: &Path,
        force_overwrite: bool,
    ) -> Result<(), anyhow::Error> {
        if path_out.exists() && !force_overwrite {
            tracing::info!(
                "Skipping download. File {} already exists.",
                path_out.display()
            );
            return Ok(());
        }

        self.fetcher.fetch(url, path_out)?;
        tracing::info!("Completed download of {}", path_out.display());
        Ok(())
    }

    /// Download a VCF file and, if `get_index`, its `.tbi` index next to it.
    pub fn download_vcf_and_index(
        &self,
        url: &str,
        path_out: &Path,
        get_index: bool,
        force_overwrite: bool,
    ) -> Result<(), anyhow::Error> {
        self.download_file(url, path_out, force_overwrite)?;
        if get_index {
            tracing::info!("Downloading vcf index file");
            self.download_file(
                &format!("{}{}", url, INDEX_SUFFIX),
                &with_suffix(path_out, INDEX_SUFFIX),
                force_overwrite,
            )?;
        }
        Ok(())
    }

    /// Download the variant calls of a known sample.
    pub fn download_variants(
        &self,
        sample: &str,
        path_out: &Path,
        get_index: bool,
        force_overwrite: bool,
    ) -> Result<(), anyhow::Error> {
        let urls = self.config.sample_urls(self.variant_set);
        let url = urls.get(sample).ok_or_else(|| Error::UnknownSample {
            sample: sample.to_string(),
            valid: urls.keys().cloned().collect(),
            dataset_url: self.config.dataset_url.clone(),
        })?;

        tracing::info!(
            "Downloading vcf for sample {} ({} calls)",
            sample,
            self.variant_set
        );
        self.download_vcf_and_index(url, path_out, get_index, force_overwrite)
    }

    /// Download the ClinVar VCF and its index for the given genome build.
    pub fn download_clinvar(
        &self,
        genome: &str,
        path_out: &Path,
        force_overwrite: bool,
    ) -> Result<(), anyhow::Error> {
        let unsupported = || Error::UnsupportedGenome {
            genome: genome.to_string(),
            allowed: self
                .config
                .clinvar_genomes
                .iter()
                .map(GenomeRelease::name)
                .collect(),
        };
        let release = GenomeRelease::from_str(genome).map_err(|_| unsupported())?;
        if !self.config.clinvar_genomes.contains(&release) {
            return Err(unsupported().into());
        }

        tracing::info!("Downloading clinvar vcf for {}", release);
        self.download_vcf_and_index(
            &self.config.clinvar_url(release),
            path_out,
            true,
            force_overwrite,
        )
    }
}
