//! Helper code for using noodles.

use std::io::BufRead;
use std::path::Path;

use noodles::vcf;

use super::io::std::open_read_maybe_gz;

/// Alias for the vcf reader type that we will use.
pub type VcfReader = vcf::io::Reader<Box<dyn BufRead>>;

/// Helper function that opens one VCF reader at the given path.
///
/// Plain text as well as gzip/bgzip compressed files are supported.
pub fn open_vcf_reader(path: impl AsRef<Path>) -> Result<VcfReader, anyhow::Error> {
    Ok(vcf::io::Reader::new(open_read_maybe_gz(path.as_ref()).map_err(
        |e| anyhow::anyhow!("could not build VCF reader for {:?}: {}", path.as_ref(), e),
    )?))
}
