//! Commonly used code.

use std::str::FromStr;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use strum::VariantArray;

use crate::error::Error;

pub mod io;
pub mod noodles;

/// Commonly used command line arguments.
#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Select the genome release to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, VariantArray)]
pub enum GenomeRelease {
    Grch37,
    #[default]
    Grch38,
}

impl GenomeRelease {
    pub fn name(&self) -> String {
        match self {
            GenomeRelease::Grch37 => String::from("GRCh37"),
            GenomeRelease::Grch38 => String::from("GRCh38"),
        }
    }

    /// Names of all known releases, e.g., for error messages.
    pub fn names() -> Vec<String> {
        Self::VARIANTS.iter().map(GenomeRelease::name).collect()
    }
}

impl std::fmt::Display for GenomeRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for GenomeRelease {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .iter()
            .find(|release| release.name() == s)
            .copied()
            .ok_or_else(|| Error::UnsupportedGenome {
                genome: s.to_string(),
                allowed: Self::names(),
            })
    }
}

/// The version of `variant-interpretation` package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
