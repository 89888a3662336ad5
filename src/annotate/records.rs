//! Flattening of annotated VCF records into string maps for tabular export.

use anyhow::Context;
use indexmap::IndexMap;
use noodles::vcf::variant::record_buf::info::field::{value::Array, Value};
use noodles::vcf::variant::RecordBuf;
use thousands::Separable;

use super::SampleVariants;
use crate::common::noodles::open_vcf_reader;
use crate::error::Error;

/// Column names of the flat records.
pub mod keys {
    pub const SAMPLE: &str = "sample";
    pub const CHROM: &str = "chrom";
    pub const POS: &str = "pos";
    pub const STOP: &str = "stop";
    pub const REF: &str = "ref";
    pub const ALTS: &str = "alts";
    pub const QUAL: &str = "qual";
    pub const FILTER: &str = "filter";
    pub const CLINICAL_SIGNIFICANCE: &str = "clinical_significance";
    pub const CLINICAL_VARIANT: &str = "clinical_variant";
    pub const ALLELE_FREQ_IN_EXAC: &str = "allele_freq_in_EXAC";
}

/// Optional INFO fields and the column each one is copied to, in column order.
const INFO_COLUMNS: &[(&str, &str)] = &[
    ("CLNSIG", keys::CLINICAL_SIGNIFICANCE),
    ("CLNVC", keys::CLINICAL_VARIANT),
    ("AF_EXAC", keys::ALLELE_FREQ_IN_EXAC),
];

/// Separator for ALT alleles and FILTER values.
const LIST_SEPARATOR: &str = ", ";

/// One VCF record as an insertion-ordered map from column name to value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariantRecord(IndexMap<String, String>);

impl VariantRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Flatten `record` of the sample `sample_id`.
    ///
    /// `stop` is taken from INFO/END if the header declares it as an integer and the value is a
    /// valid position, otherwise it is derived from the reference allele.  The optional clinical
    /// columns are only set if the INFO field is present.
    pub fn from_record_buf(sample_id: &str, record: &RecordBuf) -> Self {
        let pos = record.variant_start().map(|pos| pos.get());
        let reference = record.reference_bases();
        let end = match record.info().get("END") {
            Some(Some(Value::Integer(end))) => usize::try_from(*end).ok().filter(|end| *end >= 1),
            _ => None,
        };
        let stop = end.or_else(|| pos.map(|pos| pos + reference.len().max(1) - 1));

        let mut result = Self::default();
        result.insert(keys::SAMPLE, sample_id);
        result.insert(keys::CHROM, record.reference_sequence_name());
        result.insert(keys::POS, pos.map(|p| p.to_string()).unwrap_or_default());
        result.insert(keys::STOP, stop.map(|s| s.to_string()).unwrap_or_default());
        result.insert(keys::REF, reference);
        result.insert(
            keys::ALTS,
            record.alternate_bases().as_ref().join(LIST_SEPARATOR),
        );
        result.insert(
            keys::QUAL,
            record
                .quality_score()
                .map(|qual| qual.to_string())
                .unwrap_or_default(),
        );
        result.insert(
            keys::FILTER,
            record
                .filters()
                .as_ref()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        );

        for (info_key, column) in INFO_COLUMNS {
            if let Some(value) = record.info().get(*info_key) {
                result.insert(column, value.map(info_value_to_string).unwrap_or_default());
            }
        }

        result
    }
}

fn join_values<T: ToString>(values: &[Option<T>]) -> String {
    values
        .iter()
        .map(|value| {
            value
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_else(|| String::from("."))
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn info_value_to_string(value: &Value) -> String {
    match value {
        Value::Integer(value) => value.to_string(),
        Value::Float(value) => value.to_string(),
        Value::Flag => String::from("true"),
        Value::Character(value) => value.to_string(),
        Value::String(value) => value.clone(),
        Value::Array(Array::Integer(values)) => join_values(values),
        Value::Array(Array::Float(values)) => join_values(values),
        Value::Array(Array::Character(values)) => join_values(values),
        Value::Array(Array::String(values)) => join_values(values),
    }
}

/// Read the annotated VCF of `sample` into `sample.records`, in file order.
///
/// Previously extracted records are replaced, so extracting twice does not duplicate them.
pub fn extract_records(sample: &mut SampleVariants) -> Result<(), anyhow::Error> {
    let path = sample
        .path_annotated_vcf
        .clone()
        .ok_or_else(|| Error::NotAnnotated {
            sample: sample.sample_id.clone(),
        })?;

    tracing::info!(
        "Extracting records of {} from {}",
        &sample.sample_id,
        path.display()
    );
    let mut reader = open_vcf_reader(&path)?;
    let header = reader
        .read_header()
        .with_context(|| format!("could not read VCF header of {}", path.display()))?;

    let mut records = Vec::new();
    for result in reader.record_bufs(&header) {
        let record =
            result.with_context(|| format!("could not read VCF record of {}", path.display()))?;
        records.push(VariantRecord::from_record_buf(&sample.sample_id, &record));
    }

    tracing::info!(
        "... extracted {} records of {}",
        records.len().separate_with_commas(),
        &sample.sample_id
    );
    sample.records = records;

    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::{keys, VariantRecord};
    use crate::annotate::SampleVariants;
    use crate::error::Error;

    fn annotated(sample_id: &str, path: &str) -> SampleVariants {
        let mut sample = SampleVariants::new(sample_id, "unused.vcf");
        sample.path_annotated_vcf = Some(PathBuf::from(path));
        sample
    }

    fn record(fields: &[(&str, &str)]) -> VariantRecord {
        let mut record = VariantRecord::default();
        for (key, value) in fields {
            record.insert(key, *value);
        }
        record
    }

    #[test]
    fn extract_records() -> Result<(), anyhow::Error> {
        let mut sample = annotated("M46", "tests/data/annotated/M46_annotated.vcf");

        super::extract_records(&mut sample)?;

        assert_eq!(
            sample.records,
            vec![
                record(&[
                    ("sample", "M46"),
                    ("chrom", "chr1"),
                    ("pos", "69511"),
                    ("stop", "69511"),
                    ("ref", "A"),
                    ("alts", "G"),
                    ("qual", "1500.5"),
                    ("filter", "PASS"),
                ]),
                record(&[
                    ("sample", "M46"),
                    ("chrom", "chr1"),
                    ("pos", "943995"),
                    ("stop", "943997"),
                    ("ref", "CTG"),
                    ("alts", "C, CT"),
                    ("qual", "50"),
                    ("filter", "LowQual, LowDP"),
                    ("clinical_significance", "Benign,Likely_benign"),
                    ("clinical_variant", "Deletion"),
                ]),
                record(&[
                    ("sample", "M46"),
                    ("chrom", "chr2"),
                    ("pos", "47403405"),
                    ("stop", "47403405"),
                    ("ref", "G"),
                    ("alts", "A"),
                    ("qual", ""),
                    ("filter", ""),
                    ("clinical_significance", "Pathogenic"),
                    ("clinical_variant", "single_nucleotide_variant"),
                    ("allele_freq_in_EXAC", "0.0001"),
                ]),
            ]
        );

        Ok(())
    }

    #[test]
    fn extract_records_preserves_file_order() -> Result<(), anyhow::Error> {
        let mut sample = annotated("JAS_N36", "tests/data/annotated/JAS_N36_annotated.vcf");

        super::extract_records(&mut sample)?;

        let positions = sample
            .records
            .iter()
            .map(|r| (r.get(keys::CHROM).unwrap(), r.get(keys::POS).unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![("chr1", "930000"), ("chr1", "12345"), ("chr17", "43045712")]
        );

        Ok(())
    }

    #[test]
    fn extract_records_optional_fields() -> Result<(), anyhow::Error> {
        let mut sample = annotated("M46", "tests/data/annotated/M46_annotated.vcf");

        super::extract_records(&mut sample)?;

        for record in &sample.records {
            assert_eq!(
                record.contains_key(keys::CLINICAL_SIGNIFICANCE),
                record.contains_key(keys::CLINICAL_VARIANT),
            );
        }
        assert_eq!(
            sample.records[0].keys().collect::<Vec<_>>(),
            vec!["sample", "chrom", "pos", "stop", "ref", "alts", "qual", "filter"]
        );
        assert!(sample.records[1].contains_key(keys::CLINICAL_SIGNIFICANCE));

        Ok(())
    }

    #[test]
    fn extract_records_gzip() -> Result<(), anyhow::Error> {
        let mut plain = annotated("M46", "tests/data/annotated/M46_annotated.vcf");
        let mut gzip = annotated("M46", "tests/data/annotated/M46_annotated.vcf.gz");

        super::extract_records(&mut plain)?;
        super::extract_records(&mut gzip)?;

        assert_eq!(gzip.records, plain.records);

        Ok(())
    }

    #[test]
    fn extract_records_twice_replaces() -> Result<(), anyhow::Error> {
        let mut sample = annotated("M46", "tests/data/annotated/M46_annotated.vcf");

        super::extract_records(&mut sample)?;
        let first = sample.records.clone();
        super::extract_records(&mut sample)?;

        assert_eq!(sample.records.len(), 3);
        assert_eq!(sample.records, first);

        Ok(())
    }

    #[rstest::rstest]
    #[case("tests/data/annotated/SV_annotated.vcf", vec![("100", "200"), ("500", "500")])]
    #[case("tests/data/annotated/SV_negative_end_annotated.vcf", vec![("300", "300")])]
    #[case("tests/data/annotated/SV_undeclared_end_annotated.vcf", vec![("100", "100")])]
    fn extract_records_stop(
        #[case] path: &str,
        #[case] expected: Vec<(&str, &str)>,
    ) -> Result<(), anyhow::Error> {
        let mut sample = annotated("SV", path);

        super::extract_records(&mut sample)?;

        let pos_stop = sample
            .records
            .iter()
            .map(|r| (r.get(keys::POS).unwrap(), r.get(keys::STOP).unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(pos_stop, expected);

        Ok(())
    }

    #[test]
    fn extract_records_not_annotated() {
        let mut sample = SampleVariants::new("M46", "tests/data/annotated/M46_annotated.vcf");

        let err = super::extract_records(&mut sample).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotAnnotated { sample }) if sample == "M46"
        ));
    }

    #[test]
    fn extract_records_unreadable() {
        let mut sample = annotated("M46", "tests/data/annotated/missing_annotated.vcf");

        assert!(super::extract_records(&mut sample).is_err());
        assert!(sample.records.is_empty());
    }
}
