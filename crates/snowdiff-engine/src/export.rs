//! CSV serialization of bucket datasets
//!
//! One UTF-8 payload per bucket: header row first, then the bucket's
//! rows, no index column. This is the literal download artifact.

use crate::classify::BucketSet;
use crate::engine::EngineError;

/// Serialize one bucket to CSV bytes
pub fn bucket_to_csv(set: &BucketSet) -> Result<Vec<u8>, EngineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&set.columns)
        .map_err(|e| EngineError::Csv(e.to_string()))?;
    for row in &set.rows {
        writer
            .write_record(row)
            .map_err(|e| EngineError::Csv(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| EngineError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowdiff_core::DiffBucket;

    fn sample_set() -> BucketSet {
        BucketSet {
            bucket: DiffBucket::ValueMismatch,
            columns: vec![
                "is_exclusive_a".to_string(),
                "is_exclusive_b".to_string(),
                "amount_a".to_string(),
                "amount_b".to_string(),
            ],
            rows: vec![
                vec![
                    "false".to_string(),
                    "false".to_string(),
                    "10.00".to_string(),
                    "12.50".to_string(),
                ],
                vec![
                    "false".to_string(),
                    "false".to_string(),
                    "7,5".to_string(),
                    "".to_string(),
                ],
            ],
        }
    }

    #[test]
    fn header_then_rows() {
        let bytes = bucket_to_csv(&sample_set()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "is_exclusive_a,is_exclusive_b,amount_a,amount_b"
        );
        assert_eq!(lines.next().unwrap(), "false,false,10.00,12.50");
        // Embedded comma is quoted
        assert_eq!(lines.next().unwrap(), "false,false,\"7,5\",");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn round_trip_preserves_rows_and_values() {
        let set = sample_set();
        let bytes = bucket_to_csv(&set).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(header, set.columns);

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows, set.rows);
    }

    #[test]
    fn empty_bucket_is_just_a_header() {
        let set = BucketSet {
            bucket: DiffBucket::MissingInSource,
            columns: vec!["is_exclusive_a".to_string(), "is_exclusive_b".to_string()],
            rows: vec![],
        };

        let bytes = bucket_to_csv(&set).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.trim_end(), "is_exclusive_a,is_exclusive_b");
    }
}
