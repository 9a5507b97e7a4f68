//! `raw/…/x.json` → `processed/…/x.parquet` key mapping.

use crate::error::TransformError;

pub const RAW_SEGMENT: &str = "raw/";
pub const PROCESSED_SEGMENT: &str = "processed/";
pub const RAW_SUFFIX: &str = ".json";
pub const PROCESSED_SUFFIX: &str = ".parquet";

/// Derive the Parquet key for a raw JSON key.
///
/// Replaces the first `raw/` with `processed/` and the trailing `.json`
/// with `.parquet`. Keys that do not end in `.json` are rejected, since the
/// output would otherwise overwrite the input.
pub fn derive_output_key(raw_key: &str) -> Result<String, TransformError> {
    let stem = raw_key.strip_suffix(RAW_SUFFIX).ok_or_else(|| {
        TransformError::malformed("key", format!("'{raw_key}' does not end in {RAW_SUFFIX}"))
    })?;
    Ok(format!(
        "{}{}",
        stem.replacen(RAW_SEGMENT, PROCESSED_SEGMENT, 1),
        PROCESSED_SUFFIX
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_partitioned_key() {
        assert_eq!(
            derive_output_key("raw/date=2024-03-15/transactions_123.json").unwrap(),
            "processed/date=2024-03-15/transactions_123.parquet"
        );
    }

    #[test]
    fn only_first_raw_segment_changes() {
        assert_eq!(
            derive_output_key("raw/date=2024-03-15/raw/t.json").unwrap(),
            "processed/date=2024-03-15/raw/t.parquet"
        );
    }

    #[test]
    fn only_trailing_json_changes() {
        assert_eq!(
            derive_output_key("raw/date=2024-03-15/a.json.bak.json").unwrap(),
            "processed/date=2024-03-15/a.json.bak.parquet"
        );
    }

    #[test]
    fn nested_prefix_is_kept() {
        assert_eq!(
            derive_output_key("landing/raw/date=2024-03-15/t.json").unwrap(),
            "landing/processed/date=2024-03-15/t.parquet"
        );
    }

    #[test]
    fn key_without_raw_segment_only_changes_suffix() {
        assert_eq!(derive_output_key("adhoc/t.json").unwrap(), "adhoc/t.parquet");
    }

    #[test]
    fn non_json_key_is_rejected() {
        let err = derive_output_key("raw/date=2024-03-15/t.csv").unwrap_err();
        assert_eq!(err.field(), Some("key"));
        assert!(derive_output_key("raw/date=2024-03-15/t.JSON").is_err());
    }
}
