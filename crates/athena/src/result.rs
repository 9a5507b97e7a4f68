use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AthenaError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaColumn {
    pub name: String,
    /// Athena type name, e.g. `varchar`, `bigint`, `decimal(38,2)`.
    pub data_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub query_id: String,
    pub bytes_scanned: u64,
    pub execution_time_ms: u64,
    /// Terminal state as Athena spells it, e.g. `SUCCEEDED`.
    pub state: String,
    pub output_location: Option<String>,
}

/// Rows of a finished query. Cells are `None` for SQL NULL and appear in
/// `columns` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaQueryResult {
    pub columns: Vec<AthenaColumn>,
    pub rows: Vec<Vec<Option<String>>>,
    pub metadata: QueryMetadata,
}

/// $5 per TiB scanned.
const DOLLARS_PER_BYTE: f64 = 5.0 / 1_099_511_627_776.0;

impl AthenaQueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Index of `name`, or a parse error naming the missing column.
    pub fn require_column(&self, name: &str) -> Result<usize, AthenaError> {
        self.column_index(name)
            .ok_or_else(|| AthenaError::ParseError(format!("result has no column '{name}'")))
    }

    /// Cell text; `None` for NULL, unknown columns, or rows out of range.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&str> {
        let idx = self.column_index(col)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Parse a non-NULL cell.
    pub fn parse_value<T: FromStr>(&self, row: usize, col: &str) -> Result<T, AthenaError> {
        self.require_column(col)?;
        let raw = self.get_value(row, col).ok_or_else(|| {
            AthenaError::ParseError(format!("row {row}: '{col}' is NULL"))
        })?;
        raw.parse()
            .map_err(|_| AthenaError::ParseError(format!("row {row}: '{col}' = '{raw}'")))
    }

    pub fn cost_estimate_usd(&self) -> f64 {
        self.metadata.bytes_scanned as f64 * DOLLARS_PER_BYTE
    }
}

impl fmt::Display for AthenaQueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "(empty result set)");
        }

        let cell = |v: &Option<String>| v.as_deref().unwrap_or("NULL").len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i).map(cell))
                    .fold(c.name.len(), usize::max)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<w$}", c.name))
            .collect();
        writeln!(f, "{}", header.join(" | "))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(v, &w)| format!("{:<w$}", v.as_deref().unwrap_or("NULL")))
                .collect();
            writeln!(f, "{}", line.join(" | "))?;
        }

        write!(
            f,
            "\n{} rows | query {} | {:.3} MB scanned | {}ms | ${:.6}",
            self.rows.len(),
            self.metadata.query_id,
            self.metadata.bytes_scanned as f64 / (1024.0 * 1024.0),
            self.metadata.execution_time_ms,
            self.cost_estimate_usd(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(bytes_scanned: u64) -> QueryMetadata {
        QueryMetadata {
            query_id: "q-42".into(),
            bytes_scanned,
            execution_time_ms: 1800,
            state: "SUCCEEDED".into(),
            output_location: None,
        }
    }

    fn sales() -> AthenaQueryResult {
        AthenaQueryResult {
            columns: vec![
                AthenaColumn { name: "category".into(), data_type: "varchar".into() },
                AthenaColumn { name: "total_sales".into(), data_type: "decimal(38,2)".into() },
            ],
            rows: vec![
                vec![Some("Electronics".into()), Some("1520.40".into())],
                vec![Some("Books".into()), None],
            ],
            metadata: metadata(1 << 30),
        }
    }

    #[test]
    fn lookups_by_name() {
        let r = sales();
        assert_eq!(r.row_count(), 2);
        assert_eq!(r.column_index("total_sales"), Some(1));
        assert_eq!(r.get_value(0, "category"), Some("Electronics"));
        assert_eq!(r.get_value(1, "total_sales"), None);
        assert_eq!(r.get_value(5, "category"), None);
        assert!(r.require_column("avg_order_value").is_err());
    }

    #[test]
    fn parse_value_reports_nulls_and_garbage() {
        let r = sales();
        assert_eq!(r.parse_value::<f64>(0, "total_sales").unwrap(), 1520.40);

        let err = r.parse_value::<f64>(1, "total_sales").unwrap_err();
        assert!(err.to_string().contains("NULL"));

        let err = r.parse_value::<u64>(0, "category").unwrap_err();
        assert!(err.to_string().contains("Electronics"));
    }

    #[test]
    fn cost_is_five_dollars_per_tib() {
        let cost = sales().cost_estimate_usd();
        assert!((cost - 5.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn renders_as_table() {
        let text = sales().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "category    | total_sales");
        assert_eq!(lines[1], "------------+------------");
        assert_eq!(lines[2], "Electronics | 1520.40    ");
        assert_eq!(lines[3], "Books       | NULL       ");
        assert!(lines.last().unwrap().starts_with("2 rows | query q-42"));

        let empty = AthenaQueryResult { columns: vec![], rows: vec![], metadata: metadata(0) };
        assert_eq!(empty.to_string(), "(empty result set)");
    }
}
