//! SQL templates for the transaction reports.
//!
//! Only identifiers and the row limit are substituted, and both are checked
//! before rendering, so no caller-supplied text reaches the query verbatim.

use serde::{Deserialize, Serialize};

use crate::error::AthenaError;
use crate::result::AthenaQueryResult;

pub const DEFAULT_TOP_CUSTOMERS: u32 = 10;
pub const MAX_LIMIT: u32 = 1000;

/// Fully qualified table the processed transactions are registered as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTarget {
    pub database: String,
    pub table: String,
}

impl ReportTarget {
    pub fn new(database: &str, table: &str) -> Self {
        Self {
            database: database.to_string(),
            table: table.to_string(),
        }
    }

    fn qualified(&self) -> Result<String, AthenaError> {
        Ok(format!("{}.{}", identifier(&self.database)?, identifier(&self.table)?))
    }
}

fn identifier(name: &str) -> Result<&str, AthenaError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(AthenaError::InvalidIdentifier(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "report")]
pub enum Report {
    /// Order count and average order value per category.
    SalesByCategory,
    /// Customers ranked by lifetime spend.
    TopCustomers { limit: u32 },
}

impl Report {
    pub fn name(&self) -> &'static str {
        match self {
            Report::SalesByCategory => "sales-by-category",
            Report::TopCustomers { .. } => "top-customers",
        }
    }

    pub fn render(&self, target: &ReportTarget) -> Result<String, AthenaError> {
        let table = target.qualified()?;
        let sql = match *self {
            Report::SalesByCategory => format!(
                "SELECT\n    \
                 category,\n    \
                 COUNT(*) AS total_sales,\n    \
                 AVG(total_amount) AS avg_order_value\n\
                 FROM {table}\n\
                 GROUP BY category\n\
                 ORDER BY total_sales DESC"
            ),
            Report::TopCustomers { limit } => {
                if !(1..=MAX_LIMIT).contains(&limit) {
                    return Err(AthenaError::InvalidLimit(limit));
                }
                format!(
                    "SELECT\n    \
                     customer_id,\n    \
                     COUNT(*) AS order_count,\n    \
                     SUM(total_amount) AS lifetime_value\n\
                     FROM {table}\n\
                     GROUP BY customer_id\n\
                     ORDER BY lifetime_value DESC\n\
                     LIMIT {limit}"
                )
            }
        };
        Ok(sql)
    }
}

/// One row of [`Report::SalesByCategory`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: u64,
    pub avg_order_value: f64,
}

impl CategorySales {
    pub fn from_result(result: &AthenaQueryResult) -> Result<Vec<Self>, AthenaError> {
        (0..result.row_count())
            .map(|row| {
                Ok(Self {
                    category: result.parse_value(row, "category")?,
                    total_sales: result.parse_value(row, "total_sales")?,
                    avg_order_value: result.parse_value(row, "avg_order_value")?,
                })
            })
            .collect()
    }
}

/// One row of [`Report::TopCustomers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerValue {
    pub customer_id: String,
    pub order_count: u64,
    pub lifetime_value: f64,
}

impl CustomerValue {
    pub fn from_result(result: &AthenaQueryResult) -> Result<Vec<Self>, AthenaError> {
        (0..result.row_count())
            .map(|row| {
                Ok(Self {
                    customer_id: result.parse_value(row, "customer_id")?,
                    order_count: result.parse_value(row, "order_count")?,
                    lifetime_value: result.parse_value(row, "lifetime_value")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{AthenaColumn, QueryMetadata};

    fn target() -> ReportTarget {
        ReportTarget::new("ecommerce_db", "transactions")
    }

    fn result(columns: &[&str], rows: &[&[Option<&str>]]) -> AthenaQueryResult {
        AthenaQueryResult {
            columns: columns
                .iter()
                .map(|c| AthenaColumn { name: c.to_string(), data_type: "varchar".into() })
                .collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.map(str::to_string)).collect())
                .collect(),
            metadata: QueryMetadata {
                query_id: "q".into(),
                bytes_scanned: 0,
                execution_time_ms: 0,
                state: "SUCCEEDED".into(),
                output_location: None,
            },
        }
    }

    #[test]
    fn sales_by_category_sql() {
        let sql = Report::SalesByCategory.render(&target()).unwrap();
        assert_eq!(
            sql,
            "SELECT\n    category,\n    COUNT(*) AS total_sales,\n    \
             AVG(total_amount) AS avg_order_value\n\
             FROM ecommerce_db.transactions\n\
             GROUP BY category\n\
             ORDER BY total_sales DESC"
        );
    }

    #[test]
    fn top_customers_sql() {
        let sql = Report::TopCustomers { limit: 10 }.render(&target()).unwrap();
        assert!(sql.contains("SUM(total_amount) AS lifetime_value"));
        assert!(sql.contains("FROM ecommerce_db.transactions\n"));
        assert!(sql.contains("GROUP BY customer_id"));
        assert!(sql.ends_with("ORDER BY lifetime_value DESC\nLIMIT 10"));
    }

    #[test]
    fn limit_bounds() {
        for bad in [0, MAX_LIMIT + 1] {
            let err = Report::TopCustomers { limit: bad }.render(&target()).unwrap_err();
            assert!(matches!(err, AthenaError::InvalidLimit(l) if l == bad));
        }
        assert!(Report::TopCustomers { limit: 1 }.render(&target()).is_ok());
        assert!(Report::TopCustomers { limit: MAX_LIMIT }.render(&target()).is_ok());
    }

    #[test]
    fn identifiers_are_checked() {
        for (db, table) in [
            ("", "transactions"),
            ("ecommerce_db", ""),
            ("ecommerce-db", "transactions"),
            ("ecommerce_db", "transactions; DROP TABLE x"),
            ("ecommerce_db", "t.x"),
        ] {
            let err = Report::SalesByCategory
                .render(&ReportTarget::new(db, table))
                .unwrap_err();
            assert!(matches!(err, AthenaError::InvalidIdentifier(_)), "{db}.{table}");
        }
        assert!(Report::SalesByCategory
            .render(&ReportTarget::new("Analytics2", "txn_v2"))
            .is_ok());
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(Report::SalesByCategory.name(), "sales-by-category");
        assert_eq!(Report::TopCustomers { limit: 3 }.name(), "top-customers");
    }

    #[test]
    fn category_rows_parse() {
        let r = result(
            &["category", "total_sales", "avg_order_value"],
            &[
                &[Some("Electronics"), Some("42"), Some("612.5")],
                &[Some("Books"), Some("7"), Some("88.0")],
            ],
        );
        let rows = CategorySales::from_result(&r).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            CategorySales { category: "Electronics".into(), total_sales: 42, avg_order_value: 612.5 }
        );
    }

    #[test]
    fn customer_rows_need_every_column() {
        let r = result(&["customer_id", "order_count"], &[&[Some("CUST1001"), Some("3")]]);
        assert!(matches!(
            CustomerValue::from_result(&r),
            Err(AthenaError::ParseError(_))
        ));

        let r = result(
            &["customer_id", "order_count", "lifetime_value"],
            &[&[Some("CUST1001"), Some("3"), None]],
        );
        assert!(CustomerValue::from_result(&r).is_err());

        let r = result(
            &["customer_id", "order_count", "lifetime_value"],
            &[&[Some("CUST1001"), Some("3"), Some("1499.97")]],
        );
        assert_eq!(CustomerValue::from_result(&r).unwrap()[0].lifetime_value, 1499.97);
    }
}
