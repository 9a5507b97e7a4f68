use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;

use ecom_core::config::GeneratorConfig;
use ecom_core::RawTransaction;
use ecom_storage::{ObjectRef, StorageAccessor, CONTENT_TYPE_JSON};

use crate::error::GeneratorError;

/// Key a raw record is written under:
/// `raw/date=YYYY-MM-DD/transactions_<epoch seconds>.<micros>.json`.
pub fn raw_key(now: NaiveDateTime) -> String {
    let utc = now.and_utc();
    format!(
        "raw/date={}/transactions_{}.{:06}.json",
        now.format("%Y-%m-%d"),
        utc.timestamp(),
        utc.timestamp_subsec_micros()
    )
}

/// Fabricates random purchases.
pub struct TransactionGenerator {
    categories: Vec<String>,
    rng: StdRng,
}

impl TransactionGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible sequence for tests and fixtures.
    pub fn with_seed(config: &GeneratorConfig, seed: u64) -> Result<Self, GeneratorError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GeneratorConfig, rng: StdRng) -> Result<Self, GeneratorError> {
        if config.categories.is_empty() {
            return Err(GeneratorError::NoCategories);
        }
        Ok(Self {
            categories: config.categories.clone(),
            rng,
        })
    }

    /// One random transaction stamped with `now`. `total_amount` is left
    /// for the transformer to derive.
    pub fn generate(&mut self, now: NaiveDateTime) -> RawTransaction {
        let rng = &mut self.rng;
        let category = self
            .categories
            .choose(rng)
            .cloned()
            .unwrap_or_default();

        RawTransaction {
            transaction_id: format!("TXN{}", rng.gen_range(10_000..=99_999)),
            timestamp: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            customer_id: format!("CUST{}", rng.gen_range(1_000..=9_999)),
            product_id: format!("PROD{}", rng.gen_range(100..=999)),
            quantity: rng.gen_range(1..=5),
            // 10.00 ..= 500.00 in whole cents
            price: Decimal::new(rng.gen_range(1_000..=50_000), 2),
            category,
            total_amount: None,
        }
    }

    /// Generate a transaction and store it as JSON under [`raw_key`].
    pub async fn emit(
        &mut self,
        storage: &dyn StorageAccessor,
        now: NaiveDateTime,
    ) -> Result<ObjectRef, GeneratorError> {
        let txn = self.generate(now);
        let key = ObjectRef::new(raw_key(now));
        storage
            .store(&key, txn.to_json()?.into(), CONTENT_TYPE_JSON)
            .await?;

        info!(
            key = %key,
            transaction_id = %txn.transaction_id,
            category = %txn.category,
            "generated transaction"
        );
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ecom_storage::{ObjectStoreAccessor, StorageBackend};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_micro_opt(14, 30, 0, 42)
            .unwrap()
    }

    #[test]
    fn raw_key_is_date_partitioned() {
        assert_eq!(
            raw_key(at()),
            "raw/date=2024-03-15/transactions_1710513000.000042.json"
        );
    }

    #[test]
    fn fields_stay_in_range() {
        let mut generator = TransactionGenerator::with_seed(&GeneratorConfig::default(), 7).unwrap();
        for _ in 0..200 {
            let txn = generator.generate(at());
            assert!(txn.transaction_id.starts_with("TXN") && txn.transaction_id.len() == 8);
            assert!(txn.customer_id.starts_with("CUST") && txn.customer_id.len() == 8);
            assert!(txn.product_id.starts_with("PROD") && txn.product_id.len() == 7);
            assert!((1..=5).contains(&txn.quantity));
            assert!(txn.price >= Decimal::new(1000, 2) && txn.price <= Decimal::new(50_000, 2));
            assert!(txn.price.scale() <= 2);
            assert!(["Electronics", "Clothing", "Books"].contains(&txn.category.as_str()));
            assert_eq!(txn.timestamp, "2024-03-15T14:30:00.000042");
            assert!(txn.total_amount.is_none());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let config = GeneratorConfig::default();
        let mut a = TransactionGenerator::with_seed(&config, 42).unwrap();
        let mut b = TransactionGenerator::with_seed(&config, 42).unwrap();
        for _ in 0..10 {
            assert_eq!(a.generate(at()), b.generate(at()));
        }
    }

    #[test]
    fn empty_categories_are_rejected() {
        let config = GeneratorConfig { categories: vec![] };
        assert!(matches!(
            TransactionGenerator::new(&config),
            Err(GeneratorError::NoCategories)
        ));
    }

    #[tokio::test]
    async fn emit_writes_decodable_json() {
        let accessor = ObjectStoreAccessor::new(&StorageBackend::memory());
        let mut generator = TransactionGenerator::with_seed(&GeneratorConfig::default(), 1).unwrap();

        let key = generator.emit(&accessor, at()).await.unwrap();
        assert_eq!(key.key(), raw_key(at()));

        let body = accessor.fetch(&key).await.unwrap();
        let decoded = RawTransaction::from_json(&body).unwrap();
        assert!((1..=5).contains(&decoded.quantity));
    }
}
