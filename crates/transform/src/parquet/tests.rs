//! Tests for Parquet encoding.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Decimal128Type, Int32Type, Int64Type, TimeUnit, TimestampMicrosecondType,
};
use bytes::Bytes;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rust_decimal::Decimal;

use ecom_core::EnrichedTransaction;

use super::builders::to_scaled_i128;
use super::error::ParquetError;
use super::schema::transaction_schema;
use super::writer::{record_to_batch, write_parquet, write_parquet_bytes};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn sample_record() -> EnrichedTransaction {
    EnrichedTransaction {
        transaction_id: "TXN12345".into(),
        timestamp: NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_micro_opt(14, 30, 0, 250)
            .unwrap(),
        customer_id: "CUST1234".into(),
        product_id: "PROD123".into(),
        quantity: 3,
        price: d("19.99"),
        category: "Electronics".into(),
        total_amount: d("59.97"),
        year: 2024,
        month: 3,
        day: 15,
        hour: 14,
        day_of_week: 4,
        discount: d("0.00"),
        final_amount: d("59.97"),
    }
}

#[test]
fn test_schema_columns() {
    let schema = transaction_schema();
    assert_eq!(schema.fields().len(), 15);
    assert_eq!(schema.field(0).name(), "transaction_id");
    assert_eq!(
        *schema.field(1).data_type(),
        DataType::Timestamp(TimeUnit::Microsecond, None)
    );
    assert_eq!(*schema.field(4).data_type(), DataType::Int64);
    assert_eq!(*schema.field(5).data_type(), DataType::Decimal128(18, 4));
    assert_eq!(*schema.field(7).data_type(), DataType::Decimal128(18, 2));
    assert_eq!(schema.field(12).name(), "day_of_week");
    assert!(schema.fields().iter().all(|f| !f.is_nullable()));
}

#[test]
fn test_record_to_batch() {
    let batch = record_to_batch(&sample_record()).unwrap();
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.num_columns(), 15);

    let totals = batch.column(7).as_primitive::<Decimal128Type>();
    assert_eq!(totals.value(0), 5997);
    let prices = batch.column(5).as_primitive::<Decimal128Type>();
    assert_eq!(prices.value(0), 199_900);
}

#[test]
fn test_bytes_roundtrip_through_reader() {
    let bytes = write_parquet_bytes(&sample_record()).unwrap();
    assert_eq!(&bytes[..4], b"PAR1");

    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes)).unwrap();
    let kv = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .cloned()
        .unwrap_or_default();
    let txn = kv
        .iter()
        .find(|k| k.key == "ecom.transaction_id")
        .and_then(|k| k.value.clone());
    assert_eq!(txn.as_deref(), Some("TXN12345"));

    let mut reader = builder.build().unwrap();
    let batch = reader.next().unwrap().unwrap();
    assert_eq!(batch.num_rows(), 1);
    assert!(reader.next().is_none());

    let schema = batch.schema();
    assert_eq!(*schema.field(7).data_type(), DataType::Decimal128(18, 2));

    let ids = batch.column(0).as_string::<i32>();
    assert_eq!(ids.value(0), "TXN12345");

    let ts = batch.column(1).as_primitive::<TimestampMicrosecondType>();
    let expected = sample_record().timestamp.and_utc().timestamp_micros();
    assert_eq!(ts.value(0), expected);

    assert_eq!(batch.column(4).as_primitive::<Int64Type>().value(0), 3);
    assert_eq!(batch.column(6).as_string::<i32>().value(0), "Electronics");
    assert_eq!(batch.column(8).as_primitive::<Int32Type>().value(0), 2024);
    assert_eq!(batch.column(12).as_primitive::<Int32Type>().value(0), 4);
    assert_eq!(batch.column(13).as_primitive::<Decimal128Type>().value(0), 0);
    assert_eq!(batch.column(14).as_primitive::<Decimal128Type>().value(0), 5997);
    assert!(batch.column(14).is_valid(0));
}

#[test]
fn test_write_parquet_file() {
    let tmp = std::env::temp_dir().join("ecom-transform-parquet-test");
    std::fs::remove_dir_all(&tmp).ok();
    let path = tmp.join("processed/date=2024-03-15/t.parquet");

    let rows = write_parquet(&sample_record(), &path).unwrap();
    assert_eq!(rows, 1);

    let file = std::fs::File::open(&path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
    let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(total, 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn test_identical_records_encode_identically() {
    let a = write_parquet_bytes(&sample_record()).unwrap();
    let b = write_parquet_bytes(&sample_record()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_scaled_decimals() {
    assert_eq!(to_scaled_i128("x", 2, d("59.97")).unwrap(), 5997);
    assert_eq!(to_scaled_i128("x", 2, d("5")).unwrap(), 500);
    assert_eq!(to_scaled_i128("x", 2, d("1.005")).unwrap(), 101);
    assert_eq!(to_scaled_i128("x", 4, d("19.99")).unwrap(), 199_900);
    assert_eq!(to_scaled_i128("x", 2, d("-0.5")).unwrap(), -50);
}

#[test]
fn test_decimal_overflow_is_reported() {
    let err = to_scaled_i128("total_amount", 2, d("10000000000000000")).unwrap_err();
    assert!(matches!(err, ParquetError::DecimalOverflow { column: "total_amount", .. }));

    let mut record = sample_record();
    record.total_amount = d("99999999999999999999");
    assert!(record_to_batch(&record).is_err());
}
