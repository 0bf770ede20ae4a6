//! Static demo catalog.
//!
//! Four sample tables, one per format, built once and served for any path.
//! Timestamps are relative to the catalog's anchor so that "5 days ago" stays
//! stable for the lifetime of a process.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{MetadataError, MetadataResult};
use crate::model::{
    JsonMap, ManifestFile, SampleRow, TableFormat, TableMetadata, TablePartition, TableProperties,
    TableSchema, TableSchemaField, TableVersion,
};

/// Location of the table served for unknown paths under the lenient policy.
pub const DEFAULT_LOCATION: &str = "s3://analytics-bucket/customer_data/";

pub const CUSTOMER_PROFILES_LOCATION: &str = "s3://analytics-bucket/customer_data/";
pub const TRANSACTIONS_LOCATION: &str = "s3://analytics-bucket/transactions/";
pub const ORDERS_LOCATION: &str = "s3://data-warehouse/orders/";
pub const PRODUCTS_LOCATION: &str = "s3://analytics-bucket/products/";

const GB: u64 = 1_000_000_000;
const MB: u64 = 1_000_000;

/// What to do when a path is unknown or its format does not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPathPolicy {
    /// Serve the default demo table.
    #[default]
    Lenient,
    /// Report the table as not found.
    Strict,
}

/// In-memory table catalog keyed by location.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    anchor: DateTime<Utc>,
    tables: BTreeMap<String, TableMetadata>,
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoCatalog {
    /// Build the catalog anchored at the current time.
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Build the catalog with all relative timestamps computed from `anchor`.
    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        let tables = [
            customer_profiles(anchor),
            transactions(anchor),
            orders_incremental(anchor),
            product_catalog(anchor),
        ]
        .into_iter()
        .map(|table| (table.location.clone(), table))
        .collect();

        Self { anchor, tables }
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.values()
    }

    /// Exact lookup, tolerating a missing trailing slash.
    pub fn get(&self, path: &str) -> Option<&TableMetadata> {
        self.tables.get(path).or_else(|| {
            if path.ends_with('/') {
                None
            } else {
                self.tables.get(&format!("{}/", path))
            }
        })
    }

    /// The table served for unknown paths.
    pub fn default_table(&self) -> Option<&TableMetadata> {
        self.tables.get(DEFAULT_LOCATION)
    }

    /// Look up `path` for a provider of `format`.
    ///
    /// A known path whose format matches is returned as is. Unknown paths and
    /// format mismatches fall back to the default table under
    /// [`UnknownPathPolicy::Lenient`] and fail under
    /// [`UnknownPathPolicy::Strict`].
    pub fn lookup(
        &self,
        path: &str,
        format: Option<TableFormat>,
        policy: UnknownPathPolicy,
    ) -> MetadataResult<TableMetadata> {
        let found = self
            .get(path)
            .filter(|table| format.map_or(true, |f| table.format == f));

        match (found, policy) {
            (Some(table), _) => Ok(table.clone()),
            (None, UnknownPathPolicy::Lenient) => {
                self.default_table()
                    .cloned()
                    .ok_or_else(|| MetadataError::TableNotFound {
                        path: path.to_string(),
                        format: format.unwrap_or(TableFormat::Parquet),
                    })
            }
            (None, UnknownPathPolicy::Strict) => Err(MetadataError::TableNotFound {
                path: path.to_string(),
                format: format.unwrap_or(TableFormat::Parquet),
            }),
        }
    }
}

fn days_ago(anchor: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    anchor - Duration::days(days)
}

fn object(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

fn field(name: &str, data_type: &str, nullable: bool, description: &str) -> TableSchemaField {
    TableSchemaField::new(name, data_type, nullable).with_description(description)
}

fn key(name: &str, data_type: &str, nullable: bool, description: &str) -> TableSchemaField {
    field(name, data_type, nullable, description).partition_key()
}

fn version(
    anchor: DateTime<Utc>,
    id: &str,
    days: i64,
    operation: &str,
    changes: Value,
) -> TableVersion {
    TableVersion {
        id: id.to_string(),
        timestamp: days_ago(anchor, days),
        operation: Some(operation.to_string()),
        changes: Some(object(changes)),
        is_latest: false,
    }
}

/// Flag the first version as latest.
fn with_latest(mut versions: Vec<TableVersion>) -> Vec<TableVersion> {
    if let Some(first) = versions.first_mut() {
        first.is_latest = true;
    }
    versions
}

fn rows(values: Value) -> Vec<SampleRow> {
    match values {
        Value::Array(items) => items.into_iter().map(object).collect(),
        _ => Vec::new(),
    }
}

fn region_children(stats: [(&str, u64, u64, u64); 4]) -> Vec<TablePartition> {
    stats
        .into_iter()
        .map(|(region, size, files, rows)| {
            TablePartition::new("region", region).with_stats(size, files, rows)
        })
        .collect()
}

fn customer_profiles(anchor: DateTime<Utc>) -> TableMetadata {
    let location = CUSTOMER_PROFILES_LOCATION;

    let fields = vec![
        field("customer_id", "string", false, "Unique customer identifier"),
        field("name", "string", false, "Customer full name"),
        field("email", "string", true, "Contact email address"),
        key("signup_date", "date", false, "Date when customer signed up"),
        key("region", "string", false, "Geographic region code"),
        field("last_activity", "timestamp", true, "Time of last customer activity"),
        field("total_orders", "integer", false, "Count of all orders placed"),
    ];

    let partitions = vec![
        TablePartition::new("signup_date", "2023-08").with_stats(1_400 * MB, 42, 8_500_000),
        TablePartition::new("signup_date", "2023-07")
            .with_stats(3_900 * MB, 35, 12_200_000)
            .with_children(region_children([
                ("NA", 1_800 * MB, 12, 5_800_000),
                ("EU", 1_100 * MB, 9, 3_500_000),
                ("APAC", 720 * MB, 8, 2_100_000),
                ("LATAM", 310 * MB, 6, 800_000),
            ])),
        TablePartition::new("signup_date", "2023-06").with_stats(3_600 * MB, 38, 11_800_000),
        TablePartition::new("signup_date", "2023-05").with_stats(3_400 * MB, 34, 10_900_000),
        TablePartition::new("signup_date", "2023-04").with_stats(3_100 * MB, 31, 9_800_000),
        TablePartition::new("signup_date", "2023-03").with_stats(3_300 * MB, 34, 10_500_000),
    ];

    let versions = with_latest(vec![
        version(anchor, "24", 0, "append", json!({"rowsAdded": 1_200_000, "schemaChanged": true})),
        version(anchor, "23", 5, "delete", json!({"rowsDeleted": 52_000})),
        version(anchor, "22", 7, "schema", json!({"fieldsAdded": ["last_activity"]})),
        version(anchor, "21", 12, "append", json!({"rowsAdded": 1_500_000})),
    ]);

    let millis = |days| days_ago(anchor, days).timestamp_millis();

    let properties = TableProperties {
        format: TableFormat::Iceberg,
        format_version: Some("2".to_string()),
        location: location.to_string(),
        manifest_files: Some(vec![
            ManifestFile::new("metadata/00123-4a5b-9c8d-5e7f.avro", 2_100_000),
            ManifestFile::new("metadata/00124-8e2f-7a6b-1c9d.avro", 1_800_000),
            ManifestFile::new("metadata/00125-3f5e-9d2c-7b1a.avro", 1_900_000),
            ManifestFile::new("metadata/00126-2d1e-8c7b-6a5f.avro", 2_300_000),
        ]),
        snapshot_info: Some(object(json!({
            "id": "52896723015",
            "manifestList": format!("{}metadata/snap-52896723015.avro", location),
            "createdAt": days_ago(anchor, 0),
            "totalDataFiles": 68,
            "addedDataFiles": 5,
            "removedDataFiles": 0,
            "operation": "append"
        }))),
        format_config: Some(object(json!({
            "format-version": 2,
            "table-uuid": "fb072c92-a02b-11e9-ae9c-1a2b3c4d5e6f",
            "location": location,
            "last-sequence-number": 24,
            "snapshot-log": [
                {"sequence-number": 24, "timestamp-ms": millis(0)},
                {"sequence-number": 23, "timestamp-ms": millis(5)},
                {"sequence-number": 22, "timestamp-ms": millis(7)}
            ]
        }))),
        metrics: Some(object(json!({
            "totalManifestFiles": 24,
            "metadataSize": 48 * MB,
            "avgRecordsPerFile": 628_000,
            "avgRecordSize": 98
        }))),
    };

    let sample_data = rows(json!([
        {
            "customer_id": "C1001",
            "name": "John Smith",
            "email": "john.smith@example.com",
            "signup_date": "2023-07-15",
            "region": "NA",
            "last_activity": "2023-08-14T14:32:16Z",
            "total_orders": 12
        },
        {
            "customer_id": "C1002",
            "name": "Emma Johnson",
            "email": "emma.j@example.com",
            "signup_date": "2023-07-17",
            "region": "EU",
            "last_activity": "2023-08-13T08:45:21Z",
            "total_orders": 8
        },
        {
            "customer_id": "C1003",
            "name": "Liu Wei",
            "email": "liu.wei@example.com",
            "signup_date": "2023-07-18",
            "region": "APAC",
            "last_activity": "2023-08-15T02:12:33Z",
            "total_orders": 5
        }
    ]));

    TableMetadata {
        name: "customer_profiles".to_string(),
        format: TableFormat::Iceberg,
        location: location.to_string(),
        last_modified: days_ago(anchor, 0),
        size: 4_200 * MB,
        row_count: Some(42_700_000),
        file_count: Some(68),
        current_version: Some("24".to_string()),
        schema: Some(TableSchema {
            fields,
            format_version: Some("2".to_string()),
            last_modified: Some(days_ago(anchor, 0)),
        }),
        partitions: Some(partitions),
        versions: Some(versions),
        properties: Some(properties),
        sample_data: Some(sample_data),
    }
}

fn transactions(anchor: DateTime<Utc>) -> TableMetadata {
    let location = TRANSACTIONS_LOCATION;

    let fields = vec![
        field("transaction_id", "string", false, "Unique transaction ID"),
        field("customer_id", "string", false, "Customer who made the transaction"),
        field("amount", "decimal", false, "Transaction amount"),
        field("currency", "string", false, "Currency code"),
        key("transaction_date", "date", false, "Date of transaction"),
        field("transaction_time", "timestamp", false, "Exact timestamp"),
        field("status", "string", false, "Transaction status"),
        field("payment_method", "string", false, "Method of payment"),
    ];

    let partitions = vec![
        TablePartition::new("transaction_date", "2023-08").with_stats(2_100 * MB, 31, 15_800_000),
        TablePartition::new("transaction_date", "2023-07").with_stats(2_300 * MB, 30, 16_200_000),
        TablePartition::new("transaction_date", "2023-06").with_stats(2_200 * MB, 29, 15_900_000),
    ];

    let versions = with_latest(vec![
        version(anchor, "18", 1, "append", json!({"rowsAdded": 900_000})),
        version(anchor, "17", 3, "vacuum", json!({"filesMerged": 12})),
        version(anchor, "16", 8, "append", json!({"rowsAdded": 850_000})),
    ]);

    let properties = TableProperties {
        format: TableFormat::Delta,
        format_version: Some("3".to_string()),
        location: location.to_string(),
        manifest_files: Some(vec![
            ManifestFile::new("_delta_log/00000000000000000018.json", 1_500_000),
            ManifestFile::new("_delta_log/00000000000000000017.json", 1_400_000),
            ManifestFile::new("_delta_log/00000000000000000016.json", 1_600_000),
        ]),
        snapshot_info: Some(object(json!({
            "version": "18",
            "timestampMs": days_ago(anchor, 1).timestamp_millis(),
            "operation": "WRITE",
            "operationParameters": {"mode": "Append"},
            "numFiles": 90,
            "numAddedFiles": 3,
            "numRemovedFiles": 0
        }))),
        format_config: Some(object(json!({
            "delta.minReaderVersion": 1,
            "delta.minWriterVersion": 2,
            "delta.columnMapping.mode": "name",
            "delta.checkpointInterval": 10,
            "delta.autoOptimize.autoCompact": "true",
            "delta.dataSkippingNumIndexedCols": 3
        }))),
        metrics: Some(object(json!({
            "numTransactions": 18,
            "numFiles": 90,
            "sizeInBytes": 6_600 * MB,
            "numRecords": 47_900_000,
            "numMetadataBytes": 35 * MB
        }))),
    };

    let sample_data = rows(json!([
        {
            "transaction_id": "T20001",
            "customer_id": "C1001",
            "amount": 125.99,
            "currency": "USD",
            "transaction_date": "2023-08-15",
            "transaction_time": "2023-08-15T14:22:31Z",
            "status": "completed",
            "payment_method": "credit_card"
        },
        {
            "transaction_id": "T20002",
            "customer_id": "C1002",
            "amount": 89.50,
            "currency": "EUR",
            "transaction_date": "2023-08-14",
            "transaction_time": "2023-08-14T09:18:02Z",
            "status": "completed",
            "payment_method": "paypal"
        },
        {
            "transaction_id": "T20003",
            "customer_id": "C1003",
            "amount": 250.00,
            "currency": "CNY",
            "transaction_date": "2023-08-15",
            "transaction_time": "2023-08-15T03:41:15Z",
            "status": "pending",
            "payment_method": "bank_transfer"
        }
    ]));

    TableMetadata {
        name: "transactions".to_string(),
        format: TableFormat::Delta,
        location: location.to_string(),
        last_modified: days_ago(anchor, 1),
        size: 6_600 * MB,
        row_count: Some(47_900_000),
        file_count: Some(90),
        current_version: Some("18".to_string()),
        schema: Some(TableSchema {
            fields,
            format_version: Some("3".to_string()),
            last_modified: Some(days_ago(anchor, 1)),
        }),
        partitions: Some(partitions),
        versions: Some(versions),
        properties: Some(properties),
        sample_data: Some(sample_data),
    }
}

fn orders_incremental(anchor: DateTime<Utc>) -> TableMetadata {
    let location = ORDERS_LOCATION;

    let fields = vec![
        field("order_id", "string", false, "Unique order identifier"),
        field("customer_id", "string", false, "Customer who placed the order"),
        key("order_date", "date", false, "Date when order was placed"),
        field("status", "string", false, "Order status"),
        field("total_amount", "decimal", false, "Total order amount"),
        field("items", "array<struct>", false, "Items in the order"),
        field("shipping_address", "struct", false, "Shipping address details"),
        key("region", "string", false, "Geographic region"),
    ];

    let partitions = vec![
        TablePartition::new("order_date", "2023-08")
            .with_stats(1_200 * MB, 24, 5_200_000)
            .with_children(region_children([
                ("NA", 480 * MB, 8, 2_100_000),
                ("EU", 390 * MB, 7, 1_700_000),
                ("APAC", 230 * MB, 6, 980_000),
                ("LATAM", 120 * MB, 3, 420_000),
            ])),
        TablePartition::new("order_date", "2023-07").with_stats(1_300 * MB, 26, 5_800_000),
        TablePartition::new("order_date", "2023-06").with_stats(1_250 * MB, 25, 5_600_000),
    ];

    let versions = with_latest(vec![
        version(
            anchor,
            "32",
            0,
            "upsert",
            json!({"rowsUpdated": 420_000, "rowsInserted": 380_000}),
        ),
        version(
            anchor,
            "31",
            4,
            "upsert",
            json!({"rowsUpdated": 380_000, "rowsInserted": 350_000}),
        ),
        version(anchor, "30", 9, "schema", json!({"fieldsModified": ["shipping_address"]})),
    ]);

    let properties = TableProperties {
        format: TableFormat::Hudi,
        format_version: Some("0.12.1".to_string()),
        location: location.to_string(),
        manifest_files: Some(vec![
            ManifestFile::new(".hoodie/32.commit", 1_200_000),
            ManifestFile::new(".hoodie/31.commit", 1_100_000),
            ManifestFile::new(".hoodie/30.commit", 1_300_000),
        ]),
        snapshot_info: Some(object(json!({
            "commitTime": days_ago(anchor, 0).format("%Y%m%d").to_string(),
            "commitType": "UPSERT",
            "totalBytesWritten": 150 * MB,
            "totalRecordsWritten": 800_000,
            "totalUpdateRecordsWritten": 420_000,
            "totalInsertRecordsWritten": 380_000
        }))),
        format_config: Some(object(json!({
            "hoodie.table.name": "orders_incremental",
            "hoodie.table.type": "MERGE_ON_READ",
            "hoodie.table.version": "0.12.1",
            "hoodie.archivelog.folder": "archived",
            "hoodie.datasource.write.recordkey.field": "order_id",
            "hoodie.datasource.write.partitionpath.field": "order_date,region",
            "hoodie.compaction.payload.class": "org.apache.hudi.common.model.HoodieAvroPayload"
        }))),
        metrics: Some(object(json!({
            "commitsSinceLastCleaning": 5,
            "numActiveBaseFiles": 62,
            "numActiveRollbackFiles": 0,
            "numActiveLogFiles": 13,
            "totalRollbacks": 2,
            "totalCompactions": 8,
            "totalCommits": 32
        }))),
    };

    let sample_data = rows(json!([
        {
            "order_id": "O30001",
            "customer_id": "C1001",
            "order_date": "2023-08-15",
            "status": "shipped",
            "total_amount": 125.99,
            "items": [
                {"product_id": "P1", "quantity": 2, "price": 45.99},
                {"product_id": "P2", "quantity": 1, "price": 34.01}
            ],
            "shipping_address": {
                "street": "123 Main St",
                "city": "New York",
                "zip": "10001",
                "country": "USA"
            },
            "region": "NA"
        },
        {
            "order_id": "O30002",
            "customer_id": "C1002",
            "order_date": "2023-08-14",
            "status": "delivered",
            "total_amount": 89.50,
            "items": [
                {"product_id": "P3", "quantity": 1, "price": 89.50}
            ],
            "shipping_address": {
                "street": "15 Rue de Rivoli",
                "city": "Paris",
                "zip": "75001",
                "country": "France"
            },
            "region": "EU"
        }
    ]));

    TableMetadata {
        name: "orders_incremental".to_string(),
        format: TableFormat::Hudi,
        location: location.to_string(),
        last_modified: days_ago(anchor, 0),
        size: 3_750 * MB,
        row_count: Some(16_600_000),
        file_count: Some(75),
        current_version: Some("32".to_string()),
        schema: Some(TableSchema {
            fields,
            format_version: Some("0.12.1".to_string()),
            last_modified: Some(days_ago(anchor, 0)),
        }),
        partitions: Some(partitions),
        versions: Some(versions),
        properties: Some(properties),
        sample_data: Some(sample_data),
    }
}

fn product_catalog(anchor: DateTime<Utc>) -> TableMetadata {
    let location = PRODUCTS_LOCATION;

    let fields = vec![
        field("product_id", "string", false, "Unique product identifier"),
        field("name", "string", false, "Product name"),
        field("description", "string", true, "Product description"),
        key("category", "string", false, "Product category"),
        field("price", "decimal", false, "Current price"),
        field("stock_quantity", "integer", false, "Available inventory"),
        field("attributes", "map<string,string>", true, "Product attributes"),
    ];

    let partitions = vec![
        TablePartition::new("category", "electronics").with_stats(320 * MB, 8, 180_000),
        TablePartition::new("category", "clothing").with_stats(280 * MB, 7, 350_000),
        TablePartition::new("category", "home").with_stats(210 * MB, 5, 240_000),
        TablePartition::new("category", "books").with_stats(190 * MB, 4, 420_000),
    ];

    // Recorded by the external catalog manifest, not by Parquet itself.
    let versions = with_latest(vec![
        version(anchor, "12", 2, "append", json!({"rowsAdded": 15_000})),
        version(anchor, "11", 7, "delete", json!({"rowsDeleted": 2_000})),
        version(anchor, "10", 14, "append", json!({"rowsAdded": 18_000})),
    ]);

    let properties = TableProperties {
        format: TableFormat::Parquet,
        format_version: None,
        location: location.to_string(),
        manifest_files: Some(vec![ManifestFile::new(
            "products_catalog_manifest.json",
            1_500_000,
        )]),
        snapshot_info: None,
        format_config: Some(object(json!({
            "parquet.version": "2.4.0",
            "parquet.compression": "snappy",
            "parquet.row.group.size": 134_217_728,
            "parquet.page.size": 1_048_576,
            "parquet.dictionary.page.size": 1_048_576,
            "parquet.enable.dictionary": "true"
        }))),
        metrics: Some(object(json!({
            "numFiles": 24,
            "sizeInBytes": GB,
            "numRecords": 1_190_000,
            "avgRowSize": 840
        }))),
    };

    let sample_data = rows(json!([
        {
            "product_id": "P1",
            "name": "Wireless Headphones",
            "description": "Premium noise-cancelling wireless headphones",
            "category": "electronics",
            "price": 45.99,
            "stock_quantity": 120,
            "attributes": {"color": "black", "brand": "SoundMaster", "bluetooth_version": "5.2"}
        },
        {
            "product_id": "P2",
            "name": "USB-C Cable",
            "description": "Fast charging USB-C to USB-C cable, 2m length",
            "category": "electronics",
            "price": 34.01,
            "stock_quantity": 350,
            "attributes": {"color": "white", "brand": "TechPlus", "length": "2m"}
        },
        {
            "product_id": "P3",
            "name": "Cotton T-Shirt",
            "description": "100% organic cotton t-shirt",
            "category": "clothing",
            "price": 89.50,
            "stock_quantity": 89,
            "attributes": {"color": "blue", "size": "M", "material": "cotton"}
        }
    ]));

    TableMetadata {
        name: "product_catalog".to_string(),
        format: TableFormat::Parquet,
        location: location.to_string(),
        last_modified: days_ago(anchor, 2),
        size: GB,
        row_count: Some(1_190_000),
        file_count: Some(24),
        current_version: None,
        schema: Some(TableSchema {
            fields,
            format_version: None,
            last_modified: Some(days_ago(anchor, 2)),
        }),
        partitions: Some(partitions),
        versions: Some(versions),
        properties: Some(properties),
        sample_data: Some(sample_data),
    }
}
