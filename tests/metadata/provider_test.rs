#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use lakeview::metadata::{
        DemoCatalog, FormatProvider, MetadataError, MetadataResult, MetadataService,
        UnknownPathPolicy,
    };
    use lakeview::model::{TableFormat, TableMetadata, TableVersion};

    const CUSTOMER_DATA: &str = "s3://analytics-bucket/customer_data/";
    const TRANSACTIONS: &str = "s3://analytics-bucket/transactions/";
    const ORDERS: &str = "s3://data-warehouse/orders/";
    const PRODUCTS: &str = "s3://analytics-bucket/products/";

    /// Serves a fixed table and counts calls.
    struct Fixed {
        format: TableFormat,
        table: TableMetadata,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FormatProvider for Fixed {
        fn format(&self) -> TableFormat {
            self.format
        }

        async fn get_metadata(&self, path: &str) -> MetadataResult<TableMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut table = self.table.clone();
            table.location = path.to_string();
            Ok(table)
        }
    }

    fn demo_table(location: &str) -> TableMetadata {
        DemoCatalog::new()
            .get(location)
            .cloned()
            .expect("demo table")
    }

    #[tokio::test]
    async fn test_each_demo_path_reaches_its_format() {
        let service = MetadataService::demo(UnknownPathPolicy::Lenient);
        let cases = [
            (CUSTOMER_DATA, TableFormat::Iceberg, "customer_profiles"),
            (TRANSACTIONS, TableFormat::Delta, "transactions"),
            (ORDERS, TableFormat::Hudi, "orders_incremental"),
            (PRODUCTS, TableFormat::Parquet, "product_catalog"),
        ];
        for (path, format, name) in cases {
            let table = service.fetch(path, None).await.unwrap();
            assert_eq!(table.format, format);
            assert_eq!(table.name, name);
        }
    }

    #[tokio::test]
    async fn test_latest_version_first() {
        let service = MetadataService::demo(UnknownPathPolicy::Lenient);
        let versions = service.versions(CUSTOMER_DATA, None).await.unwrap();
        assert_eq!(versions[0].id, "24");
        assert!(versions[0].is_latest);
        assert_eq!(versions.iter().filter(|v| v.is_latest).count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_path_lenient_serves_default() {
        let service = MetadataService::demo(UnknownPathPolicy::Lenient);
        let table = service.fetch("s3://nowhere/at/all/", None).await.unwrap();
        assert_eq!(table.name, "customer_profiles");
    }

    #[tokio::test]
    async fn test_unknown_path_strict_is_not_found() {
        let service = MetadataService::demo(UnknownPathPolicy::Strict);
        let err = service.fetch("s3://nowhere/at/all/", None).await.unwrap_err();
        assert!(err.is_not_found());

        let err = service.schema(TRANSACTIONS, Some("iceberg")).await.unwrap_err();
        assert!(matches!(
            err,
            MetadataError::TableNotFound {
                format: TableFormat::Iceberg,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_registered_provider_replaces_demo() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut service = MetadataService::demo(UnknownPathPolicy::Lenient);
        service.register(Fixed {
            format: TableFormat::Delta,
            table: demo_table(TRANSACTIONS),
            calls: Arc::clone(&calls),
        });

        let table = service.fetch("s3://lake/events/_delta_log/", None).await.unwrap();
        assert_eq!(table.location, "s3://lake/events/_delta_log/");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        service.partitions(TRANSACTIONS, None).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_list_tables() {
        let mut service = MetadataService::demo(UnknownPathPolicy::Strict);
        let names: Vec<String> = service
            .list_tables(None)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            [
                "customer_profiles",
                "orders_incremental",
                "product_catalog",
                "transactions"
            ]
        );

        let delta = service.list_tables(Some(TableFormat::Delta)).await.unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].location, TRANSACTIONS);
        assert_eq!(delta[0].current_version.as_deref(), Some("18"));

        // A provider that cannot enumerate contributes nothing
        service.register(Fixed {
            format: TableFormat::Delta,
            table: demo_table(TRANSACTIONS),
            calls: Arc::new(AtomicUsize::new(0)),
        });
        assert_eq!(service.list_tables(None).await.unwrap().len(), 3);
        assert!(service
            .list_tables(Some(TableFormat::Delta))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_tables_missing_provider() {
        let service = MetadataService::new();
        assert!(service.list_tables(None).await.unwrap().is_empty());
        assert!(matches!(
            service.list_tables(Some(TableFormat::Hudi)).await,
            Err(MetadataError::ProviderMissing(TableFormat::Hudi))
        ));
    }

    #[tokio::test]
    async fn test_missing_provider() {
        let service = MetadataService::new();
        let err = service.fetch(ORDERS, None).await.unwrap_err();
        assert!(matches!(err, MetadataError::ProviderMissing(TableFormat::Hudi)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_metadata_rejected() {
        let mut table = demo_table(ORDERS);
        let newest = table.versions.as_ref().unwrap()[0].timestamp;
        table.versions.as_mut().unwrap().push(TableVersion {
            id: "999".to_string(),
            timestamp: newest + chrono::Duration::days(1),
            operation: None,
            changes: None,
            is_latest: true,
        });

        let mut service = MetadataService::new();
        service.register(Fixed {
            format: TableFormat::Hudi,
            table,
            calls: Arc::new(AtomicUsize::new(0)),
        });

        let err = service.fetch(ORDERS, None).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidMetadata { .. }));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_schema_slice() {
        let mut table = demo_table(PRODUCTS);
        table.schema = None;
        table.sample_data = None;

        let mut service = MetadataService::new();
        service.register(Fixed {
            format: TableFormat::Parquet,
            table,
            calls: Arc::new(AtomicUsize::new(0)),
        });

        let err = service.schema(PRODUCTS, None).await.unwrap_err();
        assert!(matches!(err, MetadataError::SliceUnavailable { slice: "schema", .. }));
        assert!(service.sample_data(PRODUCTS, None).await.unwrap().is_empty());
    }
}
