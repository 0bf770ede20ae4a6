#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lakeview::metadata::DemoCatalog;
    use lakeview::model::{SampleRow, TableMetadata};
    use lakeview::viewer::{render, render_sample_data, tab_state, FetchState, Tab, TabState};
    use serde_json::json;

    fn catalog() -> DemoCatalog {
        DemoCatalog::anchored_at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn loaded(location: &str) -> (FetchState, chrono::DateTime<Utc>) {
        let catalog = catalog();
        let table = catalog.get(location).cloned().unwrap();
        (FetchState::loaded(table), catalog.anchor())
    }

    fn stripped(location: &str) -> FetchState {
        let mut table: TableMetadata = catalog().get(location).cloned().unwrap();
        table.schema = None;
        table.partitions = None;
        table.versions = None;
        table.properties = None;
        table.sample_data = None;
        FetchState::loaded(table)
    }

    #[test]
    fn test_overview() {
        let (fetch, now) = loaded("s3://analytics-bucket/customer_data/");
        insta::assert_snapshot!(render(Tab::Overview, &fetch, now), @r"
        customer_profiles
        Format:           Apache Iceberg
        Location:         s3://analytics-bucket/customer_data/
        Last modified:    just now
        Size:             3.91 GB
        Rows:             42.7M
        Files:            68
        Current version:  24
        Columns:          7
        Partitions:       9
        ");
    }

    #[test]
    fn test_versions_mark_latest() {
        let (fetch, now) = loaded("s3://analytics-bucket/customer_data/");
        insta::assert_snapshot!(render(Tab::Versions, &fetch, now), @r#"
        VERSION      WHEN         OPERATION  CHANGES
        24 (latest)  just now     append     {"rowsAdded":1200000,"schemaChanged":true}
        23           5 days ago   delete     {"rowsDeleted":52000}
        22           7 days ago   schema     {"fieldsAdded":["last_activity"]}
        21           12 days ago  append     {"rowsAdded":1500000}
        "#);
    }

    #[test]
    fn test_schema_lists_every_field() {
        let (fetch, now) = loaded("s3://analytics-bucket/products/");
        let out = render(Tab::Schema, &fetch, now);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("COLUMN"));
        assert!(lines[1].starts_with("product_id"));
        assert!(lines[4].contains("category") && lines[4].contains("yes"));
        assert!(lines[7].contains("map<string,string>"));
    }

    #[test]
    fn test_properties() {
        let (fetch, now) = loaded("s3://analytics-bucket/products/");
        let out = render(Tab::Properties, &fetch, now);
        assert!(out.starts_with(
            "Format: Apache Parquet\nLocation: s3://analytics-bucket/products/"
        ));
        assert!(out.contains("Manifest files:\n  products_catalog_manifest.json  (1.43 MB)"));
        assert!(out.contains("  parquet.compression: snappy"));
        assert!(out.contains("  numRecords: 1190000"));
        assert!(!out.contains("Snapshot:"));
    }

    #[test]
    fn test_sample_data_columns_in_first_appearance_order() {
        let rows: Vec<SampleRow> = vec![
            json!({"id": 1, "name": "Ada"}),
            json!({"id": 2, "name": "Grace", "score": 9.5}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        insta::assert_snapshot!(render_sample_data(&rows), @r"
        id  name   score
        1   Ada
        2   Grace  9.5
        ");
    }

    #[test]
    fn test_sample_data_keeps_row_key_order() {
        let rows: Vec<SampleRow> = vec![json!({"zone": "eu", "amount": 3, "id": 1})]
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        let out = render_sample_data(&rows);
        assert_eq!(out.lines().next(), Some("zone  amount  id"));

        let (fetch, now) = loaded("s3://analytics-bucket/products/");
        let out = render(Tab::SampleData, &fetch, now);
        let header: Vec<&str> = out.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(
            header,
            [
                "product_id",
                "name",
                "description",
                "category",
                "price",
                "stock_quantity",
                "attributes"
            ]
        );
    }

    #[test]
    fn test_loading_and_error_states() {
        let now = Utc::now();
        for tab in Tab::ALL {
            assert_eq!(tab_state(tab, &FetchState::Loading), TabState::Loading);
        }
        assert_eq!(render(Tab::Schema, &FetchState::Loading, now), "Loading schema...");

        let failed = FetchState::Failed("boom".to_string());
        assert_eq!(tab_state(Tab::Versions, &failed), TabState::Error);
        assert_eq!(
            render(Tab::Versions, &failed, now),
            "Failed to load versions: boom"
        );
    }

    #[test]
    fn test_empty_states() {
        let fetch = stripped("s3://data-warehouse/orders/");
        let now = Utc::now();

        assert_eq!(tab_state(Tab::Overview, &fetch), TabState::Ready);
        for tab in [
            Tab::Schema,
            Tab::Partitions,
            Tab::Versions,
            Tab::Properties,
            Tab::SampleData,
        ] {
            assert_eq!(tab_state(tab, &fetch), TabState::Empty, "{}", tab);
        }
        assert_eq!(
            render(Tab::Partitions, &fetch, now),
            "No partitions for this table"
        );
        assert_eq!(
            render(Tab::Versions, &fetch, now),
            "No version history for this table"
        );
    }

    #[test]
    fn test_partitions_tab_nests_children() {
        let (fetch, now) = loaded("s3://analytics-bucket/customer_data/");
        let out = render(Tab::Partitions, &fetch, now);
        assert!(out.starts_with("signup_date=2023-08  (1.3 GB, 42 files, 8.5M rows)"));
        assert!(out.contains("\n  region=NA  (1.68 GB, 12 files, 5.8M rows)"));
        assert_eq!(out.lines().count(), 10);
    }
}
