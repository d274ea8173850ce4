use {
    crate::fixture::{Fixture, PARTITIONS_PER_TABLE},
    catalog::{Error, InitStrategy, LoadError, TableKind},
    def::{PrimitiveType, DEFAULT_PARTITION_ID},
    std::{
        sync::{Arc, Barrier},
        thread,
    },
};

#[test]
fn lazy_loading() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    assert_eq!(
        catalog.db_names(),
        vec![
            "functional",
            "functional_avro",
            "functional_hbase",
            "functional_parquet"
        ]
    );
    let db = catalog.get_db("functional").unwrap();
    assert_eq!(
        db.table_names(),
        vec!["alltypes", "alltypesnopart", "hive_index_tbl", "view_view"]
    );
    assert!(db.loaded_table("alltypes").is_none());
    assert_eq!(fixture.metastore.descriptor_fetches(), 0);

    let table = catalog.get_table("functional", "alltypes").unwrap();
    assert_eq!(fixture.metastore.descriptor_fetches(), 1);
    assert_eq!(table.num_rows(), Some(7300));
    assert_eq!(table.num_clustering_cols(), 2);
    assert_eq!(
        table.column("double_col").unwrap().column_type,
        PrimitiveType::Double
    );

    let partitions = table.as_hdfs().unwrap().partitions();
    assert_eq!(partitions.partition_count(), PARTITIONS_PER_TABLE + 1);
    assert!(partitions.default_partition().key_values().is_empty());
    for partition in partitions.all_partitions().filter(|p| !p.is_default()) {
        assert_eq!(partition.key_values().len(), 2);
        assert_eq!(partition.file_descriptors().len(), 1);
    }

    let again = catalog.get_table("FUNCTIONAL", "AllTypes").unwrap();
    assert!(Arc::ptr_eq(&table, &again));
    assert!(Arc::ptr_eq(&db.loaded_table("alltypes").unwrap(), &table));
    assert_eq!(fixture.metastore.descriptor_fetches(), 1);
}

#[test]
fn unpartitioned_table() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    let table = catalog.get_table("functional", "alltypesnopart").unwrap();
    let partitions = table.as_hdfs().unwrap().partitions();
    assert_eq!(table.num_rows(), None);
    assert_eq!(partitions.partition_count(), 2);

    let data = partitions
        .all_partitions()
        .find(|p| !p.is_default())
        .unwrap();
    assert_eq!(data.location(), "/test-warehouse/alltypesnopart");
    assert_eq!(data.file_descriptors().len(), 1);
    assert_eq!(partitions.total_size(), 1024);
}

#[test]
fn unknown_names() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    assert!(matches!(
        catalog.get_db("nope"),
        Err(Error::DatabaseNotFound { .. })
    ));
    assert!(matches!(
        catalog.get_table("nope", "alltypes"),
        Err(Error::DatabaseNotFound { .. })
    ));
    assert!(matches!(
        catalog.get_table("functional", "nope"),
        Err(Error::TableNotFound { .. })
    ));
}

#[test]
fn failures_stay_inside_the_table() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    let table = catalog.get_table("functional", "hive_index_tbl").unwrap();
    assert!(matches!(table.kind(), TableKind::Failed(_)));
    assert!(matches!(
        table.load_error().map(|e| &**e),
        Some(LoadError::UnrecognizedDescriptor { .. })
    ));

    match catalog.load_table("functional", "hive_index_tbl") {
        Err(Error::TableLoading { db, name, source }) => {
            assert_eq!(db, "functional");
            assert_eq!(name, "hive_index_tbl");
            assert!(Arc::ptr_eq(&source, table.load_error().unwrap()));
        }
        other => panic!("expected a loading error, got {:?}", other.map(|t| t.full_name())),
    }

    let view = catalog.load_table("functional", "view_view").unwrap();
    assert_eq!(
        view.as_view().unwrap().query_text(),
        Some("SELECT * FROM functional.alltypes_view")
    );
    assert!(catalog.load_table("functional", "alltypes").is_ok());
}

#[test]
fn listing_failure_fails_one_table() {
    let fixture = Fixture::new();
    fixture
        .fs
        .fail_listing("/test-warehouse/alltypes_avro/year=2010/month=7");
    let catalog = fixture.catalog(InitStrategy::Lazy);

    let avro = catalog.get_table("functional_avro", "alltypes").unwrap();
    assert!(matches!(
        avro.load_error().map(|e| &**e),
        Some(LoadError::ListFiles { .. })
    ));
    // the descriptor is kept even though loading failed
    assert_eq!(avro.descriptor().partition_keys.len(), 2);

    let parquet = catalog.get_table("functional_parquet", "alltypes").unwrap();
    assert!(parquet.load_error().is_none());
}

#[test]
fn empty_partitions_are_skipped() {
    let fixture = Fixture::new();
    fixture
        .metastore
        .add_partition(
            "functional_parquet",
            "alltypes",
            def::RawPartition {
                values: vec!["2011".to_string(), "1".to_string()],
                location: "/test-warehouse/alltypes_parquet/year=2011/month=1".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    let table = catalog.get_table("functional_parquet", "alltypes").unwrap();
    assert_eq!(
        table.as_hdfs().unwrap().partitions().partition_count(),
        PARTITIONS_PER_TABLE + 1
    );
}

#[test]
fn unknown_partition_format_fails_the_table() {
    let fixture = Fixture::new();
    let location = "/test-warehouse/alltypes_avro/year=2011/month=1";
    fixture
        .metastore
        .add_partition(
            "functional_avro",
            "alltypes",
            def::RawPartition {
                values: vec!["2011".to_string(), "1".to_string()],
                location: location.to_string(),
                input_format: Some("com.example.UnknownInputFormat".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    let table = catalog.get_table("functional_avro", "alltypes").unwrap();
    assert!(matches!(
        table.load_error().map(|e| &**e),
        Some(LoadError::PartitionFormat { path, .. }) if path == location
    ));
}

#[test]
fn concurrent_requests_share_one_load() {
    const THREADS: usize = 8;

    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);
    let barrier = Barrier::new(THREADS);

    let tables = thread::scope(|s| {
        let handles = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    catalog.get_table("functional", "alltypes").unwrap()
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(fixture.metastore.descriptor_fetches(), 1);
    assert!(tables.iter().all(|t| Arc::ptr_eq(t, &tables[0])));
}

#[test]
fn reload_picks_up_changes() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    let before = catalog.get_table("functional", "alltypes").unwrap();
    fixture.add_partition("functional", "alltypes", "/test-warehouse/alltypes", 2011, 1);

    // cached until reloaded
    let cached = catalog.get_table("functional", "alltypes").unwrap();
    assert!(Arc::ptr_eq(&before, &cached));

    let after = catalog.reload_table("functional", "alltypes").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(after.id() > before.id());
    assert_eq!(
        after.as_hdfs().unwrap().partitions().partition_count(),
        PARTITIONS_PER_TABLE + 2
    );
    assert!(Arc::ptr_eq(
        &catalog.get_table("functional", "alltypes").unwrap(),
        &after
    ));
    assert_eq!(
        before.as_hdfs().unwrap().partitions().partition_count(),
        PARTITIONS_PER_TABLE + 1
    );
}

#[test]
fn reload_registers_and_forgets_tables() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);
    let db = catalog.get_db("functional").unwrap();

    fixture.metastore.create_table(crate::fixture::hdfs_descriptor(
        "functional",
        "NewTable",
        "/test-warehouse/newtable",
        def::FileFormat::Text,
        vec![],
    ));
    assert!(catalog.get_table("functional", "newtable").is_err());

    let table = catalog.reload_table("functional", "newtable").unwrap();
    assert_eq!(table.name(), "NewTable");
    assert!(db.contains_table("NEWTABLE"));
    assert_eq!(
        table
            .as_hdfs()
            .unwrap()
            .partitions()
            .default_partition()
            .id(),
        DEFAULT_PARTITION_ID
    );

    assert!(fixture.metastore.drop_table("functional", "newtable"));
    assert!(matches!(
        catalog.reload_table("functional", "newtable"),
        Err(Error::TableNotFound { .. })
    ));
    assert!(!db.contains_table("newtable"));
}

#[test]
fn immediate_loads_everything() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Immediate);

    for db_name in catalog.db_names() {
        let db = catalog.get_db(&db_name).unwrap();
        for name in db.table_names() {
            assert!(db.loaded_table(&name).is_some(), "{}.{}", db_name, name);
        }
    }

    let fetches = fixture.metastore.descriptor_fetches();
    assert_eq!(fetches, 8);
    catalog.get_table("functional_hbase", "alltypes").unwrap();
    assert_eq!(fixture.metastore.descriptor_fetches(), fetches);
}

#[test]
fn ids_increase() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Empty);

    assert!(catalog.db_names().is_empty());
    let first = catalog.next_table_id();
    assert!(catalog.next_table_id() > first);
}

#[test]
fn close_releases_the_metastore() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);

    catalog.close();
    assert!(fixture.metastore.is_closed());
}
