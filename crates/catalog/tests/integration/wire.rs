use {
    crate::fixture::{data_file, hdfs_descriptor, Fixture, PARTITIONS_PER_TABLE},
    catalog::{codec, Catalog, Error, InitStrategy, LoadError, Table, TableKind},
    def::{
        codec::{Decoder, Encoder},
        FieldSchema, FileBlock, FileFormat, RawPartition, DEFAULT_PARTITION_ID,
        UNKNOWN_ROW_COUNT,
    },
    rand::{rngs::StdRng, Rng, SeedableRng},
    wire::{SnapshotCodec, TableType, WireCodec},
};

/// Everything but the id, which the receiving catalog assigns.
fn assert_same_table(sent: &Table, received: &Table) {
    let mut sent = sent.to_wire().unwrap();
    let mut received = received.to_wire().unwrap();
    sent.id = 0;
    received.id = 0;

    assert_eq!(sent, received);
}

#[test]
fn partitioned_tables_survive_the_wire() {
    let fixture = Fixture::new();
    let authority = fixture.catalog(InitStrategy::Lazy);

    for db in ["functional", "functional_avro", "functional_parquet"] {
        let table = authority.get_table(db, "alltypes").unwrap();
        let wire = table.to_wire().unwrap();

        assert_eq!(wire.table_type, Some(TableType::Hdfs));
        assert!(wire.hbase_table.is_none());
        assert_eq!(wire.partition_columns.len(), 2);

        let hdfs = wire.hdfs_table.as_ref().unwrap();
        assert_eq!(hdfs.partitions.len(), PARTITIONS_PER_TABLE + 1);
        let default = &hdfs.partitions[&DEFAULT_PARTITION_ID];
        assert!(default.partition_key_exprs.is_empty());
        assert!(default.file_descriptors.is_empty());
        for partition in hdfs.partitions.values().filter(|p| !p.file_descriptors.is_empty()) {
            assert_eq!(partition.partition_key_exprs.len(), 2);
        }

        let received = codec::decode(&wire, 100).unwrap();
        assert_eq!(received.id(), 100);
        assert_eq!(received.name(), "alltypes");
        assert_eq!(
            received.as_hdfs().unwrap().partitions().partition_count(),
            PARTITIONS_PER_TABLE + 1
        );
        assert_same_table(&table, &received);
    }

    let functional = authority.get_table("functional", "alltypes").unwrap();
    assert_eq!(functional.to_wire().unwrap().num_rows, 7300);
    let avro = authority.get_table("functional_avro", "alltypes").unwrap();
    assert_eq!(avro.to_wire().unwrap().num_rows, UNKNOWN_ROW_COUNT);
    assert_eq!(
        codec::decode(&avro.to_wire().unwrap(), 1).unwrap().num_rows(),
        None
    );
}

#[test]
fn views_carry_no_section() {
    let fixture = Fixture::new();
    let authority = fixture.catalog(InitStrategy::Lazy);

    let view = authority.get_table("functional", "view_view").unwrap();
    let wire = view.to_wire().unwrap();
    assert_eq!(wire.table_type, None);
    assert!(wire.hdfs_table.is_none() && wire.hbase_table.is_none());
    assert!(wire.load_error.is_none());

    let received = codec::decode(&wire, 1).unwrap();
    assert!(matches!(received.kind(), TableKind::View(_)));
    assert_eq!(
        received.as_view().unwrap().original_text(),
        Some("SELECT * FROM alltypes_view")
    );
}

#[test]
fn failed_tables_survive_the_wire() {
    let fixture = Fixture::new();
    let authority = fixture.catalog(InitStrategy::Lazy);

    let failed = authority.get_table("functional", "hive_index_tbl").unwrap();
    let wire = failed.to_wire().unwrap();
    assert_eq!(wire.table_type, None);
    assert!(!wire.has_physical_section());
    let message = wire.load_error.clone().unwrap();
    assert_eq!(message, failed.load_error().unwrap().to_string());

    let peer = fixture.catalog(InitStrategy::Empty);
    let received = peer.install_wire_table(&wire).unwrap();
    assert!(matches!(
        received.load_error().map(|e| &**e),
        Some(LoadError::Remote { message: m }) if *m == message
    ));
    assert!(matches!(
        peer.load_table("functional", "hive_index_tbl"),
        Err(Error::TableLoading { .. })
    ));
}

#[test]
fn snapshot_to_peer() {
    let fixture = Fixture::new();
    let authority = fixture.catalog(InitStrategy::Immediate);

    let tables = authority.to_wire_tables().unwrap();
    assert_eq!(tables.len(), 8);
    assert_eq!(
        tables.iter().filter(|t| t.load_error.is_some()).count(),
        1
    );

    let bytes = SnapshotCodec.encode(&tables).unwrap();
    let (decoded, read) = SnapshotCodec.decode(&bytes).unwrap();
    assert_eq!(read, bytes.len());
    assert_eq!(decoded, tables);

    let peer = fixture.catalog(InitStrategy::Empty);
    for wire in &decoded {
        peer.install_wire_table(wire).unwrap();
    }
    assert_eq!(peer.db_names(), authority.db_names());

    for db in authority.db_names() {
        for name in authority.get_db(&db).unwrap().table_names() {
            let sent = authority.get_table(&db, &name).unwrap();
            let received = peer.get_table(&db, &name).unwrap();
            assert_same_table(&sent, &received);
        }
    }
}

#[test]
fn inconsistent_structs_are_rejected() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog(InitStrategy::Lazy);
    let table = catalog.get_table("functional_hbase", "alltypes").unwrap();

    let mut wire = table.to_wire().unwrap();
    wire.hbase_table.as_mut().unwrap().qualifiers.pop();
    assert!(matches!(
        catalog.table_from_wire(&wire),
        Err(Error::Decode { .. })
    ));

    let mut wire = table.to_wire().unwrap();
    wire.table_type = Some(TableType::Hdfs);
    wire.hdfs_table = catalog
        .get_table("functional", "alltypes")
        .unwrap()
        .to_wire()
        .unwrap()
        .hdfs_table;
    wire.hbase_table = None;
    assert!(catalog.table_from_wire(&wire).is_err());

    // a descriptor that cannot be classified must come with an error
    let index = catalog.get_table("functional", "hive_index_tbl").unwrap();
    let mut wire = index.to_wire().unwrap();
    wire.load_error = None;
    assert!(matches!(
        codec::decode(&wire, 1),
        Err(codec::DecodeError::Skeleton { .. })
    ));
}

fn random_catalog(seed: u64) -> (Fixture, Catalog) {
    let fixture = Fixture::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let base_dir = "/test-warehouse/generated";

    fixture.metastore.create_table(hdfs_descriptor(
        "generated",
        "events",
        base_dir,
        FileFormat::Parquet,
        vec![
            FieldSchema::new("day", "string"),
            FieldSchema::new("bucket", "smallint"),
            FieldSchema::new("valid", "boolean"),
        ],
    ));

    for i in 0..rng.gen_range(1..40) {
        let values = vec![
            format!("2024-01-{:02}", i % 28 + 1),
            rng.gen_range(-100..100).to_string(),
            rng.gen_bool(0.5).to_string(),
        ];
        let location = format!("{}/p{}", base_dir, i);

        for f in 0..rng.gen_range(1..4) {
            let mut file = data_file(&format!("part-{}", f), rng.gen_range(1..1 << 20));
            for b in 1..rng.gen_range(1..3) {
                file.add_block(FileBlock::new(b * 1024, 1024, vec![format!("host{}", b)]));
            }
            fixture.fs.add_file(&location, file);
        }

        let input_format = rng
            .gen_bool(0.2)
            .then(|| FileFormat::Text.input_format().to_string());
        fixture
            .metastore
            .add_partition(
                "generated",
                "events",
                RawPartition {
                    values,
                    location,
                    input_format,
                    ..Default::default()
                },
            )
            .unwrap();
    }

    let catalog = fixture.catalog(InitStrategy::Lazy);
    (fixture, catalog)
}

#[test]
fn generated_layouts_survive_the_wire() {
    for seed in 0..8 {
        let (_fixture, catalog) = random_catalog(seed);
        let table = catalog.get_table("generated", "events").unwrap();
        assert!(table.load_error().is_none(), "seed {}", seed);

        let bytes = WireCodec.encode(&table.to_wire().unwrap()).unwrap();
        let (wire, _) = WireCodec.decode(&bytes).unwrap();
        let received = catalog.table_from_wire(&wire).unwrap();

        assert_ne!(received.id(), table.id());
        assert_eq!(received.num_clustering_cols(), 3);
        assert_eq!(
            received.as_hdfs().unwrap().partitions().total_size(),
            table.as_hdfs().unwrap().partitions().total_size()
        );
        assert_same_table(&table, &received);
    }
}
