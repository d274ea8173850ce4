use {
    catalog::{
        memory::{MemoryColumnMappingResolver, MemoryFileSystem, MemoryMetastore},
        Catalog, CatalogConfig, Collaborators, InitStrategy,
    },
    def::{
        metastore::{self, params},
        FieldSchema, FileBlock, FileDescriptor, FileFormat, RawDescriptor, RawPartition,
    },
    std::sync::Arc,
};

pub const YEARS: [u32; 2] = [2009, 2010];
pub const PARTITIONS_PER_TABLE: usize = 24;

const HBASE_MAPPING: &str = ":key,d:bool_col,d:tinyint_col,d:smallint_col,d:int_col,\
    d:bigint_col,d:float_col,d:double_col,d:date_string_col,d:string_col,\
    d:timestamp_col,d:year,d:month";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The data columns of every `alltypes` variant.
pub fn alltypes_columns() -> Vec<FieldSchema> {
    [
        ("id", "int"),
        ("bool_col", "boolean"),
        ("tinyint_col", "tinyint"),
        ("smallint_col", "smallint"),
        ("int_col", "int"),
        ("bigint_col", "bigint"),
        ("float_col", "float"),
        ("double_col", "double"),
        ("date_string_col", "string"),
        ("string_col", "string"),
        ("timestamp_col", "timestamp"),
    ]
    .into_iter()
    .map(|(name, ty)| FieldSchema::new(name, ty))
    .collect()
}

pub fn data_file(name: &str, length: u64) -> FileDescriptor {
    FileDescriptor::new(name, length, 1_300_000_000).with_blocks(vec![FileBlock::new(
        0,
        length,
        vec!["host1".to_string(), "host2".to_string()],
    )])
}

pub fn hdfs_descriptor(
    db: &str,
    name: &str,
    location: &str,
    format: FileFormat,
    partition_keys: Vec<FieldSchema>,
) -> RawDescriptor {
    let mut desc = RawDescriptor::placeholder(db, name);
    desc.owner = "impala".to_string();
    desc.table_type = metastore::EXTERNAL_TABLE.to_string();
    desc.storage.location = location.to_string();
    desc.storage.input_format = format.input_format().to_string();
    desc.storage.columns = alltypes_columns();
    desc.partition_keys = partition_keys;
    desc
}

/// The functional test databases, served from memory.
pub struct Fixture {
    pub metastore: Arc<MemoryMetastore>,
    pub fs: Arc<MemoryFileSystem>,
    pub resolver: Arc<MemoryColumnMappingResolver>,
}

impl Fixture {
    pub fn new() -> Self {
        init_logger();

        let fixture = Self {
            metastore: Arc::new(MemoryMetastore::new()),
            fs: Arc::new(MemoryFileSystem::new()),
            resolver: Arc::new(MemoryColumnMappingResolver::new()),
        };

        fixture.add_partitioned_alltypes(
            "functional",
            "/test-warehouse/alltypes",
            FileFormat::Text,
            Some(7300),
        );
        fixture.add_partitioned_alltypes(
            "functional_avro",
            "/test-warehouse/alltypes_avro",
            FileFormat::Avro,
            None,
        );
        fixture.add_partitioned_alltypes(
            "functional_parquet",
            "/test-warehouse/alltypes_parquet",
            FileFormat::Parquet,
            None,
        );
        fixture.add_unpartitioned();
        fixture.add_index_table();
        fixture.add_view();
        fixture.add_hbase_table("alltypes", false);
        fixture.add_hbase_table("alltypessmallbinary", true);

        fixture
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.metastore.clone(),
            self.fs.clone(),
            self.resolver.clone(),
        )
    }

    pub fn catalog(&self, init_strategy: InitStrategy) -> Catalog {
        let config = CatalogConfig {
            init_strategy,
            ..Default::default()
        };
        Catalog::new(config, self.collaborators()).unwrap()
    }

    /// Adds one partition with a single data file. Partitions of the
    /// `functional` database rely on the default Hive layout; the others
    /// record their location explicitly.
    pub fn add_partition(&self, db: &str, table: &str, base_dir: &str, year: u32, month: u32) {
        let dir = format!("{}/year={}/month={}", base_dir, year, month);
        let file = data_file(&format!("{}{:02}.txt", year, month), 20_000 + month as u64);
        self.fs.add_file(&dir, file);

        let location = if db == "functional" {
            String::new()
        } else {
            dir
        };
        self.metastore
            .add_partition(
                db,
                table,
                RawPartition {
                    values: vec![year.to_string(), month.to_string()],
                    location,
                    ..Default::default()
                },
            )
            .unwrap();
    }

    fn add_partitioned_alltypes(
        &self,
        db: &str,
        base_dir: &str,
        format: FileFormat,
        num_rows: Option<u64>,
    ) {
        let mut desc = hdfs_descriptor(
            db,
            "alltypes",
            base_dir,
            format,
            vec![FieldSchema::new("year", "int"), FieldSchema::new("month", "int")],
        );
        if let Some(n) = num_rows {
            desc.parameters
                .insert(params::NUM_ROWS.to_string(), n.to_string());
        }
        self.metastore.create_table(desc);

        for year in YEARS {
            for month in 1..=12 {
                self.add_partition(db, "alltypes", base_dir, year, month);
            }
        }
    }

    fn add_unpartitioned(&self) {
        let base_dir = "/test-warehouse/alltypesnopart";
        self.metastore.create_table(hdfs_descriptor(
            "functional",
            "alltypesnopart",
            base_dir,
            FileFormat::Text,
            vec![],
        ));
        self.fs.add_file(base_dir, data_file("000000_0", 1024));
        // no blocks, dropped on load
        self.fs.add_file(base_dir, FileDescriptor::new("_SUCCESS", 0, 0));
    }

    fn add_index_table(&self) {
        let mut desc = hdfs_descriptor(
            "functional",
            "hive_index_tbl",
            "/test-warehouse/hive_index_tbl",
            FileFormat::Text,
            vec![],
        );
        desc.table_type = metastore::INDEX_TABLE.to_string();
        self.metastore.create_table(desc);
    }

    fn add_view(&self) {
        let mut desc = RawDescriptor::placeholder("functional", "view_view");
        desc.table_type = metastore::VIRTUAL_VIEW.to_string();
        desc.storage.columns = alltypes_columns();
        desc.view_original_text = Some("SELECT * FROM alltypes_view".to_string());
        desc.view_expanded_text = Some("SELECT * FROM functional.alltypes_view".to_string());
        self.metastore.create_table(desc);
    }

    fn add_hbase_table(&self, name: &str, binary: bool) {
        let mut desc = RawDescriptor::placeholder("functional_hbase", name);
        desc.table_type = metastore::EXTERNAL_TABLE.to_string();
        desc.storage.columns = alltypes_columns();
        desc.storage.columns.push(FieldSchema::new("year", "int"));
        desc.storage.columns.push(FieldSchema::new("month", "int"));
        desc.parameters.insert(
            params::STORAGE_HANDLER.to_string(),
            metastore::HBASE_STORAGE_HANDLER.to_string(),
        );
        desc.parameters
            .insert(params::HBASE_COLUMNS_MAPPING.to_string(), HBASE_MAPPING.to_string());
        if binary {
            desc.parameters
                .insert(params::HBASE_STORAGE_TYPE.to_string(), "binary".to_string());
        }
        self.metastore.create_table(desc);

        self.resolver
            .create_table(&format!("functional_hbase.{}", name), ["d"]);
    }
}
