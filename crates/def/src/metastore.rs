//! Raw records as handed out by the metastore, before any interpretation.

use {common::pub_fields_struct, std::collections::BTreeMap};

pub const MANAGED_TABLE: &str = "MANAGED_TABLE";
pub const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";
pub const VIRTUAL_VIEW: &str = "VIRTUAL_VIEW";
pub const INDEX_TABLE: &str = "INDEX_TABLE";

pub const HBASE_STORAGE_HANDLER: &str = "org.apache.hadoop.hive.hbase.HBaseStorageHandler";

/// Well-known table parameter keys.
pub mod params {
    pub const NUM_ROWS: &str = "numRows";
    pub const STORAGE_HANDLER: &str = "storage_handler";
    pub const HBASE_COLUMNS_MAPPING: &str = "hbase.columns.mapping";
    pub const HBASE_STORAGE_TYPE: &str = "hbase.table.default.storage.type";
    pub const HBASE_TABLE_NAME: &str = "hbase.table.name";
}

pub_fields_struct! {
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct FieldSchema {
        name: String,
        type_name: String,
        comment: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct StorageDescriptor {
        location: String,
        input_format: String,
        output_format: String,
        serde_lib: String,
        columns: Vec<FieldSchema>,
    }

    /// The metastore record a table is built from. It travels with the table
    /// on the wire so a peer can classify it without asking the metastore.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct RawDescriptor {
        db_name: String,
        tbl_name: String,
        owner: String,
        table_type: String,
        create_time: i64,
        storage: StorageDescriptor,
        partition_keys: Vec<FieldSchema>,
        parameters: BTreeMap<String, String>,
        view_original_text: Option<String>,
        view_expanded_text: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct RawPartition {
        /// One value per partition key, in key order.
        values: Vec<String>,
        location: String,
        /// Overrides the table's input format when set.
        input_format: Option<String>,
        parameters: BTreeMap<String, String>,
    }
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            comment: None,
        }
    }
}

impl RawDescriptor {
    /// Stand-in for a table whose metastore record could not be fetched.
    pub fn placeholder(db_name: impl Into<String>, tbl_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            tbl_name: tbl_name.into(),
            ..Default::default()
        }
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn is_view(&self) -> bool {
        self.table_type == VIRTUAL_VIEW
    }

    pub fn is_hbase(&self) -> bool {
        self.parameter(params::STORAGE_HANDLER) == Some(HBASE_STORAGE_HANDLER)
    }

    /// The row count recorded by the last statistics computation, if any.
    pub fn num_rows(&self) -> Option<u64> {
        self.parameter(params::NUM_ROWS)?.trim().parse().ok()
    }
}
