//! The structs catalog state is distributed in, and their byte encoding.

pub mod codec;
mod error;

pub use {
    codec::{SnapshotCodec, WireCodec, WIRE_FORMAT_VERSION},
    error::{Error, Result},
};
use {
    common::pub_fields_struct,
    def::{
        Column, FileDescriptor, FileFormat, LiteralExpr, PartitionId, RawDescriptor, TableId,
        UNKNOWN_ROW_COUNT,
    },
    std::{collections::BTreeMap, fmt::Display},
};

/// Selects which physical section of a [`WireTable`] is populated. Absent
/// for views and for tables that failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TableType {
    Hdfs = 1,
    HBase = 2,
}

impl Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Hdfs => "HDFS_TABLE",
                Self::HBase => "HBASE_TABLE",
            }
        )
    }
}

pub_fields_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct WirePartition {
        location: String,
        file_format: FileFormat,
        partition_key_exprs: Vec<LiteralExpr>,
        file_descriptors: Vec<FileDescriptor>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct WireHdfsTable {
        hdfs_base_dir: String,
        file_format: FileFormat,
        /// Includes the default partition.
        partitions: BTreeMap<PartitionId, WirePartition>,
    }

    /// One entry per non-clustering column, in column order.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct WireHBaseTable {
        table_name: String,
        families: Vec<String>,
        qualifiers: Vec<String>,
        binary_encoded: Vec<bool>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct WireTable {
        id: TableId,
        tbl_name: String,
        db_name: String,
        table_type: Option<TableType>,
        metastore_table: RawDescriptor,
        /// The clustering columns.
        partition_columns: Vec<Column>,
        /// The remaining columns.
        columns: Vec<Column>,
        num_rows: i64,
        /// Set only for tables that failed to load.
        load_error: Option<String>,
        hdfs_table: Option<WireHdfsTable>,
        hbase_table: Option<WireHBaseTable>,
    }
}

impl WireTable {
    /// A table with only the shared fields set.
    pub fn new(
        id: TableId,
        db_name: impl Into<String>,
        tbl_name: impl Into<String>,
        metastore_table: RawDescriptor,
    ) -> Self {
        Self {
            id,
            tbl_name: tbl_name.into(),
            db_name: db_name.into(),
            table_type: None,
            metastore_table,
            partition_columns: vec![],
            columns: vec![],
            num_rows: UNKNOWN_ROW_COUNT,
            load_error: None,
            hdfs_table: None,
            hbase_table: None,
        }
    }

    pub fn num_clustering_cols(&self) -> usize {
        self.partition_columns.len()
    }

    pub fn has_physical_section(&self) -> bool {
        self.hdfs_table.is_some() || self.hbase_table.is_some()
    }
}
