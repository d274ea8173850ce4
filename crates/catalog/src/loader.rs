//! Interfaces to the systems tables are loaded from.

use {
    common::pub_fields_struct,
    def::{FileDescriptor, RawDescriptor, RawPartition},
    snafu::prelude::*,
    std::{io, sync::Arc},
};

pub use crate::table::ColumnMapping;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetastoreError {
    #[snafu(display(r#"database "{}" not found in the metastore"#, name))]
    DatabaseNotFound { name: String },

    #[snafu(display(r#"table "{}.{}" not found in the metastore"#, db, name))]
    TableNotFound { db: String, name: String },

    #[snafu(display("metastore request failed: {}", source))]
    Io { source: io::Error },
}

impl MetastoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DatabaseNotFound { .. } | Self::TableNotFound { .. }
        )
    }
}

pub trait MetastoreClient: Send + Sync {
    fn list_databases(&self) -> Result<Vec<String>, MetastoreError>;

    fn list_tables(&self, db: &str) -> Result<Vec<String>, MetastoreError>;

    fn fetch_raw_descriptor(&self, db: &str, name: &str) -> Result<RawDescriptor, MetastoreError>;

    fn list_partitions(&self, db: &str, name: &str) -> Result<Vec<RawPartition>, MetastoreError>;

    /// Releases connections; called once when the catalog shuts down.
    fn close(&self) {}
}

pub trait DirectoryLister: Send + Sync {
    /// Lists the data files of one partition directory together with their
    /// block locations.
    fn list_files(&self, base_dir: &str, partition_path: &str) -> io::Result<Vec<FileDescriptor>>;
}

pub_fields_struct! {
    /// Identifies a wide-column table and carries the mapping declared for it
    /// in the metastore.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct HBaseTableRef {
        db: String,
        table: String,
        hbase_table_name: String,
        columns_mapping: String,
        default_binary: bool,
    }
}

pub trait ColumnMappingResolver: Send + Sync {
    /// Returns one entry per non-key column, in declaration order.
    fn describe_column_mapping(&self, table: &HBaseTableRef) -> io::Result<Vec<ColumnMapping>>;
}

pub_fields_struct! {
    #[derive(Clone)]
    struct Collaborators {
        metastore: Arc<dyn MetastoreClient>,
        directory_lister: Arc<dyn DirectoryLister>,
        column_mapping_resolver: Arc<dyn ColumnMappingResolver>,
    }
}

impl Collaborators {
    pub fn new(
        metastore: Arc<dyn MetastoreClient>,
        directory_lister: Arc<dyn DirectoryLister>,
        column_mapping_resolver: Arc<dyn ColumnMappingResolver>,
    ) -> Self {
        Self {
            metastore,
            directory_lister,
            column_mapping_resolver,
        }
    }
}
