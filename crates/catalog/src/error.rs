use {
    crate::{
        codec::{DecodeError, EncodeError},
        loader::MetastoreError,
        partition::PartitionError,
    },
    snafu::{prelude::*, Backtrace},
    std::{io, sync::Arc},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(r#"database "{}" does not exist"#, name))]
    DatabaseNotFound { name: String, backtrace: Backtrace },

    #[snafu(display(r#"table "{}.{}" does not exist"#, db, name))]
    TableNotFound {
        db: String,
        name: String,
        backtrace: Backtrace,
    },

    /// Re-raised from a table that failed to load.
    #[snafu(display("failed to load table {}.{}: {}", db, name, source))]
    TableLoading {
        db: String,
        name: String,
        source: Arc<LoadError>,
    },

    #[snafu(display("metastore error: {}", source))]
    Metastore { source: MetastoreError },

    #[snafu(display("failed to encode table {}.{}: {}", db, name, source))]
    Encode {
        db: String,
        name: String,
        #[snafu(backtrace)]
        source: EncodeError,
    },

    #[snafu(display("failed to decode table {}.{}: {}", db, name, source))]
    Decode {
        db: String,
        name: String,
        #[snafu(backtrace)]
        source: DecodeError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a table could not be classified or populated. Captured inside a
/// failed table instead of being returned from enumerating operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LoadError {
    #[snafu(display("failed to fetch the metastore descriptor: {}", source))]
    FetchDescriptor { source: MetastoreError },

    #[snafu(display("failed to fetch partitions: {}", source))]
    FetchPartitions { source: MetastoreError },

    #[snafu(display(
        r#"unrecognized table type "{}" with input format "{}""#,
        table_type,
        input_format
    ))]
    UnrecognizedDescriptor {
        table_type: String,
        input_format: String,
        backtrace: Backtrace,
    },

    #[snafu(display(r#"column "{}": {}"#, column, source))]
    UnsupportedColumnType {
        column: String,
        #[snafu(backtrace)]
        source: def::types::Error,
    },

    #[snafu(display("partition {:?}: {}", values, source))]
    PartitionValue {
        values: Vec<String>,
        #[snafu(backtrace)]
        source: def::expr::Error,
    },

    #[snafu(display(
        "partition {:?} has {} values but the table has {} clustering columns",
        values,
        values.len(),
        expected
    ))]
    ClusteringMismatch {
        values: Vec<String>,
        expected: usize,
        backtrace: Backtrace,
    },

    #[snafu(display(r#"unknown input format "{}" for partition at {}"#, input_format, path))]
    PartitionFormat {
        path: String,
        input_format: String,
        backtrace: Backtrace,
    },

    #[snafu(display("failed to list files under {}: {}", path, source))]
    ListFiles { path: String, source: io::Error },

    #[snafu(display("{}", source))]
    InvalidPartition {
        #[snafu(backtrace)]
        source: PartitionError,
    },

    #[snafu(display("failed to describe the column mapping of {}: {}", table, source))]
    DescribeColumnMapping { table: String, source: io::Error },

    #[snafu(display("invalid column mapping: {}", details))]
    ColumnMapping { details: String, backtrace: Backtrace },

    /// A failure captured by the catalog that sent the table.
    #[snafu(display("{}", message))]
    Remote { message: String },
}
