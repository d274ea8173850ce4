pub mod codec;
pub mod column;
pub mod expr;
pub mod layout;
pub mod metastore;
pub mod types;

pub use {
    column::Column,
    expr::LiteralExpr,
    layout::{FileBlock, FileDescriptor, FileFormat},
    metastore::{FieldSchema, RawDescriptor, RawPartition, StorageDescriptor},
    types::PrimitiveType,
};

pub type TableId = u64;
pub type PartitionId = i64;

/// Id of the partition holding table-wide (unpartitioned) state. Every
/// file-partitioned table has exactly one.
pub const DEFAULT_PARTITION_ID: PartitionId = -1;

/// Wire value of a row count that has never been computed.
pub const UNKNOWN_ROW_COUNT: i64 = -1;

pub fn encode_row_count(num_rows: Option<u64>) -> i64 {
    match num_rows {
        Some(n) => i64::try_from(n).unwrap_or(i64::MAX),
        None => UNKNOWN_ROW_COUNT,
    }
}

/// Any negative value reads back as unknown; `0` stays a known, empty table.
pub fn decode_row_count(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok()
}
