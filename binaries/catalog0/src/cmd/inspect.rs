use {
    super::error::{self, Result},
    def::codec::Decoder,
    log::debug,
    snafu::prelude::*,
    std::{fs, path::Path},
    wire::{SnapshotCodec, WireTable},
};

/// Decodes a snapshot file and describes each table on one line.
pub fn inspect(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).context(error::ReadSnapshotSnafu { path })?;
    let (tables, read) = SnapshotCodec
        .decode(&bytes)
        .context(error::DecodeSnapshotSnafu { path })?;
    ensure!(
        read == bytes.len(),
        error::TrailingBytesSnafu {
            path,
            len: bytes.len() - read,
        }
    );
    debug!("decoded {} tables from {}", tables.len(), path.display());

    Ok(tables.iter().map(summarize).collect())
}

pub fn summarize(table: &WireTable) -> String {
    let name = format!("{}.{}", table.db_name, table.tbl_name);
    let rows = match def::decode_row_count(table.num_rows) {
        Some(n) => n.to_string(),
        None => "unknown".to_string(),
    };

    if let Some(error) = &table.load_error {
        return format!("{} FAILED: {}", name, error);
    }

    match (&table.hdfs_table, &table.hbase_table) {
        (Some(hdfs), _) => {
            let files = hdfs
                .partitions
                .values()
                .map(|p| p.file_descriptors.len())
                .sum::<usize>();
            let bytes = hdfs
                .partitions
                .values()
                .flat_map(|p| &p.file_descriptors)
                .map(|fd| fd.length)
                .sum::<u64>();

            format!(
                "{} HDFS_TABLE {} partitions={} files={} bytes={} rows={}",
                name,
                hdfs.file_format,
                hdfs.partitions.len(),
                files,
                bytes,
                rows
            )
        }
        (_, Some(hbase)) => format!(
            "{} HBASE_TABLE {} columns={} binary={} rows={}",
            name,
            hbase.table_name,
            hbase.families.len(),
            hbase.binary_encoded.iter().filter(|b| **b).count(),
            rows
        ),
        (None, None) => format!("{} VIEW columns={}", name, table.columns.len()),
    }
}
