use {
    crate::{
        error::{
            ClusteringMismatchSnafu, FetchPartitionsSnafu, InvalidPartitionSnafu, ListFilesSnafu,
            LoadError, PartitionFormatSnafu, PartitionValueSnafu,
        },
        loader::{DirectoryLister, MetastoreClient},
        partition::PartitionRegistry,
    },
    def::{Column, FileDescriptor, FileFormat, LiteralExpr, RawPartition},
    log::{debug, warn},
    snafu::prelude::*,
};

/// A table whose data lives in partition directories under a base directory.
#[derive(Debug, Clone, PartialEq)]
pub struct HdfsTable {
    base_dir: String,
    file_format: FileFormat,
    partitions: PartitionRegistry,
}

impl HdfsTable {
    pub(crate) fn new(base_dir: &str, file_format: FileFormat, num_clustering_cols: usize) -> Self {
        Self {
            base_dir: base_dir.to_string(),
            file_format,
            partitions: PartitionRegistry::new(num_clustering_cols, base_dir, file_format),
        }
    }

    pub(crate) fn from_parts(
        base_dir: String,
        file_format: FileFormat,
        partitions: PartitionRegistry,
    ) -> Self {
        Self {
            base_dir,
            file_format,
            partitions,
        }
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    pub fn partitions(&self) -> &PartitionRegistry {
        &self.partitions
    }

    pub fn partitions_mut(&mut self) -> &mut PartitionRegistry {
        &mut self.partitions
    }

    pub(crate) fn load(
        &mut self,
        db: &str,
        table: &str,
        clustering_cols: &[Column],
        metastore: &dyn MetastoreClient,
        lister: &dyn DirectoryLister,
    ) -> Result<(), LoadError> {
        let mut registry =
            PartitionRegistry::new(clustering_cols.len(), &self.base_dir, self.file_format);

        if clustering_cols.is_empty() {
            let files = self.list_files(lister, &self.base_dir)?;
            if files.is_empty() {
                debug!("{}.{} has no data files", db, table);
            } else {
                let id = registry.next_partition_id().context(InvalidPartitionSnafu)?;
                registry
                    .add_partition(id, vec![], self.base_dir.clone(), self.file_format, files)
                    .context(InvalidPartitionSnafu)?;
            }
        } else {
            let raw_partitions = metastore
                .list_partitions(db, table)
                .context(FetchPartitionsSnafu)?;

            for raw in raw_partitions {
                let key_values = parse_key_values(&raw, clustering_cols)?;
                let location = if raw.location.is_empty() {
                    default_location(&self.base_dir, clustering_cols, &raw.values)
                } else {
                    raw.location.clone()
                };
                let file_format = match &raw.input_format {
                    Some(input_format) => FileFormat::from_input_format(input_format).context(
                        PartitionFormatSnafu {
                            path: &location,
                            input_format,
                        },
                    )?,
                    None => self.file_format,
                };

                let files = self.list_files(lister, &location)?;
                if files.is_empty() {
                    warn!(
                        "skipping partition {} of {}.{}: no data files",
                        location, db, table
                    );
                    continue;
                }

                let id = registry.next_partition_id().context(InvalidPartitionSnafu)?;
                registry
                    .add_partition(id, key_values, location, file_format, files)
                    .context(InvalidPartitionSnafu)?;
            }
        }

        debug!(
            "loaded {} partitions of {}.{}",
            registry.partition_count(),
            db,
            table
        );
        self.partitions = registry;

        Ok(())
    }

    fn list_files(
        &self,
        lister: &dyn DirectoryLister,
        location: &str,
    ) -> Result<Vec<FileDescriptor>, LoadError> {
        let mut files = lister
            .list_files(&self.base_dir, location)
            .context(ListFilesSnafu { path: location })?;

        // zero-length files carry no blocks
        files.retain(|fd| !fd.blocks.is_empty());

        Ok(files)
    }
}

fn parse_key_values(
    raw: &RawPartition,
    clustering_cols: &[Column],
) -> Result<Vec<LiteralExpr>, LoadError> {
    ensure!(
        raw.values.len() == clustering_cols.len(),
        ClusteringMismatchSnafu {
            values: raw.values.clone(),
            expected: clustering_cols.len(),
        }
    );

    raw.values
        .iter()
        .zip(clustering_cols)
        .map(|(value, col)| LiteralExpr::parse(value, col.column_type))
        .collect::<Result<Vec<_>, _>>()
        .context(PartitionValueSnafu {
            values: raw.values.clone(),
        })
}

/// `<base>/<key>=<value>/...`, the layout Hive writes partitions in.
fn default_location(base_dir: &str, clustering_cols: &[Column], values: &[String]) -> String {
    clustering_cols
        .iter()
        .zip(values)
        .fold(base_dir.trim_end_matches('/').to_string(), |path, (col, value)| {
            format!("{}/{}={}", path, col.name, value)
        })
}
