use {
    def::{FileDescriptor, FileFormat, LiteralExpr, PartitionId, DEFAULT_PARTITION_ID},
    snafu::{prelude::*, Backtrace},
    std::collections::BTreeMap,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PartitionError {
    #[snafu(display(
        "partition {} has {} key values but the table has {} clustering columns",
        id,
        actual,
        expected
    ))]
    KeyCount {
        id: PartitionId,
        expected: usize,
        actual: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("partition id {} is reserved for the default partition", id))]
    ReservedId { id: PartitionId, backtrace: Backtrace },

    #[snafu(display("partition id {} is out of range", id))]
    IdOutOfRange { id: PartitionId, backtrace: Backtrace },

    #[snafu(display("no partition ids left"))]
    IdsExhausted { backtrace: Backtrace },

    #[snafu(display("partition {} already exists", id))]
    DuplicateId { id: PartitionId, backtrace: Backtrace },

    #[snafu(display("partition {} does not exist", id))]
    PartitionNotFound { id: PartitionId, backtrace: Backtrace },

    #[snafu(display("partition {} has no data files", id))]
    NoFiles { id: PartitionId, backtrace: Backtrace },

    #[snafu(display("file {} of partition {} has no blocks", path, id))]
    NoBlocks {
        id: PartitionId,
        path: String,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, PartitionError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    id: PartitionId,
    key_values: Vec<LiteralExpr>,
    location: String,
    file_format: FileFormat,
    file_descriptors: Vec<FileDescriptor>,
}

impl Partition {
    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// One literal per clustering column; empty for the default partition.
    pub fn key_values(&self) -> &[LiteralExpr] {
        &self.key_values
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    pub fn file_descriptors(&self) -> &[FileDescriptor] {
        &self.file_descriptors
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PARTITION_ID
    }

    pub fn total_size(&self) -> u64 {
        self.file_descriptors.iter().map(|fd| fd.length).sum()
    }
}

/// The partitions of one file-partitioned table, keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionRegistry {
    num_clustering_cols: usize,
    partitions: BTreeMap<PartitionId, Partition>,
    next_id: PartitionId,
}

impl PartitionRegistry {
    /// Creates a registry holding only the default partition, located at the
    /// table's base directory.
    pub fn new(num_clustering_cols: usize, base_dir: &str, file_format: FileFormat) -> Self {
        let default = Partition {
            id: DEFAULT_PARTITION_ID,
            key_values: vec![],
            location: base_dir.to_string(),
            file_format,
            file_descriptors: vec![],
        };

        Self {
            num_clustering_cols,
            partitions: BTreeMap::from([(DEFAULT_PARTITION_ID, default)]),
            next_id: 0,
        }
    }

    pub fn num_clustering_cols(&self) -> usize {
        self.num_clustering_cols
    }

    pub fn add_partition(
        &mut self,
        id: PartitionId,
        key_values: Vec<LiteralExpr>,
        location: String,
        file_format: FileFormat,
        file_descriptors: Vec<FileDescriptor>,
    ) -> Result<&Partition> {
        ensure!(id != DEFAULT_PARTITION_ID, ReservedIdSnafu { id });
        ensure!((0..PartitionId::MAX).contains(&id), IdOutOfRangeSnafu { id });
        ensure!(!self.partitions.contains_key(&id), DuplicateIdSnafu { id });
        ensure!(
            key_values.len() == self.num_clustering_cols,
            KeyCountSnafu {
                id,
                expected: self.num_clustering_cols,
                actual: key_values.len(),
            }
        );
        ensure!(!file_descriptors.is_empty(), NoFilesSnafu { id });
        if let Some(fd) = file_descriptors.iter().find(|fd| fd.blocks.is_empty()) {
            return NoBlocksSnafu {
                id,
                path: &fd.path,
            }
            .fail();
        }

        self.next_id = self.next_id.max(id + 1);

        Ok(self.partitions.entry(id).or_insert(Partition {
            id,
            key_values,
            location,
            file_format,
            file_descriptors,
        }))
    }

    /// Hands out an id no partition of this table uses yet.
    pub fn next_partition_id(&mut self) -> Result<PartitionId> {
        ensure!(self.next_id < PartitionId::MAX, IdsExhaustedSnafu);
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    pub fn get_partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(&id)
    }

    pub fn default_partition(&self) -> &Partition {
        &self.partitions[&DEFAULT_PARTITION_ID]
    }

    pub fn remove_partition(&mut self, id: PartitionId) -> Result<Partition> {
        ensure!(id != DEFAULT_PARTITION_ID, ReservedIdSnafu { id });
        self.partitions
            .remove(&id)
            .context(PartitionNotFoundSnafu { id })
    }

    /// Every partition including the default one. Callers must not rely on
    /// the iteration order.
    pub fn all_partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn total_size(&self) -> u64 {
        self.all_partitions().map(Partition::total_size).sum()
    }
}
