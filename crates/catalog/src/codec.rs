//! Conversion between tables and their wire structs.

use {
    crate::{
        error::LoadError,
        partition::{PartitionError, PartitionRegistry},
        table::{ColumnMapping, HBaseTable, HdfsTable, Table, TableKind},
    },
    def::{decode_row_count, encode_row_count, TableId, DEFAULT_PARTITION_ID},
    snafu::{prelude::*, Backtrace},
    std::sync::Arc,
    wire::{TableType, WireHBaseTable, WireHdfsTable, WirePartition, WireTable},
};

/// Raised only when a table breaks its own invariants.
#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display("the default partition is missing"))]
    EncodeMissingDefaultPartition { backtrace: Backtrace },

    #[snafu(display(
        "{} column mappings for {} non-clustering columns",
        mappings,
        columns
    ))]
    MappingCount {
        mappings: usize,
        columns: usize,
        backtrace: Backtrace,
    },
}

#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("cannot classify the descriptor of {}.{}: {}", db, name, source))]
    Skeleton {
        db: String,
        name: String,
        source: LoadError,
    },

    #[snafu(display(
        "wire struct is named {} but its descriptor classifies as {}",
        wire_name,
        name
    ))]
    NameMismatch {
        wire_name: String,
        name: String,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "descriptor classifies as {} but the wire type is {:?}",
        kind,
        table_type
    ))]
    VariantMismatch {
        kind: &'static str,
        table_type: Option<TableType>,
        backtrace: Backtrace,
    },

    #[snafu(display("{} table is missing its {} section", kind, section))]
    MissingSection {
        kind: &'static str,
        section: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("{} table carries a {} section", kind, section))]
    UnexpectedSection {
        kind: &'static str,
        section: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "{} partition columns on the wire, the descriptor has {}",
        actual,
        expected
    ))]
    ClusteringCount {
        expected: usize,
        actual: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("the default partition is missing or carries data"))]
    DecodeDefaultPartition { backtrace: Backtrace },

    #[snafu(display("{}", source))]
    DecodePartition {
        #[snafu(backtrace)]
        source: PartitionError,
    },

    #[snafu(display(
        "{} families, {} qualifiers and {} encoding flags for {} columns",
        families,
        qualifiers,
        flags,
        columns
    ))]
    ParallelArrays {
        families: usize,
        qualifiers: usize,
        flags: usize,
        columns: usize,
        backtrace: Backtrace,
    },
}

pub fn encode(table: &Table) -> Result<WireTable, EncodeError> {
    table.to_wire()
}

/// Rebuilds a table from its wire struct under a new id: first the variant
/// skeleton from the embedded descriptor, then its physical state.
pub fn decode(wire: &WireTable, id: TableId) -> Result<Table, DecodeError> {
    if let Some(message) = &wire.load_error {
        ensure!(
            wire.table_type.is_none(),
            VariantMismatchSnafu {
                kind: "FAILED",
                table_type: wire.table_type,
            }
        );
        ensure!(
            !wire.has_physical_section(),
            UnexpectedSectionSnafu {
                kind: "FAILED",
                section: section_name(wire),
            }
        );

        return Ok(Table::failed(
            id,
            &wire.db_name,
            &wire.tbl_name,
            wire.metastore_table.clone(),
            Arc::new(LoadError::Remote {
                message: message.clone(),
            }),
        ));
    }

    let mut table =
        Table::from_metastore_descriptor(id, &wire.db_name, wire.metastore_table.clone())
            .context(SkeletonSnafu {
                db: &wire.db_name,
                name: &wire.tbl_name,
            })?;
    table.load_from_wire(wire)?;

    Ok(table)
}

impl Table {
    pub fn to_wire(&self) -> Result<WireTable, EncodeError> {
        let mut wire = WireTable::new(self.id, &self.db_name, &self.name, self.descriptor.clone());
        wire.partition_columns = self.clustering_columns().to_vec();
        wire.columns = self.non_clustering_columns().to_vec();
        wire.num_rows = encode_row_count(self.num_rows);

        match &self.kind {
            TableKind::FilePartitioned(hdfs) => {
                wire.table_type = Some(TableType::Hdfs);
                wire.hdfs_table = Some(hdfs_to_wire(hdfs)?);
            }
            TableKind::WideColumn(hbase) => {
                wire.table_type = Some(TableType::HBase);
                wire.hbase_table = Some(hbase_to_wire(hbase, self.non_clustering_columns().len())?);
            }
            TableKind::View(_) => {}
            TableKind::Failed(failed) => wire.load_error = Some(failed.error().to_string()),
        }

        Ok(wire)
    }

    /// Populates a skeleton built from `wire.metastore_table`. Nothing is
    /// changed unless the whole struct is consistent.
    pub fn load_from_wire(&mut self, wire: &WireTable) -> Result<(), DecodeError> {
        ensure!(
            wire.tbl_name == self.name,
            NameMismatchSnafu {
                wire_name: &wire.tbl_name,
                name: &self.name,
            }
        );
        ensure!(
            wire.num_clustering_cols() == self.num_clustering_cols,
            ClusteringCountSnafu {
                expected: self.num_clustering_cols,
                actual: wire.num_clustering_cols(),
            }
        );

        let kind = match (&self.kind, wire.table_type) {
            (TableKind::FilePartitioned(_), Some(TableType::Hdfs)) => {
                let kind = self.kind.name();
                ensure!(
                    wire.hbase_table.is_none(),
                    UnexpectedSectionSnafu {
                        kind,
                        section: "hbase_table",
                    }
                );
                let section = wire.hdfs_table.as_ref().context(MissingSectionSnafu {
                    kind,
                    section: "hdfs_table",
                })?;

                TableKind::FilePartitioned(hdfs_from_wire(section, self.num_clustering_cols)?)
            }
            (TableKind::WideColumn(skeleton), Some(TableType::HBase)) => {
                let kind = self.kind.name();
                ensure!(
                    wire.hdfs_table.is_none(),
                    UnexpectedSectionSnafu {
                        kind,
                        section: "hdfs_table",
                    }
                );
                let section = wire.hbase_table.as_ref().context(MissingSectionSnafu {
                    kind,
                    section: "hbase_table",
                })?;

                TableKind::WideColumn(hbase_from_wire(skeleton, section, wire.columns.len())?)
            }
            (TableKind::View(view), None) => {
                ensure!(
                    !wire.has_physical_section(),
                    UnexpectedSectionSnafu {
                        kind: self.kind.name(),
                        section: section_name(wire),
                    }
                );

                TableKind::View(view.clone())
            }
            (kind, table_type) => {
                return VariantMismatchSnafu {
                    kind: kind.name(),
                    table_type,
                }
                .fail()
            }
        };

        self.columns = wire
            .partition_columns
            .iter()
            .chain(&wire.columns)
            .cloned()
            .collect();
        self.num_rows = decode_row_count(wire.num_rows);
        self.kind = kind;

        Ok(())
    }
}

fn section_name(wire: &WireTable) -> &'static str {
    match (&wire.hdfs_table, &wire.hbase_table) {
        (Some(_), _) => "hdfs_table",
        (_, Some(_)) => "hbase_table",
        _ => "no",
    }
}

fn hdfs_to_wire(hdfs: &HdfsTable) -> Result<WireHdfsTable, EncodeError> {
    let registry = hdfs.partitions();
    ensure!(
        registry.get_partition(DEFAULT_PARTITION_ID).is_some(),
        EncodeMissingDefaultPartitionSnafu
    );

    let partitions = registry
        .all_partitions()
        .map(|p| {
            (
                p.id(),
                WirePartition {
                    location: p.location().to_string(),
                    file_format: p.file_format(),
                    partition_key_exprs: p.key_values().to_vec(),
                    file_descriptors: p.file_descriptors().to_vec(),
                },
            )
        })
        .collect();

    Ok(WireHdfsTable {
        hdfs_base_dir: hdfs.base_dir().to_string(),
        file_format: hdfs.file_format(),
        partitions,
    })
}

fn hdfs_from_wire(
    section: &WireHdfsTable,
    num_clustering_cols: usize,
) -> Result<HdfsTable, DecodeError> {
    let default = section
        .partitions
        .get(&DEFAULT_PARTITION_ID)
        .context(DecodeDefaultPartitionSnafu)?;
    ensure!(
        default.partition_key_exprs.is_empty() && default.file_descriptors.is_empty(),
        DecodeDefaultPartitionSnafu
    );

    let mut registry = PartitionRegistry::new(
        num_clustering_cols,
        &section.hdfs_base_dir,
        section.file_format,
    );
    for (id, partition) in section
        .partitions
        .iter()
        .filter(|(id, _)| **id != DEFAULT_PARTITION_ID)
    {
        registry
            .add_partition(
                *id,
                partition.partition_key_exprs.clone(),
                partition.location.clone(),
                partition.file_format,
                partition.file_descriptors.clone(),
            )
            .context(DecodePartitionSnafu)?;
    }

    Ok(HdfsTable::from_parts(
        section.hdfs_base_dir.clone(),
        section.file_format,
        registry,
    ))
}

fn hbase_to_wire(hbase: &HBaseTable, num_columns: usize) -> Result<WireHBaseTable, EncodeError> {
    let mappings = hbase.mappings();
    ensure!(
        mappings.len() == num_columns,
        MappingCountSnafu {
            mappings: mappings.len(),
            columns: num_columns,
        }
    );

    Ok(WireHBaseTable {
        table_name: hbase.table_name().to_string(),
        families: mappings.iter().map(|m| m.family.clone()).collect(),
        qualifiers: mappings.iter().map(|m| m.qualifier.clone()).collect(),
        binary_encoded: mappings.iter().map(|m| m.binary_encoded).collect(),
    })
}

fn hbase_from_wire(
    skeleton: &HBaseTable,
    section: &WireHBaseTable,
    num_columns: usize,
) -> Result<HBaseTable, DecodeError> {
    let WireHBaseTable {
        table_name,
        families,
        qualifiers,
        binary_encoded,
    } = section;
    ensure!(
        families.len() == num_columns
            && qualifiers.len() == num_columns
            && binary_encoded.len() == num_columns,
        ParallelArraysSnafu {
            families: families.len(),
            qualifiers: qualifiers.len(),
            flags: binary_encoded.len(),
            columns: num_columns,
        }
    );

    let mappings = families
        .iter()
        .zip(qualifiers)
        .zip(binary_encoded)
        .map(|((family, qualifier), binary)| ColumnMapping::new(family, qualifier, *binary))
        .collect();

    Ok(skeleton.with_mappings(table_name.clone(), mappings))
}
