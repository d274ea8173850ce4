mod failed;
mod hbase;
mod hdfs;
mod view;

pub use {
    failed::FailedTable,
    hbase::{parse_columns_mapping, ColumnMapping, HBaseTable, ParsedMapping, ROW_KEY},
    hdfs::HdfsTable,
    view::View,
};
use {
    crate::{
        error::{LoadError, UnrecognizedDescriptorSnafu, UnsupportedColumnTypeSnafu},
        loader::Collaborators,
    },
    def::{metastore, Column, FieldSchema, FileFormat, RawDescriptor, TableId},
    log::debug,
    snafu::prelude::*,
    std::sync::Arc,
};

/// The closed set of table variants.
#[derive(Debug, Clone)]
pub enum TableKind {
    FilePartitioned(HdfsTable),
    WideColumn(HBaseTable),
    View(View),
    Failed(FailedTable),
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FilePartitioned(_) => "HDFS_TABLE",
            Self::WideColumn(_) => "HBASE_TABLE",
            Self::View(_) => "VIEW",
            Self::Failed(_) => "FAILED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub(crate) id: TableId,
    pub(crate) db_name: String,
    pub(crate) name: String,
    pub(crate) descriptor: RawDescriptor,
    /// Clustering columns first.
    pub(crate) columns: Vec<Column>,
    pub(crate) num_clustering_cols: usize,
    pub(crate) num_rows: Option<u64>,
    pub(crate) kind: TableKind,
}

impl Table {
    /// Classifies a metastore descriptor and allocates the matching variant
    /// with none of its physical state loaded yet.
    ///
    /// Classification never contacts external systems, so a peer receiving a
    /// [`wire::WireTable`] can rebuild the same variant from the descriptor it
    /// carries.
    pub fn from_metastore_descriptor(
        id: TableId,
        db_name: &str,
        descriptor: RawDescriptor,
    ) -> Result<Self, LoadError> {
        let name = descriptor.tbl_name.clone();

        let (columns, num_clustering_cols, kind) = if descriptor.is_view() {
            let columns = build_columns(&descriptor.storage.columns)?;
            (columns, 0, TableKind::View(View::new(&descriptor)))
        } else if !is_physical_table_type(&descriptor.table_type) {
            return UnrecognizedDescriptorSnafu {
                table_type: &descriptor.table_type,
                input_format: &descriptor.storage.input_format,
            }
            .fail();
        } else if descriptor.is_hbase() {
            let (hbase, fields) = HBaseTable::skeleton(db_name, &descriptor)?;
            (build_columns(&fields)?, 1, TableKind::WideColumn(hbase))
        } else {
            let file_format = FileFormat::from_input_format(&descriptor.storage.input_format)
                .context(UnrecognizedDescriptorSnafu {
                    table_type: &descriptor.table_type,
                    input_format: &descriptor.storage.input_format,
                })?;

            let fields = descriptor
                .partition_keys
                .iter()
                .chain(&descriptor.storage.columns)
                .cloned()
                .collect::<Vec<_>>();
            let num_clustering_cols = descriptor.partition_keys.len();

            (
                build_columns(&fields)?,
                num_clustering_cols,
                TableKind::FilePartitioned(HdfsTable::new(
                    &descriptor.storage.location,
                    file_format,
                    num_clustering_cols,
                )),
            )
        };

        let num_rows = match kind {
            TableKind::View(_) => None,
            _ => descriptor.num_rows(),
        };

        Ok(Self {
            id,
            db_name: db_name.to_string(),
            name,
            descriptor,
            columns,
            num_clustering_cols,
            num_rows,
            kind,
        })
    }

    /// The placeholder kept in the catalog for a table that could not be loaded.
    pub fn failed(
        id: TableId,
        db_name: &str,
        name: &str,
        descriptor: RawDescriptor,
        error: Arc<LoadError>,
    ) -> Self {
        Self {
            id,
            db_name: db_name.to_string(),
            name: name.to_string(),
            descriptor,
            columns: vec![],
            num_clustering_cols: 0,
            num_rows: None,
            kind: TableKind::Failed(FailedTable::new(error)),
        }
    }

    /// Populates the physical state of a freshly classified table from the
    /// live collaborators.
    pub fn load(&mut self, collaborators: &Collaborators) -> Result<(), LoadError> {
        debug!("loading {} table {}.{}", self.kind.name(), self.db_name, self.name);

        let (clustering, rest) = self.columns.split_at(self.num_clustering_cols);
        match &mut self.kind {
            TableKind::FilePartitioned(hdfs) => hdfs.load(
                &self.db_name,
                &self.name,
                clustering,
                collaborators.metastore.as_ref(),
                collaborators.directory_lister.as_ref(),
            ),
            TableKind::WideColumn(hbase) => hbase.load(
                &self.db_name,
                &self.name,
                rest,
                collaborators.column_mapping_resolver.as_ref(),
            ),
            TableKind::View(_) | TableKind::Failed(_) => Ok(()),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.db_name, self.name)
    }

    pub fn descriptor(&self) -> &RawDescriptor {
        &self.descriptor
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks a column up ignoring case.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|col| common::name::eq(&col.name, name))
    }

    pub fn clustering_columns(&self) -> &[Column] {
        &self.columns[..self.num_clustering_cols]
    }

    pub fn non_clustering_columns(&self) -> &[Column] {
        &self.columns[self.num_clustering_cols..]
    }

    pub fn num_clustering_cols(&self) -> usize {
        self.num_clustering_cols
    }

    /// `None` when statistics were never computed.
    pub fn num_rows(&self) -> Option<u64> {
        self.num_rows
    }

    pub fn kind(&self) -> &TableKind {
        &self.kind
    }

    pub fn as_hdfs(&self) -> Option<&HdfsTable> {
        match &self.kind {
            TableKind::FilePartitioned(hdfs) => Some(hdfs),
            _ => None,
        }
    }

    pub fn as_hdfs_mut(&mut self) -> Option<&mut HdfsTable> {
        match &mut self.kind {
            TableKind::FilePartitioned(hdfs) => Some(hdfs),
            _ => None,
        }
    }

    pub fn as_hbase(&self) -> Option<&HBaseTable> {
        match &self.kind {
            TableKind::WideColumn(hbase) => Some(hbase),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&View> {
        match &self.kind {
            TableKind::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_failed(&self) -> Option<&FailedTable> {
        match &self.kind {
            TableKind::Failed(failed) => Some(failed),
            _ => None,
        }
    }

    pub fn load_error(&self) -> Option<&Arc<LoadError>> {
        self.as_failed().map(FailedTable::error)
    }
}

fn is_physical_table_type(table_type: &str) -> bool {
    matches!(table_type, metastore::MANAGED_TABLE | metastore::EXTERNAL_TABLE)
}

fn build_columns(fields: &[FieldSchema]) -> Result<Vec<Column>, LoadError> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            Column::from_field_schema(field, i as u32).context(UnsupportedColumnTypeSnafu {
                column: &field.name,
            })
        })
        .collect()
}
