use {
    crate::{
        error::{ColumnMappingSnafu, DescribeColumnMappingSnafu, LoadError},
        loader::{ColumnMappingResolver, HBaseTableRef},
    },
    common::pub_fields_struct,
    def::{metastore::params, Column, FieldSchema, RawDescriptor},
    log::debug,
    snafu::prelude::*,
};

/// Mapping entry of the row key column.
pub const ROW_KEY: &str = ":key";

pub_fields_struct! {
    /// Where a column lives in the wide-column store.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct ColumnMapping {
        family: String,
        qualifier: String,
        binary_encoded: bool,
    }

    /// A parsed `hbase.columns.mapping` value.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct ParsedMapping {
        /// Position of `:key` among the declared columns.
        key_index: usize,
        /// The other columns, in declaration order.
        columns: Vec<ColumnMapping>,
    }
}

impl ColumnMapping {
    pub fn new(family: impl Into<String>, qualifier: impl Into<String>, binary_encoded: bool) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            binary_encoded,
        }
    }
}

/// Parses a mapping such as `:key,d:bool_col#b,d:string_col`.
///
/// A `#b`/`#binary` suffix marks a column as binary encoded, `#s`/`#string`
/// as text; without a suffix `default_binary` applies.
pub fn parse_columns_mapping(mapping: &str, default_binary: bool) -> Result<ParsedMapping, LoadError> {
    let mut key_index = None;
    let mut columns = vec![];

    for (i, entry) in mapping.split(',').map(str::trim).enumerate() {
        let (target, binary_encoded) = match entry.split_once('#') {
            Some((target, "b" | "binary")) => (target, true),
            Some((target, "s" | "string")) => (target, false),
            Some((_, suffix)) => {
                return ColumnMappingSnafu {
                    details: format!(r#"unknown storage type "{}" in "{}""#, suffix, entry),
                }
                .fail()
            }
            None => (entry, default_binary),
        };

        if target == ROW_KEY {
            ensure!(
                key_index.is_none(),
                ColumnMappingSnafu {
                    details: format!("{} is mapped more than once", ROW_KEY),
                }
            );
            key_index = Some(i);
            continue;
        }

        match target.split_once(':') {
            Some((family, qualifier)) if !family.is_empty() => {
                columns.push(ColumnMapping::new(family, qualifier, binary_encoded))
            }
            _ => {
                return ColumnMappingSnafu {
                    details: format!(r#"expected "family:qualifier", found "{}""#, entry),
                }
                .fail()
            }
        }
    }

    let key_index = key_index.context(ColumnMappingSnafu {
        details: format!("{} is not mapped", ROW_KEY),
    })?;

    Ok(ParsedMapping { key_index, columns })
}

/// A table stored in a wide-column store. Its single clustering column is the
/// row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HBaseTable {
    table_name: String,
    columns_mapping: String,
    default_binary: bool,
    /// One entry per non-clustering column.
    mappings: Vec<ColumnMapping>,
}

impl HBaseTable {
    /// Builds an unloaded table and returns the descriptor's fields reordered
    /// so the row key comes first.
    pub(crate) fn skeleton(
        db_name: &str,
        descriptor: &RawDescriptor,
    ) -> Result<(Self, Vec<FieldSchema>), LoadError> {
        let columns_mapping = descriptor
            .parameter(params::HBASE_COLUMNS_MAPPING)
            .context(ColumnMappingSnafu {
                details: format!("{} is not set", params::HBASE_COLUMNS_MAPPING),
            })?
            .to_string();
        let default_binary = descriptor
            .parameter(params::HBASE_STORAGE_TYPE)
            .map_or(false, |ty| ty.eq_ignore_ascii_case("binary"));

        let parsed = parse_columns_mapping(&columns_mapping, default_binary)?;
        let fields = &descriptor.storage.columns;
        ensure!(
            parsed.columns.len() + 1 == fields.len(),
            ColumnMappingSnafu {
                details: format!(
                    "{} mapping entries for {} columns",
                    parsed.columns.len() + 1,
                    fields.len()
                ),
            }
        );

        let mut ordered = fields.clone();
        let key = ordered.remove(parsed.key_index);
        ordered.insert(0, key);

        let table_name = match descriptor.parameter(params::HBASE_TABLE_NAME) {
            Some(name) => name.to_string(),
            None if db_name == "default" => descriptor.tbl_name.clone(),
            None => format!("{}.{}", db_name, descriptor.tbl_name),
        };

        Ok((
            Self {
                table_name,
                columns_mapping,
                default_binary,
                mappings: vec![],
            },
            ordered,
        ))
    }

    /// Keeps the mapping source of this skeleton and takes the resolved
    /// mappings from elsewhere.
    pub(crate) fn with_mappings(&self, table_name: String, mappings: Vec<ColumnMapping>) -> Self {
        Self {
            table_name,
            columns_mapping: self.columns_mapping.clone(),
            default_binary: self.default_binary,
            mappings,
        }
    }

    /// Name of the table in the wide-column store.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    pub fn num_binary_encoded(&self) -> usize {
        self.mappings.iter().filter(|m| m.binary_encoded).count()
    }

    pub(crate) fn load(
        &mut self,
        db: &str,
        table: &str,
        non_clustering_cols: &[Column],
        resolver: &dyn ColumnMappingResolver,
    ) -> Result<(), LoadError> {
        let table_ref = HBaseTableRef {
            db: db.to_string(),
            table: table.to_string(),
            hbase_table_name: self.table_name.clone(),
            columns_mapping: self.columns_mapping.clone(),
            default_binary: self.default_binary,
        };

        let mappings = resolver
            .describe_column_mapping(&table_ref)
            .context(DescribeColumnMappingSnafu {
                table: &self.table_name,
            })?;
        ensure!(
            mappings.len() == non_clustering_cols.len(),
            ColumnMappingSnafu {
                details: format!(
                    "{} resolved mapping entries for {} columns",
                    mappings.len(),
                    non_clustering_cols.len()
                ),
            }
        );

        // text columns are always stored as text
        self.mappings = mappings
            .into_iter()
            .zip(non_clustering_cols)
            .map(|(mapping, col)| ColumnMapping {
                binary_encoded: mapping.binary_encoded && col.column_type.supports_binary_encoding(),
                ..mapping
            })
            .collect();

        debug!(
            "resolved {} mapped columns of {}.{} ({} binary encoded)",
            self.mappings.len(),
            db,
            table,
            self.num_binary_encoded()
        );

        Ok(())
    }
}
