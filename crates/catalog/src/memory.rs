//! Collaborators backed by in-process maps, for tests and embedding.

use {
    crate::{
        loader::{
            ColumnMapping, ColumnMappingResolver, DatabaseNotFoundSnafu, DirectoryLister,
            HBaseTableRef, MetastoreClient, MetastoreError, TableNotFoundSnafu,
        },
        table::parse_columns_mapping,
    },
    def::{FileDescriptor, RawDescriptor, RawPartition},
    parking_lot::RwLock,
    snafu::prelude::*,
    std::{
        collections::{BTreeMap, BTreeSet, HashMap, HashSet},
        io,
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

#[derive(Debug, Default)]
struct MemoryDatabase {
    name: String,
    tables: BTreeMap<String, MemoryTable>,
}

#[derive(Debug)]
struct MemoryTable {
    descriptor: RawDescriptor,
    partitions: Vec<RawPartition>,
}

/// A metastore holding descriptors in memory. Names are matched ignoring
/// case, like the catalog does.
#[derive(Debug, Default)]
pub struct MemoryMetastore {
    databases: RwLock<BTreeMap<String, MemoryDatabase>>,
    descriptor_fetches: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryMetastore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_database(&self, name: &str) {
        self.databases
            .write()
            .entry(common::name::canonical(name).into_owned())
            .or_insert_with(|| MemoryDatabase {
                name: name.to_string(),
                ..Default::default()
            });
    }

    /// Adds or replaces a table, creating its database if needed.
    pub fn create_table(&self, descriptor: RawDescriptor) {
        self.create_database(&descriptor.db_name);

        let mut databases = self.databases.write();
        if let Some(db) = databases.get_mut(common::name::canonical(&descriptor.db_name).as_ref()) {
            db.tables.insert(
                common::name::canonical(&descriptor.tbl_name).into_owned(),
                MemoryTable {
                    descriptor,
                    partitions: vec![],
                },
            );
        }
    }

    pub fn add_partition(
        &self,
        db: &str,
        name: &str,
        partition: RawPartition,
    ) -> Result<(), MetastoreError> {
        let mut databases = self.databases.write();
        let table = databases
            .get_mut(common::name::canonical(db).as_ref())
            .context(DatabaseNotFoundSnafu { name: db })?
            .tables
            .get_mut(common::name::canonical(name).as_ref())
            .context(TableNotFoundSnafu { db, name })?;
        table.partitions.push(partition);

        Ok(())
    }

    /// Returns whether the table existed.
    pub fn drop_table(&self, db: &str, name: &str) -> bool {
        self.databases
            .write()
            .get_mut(common::name::canonical(db).as_ref())
            .and_then(|db| db.tables.remove(common::name::canonical(name).as_ref()))
            .is_some()
    }

    /// Number of descriptor fetches served so far, failed ones included.
    pub fn descriptor_fetches(&self) -> usize {
        self.descriptor_fetches.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn with_table<T>(
        &self,
        db: &str,
        name: &str,
        f: impl FnOnce(&MemoryTable) -> T,
    ) -> Result<T, MetastoreError> {
        let databases = self.databases.read();
        let table = databases
            .get(common::name::canonical(db).as_ref())
            .context(DatabaseNotFoundSnafu { name: db })?
            .tables
            .get(common::name::canonical(name).as_ref())
            .context(TableNotFoundSnafu { db, name })?;

        Ok(f(table))
    }
}

impl MetastoreClient for MemoryMetastore {
    fn list_databases(&self) -> Result<Vec<String>, MetastoreError> {
        Ok(self
            .databases
            .read()
            .values()
            .map(|db| db.name.clone())
            .collect())
    }

    fn list_tables(&self, db: &str) -> Result<Vec<String>, MetastoreError> {
        let databases = self.databases.read();
        let db = databases
            .get(common::name::canonical(db).as_ref())
            .context(DatabaseNotFoundSnafu { name: db })?;

        Ok(db
            .tables
            .values()
            .map(|t| t.descriptor.tbl_name.clone())
            .collect())
    }

    fn fetch_raw_descriptor(&self, db: &str, name: &str) -> Result<RawDescriptor, MetastoreError> {
        self.descriptor_fetches.fetch_add(1, Ordering::SeqCst);
        self.with_table(db, name, |t| t.descriptor.clone())
    }

    fn list_partitions(&self, db: &str, name: &str) -> Result<Vec<RawPartition>, MetastoreError> {
        self.with_table(db, name, |t| t.partitions.clone())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn dir_key(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Data files keyed by their directory. A directory nobody added files to
/// lists as empty.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    dirs: RwLock<HashMap<String, Vec<FileDescriptor>>>,
    failing: RwLock<HashSet<String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, dir: &str, file: FileDescriptor) {
        self.dirs
            .write()
            .entry(dir_key(dir).to_string())
            .or_default()
            .push(file);
    }

    /// Makes every later listing of `dir` fail.
    pub fn fail_listing(&self, dir: &str) {
        self.failing.write().insert(dir_key(dir).to_string());
    }
}

impl DirectoryLister for MemoryFileSystem {
    fn list_files(&self, _base_dir: &str, partition_path: &str) -> io::Result<Vec<FileDescriptor>> {
        let key = dir_key(partition_path);
        if self.failing.read().contains(key) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot list {}", partition_path),
            ));
        }

        Ok(self.dirs.read().get(key).cloned().unwrap_or_default())
    }
}

/// Knows the column families of each wide-column table and resolves
/// declared mappings against them.
#[derive(Debug, Default)]
pub struct MemoryColumnMappingResolver {
    tables: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryColumnMappingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table<'a>(&self, name: &str, families: impl IntoIterator<Item = &'a str>) {
        self.tables.write().insert(
            name.to_string(),
            families.into_iter().map(str::to_string).collect(),
        );
    }
}

impl ColumnMappingResolver for MemoryColumnMappingResolver {
    fn describe_column_mapping(&self, table: &HBaseTableRef) -> io::Result<Vec<ColumnMapping>> {
        let tables = self.tables.read();
        let families = tables.get(&table.hbase_table_name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("table {} does not exist", table.hbase_table_name),
            )
        })?;

        let parsed = parse_columns_mapping(&table.columns_mapping, table.default_binary)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        if let Some(unknown) = parsed.columns.iter().find(|c| !families.contains(&c.family)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "column family {} does not exist in {}",
                    unknown.family, table.hbase_table_name
                ),
            ));
        }

        Ok(parsed.columns)
    }
}
