use {
    crate::{
        codec,
        database::{Database, TableEntry},
        error::*,
        loader::Collaborators,
        table::Table,
    },
    def::{RawDescriptor, TableId},
    log::{debug, info, warn},
    parking_lot::RwLock,
    snafu::prelude::*,
    std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
        thread,
    },
    wire::WireTable,
};

/// What [`Catalog::new`] does before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStrategy {
    /// Register database and table names; load each table on first access.
    #[default]
    Lazy,
    /// Register names and load every table up front.
    Immediate,
    /// Register nothing. Tables arrive through [`Catalog::install_wire_table`].
    Empty,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub init_strategy: InitStrategy,
    /// Threads used to load tables under [`InitStrategy::Immediate`].
    pub load_parallelism: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            init_strategy: InitStrategy::Lazy,
            load_parallelism: 4,
        }
    }
}

/// Registry of databases and their tables.
///
/// Lookups never hold a lock while a table loads: requests for one table
/// share a single load, requests for different tables run in parallel.
pub struct Catalog {
    config: CatalogConfig,
    collaborators: Collaborators,
    databases: RwLock<HashMap<String, Arc<Database>>>,
    next_table_id: AtomicU64,
}

impl Catalog {
    pub fn new(config: CatalogConfig, collaborators: Collaborators) -> Result<Self> {
        let catalog = Self {
            config,
            collaborators,
            databases: RwLock::new(HashMap::new()),
            next_table_id: AtomicU64::new(1),
        };

        match catalog.config.init_strategy {
            InitStrategy::Empty => {}
            InitStrategy::Lazy => catalog.register_all()?,
            InitStrategy::Immediate => {
                catalog.register_all()?;
                catalog.load_all();
            }
        }

        info!(
            "catalog initialized ({:?}) with {} databases",
            catalog.config.init_strategy,
            catalog.databases.read().len()
        );

        Ok(catalog)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn next_table_id(&self) -> TableId {
        self.next_table_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn get_db(&self, name: &str) -> Result<Arc<Database>> {
        self.databases
            .read()
            .get(common::name::canonical(name).as_ref())
            .cloned()
            .context(DatabaseNotFoundSnafu { name })
    }

    pub fn db_names(&self) -> Vec<String> {
        let mut names = self
            .databases
            .read()
            .values()
            .map(|db| db.name().to_string())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Returns the table, loading it on first access. A table that failed to
    /// load is returned as a value; see [`Catalog::load_table`].
    pub fn get_table(&self, db: &str, name: &str) -> Result<Arc<Table>> {
        let database = self.get_db(db)?;
        let entry = database
            .entry(name)
            .context(TableNotFoundSnafu { db, name })?;

        self.resolve(&database, entry)
    }

    /// Like [`Catalog::get_table`], but raises the error a failed table
    /// captured.
    pub fn load_table(&self, db: &str, name: &str) -> Result<Arc<Table>> {
        let table = self.get_table(db, name)?;

        match table.load_error() {
            Some(error) => Err(Error::TableLoading {
                db: table.db_name().to_string(),
                name: table.name().to_string(),
                source: error.clone(),
            }),
            None => Ok(table),
        }
    }

    /// Loads the table again from the metastore, replacing what is cached.
    /// Joins a load that is still running instead of starting another one.
    pub fn reload_table(&self, db: &str, name: &str) -> Result<Arc<Table>> {
        let database = self.get_db(db)?;
        info!("reloading table {}.{}", database.name(), name);

        let entry = database.reload_entry(name);
        self.resolve(&database, entry)
    }

    /// Rebuilds a table received from another catalog under a fresh id.
    pub fn table_from_wire(&self, wire: &WireTable) -> Result<Table> {
        codec::decode(wire, self.next_table_id()).context(DecodeSnafu {
            db: &wire.db_name,
            name: &wire.tbl_name,
        })
    }

    /// Decodes a received table and publishes it, adding its database if
    /// needed.
    pub fn install_wire_table(&self, wire: &WireTable) -> Result<Arc<Table>> {
        let table = Arc::new(self.table_from_wire(wire)?);
        debug!("installing {} table {}", table.kind().name(), table.full_name());

        let database = self
            .databases
            .write()
            .entry(common::name::canonical(&wire.db_name).into_owned())
            .or_insert_with(|| Arc::new(Database::new(&wire.db_name)))
            .clone();
        database.install(table.clone());

        Ok(table)
    }

    /// Encodes every registered table, loading those not loaded yet. Tables
    /// that failed to load are included as failed entries.
    pub fn to_wire_tables(&self) -> Result<Vec<WireTable>> {
        let mut tables = vec![];

        for db in self.db_names() {
            for name in self.get_db(&db)?.table_names() {
                let table = match self.get_table(&db, &name) {
                    Ok(table) => table,
                    Err(Error::TableNotFound { .. }) => continue,
                    Err(e) => return Err(e),
                };
                tables.push(table.to_wire().context(EncodeSnafu {
                    db: &db,
                    name: &name,
                })?);
            }
        }

        Ok(tables)
    }

    pub fn close(self) {
        info!("closing catalog");
        self.collaborators.metastore.close();
    }

    fn register_all(&self) -> Result<()> {
        let metastore = self.collaborators.metastore.as_ref();
        let mut databases = HashMap::new();

        for db_name in metastore.list_databases().context(MetastoreSnafu)? {
            let database = Database::new(&db_name);
            for name in metastore.list_tables(&db_name).context(MetastoreSnafu)? {
                database.register(&name);
            }
            debug!(
                "registered {} tables of {}",
                database.table_names().len(),
                db_name
            );
            databases.insert(
                common::name::canonical(&db_name).into_owned(),
                Arc::new(database),
            );
        }

        *self.databases.write() = databases;
        Ok(())
    }

    fn load_all(&self) {
        let names = self
            .databases
            .read()
            .values()
            .flat_map(|db| {
                let db_name = db.name().to_string();
                db.table_names()
                    .into_iter()
                    .map(move |name| (db_name.clone(), name))
            })
            .collect::<Vec<_>>();
        if names.is_empty() {
            return;
        }

        let parallelism = self.config.load_parallelism.max(1);
        let chunk_size = (names.len() + parallelism - 1) / parallelism;

        thread::scope(|s| {
            for chunk in names.chunks(chunk_size) {
                s.spawn(move || {
                    for (db, name) in chunk {
                        if let Err(e) = self.get_table(db, name) {
                            warn!("failed to load {}.{}: {}", db, name, e);
                        }
                    }
                });
            }
        });

        info!("loaded {} tables", names.len());
    }

    fn resolve(&self, database: &Database, entry: Arc<TableEntry>) -> Result<Arc<Table>> {
        let slot = entry
            .slot
            .get_or_init(|| self.load_from_metastore(database.name(), &entry.name));

        match slot {
            Some(table) => Ok(table.clone()),
            None => {
                database.remove_entry(&entry);
                TableNotFoundSnafu {
                    db: database.name(),
                    name: &entry.name,
                }
                .fail()
            }
        }
    }

    /// `None` when the metastore no longer knows the table. Any other
    /// failure becomes a failed table.
    fn load_from_metastore(&self, db: &str, name: &str) -> Option<Arc<Table>> {
        debug!("loading table {}.{}", db, name);
        let id = self.next_table_id();

        let descriptor = match self.collaborators.metastore.fetch_raw_descriptor(db, name) {
            Ok(descriptor) => descriptor,
            Err(e) if e.is_not_found() => {
                debug!("{}.{} is gone from the metastore", db, name);
                return None;
            }
            Err(e) => {
                let error = LoadError::FetchDescriptor { source: e };
                warn!("failed to load table {}.{}: {}", db, name, error);
                return Some(Arc::new(Table::failed(
                    id,
                    db,
                    name,
                    RawDescriptor::placeholder(db, name),
                    Arc::new(error),
                )));
            }
        };

        let loaded = Table::from_metastore_descriptor(id, db, descriptor.clone())
            .and_then(|mut table| table.load(&self.collaborators).map(|_| table));

        match loaded {
            Ok(table) => {
                debug!(
                    "loaded {} table {}.{}",
                    table.kind().name(),
                    db,
                    table.name()
                );
                Some(Arc::new(table))
            }
            Err(LoadError::FetchPartitions { source }) if source.is_not_found() => {
                debug!("{}.{} was dropped while loading", db, name);
                None
            }
            Err(error) => {
                warn!("failed to load table {}.{}: {}", db, name, error);
                let name = descriptor.tbl_name.clone();
                Some(Arc::new(Table::failed(
                    id,
                    db,
                    &name,
                    descriptor,
                    Arc::new(error),
                )))
            }
        }
    }
}
