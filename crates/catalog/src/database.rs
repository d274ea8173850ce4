use {
    crate::table::Table,
    parking_lot::RwLock,
    std::{
        collections::HashMap,
        sync::{Arc, OnceLock},
    },
};

/// The slot of one table. The first caller to reach an empty slot loads the
/// table and every concurrent caller waits for that result.
#[derive(Debug)]
pub(crate) struct TableEntry {
    /// Spelling reported by the metastore.
    pub(crate) name: String,
    /// `None` once the metastore reported the table missing.
    pub(crate) slot: OnceLock<Option<Arc<Table>>>,
}

impl TableEntry {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            slot: OnceLock::new(),
        })
    }

    fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// A named group of tables. Table names are matched ignoring case.
#[derive(Debug)]
pub struct Database {
    name: String,
    tables: RwLock<HashMap<String, Arc<TableEntry>>>,
}

impl Database {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of every registered table, loaded or not, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names = self
            .tables
            .read()
            .values()
            .map(|entry| entry.name.clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables
            .read()
            .contains_key(common::name::canonical(name).as_ref())
    }

    /// The table if it has been loaded already. Never triggers a load.
    pub fn loaded_table(&self, name: &str) -> Option<Arc<Table>> {
        self.entry(name)
            .and_then(|entry| entry.slot.get().cloned().flatten())
    }

    pub(crate) fn entry(&self, name: &str) -> Option<Arc<TableEntry>> {
        self.tables
            .read()
            .get(common::name::canonical(name).as_ref())
            .cloned()
    }

    /// Returns the entry for `name`, adding an unloaded one if needed.
    pub(crate) fn register(&self, name: &str) -> Arc<TableEntry> {
        self.tables
            .write()
            .entry(common::name::canonical(name).into_owned())
            .or_insert_with(|| TableEntry::new(name))
            .clone()
    }

    /// Returns an entry that will be loaded afresh. An entry whose load has
    /// not finished is reused so the reload joins it.
    pub(crate) fn reload_entry(&self, name: &str) -> Arc<TableEntry> {
        let mut tables = self.tables.write();
        let key = common::name::canonical(name).into_owned();

        let spelling = match tables.get(&key) {
            Some(entry) if !entry.is_resolved() => return entry.clone(),
            Some(entry) => entry.name.clone(),
            None => name.to_string(),
        };

        let entry = TableEntry::new(&spelling);
        tables.insert(key, entry.clone());
        entry
    }

    /// Removes `entry` unless it has been replaced in the meantime.
    pub(crate) fn remove_entry(&self, entry: &Arc<TableEntry>) {
        let mut tables = self.tables.write();
        let key = common::name::canonical(&entry.name);

        if matches!(tables.get(key.as_ref()), Some(current) if Arc::ptr_eq(current, entry)) {
            tables.remove(key.as_ref());
        }
    }

    /// Publishes an already built table, replacing any previous entry.
    pub(crate) fn install(&self, table: Arc<Table>) {
        let entry = TableEntry::new(table.name());
        let _ = entry.slot.set(Some(table));

        self.tables
            .write()
            .insert(common::name::canonical(&entry.name).into_owned(), entry);
    }
}
