//! In-memory registry of databases, tables and partitions, loaded lazily
//! from a metastore and exchanged with peers as wire structs.

mod catalog;
pub mod codec;
mod database;
mod error;
pub mod loader;
pub mod memory;
pub mod partition;
pub mod table;

pub use {
    crate::catalog::{Catalog, CatalogConfig, InitStrategy},
    codec::{DecodeError, EncodeError},
    database::Database,
    error::{Error, LoadError, Result},
    loader::Collaborators,
    partition::{Partition, PartitionError, PartitionRegistry},
    table::{Table, TableKind},
};
