pub use efaps_core::driver::{
    operation::{self, Operation},
    Capability, ColumnInformation, Connection, Dialect, Driver, Response, Rows, TableInformation,
};

#[cfg(feature = "sqlite")]
pub use efaps_driver_sqlite::Sqlite;
