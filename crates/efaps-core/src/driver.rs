mod capability;
pub use capability::{Capability, Dialect};

mod response;
pub use response::{Response, Rows};

pub mod operation;
pub use operation::Operation;

mod table_information;
pub use table_information::{ColumnInformation, TableInformation};

use std::fmt::Debug;

/// A database backend.
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the database the driver talks to.
    fn capability(&self) -> &'static Capability;

    /// Opens a new connection.
    fn connect(&self) -> crate::Result<Box<dyn Connection>>;

    /// Upper bound of open connections, when the database imposes one.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

/// An open connection. Statements run on the calling thread.
pub trait Connection: Debug + Send + 'static {
    /// Execute a database operation
    fn exec(&mut self, op: Operation) -> crate::Result<Response>;
}
