mod access;
pub use access::{AccessCheck, AllowAll};

mod config;
pub use config::Config;

pub mod db;
pub use db::{ConnectionResource, Context, Db, Session};

pub mod driver;

pub mod query;
pub use query::{
    AttributeQuery, CachedResult, InstanceQuery, MultiPrintQuery, QueryBuilder, StatementRunner,
};

pub mod search;

pub use efaps_core::{
    schema::{self, Schema},
    stmt::{Instance, Value},
    Error, Result,
};
