mod builder;
pub use builder::Builder;

mod connect;
pub use connect::Connect;

mod connection_resource;
pub use connection_resource::ConnectionResource;

mod context;
pub use context::{Context, QueryEnv, Session};

mod pool;
pub use pool::{Pool, PoolConnection};

use crate::{driver::Capability, AccessCheck, Config, Schema};

use std::{fmt, sync::Arc};

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) schema: Arc<Schema>,
    pub(crate) pool: Pool,
    pub(crate) config: Config,
    pub(crate) access: Box<dyn AccessCheck>,
}

/// A database handle: the metadata schema, a connection pool and the runtime
/// configuration. Cloning is cheap; every clone shares the same pool.
///
/// Work happens inside a [`Context`], obtained from [`Db::context`].
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Starts a unit of work with a session using the configured default
    /// locale and no company.
    pub fn context(&self) -> Context {
        self.context_for(Session::new(self.shared.config.default_locale.clone()))
    }

    /// Starts a unit of work for the given session.
    pub fn context_for(&self, session: Session) -> Context {
        Context::new(self.clone(), session)
    }

    pub fn schema(&self) -> &Schema {
        &self.shared.schema
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.pool.capability()
    }

    pub(crate) fn pool(&self) -> &Pool {
        &self.shared.pool
    }

    pub(crate) fn access_check(&self) -> &dyn AccessCheck {
        &*self.shared.access
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("pool", &self.shared.pool)
            .field("config", &self.shared.config)
            .field("access", &self.shared.access)
            .finish()
    }
}
