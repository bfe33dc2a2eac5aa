//! Connection pooling for database connections.

use crate::{
    driver::{Capability, Connection, Driver},
    Config, Error, Result,
};

use std::{
    fmt,
    ops::{Deref, DerefMut},
};
use tracing::warn;

/// Get the default maximum size of a pool, which is `cpu_core_count * 2`
/// including logical cores (Hyper-Threading).
fn get_default_pool_max_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(4)
}

/// A bounded pool of driver connections.
///
/// Connections are opened lazily and handed out as [`PoolConnection`]s,
/// which return to the pool when dropped.
#[derive(Clone)]
pub struct Pool {
    inner: r2d2::Pool<Manager>,
    capability: &'static Capability,
}

impl Pool {
    /// Creates a new connection pool from the given driver.
    ///
    /// `config.max_connections` overrides the limit reported by the driver.
    pub fn new(driver: impl Driver, config: &Config) -> Result<Self> {
        let max_size = config
            .max_connections
            .or_else(|| driver.max_connections())
            .unwrap_or_else(get_default_pool_max_size);

        let max_size = u32::try_from(max_size)
            .ok()
            .filter(|max_size| *max_size > 0)
            .ok_or_else(|| {
                Error::connection_pool(format!("max_size must be in 1..={}", u32::MAX))
            })?;

        if config.connection_timeout.is_zero() {
            return Err(Error::connection_pool("connection_timeout must not be zero"));
        }

        let capability = driver.capability();

        // An in-memory database lives only as long as its connection
        let inner = r2d2::Pool::builder()
            .max_size(max_size)
            .min_idle(Some(0))
            .idle_timeout(None)
            .max_lifetime(None)
            .test_on_check_out(false)
            .connection_timeout(config.connection_timeout)
            .error_handler(Box::new(TracingErrorHandler))
            .build(Manager {
                driver: Box::new(driver),
            })
            .map_err(|err| Error::connection_pool(err.to_string()))?;

        Ok(Self { inner, capability })
    }

    /// Retrieves a connection from the pool, opening a new one if none is
    /// idle and the pool is not at capacity.
    ///
    /// Waits up to the configured connection timeout for a connection to be
    /// returned when the pool is exhausted.
    pub fn get(&self) -> Result<PoolConnection> {
        let inner = self.inner.get().map_err(|err| {
            Error::connection_pool(format!(
                "{err}; max_size={}",
                self.inner.max_size()
            ))
        })?;

        Ok(PoolConnection { inner })
    }

    /// Returns the database driver's capabilities.
    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    pub fn max_size(&self) -> usize {
        self.inner.max_size() as usize
    }

    /// Number of connections currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.inner.state().idle_connections as usize
    }

    /// Number of connections opened by the pool, idle or handed out.
    pub fn open(&self) -> usize {
        self.inner.state().connections as usize
    }
}

#[derive(Debug)]
struct Manager {
    driver: Box<dyn Driver>,
}

/// A driver connection as stored in the pool.
#[derive(Debug)]
struct Managed {
    connection: Box<dyn Connection>,

    /// Closed instead of returned to the pool
    discarded: bool,
}

impl r2d2::ManageConnection for Manager {
    type Connection = Managed;
    type Error = Error;

    fn connect(&self) -> Result<Managed> {
        Ok(Managed {
            connection: self.driver.connect()?,
            discarded: false,
        })
    }

    fn is_valid(&self, _conn: &mut Managed) -> Result<()> {
        Ok(())
    }

    fn has_broken(&self, conn: &mut Managed) -> bool {
        conn.discarded
    }
}

#[derive(Debug)]
struct TracingErrorHandler;

impl r2d2::HandleError<Error> for TracingErrorHandler {
    fn handle_error(&self, error: Error) {
        warn!(%error, "failed to open pooled connection");
    }
}

/// A connection retrieved from a pool.
///
/// When dropped, the connection is returned to the pool for reuse unless it
/// was [discarded](Self::discard).
pub struct PoolConnection {
    inner: r2d2::PooledConnection<Manager>,
}

impl PoolConnection {
    /// Closes the connection on drop instead of returning it to the pool.
    pub fn discard(&mut self) {
        self.inner.discarded = true;
    }
}

impl Deref for PoolConnection {
    type Target = Box<dyn Connection>;

    fn deref(&self) -> &Self::Target {
        &self.inner.connection
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner.connection
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capability", &self.capability)
            .field("max_size", &self.max_size())
            .field("open", &self.open())
            .finish()
    }
}

impl fmt::Debug for PoolConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConnection")
            .field("connection", &self.inner.connection)
            .field("discarded", &self.inner.discarded)
            .finish()
    }
}
