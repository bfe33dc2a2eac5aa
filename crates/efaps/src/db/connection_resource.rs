use super::{Pool, PoolConnection};
use crate::{
    driver::{operation::Transaction, Operation, Response},
    Config, Error, Result,
};

use std::time::{Duration, Instant};
use tracing::warn;

/// An exclusively owned connection running one transaction.
///
/// Opening the resource starts a transaction; [`commit`](Self::commit) and
/// [`abort`](Self::abort) end it and return the connection to the pool.
/// Dropping a resource that is still open rolls it back.
#[derive(Debug)]
pub struct ConnectionResource {
    connection: Option<PoolConnection>,
    opened_at: Instant,
    transaction_deadline: Option<Instant>,
    statement_timeout: Option<Duration>,
}

impl ConnectionResource {
    pub fn open(pool: &Pool, config: &Config) -> Result<ConnectionResource> {
        let mut connection = pool.get()?;
        connection.exec(Transaction::Start.into())?;

        let opened_at = Instant::now();

        Ok(ConnectionResource {
            connection: Some(connection),
            opened_at,
            transaction_deadline: config
                .transaction_timeout
                .and_then(|timeout| opened_at.checked_add(timeout)),
            statement_timeout: config.statement_timeout,
        })
    }

    pub fn is_opened(&self) -> bool {
        self.connection.is_some()
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Execute a database operation on the owned connection.
    pub fn exec(&mut self, op: impl Into<Operation>) -> Result<Response> {
        match &mut self.connection {
            Some(connection) => connection.exec(op.into()),
            None => Err(Error::connection_pool("connection resource is closed")),
        }
    }

    /// Deadline of the next statement: the statement timeout counted from
    /// now, capped by the transaction deadline.
    pub fn deadline(&self) -> Option<Instant> {
        let statement = self
            .statement_timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));

        match (statement, self.transaction_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn transaction_deadline(&self) -> Option<Instant> {
        self.transaction_deadline
    }

    pub fn commit(&mut self) -> Result<()> {
        self.finish(Transaction::Commit)
    }

    pub fn abort(&mut self) -> Result<()> {
        self.finish(Transaction::Rollback)
    }

    fn finish(&mut self, op: Transaction) -> Result<()> {
        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };

        if let Err(err) = connection.exec(op.into()) {
            if op == Transaction::Commit {
                if let Err(rollback) = connection.exec(Transaction::Rollback.into()) {
                    warn!(%rollback, "rollback after failed commit failed; closing connection");
                    connection.discard();
                }
            } else {
                warn!(%err, "rollback failed; closing connection");
                connection.discard();
            }
            return Err(err);
        }

        Ok(())
    }
}

impl Drop for ConnectionResource {
    fn drop(&mut self) {
        if self.is_opened() {
            warn!(
                elapsed = ?self.opened_at.elapsed(),
                "connection resource dropped while open; rolling back"
            );

            if let Err(err) = self.abort() {
                warn!(%err, "rollback of dropped connection resource failed");
            }
        }
    }
}
