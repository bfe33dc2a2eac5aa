use super::{Connect, Db, Pool, Shared};
use crate::{driver::Driver, AccessCheck, AllowAll, Config, Result, Schema};

use std::sync::Arc;

#[derive(Default)]
pub struct Builder {
    config: Config,

    /// Access check installed on the built `Db`. Defaults to [`AllowAll`].
    access: Option<Box<dyn AccessCheck>>,
}

impl Builder {
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    pub fn access_check(&mut self, check: impl AccessCheck) -> &mut Self {
        self.access = Some(Box::new(check));
        self
    }

    pub fn build(&mut self, schema: Schema, driver: impl Driver) -> Result<Db> {
        let pool = Pool::new(driver, &self.config)?;
        let access = self.access.take().unwrap_or_else(|| Box::new(AllowAll));

        Ok(Db {
            shared: Arc::new(Shared {
                schema: Arc::new(schema),
                pool,
                config: self.config.clone(),
                access,
            }),
        })
    }

    /// Builds a `Db` for a connection URL, such as `sqlite::memory:` or
    /// `sqlite:///var/lib/efaps.db`.
    pub fn connect(&mut self, schema: Schema, url: &str) -> Result<Db> {
        self.build(schema, Connect::new(url)?)
    }
}
