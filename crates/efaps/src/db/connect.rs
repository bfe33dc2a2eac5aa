use crate::{
    driver::{Capability, Connection, Driver},
    Error, Result,
};

use url::Url;

/// A driver picked by the scheme of a connection URL.
#[derive(Debug)]
pub struct Connect {
    url: Url,
    driver: Box<dyn Driver>,
}

impl Connect {
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|err| {
            Error::invalid_connection_url(format!("{err}; url={url}"))
        })?;

        let driver = match parsed.scheme() {
            "sqlite" => connect_sqlite(url)?,
            scheme => {
                return Err(Error::invalid_connection_url(format!(
                    "unsupported database; scheme={scheme}; url={url}"
                )))
            }
        };

        Ok(Self {
            url: parsed,
            driver,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Driver for Connect {
    fn capability(&self) -> &'static Capability {
        self.driver.capability()
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect()
    }

    fn max_connections(&self) -> Option<usize> {
        self.driver.max_connections()
    }
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(efaps_driver_sqlite::Sqlite::new(url)?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_connection_url(format!(
        "`sqlite` feature not enabled; url={url}"
    )))
}
