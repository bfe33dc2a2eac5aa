use std::time::Duration;

/// Runtime settings of a [`Db`](crate::Db).
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound for a single statement.
    pub statement_timeout: Option<Duration>,

    /// Upper bound for a unit of work, measured from the moment its
    /// connection resource is opened.
    pub transaction_timeout: Option<Duration>,

    /// Pool size. `None` lets the driver decide.
    pub max_connections: Option<usize>,

    /// How long to wait for a pooled connection when all are in use.
    pub connection_timeout: Duration,

    /// Locale of new sessions, used for case-insensitive comparisons.
    pub default_locale: String,

    /// Whether instance queries include rows of child types by default.
    pub include_child_types: bool,

    /// Maximum number of ids per `in (...)` list issued by print queries.
    pub print_batch_size: usize,
}

impl Config {
    pub fn new() -> Config {
        Config {
            statement_timeout: Some(Duration::from_secs(30)),
            transaction_timeout: None,
            max_connections: None,
            connection_timeout: Duration::from_secs(30),
            default_locale: "en".to_string(),
            include_child_types: true,
            print_batch_size: 500,
        }
    }

    pub fn statement_timeout(mut self, timeout: Option<Duration>) -> Config {
        self.statement_timeout = timeout;
        self
    }

    pub fn transaction_timeout(mut self, timeout: Option<Duration>) -> Config {
        self.transaction_timeout = timeout;
        self
    }

    pub fn max_connections(mut self, max: usize) -> Config {
        self.max_connections = Some(max);
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Config {
        self.connection_timeout = timeout;
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Config {
        self.default_locale = locale.into();
        self
    }

    pub fn include_child_types(mut self, include: bool) -> Config {
        self.include_child_types = include;
        self
    }

    pub fn print_batch_size(mut self, size: usize) -> Config {
        self.print_batch_size = size.max(1);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
