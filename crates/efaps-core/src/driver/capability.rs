use crate::schema::ColumnType;

#[derive(Debug)]
pub struct Capability {
    /// SQL dialect spoken by the database
    pub dialect: Dialect,

    /// Maximum number of bound parameters per statement.
    pub max_params: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        max_params: 32_766,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgresql,
        max_params: 65_535,
        ..Self::SQLITE
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        max_params: 65_535,
        ..Self::SQLITE
    };
}

impl Dialect {
    /// Maps a declared column type, as reported by the database catalog, to
    /// the type the query core reads it as.
    pub fn read_column_type(self, decl: &str) -> Option<ColumnType> {
        let decl = decl.trim().to_ascii_lowercase();

        match self {
            Dialect::Sqlite => read_sqlite(&decl),
            Dialect::Postgresql => read_postgresql(&decl),
            Dialect::Mysql => read_mysql(&decl),
        }
    }
}

// SQLite stores whatever it gets; the declared type only carries an affinity.
// Timestamps and booleans are recognized by name before the affinity rules
// apply.
fn read_sqlite(decl: &str) -> Option<ColumnType> {
    if decl.starts_with("bool") {
        Some(ColumnType::Boolean)
    } else if decl.starts_with("datetime") || decl.starts_with("timestamp") {
        Some(ColumnType::DateTime)
    } else if decl == "date" {
        Some(ColumnType::Date)
    } else if decl.contains("int") {
        Some(ColumnType::Integer)
    } else if decl.contains("char") || decl.contains("clob") || decl.contains("text") {
        Some(ColumnType::String)
    } else if decl.contains("blob") {
        Some(ColumnType::Bytes)
    } else if decl.contains("real")
        || decl.contains("floa")
        || decl.contains("doub")
        || decl.starts_with("numeric")
        || decl.starts_with("decimal")
    {
        Some(ColumnType::Real)
    } else {
        None
    }
}

fn read_postgresql(decl: &str) -> Option<ColumnType> {
    let base = decl.split('(').next().unwrap_or(decl).trim();

    match base {
        "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" | "serial" | "bigserial" => {
            Some(ColumnType::Integer)
        }
        "real" | "double precision" | "numeric" | "decimal" | "float4" | "float8" => {
            Some(ColumnType::Real)
        }
        "text" | "character varying" | "varchar" | "character" | "char" | "bpchar" => {
            Some(ColumnType::String)
        }
        "boolean" | "bool" => Some(ColumnType::Boolean),
        "date" => Some(ColumnType::Date),
        "bytea" => Some(ColumnType::Bytes),
        _ if base.starts_with("timestamp") => Some(ColumnType::DateTime),
        _ => None,
    }
}

fn read_mysql(decl: &str) -> Option<ColumnType> {
    if decl.starts_with("tinyint(1)") || decl == "boolean" || decl == "bool" {
        return Some(ColumnType::Boolean);
    }

    let base = decl.split(['(', ' ']).next().unwrap_or(decl);

    match base {
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" => {
            Some(ColumnType::Integer)
        }
        "decimal" | "numeric" | "float" | "double" | "real" => Some(ColumnType::Real),
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" => {
            Some(ColumnType::String)
        }
        "date" => Some(ColumnType::Date),
        "datetime" | "timestamp" => Some(ColumnType::DateTime),
        "binary" | "varbinary" | "blob" | "mediumblob" | "longblob" => Some(ColumnType::Bytes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_affinity() {
        let d = Dialect::Sqlite;
        assert_eq!(d.read_column_type("INTEGER"), Some(ColumnType::Integer));
        assert_eq!(d.read_column_type("VARCHAR(128)"), Some(ColumnType::String));
        assert_eq!(d.read_column_type("DATETIME"), Some(ColumnType::DateTime));
        assert_eq!(d.read_column_type("DATE"), Some(ColumnType::Date));
        assert_eq!(d.read_column_type("BOOLEAN"), Some(ColumnType::Boolean));
        assert_eq!(d.read_column_type("DECIMAL(10,2)"), Some(ColumnType::Real));
        assert_eq!(d.read_column_type("GEOMETRY"), None);
    }

    #[test]
    fn postgresql_types() {
        let d = Dialect::Postgresql;
        assert_eq!(d.read_column_type("bigint"), Some(ColumnType::Integer));
        assert_eq!(
            d.read_column_type("timestamp without time zone"),
            Some(ColumnType::DateTime)
        );
        assert_eq!(
            d.read_column_type("character varying(64)"),
            Some(ColumnType::String)
        );
        assert_eq!(d.read_column_type("jsonb"), None);
    }

    #[test]
    fn mysql_types() {
        let d = Dialect::Mysql;
        assert_eq!(d.read_column_type("tinyint(1)"), Some(ColumnType::Boolean));
        assert_eq!(d.read_column_type("int(11)"), Some(ColumnType::Integer));
        assert_eq!(d.read_column_type("bigint unsigned"), Some(ColumnType::Integer));
        assert_eq!(d.read_column_type("longtext"), Some(ColumnType::String));
        assert_eq!(d.read_column_type("set('a','b')"), None);
    }
}
