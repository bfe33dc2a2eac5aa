use super::{BitEnumId, ColumnType, TableId, TypeId};

/// An attribute of a type, mapped to one or more columns of one table.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,

    /// The type declaring the attribute
    pub parent: TypeId,

    pub table: TableId,

    /// Column names. Simple attributes have exactly one.
    pub sql_col_names: Vec<String>,

    pub kind: AttributeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,

    /// Bit set over the constants of an enum
    BitEnum(BitEnumId),

    /// Status id within the named status group
    Status { group: String },

    /// Foreign key to an instance of `target`
    Link { target: TypeId },

    /// Type discriminator
    Type,

    /// Company the object belongs to
    Company,

    /// Object id
    Id,
}

impl Attribute {
    /// The first (and usually only) column.
    pub fn sql_col_name(&self) -> &str {
        self.sql_col_names.first().map(String::as_str).unwrap_or("")
    }

    pub fn column_type(&self) -> ColumnType {
        self.kind.column_type()
    }

    pub fn is_status(&self) -> bool {
        matches!(self.kind, AttributeKind::Status { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, AttributeKind::Link { .. })
    }
}

impl AttributeKind {
    pub fn column_type(&self) -> ColumnType {
        match self {
            AttributeKind::String => ColumnType::String,
            AttributeKind::Decimal => ColumnType::Real,
            AttributeKind::Boolean => ColumnType::Boolean,
            AttributeKind::Date => ColumnType::Date,
            AttributeKind::DateTime => ColumnType::DateTime,
            AttributeKind::Integer
            | AttributeKind::BitEnum(_)
            | AttributeKind::Status { .. }
            | AttributeKind::Link { .. }
            | AttributeKind::Type
            | AttributeKind::Company
            | AttributeKind::Id => ColumnType::Integer,
        }
    }
}
