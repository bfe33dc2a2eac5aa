use super::{SqlSelect, Value};

/// One token of a `where` clause.
///
/// The serializer renders parts in order, so callers are responsible for
/// balancing parentheses. [`SqlPart::Upper`] opens a function call that is
/// closed by a later [`SqlPart::ParenClose`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlPart {
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    Greater,
    Less,
    Like,

    /// `escape '\'` following a like pattern
    LikeEscape,

    In,
    NotIn,
    IsNull,
    IsNotNull,
    ParenOpen,
    ParenClose,
    Comma,

    /// `upper(`
    Upper,

    /// A column, qualified by its table alias when `table_index` is set
    Column {
        table_index: Option<usize>,
        name: String,
    },

    /// A literal, bound as a parameter or inlined
    Value(Value),

    /// A nested select, rendered without surrounding parentheses
    SubSelect(Box<SqlSelect>),
}

impl SqlPart {
    pub fn column(table_index: usize, name: impl Into<String>) -> SqlPart {
        SqlPart::Column {
            table_index: Some(table_index),
            name: name.into(),
        }
    }

    pub fn value(value: impl Into<Value>) -> SqlPart {
        SqlPart::Value(value.into())
    }
}

impl From<Value> for SqlPart {
    fn from(value: Value) -> SqlPart {
        SqlPart::Value(value)
    }
}
