use super::{select::Column, Formatter, Params, ToSql};

use efaps_core::stmt::SqlPart;

impl ToSql for &SqlPart {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            SqlPart::And => fmt!(f, " and "),
            SqlPart::Or => fmt!(f, " or "),
            SqlPart::Not => fmt!(f, "not "),
            SqlPart::Equal => fmt!(f, "="),
            SqlPart::NotEqual => fmt!(f, "<>"),
            SqlPart::Greater => fmt!(f, ">"),
            SqlPart::Less => fmt!(f, "<"),
            SqlPart::Like => fmt!(f, " like "),
            SqlPart::LikeEscape => {
                // MySQL treats the backslash inside the literal as an escape
                // character itself.
                if f.serializer.is_mysql() {
                    fmt!(f, " escape '\\\\'");
                } else {
                    fmt!(f, " escape '\\'");
                }
            }
            SqlPart::In => fmt!(f, " in "),
            SqlPart::NotIn => fmt!(f, " not in "),
            SqlPart::IsNull => fmt!(f, " is null"),
            SqlPart::IsNotNull => fmt!(f, " is not null"),
            SqlPart::ParenOpen => fmt!(f, "("),
            SqlPart::ParenClose => fmt!(f, ")"),
            SqlPart::Comma => fmt!(f, ","),
            SqlPart::Upper => fmt!(f, "upper("),
            SqlPart::Column { table_index, name } => fmt!(f, Column(*table_index, name)),
            SqlPart::Value(value) => fmt!(f, value),
            SqlPart::SubSelect(select) => fmt!(f, &**select),
        }
    }
}
