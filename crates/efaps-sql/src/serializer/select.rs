use super::{ident::Alias, Comma, Formatter, Ident, Params, Period, ToSql};

use efaps_core::stmt::{FromTable, SelectColumn, SqlSelect};

impl ToSql for &SqlSelect {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let distinct = if self.distinct { "distinct " } else { "" };
        fmt!(f, "select " distinct Comma(&self.columns));

        let mut plain = 0;
        for table in &self.from {
            match table {
                FromTable::Table { .. } => {
                    let prefix = if plain == 0 { " from " } else { ", " };
                    plain += 1;
                    fmt!(f, prefix table);
                }
                FromTable::LeftJoin { .. } => fmt!(f, " " table),
            }
        }

        if !self.filter.is_empty() {
            fmt!(f, " where ");
            for part in &self.filter {
                part.to_sql(f);
            }
        }

        if let Some(limit) = self.limit {
            fmt!(f, " limit " limit);
        }
    }
}

impl ToSql for &SelectColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        Column(self.table_index, &self.name).to_sql(f);
    }
}

impl ToSql for &FromTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            FromTable::Table { name, index } => {
                fmt!(f, Ident(name));
                if let Some(index) = index {
                    fmt!(f, " " Alias(*index));
                }
            }
            FromTable::LeftJoin {
                name,
                index,
                column,
                join_index,
                join_column,
            } => {
                fmt!(
                    f,
                    "left join " Ident(name) " " Alias(*index)
                    " on " Column(Some(*join_index), join_column)
                    "=" Column(Some(*index), column)
                );
            }
        }
    }
}

/// A column, qualified by its table alias when an index is given
pub(super) struct Column<'a>(pub(super) Option<usize>, pub(super) &'a str);

impl ToSql for Column<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.0 {
            Some(index) => fmt!(f, Period([Ident(format!("T{index}")), Ident(self.1.to_string())])),
            None => fmt!(f, Ident(self.1)),
        }
    }
}
