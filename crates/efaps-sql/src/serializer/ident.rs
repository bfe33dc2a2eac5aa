use super::{Formatter, Params, ToSql};

/// A quoted identifier
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let quote = if f.serializer.is_mysql() { '`' } else { '"' };

        f.dst.push(quote);
        for c in self.0.as_ref().chars() {
            if c == quote {
                f.dst.push(quote);
            }
            f.dst.push(c);
        }
        f.dst.push(quote);
    }
}

/// Alias of the table registered at the given index, `T{index}`
pub(super) struct Alias(pub(super) usize);

impl ToSql for Alias {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        Ident(format!("T{}", self.0)).to_sql(f);
    }
}
