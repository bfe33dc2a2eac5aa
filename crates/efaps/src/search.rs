//! The predicate tree of a query.
//!
//! A tree is built from [`QPart`] nodes, prepared once against the queried
//! type and then appended to the `where` clause of a [`SqlSelect`].
//! Preparation resolves attributes, allocates table aliases and rewrites
//! values (case folding, pattern escaping, status and OID resolution).
//!
//! [`SqlSelect`]: efaps_core::stmt::SqlSelect

mod attribute;
pub use attribute::QAttribute;

mod class_equal;
pub use class_equal::QClassEqual;

mod compare;
pub use compare::QAttrCompare;

mod in_query;
pub use in_query::QIn;

mod part;
pub use part::QPart;

mod value;
pub use value::{QBitValue, QStringValue, QValue};

use crate::{db::QueryEnv, query::TableIndex, schema::Type};

/// State threaded through the preparation of one predicate tree.
pub(crate) struct PrepareCx<'a, 'b> {
    pub(crate) env: QueryEnv<'a>,

    /// The queried type
    pub(crate) ty: &'a Type,

    /// Aliases of the enclosing query
    pub(crate) index: &'b mut TableIndex,
}
