mod attribute_query;
pub use attribute_query::AttributeQuery;

mod cached_result;
pub use cached_result::CachedResult;

mod instance_query;
pub use instance_query::InstanceQuery;

mod print_query;
pub use print_query::MultiPrintQuery;

mod query_builder;
pub use query_builder::QueryBuilder;

mod selection;
pub use selection::Selection;

mod statement_runner;
pub use statement_runner::StatementRunner;

mod table_index;
pub use table_index::TableIndex;

mod value_select;
pub use value_select::{SelectStep, ValueSelect};
