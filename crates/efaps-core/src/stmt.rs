mod instance;
pub use instance::Instance;

mod part;
pub use part::SqlPart;

mod row_set;
pub use row_set::RowSet;

mod select;
pub use select::{FromTable, SelectColumn, SqlSelect};

mod value;
pub use value::Value;

mod value_chrono;
pub use value_chrono::{DATE_FORMAT, DATE_TIME_FORMAT};
