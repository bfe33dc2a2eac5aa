pub mod serializer;
pub use serializer::{Bind, Inline, Params, Serializer};
