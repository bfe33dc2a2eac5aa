use crate::{Instance, Result, Schema, Session};

use std::fmt::Debug;

/// Decides which query results the session may see.
///
/// [`InstanceQuery::execute`](crate::InstanceQuery::execute) and
/// [`MultiPrintQuery::execute`](crate::MultiPrintQuery::execute) pass their
/// results through the check installed on the [`Db`](crate::Db). The
/// `execute_without_access_check` variants skip it.
pub trait AccessCheck: Debug + Send + Sync + 'static {
    /// Returns the subset of `instances` the session may access, keeping
    /// their order.
    fn filter(
        &self,
        schema: &Schema,
        session: &Session,
        instances: Vec<Instance>,
    ) -> Result<Vec<Instance>>;
}

/// Grants access to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessCheck for AllowAll {
    fn filter(&self, _: &Schema, _: &Session, instances: Vec<Instance>) -> Result<Vec<Instance>> {
        Ok(instances)
    }
}
