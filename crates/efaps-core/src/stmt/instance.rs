use crate::schema::TypeId;
use crate::{Error, Result};

use std::fmt;

/// Handle to one business object row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instance {
    pub ty: TypeId,
    pub id: i64,
}

impl Instance {
    pub fn new(ty: impl Into<TypeId>, id: i64) -> Instance {
        Instance { ty: ty.into(), id }
    }

    /// Parses an OID of the form `typeId.objectId`.
    pub fn from_oid(oid: &str) -> Result<Instance> {
        let Some((ty, id)) = oid.split_once('.') else {
            return Err(Error::invalid_oid(oid));
        };

        match (ty.parse::<i64>(), id.parse::<i64>()) {
            (Ok(ty), Ok(id)) => Ok(Instance::new(ty, id)),
            _ => Err(Error::invalid_oid(oid)),
        }
    }

    /// Returns `true` if `oid` looks like `typeId.objectId`.
    pub fn is_oid(oid: &str) -> bool {
        Instance::from_oid(oid).is_ok()
    }

    pub fn oid(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty.0, self.id)
    }
}

impl std::str::FromStr for Instance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Instance> {
        Instance::from_oid(s)
    }
}
