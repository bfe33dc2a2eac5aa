mod attribute;
pub use attribute::{Attribute, AttributeKind};

mod bit_enum;
pub use bit_enum::{BitEnum, BitEnumId, BitFlag};

mod builder;
pub use builder::{Builder, TypeDef};

mod column_type;
pub use column_type::ColumnType;

mod status;
pub use status::Status;

mod table;
pub use table::{SqlTable, TableId};

mod ty;
pub use ty::{Classification, Type, TypeId};

use crate::{Error, Result};
use indexmap::IndexMap;
use uuid::Uuid;

/// The pre-loaded metadata model queries are built against.
///
/// A schema is immutable once built. Lookups by id panic when the id was not
/// issued by the schema; lookups by UUID or name return `TypeNotFound`.
#[derive(Debug)]
pub struct Schema {
    types: IndexMap<TypeId, Type>,
    tables: IndexMap<TableId, SqlTable>,
    bit_enums: IndexMap<BitEnumId, BitEnum>,
    statuses: IndexMap<i64, Status>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the type with the given id.
    pub fn ty(&self, id: TypeId) -> Result<&Type> {
        self.find_type(id)
            .ok_or_else(|| Error::type_not_found(format!("id={}", id.0)))
    }

    pub fn find_type(&self, id: TypeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn type_by_uuid(&self, uuid: &Uuid) -> Result<&Type> {
        self.types
            .values()
            .find(|ty| ty.uuid == *uuid)
            .ok_or_else(|| Error::type_not_found(format!("uuid={uuid}")))
    }

    pub fn type_by_name(&self, name: &str) -> Result<&Type> {
        self.types
            .values()
            .find(|ty| ty.name == name)
            .ok_or_else(|| Error::type_not_found(format!("name={name}")))
    }

    pub fn types(&self) -> impl ExactSizeIterator<Item = &Type> + '_ {
        self.types.values()
    }

    #[track_caller]
    pub fn table(&self, id: TableId) -> &SqlTable {
        &self.tables[&id]
    }

    pub fn tables(&self) -> impl ExactSizeIterator<Item = &SqlTable> + '_ {
        self.tables.values()
    }

    /// All descendants of `id`, depth first in declaration order. The type
    /// itself is not included.
    pub fn child_types(&self, id: TypeId) -> Vec<TypeId> {
        let mut ret = vec![];
        let mut stack: Vec<TypeId> = match self.types.get(&id) {
            Some(ty) => ty.children.iter().rev().copied().collect(),
            None => return ret,
        };

        while let Some(next) = stack.pop() {
            ret.push(next);
            if let Some(ty) = self.types.get(&next) {
                stack.extend(ty.children.iter().rev().copied());
            }
        }

        ret
    }

    /// Returns `true` if `id` is `ancestor` or one of its descendants.
    pub fn is_kind_of(&self, id: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.types.get(&next).and_then(|ty| ty.parent);
        }
        false
    }

    #[track_caller]
    pub fn bit_enum(&self, id: BitEnumId) -> &BitEnum {
        &self.bit_enums[&id]
    }

    /// Resolves a status key within a status group to its numeric id.
    pub fn status_id(&self, group: &str, key: &str) -> Option<i64> {
        self.statuses
            .values()
            .find(|status| status.group == group && status.key == key)
            .map(|status| status.id)
    }

    pub fn status(&self, id: i64) -> Option<&Status> {
        self.statuses.get(&id)
    }
}
