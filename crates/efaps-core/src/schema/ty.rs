use super::{Attribute, AttributeKind, TableId};
use crate::{Error, Result};

use indexmap::IndexMap;
use uuid::Uuid;

/// A business object type.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub uuid: Uuid,
    pub name: String,
    pub label: String,

    /// The type this one extends
    pub parent: Option<TypeId>,

    /// Direct child types, in declaration order
    pub children: Vec<TypeId>,

    /// Table owning the id sequence of the type
    pub main_table: TableId,

    /// Every table holding attributes of the type, main table first
    pub tables: Vec<TableId>,

    /// Attributes including inherited ones, keyed by name
    pub attributes: IndexMap<String, Attribute>,

    /// Rows are partitioned by company
    pub company_dependent: bool,

    /// Set for classification types
    pub classification: Option<Classification>,
}

/// Relation metadata of a classification type.
///
/// Objects are classified through rows of `relation_type`. Each row links the
/// classified object (`link_attribute`) to the classification type
/// (`type_attribute`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub relation_type: TypeId,
    pub link_attribute: String,
    pub type_attribute: String,
}

/// Uniquely identifies a type
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TypeId(pub i64);

impl Type {
    pub fn attribute(&self, name: &str) -> Result<&Attribute> {
        self.attributes
            .get(name)
            .ok_or_else(|| Error::unknown_attribute(&self.name, name))
    }

    pub fn id_attribute(&self) -> Option<&Attribute> {
        self.attribute_of_kind(&AttributeKind::Id)
    }

    /// The discriminator attribute, present when the main table carries a
    /// type column.
    pub fn type_attribute(&self) -> Option<&Attribute> {
        self.attribute_of_kind(&AttributeKind::Type)
    }

    pub fn company_attribute(&self) -> Option<&Attribute> {
        self.attribute_of_kind(&AttributeKind::Company)
    }

    pub fn status_attribute(&self) -> Option<&Attribute> {
        self.attributes.values().find(|attr| attr.is_status())
    }

    fn attribute_of_kind(&self, kind: &AttributeKind) -> Option<&Attribute> {
        self.attributes.values().find(|attr| attr.kind == *kind)
    }
}

impl From<i64> for TypeId {
    fn from(value: i64) -> TypeId {
        TypeId(value)
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
