use crate::schema::{AttributeKind, Classification, TableId, TypeId};

use uuid::Uuid;

/// Declaration of a type handed to [`Builder::ty`](super::Builder::ty).
///
/// Attributes declared here are added on top of the ones inherited from the
/// parent. `ID` and, when the main table has a discriminator column, `Type`
/// are added by the builder.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub(super) id: TypeId,
    pub(super) uuid: Uuid,
    pub(super) name: String,
    pub(super) label: Option<String>,
    pub(super) parent: Option<TypeId>,
    pub(super) main_table: TableId,
    pub(super) company_dependent: bool,
    pub(super) classification: Option<Classification>,
    pub(super) attributes: Vec<AttributeDef>,
}

#[derive(Debug, Clone)]
pub(super) struct AttributeDef {
    pub(super) name: String,

    /// `None` places the attribute in the type's main table
    pub(super) table: Option<TableId>,

    pub(super) columns: Vec<String>,
    pub(super) kind: AttributeKind,
}

impl TypeDef {
    pub fn new(
        id: impl Into<TypeId>,
        name: impl Into<String>,
        main_table: impl Into<TableId>,
    ) -> TypeDef {
        TypeDef {
            id: id.into(),
            uuid: Uuid::new_v4(),
            name: name.into(),
            label: None,
            parent: None,
            main_table: main_table.into(),
            company_dependent: false,
            classification: None,
            attributes: vec![],
        }
    }

    pub fn uuid(mut self, uuid: Uuid) -> TypeDef {
        self.uuid = uuid;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> TypeDef {
        self.label = Some(label.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<TypeId>) -> TypeDef {
        self.parent = Some(parent.into());
        self
    }

    pub fn company_dependent(mut self) -> TypeDef {
        self.company_dependent = true;
        self
    }

    pub fn classification(mut self, classification: Classification) -> TypeDef {
        self.classification = Some(classification);
        self
    }

    /// Declares an attribute stored in one column of the main table.
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        column: impl Into<String>,
        kind: AttributeKind,
    ) -> TypeDef {
        self.attributes.push(AttributeDef {
            name: name.into(),
            table: None,
            columns: vec![column.into()],
            kind,
        });
        self
    }

    /// Declares an attribute stored in `table`, which must be the main table or
    /// a table whose main table is the type's main table.
    pub fn attribute_in(
        mut self,
        name: impl Into<String>,
        table: impl Into<TableId>,
        columns: &[&str],
        kind: AttributeKind,
    ) -> TypeDef {
        self.attributes.push(AttributeDef {
            name: name.into(),
            table: Some(table.into()),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            kind,
        });
        self
    }
}
