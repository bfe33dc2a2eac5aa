mod type_def;
pub use type_def::TypeDef;

use super::{
    Attribute, AttributeKind, BitEnum, BitEnumId, Schema, SqlTable, Status, TableId, Type, TypeId,
};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Assembles a [`Schema`] from table, type, enum and status declarations.
#[derive(Debug, Default)]
pub struct Builder {
    tables: Vec<SqlTable>,
    types: Vec<TypeDef>,
    bit_enums: Vec<BitEnum>,
    statuses: Vec<Status>,
}

/// Used to track state during the build process
struct BuildSchema<'a> {
    builder: &'a Builder,
    tables: IndexMap<TableId, SqlTable>,
    types: IndexMap<TypeId, Type>,
    bit_enums: IndexMap<BitEnumId, BitEnum>,
}

impl Builder {
    pub fn table(&mut self, table: SqlTable) -> &mut Self {
        self.tables.push(table);
        self
    }

    pub fn ty(&mut self, ty: TypeDef) -> &mut Self {
        self.types.push(ty);
        self
    }

    pub fn bit_enum(&mut self, bit_enum: BitEnum) -> &mut Self {
        self.bit_enums.push(bit_enum);
        self
    }

    pub fn status(&mut self, status: Status) -> &mut Self {
        self.statuses.push(status);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut build = BuildSchema {
            builder: self,
            tables: IndexMap::new(),
            types: IndexMap::new(),
            bit_enums: IndexMap::new(),
        };

        build.build_tables()?;

        for bit_enum in &self.bit_enums {
            bit_enum.validate()?;

            if build.bit_enums.insert(bit_enum.id, bit_enum.clone()).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate bit enum id {}",
                    bit_enum.id.0
                )));
            }
        }

        build.build_types()?;
        build.link_children();
        build.verify_references()?;

        let mut statuses = IndexMap::new();
        for status in &self.statuses {
            if statuses.insert(status.id, status.clone()).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate status id {}",
                    status.id
                )));
            }
        }

        Ok(Schema {
            types: build.types,
            tables: build.tables,
            bit_enums: build.bit_enums,
            statuses,
        })
    }
}

impl BuildSchema<'_> {
    fn build_tables(&mut self) -> Result<()> {
        for table in &self.builder.tables {
            if self.tables.insert(table.id, table.clone()).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate table id {} (`{}`)",
                    table.id.0, table.name
                )));
            }
        }

        for table in self.tables.values() {
            if let Some(main) = table.main_table {
                if !self.tables.contains_key(&main) {
                    return Err(Error::invalid_schema(format!(
                        "table `{}` references unknown main table {}",
                        table.name, main.0
                    )));
                }
            }
        }

        Ok(())
    }

    /// Builds types parents first, whatever order they were declared in.
    fn build_types(&mut self) -> Result<()> {
        let mut pending: Vec<&TypeDef> = self.builder.types.iter().collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = vec![];

            for def in pending {
                let ready = match def.parent {
                    Some(parent) => self.types.contains_key(&parent),
                    None => true,
                };

                if ready {
                    let ty = self.build_type(def)?;
                    if self.types.insert(ty.id, ty).is_some() {
                        return Err(Error::invalid_schema(format!(
                            "duplicate type id {} (`{}`)",
                            def.id.0, def.name
                        )));
                    }
                } else {
                    deferred.push(def);
                }
            }

            if deferred.len() == before {
                let def = deferred[0];
                return Err(Error::invalid_schema(format!(
                    "type `{}` extends unknown type {}",
                    def.name,
                    def.parent.map(|id| id.0).unwrap_or_default()
                )));
            }

            pending = deferred;
        }

        Ok(())
    }

    fn build_type(&self, def: &TypeDef) -> Result<Type> {
        let Some(main) = self.tables.get(&def.main_table) else {
            return Err(Error::invalid_schema(format!(
                "type `{}` references unknown table {}",
                def.name, def.main_table.0
            )));
        };

        let parent = def.parent.and_then(|id| self.types.get(&id));

        let mut attributes = match parent {
            Some(parent) => parent.attributes.clone(),
            None => IndexMap::new(),
        };

        if !attributes.values().any(|attr| attr.kind == AttributeKind::Id) {
            attributes.insert(
                "ID".to_string(),
                Attribute {
                    name: "ID".to_string(),
                    parent: def.id,
                    table: main.id,
                    sql_col_names: vec![main.sql_col_id.clone()],
                    kind: AttributeKind::Id,
                },
            );
        }

        if let Some(column) = &main.sql_col_type {
            if !attributes.values().any(|attr| attr.kind == AttributeKind::Type) {
                attributes.insert(
                    "Type".to_string(),
                    Attribute {
                        name: "Type".to_string(),
                        parent: def.id,
                        table: main.id,
                        sql_col_names: vec![column.clone()],
                        kind: AttributeKind::Type,
                    },
                );
            }
        }

        for attr in &def.attributes {
            let table = attr.table.unwrap_or(main.id);

            let Some(sql_table) = self.tables.get(&table) else {
                return Err(Error::invalid_schema(format!(
                    "attribute `{}.{}` references unknown table {}",
                    def.name, attr.name, table.0
                )));
            };

            if table != main.id && sql_table.main_table != Some(main.id) {
                return Err(Error::invalid_schema(format!(
                    "attribute `{}.{}` is stored in `{}`, which does not join `{}`",
                    def.name, attr.name, sql_table.name, main.name
                )));
            }

            if attr.columns.is_empty() {
                return Err(Error::invalid_schema(format!(
                    "attribute `{}.{}` has no column",
                    def.name, attr.name
                )));
            }

            attributes.insert(
                attr.name.clone(),
                Attribute {
                    name: attr.name.clone(),
                    parent: def.id,
                    table,
                    sql_col_names: attr.columns.clone(),
                    kind: attr.kind.clone(),
                },
            );
        }

        let company_dependent =
            def.company_dependent || parent.is_some_and(|parent| parent.company_dependent);

        if company_dependent && !attributes.values().any(|attr| attr.kind == AttributeKind::Company)
        {
            return Err(Error::invalid_schema(format!(
                "type `{}` is company dependent but has no company attribute",
                def.name
            )));
        }

        let mut tables = vec![main.id];
        for attr in attributes.values() {
            if !tables.contains(&attr.table) {
                tables.push(attr.table);
            }
        }

        Ok(Type {
            id: def.id,
            uuid: def.uuid,
            name: def.name.clone(),
            label: def.label.clone().unwrap_or_else(|| def.name.clone()),
            parent: def.parent,
            children: vec![],
            main_table: main.id,
            tables,
            attributes,
            company_dependent,
            classification: def
                .classification
                .clone()
                .or_else(|| parent.and_then(|parent| parent.classification.clone())),
        })
    }

    fn link_children(&mut self) {
        for def in &self.builder.types {
            if let Some(parent) = def.parent {
                if let Some(parent) = self.types.get_mut(&parent) {
                    parent.children.push(def.id);
                }
            }
        }
    }

    fn verify_references(&self) -> Result<()> {
        for ty in self.types.values() {
            for attr in ty.attributes.values() {
                match &attr.kind {
                    AttributeKind::Link { target } if !self.types.contains_key(target) => {
                        return Err(Error::invalid_schema(format!(
                            "attribute `{}.{}` links to unknown type {}",
                            ty.name, attr.name, target.0
                        )));
                    }
                    AttributeKind::BitEnum(id) if !self.bit_enums.contains_key(id) => {
                        return Err(Error::invalid_schema(format!(
                            "attribute `{}.{}` uses unknown bit enum {}",
                            ty.name, attr.name, id.0
                        )));
                    }
                    _ => {}
                }
            }

            if let Some(classification) = &ty.classification {
                let Some(relation) = self.types.get(&classification.relation_type) else {
                    return Err(Error::invalid_schema(format!(
                        "classification `{}` uses unknown relation type {}",
                        ty.name, classification.relation_type.0
                    )));
                };

                for name in [&classification.link_attribute, &classification.type_attribute] {
                    let Some(attr) = relation.attributes.get(name) else {
                        return Err(Error::unknown_attribute(&relation.name, name));
                    };

                    if attr.table != relation.main_table {
                        return Err(Error::invalid_schema(format!(
                            "classification relation attribute `{}.{}` must be stored in the main table",
                            relation.name, name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
