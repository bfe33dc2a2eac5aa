use super::PrepareCx;
use crate::{schema::TypeId, Error, Result, Value};

use efaps_core::stmt::{SqlPart, SqlSelect};
use indexmap::{map::Entry, IndexMap};

/// Restricts the queried objects to those classified by one of `classes`
/// or their sub-classifications.
///
/// Classifications live in relation tables keyed by the object id, so the
/// comparison renders as `T0.ID in (select LINK from REL where TYPE in (..))`,
/// one membership test per relation type.
#[derive(Debug, Clone)]
pub struct QClassEqual {
    classes: Vec<TypeId>,
    resolved: Option<Resolved>,
}

#[derive(Debug, Clone)]
struct Resolved {
    /// Id column of the queried main table
    id_column: String,
    relations: Vec<Relation>,
}

#[derive(Debug, Clone)]
struct Relation {
    table: String,
    link_column: String,
    type_column: String,
    type_ids: Vec<i64>,
}

impl QClassEqual {
    pub fn new(classes: Vec<TypeId>) -> QClassEqual {
        QClassEqual {
            classes,
            resolved: None,
        }
    }

    pub fn classes(&self) -> &[TypeId] {
        &self.classes
    }

    pub(crate) fn prepare(&mut self, cx: &mut PrepareCx<'_, '_>) -> Result<()> {
        if self.resolved.is_some() {
            return Ok(());
        }

        if self.classes.is_empty() {
            return Err(Error::invalid_statement("classification without classes"));
        }

        let schema = cx.env.schema;
        let mut relations = IndexMap::<TypeId, Relation>::new();

        for class in &self.classes {
            let ty = schema.ty(*class)?;
            let Some(classification) = &ty.classification else {
                return Err(Error::invalid_statement(format!(
                    "type `{}` is not a classification",
                    ty.name
                )));
            };

            let relation = match relations.entry(classification.relation_type) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let relation_type = schema.ty(classification.relation_type)?;
                    let link = relation_type.attribute(&classification.link_attribute)?;
                    let type_attr = relation_type.attribute(&classification.type_attribute)?;

                    entry.insert(Relation {
                        table: schema.table(link.table).name.clone(),
                        link_column: link.sql_col_name().to_string(),
                        type_column: type_attr.sql_col_name().to_string(),
                        type_ids: vec![],
                    })
                }
            };

            for id in std::iter::once(*class).chain(schema.child_types(*class)) {
                if !relation.type_ids.contains(&id.0) {
                    relation.type_ids.push(id.0);
                }
            }
        }

        self.resolved = Some(Resolved {
            id_column: schema.table(cx.ty.main_table).sql_col_id.clone(),
            relations: relations.into_values().collect(),
        });
        Ok(())
    }

    pub(crate) fn append_sql(&self, select: &mut SqlSelect) -> Result<()> {
        let Some(resolved) = &self.resolved else {
            return Err(Error::invalid_statement(
                "classification used before preparation",
            ));
        };

        let grouped = resolved.relations.len() > 1;
        if grouped {
            select.push(SqlPart::ParenOpen);
        }

        for (i, relation) in resolved.relations.iter().enumerate() {
            if i > 0 {
                select.push(SqlPart::Or);
            }

            let mut sub = SqlSelect::new()
                .column_unqualified(&relation.link_column)
                .from_unaliased(&relation.table);
            sub.push(SqlPart::Column {
                table_index: None,
                name: relation.type_column.clone(),
            })
            .push(SqlPart::In)
            .push_value(Value::List(
                relation.type_ids.iter().copied().map(Value::I64).collect(),
            ));

            select
                .push_column(0, &resolved.id_column)
                .push(SqlPart::In)
                .push(SqlPart::ParenOpen)
                .push(SqlPart::SubSelect(Box::new(sub)))
                .push(SqlPart::ParenClose);
        }

        if grouped {
            select.push(SqlPart::ParenClose);
        }

        Ok(())
    }
}
