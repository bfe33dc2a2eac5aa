use super::ValueSelect;
use crate::{schema::Type, Instance, Result, Schema, Value};

use indexmap::IndexMap;

/// Where a select finds its raw columns inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) select: usize,
    pub(crate) offset: usize,
    pub(crate) width: usize,
}

/// Values of a set of selects, one row per instance.
///
/// Rows arrive keyed by the instance id in column `0`. Every select pulls
/// its own columns through the [`Slot`]s of the statement that produced the
/// row.
#[derive(Debug, Default)]
pub struct Selection {
    selects: Vec<ValueSelect>,
    instances: Vec<Instance>,

    /// Instance id to position in `instances`
    positions: IndexMap<i64, usize>,

    /// Per instance, one value per select
    values: Vec<Vec<Value>>,
}

impl Selection {
    pub(crate) fn new(selects: Vec<ValueSelect>, instances: Vec<Instance>) -> Selection {
        let positions = instances
            .iter()
            .enumerate()
            .map(|(position, instance)| (instance.id, position))
            .collect();

        let values = vec![vec![Value::Null; selects.len()]; instances.len()];

        Selection {
            selects,
            instances,
            positions,
            values,
        }
    }

    pub fn selects(&self) -> &[ValueSelect] {
        &self.selects
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Hands `row` to the selects listed in `slots`. Rows of unknown
    /// instances are ignored.
    pub(crate) fn add_row(
        &mut self,
        schema: &Schema,
        ty: &Type,
        row: &[Value],
        slots: &[Slot],
    ) -> Result<()> {
        let Some(position) = row.first().and_then(Value::as_i64).and_then(|id| self.position(id))
        else {
            return Ok(());
        };

        let instance = self.instances[position];

        for slot in slots {
            let end = (slot.offset + slot.width).min(row.len());
            let columns = row.get(slot.offset..end).unwrap_or_default();
            let value = self.selects[slot.select].value(schema, ty, instance, columns)?;
            self.values[position][slot.select] = value;
        }

        Ok(())
    }

    /// Evaluates a select that needs no columns for every instance.
    pub(crate) fn fill(&mut self, schema: &Schema, ty: &Type, select: usize) -> Result<()> {
        for (position, instance) in self.instances.iter().enumerate() {
            self.values[position][select] = self.selects[select].value(schema, ty, *instance, &[])?;
        }
        Ok(())
    }

    pub(crate) fn set(&mut self, position: usize, select: usize, value: Value) {
        self.values[position][select] = value;
    }

    pub fn get(&self, position: usize, select: usize) -> Option<&Value> {
        self.values.get(position)?.get(select)
    }
}
