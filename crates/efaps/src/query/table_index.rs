use crate::schema::{SqlTable, TableId};

use indexmap::IndexMap;
use tracing::trace;

/// Assigns the `T{n}` aliases of one query.
///
/// Index `0` belongs to the main table of the queried type and is seeded
/// before anything else is resolved. Every other table gets the next free
/// index the first time it is referenced and is left joined on the id
/// column.
#[derive(Debug, Clone, Default)]
pub struct TableIndex {
    tables: IndexMap<TableId, usize>,
}

impl TableIndex {
    pub fn new() -> TableIndex {
        TableIndex::default()
    }

    /// Resets the index to hold only `main` at index `0`.
    pub fn seed(&mut self, main: &SqlTable) {
        self.tables.clear();
        self.tables.insert(main.id, 0);
    }

    /// Returns the alias index of `table`, allocating one if needed.
    pub fn index_of(&mut self, table: &SqlTable) -> usize {
        if let Some(index) = self.tables.get(&table.id) {
            return *index;
        }

        let index = self
            .tables
            .values()
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);

        trace!(table = %table.name, index, "allocated table index");
        self.tables.insert(table.id, index);
        index
    }

    pub fn get(&self, table: TableId) -> Option<usize> {
        self.tables.get(&table).copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables other than the seeded main table, in allocation order.
    pub fn joined(&self) -> impl Iterator<Item = (TableId, usize)> + '_ {
        self.tables
            .iter()
            .filter(|(_, index)| **index != 0)
            .map(|(table, index)| (*table, *index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_main_table_keeps_index_zero() {
        let main = SqlTable::new(1, "T_PERSON");
        let mut index = TableIndex::new();
        index.seed(&main);

        assert_eq!(index.index_of(&main), 0);
        assert_eq!(index.joined().count(), 0);
    }

    #[test]
    fn allocation_is_injective_and_stable() {
        let main = SqlTable::new(1, "T_PERSON");
        let ext = SqlTable::new(2, "T_PERSONEXT").main_table(1);
        let addr = SqlTable::new(3, "T_ADDRESS").main_table(1);

        let mut index = TableIndex::new();
        index.seed(&main);

        let a = index.index_of(&ext);
        let b = index.index_of(&addr);
        assert_eq!((a, b), (1, 2));
        assert_eq!(index.index_of(&ext), 1);
        assert_eq!(index.index_of(&addr), 2);
        assert_eq!(
            index.joined().collect::<Vec<_>>(),
            vec![(TableId(2), 1), (TableId(3), 2)]
        );
    }

    #[test]
    fn seeding_resets_previous_allocations() {
        let main = SqlTable::new(1, "T_PERSON");
        let ext = SqlTable::new(2, "T_PERSONEXT");

        let mut index = TableIndex::new();
        index.seed(&main);
        index.index_of(&ext);
        index.seed(&main);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(TableId(2)), None);
    }
}
