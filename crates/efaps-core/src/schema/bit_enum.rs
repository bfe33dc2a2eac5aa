use crate::{Error, Result};

use std::collections::HashSet;

/// An enumeration whose constants are stored together as a bit set in one
/// integer column.
#[derive(Debug, Clone)]
pub struct BitEnum {
    pub id: BitEnumId,
    pub name: String,
    pub flags: Vec<BitFlag>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct BitEnumId(pub usize);

/// One constant of a [`BitEnum`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitFlag {
    pub enum_id: BitEnumId,
    pub name: String,

    /// The bit value, a power of two
    pub value: i64,
}

impl BitEnum {
    /// Largest number of flags an enum may define. A comparison against one
    /// flag expands to `2^(MAX_FLAGS - 1)` stored values.
    pub const MAX_FLAGS: usize = 12;

    /// Creates an enum assigning the flags `1, 2, 4, ...` in order.
    pub fn new(id: BitEnumId, name: impl Into<String>, flags: &[&str]) -> BitEnum {
        let flags = flags
            .iter()
            .enumerate()
            .map(|(index, name)| BitFlag {
                enum_id: id,
                name: name.to_string(),
                // Out of range shifts yield 0 and fail validation
                value: u32::try_from(index)
                    .ok()
                    .and_then(|index| 1_i64.checked_shl(index))
                    .unwrap_or(0),
            })
            .collect();

        BitEnum {
            id,
            name: name.into(),
            flags,
        }
    }

    /// Creates an enum with explicit bit values.
    pub fn with_values(id: BitEnumId, name: impl Into<String>, flags: &[(&str, i64)]) -> BitEnum {
        let flags = flags
            .iter()
            .map(|(name, value)| BitFlag {
                enum_id: id,
                name: name.to_string(),
                value: *value,
            })
            .collect();

        BitEnum {
            id,
            name: name.into(),
            flags,
        }
    }

    pub fn flag(&self, name: &str) -> Option<&BitFlag> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    /// Union of all flag values.
    pub fn mask(&self) -> i64 {
        self.flags.iter().fold(0, |mask, flag| mask | flag.value)
    }

    pub fn max_value(&self) -> i64 {
        self.flags.iter().map(|flag| flag.value).max().unwrap_or(0)
    }

    /// Returns `true` if the stored integer `value` has `flag` set.
    pub fn is_selected(value: i64, flag: &BitFlag) -> bool {
        value & flag.value == flag.value
    }

    /// Checks that the enum has at most [`MAX_FLAGS`](Self::MAX_FLAGS) flags
    /// with distinct names and distinct positive power of two values.
    pub fn validate(&self) -> Result<()> {
        if self.flags.len() > Self::MAX_FLAGS {
            return Err(Error::invalid_schema(format!(
                "bit enum `{}` defines {} flags; at most {} are supported",
                self.name,
                self.flags.len(),
                Self::MAX_FLAGS
            )));
        }

        let mut names = HashSet::new();
        let mut mask = 0;

        for flag in &self.flags {
            if flag.value <= 0 || flag.value & (flag.value - 1) != 0 {
                return Err(Error::invalid_schema(format!(
                    "flag `{}.{}` has value {}, which is not a positive power of two",
                    self.name, flag.name, flag.value
                )));
            }

            if mask & flag.value != 0 {
                return Err(Error::invalid_schema(format!(
                    "flag `{}.{}` reuses bit value {}",
                    self.name, flag.name, flag.value
                )));
            }
            mask |= flag.value;

            if !names.insert(flag.name.as_str()) {
                return Err(Error::invalid_schema(format!(
                    "duplicate flag `{}.{}`",
                    self.name, flag.name
                )));
            }
        }

        Ok(())
    }

    /// Every stored integer that has `flag` set and is made only of this
    /// enum's bits, ascending.
    pub fn values_selecting(&self, flag: &BitFlag) -> Vec<i64> {
        let mask = self.mask();
        if flag.value & !mask != 0 {
            return vec![];
        }

        let others: Vec<i64> = self
            .flags
            .iter()
            .map(|other| other.value)
            .filter(|value| value & flag.value == 0)
            .collect();

        // One stored value per subset of the remaining bits
        let mut values = vec![flag.value];
        for bit in others {
            for index in 0..values.len() {
                let value = values[index] | bit;
                values.push(value);
            }
        }

        values.sort_unstable();
        values.dedup();
        values
    }
}
