use crate::registers::RegisterIndex;
use std::collections::BTreeMap;

/// Raw register words as reported by the device during a single read-out.
///
/// Keys are the zero-based indices the device uses, i.e. `address - 1`. A register that the
/// unit does not implement is simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    values: BTreeMap<u16, u16>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u16) -> Option<u16> {
        self.values.get(&key).copied()
    }

    pub fn value_of(&self, register: RegisterIndex) -> Option<u16> {
        self.get(register.snapshot_key())
    }

    pub fn contains(&self, register: RegisterIndex) -> bool {
        self.values.contains_key(&register.snapshot_key())
    }

    /// Record the word read at `key`.
    ///
    /// Returns the previous word, if any.
    pub fn insert(&mut self, key: u16, value: u16) -> Option<u16> {
        self.values.insert(key, value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(u16, u16)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (u16, u16)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl Extend<(u16, u16)> for Snapshot {
    fn extend<I: IntoIterator<Item = (u16, u16)>>(&mut self, iter: I) {
        self.values.extend(iter)
    }
}
