use crate::registers::RegisterIndex;

/// A bit per modbus address.
pub struct RegisterBitmask([u64; (u16::MAX as usize + 1) / u64::BITS as usize]);

impl RegisterBitmask {
    pub fn new() -> Self {
        Self([0; _])
    }

    fn word_bit_mask(&self, address: u16) -> (usize, u64) {
        let word = (u32::from(address) / u64::BITS) as usize;
        let bit_mask = 1 << u64::from(u32::from(address) % u64::BITS);
        (word, bit_mask)
    }

    pub fn is_set(&self, address: u16) -> bool {
        let (word, bitmask) = self.word_bit_mask(address);
        (self.0[word] & bitmask) != 0
    }

    /// Returns `true` if the bit was not set before.
    pub fn set(&mut self, address: u16) -> bool {
        let (word, bitmask) = self.word_bit_mask(address);
        let was_set = (self.0[word] & bitmask) != 0;
        self.0[word] |= bitmask;
        !was_set
    }

    pub fn iter(&self) -> SetBitsIterator<'_> {
        SetBitsIterator::new(self)
    }

    /// Finds the fewest ranges of at most `max_range_len` addresses covering every set bit.
    ///
    /// Ties are broken by the total number of addresses covered, so that the device is asked
    /// to read out as few unwanted registers as possible.
    pub fn find_optimal_ranges(&self, max_range_len: u16) -> Vec<std::ops::RangeInclusive<u16>> {
        let set_bits: Vec<u16> = self.iter().collect();
        let n = set_bits.len();
        if n == 0 {
            return Vec::new();
        }
        let mut dp: Vec<(u32, u64)> = vec![(0, 0); n + 1];
        let mut choices: Vec<usize> = vec![0; n];
        for i in (0..n).rev() {
            let mut best_cost = (u32::MAX, u64::MAX);
            let mut best_choice_j = i;
            for j in i..n {
                let range_len = set_bits[j].saturating_sub(set_bits[i]).saturating_add(1);
                if range_len > max_range_len && j != i {
                    break;
                }
                let cost_of_rest = dp[j + 1];
                let cost = (1 + cost_of_rest.0, u64::from(range_len) + cost_of_rest.1);
                if cost < best_cost {
                    best_cost = cost;
                    best_choice_j = j;
                }
            }
            dp[i] = best_cost;
            choices[i] = best_choice_j;
        }
        let mut ranges = Vec::new();
        let mut current = 0;
        while current < n {
            let end = choices[current];
            ranges.push(set_bits[current]..=set_bits[end]);
            current = end + 1;
        }
        ranges
    }
}

impl Default for RegisterBitmask {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SetBitsIterator<'a> {
    bitmask: &'a RegisterBitmask,
    word_index: usize,
    current_word_val: u64,
}

impl<'a> SetBitsIterator<'a> {
    pub fn new(bitmask: &'a RegisterBitmask) -> Self {
        SetBitsIterator { bitmask, word_index: 0, current_word_val: bitmask.0[0] }
    }
}

impl<'a> Iterator for SetBitsIterator<'a> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word_val == 0 {
                self.word_index += 1;
                self.current_word_val = self.bitmask.0.get(self.word_index).copied()?;
                continue;
            }
            let set_bit_pos = self.current_word_val.trailing_zeros() as usize;
            let address = self.word_index * (u64::BITS as usize) + set_bit_pos;
            self.current_word_val &= self.current_word_val - 1;
            return Some(address as u16);
        }
    }
}

/// The registers to read out on every refresh.
///
/// Registers are only ever added: once something has asked for a register it stays polled for
/// the lifetime of the set.
#[derive(Default)]
pub struct PollingSet {
    registers: Vec<RegisterIndex>,
    addresses: Box<RegisterBitmask>,
}

impl PollingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `register` to the set, along with the high word partner of a 32-bit register.
    ///
    /// Returns `true` if the set has changed.
    pub fn require(&mut self, register: RegisterIndex) -> bool {
        let mut changed = self.insert(register);
        if let Some(high) = register.high_word() {
            changed |= self.insert(high);
        }
        changed
    }

    fn insert(&mut self, register: RegisterIndex) -> bool {
        if !self.addresses.set(register.address()) {
            return false;
        }
        tracing::debug!(register = register.name(), address = register.address(), "polling");
        self.registers.push(register);
        true
    }

    pub fn contains(&self, register: RegisterIndex) -> bool {
        self.addresses.is_set(register.address())
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Registers in the order they were first required.
    pub fn registers(&self) -> &[RegisterIndex] {
        &self.registers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::lookup;

    fn bitmask(addresses: &[u16]) -> RegisterBitmask {
        let mut mask = RegisterBitmask::new();
        for &a in addresses {
            mask.set(a);
        }
        mask
    }

    #[test]
    fn set_bits_are_iterated_in_order() {
        let mask = bitmask(&[65535, 3, 64, 1, 63]);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![1, 3, 63, 64, 65535]);
        assert!(mask.is_set(65535));
        assert!(!mask.is_set(2));
        assert_eq!(RegisterBitmask::new().iter().next(), None);
    }

    #[test]
    fn ranges_cover_everything_in_as_few_reads_as_possible() {
        let mask = bitmask(&[1001, 1002, 1110, 1111, 1112, 3101, 3103]);
        assert_eq!(mask.find_optimal_ranges(123), vec![1001..=1112, 3101..=3103]);
        assert_eq!(mask.find_optimal_ranges(10), vec![1001..=1002, 1110..=1112, 3101..=3103]);
        assert_eq!(mask.find_optimal_ranges(1).len(), 7);
        assert!(RegisterBitmask::new().find_optimal_ranges(123).is_empty());
    }

    #[test]
    fn require_is_idempotent() {
        let mut set = PollingSet::new();
        let oat = lookup("SENSOR_OAT").unwrap();
        assert!(set.require(oat));
        assert_eq!(set.len(), 1);
        assert!(!set.require(oat));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn require_adds_high_word_partner_once() {
        let mut set = PollingSet::new();
        let low = lookup("FILTER_REMAINING_TIME_L").unwrap();
        let high = lookup("FILTER_REMAINING_TIME_H").unwrap();
        assert!(set.require(low));
        assert_eq!(set.registers(), &[low, high]);
        assert!(!set.require(low));
        assert_eq!(set.len(), 2);
        assert!(!set.require(high));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn require_low_word_after_high_word_adds_only_the_low_word() {
        let mut set = PollingSet::new();
        let low = lookup("USERMODE_REMAINING_TIME_L").unwrap();
        let high = lookup("USERMODE_REMAINING_TIME_H").unwrap();
        assert!(set.require(high));
        assert!(set.require(low));
        assert_eq!(set.registers(), &[high, low]);
        assert!(set.contains(low) && set.contains(high));
    }
}
