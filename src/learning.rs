//! Bounded MAC learning table: a fixed-capacity FIFO associative
//! store from MAC address to egress port, with move-on-change semantics.
//!
//! A hash map with an LRU or aging policy would work too, but the fixed
//! array keeps the bounded-size and move-on-change invariants trivial
//! to audit, which is the point here.

use crate::mac::MacAddr;
use crate::port::PortIndex;

const DEFAULT_CAPACITY: usize = 8;

pub struct LearningTable {
    slots: Vec<Option<(MacAddr, PortIndex)>>,
    cursor: usize,
}

impl Default for LearningTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LearningTable {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "learning table capacity must be positive");
        Self {
            slots: vec![None; capacity],
            cursor: 0,
        }
    }

    /// Record that `mac` was last seen as a source on `port`.
    ///
    /// If `mac` is already present, its port is updated in place (no
    /// slot consumed, no reordering). Otherwise the entry is written at
    /// the write cursor, overwriting whatever occupied that slot, and
    /// the cursor advances modulo capacity.
    ///
    /// Precondition: `mac` is unicast. Broadcast/multicast sources are
    /// rejected by the forwarding engine before `learn` is ever called;
    /// this is enforced here defensively rather than silently ignored,
    /// since a violation would indicate a bug upstream.
    pub fn learn(&mut self, mac: MacAddr, port: PortIndex) {
        debug_assert!(mac.is_unicast(), "learning table never stores multicast MACs");

        if let Some(slot) = self.slots.iter_mut().flatten().find(|(m, _)| *m == mac) {
            slot.1 = port;
            return;
        }

        self.slots[self.cursor] = Some((mac, port));
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// Look up the egress port learned for `mac`. Multicast/broadcast
    /// MACs always return `None` without scanning the table.
    pub fn lookup(&self, mac: MacAddr) -> Option<PortIndex> {
        if mac.is_multicast() {
            return None;
        }
        self.slots
            .iter()
            .flatten()
            .find(|(m, _)| *m == mac)
            .map(|(_, port)| *port)
    }

    #[cfg(test)]
    fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, last])
    }

    fn port(n: u16) -> PortIndex {
        PortIndex::new(n).unwrap()
    }

    #[test]
    fn learn_then_lookup() {
        let mut table = LearningTable::with_capacity(2);
        table.learn(mac(1), port(1));
        assert_eq!(table.lookup(mac(1)), Some(port(1)));
        assert_eq!(table.lookup(mac(2)), None);
    }

    #[test]
    fn move_on_change_updates_in_place_without_consuming_a_slot() {
        let mut table = LearningTable::with_capacity(2);
        table.learn(mac(1), port(1));
        table.learn(mac(1), port(2));
        assert_eq!(table.lookup(mac(1)), Some(port(2)));
        assert_eq!(table.occupied_count(), 1);
    }

    #[test]
    fn repeated_learn_same_port_is_idempotent() {
        let mut table = LearningTable::with_capacity(4);
        table.learn(mac(1), port(1));
        table.learn(mac(1), port(1));
        assert_eq!(table.occupied_count(), 1);
        assert_eq!(table.lookup(mac(1)), Some(port(1)));
    }

    #[test]
    fn fifo_eviction_when_full() {
        let mut table = LearningTable::with_capacity(2);
        table.learn(mac(1), port(1));
        table.learn(mac(2), port(1));
        // capacity exhausted; next distinct MAC evicts the oldest (mac 1)
        table.learn(mac(3), port(1));

        assert_eq!(table.lookup(mac(1)), None);
        assert_eq!(table.lookup(mac(2)), Some(port(1)));
        assert_eq!(table.lookup(mac(3)), Some(port(1)));
        assert_eq!(table.occupied_count(), 2);
    }

    #[test]
    fn bounded_size_never_exceeds_capacity() {
        let mut table = LearningTable::with_capacity(3);
        for i in 0..10u8 {
            table.learn(mac(i), port(1));
        }
        assert_eq!(table.occupied_count(), 3);
    }

    #[test]
    fn lookup_never_matches_multicast_or_broadcast() {
        let table = LearningTable::with_capacity(4);
        assert_eq!(table.lookup(MacAddr::BROADCAST), None);
        assert_eq!(table.lookup(MacAddr::new([0x01, 0, 0, 0, 0, 1])), None);
    }
}
