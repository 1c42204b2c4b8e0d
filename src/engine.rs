//! The `Switch` aggregate and forwarding engine.
//!
//! `Switch` owns the port table and learning table and is the only
//! stateful piece of the core; the engine method borrows `&mut self`
//! rather than reaching into process-wide globals. This module has no
//! `tracing` dependency: drop decisions are reported as `DropReason`
//! values and it is the IO loop's job to log them, keeping the pure
//! decision logic trivially unit-testable.

use crate::codec::{self, ParsedEthernet};
use crate::error::DropReason;
use crate::learning::LearningTable;
use crate::mac::MacAddr;
use crate::port::{Port, PortIndex, PortTable};
use crate::vlan::{Tci, VlanId};

/// One frame to emit: the egress port and the fully transformed bytes.
pub type Emission = (PortIndex, Vec<u8>);

pub struct Switch {
    pub ports: PortTable,
    learning: LearningTable,
}

impl Switch {
    pub fn new(ports: PortTable) -> Self {
        Self {
            ports,
            learning: LearningTable::default(),
        }
    }

    pub fn with_learning_capacity(ports: PortTable, capacity: usize) -> Self {
        Self {
            ports,
            learning: LearningTable::with_capacity(capacity),
        }
    }

    /// Classify, learn from, and forward one ingress frame.
    ///
    /// `Ok` carries the list of `(egress_port, bytes)` pairs to emit;
    /// it is never empty (an empty egress set is reported as
    /// `Err(DropReason::UnknownEgress)` instead). `Err` carries the
    /// reason the frame produced no emissions at all, purely for
    /// diagnostics; it is never a process failure.
    pub fn forward(&mut self, ingress: PortIndex, frame: &[u8]) -> Result<Vec<Emission>, DropReason> {
        let parsed = codec::parse_ethernet(frame)?;

        if parsed.src.is_multicast() {
            return Err(DropReason::BadSource);
        }
        self.learning.learn(parsed.src, ingress);

        let ingress_port = self
            .ports
            .get(ingress)
            .expect("ingress index is always valid: it comes from the port table itself");

        let v_in = ingress_vlan(ingress_port, &parsed)?;

        let egress_candidates: Vec<&Port> = self
            .ports
            .iter()
            .filter(|p| p.index != ingress && p.is_member(v_in))
            .collect();

        let targets = self.select_targets(&parsed, egress_candidates)?;

        let emissions = targets
            .into_iter()
            .map(|port| (port.index, transform_for_egress(port, &parsed, v_in)))
            .collect::<Vec<_>>();

        if emissions.is_empty() {
            return Err(DropReason::UnknownEgress);
        }
        Ok(emissions)
    }

    /// Directed unicast vs. flood. `egress_candidates` already
    /// excludes the ingress port and is restricted to VLAN `v_in`.
    fn select_targets<'a>(
        &self,
        parsed: &ParsedEthernet<'_>,
        egress_candidates: Vec<&'a Port>,
    ) -> Result<Vec<&'a Port>, DropReason> {
        if parsed.dst.is_unicast() {
            if let Some(learned) = self.learning.lookup(parsed.dst) {
                return match egress_candidates.into_iter().find(|p| p.index == learned) {
                    Some(target) => Ok(vec![target]),
                    None => Err(DropReason::CrossVlanLearned),
                };
            }
        }
        Ok(egress_candidates)
    }
}

/// The ingress VLAN, or `VlanMismatch` if the ingress port has
/// no membership matching the frame's tag state.
fn ingress_vlan(ingress_port: &Port, parsed: &ParsedEthernet<'_>) -> Result<VlanId, DropReason> {
    match parsed.tag {
        Some(tag) => {
            if ingress_port.is_tagged_member(tag.vlan) {
                Ok(tag.vlan)
            } else {
                Err(DropReason::VlanMismatch)
            }
        }
        None => ingress_port.untagged_vlan.ok_or(DropReason::VlanMismatch),
    }
}

/// Per-egress-port transform, driven by the *egress* port's own
/// membership kind (not the ingress port's).
fn transform_for_egress(egress: &Port, parsed: &ParsedEthernet<'_>, v_in: VlanId) -> Vec<u8> {
    if egress.is_tagged_member(v_in) {
        let tci = parsed.tag.unwrap_or_else(|| Tci::inserted(v_in));
        codec::emit_tagged(parsed.src, parsed.dst, tci, parsed.ethertype, parsed.payload)
    } else {
        codec::emit_untagged(parsed.src, parsed.dst, parsed.ethertype, parsed.payload)
    }
}

/// Exposed for the IO loop's control-message handling: whether `mac`
/// would be accepted as a legal source (unicast). Frame codec and
/// learning table both assume this has already been checked.
pub fn is_legal_source(mac: MacAddr) -> bool {
    mac.is_unicast()
}
