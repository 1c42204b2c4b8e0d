//! Error taxonomy. Fatal, process-ending causes are modeled as
//! [`SwitchError`] and propagate via `Result`; per-frame drop causes are
//! modeled as [`DropReason`] and never leave the engine as an `Err` that
//! reaches `main` (a dropped frame is not a process failure).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("invalid port spec {spec:?}: {reason}")]
    SpecParse { spec: String, reason: String },

    #[error("malformed envelope: {0}")]
    ProtocolFraming(String),

    #[error("write to driver failed")]
    WriteFailure(#[from] std::io::Error),
}

/// Why a single frame was silently discarded. Never implements
/// `std::error::Error`: it is a diagnostic value, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Payload shorter than 14 bytes, or tagged but shorter than 18.
    ShortFrame,
    /// Source MAC has the multicast/broadcast bit set.
    BadSource,
    /// Ingress port is not a member of the frame's VLAN.
    VlanMismatch,
    /// Destination was learned on a port outside the ingress VLAN's egress set.
    CrossVlanLearned,
    /// The computed egress set was empty (no peer ports in this VLAN).
    UnknownEgress,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::ShortFrame => "short_frame",
            DropReason::BadSource => "bad_source",
            DropReason::VlanMismatch => "vlan_mismatch",
            DropReason::CrossVlanLearned => "cross_vlan_learned",
            DropReason::UnknownEgress => "unknown_egress",
        }
    }
}
