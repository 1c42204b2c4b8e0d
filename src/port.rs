//! Port configuration model: per-port identity and VLAN membership,
//! and the `PORTSPEC` grammar parser.

use std::fmt;

use crate::error::SwitchError;
use crate::mac::MacAddr;
use crate::vlan::{VlanId, DEFAULT_VLAN, MAX_VLAN};

/// Highest VID a `PORTSPEC` may name on the command line. Slightly
/// tighter than `vlan::MAX_VLAN` (4094).
pub const MAX_SPEC_VID: u16 = 4092;
/// Maximum number of tagged VLANs a single port may join.
pub const MAX_TAGGED_VLANS: usize = 4092;

/// 1-based port index, matching the driver's channel numbering.
/// Index 0 is reserved for the control channel and is never a valid `PortIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortIndex(u16);

impl PortIndex {
    pub fn new(raw: u16) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PortIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single switch port: identity plus VLAN membership.
#[derive(Debug, Clone)]
pub struct Port {
    pub index: PortIndex,
    pub name: String,
    pub mac: Option<MacAddr>,
    pub untagged_vlan: Option<VlanId>,
    pub tagged_vlans: Vec<VlanId>,
}

impl Port {
    pub fn is_tagged_member(&self, vlan: VlanId) -> bool {
        self.tagged_vlans.contains(&vlan)
    }

    pub fn is_untagged_member(&self, vlan: VlanId) -> bool {
        self.untagged_vlan == Some(vlan)
    }

    pub fn is_member(&self, vlan: VlanId) -> bool {
        self.is_tagged_member(vlan) || self.is_untagged_member(vlan)
    }
}

/// Parse one `PORTSPEC` argument into a `Port` with the given index.
///
/// Grammar:
/// ```text
/// PORTSPEC   := NAME | NAME '[' MEMBERSHIP ']'
/// MEMBERSHIP := 'T' ':' VIDLIST | 'U' ':' VID
/// VIDLIST    := VID (',' VID)*
/// VID        := decimal integer in 0..4092
/// NAME       := non-empty string not containing '['
/// ```
pub fn parse_port_spec(spec: &str, index: PortIndex) -> Result<Port, SwitchError> {
    let fail = |reason: &str| SwitchError::SpecParse {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let Some(bracket_pos) = spec.find('[') else {
        if spec.is_empty() {
            return Err(fail("name must be non-empty"));
        }
        return Ok(Port {
            index,
            name: spec.to_string(),
            mac: None,
            untagged_vlan: Some(DEFAULT_VLAN),
            tagged_vlans: Vec::new(),
        });
    };

    let name = &spec[..bracket_pos];
    if name.is_empty() {
        return Err(fail("name must be non-empty"));
    }
    let rest = &spec[bracket_pos..];
    let Some(membership) = rest.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Err(fail("expected '[...]' membership clause"));
    };
    if membership.contains('[') || membership.contains(']') {
        return Err(fail("malformed membership clause"));
    }

    let (letter, list) = membership
        .split_once(':')
        .ok_or_else(|| fail("membership clause must contain ':'"))?;

    match letter {
        "T" => {
            let mut tagged_vlans = Vec::new();
            for part in list.split(',') {
                let vid = parse_vid(part, &fail)?;
                if tagged_vlans.contains(&vid) {
                    return Err(fail("duplicate VLAN in tagged list"));
                }
                tagged_vlans.push(vid);
            }
            if tagged_vlans.is_empty() {
                return Err(fail("tagged membership requires at least one VID"));
            }
            if tagged_vlans.len() > MAX_TAGGED_VLANS {
                return Err(fail("more than 4092 tagged VLANs for one port"));
            }
            Ok(Port {
                index,
                name: name.to_string(),
                mac: None,
                untagged_vlan: None,
                tagged_vlans,
            })
        }
        "U" => {
            if list.contains(',') {
                return Err(fail("untagged membership takes exactly one VID"));
            }
            let vid = parse_vid(list, &fail)?;
            Ok(Port {
                index,
                name: name.to_string(),
                mac: None,
                untagged_vlan: Some(vid),
                tagged_vlans: Vec::new(),
            })
        }
        other => Err(fail(&format!("unknown membership letter '{other}'"))),
    }
}

fn parse_vid(
    text: &str,
    fail: &dyn Fn(&str) -> SwitchError,
) -> Result<VlanId, SwitchError> {
    let raw: u16 = text
        .trim()
        .parse()
        .map_err(|_| fail(&format!("'{text}' is not a valid VID")))?;
    if raw > MAX_SPEC_VID {
        return Err(fail(&format!("VID {raw} exceeds maximum {MAX_SPEC_VID}")));
    }
    VlanId::new(raw).ok_or_else(|| fail(&format!("VID {raw} exceeds maximum {MAX_VLAN}")))
}

/// Fixed-size table of ports, built once from argv and filled in with
/// driver-reported MACs before any frame is processed.
pub struct PortTable {
    ports: Vec<Port>,
}

impl PortTable {
    pub fn from_specs(specs: &[String]) -> Result<Self, SwitchError> {
        if specs.is_empty() {
            return Err(SwitchError::SpecParse {
                spec: String::new(),
                reason: "at least one PORTSPEC is required".to_string(),
            });
        }

        let mut ports = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let index = PortIndex::new((i + 1) as u16).ok_or_else(|| SwitchError::SpecParse {
                spec: spec.clone(),
                reason: "too many ports for a u16 channel index".to_string(),
            })?;
            ports.push(parse_port_spec(spec, index)?);
        }
        Ok(Self { ports })
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn get(&self, index: PortIndex) -> Option<&Port> {
        self.ports.get(index.get() as usize - 1)
    }

    /// Fill in the MAC address for `index`, as reported by the driver's
    /// startup control message. Called exactly once per port before any
    /// frame is processed.
    pub fn set_mac(&mut self, index: PortIndex, mac: MacAddr) -> Result<(), SwitchError> {
        let port = self
            .ports
            .get_mut(index.get() as usize - 1)
            .ok_or_else(|| SwitchError::ProtocolFraming(format!("no such port {index}")))?;
        port.mac = Some(mac);
        Ok(())
    }

    /// Case-insensitive lookup by name, for diagnostics/CLI use only.
    pub fn find_by_name(&self, name: &str) -> Option<&Port> {
        self.ports
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }
}
