//! Ethernet frame codec: parsing and emission of the Ethernet
//! header and optional 802.1Q tag. Pure functions over byte slices,
//! no port or learning-table state, no `tracing` dependency, fully
//! unit-testable in isolation.

use crate::error::DropReason;
use crate::mac::MacAddr;
use crate::vlan::Tci;

pub const TPID_8021Q: u16 = 0x8100;
const UNTAGGED_HEADER_LEN: usize = 14;
const TAGGED_HEADER_LEN: usize = 18;

/// A parsed Ethernet header (and optional 802.1Q tag), borrowing the
/// original payload slice rather than copying it.
#[derive(Debug)]
pub struct ParsedEthernet<'a> {
    pub dst: MacAddr,
    pub src: MacAddr,
    /// Inner EtherType: the tag's ethertype if tagged, else the header ethertype.
    pub ethertype: u16,
    pub tag: Option<Tci>,
    pub payload: &'a [u8],
}

/// Parse an Ethernet header off the wire.
///
/// Drops (returns `Err`) frames shorter than 14 bytes, or frames that
/// declare an 802.1Q TPID but are shorter than 18 bytes.
pub fn parse_ethernet(data: &[u8]) -> Result<ParsedEthernet<'_>, DropReason> {
    if data.len() < UNTAGGED_HEADER_LEN {
        return Err(DropReason::ShortFrame);
    }

    let dst = MacAddr::new([data[0], data[1], data[2], data[3], data[4], data[5]]);
    let src = MacAddr::new([data[6], data[7], data[8], data[9], data[10], data[11]]);
    let tpid_or_ethertype = u16::from_be_bytes([data[12], data[13]]);

    if tpid_or_ethertype == TPID_8021Q {
        if data.len() < TAGGED_HEADER_LEN {
            return Err(DropReason::ShortFrame);
        }
        let raw_tci = u16::from_be_bytes([data[14], data[15]]);
        let ethertype = u16::from_be_bytes([data[16], data[17]]);
        Ok(ParsedEthernet {
            dst,
            src,
            ethertype,
            tag: Some(Tci::from_raw(raw_tci)),
            payload: &data[TAGGED_HEADER_LEN..],
        })
    } else {
        Ok(ParsedEthernet {
            dst,
            src,
            ethertype: tpid_or_ethertype,
            tag: None,
            payload: &data[UNTAGGED_HEADER_LEN..],
        })
    }
}

/// Emit an untagged Ethernet frame: 14-byte header followed by payload.
pub fn emit_untagged(src: MacAddr, dst: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(UNTAGGED_HEADER_LEN + payload.len());
    out.extend_from_slice(dst.as_bytes());
    out.extend_from_slice(src.as_bytes());
    out.extend_from_slice(&ethertype.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Emit a tagged Ethernet frame: header, 4-byte 802.1Q shim, then payload.
pub fn emit_tagged(
    src: MacAddr,
    dst: MacAddr,
    tci: Tci,
    inner_ethertype: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(TAGGED_HEADER_LEN + payload.len());
    out.extend_from_slice(dst.as_bytes());
    out.extend_from_slice(src.as_bytes());
    out.extend_from_slice(&TPID_8021Q.to_be_bytes());
    out.extend_from_slice(&tci.to_raw().to_be_bytes());
    out.extend_from_slice(&inner_ethertype.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vlan::VlanId;

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, last])
    }

    #[test]
    fn parse_untagged_frame() {
        let mut data = vec![0xAA, 0x88, 0x66, 0x44, 0x22, 0x00]; // dst
        data.extend_from_slice(mac(0xCC).as_bytes()); // src
        data.extend_from_slice(&0x0800u16.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);

        let parsed = parse_ethernet(&data).unwrap();
        assert!(parsed.tag.is_none());
        assert_eq!(parsed.ethertype, 0x0800);
        assert_eq!(parsed.payload, &[1, 2, 3, 4]);
    }

    #[test]
    fn parse_tagged_frame() {
        let mut data = vec![0xAA, 0x88, 0x66, 0x44, 0x22, 0x00];
        data.extend_from_slice(mac(0xCC).as_bytes());
        data.extend_from_slice(&TPID_8021Q.to_be_bytes());
        data.extend_from_slice(&0x0001u16.to_be_bytes()); // VID=1
        data.extend_from_slice(&0x0800u16.to_be_bytes());
        data.extend_from_slice(&[9, 9]);

        let parsed = parse_ethernet(&data).unwrap();
        let tag = parsed.tag.unwrap();
        assert_eq!(tag.vlan.get(), 1);
        assert_eq!(parsed.ethertype, 0x0800);
        assert_eq!(parsed.payload, &[9, 9]);
    }

    #[test]
    fn short_frame_is_dropped() {
        assert_eq!(parse_ethernet(&[0u8; 13]), Err(DropReason::ShortFrame));
    }

    #[test]
    fn tagged_but_truncated_is_dropped() {
        let mut data = vec![0u8; 12];
        data.extend_from_slice(&TPID_8021Q.to_be_bytes());
        data.extend_from_slice(&[0, 1]); // only 2 of the 4 required trailing bytes
        assert_eq!(parse_ethernet(&data), Err(DropReason::ShortFrame));
    }

    #[test]
    fn emit_untagged_matches_byte_layout() {
        let src = mac(0x01);
        let dst = mac(0x02);
        let bytes = emit_untagged(src, dst, 0x0800, &[5, 6, 7]);
        assert_eq!(bytes.len(), 14 + 3);
        assert_eq!(&bytes[0..6], dst.as_bytes());
        assert_eq!(&bytes[6..12], src.as_bytes());
        assert_eq!(&bytes[12..14], &0x0800u16.to_be_bytes());
        assert_eq!(&bytes[14..], &[5, 6, 7]);
    }

    #[test]
    fn emit_tagged_inserts_4_byte_shim() {
        let src = mac(0x01);
        let dst = mac(0x02);
        let tci = Tci::inserted(VlanId::new(42).unwrap());
        let bytes = emit_tagged(src, dst, tci, 0x0800, &[1]);
        assert_eq!(bytes.len(), 18 + 1);
        assert_eq!(&bytes[12..14], &TPID_8021Q.to_be_bytes());
        assert_eq!(&bytes[14..16], &42u16.to_be_bytes());
        assert_eq!(&bytes[16..18], &0x0800u16.to_be_bytes());
        assert_eq!(&bytes[18..], &[1]);
    }

    #[test]
    fn parse_then_emit_round_trips_untagged() {
        let src = mac(0xAA);
        let dst = mac(0xBB);
        let original = emit_untagged(src, dst, 0x0800, &[1, 2, 3]);
        let parsed = parse_ethernet(&original).unwrap();
        let reemitted = emit_untagged(parsed.src, parsed.dst, parsed.ethertype, parsed.payload);
        assert_eq!(original, reemitted);
    }
}
