//! The cooperative IO loop: frames one inbound stream into envelopes,
//! dispatches them to the forwarding engine, and frames the resulting
//! emissions back out. Single-threaded, no buffering beyond one
//! envelope at a time.

use std::io::{Read, Write};

use tracing::{debug, error, trace};

use crate::engine::Switch;
use crate::envelope::{Envelope, CONTROL_TYPE};
use crate::error::SwitchError;
use crate::mac::MacAddr;
use crate::port::PortIndex;

/// Drive the loop to completion: consume envelopes from `reader` until
/// clean EOF, dispatching frames to `switch` and writing emissions to
/// `writer`. Returns `Ok(())` on clean shutdown; any `Err` is fatal
/// (`ProtocolFraming` or `WriteFailure`) and the caller should exit the
/// process with a non-zero status.
pub fn run_io_loop<R: Read, W: Write>(
    switch: &mut Switch,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), SwitchError> {
    let mut macs_initialized = false;

    while let Some(envelope) = Envelope::read_from(reader)? {
        if envelope.msg_type == CONTROL_TYPE {
            if !macs_initialized {
                apply_startup_macs(switch, &envelope.payload)?;
                macs_initialized = true;
            } else {
                trace!("ignoring post-startup control message ({} bytes)", envelope.payload.len());
            }
            continue;
        }

        let Some(ingress) = PortIndex::new(envelope.msg_type).filter(|p| switch.ports.get(*p).is_some()) else {
            error!("frame on unknown channel {}, dropping", envelope.msg_type);
            continue;
        };

        match switch.forward(ingress, &envelope.payload) {
            Ok(emissions) => {
                for (egress, bytes) in emissions {
                    Envelope::new(egress.get(), bytes).write_to(writer)?;
                }
            }
            Err(reason) => {
                debug!("dropped frame on port {}: {}", ingress, reason.as_str());
            }
        }
    }

    Ok(())
}

/// Apply the driver's startup control message: `N` concatenated 6-byte
/// MAC addresses for ports `1..=N`, in port-index order.
fn apply_startup_macs(switch: &mut Switch, payload: &[u8]) -> Result<(), SwitchError> {
    let expected_len = switch.ports.len() * 6;
    if payload.len() != expected_len {
        return Err(SwitchError::ProtocolFraming(format!(
            "startup control message is {} bytes, expected {expected_len} ({} ports x 6)",
            payload.len(),
            switch.ports.len()
        )));
    }

    for (i, chunk) in payload.chunks_exact(6).enumerate() {
        let mac = MacAddr::from_slice(chunk).expect("chunks_exact(6) guarantees length 6");
        let index = PortIndex::new((i + 1) as u16).expect("i+1 is never zero");
        switch.ports.set_mac(index, mac)?;
    }

    Ok(())
}
