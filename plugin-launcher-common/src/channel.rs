// This file is part of the plugin launcher.

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! The child channel wire protocol: a minimal framed message format over a bidirectional
//! byte stream, carrying a type bitmask plus an opaque payload (§4.2).
//!
//! Frame layout: `[type: u8][len: u32 little-endian][payload: len bytes]`.

use std::io::{ErrorKind, Read, Write};

use crate::error::ChannelError;

/// Set when a frame carries routine output destined for the upstream consumer.
pub const TYPE_DATA: u8 = 0b0000_0001;
/// Set when a frame carries an out-of-band control signal for the launcher itself.
pub const TYPE_CONTROL: u8 = 0b0000_0010;
/// Within a CONTROL frame, set when the routine has finished and should be reaped.
/// All other CONTROL bits are recognized by the wire format but ignored by the core.
pub const CONTROL_FINISHED: u8 = 0b0000_0100;

const HEADER_LEN: usize = 1 + 4;
/// Defends against a corrupted or hostile peer claiming an enormous frame length.
const MAX_PAYLOAD_LEN: u32 = 16 * 1024 * 1024;

/// The result of reading exactly one frame from a child endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
	/// A DATA frame (or a frame with both DATA and CONTROL bits set; DATA takes
	/// precedence, see SPEC_FULL.md §9).
	Data { payload: Vec<u8>, type_bits: u8 },
	/// A CONTROL-only frame.
	Control { type_bits: u8 },
	/// The peer closed its end before sending a new frame header.
	Closed,
}

impl FrameEvent {
	pub fn is_finished_control(&self) -> bool {
		matches!(self, FrameEvent::Control { type_bits } if type_bits & CONTROL_FINISHED != 0)
	}
}

/// Blocking read of exactly one frame. Must only be called once the endpoint has been
/// signalled ready by the poller, so that it cannot stall the single launcher thread.
pub fn recv_one<R: Read>(endpoint: &mut R) -> Result<FrameEvent, ChannelError> {
	let mut type_byte = [0u8; 1];
	let n = endpoint.read(&mut type_byte)?;
	if n == 0 {
		return Ok(FrameEvent::Closed);
	}

	let mut len_bytes = [0u8; 4];
	read_exact_mid_frame(endpoint, &mut len_bytes)?;
	let len = u32::from_le_bytes(len_bytes);
	if len > MAX_PAYLOAD_LEN {
		return Err(ChannelError::Malformed(format!(
			"frame length {len} exceeds max {MAX_PAYLOAD_LEN}"
		)));
	}

	let mut payload = vec![0u8; len as usize];
	read_exact_mid_frame(endpoint, &mut payload)?;

	let type_bits = type_byte[0];
	if type_bits & TYPE_DATA != 0 {
		Ok(FrameEvent::Data { payload, type_bits })
	} else {
		Ok(FrameEvent::Control { type_bits })
	}
}

fn read_exact_mid_frame<R: Read>(endpoint: &mut R, buf: &mut [u8]) -> Result<(), ChannelError> {
	endpoint.read_exact(buf).map_err(|e| {
		if e.kind() == ErrorKind::UnexpectedEof {
			ChannelError::Malformed("peer closed mid-frame".to_string())
		} else {
			ChannelError::Io(e)
		}
	})
}

/// Writes one frame verbatim to `upstream` in a single call, so that frames from different
/// children interleave only at frame boundaries, never within a frame (§5).
pub fn forward<W: Write>(upstream: &mut W, payload: &[u8], type_bits: u8) -> Result<(), ChannelError> {
	let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
	buf.push(type_bits);
	buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
	buf.extend_from_slice(payload);
	upstream.write_all(&buf)?;
	Ok(())
}

/// Test/demo helper: writes a single frame with the given type bits and payload.
pub fn send_frame<W: Write>(endpoint: &mut W, payload: &[u8], type_bits: u8) -> Result<(), ChannelError> {
	forward(endpoint, payload, type_bits)
}
