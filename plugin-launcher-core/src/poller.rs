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

//! The readiness poller (§4.5): a single bounded-wait fan-in over every occupied slot's child
//! endpoint, plus the per-ready-index frame handling the launcher drives from it.
//!
//! Uses raw `libc::poll` rather than `nix`'s poll wrapper: the fd set here is rebuilt fresh
//! every tick from plain `RawFd`s pulled out of the slot table, so there is no lifetime to
//! thread through a `BorrowedFd`-based API.

use std::os::unix::io::AsRawFd;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use plugin_launcher_common::channel::{self, FrameEvent, CONTROL_FINISHED};

use crate::slot::SlotTable;

/// Waits up to `timeout_ms` for any occupied slot's child endpoint to become readable (or
/// hang up), retrying on signal interruption. Returns the slot indices that are ready; empty
/// on timeout.
pub fn poll_ready(slot_table: &SlotTable, timeout_ms: i32) -> Vec<usize> {
	let occupied: Vec<usize> = slot_table.occupied_indices().collect();
	if occupied.is_empty() {
		return Vec::new();
	}

	let mut fds: Vec<libc::pollfd> = occupied
		.iter()
		.map(|&idx| {
			let fd = slot_table
				.get(idx)
				.child_endpoint
				.as_ref()
				.expect("occupied slot always has a child endpoint")
				.as_raw_fd();
			libc::pollfd { fd, events: libc::POLLIN, revents: 0 }
		})
		.collect();

	let rc = loop {
		let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
		if rc < 0 {
			let err = std::io::Error::last_os_error();
			if err.kind() == std::io::ErrorKind::Interrupted {
				continue;
			}
			tracing::warn!(error = %err, "poll() failed on child endpoints");
			return Vec::new();
		}
		break rc;
	};
	if rc == 0 {
		return Vec::new();
	}

	occupied
		.into_iter()
		.zip(fds)
		.filter_map(|(idx, pfd)| {
			if pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0 {
				Some(idx)
			} else {
				None
			}
		})
		.collect()
}

/// Handles the one frame available on slot `idx`'s endpoint. DATA frames are forwarded
/// upstream as-is; a CONTROL frame with the finished bit set requests termination; any other
/// control bits are logged and ignored; a closed or errored endpoint marks the slot dead so
/// the enforcer reaps it on the next sweep.
pub fn process_one(slot_table: &mut SlotTable, idx: usize) {
	let event = {
		let slot = slot_table.get_mut(idx);
		let Some(endpoint) = slot.child_endpoint.as_mut() else {
			return;
		};
		channel::recv_one(endpoint)
	};

	match event {
		Ok(FrameEvent::Data { payload, type_bits }) => {
			let upstream = slot_table.get(idx).upstream.clone();
			if let Some(upstream) = upstream {
				if let Ok(mut guard) = upstream.lock() {
					if let Err(err) = channel::forward(&mut *guard, &payload, type_bits) {
						tracing::warn!(idx, error = %err, "failed to forward data frame upstream");
					}
				}
			}
		}
		Ok(FrameEvent::Control { type_bits }) => {
			if type_bits & CONTROL_FINISHED != 0 {
				let pid = slot_table.get(idx).pid;
				let _ = kill(Pid::from_raw(pid), Signal::SIGTERM);
				slot_table.get_mut(idx).alive = false;
			} else {
				tracing::debug!(idx, type_bits, "ignoring unrecognized control bits");
			}
		}
		Ok(FrameEvent::Closed) => {
			slot_table.get_mut(idx).alive = false;
		}
		Err(err) => {
			tracing::debug!(idx, error = %err, "child endpoint errored, marking slot dead");
			slot_table.get_mut(idx).alive = false;
		}
	}
}
