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

//! The routine descriptor the caller hands to `launch`, and the category taxonomy the
//! catalog exposes for timeout resolution.

use std::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle state the launcher reports back to the caller's scheduler.
///
/// This is a side channel: the core never reads it back to make decisions, it only ever
/// writes it, so a plain atomic is enough and avoids forcing callers behind a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunningState {
	Unrun = 0,
	Running = 1,
	Done = 2,
}

impl RunningState {
	fn from_u8(v: u8) -> Self {
		match v {
			1 => RunningState::Running,
			2 => RunningState::Done,
			_ => RunningState::Unrun,
		}
	}
}

/// Category of a routine, as resolved from the catalog. The deadline-free-default resolution
/// in `launch` only distinguishes the `Scanner` variant from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
	Scanner,
	Other,
}

/// A routine (NVT) descriptor, as owned by the caller.
///
/// The launcher never mutates anything but [`Self::running_state`], which it updates as a
/// side-channel signal for the caller's own scheduler. Everything else is read-only from the
/// launcher's perspective.
#[derive(Debug)]
pub struct RoutineDescriptor {
	oid: String,
	running_state: AtomicU8,
}

impl RoutineDescriptor {
	pub fn new(oid: impl Into<String>) -> Self {
		Self { oid: oid.into(), running_state: AtomicU8::new(RunningState::Unrun as u8) }
	}

	pub fn oid(&self) -> &str {
		&self.oid
	}

	pub fn running_state(&self) -> RunningState {
		RunningState::from_u8(self.running_state.load(Ordering::SeqCst))
	}

	pub fn set_running_state(&self, state: RunningState) {
		self.running_state.store(state as u8, Ordering::SeqCst);
	}
}
