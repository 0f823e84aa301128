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

//! The slot table (§4.3): a fixed-capacity array of running-child records.
//!
//! Kept as a plain indexed `Vec` rather than a generational-key map (see DESIGN.md): the
//! launcher only ever needs stable `usize` indices into a table sized once at `init` and
//! never grown, and `occupied_indices()` assumes a dense integer index space.

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use plugin_launcher_common::{RoutineDescriptor, RunningState};

/// The write-target every slot forwards DATA frames to. Modeled as a shared, cheaply cloned
/// handle (rather than a borrowed reference with a slot lifetime) so the table itself can stay
/// free of lifetime parameters; see DESIGN.md.
pub type Upstream = Arc<Mutex<dyn Write + Send>>;

/// One row of the slot table. A slot with `pid <= 0` is free.
pub struct SlotRecord {
	pub routine: Option<Arc<RoutineDescriptor>>,
	pub start_time: Option<Instant>,
	pub pid: i32,
	pub timeout_seconds: i64,
	pub upstream: Option<Upstream>,
	pub child_endpoint: Option<UnixStream>,
	/// Set false once the enforcer or poller has observed termination but before the slot is
	/// reclaimed, so `sweep` can tell "still running" apart from "dead, needs reaping".
	pub alive: bool,
}

impl SlotRecord {
	fn empty() -> Self {
		Self {
			routine: None,
			start_time: None,
			pid: 0,
			timeout_seconds: 0,
			upstream: None,
			child_endpoint: None,
			alive: false,
		}
	}

	pub fn occupied(&self) -> bool {
		self.pid > 0
	}
}

pub struct SlotTable {
	slots: Vec<SlotRecord>,
	running_count: usize,
}

impl SlotTable {
	pub fn new(capacity: usize) -> Self {
		Self { slots: (0..capacity).map(|_| SlotRecord::empty()).collect(), running_count: 0 }
	}

	pub fn capacity(&self) -> usize {
		self.slots.len()
	}

	pub fn running_count(&self) -> usize {
		self.running_count
	}

	/// Returns the first free index, if any. Does not populate the slot; the caller must
	/// follow up with [`Self::record_launch`] once the child has actually been spawned.
	pub fn allocate(&mut self) -> Option<usize> {
		self.slots.iter().position(|s| !s.occupied())
	}

	pub fn get(&self, idx: usize) -> &SlotRecord {
		&self.slots[idx]
	}

	pub fn get_mut(&mut self, idx: usize) -> &mut SlotRecord {
		&mut self.slots[idx]
	}

	#[allow(clippy::too_many_arguments)]
	pub fn record_launch(
		&mut self,
		idx: usize,
		routine: Arc<RoutineDescriptor>,
		timeout_seconds: i64,
		start_time: Instant,
		upstream: Upstream,
		child_endpoint: UnixStream,
		pid: i32,
	) {
		let slot = &mut self.slots[idx];
		debug_assert!(!slot.occupied(), "record_launch on an already-occupied slot");
		routine.set_running_state(RunningState::Running);
		slot.routine = Some(routine);
		slot.timeout_seconds = timeout_seconds;
		slot.start_time = Some(start_time);
		slot.upstream = Some(upstream);
		slot.child_endpoint = Some(child_endpoint);
		slot.pid = pid;
		slot.alive = true;
		self.running_count += 1;
	}

	/// Frees `idx`, dropping its child endpoint (closing the fd) and marking the routine Done.
	/// Idempotent: reclaiming an already-free slot is a no-op.
	pub fn reclaim(&mut self, idx: usize) {
		let slot = &mut self.slots[idx];
		if !slot.occupied() {
			return;
		}
		if let Some(routine) = slot.routine.take() {
			routine.set_running_state(RunningState::Done);
		}
		slot.start_time = None;
		slot.pid = 0;
		slot.timeout_seconds = 0;
		slot.upstream = None;
		slot.child_endpoint = None;
		slot.alive = false;
		self.running_count = self.running_count.saturating_sub(1);
	}

	pub fn occupied_indices(&self) -> impl Iterator<Item = usize> + '_ {
		self.slots.iter().enumerate().filter(|(_, s)| s.occupied()).map(|(i, _)| i)
	}

	/// Repairs `running_count` to `0` if the table holds no occupied slots despite a stale
	/// nonzero count (§4.3, §9), guarding against the cached counter drifting out of sync with
	/// the table it mirrors.
	pub fn reconcile_running_count(&mut self) {
		if self.running_count > 0 && self.occupied_indices().next().is_none() {
			self.running_count = 0;
		}
	}
}
