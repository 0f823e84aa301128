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

//! The launcher core (§5): the single-threaded state machine that ties the oracle, slot
//! table, reaper, poller and enforcer together into `init` / `launch` / `wait_*` / `stop`.
//!
//! Deliberately carries no internal mutex or condvar: every public method here assumes
//! exclusive `&mut self` access from one cooperative loop, exactly as the spec requires. Any
//! fan-out across hosts is the caller's concern, one `Launcher` per host.

use std::collections::HashSet;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Instant;

use plugin_launcher_common::preferences::parse_port_csv;
use plugin_launcher_common::{Catalog, Category, HostContext, Preferences, RoutineDescriptor, RunningState, Spawner};

use crate::constants::{HARD_MAX, POLL_TIMEOUT_MS};
use crate::error::LaunchError;
use crate::slot::{SlotTable, Upstream};
use crate::{enforcer, oracle, poller, reaper};

pub struct Launcher<C: Catalog, P: Preferences> {
	slot_table: SlotTable,
	soft_max: usize,
	old_soft_max: usize,
	non_simult_ports: HashSet<String>,
	hostname: String,
	catalog: C,
	preferences: P,
}

impl<C: Catalog, P: Preferences> Launcher<C, P> {
	/// Builds a fresh launcher for one host. `configured_soft_max` is clamped to
	/// `HARD_MAX - 1` (a full table would leave no room for the admission check to ever
	/// observe a free slot).
	pub fn init(hostname: impl Into<String>, configured_soft_max: usize, catalog: C, preferences: P) -> Self {
		let non_simult_ports: HashSet<String> = parse_port_csv(&preferences.non_simult_ports()).into_iter().collect();
		let soft_max = configured_soft_max.min(HARD_MAX - 1).max(1);
		if soft_max < configured_soft_max {
			tracing::warn!(configured_soft_max, clamped_to = soft_max, "soft_max exceeds HARD_MAX - 1, clamping");
		}
		Self {
			slot_table: SlotTable::new(HARD_MAX),
			soft_max,
			old_soft_max: configured_soft_max,
			non_simult_ports,
			hostname: hostname.into(),
			catalog,
			preferences,
		}
	}

	pub fn running_count(&self) -> usize {
		self.slot_table.running_count()
	}

	pub fn soft_max(&self) -> usize {
		self.soft_max
	}

	/// Launches `routine` once a slot is free and no currently-running routine conflicts with
	/// it on ports. Blocks the caller (by repeatedly driving the reaper/poller/enforcer) until
	/// admission succeeds or spawning fails.
	pub fn launch(
		&mut self,
		routine: Arc<RoutineDescriptor>,
		upstream: Upstream,
		ctx: HostContext<'_>,
		name: &str,
		spawner: &mut dyn Spawner,
	) -> Result<i32, LaunchError> {
		while self.slot_table.running_count() >= self.soft_max {
			self.tick_once();
		}

		let idx = self.wait_for_free_slot(&routine)?;
		let timeout_seconds = self.resolve_timeout(routine.oid());

		if self.preferences.log_whole_attack() {
			tracing::info!(oid = routine.oid(), host = %self.hostname, timeout_seconds, "launching routine");
		}

		let (local, peer) = UnixStream::pair().map_err(LaunchError::from)?;
		let start_time = Instant::now();

		match spawner.spawn(&ctx, name, routine.oid(), peer) {
			Ok(pid) if pid > 0 => {
				self.slot_table.record_launch(idx, Arc::clone(&routine), timeout_seconds, start_time, upstream, local, pid);
				Ok(pid)
			}
			Ok(non_positive) => {
				routine.set_running_state(RunningState::Unrun);
				Err(LaunchError::SpawnFailed(plugin_launcher_common::SpawnError::NonPositivePid(non_positive)))
			}
			Err(err) => {
				routine.set_running_state(RunningState::Unrun);
				Err(LaunchError::SpawnFailed(err))
			}
		}
	}

	/// Reaps zombies and picks a free slot, waiting out any currently-running routine that
	/// conflicts with `routine` on ports before returning it.
	fn wait_for_free_slot(&mut self, routine: &RoutineDescriptor) -> Result<usize, LaunchError> {
		reaper::reap_nohang();
		loop {
			let conflict = self.slot_table.occupied_indices().find(|&idx| {
				let slot = self.slot_table.get(idx);
				slot.occupied()
					&& slot
						.routine
						.as_ref()
						.is_some_and(|other| oracle::ports_conflict(&self.catalog, other.oid(), routine.oid(), &self.non_simult_ports))
			});
			match conflict {
				Some(_) => self.tick_once(),
				None => break,
			}
		}
		self.slot_table.allocate().ok_or(LaunchError::NoSlot)
	}

	/// Effective timeout in seconds for `oid`: an operator override first, then the catalog's
	/// declared timeout if nonzero, then the category-specific preference default. A catalog
	/// unavailable at this point is treated as fatal to timeout resolution and falls back to
	/// `-1` ("never kill") rather than blocking admission on it.
	fn resolve_timeout(&self, oid: &str) -> i64 {
		if let Some(seconds) = self.preferences.timeout_override(oid) {
			return seconds;
		}
		if let Ok(seconds) = self.catalog.timeout(oid) {
			if seconds != 0 {
				return seconds as i64;
			}
		}
		match self.catalog.category(oid) {
			Ok(Category::Scanner) => self.preferences.scanner_plugins_timeout(),
			Ok(Category::Other) => self.preferences.plugins_timeout(),
			Err(_) => -1,
		}
	}

	/// One cooperative scheduling step: reap exited zombies, drain every ready child endpoint,
	/// repair `running_count` if the table lied to us, then sweep deadlines.
	fn tick_once(&mut self) {
		reaper::reap_nohang();
		for idx in poller::poll_ready(&self.slot_table, POLL_TIMEOUT_MS) {
			poller::process_one(&mut self.slot_table, idx);
		}
		self.slot_table.reconcile_running_count();
		enforcer::sweep(&mut self.slot_table, &self.hostname);
	}

	/// Forces serial execution: subsequent `launch` calls admit only one routine at a time
	/// until [`Self::enable_parallel`] restores the configured limit.
	pub fn disable_parallel(&mut self) {
		self.soft_max = 1;
	}

	pub fn enable_parallel(&mut self) {
		self.soft_max = self.old_soft_max;
	}

	/// Drives ticks until every slot has drained.
	pub fn wait_all(&mut self) {
		while self.slot_table.running_count() != 0 {
			self.tick_once();
		}
	}

	/// Drives ticks until `running_count` changes from its value on entry, or there is
	/// nothing left to wait for.
	pub fn wait_for_slot_change(&mut self) {
		let observed = self.slot_table.running_count();
		if observed == 0 {
			return;
		}
		loop {
			self.tick_once();
			if self.slot_table.running_count() != observed {
				break;
			}
		}
	}

	/// Tears every running routine down. `soft`: drain one last round of ready frames and give
	/// children [`crate::constants::STOP_GRACE_MS`] to exit after SIGTERM before every
	/// remaining occupied slot is force-killed with SIGKILL and reclaimed unconditionally.
	pub fn stop(&mut self, soft: bool) {
		if soft {
			for idx in poller::poll_ready(&self.slot_table, POLL_TIMEOUT_MS) {
				poller::process_one(&mut self.slot_table, idx);
			}
			for idx in self.slot_table.occupied_indices().collect::<Vec<_>>() {
				let pid = self.slot_table.get(idx).pid;
				let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGTERM);
			}
			std::thread::sleep(std::time::Duration::from_millis(crate::constants::STOP_GRACE_MS));
		}
		for idx in self.slot_table.occupied_indices().collect::<Vec<_>>() {
			let pid = self.slot_table.get(idx).pid;
			let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGKILL);
			reaper::reap_blocking(pid);
			self.slot_table.reclaim(idx);
		}
	}

	/// Drops every slot's child endpoint without touching pids, for use once the caller
	/// already knows every child is gone (e.g. after [`Self::stop`]) and just wants the table
	/// zeroed for reuse.
	pub fn child_cleanup(&mut self) {
		for idx in 0..self.slot_table.capacity() {
			let slot = self.slot_table.get_mut(idx);
			slot.child_endpoint = None;
		}
	}
}
