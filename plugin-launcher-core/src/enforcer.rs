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

//! The deadline enforcer (§4.6): sweeps the slot table once per tick, killing routines that
//! have overrun their timeout and reaping slots the poller has already marked dead.

use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use plugin_launcher_common::channel::{forward, TYPE_DATA};

use crate::constants::KILL_ESCALATION_GRACE_MS;
use crate::reaper::reap_blocking;
use crate::slot::SlotTable;

/// One sweep over every occupied slot. A slot still `alive` whose deadline has passed is
/// killed (SIGTERM, then SIGKILL after a short grace if it hasn't exited) and an upstream
/// error frame is emitted in its place; a slot the poller already marked not `alive` is
/// reaped outright. Both paths end by freeing the slot.
pub fn sweep(slot_table: &mut SlotTable, hostname: &str) {
	let now = Instant::now();
	let indices: Vec<usize> = slot_table.occupied_indices().collect();

	for idx in indices {
		let (alive, timeout, start, pid, oid) = {
			let slot = slot_table.get(idx);
			(
				slot.alive,
				slot.timeout_seconds,
				slot.start_time,
				slot.pid,
				slot.routine.as_ref().map(|r| r.oid().to_string()).unwrap_or_default(),
			)
		};

		if alive {
			if timeout <= 0 {
				continue;
			}
			let elapsed = start.map(|s| now.duration_since(s).as_secs() as i64).unwrap_or(0);
			if elapsed < timeout {
				continue;
			}
			emit_timeout_frame(slot_table, idx, hostname, timeout, &oid);
			terminate_with_escalation(pid);
			slot_table.get_mut(idx).alive = false;
			slot_table.reclaim(idx);
		} else {
			reap_blocking(pid);
			slot_table.reclaim(idx);
		}
	}
}

fn emit_timeout_frame(slot_table: &SlotTable, idx: usize, hostname: &str, timeout: i64, oid: &str) {
	let oid_field = if oid.is_empty() { "0" } else { oid };
	let msg = format!(
		"SERVER <|> ERRMSG <|> {hostname} <|> general/tcp <|> NVT timed out after {timeout} seconds. <|> {oid_field} <|> SERVER\n"
	);
	let Some(upstream) = slot_table.get(idx).upstream.clone() else {
		return;
	};
	if let Ok(mut guard) = upstream.lock() {
		if let Err(err) = forward(&mut *guard, msg.as_bytes(), TYPE_DATA) {
			tracing::warn!(idx, error = %err, "failed to forward timeout frame upstream");
		}
	}
}

fn terminate_with_escalation(pid: i32) {
	let target = Pid::from_raw(pid);
	let _ = kill(target, Signal::SIGTERM);
	std::thread::sleep(Duration::from_millis(KILL_ESCALATION_GRACE_MS));
	match waitpid(target, Some(WaitPidFlag::WNOHANG)) {
		Ok(status) if status.pid().is_none() => {
			let _ = kill(target, Signal::SIGKILL);
			let _ = waitpid(target, None);
		}
		_ => {}
	}
}
