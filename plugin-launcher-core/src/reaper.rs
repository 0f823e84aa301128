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

//! The reaper (§4.4): drains zombie children without ever blocking the single launcher thread.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;

/// Repeatedly reaps any exited child, retrying on signal interruption, until none remain.
/// Never blocks: every wait is `WNOHANG`.
pub fn reap_nohang() {
	loop {
		match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
			Ok(status) if status.pid().is_none() => break,
			Ok(_) => continue,
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => break,
			Err(_) => break,
		}
	}
}

/// Blocking wait for a specific pid, retrying on signal interruption. Used once a slot has
/// already been observed dead and the enforcer just needs to collect its exit status.
pub fn reap_blocking(pid: i32) {
	loop {
		match waitpid(Pid::from_raw(pid), None) {
			Ok(_) => break,
			Err(Errno::EINTR) => continue,
			Err(_) => break,
		}
	}
}
