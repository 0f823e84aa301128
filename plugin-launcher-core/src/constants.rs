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

//! Fixed bounds the core operates under (§3, §9).

/// Absolute ceiling on concurrently live children, independent of any configured soft limit.
pub const HARD_MAX: usize = 32;

/// Poller wait budget per tick, in milliseconds.
pub const POLL_TIMEOUT_MS: i32 = 500;

/// Grace period `stop(soft: true)` waits after SIGTERM before escalating to SIGKILL.
pub const STOP_GRACE_MS: u64 = 20;

/// Grace period the deadline enforcer waits after SIGTERM before escalating a timed-out
/// routine to SIGKILL.
pub const KILL_ESCALATION_GRACE_MS: u64 = 20;
