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

//! The routine-launcher seam (§6). Out of scope for this crate to implement for real (§1):
//! the core drives it but does not fork/exec the routine interpreter itself.

use std::os::unix::net::UnixStream;

use crate::error::SpawnError;

/// Context passed through to the spawner unchanged. The core treats these as opaque; only
/// the spawner interprets them.
pub struct HostContext<'a> {
	pub host_ctx: &'a str,
	pub knowledge_base: &'a str,
}

/// Forks/execs (or otherwise starts) the routine identified by `oid`, handing it
/// `child_endpoint_peer` as its end of the control channel.
///
/// On success the spawner must have duplicated or otherwise taken ownership of the peer
/// socket before returning; the core does not keep it open past this call.
pub trait Spawner {
	fn spawn(
		&mut self,
		ctx: &HostContext<'_>,
		name: &str,
		oid: &str,
		child_endpoint_peer: UnixStream,
	) -> Result<i32, SpawnError>;
}
