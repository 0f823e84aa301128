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

//! The one piece of "real" process launching this crate owns: forking and exec'ing a routine
//! script, handing it the child endpoint over an inherited file descriptor (§1 excludes only
//! the interface to a full NVT interpreter, not all process spawning).

use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::unistd::{fork, ForkResult};
use plugin_launcher_common::{HostContext, SpawnError, Spawner};

/// Spawns routines found under `routines_dir/<name>`, passing the channel fd number in
/// `PLUGIN_CHANNEL_FD` and leaving the routine to speak the child channel wire protocol on it.
pub struct ChildProcessSpawner {
	pub routines_dir: PathBuf,
}

impl Spawner for ChildProcessSpawner {
	fn spawn(&mut self, ctx: &HostContext<'_>, name: &str, oid: &str, child_endpoint_peer: UnixStream) -> Result<i32, SpawnError> {
		let script = self.routines_dir.join(name);
		let fd = child_endpoint_peer.as_raw_fd();
		clear_cloexec(fd).map_err(|e| SpawnError::Os(std::io::Error::from_raw_os_error(e as i32)))?;

		match unsafe { fork() } {
			Ok(ForkResult::Parent { child, .. }) => {
				drop(child_endpoint_peer);
				Ok(child.as_raw())
			}
			Ok(ForkResult::Child) => {
				let err = Command::new(&script)
					.env("PLUGIN_OID", oid)
					.env("PLUGIN_HOST_CTX", ctx.host_ctx)
					.env("PLUGIN_KNOWLEDGE_BASE", ctx.knowledge_base)
					.env("PLUGIN_CHANNEL_FD", fd.to_string())
					.exec();
				eprintln!("failed to exec {}: {err}", script.display());
				std::process::exit(127);
			}
			Err(errno) => Err(SpawnError::Os(std::io::Error::from_raw_os_error(errno as i32))),
		}
	}
}

fn clear_cloexec(fd: i32) -> nix::Result<()> {
	let flags = fcntl(fd, FcntlArg::F_GETFD)?;
	let mut flags = FdFlag::from_bits_truncate(flags);
	flags.remove(FdFlag::FD_CLOEXEC);
	fcntl(fd, FcntlArg::F_SETFD(flags))?;
	Ok(())
}
