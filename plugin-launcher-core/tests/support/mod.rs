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

//! Shared scaffolding for the end-to-end scenario tests (§8): fakes for the three
//! external-collaborator seams, plus a scripted [`Spawner`] that forks a real child process
//! running one of a small set of behaviors. A unit test that faked `waitpid`/`poll` instead
//! would not actually exercise the poller or reaper being tested.

use std::collections::HashMap;
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::unistd::{fork, ForkResult};
use plugin_launcher_common::channel::{send_frame, CONTROL_FINISHED, TYPE_CONTROL, TYPE_DATA};
use plugin_launcher_common::{Catalog, CatalogError, Category, HostContext, Preferences, SpawnError, Spawner};
use plugin_launcher_core::Upstream;

pub enum ChildBehavior {
	SendDataAndExit(Vec<u8>),
	SleepSeconds(u64),
	SendFinishedControlThenLinger,
}

pub struct ScriptedSpawner {
	pub behaviors: HashMap<String, ChildBehavior>,
}

impl Spawner for ScriptedSpawner {
	fn spawn(&mut self, _ctx: &HostContext<'_>, _name: &str, oid: &str, mut peer: UnixStream) -> Result<i32, SpawnError> {
		let behavior = self.behaviors.remove(oid).unwrap_or(ChildBehavior::SleepSeconds(0));
		match unsafe { fork() } {
			Ok(ForkResult::Parent { child, .. }) => Ok(child.as_raw()),
			Ok(ForkResult::Child) => {
				match behavior {
					ChildBehavior::SendDataAndExit(payload) => {
						let _ = send_frame(&mut peer, &payload, TYPE_DATA);
					}
					ChildBehavior::SleepSeconds(secs) => {
						std::thread::sleep(Duration::from_secs(secs));
					}
					ChildBehavior::SendFinishedControlThenLinger => {
						let _ = send_frame(&mut peer, &[], TYPE_CONTROL | CONTROL_FINISHED);
						std::thread::sleep(Duration::from_secs(30));
					}
				}
				std::process::exit(0);
			}
			Err(_) => Err(SpawnError::Os(std::io::Error::last_os_error())),
		}
	}
}

pub struct FakeCatalog {
	pub required_ports: HashMap<String, Vec<String>>,
}

impl Catalog for FakeCatalog {
	fn required_ports(&self, oid: &str) -> Result<Vec<String>, CatalogError> {
		Ok(self.required_ports.get(oid).cloned().unwrap_or_default())
	}
	fn timeout(&self, _oid: &str) -> Result<u32, CatalogError> {
		Ok(0)
	}
	fn category(&self, _oid: &str) -> Result<Category, CatalogError> {
		Ok(Category::Other)
	}
	fn display_name(&self, oid: &str) -> Result<String, CatalogError> {
		Ok(oid.to_string())
	}
}

pub struct FakePreferences {
	pub non_simult_ports: String,
	pub overrides: HashMap<String, i64>,
}

impl Preferences for FakePreferences {
	fn log_whole_attack(&self) -> bool {
		false
	}
	fn non_simult_ports(&self) -> String {
		self.non_simult_ports.clone()
	}
	fn scanner_plugins_timeout(&self) -> i64 {
		-1
	}
	fn plugins_timeout(&self) -> i64 {
		-1
	}
	fn timeout_override(&self, oid: &str) -> Option<i64> {
		self.overrides.get(oid).copied()
	}
}

/// An in-memory upstream sink the test can inspect after the fact, and decode frame-by-frame.
pub fn recording_upstream() -> (Upstream, Arc<Mutex<Vec<u8>>>) {
	let buf = Arc::new(Mutex::new(Vec::new()));
	let sink = buf.clone();
	(Arc::new(Mutex::new(SinkWriter(sink))) as Upstream, buf)
}

struct SinkWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SinkWriter {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}
	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

/// Decodes every DATA frame out of a raw recorded upstream buffer, in wire order.
pub fn decode_data_frames(raw: &[u8]) -> Vec<Vec<u8>> {
	let mut out = Vec::new();
	let mut cursor = &raw[..];
	while !cursor.is_empty() {
		let type_bits = cursor[0];
		let len = u32::from_le_bytes(cursor[1..5].try_into().unwrap()) as usize;
		let payload = cursor[5..5 + len].to_vec();
		if type_bits & TYPE_DATA != 0 {
			out.push(payload);
		}
		cursor = &cursor[5 + len..];
	}
	out
}
