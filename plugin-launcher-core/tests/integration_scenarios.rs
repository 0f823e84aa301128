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

//! End-to-end scenarios from SPEC_FULL.md §8, run against real forked child processes.

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use plugin_launcher_common::{HostContext, RoutineDescriptor};
use plugin_launcher_core::Launcher;

use support::{decode_data_frames, recording_upstream, ChildBehavior, FakeCatalog, FakePreferences, ScriptedSpawner};

fn ctx() -> HostContext<'static> {
	HostContext { host_ctx: "testhost", knowledge_base: "kb" }
}

#[test]
fn admission_bound_serializes_the_third_launch() {
	let catalog = FakeCatalog { required_ports: HashMap::new() };
	let preferences = FakePreferences { non_simult_ports: String::new(), overrides: HashMap::new() };
	let mut launcher = Launcher::init("testhost", 2, catalog, preferences);

	let mut spawner = ScriptedSpawner {
		behaviors: HashMap::from([
			("oid-r1".to_string(), ChildBehavior::SendDataAndExit(b"R1".to_vec())),
			("oid-r2".to_string(), ChildBehavior::SendDataAndExit(b"R2".to_vec())),
			("oid-r3".to_string(), ChildBehavior::SendDataAndExit(b"R3".to_vec())),
		]),
	};

	let (upstream, buf) = recording_upstream();
	for oid in ["oid-r1", "oid-r2", "oid-r3"] {
		let routine = Arc::new(RoutineDescriptor::new(oid));
		launcher.launch(routine, upstream.clone(), ctx(), "routine", &mut spawner).expect("launch succeeds");
	}
	launcher.wait_all();

	assert_eq!(launcher.running_count(), 0);
	let mut payloads = decode_data_frames(&buf.lock().unwrap());
	payloads.sort();
	assert_eq!(payloads, vec![b"R1".to_vec(), b"R2".to_vec(), b"R3".to_vec()]);
}

#[test]
fn timed_out_routine_is_killed_and_reported_upstream() {
	let catalog = FakeCatalog { required_ports: HashMap::new() };
	let mut overrides = HashMap::new();
	overrides.insert("oid-r".to_string(), 1i64);
	let preferences = FakePreferences { non_simult_ports: String::new(), overrides };
	let mut launcher = Launcher::init("testhost", 4, catalog, preferences);

	let mut spawner =
		ScriptedSpawner { behaviors: HashMap::from([("oid-r".to_string(), ChildBehavior::SleepSeconds(5))]) };

	let (upstream, buf) = recording_upstream();
	let routine = Arc::new(RoutineDescriptor::new("oid-r"));
	launcher.launch(routine, upstream, ctx(), "routine", &mut spawner).expect("launch succeeds");

	let deadline = std::time::Instant::now() + std::time::Duration::from_secs(3);
	while launcher.running_count() > 0 && std::time::Instant::now() < deadline {
		launcher.wait_for_slot_change();
	}

	assert_eq!(launcher.running_count(), 0);
	let payloads = decode_data_frames(&buf.lock().unwrap());
	assert_eq!(
		payloads,
		vec![b"SERVER <|> ERRMSG <|> testhost <|> general/tcp <|> NVT timed out after 1 seconds. <|> oid-r <|> SERVER\n".to_vec()]
	);
}

#[test]
fn finished_control_frame_ends_the_routine_with_no_upstream_frame() {
	let catalog = FakeCatalog { required_ports: HashMap::new() };
	let preferences = FakePreferences { non_simult_ports: String::new(), overrides: HashMap::new() };
	let mut launcher = Launcher::init("testhost", 4, catalog, preferences);

	let mut spawner = ScriptedSpawner {
		behaviors: HashMap::from([("oid-r".to_string(), ChildBehavior::SendFinishedControlThenLinger)]),
	};

	let (upstream, buf) = recording_upstream();
	let routine = Arc::new(RoutineDescriptor::new("oid-r"));
	launcher.launch(routine, upstream, ctx(), "routine", &mut spawner).expect("launch succeeds");
	launcher.wait_all();

	assert_eq!(launcher.running_count(), 0);
	assert!(decode_data_frames(&buf.lock().unwrap()).is_empty());
}

#[test]
fn conflicting_routines_never_run_concurrently() {
	let mut required_ports = HashMap::new();
	required_ports.insert("oid-r1".to_string(), vec!["139".to_string()]);
	required_ports.insert("oid-r2".to_string(), vec!["139".to_string()]);
	let catalog = FakeCatalog { required_ports };
	let preferences = FakePreferences { non_simult_ports: "139".to_string(), overrides: HashMap::new() };
	let mut launcher = Launcher::init("testhost", 4, catalog, preferences);

	let mut spawner = ScriptedSpawner {
		behaviors: HashMap::from([
			("oid-r1".to_string(), ChildBehavior::SleepSeconds(1)),
			("oid-r2".to_string(), ChildBehavior::SendDataAndExit(b"R2".to_vec())),
		]),
	};

	let (upstream, _buf) = recording_upstream();
	let r1 = Arc::new(RoutineDescriptor::new("oid-r1"));
	launcher.launch(r1, upstream.clone(), ctx(), "routine", &mut spawner).expect("r1 launches");

	let r2 = Arc::new(RoutineDescriptor::new("oid-r2"));
	launcher.launch(r2, upstream, ctx(), "routine", &mut spawner).expect("r2 launches");

	// launch(r2) must have waited for r1 to fully vacate its slot before spawning r2.
	assert_eq!(launcher.running_count(), 1);
	launcher.wait_all();
	assert_eq!(launcher.running_count(), 0);
}

#[test]
fn non_conflicting_routines_run_concurrently() {
	let mut required_ports = HashMap::new();
	required_ports.insert("oid-r1".to_string(), vec!["139".to_string()]);
	required_ports.insert("oid-r2".to_string(), vec!["80".to_string()]);
	let catalog = FakeCatalog { required_ports };
	let preferences = FakePreferences { non_simult_ports: "139".to_string(), overrides: HashMap::new() };
	let mut launcher = Launcher::init("testhost", 4, catalog, preferences);

	let mut spawner = ScriptedSpawner {
		behaviors: HashMap::from([
			("oid-r1".to_string(), ChildBehavior::SleepSeconds(1)),
			("oid-r2".to_string(), ChildBehavior::SendDataAndExit(b"R2".to_vec())),
		]),
	};

	let (upstream, _buf) = recording_upstream();
	let r1 = Arc::new(RoutineDescriptor::new("oid-r1"));
	launcher.launch(r1, upstream.clone(), ctx(), "routine", &mut spawner).expect("r1 launches");

	let r2 = Arc::new(RoutineDescriptor::new("oid-r2"));
	launcher.launch(r2, upstream, ctx(), "routine", &mut spawner).expect("r2 launches");

	// No port conflict: r2 must not have had to wait for r1's slot to free.
	assert_eq!(launcher.running_count(), 2);
	launcher.wait_all();
	assert_eq!(launcher.running_count(), 0);
}

#[test]
fn disable_parallel_serializes_admission() {
	let catalog = FakeCatalog { required_ports: HashMap::new() };
	let preferences = FakePreferences { non_simult_ports: String::new(), overrides: HashMap::new() };
	let mut launcher = Launcher::init("testhost", 3, catalog, preferences);
	launcher.disable_parallel();

	let mut spawner = ScriptedSpawner {
		behaviors: HashMap::from([
			("oid-r1".to_string(), ChildBehavior::SendDataAndExit(b"R1".to_vec())),
			("oid-r2".to_string(), ChildBehavior::SendDataAndExit(b"R2".to_vec())),
		]),
	};

	let (upstream, _buf) = recording_upstream();
	let r1 = Arc::new(RoutineDescriptor::new("oid-r1"));
	launcher.launch(r1, upstream.clone(), ctx(), "routine", &mut spawner).expect("r1 launches");
	assert_eq!(launcher.running_count(), 1);

	let r2 = Arc::new(RoutineDescriptor::new("oid-r2"));
	// With parallelism disabled, admission for r2 waits for r1 to vacate first.
	launcher.launch(r2, upstream, ctx(), "routine", &mut spawner).expect("r2 launches");
	assert_eq!(launcher.running_count(), 1);

	launcher.wait_all();
	launcher.enable_parallel();
	assert_eq!(launcher.soft_max(), 3);
}
