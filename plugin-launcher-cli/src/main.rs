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

//! `plugin-launcher`: a reference harness around `plugin-launcher-core`, analogous to the
//! teacher's `execute-worker`/`prepare-worker` binaries: it wires the core's external
//! collaborator traits to concrete, file-backed implementations and drives one host's worth
//! of routines to completion.

mod config;
mod spawner;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use config::{ConfigError, HarnessConfig};
use plugin_launcher_common::{HostContext, RoutineDescriptor};
use plugin_launcher_core::{LaunchError, Launcher};
use spawner::ChildProcessSpawner;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "plugin-launcher", about = "Run routines against one target host")]
struct Args {
	/// Path to the TOML manifest (preferences + routine catalog).
	#[arg(long)]
	config: PathBuf,

	/// Directory routine scripts are resolved relative to.
	#[arg(long)]
	routines_dir: PathBuf,

	/// Target host label, forwarded to the spawner and into timeout error frames.
	#[arg(long)]
	host: String,

	/// Opaque knowledge-base handle, forwarded to the spawner unchanged.
	#[arg(long, default_value = "")]
	knowledge_base: String,

	/// Routine oids to run, each matched against a `[routines.<oid>]` manifest entry.
	#[arg(required = true)]
	oids: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum HarnessError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Launch(#[from] LaunchError),
}

fn main() -> ExitCode {
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	match run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			tracing::error!(error = %err, "plugin-launcher exiting with an error");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<(), HarnessError> {
	let args = Args::parse();
	let config = HarnessConfig::load(&args.config)?;
	let soft_max = config.soft_max;

	let mut launcher = Launcher::init(args.host.clone(), soft_max, config.clone(), config);
	let mut spawner = ChildProcessSpawner { routines_dir: args.routines_dir };

	let stdout: Arc<Mutex<dyn std::io::Write + Send>> = Arc::new(Mutex::new(std::io::stdout()));

	for oid in &args.oids {
		let routine = Arc::new(RoutineDescriptor::new(oid.clone()));
		let ctx = HostContext { host_ctx: &args.host, knowledge_base: &args.knowledge_base };
		let pid = launcher.launch(routine, stdout.clone(), ctx, oid, &mut spawner)?;
		tracing::info!(oid, pid, "routine launched");
	}

	launcher.wait_all();
	Ok(())
}
