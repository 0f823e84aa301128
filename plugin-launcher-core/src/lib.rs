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

//! The per-host plugin launcher core: a bounded, single-threaded executor that runs security
//! test routines as child processes against one target host, multiplexing their output onto
//! one upstream sink, enforcing per-routine timeouts and arbitrating port-conflict mutual
//! exclusion.
//!
//! Carries no internal locking. Callers drive [`Launcher`] from one thread; running several
//! hosts concurrently means running several `Launcher`s on separate threads, each with its
//! own [`slot::SlotTable`].

pub mod constants;
pub mod enforcer;
pub mod error;
pub mod launcher;
pub mod oracle;
pub mod poller;
pub mod reaper;
pub mod slot;

pub use error::LaunchError;
pub use launcher::Launcher;
pub use slot::Upstream;
