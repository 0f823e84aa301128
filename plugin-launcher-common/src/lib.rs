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

//! Shared types for the per-host plugin launcher: the child channel wire protocol, the
//! external-collaborator traits (catalog, preferences, spawner), the routine descriptor and
//! error types. Used by both `plugin-launcher-core` and any routine-launcher implementation.

pub mod catalog;
pub mod channel;
pub mod error;
pub mod preferences;
pub mod routine;
pub mod spawner;

pub use catalog::Catalog;
pub use error::{CatalogError, ChannelError, SpawnError};
pub use preferences::Preferences;
pub use routine::{Category, RoutineDescriptor, RunningState};
pub use spawner::{HostContext, Spawner};
