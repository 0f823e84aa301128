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

//! Errors the launcher core itself can return. External-collaborator errors
//! ([`plugin_launcher_common::CatalogError`], [`plugin_launcher_common::SpawnError`]) are
//! absorbed here rather than re-exported bare, so callers match on one error type per
//! operation.

use plugin_launcher_common::SpawnError;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
	#[error("no free slot available")]
	NoSlot,
	#[error("failed to create child endpoint pair: {0}")]
	Io(#[from] std::io::Error),
	#[error("spawn failed: {0}")]
	SpawnFailed(#[from] SpawnError),
}
