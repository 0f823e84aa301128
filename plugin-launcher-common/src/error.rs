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

//! Error types for the external-collaborator seams (catalog, preferences, spawner) and for
//! the child channel wire protocol.

use std::io;

/// Failure resolving routine metadata from the catalog service.
///
/// The oracle treats this as "conservative no-conflict" (see
/// [`crate::oracle_no_conflict_on_error`] documentation on the core crate), but resolving an
/// effective timeout for a newly launched routine treats it as fatal and falls back to `-1`
/// ("never kill").
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
	#[error("catalog has no entry for oid {0}")]
	UnknownOid(String),
	#[error("catalog backend unavailable: {0}")]
	Unavailable(String),
}

/// Failure from the external routine-launcher primitive.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
	#[error("spawner returned non-positive pid {0}")]
	NonPositivePid(i32),
	#[error("failed to spawn routine: {0}")]
	Os(#[from] io::Error),
}

/// Failure reading or writing a framed message on a child channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
	#[error("channel closed by peer")]
	Closed,
	#[error("malformed frame: {0}")]
	Malformed(String),
	#[error("i/o error on channel: {0}")]
	Io(#[from] io::Error),
}
