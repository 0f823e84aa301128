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

//! The catalog/metadata service seam. Out of scope for this crate to implement for real
//! (§1): the core only ever depends on this trait.

use crate::{error::CatalogError, routine::Category};

/// Metadata lookups keyed by routine OID.
///
/// Implementations back this with whatever real catalog/nvticache equivalent a deployment
/// uses. `plugin-launcher-cli` ships a trivial in-memory implementation for demonstration.
pub trait Catalog {
	/// Required ports for `oid`, as opaque comma-space-separated tokens, or empty if the
	/// routine declares none.
	fn required_ports(&self, oid: &str) -> Result<Vec<String>, CatalogError>;

	/// Declared timeout in seconds for `oid`. `0` means "unset" (the caller should fall back
	/// to preference defaults).
	fn timeout(&self, oid: &str) -> Result<u32, CatalogError>;

	/// Routine category, consulted only to distinguish the scanner-specific default timeout.
	fn category(&self, oid: &str) -> Result<Category, CatalogError>;

	/// Human-readable name for logging.
	fn display_name(&self, oid: &str) -> Result<String, CatalogError>;
}
