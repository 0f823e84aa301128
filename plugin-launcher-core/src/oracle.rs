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

//! The conflict oracle (§4.1): decides whether two routines may not run concurrently because
//! they both declare a required port drawn from the operator's non-simultaneous set.

use std::collections::HashSet;

use plugin_launcher_common::Catalog;

/// True if `oid_a` and `oid_b` each require at least one port in `non_simult`, and those
/// per-routine sets intersect.
///
/// Byte-exact string comparison: `"www"` and `"Www"` are distinct tokens. A catalog lookup
/// failure for either oid is treated as "that routine requires nothing", which can only ever
/// push the answer toward no-conflict, never manufacture one out of a lookup failure.
pub fn ports_conflict(catalog: &dyn Catalog, oid_a: &str, oid_b: &str, non_simult: &HashSet<String>) -> bool {
	let a = relevant_ports(catalog, oid_a, non_simult);
	if a.is_empty() {
		return false;
	}
	let b = relevant_ports(catalog, oid_b, non_simult);
	if b.is_empty() {
		return false;
	}
	a.iter().any(|port| b.contains(port))
}

fn relevant_ports(catalog: &dyn Catalog, oid: &str, non_simult: &HashSet<String>) -> HashSet<String> {
	match catalog.required_ports(oid) {
		Ok(ports) => ports.into_iter().filter(|p| non_simult.contains(p)).collect(),
		Err(_) => HashSet::new(),
	}
}
