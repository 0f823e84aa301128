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

//! The key-value preference-store seam (§6). Out of scope for this crate to implement for
//! real (§1); `plugin-launcher-cli` ships a minimal file-backed reference implementation.

/// Preference lookups the launcher consults at `init` and `launch` time.
pub trait Preferences {
	/// Whether verbose per-routine lifecycle logging is enabled.
	fn log_whole_attack(&self) -> bool;

	/// Comma-space-separated non-simultaneous port tokens, e.g. `"139, 445"`.
	fn non_simult_ports(&self) -> String;

	/// Default timeout (seconds) for scanner-category routines with no catalog timeout.
	/// `-1` means "never kill".
	fn scanner_plugins_timeout(&self) -> i64;

	/// Default timeout (seconds) for non-scanner routines with no catalog timeout.
	fn plugins_timeout(&self) -> i64;

	/// Per-routine timeout override, in seconds, if the operator configured one for `oid`.
	fn timeout_override(&self, oid: &str) -> Option<i64>;
}

/// Parses a comma-space-separated port list into owned tokens, trimming surrounding
/// whitespace around each token. Matches the `g_strsplit(ports, ", ", 0)` behavior of the
/// original preference parser: empty input yields an empty list, not a list with one empty
/// token.
pub fn parse_port_csv(csv: &str) -> Vec<String> {
	if csv.trim().is_empty() {
		return Vec::new();
	}
	csv.split(iter_separator()).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

fn iter_separator() -> &'static str {
	", "
}
