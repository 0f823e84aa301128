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

//! The reference answer to "configuration loading and key-value preference storage" being out
//! of the core's scope (§1): a TOML file loaded once at startup into a [`HarnessConfig`] that
//! implements both [`Preferences`] and [`Catalog`] directly, rather than talking to a real
//! catalog/nvticache service.

use std::collections::HashMap;
use std::path::Path;

use plugin_launcher_common::{Catalog, CatalogError, Category, Preferences};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config file {path}: {source}")]
	Parse {
		path: String,
		#[source]
		source: toml::de::Error,
	},
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryConfig {
	Scanner,
	#[default]
	Other,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutineManifestEntry {
	pub name: String,
	#[serde(default)]
	pub required_ports: Vec<String>,
	#[serde(default)]
	pub timeout: u32,
	#[serde(default)]
	pub category: CategoryConfig,
}

fn default_timeout() -> i64 {
	-1
}

fn default_soft_max() -> usize {
	10
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarnessConfig {
	#[serde(default)]
	pub log_whole_attack: bool,
	#[serde(default)]
	pub non_simult_ports: String,
	#[serde(default = "default_timeout")]
	pub scanner_plugins_timeout: i64,
	#[serde(default = "default_timeout")]
	pub plugins_timeout: i64,
	#[serde(default)]
	pub timeout_overrides: HashMap<String, i64>,
	#[serde(default = "default_soft_max")]
	pub soft_max: usize,
	#[serde(default)]
	pub routines: HashMap<String, RoutineManifestEntry>,
}

impl HarnessConfig {
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
		toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
	}

	fn entry(&self, oid: &str) -> Result<&RoutineManifestEntry, CatalogError> {
		self.routines.get(oid).ok_or_else(|| CatalogError::UnknownOid(oid.to_string()))
	}
}

impl Preferences for HarnessConfig {
	fn log_whole_attack(&self) -> bool {
		self.log_whole_attack
	}
	fn non_simult_ports(&self) -> String {
		self.non_simult_ports.clone()
	}
	fn scanner_plugins_timeout(&self) -> i64 {
		self.scanner_plugins_timeout
	}
	fn plugins_timeout(&self) -> i64 {
		self.plugins_timeout
	}
	fn timeout_override(&self, oid: &str) -> Option<i64> {
		self.timeout_overrides.get(oid).copied()
	}
}

impl Catalog for HarnessConfig {
	fn required_ports(&self, oid: &str) -> Result<Vec<String>, CatalogError> {
		Ok(self.entry(oid)?.required_ports.clone())
	}
	fn timeout(&self, oid: &str) -> Result<u32, CatalogError> {
		Ok(self.entry(oid)?.timeout)
	}
	fn category(&self, oid: &str) -> Result<Category, CatalogError> {
		Ok(match self.entry(oid)?.category {
			CategoryConfig::Scanner => Category::Scanner,
			CategoryConfig::Other => Category::Other,
		})
	}
	fn display_name(&self, oid: &str) -> Result<String, CatalogError> {
		Ok(self.entry(oid)?.name.clone())
	}
}
