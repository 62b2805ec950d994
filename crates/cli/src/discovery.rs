// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File discovery for the config file and definition includes.
//!
//! The config is found by walking from the current directory up to the git
//! root looking for fleetreport.toml. Included definition files are searched
//! across a fixed list of candidate locations.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file name searched for during discovery.
pub const CONFIG_FILE: &str = "fleetreport.toml";

/// Find fleetreport.toml starting from `start_dir` and walking up to git root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if current.join(".git").exists() {
            return None;
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Resolve config path from CLI arg, env var, or discovery.
///
/// Priority:
/// 1. CLI flag `-C`/`--config` (handled by clap with env = "FLEETREPORT_CONFIG")
/// 2. Discovery from current directory up to git root
/// 3. None (use defaults)
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            if path.exists() {
                Ok(Some(path.to_path_buf()))
            } else {
                Err(Error::Config {
                    message: format!("config file not found: {}", path.display()),
                    path: Some(path.to_path_buf()),
                })
            }
        }
        None => Ok(find_config(cwd)),
    }
}

/// Candidate locations for an included definition file, in search order.
///
/// 1. `{parent_dir}/{include_dir}/{file}`
/// 2. `{parent_dir}/{file}`
/// 3. `{include_dir}/{file}`
/// 4. `{file}` as given
pub fn include_candidates(
    parent_dir: Option<&Path>,
    include_dir: Option<&Path>,
    file: &Path,
) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(parent) = parent_dir {
        if let Some(dir) = include_dir {
            candidates.push(parent.join(dir).join(file));
        }
        candidates.push(parent.join(file));
    }
    if let Some(dir) = include_dir {
        candidates.push(dir.join(file));
    }
    candidates.push(file.to_path_buf());
    candidates
}

/// Return the first existing include candidate.
pub fn find_include(
    parent_dir: Option<&Path>,
    include_dir: Option<&Path>,
    file: &Path,
) -> Option<PathBuf> {
    include_candidates(parent_dir, include_dir, file)
        .into_iter()
        .find(|candidate| {
            let found = candidate.is_file();
            tracing::debug!("include candidate {} (exists={})", candidate.display(), found);
            found
        })
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
