// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeconv-observability
//!
//! Logging setup shared by the spikeconv tools, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: timestamped run folders with per-crate log files and
//!   retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Log target of network assembly and the command-line tools
pub const NETWORK_TARGET: &str = "spikeconv::network";

/// Log targets that accept `--debug-<name>` flags.
///
/// Filter directives match targets by prefix, so no entry may be a prefix of
/// another.
pub const KNOWN_CRATES: &[&str] = &[NETWORK_TARGET, "spikeconv-connectivity"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_targets_are_not_prefixes() {
        for a in KNOWN_CRATES {
            for b in KNOWN_CRATES {
                assert!(a == b || !b.starts_with(a), "{} is a prefix of {}", a, b);
            }
        }
    }
}
