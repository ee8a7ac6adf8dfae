// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SpikeconvConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "spikeconv.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `SPIKECONV_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SPIKECONV_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SPIKECONV_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SPIKECONV_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Values are not validated here; call [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SpikeconvConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SpikeconvConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_into<T: FromStr>(value: &str, slot: &mut T) {
    if let Ok(parsed) = value.parse::<T>() {
        *slot = parsed;
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPIKECONV_LOG_LEVEL` -> `system.log_level`
/// - `SPIKECONV_DEBUG_MODE` -> `system.debug`
/// - `SPIKECONV_INPUT_WIDTH` / `SPIKECONV_INPUT_HEIGHT` -> `input.*`
/// - `SPIKECONV_ORIENTATION_COUNT` -> `orientation.count`
/// - `SPIKECONV_POOL_SIZE` / `SPIKECONV_POOL_SHIFT` -> `pooling.*`
/// - `SPIKECONV_TEMPLATE_FILE` -> `recognition.template_file`
/// - `SPIKECONV_CLASS_NAMES` (comma separated) -> `recognition.class_names`
/// - `SPIKECONV_EXPORT_DELAY` / `SPIKECONV_CHUNK_SIZE` -> `export.*`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut SpikeconvConfig) {
    if let Ok(value) = env::var("SPIKECONV_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("SPIKECONV_DEBUG_MODE") {
        config.system.debug = parse_flag(&value);
    }

    if let Ok(value) = env::var("SPIKECONV_INPUT_WIDTH") {
        parse_into(&value, &mut config.input.width);
    }
    if let Ok(value) = env::var("SPIKECONV_INPUT_HEIGHT") {
        parse_into(&value, &mut config.input.height);
    }
    if let Ok(value) = env::var("SPIKECONV_ORIENTATION_COUNT") {
        parse_into(&value, &mut config.orientation.count);
    }

    if let Ok(value) = env::var("SPIKECONV_POOL_SIZE") {
        parse_into(&value, &mut config.pooling.size);
    }
    if let Ok(value) = env::var("SPIKECONV_POOL_SHIFT") {
        parse_into(&value, &mut config.pooling.shift);
    }

    if let Ok(value) = env::var("SPIKECONV_TEMPLATE_FILE") {
        config.recognition.template_file = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("SPIKECONV_CLASS_NAMES") {
        config.recognition.class_names = parse_list(&value);
    }

    if let Ok(value) = env::var("SPIKECONV_EXPORT_DELAY") {
        parse_into(&value, &mut config.export.delay);
    }
    if let Ok(value) = env::var("SPIKECONV_CHUNK_SIZE") {
        parse_into(&value, &mut config.export.chunk_size);
    }
}

/// Apply CLI argument overrides to configuration
///
/// `cli_args` keys: `log_level`, `debug`, `input_width`, `input_height`,
/// `orientation_count`, `pool_size`, `pool_shift`, `template_file`,
/// `class_names`, `delay`, `chunk_size`.
pub fn apply_cli_overrides(config: &mut SpikeconvConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("debug") {
        config.system.debug = parse_flag(value);
    }

    if let Some(value) = cli_args.get("input_width") {
        parse_into(value, &mut config.input.width);
    }
    if let Some(value) = cli_args.get("input_height") {
        parse_into(value, &mut config.input.height);
    }
    if let Some(value) = cli_args.get("orientation_count") {
        parse_into(value, &mut config.orientation.count);
    }

    if let Some(value) = cli_args.get("pool_size") {
        parse_into(value, &mut config.pooling.size);
    }
    if let Some(value) = cli_args.get("pool_shift") {
        parse_into(value, &mut config.pooling.shift);
    }

    if let Some(value) = cli_args.get("template_file") {
        config.recognition.template_file = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("class_names") {
        config.recognition.class_names = parse_list(value);
    }

    if let Some(value) = cli_args.get("delay") {
        parse_into(value, &mut config.export.delay);
    }
    if let Some(value) = cli_args.get("chunk_size") {
        parse_into(value, &mut config.export.chunk_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("SPIKECONV_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SPIKECONV_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("absent.toml");

        env::set_var("SPIKECONV_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SPIKECONV_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let saved = env::var("SPIKECONV_POOL_SHIFT").ok();
        env::remove_var("SPIKECONV_POOL_SHIFT");

        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[input]").unwrap();
        writeln!(file, "width = 64").unwrap();
        writeln!(file, "height = 48").unwrap();
        writeln!(file, "[pooling]").unwrap();
        writeln!(file, "shift = 2").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.input.width, 64);
        assert_eq!(config.input.height, 48);
        assert_eq!(config.pooling.shift, 2);
        assert_eq!(config.pooling.size, 5);

        if let Some(value) = saved {
            env::set_var("SPIKECONV_POOL_SHIFT", value);
        }
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[input\nwidth = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SpikeconvConfig::default();

        env::set_var("SPIKECONV_POOL_SIZE", "3");
        env::set_var("SPIKECONV_CLASS_NAMES", "open, closed");
        env::set_var("SPIKECONV_CHUNK_SIZE", "not-a-number");

        apply_environment_overrides(&mut config);

        env::remove_var("SPIKECONV_POOL_SIZE");
        env::remove_var("SPIKECONV_CLASS_NAMES");
        env::remove_var("SPIKECONV_CHUNK_SIZE");

        assert_eq!(config.pooling.size, 3);
        assert_eq!(config.recognition.class_names, vec!["open", "closed"]);
        assert_eq!(config.export.chunk_size, 0);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SpikeconvConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("template_file".to_string(), "/data/templates.json".to_string());
        cli_args.insert("delay".to_string(), "2".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(
            config.recognition.template_file,
            Some(PathBuf::from("/data/templates.json"))
        );
        assert_eq!(config.export.delay, 2);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[system]").unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();
        writeln!(file, "[pooling]").unwrap();
        writeln!(file, "size = 7").unwrap();

        env::set_var("SPIKECONV_LOG_LEVEL", "debug");
        env::set_var("SPIKECONV_POOL_SIZE", "4");

        let mut cli_args = HashMap::new();
        cli_args.insert("log_level".to_string(), "trace".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("SPIKECONV_LOG_LEVEL");
        env::remove_var("SPIKECONV_POOL_SIZE");

        // CLI wins for log level, env wins for pool size (no CLI override)
        assert_eq!(config.system.log_level, "trace");
        assert_eq!(config.pooling.size, 4);
    }
}
