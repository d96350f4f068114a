use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Deserialize;

use sidecar_tools::print_error;

use crate::SideSortArgs;

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) auto: bool,
    pub(crate) debug: bool,
    pub(crate) dryrun: bool,
    pub(crate) originals_root: PathBuf,
    pub(crate) sidecar_root: PathBuf,
    pub(crate) sidecar_extensions: Vec<String>,
    pub(crate) verbose: bool,
}

/// Config from the user config file
#[derive(Debug, Default, Deserialize)]
struct SideSortConfig {
    #[serde(default)]
    auto: bool,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    originals_path: Option<PathBuf>,
    #[serde(default)]
    sidecar_path: Option<PathBuf>,
    #[serde(default)]
    sidecar_extensions: Vec<String>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    sidesort: SideSortConfig,
}

impl SideSortConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    fn get_user_config() -> Self {
        sidecar_tools::config::CONFIG_PATH
            .as_deref()
            .and_then(|path| {
                fs::read_to_string(path)
                    .map_err(|e| {
                        print_error!("Error reading config file {}: {e}", path.display());
                    })
                    .ok()
            })
            .and_then(|config_string| Self::from_toml_str(&config_string).ok())
            .unwrap_or_default()
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.sidesort)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// Both root directories must come from either the command line or the
    /// config file, and must exist. The sidecar tree is expected to mirror
    /// the originals tree below these two roots.
    pub fn from_args(args: &SideSortArgs) -> Result<Self> {
        let user_config = SideSortConfig::get_user_config();

        let originals = args
            .originals
            .clone()
            .or(user_config.originals_path)
            .context("Originals root not set: pass --originals or set originals_path in the config file")?;
        let sidecar = args
            .sidecar
            .clone()
            .or(user_config.sidecar_path)
            .context("Sidecar root not set: pass --sidecar or set sidecar_path in the config file")?;

        let sidecar_extensions: Vec<String> = if user_config.sidecar_extensions.is_empty() {
            vec!["yml".to_string(), "yaml".to_string()]
        } else {
            user_config
                .sidecar_extensions
                .into_iter()
                .map(|extension| extension.to_lowercase())
                .unique()
                .collect()
        };

        Ok(Self {
            auto: args.auto || user_config.auto,
            debug: args.debug || user_config.debug,
            dryrun: args.print || user_config.dryrun,
            originals_root: sidecar_tools::resolve_input_path(Some(&originals))?,
            sidecar_root: sidecar_tools::resolve_input_path(Some(&sidecar))?,
            sidecar_extensions,
            verbose: args.verbose || user_config.verbose,
        })
    }
}
