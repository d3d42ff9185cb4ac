// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Display, Formatter, Result},
          path::PathBuf};

use dirs::config_dir;

use crate::{CommonError, CommonErrorType, CommonResult};

pub const DEBUG_CONFIG_MOD: bool = false;

pub enum ConfigPaths {
    LushTopLevelFolderName,
    ShellConfigFile,
}

impl Display for ConfigPaths {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let path = match self {
            ConfigPaths::LushTopLevelFolderName => "r3bl-lush",
            ConfigPaths::ShellConfigFile => "lush.json",
        };
        write!(f, "{path}")
    }
}

/// This is where the config folder is, eg: `~/.config/r3bl-lush` on Linux.
#[must_use]
pub fn try_get_config_folder_path() -> Option<PathBuf> {
    let home_config_folder_path = config_dir()?;
    Some(home_config_folder_path.join(ConfigPaths::LushTopLevelFolderName.to_string()))
}

/// Path of the shell config file inside the config folder. The file doesn't have to
/// exist.
///
/// # Errors
///
/// Returns an error if the OS doesn't expose a config folder.
pub fn try_get_config_file_path() -> CommonResult<PathBuf> {
    match try_get_config_folder_path() {
        Some(folder) => {
            let it = folder.join(ConfigPaths::ShellConfigFile.to_string());
            DEBUG_CONFIG_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(message = "Config file path", path = ?it);
            });
            Ok(it)
        }
        None => {
            // % is Display, ? is Debug.
            tracing::error!(message = "Could not access config folder.", error = "None");
            CommonError::new_error_result_with_only_type(
                CommonErrorType::ConfigFolderPathCouldNotBeGenerated,
            )
        }
    }
}
