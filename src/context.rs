//! The handles every project operation works against.
//!
//! Nothing here is global: the binary builds one [`Context`] from the host
//! directories and passes it down, tests build one around a temp directory.

use crate::engine::EngineRegistry;
use crate::markup::MarkupRegistry;
use crate::registry::{ProjectRegistry, REGISTRY_FILENAME};
use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// File name of the host-wide default config inside the config directory.
pub const GLOBAL_CONFIG_FILENAME: &str = "config.ini";

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("could not determine the user data directory")]
    NoHostDirectories,
}

#[derive(Debug)]
pub struct Context {
    pub registry: ProjectRegistry,
    pub markups: MarkupRegistry,
    pub engines: EngineRegistry,
    /// Host-wide default `config.ini`. Used by `init` only if the file exists.
    pub global_config: Option<PathBuf>,
}

impl Context {
    /// A context with every decoder and engine compiled into this build.
    pub fn new(registry: ProjectRegistry, global_config: Option<PathBuf>) -> Self {
        Self {
            registry,
            markups: MarkupRegistry::with_builtin(),
            engines: EngineRegistry::with_builtin(),
            global_config,
        }
    }

    /// The per-user context: registry under the data directory (unless
    /// overridden), global config under the config directory.
    pub fn from_host(registry_path: Option<PathBuf>) -> Result<Self, ContextError> {
        let dirs = host_dirs().ok_or(ContextError::NoHostDirectories)?;
        let registry_path =
            registry_path.unwrap_or_else(|| dirs.data_dir().join(REGISTRY_FILENAME));
        Ok(Self::new(
            ProjectRegistry::new(registry_path),
            Some(dirs.config_dir().join(GLOBAL_CONFIG_FILENAME)),
        ))
    }
}

fn host_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "swsg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_links_builtin_capabilities() {
        let ctx = Context::new(ProjectRegistry::new("/tmp/r.json"), None);
        assert!(ctx.markups.ensure_available("rest").is_ok());
        assert!(ctx.engines.ensure_available("simple").is_ok());
        assert!(ctx.global_config.is_none());
    }

    #[test]
    fn registry_override_is_used() {
        if let Ok(ctx) = Context::from_host(Some(PathBuf::from("/tmp/custom.json"))) {
            assert_eq!(ctx.registry.path(), std::path::Path::new("/tmp/custom.json"));
            assert!(
                ctx.global_config
                    .unwrap()
                    .ends_with(GLOBAL_CONFIG_FILENAME)
            );
        }
    }
}
