//! Shared test utilities for the swsg test suite.
//!
//! Provides an isolated [`Context`] (private registry file, no host-wide
//! config) plus helpers to create projects and drop content into them.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let env = TestEnv::new();
//! let mut project = env.init_project("site");
//! add_source(&mut project, "a.rest", "title: Hi\n*x*");
//! add_template(&mut project, "default.html", "<h1>$title</h1>$content");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::context::Context;
use crate::project::Project;
use crate::registry::ProjectRegistry;

/// A temp directory and a context whose registry lives inside it.
pub struct TestEnv {
    pub tmp: TempDir,
    pub ctx: Context,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let registry = ProjectRegistry::new(tmp.path().join("registry/projects.json"));
        let ctx = Context::new(registry, None);
        Self { tmp, ctx }
    }

    /// Directory new projects are created in.
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// A project at `<root>/<name>`, already initialised.
    pub fn init_project(&self, name: &str) -> Project<'_> {
        let mut project = Project::new(&self.ctx, self.root(), name).unwrap();
        project.init().unwrap();
        project
    }
}

/// Write a source file into the project (re-registers it).
pub fn add_source(project: &mut Project<'_>, name: &str, text: &str) -> PathBuf {
    project.save_source(name, text).unwrap()
}

/// Write a template file into the project (re-registers it).
pub fn add_template(project: &mut Project<'_>, name: &str, text: &str) -> PathBuf {
    project.save_template(name, text).unwrap()
}
