//! Projects: directory layout, configuration lifecycle, and the render
//! pipeline.
//!
//! ```text
//! <root>/<name>/
//! ├── config.ini             # see crate::config
//! ├── .render-cache.json     # see crate::cache
//! ├── sources/               # one file per page; extension selects markup
//! ├── templates/             # layouts; default.html written at init
//! └── output/                # <source stem>.html
//! ```
//!
//! # Rendering
//!
//! [`Project::render`] returns a lazy, single-pass [`ProjectRender`]. For
//! every file in `sources/` (sorted by name) it resolves the template (the
//! source's `template:` line or `general.default template`), fingerprints
//! source, template, and config, and skips the source when the render
//! cache already holds that fingerprint. Otherwise it decodes, renders,
//! records the fingerprint, and yields `(output path, html)`.
//!
//! Failures scoped to one source (unknown markup, missing template, engine
//! error) are logged and yielded as `Err`; the sequence continues. A
//! configured template language that cannot be resolved fails the
//! `render` call itself.
//!
//! Writing the yielded text to disk is the caller's job.

use crate::cache::{self, Fingerprint, RenderCache, RenderStats};
use crate::config::{self, ConfigError, ProjectConfig};
use crate::context::Context;
use crate::engine::{EngineError, EngineOptions, TemplateEngine, stock};
use crate::naming;
use crate::registry::{ProjectRecord, RegistryError};
use crate::source::{SourceError, SourceFile};
use crate::template::{Template, TemplateError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const SOURCE_DIR: &str = "sources";
pub const TEMPLATE_DIR: &str = "templates";
pub const OUTPUT_DIR: &str = "output";
pub const CONFIG_FILENAME: &str = "config.ini";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to list {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("{second} and {first} both render to {output}")]
    OutputCollision {
        output: String,
        first: String,
        second: String,
    },
    #[error("template {} does not exist", .0.display())]
    MissingTemplate(PathBuf),
    #[error("{} is not a project directory path", .0.display())]
    InvalidPath(PathBuf),
}

#[derive(Debug)]
pub struct Project<'ctx> {
    ctx: &'ctx Context,
    pub root: PathBuf,
    pub name: String,
    pub project_dir: PathBuf,
    pub source_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config_filename: PathBuf,
    pub config: ProjectConfig,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl<'ctx> Project<'ctx> {
    /// An in-memory project at `<root>/<name>`. Nothing is touched on disk.
    pub fn new(ctx: &'ctx Context, root: &Path, name: &str) -> Result<Self, ProjectError> {
        let root = normalize_dir(root)?;
        let project_dir = root.join(name);
        Ok(Self {
            ctx,
            name: name.to_string(),
            source_dir: project_dir.join(SOURCE_DIR),
            template_dir: project_dir.join(TEMPLATE_DIR),
            output_dir: project_dir.join(OUTPUT_DIR),
            config_filename: project_dir.join(CONFIG_FILENAME),
            project_dir,
            root,
            config: ProjectConfig::empty(),
            created: None,
            last_modified: None,
        })
    }

    /// The project whose directory is `project_dir`, with its config and
    /// registry timestamps loaded when present.
    pub fn open(ctx: &'ctx Context, project_dir: &Path) -> Result<Self, ProjectError> {
        let project_dir = normalize_lexically(&std::path::absolute(project_dir)?);
        let (root, name) = match (project_dir.parent(), project_dir.file_name()) {
            (Some(root), Some(name)) => (root.to_path_buf(), name.to_string_lossy().into_owned()),
            _ => return Err(ProjectError::InvalidPath(project_dir.clone())),
        };
        let mut project = Self::new(ctx, &root, &name)?;
        if let Some(record) = ctx.registry.lookup(&project.project_dir)? {
            project.created = record.created;
            project.last_modified = Some(record.last_modified);
        }
        if project.config_filename.is_file() {
            project.read_config()?;
        }
        Ok(project)
    }

    /// Create the layout, write the config and default template, and
    /// register the project as new.
    pub fn init(&mut self) -> Result<(), ProjectError> {
        info!("initialising project {} in {}", self.name, self.root.display());
        self.make_project_directories()?;
        self.reset_config()?;
        self.read_config()?;
        self.write_default_template()?;
        self.update_registry(true)
    }

    /// Create `sources/`, `templates/`, and `output/`. Fails if any exists.
    pub fn make_project_directories(&self) -> Result<(), ProjectError> {
        fs::create_dir_all(&self.project_dir)?;
        for dir in [&self.source_dir, &self.template_dir, &self.output_dir] {
            fs::create_dir(dir)?;
        }
        Ok(())
    }

    /// Write the initial `config.ini`: a byte copy of the host-wide default
    /// if one exists, else the built-in defaults.
    pub fn reset_config(&mut self) -> Result<(), ProjectError> {
        if let Some(global) = &self.ctx.global_config
            && let Some(bytes) = config::read_raw(global)?
        {
            debug!("copying global config {}", global.display());
            fs::write(&self.config_filename, bytes)?;
            return Ok(());
        }
        ProjectConfig::stock().save(&self.config_filename)?;
        Ok(())
    }

    pub fn read_config(&mut self) -> Result<(), ProjectError> {
        self.config = ProjectConfig::load(&self.config_filename)?;
        Ok(())
    }

    pub fn write_config(&self) -> Result<(), ProjectError> {
        self.config.save(&self.config_filename)?;
        Ok(())
    }

    /// Merge `items` into `section`, persist, and re-register.
    pub fn update_config<I, K, V>(&mut self, section: &str, items: I) -> Result<(), ProjectError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.read_config()?;
        self.config.update(section, items);
        self.write_config()?;
        self.update_registry(false)
    }

    fn write_default_template(&self) -> Result<(), ProjectError> {
        let language = self.ctx.engines.language(self.config.template_language()?)?;
        let options = self.engine_options(language.options_section());
        let path = self.template_dir.join(self.config.default_template());
        fs::write(&path, stock::default_template(language, &options))?;
        debug!("wrote default {language} template {}", path.display());
        Ok(())
    }

    fn engine_options(&self, section: Option<&str>) -> EngineOptions {
        section
            .map(|s| self.config.section(s))
            .unwrap_or_default()
    }

    /// Record the project in the registry with fresh timestamps.
    ///
    /// `created` is set when `new_created`; otherwise the registered value
    /// is kept.
    pub fn update_registry(&mut self, new_created: bool) -> Result<(), ProjectError> {
        let now = Utc::now();
        if new_created {
            self.created = Some(now);
        } else if self.created.is_none()
            && let Some(record) = self.ctx.registry.lookup(&self.project_dir)?
        {
            self.created = record.created;
        }
        self.last_modified = Some(now);
        self.ctx.registry.put(
            &self.project_dir,
            ProjectRecord {
                name: self.name.clone(),
                path: self.root.clone(),
                created: self.created,
                last_modified: now,
            },
        )?;
        Ok(())
    }

    /// Directories, config file, and registry entry all present.
    ///
    /// An unreadable registry is an error, not an absent entry.
    pub fn exists(&self) -> Result<bool, ProjectError> {
        let on_disk = [&self.source_dir, &self.template_dir, &self.output_dir]
            .iter()
            .all(|dir| dir.is_dir())
            && self.config_filename.is_file();
        Ok(on_disk && self.ctx.registry.contains(&self.project_dir)?)
    }

    /// Delete the registry entry and the project tree.
    pub fn remove(self) -> Result<(), ProjectError> {
        self.ctx.registry.remove(&self.project_dir)?;
        if self.project_dir.exists() {
            fs::remove_dir_all(&self.project_dir)?;
        }
        info!("removed project {}", self.project_dir.display());
        Ok(())
    }

    /// Content file names in `sources/`, sorted, dotfiles skipped.
    pub fn source_names(&self) -> Result<Vec<String>, ProjectError> {
        list_files(&self.source_dir)
    }

    /// Every source, parsed. Fails on the first unreadable one.
    pub fn sources(&self) -> Result<Vec<(String, SourceFile)>, ProjectError> {
        self.source_names()?
            .into_iter()
            .map(|name| {
                let file = SourceFile::load(
                    &self.source_dir.join(&name),
                    &self.ctx.markups,
                    self.config.markup_language(),
                )?;
                Ok::<_, ProjectError>((name, file))
            })
            .collect()
    }

    /// Every template, parsed.
    pub fn templates(&self) -> Result<Vec<(String, Template)>, ProjectError> {
        list_files(&self.template_dir)?
            .into_iter()
            .map(|name| {
                let template = Template::load(&self.template_dir.join(&name))?;
                Ok::<_, ProjectError>((name, template))
            })
            .collect()
    }

    pub fn save_source(&mut self, name: &str, text: &str) -> Result<PathBuf, ProjectError> {
        let path = self.source_dir.join(name);
        fs::write(&path, text)?;
        self.update_registry(false)?;
        Ok(path)
    }

    pub fn save_template(&mut self, name: &str, text: &str) -> Result<PathBuf, ProjectError> {
        let path = self.template_dir.join(name);
        fs::write(&path, text)?;
        self.update_registry(false)?;
        Ok(path)
    }

    /// Forget every recorded fingerprint, so the next render does everything.
    pub fn clear_render_cache(&self) -> Result<(), ProjectError> {
        let mut cache = RenderCache::load(&self.project_dir);
        cache.clear();
        cache.save(&self.project_dir)?;
        Ok(())
    }

    /// Start a render. See the module docs for the per-source contract.
    pub fn render(&mut self) -> Result<ProjectRender<'_, 'ctx>, ProjectError> {
        self.read_config()?;
        let ctx = self.ctx;
        let language = ctx
            .engines
            .ensure_available(self.config.template_language()?)?;
        let engine = ctx.engines.engine(language)?;
        let options = self.engine_options(language.options_section());
        let config_hash = cache::hash_file(&self.config_filename)?;
        let names = self.source_names()?;
        let cache = RenderCache::load(&self.project_dir);
        info!(
            "rendering {} sources of {} with {language}",
            names.len(),
            self.name
        );
        Ok(ProjectRender {
            project: self,
            engine,
            options,
            config_hash,
            names: names.into_iter(),
            cache,
            claimed: HashMap::new(),
            stats: RenderStats::default(),
            finished: false,
        })
    }
}

fn list_files(dir: &Path) -> Result<Vec<String>, ProjectError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ProjectError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        // path().is_file() follows symlinks; a dangling link is skipped
        if entry.path().is_file() && !naming::is_hidden(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Resolve `.` and `..` without touching the file system.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Absolute, `..`-free form of a directory; symlinks resolved when it exists.
fn normalize_dir(dir: &Path) -> io::Result<PathBuf> {
    let lexical = normalize_lexically(&std::path::absolute(dir)?);
    Ok(fs::canonicalize(&lexical).unwrap_or(lexical))
}

/// Lazy render sequence returned by [`Project::render`].
///
/// Each yielded page's fingerprint is already saved, so dropping the
/// sequence midway loses nothing. Once exhausted, the project is
/// re-registered if anything was rendered.
pub struct ProjectRender<'p, 'ctx> {
    project: &'p mut Project<'ctx>,
    engine: &'ctx dyn TemplateEngine,
    options: EngineOptions,
    config_hash: String,
    names: std::vec::IntoIter<String>,
    cache: RenderCache,
    /// Output name -> source that produced it in this pass.
    claimed: HashMap<String, String>,
    stats: RenderStats,
    finished: bool,
}

impl ProjectRender<'_, '_> {
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// `Ok(None)` when the source is unchanged since its last render.
    fn render_source(&mut self, name: &str) -> Result<Option<(PathBuf, String)>, ProjectError> {
        let output = naming::output_file_name(name);
        if let Some(first) = self.claimed.get(&output) {
            return Err(ProjectError::OutputCollision {
                output,
                first: first.clone(),
                second: name.to_string(),
            });
        }
        self.claimed.insert(output.clone(), name.to_string());

        let project = &*self.project;
        let ctx = project.ctx;
        let file = SourceFile::load(
            &project.source_dir.join(name),
            &ctx.markups,
            project.config.markup_language(),
        )?;

        let template_path = project
            .template_dir
            .join(file.source.template_or(project.config.default_template()));
        if !template_path.is_file() {
            return Err(ProjectError::MissingTemplate(template_path));
        }
        let template_text = fs::read_to_string(&template_path)?;

        let fingerprint = Fingerprint {
            source_hash: cache::hash_text(file.source.text()),
            template_hash: cache::hash_text(&template_text),
            config_hash: self.config_hash.clone(),
        };
        if self.cache.is_fresh(&output, &fingerprint) {
            return Ok(None);
        }

        let template = Template::parse(&template_text);
        let html = file.render(&ctx.markups, self.engine, template.body(), &self.options)?;
        let output_path = project.output_dir.join(&output);

        self.cache.record(output, fingerprint);
        self.cache.save(&project.project_dir)?;
        Ok(Some((output_path, html)))
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        info!("render of {} done: {}", self.project.name, self.stats);
        let before = self.cache.len();
        let claimed = &self.claimed;
        self.cache.retain(|output| claimed.contains_key(output));
        if self.cache.len() != before {
            debug!("pruned {} stale cache entries", before - self.cache.len());
            if let Err(err) = self.cache.save(&self.project.project_dir) {
                warn!("could not save render cache: {err}");
            }
        }
        if self.stats.rendered > 0
            && let Err(err) = self.project.update_registry(false)
        {
            warn!("could not update registry: {err}");
        }
    }
}

impl Iterator for ProjectRender<'_, '_> {
    type Item = Result<(PathBuf, String), ProjectError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(name) = self.names.next() else {
                self.finish();
                return None;
            };
            match self.render_source(&name) {
                Ok(Some(page)) => {
                    self.stats.rendered += 1;
                    debug!("rendered {name} -> {}", page.0.display());
                    return Some(Ok(page));
                }
                Ok(None) => {
                    self.stats.skipped += 1;
                    debug!("{name} unchanged, skipping");
                }
                Err(err) => {
                    self.stats.failed += 1;
                    warn!("{name}: {err}");
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Remove the project registered at `project_dir`.
pub fn remove_project(ctx: &Context, project_dir: &Path) -> Result<(), ProjectError> {
    Project::open(ctx, project_dir)?.remove()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GENERAL, TEMPLATE_LANGUAGE};
    use crate::markup::MarkupError;
    use crate::registry::ProjectRegistry;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    const PAGE: &str = "<h1>$title</h1><p>$content</p>";

    fn render_all(project: &mut Project<'_>) -> Vec<(PathBuf, String)> {
        project
            .render()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    // =========================================================================
    // Layout and lifecycle
    // =========================================================================

    #[test]
    fn make_project_directories_creates_layout() {
        let env = TestEnv::new();
        let project = Project::new(&env.ctx, env.root(), "site").unwrap();
        project.make_project_directories().unwrap();
        assert!(project.source_dir.is_dir());
        assert!(project.template_dir.is_dir());
        assert!(project.output_dir.is_dir());
        assert_eq!(project.project_dir, env.root().join("site"));
    }

    #[test]
    fn init_writes_config_template_and_registry() {
        let env = TestEnv::new();
        let project = env.init_project("site");
        assert!(project.exists().unwrap());
        assert_eq!(project.config.template_language().unwrap(), "simple");
        let default = fs::read_to_string(project.template_dir.join("default.html")).unwrap();
        assert!(default.contains("$content"));
        let record = env.ctx.registry.get(&project.project_dir).unwrap();
        assert_eq!(record.name, "site");
        assert!(record.created.is_some());
        assert_eq!(record.created, project.created);
    }

    #[test]
    fn init_twice_is_an_error() {
        let env = TestEnv::new();
        env.init_project("site");
        let mut again = Project::new(&env.ctx, env.root(), "site").unwrap();
        assert!(matches!(again.init(), Err(ProjectError::Io(_))));
    }

    #[test]
    fn init_copies_global_config_verbatim() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.ini");
        let text = "; mine\n[general]\ntemplate language=jinja2\ndefault template=page.html\n";
        fs::write(&global, text).unwrap();
        let ctx = Context::new(
            ProjectRegistry::new(tmp.path().join("projects.json")),
            Some(global),
        );
        let mut project = Project::new(&ctx, tmp.path(), "site").unwrap();
        project.init().unwrap();

        assert_eq!(fs::read_to_string(&project.config_filename).unwrap(), text);
        assert!(project.template_dir.join("page.html").is_file());
    }

    #[test]
    fn exists_needs_registry_entry() {
        let env = TestEnv::new();
        let project = Project::new(&env.ctx, env.root(), "site").unwrap();
        assert!(!project.exists().unwrap());
        project.make_project_directories().unwrap();
        ProjectConfig::stock().save(&project.config_filename).unwrap();
        assert!(!project.exists().unwrap());
    }

    #[test]
    fn update_registry_keeps_created() {
        let env = TestEnv::new();
        let project = env.init_project("site");
        let created = project.created;

        let mut reopened = Project::open(&env.ctx, &project.project_dir).unwrap();
        assert_eq!(reopened.created, created);
        reopened.created = None;
        reopened.update_registry(false).unwrap();
        assert_eq!(reopened.created, created);
        assert!(reopened.last_modified >= created);
    }

    #[test]
    fn update_config_merges_and_reregisters() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        let before = project.last_modified;
        project
            .update_config(GENERAL, [(TEMPLATE_LANGUAGE, "jinja2")])
            .unwrap();
        let reloaded = ProjectConfig::load(&project.config_filename).unwrap();
        assert_eq!(reloaded.template_language().unwrap(), "jinja2");
        assert_eq!(reloaded.default_template(), "default.html");
        assert!(project.last_modified >= before);
    }

    #[test]
    fn remove_deletes_tree_and_entry() {
        let env = TestEnv::new();
        let project = env.init_project("site");
        let dir = project.project_dir.clone();
        project.remove().unwrap();
        assert!(!dir.exists());
        let reopened = Project::open(&env.ctx, &dir).unwrap();
        assert!(!reopened.exists().unwrap());
    }

    #[test]
    fn remove_never_initialised_is_nonexisting_project() {
        let env = TestEnv::new();
        let err = remove_project(&env.ctx, &env.root().join("ghost")).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Registry(RegistryError::NonexistingProject(_))
        ));
    }

    #[test]
    fn dot_dot_in_root_is_normalized() {
        let env = TestEnv::new();
        fs::create_dir(env.root().join("sub")).unwrap();
        let mut project = Project::new(&env.ctx, &env.root().join("sub/.."), "site").unwrap();
        project.init().unwrap();
        let real = env.root().join("site");

        let mut reopened = Project::open(&env.ctx, &real).unwrap();
        assert_eq!(reopened.project_dir, project.project_dir);
        assert!(reopened.exists().unwrap());
        reopened.update_registry(false).unwrap();
        assert_eq!(env.ctx.registry.list().unwrap().len(), 1);

        remove_project(&env.ctx, &env.root().join("sub/../site/.")).unwrap();
        assert!(env.ctx.registry.list().unwrap().is_empty());
        assert!(!real.exists());
    }

    #[test]
    fn corrupt_registry_is_not_treated_as_unregistered() {
        let env = TestEnv::new();
        let project = env.init_project("site");
        fs::write(env.ctx.registry.path(), "not json").unwrap();

        assert!(matches!(
            project.exists(),
            Err(ProjectError::Registry(RegistryError::Json { .. }))
        ));
        assert!(matches!(
            Project::open(&env.ctx, &project.project_dir),
            Err(ProjectError::Registry(RegistryError::Json { .. }))
        ));
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    #[test]
    fn sources_are_sorted_and_skip_dotfiles() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        assert!(project.sources().unwrap().is_empty());
        add_source(&mut project, "source2.rest", "content of source2");
        add_source(&mut project, "source1.rest", "content of source1");
        fs::write(project.source_dir.join(".swp"), "x").unwrap();

        let sources = project.sources().unwrap();
        let names: Vec<_> = sources.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["source1.rest", "source2.rest"]);
        assert_eq!(sources[0].1.source.text(), "content of source1");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_sources_are_listed() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        let shared = env.root().join("shared.rest");
        fs::write(&shared, "shared text").unwrap();
        std::os::unix::fs::symlink(&shared, project.source_dir.join("shared.rest")).unwrap();
        std::os::unix::fs::symlink(
            env.root().join("missing.rest"),
            project.source_dir.join("dangling.rest"),
        )
        .unwrap();
        add_source(&mut project, "own.rest", "own text");

        assert_eq!(project.source_names().unwrap(), ["own.rest", "shared.rest"]);
        assert_eq!(render_all(&mut project).len(), 2);
    }

    #[test]
    fn templates_are_parsed() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_template(&mut project, "list.html", "sources: a.rest\n<ul>$content</ul>");
        let templates = project.templates().unwrap();
        let (name, list) = &templates[1];
        assert_eq!(templates[0].0, "default.html");
        assert_eq!(name, "list.html");
        assert_eq!(list.source_names(), ["a.rest"]);
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn end_to_end_simple_rest() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "title: Hi\n*x*");
        add_template(&mut project, "default.html", &format!("sources: a.rest\n{PAGE}"));

        let pages = render_all(&mut project);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].0, project.output_dir.join("a.html"));
        assert_eq!(pages[0].1, "<h1>Hi</h1><p><p><em>x</em></p>\n</p>");
    }

    #[test]
    fn second_render_is_empty() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        add_source(&mut project, "b.rest", "two");

        assert_eq!(render_all(&mut project).len(), 2);
        let mut render = project.render().unwrap();
        assert!(render.next().is_none());
        assert_eq!(
            render.stats(),
            RenderStats {
                rendered: 0,
                skipped: 2,
                failed: 0
            }
        );
    }

    #[test]
    fn cache_survives_between_sessions() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        assert_eq!(render_all(&mut project).len(), 1);

        let mut reopened = Project::open(&env.ctx, &project.project_dir).unwrap();
        assert!(render_all(&mut reopened).is_empty());
    }

    #[test]
    fn touching_template_rerenders_its_sources_only() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_template(&mut project, "other.html", "other: $title");
        add_source(&mut project, "a.rest", "template: other.html\none");
        add_source(&mut project, "b.rest", "two");
        assert_eq!(render_all(&mut project).len(), 2);

        add_template(&mut project, "other.html", "changed: $title");
        let pages = render_all(&mut project);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].1, "changed: a");
    }

    #[test]
    fn touching_source_rerenders_it() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        add_source(&mut project, "b.rest", "two");
        render_all(&mut project);

        add_source(&mut project, "b.rest", "two, edited");
        let pages = render_all(&mut project);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].0, project.output_dir.join("b.html"));
    }

    #[test]
    fn touching_config_rerenders_everything() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        add_source(&mut project, "b.rest", "two");
        render_all(&mut project);

        project.update_config("custom", [("key", "value")]).unwrap();
        assert_eq!(render_all(&mut project).len(), 2);
    }

    #[test]
    fn clear_render_cache_forces_full_render() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        render_all(&mut project);
        project.clear_render_cache().unwrap();
        assert_eq!(render_all(&mut project).len(), 1);
    }

    #[test]
    fn missing_template_is_per_source() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "template: nope.html\none");
        add_source(&mut project, "b.rest", "two");

        let mut render = project.render().unwrap();
        let items: Vec<_> = render.by_ref().collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(
            &items[0],
            Err(ProjectError::MissingTemplate(path)) if path.ends_with("nope.html")
        ));
        assert!(items[1].is_ok());
        assert_eq!(render.stats().failed, 1);
    }

    #[test]
    fn unsupported_markup_is_per_source() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.bogus", "x");
        add_source(&mut project, "b.txt", "y");

        let items: Vec<_> = project.render().unwrap().collect();
        assert!(matches!(
            &items[0],
            Err(ProjectError::Source(SourceError::Markup {
                source: MarkupError::Unsupported(_),
                ..
            }))
        ));
        assert!(items[1].is_ok());
    }

    #[test]
    fn unsupported_template_language_aborts_render() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        project
            .update_config(GENERAL, [(TEMPLATE_LANGUAGE, "handlebars")])
            .unwrap();
        assert!(matches!(
            project.render().err().unwrap(),
            ProjectError::Engine(EngineError::Unsupported(_))
        ));
    }

    #[test]
    fn unlinked_template_language_is_missing_dependency() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        project
            .update_config(GENERAL, [(TEMPLATE_LANGUAGE, "mako")])
            .unwrap();
        assert!(matches!(
            project.render().err().unwrap(),
            ProjectError::Engine(EngineError::MissingDependency { .. })
        ));
    }

    #[test]
    fn extensionless_source_uses_configured_markup() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_template(&mut project, "default.html", "$content");
        add_source(&mut project, "README", "*x*");
        let pages = render_all(&mut project);
        assert_eq!(pages[0].0, project.output_dir.join("README.html"));
        assert_eq!(pages[0].1, "<p><em>x</em></p>\n");
    }

    #[cfg(feature = "jinja")]
    #[test]
    fn jinja_project_uses_config_section_options() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        project
            .update_config(GENERAL, [(TEMPLATE_LANGUAGE, "jinja")])
            .unwrap();
        project
            .update_config(
                "jinja",
                [("variable_start_string", "[["), ("variable_end_string", "]]")],
            )
            .unwrap();
        add_template(&mut project, "default.html", "[[ title ]]|{{ title }}");
        add_source(&mut project, "a.txt", "title: T\nbody");
        let pages = render_all(&mut project);
        assert_eq!(pages[0].1, "T|{{ title }}");
    }

    #[test]
    fn sources_sharing_a_stem_report_a_collision() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_template(&mut project, "default.html", PAGE);
        add_source(&mut project, "a.rest", "from rest");
        add_source(&mut project, "a.txt", "from text");

        for pass in 0..3 {
            let items: Vec<_> = project.render().unwrap().collect();
            let rendered = items.iter().filter(|item| item.is_ok()).count();
            assert_eq!(rendered, usize::from(pass == 0), "pass {pass}");
            let errors: Vec<_> = items.into_iter().filter_map(Result::err).collect();
            assert_eq!(errors.len(), 1);
            assert!(matches!(
                &errors[0],
                ProjectError::OutputCollision { output, first, second }
                    if output == "a.html" && first == "a.rest" && second == "a.txt"
            ));
        }
    }

    #[test]
    fn cache_forgets_deleted_sources() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        add_source(&mut project, "b.rest", "two");
        render_all(&mut project);
        assert_eq!(RenderCache::load(&project.project_dir).len(), 2);

        fs::remove_file(project.source_dir.join("b.rest")).unwrap();
        assert!(render_all(&mut project).is_empty());
        let cache = RenderCache::load(&project.project_dir);
        assert_eq!(cache.len(), 1);
        assert!(cache.entries.contains_key("a.html"));
    }

    #[test]
    fn render_reregisters_when_something_rendered() {
        let env = TestEnv::new();
        let mut project = env.init_project("site");
        add_source(&mut project, "a.rest", "one");
        let before = env.ctx.registry.get(&project.project_dir).unwrap();
        render_all(&mut project);
        let after = env.ctx.registry.get(&project.project_dir).unwrap();
        assert!(after.last_modified >= before.last_modified);
        assert_eq!(after.created, before.created);
    }
}
