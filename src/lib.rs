//! # swsg
//!
//! A small static website generator. A project is a directory of content
//! sources written in a lightweight markup language, a directory of layout
//! templates, and a `config.ini`. Rendering decodes each source to HTML and
//! substitutes it into its template.
//!
//! ```text
//! sources/about.rest ──decode──▶ <p>…</p> ─┐
//!                                          ├─render──▶ output/about.html
//! templates/default.html ──────────────────┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`project`] | Project layout, config lifecycle, and the render pipeline |
//! | [`source`] | Source parsing: `title:` / `template:` directives and body |
//! | [`template`] | Template parsing: `sources:` directive and lazy per-template render |
//! | [`markup`] | Markup registry and decoders (text, reStructuredText, Markdown) |
//! | [`engine`] | Template language registry and engines (simple, Jinja) |
//! | [`config`] | `config.ini` store with built-in defaults |
//! | [`cache`] | Persisted render cache and per-run statistics |
//! | [`registry`] | Persisted project registry keyed by project directory |
//! | [`context`] | Explicit handle bundling registry, markups, and engines |
//! | [`directive`] | Line classifier shared by sources and templates |
//! | [`naming`] | File name helpers: extension, stem, output name |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Global State
//!
//! The registry path, the global default config, and the set of linked
//! decoders and engines live in a [`context::Context`] passed to every
//! project operation. The binary builds one from the host directories;
//! tests build one around a temporary directory.
//!
//! ## Lazy, Fault-Isolated Rendering
//!
//! [`project::Project::render`] yields one item per changed source. A
//! failure scoped to one source (unknown markup, missing template, engine
//! error) is yielded as `Err` and the sequence moves on. Only an unusable
//! template language aborts the whole render.
//!
//! ## Optional Capabilities
//!
//! Markdown and Jinja support sit behind the `markdown` and `jinja` cargo
//! features. A kind that is known but not compiled in reports
//! `MissingDependency`, which is distinct from an unknown name.

pub mod cache;
pub mod config;
pub mod context;
pub mod directive;
pub mod engine;
pub mod markup;
pub mod naming;
pub mod output;
pub mod project;
pub mod registry;
pub mod source;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
