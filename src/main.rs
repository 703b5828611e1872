use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use swsg::config::{self, GENERAL, MARKUP_LANGUAGE, TEMPLATE_LANGUAGE};
use swsg::context::Context;
use swsg::engine::TemplateLanguage;
use swsg::markup::MarkupKind;
use swsg::output;
use swsg::project::{self, Project};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "swsg")]
#[command(about = "A small static website generator")]
#[command(long_about = "\
A small static website generator

A project is a directory with markup sources, layout templates and a config:

  <dir>/<name>/
  ├── config.ini            # template language, default template, engine options
  ├── sources/              # about.rest, news.md, notes.txt, ...
  ├── templates/            # default.html (written by init), others on demand
  └── output/               # about.html, news.html, ... (written by render)

The first two lines of a source may set its title and template:

  title: About us
  template: wide.html

A template's first line may list the sources it belongs to:

  sources: about.rest, news.md

Run 'swsg gen-config' to print the default config.ini.")]
#[command(version = version_string())]
struct Cli {
    /// Log informational messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything (implies --verbose)
    #[arg(short, long, global = true)]
    debug: bool,

    /// Append log output to this file instead of stderr
    #[arg(short, long, global = true)]
    logfile: Option<PathBuf>,

    /// Project registry file (defaults to the per-user data directory)
    #[arg(long, env = "SWSG_REGISTRY", global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Values for `change-config`; at least one is required.
#[derive(clap::Args)]
#[group(required = true, multiple = true)]
struct ChangeConfigArgs {
    /// Markup language for sources without a file extension
    #[arg(short, long)]
    markup_language: Option<String>,

    /// Template language: simple, mako, jinja2 or genshi
    #[arg(short, long)]
    template_language: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List all registered projects
    ListProjects,
    /// Create and register a new project
    Init {
        /// Name of the project (its directory name)
        name: String,
        /// Existing directory the project is created in
        #[arg(short, long, default_value = ".")]
        project_directory: PathBuf,
    },
    /// Delete a project and its registry entry
    RemoveProject {
        /// Path to the project directory
        path: PathBuf,
    },
    /// Change the configuration of the project in the current directory
    ChangeConfig(ChangeConfigArgs),
    /// Render every changed source of the project in the current directory
    Render {
        /// Forget previous renders and render every source
        #[arg(long)]
        no_cache: bool,
    },
    /// Print the default config.ini
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(&cli)?;
    run(cli).inspect_err(|err| error!("{err}"))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = cli.registry;

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_ini()?);
        }
        Command::ListProjects => {
            let ctx = Context::from_host(registry)?;
            output::print_project_table(&ctx.registry.list()?);
        }
        Command::Init {
            name,
            project_directory,
        } => {
            let ctx = Context::from_host(registry)?;
            let mut project = Project::new(&ctx, &project_directory, &name)?;
            project.init()?;
            println!("created project {}", project.project_dir.display());
        }
        Command::RemoveProject { path } => {
            let ctx = Context::from_host(registry)?;
            project::remove_project(&ctx, &path)?;
            println!("removed the project {}", std::path::absolute(&path)?.display());
        }
        Command::ChangeConfig(args) => {
            let mut items = Vec::new();
            if let Some(markup) = &args.markup_language {
                items.push((MARKUP_LANGUAGE, MarkupKind::from_identifier(markup)?.name()));
            }
            if let Some(language) = &args.template_language {
                items.push((
                    TEMPLATE_LANGUAGE,
                    TemplateLanguage::from_identifier(language)?.name(),
                ));
            }
            let ctx = Context::from_host(registry)?;
            let mut project = Project::open(&ctx, &std::env::current_dir()?)?;
            project.update_config(GENERAL, items)?;
        }
        Command::Render { no_cache } => {
            let ctx = Context::from_host(registry)?;
            let mut project = Project::open(&ctx, &std::env::current_dir()?)?;
            if no_cache {
                project.clear_render_cache()?;
            }
            render(&mut project)?;
        }
    }

    Ok(())
}

/// Write every yielded page; report failures and keep going.
fn render(project: &mut Project<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let project_dir = project.project_dir.clone();
    let mut pages = project.render()?;
    for item in pages.by_ref() {
        match item {
            Ok((path, html)) => {
                fs::write(&path, html)?;
                output::print_render_line(&path, &project_dir);
            }
            Err(err) => output::print_render_failure(&err.to_string()),
        }
    }
    let stats = pages.stats();
    output::print_render_summary(&stats);
    if stats.failed > 0 {
        return Err(format!("{} of {} sources failed to render", stats.failed, stats.total()).into());
    }
    Ok(())
}

/// Level: error, `-v` info, `-d` debug.
fn init_logger(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Some(path) = &cli.logfile {
        builder.target(env_logger::Target::Pipe(Box::new(open_logfile(path)?)));
    }
    builder.init();
    Ok(())
}

fn open_logfile(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
