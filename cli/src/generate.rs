//! # Generate Command
//!
//! Renders the schema of a project to stdout or a file.

use crate::error::CliResult;
use crate::project::ProjectArgs;
use apischema_core::{AppError, HttpMethod, Renderer, Request, User};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Output format.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `application/coreapi+json`.
    #[value(name = "corejson")]
    CoreJson,
    /// Indented JSON.
    Json,
    /// YAML.
    Yaml,
}

impl From<Format> for Renderer {
    fn from(format: Format) -> Self {
        match format {
            Format::CoreJson => Renderer::CoreJson,
            Format::Json => Renderer::Json,
            Format::Yaml => Renderer::Yaml,
        }
    }
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,

    /// Overrides the project title.
    #[clap(long)]
    pub title: Option<String>,

    /// Overrides the base URL prefixed to every link.
    #[clap(long)]
    pub url: Option<String>,

    /// Output format.
    #[clap(long, value_enum, default_value_t = Format::CoreJson)]
    pub format: Format,

    /// Output file. Prints to stdout if not provided.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Generate the schema as seen by this user. Without it, every
    /// endpoint is included regardless of permissions.
    #[clap(long)]
    pub user: Option<String>,

    /// Treat `--user` as a staff member.
    #[clap(long, requires = "user")]
    pub staff: bool,
}

impl GenerateArgs {
    fn request(&self) -> Option<Request> {
        self.user.as_ref().map(|username| {
            Request::new(HttpMethod::Get).with_user(User {
                username: username.clone(),
                is_staff: self.staff,
            })
        })
    }
}

/// Renders the schema described by `args`.
pub fn render(args: &GenerateArgs) -> CliResult<String> {
    let config = args.project.load()?;
    let generator = config.generator(args.title.clone(), args.url.clone())?;
    let request = args.request();

    let document = generator.get_schema(request.as_ref()).ok_or_else(|| {
        AppError::PermissionDenied(match &args.user {
            Some(user) => format!("No endpoints are visible to '{}'", user),
            None => "No endpoints to document".into(),
        })
    })?;

    Ok(Renderer::from(args.format).render(&document)?)
}

/// Executes the generate command.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let body = render(args)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &body)?;
            info!(path = %path.display(), "schema written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
