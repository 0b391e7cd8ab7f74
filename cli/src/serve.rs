//! # Serve Command
//!
//! Serves the project schema over HTTP with Actix Web.
//!
//! There is no real authentication layer: the `X-User` header names the
//! caller and `X-Staff: true` marks them as staff. The `Accept` header
//! picks the renderer.

use crate::error::CliResult;
use crate::project::ProjectArgs;
use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use apischema_core::{AppError, HttpMethod, Request, SchemaView, User};
use std::net::TcpListener;
use tracing::{error, info};

/// Arguments for the serve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,

    /// Listen address.
    #[clap(long, env = "APISCHEMA_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Route the schema is served on.
    #[clap(long, default_value = "/schema/")]
    pub path: String,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Translates the incoming HTTP request into a schema request.
fn schema_request(req: &HttpRequest) -> Request {
    let mut request = Request::new(HttpMethod::Get);
    if let Some(username) = header(req, "X-User").filter(|u| !u.is_empty()) {
        let is_staff = header(req, "X-Staff")
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");
        request = request.with_user(User {
            username: username.to_string(),
            is_staff,
        });
    }
    if let Some(accept) = header(req, "Accept") {
        request = request.with_accept(accept);
    }
    request
}

async fn schema(req: HttpRequest, view: web::Data<SchemaView>) -> HttpResponse {
    match view.get(&schema_request(&req)) {
        Ok(response) => {
            HttpResponse::build(StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK))
                .content_type(response.media_type)
                .body(response.body)
        }
        Err(AppError::PermissionDenied(detail)) => {
            HttpResponse::Forbidden().json(serde_json::json!({ "detail": detail }))
        }
        Err(e) => {
            error!(error = %e, "schema rendering failed");
            HttpResponse::InternalServerError().json(serde_json::json!({ "detail": e.to_string() }))
        }
    }
}

fn build_server(
    listener: TcpListener,
    view: web::Data<SchemaView>,
    path: String,
) -> std::io::Result<Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(view.clone())
            .route(&path, web::get().to(schema))
    })
    .listen(listener)?
    .run())
}

/// Executes the serve command. Blocks until the server shuts down.
pub fn execute(args: &ServeArgs) -> CliResult<()> {
    let view = web::Data::new(args.project.load()?.schema_view()?);
    let listener = TcpListener::bind(&args.bind)?;
    info!(bind = %args.bind, path = %args.path, "serving schema");

    let path = args.path.clone();
    actix_web::rt::System::new()
        .block_on(async move { build_server(listener, view, path)?.await })?;
    Ok(())
}
