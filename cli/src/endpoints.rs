//! # Endpoints Command
//!
//! Lists the endpoints the inspector discovers, in schema order.

use crate::error::CliResult;
use crate::project::ProjectArgs;
use apischema_core::SchemaGenerator;

/// Arguments for the endpoints command.
#[derive(clap::Args, Debug, Clone)]
pub struct EndpointsArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,
}

/// One `METHOD path view` line per endpoint.
pub fn endpoint_lines(generator: &SchemaGenerator) -> Vec<String> {
    generator
        .endpoints()
        .iter()
        .map(|e| format!("{:<7} {} {}", e.method.as_str(), e.path, e.callback.handler.name()))
        .collect()
}

/// Executes the endpoints command.
pub fn execute(args: &EndpointsArgs) -> CliResult<()> {
    let generator = args.project.load()?.generator(None, None)?;
    for line in endpoint_lines(&generator) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apischema_core::ProjectConfig;

    #[test]
    fn test_endpoint_lines() {
        let config = ProjectConfig::from_yaml_str(
            r#"
views:
  Users: {}
  Health: {allowed_methods: [GET, HEAD]}
urlpatterns:
  - {regex: ^users/$, view: Users, actions: {post: create, get: list}}
  - {regex: ^health/$, view: Health}
  - {regex: ^admin/$, plain: admin}
"#,
        )
        .unwrap();
        let lines = endpoint_lines(&config.generator(None, None).unwrap());
        assert_eq!(
            lines,
            vec![
                "GET     /health/ Health",
                "GET     /users/ Users",
                "POST    /users/ Users",
            ]
        );
    }
}
