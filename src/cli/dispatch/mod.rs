use crate::cli::actions::{server, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    if matches.subcommand_matches("init-db").is_some() {
        return Ok(Action::InitDb { dsn });
    }

    let secret_key = matches
        .get_one::<String>("secret-key")
        .cloned()
        .unwrap_or_else(|| String::from("dev"));

    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn,
        secret_key: SecretString::from(secret_key),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "quill",
            "--port",
            "9090",
            "--dsn",
            "sqlite:quill.sqlite",
        ]);

        let action = handler(&matches).unwrap();
        match action {
            Action::Server(args) => {
                assert_eq!(args.port, 9090);
                assert_eq!(args.dsn, "sqlite:quill.sqlite");
                assert_eq!(args.secret_key.expose_secret(), "dev");
            }
            Action::InitDb { .. } => panic!("expected server action"),
        }
    }

    #[test]
    fn test_init_db_action() {
        let matches = commands::new().get_matches_from(vec![
            "quill",
            "--dsn",
            "sqlite:file:mem?mode=memory&cache=shared",
            "init-db",
        ]);

        let action = handler(&matches).unwrap();
        match action {
            Action::InitDb { dsn } => {
                assert_eq!(dsn, "sqlite:file:mem?mode=memory&cache=shared");
            }
            Action::Server(_) => panic!("expected init-db action"),
        }
    }
}
