use crate::{cli::globals::GlobalArgs, quill};
use anyhow::{ensure, Result};
use secrecy::SecretString;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub secret_key: SecretString,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the DSN is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let dsn = Url::parse(&args.dsn)?;

    ensure!(
        dsn.scheme() == "sqlite",
        "unsupported DSN scheme: {}",
        dsn.scheme()
    );

    let globals = GlobalArgs::new(args.secret_key);

    quill::new(args.port, args.dsn, &globals).await?;

    Ok(())
}
