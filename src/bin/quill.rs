use anyhow::Result;
use quill::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    match action {
        Action::Server(args) => actions::server::execute(args).await?,
        Action::InitDb { dsn } => actions::init_db::execute(&dsn).await?,
    }

    Ok(())
}
