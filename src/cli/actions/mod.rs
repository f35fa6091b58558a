pub mod init_db;
pub mod server;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    InitDb { dsn: String },
}
