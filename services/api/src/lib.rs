mod cli;
mod gate;
mod infra;
mod render;
mod routes;
mod server;

use bank_finder::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
