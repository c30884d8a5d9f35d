mod cli;
mod commands;
mod console;
mod demo;
mod infra;
mod routes;
mod server;

use request_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
