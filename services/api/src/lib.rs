mod cli;
mod infra;
mod routes;
mod server;

use horizon_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
