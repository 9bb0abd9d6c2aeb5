mod cli;
mod commands;
mod demo;
mod infra;

use loan_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
