use loan_risk_cli::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("loan-risk error: {err}");
        std::process::exit(err.exit_code());
    }
}
