use plan_check_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("plan-check error: {err}");
        std::process::exit(1);
    }
}
