#[tokio::main]
async fn main() {
    if let Err(e) = scheduling_backend::run().await {
        eprintln!("scheduling-backend failed to start: {}", e);
        std::process::exit(1);
    }
}
