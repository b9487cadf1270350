#[tokio::main]
async fn main() {
    if let Err(e) = salesfeed::server::main::run_server().await {
        tracing::error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}
