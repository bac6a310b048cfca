#[tokio::main]
async fn main() {
    drscreen::start_server().await;
}
