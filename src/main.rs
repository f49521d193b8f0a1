#[tokio::main]
async fn main() {
    let code = adapter_runtime::app::startup::startup().await;
    std::process::exit(code);
}
