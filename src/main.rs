use rask_spy::error::SpyError;

#[tokio::main]
async fn main() -> Result<(), SpyError> {
    rask_spy::app::run().await
}
