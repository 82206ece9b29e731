use folder_move_core::contract::MoveResponse;
use folder_move_lambda::adapters::object_store::ObjectStore;
use folder_move_lambda::adapters::s3::S3ObjectStore;
use folder_move_lambda::config::HandlerConfig;
use folder_move_lambda::handlers::move_folder::handle_move_event;
use folder_move_lambda::logging::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    config: &HandlerConfig,
    store: &impl ObjectStore,
) -> Result<MoveResponse, Error> {
    Ok(handle_move_event(event.payload, config, store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = HandlerConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config))
        .with_max_keys(config.max_keys);

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, &config, &store)
    }))
    .await
}
