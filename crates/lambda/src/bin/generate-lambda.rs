use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

use ecom_core::config::{load_dotenv, Config};
use ecom_lambda::{handle_generate, init_tracing};
use ecom_storage::{ObjectStoreAccessor, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), Error> {
    load_dotenv();
    init_tracing();

    let config = Config::from_env()?;
    config.log_summary();
    let storage = ObjectStoreAccessor::new(&StorageBackend::from_config(&config)?);
    let (config, storage) = (&config, &storage);

    run(service_fn(|_event: LambdaEvent<Value>| async move {
        let response =
            handle_generate(&config.generator, storage, Utc::now().naive_utc()).await?;
        Ok::<_, Error>(response)
    }))
    .await
}
