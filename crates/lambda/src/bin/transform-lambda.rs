use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

use ecom_core::config::{load_dotenv, Config};
use ecom_lambda::{handle_s3_event, init_tracing, s3_accessor};

#[tokio::main]
async fn main() -> Result<(), Error> {
    load_dotenv();
    init_tracing();

    let config = Config::from_env()?;
    config.log_summary();
    let aws = &config.aws;

    run(service_fn(|event: LambdaEvent<S3Event>| async move {
        let response = handle_s3_event(&event.payload, |bucket| s3_accessor(aws, bucket)).await?;
        Ok::<_, Error>(response)
    }))
    .await
}
