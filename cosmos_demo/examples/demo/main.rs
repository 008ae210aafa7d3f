//! Walks through every repository operation against an in-memory container.
//!
//! Run with `cargo run --example demo`. Set `RUST_LOG=debug` to see the spans.

use cosmos_demo::{
    models::{ApiKey, ApiRequest, Application},
    repositories::{
        ApiRequestRepository, ApplicationRepository, API_REQUEST_COLLECTION,
        APPLICATION_COLLECTION,
    },
};
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing()?;

    let applications = ApplicationRepository::in_memory(APPLICATION_COLLECTION);
    let api_requests = ApiRequestRepository::in_memory(API_REQUEST_COLLECTION);
    applications.initialise().await?;
    api_requests.initialise().await?;

    let app = applications
        .create_application(Application::new("user1", "app1", "Demo application"))
        .await?;
    println!("Created:\n{}\n", app);

    let app = applications
        .create_api_key("app1", ApiKey::generate("primary"))
        .await?;
    let value = app.api_keys[0].value.clone();
    println!("With a key:\n{}\n", app);

    let app = applications.regenerate_api_key("app1", &value).await?;
    let value = app.api_keys[0].value.clone();
    println!("Regenerated:\n{}\n", app);

    let app = applications
        .update_api_key_label("app1", &value, "renamed")
        .await?;
    println!("Relabelled:\n{}\n", app);

    applications.retire_api_key("app1", &value).await?;
    for app in applications.get_all_applications_by_user("user1").await? {
        println!("After retiring:\n{}\n", app);
    }

    let request = ApiRequest::new("request-1", "app1").with_property("path", "/v1/things");
    let first = api_requests.create_api_request(request.clone()).await?;
    let second = api_requests.create_api_request(request).await?;
    println!("Api request stored once: {}", first == second);

    applications.dispose();
    api_requests.dispose();
    Ok(())
}

fn setup_tracing() -> anyhow::Result<()> {
    LogTracer::init()?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    set_global_default(subscriber)?;
    Ok(())
}
