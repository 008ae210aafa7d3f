use cosmos_demo::{
    configuration::Settings,
    menu::{run_menu, MenuError, MenuIo, TermMenuIo},
    repositories::{
        ApiRequestRepository, ApplicationRepository, API_REQUEST_COLLECTION,
        APPLICATION_COLLECTION,
    },
    DocumentStoreBuilder,
};
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing()?;
    let settings = Settings::load()?;

    let mut io = TermMenuIo::stdout();
    io.write_line("Beginning operations...\n")?;

    io.write("Initialising repositories...")?;
    // One store actor per account, shared by both repositories.
    let store = DocumentStoreBuilder::from_settings(&settings).build()?;
    let applications = ApplicationRepository::from_store(
        store.clone(),
        &settings.database_name,
        APPLICATION_COLLECTION,
    );
    let api_requests =
        ApiRequestRepository::from_store(store, &settings.database_name, API_REQUEST_COLLECTION);
    io.write_line("Done.")?;

    let result: Result<(), MenuError> = async {
        io.write("Initialising dbs, containers...")?;
        applications.initialise().await?;
        api_requests.initialise().await?;
        io.write_line("Done.")?;

        run_menu(&mut io, &applications).await
    }
    .await;

    if let Err(e) = result {
        tracing::error!(error = ?e, "Demo stopped");
        match e.service_fault() {
            Some((status, message)) => {
                io.write_line(&format!("{} error occurred: {}", status, message))?
            }
            None => io.write_line(&format!("Error: {}", e))?,
        }
        io.write_line("End of demo, press any key to exit.")?;
        // Any key, including none at all when stdin is closed.
        let _ = io.read_key();
    }

    applications.dispose();
    api_requests.dispose();
    Ok(())
}

fn setup_tracing() -> anyhow::Result<()> {
    // Redirect all `log`'s events to the subscriber
    LogTracer::init()?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = Registry::default().with(env_filter);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        let formatting_layer =
            BunyanFormattingLayer::new("cosmos-demo".into(), std::io::stderr);
        set_global_default(registry.with(JsonStorageLayer).with(formatting_layer))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        set_global_default(registry.with(fmt_layer))?;
    }
    Ok(())
}
