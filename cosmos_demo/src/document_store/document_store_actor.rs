use anyhow::Context;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{instrument, Span};
use url::Url;
use uuid::Uuid;

use crate::{
    configuration::MasterKey,
    cosmos_command::{CosmosCommand, HEADER_CONTINUATION, HEADER_REQUEST_CHARGE},
    CosmosError, CosmosResponse, DocumentStoreError, DocumentStoreInitialConfiguration,
    DocumentStoreMessage,
};

pub struct DocumentStoreActor {
    endpoint: Url,
    master_key: MasterKey,
    receiver: mpsc::Receiver<DocumentStoreMessage>,
    /// Maintains an internal connection pool, reused for as long as the actor lives.
    reqwest_client: reqwest::Client,
}
impl DocumentStoreActor {
    pub fn new(
        receiver: mpsc::Receiver<DocumentStoreMessage>,
        initial_config: DocumentStoreInitialConfiguration,
    ) -> Result<Self, DocumentStoreError> {
        let reqwest_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(initial_config.request_timeout)
            .build()
            .context("Unable to build the http client")?;

        Ok(Self {
            endpoint: initial_config.endpoint,
            master_key: initial_config.master_key,
            receiver,
            reqwest_client,
        })
    }

    /// Message handler for the DocumentStoreActor
    #[instrument(
        level = "debug",
        name = "DocumentStore Actor - Handle Message",
        skip(self),
        fields(correlation_id)
    )]
    fn handle_message(&mut self, msg: DocumentStoreMessage) {
        // Apply a correlation id to all child spans of this message handler
        Span::current().record("correlation_id", Uuid::new_v4().to_string());
        match msg {
            DocumentStoreMessage::ExecuteCosmosCommand {
                command,
                respond_to,
            } => {
                let client = self.reqwest_client.clone();
                let master_key = self.master_key.clone();
                let command = CosmosCommand {
                    base_server_url: self.endpoint.clone(),
                    command,
                };

                // Spawn a task to do the request so a slow call doesn't hold up the mailbox
                tokio::spawn(async move {
                    let result = DocumentStoreActor::send_cosmos_command_request_to_server(
                        client, master_key, command,
                    )
                    .await;

                    // Send the result back to the caller
                    let _ = respond_to.send(result);
                });
            }
        }
    }

    #[instrument(
        level = "debug",
        skip(client, master_key, cosmos_command),
        fields(
            method = %cosmos_command.command.method(),
            resource = %cosmos_command.command.describe()
        )
    )]
    async fn send_cosmos_command_request_to_server(
        client: reqwest::Client,
        master_key: MasterKey,
        cosmos_command: CosmosCommand,
    ) -> Result<CosmosResponse, CosmosError> {
        let request = cosmos_command.get_http_request(&client, &master_key, Utc::now())?;
        tracing::trace!("Sending request to {}", request.url());

        let response = client
            .execute(request)
            .await
            .context("Unable to send command to server")?;

        let status = response.status();
        let request_charge = response
            .headers()
            .get(HEADER_REQUEST_CHARGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok());
        tracing::debug!(%status, request_charge, "Response received");

        if !status.is_success() {
            let err =
                CosmosError::from_response(response, &cosmos_command.command.describe()).await;
            if err.is_not_found() {
                tracing::debug!("{}", err);
            } else {
                tracing::warn!("{}", err);
            }
            return Err(err);
        }

        let continuation = response
            .headers()
            .get(HEADER_CONTINUATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .context("Unable to read response body")?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(
                serde_json::from_slice(&bytes)
                    .context("Unable to deserialize response body")?,
            )
        };

        Ok(CosmosResponse { continuation, body })
    }
}

#[instrument(level = "debug", name = "Running Document Store Actor", skip(actor))]
pub async fn run_document_store_actor(mut actor: DocumentStoreActor) {
    while let Some(msg) = actor.receiver.recv().await {
        actor.handle_message(msg);
    }
    tracing::debug!("All document store handles dropped, actor stopping.");
}
