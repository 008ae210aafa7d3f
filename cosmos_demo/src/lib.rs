/*!
cosmos_demo is a small data-access library and console front end for two
collections, `Application` and `ApiRequest`, stored in an Azure Cosmos DB
(SQL API) account.

The library talks to the service through its REST API. A single [`DocumentStore`]
actor owns the HTTP client and the account key; cloning the handle is cheap and
every clone talks to the same actor. When the last handle is dropped the actor
stops.

Repositories sit on top of a [`DocumentContainer`](container::DocumentContainer),
which is implemented both by the HTTP-backed
[`CosmosContainer`](container::CosmosContainer) and by
[`InMemoryContainer`](container::InMemoryContainer).

# Example
```rust
# tokio_test::block_on(async {
use cosmos_demo::models::Application;
use cosmos_demo::repositories::ApplicationRepository;

let repository = ApplicationRepository::in_memory("Application");
repository.initialise().await.unwrap();

let app = Application::new("user1", "app1", "My application");
let created = repository.create_application(app).await.unwrap();
assert_eq!(created.id, "app1.1");

repository.dispose();
# })
```
*/

mod authorization;
mod cosmos_error;
mod document_store;

pub mod configuration;
pub mod container;
pub mod cosmos_command;
pub mod menu;
pub mod models;
pub mod repositories;

pub use authorization::*;
pub use cosmos_error::*;
pub use document_store::*;

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
