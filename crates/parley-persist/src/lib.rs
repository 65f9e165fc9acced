pub mod models;
pub mod trait_client;
pub mod dbs;
pub mod error;

pub use models::{ChatMessage, ChatSession, MessageRole, ModelDeployment};
pub use trait_client::PersistenceClient;
pub use dbs::memory::InMemoryPersistenceClient;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
pub use error::PersistError;
