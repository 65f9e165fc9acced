use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("BSON serialization error: {0}")]
    BsonSerialization(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for PersistError {
    fn from(e: mongodb::error::Error) -> Self {
        PersistError::Database(e.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<bson::ser::Error> for PersistError {
    fn from(e: bson::ser::Error) -> Self {
        PersistError::BsonSerialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
