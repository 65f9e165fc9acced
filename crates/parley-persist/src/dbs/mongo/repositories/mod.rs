pub mod chat;
pub mod message;
pub mod model;

pub use chat::MongoChatRepository;
pub use message::MongoMessageRepository;
pub use model::MongoModelRepository;
