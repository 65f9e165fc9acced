use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PersistError;
use crate::models::{ChatMessage, ChatSession, MessageRole, ModelDeployment};

/// MongoDB chat document (string ids, BSON dates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChat {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// MongoDB message document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    /// Position within the chat; breaks created_at ties
    pub position: i64,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub regenerated: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB model document, keyed by model name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoModel {
    #[serde(rename = "_id")]
    pub name: String,
    pub deployment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
}

fn parse_uuid(raw: &str) -> Result<Uuid, PersistError> {
    Uuid::parse_str(raw).map_err(|e| PersistError::Internal(format!("Invalid stored id {raw}: {e}")))
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<ChatSession> for MongoChat {
    fn from(chat: ChatSession) -> Self {
        Self {
            id: chat.id.to_string(),
            owner: chat.owner,
            title: chat.title,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

impl TryFrom<MongoChat> for ChatSession {
    type Error = PersistError;

    fn try_from(chat: MongoChat) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&chat.id)?,
            owner: chat.owner,
            title: chat.title,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        })
    }
}

impl MongoMessage {
    pub fn from_message(msg: ChatMessage, position: i64) -> Self {
        Self {
            id: msg.id.to_string(),
            chat_id: msg.chat_id.to_string(),
            position,
            role: msg.role,
            content: msg.content,
            regenerated: msg.regenerated,
            created_at: msg.created_at,
        }
    }
}

impl TryFrom<MongoMessage> for ChatMessage {
    type Error = PersistError;

    fn try_from(msg: MongoMessage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&msg.id)?,
            chat_id: parse_uuid(&msg.chat_id)?,
            role: msg.role,
            content: msg.content,
            regenerated: msg.regenerated,
            created_at: msg.created_at,
        })
    }
}

impl From<ModelDeployment> for MongoModel {
    fn from(model: ModelDeployment) -> Self {
        Self {
            name: model.name,
            deployment: model.deployment,
            description: model.description,
            active: model.active,
        }
    }
}

impl From<MongoModel> for ModelDeployment {
    fn from(model: MongoModel) -> Self {
        Self {
            name: model.name,
            deployment: model.deployment,
            description: model.description,
            active: model.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_document_roundtrip() {
        let chat = ChatSession::new("alice");
        let doc = bson::to_document(&MongoChat::from(chat.clone())).unwrap();
        assert_eq!(doc.get_str("_id").unwrap(), chat.id.to_string());
        assert!(doc.get_datetime("created_at").is_ok());

        let back: MongoChat = bson::from_document(doc).unwrap();
        let back = ChatSession::try_from(back).unwrap();
        assert_eq!(back.id, chat.id);
        assert_eq!(back.owner, "alice");
    }

    #[test]
    fn test_corrupt_id_is_rejected() {
        let doc = MongoMessage {
            id: "not-a-uuid".to_string(),
            chat_id: Uuid::new_v4().to_string(),
            position: 0,
            role: MessageRole::User,
            content: "hi".to_string(),
            regenerated: false,
            created_at: Utc::now(),
        };
        assert!(ChatMessage::try_from(doc).is_err());
    }
}
