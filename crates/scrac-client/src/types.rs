//! Signal CLI REST API request and response types

use serde::{Deserialize, Serialize};

/// Server information returned by `/v1/about`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutInfo {
    /// Build number
    pub build: Option<u64>,
    /// Server mode (normal, native, json-rpc)
    pub mode: Option<String>,
    /// signal-cli version
    pub version: Option<String>,
    /// Supported API versions
    #[serde(default)]
    pub versions: Vec<String>,
}

/// Account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Phone number
    pub number: String,
    /// Whether the account is registered
    #[serde(default)]
    pub registered: bool,
    /// Safety number, if approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_number: Option<String>,
}

/// Request body for `/v2/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    /// Sending account phone number
    pub number: String,
    /// Recipient phone numbers or group IDs
    pub recipients: Vec<String>,
    /// Message content
    pub message: String,
}

/// Response for a sent message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    /// Timestamp of the sent message
    pub timestamp: u64,
}

/// Request body for `/v1/reactions/{number}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRequest {
    /// Recipient phone number
    pub recipient: String,
    /// Timestamp of the message being reacted to
    pub timestamp: u64,
    /// Reaction emoji
    pub emoji: String,
}

/// Group information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Group ID (base64 encoded)
    pub id: String,
    /// Group name
    pub name: String,
    /// Group members
    #[serde(default)]
    pub members: Vec<String>,
}

/// Request body for creating a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name
    pub name: String,
    /// Initial members
    pub members: Vec<String>,
}

/// Response for a created group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupResponse {
    /// ID of the new group
    pub id: String,
}

/// Request body for `/v1/profiles/{number}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// Profile display name
    pub name: String,
    /// Base64 encoded avatar image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_avatar: Option<String>,
}
