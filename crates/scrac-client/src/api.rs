//! Signal CLI REST API client
//!
//! Communicates with signal-cli-rest-api server

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{Result, SignalError};
use crate::types::*;

/// HTTP Basic Auth credentials
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

/// Signal CLI REST API client
#[derive(Clone)]
pub struct SignalApiClient {
    client: Client,
    base_url: String,
    phone_number: String,
    auth: Option<BasicAuth>,
}

impl SignalApiClient {
    /// Create a new Signal API client
    ///
    /// `verify_ssl = false` accepts self-signed certificates.
    pub fn new(
        base_url: &str,
        phone_number: &str,
        auth: Option<BasicAuth>,
        verify_ssl: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(SignalError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            phone_number: phone_number.to_string(),
            auth,
        })
    }

    /// Attach basic auth credentials, when configured
    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(auth) => request.basic_auth(&auth.user, Some(&auth.password)),
            None => request,
        }
    }

    /// Decode the response body, mapping non-2xx statuses to `ApiError`
    async fn decode<T: serde::de::DeserializeOwned>(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("{} failed: {} - {}", operation, status, error_text);
            return Err(SignalError::ApiError(format!("{}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| SignalError::ParseError(e.to_string()))
    }

    /// Check the response status, discarding any body
    async fn check(operation: &str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("{} failed: {} - {}", operation, status, error_text);
            return Err(SignalError::ApiError(format!("{}: {}", status, error_text)));
        }

        Ok(())
    }

    /// Get server information
    pub async fn about(&self) -> Result<AboutInfo> {
        let url = format!("{}/v1/about", self.base_url);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        Self::decode("about", response).await
    }

    /// Get account information
    pub async fn account_info(&self) -> Result<AccountInfo> {
        let url = format!("{}/v1/accounts/{}", self.base_url, self.phone_number);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        Self::decode("account_info", response).await
    }

    /// Receive pending messages
    ///
    /// Envelopes are passed through undecoded; callers print them verbatim.
    pub async fn receive(&self) -> Result<Vec<Value>> {
        let url = format!("{}/v1/receive/{}", self.base_url, self.phone_number);

        debug!("Receiving messages for {}", self.phone_number);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        let messages: Vec<Value> = Self::decode("receive", response).await?;
        debug!("Received {} messages", messages.len());
        Ok(messages)
    }

    /// Send a text message
    ///
    /// Without an explicit recipient the message goes to the sending
    /// account itself (note to self).
    pub async fn send(&self, message: &str, recipient: Option<&str>) -> Result<SendResponse> {
        let url = format!("{}/v2/send", self.base_url);
        let recipient = recipient.unwrap_or(&self.phone_number);

        let body = SendRequest {
            number: self.phone_number.clone(),
            recipients: vec![recipient.to_string()],
            message: message.to_string(),
        };

        debug!("Sending message to {}", recipient);

        let response = self
            .with_auth(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        let send_response: SendResponse = Self::decode("send", response).await?;
        info!("Message sent to {} at timestamp {}", recipient, send_response.timestamp);
        Ok(send_response)
    }

    /// Send a reaction to a message
    pub async fn send_reaction(
        &self,
        recipient: &str,
        target_timestamp: u64,
        emoji: &str,
    ) -> Result<()> {
        let url = format!("{}/v1/reactions/{}", self.base_url, self.phone_number);

        let body = ReactionRequest {
            recipient: recipient.to_string(),
            timestamp: target_timestamp,
            emoji: emoji.to_string(),
        };

        let response = self
            .with_auth(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        Self::check("send_reaction", response).await
    }

    /// Get list of groups
    pub async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        let url = format!("{}/v1/groups/{}", self.base_url, self.phone_number);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        Self::decode("list_groups", response).await
    }

    /// Create a group with an initial member
    pub async fn create_group(&self, name: &str, member: &str) -> Result<CreateGroupResponse> {
        let url = format!("{}/v1/groups/{}", self.base_url, self.phone_number);

        let body = CreateGroupRequest {
            name: name.to_string(),
            members: vec![member.to_string()],
        };

        debug!("Creating group {}", name);

        let response = self
            .with_auth(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        let created: CreateGroupResponse = Self::decode("create_group", response).await?;
        info!("Created group {} with id {}", name, created.id);
        Ok(created)
    }

    /// Update the profile name and optional avatar
    pub async fn update_profile(&self, name: &str, base64_avatar: Option<&str>) -> Result<()> {
        let url = format!("{}/v1/profiles/{}", self.base_url, self.phone_number);

        let body = UpdateProfileRequest {
            name: name.to_string(),
            base64_avatar: base64_avatar.map(str::to_string),
        };

        let response = self
            .with_auth(self.client.put(&url).json(&body))
            .send()
            .await
            .map_err(SignalError::HttpError)?;

        Self::check("update_profile", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SignalApiClient {
        SignalApiClient::new(&server.uri(), "+15550001", None, true).unwrap()
    }

    #[test]
    fn test_api_client_creation() {
        let client = SignalApiClient::new("http://localhost:8080/", "+1234567890", None, true);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_about() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/about"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "build": 2,
                "mode": "normal",
                "version": "0.70",
                "versions": ["v1", "v2"]
            })))
            .mount(&server)
            .await;

        let about = client_for(&server).about().await.unwrap();
        assert_eq!(about.mode.as_deref(), Some("normal"));
        assert_eq!(about.versions, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_send_defaults_to_own_number() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(body_json(serde_json::json!({
                "number": "+15550001",
                "recipients": ["+15550001"],
                "message": "hello"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"timestamp": 1700000000000u64})),
            )
            .mount(&server)
            .await;

        let response = client_for(&server).send("hello", None).await.unwrap();
        assert_eq!(response.timestamp, 1700000000000);
    }

    #[tokio::test]
    async fn test_send_with_recipient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(body_json(serde_json::json!({
                "number": "+15550001",
                "recipients": ["+15550002"],
                "message": "hi"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"timestamp": 42u64})),
            )
            .mount(&server)
            .await;

        let response = client_for(&server).send("hi", Some("+15550002")).await.unwrap();
        assert_eq!(response.timestamp, 42);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/receive/+15550001"))
            .respond_with(ResponseTemplate::new(400).set_body_string("account not registered"))
            .mount(&server)
            .await;

        let err = client_for(&server).receive().await.unwrap_err();
        match err {
            SignalError::ApiError(msg) => assert!(msg.contains("account not registered")),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_basic_auth_header_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/about"))
            // base64("user:secret")
            .and(header("authorization", "Basic dXNlcjpzZWNyZXQ="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "build": 1, "mode": "normal", "version": "0.70", "versions": []
            })))
            .mount(&server)
            .await;

        let auth = BasicAuth {
            user: "user".to_string(),
            password: "secret".to_string(),
        };
        let client = SignalApiClient::new(&server.uri(), "+15550001", Some(auth), true).unwrap();
        assert!(client.about().await.is_ok());
    }

    #[tokio::test]
    async fn test_receive_passes_envelopes_through() {
        let server = MockServer::start().await;
        let envelopes = serde_json::json!([
            {"envelope": {"source": "+15550002", "dataMessage": {"message": "hey"}}}
        ]);
        Mock::given(method("GET"))
            .and(path("/v1/receive/+15550001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelopes.clone()))
            .mount(&server)
            .await;

        let messages = client_for(&server).receive().await.unwrap();
        assert_eq!(serde_json::Value::Array(messages), envelopes);
    }
}
