// File: wiper/src/panel/client.rs
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{
    Envelope, FileListing, PowerSignal, ResourceAttributes, ServerMetadata, ServerState,
};
use crate::constants::panel::ACCEPT_HEADER;
use crate::errors::RemoteCallError;

pub struct PanelClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PanelClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        // No client-wide timeout: the panel answers quickly or the poll fails
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn server_url(&self, server_id: &str, path: &str) -> String {
        format!("{}/servers/{}{}", self.base_url, server_id, path)
    }

    // Headers go on before any JSON body so reqwest keeps our Content-Type
    fn request(&self, method: Method, server_id: &str, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.server_url(server_id, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", ACCEPT_HEADER)
            .header("Content-Type", "application/json")
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, RemoteCallError> {
        debug!("Panel request: {}", operation);

        let response = request
            .send()
            .await
            .map_err(|e| RemoteCallError::transport(operation, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteCallError::status(operation, status, body));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T, RemoteCallError> {
        let response = self.send(operation, request).await?;
        response.json::<T>().await
            .map_err(|e| RemoteCallError::invalid_response(operation, e))
    }

    pub async fn get_metadata(&self, server_id: &str) -> Result<ServerMetadata, RemoteCallError> {
        let operation = format!("GET /servers/{}", server_id);
        let envelope: Envelope<ServerMetadata> = self
            .send_json(&operation, self.request(Method::GET, server_id, ""))
            .await?;
        Ok(envelope.attributes)
    }

    pub async fn set_power(&self, server_id: &str, signal: PowerSignal) -> Result<(), RemoteCallError> {
        let operation = format!("POST /servers/{}/power ({})", server_id, signal);
        let request = self
            .request(Method::POST, server_id, "/power")
            .json(&json!({ "signal": signal }));
        self.send(&operation, request).await?;
        Ok(())
    }

    pub async fn get_resource_state(&self, server_id: &str) -> Result<ServerState, RemoteCallError> {
        let operation = format!("GET /servers/{}/resources", server_id);
        let envelope: Envelope<ResourceAttributes> = self
            .send_json(&operation, self.request(Method::GET, server_id, "/resources"))
            .await?;
        Ok(ServerState::parse(&envelope.attributes.current_state))
    }

    pub async fn list_files(&self, server_id: &str, directory: &str) -> Result<Vec<String>, RemoteCallError> {
        let operation = format!("GET /servers/{}/files/list ({})", server_id, directory);
        let request = self
            .request(Method::GET, server_id, "/files/list")
            .query(&[("directory", directory)]);
        let listing: FileListing = self.send_json(&operation, request).await?;
        Ok(listing.data.into_iter().map(|entry| entry.attributes.name).collect())
    }

    pub async fn delete_files(&self, server_id: &str, root: &str, files: &[String]) -> Result<(), RemoteCallError> {
        let operation = format!("POST /servers/{}/files/delete", server_id);
        let request = self
            .request(Method::POST, server_id, "/files/delete")
            .json(&json!({ "root": root, "files": files }));
        self.send(&operation, request).await?;
        Ok(())
    }

    pub async fn set_startup_variable(&self, server_id: &str, key: &str, value: &str) -> Result<(), RemoteCallError> {
        let operation = format!("PUT /servers/{}/startup/variable ({})", server_id, key);
        let request = self
            .request(Method::PUT, server_id, "/startup/variable")
            .json(&json!({ "key": key, "value": value }));
        self.send(&operation, request).await?;
        Ok(())
    }

    pub async fn send_command(&self, server_id: &str, command: &str) -> Result<(), RemoteCallError> {
        let operation = format!("POST /servers/{}/command", server_id);
        let request = self
            .request(Method::POST, server_id, "/command")
            .json(&json!({ "command": command }));
        self.send(&operation, request).await?;
        Ok(())
    }

    /// Broadcast `text` to players through the server console
    pub async fn send_message(&self, server_id: &str, text: &str) -> Result<(), RemoteCallError> {
        self.send_command(server_id, &format!("say {}", text)).await
    }
}
