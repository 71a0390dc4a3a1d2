//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint. When routes or the upload
//! form change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

/// Default file name clients give the uploaded database
pub const UPLOAD_FILE_NAME: &str = "default.realm";

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn file_part(bytes: Vec<u8>, file_name: &str) -> Part {
        Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .expect("Invalid mime type")
    }

    // ========================================================================
    // Service Endpoints
    // ========================================================================

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// GET /
    pub async fn stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Stats request failed")
    }

    // ========================================================================
    // Upload Endpoint
    // ========================================================================

    /// POST /upload with the database in the `database` part
    pub async fn upload_database(&self, bytes: Vec<u8>) -> Response {
        self.upload_as("database", UPLOAD_FILE_NAME, bytes).await
    }

    /// POST /upload with the database in an arbitrarily named file part
    pub async fn upload_as(&self, field_name: &str, file_name: &str, bytes: Vec<u8>) -> Response {
        let form = Form::new().part(field_name.to_string(), Self::file_part(bytes, file_name));
        self.send_form(form).await
    }

    /// POST /upload with a form that only has a text field
    pub async fn upload_without_file(&self) -> Response {
        let form = Form::new().text("comment", "no database attached");
        self.send_form(form).await
    }

    /// POST /upload with a JSON body instead of a multipart form
    pub async fn upload_json(&self) -> Response {
        self.client
            .post(format!("{}/upload", self.base_url))
            .json(&serde_json::json!({ "database": "not a file" }))
            .send()
            .await
            .expect("Upload request failed")
    }

    async fn send_form(&self, form: Form) -> Response {
        self.client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }
}
