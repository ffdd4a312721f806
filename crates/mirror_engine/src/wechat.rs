use std::fmt;
use std::path::Path;
use std::time::Duration;

use mirror_logging::mirror_debug;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::api::{AccessToken, DraftApi, DraftArticle, DraftReceipt, PermanentAsset, PublishError};

pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"..")
            .finish()
    }
}

/// [`DraftApi`] over the official account HTTP API.
#[derive(Debug, Clone)]
pub struct WeChatClient {
    client: reqwest::Client,
    credentials: AppCredentials,
    settings: ApiSettings,
}

impl WeChatClient {
    pub fn new(credentials: AppCredentials, settings: ApiSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            credentials,
            settings,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn post_file(
        &self,
        endpoint: &str,
        extra_query: &[(&str, &str)],
        token: &AccessToken,
        file: &Path,
    ) -> Result<Value, PublishError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|err| PublishError::upload(file, err.to_string()))?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|err| PublishError::upload(file, err.to_string()))?;

        mirror_debug!("Uploading {:?} to {}", file, endpoint);
        let response = self
            .client
            .post(self.endpoint(endpoint))
            .query(&[("access_token", token.secret())])
            .query(extra_query)
            .multipart(Form::new().part("media", part))
            .timeout(self.settings.upload_timeout)
            .send()
            .await
            .map_err(|err| PublishError::upload(file, err.to_string()))?;

        read_json(response)
            .await
            .map_err(|raw| PublishError::upload(file, raw))
    }
}

#[async_trait::async_trait]
impl DraftApi for WeChatClient {
    async fn access_token(&self) -> Result<AccessToken, PublishError> {
        let response = self
            .client
            .get(self.endpoint("/cgi-bin/token"))
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.credentials.app_id.as_str()),
                ("secret", self.credentials.app_secret.as_str()),
            ])
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(|err| PublishError::Credential {
                response: err.to_string(),
            })?;

        let body = read_json(response)
            .await
            .map_err(|raw| PublishError::Credential { response: raw })?;
        match body.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(PublishError::Credential {
                response: body.to_string(),
            }),
        }
    }

    async fn upload_permanent_image(
        &self,
        token: &AccessToken,
        path: &Path,
    ) -> Result<PermanentAsset, PublishError> {
        let body = self
            .post_file("/cgi-bin/material/add_material", &[("type", "image")], token, path)
            .await?;
        let media_id = non_empty_str(&body, "media_id")
            .ok_or_else(|| PublishError::upload(path, body.to_string()))?;
        Ok(PermanentAsset {
            media_id: media_id.to_string(),
            url: non_empty_str(&body, "url").map(str::to_string),
        })
    }

    async fn upload_inline_image(
        &self,
        token: &AccessToken,
        path: &Path,
    ) -> Result<String, PublishError> {
        let body = self
            .post_file("/cgi-bin/media/uploadimg", &[], token, path)
            .await?;
        non_empty_str(&body, "url")
            .map(str::to_string)
            .ok_or_else(|| PublishError::upload(path, body.to_string()))
    }

    async fn create_draft(
        &self,
        token: &AccessToken,
        article: &DraftArticle,
    ) -> Result<DraftReceipt, PublishError> {
        let payload = json!({ "articles": [article] });
        let response = self
            .client
            .post(self.endpoint("/cgi-bin/draft/add"))
            .query(&[("access_token", token.secret())])
            .json(&payload)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(|err| PublishError::RemoteApi {
                response: err.to_string(),
            })?;

        let body = read_json(response)
            .await
            .map_err(|raw| PublishError::RemoteApi { response: raw })?;
        let errcode = body.get("errcode").and_then(Value::as_i64).unwrap_or(0);
        match non_empty_str(&body, "media_id") {
            Some(media_id) if errcode == 0 => Ok(DraftReceipt {
                media_id: media_id.to_string(),
                raw: body.clone(),
            }),
            _ => Err(PublishError::RemoteApi {
                response: body.to_string(),
            }),
        }
    }
}

/// Parses the body as JSON; on failure returns the raw text for diagnostics.
async fn read_json(response: reqwest::Response) -> Result<Value, String> {
    let status = response.status();
    let text = response.text().await.map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|_| format!("http {status}: {text}"))
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
