//! OAuth2 authorization for installed applications
//!
//! The user is sent to the consent page in their browser, which then redirects to a listener this
//! program opens on the loopback interface. The authorization code it receives is exchanged for tokens.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

use crate::auth::{Credential, OAuthClient};
use crate::config::Scopes;
use crate::error::{Error, Result};
use crate::traits::AuthorizationFlow;

static SUCCESS_PAGE: &str = "The authentication flow has completed. You may close this window.";
static FAILURE_PAGE: &str = "The authentication flow has failed. You may close this window and check the logs.";


/// The OAuth client configuration, as downloaded from the Google Cloud console
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientConfig>,
    web: Option<ClientConfig>,
}

impl ClientConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(text)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| Error::Auth("client secrets contain neither an \"installed\" nor a \"web\" client".to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Err(err) => {
                return Err(Error::Auth(format!("unable to read client secrets {:?}: {}", path, err)));
            },
            Ok(text) => text,
        };
        Self::from_json(&text)
    }

    pub fn oauth_client(&self) -> OAuthClient {
        OAuthClient {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            token_uri: self.token_uri.clone(),
        }
    }

    /// The consent page the user has to visit
    pub fn authorization_url(&self, redirect_uri: &str, scopes: Scopes, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &scopes.to_scope_string())
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }
}


/// A successful answer of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|seconds| now + Duration::seconds(seconds))
    }
}

/// An error answer of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

async fn request_token(http: &reqwest::Client, token_uri: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
    let response = http
        .post(token_uri)
        .form(params)
        .send()
        .await?;

    if response.status().is_success() == false {
        let status = response.status();
        let text = response.text().await?;
        let details = match serde_json::from_str::<TokenError>(&text) {
            Ok(TokenError{ error, error_description: Some(descr) }) => format!("{}: {}", error, descr),
            Ok(TokenError{ error, error_description: None }) => error,
            Err(_) => text,
        };
        return Err(Error::Auth(format!("token endpoint answered HTTP {}: {}", status.as_u16(), details)));
    }

    Ok(response.json().await?)
}


/// What the browser brought back to the loopback listener
#[derive(Debug, PartialEq)]
enum Callback {
    Code(String),
    Denied(String),
    /// Unrelated request, e.g. a favicon
    Ignored,
}

/// Interpret the query parameters of a callback, e.g. `?code=xyz&state=abc`
fn parse_callback(params: &HashMap<String, String>, expected_state: &str) -> Result<Callback> {
    if let Some(error) = params.get("error") {
        return Ok(Callback::Denied(error.clone()));
    }
    match params.get("code") {
        None => Ok(Callback::Ignored),
        Some(code) => {
            if params.get("state").map(String::as_str) != Some(expected_state) {
                return Err(Error::Auth("state mismatch in the authorization callback".to_string()));
            }
            Ok(Callback::Code(code.clone()))
        },
    }
}

/// Shared by the connections of the loopback listener. The first meaningful callback wins
#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    outcome: Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>,
}

impl CallbackState {
    fn deliver(&self, outcome: Result<String>) {
        match self.outcome.lock().unwrap().take() {
            Some(sender) => {
                // The receiver is only gone once the flow has been abandoned
                let _ = sender.send(outcome);
            },
            None => log::debug!("The authorization callback has already been handled"),
        }
    }
}

async fn authorization_callback(
    State(shared): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    match parse_callback(&params, &shared.expected_state) {
        Ok(Callback::Ignored) => {
            log::debug!("Ignoring a callback without an authorization code");
            (StatusCode::NOT_FOUND, "")
        },
        Ok(Callback::Code(code)) => {
            shared.deliver(Ok(code));
            (StatusCode::OK, SUCCESS_PAGE)
        },
        Ok(Callback::Denied(error)) => {
            shared.deliver(Err(Error::Auth(format!("authorization denied: {}", error))));
            (StatusCode::BAD_REQUEST, FAILURE_PAGE)
        },
        Err(err) => {
            shared.deliver(Err(err));
            (StatusCode::BAD_REQUEST, FAILURE_PAGE)
        },
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Serve `listener` until a request brings an authorization code (or a denial).
///
/// Every connection is handled on its own, so that idle or malformed ones (e.g. browser preconnections)
/// do not prevent the actual callback from being received.
pub async fn wait_for_authorization_code(listener: TcpListener, expected_state: &str) -> Result<String> {
    let (sender, receiver) = oneshot::channel();
    let shared = CallbackState {
        expected_state: Arc::from(expected_state),
        outcome: Arc::new(Mutex::new(Some(sender))),
    };
    let app = Router::new()
        .route("/", get(authorization_callback))
        .fallback(not_found)
        .with_state(shared);

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            log::error!("The authorization callback listener failed: {}", err);
        }
    });

    let outcome = receiver.await;
    // Connections that are being answered live in their own tasks, and are not interrupted
    server.abort();

    match outcome {
        Ok(outcome) => outcome,
        Err(_) => Err(Error::Auth("the authorization callback listener stopped unexpectedly".to_string())),
    }
}

fn open_in_browser(url: &Url) {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    if let Err(err) = std::process::Command::new(program).arg(url.as_str()).spawn() {
        log::warn!("Unable to open a browser ({}). Please open the URL manually", err);
    }
}


fn print_consent_url(url: &Url) {
    println!("Please visit this URL to authorize this application: {}", url);
}

/// What to do with the consent URL
type ConsentHandler = Box<dyn Fn(&Url) + Send + Sync>;

/// Authorizes this program as an "installed application"
pub struct InstalledAppFlow {
    client_secrets_file: PathBuf,
    scopes: Scopes,
    consent_handler: ConsentHandler,
    http: reqwest::Client,
}

impl InstalledAppFlow {
    pub fn new(client_secrets_file: &Path, scopes: Scopes) -> Self {
        Self {
            client_secrets_file: PathBuf::from(client_secrets_file),
            scopes,
            consent_handler: Box::new(|url: &Url| {
                print_consent_url(url);
                open_in_browser(url);
            }),
            http: reqwest::Client::new(),
        }
    }

    /// Only print the consent URL, do not try to launch a browser
    pub fn without_browser(self) -> Self {
        self.with_consent_handler(print_consent_url)
    }

    /// Hand the consent URL to `handler` instead of showing it to the user
    pub fn with_consent_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Url) + Send + Sync + 'static,
    {
        self.consent_handler = Box::new(handler);
        self
    }

    /// Exchange an authorization code for a credential.
    ///
    /// `redirect_uri` must be the one the consent URL was built with
    pub async fn exchange_code(&self, client_config: &ClientConfig, code: &str, redirect_uri: &str) -> Result<Credential> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_config.client_id.as_str()),
            ("client_secret", client_config.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];
        let token = request_token(&self.http, &client_config.token_uri, &params).await?;
        Ok(self.credential_from(token, client_config.oauth_client(), Utc::now()))
    }

    fn credential_from(&self, token: TokenResponse, client: OAuthClient, now: DateTime<Utc>) -> Credential {
        let expiry = token.expiry(now);
        let scopes = match &token.scope {
            Some(scope) => scope.split_whitespace().map(String::from).collect(),
            None => self.scopes.urls().into_iter().map(String::from).collect(),
        };
        Credential::new(token.access_token, token.refresh_token, expiry, scopes, client)
    }
}

#[async_trait]
impl AuthorizationFlow for InstalledAppFlow {
    async fn authorize(&self) -> Result<Credential> {
        let client_config = ClientConfig::from_file(&self.client_secrets_file)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
        let state = Uuid::new_v4().to_hyphenated().to_string();
        let url = client_config.authorization_url(&redirect_uri, self.scopes, &state)?;

        (self.consent_handler)(&url);

        let code = wait_for_authorization_code(listener, &state).await?;
        log::info!("Received an authorization code, exchanging it for tokens");
        self.exchange_code(&client_config, &code, &redirect_uri).await
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential.refresh_token()
            .ok_or_else(|| Error::Auth("the credential has no refresh token".to_string()))?;
        let client = credential.client();

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
        ];
        let token = request_token(&self.http, &client.token_uri, &params).await?;
        log::info!("Access token refreshed");
        Ok(credential.refreshed(token.access_token.clone(), token.expiry(Utc::now()), token.refresh_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CLIENT_SECRETS: &str = r#"{
        "installed": {
            "client_id": "1234.apps.googleusercontent.com",
            "project_id": "my-project",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "s3cr3t",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    #[test]
    fn parse_client_secrets() {
        let config = ClientConfig::from_json(CLIENT_SECRETS).unwrap();
        assert_eq!(config.client_id, "1234.apps.googleusercontent.com");
        assert_eq!(config.client_secret, "s3cr3t");
        assert_eq!(config.token_uri, "https://oauth2.googleapis.com/token");

        let web = CLIENT_SECRETS.replace("installed", "web");
        assert_eq!(ClientConfig::from_json(&web).unwrap(), config);

        assert!(matches!(ClientConfig::from_json("{}"), Err(Error::Auth(_))));
        assert!(matches!(ClientConfig::from_json("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn missing_client_secrets() {
        let folder = tempfile::tempdir().unwrap();
        let result = ClientConfig::from_file(&folder.path().join("credentials.json"));
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn consent_url() {
        let config = ClientConfig::from_json(CLIENT_SECRETS).unwrap();
        let url = config.authorization_url("http://127.0.0.1:8080/", Scopes::COURSES_READONLY, "the-state").unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "1234.apps.googleusercontent.com");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(params["scope"], "https://www.googleapis.com/auth/classroom.courses.readonly");
        assert_eq!(params["state"], "the-state");
        assert_eq!(params["access_type"], "offline");
    }

    fn params(query: &str) -> HashMap<String, String> {
        url::form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    #[test]
    fn callback_parsing() {
        assert_eq!(parse_callback(&params("state=abc&code=4%2Fxyz&scope=a+b"), "abc").unwrap(),
                   Callback::Code("4/xyz".to_string()));
        assert_eq!(parse_callback(&params("error=access_denied&state=abc"), "abc").unwrap(),
                   Callback::Denied("access_denied".to_string()));
        assert_eq!(parse_callback(&params(""), "abc").unwrap(), Callback::Ignored);
        assert!(parse_callback(&params("state=other&code=xyz"), "abc").is_err());
        assert!(parse_callback(&params("code=xyz"), "abc").is_err());
    }

    async fn bind_loopback() -> (TcpListener, String) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let base = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
        (listener, base)
    }

    #[tokio::test]
    async fn loopback_listener() {
        let (listener, base) = bind_loopback().await;

        let browser = tokio::spawn(async move {
            let http = reqwest::Client::new();
            let favicon = http.get(format!("{}/favicon.ico", base)).send().await.unwrap();
            assert_eq!(favicon.status().as_u16(), 404);

            let callback = http.get(format!("{}/?code=the-code&state=the-state", base)).send().await.unwrap();
            assert_eq!(callback.status().as_u16(), 200);
            assert_eq!(callback.text().await.unwrap(), SUCCESS_PAGE);
        });

        let code = wait_for_authorization_code(listener, "the-state").await.unwrap();
        assert_eq!(code, "the-code");
        browser.await.unwrap();
    }

    #[tokio::test]
    async fn loopback_listener_denied() {
        let (listener, base) = bind_loopback().await;

        let browser = tokio::spawn(async move {
            let response = reqwest::get(format!("{}/?error=access_denied", base)).await.unwrap();
            assert_eq!(response.status().as_u16(), 400);
        });

        let result = wait_for_authorization_code(listener, "the-state").await;
        assert!(matches!(result, Err(Error::Auth(_))));
        browser.await.unwrap();
    }

    #[tokio::test]
    async fn idle_connection_does_not_hold_the_callback() {
        let (listener, base) = bind_loopback().await;
        let address = listener.local_addr().unwrap();

        let browser = tokio::spawn(async move {
            // Browsers open speculative connections they may never send anything on
            let idle = tokio::net::TcpStream::connect(address).await.unwrap();

            let callback = reqwest::get(format!("{}/?code=the-code&state=the-state", base)).await.unwrap();
            assert_eq!(callback.status().as_u16(), 200);
            drop(idle);
        });

        let code = tokio::time::timeout(std::time::Duration::from_secs(5), wait_for_authorization_code(listener, "the-state"))
            .await
            .expect("the callback has not been received")
            .unwrap();
        assert_eq!(code, "the-code");
        browser.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_connection_is_ignored() {
        use tokio::io::AsyncWriteExt;

        let (listener, base) = bind_loopback().await;
        let address = listener.local_addr().unwrap();

        let browser = tokio::spawn(async move {
            // e.g. a TLS client hello sent to the plain HTTP port
            let mut garbage = tokio::net::TcpStream::connect(address).await.unwrap();
            garbage.write_all(b"\x16\x03\x01\x02\x00\x01\x00\x01\xfc\xff\xfe\r\n\r\n").await.unwrap();

            let callback = reqwest::get(format!("{}/?code=the-code&state=the-state", base)).await.unwrap();
            assert_eq!(callback.status().as_u16(), 200);
        });

        let code = tokio::time::timeout(std::time::Duration::from_secs(5), wait_for_authorization_code(listener, "the-state"))
            .await
            .expect("the callback has not been received")
            .unwrap();
        assert_eq!(code, "the-code");
        browser.await.unwrap();
    }
}
