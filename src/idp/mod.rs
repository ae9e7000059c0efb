//! Client for the upstream identity provider.
//!
//! The IdP speaks the GoTrue REST dialect: every call is a JSON request under
//! `/auth/v1` authenticated with the project API key. Calls made on behalf of
//! a signed-in user (sign-out, current user) carry that user's access token as
//! the bearer instead.

mod error;
mod types;

pub use error::IdpError;
pub use types::Session;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

const SIGNUP_PATH: &str = "/auth/v1/signup";
const TOKEN_PATH: &str = "/auth/v1/token?grant_type=password";
const LOGOUT_PATH: &str = "/auth/v1/logout";
const USER_PATH: &str = "/auth/v1/user";
const HEALTH_PATH: &str = "/auth/v1/health";
const API_KEY_HEADER: &str = "apikey";

/// Process-wide handle to the IdP, created once at start-up.
#[derive(Clone)]
pub struct IdpClient {
    base_url: String,
    api_key: SecretString,
    redirect_url: Option<String>,
    http: Client,
}

impl IdpClient {
    /// Build a client for the IdP at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is not an http(s) URL with a host, the key is
    /// empty, or the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid IdP URL: {base_url}"))?;

        match parsed.scheme() {
            "http" | "https" => (),
            scheme => return Err(anyhow!("Unsupported IdP URL scheme: {scheme}")),
        }

        if parsed.host_str().is_none() {
            return Err(anyhow!("IdP URL must include a host: {base_url}"));
        }

        if api_key.expose_secret().trim().is_empty() {
            return Err(anyhow!("IdP API key must not be empty"));
        }

        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build IdP HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            redirect_url: None,
            http,
        })
    }

    /// Ask the IdP to point confirmation emails at `redirect_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn with_redirect_url(mut self, redirect_url: &str) -> Result<Self> {
        let parsed = Url::parse(redirect_url)
            .with_context(|| format!("Invalid signup redirect URL: {redirect_url}"))?;

        match parsed.scheme() {
            "http" | "https" => (),
            scheme => return Err(anyhow!("Unsupported signup redirect URL scheme: {scheme}")),
        }

        self.redirect_url = Some(parsed.to_string());
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // Requests made with the project key only.
    fn service_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        builder.header(API_KEY_HEADER, key).bearer_auth(key)
    }

    // Requests made on behalf of a user access token.
    fn user_request(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .bearer_auth(access_token)
    }

    /// Register a new account and return the user record created by the IdP.
    ///
    /// # Errors
    /// Returns an [`IdpError`] if the IdP refuses the account or cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Value, IdpError> {
        let url = self.endpoint(SIGNUP_PATH);
        let mut request = self
            .service_request(self.http.post(&url))
            .json(&types::PasswordCredentials { email, password });

        if let Some(redirect_url) = &self.redirect_url {
            request = request.query(&[("redirect_to", redirect_url)]);
        }

        let (status, body) = send(request, "signup", &url).await?;
        let json: Value = parse(status, &body, "signup")?;

        types::signup_user(json).ok_or_else(|| IdpError::Upstream {
            status: Some(status),
            message: "Identity provider returned no user for signup".to_string(),
        })
    }

    /// Exchange email and password for a session.
    ///
    /// # Errors
    /// Returns an [`IdpError`] if the credentials are rejected or the IdP cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdpError> {
        let url = self.endpoint(TOKEN_PATH);
        let request = self
            .service_request(self.http.post(&url))
            .json(&types::PasswordCredentials { email, password });

        let (status, body) = send(request, "token", &url).await?;
        parse(status, &body, "token")
    }

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    /// Returns an [`IdpError`] if the IdP refuses the token or cannot be reached.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdpError> {
        let url = self.endpoint(LOGOUT_PATH);
        let request = self.user_request(self.http.post(&url), access_token);

        send(request, "logout", &url).await?;
        Ok(())
    }

    /// Fetch the user record that owns `access_token`.
    ///
    /// # Errors
    /// Returns an [`IdpError`] if the token is not valid or the IdP cannot be reached.
    #[instrument(skip(self, access_token))]
    pub async fn get_user(&self, access_token: &str) -> Result<Value, IdpError> {
        let url = self.endpoint(USER_PATH);
        let request = self.user_request(self.http.get(&url), access_token);

        let (status, body) = send(request, "user", &url).await?;
        parse(status, &body, "user")
    }

    /// Check that the IdP answers its health endpoint.
    ///
    /// # Errors
    /// Returns an [`IdpError`] if the IdP is unhealthy or unreachable.
    pub async fn health(&self) -> Result<(), IdpError> {
        let url = self.endpoint(HEALTH_PATH);
        let request = self.service_request(self.http.get(&url));

        send(request, "health", &url).await?;
        Ok(())
    }
}

impl std::fmt::Debug for IdpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdpClient")
            .field("base_url", &self.base_url)
            .field("redirect_url", &self.redirect_url)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

async fn send(
    request: RequestBuilder,
    operation: &'static str,
    url: &str,
) -> Result<(StatusCode, String), IdpError> {
    let span = info_span!("idp.request", idp.operation = operation, url = %url);

    execute(request).instrument(span).await
}

async fn execute(request: RequestBuilder) -> Result<(StatusCode, String), IdpError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    debug!(status = %status, "identity provider responded");

    if status.is_success() {
        Ok((status, body))
    } else {
        Err(IdpError::from_response(status, &body))
    }
}

fn parse<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    operation: &str,
) -> Result<T, IdpError> {
    serde_json::from_str(body).map_err(|err| IdpError::Upstream {
        status: Some(status),
        message: format!("Invalid {operation} response from identity provider: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "anon-key";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(url: &str) -> Result<IdpClient> {
        IdpClient::new(
            url,
            SecretString::from(API_KEY.to_string()),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn new_rejects_bad_urls() {
        assert!(client("not a url").is_err());
        assert!(client("ftp://idp.example.com").is_err());
        assert!(
            IdpClient::new(
                "https://idp.example.com",
                SecretString::from(" ".to_string()),
                Duration::from_secs(1)
            )
            .is_err()
        );
    }

    #[test]
    fn new_keeps_base_path_and_trims_slash() -> Result<()> {
        let idp = client("https://idp.example.com/tenant/")?;
        assert_eq!(idp.base_url(), "https://idp.example.com/tenant");
        assert_eq!(
            idp.endpoint(SIGNUP_PATH),
            "https://idp.example.com/tenant/auth/v1/signup"
        );
        Ok(())
    }

    #[test]
    fn debug_hides_api_key() -> Result<()> {
        let idp = client("https://idp.example.com")?;
        assert!(!format!("{idp:?}").contains(API_KEY));
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_forwards_credentials_unmodified() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(header("apikey", API_KEY))
            .and(header("authorization", "Bearer anon-key"))
            .and(body_json(json!({
                "email": " Mixed@Case.COM ",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "email": "mixed@case.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server.uri())?
            .sign_up(" Mixed@Case.COM ", "hunter2")
            .await?;
        assert_eq!(user, json!({"id": "user-1", "email": "mixed@case.com"}));
        Ok(())
    }

    #[test]
    fn with_redirect_url_rejects_bad_urls() -> Result<()> {
        assert!(client("https://idp.example.com")?
            .with_redirect_url("/auth/callback")
            .is_err());
        assert!(client("https://idp.example.com")?
            .with_redirect_url("javascript:alert(1)")
            .is_err());
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_sends_redirect_to() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(query_param(
                "redirect_to",
                "https://app.example.com/auth/callback",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server.uri())?
            .with_redirect_url("https://app.example.com/auth/callback")?
            .sign_up("a@b.com", "hunter2")
            .await?;
        assert_eq!(user, json!({"id": "user-1"}));
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_surfaces_idp_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": 422,
                "error_code": "user_already_exists",
                "msg": "User already registered"
            })))
            .mount(&server)
            .await;

        let result = client(&server.uri())?.sign_up("a@b.com", "hunter2").await;
        let Err(err) = result else {
            bail!("expected signup to fail");
        };
        assert!(matches!(err, IdpError::Conflict { .. }));
        assert_eq!(err.to_string(), "User already registered");
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_without_user_is_upstream_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client(&server.uri())?.sign_up("a@b.com", "hunter2").await;
        assert!(matches!(result, Err(IdpError::Upstream { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_returns_session_as_issued() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", API_KEY))
            .and(body_json(json!({"email": "a@b.com", "password": "hunter2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {"id": "user-1"}
            })))
            .mount(&server)
            .await;

        let session = client(&server.uri())?
            .sign_in_with_password("a@b.com", "hunter2")
            .await?;
        assert_eq!(session.access_token, "jwt-token");
        assert_eq!(session.token_type(), "bearer");
        assert_eq!(session.user, json!({"id": "user-1"}));
        Ok(())
    }

    #[tokio::test]
    async fn sign_out_uses_user_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("apikey", API_KEY))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server.uri())?.sign_out("user-token").await?;
        Ok(())
    }

    #[tokio::test]
    async fn get_user_rejects_bad_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": 401,
                "error_code": "bad_jwt",
                "msg": "invalid JWT"
            })))
            .mount(&server)
            .await;

        let result = client(&server.uri())?.get_user("expired").await;
        let Err(err) = result else {
            bail!("expected get_user to fail");
        };
        assert!(matches!(err, IdpError::Rejected { .. }));
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_idp_is_transport_error() -> Result<()> {
        // Grab a free port, then release it so nothing is listening.
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr()?.port(),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };

        let result = client(&format!("http://127.0.0.1:{port}"))?
            .health()
            .await;
        assert!(matches!(result, Err(IdpError::Transport(_))));
        Ok(())
    }
}
