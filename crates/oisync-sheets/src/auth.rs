//! 서비스 계정 인증 모듈.
//!
//! 처리 기능:
//! - 서비스 계정 키 파일 로드
//! - RS256 JWT assertion 서명
//! - 접근 토큰 발급 및 캐싱 (POST token_uri, jwt-bearer grant)

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::error::{SheetsError, SheetsResult};

/// 스프레드시트 읽기/쓰기 권한 범위.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// 기본 토큰 엔드포인트.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// assertion 유효 시간 (초).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// 토큰 갱신 임계값 (남은 시간이 이 값보다 적으면 갱신).
const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

/// 요청마다 Bearer 토큰을 제공하는 소스.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// 유효한 접근 토큰 반환.
    async fn bearer_token(&self) -> SheetsResult<String>;
}

/// 고정 토큰 (테스트, 외부에서 발급받은 토큰).
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> SheetsResult<String> {
        Ok(self.0.expose_secret().to_string())
    }
}

#[derive(Deserialize)]
struct RawServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

/// 서비스 계정 키.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    /// 서비스 계정 이메일 (JWT iss)
    pub client_email: String,
    /// 키 ID (JWT 헤더 kid)
    pub private_key_id: Option<String>,
    /// 토큰 엔드포인트
    pub token_uri: String,
    private_key: SecretString,
}

impl ServiceAccountKey {
    /// JSON 키 파일 내용으로 생성.
    pub fn from_json(json: &str) -> SheetsResult<Self> {
        let raw: RawServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| SheetsError::Credentials(format!("Invalid service account key: {}", e)))?;

        if raw.client_email.trim().is_empty() {
            return Err(SheetsError::Credentials("client_email is empty".to_string()));
        }

        Ok(Self {
            client_email: raw.client_email,
            private_key_id: raw.private_key_id,
            token_uri: raw.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            private_key: SecretString::from(raw.private_key),
        })
    }

    /// JSON 키 파일에서 로드.
    pub fn from_file(path: impl AsRef<Path>) -> SheetsResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SheetsError::Credentials(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn encoding_key(&self) -> SheetsResult<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("Invalid private key: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// 만료 추적이 포함된 토큰 상태.
#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenState {
    fn is_expired_or_expiring(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::seconds(TOKEN_REFRESH_THRESHOLD_SECS)
    }
}

/// 서비스 계정 토큰 관리자.
///
/// 토큰을 캐시하고 만료 5분 전부터 새로 발급받습니다.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    token_url: String,
    client: Client,
    token: Arc<RwLock<Option<TokenState>>>,
}

impl ServiceAccountAuth {
    /// 키 파일의 token_uri를 사용하는 관리자 생성.
    pub fn new(key: ServiceAccountKey, client: Client) -> Self {
        let token_url = key.token_uri.clone();
        Self {
            key,
            token_url,
            client,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// 토큰 엔드포인트 재정의.
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// 서비스 계정 이메일.
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// 서명된 JWT assertion 생성.
    fn sign_assertion(&self, now: DateTime<Utc>) -> SheetsResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_url,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.key.encoding_key()?)
            .map_err(|e| SheetsError::Credentials(format!("Failed to sign assertion: {}", e)))
    }

    /// 접근 토큰 강제 갱신.
    async fn refresh_token(&self) -> SheetsResult<TokenState> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        info!(client_email = %self.key.client_email, "Requesting new access token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Token request failed: {}", body);
            return Err(SheetsError::Unauthorized(format!(
                "Token request failed ({}): {}",
                status, body
            )));
        }

        let token_resp: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::Parse(format!("Failed to parse token response: {}", e)))?;

        if !token_resp.token_type.eq_ignore_ascii_case("bearer") {
            return Err(SheetsError::Unauthorized(format!(
                "Unsupported token type: {}",
                token_resp.token_type
            )));
        }

        let token_state = TokenState {
            access_token: token_resp.access_token,
            expires_at: now + Duration::seconds(token_resp.expires_in),
        };

        *self.token.write().await = Some(token_state.clone());

        info!("Access token obtained, expires at: {}", token_state.expires_at);
        Ok(token_state)
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAuth {
    async fn bearer_token(&self) -> SheetsResult<String> {
        {
            let token_guard = self.token.read().await;
            if let Some(ref token) = *token_guard {
                if !token.is_expired_or_expiring(Utc::now()) {
                    debug!("Using cached access token (expires at: {})", token.expires_at);
                    return Ok(token.access_token.clone());
                }
            }
        }

        Ok(self.refresh_token().await?.access_token)
    }
}
