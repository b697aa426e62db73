//! Google Sheets API v4 클라이언트.
//!
//! 사용하는 엔드포인트:
//! - `GET  spreadsheets/{id}/values/{range}` (값 읽기)
//! - `PUT  spreadsheets/{id}/values/{range}?valueInputOption=USER_ENTERED` (값 쓰기)
//! - `POST spreadsheets/{id}/values/{range}:clear` (값 지우기)
//! - `GET  spreadsheets/{id}?fields=sheets.properties.title` (워크시트 목록)
//! - `POST spreadsheets/{id}:batchUpdate` (워크시트 추가)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use oisync_core::{DataGrid, SheetRange, SheetsConfig};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::{ServiceAccountAuth, ServiceAccountKey, TokenSource};
use crate::error::{SheetsError, SheetsResult};
use crate::traits::RangeStore;

/// 쓰기 값 해석 방식 (사용자 입력과 동일).
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Google Sheets 기반 RangeStore.
pub struct GoogleSheetsStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl GoogleSheetsStore {
    /// 새 저장소 생성.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    /// 설정에서 생성. 서비스 계정 키 파일을 읽습니다.
    ///
    /// # Errors
    /// 키 파일이 없거나 잘못되었으면 `SheetsError::Credentials`를 반환합니다.
    pub fn from_config(config: &SheetsConfig) -> SheetsResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SheetsError::Network(format!("HTTP client 생성 실패: {}", e)))?;

        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let mut auth = ServiceAccountAuth::new(key, client.clone());
        if let Some(token_url) = &config.token_url {
            auth = auth.with_token_url(token_url.clone());
        }

        info!(
            spreadsheet_id = %config.spreadsheet_id,
            client_email = %auth.client_email(),
            "Google Sheets store configured"
        );

        Ok(Self::new(
            client,
            config.api_base_url.clone(),
            config.spreadsheet_id.clone(),
            Arc::new(auth),
        ))
    }

    /// 스프레드시트 ID.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// `<base>/spreadsheets/<id><suffix>` URL.
    fn spreadsheet_url(&self, suffix: &str) -> SheetsResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SheetsError::Network(format!("Invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Network("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&format!("{}{}", self.spreadsheet_id, suffix));
        Ok(url)
    }

    /// `<base>/spreadsheets/<id>/values/<range><suffix>` URL.
    fn values_url(&self, range: &SheetRange, suffix: &str) -> SheetsResult<Url> {
        let mut url = self.spreadsheet_url("")?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Network("API base URL cannot be a base".to_string()))?
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    /// 인증 헤더를 붙여 요청하고 성공 응답 본문을 반환합니다.
    async fn send(&self, request: RequestBuilder) -> SheetsResult<String> {
        let token = self.tokens.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), "Sheets API request failed: {}", message);
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// 워크시트 존재 여부.
    async fn worksheet_exists(&self, worksheet: &str) -> SheetsResult<bool> {
        let mut url = self.spreadsheet_url("")?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        let body = self.send(self.client.get(url)).await?;
        let metadata: SpreadsheetMetadata = serde_json::from_str(&body)?;
        Ok(metadata
            .sheets
            .iter()
            .any(|sheet| sheet.properties.title == worksheet))
    }

    /// 주어진 크기로 워크시트 추가.
    async fn add_worksheet(&self, worksheet: &str, rows: usize, cols: usize) -> SheetsResult<()> {
        let url = self.spreadsheet_url(":batchUpdate")?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": worksheet,
                        "gridProperties": {
                            "rowCount": rows.max(1),
                            "columnCount": cols.max(1),
                        }
                    }
                }
            }]
        });

        self.send(self.client.post(url).json(&body)).await?;
        info!(worksheet, rows, cols, "Worksheet created");
        Ok(())
    }
}

/// 응답 셀 값을 문자열로 변환.
fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RangeStore for GoogleSheetsStore {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn get(&self, range: &SheetRange) -> SheetsResult<DataGrid> {
        debug!(range = %range, "values.get");
        let url = self.values_url(range, "")?;
        let body = self.send(self.client.get(url)).await?;

        let response: ValueRangeResponse = serde_json::from_str(&body)?;
        let rows = response
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        Ok(DataGrid::new(rows))
    }

    async fn update(&self, range: &SheetRange, grid: &DataGrid) -> SheetsResult<()> {
        debug!(range = %range, rows = grid.len(), "values.update");
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);

        let body = ValueRangeBody {
            major_dimension: "ROWS",
            values: grid.rows(),
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn clear(&self, range: &SheetRange) -> SheetsResult<()> {
        debug!(range = %range, "values.clear");
        let url = self.values_url(range, ":clear")?;
        self.send(self.client.post(url).json(&json!({}))).await?;
        Ok(())
    }

    async fn replace_worksheet(&self, worksheet: &str, grid: &DataGrid) -> SheetsResult<()> {
        let grid = grid.clone().into_rectangular();

        if self.worksheet_exists(worksheet).await? {
            self.clear(&SheetRange::whole_sheet(worksheet)).await?;
        } else {
            self.add_worksheet(worksheet, grid.len(), grid.width()).await?;
        }

        if !grid.rows().is_empty() {
            self.update(&SheetRange::new(worksheet, "A1"), &grid).await?;
        }

        info!(worksheet, rows = grid.len(), cols = grid.width(), "Worksheet replaced");
        Ok(())
    }
}
