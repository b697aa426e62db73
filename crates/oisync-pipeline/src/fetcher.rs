//! 원격 소스 파일 가져오기.
//!
//! URL 형식: `<base_url>/<file_prefix>_<DDMMYYYY>.csv`
//! 저장 위치: `<download_dir>/<file_prefix>_<DDMMYYYY>.csv`

use std::path::{Path, PathBuf};
use std::time::Duration;

use oisync_core::{BusinessDate, SourceConfig};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, FetchError};

/// 스테이징된 소스 파일.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// 파일의 영업일
    pub business_date: BusinessDate,
    /// 로컬 경로
    pub path: PathBuf,
    /// 기록한 바이트 수
    pub bytes_written: u64,
}

impl StagedFile {
    /// 파일 내용을 읽습니다.
    pub async fn read(&self) -> Result<Vec<u8>, ExtractionError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| ExtractionError::Read {
                path: self.path.clone(),
                source,
            })
    }
}

/// 소스 파일 다운로더.
///
/// 호출당 한 번만 시도하며 재시도하지 않습니다.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    config: SourceConfig,
    client: Client,
}

impl SourceFetcher {
    /// 설정으로 생성. 타임아웃은 설정된 경우에만 적용합니다.
    pub fn new(config: SourceConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// 원격 파일 이름.
    pub fn file_name(&self, date: BusinessDate) -> String {
        format!("{}_{}.csv", self.config.file_prefix, date)
    }

    /// 원격 파일 URL.
    pub fn source_url(&self, date: BusinessDate) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.file_name(date)
        )
    }

    /// 스테이징 경로.
    pub fn staging_path(&self, date: BusinessDate) -> PathBuf {
        self.config.download_dir.join(self.file_name(date))
    }

    /// 스테이징 디렉토리.
    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// 파일을 받아 스테이징 경로에 저장합니다.
    ///
    /// 디렉토리 준비에 실패하면 네트워크 호출 없이 실패합니다.
    /// non-2xx 응답이면 기존 스테이징 파일을 건드리지 않습니다.
    pub async fn fetch(&self, date: BusinessDate) -> Result<StagedFile, FetchError> {
        let dir = &self.config.download_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| FetchError::StagingDir {
                path: dir.clone(),
                source,
            })?;

        let url = self.source_url(date);
        let path = self.staging_path(date);
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.clone(),
            message: e.to_string(),
        };

        info!(business_date = %date, url = %url, "Downloading source file");

        let mut response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            warn!(business_date = %date, status = status.as_u16(), "Source rejected request");
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let write_err = |source: std::io::Error| FetchError::StagingWrite {
            path: path.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&path).await.map_err(write_err)?;
        let mut bytes_written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(network)? {
            file.write_all(&chunk).await.map_err(write_err)?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        debug!(path = %path.display(), bytes_written, "Staged file written");
        info!(business_date = %date, path = %path.display(), "Download successful");

        Ok(StagedFile {
            business_date: date,
            path,
            bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn date() -> BusinessDate {
        "14032024".parse().unwrap()
    }

    fn fetcher(base_url: String, download_dir: PathBuf) -> SourceFetcher {
        SourceFetcher::new(SourceConfig {
            base_url,
            download_dir,
            ..SourceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_and_staging_path_follow_convention() {
        let fetcher = fetcher(
            "https://nsearchives.nseindia.com/content/nsccl/".to_string(),
            PathBuf::from("Download"),
        );
        assert_eq!(
            fetcher.source_url(date()),
            "https://nsearchives.nseindia.com/content/nsccl/fao_participant_oi_14032024.csv"
        );
        assert_eq!(
            fetcher.staging_path(date()),
            PathBuf::from("Download").join("fao_participant_oi_14032024.csv")
        );
    }

    #[tokio::test]
    async fn test_fetch_streams_body_into_new_directory() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fao_participant_oi_14032024.csv")
            .match_header("user-agent", Matcher::Regex("^Mozilla/5.0".to_string()))
            .with_status(200)
            .with_body("meta\nClient Type,Future Index Long\n")
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("Download");
        let staged = fetcher(server.url(), dir.clone()).fetch(date()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(staged.path, dir.join("fao_participant_oi_14032024.csv"));
        assert_eq!(staged.bytes_written, 35);
        assert_eq!(
            staged.read().await.unwrap(),
            b"meta\nClient Type,Future Index Long\n".to_vec()
        );
    }

    #[tokio::test]
    async fn test_fetch_overwrites_previous_staged_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fao_participant_oi_14032024.csv")
            .with_status(200)
            .with_body("new")
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = fetcher(server.url(), tmp.path().to_path_buf());
        std::fs::write(fetcher.staging_path(date()), "old contents that are longer").unwrap();

        let staged = fetcher.fetch(date()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&staged.path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_existing_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fao_participant_oi_14032024.csv")
            .with_status(404)
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = fetcher(server.url(), tmp.path().to_path_buf());
        std::fs::write(fetcher.staging_path(date()), "previous").unwrap();

        let err = fetcher.fetch(date()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(
            std::fs::read_to_string(fetcher.staging_path(date())).unwrap(),
            "previous"
        );
    }

    #[tokio::test]
    async fn test_directory_failure_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let err = fetcher(server.url(), blocker.join("Download"))
            .fetch(date())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::StagingDir { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = fetcher("http://127.0.0.1:1".to_string(), tmp.path().to_path_buf())
            .fetch(date())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
