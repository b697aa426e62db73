//! 영업일(BusinessDate) 계산.
//!
//! 원격 소스 파일 이름에 쓰이는 날짜 식별자(`DDMMYYYY`)를 계산합니다.
//! 고정 타임존 기준으로 컷오프(기본 19:30) 이전이면 전일, 이후면 당일을
//! 반환하므로 식별자는 항상 마감된 거래 세션을 가리킵니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 기본 타임존 (IST, UTC+5:30, DST 없음)
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

/// 기본 컷오프 시각 문자열
pub const DEFAULT_CUTOFF: &str = "19:30";

/// 마감된 거래 세션의 날짜.
///
/// 매 호출마다 다시 계산되며 트리거 간에 캐시하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BusinessDate(NaiveDate);

impl BusinessDate {
    /// 식별자 포맷 (`DDMMYYYY`)
    pub const FORMAT: &'static str = "%d%m%Y";

    /// 날짜로부터 생성.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// 내부 날짜 반환.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// 8자리 `DDMMYYYY` 식별자 반환.
    pub fn identifier(&self) -> String {
        self.0.format(Self::FORMAT).to_string()
    }
}

impl fmt::Display for BusinessDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for BusinessDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidDate(s.to_string()))
    }
}

impl From<BusinessDate> for String {
    fn from(date: BusinessDate) -> Self {
        date.identifier()
    }
}

impl TryFrom<String> for BusinessDate {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 컷오프 규칙을 적용하는 영업일 계산기.
#[derive(Debug, Clone, Copy)]
pub struct BusinessDateResolver {
    timezone: Tz,
    cutoff: NaiveTime,
}

impl Default for BusinessDateResolver {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            cutoff: NaiveTime::from_hms_opt(19, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl BusinessDateResolver {
    /// 타임존과 컷오프 시각으로 생성.
    pub fn new(timezone: Tz, cutoff: NaiveTime) -> Self {
        Self { timezone, cutoff }
    }

    /// 타임존 반환.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// 컷오프 시각 반환.
    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    /// 주어진 시각의 영업일 계산.
    ///
    /// 현지 시각이 컷오프 미만이면 전일, 아니면 당일.
    pub fn resolve(&self, now: DateTime<Utc>) -> BusinessDate {
        let local = now.with_timezone(&self.timezone);
        let today = local.date_naive();

        if local.time() < self.cutoff {
            BusinessDate(today.pred_opt().unwrap_or(today))
        } else {
            BusinessDate(today)
        }
    }

    /// 현재 시각 기준 영업일.
    pub fn resolve_now(&self) -> BusinessDate {
        self.resolve(Utc::now())
    }
}

/// `HH:MM` 또는 `HH:MM:SS` 형식의 컷오프 파싱.
pub fn parse_cutoff(value: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| CoreError::InvalidCutoff(value.to_string()))
}

/// IANA 타임존 이름 파싱.
pub fn parse_timezone(value: &str) -> Result<Tz, CoreError> {
    value
        .parse::<Tz>()
        .map_err(|_| CoreError::InvalidTimezone(value.to_string()))
}
