//! Caller context from edge headers
//!
//! The edge network in front of the service annotates each request with the
//! caller's approximate location, timezone and a request id.

use axum::http::HeaderMap;
use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;

pub const COUNTRY_HEADER: &str = "x-vercel-ip-country";
pub const REGION_HEADER: &str = "x-vercel-ip-country-region";
pub const CITY_HEADER: &str = "x-vercel-ip-city";
pub const TIMEZONE_HEADER: &str = "x-vercel-ip-timezone";
pub const REQUEST_ID_HEADER: &str = "x-vercel-id";

const UNKNOWN_LOCATION: &str = "unknown";
const LOCAL_REQUEST_ID: &str = "local";

/// en-US `toLocaleString()` layout, e.g. `10/19/2026, 4:05:09 PM`
const LOCALE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// Correlates log lines of one request
    pub request_id: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// IANA timezone name, e.g. `Europe/Paris`
    pub timezone: Option<String>,
}

impl CallerContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            request_id: get(REQUEST_ID_HEADER).unwrap_or_else(|| LOCAL_REQUEST_ID.to_string()),
            city: get(CITY_HEADER),
            region: get(REGION_HEADER),
            country: get(COUNTRY_HEADER),
            timezone: get(TIMEZONE_HEADER),
        }
    }

    /// `"{city}, {region}, {country}"`, or `"unknown"` unless all three are known.
    pub fn location(&self) -> String {
        match (&self.city, &self.region, &self.country) {
            (Some(city), Some(region), Some(country)) => format!("{city}, {region}, {country}"),
            _ => UNKNOWN_LOCATION.to_string(),
        }
    }

    /// Current time in the caller's timezone (host timezone if unknown).
    pub fn local_time(&self) -> String {
        self.local_time_at(Utc::now())
    }

    pub fn local_time_at(&self, now: DateTime<Utc>) -> String {
        match self.timezone.as_deref().map(str::parse::<Tz>) {
            Some(Ok(tz)) => format_locale_time(&now.with_timezone(&tz)),
            Some(Err(e)) => {
                tracing::warn!(
                    "Unrecognized caller timezone {:?} ({}), using host timezone",
                    self.timezone,
                    e
                );
                format_locale_time(&now.with_timezone(&Local))
            }
            None => format_locale_time(&now.with_timezone(&Local)),
        }
    }
}

fn format_locale_time<Z: TimeZone>(time: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    time.format(LOCALE_TIME_FORMAT).to_string()
}
