//! Wire data model for the visualizer API
//!
//! Every type here mirrors a JSON shape the server returns. Fields the server
//! may omit are optional so a partial payload never fails to decode.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of recent datasets the registry holds
pub const MAX_RECENT_DATASETS: usize = 5;

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Login name
    pub username: String,
}

/// Response of the auth status endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthStatus {
    /// Whether the cookie session is authenticated
    #[serde(default)]
    pub authenticated: bool,
    /// User record when authenticated
    #[serde(default)]
    pub user: Option<Identity>,
}

/// Response of the login and register endpoints
///
/// The server either nests the user (`{"user": {"username": ..}}`) or
/// returns the username at the top level alongside a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Identity carried by the response, if any
    pub fn identity(&self) -> Option<Identity> {
        self.user.clone().or_else(|| {
            self.username.as_ref().map(|username| Identity {
                username: username.clone(),
            })
        })
    }
}

/// One entry of the recent datasets list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: u64,
    pub filename: String,
    /// Offset-less timestamps are read as UTC
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub total_rows: u64,
}

/// Server-computed aggregates over one dataset
///
/// Every field may be absent or null; consumers substitute zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub avg_flowrate: Option<f64>,
    #[serde(default)]
    pub avg_pressure: Option<f64>,
    #[serde(default)]
    pub avg_temperature: Option<f64>,
    /// Count per equipment type, in the order the server listed them
    #[serde(
        default,
        deserialize_with = "deserialize_type_counts",
        serialize_with = "serialize_type_counts"
    )]
    pub equipment_types: Option<Vec<(String, u64)>>,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognized timestamp: {}", raw))
    })
}

/// RFC 3339 first, then a naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_type_counts<'de, D>(deserializer: D) -> Result<Option<Vec<(String, u64)>>, D::Error>
where
    D: Deserializer<'de>,
{
    // serde_json is built with `preserve_order`, so the map keeps server order.
    let raw: Option<serde_json::Map<String, serde_json::Value>> =
        Option::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .map(|(name, count)| {
                let count = count
                    .as_u64()
                    .or_else(|| count.as_f64().map(|f| f.max(0.0) as u64))
                    .unwrap_or(0);
                (name, count)
            })
            .collect()
    }))
}

fn serialize_type_counts<S>(
    counts: &Option<Vec<(String, u64)>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match counts {
        Some(counts) => {
            let mut map = serializer.serialize_map(Some(counts.len()))?;
            for (name, count) in counts {
                map.serialize_entry(name, count)?;
            }
            map.end()
        }
        None => serializer.serialize_none(),
    }
}

/// One physical equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub id: u64,
    #[serde(default)]
    pub equipment_name: String,
    #[serde(default)]
    pub equipment_type: String,
    #[serde(default)]
    pub flowrate: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Full payload of one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDetail {
    pub id: u64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub summary: Option<AggregateStats>,
    #[serde(default)]
    pub equipment: Vec<EquipmentRow>,
}

/// File name a saved report gets
pub fn report_file_name(dataset_id: u64) -> String {
    format!("report_{}.pdf", dataset_id)
}
