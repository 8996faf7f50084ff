use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;

/// Datetime format used in every API response (`2014-07-25T161400`).
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H%M%S";

pub fn chrono_to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

pub fn bson_to_chrono(dt: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn format_api_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(API_DATETIME_FORMAT).to_string()
}

/// Serde adapter for `DateTime<Utc>` fields stored as native BSON datetimes
/// by the data pipeline.
pub mod bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::DateTime as BsonDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::chrono_to_bson(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BsonDateTime::deserialize(deserializer).map(super::bson_to_chrono)
    }
}
