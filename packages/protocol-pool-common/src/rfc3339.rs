//! RFC3339 (de)serialization for block timestamps, used with `#[serde(with = ...)]`.

use chrono::{DateTime, SecondsFormat, Utc};
use cosmwasm_std::Timestamp;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub fn format(ts: &Timestamp) -> Result<String, String> {
    let secs = i64::try_from(ts.seconds()).map_err(|e| e.to_string())?;
    let nanos = u32::try_from(ts.subsec_nanos()).map_err(|e| e.to_string())?;
    let dt = DateTime::<Utc>::from_timestamp(secs, nanos)
        .ok_or_else(|| format!("timestamp {ts} is out of range"))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn parse(s: &str) -> Result<Timestamp, String> {
    let dt = DateTime::parse_from_rfc3339(s).map_err(|e| format!("{s:?}: {e}"))?;
    let secs =
        u64::try_from(dt.timestamp()).map_err(|_| format!("{s:?} is before the unix epoch"))?;
    Ok(Timestamp::from_seconds(secs).plus_nanos(u64::from(dt.timestamp_subsec_nanos())))
}

pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    let rendered = format(ts).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&rendered)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(D::Error::custom)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => super::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| parse(&s).map_err(D::Error::custom)).transpose()
    }
}
