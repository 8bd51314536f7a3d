use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::types::{AlertLevel, EventId, Region, TectonicPlate};

/// Output column order.
pub const COLUMNS: [&str; 14] = [
    "event_id",
    "latitude",
    "longitude",
    "depth",
    "mag",
    "date",
    "tectonic_plate",
    "alert_level",
    "intensity_level",
    "estimated_cost",
    "casualties",
    "injuries",
    "displaced",
    "region",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One synthetic earthquake. Field order matches `COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub event_id: EventId,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    #[serde(rename = "mag")]
    pub magnitude: f64,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDateTime,
    pub tectonic_plate: TectonicPlate,
    pub alert_level: AlertLevel,
    pub intensity_level: f64,
    pub estimated_cost: f64,
    pub casualties: Option<u64>,
    pub injuries: Option<u64>,
    pub displaced: Option<u64>,
    pub region: Region,
}

fn serialize_date<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}

/// Immutable result of one generation call, rows in `event_id` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBatch {
    records: Vec<EventRecord>,
}

impl EventBatch {
    pub fn new(records: Vec<EventRecord>) -> Self {
        EventBatch { records }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
