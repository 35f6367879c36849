use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Класс самолёта, выбираемый в форме. Закрытый список.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JetCategory {
    #[serde(rename = "Light Jet")]
    Light,
    #[serde(rename = "Midsize Jet")]
    Midsize,
    #[serde(rename = "Super Midsize")]
    SuperMidsize,
    #[serde(rename = "Heavy / Long Range")]
    HeavyLongRange,
}

impl JetCategory {
    /// В порядке отображения в выпадающем списке.
    pub const ALL: [JetCategory; 4] = [
        JetCategory::Light,
        JetCategory::Midsize,
        JetCategory::SuperMidsize,
        JetCategory::HeavyLongRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JetCategory::Light => "Light Jet",
            JetCategory::Midsize => "Midsize Jet",
            JetCategory::SuperMidsize => "Super Midsize",
            JetCategory::HeavyLongRange => "Heavy / Long Range",
        }
    }
}

impl fmt::Display for JetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown jet category: {0:?}")]
pub struct UnknownJetCategory(pub String);

impl FromStr for JetCategory {
    type Err = UnknownJetCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JetCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownJetCategory(s.to_string()))
    }
}

/// Проверенная заявка, ещё не сохранённая в БД.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBookingRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub jet_category: JetCategory,
    pub departure: String,
    pub arrival: String,
    pub departure_date: NaiveDate,
    pub passengers: i32,
    pub special_requests: Option<String>,
}

/// Сохранённая заявка. Записи только добавляются, без обновлений.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub jet_category: JetCategory,
    pub departure: String,
    pub arrival: String,
    pub departure_date: NaiveDate,
    pub passengers: i32,
    pub special_requests: Option<String>,
}

impl BookingRequest {
    pub fn from_new(id: i64, created_at: DateTime<Utc>, new: NewBookingRequest) -> Self {
        BookingRequest {
            id,
            created_at,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            jet_category: new.jet_category,
            departure: new.departure,
            arrival: new.arrival,
            departure_date: new.departure_date,
            passengers: new.passengers,
            special_requests: new.special_requests,
        }
    }
}
