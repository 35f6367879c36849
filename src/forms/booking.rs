//! booking.rs
//!
//! Форма заявки на чартер: сырые строковые поля из POST-запроса и их проверка.
//!
//! Проверка не останавливается на первой ошибке: каждое поле проверяется
//! независимо, чтобы пользователь увидел все проблемы сразу.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::models::{JetCategory, NewBookingRequest};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MIN_PASSENGERS: i32 = 1;
pub const MAX_PASSENGERS: i32 = 19;

const REQUIRED: &str = "This field is required.";

/// Поля формы в том виде, в каком их прислал браузер.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub jet_category: String,
    pub departure: String,
    pub arrival: String,
    pub departure_date: String,
    pub passengers: String,
    pub special_requests: String,
    pub csrf_token: String,
}

/// Ошибки по полям, не больше одной на поле, в порядке полей формы.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    entries: Vec<(&'static str, String)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Первая ошибка по полю выигрывает.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, message) in other.entries {
            self.add(field, message);
        }
    }
}

impl BookingForm {
    /// Проверяет все поля и возвращает типизированную заявку либо
    /// полный набор ошибок.
    pub fn validate(&self) -> Result<NewBookingRequest, FormErrors> {
        let mut errors = FormErrors::new();

        let full_name = text(&mut errors, "full_name", &self.full_name, 120);
        let email = email(&mut errors, &self.email);
        let phone = text(&mut errors, "phone", &self.phone, 30);
        let jet_category = jet_category(&mut errors, &self.jet_category);
        let departure = text(&mut errors, "departure", &self.departure, 150);
        let arrival = text(&mut errors, "arrival", &self.arrival, 150);
        let departure_date = departure_date(&mut errors, &self.departure_date);
        let passengers = passengers(&mut errors, &self.passengers);

        let special_requests = Some(self.special_requests.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        match (
            full_name,
            email,
            phone,
            jet_category,
            departure,
            arrival,
            departure_date,
            passengers,
        ) {
            (
                Some(full_name),
                Some(email),
                Some(phone),
                Some(jet_category),
                Some(departure),
                Some(arrival),
                Some(departure_date),
                Some(passengers),
            ) if errors.is_empty() => Ok(NewBookingRequest {
                full_name,
                email,
                phone,
                jet_category,
                departure,
                arrival,
                departure_date,
                passengers,
                special_requests,
            }),
            _ => Err(errors),
        }
    }

    /// Пустая форма с выданным CSRF-токеном.
    pub fn blank(csrf_token: String) -> Self {
        BookingForm {
            csrf_token,
            ..Self::default()
        }
    }
}

fn present<'a>(errors: &mut FormErrors, field: &'static str, raw: &'a str) -> Option<&'a str> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value)
    }
}

fn text(errors: &mut FormErrors, field: &'static str, raw: &str, max_len: usize) -> Option<String> {
    let value = present(errors, field, raw)?;
    if value.chars().count() > max_len {
        errors.add(
            field,
            format!("Field cannot be longer than {} characters.", max_len),
        );
        return None;
    }
    Some(value.to_string())
}

fn email(errors: &mut FormErrors, raw: &str) -> Option<String> {
    let value = text(errors, "email", raw, 120)?;
    if !value.validate_email() {
        errors.add("email", "Invalid email address.");
        return None;
    }
    Some(value)
}

fn jet_category(errors: &mut FormErrors, raw: &str) -> Option<JetCategory> {
    let value = present(errors, "jet_category", raw)?;
    match value.parse() {
        Ok(category) => Some(category),
        Err(_) => {
            errors.add("jet_category", "Not a valid choice.");
            None
        }
    }
}

fn departure_date(errors: &mut FormErrors, raw: &str) -> Option<NaiveDate> {
    let value = present(errors, "departure_date", raw)?;
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add("departure_date", "Not a valid date value.");
            None
        }
    }
}

fn passengers(errors: &mut FormErrors, raw: &str) -> Option<i32> {
    let value = present(errors, "passengers", raw)?;
    let Ok(count) = value.parse::<i32>() else {
        errors.add("passengers", "Not a valid integer value.");
        return None;
    };
    if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&count) {
        errors.add(
            "passengers",
            format!(
                "Number must be between {} and {}.",
                MIN_PASSENGERS, MAX_PASSENGERS
            ),
        );
        return None;
    }
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn jane() -> BookingForm {
        BookingForm {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+1-555-0100".into(),
            jet_category: "Midsize Jet".into(),
            departure: "JFK".into(),
            arrival: "LAX".into(),
            departure_date: "2025-06-15".into(),
            passengers: "4".into(),
            special_requests: String::new(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn valid_form_produces_typed_record() {
        let record = jane().validate().unwrap();

        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.jet_category, JetCategory::Midsize);
        assert_eq!(
            record.departure_date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(record.passengers, 4);
        assert_eq!(record.special_requests, None);
    }

    #[test]
    fn blank_special_requests_become_absent() {
        let mut form = jane();
        form.special_requests = "   \n".into();
        assert_eq!(form.validate().unwrap().special_requests, None);

        form.special_requests = "Two dogs, vegan catering".into();
        assert_eq!(
            form.validate().unwrap().special_requests.as_deref(),
            Some("Two dogs, vegan catering")
        );
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = BookingForm::default().validate().unwrap_err();

        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![
                "full_name",
                "email",
                "phone",
                "jet_category",
                "departure",
                "arrival",
                "departure_date",
                "passengers",
            ]
        );
        assert!(errors.iter().all(|(_, m)| m == REQUIRED));
        assert!(!errors.contains("special_requests"));
    }

    #[test]
    fn whitespace_only_is_missing() {
        let mut form = jane();
        form.full_name = "   ".into();
        form.arrival = "\t".into();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("full_name"), Some(REQUIRED));
        assert_eq!(errors.get("arrival"), Some(REQUIRED));
    }

    #[test]
    fn rejects_malformed_email() {
        let mut form = jane();
        form.email = "jane.example.com".into();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn passenger_bounds() {
        for bad in ["0", "20", "-1", "abc", "4.5"] {
            let mut form = jane();
            form.passengers = bad.into();
            assert!(
                form.validate().unwrap_err().contains("passengers"),
                "{bad} should fail"
            );
        }
        for good in ["1", "19"] {
            let mut form = jane();
            form.passengers = good.into();
            assert!(form.validate().is_ok(), "{good} should pass");
        }
    }

    #[test]
    fn jet_category_must_be_a_known_label() {
        let mut form = jane();
        form.jet_category = String::new();
        assert_eq!(form.validate().unwrap_err().get("jet_category"), Some(REQUIRED));

        form.jet_category = "Turboprop".into();
        assert_eq!(
            form.validate().unwrap_err().get("jet_category"),
            Some("Not a valid choice.")
        );

        for category in JetCategory::ALL {
            form.jet_category = category.as_str().into();
            assert_eq!(form.validate().unwrap().jet_category, category);
        }
    }

    #[test]
    fn departure_date_must_be_a_calendar_date() {
        let mut form = jane();
        form.departure_date = "2025-02-30".into();
        assert_eq!(
            form.validate().unwrap_err().get("departure_date"),
            Some("Not a valid date value.")
        );

        form.departure_date = "15/06/2025".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let mut form = jane();
        form.phone = "1".repeat(31);

        assert_eq!(
            form.validate().unwrap_err().get("phone"),
            Some("Field cannot be longer than 30 characters.")
        );
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FormErrors::new();
        errors.add("email", "first");
        errors.add("email", "second");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("first"));
    }

    proptest! {
        #[test]
        fn passengers_accepted_iff_in_range(n in -50i32..60) {
            let mut form = jane();
            form.passengers = n.to_string();
            prop_assert_eq!(form.validate().is_ok(), (1..=19).contains(&n));
        }

        #[test]
        fn any_real_date_round_trips(days in 0i64..36_500) {
            let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(days);
            let mut form = jane();
            form.departure_date = date.format(DATE_FORMAT).to_string();
            prop_assert_eq!(form.validate().unwrap().departure_date, date);
        }

        #[test]
        fn unknown_categories_rejected(label in "[A-Za-z /]{0,24}") {
            prop_assume!(label.trim().parse::<JetCategory>().is_err());
            let mut form = jane();
            form.jet_category = label;
            prop_assert!(form.validate().unwrap_err().contains("jet_category"));
        }
    }
}
