//! User profile: personal details and body metrics.
//!
//! Metrics are stored canonically in kilograms and centimetres; the unit
//! system only affects how the form reads and shows them.

use std::rc::Rc;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::storage::{keys, Store, StoreExt};

const KG_PER_LB: f64 = 0.453_592_37;
const CM_PER_IN: f64 = 2.54;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn weight_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "kg",
            UnitSystem::Imperial => "lb",
        }
    }

    pub fn height_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "cm",
            UnitSystem::Imperial => "in",
        }
    }

    fn weight_to_kg(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Metric => value,
            UnitSystem::Imperial => value * KG_PER_LB,
        }
    }

    fn height_to_cm(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Metric => value,
            UnitSystem::Imperial => value * CM_PER_IN,
        }
    }

    fn weight_from_kg(&self, kg: f64) -> f64 {
        match self {
            UnitSystem::Metric => kg,
            UnitSystem::Imperial => kg / KG_PER_LB,
        }
    }

    fn height_from_cm(&self, cm: f64) -> f64 {
        match self {
            UnitSystem::Metric => cm,
            UnitSystem::Imperial => cm / CM_PER_IN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Option<Self> {
        if !bmi.is_finite() || bmi < 0.0 {
            return None;
        }
        Some(if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub unit_system: UnitSystem,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            given_name: String::new(),
            family_name: String::new(),
            email: String::new(),
            weight_kg: None,
            height_cm: None,
            unit_system: UnitSystem::Metric,
            updated_at: Utc::now(),
        }
    }
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        [self.given_name.trim(), self.family_name.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn initials(&self) -> String {
        [self.given_name.trim(), self.family_name.trim()]
            .into_iter()
            .filter_map(|s| s.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn bmi(&self) -> Option<f64> {
        let weight = self.weight_kg?;
        let metres = self.height_cm? / 100.0;
        if metres <= 0.0 {
            return None;
        }
        Some(weight / (metres * metres))
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().and_then(BmiCategory::from_bmi)
    }

    pub fn weight_in(&self, system: UnitSystem) -> Option<f64> {
        self.weight_kg.map(|kg| system.weight_from_kg(kg))
    }

    pub fn height_in(&self, system: UnitSystem) -> Option<f64> {
        self.height_cm.map(|cm| system.height_from_cm(cm))
    }

    /// e.g. `"70.5 kg"`, or `None` when no weight is set.
    pub fn display_weight(&self) -> Option<String> {
        self.weight_in(self.unit_system)
            .map(|w| format!("{} {}", one_decimal(w), self.unit_system.weight_symbol()))
    }

    pub fn display_height(&self) -> Option<String> {
        self.height_in(self.unit_system)
            .map(|h| format!("{} {}", one_decimal(h), self.unit_system.height_symbol()))
    }

    /// e.g. `"22.9 • Healthy"`.
    pub fn bmi_summary(&self) -> Option<String> {
        let bmi = self.bmi()?;
        let category = BmiCategory::from_bmi(bmi)?;
        Some(format!("{bmi:.1} • {}", category.label()))
    }
}

/// At most one decimal, trailing zero dropped.
fn one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Raw text inputs for editing a profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileForm {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub weight: String,
    pub height: String,
    pub unit_system: UnitSystem,
}

impl ProfileForm {
    /// Pre-filled from `profile` in its own unit system.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            given_name: profile.given_name.clone(),
            family_name: profile.family_name.clone(),
            email: profile.email.clone(),
            weight: profile
                .weight_in(profile.unit_system)
                .map(one_decimal)
                .unwrap_or_default(),
            height: profile
                .height_in(profile.unit_system)
                .map(one_decimal)
                .unwrap_or_default(),
            unit_system: profile.unit_system,
        }
    }

    pub fn has_changes(&self, profile: &UserProfile) -> bool {
        *self != Self::from_profile(profile)
    }

    /// Switch units, converting any numbers already typed in.
    pub fn set_unit_system(&mut self, system: UnitSystem) {
        if system == self.unit_system {
            return;
        }
        let from = self.unit_system;
        if let Some(w) = parse_number(&self.weight) {
            self.weight = one_decimal(system.weight_from_kg(from.weight_to_kg(w)));
        }
        if let Some(h) = parse_number(&self.height) {
            self.height = one_decimal(system.height_from_cm(from.height_to_cm(h)));
        }
        self.unit_system = system;
    }

    /// Check every field in order and build the canonical profile.
    ///
    /// The id of `existing` is kept so edits replace rather than fork the
    /// profile.
    ///
    /// # Errors
    /// The first [`ValidationError`] found, in form order.
    pub fn build(
        &self,
        existing: Option<&UserProfile>,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, ValidationError> {
        let given_name = self.given_name.trim();
        let family_name = self.family_name.trim();
        let email = self.email.trim();

        if given_name.is_empty() {
            return Err(ValidationError::MissingFirstName);
        }
        if family_name.is_empty() {
            return Err(ValidationError::MissingLastName);
        }
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }

        let weight = parse_measurement(
            &self.weight,
            ValidationError::MissingWeight,
            ValidationError::InvalidWeight,
        )?;
        let height = parse_measurement(
            &self.height,
            ValidationError::MissingHeight,
            ValidationError::InvalidHeight,
        )?;

        Ok(UserProfile {
            id: existing.map_or_else(Uuid::new_v4, |p| p.id),
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_string(),
            weight_kg: Some(self.unit_system.weight_to_kg(weight)),
            height_cm: Some(self.unit_system.height_to_cm(height)),
            unit_system: self.unit_system,
            updated_at: now,
        })
    }

    /// Message for the first problem, if any.
    pub fn validation_message(&self) -> Option<String> {
        self.build(None, Utc::now()).err().map(|e| e.to_string())
    }
}

fn parse_number(input: &str) -> Option<f64> {
    input.trim().replace(',', ".").parse::<f64>().ok()
}

fn parse_measurement(
    input: &str,
    missing: ValidationError,
    invalid: ValidationError,
) -> Result<f64, ValidationError> {
    if input.trim().is_empty() {
        return Err(missing);
    }
    match parse_number(input) {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid),
    }
}

/// `local@domain.tld` with a purely alphabetic TLD of two or more letters.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Loads and saves the single user profile.
pub struct ProfileBook {
    store: Rc<dyn Store>,
    profile: Option<UserProfile>,
}

impl ProfileBook {
    pub fn new(store: Rc<dyn Store>) -> Self {
        let profile = store
            .load_as::<UserProfile>(keys::PROFILE)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable profile");
                None
            });
        Self { store, profile }
    }

    /// Saved profile, if one exists.
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Form pre-filled with the saved profile, or blank.
    pub fn form(&self) -> ProfileForm {
        self.profile
            .as_ref()
            .map(ProfileForm::from_profile)
            .unwrap_or_default()
    }

    /// Validate `form` and persist the result.
    ///
    /// # Errors
    /// Returns the first validation failure; nothing is saved in that case.
    pub fn save(
        &mut self,
        form: &ProfileForm,
        now: DateTime<Utc>,
    ) -> Result<&UserProfile, ValidationError> {
        let updated = form.build(self.profile.as_ref(), now)?;
        self.store.persist(keys::PROFILE, &updated);
        tracing::debug!(id = %updated.id, "profile saved");
        Ok(self.profile.insert(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn form() -> ProfileForm {
        ProfileForm {
            given_name: " Ada ".into(),
            family_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            weight: "60,5".into(),
            height: "165".into(),
            unit_system: UnitSystem::Metric,
        }
    }

    #[test]
    fn builds_trimmed_profile() {
        let p = form().build(None, now()).unwrap();
        assert_eq!(p.full_name(), "Ada Lovelace");
        assert_eq!(p.initials(), "AL");
        assert_eq!(p.weight_kg, Some(60.5));
        assert_eq!(p.bmi_category(), Some(BmiCategory::Normal));
        assert_eq!(p.display_weight().as_deref(), Some("60.5 kg"));
    }

    #[test]
    fn first_problem_wins() {
        let mut f = form();
        f.given_name = "  ".into();
        f.email = "nope".into();
        assert_eq!(f.build(None, now()), Err(ValidationError::MissingFirstName));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@example.c"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(is_valid_email("x_y%z@sub-domain.example.IO"));
        assert!(!is_valid_email("a@example.c0m"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("ada@example.com\n"));
    }

    #[test]
    fn measurements_must_be_positive_numbers() {
        let mut f = form();
        f.weight = "".into();
        assert_eq!(f.build(None, now()), Err(ValidationError::MissingWeight));
        f.weight = "-3".into();
        assert_eq!(f.build(None, now()), Err(ValidationError::InvalidWeight));
        f.weight = "70".into();
        f.height = "tall".into();
        let err = f.build(None, now()).unwrap_err();
        assert_eq!(err.field(), "height");
        assert_eq!(err.to_string(), "Height must be a positive number.");
    }

    #[test]
    fn imperial_input_is_stored_metric() {
        let mut f = form();
        f.unit_system = UnitSystem::Imperial;
        f.weight = "100".into();
        f.height = "70".into();
        let p = f.build(None, now()).unwrap();
        assert!((p.weight_kg.unwrap() - 45.359237).abs() < 1e-9);
        assert!((p.height_cm.unwrap() - 177.8).abs() < 1e-9);
    }

    #[test]
    fn switching_units_converts_typed_values() {
        let mut f = form();
        f.weight = "100".into();
        f.height = "254".into();
        f.set_unit_system(UnitSystem::Imperial);
        assert_eq!(f.weight, "220.5");
        assert_eq!(f.height, "100");
    }

    #[test]
    fn bmi_boundaries() {
        assert_eq!(BmiCategory::from_bmi(18.4), Some(BmiCategory::Underweight));
        assert_eq!(BmiCategory::from_bmi(18.5), Some(BmiCategory::Normal));
        assert_eq!(BmiCategory::from_bmi(25.0), Some(BmiCategory::Overweight));
        assert_eq!(BmiCategory::from_bmi(30.0), Some(BmiCategory::Obese));
    }

    #[test]
    fn book_keeps_id_across_saves() {
        let store: Rc<dyn Store> = Rc::new(MemoryStore::new());
        let mut book = ProfileBook::new(store.clone());
        assert!(book.profile().is_none());
        let id = book.save(&form(), now()).unwrap().id;

        let mut reopened = ProfileBook::new(store);
        let mut edit = reopened.form();
        assert_eq!(edit.weight, "60.5");
        edit.email = "ada@lovelace.dev".into();
        let saved = reopened.save(&edit, now()).unwrap();
        assert_eq!(saved.id, id);
        assert_eq!(saved.email, "ada@lovelace.dev");
    }

    #[test]
    fn invalid_form_is_not_saved() {
        let store = Rc::new(MemoryStore::new());
        let mut book = ProfileBook::new(store.clone());
        let mut f = form();
        f.email = "broken".into();
        assert_eq!(book.save(&f, now()).unwrap_err(), ValidationError::InvalidEmail);
        assert!(!store.contains(keys::PROFILE));
    }
}
