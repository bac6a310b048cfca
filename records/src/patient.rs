//! Patient records and intake validation.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const FIELD_FULL_NAME: &str = "fullName";
pub const FIELD_AGE: &str = "age";
pub const FIELD_GENDER: &str = "gender";
pub const FIELD_CONTACT_NUMBER: &str = "contactNumber";
pub const FIELD_EMAIL: &str = "email";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Raw intake form fields, all strings as entered. `age` stays a numeric
/// string end to end; the stored record carries it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientIntake {
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub medical_history: String,
    pub contact_number: String,
    pub email: String,
}

/// Field-keyed validation failures, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    fn insert(&mut self, field: &'static str, message: &str) {
        self.errors.insert(field, message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Validates an intake synchronously. On failure nothing may be sent over
/// the network; the caller surfaces the per-field messages instead.
pub fn validate(intake: &PatientIntake) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if intake.full_name.trim().is_empty() {
        errors.insert(FIELD_FULL_NAME, "Full name is required");
    }

    if intake.age.trim().is_empty() {
        errors.insert(FIELD_AGE, "Age is required");
    } else {
        match intake.age.trim().parse::<f64>() {
            Ok(age) if age.is_finite() && age > 0.0 => {}
            _ => errors.insert(FIELD_AGE, "Age must be a valid number"),
        }
    }

    if Gender::from_str(&intake.gender).is_err() {
        errors.insert(FIELD_GENDER, "Gender is required");
    }

    if !intake.contact_number.is_empty() && !is_valid_contact(&intake.contact_number) {
        errors.insert(
            FIELD_CONTACT_NUMBER,
            "Please enter a valid 10-digit contact number",
        );
    }

    if !intake.email.is_empty() && !is_valid_email(&intake.email) {
        errors.insert(FIELD_EMAIL, "Email is invalid");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_valid_contact(number: &str) -> bool {
    number.len() == 10 && number.bytes().all(|byte| byte.is_ascii_digit())
}

// Deliberately loose: `local@domain.tld` with no whitespace. Full RFC 5322
// acceptance is not the point of a screening intake form.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    matches!(domain.rsplit_once('.'), Some((host, tld)) if !host.is_empty() && !tld.is_empty())
}

/// A persisted patient. Immutable once created; `createdAt` is stamped by
/// the server and never carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub patient_id: String,
    pub full_name: String,
    pub age: String,
    pub gender: Gender,
    pub medical_history: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub user_id: String,
}

impl PatientRecord {
    /// Builds a record from a validated intake. Fails with the same
    /// field-keyed map as [`validate`].
    pub fn from_intake(
        intake: &PatientIntake,
        patient_id: String,
        user_id: String,
    ) -> Result<Self, ValidationErrors> {
        validate(intake)?;

        let gender = Gender::from_str(&intake.gender).map_err(|()| {
            let mut errors = ValidationErrors::default();
            errors.insert(FIELD_GENDER, "Gender is required");
            errors
        })?;

        let optional = |value: &str| {
            if value.is_empty() { None } else { Some(value.to_string()) }
        };

        Ok(Self {
            patient_id,
            full_name: intake.full_name.trim().to_string(),
            age: intake.age.trim().to_string(),
            gender,
            medical_history: intake.medical_history.clone(),
            contact_number: optional(&intake.contact_number),
            email: optional(&intake.email),
            user_id,
        })
    }
}
