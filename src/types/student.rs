//! Student attributes collected by the form
//!
//! A submission travels through three shapes: the raw HTML form
//! ([`StudentForm`], every field a possibly-blank string), the typed
//! submission ([`StudentSubmission`], every field optional, also the JSON API
//! body) and the validated [`StudentProfile`] that is safe to hand to the row
//! builder.

use crate::error::SubmissionError;
use crate::feature_row::InputValues;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Course the grades belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Portuguese,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::Math, Subject::Portuguese];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Portuguese => "Portuguese",
        }
    }
}

impl FromStr for Subject {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or(())
    }
}

/// Yes/no support flag, encoded the way the training data spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

impl FromStr for YesNo {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(YesNo::Yes),
            "no" => Ok(YesNo::No),
            _ => Err(()),
        }
    }
}

/// Inclusive bounds for the numeric fields
pub mod bounds {
    pub const AGE: (i64, i64) = (10, 25);
    pub const FAILURES: (i64, i64) = (0, 3);
    pub const ABSENCES: (i64, i64) = (0, 100);
    pub const STUDYTIME: (i64, i64) = (1, 4);
    pub const GRADE: (i64, i64) = (0, 20);
}

/// Raw urlencoded form body; blank inputs arrive as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentForm {
    pub age: Option<String>,
    pub subject: Option<String>,
    pub failures: Option<String>,
    pub absences: Option<String>,
    pub studytime: Option<String>,
    pub schoolsup: Option<String>,
    pub famsup: Option<String>,
    pub internet: Option<String>,
    pub higher: Option<String>,
    pub grade1: Option<String>,
    pub grade2: Option<String>,
}

/// Typed submission with every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentSubmission {
    pub age: Option<i64>,
    pub subject: Option<Subject>,
    pub failures: Option<i64>,
    pub absences: Option<i64>,
    pub studytime: Option<i64>,
    pub schoolsup: Option<YesNo>,
    pub famsup: Option<YesNo>,
    pub internet: Option<YesNo>,
    pub higher: Option<YesNo>,
    #[serde(alias = "G1")]
    pub grade1: Option<i64>,
    #[serde(alias = "G2")]
    pub grade2: Option<i64>,
}

/// Fully validated student attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentProfile {
    pub age: u8,
    pub subject: Subject,
    pub failures: u8,
    pub absences: u8,
    pub studytime: u8,
    pub schoolsup: YesNo,
    pub famsup: YesNo,
    pub internet: YesNo,
    pub higher: YesNo,
    pub grade1: u8,
    pub grade2: u8,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_field<T: FromStr>(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<T>, SubmissionError> {
    match blank_to_none(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| SubmissionError::InvalidField {
                field,
                reason: format!("cannot parse {:?}", raw),
            }),
    }
}

impl StudentForm {
    /// Parse the raw strings. Blank fields become `None`; text that does not
    /// parse is rejected.
    pub fn into_submission(self) -> Result<StudentSubmission, SubmissionError> {
        Ok(StudentSubmission {
            age: parse_field("age", self.age)?,
            subject: parse_field("subject", self.subject)?,
            failures: parse_field("failures", self.failures)?,
            absences: parse_field("absences", self.absences)?,
            studytime: parse_field("studytime", self.studytime)?,
            schoolsup: parse_field("schoolsup", self.schoolsup)?,
            famsup: parse_field("famsup", self.famsup)?,
            internet: parse_field("internet", self.internet)?,
            higher: parse_field("higher", self.higher)?,
            grade1: parse_field("grade1", self.grade1)?,
            grade2: parse_field("grade2", self.grade2)?,
        })
    }
}

fn check_range(
    field: &'static str,
    value: i64,
    (min, max): (i64, i64),
) -> Result<u8, SubmissionError> {
    if (min..=max).contains(&value) {
        // bounds all fit in u8
        Ok(value as u8)
    } else {
        Err(SubmissionError::InvalidField {
            field,
            reason: format!("{} is outside {}..={}", value, min, max),
        })
    }
}

impl StudentSubmission {
    /// Names of the fields that are still unset, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks: [(&'static str, bool); 11] = [
            ("age", self.age.is_none()),
            ("subject", self.subject.is_none()),
            ("failures", self.failures.is_none()),
            ("absences", self.absences.is_none()),
            ("studytime", self.studytime.is_none()),
            ("schoolsup", self.schoolsup.is_none()),
            ("famsup", self.famsup.is_none()),
            ("internet", self.internet.is_none()),
            ("higher", self.higher.is_none()),
            ("grade1", self.grade1.is_none()),
            ("grade2", self.grade2.is_none()),
        ];
        checks
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(field, _)| field)
            .collect()
    }

    /// Require every field and check ranges.
    pub fn validate(&self) -> Result<StudentProfile, SubmissionError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SubmissionError::MissingFields(missing));
        }

        match (
            self.age,
            self.subject,
            self.failures,
            self.absences,
            self.studytime,
            self.schoolsup,
            self.famsup,
            self.internet,
            self.higher,
            self.grade1,
            self.grade2,
        ) {
            (
                Some(age),
                Some(subject),
                Some(failures),
                Some(absences),
                Some(studytime),
                Some(schoolsup),
                Some(famsup),
                Some(internet),
                Some(higher),
                Some(grade1),
                Some(grade2),
            ) => Ok(StudentProfile {
                age: check_range("age", age, bounds::AGE)?,
                subject,
                failures: check_range("failures", failures, bounds::FAILURES)?,
                absences: check_range("absences", absences, bounds::ABSENCES)?,
                studytime: check_range("studytime", studytime, bounds::STUDYTIME)?,
                schoolsup,
                famsup,
                internet,
                higher,
                grade1: check_range("grade1", grade1, bounds::GRADE)?,
                grade2: check_range("grade2", grade2, bounds::GRADE)?,
            }),
            _ => Err(SubmissionError::MissingFields(self.missing_fields())),
        }
    }
}

impl StudentProfile {
    /// Values keyed by the template column each field writes to.
    pub fn to_input_values(&self) -> InputValues {
        let mut values = InputValues::new();
        values.insert("age", self.age);
        values.insert("subject", self.subject.as_str());
        values.insert("failures", self.failures);
        values.insert("absences", self.absences);
        values.insert("studytime", self.studytime);
        values.insert("schoolsup", self.schoolsup.as_str());
        values.insert("famsup", self.famsup.as_str());
        values.insert("internet", self.internet.as_str());
        values.insert("higher", self.higher.as_str());
        values.insert("G1", self.grade1);
        values.insert("G2", self.grade2);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_row::FeatureValue;

    fn complete_form() -> StudentForm {
        StudentForm {
            age: Some("17".into()),
            subject: Some("Math".into()),
            failures: Some("1".into()),
            absences: Some("6".into()),
            studytime: Some("2".into()),
            schoolsup: Some("no".into()),
            famsup: Some("yes".into()),
            internet: Some("yes".into()),
            higher: Some("yes".into()),
            grade1: Some("9".into()),
            grade2: Some("8".into()),
        }
    }

    #[test]
    fn test_complete_form_validates() {
        let profile = complete_form().into_submission().unwrap().validate().unwrap();

        assert_eq!(profile.age, 17);
        assert_eq!(profile.subject, Subject::Math);
        assert_eq!(profile.famsup, YesNo::Yes);
        assert_eq!(profile.grade2, 8);
    }

    #[test]
    fn test_blank_fields_are_missing() {
        let mut form = complete_form();
        form.age = Some(String::new());
        form.grade2 = None;
        form.internet = Some("   ".into());

        let err = form.into_submission().unwrap().validate().unwrap_err();

        assert_eq!(
            err,
            SubmissionError::MissingFields(vec!["age", "internet", "grade2"])
        );
    }

    #[test]
    fn test_unparsable_field_rejected() {
        let mut form = complete_form();
        form.subject = Some("History".into());

        let err = form.into_submission().unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidField { field: "subject", .. }));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut submission = complete_form().into_submission().unwrap();
        submission.age = Some(9);
        assert!(matches!(
            submission.validate(),
            Err(SubmissionError::InvalidField { field: "age", .. })
        ));

        submission.age = Some(25);
        submission.grade1 = Some(21);
        assert!(matches!(
            submission.validate(),
            Err(SubmissionError::InvalidField { field: "grade1", .. })
        ));
    }

    #[test]
    fn test_input_values_use_template_columns() {
        let profile = complete_form().into_submission().unwrap().validate().unwrap();
        let values = profile.to_input_values();

        assert_eq!(values.len(), 11);
        assert_eq!(values.get("G1"), Some(&FeatureValue::Integer(9)));
        assert_eq!(values.get("subject"), Some(&FeatureValue::from("Math")));
        assert_eq!(values.get("schoolsup"), Some(&FeatureValue::from("no")));
        assert!(values.get("grade1").is_none());
    }

    #[test]
    fn test_submission_json_accepts_grade_aliases() {
        let json =
            r#"{"age": 16, "subject": "Portuguese", "G1": 12, "grade2": 13, "higher": "no"}"#;
        let submission: StudentSubmission = serde_json::from_str(json).unwrap();

        assert_eq!(submission.grade1, Some(12));
        assert_eq!(submission.grade2, Some(13));
        assert_eq!(submission.subject, Some(Subject::Portuguese));
        assert_eq!(submission.higher, Some(YesNo::No));
        assert!(submission.missing_fields().contains(&"failures"));
    }
}
