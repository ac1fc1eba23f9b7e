//! Letters-only validation for topics and message bodies
//!
//! Both fields are required and restricted to ASCII letters. Violations are
//! collected per field so the caller can report all of them at once.

use std::fmt;

/// Form field name carrying the message body
pub const MSG_FIELD: &str = "msg";
/// Path segment naming the topic
pub const TOPIC_FIELD: &str = "topic";

/// Why a single field was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Field was empty
    Missing,
    /// Field contained something other than ASCII letters
    NotAlpha(String),
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            Violation::Missing => write!(f, "{}: non zero value required", self.field),
            Violation::NotAlpha(value) => {
                write!(f, "{}: {} does not validate as alpha", self.field, value)
            }
        }
    }
}

/// Publish or subscribe input rejected before any bus interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Violated fields, `topic` first
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Names of the violated fields
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn check(field: &'static str, value: &str) -> Option<FieldViolation> {
    let violation = if value.is_empty() {
        Violation::Missing
    } else if !value.chars().all(|c| c.is_ascii_alphabetic()) {
        Violation::NotAlpha(value.to_string())
    } else {
        return None;
    };
    Some(FieldViolation { field, violation })
}

/// Validate a topic name on its own (used before subscribing)
pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    match check(TOPIC_FIELD, topic) {
        None => Ok(()),
        Some(violation) => Err(ValidationError {
            violations: vec![violation],
        }),
    }
}

/// Validate a topic and message body pair (used before publishing)
pub fn validate_message(topic: &str, body: &str) -> Result<(), ValidationError> {
    let violations: Vec<_> = [check(TOPIC_FIELD, topic), check(MSG_FIELD, body)]
        .into_iter()
        .flatten()
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_only() {
        assert!(validate_message("news", "hello").is_ok());
        assert!(validate_message("News", "HelloWorld").is_ok());
        assert!(validate_topic("weather").is_ok());
    }

    #[test]
    fn rejects_empty_body() {
        let err = validate_message("news", "").unwrap_err();
        assert_eq!(err.fields(), vec![MSG_FIELD]);
        assert_eq!(err.violations()[0].violation, Violation::Missing);
    }

    #[test]
    fn rejects_non_letters() {
        for body in ["hello world", "abc1", "héllo", "a-b", "a\nb"] {
            let err = validate_message("news", body).unwrap_err();
            assert_eq!(err.fields(), vec![MSG_FIELD], "body {body:?}");
        }

        for topic in ["news.sports", "news*", "news>", "a b"] {
            assert!(validate_topic(topic).is_err(), "topic {topic:?}");
        }
    }

    #[test]
    fn reports_every_violated_field_topic_first() {
        let err = validate_message("top1c", "").unwrap_err();
        assert_eq!(err.fields(), vec![TOPIC_FIELD, MSG_FIELD]);
        assert_eq!(
            err.to_string(),
            "topic: top1c does not validate as alpha;msg: non zero value required"
        );
    }
}
