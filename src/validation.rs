//! Validation of user-entered generation parameters

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::GenerationParams;

/// Raw values as typed into the parameter inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterForm {
    pub num_ctx: String,
    pub temperature: String,
    pub repeat_last_n: String,
    pub repeat_penalty: String,
    pub doc_count: String,
}

impl Default for ParameterForm {
    fn default() -> Self {
        Self {
            num_ctx: "2048".to_string(),
            temperature: "0.8".to_string(),
            repeat_last_n: "64".to_string(),
            repeat_penalty: "1.1".to_string(),
            doc_count: "3".to_string(),
        }
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// One message per violated constraint, in field order
    pub errors: Vec<String>,
    /// Parsed parameters, present only when every check passed
    pub params: Option<GenerationParams>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The parsed parameters, or every violation as `ClientError::Validation`
    pub fn into_result(self) -> Result<GenerationParams> {
        match self.params {
            Some(params) if self.errors.is_empty() => Ok(params),
            _ => Err(ClientError::Validation(self.errors)),
        }
    }
}

const CONTEXT_SIZE_ERROR: &str = "Context Size must be between 1 and 4096.";
const TEMPERATURE_ERROR: &str = "Temperature must be between 0 and 2.";
const REPEAT_LAST_N_ERROR: &str = "Repeat Last N must be between 1 and 1024.";
const REPEAT_PENALTY_ERROR: &str = "Repeat Penalty must be between 1 and 2.";
const DOC_COUNT_ERROR: &str = "The number of document chunks to retrieve must be between 1 and 10.";

/// Check every parameter and report all violations.
///
/// The document count only matters in RAG mode: when `rag_enabled` is false
/// it is neither checked nor carried into the parameters.
pub fn validate(form: &ParameterForm, rag_enabled: bool) -> ValidationReport {
    let mut errors = Vec::new();

    let num_ctx = check(parse_integer(&form.num_ctx, 1, 4096), CONTEXT_SIZE_ERROR, &mut errors);
    let temperature = check(parse_number(&form.temperature, 0.0, 2.0), TEMPERATURE_ERROR, &mut errors);
    let repeat_last_n = check(parse_integer(&form.repeat_last_n, 1, 1024), REPEAT_LAST_N_ERROR, &mut errors);
    let repeat_penalty = check(parse_number(&form.repeat_penalty, 1.0, 2.0), REPEAT_PENALTY_ERROR, &mut errors);
    let top_n = if rag_enabled {
        check(parse_integer(&form.doc_count, 1, 10), DOC_COUNT_ERROR, &mut errors).map(Some)
    } else {
        Some(None)
    };

    let params = match (num_ctx, temperature, repeat_last_n, repeat_penalty, top_n) {
        (Some(num_ctx), Some(temperature), Some(repeat_last_n), Some(repeat_penalty), Some(top_n))
            if errors.is_empty() =>
        {
            Some(GenerationParams {
                num_ctx,
                temperature,
                repeat_last_n,
                repeat_penalty,
                top_n,
            })
        }
        _ => None,
    };

    ValidationReport { errors, params }
}

fn check<T>(value: Option<T>, message: &str, errors: &mut Vec<String>) -> Option<T> {
    if value.is_none() {
        errors.push(message.to_string());
    }
    value
}

fn parse_integer(raw: &str, min: u32, max: u32) -> Option<u32> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| (i64::from(min)..=i64::from(max)).contains(v))
        .and_then(|v| u32::try_from(v).ok())
}

fn parse_number(raw: &str, min: f64, max: f64) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form_with(edit: impl FnOnce(&mut ParameterForm)) -> ParameterForm {
        let mut form = ParameterForm::default();
        edit(&mut form);
        form
    }

    #[test]
    fn test_defaults_are_valid() {
        let report = validate(&ParameterForm::default(), false);
        assert!(report.is_valid());
        assert_eq!(
            report.params,
            Some(GenerationParams {
                num_ctx: 2048,
                temperature: 0.8,
                repeat_last_n: 64,
                repeat_penalty: 1.1,
                top_n: None,
            })
        );
    }

    #[test]
    fn test_context_size_boundaries() {
        for (value, valid) in [("0", false), ("1", true), ("4096", true), ("4097", false)] {
            let report = validate(&form_with(|f| f.num_ctx = value.to_string()), false);
            assert_eq!(report.is_valid(), valid, "num_ctx = {}", value);
        }
    }

    #[test]
    fn test_temperature_boundaries() {
        for (value, valid) in [("-0.1", false), ("0", true), ("2", true), ("2.01", false)] {
            let report = validate(&form_with(|f| f.temperature = value.to_string()), false);
            assert_eq!(report.is_valid(), valid, "temperature = {}", value);
        }
    }

    #[test]
    fn test_repeat_last_n_boundaries() {
        for (value, valid) in [("0", false), ("1", true), ("1024", true), ("1025", false)] {
            let report = validate(&form_with(|f| f.repeat_last_n = value.to_string()), false);
            assert_eq!(report.is_valid(), valid, "repeat_last_n = {}", value);
        }
    }

    #[test]
    fn test_repeat_penalty_boundaries() {
        for (value, valid) in [("0.99", false), ("1", true), ("2", true), ("2.5", false)] {
            let report = validate(&form_with(|f| f.repeat_penalty = value.to_string()), false);
            assert_eq!(report.is_valid(), valid, "repeat_penalty = {}", value);
        }
    }

    #[test]
    fn test_doc_count_only_checked_in_rag_mode() {
        let form = form_with(|f| f.doc_count = "11".to_string());
        assert!(validate(&form, false).is_valid());
        assert_eq!(validate(&form, false).params.unwrap().top_n, None);

        let report = validate(&form, true);
        assert!(!report.is_valid());
        assert_eq!(report.errors, vec![DOC_COUNT_ERROR.to_string()]);

        for (value, valid) in [("0", false), ("1", true), ("10", true)] {
            let report = validate(&form_with(|f| f.doc_count = value.to_string()), true);
            assert_eq!(report.is_valid(), valid, "doc_count = {}", value);
        }
        let report = validate(&form_with(|f| f.doc_count = "10".to_string()), true);
        assert_eq!(report.params.unwrap().top_n, Some(10));
    }

    #[test]
    fn test_all_failures_reported_in_order() {
        let form = ParameterForm {
            num_ctx: "abc".to_string(),
            temperature: "NaN".to_string(),
            repeat_last_n: "1.5".to_string(),
            repeat_penalty: "".to_string(),
            doc_count: "-1".to_string(),
        };
        let report = validate(&form, true);
        assert_eq!(
            report.errors,
            vec![
                CONTEXT_SIZE_ERROR.to_string(),
                TEMPERATURE_ERROR.to_string(),
                REPEAT_LAST_N_ERROR.to_string(),
                REPEAT_PENALTY_ERROR.to_string(),
                DOC_COUNT_ERROR.to_string(),
            ]
        );
        assert!(report.params.is_none());
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        let report = validate(&form_with(|f| f.num_ctx = " 512 ".to_string()), false);
        assert_eq!(report.params.unwrap().num_ctx, 512);
    }

    #[test]
    fn test_into_result_carries_every_violation() {
        let form = form_with(|f| {
            f.num_ctx = "0".to_string();
            f.repeat_penalty = "3".to_string();
        });
        match validate(&form, false).into_result() {
            Err(ClientError::Validation(errors)) => {
                assert_eq!(errors, vec![CONTEXT_SIZE_ERROR.to_string(), REPEAT_PENALTY_ERROR.to_string()]);
            }
            other => panic!("unexpected result {:?}", other),
        }

        let params = validate(&ParameterForm::default(), true).into_result().unwrap();
        assert_eq!(params.top_n, Some(3));
    }
}
