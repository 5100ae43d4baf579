use crate::error::{PartlineError, PartlineResult};
use regex::Regex;
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> PartlineResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(PartlineError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("required") => {
                    format!("Field '{}' is required", field)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.join(", ")
}

/// Validates a root part number before any remote call is made.
pub fn validate_part_number(part_number: &str) -> PartlineResult<()> {
    let part_regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,99}$").unwrap();

    if !part_regex.is_match(part_number.trim()) {
        return Err(PartlineError::validation(
            "part_number",
            "Invalid part number. Expected alphanumerics with '.', '_' or '-' separators",
        ));
    }

    Ok(())
}

/// Relations reports are depth-capped to a small window for interactive use.
pub fn validate_relations_depth(max_levels: u32) -> PartlineResult<()> {
    if !(1..=3).contains(&max_levels) {
        return Err(PartlineError::validation(
            "max_levels",
            format!("maxLevels {} out of range, expected 1 to 3", max_levels),
        ));
    }

    Ok(())
}
