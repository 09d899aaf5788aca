// Bookyard
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic data types shared by all services.
//!
//! Services should define their own `model` module with the high-level types of their domain and
//! validate all untrusted values at construction time, returning `ModelError` when they are not
//! acceptable.

mod emailaddress;
pub use emailaddress::EmailAddress;

/// Model errors.  These represent values that fail validation.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Validates that the untrusted string `s` is not blank and fits in `max_length` characters.
///
/// `what` names the value for the error messages.  Returns the string unmodified.
pub fn validate_text<S: Into<String>>(what: &str, s: S, max_length: usize) -> ModelResult<String> {
    let s = s.into();
    if s.trim().is_empty() {
        return Err(ModelError(format!("{} cannot be empty", what)));
    }
    if s.chars().count() > max_length {
        return Err(ModelError(format!("{} is too long (max {} characters)", what, max_length)));
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_ok() {
        assert_eq!("a", validate_text("Name", "a", 1).unwrap());
        assert_eq!(" Dune ", validate_text("Title", " Dune ", 10).unwrap());
        assert_eq!("ñññ", validate_text("Name", "ñññ", 3).unwrap());
    }

    #[test]
    fn test_validate_text_empty() {
        assert_eq!(
            ModelError("Title cannot be empty".to_owned()),
            validate_text("Title", "", 10).unwrap_err()
        );
        assert_eq!(
            ModelError("Title cannot be empty".to_owned()),
            validate_text("Title", "  \t", 10).unwrap_err()
        );
    }

    #[test]
    fn test_validate_text_too_long() {
        assert_eq!(
            ModelError("Author is too long (max 3 characters)".to_owned()),
            validate_text("Author", "abcd", 3).unwrap_err()
        );
    }
}
