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

//! High-level data types.

use bookyard_core::model::{validate_text, ModelError, ModelResult};
pub(crate) use bookyard_core::model::EmailAddress;
use derive_getters::Getters;
use derive_more::{Constructor, Display};
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Version of the API as reported by the health endpoint.
pub(crate) const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Greeting returned by the root endpoint.
pub(crate) const WELCOME_MESSAGE: &str = "Welcome to Bookyard API";

/// Maximum length of a book title per the schema.
pub(crate) const MAX_TITLE_LENGTH: usize = 256;

/// Maximum length of a book author per the schema.
pub(crate) const MAX_AUTHOR_LENGTH: usize = 128;

/// Maximum length of an ISBN as typed by the user, including separators, per the schema.
pub(crate) const MAX_ISBN_LENGTH: usize = 32;

/// Maximum length of a profile name per the schema.
pub(crate) const MAX_NAME_LENGTH: usize = 128;

/// Maximum length of a reservation note per the schema.
pub(crate) const MAX_NOTE_LENGTH: usize = 1024;

/// Generates a newtype over a `Uuid` to identify one kind of entity.
macro_rules! id_type [
    ( $(#[$meta:meta])* $name:ident ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[derive(Serialize)]
        #[serde(transparent)]
        pub(crate) struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier.
            pub(crate) fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the raw UUID backing this identifier.
            pub(crate) fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    }
];

id_type!(
    /// Identifier of a book.
    BookId
);

id_type!(
    /// Identifier of a profile.
    ProfileId
);

id_type!(
    /// Identifier of a reservation.
    ReservationId
);

/// Generates a newtype over a `String` that is validated at construction time by `$validate`,
/// and whose deserialization goes through the same validation.
macro_rules! validated_string [
    ( $(#[$meta:meta])* $name:ident, $expecting:literal, $validate:expr ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Serialize)]
        #[serde(transparent)]
        pub(crate) struct $name(String);

        impl $name {
            /// Creates a new value from an untrusted string `s`, making sure it is valid.
            pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
                let validate: fn(String) -> ModelResult<String> = $validate;
                validate(s.into()).map(Self)
            }

            /// Returns a string view of the value.
            pub(crate) fn as_str(&self) -> &str {
                &self.0
            }
        }

        #[cfg(test)]
        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw).expect("Hardcoded values for testing must be valid")
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                /// Visitor to deserialize the value from a string.
                struct ValueVisitor;

                impl Visitor<'_> for ValueVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str($expecting)
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        $name::new(v).map_err(|e| E::custom(format!("{}", e)))
                    }

                    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        $name::new(v).map_err(|e| E::custom(format!("{}", e)))
                    }
                }

                deserializer.deserialize_string(ValueVisitor)
            }
        }
    }
];

validated_string!(
    /// The title of a book.
    Title,
    "a book title",
    |s| validate_text("Title", s, MAX_TITLE_LENGTH)
);

validated_string!(
    /// The author of a book.
    Author,
    "a book author",
    |s| validate_text("Author", s, MAX_AUTHOR_LENGTH)
);

validated_string!(
    /// An ISBN-10 or ISBN-13 code, as typed by the user.
    ///
    /// Hyphens and spaces are accepted as separators and are preserved.
    Isbn,
    "an ISBN-10 or ISBN-13 code",
    validate_isbn
);

validated_string!(
    /// The display name of a profile.
    PersonName,
    "a person name",
    |s| validate_text("Name", s, MAX_NAME_LENGTH)
);

validated_string!(
    /// A free-form note attached to a reservation.
    Note,
    "a reservation note",
    |s| validate_text("Note", s, MAX_NOTE_LENGTH)
);

/// Validates that `s` is an ISBN-10 or ISBN-13 code once separators are discarded.
fn validate_isbn(s: String) -> ModelResult<String> {
    if s.len() > MAX_ISBN_LENGTH {
        return Err(ModelError("ISBN is too long".to_owned()));
    }

    let chars = s.chars().filter(|c| *c != '-' && *c != ' ').collect::<Vec<char>>();
    let valid = match chars.len() {
        10 => {
            chars[..9].iter().all(char::is_ascii_digit)
                && (chars[9].is_ascii_digit() || chars[9] == 'X' || chars[9] == 'x')
        }
        13 => chars.iter().all(char::is_ascii_digit),
        _ => false,
    };
    if !valid {
        return Err(ModelError(format!("ISBN must have 10 or 13 digits '{}'", s)));
    }
    Ok(s)
}

/// User-provided contents of a book.
#[derive(Clone, Constructor, Deserialize, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct BookFields {
    /// Title of the book.
    title: Title,

    /// Author of the book.
    author: Author,

    /// ISBN code of the book, if known.
    #[serde(default)]
    isbn: Option<Isbn>,
}

/// A book known to the service.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Book {
    /// Server-assigned identifier.
    id: BookId,

    /// User-provided contents.
    #[serde(flatten)]
    fields: BookFields,
}

/// User-provided contents of a profile.
#[derive(Clone, Constructor, Deserialize, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct ProfileFields {
    /// Display name of the person.
    name: PersonName,

    /// Contact address of the person.  Unique across profiles.
    email: EmailAddress,
}

/// A profile of a person who can reserve books.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Profile {
    /// Server-assigned identifier.
    id: ProfileId,

    /// User-provided contents.
    #[serde(flatten)]
    fields: ProfileFields,
}

/// User-provided contents of a reservation.
#[derive(Clone, Constructor, Deserialize, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct ReservationFields {
    /// The reserved book.
    book_id: BookId,

    /// The profile holding the reservation.
    profile_id: ProfileId,

    /// Optional note attached to the reservation.
    #[serde(default)]
    note: Option<Note>,
}

/// A reservation of a book by a profile.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Reservation {
    /// Server-assigned identifier.
    id: ReservationId,

    /// User-provided contents.
    #[serde(flatten)]
    fields: ReservationFields,

    /// Server-assigned creation time.  Preserved across updates.
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
}

/// Liveness states reported by the health endpoint.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum HealthState {
    /// The process is up and serving requests.
    Healthy,
}

/// Response of the health endpoint.
#[derive(Constructor, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct HealthStatus {
    /// Liveness state.
    status: HealthState,

    /// Time at which the check was served.
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,

    /// Version of the API.
    version: String,
}

/// A plain informational message.
#[derive(Constructor, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct Message {
    /// Text of the message.
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{assert_de_tokens_error, assert_tokens, Token};
    use time::macros::datetime;

    #[test]
    fn test_title_ok() {
        assert_eq!("Dune", Title::new("Dune").unwrap().as_str());
        let long = "x".repeat(MAX_TITLE_LENGTH);
        assert_eq!(long, Title::new(long.clone()).unwrap().as_str());
    }

    #[test]
    fn test_title_error() {
        assert_eq!(ModelError("Title cannot be empty".to_owned()), Title::new(" ").unwrap_err());
        assert!(Title::new("x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_author_and_name_limits() {
        assert!(Author::new("x".repeat(MAX_AUTHOR_LENGTH)).is_ok());
        assert!(Author::new("x".repeat(MAX_AUTHOR_LENGTH + 1)).is_err());
        assert!(PersonName::new("x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(PersonName::new("x".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(Note::new("x".repeat(MAX_NOTE_LENGTH)).is_ok());
        assert!(Note::new("x".repeat(MAX_NOTE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_isbn_ok() {
        assert_eq!("0441172717", Isbn::new("0441172717").unwrap().as_str());
        assert_eq!("0-441-17271-7", Isbn::new("0-441-17271-7").unwrap().as_str());
        assert_eq!("080442957X", Isbn::new("080442957X").unwrap().as_str());
        assert_eq!("978 0 441 17271 9", Isbn::new("978 0 441 17271 9").unwrap().as_str());
    }

    #[test]
    fn test_isbn_error() {
        assert!(Isbn::new("").is_err());
        assert!(Isbn::new("12345").is_err());
        assert!(Isbn::new("X441172717").is_err());
        assert!(Isbn::new("978044117271X").is_err());
        assert!(Isbn::new("97804411727190").is_err());
        assert!(Isbn::new("0-4-4-1-1-7-2-7-1-7-------------------").is_err());
    }

    #[test]
    fn test_title_ser_de() {
        assert_tokens(&Title::from("Dune"), &[Token::String("Dune")]);
        assert_de_tokens_error::<Title>(&[Token::String("")], "Title cannot be empty");
    }

    #[test]
    fn test_bookid_ser_de() {
        let id = BookId::from(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(r#""00000000-0000-0000-0000-000000000000""#, json);
        assert_eq!(id, serde_json::from_str::<BookId>(&json).unwrap());
    }

    #[test]
    fn test_ids_are_random() {
        assert_ne!(BookId::new_random(), BookId::new_random());
    }

    #[test]
    fn test_book_json() {
        let book = Book::new(
            BookId::from(Uuid::nil()),
            BookFields::new(Title::from("Dune"), Author::from("Herbert"), None),
        );
        assert_eq!(
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "title": "Dune",
                "author": "Herbert",
                "isbn": null,
            }),
            serde_json::to_value(&book).unwrap()
        );
    }

    #[test]
    fn test_book_fields_isbn_is_optional() {
        let fields: BookFields =
            serde_json::from_str(r#"{"title": "Dune", "author": "Herbert"}"#).unwrap();
        assert_eq!(BookFields::new(Title::from("Dune"), Author::from("Herbert"), None), fields);
    }

    #[test]
    fn test_book_fields_validation_names_field() {
        let err = serde_json::from_str::<BookFields>(r#"{"title": "", "author": "Herbert"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Title cannot be empty"));
    }

    #[test]
    fn test_reservation_json() {
        let reservation = Reservation::new(
            ReservationId::from(Uuid::nil()),
            ReservationFields::new(
                BookId::from(Uuid::nil()),
                ProfileId::from(Uuid::nil()),
                Some(Note::from("Pick up on Monday")),
            ),
            datetime!(2023-12-01 10:15:00 UTC),
        );
        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!("2023-12-01T10:15:00Z", json["created"]);
        assert_eq!("Pick up on Monday", json["note"]);

        let reservation2: Reservation = serde_json::from_value(json).unwrap();
        assert_eq!(reservation, reservation2);
    }

    #[test]
    fn test_health_status_json() {
        let status = HealthStatus::new(
            HealthState::Healthy,
            datetime!(2023-12-01 10:15:00 UTC),
            API_VERSION.to_owned(),
        );
        assert_eq!(
            serde_json::json!({
                "status": "healthy",
                "timestamp": "2023-12-01T10:15:00Z",
                "version": "0.1.0",
            }),
            serde_json::to_value(&status).unwrap()
        );
    }
}
