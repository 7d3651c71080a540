//! Book submission payloads and their validation.
//!
//! A submission carries the book's scalar fields, explicit author/category/
//! publisher selections, freeform comma-separated text for new authors and
//! categories, an optional inline publisher, and the inline copy collection.
//! Validation produces either a [`BookData`] bundle ready for persistence or
//! field-keyed errors; it never touches the database.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail};

use crate::error::FieldErrors;
use crate::models::book_copy::{AvailabilityStatus, CopyType};

/// Raw book submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,
    pub publication_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicitly selected author ids
    #[serde(default)]
    pub authors: Vec<i32>,
    /// Explicitly selected category ids
    #[serde(default)]
    pub categories: Vec<i32>,
    /// Explicitly selected publisher id
    #[serde(default)]
    pub publisher: Option<i32>,
    /// New authors separated by commas, e.g. "John Doe, Jane Smith"
    #[serde(default)]
    pub new_authors: Option<String>,
    /// New categories separated by commas
    #[serde(default)]
    pub new_categories: Option<String>,
    #[serde(default)]
    pub new_publisher_name: Option<String>,
    #[serde(default)]
    pub new_publisher_address: Option<String>,
    #[serde(default)]
    pub new_publisher_email: Option<String>,
    /// Inline copy collection, saved atomically with the book
    #[serde(default)]
    pub copies: Vec<CopyForm>,
}

/// One entry of the inline copy collection
#[derive(Debug, Deserialize, ToSchema)]
pub struct CopyForm {
    /// Existing copy id; absent for new entries
    #[serde(default)]
    pub id: Option<i32>,
    pub copy_number: i32,
    pub copy_type: String,
    #[serde(default)]
    pub availability_status: Option<String>,
    /// Mark an existing entry for deletion
    #[serde(default)]
    pub delete: bool,
}

/// Validated book submission, ready for the save orchestrator
#[derive(Debug, Clone)]
pub struct BookData {
    pub title: String,
    pub publication_date: NaiveDate,
    pub description: Option<String>,
    pub publisher_id: Option<i32>,
    pub new_publisher: Option<NewPublisher>,
    pub author_ids: Vec<i32>,
    pub new_authors: Vec<AuthorName>,
    pub category_ids: Vec<i32>,
    pub new_categories: Vec<String>,
    pub copies: Vec<CopyChange>,
}

/// Inline publisher to create during the save (never deduplicated)
#[derive(Debug, Clone)]
pub struct NewPublisher {
    pub name: String,
    pub address: String,
    pub email: String,
}

/// Parsed freeform author name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

/// Validated copy operation
#[derive(Debug, Clone)]
pub struct CopyChange {
    pub id: Option<i32>,
    pub copy_number: i32,
    pub copy_type: CopyType,
    pub availability_status: AvailabilityStatus,
    pub delete: bool,
}

/// Empty or whitespace-only optional fields count as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Split a comma-separated author list into (first, last) name pairs.
/// Each entry is trimmed and split on the first space; a single-word entry
/// yields an empty last name. Entries empty after trim are skipped.
pub fn parse_author_names(input: &str) -> Vec<AuthorName> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| match name.split_once(' ') {
            Some((first, last)) => AuthorName {
                first_name: first.to_string(),
                last_name: last.to_string(),
            },
            None => AuthorName {
                first_name: name.to_string(),
                last_name: String::new(),
            },
        })
        .collect()
}

/// Split a comma-separated category list into trimmed names, skipping
/// entries empty after trim.
pub fn parse_category_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl BookForm {
    /// Validate the whole submission, copy collection included, and produce
    /// the data bundle for the save orchestrator. Collects every failure so
    /// the submitter sees all field messages at once.
    pub fn validated(&self) -> Result<BookData, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => e.into(),
        };

        let title = self.title.trim();
        if title.is_empty() {
            errors.push("title", "Title is required");
        }

        let new_publisher = non_empty(&self.new_publisher_name).map(|name| NewPublisher {
            name: name.to_string(),
            address: non_empty(&self.new_publisher_address)
                .unwrap_or_default()
                .to_string(),
            email: non_empty(&self.new_publisher_email)
                .unwrap_or_default()
                .to_string(),
        });
        if let Some(email) = non_empty(&self.new_publisher_email) {
            if !email.validate_email() {
                errors.push("new_publisher_email", "Invalid email format");
            }
        }

        let copies = self.validate_copies(&mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookData {
            title: title.to_string(),
            publication_date: self.publication_date,
            description: non_empty(&self.description).map(str::to_string),
            publisher_id: self.publisher,
            new_publisher,
            author_ids: self.authors.clone(),
            new_authors: self
                .new_authors
                .as_deref()
                .map(parse_author_names)
                .unwrap_or_default(),
            category_ids: self.categories.clone(),
            new_categories: self
                .new_categories
                .as_deref()
                .map(parse_category_names)
                .unwrap_or_default(),
            copies,
        })
    }

    /// Validate the inline copy collection as a whole. Entries marked for
    /// deletion skip field checks and the duplicate scan; a new entry that is
    /// also marked deleted is dropped entirely.
    fn validate_copies(&self, errors: &mut FieldErrors) -> Vec<CopyChange> {
        let mut changes = Vec::with_capacity(self.copies.len());
        let mut seen_numbers = HashSet::new();

        for (index, copy) in self.copies.iter().enumerate() {
            if copy.delete {
                if copy.id.is_some() {
                    changes.push(CopyChange {
                        id: copy.id,
                        copy_number: copy.copy_number,
                        copy_type: CopyType::Printed,
                        availability_status: AvailabilityStatus::default(),
                        delete: true,
                    });
                }
                continue;
            }

            if copy.copy_number < 1 {
                errors.push(
                    format!("copies[{}].copy_number", index),
                    "Copy number must be a positive integer",
                );
            } else if !seen_numbers.insert(copy.copy_number) {
                errors.push(
                    format!("copies[{}].copy_number", index),
                    "Duplicate copy number within this submission",
                );
            }

            let copy_type = match copy.copy_type.parse::<CopyType>() {
                Ok(t) => t,
                Err(message) => {
                    errors.push(format!("copies[{}].copy_type", index), message);
                    continue;
                }
            };

            let availability_status = match non_empty(&copy.availability_status) {
                Some(raw) => match raw.parse::<AvailabilityStatus>() {
                    Ok(status) => status,
                    Err(message) => {
                        errors.push(format!("copies[{}].availability_status", index), message);
                        continue;
                    }
                },
                None => AvailabilityStatus::default(),
            };

            changes.push(CopyChange {
                id: copy.id,
                copy_number: copy.copy_number,
                copy_type,
                availability_status,
                delete: false,
            });
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> BookForm {
        BookForm {
            title: "The Fellowship of the Ring".to_string(),
            publication_date: NaiveDate::from_ymd_opt(1954, 7, 29).unwrap(),
            description: None,
            authors: vec![],
            categories: vec![],
            publisher: None,
            new_authors: None,
            new_categories: None,
            new_publisher_name: None,
            new_publisher_address: None,
            new_publisher_email: None,
            copies: vec![],
        }
    }

    fn copy(number: i32, copy_type: &str) -> CopyForm {
        CopyForm {
            id: None,
            copy_number: number,
            copy_type: copy_type.to_string(),
            availability_status: None,
            delete: false,
        }
    }

    #[test]
    fn test_parse_author_names_splits_on_first_space() {
        let names = parse_author_names("John Doe, Jane Smith");
        assert_eq!(
            names,
            vec![
                AuthorName {
                    first_name: "John".to_string(),
                    last_name: "Doe".to_string()
                },
                AuthorName {
                    first_name: "Jane".to_string(),
                    last_name: "Smith".to_string()
                },
            ]
        );

        let compound = parse_author_names("Ursula K. Le Guin");
        assert_eq!(compound[0].first_name, "Ursula");
        assert_eq!(compound[0].last_name, "K. Le Guin");
    }

    #[test]
    fn test_parse_author_names_single_word_has_empty_last_name() {
        let names = parse_author_names("Homer");
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].first_name, "Homer");
        assert_eq!(names[0].last_name, "");
    }

    #[test]
    fn test_parse_author_names_skips_blank_entries() {
        let names = parse_author_names(" , John Doe, ,");
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].first_name, "John");
    }

    #[test]
    fn test_parse_category_names_trims() {
        assert_eq!(
            parse_category_names(" Fantasy , , Science Fiction"),
            vec!["Fantasy".to_string(), "Science Fiction".to_string()]
        );
    }

    #[test]
    fn test_validated_minimal_form() {
        let data = base_form().validated().unwrap();
        assert!(data.author_ids.is_empty());
        assert!(data.new_authors.is_empty());
        assert!(data.new_publisher.is_none());
        assert!(data.copies.is_empty());
    }

    #[test]
    fn test_validated_title_required() {
        let mut form = base_form();
        form.title = "   ".to_string();
        let errors = form.validated().unwrap_err();
        assert!(errors.0.contains_key("title"));
    }

    #[test]
    fn test_validated_rejects_duplicate_copy_numbers() {
        let mut form = base_form();
        form.copies = vec![copy(1, "Printed"), copy(1, "PDF")];
        let errors = form.validated().unwrap_err();
        assert!(errors.0.contains_key("copies[1].copy_number"));
    }

    #[test]
    fn test_validated_rejects_unknown_copy_type() {
        let mut form = base_form();
        form.copies = vec![copy(1, "Hardcover")];
        let errors = form.validated().unwrap_err();
        assert!(errors.0.contains_key("copies[0].copy_type"));
    }

    #[test]
    fn test_validated_rejects_non_positive_copy_number() {
        let mut form = base_form();
        form.copies = vec![copy(0, "Printed")];
        let errors = form.validated().unwrap_err();
        assert!(errors.0.contains_key("copies[0].copy_number"));
    }

    #[test]
    fn test_validated_deleted_entries_skip_checks() {
        let mut form = base_form();
        // An existing entry marked deleted frees its number for a new entry,
        // and a never-persisted deleted entry is dropped outright.
        form.copies = vec![
            CopyForm {
                id: Some(7),
                copy_number: 1,
                copy_type: "Printed".to_string(),
                availability_status: None,
                delete: true,
            },
            CopyForm {
                id: None,
                copy_number: 3,
                copy_type: "bogus".to_string(),
                availability_status: None,
                delete: true,
            },
            copy(1, "eBook"),
        ];
        let data = form.validated().unwrap();
        assert_eq!(data.copies.len(), 2);
        assert!(data.copies[0].delete);
        assert_eq!(data.copies[1].copy_type, CopyType::Ebook);
    }

    #[test]
    fn test_validated_defaults_availability() {
        let mut form = base_form();
        form.copies = vec![copy(2, "PDF")];
        let data = form.validated().unwrap();
        assert_eq!(
            data.copies[0].availability_status,
            AvailabilityStatus::Available
        );
    }

    #[test]
    fn test_validated_new_publisher_email_checked() {
        let mut form = base_form();
        form.new_publisher_name = Some("Allen & Unwin".to_string());
        form.new_publisher_email = Some("not-an-email".to_string());
        let errors = form.validated().unwrap_err();
        assert!(errors.0.contains_key("new_publisher_email"));

        form.new_publisher_email = Some("contact@allenandunwin.com".to_string());
        let data = form.validated().unwrap();
        let publisher = data.new_publisher.unwrap();
        assert_eq!(publisher.name, "Allen & Unwin");
        assert_eq!(publisher.email, "contact@allenandunwin.com");
    }

    #[test]
    fn test_validated_publisher_fields_ignored_without_name() {
        let mut form = base_form();
        form.new_publisher_address = Some("40 Museum Street".to_string());
        form.new_publisher_email = Some("contact@allenandunwin.com".to_string());
        let data = form.validated().unwrap();
        assert!(data.new_publisher.is_none());
    }
}
