//! Catalog book records.
//!
//! A [`Book`] is the record shape served by the remote catalog service. The
//! cart only relies on `id` and `price`; every other field is passthrough
//! snapshot data and may be absent.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::id::BookId;
use super::price::Price;

/// Earliest publication year accepted by the book form.
pub const MIN_PUBLISHED_YEAR: i32 = 1000;

/// Highest rating a book can carry.
pub const MAX_RATING: f64 = 5.0;

/// Errors reported by [`Book::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BookError {
    /// A required text field is absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The price is below zero.
    #[error("price cannot be negative")]
    NegativePrice,
    /// The rating is outside `0..=5`.
    #[error("rating must be between 0 and {max} (got {rating})")]
    RatingOutOfRange {
        /// Rating as submitted.
        rating: f64,
        /// Maximum allowed rating.
        max: f64,
    },
    /// The publication year is before 1000 or in the future.
    #[error("published year must be between {min} and {max} (got {year})")]
    PublishedYearOutOfRange {
        /// Year as submitted.
        year: i32,
        /// Earliest allowed year.
        min: i32,
        /// Latest allowed year (the current year).
        max: i32,
    },
}

/// A book as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Catalog identifier. The catalog service sends it as `_id`.
    #[serde(alias = "_id")]
    pub id: BookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Cover image URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    /// Create a book with only the fields the cart requires.
    #[must_use]
    pub fn new(id: impl Into<BookId>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: None,
            author: None,
            category: None,
            price,
            rating: None,
            cover_image: None,
            published_year: None,
            isbn: None,
            description: None,
        }
    }

    /// Title for user-facing messages, falling back to the ID.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    /// Check the record against the add/edit book form rules.
    ///
    /// The cart never calls this; forms validate before handing records over.
    ///
    /// # Errors
    ///
    /// Returns the first rule the record breaks.
    pub fn validate(&self) -> Result<(), BookError> {
        self.validate_for_year(chrono::Utc::now().year())
    }

    /// Same as [`Book::validate`] with an explicit current year.
    ///
    /// # Errors
    ///
    /// Returns the first rule the record breaks.
    pub fn validate_for_year(&self, current_year: i32) -> Result<(), BookError> {
        require_text(self.title.as_deref(), "title")?;
        require_text(self.author.as_deref(), "author")?;
        require_text(self.category.as_deref(), "category")?;

        if self.price.is_negative() {
            return Err(BookError::NegativePrice);
        }

        let rating = self.rating.ok_or(BookError::MissingField("rating"))?;
        if !(0.0..=MAX_RATING).contains(&rating) {
            return Err(BookError::RatingOutOfRange {
                rating,
                max: MAX_RATING,
            });
        }

        let year = self
            .published_year
            .ok_or(BookError::MissingField("published year"))?;
        if !(MIN_PUBLISHED_YEAR..=current_year).contains(&year) {
            return Err(BookError::PublishedYearOutOfRange {
                year,
                min: MIN_PUBLISHED_YEAR,
                max: current_year,
            });
        }

        require_text(self.isbn.as_deref(), "isbn")?;
        require_text(self.description.as_deref(), "description")?;
        Ok(())
    }

    /// Catalog search: an empty query matches every book, otherwise the
    /// query must appear verbatim in the title or author, ignoring case.
    /// Surrounding whitespace is part of the query.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        [self.title.as_deref(), self.author.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Books matching `query`, in catalog order.
#[must_use]
pub fn filter_books<'a>(books: &'a [Book], query: &str) -> Vec<&'a Book> {
    books.iter().filter(|book| book.matches_query(query)).collect()
}

fn require_text(value: Option<&str>, field: &'static str) -> Result<(), BookError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(BookError::MissingField(field)),
    }
}
