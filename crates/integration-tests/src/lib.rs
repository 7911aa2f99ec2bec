//! Integration tests for Bookshelf.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookshelf-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_properties` - Cart store behaviour over sequences of operations
//! - `cart_persistence` - Durable slot round trips across store instances
//!
//! This library holds the fixtures shared by those test files.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use bookshelf_core::{Book, Price};
use bookshelf_storefront::config::CartConfig;

/// Install a test-writer tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A book with a title derived from its ID and the given price in cents.
#[must_use]
pub fn book(id: &str, cents: i64) -> Book {
    Book {
        title: Some(format!("Book {id}")),
        ..Book::new(id, Price::from_cents(cents))
    }
}

/// A fully populated catalog record.
#[must_use]
pub fn full_book(id: &str) -> Book {
    Book {
        title: Some("Project Hail Mary".to_string()),
        author: Some("Andy Weir".to_string()),
        category: Some("Science Fiction".to_string()),
        rating: Some(4.8),
        cover_image: Some(format!("https://covers.example/{id}.jpg")),
        published_year: Some(2021),
        isbn: Some("978-0593135204".to_string()),
        description: Some("A lone astronaut must save the earth.".to_string()),
        ..Book::new(id, Price::from_cents(2899))
    }
}

/// Temporary data directory removed when dropped.
#[derive(Debug)]
pub struct TempDataDir {
    path: PathBuf,
}

impl TempDataDir {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("bookshelf-it-{}", uuid::Uuid::new_v4())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cart configuration pointing at this directory.
    #[must_use]
    pub fn config(&self) -> CartConfig {
        CartConfig {
            data_dir: self.path.clone(),
            ..CartConfig::default()
        }
    }
}

impl Default for TempDataDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
