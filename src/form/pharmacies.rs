//! Pharmacy ODS code rows.
//!
//! Each affiliated pharmacy is one dynamically-added input row holding an ODS
//! code. Rows validate themselves; an invalid row stays in the list and
//! blocks submission rather than being rejected on entry. Duplicate codes
//! are accepted.

use thiserror::Error;
use uuid::Uuid;

use super::list::ItemList;
use super::validator::{self, FieldCheck};

/// Rejection raised when a new code fails entry validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OdsError {
    #[error("Please enter an ODS code")]
    Empty,
    #[error("Invalid ODS code format. Use format like AB123")]
    Format,
}

/// One self-validating code row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRow {
    pub id: Uuid,
    pub value: String,
}

impl CodeRow {
    fn new(value: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
        }
    }

    /// The row's validity-reporting capability: an invalid row signals the
    /// overall form to refuse submission.
    pub fn check(&self) -> FieldCheck {
        let normalized = validator::normalize_ods(&self.value);
        if normalized.is_empty() || !validator::is_valid_ods(&normalized) {
            FieldCheck::fail("Please correct the format: AB123")
        } else {
            FieldCheck::pass()
        }
    }
}

/// Ordered collection of pharmacy code rows.
#[derive(Debug, Default)]
pub struct PharmacyCodeList {
    rows: Vec<CodeRow>,
}

impl PharmacyCodeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a new code; the stored value is normalized to
    /// uppercase. On success the entry input should be cleared and
    /// refocused.
    pub fn add(&mut self, raw: &str) -> Result<Uuid, OdsError> {
        let normalized = validator::normalize_ods(raw);
        if normalized.is_empty() {
            return Err(OdsError::Empty);
        }
        if !validator::is_valid_ods(&normalized) {
            return Err(OdsError::Format);
        }
        let row = CodeRow::new(normalized);
        let id = row.id;
        self.rows.push(row);
        Ok(id)
    }

    /// Removes a row unconditionally. Unknown ids are ignored.
    pub fn remove(&mut self, id: Uuid) {
        self.rows.retain(|row| row.id != id);
    }

    /// Inline edit of an existing row. The value is normalized and kept even
    /// when invalid; the row's own check reports the problem.
    pub fn set_row_value(&mut self, id: Uuid, raw: &str) -> Option<FieldCheck> {
        let row = self.rows.iter_mut().find(|row| row.id == id)?;
        row.value = validator::normalize_ods(raw);
        Some(row.check())
    }

    pub fn rows(&self) -> &[CodeRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Code values in list order.
    pub fn values(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.value.clone()).collect()
    }

    /// First invalid row, if any.
    pub fn first_invalid(&self) -> Option<&CodeRow> {
        self.rows.iter().find(|row| !row.check().valid)
    }
}

impl ItemList<String> for PharmacyCodeList {
    /// Bulk population path used by hydration; values land as-is (normalized)
    /// without entry validation so a saved draft always reloads.
    fn add(&mut self, item: String) {
        self.rows.push(CodeRow::new(validator::normalize_ods(&item)));
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}
