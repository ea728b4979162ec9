//! The pharmacist roster.
//!
//! An ordered, deduplicated collection of pharmacist records with inline
//! per-cell editing and manual drag reordering. Edit-mode flags are explicit
//! state here, not something read back out of rendered markup, so a re-render
//! can never lose or invent a pending edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::list::ItemList;
use super::validator;

/// One roster entry. `gphc` is the natural key: exactly seven digits, unique
/// within the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacistRecord {
    pub gphc: String,
    pub name: String,
}

/// The two editable cells of a roster row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterField {
    Gphc,
    Name,
}

/// Rejection raised by roster operations. The display form is the transient
/// notice text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Please enter both GPHC number and name")]
    MissingFields { gphc: bool, name: bool },
    #[error("GPHC number must be exactly 7 digits")]
    InvalidGphc,
    #[error("This GPHC number is already in the list")]
    DuplicateGphc,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("No pharmacists to export")]
    Empty,
}

/// Per-row UI state: which cell, if any, is in inline-edit mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowEditState {
    pub editing_gphc: bool,
    pub editing_name: bool,
}

impl RowEditState {
    fn editing(&self, field: RosterField) -> bool {
        match field {
            RosterField::Gphc => self.editing_gphc,
            RosterField::Name => self.editing_name,
        }
    }

    fn set(&mut self, field: RosterField, on: bool) {
        match field {
            RosterField::Gphc => self.editing_gphc = on,
            RosterField::Name => self.editing_name = on,
        }
    }
}

/// Vertical extent of a rendered roster row, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBox {
    pub top: f64,
    pub height: f64,
}

impl RowBox {
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Computes where a dragged row lands: before the first row whose vertical
/// midpoint lies below the pointer, or at the end if none does. `boxes`
/// describes the rendered rows excluding the dragged one, in order.
pub fn insertion_index(pointer_y: f64, boxes: &[RowBox]) -> usize {
    boxes
        .iter()
        .position(|row| pointer_y < row.midpoint())
        .unwrap_or(boxes.len())
}

/// A rendered CSV export ready for the host to offer as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Ordered, deduplicated pharmacist roster with inline-edit state.
#[derive(Debug, Default)]
pub struct RosterManager {
    records: Vec<PharmacistRecord>,
    edits: Vec<RowEditState>,
}

impl RosterManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PharmacistRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_gphc(&self, gphc: &str) -> bool {
        self.records.iter().any(|record| record.gphc == gphc)
    }

    pub fn edit_state(&self, index: usize) -> Option<RowEditState> {
        self.edits.get(index).copied()
    }

    /// Validates and appends a new record.
    pub fn add(&mut self, gphc: &str, name: &str) -> Result<(), RosterError> {
        let gphc = gphc.trim();
        let name = name.trim();
        if gphc.is_empty() || name.is_empty() {
            return Err(RosterError::MissingFields {
                gphc: gphc.is_empty(),
                name: name.is_empty(),
            });
        }
        if !validator::is_valid_gphc(gphc) {
            return Err(RosterError::InvalidGphc);
        }
        if self.contains_gphc(gphc) {
            return Err(RosterError::DuplicateGphc);
        }
        self.records.push(PharmacistRecord {
            gphc: gphc.to_string(),
            name: name.to_string(),
        });
        self.edits.push(RowEditState::default());
        Ok(())
    }

    /// Removes the record with the given registration number; silently a
    /// no-op when absent.
    pub fn remove(&mut self, gphc: &str) {
        if let Some(index) = self.records.iter().position(|record| record.gphc == gphc) {
            self.records.remove(index);
            self.edits.remove(index);
        }
    }

    /// Enters edit mode for exactly one cell. Starting an edit on a row ends
    /// any pending edit of the row's other cell.
    pub fn begin_edit(&mut self, index: usize, field: RosterField) {
        if let Some(edit) = self.edits.get_mut(index) {
            *edit = RowEditState::default();
            edit.set(field, true);
        }
    }

    /// Commits a pending inline edit. A value that fails validation reverts
    /// the edit (edit mode exits, record unchanged) and reports why.
    pub fn commit_edit(
        &mut self,
        index: usize,
        field: RosterField,
        value: &str,
    ) -> Result<(), RosterError> {
        let Some(edit) = self.edits.get(index).copied() else {
            return Ok(());
        };
        if !edit.editing(field) {
            return Ok(());
        }
        let value = value.trim();

        let result = match field {
            RosterField::Gphc => {
                if !validator::is_valid_gphc(value) {
                    Err(RosterError::InvalidGphc)
                } else if self
                    .records
                    .iter()
                    .enumerate()
                    .any(|(i, record)| i != index && record.gphc == value)
                {
                    Err(RosterError::DuplicateGphc)
                } else {
                    self.records[index].gphc = value.to_string();
                    Ok(())
                }
            }
            RosterField::Name => {
                if value.is_empty() {
                    Err(RosterError::EmptyName)
                } else {
                    self.records[index].name = value.to_string();
                    Ok(())
                }
            }
        };

        self.edits[index].set(field, false);
        result
    }

    /// Exits edit mode without mutating the record.
    pub fn cancel_edit(&mut self, index: usize, field: RosterField) {
        if let Some(edit) = self.edits.get_mut(index) {
            edit.set(field, false);
        }
    }

    /// Repositions a dragged record. `row_boxes` is the rendered geometry of
    /// the remaining rows (the dragged one excluded), in order; the record
    /// lands at [`insertion_index`]. Returns the new index.
    pub fn reorder(
        &mut self,
        from_index: usize,
        pointer_y: f64,
        row_boxes: &[RowBox],
    ) -> Option<usize> {
        if from_index >= self.records.len() {
            return None;
        }
        let target = insertion_index(pointer_y, row_boxes).min(self.records.len() - 1);
        let record = self.records.remove(from_index);
        let edit = self.edits.remove(from_index);
        self.records.insert(target, record);
        self.edits.insert(target, edit);
        Some(target)
    }

    /// Renders the roster as quoted CSV, one row per record in order.
    pub fn export_csv(&self, today: NaiveDate) -> Result<CsvExport, RosterError> {
        if self.records.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut content = String::from("GPHC Number,Full Name\n");
        for record in &self.records {
            content.push_str(&format!(
                "{},{}\n",
                csv_quote(&record.gphc),
                csv_quote(&record.name)
            ));
        }
        Ok(CsvExport {
            filename: format!("pharmacists_{}.csv", today.format("%Y-%m-%d")),
            content,
        })
    }
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

impl ItemList<PharmacistRecord> for RosterManager {
    /// Bulk population path used by hydration; records land as-is so a saved
    /// draft always reloads.
    fn add(&mut self, item: PharmacistRecord) {
        self.records.push(item);
        self.edits.push(RowEditState::default());
    }

    fn clear(&mut self) {
        self.records.clear();
        self.edits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(records: &[(&str, &str)]) -> RosterManager {
        let mut roster = RosterManager::new();
        for (gphc, name) in records {
            roster.add(gphc, name).expect("valid record");
        }
        roster
    }

    #[test]
    fn add_trims_and_appends_in_order() {
        let roster = roster_with(&[("1234567", " Jane Doe "), ("7654321", "John Smith")]);
        assert_eq!(roster.records()[0].name, "Jane Doe");
        assert_eq!(roster.records()[1].gphc, "7654321");
    }

    #[test]
    fn add_rejects_bad_gphc_without_mutating() {
        let mut roster = RosterManager::new();
        assert_eq!(
            roster.add("123456", "Jane Doe"),
            Err(RosterError::InvalidGphc)
        );
        assert_eq!(
            roster.add("12345678", "Jane Doe"),
            Err(RosterError::InvalidGphc)
        );
        assert!(roster.is_empty());
    }

    #[test]
    fn add_rejects_duplicates_with_specific_error() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        assert_eq!(
            roster.add("1234567", "John Smith"),
            Err(RosterError::DuplicateGphc)
        );
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.records()[0].name, "Jane Doe");
    }

    #[test]
    fn add_reports_which_fields_are_missing() {
        let mut roster = RosterManager::new();
        assert_eq!(
            roster.add("", "Jane Doe"),
            Err(RosterError::MissingFields {
                gphc: true,
                name: false
            })
        );
        assert_eq!(
            roster.add("  ", ""),
            Err(RosterError::MissingFields {
                gphc: true,
                name: true
            })
        );
    }

    #[test]
    fn remove_missing_gphc_is_silent() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        roster.remove("0000000");
        assert_eq!(roster.len(), 1);
        roster.remove("1234567");
        assert!(roster.is_empty());
    }

    #[test]
    fn begin_edit_tracks_one_cell_per_row() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        roster.begin_edit(0, RosterField::Gphc);
        roster.begin_edit(0, RosterField::Name);
        let edit = roster.edit_state(0).expect("row exists");
        assert!(!edit.editing_gphc);
        assert!(edit.editing_name);
    }

    #[test]
    fn commit_edit_overwrites_and_exits_edit_mode() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        roster.begin_edit(0, RosterField::Name);
        roster
            .commit_edit(0, RosterField::Name, " Janet Doe ")
            .expect("valid name");
        assert_eq!(roster.records()[0].name, "Janet Doe");
        assert!(!roster.edit_state(0).expect("row").editing_name);
    }

    #[test]
    fn bad_commit_reverts_and_reports() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        roster.begin_edit(0, RosterField::Gphc);
        assert_eq!(
            roster.commit_edit(0, RosterField::Gphc, "12ab"),
            Err(RosterError::InvalidGphc)
        );
        assert_eq!(roster.records()[0].gphc, "1234567");
        assert!(!roster.edit_state(0).expect("row").editing_gphc);
    }

    #[test]
    fn commit_edit_rejects_another_rows_gphc() {
        let mut roster = roster_with(&[("1234567", "Jane Doe"), ("7654321", "John Smith")]);
        roster.begin_edit(1, RosterField::Gphc);
        assert_eq!(
            roster.commit_edit(1, RosterField::Gphc, "1234567"),
            Err(RosterError::DuplicateGphc)
        );
        assert_eq!(roster.records()[1].gphc, "7654321");
    }

    #[test]
    fn commit_without_begin_is_a_no_op() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        roster
            .commit_edit(0, RosterField::Name, "Ignored")
            .expect("no-op");
        assert_eq!(roster.records()[0].name, "Jane Doe");
    }

    #[test]
    fn cancel_edit_discards_pending_value() {
        let mut roster = roster_with(&[("1234567", "Jane Doe")]);
        roster.begin_edit(0, RosterField::Gphc);
        roster.cancel_edit(0, RosterField::Gphc);
        assert_eq!(roster.records()[0].gphc, "1234567");
        assert!(!roster.edit_state(0).expect("row").editing_gphc);
    }

    #[test]
    fn insertion_index_uses_row_midpoints() {
        let boxes = [
            RowBox {
                top: 0.0,
                height: 40.0,
            },
            RowBox {
                top: 40.0,
                height: 40.0,
            },
            RowBox {
                top: 80.0,
                height: 40.0,
            },
        ];
        assert_eq!(insertion_index(10.0, &boxes), 0);
        assert_eq!(insertion_index(25.0, &boxes), 1);
        assert_eq!(insertion_index(75.0, &boxes), 2);
        assert_eq!(insertion_index(150.0, &boxes), 3);
        assert_eq!(insertion_index(50.0, &[]), 0);
    }

    #[test]
    fn reorder_moves_record_to_computed_point() {
        let mut roster = roster_with(&[
            ("1111111", "First"),
            ("2222222", "Second"),
            ("3333333", "Third"),
        ]);
        // Drag the last record above the first row's midpoint.
        let boxes = [
            RowBox {
                top: 0.0,
                height: 40.0,
            },
            RowBox {
                top: 40.0,
                height: 40.0,
            },
        ];
        let new_index = roster.reorder(2, 5.0, &boxes).expect("moved");
        assert_eq!(new_index, 0);
        let order: Vec<&str> = roster
            .records()
            .iter()
            .map(|record| record.gphc.as_str())
            .collect();
        assert_eq!(order, vec!["3333333", "1111111", "2222222"]);
    }

    #[test]
    fn reorder_to_end_appends() {
        let mut roster = roster_with(&[("1111111", "First"), ("2222222", "Second")]);
        let boxes = [RowBox {
            top: 0.0,
            height: 40.0,
        }];
        let new_index = roster.reorder(0, 100.0, &boxes).expect("moved");
        assert_eq!(new_index, 1);
        assert_eq!(roster.records()[1].gphc, "1111111");
    }

    #[test]
    fn export_empty_roster_is_refused() {
        let roster = RosterManager::new();
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(roster.export_csv(today), Err(RosterError::Empty));
    }

    #[test]
    fn export_renders_quoted_rows_and_dated_filename() {
        let roster = roster_with(&[("1234567", "Jane \"JD\" Doe"), ("7654321", "John Smith")]);
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let export = roster.export_csv(today).expect("export");
        assert_eq!(export.filename, "pharmacists_2025-03-01.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines[0], "GPHC Number,Full Name");
        assert_eq!(lines[1], "\"1234567\",\"Jane \"\"JD\"\" Doe\"");
        assert_eq!(lines[2], "\"7654321\",\"John Smith\"");
    }
}
