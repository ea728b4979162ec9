//! The form orchestrator.
//!
//! Owns the overall lifecycle: hydration from the persisted draft, the
//! business-type switch, debounced autosave, submission-time cross-field
//! validation, payload assembly, and the post-submit transition. Commands
//! arrive as a typed enum; the host maps its UI events onto them and renders
//! from the accessors afterwards.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::notify::Notifier;
use crate::storage::DraftStore;

use super::draft::DraftSnapshot;
use super::list::ItemList;
use super::pharmacies::{OdsError, PharmacyCodeList};
use super::render;
use super::roster::{CsvExport, RosterError, RosterField, RosterManager, RowBox};
use super::schema::{business_fields, contact_fields, BusinessTypeId};
use super::validator::{self, FieldCheck};

/// Lifecycle phase of the form session.
///
/// `Submitted` is terminal: the draft is gone and the session only shows the
/// success region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Submitted,
}

/// Which outward submission the payload represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    NewApplication,
    UpdateApplication,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::NewApplication => "new-application",
            SubmissionKind::UpdateApplication => "update-application",
        }
    }
}

/// The assembled outward submission: multipart-style ordered pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEvent {
    pub kind: SubmissionKind,
    pub data: Vec<(String, String)>,
}

impl SubmissionEvent {
    /// All values recorded under a key, in order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.data
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Inbound resolution of a pending submission round trip.
#[derive(Debug, Clone, Default)]
pub struct SubmissionOutcome {
    pub reply: Vec<String>,
    pub error: Option<String>,
}

impl SubmissionOutcome {
    pub fn success() -> Self {
        Self {
            reply: vec!["success".into()],
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            reply: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Input the host should move focus to after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    OdsEntry,
    GphcEntry,
    PharmacistNameEntry,
}

/// Typed command set; the explicit replacement for routing UI events by
/// element name strings.
#[derive(Debug, Clone)]
pub enum FormCommand {
    SelectBusinessType(BusinessTypeId),
    EditBusinessField { key: String, value: String },
    EditContactField { key: String, value: String },
    AddPharmacy { code: String },
    EditPharmacy { row: Uuid, value: String },
    RemovePharmacy { row: Uuid },
    AddPharmacist { gphc: String, name: String },
    RemovePharmacist { gphc: String },
    BeginRosterEdit { index: usize, field: RosterField },
    CommitRosterEdit { index: usize, field: RosterField, value: String },
    CancelRosterEdit { index: usize, field: RosterField },
    ReorderRoster { from_index: usize, pointer_y: f64, row_boxes: Vec<RowBox> },
    ExportRoster,
    ClearForm,
    Submit,
}

/// What a command produced beyond state mutation.
#[derive(Debug, Default)]
pub struct CommandOutcome {
    /// Inline check for the input the command touched.
    pub field_check: Option<FieldCheck>,
    pub focus: Option<FocusTarget>,
    /// Present when a submit passed every gate; the host performs the round
    /// trip and answers with [`FormOrchestrator::resolve_submission`].
    pub submission: Option<SubmissionEvent>,
    pub export: Option<CsvExport>,
}

/// The top-level form component.
pub struct FormOrchestrator<S: DraftStore, N: Notifier> {
    store: S,
    notifier: N,
    config: Config,
    phase: FormPhase,
    business_type: Option<BusinessTypeId>,
    business_values: BTreeMap<String, String>,
    contact_values: BTreeMap<String, String>,
    codes: PharmacyCodeList,
    roster: RosterManager,
    update_target: Option<String>,
    autosave_deadline: Option<Instant>,
}

impl<S: DraftStore, N: Notifier> FormOrchestrator<S, N> {
    pub fn new(store: S, notifier: N, config: Config) -> Self {
        Self {
            store,
            notifier,
            config,
            phase: FormPhase::Editing,
            business_type: None,
            business_values: BTreeMap::new(),
            contact_values: BTreeMap::new(),
            codes: PharmacyCodeList::new(),
            roster: RosterManager::new(),
            update_target: None,
            autosave_deadline: None,
        }
    }

    /// Marks this session as editing an existing record; the identifier is
    /// echoed into the payload and switches the submission kind.
    pub fn with_update_target(mut self, id: impl Into<String>) -> Self {
        self.update_target = Some(id.into());
        self
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// True while a submission round trip is in flight; the host renders the
    /// submit control disabled and busy.
    pub fn submit_disabled(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn business_type(&self) -> Option<BusinessTypeId> {
        self.business_type
    }

    pub fn business_values(&self) -> &BTreeMap<String, String> {
        &self.business_values
    }

    pub fn contact_values(&self) -> &BTreeMap<String, String> {
        &self.contact_values
    }

    pub fn codes(&self) -> &PharmacyCodeList {
        &self.codes
    }

    pub fn roster(&self) -> &RosterManager {
        &self.roster
    }

    /// Markup for the business fieldset region; empty until a type is
    /// selected.
    pub fn business_fields_markup(&self) -> String {
        match self.business_type {
            Some(id) => render::render_field_set(business_fields(id), &self.business_values),
            None => String::new(),
        }
    }

    pub fn contact_fields_markup(&self) -> String {
        render::render_field_set(contact_fields(), &self.contact_values)
    }

    pub fn type_selector_markup(&self) -> String {
        render::render_type_selector(self.business_type)
    }

    /// Loads the persisted draft, if any, and reconstructs the full visible
    /// state from it. Returns whether a draft was found.
    pub fn hydrate(&mut self) -> bool {
        let snapshot = match self.store.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load persisted draft");
                None
            }
        };
        let Some(snapshot) = snapshot else {
            return false;
        };
        self.restore(&snapshot);
        tracing::debug!(
            pharmacists = self.roster.len(),
            ods = self.codes.len(),
            "hydrated draft"
        );
        true
    }

    fn restore(&mut self, snapshot: &DraftSnapshot) {
        self.business_type = BusinessTypeId::parse(&snapshot.business_type);
        self.business_values = snapshot.business.clone();
        self.contact_values = snapshot.contact.clone();
        self.codes.set_items(snapshot.ods.iter().cloned());
        self.roster.set_items(snapshot.pharmacists.iter().cloned());
    }

    /// Current state as the persisted wire format.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            business_type: self
                .business_type
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            business: self.business_values.clone(),
            contact: self.contact_values.clone(),
            ods: self.codes.values(),
            pharmacists: self.roster.records().to_vec(),
        }
    }

    /// Applies a command. `now` anchors the autosave debounce clock.
    pub fn apply(&mut self, command: FormCommand, now: Instant) -> CommandOutcome {
        if self.phase == FormPhase::Submitted {
            tracing::debug!(?command, "command ignored after submission");
            return CommandOutcome::default();
        }
        match command {
            FormCommand::SelectBusinessType(id) => self.select_business_type(id),
            FormCommand::EditBusinessField { key, value } => {
                self.edit_business_field(&key, value, now)
            }
            FormCommand::EditContactField { key, value } => {
                self.edit_contact_field(&key, value, now)
            }
            FormCommand::AddPharmacy { code } => self.add_pharmacy(&code),
            FormCommand::EditPharmacy { row, value } => self.edit_pharmacy(row, &value, now),
            FormCommand::RemovePharmacy { row } => {
                self.codes.remove(row);
                self.persist_now();
                CommandOutcome::default()
            }
            FormCommand::AddPharmacist { gphc, name } => self.add_pharmacist(&gphc, &name),
            FormCommand::RemovePharmacist { gphc } => {
                self.roster.remove(&gphc);
                self.persist_now();
                CommandOutcome::default()
            }
            FormCommand::BeginRosterEdit { index, field } => {
                self.roster.begin_edit(index, field);
                CommandOutcome::default()
            }
            FormCommand::CommitRosterEdit { index, field, value } => {
                match self.roster.commit_edit(index, field, &value) {
                    Ok(()) => self.persist_now(),
                    Err(err) => self.notifier.warn(&err.to_string()),
                }
                CommandOutcome::default()
            }
            FormCommand::CancelRosterEdit { index, field } => {
                self.roster.cancel_edit(index, field);
                CommandOutcome::default()
            }
            FormCommand::ReorderRoster {
                from_index,
                pointer_y,
                row_boxes,
            } => {
                if self.roster.reorder(from_index, pointer_y, &row_boxes).is_some() {
                    self.persist_now();
                }
                CommandOutcome::default()
            }
            FormCommand::ExportRoster => self.export_roster(),
            FormCommand::ClearForm => self.clear_form(),
            FormCommand::Submit => self.submit(),
        }
    }

    fn select_business_type(&mut self, id: BusinessTypeId) -> CommandOutcome {
        // Same-named fields carry forward; keys unique to the old type drop.
        let fields = business_fields(id);
        let carried: BTreeMap<String, String> = fields
            .keys()
            .filter_map(|key| {
                self.business_values
                    .get(key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect();
        self.business_type = Some(id);
        self.business_values = carried;
        self.persist_now();
        CommandOutcome::default()
    }

    fn edit_business_field(&mut self, key: &str, value: String, now: Instant) -> CommandOutcome {
        let Some(id) = self.business_type else {
            tracing::debug!(key, "business field edit without a selected type");
            return CommandOutcome::default();
        };
        let Some(descriptor) = business_fields(id).field(key) else {
            tracing::debug!(key, "unknown business field");
            return CommandOutcome::default();
        };
        let check = validator::validate(descriptor, &value);
        self.business_values.insert(key.to_string(), value);
        self.schedule_autosave(now);
        CommandOutcome {
            field_check: Some(check),
            ..Default::default()
        }
    }

    fn edit_contact_field(&mut self, key: &str, value: String, now: Instant) -> CommandOutcome {
        let Some(descriptor) = contact_fields().field(key) else {
            tracing::debug!(key, "unknown contact field");
            return CommandOutcome::default();
        };
        let check = validator::validate(descriptor, &value);
        self.contact_values.insert(key.to_string(), value);
        self.schedule_autosave(now);
        CommandOutcome {
            field_check: Some(check),
            ..Default::default()
        }
    }

    fn add_pharmacy(&mut self, code: &str) -> CommandOutcome {
        match self.codes.add(code) {
            Ok(_) => {
                self.persist_now();
                CommandOutcome {
                    field_check: Some(FieldCheck::pass()),
                    focus: Some(FocusTarget::OdsEntry),
                    ..Default::default()
                }
            }
            Err(err) => {
                self.notifier.warn(&err.to_string());
                let inline = match err {
                    OdsError::Empty => validator::MSG_ODS_EMPTY,
                    OdsError::Format => validator::MSG_ODS_FORMAT,
                };
                CommandOutcome {
                    field_check: Some(FieldCheck::fail(inline)),
                    focus: Some(FocusTarget::OdsEntry),
                    ..Default::default()
                }
            }
        }
    }

    fn edit_pharmacy(&mut self, row: Uuid, value: &str, now: Instant) -> CommandOutcome {
        let check = self.codes.set_row_value(row, value);
        if check.is_some() {
            self.schedule_autosave(now);
        }
        CommandOutcome {
            field_check: check,
            ..Default::default()
        }
    }

    fn add_pharmacist(&mut self, gphc: &str, name: &str) -> CommandOutcome {
        match self.roster.add(gphc, name) {
            Ok(()) => {
                self.persist_now();
                CommandOutcome {
                    field_check: Some(FieldCheck::pass()),
                    focus: Some(FocusTarget::GphcEntry),
                    ..Default::default()
                }
            }
            Err(err) => {
                self.notifier.warn(&err.to_string());
                let (inline, focus) = match &err {
                    RosterError::MissingFields { gphc: true, .. } => {
                        ("GPHC number is required", FocusTarget::GphcEntry)
                    }
                    RosterError::MissingFields { .. } => {
                        ("Name is required", FocusTarget::PharmacistNameEntry)
                    }
                    RosterError::InvalidGphc => {
                        ("GPHC number must be exactly 7 digits", FocusTarget::GphcEntry)
                    }
                    RosterError::DuplicateGphc => {
                        ("This GPHC number is already added", FocusTarget::GphcEntry)
                    }
                    RosterError::EmptyName | RosterError::Empty => {
                        ("Name is required", FocusTarget::PharmacistNameEntry)
                    }
                };
                CommandOutcome {
                    field_check: Some(FieldCheck::fail(inline)),
                    focus: Some(focus),
                    ..Default::default()
                }
            }
        }
    }

    fn export_roster(&mut self) -> CommandOutcome {
        match self.roster.export_csv(Utc::now().date_naive()) {
            Ok(export) => {
                self.notifier.succeed("Pharmacist list exported successfully");
                CommandOutcome {
                    export: Some(export),
                    ..Default::default()
                }
            }
            Err(err) => {
                self.notifier.warn(&err.to_string());
                CommandOutcome::default()
            }
        }
    }

    fn clear_form(&mut self) -> CommandOutcome {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted draft");
        }
        self.business_type = None;
        self.business_values.clear();
        self.contact_values.clear();
        self.codes.clear();
        self.roster.clear();
        self.autosave_deadline = None;
        self.phase = FormPhase::Editing;
        self.notifier.succeed("Form cleared successfully");
        CommandOutcome::default()
    }

    fn submit(&mut self) -> CommandOutcome {
        if self.phase == FormPhase::Submitting {
            // The submit control is disabled during flight; a re-entrant
            // command must not emit a second event.
            tracing::debug!("submit ignored while a submission is in flight");
            return CommandOutcome::default();
        }

        let Some(id) = self.business_type else {
            self.notifier.warn("Please select a business type");
            return CommandOutcome::default();
        };

        let business = business_fields(id);
        let business_ok = business
            .fields
            .iter()
            .filter(|field| field.required)
            .all(|field| self.check_business(field.key).valid);
        if !business_ok {
            self.notifier
                .warn("Please fill in all required business fields");
            return CommandOutcome::default();
        }

        let contact_ok = contact_fields()
            .fields
            .iter()
            .all(|field| self.check_contact(field.key).valid);
        if !contact_ok {
            self.notifier
                .warn("Please correct the errors in contact information");
            return CommandOutcome::default();
        }

        if self.codes.is_empty() {
            self.notifier
                .warn("Please add at least one pharmacy ODS code");
            return CommandOutcome {
                focus: Some(FocusTarget::OdsEntry),
                ..Default::default()
            };
        }

        if self.codes.first_invalid().is_some() {
            self.notifier.warn("Please correct invalid ODS codes");
            return CommandOutcome::default();
        }

        // Final whole-form sweep: optional fields with values included.
        if !self.form_validity() {
            self.notifier.warn("Please correct the highlighted fields");
            return CommandOutcome::default();
        }

        let event = self.assemble_payload(id);
        self.phase = FormPhase::Submitting;
        tracing::info!(kind = event.kind.as_str(), "submission dispatched");
        CommandOutcome {
            submission: Some(event),
            ..Default::default()
        }
    }

    /// Resolves the pending round trip. A resolution arriving outside the
    /// `Submitting` phase is ignored so overlapping signals cannot corrupt
    /// state.
    pub fn resolve_submission(&mut self, outcome: SubmissionOutcome) {
        if self.phase != FormPhase::Submitting {
            tracing::debug!("submission result ignored outside the submitting phase");
            return;
        }
        if outcome.reply.is_empty() || outcome.error.is_some() {
            let message = outcome
                .error
                .unwrap_or_else(|| "An error occurred while submitting the form".into());
            self.phase = FormPhase::Editing;
            self.notifier.fail(&message);
            return;
        }
        self.phase = FormPhase::Submitted;
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted draft");
        }
        self.roster.clear();
        self.autosave_deadline = None;
        self.notifier.succeed("Application submitted successfully!");
    }

    /// Validates one business field against the current value map.
    pub fn check_business(&self, key: &str) -> FieldCheck {
        let Some(id) = self.business_type else {
            return FieldCheck::pass();
        };
        match business_fields(id).field(key) {
            Some(descriptor) => {
                let value = self.business_values.get(key).map(String::as_str).unwrap_or("");
                validator::validate(descriptor, value)
            }
            None => FieldCheck::pass(),
        }
    }

    /// Validates one contact field against the current value map.
    pub fn check_contact(&self, key: &str) -> FieldCheck {
        match contact_fields().field(key) {
            Some(descriptor) => {
                let value = self.contact_values.get(key).map(String::as_str).unwrap_or("");
                validator::validate(descriptor, value)
            }
            None => FieldCheck::pass(),
        }
    }

    /// Whole-form validity: every field of both sets plus every code row.
    pub fn form_validity(&self) -> bool {
        let business_ok = match self.business_type {
            Some(id) => business_fields(id)
                .fields
                .iter()
                .all(|field| self.check_business(field.key).valid),
            None => false,
        };
        business_ok
            && contact_fields()
                .fields
                .iter()
                .all(|field| self.check_contact(field.key).valid)
            && self.codes.first_invalid().is_none()
    }

    fn assemble_payload(&self, id: BusinessTypeId) -> SubmissionEvent {
        let mut data = Vec::new();
        data.push(("businessType".to_string(), id.as_str().to_string()));
        for field in &business_fields(id).fields {
            data.push((
                field.key.to_string(),
                self.business_values
                    .get(field.key)
                    .cloned()
                    .unwrap_or_default(),
            ));
        }
        for field in &contact_fields().fields {
            data.push((
                field.key.to_string(),
                self.contact_values
                    .get(field.key)
                    .cloned()
                    .unwrap_or_default(),
            ));
        }
        if let Some(target) = &self.update_target {
            data.push(("id".to_string(), target.clone()));
        }
        for code in self.codes.values() {
            data.push(("ods".to_string(), code));
        }
        if !self.roster.is_empty() {
            match serde_json::to_string(self.roster.records()) {
                Ok(json) => data.push(("pharmacists".to_string(), json)),
                Err(err) => tracing::warn!(error = %err, "failed to embed roster"),
            }
        }
        let kind = if self.update_target.is_some() {
            SubmissionKind::UpdateApplication
        } else {
            SubmissionKind::NewApplication
        };
        SubmissionEvent { kind, data }
    }

    fn schedule_autosave(&mut self, now: Instant) {
        // Last write wins: a new edit cancels and reschedules a pending one.
        self.autosave_deadline =
            Some(now + Duration::from_millis(self.config.autosave_debounce_ms));
    }

    /// Performs the debounced write when it is due. Returns whether a write
    /// happened.
    pub fn poll_autosave(&mut self, now: Instant) -> bool {
        match self.autosave_deadline {
            Some(deadline) if deadline <= now => {
                self.autosave_deadline = None;
                self.persist_now();
                true
            }
            _ => false,
        }
    }

    fn persist_now(&mut self) {
        self.autosave_deadline = None;
        let snapshot = self.snapshot();
        if let Err(err) = self.store.save(&snapshot) {
            tracing::warn!(error = %err, "failed to persist draft");
        }
    }
}
