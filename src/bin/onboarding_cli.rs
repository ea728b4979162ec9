//! Interactive console walk-through of the form engine: select a business
//! type, fill in the field sets with live validation, manage pharmacy codes
//! and the pharmacist roster, then submit and inspect the assembled payload.

use std::error::Error;
use std::time::{Duration, Instant};

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use onboarding_core::config::ConfigManager;
use onboarding_core::form::schema::{business_fields, contact_fields};
use onboarding_core::form::{
    BusinessTypeId, FormCommand, FormOrchestrator, FormPhase, SubmissionOutcome,
};
use onboarding_core::notify::ConsoleNotifier;
use onboarding_core::storage::JsonDraftStore;

type AppForm = FormOrchestrator<JsonDraftStore, ConsoleNotifier>;

fn main() {
    onboarding_core::init();
    if let Err(err) = run() {
        eprintln!("{}", format!("ERROR: {}", err).bright_red());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = ConfigManager::new()?.load()?;
    let debounce = Duration::from_millis(config.autosave_debounce_ms);
    let store = JsonDraftStore::new(None, &config.draft_file)?;
    let mut form = FormOrchestrator::new(store, ConsoleNotifier, config);
    if form.hydrate() {
        println!("{}", "Restored a saved draft.".bright_cyan());
    }

    let theme = ColorfulTheme::default();
    loop {
        if form.phase() == FormPhase::Submitted {
            println!("{}", "Application submitted. Goodbye.".bright_green());
            return Ok(());
        }
        let choice = Select::with_theme(&theme)
            .with_prompt("Business application")
            .items(&[
                "Business type",
                "Business details",
                "Contact details",
                "Pharmacy ODS codes",
                "Pharmacist roster",
                "Submit application",
                "Clear form",
                "Quit",
            ])
            .default(0)
            .interact()?;

        match choice {
            0 => pick_type(&theme, &mut form)?,
            1 => fill_business(&theme, &mut form)?,
            2 => fill_contact(&theme, &mut form)?,
            3 => manage_codes(&theme, &mut form)?,
            4 => manage_roster(&theme, &mut form)?,
            5 => submit(&theme, &mut form)?,
            6 => {
                form.apply(FormCommand::ClearForm, Instant::now());
            }
            _ => return Ok(()),
        }
        // Settle any pending debounced write before showing the menu again.
        form.poll_autosave(Instant::now() + debounce);
    }
}

fn pick_type(theme: &ColorfulTheme, form: &mut AppForm) -> Result<(), Box<dyn Error>> {
    let names: Vec<&str> = BusinessTypeId::ALL
        .iter()
        .map(|id| id.display_name())
        .collect();
    let picked = Select::with_theme(theme)
        .with_prompt("Business type")
        .items(&names)
        .default(0)
        .interact()?;
    form.apply(
        FormCommand::SelectBusinessType(BusinessTypeId::ALL[picked]),
        Instant::now(),
    );
    Ok(())
}

fn fill_business(theme: &ColorfulTheme, form: &mut AppForm) -> Result<(), Box<dyn Error>> {
    let Some(id) = form.business_type() else {
        println!("{}", "Select a business type first.".bright_yellow());
        return Ok(());
    };
    for field in &business_fields(id).fields {
        let current = form
            .business_values()
            .get(field.key)
            .cloned()
            .unwrap_or_default();
        let value: String = Input::with_theme(theme)
            .with_prompt(field.label)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        let outcome = form.apply(
            FormCommand::EditBusinessField {
                key: field.key.to_string(),
                value,
            },
            Instant::now(),
        );
        if let Some(check) = outcome.field_check {
            if !check.valid {
                println!("{}", check.message.bright_yellow());
            }
        }
    }
    Ok(())
}

fn fill_contact(theme: &ColorfulTheme, form: &mut AppForm) -> Result<(), Box<dyn Error>> {
    for field in &contact_fields().fields {
        let current = form
            .contact_values()
            .get(field.key)
            .cloned()
            .unwrap_or_default();
        let value: String = Input::with_theme(theme)
            .with_prompt(field.label)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        let outcome = form.apply(
            FormCommand::EditContactField {
                key: field.key.to_string(),
                value,
            },
            Instant::now(),
        );
        if let Some(check) = outcome.field_check {
            if !check.valid {
                println!("{}", check.message.bright_yellow());
            }
        }
    }
    Ok(())
}

fn manage_codes(theme: &ColorfulTheme, form: &mut AppForm) -> Result<(), Box<dyn Error>> {
    loop {
        let values = form.codes().values();
        println!(
            "Pharmacies: {}",
            if values.is_empty() {
                "(none)".to_string()
            } else {
                values.join(", ")
            }
        );
        let choice = Select::with_theme(theme)
            .with_prompt("Pharmacy ODS codes")
            .items(&["Add code", "Remove code", "Back"])
            .default(0)
            .interact()?;
        match choice {
            0 => {
                let code: String = Input::with_theme(theme)
                    .with_prompt("ODS code (e.g., AB123)")
                    .allow_empty(true)
                    .interact_text()?;
                form.apply(FormCommand::AddPharmacy { code }, Instant::now());
            }
            1 => {
                let rows = form.codes().rows().to_vec();
                if rows.is_empty() {
                    continue;
                }
                let labels: Vec<String> = rows.iter().map(|row| row.value.clone()).collect();
                let picked = Select::with_theme(theme)
                    .with_prompt("Remove which code?")
                    .items(&labels)
                    .default(0)
                    .interact()?;
                form.apply(
                    FormCommand::RemovePharmacy {
                        row: rows[picked].id,
                    },
                    Instant::now(),
                );
            }
            _ => return Ok(()),
        }
    }
}

fn manage_roster(theme: &ColorfulTheme, form: &mut AppForm) -> Result<(), Box<dyn Error>> {
    loop {
        for (index, record) in form.roster().records().iter().enumerate() {
            println!("  {}. {}  {}", index + 1, record.gphc, record.name);
        }
        let choice = Select::with_theme(theme)
            .with_prompt("Pharmacist roster")
            .items(&["Add pharmacist", "Remove pharmacist", "Export CSV", "Back"])
            .default(0)
            .interact()?;
        match choice {
            0 => {
                let gphc: String = Input::with_theme(theme)
                    .with_prompt("GPHC number (7 digits)")
                    .allow_empty(true)
                    .interact_text()?;
                let name: String = Input::with_theme(theme)
                    .with_prompt("Full name")
                    .allow_empty(true)
                    .interact_text()?;
                form.apply(FormCommand::AddPharmacist { gphc, name }, Instant::now());
            }
            1 => {
                let records = form.roster().records().to_vec();
                if records.is_empty() {
                    continue;
                }
                let labels: Vec<String> = records
                    .iter()
                    .map(|record| format!("{} {}", record.gphc, record.name))
                    .collect();
                let picked = Select::with_theme(theme)
                    .with_prompt("Remove which pharmacist?")
                    .items(&labels)
                    .default(0)
                    .interact()?;
                form.apply(
                    FormCommand::RemovePharmacist {
                        gphc: records[picked].gphc.clone(),
                    },
                    Instant::now(),
                );
            }
            2 => {
                let outcome = form.apply(FormCommand::ExportRoster, Instant::now());
                if let Some(export) = outcome.export {
                    std::fs::write(&export.filename, &export.content)?;
                    println!("Wrote {}", export.filename.bright_cyan());
                }
            }
            _ => return Ok(()),
        }
    }
}

fn submit(theme: &ColorfulTheme, form: &mut AppForm) -> Result<(), Box<dyn Error>> {
    let outcome = form.apply(FormCommand::Submit, Instant::now());
    let Some(event) = outcome.submission else {
        return Ok(());
    };
    println!("Dispatching {}:", event.kind.as_str().bold());
    for (key, value) in &event.data {
        println!("  {} = {}", key, value);
    }
    let ok = Confirm::with_theme(theme)
        .with_prompt("Simulate a successful round trip?")
        .default(true)
        .interact()?;
    if ok {
        form.resolve_submission(SubmissionOutcome::success());
    } else {
        form.resolve_submission(SubmissionOutcome::failure("The registry rejected the application"));
    }
    Ok(())
}
