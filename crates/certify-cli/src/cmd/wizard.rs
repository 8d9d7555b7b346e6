use crate::output::{print_json, print_table};
use anyhow::Context;
use certify_core::config::Config;
use certify_core::error::CertifyError;
use certify_core::record::{AccumulatedRecord, Patch};
use certify_core::schema;
use certify_core::wizard::{self, Transition, Wizard, WizardStatus};
use clap::Subcommand;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum WizardSubcommand {
    /// List the wizard steps and their required fields
    Steps,

    /// Start a new wizard session
    Start {
        /// Seed the record from a flat JSON object
        #[arg(long, value_name = "FILE")]
        seed: Option<PathBuf>,
        /// Replace an active session
        #[arg(long)]
        force: bool,
    },

    /// Show the current step and collected fields
    Status,

    /// Submit the current step and move forward
    Submit {
        /// Field assignment, repeatable: --set name="Acme HQ"
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
        /// Merge without checking the step's required fields
        #[arg(long)]
        no_validate: bool,
    },

    /// Go back one step, keeping entered fields
    Back,

    /// Discard the session
    Cancel,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: WizardSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WizardSubcommand::Steps => steps(json),
        WizardSubcommand::Start { seed, force } => start(root, seed.as_deref(), force, json),
        WizardSubcommand::Status => status(root, json),
        WizardSubcommand::Submit {
            fields,
            no_validate,
        } => submit(root, fields, no_validate, json),
        WizardSubcommand::Back => back(root, json),
        WizardSubcommand::Cancel => cancel(root, json),
    }
}

fn load_active(root: &Path) -> anyhow::Result<Wizard> {
    let wizard = Wizard::load(root).context("failed to load wizard session")?;
    Ok(wizard)
}

fn step_label(wizard: &Wizard) -> String {
    format!(
        "Step {}/{}: {}",
        wizard.cursor(),
        wizard.step_count(),
        wizard.current_step().display_name()
    )
}

// ---------------------------------------------------------------------------
// steps
// ---------------------------------------------------------------------------

fn steps(json: bool) -> anyhow::Result<()> {
    let descriptors = wizard::steps();

    if json {
        let items: Vec<serde_json::Value> = descriptors
            .iter()
            .map(|s| {
                let required: Vec<&str> = schema::fields_for_step(s.id)
                    .filter(|f| f.required)
                    .map(|f| f.key)
                    .collect();
                serde_json::json!({
                    "index": s.index,
                    "id": s.id,
                    "name": s.name,
                    "description": s.description,
                    "required": required,
                })
            })
            .collect();
        return print_json(&items);
    }

    let rows: Vec<Vec<String>> = descriptors
        .iter()
        .map(|s| {
            let fields: Vec<String> = schema::fields_for_step(s.id)
                .map(|f| {
                    if f.required {
                        format!("{}*", f.key)
                    } else {
                        f.key.to_string()
                    }
                })
                .collect();
            vec![s.index.to_string(), s.name.to_string(), fields.join(", ")]
        })
        .collect();
    print_table(&["#", "STEP", "FIELDS (* required)"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

fn start(root: &Path, seed: Option<&Path>, force: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    match Wizard::load(root) {
        Ok(existing) if existing.status() == WizardStatus::Active && !force => {
            anyhow::bail!(
                "a wizard is already in progress ({}); use --force to replace it",
                step_label(&existing)
            );
        }
        Ok(_) | Err(CertifyError::NoWizard) => {}
        Err(e) => return Err(e).context("failed to read existing wizard session"),
    }

    let policy = config.records.unknown_fields;
    let wizard = match seed {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read seed {}", path.display()))?;
            let record = AccumulatedRecord::from_json(&data)
                .with_context(|| format!("seed {} is not a flat JSON object", path.display()))?;
            Wizard::seeded(record, policy)
                .with_context(|| format!("seed {} does not fit the record schema", path.display()))?
        }
        None => Wizard::new(policy),
    };
    wizard.save(root).context("failed to save wizard session")?;

    if json {
        print_json(&serde_json::json!({
            "id": wizard.id,
            "cursor": wizard.cursor(),
            "step": wizard.current_step(),
            "record": wizard.record(),
        }))?;
    } else {
        println!("Started wizard. {}", step_label(&wizard));
        println!("  {}", wizard.current_step().description());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let wizard = load_active(root)?;

    if json {
        print_json(&serde_json::json!({
            "id": wizard.id,
            "status": wizard.status(),
            "cursor": wizard.cursor(),
            "step_count": wizard.step_count(),
            "step": wizard.current_step(),
            "record": wizard.record(),
        }))?;
        return Ok(());
    }

    println!("{} ({})", step_label(&wizard), wizard.status());
    if wizard.record().is_empty() {
        println!("No fields collected yet.");
    } else {
        let rows: Vec<Vec<String>> = wizard
            .record()
            .iter()
            .map(|(k, v)| vec![k.to_string(), v.to_string()])
            .collect();
        print_table(&["FIELD", "VALUE"], rows);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// submit
// ---------------------------------------------------------------------------

/// Parse assignments by schema kind. Unknown keys go through as text so the
/// wizard's unknown-field policy decides their fate.
fn build_patch(fields: Vec<(String, String)>) -> anyhow::Result<Patch> {
    let mut patch = Patch::new();
    for (key, raw) in fields {
        match schema::parse_value(&key, &raw) {
            Ok(value) => {
                patch.set(key, value);
            }
            Err(CertifyError::UnknownField(_)) => {
                patch.set(key, raw);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(patch)
}

fn submit(
    root: &Path,
    fields: Vec<(String, String)>,
    no_validate: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut wizard = load_active(root)?;
    let patch = build_patch(fields)?;
    let step = wizard.current_step();

    let result = if no_validate {
        wizard.advance(patch)
    } else {
        wizard.submit(patch)
    };

    let transition = match result {
        Ok(t) => t,
        Err(CertifyError::Validation(errors)) => {
            if json {
                print_json(&serde_json::json!({ "ok": false, "errors": errors }))?;
            } else {
                println!("{} is incomplete:", step.display_name());
                for e in &errors.errors {
                    println!("  {} {}", e.field, e.problem);
                }
            }
            anyhow::bail!("step '{step}' failed validation");
        }
        Err(e) => return Err(e).with_context(|| format!("failed to submit step '{step}'")),
    };

    match transition {
        Transition::Moved { from, to } => {
            wizard.save(root).context("failed to save wizard session")?;
            if json {
                print_json(&serde_json::json!({ "ok": true, "from": from, "to": to }))?;
            } else {
                println!("Saved {}. {}", step.display_name(), step_label(&wizard));
            }
        }
        Transition::HandedOff(handoff) => {
            handoff.save(root).context("failed to write handoff")?;
            Wizard::discard(root).context("failed to remove wizard session")?;
            if json {
                print_json(&serde_json::json!({
                    "ok": true,
                    "handed_off": true,
                    "record": handoff.record,
                }))?;
            } else {
                println!(
                    "Project '{}' created with {} fields.",
                    handoff.record.get_str("name").unwrap_or("(unnamed)"),
                    handoff.record.len()
                );
                println!("Next: certify dashboard show");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// back / cancel
// ---------------------------------------------------------------------------

fn back(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut wizard = load_active(root)?;
    let before = wizard.cursor();
    let cursor = wizard.retreat().context("failed to go back")?;
    wizard.save(root).context("failed to save wizard session")?;

    if json {
        print_json(&serde_json::json!({ "from": before, "to": cursor }))?;
    } else if cursor == before {
        println!("Already at the first step. {}", step_label(&wizard));
    } else {
        println!("{}", step_label(&wizard));
    }
    Ok(())
}

fn cancel(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut wizard = load_active(root)?;
    let exit = wizard.cancel().context("failed to cancel wizard")?;
    Wizard::discard(root).context("failed to remove wizard session")?;

    if json {
        print_json(&serde_json::json!({
            "cancelled": true,
            "discarded_fields": exit.discarded_fields,
        }))?;
    } else {
        println!(
            "Wizard cancelled; {} field(s) discarded.",
            exit.discarded_fields
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use certify_core::record::FieldValue;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("notes=a=b").unwrap(),
            ("notes".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn patch_uses_schema_kinds() {
        let patch = build_patch(vec![
            ("acceptTerms".to_string(), "yes".to_string()),
            ("postalCode".to_string(), "0150".to_string()),
            ("colour".to_string(), "green".to_string()),
        ])
        .unwrap();
        assert_eq!(patch.get("acceptTerms"), Some(&FieldValue::Flag(true)));
        assert_eq!(patch.get_str("postalCode"), Some("0150"));
        assert_eq!(patch.get_str("colour"), Some("green"));
    }
}
