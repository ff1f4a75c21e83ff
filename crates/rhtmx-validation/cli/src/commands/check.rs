use anyhow::{Context, Result};
use colored::Colorize;
use rhtmx_validation_core::{Config, Coordinator, Validity};
use std::path::Path;

use crate::values::PageValues;

/// Validate sample values against a configuration. Returns the validity of the scope.
pub async fn execute(
    config_path: &Path,
    values_path: &Path,
    form: Option<&str>,
    group: Option<&str>,
) -> Result<bool> {
    if !config_path.exists() {
        anyhow::bail!("Configuration {:?} not found", config_path);
    }
    let config = Config::load(config_path)?;
    let values = PageValues::load(values_path)?;
    let doc = values.document(&config);

    let mut validation = Coordinator::from_config(doc.clone(), &config)
        .context("Failed to set up validation")?;

    println!("{}", "Validating...".green().bold());
    println!();

    validation.validate(form, group, None)?;
    let answered = validation.dispatch_remote(&values.transport()).await?;
    if answered > 0 {
        println!("Remote checks answered: {}", answered.to_string().cyan());
        println!();
    }

    let manager = match form {
        Some(form_id) => validation.manager(form_id),
        None => validation.managers().first(),
    };
    let Some(manager) = manager else {
        anyhow::bail!("No form to report on");
    };

    println!("Form: {}", manager.form_id().cyan());
    if let Some(group) = group {
        println!("Group: {}", group.cyan());
    }
    println!();

    for validator in manager.validators() {
        let label = format!("{} ({})", validator.id(), validator.kind().name());
        if !validator.is_visible() {
            println!("  {} {}", "-".dimmed(), label.dimmed());
            continue;
        }
        match validator.validity() {
            Validity::Invalid => {
                println!("  {} {}: {}", "✗".red(), label, validator.error_message().red())
            }
            Validity::Unknown => println!("  {} {} (no answer)", "?".yellow(), label),
            Validity::Valid => println!("  {} {}", "✓".green(), label),
        }
    }

    for summary in manager.summaries().iter().filter(|s| s.is_visible()) {
        if let Some(element) = doc.get(summary.id()) {
            println!();
            println!("Summary {}:", summary.id().cyan());
            println!("{}", element.content());
        }
    }
    for message in doc.alerts() {
        println!();
        println!("{}", "Message box:".yellow());
        println!("{}", message);
    }

    let valid = validation.is_valid(form, group);
    println!();
    if valid {
        println!("{}", "All checks passed".green().bold());
    } else {
        println!("{}", "Validation failed".red().bold());
    }
    Ok(valid)
}
