use anyhow::Result;
use colored::Colorize;
use rhtmx_validation_core::Config;
use std::path::Path;

pub fn execute(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!("Configuration {:?} not found", config_path);
    }
    let config = Config::load(config_path)?;

    println!("{}", "Validation configuration".green().bold());
    println!();
    println!(
        "Decimal separator: {}  Date format: {}",
        config.settings.decimal_char.to_string().cyan(),
        config.settings.date_format.cyan()
    );

    for form_id in config.form_ids() {
        println!();
        println!("Form {}", form_id.cyan().bold());

        for validator in config.validators.iter().filter(|v| v.options.form_id == form_id) {
            let group = validator
                .options
                .group_id()
                .map(|g| format!(" [{}]", g))
                .unwrap_or_default();
            println!(
                "  {} {} -> {}{}",
                validator.kind.name().yellow(),
                validator.options.id,
                validator.options.control_to_validate,
                group.dimmed()
            );
        }
        for summary in config.summaries.iter().filter(|s| s.form_id == form_id) {
            let group = summary
                .validation_group
                .as_deref()
                .filter(|g| !g.is_empty())
                .map(|g| format!(" [{}]", g))
                .unwrap_or_default();
            println!("  {} {}{}", "Summary".yellow(), summary.id, group.dimmed());
        }
    }

    let orphans: Vec<&str> = config
        .validators
        .iter()
        .filter(|v| !config.form_ids().any(|form| form == v.options.form_id))
        .map(|v| v.options.id.as_str())
        .collect();
    if !orphans.is_empty() {
        println!();
        println!(
            "{} Validators without a configured form: {}",
            "⚠".yellow(),
            orphans.join(", ")
        );
    }

    Ok(())
}
