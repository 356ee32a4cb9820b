//! Configuration display command.

use console::style;

use crate::config::Settings;

fn describe_key(key: &Option<String>) -> String {
    match key {
        Some(_) => style("set").green().to_string(),
        None => style("not set").yellow().to_string(),
    }
}

/// Print the resolved settings. API keys are only reported as set or not.
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", style("Server").bold());
    println!("  bind: {}", settings.bind);
    println!(
        "  max concurrent scans: {}",
        settings
            .max_concurrent_scans
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );

    println!("{}", style("Extraction (Gemini)").bold());
    println!("  model: {}", settings.gemini.model);
    println!("  endpoint: {}", settings.gemini.endpoint);
    println!("  timeout: {}s", settings.gemini.timeout_secs);
    println!("  api key: {}", describe_key(&settings.gemini.api_key));

    println!("{}", style("Identity").bold());
    println!("  endpoint: {}", settings.identity.endpoint);
    println!("  api key: {}", describe_key(&settings.identity.api_key));
    match &settings.bootstrap_admin {
        Some(admin) => println!("  bootstrap admin: {} <{}>", admin.id, admin.email),
        None => println!("  bootstrap admin: {}", style("none").yellow()),
    }
    Ok(())
}
