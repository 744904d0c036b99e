//! Config command implementation.

use anyhow::Result;
use lumi_core::config::Config;

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub async fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = Config::load()?;

            println!();
            println!("Lumi Configuration");
            println!("{}", "─".repeat(50));
            println!();
            println!("[paths]");
            println!("  content_dir = \"{}\"", config.paths.content_dir.display());
            println!("  state_file = \"{}\"", config.paths.state_file.display());
            println!();
            println!("[export]");
            println!("  package_extension = \"{}\"", config.export.package_extension);
            println!("  format_name = \"{}\"", config.export.format_name);
            println!("  fallback_filename = \"{}\"", config.export.fallback_filename);
            println!("  dialog_title = \"{}\"", config.export.dialog_title);
            println!();
            println!("[web]");
            println!("  port = {}", config.web.port);
            println!("  localhost_only = {}", config.web.localhost_only);
            println!();
        }

        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }

        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults.");
        }
    }

    Ok(())
}
