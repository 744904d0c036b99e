//! Export command implementation.

use std::sync::Arc;

use anyhow::Result;
use lumi_core::pickers::{FilePickers, PresetPickers, TerminalPickers};

use super::ExportArgs;

/// Run the export command.
pub async fn run(args: ExportArgs) -> Result<()> {
    let config = super::load_config();

    let pickers: Arc<dyn FilePickers> = match args.to {
        Some(path) => Arc::new(PresetPickers::default().with_save_path(path)),
        None => Arc::new(TerminalPickers::stdin()),
    };
    let controller = super::controller_builder(&config, pickers).build();

    let exported = controller.export(&args.id, None).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&exported)?);
    } else {
        println!("Exported content {} to {}", args.id, exported.path.display());
    }
    Ok(())
}
