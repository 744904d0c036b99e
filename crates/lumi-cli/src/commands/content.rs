//! Content commands: list, show, update and delete.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumi_core::content::{ContentMetadata, DirectoryContentEngine};
use lumi_core::pickers::PresetPickers;

use super::{DeleteArgs, ListArgs, ShowArgs, UpdateArgs};

/// Run the list command.
pub async fn list(args: ListArgs) -> Result<()> {
    let config = super::load_config();
    let engine = DirectoryContentEngine::new(&config.paths.content_dir);
    let items = engine.list().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!();
    println!("Stored Content:");
    println!("{}", "─".repeat(60));
    println!("  {:6}  {:30}  {:20}", "Id", "Title", "Library");
    println!("{}", "─".repeat(60));

    if items.is_empty() {
        println!("  (no content in {})", engine.root().display());
    }
    for item in &items {
        println!(
            "  {:6}  {:30}  {:20}",
            item.id,
            item.title.as_deref().unwrap_or("-"),
            item.main_library
        );
    }

    println!("{}", "─".repeat(60));
    Ok(())
}

/// Run the show command.
pub async fn show(args: ShowArgs) -> Result<()> {
    let config = super::load_config();
    let controller =
        super::controller_builder(&config, Arc::new(PresetPickers::cancelling())).build();

    let content = controller.load_package(&args.id).await?;
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}

/// Run the update command.
pub async fn update(args: UpdateArgs) -> Result<()> {
    let config = super::load_config();
    let controller =
        super::controller_builder(&config, Arc::new(PresetPickers::cancelling())).build();

    let parameters: serde_json::Value = read_json(&args.params).await?;
    let metadata: ContentMetadata = read_json(&args.metadata).await?;

    let saved = controller
        .update(parameters, metadata, args.library, args.id.as_deref())
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!("Saved content {} ({})", saved.id, saved.library);
    }
    Ok(())
}

/// Run the delete command.
pub async fn delete(args: DeleteArgs) -> Result<()> {
    let config = super::load_config();
    let controller =
        super::controller_builder(&config, Arc::new(PresetPickers::cancelling())).build();

    controller.delete(&args.id).await?;
    println!("Deleted content {}.", args.id);
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}
