//! Import command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use lumi_core::controller::PickedFile;
use lumi_core::pickers::{PresetPickers, TerminalPickers};

use super::ImportArgs;

/// Run the import command.
///
/// Files given on the command line are imported directly; otherwise the
/// user is asked for packages. Given files without the package extension are
/// skipped with a warning. Every file is imported even if an earlier one
/// fails; the command fails if any did.
pub async fn run(args: ImportArgs) -> Result<()> {
    let config = super::load_config();

    let controller = if args.files.is_empty() {
        super::controller_builder(&config, Arc::new(TerminalPickers::stdin())).build()
    } else {
        let files = args
            .files
            .iter()
            .map(std::path::absolute)
            .collect::<std::io::Result<Vec<_>>>()?;
        let (files, skipped) = split_packages(files, &config.export.package_extension);
        for path in &skipped {
            eprintln!(
                "Skipping {}: not a .{} package",
                path.display(),
                config.export.package_extension
            );
        }
        if files.is_empty() {
            anyhow::bail!(
                "none of the given files is a .{} package",
                config.export.package_extension
            );
        }
        super::controller_builder(
            &config,
            Arc::new(PresetPickers::default().with_open_paths(files)),
        )
        .build()
    };

    let Some(picked) = controller.pick_h5p_files().await? else {
        println!("No packages selected.");
        return Ok(());
    };

    let mut imported = Vec::with_capacity(picked.len());
    let mut failed = 0usize;
    for PickedFile {
        file_handle_id,
        path,
    } in picked
    {
        match controller.import(&file_handle_id).await {
            Ok(saved) => {
                if !args.json {
                    println!(
                        "Imported {} as content {} ({})",
                        path.display(),
                        saved.id,
                        saved.library
                    );
                }
                imported.push(saved);
            }
            Err(e) => {
                eprintln!("Failed to import {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&imported)?);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} packages failed to import", failed, failed + imported.len());
    }
    Ok(())
}

/// Split `files` into packages carrying `extension` and everything else.
fn split_packages(files: Vec<PathBuf>, extension: &str) -> (Vec<PathBuf>, Vec<PathBuf>) {
    files
        .into_iter()
        .partition(|path| has_extension(path, extension))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_packages() {
        let (packages, skipped) = split_packages(
            vec![
                PathBuf::from("/in/a.h5p"),
                PathBuf::from("/in/notes.txt"),
                PathBuf::from("/in/B.H5P"),
                PathBuf::from("/in/archive"),
            ],
            "h5p",
        );

        assert_eq!(
            packages,
            vec![PathBuf::from("/in/a.h5p"), PathBuf::from("/in/B.H5P")]
        );
        assert_eq!(
            skipped,
            vec![PathBuf::from("/in/notes.txt"), PathBuf::from("/in/archive")]
        );
    }
}
