//! Saved prompt library commands.

use anyhow::Result;
use promptforge_application::LibraryService;
use promptforge_core::auth::StaticAuthService;
use promptforge_infrastructure::TomlPromptRepository;
use promptforge_types::PromptRecord;
use std::sync::Arc;

/// Builds the library over the local TOML store.
///
/// The local CLI is single-user; the user id comes from `PROMPTFORGE_USER`
/// and defaults to "local".
fn open_library() -> Result<LibraryService> {
    let repository = Arc::new(TomlPromptRepository::default_location()?);
    let user = std::env::var("PROMPTFORGE_USER").unwrap_or_else(|_| "local".to_string());
    let auth = Arc::new(StaticAuthService::signed_in(user.clone(), user));
    Ok(LibraryService::new(repository, auth))
}

pub async fn list(root_id: &str) -> Result<()> {
    let library = open_library()?;
    let versions = library.list_versions(root_id).await?;
    if versions.is_empty() {
        println!("No versions found for {}", root_id);
        return Ok(());
    }
    for record in versions {
        print_record(&record);
    }
    Ok(())
}

pub async fn search(query: &str) -> Result<()> {
    let library = open_library()?;
    let hits = library.search(query).await?;
    if hits.is_empty() {
        println!("No saved prompts match '{}'", query);
        return Ok(());
    }
    for record in hits {
        print_record(&record);
    }
    Ok(())
}

pub async fn delete(id: &str) -> Result<()> {
    let library = open_library()?;
    library.delete(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

pub async fn count() -> Result<()> {
    let library = open_library()?;
    println!("{} saved prompt(s)", library.count().await?);
    Ok(())
}

fn print_record(record: &PromptRecord) {
    println!(
        "{}  v{}  [{}]  {}",
        record.id,
        record.version,
        record.created_at,
        record.original_input.lines().next().unwrap_or("")
    );
}
