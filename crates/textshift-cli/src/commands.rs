//! Subcommand implementations

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use textshift_convert::{BatchEvent, BatchSummary, Converter};
use textshift_loader::{FileLoader, LoadedText, find_all, list_text_files};
use textshift_mapping::{MappingStore, MappingTable};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Settings shared by every command of one invocation
pub struct AppContext {
    pub config: AppConfig,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn loader(&self) -> FileLoader {
        FileLoader::new(self.config.loader_config())
    }

    fn mapping_table(&self) -> anyhow::Result<MappingTable> {
        match &self.config.convert.mapping {
            Some(path) => {
                info!("Using mapping: {}", path.display());
                Ok(MappingStore::new(path).load()?)
            }
            None => {
                debug!("Using builtin mapping table");
                Ok(MappingTable::builtin())
            }
        }
    }
}

async fn load(ctx: &AppContext, file: &Path, show_progress: bool) -> anyhow::Result<LoadedText> {
    let handle = ctx.loader().load(file)?;
    let text = handle
        .wait(|percent| {
            if show_progress {
                eprint!("\rLoading... {percent}%");
                let _ = std::io::stderr().flush();
            }
        })
        .await;
    if show_progress {
        eprintln!();
    }
    Ok(text?)
}

pub async fn view(ctx: &AppContext, file: &Path, content: bool) -> anyhow::Result<ExitCode> {
    info!("Viewing {}", file.display());
    let text = load(ctx, file, true).await?;

    println!("{}", text.summary());
    if content {
        println!("{}", text.content);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn list(ctx: &AppContext, dir: &Path) -> anyhow::Result<ExitCode> {
    let config = ctx.config.loader_config();
    let files = list_text_files(dir, config.extensions.as_slice())?;
    for file in &files {
        if let Some(name) = file.file_name() {
            println!("{}", name.to_string_lossy());
        }
    }
    debug!("Listed {} files in {}", files.len(), dir.display());
    Ok(ExitCode::SUCCESS)
}

/// Prints `line:column: text` per match; exits 1 when nothing matched
pub async fn find(
    ctx: &AppContext,
    file: &Path,
    needle: &str,
    case_sensitive: bool,
) -> anyhow::Result<ExitCode> {
    if needle.is_empty() {
        bail!("search text must not be empty");
    }
    let text = load(ctx, file, false).await?;
    let matches = find_all(&text.content, needle, case_sensitive);

    let lines: Vec<&str> = text.content.lines().collect();
    for m in &matches {
        let line = lines.get(m.line - 1).copied().unwrap_or_default();
        println!("{}:{}: {}", m.line, m.column, line);
    }

    if matches.is_empty() {
        eprintln!("'{needle}' not found in {}", file.display());
        return Ok(ExitCode::FAILURE);
    }
    info!("{} matches in {}", matches.len(), file.display());
    Ok(ExitCode::SUCCESS)
}

pub async fn convert(ctx: &AppContext, path: PathBuf) -> anyhow::Result<ExitCode> {
    let table = ctx.mapping_table()?;
    let converter = Converter::new(table, ctx.config.convert_config());
    info!("Converting {}", path.display());

    let summary: BatchSummary = tokio::task::spawn_blocking(move || {
        converter.convert_path(&path, |event| match event {
            BatchEvent::FileConverted(result) if result.success => {
                println!("OK {}", result.output.display());
            }
            BatchEvent::FileConverted(result) => {
                println!(
                    "FAIL {}: {}",
                    result.source.display(),
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            BatchEvent::Progress { percent, .. } => {
                eprint!("\rProgress: {percent}%");
                let _ = std::io::stderr().flush();
            }
            BatchEvent::Completed(_) => eprintln!(),
        })
    })
    .await
    .context("conversion worker panicked")??;

    println!("{summary}");
    if summary.stopped_early {
        eprintln!("stopped after the first failure");
    }
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn mapping_init(file: &Path, force: bool) -> anyhow::Result<ExitCode> {
    let store = MappingStore::new(file);
    if store.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", file.display());
    }
    let table = MappingTable::builtin();
    store.save(&table)?;
    println!("Wrote {} mappings to {}", table.len(), file.display());
    Ok(ExitCode::SUCCESS)
}

pub fn mapping_show(file: &Path) -> anyhow::Result<ExitCode> {
    let table = MappingStore::new(file).load()?;
    for (from, to) in table.iter() {
        println!("{from} -> {to}");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn mapping_set(file: &Path, from: String, to: String) -> anyhow::Result<ExitCode> {
    if to.is_empty() {
        bail!("mapping target must not be empty");
    }
    let store = MappingStore::new(file);
    let mut table = store.load_or(MappingTable::new())?;

    let previous = table.insert(from.as_str(), to.as_str())?;
    store.save(&table)?;
    match previous {
        Some(old) => println!("Updated {from} -> {to} (was {old})"),
        None => println!("Added {from} -> {to}"),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn mapping_remove(file: &Path, from: &str) -> anyhow::Result<ExitCode> {
    let store = MappingStore::new(file);
    let mut table = store.load()?;

    let Some(to) = table.remove(from) else {
        bail!("no mapping for '{from}' in {}", file.display());
    };
    store
        .save(&table)
        .with_context(|| format!("cannot remove the last mapping from {}", file.display()))?;
    println!("Removed {from} -> {to}");
    Ok(ExitCode::SUCCESS)
}
