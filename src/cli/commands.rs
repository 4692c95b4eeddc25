//! CLI command definitions and handlers

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::core::models::Resolution;
use crate::markup::is_document;
use crate::translator::Translator;

const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];
const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// Commands for NiuTrans Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate HTML or plain-text files
    Translate {
        /// Input file or directory (required)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target language
        #[arg(short, long)]
        to: String,

        /// Source language (detected per piece if not specified)
        #[arg(short, long)]
        from: Option<String>,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Record a reviewed translation that overrides the cached one
    Suggest {
        /// Source language
        #[arg(long)]
        from: String,

        /// Target language
        #[arg(long)]
        to: String,

        /// Source text, exactly as it is translated
        #[arg(long)]
        source: String,

        /// Translation to use from now on
        #[arg(long)]
        target: String,
    },

    /// Show which source language a text resolves to
    Detect {
        /// Text or HTML fragment to inspect
        #[arg(long)]
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Html,
    Text,
}

fn file_kind(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if HTML_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Html)
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Text)
    } else {
        None
    }
}

/// Translatable files under `dir`
fn find_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| file_kind(path).is_some())
        .collect();
    files.sort();
    files
}

/// `page.html` becomes `page_translated.html`; directories get a `translated` subdirectory
fn default_output(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.join("translated");
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}_translated.{}", stem, ext.to_string_lossy()),
        None => format!("{}_translated", stem),
    };
    input.with_file_name(name)
}

fn output_path(input_root: &Path, output_root: &Path, file: &Path) -> PathBuf {
    if input_root.is_dir() {
        match file.strip_prefix(input_root) {
            Ok(relative) => output_root.join(relative),
            Err(_) => output_root.join(file.file_name().unwrap_or_default()),
        }
    } else {
        output_root.to_path_buf()
    }
}

fn translate_file(
    translator: &Translator,
    input: &Path,
    output: &Path,
    to: &str,
    from: Option<&str>,
) -> anyhow::Result<()> {
    let kind = file_kind(input)
        .with_context(|| format!("Unsupported file type: {}", input.display()))?;
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let translated = match kind {
        FileKind::Html if is_document(&content) => translator.translate_document(&content, to, from)?,
        FileKind::Html => translator.translate(&content, to, from)?,
        FileKind::Text => translator.translate_text(&content, to, from)?,
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, translated).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

/// Handle file translation command
pub fn handle_translate(
    translator: &Translator,
    input: PathBuf,
    output: Option<PathBuf>,
    to: String,
    from: Option<String>,
    recursive: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let output = output.unwrap_or_else(|| default_output(&input));

    info!("Starting translation");
    info!("Input: {}", input.display());
    info!("Output: {}", output.display());
    info!("Target language: {}", to);

    let files = if input.is_dir() {
        find_files(&input, recursive)
    } else {
        vec![input.clone()]
    };

    if files.is_empty() {
        anyhow::bail!("No HTML or text files found");
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let mut processed = 0;
    let mut failed = 0;

    for file_path in &files {
        pb.set_message(format!("Processing: {}", file_path.display()));
        let target = output_path(&input, &output, file_path);

        match translate_file(translator, file_path, &target, &to, from.as_deref()) {
            Ok(()) => processed += 1,
            Err(e) => {
                failed += 1;
                warn!("Failed to translate {}: {:#}", file_path.display(), e);
                eprintln!("Error processing {}: {:#}", file_path.display(), e);
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Completed");

    let saved = translator.flush()?;
    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed, {} failed in {:?}, {} cache entries saved",
        processed, failed, duration, saved
    );

    println!("\n✅ Translation completed!");
    println!("   Processed: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, files.len());
    }
    Ok(())
}

/// Handle translation override command
pub fn handle_suggest(
    translator: &Translator,
    from: String,
    to: String,
    source: String,
    target: String,
) -> anyhow::Result<()> {
    translator.suggest(&from, &to, &source, &target)?;
    translator.flush()?;

    println!("✅ Recorded {}_{} translation for {:?}", from, to, source.trim());
    Ok(())
}

/// Handle language detection command
pub fn handle_detect(translator: &Translator, text: String) -> anyhow::Result<()> {
    match translator.resolve_language(&text)? {
        Resolution::Language(lang) => println!("{}", lang),
        Resolution::Skip => println!("skip (no output)"),
        Resolution::PassThrough => println!("pass-through (kept unchanged)"),
    }
    Ok(())
}
