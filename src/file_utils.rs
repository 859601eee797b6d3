use anyhow::{Result, Context};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::extractor::InputKind;
use crate::reconstruction::CategoryKind;

// @module: File and directory utilities

// Translated output such as "paper.JA.md" or "paper.EN-US.txt"
static TRANSLATED_OUTPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[A-Za-z]{2}(-[A-Za-z0-9]+)?\.(md|txt)$").expect("valid static regex"));

// Rule hit dump such as "paper_Return.txt"
static HIT_FILE: Lazy<Regex> = Lazy::new(|| {
    let suffixes: Vec<&str> = CategoryKind::ALL.iter().map(|k| k.hit_file_suffix()).collect();
    Regex::new(&format!(r"_({})\.txt$", suffixes.join("|"))).expect("valid static regex")
});

// Dry-run unit listing such as "paper.units.txt"
static UNITS_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.units\.txt$").expect("valid static regex"));

// Output of a cancelled run such as "paper.JA.partial.md"
static PARTIAL_OUTPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.partial\.(md|txt)$").expect("valid static regex"));

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: Directory outputs of `input_file` go to
    pub fn output_dir_for<P: AsRef<Path>>(input_file: P, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(dir) => dir.to_path_buf(),
            None => input_file
                .as_ref()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    // @generates: Output path for a translated document
    // @params: input_file, output_dir, target_language, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    // @generates: Path of the rule hit file for one category
    pub fn hit_file_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        category: CategoryKind,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        output_dir
            .as_ref()
            .join(format!("{}_{}.txt", stem.to_string_lossy(), category.hit_file_suffix()))
    }

    // @generates: Path of the dry-run unit listing, `<input stem>.units.txt`
    pub fn units_file_path<P1: AsRef<Path>, P2: AsRef<Path>>(input_file: P1, output_dir: P2) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        output_dir
            .as_ref()
            .join(format!("{}.units.txt", stem.to_string_lossy()))
    }

    /// `paper.JA.md` becomes `paper.JA.partial.md`
    pub fn partial_output_path<P: AsRef<Path>>(output_path: P) -> PathBuf {
        let path = output_path.as_ref();
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        match path.extension() {
            Some(ext) => path.with_file_name(format!("{}.partial.{}", stem, ext.to_string_lossy())),
            None => path.with_file_name(format!("{}.partial", stem)),
        }
    }

    /// Whether `path` looks like something this tool wrote
    pub fn is_generated_file<P: AsRef<Path>>(path: P) -> bool {
        let name = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        TRANSLATED_OUTPUT.is_match(&name)
            || HIT_FILE.is_match(&name)
            || UNITS_FILE.is_match(&name)
            || PARTIAL_OUTPUT.is_match(&name)
    }

    /// Find input documents (PDF and text) in a directory, sorted by path.
    /// Files written by earlier runs are skipped.
    pub fn find_inputs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || InputKind::from_path(path).is_none() {
                continue;
            }
            if Self::is_generated_file(path) {
                debug!("Skipping {}, its name matches a generated output", path.display());
                continue;
            }
            result.push(path.to_path_buf());
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Remove `path` if it exists; returns whether a file was removed
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {:?}", path))?;
        Ok(true)
    }

    /// Write a string to a file through a temporary file in the same
    /// directory, so readers never see a partial document
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::ensure_dir(parent)?;

        let mut file = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        file.persist(path)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;

        Ok(())
    }
}
