/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use pdf_translator::file_utils::FileManager;
use pdf_translator::reconstruction::CategoryKind;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that dir_exists distinguishes directories
#[test]
fn test_dir_exists_withExistingDir_shouldReturnTrue() {
    assert!(FileManager::dir_exists("."));
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
}

/// Test that generate_output_path creates the correct path
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let output_path = FileManager::generate_output_path(
        Path::new("/tmp/input/paper.pdf"),
        Path::new("/tmp/output"),
        "JA",
        "md",
    );
    assert_eq!(output_path, Path::new("/tmp/output/paper.JA.md"));
}

/// Test that hit files are named after the category
#[test]
fn test_hit_file_path_shouldUseCategorySuffix() {
    let path = FileManager::hit_file_path(Path::new("/in/paper.pdf"), Path::new("/out"), CategoryKind::ReturnIgnore);
    assert_eq!(path, Path::new("/out/paper_ReturnIgnore.txt"));
}

/// Test that outputs go next to the input unless configured otherwise
#[test]
fn test_output_dir_for_shouldPreferConfiguredDirectory() {
    let input = Path::new("/papers/2024/paper.pdf");
    assert_eq!(FileManager::output_dir_for(input, None), PathBuf::from("/papers/2024"));
    assert_eq!(
        FileManager::output_dir_for(input, Some(Path::new("/out"))),
        PathBuf::from("/out")
    );
}

/// Test recognition of files written by earlier runs
#[test]
fn test_is_generated_file_shouldMatchOutputsOnly() {
    assert!(FileManager::is_generated_file("paper.JA.md"));
    assert!(FileManager::is_generated_file("paper.EN-US.txt"));
    assert!(FileManager::is_generated_file("paper_Return.txt"));
    assert!(FileManager::is_generated_file("paper.units.txt"));
    assert!(FileManager::is_generated_file("paper.JA.partial.md"));
    assert!(!FileManager::is_generated_file("paper.v1.txt"));
    assert!(!FileManager::is_generated_file("paper.txt"));
    assert!(!FileManager::is_generated_file("paper.pdf"));
}

/// Test that the units file keeps the whole input stem
#[test]
fn test_units_file_path_withDottedStem_shouldKeepEveryPart() {
    assert_eq!(
        FileManager::units_file_path("/papers/paper.v1.pdf", "/out"),
        PathBuf::from("/out/paper.v1.units.txt")
    );
    assert_eq!(
        FileManager::units_file_path("/papers/paper.txt", "/out"),
        PathBuf::from("/out/paper.units.txt")
    );
}

/// Test the name of a cancelled document's output
#[test]
fn test_partial_output_path_shouldInsertMarkerBeforeExtension() {
    assert_eq!(
        FileManager::partial_output_path("/out/paper.JA.md"),
        PathBuf::from("/out/paper.JA.partial.md")
    );
    assert_eq!(
        FileManager::partial_output_path("/out/paper.v1.EN-US.txt"),
        PathBuf::from("/out/paper.v1.EN-US.partial.txt")
    );
}

/// Test that remove_if_exists reports whether anything was removed
#[test]
fn test_remove_if_exists_shouldOnlyRemoveFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "paper.JA.partial.md", "x")?;

    assert!(FileManager::remove_if_exists(&path)?);
    assert!(!path.exists());
    assert!(!FileManager::remove_if_exists(&path)?);
    Ok(())
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&test_subdir)?;
    assert!(test_subdir.is_dir());
    Ok(())
}

/// Test that find_inputs walks subdirectories and skips generated files
#[test]
fn test_find_inputs_withMixedFiles_shouldReturnSortedInputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("sub"))?;

    common::create_test_file(root, "b.pdf", "")?;
    common::create_test_file(root, "a.txt", "")?;
    common::create_test_file(&root.join("sub"), "c.pdf", "")?;
    common::create_test_file(root, "a.JA.md", "")?;
    common::create_test_file(root, "a_Start.txt", "")?;
    common::create_test_file(root, "notes.docx", "")?;
    common::create_test_file(root, "a.units.txt", "")?;
    common::create_test_file(root, "a.JA.partial.md", "")?;
    common::create_test_file(root, "d.v2.txt", "")?;

    let inputs = FileManager::find_inputs(root)?;
    assert_eq!(
        inputs,
        vec![root.join("a.txt"), root.join("b.pdf"), root.join("d.v2.txt"), root.join("sub").join("c.pdf")]
    );
    Ok(())
}

/// Test that write_atomic creates parents and replaces existing content
#[test]
fn test_write_atomic_shouldReplaceContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("paper.JA.md");

    FileManager::write_atomic(&path, "first")?;
    FileManager::write_atomic(&path, "second")?;

    assert_eq!(FileManager::read_to_string(&path)?, "second");
    assert_eq!(fs::read_dir(path.parent().unwrap())?.count(), 1);
    Ok(())
}
