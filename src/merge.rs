// src/merge.rs
// Combines generated pages into one document. Each file's full contents are
// wrapped, unmodified, in a labelled container.

use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::collect_inputs;
use crate::utils::error::MergeError;

pub const MERGED_FILE_CLASS: &str = "merged-file";
pub const MERGE_EXTENSIONS: &[&str] = &["html"];

const MERGED_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8"/>
  <title>Merged HTML</title>
</head>
<body>
"#;

const MERGED_TAIL: &str = "</body>\n</html>\n";

#[derive(Debug, Default)]
pub struct MergeReport {
    pub merged: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Directories are expanded to their `.html` files; the output file itself is
/// never an input, so re-running a merge does not nest the previous result.
pub fn collect_merge_inputs(paths: &[PathBuf], output: &Path) -> Vec<PathBuf> {
    let output_canonical = fs::canonicalize(output).ok();
    collect_inputs(paths, MERGE_EXTENSIONS)
        .into_iter()
        .filter(|path| {
            let is_output = path == output
                || (output_canonical.is_some() && fs::canonicalize(path).ok() == output_canonical);
            if is_output {
                tracing::debug!("Not merging the output file {}", path.display());
            }
            !is_output
        })
        .collect()
}

/// Wraps one file's contents with start/end markers.
pub fn wrap_file(name: &str, contents: &str) -> String {
    format!(
        "<div class=\"{class}\"><!-- START of {name} -->\n{contents}\n<!-- END of {name} --></div>\n",
        class = MERGED_FILE_CLASS,
        name = name,
        contents = contents,
    )
}

/// Merges `inputs` (sorted by file name) into `output`. Missing or unreadable
/// inputs are logged and skipped.
pub fn merge_files(inputs: &[PathBuf], output: &Path) -> Result<MergeReport, MergeError> {
    let mut inputs = inputs.to_vec();
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));

    let mut report = MergeReport::default();
    let mut merged = String::from(MERGED_HEAD);

    for path in inputs {
        if !path.is_file() {
            tracing::warn!("File not found: {}", path.display());
            report.skipped.push(path);
            continue;
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                report.skipped.push(path);
                continue;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        merged.push_str(&wrap_file(&name, &String::from_utf8_lossy(&bytes)));
        report.merged.push(path);
    }

    merged.push_str(MERGED_TAIL);
    fs::write(output, merged)?;

    tracing::info!("Successfully merged {} files into: {}", report.merged.len(), output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_two_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = dir.path().join("b_pokemon.html");
        let a = dir.path().join("a_pokemon.html");
        fs::write(&b, "<html><body><h1>B</h1></body></html>").unwrap();
        fs::write(&a, "<html><body><h1>A</h1></body></html>").unwrap();
        let output = dir.path().join("merged.html");

        let inputs = collect_merge_inputs(&[dir.path().to_path_buf()], &output);
        let report = merge_files(&inputs, &output).unwrap();
        assert_eq!(report.merged, vec![a, b]);

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.starts_with("<!DOCTYPE html>"));
        assert_eq!(merged.matches("<h1>A</h1>").count(), 1);
        assert_eq!(merged.matches("<h1>B</h1>").count(), 1);
        assert_eq!(merged.matches("class=\"merged-file\"").count(), 2);

        let start_a = merged.find("<!-- START of a_pokemon.html -->").unwrap();
        let end_a = merged.find("<!-- END of a_pokemon.html -->").unwrap();
        let start_b = merged.find("<!-- START of b_pokemon.html -->").unwrap();
        let end_b = merged.find("<!-- END of b_pokemon.html -->").unwrap();
        assert!(start_a < merged.find("<h1>A</h1>").unwrap());
        assert!(merged.find("<h1>A</h1>").unwrap() < end_a);
        assert!(end_a < start_b);
        assert!(start_b < end_b);
    }

    #[test]
    fn test_rerun_does_not_merge_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.html"), "<p>x</p>").unwrap();
        let output = dir.path().join("merged.html");

        merge_files(&collect_merge_inputs(&[dir.path().to_path_buf()], &output), &output).unwrap();
        let report = merge_files(&collect_merge_inputs(&[dir.path().to_path_buf()], &output), &output).unwrap();

        assert_eq!(report.merged.len(), 1);
        let merged = fs::read_to_string(&output).unwrap();
        assert_eq!(merged.matches("START of").count(), 1);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.html");
        fs::write(&present, "<p>ok</p>").unwrap();
        let missing = dir.path().join("absent.html");
        let output = dir.path().join("out.html");

        let report = merge_files(&[missing.clone(), present.clone()], &output).unwrap();
        assert_eq!(report.skipped, vec![missing]);
        assert_eq!(report.merged, vec![present]);
        assert!(!fs::read_to_string(&output).unwrap().contains("absent.html"));
    }
}
