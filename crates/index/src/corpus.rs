use std::fs;
use std::path::{Path, PathBuf};

use crate::{Document, IndexError, TextSplitter};

const CORPUS_EXTENSIONS: &[&str] = &["txt", "md"];

/// Raw text of one corpus file.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceText {
    /// Path relative to the corpus root, with `/` separators.
    pub source: String,
    pub text: String,
}

/// Reads every `.txt` / `.md` file under `root`, recursively, in sorted path order.
///
/// Empty files are skipped. Non-UTF-8 files are skipped with a warning rather
/// than aborting the whole build.
pub fn load_corpus(root: &Path) -> Result<Vec<SourceText>, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::Io(format!(
            "corpus directory {} does not exist",
            root.display()
        )));
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut out = Vec::with_capacity(files.len());
    for path in files {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                log::warn!("skipping non-UTF-8 corpus file {}", path.display());
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            continue;
        }
        out.push(SourceText {
            source: relative_source(root, &path),
            text,
        });
    }

    log::info!("loaded {} corpus files from {}", out.len(), root.display());
    Ok(out)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IndexError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| CORPUS_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn relative_source(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Cuts corpus files into documents. Ids are `"{source}#{chunk}"`.
pub fn chunk_sources(sources: &[SourceText], splitter: &TextSplitter) -> Vec<Document> {
    let mut docs = Vec::new();
    for src in sources {
        for (i, chunk) in splitter.split(&src.text).into_iter().enumerate() {
            docs.push(Document::new(
                format!("{}#{i}", src.source),
                chunk,
                src.source.clone(),
            ));
        }
    }
    docs
}
