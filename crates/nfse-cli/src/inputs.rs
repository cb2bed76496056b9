//! Input discovery: files, directories, glob patterns and ZIP archives.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, info, warn};
use zip::result::{ZipError, ZipResult};
use zip::ZipArchive;

use nfse_core::XmlDocument;

/// Collect XML documents from every input, in the order given.
///
/// Directories contribute their `.xml` and `.zip` files (not recursively),
/// ZIP archives contribute their `.xml` entries, anything else that is not
/// an existing path is treated as a glob pattern. Files and entries that
/// cannot be read are kept as unreadable documents.
pub fn collect_documents(inputs: &[String]) -> anyhow::Result<Vec<XmlDocument>> {
    let mut documents = Vec::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            entries.sort();
            for entry in entries {
                add_file(&entry, &mut documents);
            }
        } else if path.is_file() {
            add_file(path, &mut documents);
        } else {
            let mut matched = false;
            for entry in glob(input)? {
                let entry = entry?;
                if entry.is_file() {
                    matched = true;
                    add_file(&entry, &mut documents);
                }
            }
            if !matched {
                warn!("No files match {}", input);
            }
        }
    }

    Ok(documents)
}

/// Lower-cased file extension, or an empty string.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn add_file(path: &Path, documents: &mut Vec<XmlDocument>) {
    match extension(path).as_str() {
        "xml" => match fs::read(path) {
            Ok(bytes) => documents.push(XmlDocument::new(file_name(path), bytes)),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                documents.push(XmlDocument::unreadable(file_name(path), e));
            }
        },
        "zip" => read_zip(path, documents),
        other => debug!("Skipping {} (extension {:?})", path.display(), other),
    }
}

/// Append the `.xml` entries of a ZIP archive.
///
/// An archive that cannot be opened counts as one unreadable document;
/// an entry that cannot be read counts as an unreadable document of its own.
fn read_zip(path: &Path, documents: &mut Vec<XmlDocument>) {
    let opened = fs::File::open(path)
        .map_err(ZipError::from)
        .and_then(ZipArchive::new);
    let mut archive = match opened {
        Ok(archive) => archive,
        Err(e) => {
            warn!("Invalid ZIP archive {}: {}", path.display(), e);
            documents.push(XmlDocument::unreadable(file_name(path), e));
            return;
        }
    };

    let mut count = 0;
    for index in 0..archive.len() {
        let Some(name) = archive.name_for_index(index).map(str::to_string) else {
            continue;
        };
        if name.ends_with('/') || !name.to_lowercase().ends_with(".xml") {
            continue;
        }

        let label = name.rsplit('/').next().unwrap_or(&name).to_string();
        match read_entry(&mut archive, index) {
            Ok(bytes) => documents.push(XmlDocument::new(label, bytes)),
            Err(e) => {
                warn!("Cannot read {} in {}: {}", name, path.display(), e);
                documents.push(XmlDocument::unreadable(label, e));
            }
        }
        count += 1;
    }

    info!("Expanded {} XML files from {}", count, path.display());
}

fn read_entry(archive: &mut ZipArchive<fs::File>, index: usize) -> ZipResult<Vec<u8>> {
    let mut entry = archive.by_index(index)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
