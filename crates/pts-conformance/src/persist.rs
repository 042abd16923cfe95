#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use sha2::{Digest, Sha256};

use crate::corpus::Corpus;
use crate::error::HarnessError;

const INDENT: &[u8] = b"    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub path: PathBuf,
    pub case_count: usize,
    pub bytes: usize,
    pub sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// JSON with 4-space indentation, cases in insertion order.
pub fn render_corpus(corpus: &Corpus) -> Result<String, HarnessError> {
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    corpus.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Replaces whatever corpus file exists at `path`; there is no merge.
pub fn write_corpus(path: &Path, corpus: &Corpus) -> Result<PersistReport, HarnessError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| HarnessError::io("creating", parent, err))?;
    }

    let raw = render_corpus(corpus)?;
    fs::write(path, &raw).map_err(|err| HarnessError::io("writing", path, err))?;

    Ok(PersistReport {
        path: path.to_path_buf(),
        case_count: corpus.len(),
        bytes: raw.len(),
        sha256: sha256_hex(raw.as_bytes()),
    })
}

pub fn load_corpus(path: &Path) -> Result<Corpus, HarnessError> {
    let raw = fs::read_to_string(path).map_err(|err| HarnessError::io("reading", path, err))?;
    Ok(serde_json::from_str(&raw)?)
}
