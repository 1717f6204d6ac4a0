//! Labeled training corpus: a CSV file with `content` and `label` columns.
//!
//! Corpora collected from poetry sites are often GBK-encoded, so the file is
//! decoded by trying UTF-8, GBK, GB18030 and UTF-16 in turn. A byte-order mark
//! always wins.

use std::borrow::Cow;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::{Encoding, GB18030, GBK, UTF_16BE, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledPoem {
  pub content: String,
  pub label: String,
}

const FALLBACK_ENCODINGS: [&Encoding; 5] = [UTF_8, GBK, GB18030, UTF_16LE, UTF_16BE];

/// Decode raw corpus bytes. Returns the text and the name of the encoding used.
pub fn decode_text(bytes: &[u8]) -> Option<(String, &'static str)> {
  if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
    return enc
      .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
      .map(|s| (s.into_owned(), enc.name()));
  }
  FALLBACK_ENCODINGS.iter().find_map(|enc| {
    enc
      .decode_without_bom_handling_and_without_replacement(bytes)
      .map(|s: Cow<'_, str>| (s.into_owned(), enc.name()))
  })
}

/// Parse CSV text into labeled rows. Rows with empty content or label are
/// dropped; a missing column is a format error.
pub fn parse_csv(text: &str, path: &Path) -> Result<Vec<LabeledPoem>> {
  let mut rdr = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(text.as_bytes());

  let headers = rdr
    .headers()
    .map_err(|e| AnalysisError::CorpusFormat { path: path.to_path_buf(), reason: e.to_string() })?
    .clone();
  for column in ["content", "label"] {
    if !headers.iter().any(|h| h == column) {
      return Err(AnalysisError::CorpusFormat {
        path: path.to_path_buf(),
        reason: format!("missing required column `{}`", column),
      });
    }
  }

  let mut rows = Vec::new();
  let mut skipped = 0usize;
  for record in rdr.deserialize::<LabeledPoem>() {
    match record {
      Ok(row) if !row.content.is_empty() && !row.label.is_empty() => rows.push(row),
      Ok(_) => skipped += 1,
      Err(e) => {
        return Err(AnalysisError::CorpusFormat { path: path.to_path_buf(), reason: e.to_string() });
      }
    }
  }
  if skipped > 0 {
    debug!(target: "classifier", skipped, "Dropped corpus rows with empty content or label");
  }
  Ok(rows)
}

/// Read, decode and parse a corpus file.
pub fn load_corpus(path: &Path) -> Result<Vec<LabeledPoem>> {
  if !path.exists() {
    return Err(AnalysisError::CorpusMissing(path.to_path_buf()));
  }
  let bytes = std::fs::read(path)
    .map_err(|source| AnalysisError::CorpusIo { path: path.to_path_buf(), source })?;

  let (text, encoding) = decode_text(&bytes).ok_or_else(|| {
    warn!(target: "classifier", path = %path.display(), "Corpus is not valid under any supported encoding");
    AnalysisError::CorpusEncoding(path.to_path_buf())
  })?;
  if text.trim().is_empty() {
    return Err(AnalysisError::CorpusEmpty(path.to_path_buf()));
  }

  let rows = parse_csv(&text, path)?;
  if rows.is_empty() {
    return Err(AnalysisError::CorpusEmpty(path.to_path_buf()));
  }
  info!(target: "classifier", path = %path.display(), %encoding, rows = rows.len(), "Corpus loaded");
  Ok(rows)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utf8_is_tried_first() {
    let (text, enc) = decode_text("content,label\n春眠,山水\n".as_bytes()).unwrap();
    assert_eq!(enc, "UTF-8");
    assert!(text.contains("春眠"));
  }

  #[test]
  fn gbk_bytes_fall_back() {
    let (bytes, _, _) = GBK.encode("content,label\n床前明月光,山水\n");
    let (text, enc) = decode_text(&bytes).unwrap();
    assert_eq!(enc, "GBK");
    assert!(text.contains("床前明月光"));
  }

  #[test]
  fn bom_selects_utf16() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "content,label".encode_utf16() {
      bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let (text, enc) = decode_text(&bytes).unwrap();
    assert_eq!(enc, "UTF-16LE");
    assert_eq!(text, "content,label");
  }

  #[test]
  fn missing_label_column_is_a_format_error() {
    let err = parse_csv("content,title\n春眠,孟浩然\n", Path::new("x.csv")).unwrap_err();
    assert!(matches!(err, AnalysisError::CorpusFormat { .. }));
  }

  #[test]
  fn extra_columns_and_blank_rows_are_tolerated() {
    let rows = parse_csv(
      "title,content,label\n春晓,春眠不觉晓,山水\n无题,,山水\n",
      Path::new("x.csv"),
    )
    .unwrap();
    assert_eq!(rows, vec![LabeledPoem { content: "春眠不觉晓".into(), label: "山水".into() }]);
  }

  #[test]
  fn zero_byte_or_blank_file_is_an_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [("zero.csv", ""), ("blank.csv", " \n\n")] {
      let path = dir.path().join(name);
      std::fs::write(&path, body).unwrap();
      assert!(matches!(load_corpus(&path), Err(AnalysisError::CorpusEmpty(_))), "{name}");
    }
  }

  #[test]
  fn header_only_file_is_an_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("header.csv");
    std::fs::write(&path, "content,label\n").unwrap();
    assert!(matches!(load_corpus(&path), Err(AnalysisError::CorpusEmpty(_))));
  }
}
