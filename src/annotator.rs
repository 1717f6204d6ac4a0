//! Keyword highlighting and annotation.
//!
//! Lexicon words in the poem are wrapped in `【】` (longest match wins at each
//! position) and every distinct highlighted word gets one annotation with its
//! gloss, the emotion categories it evokes and its imagery kind.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Annotation, AnnotationResult};
use crate::lexicon::{Lexicon, Tag};
use crate::pinyin::to_pinyin_diacritics;

pub struct Annotator {
  lexicon: Arc<Lexicon>,
  /// Highlightable words, longest first.
  keywords: Vec<String>,
}

impl Annotator {
  pub fn new(lexicon: Arc<Lexicon>) -> Self {
    let mut keywords: Vec<String> = lexicon
      .glosses()
      .iter()
      .map(|g| g.word.clone())
      .chain(lexicon.emotions().iter().flat_map(|e| e.imagery.iter().cloned()))
      .chain(
        lexicon
          .imagery()
          .iter()
          .flat_map(|g| g.words.iter())
          .filter(|w| w.chars().count() >= 2)
          .cloned(),
      )
      .filter(|w| !w.is_empty())
      .collect();
    keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    keywords.dedup();
    Self { lexicon, keywords }
  }

  fn annotate_word(&self, word: &str) -> Annotation {
    let mut ann = Annotation { word: word.to_string(), gloss: None, emotions: Vec::new(), imagery_kind: None };
    for tag in self.lexicon.lookup(word) {
      match tag {
        Tag::Gloss(m) if ann.gloss.is_none() => ann.gloss = Some(m),
        Tag::EmotionImagery(e) if !ann.emotions.contains(&e) => ann.emotions.push(e),
        Tag::Imagery(kind) if ann.imagery_kind.is_none() => ann.imagery_kind = Some(kind.label_zh().to_string()),
        _ => {}
      }
    }
    ann
  }

  pub fn annotate(&self, text: &str) -> AnnotationResult {
    let chars: Vec<char> = text.chars().collect();
    let mut highlighted = String::with_capacity(text.len() * 2);
    let mut seen = HashSet::new();
    let mut annotations = Vec::new();
    let mut i = 0;

    while i < chars.len() {
      let rest: String = chars[i..].iter().collect();
      match self.keywords.iter().find(|k| rest.starts_with(k.as_str())) {
        Some(word) => {
          highlighted.push('【');
          highlighted.push_str(word);
          highlighted.push('】');
          if seen.insert(word.clone()) {
            annotations.push(self.annotate_word(word));
          }
          i += word.chars().count();
        }
        None => {
          highlighted.push(chars[i]);
          i += 1;
        }
      }
    }

    debug!(target: "poem_analyzer", keywords = annotations.len(), "Poem annotated");
    AnnotationResult { highlighted, annotations, pinyin: to_pinyin_diacritics(text) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn longest_keyword_is_highlighted_once_per_position() {
    let lx = Lexicon::empty().with_gloss("月笼沙", "月光笼罩着沙滩").with_gloss("寒水", "寒冷的水");
    let a = Annotator::new(Arc::new(lx));
    let r = a.annotate("烟笼寒水月笼沙");
    assert_eq!(r.highlighted, "烟笼【寒水】【月笼沙】");
    assert_eq!(r.annotations.len(), 2);
    assert_eq!(r.annotations[1].gloss.as_deref(), Some("月光笼罩着沙滩"));
  }

  #[test]
  fn annotations_merge_gloss_and_emotions() {
    let a = Annotator::new(Arc::new(Lexicon::builtin()));
    let r = a.annotate("举头望明月，低头思故乡。");
    assert_eq!(r.highlighted, "举头望【明月】，低头思故乡。");
    let ann = &r.annotations[0];
    assert_eq!(ann.gloss.as_deref(), Some("明亮的月亮"));
    assert_eq!(ann.emotions, vec!["思乡".to_string(), "清静".to_string()]);
    assert!(r.pinyin.starts_with("jǔ tóu"));
  }

  #[test]
  fn repeated_words_are_annotated_once() {
    let a = Annotator::new(Arc::new(Lexicon::builtin()));
    let r = a.annotate("明月明月");
    assert_eq!(r.highlighted, "【明月】【明月】");
    assert_eq!(r.annotations.len(), 1);
  }
}
