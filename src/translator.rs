//! Rule-based modern-Chinese rendering of a classical poem.
//!
//! Each clause has every gloss word replaced by its modern gloss (lexicon
//! order), then the literal substitutions applied. Replacement is plain
//! substring substitution over the running text, so later rules also see the
//! output of earlier ones: `床前明月光` becomes `床前明亮的月亮光`.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::domain::{Explained, Gloss, TranslationResult};
use crate::lexicon::{KeywordRule, Lexicon};
use crate::seeds::translation_examples;
use crate::util::is_line_break;

pub struct Translator {
  lexicon: Arc<Lexicon>,
}

fn first_rule(rules: &[KeywordRule], text: &str) -> Option<Explained> {
  rules
    .iter()
    .find(|r| r.keywords.iter().any(|k| !k.is_empty() && text.contains(k.as_str())))
    .map(|r| Explained { name: r.name.clone(), explanation: r.explanation.clone() })
}

impl Translator {
  pub fn new(lexicon: Arc<Lexicon>) -> Self {
    Self { lexicon }
  }

  pub fn translate_clause(&self, clause: &str) -> String {
    let mut out = clause.to_string();
    for g in self.lexicon.glosses() {
      if !g.word.is_empty() && out.contains(g.word.as_str()) {
        out = out.replace(g.word.as_str(), &g.meaning);
      }
    }
    for s in self.lexicon.substitutions() {
      if !s.from.is_empty() {
        out = out.replace(s.from.as_str(), &s.to);
      }
    }
    out
  }

  pub fn identify_theme(&self, text: &str) -> Option<Explained> {
    first_rule(self.lexicon.themes(), text)
  }

  pub fn identify_rhetoric(&self, text: &str) -> Option<Explained> {
    first_rule(self.lexicon.rhetoric(), text)
  }

  /// Gloss words present in the text, lexicon order.
  pub fn identify_imagery(&self, text: &str) -> Vec<Gloss> {
    self
      .lexicon
      .glosses()
      .iter()
      .filter(|g| !g.word.is_empty() && text.contains(g.word.as_str()))
      .map(|g| Gloss { word: g.word.clone(), meaning: g.meaning.clone() })
      .collect()
  }

  #[instrument(level = "info", skip(self, poem), fields(text_len = poem.len()))]
  pub fn translate(&self, poem: &str) -> TranslationResult {
    let clauses: Vec<String> = poem
      .split(is_line_break)
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .map(|c| self.translate_clause(c))
      .collect();
    let translation = format!("{}。", clauses.join("，"));

    let theme = self.identify_theme(poem);
    let rhetoric = self.identify_rhetoric(poem);
    let imagery = self.identify_imagery(poem);

    let mut explanation = Vec::new();
    if let Some(t) = &theme {
      explanation.push(format!("主题：{}", t.explanation));
    }
    if let Some(r) = &rhetoric {
      explanation.push(format!("修辞：{}", r.explanation));
    }
    if !imagery.is_empty() {
      explanation.push("意象分析：".to_string());
      for g in &imagery {
        explanation.push(format!("- {}：{}", g.word, g.meaning));
      }
    }

    debug!(target: "translate", clauses = clauses.len(), glosses = imagery.len(), "Poem translated");
    TranslationResult {
      original: poem.to_string(),
      translation,
      theme,
      rhetoric,
      imagery,
      explanation: explanation.join("\n"),
    }
  }

  /// Translate a random poem from the built-in examples.
  pub fn random_example(&self) -> TranslationResult {
    let examples = translation_examples();
    let poem = examples.choose(&mut rand::thread_rng()).copied().unwrap_or_default();
    self.translate(poem)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn builtin() -> Translator {
    Translator::new(Arc::new(Lexicon::builtin()))
  }

  #[test]
  fn gloss_substitution_is_naive() {
    let t = Translator::new(Arc::new(Lexicon::empty().with_gloss("明月", "明亮的月亮")));
    assert_eq!(t.translate("床前明月光").translation, "床前明亮的月亮光。");
  }

  #[test]
  fn literal_substitutions_run_after_glosses() {
    let t = builtin();
    assert_eq!(t.translate_clause("春眠不觉晓"), "春天的睡眠没有觉晓");
  }

  #[test]
  fn theme_and_rhetoric_take_the_first_matching_rule() {
    let r = builtin().translate("床前明月光，疑是地上霜。举头望明月，低头思故乡。");
    assert_eq!(r.theme.as_ref().map(|t| t.name.as_str()), Some("思乡"));
    assert!(r.rhetoric.is_none());
    assert_eq!(r.imagery, vec![Gloss { word: "明月".into(), meaning: "明亮的月亮".into() }]);
    assert!(r.explanation.contains("- 明月：明亮的月亮"));
    assert_eq!(r.translation.matches('，').count(), 3);
  }

  #[test]
  fn random_example_comes_from_the_bank() {
    let r = builtin().random_example();
    assert!(translation_examples().contains(&r.original.as_str()));
  }
}
