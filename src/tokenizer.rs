//! Chinese word segmentation by forward maximum matching.
//!
//! Multi-character dictionary words (taken from the lexicon) are matched
//! greedily, longest first; any other Han character is its own token. Runs of
//! Latin letters/digits form one lowercase token. Punctuation and whitespace
//! never produce tokens.

use std::collections::HashSet;

use crate::lexicon::Lexicon;
use crate::util::is_cjk;

#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
  words: HashSet<String>,
  max_len: usize,
}

impl Tokenizer {
  pub fn new<I, S>(words: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let words: HashSet<String> = words
      .into_iter()
      .map(Into::into)
      .filter(|w: &String| w.chars().count() >= 2)
      .collect();
    let max_len = words.iter().map(|w| w.chars().count()).max().unwrap_or(1);
    Self { words, max_len }
  }

  pub fn from_lexicon(lexicon: &Lexicon) -> Self {
    Self::new(lexicon.words())
  }

  pub fn dictionary_size(&self) -> usize {
    self.words.len()
  }

  pub fn tokenize(&self, text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
      let ch = chars[i];
      if is_cjk(ch) {
        let run = chars[i..].iter().take_while(|c| is_cjk(**c)).count();
        let longest = self.max_len.min(run);
        let matched = (2..=longest).rev().find_map(|len| {
          let candidate: String = chars[i..i + len].iter().collect();
          self.words.contains(&candidate).then_some((candidate, len))
        });
        match matched {
          Some((word, len)) => {
            tokens.push(word);
            i += len;
          }
          None => {
            tokens.push(ch.to_string());
            i += 1;
          }
        }
      } else if ch.is_alphanumeric() {
        let run: String = chars[i..]
          .iter()
          .take_while(|c| c.is_alphanumeric() && !is_cjk(**c))
          .collect();
        i += run.chars().count();
        tokens.push(run.to_lowercase());
      } else {
        i += 1;
      }
    }

    tokens
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn longest_dictionary_word_wins() {
    let t = Tokenizer::new(["明月", "明月光", "地上"]);
    assert_eq!(t.tokenize("床前明月光"), vec!["床", "前", "明月光"]);
    assert_eq!(t.tokenize("疑是地上霜"), vec!["疑", "是", "地上", "霜"]);
  }

  #[test]
  fn punctuation_and_space_are_dropped() {
    let t = Tokenizer::new(["啼鸟"]);
    assert_eq!(t.tokenize("处处闻啼鸟。 \n"), vec!["处", "处", "闻", "啼鸟"]);
  }

  #[test]
  fn latin_runs_become_one_token() {
    let t = Tokenizer::default();
    assert_eq!(t.tokenize("Tang诗 300首"), vec!["tang", "诗", "300", "首"]);
  }

  #[test]
  fn empty_input_gives_no_tokens() {
    assert!(Tokenizer::from_lexicon(&Lexicon::builtin()).tokenize("").is_empty());
  }

  #[test]
  fn single_characters_are_not_dictionary_entries() {
    let t = Tokenizer::new(["月"]);
    assert_eq!(t.dictionary_size(), 0);
  }
}
