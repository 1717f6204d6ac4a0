//! Metre checks: per-character 平仄, rhyme feet and the five-character
//! regulated quatrain (五言绝句) tone patterns.

use serde::Serialize;

use crate::domain::Poem;
use crate::pinyin::{rhyme_class, tone, Tone};
use crate::util::strip_punct;

/// The two standard tone patterns of a five-character quatrain.
pub const WUYAN_JUEJU_PATTERNS: [&str; 2] = [
  "仄仄平平仄，平平仄仄平。平平平仄仄，仄仄仄平平。",
  "平平仄仄平，仄仄仄平平。仄仄平平仄，平平仄仄平。",
];

const JUEJU_CHARS: usize = 20;

#[derive(Clone, Debug, Serialize)]
pub struct ToneInfo {
  pub ch: char,
  pub tone: Tone,
  pub tone_zh: &'static str,
  /// "平" or "仄".
  pub level: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct RhymeFoot {
  pub line: usize,
  pub ch: char,
  pub rhyme: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JuejuCheck {
  pub is_valid: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  pub actual_pattern: String,
  pub standard_patterns: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MeterReport {
  pub tones: Vec<ToneInfo>,
  pub rhyme_feet: Vec<RhymeFoot>,
  pub is_rhyming: bool,
  pub jueju: JuejuCheck,
}

/// Tone of every character that has a reading; punctuation is skipped.
pub fn check_tones(text: &str) -> Vec<ToneInfo> {
  text
    .chars()
    .filter_map(|ch| {
      tone(ch).map(|t| ToneInfo {
        ch,
        tone: t,
        tone_zh: t.label_zh(),
        level: if t.is_level() { "平" } else { "仄" },
      })
    })
    .collect()
}

/// Last character of every line with its rhyme class. A poem of four or more
/// lines rhymes when lines 2 and 4 share a class; shorter poems always pass.
pub fn check_rhyme(poem: &Poem) -> (Vec<RhymeFoot>, bool) {
  let feet: Vec<RhymeFoot> = poem
    .line_endings()
    .into_iter()
    .enumerate()
    .map(|(i, ch)| RhymeFoot { line: i + 1, ch, rhyme: rhyme_class(ch) })
    .collect();
  let is_rhyming = if feet.len() >= 4 {
    feet[1].rhyme.is_some() && feet[1].rhyme == feet[3].rhyme
  } else {
    true
  };
  (feet, is_rhyming)
}

/// Compare the poem's 平仄 sequence against the standard quatrain patterns.
pub fn check_wuyan_jueju(text: &str) -> JuejuCheck {
  let standard_patterns = WUYAN_JUEJU_PATTERNS.iter().map(|p| p.to_string()).collect();
  let clean = strip_punct(text);
  let count = clean.chars().count();
  if count != JUEJU_CHARS {
    return JuejuCheck {
      is_valid: false,
      reason: Some(format!("字数不符合五言绝句要求（应为20字，实为{}字）", count)),
      actual_pattern: String::new(),
      standard_patterns,
    };
  }

  let levels: Vec<char> = check_tones(&clean)
    .iter()
    .map(|t| if t.tone.is_level() { '平' } else { '仄' })
    .collect();
  if levels.len() != JUEJU_CHARS {
    return JuejuCheck {
      is_valid: false,
      reason: Some("含有无法注音的字符".into()),
      actual_pattern: String::new(),
      standard_patterns,
    };
  }

  let mut actual = String::new();
  for (i, group) in levels.chunks(5).enumerate() {
    actual.extend(group.iter());
    actual.push(if i % 2 == 0 { '，' } else { '。' });
  }

  let is_valid = WUYAN_JUEJU_PATTERNS.contains(&actual.as_str());
  JuejuCheck {
    is_valid,
    reason: (!is_valid).then(|| "平仄与标准格式不符".to_string()),
    actual_pattern: actual,
    standard_patterns,
  }
}

pub fn check_meter(text: &str) -> MeterReport {
  let poem = Poem::parse(text);
  let (rhyme_feet, is_rhyming) = check_rhyme(&poem);
  MeterReport {
    tones: check_tones(&poem.joined()),
    rhyme_feet,
    is_rhyming,
    jueju: check_wuyan_jueju(text),
  }
}
