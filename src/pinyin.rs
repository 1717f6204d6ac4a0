//! Hanzi phonetics: pinyin rendering, rhyme finals and tones.
//!
//! Example:
//!   输入: "床前明月光"
//!   输出: "chuáng qián míng yuè guāng"
use pinyin::ToPinyin;
use serde::Serialize;

/// Convert Chinese text into Hanyu Pinyin with tone diacritics, space-separated.
/// Non-Chinese characters are copied as-is.
///
/// Per-character conversion (no word segmentation), so polyphonic characters
/// use their default reading.
pub fn to_pinyin_diacritics(text: &str) -> String {
  let mut out = String::with_capacity(text.len() * 2);

  // Insert spaces only between consecutive Hanzi syllables.
  let mut last_was_hanzi = false;

  for ch in text.chars() {
    if let Some(py) = ch.to_pinyin() {
      if last_was_hanzi {
        out.push(' ');
      }
      out.push_str(py.with_tone());
      last_was_hanzi = true;
    } else {
      out.push(ch);
      last_was_hanzi = false;
    }
  }

  out
}

const TWO_LETTER_INITIALS: [&str; 3] = ["zh", "ch", "sh"];
const INITIALS: &str = "bpmfdtnlgkhjqxrzcsyw";

/// Full pinyin final of a syllable written without tone marks, with `ü`
/// spelled `v` and the y/w and j/q/x spelling rules undone
/// (`yao` → `iao`, `wei` → `uei`, `xue` → `ve`).
pub fn final_of_syllable(plain: &str) -> String {
  let s = plain.trim().to_lowercase().replace('ü', "v");
  let (initial, rest) = match TWO_LETTER_INITIALS.iter().find(|i| s.starts_with(**i)) {
    Some(i) => (*i, &s[i.len()..]),
    None => match s.chars().next() {
      Some(c) if INITIALS.contains(c) => (&s[..1], &s[1..]),
      _ => ("", s.as_str()),
    },
  };
  if rest.is_empty() {
    return s.clone();
  }
  match initial {
    "y" => {
      if let Some(tail) = rest.strip_prefix('u') {
        format!("v{}", tail)
      } else if rest.starts_with('i') {
        rest.to_string()
      } else {
        format!("i{}", rest)
      }
    }
    "w" => {
      if rest.starts_with('u') {
        rest.to_string()
      } else {
        format!("u{}", rest)
      }
    }
    "j" | "q" | "x" => match rest.strip_prefix('u') {
      Some(tail) => format!("v{}", tail),
      None => rest.to_string(),
    },
    _ => rest.to_string(),
  }
}

/// Rhyme class of a final: medial glides are ignored and near finals are
/// grouped the way classical rhyme tables group them (`iao` rhymes with `ao`,
/// `ing` with `eng`).
pub fn rhyme_class_of_final(fin: &str) -> String {
  let class = match fin {
    "a" | "ia" | "ua" => "a",
    "o" | "uo" | "e" => "e",
    "ie" | "ve" | "ue" => "ie",
    "i" | "v" | "er" => "i",
    "u" => "u",
    "ai" | "uai" => "ai",
    "ei" | "ui" | "uei" => "ei",
    "ao" | "iao" => "ao",
    "ou" | "iu" | "iou" => "ou",
    "an" | "ian" | "uan" | "van" => "an",
    "en" | "in" | "un" | "uen" | "vn" => "en",
    "ang" | "iang" | "uang" => "ang",
    "eng" | "ing" | "ong" | "iong" | "ueng" => "eng",
    other => other,
  };
  class.to_string()
}

/// Rhyme class of a Han character, `None` for anything without a reading.
pub fn rhyme_class(ch: char) -> Option<String> {
  let py = ch.to_pinyin()?;
  Some(rhyme_class_of_final(&final_of_syllable(py.plain())))
}

/// Classical tone categories. Modern neutral tone is counted as 入声.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
  YinPing,
  YangPing,
  Shang,
  Qu,
  Ru,
}

impl Tone {
  pub fn label_zh(&self) -> &'static str {
    match self {
      Tone::YinPing => "阴平",
      Tone::YangPing => "阳平",
      Tone::Shang => "上声",
      Tone::Qu => "去声",
      Tone::Ru => "入声",
    }
  }

  /// 平 (level) or 仄 (oblique).
  pub fn is_level(&self) -> bool {
    matches!(self, Tone::YinPing | Tone::YangPing)
  }

  fn from_numbered(syllable: &str) -> Self {
    match syllable.chars().last() {
      Some('1') => Tone::YinPing,
      Some('2') => Tone::YangPing,
      Some('3') => Tone::Shang,
      Some('4') => Tone::Qu,
      _ => Tone::Ru,
    }
  }
}

pub fn tone(ch: char) -> Option<Tone> {
  ch.to_pinyin().map(|py| Tone::from_numbered(py.with_tone_num_end()))
}
