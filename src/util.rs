//! Small text helpers shared by the analysis modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if unicode char belongs to CJK ranges.
pub fn is_cjk(ch: char) -> bool {
  ('\u{4E00}'..='\u{9FFF}').contains(&ch)
    || ('\u{3400}'..='\u{4DBF}').contains(&ch)
    || ('\u{20000}'..='\u{2A6DF}').contains(&ch)
    || ('\u{2A700}'..='\u{2B73F}').contains(&ch)
    || ('\u{2B740}'..='\u{2B81F}').contains(&ch)
    || ('\u{2B820}'..='\u{2CEAF}').contains(&ch)
    || ('\u{F900}'..='\u{FAFF}').contains(&ch)
}

/// Punctuation that ends a line or clause in a poem (full- and half-width).
pub fn is_line_break(ch: char) -> bool {
  matches!(
    ch,
    '，' | '。' | '！' | '？' | '；' | '、' | ',' | '.' | '!' | '?' | ';' | '\n' | '\r'
  )
}

/// Anything that should not count as a poem character.
pub fn is_punct_or_space(ch: char) -> bool {
  ch.is_whitespace()
    || is_line_break(ch)
    || ch.is_ascii_punctuation()
    || matches!(ch, '：' | '“' | '”' | '‘' | '’' | '《' | '》' | '「' | '」' | '（' | '）' | '…' | '—' | '·')
}

/// Characters of `s` with punctuation and whitespace removed.
pub fn strip_punct(s: &str) -> String {
  s.chars().filter(|c| !is_punct_or_space(*c)).collect()
}

/// Log-safe truncation for large strings (char-boundary aware).
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  let total = s.chars().count();
  if total <= max_chars {
    s.to_string()
  } else {
    let head: String = s.chars().take(max_chars).collect();
    format!("{}… ({} chars total)", head, total)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strip_punct_keeps_only_poem_characters() {
    assert_eq!(strip_punct("春眠不觉晓，处处闻啼鸟。"), "春眠不觉晓处处闻啼鸟");
    assert_eq!(strip_punct(" 床前 明月光\n"), "床前明月光");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    assert_eq!(trunc_for_log("白日依山尽", 10), "白日依山尽");
    assert_eq!(trunc_for_log("白日依山尽", 2), "白日… (5 chars total)");
  }

  #[test]
  fn fill_template_replaces_all_keys() {
    let out = fill_template("以「{seed}」开头，写{n}句", &[("seed", "春"), ("n", "四")]);
    assert_eq!(out, "以「春」开头，写四句");
  }
}
