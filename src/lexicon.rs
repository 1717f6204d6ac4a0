//! Static poetry lexicon: imagery words, emotion categories, modern glosses,
//! theme keywords, rhetoric patterns and literal substitutions.
//!
//! The lexicon is built once (built-in tables or a TOML file) and shared
//! read-only behind an `Arc`. Table order is significant: the translator
//! substitutes glosses in order and theme/rhetoric matching returns the first
//! rule that fires.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageryKind {
  Nature,
  Plant,
  Animal,
  Feeling,
  /// Verbs of motion/posture; any hit earns the scorer's action bonus.
  Action,
}

impl ImageryKind {
  pub fn label_zh(&self) -> &'static str {
    match self {
      ImageryKind::Nature => "自然",
      ImageryKind::Plant => "植物",
      ImageryKind::Animal => "动物",
      ImageryKind::Feeling => "情感",
      ImageryKind::Action => "动作",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageryGroup {
  pub kind: ImageryKind,
  pub words: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmotionCategory {
  pub name: String,
  pub keywords: Vec<String>,
  pub imagery: Vec<String>,
}

impl EmotionCategory {
  /// Keywords followed by imagery words, space separated; this is the text
  /// embedded to represent the category.
  pub fn profile_text(&self) -> String {
    self.keywords.iter().chain(self.imagery.iter()).cloned().collect::<Vec<_>>().join(" ")
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlossEntry {
  pub word: String,
  pub meaning: String,
}

/// Keyword rule for theme and rhetoric detection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeywordRule {
  pub name: String,
  pub keywords: Vec<String>,
  pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Substitution {
  pub from: String,
  pub to: String,
}

/// A category tag attached to a lexicon word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
  Imagery(ImageryKind),
  EmotionKeyword(String),
  EmotionImagery(String),
  Gloss(String),
  Theme(String),
  Rhetoric(String),
}

/// One occurrence of a lexicon word in a text. `start` is a char offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexiconHit {
  pub word: String,
  pub start: usize,
  pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Lexicon {
  #[serde(default)]
  imagery: Vec<ImageryGroup>,
  #[serde(default)]
  emotions: Vec<EmotionCategory>,
  #[serde(default)]
  glosses: Vec<GlossEntry>,
  #[serde(default)]
  themes: Vec<KeywordRule>,
  #[serde(default)]
  rhetoric: Vec<KeywordRule>,
  #[serde(default)]
  substitutions: Vec<Substitution>,
}

fn strings(words: &[&str]) -> Vec<String> {
  words.iter().map(|w| (*w).to_string()).collect()
}

impl Lexicon {
  /// An empty lexicon; combine with the `with_*` constructors.
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  pub fn with_imagery(mut self, kind: ImageryKind, words: &[&str]) -> Self {
    self.imagery.push(ImageryGroup { kind, words: strings(words) });
    self
  }

  pub fn with_emotion(mut self, name: &str, keywords: &[&str], imagery: &[&str]) -> Self {
    self.emotions.push(EmotionCategory {
      name: name.to_string(),
      keywords: strings(keywords),
      imagery: strings(imagery),
    });
    self
  }

  pub fn with_gloss(mut self, word: &str, meaning: &str) -> Self {
    self.glosses.push(GlossEntry { word: word.to_string(), meaning: meaning.to_string() });
    self
  }

  pub fn with_theme(mut self, name: &str, keywords: &[&str], explanation: &str) -> Self {
    self.themes.push(KeywordRule {
      name: name.to_string(),
      keywords: strings(keywords),
      explanation: explanation.to_string(),
    });
    self
  }

  pub fn with_rhetoric(mut self, name: &str, keywords: &[&str], explanation: &str) -> Self {
    self.rhetoric.push(KeywordRule {
      name: name.to_string(),
      keywords: strings(keywords),
      explanation: explanation.to_string(),
    });
    self
  }

  pub fn with_substitution(mut self, from: &str, to: &str) -> Self {
    self.substitutions.push(Substitution { from: from.to_string(), to: to.to_string() });
    self
  }

  pub fn imagery(&self) -> &[ImageryGroup] {
    &self.imagery
  }

  pub fn emotions(&self) -> &[EmotionCategory] {
    &self.emotions
  }

  pub fn glosses(&self) -> &[GlossEntry] {
    &self.glosses
  }

  pub fn themes(&self) -> &[KeywordRule] {
    &self.themes
  }

  pub fn rhetoric(&self) -> &[KeywordRule] {
    &self.rhetoric
  }

  pub fn substitutions(&self) -> &[Substitution] {
    &self.substitutions
  }

  pub fn gloss(&self, word: &str) -> Option<&str> {
    self.glosses.iter().find(|g| g.word == word).map(|g| g.meaning.as_str())
  }

  /// Every tag attached to `word`, in table order.
  pub fn lookup(&self, word: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    for g in &self.imagery {
      if g.words.iter().any(|w| w == word) {
        tags.push(Tag::Imagery(g.kind));
      }
    }
    for e in &self.emotions {
      if e.keywords.iter().any(|w| w == word) {
        tags.push(Tag::EmotionKeyword(e.name.clone()));
      }
      if e.imagery.iter().any(|w| w == word) {
        tags.push(Tag::EmotionImagery(e.name.clone()));
      }
    }
    if let Some(m) = self.gloss(word) {
      tags.push(Tag::Gloss(m.to_string()));
    }
    for t in &self.themes {
      if t.keywords.iter().any(|w| w == word) {
        tags.push(Tag::Theme(t.name.clone()));
      }
    }
    for r in &self.rhetoric {
      if r.keywords.iter().any(|w| w == word) {
        tags.push(Tag::Rhetoric(r.name.clone()));
      }
    }
    tags
  }

  /// Distinct surface words across all tables, longest first.
  pub fn words(&self) -> Vec<&str> {
    let mut out: Vec<&str> = self
      .imagery
      .iter()
      .flat_map(|g| g.words.iter())
      .chain(self.emotions.iter().flat_map(|e| e.keywords.iter().chain(e.imagery.iter())))
      .chain(self.glosses.iter().map(|g| &g.word))
      .chain(self.themes.iter().flat_map(|t| t.keywords.iter()))
      .chain(self.rhetoric.iter().flat_map(|r| r.keywords.iter()))
      .map(String::as_str)
      .filter(|w| !w.is_empty())
      .collect();
    out.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    out.dedup();
    out
  }

  /// Every occurrence of every lexicon word in `text` (exact substring match),
  /// ordered by position, longer words first at the same position.
  pub fn hits(&self, text: &str) -> Vec<LexiconHit> {
    let mut hits = Vec::new();
    if text.is_empty() {
      return hits;
    }
    for word in self.words() {
      for (byte_idx, _) in text.match_indices(word) {
        hits.push(LexiconHit {
          word: word.to_string(),
          start: text[..byte_idx].chars().count(),
          tags: self.lookup(word),
        });
      }
    }
    hits.sort_by(|a, b| {
      a.start
        .cmp(&b.start)
        .then(b.word.chars().count().cmp(&a.word.chars().count()))
    });
    hits
  }

  /// The built-in tables used when no lexicon file is configured.
  pub fn builtin() -> Self {
    let mut lx = Self::empty()
      .with_imagery(ImageryKind::Nature, &["风", "云", "山", "雨", "雪", "月", "日", "星", "天", "地"])
      .with_imagery(ImageryKind::Plant, &["花", "草", "树", "竹", "梅", "兰", "菊", "松", "柏", "柳"])
      .with_imagery(ImageryKind::Animal, &["鸟", "鱼", "虫", "蝶", "燕", "莺", "鹤", "雁", "鹰", "龙"])
      .with_imagery(ImageryKind::Feeling, &["愁", "思", "念", "恨", "爱", "喜", "悲", "欢", "乐", "忧"])
      .with_imagery(ImageryKind::Action, &["飞", "舞", "游", "走", "行", "立", "坐", "卧", "望", "听"])
      .with_emotion(
        "思乡",
        &["乡", "家", "归", "故", "亲", "念", "忆", "怀", "望", "思"],
        &["明月", "长亭", "归雁", "羁旅", "客舍", "故园", "乡关", "归心"],
      )
      .with_emotion(
        "哀伤",
        &["愁", "悲", "泪", "伤", "痛", "苦", "哀", "怨", "恨", "泣"],
        &["寒雨", "孤舟", "霜", "残月", "落花", "寒江", "暮色", "秋雨"],
      )
      .with_emotion(
        "孤独",
        &["独", "孤", "寂", "寞", "冷", "寒", "清", "静", "空", "远"],
        &["孤灯", "寒窗", "空山", "独坐", "孤影", "寒夜", "清秋", "空庭"],
      )
      .with_emotion(
        "欢快",
        &["喜", "乐", "欢", "笑", "歌", "舞", "醉", "兴", "畅", "悦"],
        &["黄鹂", "翠柳", "青天", "白鹭", "春色", "花开", "莺啼", "蝶舞"],
      )
      .with_emotion(
        "豪情",
        &["怒", "愤", "恨", "怨", "仇", "敌", "战", "斗", "争", "抗"],
        &["剑", "楼", "关山", "长城", "战马", "烽火", "铁衣", "金戈"],
      )
      .with_emotion(
        "清静",
        &["闲", "静", "淡", "雅", "幽", "清", "远", "空", "禅", "悟"],
        &["竹林", "溪水", "山寺", "白云", "松风", "明月", "清泉", "远山"],
      );

    for (word, meaning) in BUILTIN_GLOSSES {
      lx = lx.with_gloss(word, meaning);
    }

    lx.with_theme("思乡", &["故乡", "思乡", "乡愁", "归家"], "这首诗表达了诗人对故乡的思念之情。")
      .with_theme("送别", &["送别", "离别", "远行", "告别"], "这是一首送别诗，表达了诗人对离别的感伤和对友人的祝福。")
      .with_theme("咏史", &["历史", "典故", "古人", "往事"], "这首诗通过历史典故，抒发了诗人对历史的感慨。")
      .with_theme("山水", &["山", "水", "云", "雨", "风", "月"], "这是一首描写自然山水的诗，展现了诗人对自然的热爱。")
      .with_theme("抒情", &["情", "思", "愁", "喜", "悲"], "这首诗主要表达了诗人的情感和感受。")
      .with_rhetoric("比喻", &["如", "似", "若", "像"], "通过比喻手法，使诗歌更加生动形象。")
      .with_rhetoric("对仗", &["对仗", "对偶"], "运用对仗手法，使诗歌结构工整，韵律和谐。")
      .with_rhetoric("借景抒情", &["借景", "寓情"], "通过描写景物来表达情感。")
      .with_rhetoric("用典", &["典故", "引用"], "运用历史典故，增加诗歌的文化内涵。")
      .with_rhetoric("夸张", &["夸张", "夸大"], "通过夸张手法，突出诗歌的主题。")
      .with_substitution("不", "没有")
      .with_substitution("无", "没有")
      .with_substitution("独", "独自")
      .with_substitution("孤", "孤独")
  }
}

const BUILTIN_GLOSSES: &[(&str, &str)] = &[
  ("明月", "明亮的月亮"),
  ("寒江", "寒冷的江水"),
  ("孤舟", "孤独的小船"),
  ("蓑笠", "蓑衣和斗笠"),
  ("黄鹂", "黄莺鸟"),
  ("翠柳", "翠绿的柳树"),
  ("白鹭", "白色的鹭鸟"),
  ("青天", "蓝色的天空"),
  ("千秋雪", "千年不化的积雪"),
  ("万里船", "远行的船只"),
  ("春眠", "春天的睡眠"),
  ("啼鸟", "鸣叫的鸟儿"),
  ("风雨", "风和雨"),
  ("落花", "凋落的花朵"),
  ("秦时", "秦朝时期"),
  ("汉时", "汉朝时期"),
  ("龙城", "边塞重镇"),
  ("胡马", "胡人的马"),
  ("朱雀桥", "朱雀桥"),
  ("乌衣巷", "乌衣巷"),
  ("王谢", "王导和谢安"),
  ("堂前燕", "屋檐下的燕子"),
  ("寻常", "普通"),
  ("百姓", "平民百姓"),
  ("折戟", "折断的戟"),
  ("沉沙", "沉入沙中"),
  ("铁未销", "铁器还未销蚀"),
  ("前朝", "前一个朝代"),
  ("周郎", "周瑜"),
  ("铜雀", "铜雀台"),
  ("春深", "春意正浓"),
  ("二乔", "大乔和小乔"),
  ("烟笼", "烟雾笼罩"),
  ("寒水", "寒冷的水"),
  ("月笼沙", "月光笼罩着沙滩"),
  ("秦淮", "秦淮河"),
  ("酒家", "酒店"),
  ("商女", "歌女"),
  ("亡国恨", "亡国的悲痛"),
  ("隔江", "隔着江水"),
  ("后庭花", "《玉树后庭花》"),
  ("渭城", "渭城"),
  ("朝雨", "早晨的雨"),
  ("浥轻尘", "打湿了轻尘"),
  ("客舍", "旅店"),
  ("青青", "青翠"),
  ("柳色", "柳树的颜色"),
  ("新", "新鲜"),
  ("阳关", "阳关"),
  ("故人", "老朋友"),
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_collects_tags_from_every_table() {
    let lx = Lexicon::builtin();
    let tags = lx.lookup("明月");
    assert!(tags.contains(&Tag::EmotionImagery("思乡".into())));
    assert!(tags.contains(&Tag::EmotionImagery("清静".into())));
    assert!(tags.contains(&Tag::Gloss("明亮的月亮".into())));
    assert_eq!(lx.lookup("飞"), vec![Tag::Imagery(ImageryKind::Action)]);
    assert!(lx.lookup("电脑").is_empty());
  }

  #[test]
  fn hits_are_ordered_by_position() {
    let lx = Lexicon::empty()
      .with_imagery(ImageryKind::Nature, &["月", "霜"])
      .with_gloss("明月", "明亮的月亮");
    let hits = lx.hits("床前明月光，疑是地上霜");
    let words: Vec<(&str, usize)> = hits.iter().map(|h| (h.word.as_str(), h.start)).collect();
    assert_eq!(words, vec![("明月", 2), ("月", 3), ("霜", 10)]);
  }

  #[test]
  fn empty_text_has_no_hits() {
    assert!(Lexicon::builtin().hits("").is_empty());
  }

  #[test]
  fn toml_lexicon_round_trips_through_serde() {
    let src = r#"
      [[imagery]]
      kind = "nature"
      words = ["眠"]

      [[glosses]]
      word = "明月"
      meaning = "明亮的月亮"
    "#;
    let lx = Lexicon::from_toml_str(src).unwrap();
    assert_eq!(lx.lookup("眠"), vec![Tag::Imagery(ImageryKind::Nature)]);
    assert_eq!(lx.gloss("明月"), Some("明亮的月亮"));
    assert!(lx.emotions().is_empty());
  }

  #[test]
  fn profile_text_joins_keywords_then_imagery() {
    let lx = Lexicon::empty().with_emotion("孤独", &["独", "孤"], &["孤灯"]);
    assert_eq!(lx.emotions()[0].profile_text(), "独 孤 孤灯");
  }
}
