//! Built-in data: a small labeled poem bank, the translator's example poems
//! and the seed characters used for generation.
//!
//! The bank backs `classify_samples`, the offline model's generation and the
//! random translation example. It is also a handy smoke-test corpus.

/// A labeled example poem.
#[derive(Clone, Copy, Debug)]
pub struct SeedPoem {
  pub text: &'static str,
  pub label: &'static str,
}

const fn sp(text: &'static str, label: &'static str) -> SeedPoem {
  SeedPoem { text, label }
}

static SEED_POEMS: [SeedPoem; 15] = [
  sp("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。", "山水"),
  sp("床前明月光，疑是地上霜。举头望明月，低头思故乡。", "山水"),
  sp("白日依山尽，黄河入海流。欲穷千里目，更上一层楼。", "山水"),
  sp("千山鸟飞绝，万径人踪灭。孤舟蓑笠翁，独钓寒江雪。", "山水"),
  sp("两个黄鹂鸣翠柳，一行白鹭上青天。窗含西岭千秋雪，门泊东吴万里船。", "山水"),
  sp("秦时明月汉时关，万里长征人未还。但使龙城飞将在，不教胡马度阴山。", "咏史"),
  sp("朱雀桥边野草花，乌衣巷口夕阳斜。旧时王谢堂前燕，飞入寻常百姓家。", "咏史"),
  sp("折戟沉沙铁未销，自将磨洗认前朝。东风不与周郎便，铜雀春深锁二乔。", "咏史"),
  sp("烟笼寒水月笼沙，夜泊秦淮近酒家。商女不知亡国恨，隔江犹唱后庭花。", "咏史"),
  sp("胜败兵家事不期，包羞忍耻是男儿。江东子弟多才俊，卷土重来未可知。", "咏史"),
  sp("渭城朝雨浥轻尘，客舍青青柳色新。劝君更尽一杯酒，西出阳关无故人。", "送别"),
  sp("故人西辞黄鹤楼，烟花三月下扬州。孤帆远影碧空尽，唯见长江天际流。", "送别"),
  sp("寒雨连江夜入吴，平明送客楚山孤。洛阳亲友如相问，一片冰心在玉壶。", "送别"),
  sp("城阙辅三秦，风烟望五津。与君离别意，同是宦游人。海内存知己，天涯若比邻。", "送别"),
  sp("千里黄云白日曛，北风吹雁雪纷纷。莫愁前路无知己，天下谁人不识君。", "送别"),
];

pub fn seed_poems() -> &'static [SeedPoem] {
  &SEED_POEMS
}

/// Poems offered by the "random translation" action.
pub fn translation_examples() -> &'static [&'static str] {
  &[
    "千山鸟飞绝，万径人踪灭。孤舟蓑笠翁，独钓寒江雪。",
    "床前明月光，疑是地上霜。举头望明月，低头思故乡。",
    "白日依山尽，黄河入海流。欲穷千里目，更上一层楼。",
    "两个黄鹂鸣翠柳，一行白鹭上青天。窗含西岭千秋雪，门泊东吴万里船。",
    "春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。",
    "秦时明月汉时关，万里长征人未还。但使龙城飞将在，不教胡马度阴山。",
    "朱雀桥边野草花，乌衣巷口夕阳斜。旧时王谢堂前燕，飞入寻常百姓家。",
    "折戟沉沙铁未销，自将磨洗认前朝。东风不与周郎便，铜雀春深锁二乔。",
    "烟笼寒水月笼沙，夜泊秦淮近酒家。商女不知亡国恨，隔江犹唱后庭花。",
    "渭城朝雨浥轻尘，客舍青青柳色新。劝君更尽一杯酒，西出阳关无故人。",
  ]
}

/// Default seed characters for generation.
pub fn default_generation_seeds() -> Vec<String> {
  ["春", "夏", "秋", "冬", "月", "风", "花", "雪"].iter().map(|s| s.to_string()).collect()
}
