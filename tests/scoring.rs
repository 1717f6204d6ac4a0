mod common;

use std::sync::Arc;

use common::{ConstantModel, DownModel, LineTableModel};
use poem_analyzer::scorer::PoemScorer;
use poem_analyzer::tokenizer::Tokenizer;
use poem_analyzer::Lexicon;

fn scorer(model: Arc<dyn poem_analyzer::ModelService>) -> PoemScorer {
    let lexicon = Arc::new(Lexicon::builtin());
    let tokenizer = Arc::new(Tokenizer::from_lexicon(&lexicon));
    PoemScorer::new(lexicon, tokenizer, model)
}

#[test]
fn spring_dawn_rhymes_and_has_even_lines() {
    let report = scorer(Arc::new(ConstantModel)).score("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。");

    assert_eq!(report.rhyme.score, 20.0);
    assert_eq!(report.rhyme.analysis, "完全押韵");
    assert!(report.structure.score >= 8.0);
    assert!(report.structure.analysis.contains("字数整齐"));
    // 鸟 风 雨 花, no action word
    assert_eq!(report.imagery.score, 10.0);
    assert_eq!(report.theme.score, 25.0);
}

#[test]
fn newline_separated_poem_scores_the_same() {
    let s = scorer(Arc::new(ConstantModel));
    let a = s.score("春眠不觉晓\n处处闻啼鸟\n夜来风雨声\n花落知多少");
    let b = s.score("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。");
    assert_eq!(a.total, b.total);
}

#[test]
fn unequal_lines_lose_the_length_bonus() {
    let report = scorer(Arc::new(ConstantModel)).score("白日依山尽，黄河入海流水。欲穷千里目，更上一层楼。");
    assert!(!report.structure.analysis.contains("字数整齐"));
    assert!(report.structure.score <= 7.0);
}

#[test]
fn total_is_the_exact_sum_and_bounded() {
    let s = scorer(Arc::new(ConstantModel));
    for poem in [
        "床前明月光，疑是地上霜。举头望明月，低头思故乡。",
        "千山鸟飞绝，万径人踪灭。孤舟蓑笠翁，独钓寒江雪。",
        "两个黄鹂鸣翠柳，一行白鹭上青天。窗含西岭千秋雪，门泊东吴万里船。",
        "风",
    ] {
        let r = s.score(poem);
        let sum: f64 = r.metrics().iter().map(|m| m.score).sum();
        assert_eq!(r.total, sum);
        assert!(r.total <= 100.0);
        for m in r.metrics() {
            assert!(m.score >= 0.0 && m.score <= m.max, "{} out of range", m.name);
        }
    }
}

#[test]
fn model_failure_degrades_only_the_theme_metric() {
    let r = scorer(Arc::new(DownModel)).score("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。");
    assert_eq!(r.theme.score, 0.0);
    assert!(r.theme.error.as_deref().unwrap_or_default().contains("connection refused"));
    assert!(r.theme.analysis.starts_with("计算失败"));
    assert_eq!(r.rhyme.score, 20.0);
    assert!(r.rhyme.error.is_none());
}

const SPRING_DAWN: &str = "春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。";

fn line_vectors(vectors: [Vec<f32>; 4]) -> LineTableModel {
    let lines = ["春眠不觉晓", "处处闻啼鸟", "夜来风雨声", "花落知多少"];
    LineTableModel { table: lines.into_iter().zip(vectors).collect() }
}

#[test]
fn theme_is_the_mean_of_adjacent_line_cosines() {
    // cosines of adjacent pairs: 1, 0, 1
    let model = line_vectors([vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0]]);
    let r = scorer(Arc::new(model)).score(SPRING_DAWN);
    assert!((r.theme.score - 25.0 * 2.0 / 3.0).abs() < 1e-9, "{}", r.theme.score);
    assert_eq!(r.theme.analysis, "句子相似度：0.67");
}

#[test]
fn orthogonal_neighbours_score_zero_theme() {
    let model = line_vectors([vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
    let r = scorer(Arc::new(model)).score(SPRING_DAWN);
    assert_eq!(r.theme.score, 0.0);
    assert!(r.theme.error.is_none());
}

#[test]
fn negative_similarity_clamps_theme_to_zero() {
    let model = line_vectors([vec![1.0, 0.0], vec![-1.0, 0.0], vec![1.0, 0.0], vec![-1.0, 0.0]]);
    let r = scorer(Arc::new(model)).score(SPRING_DAWN);
    assert_eq!(r.theme.score, 0.0);
    assert_eq!(r.theme.analysis, "句子相似度：-1.00");
    assert!(r.theme.error.is_none());
}

#[test]
fn mismatched_final_line_is_partial_rhyme() {
    let r = scorer(Arc::new(ConstantModel)).score("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多声。");
    assert_eq!(r.rhyme.score, 5.0);
    assert_eq!(r.rhyme.analysis, "不完全押韵");
}

#[test]
fn only_even_lines_decide_the_rhyme() {
    let s = scorer(Arc::new(ConstantModel));
    // lines 1 and 3 rhyme (晓, 好) but lines 2 and 4 do not (声, 少)
    let odd_only = s.score("春眠不觉晓，处处闻啼声。夜来风雨好，花落知多少。");
    assert_eq!(odd_only.rhyme.score, 5.0);
    // lines 2 and 4 rhyme (鸟, 少) while the odd lines end elsewhere
    let even_only = s.score("春眠不觉声，处处闻啼鸟。夜来风雨声，花落知多少。");
    assert_eq!(even_only.rhyme.score, 20.0);
}
