//! One-vs-rest linear SVM trained with Pegasos (hinge-loss SGD) plus a Platt
//! sigmoid per class for calibrated probabilities.
//!
//! Each binary machine keeps its weights as `scale * v` so the per-step
//! shrinkage is O(1); only the features of the current sample are touched.
//! The bias is an extra always-on feature and is regularized with the rest.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::tfidf::SparseVector;

#[derive(Clone, Debug)]
pub struct SvmParams {
  pub epochs: usize,
  pub lambda: f64,
  pub seed: u64,
}

impl Default for SvmParams {
  fn default() -> Self {
    Self { epochs: 50, lambda: 1e-3, seed: 42 }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BinarySvm {
  weights: Vec<f64>,
  bias: f64,
}

impl BinarySvm {
  /// Pegasos over `samples` with targets `positive[i]` (true = +1).
  pub fn fit(samples: &[SparseVector], positive: &[bool], dim: usize, params: &SvmParams, seed: u64) -> Self {
    let lambda = params.lambda.max(f64::EPSILON);
    let mut v = vec![0.0f64; dim];
    let mut v_bias = 0.0f64;
    let mut scale = 1.0f64;
    let mut order: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = 0usize;

    for _ in 0..params.epochs {
      order.shuffle(&mut rng);
      for &i in &order {
        t += 1;
        let x = &samples[i];
        let y = if positive[i] { 1.0 } else { -1.0 };
        let eta = 1.0 / (lambda * t as f64);
        let margin = y * scale * (x.dot(&v) + v_bias);

        let shrink = 1.0 - eta * lambda;
        if shrink <= 0.0 {
          v.iter_mut().for_each(|w| *w = 0.0);
          v_bias = 0.0;
          scale = 1.0;
        } else {
          scale *= shrink;
        }

        if margin < 1.0 {
          let step = eta * y / scale;
          for (j, val) in x.entries() {
            if let Some(w) = v.get_mut(*j) {
              *w += step * val;
            }
          }
          v_bias += step;
        }

        if scale < 1e-9 {
          v.iter_mut().for_each(|w| *w *= scale);
          v_bias *= scale;
          scale = 1.0;
        }
      }
    }

    Self {
      weights: v.into_iter().map(|w| w * scale).collect(),
      bias: v_bias * scale,
    }
  }

  pub fn decision(&self, x: &SparseVector) -> f64 {
    x.dot(&self.weights) + self.bias
  }
}

/// `P(y = 1 | f) = 1 / (1 + exp(a * f + b))`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlattScaling {
  pub a: f64,
  pub b: f64,
}

impl Default for PlattScaling {
  fn default() -> Self {
    Self { a: -1.0, b: 0.0 }
  }
}

impl PlattScaling {
  /// Newton's method with backtracking on the regularized targets of
  /// Lin, Lin and Weng's formulation of Platt scaling.
  pub fn fit(decisions: &[f64], positive: &[bool]) -> Self {
    const MAX_ITER: usize = 100;
    const MIN_STEP: f64 = 1e-10;
    const SIGMA: f64 = 1e-12;
    const EPS: f64 = 1e-5;

    if decisions.is_empty() {
      return Self::default();
    }
    let prior1 = positive.iter().filter(|p| **p).count() as f64;
    let prior0 = positive.len() as f64 - prior1;
    let hi = (prior1 + 1.0) / (prior1 + 2.0);
    let lo = 1.0 / (prior0 + 2.0);
    let targets: Vec<f64> = positive.iter().map(|p| if *p { hi } else { lo }).collect();

    let objective = |a: f64, b: f64| -> f64 {
      decisions
        .iter()
        .zip(&targets)
        .map(|(f, t)| {
          let z = f * a + b;
          if z >= 0.0 {
            t * z + (-z).exp().ln_1p()
          } else {
            (t - 1.0) * z + z.exp().ln_1p()
          }
        })
        .sum()
    };

    let mut a = 0.0;
    let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
    let mut fval = objective(a, b);

    for _ in 0..MAX_ITER {
      let (mut h11, mut h22, mut h21, mut g1, mut g2) = (SIGMA, SIGMA, 0.0, 0.0, 0.0);
      for (f, t) in decisions.iter().zip(&targets) {
        let z = f * a + b;
        let (p, q) = if z >= 0.0 {
          let e = (-z).exp();
          (e / (1.0 + e), 1.0 / (1.0 + e))
        } else {
          let e = z.exp();
          (1.0 / (1.0 + e), e / (1.0 + e))
        };
        let d2 = p * q;
        h11 += f * f * d2;
        h22 += d2;
        h21 += f * d2;
        let d1 = t - p;
        g1 += f * d1;
        g2 += d1;
      }
      if g1.abs() < EPS && g2.abs() < EPS {
        break;
      }

      let det = h11 * h22 - h21 * h21;
      let da = -(h22 * g1 - h21 * g2) / det;
      let db = -(-h21 * g1 + h11 * g2) / det;
      let gd = g1 * da + g2 * db;

      let mut step = 1.0;
      while step >= MIN_STEP {
        let (na, nb) = (a + step * da, b + step * db);
        let nf = objective(na, nb);
        if nf < fval + 1e-4 * step * gd {
          a = na;
          b = nb;
          fval = nf;
          break;
        }
        step /= 2.0;
      }
      if step < MIN_STEP {
        break;
      }
    }

    Self { a, b }
  }

  pub fn probability(&self, decision: f64) -> f64 {
    let z = decision * self.a + self.b;
    if z >= 0.0 {
      let e = (-z).exp();
      e / (1.0 + e)
    } else {
      1.0 / (1.0 + z.exp())
    }
  }
}

/// Multi-class model. Classes are indices into the caller's label list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OneVsRestSvm {
  machines: Vec<BinarySvm>,
  calibrators: Vec<PlattScaling>,
}

impl OneVsRestSvm {
  pub fn fit(samples: &[SparseVector], classes: &[usize], n_classes: usize, dim: usize, params: &SvmParams) -> Self {
    let mut machines = Vec::with_capacity(n_classes);
    let mut calibrators = Vec::with_capacity(n_classes);
    for k in 0..n_classes {
      let positive: Vec<bool> = classes.iter().map(|c| *c == k).collect();
      let machine = BinarySvm::fit(samples, &positive, dim, params, params.seed.wrapping_add(k as u64));
      let decisions: Vec<f64> = samples.iter().map(|x| machine.decision(x)).collect();
      calibrators.push(PlattScaling::fit(&decisions, &positive));
      machines.push(machine);
    }
    Self { machines, calibrators }
  }

  pub fn n_classes(&self) -> usize {
    self.machines.len()
  }

  pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
    self.machines.iter().map(|m| m.decision(x)).collect()
  }

  /// Calibrated per-class probabilities normalised to sum to 1; uniform when
  /// every calibrated value is 0.
  pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
    let raw: Vec<f64> = self
      .machines
      .iter()
      .zip(&self.calibrators)
      .map(|(m, c)| c.probability(m.decision(x)))
      .collect();
    let sum: f64 = raw.iter().sum();
    if sum > 0.0 && sum.is_finite() {
      raw.into_iter().map(|p| p / sum).collect()
    } else {
      let n = raw.len().max(1) as f64;
      raw.iter().map(|_| 1.0 / n).collect()
    }
  }

  /// Index of the most probable class (first on ties).
  pub fn predict(&self, x: &SparseVector) -> usize {
    argmax(&self.predict_proba(x))
  }
}

pub fn argmax(values: &[f64]) -> usize {
  let mut best = 0;
  for (i, v) in values.iter().enumerate() {
    if *v > values[best] {
      best = i;
    }
  }
  best
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;

  fn sv(pairs: &[(usize, f64)]) -> SparseVector {
    SparseVector::from_map(pairs.iter().copied().collect::<BTreeMap<_, _>>())
  }

  fn toy() -> (Vec<SparseVector>, Vec<usize>) {
    let xs = vec![
      sv(&[(0, 1.0)]),
      sv(&[(0, 0.9), (3, 0.1)]),
      sv(&[(1, 1.0)]),
      sv(&[(1, 0.8), (3, 0.2)]),
      sv(&[(2, 1.0)]),
      sv(&[(2, 0.7), (3, 0.3)]),
    ];
    (xs, vec![0, 0, 1, 1, 2, 2])
  }

  #[test]
  fn separable_classes_are_recovered() {
    let (xs, ys) = toy();
    let model = OneVsRestSvm::fit(&xs, &ys, 3, 4, &SvmParams::default());
    for (x, y) in xs.iter().zip(&ys) {
      assert_eq!(model.predict(x), *y);
    }
  }

  #[test]
  fn probabilities_sum_to_one() {
    let (xs, ys) = toy();
    let model = OneVsRestSvm::fit(&xs, &ys, 3, 4, &SvmParams::default());
    let p = model.predict_proba(&sv(&[(0, 0.5), (1, 0.5)]));
    assert_eq!(p.len(), 3);
    assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
  }

  #[test]
  fn training_is_deterministic_for_a_seed() {
    let (xs, ys) = toy();
    let a = OneVsRestSvm::fit(&xs, &ys, 3, 4, &SvmParams::default());
    let b = OneVsRestSvm::fit(&xs, &ys, 3, 4, &SvmParams::default());
    assert_eq!(a.decision_function(&xs[0]), b.decision_function(&xs[0]));
  }

  #[test]
  fn platt_is_monotone_in_the_decision_value() {
    let f = [-2.0, -1.5, -1.0, 1.0, 1.5, 2.0];
    let y = [false, false, false, true, true, true];
    let platt = PlattScaling::fit(&f, &y);
    assert!(platt.a < 0.0);
    assert!(platt.probability(2.0) > 0.5);
    assert!(platt.probability(-2.0) < 0.5);
  }

  #[test]
  fn argmax_takes_the_first_maximum() {
    assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
    assert_eq!(argmax(&[]), 0);
  }
}
