//! Dataset-level evaluation: per-image pipeline, accumulation and reduction.
//!
//! Each image is evaluated independently by [`DatasetEvaluator::evaluate_image`],
//! which only reads the evaluator's configuration. Results are folded into
//! the evaluator's accumulators by [`DatasetEvaluator::accumulate`], and
//! [`DatasetEvaluator::report`] reduces whatever has been accumulated so far.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EvalConfig;
use crate::error::Result;
use crate::matching::{match_and_score, sort_by_confidence, MatchSummary};
use crate::metrics::ap::calculate_map;
use crate::stats::EvalStats;
use crate::threshold::{filter_detections, filter_ground_truth};
use crate::types::{ImageSample, PerImageMetrics};
use crate::uncertainty::{
    observe_image, ImageObservations, UncertaintyAccumulator, UncertaintyPolicy,
    UncertaintyReport,
};

/// The outcome of evaluating one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvaluation {
    pub image_id: String,
    pub metrics: PerImageMetrics,
    pub matches: MatchSummary,
    pub observations: ImageObservations,
    /// Filter counters for this image alone
    pub stats: EvalStats,
}

/// Dataset-level averages and uncertainty statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetReport {
    pub images_evaluated: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Mean per-image AP at IoU 0.50.
    ///
    /// With [`ApMatching::Permissive`](crate::metrics::ap::ApMatching::Permissive)
    /// duplicate hits on one ground truth box are all counted, so this can
    /// exceed 1. It stays within `[0, 1]` under `Exclusive`.
    #[serde(rename = "mAP50")]
    pub map50: f64,
    /// Mean per-image AP over IoU 0.50:0.05:0.95. Can exceed 1 under
    /// permissive matching, like [`map50`](Self::map50).
    #[serde(rename = "mAP50-95")]
    pub map50_95: f64,
    pub uncertainty: UncertaintyReport,
    pub stats: EvalStats,
}

/// Drives the per-image pipeline and holds the dataset accumulators.
pub struct DatasetEvaluator {
    config: EvalConfig,
    policy: Box<dyn UncertaintyPolicy>,
    per_image: Vec<PerImageMetrics>,
    uncertainty: UncertaintyAccumulator,
    stats: EvalStats,
}

impl DatasetEvaluator {
    /// Validate `config` and build an evaluator using its uncertainty policy.
    pub fn new(config: EvalConfig) -> Result<Self> {
        let policy = config.uncertainty.policy();
        Self::with_policy(config, policy)
    }

    /// Build an evaluator with a custom uncertainty policy.
    pub fn with_policy(config: EvalConfig, policy: Box<dyn UncertaintyPolicy>) -> Result<Self> {
        config.validate()?;
        let uncertainty = UncertaintyAccumulator::new(&config.classes);

        Ok(Self {
            config,
            policy,
            per_image: Vec::new(),
            uncertainty,
            stats: EvalStats::new(),
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Metrics of every accumulated image, in accumulation order.
    pub fn per_image(&self) -> &[PerImageMetrics] {
        &self.per_image
    }

    pub fn uncertainty(&self) -> &UncertaintyAccumulator {
        &self.uncertainty
    }

    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    /// Evaluate one image without touching the accumulators.
    pub fn evaluate_image(&self, sample: ImageSample) -> ImageEvaluation {
        let ImageSample {
            image_id,
            detections,
            ground_truth,
        } = sample;

        let mut stats = EvalStats {
            images: 1,
            total_detections: detections.len(),
            ..EvalStats::default()
        };
        stats.skipped_unlisted_class = detections
            .iter()
            .filter(|d| !self.config.classes.contains(&d.label))
            .count();

        let mut detections =
            filter_detections(detections, &self.config.classes, self.config.confidence_floor);
        stats.skipped_low_confidence =
            stats.total_detections - stats.skipped_unlisted_class - detections.len();
        if detections.is_empty() {
            stats.empty_predictions = 1;
        }

        let raw_ground_truth = ground_truth.len();
        let mut ground_truth = filter_ground_truth(ground_truth, &self.config.classes);
        stats.ground_truth_boxes = ground_truth.len();
        stats.skipped_ground_truth = raw_ground_truth - ground_truth.len();

        if self.config.rank_by_confidence {
            sort_by_confidence(&mut detections);
        }

        let map = calculate_map(&detections, &ground_truth, self.config.ap_matching);
        let observations = observe_image(self.policy.as_ref(), &detections, &ground_truth);
        let matches = match_and_score(&detections, &mut ground_truth);

        let metrics = PerImageMetrics {
            precision: matches.precision,
            recall: matches.recall,
            f1: matches.f1,
            map50: map.map50,
            map50_95: map.map50_95,
        };

        debug!(
            image_id = %image_id,
            detections = detections.len(),
            ground_truth = ground_truth.len(),
            true_positives = matches.true_positives,
            precision = metrics.precision,
            recall = metrics.recall,
            map50 = metrics.map50,
            "evaluated image"
        );

        ImageEvaluation {
            image_id,
            metrics,
            matches,
            observations,
            stats,
        }
    }

    /// Fold one image's results into the dataset accumulators.
    pub fn accumulate(&mut self, evaluation: ImageEvaluation) {
        self.per_image.push(evaluation.metrics);
        self.uncertainty.absorb(evaluation.observations);
        self.stats.merge(&evaluation.stats);
    }

    /// Evaluate and accumulate one image.
    pub fn process_image(&mut self, sample: ImageSample) -> PerImageMetrics {
        let evaluation = self.evaluate_image(sample);
        let metrics = evaluation.metrics;
        self.accumulate(evaluation);
        metrics
    }

    /// Evaluate and accumulate images in order.
    pub fn process_all<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = ImageSample>,
    {
        for sample in samples {
            self.process_image(sample);
        }
    }

    /// Evaluate images on the rayon pool, then accumulate them in input order.
    pub fn process_parallel(&mut self, samples: Vec<ImageSample>) {
        let evaluations: Vec<ImageEvaluation> = samples
            .into_par_iter()
            .map(|sample| self.evaluate_image(sample))
            .collect();

        for evaluation in evaluations {
            self.accumulate(evaluation);
        }
    }

    /// Reduce the accumulated state.
    ///
    /// Metrics are macro-averaged: every image weighs the same regardless of
    /// how many objects it contains. An evaluator that has seen no image
    /// reports zeros and undefined correlations.
    pub fn report(&self) -> DatasetReport {
        let n = self.per_image.len();
        let average = |field: fn(&PerImageMetrics) -> f64| {
            if n == 0 {
                0.0
            } else {
                self.per_image.iter().map(field).sum::<f64>() / n as f64
            }
        };

        let report = DatasetReport {
            images_evaluated: n,
            precision: average(|m| m.precision),
            recall: average(|m| m.recall),
            f1_score: average(|m| m.f1),
            map50: average(|m| m.map50),
            map50_95: average(|m| m.map50_95),
            uncertainty: self.uncertainty.summarize(),
            stats: self.stats,
        };

        info!(
            images = n,
            precision = report.precision,
            recall = report.recall,
            f1_score = report.f1_score,
            map50 = report.map50,
            map50_95 = report.map50_95,
            "dataset evaluation reduced"
        );

        report
    }
}
