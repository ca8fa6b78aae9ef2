use crate::config::ClassifierConfig;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Label::Positive),
            "negative" => Ok(Label::Negative),
            other => Err(format!("unknown label `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub label: Label,
    /// Certainty in `label`, in percent, rounded to two decimals. Never below 50.
    pub confidence: f64,
    pub raw_score: f64,
}

#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    threshold: f64,
    positive_label: String,
    negative_label: String,
}

impl DecisionPolicy {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            threshold: config.threshold,
            positive_label: config.positive_label.clone(),
            negative_label: config.negative_label.clone(),
        }
    }

    /// Scores strictly above the threshold are positive; a score sitting on the
    /// threshold is negative.
    pub fn decide(&self, score: f64) -> Decision {
        let label = if score > self.threshold {
            Label::Positive
        } else {
            Label::Negative
        };

        Decision {
            label,
            confidence: confidence(score),
            raw_score: score,
        }
    }

    pub fn display_name(&self, label: Label) -> &str {
        match label {
            Label::Positive => &self.positive_label,
            Label::Negative => &self.negative_label,
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

pub fn confidence(score: f64) -> f64 {
    round2(score.max(1.0 - score) * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_positive() {
        let decision = DecisionPolicy::default().decide(0.7);
        assert_eq!(decision.label, Label::Positive);
        assert_eq!(decision.confidence, 70.0);
        assert_eq!(decision.raw_score, 0.7);
    }

    #[test]
    fn test_decide_negative() {
        let decision = DecisionPolicy::default().decide(0.3);
        assert_eq!(decision.label, Label::Negative);
        assert_eq!(decision.confidence, 70.0);
    }

    #[test]
    fn test_decide_boundary_is_negative() {
        let decision = DecisionPolicy::default().decide(0.5);
        assert_eq!(decision.label, Label::Negative);
        assert_eq!(decision.confidence, 50.0);
    }

    #[test]
    fn test_confidence_rounds_to_two_decimals() {
        assert_eq!(confidence(0.123456), 87.65);
        assert_eq!(confidence(0.99999), 100.0);
        assert_eq!(confidence(0.0), 100.0);
    }

    #[test]
    fn test_confidence_never_below_fifty() {
        for i in 0..=1000 {
            let score = i as f64 / 1000.0;
            let decision = DecisionPolicy::default().decide(score);
            assert!(decision.confidence >= 50.0, "score {}", score);
            assert!(decision.confidence <= 100.0, "score {}", score);
        }
    }

    #[test]
    fn test_f32_model_scores() {
        let decision = DecisionPolicy::default().decide(0.7f32 as f64);
        assert_eq!(decision.confidence, 70.0);
        let decision = DecisionPolicy::default().decide(0.3f32 as f64);
        assert_eq!(decision.confidence, 70.0);
    }

    #[test]
    fn test_custom_threshold_and_names() {
        let policy = DecisionPolicy::new(&ClassifierConfig {
            threshold: 0.8,
            positive_label: "abnormal".into(),
            negative_label: "normal".into(),
        });
        let decision = policy.decide(0.75);
        assert_eq!(decision.label, Label::Negative);
        assert_eq!(policy.display_name(decision.label), "normal");
        assert_eq!(policy.display_name(Label::Positive), "abnormal");
    }

    #[test]
    fn test_label_round_trips_through_str() {
        for label in [Label::Positive, Label::Negative] {
            assert_eq!(label.as_str().parse::<Label>(), Ok(label));
        }
        assert!("maybe".parse::<Label>().is_err());
    }
}
