use super::domain::{Finding, ReviewStatus, Severity};
use serde::{Deserialize, Serialize};

/// Penalty points per finding severity and the bands used to classify a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub error_penalty: u32,
    pub warning_penalty: u32,
    pub info_penalty: u32,
    pub ok_threshold: u8,
    pub warning_threshold: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            error_penalty: 8,
            warning_penalty: 3,
            info_penalty: 0,
            ok_threshold: 90,
            warning_threshold: 60,
        }
    }
}

impl ScoringPolicy {
    pub const fn penalty(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Error => self.error_penalty,
            Severity::Warning => self.warning_penalty,
            Severity::Info => self.info_penalty,
        }
    }

    /// Starts at 100 and subtracts the penalty of every finding, never dropping below 0.
    pub fn score<'a, I>(&self, findings: I) -> u8
    where
        I: IntoIterator<Item = &'a Finding>,
    {
        let deducted = findings
            .into_iter()
            .fold(0u32, |total, finding| {
                total.saturating_add(self.penalty(finding.severity))
            });
        100u32.saturating_sub(deducted) as u8
    }

    pub const fn classify(&self, score: u8) -> ReviewStatus {
        if score >= self.ok_threshold {
            ReviewStatus::Ok
        } else if score >= self.warning_threshold {
            ReviewStatus::Warning
        } else {
            ReviewStatus::Error
        }
    }
}

/// Score under the default policy.
pub fn score(findings: &[Finding]) -> u8 {
    ScoringPolicy::default().score(findings)
}

/// Rounded mean of the available scores; `None` when nothing has been scored yet.
pub fn aggregate_scores<I>(scores: I) -> Option<u8>
where
    I: IntoIterator<Item = Option<u8>>,
{
    let (sum, count) = scores
        .into_iter()
        .flatten()
        .fold((0u32, 0u32), |(sum, count), score| (sum + u32::from(score), count + 1));
    if count == 0 {
        return None;
    }
    Some(((f64::from(sum) / f64::from(count)).round()) as u8)
}
