use super::config::ValidationConfig;
use super::domain::{Finding, ReviewStatus, Room, RuleCode, Severity};
use super::rooms::{build_rooms, room_statuses};
use super::rules::{Rule, RuleCatalog, RuleCheck, RuleContext};
use crate::drawing::Drawing;
use crate::room_list::RoomList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Finding counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl FindingSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings
            .iter()
            .fold(Self::default(), |mut summary, finding| {
                match finding.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.infos += 1,
                }
                summary
            })
    }
}

/// Outcome of one validation run. Serializes deterministically for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub findings: Vec<Finding>,
    pub score: u8,
    pub status: ReviewStatus,
    pub room_statuses: BTreeMap<String, ReviewStatus>,
    pub rooms: Vec<Room>,
    /// Set when an input could not be read and no rule was run.
    pub blocked: bool,
    pub summary: FindingSummary,
}

impl ValidationResult {
    pub fn findings_for(&self, code: RuleCode) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |finding| finding.code == code)
    }
}

/// Runs every enabled catalog rule against a drawing and room list.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: Arc<RuleCatalog>,
    config: ValidationConfig,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl RuleEngine {
    pub fn new(config: ValidationConfig) -> Self {
        Self::with_catalog(RuleCatalog::standard(), config)
    }

    pub fn with_catalog(catalog: Arc<RuleCatalog>, config: ValidationConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn validate(&self, drawing: &Drawing, room_list: &RoomList) -> ValidationResult {
        let ctx = RuleContext::new(drawing, room_list, &self.config);

        let mut findings = Vec::new();
        for rule in self.catalog.iter() {
            let RuleCheck::Run(check) = rule.check else {
                continue;
            };
            if !self.config.is_enabled(rule.code) {
                debug!(code = %rule.code, "rule disabled, skipping");
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| check(&ctx))) {
                Ok(Ok(rule_findings)) => findings.extend(rule_findings),
                Ok(Err(failure)) => {
                    warn!(code = %rule.code, error = %failure, "rule failed");
                    findings.push(rule_failure(rule, &failure.to_string()));
                }
                Err(payload) => {
                    let reason = panic_payload_to_string(payload.as_ref());
                    warn!(code = %rule.code, panic = %reason, "rule panicked");
                    findings.push(rule_failure(rule, &reason));
                }
            }
        }

        let rooms = build_rooms(&ctx.outlines, room_list, &findings);
        let result = self.finish(findings, rooms, false);
        debug!(
            score = result.score,
            errors = result.summary.errors,
            warnings = result.summary.warnings,
            rooms = result.rooms.len(),
            "validation run finished"
        );
        result
    }

    /// Validates parsed inputs, or reports the first unreadable input as a single blocking
    /// finding with score 0.
    pub fn validate_input<DE, RE>(
        &self,
        drawing: Result<Drawing, DE>,
        room_list: Result<RoomList, RE>,
    ) -> ValidationResult
    where
        DE: Display,
        RE: Display,
    {
        let drawing = match drawing {
            Ok(drawing) => drawing,
            Err(err) => {
                warn!(error = %err, "drawing could not be read");
                return self.blocked(Finding::error(
                    RuleCode::Input001,
                    format!("Drawing could not be read: {err}"),
                ));
            }
        };
        let room_list = match room_list {
            Ok(room_list) => room_list,
            Err(err) => {
                warn!(error = %err, "room list could not be read");
                return self.blocked(Finding::error(
                    RuleCode::Input002,
                    format!("Room list could not be read: {err}"),
                ));
            }
        };
        self.validate(&drawing, &room_list)
    }

    fn blocked(&self, finding: Finding) -> ValidationResult {
        let mut result = self.finish(vec![finding], Vec::new(), true);
        result.score = 0;
        result.status = self.config.scoring.classify(0);
        result
    }

    fn finish(&self, findings: Vec<Finding>, rooms: Vec<Room>, blocked: bool) -> ValidationResult {
        let score = self.config.scoring.score(&findings);
        ValidationResult {
            status: self.config.scoring.classify(score),
            room_statuses: room_statuses(&rooms),
            summary: FindingSummary::from_findings(&findings),
            findings,
            score,
            rooms,
            blocked,
        }
    }
}

fn rule_failure(rule: &Rule, reason: &str) -> Finding {
    Finding::error(
        rule.code,
        format!("Rule {} ({}) could not be evaluated: {}", rule.code, rule.name, reason),
    )
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
