use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    /// Diagnostic only; never blocks the build.
    Info,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Info => "INFO",
        }
    }
}

/// Result of one named audit check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditCheck {
    /// Stable check name (e.g., "usage_conservation").
    pub name: String,
    pub status: CheckStatus,
    /// Observed value.
    pub value: f64,
    /// Value the check expected, when it compares two quantities.
    pub expected: Option<f64>,
    /// Absolute difference between `value` and `expected`.
    pub discrepancy: Option<f64>,
    /// Human-readable description.
    pub detail: String,
}

impl AuditCheck {
    pub fn compared(
        name: impl Into<String>,
        value: f64,
        expected: f64,
        passed: bool,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: if passed {
                CheckStatus::Pass
            } else {
                CheckStatus::Fail
            },
            value,
            expected: Some(expected),
            discrepancy: Some((value - expected).abs()),
            detail: detail.into(),
        }
    }

    pub fn info(name: impl Into<String>, value: f64, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Info,
            value,
            expected: None,
            discrepancy: None,
            detail: detail.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub checks: Vec<AuditCheck>,
}

impl AuditReport {
    pub fn failures(&self) -> impl Iterator<Item = &AuditCheck> {
        self.checks.iter().filter(|check| check.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    pub fn get(&self, name: &str) -> Option<&AuditCheck> {
        self.checks.iter().find(|check| check.name == name)
    }
}
