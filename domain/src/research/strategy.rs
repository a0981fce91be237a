//! Research execution strategies
//!
//! A strategy names an execution policy trading latency for research depth.
//! The orchestrator resolves a strategy to an executor at submit time; the
//! domain only knows the closed set of names.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available research execution strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStrategy {
    /// Single work-item fetch plus one AI research call, for smoke testing
    Simple,
    /// Template-based research, no AI round trips
    Fast,
    /// Structured multi-step research, one call per research type
    Async,
    /// Grounded deep research delegated to a long-running agent run
    Deep,
}

impl ResearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchStrategy::Simple => "simple",
            ResearchStrategy::Fast => "fast",
            ResearchStrategy::Async => "async",
            ResearchStrategy::Deep => "deep",
        }
    }

    /// Human-readable latency estimate surfaced to the front door
    pub fn estimated_duration(&self) -> &'static str {
        match self {
            ResearchStrategy::Simple => "1-2 minutes",
            ResearchStrategy::Fast => "2-3 minutes",
            ResearchStrategy::Async => "5-10 minutes",
            ResearchStrategy::Deep => "20-30 minutes",
        }
    }

    pub fn all() -> [ResearchStrategy; 4] {
        [
            ResearchStrategy::Simple,
            ResearchStrategy::Fast,
            ResearchStrategy::Async,
            ResearchStrategy::Deep,
        ]
    }
}

impl std::fmt::Display for ResearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResearchStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(ResearchStrategy::Simple),
            "fast" => Ok(ResearchStrategy::Fast),
            "async" => Ok(ResearchStrategy::Async),
            "deep" => Ok(ResearchStrategy::Deep),
            other => Err(DomainError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Research types produced by the structured strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchKind {
    Technical,
    Market,
    Risk,
    Stakeholder,
}

impl ResearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchKind::Technical => "technical",
            ResearchKind::Market => "market",
            ResearchKind::Risk => "risk",
            ResearchKind::Stakeholder => "stakeholder",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ResearchKind::Technical => "Technical Research",
            ResearchKind::Market => "Market Research",
            ResearchKind::Risk => "Risk Assessment",
            ResearchKind::Stakeholder => "Stakeholder Analysis",
        }
    }

    /// Default research types when a request leaves them unspecified
    pub fn defaults_for(strategy: ResearchStrategy) -> Vec<ResearchKind> {
        match strategy {
            ResearchStrategy::Async => vec![ResearchKind::Technical, ResearchKind::Market],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for ResearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResearchKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "technical" => Ok(ResearchKind::Technical),
            "market" => Ok(ResearchKind::Market),
            "risk" => Ok(ResearchKind::Risk),
            "stakeholder" => Ok(ResearchKind::Stakeholder),
            other => Err(DomainError::UnknownResearchKind(other.to_string())),
        }
    }
}
