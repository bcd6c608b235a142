//! Grades, category scores and the advice attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade on the A+ to F scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeLetter {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl GradeLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLetter::APlus => "A+",
            GradeLetter::A => "A",
            GradeLetter::BPlus => "B+",
            GradeLetter::B => "B",
            GradeLetter::CPlus => "C+",
            GradeLetter::C => "C",
            GradeLetter::D => "D",
            GradeLetter::F => "F",
        }
    }

    /// Human-readable meaning of the grade
    pub fn description(&self) -> &'static str {
        match self {
            GradeLetter::APlus => "Excellent performance, production ready with headroom",
            GradeLetter::A => "Very good performance, minor tuning opportunities",
            GradeLetter::BPlus => "Good performance, some areas need attention",
            GradeLetter::B => "Acceptable performance, optimization recommended",
            GradeLetter::CPlus => "Below expectations, several issues to address",
            GradeLetter::C => "Poor performance, significant optimization required",
            GradeLetter::D => "Very poor performance, not production ready",
            GradeLetter::F => "Failing performance, critical issues must be fixed",
        }
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Presentation class of a grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeClass {
    Success,
    Warning,
    Danger,
}

/// A score on the 0-100 scale with its letter and class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub letter: GradeLetter,
    pub score: f64,
    pub class: GradeClass,
}

impl Grade {
    /// Map a score onto the grade step function.
    ///
    /// The score is clamped to [0, 100] first; NaN grades as 0.
    ///
    /// ```
    /// use perf_types::{Grade, GradeLetter};
    ///
    /// assert_eq!(Grade::from_score(92.0).letter, GradeLetter::APlus);
    /// assert_eq!(Grade::from_score(74.9).letter, GradeLetter::B);
    /// assert_eq!(Grade::from_score(12.0).letter, GradeLetter::F);
    /// ```
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) };

        let letter = if score >= 90.0 {
            GradeLetter::APlus
        } else if score >= 80.0 {
            GradeLetter::A
        } else if score >= 75.0 {
            GradeLetter::BPlus
        } else if score >= 70.0 {
            GradeLetter::B
        } else if score >= 65.0 {
            GradeLetter::CPlus
        } else if score >= 60.0 {
            GradeLetter::C
        } else if score >= 50.0 {
            GradeLetter::D
        } else {
            GradeLetter::F
        };

        let class = if score >= 75.0 {
            GradeClass::Success
        } else if score >= 60.0 {
            GradeClass::Warning
        } else {
            GradeClass::Danger
        };

        Grade {
            letter,
            score,
            class,
        }
    }

    pub fn description(&self) -> &'static str {
        self.letter.description()
    }
}

/// A named metric value that contributed to a category score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    pub value: f64,
    /// Score of this metric alone (0-100)
    pub score: f64,
}

/// One weighted category of the overall grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    /// Weight in percent; the weights of a result sum to 100
    pub weight: f64,
    pub score: f64,
    pub metrics: Vec<MetricValue>,
    pub reason: String,
}

impl CategoryScore {
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score)
    }
}

/// Severity of a detected issue, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// A threshold-triggered finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub category: String,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

/// Category-triggered improvement advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub priority: RecommendationPriority,
    pub title: String,
    pub actions: Vec<String>,
    pub expected_improvement: String,
}

/// A step of the improvement roadmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub name: String,
    pub timeframe: String,
    pub focus: Vec<String>,
    /// Score points this phase is expected to add
    pub expected_gain: f64,
    /// Overall score after this phase
    pub projected_score: f64,
}

/// Phased plan from the current score towards the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub current_score: f64,
    pub target_score: f64,
    pub phases: Vec<RoadmapPhase>,
}
