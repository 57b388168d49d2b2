//! Multiple-choice questionnaire (QCM) helpers.
//!
//! Generation itself is delegated to the language model; this module decides
//! how many items of each difficulty to ask for, builds the prompt, cleans up
//! whatever the model returned and derives the scoring block.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Items per set when the request does not say.
pub const DEFAULT_QCM_COUNT: u32 = 10;

/// Upper bound on items per set.
pub const MAX_QCM_ITEMS: u32 = 50;

/// Minimum number of choices an item must carry.
pub const MIN_CHOICES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Requested proportion of each difficulty. Weights need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMix {
    #[serde(default)]
    pub easy: f64,
    #[serde(default)]
    pub medium: f64,
    #[serde(default)]
    pub hard: f64,
}

impl Default for DifficultyMix {
    fn default() -> Self {
        Self {
            easy: 0.3,
            medium: 0.5,
            hard: 0.2,
        }
    }
}

/// Item counts per difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DifficultySplit {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultySplit {
    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }

    fn slot(&mut self, difficulty: Difficulty) -> &mut u32 {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Split `count` items across difficulties with the largest-remainder
/// method. Ties on the remainder go to the easier difficulty.
pub fn split_counts(count: u32, mix: &DifficultyMix) -> Result<DifficultySplit, CoreError> {
    if count == 0 || count > MAX_QCM_ITEMS {
        return Err(CoreError::Validation(format!(
            "count must be between 1 and {MAX_QCM_ITEMS}"
        )));
    }
    let weights = [mix.easy, mix.medium, mix.hard];
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(CoreError::Validation(
            "mix weights must be non-negative numbers".into(),
        ));
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(CoreError::Validation(
            "mix must give a positive weight to at least one difficulty".into(),
        ));
    }

    let mut split = DifficultySplit::default();
    let mut remainders = Vec::with_capacity(3);
    for (difficulty, weight) in Difficulty::ALL.into_iter().zip(weights) {
        let exact = f64::from(count) * weight / sum;
        let floor = exact.floor();
        *split.slot(difficulty) = floor as u32;
        remainders.push((difficulty, exact - floor));
    }

    // Stable sort keeps the easier difficulty first on equal remainders.
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    let missing = count - split.total();
    for (difficulty, _) in remainders.into_iter().take(missing as usize) {
        *split.slot(difficulty) += 1;
    }
    Ok(split)
}

/// One validated question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcmItem {
    pub question: String,
    pub choices: Vec<String>,
    /// Zero-based index into `choices`.
    pub answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
}

/// Keep the well-formed items of a model response, at most `count`.
///
/// Accepts either `{"items": [...]}` or a bare array. Items with an empty
/// question, fewer than [`MIN_CHOICES`] non-empty choices or an answer
/// index out of range are dropped.
pub fn sanitize_items(raw: &Value, count: u32) -> Vec<QcmItem> {
    let list = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    list.iter()
        .filter_map(|v| serde_json::from_value::<QcmItem>(v.clone()).ok())
        .filter_map(|mut item| {
            item.question = item.question.trim().to_string();
            item.choices = item
                .choices
                .into_iter()
                .map(|c| c.trim().to_string())
                .collect();
            let well_formed = !item.question.is_empty()
                && item.choices.len() >= MIN_CHOICES
                && item.choices.iter().all(|c| !c.is_empty())
                && item.answer_index < item.choices.len();
            well_formed.then_some(item)
        })
        .take(count as usize)
        .collect()
}

/// Scoring block returned with a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    pub points_per_item: u32,
    pub total_points: u32,
    /// Half the total, rounded up.
    pub pass_mark: u32,
    pub by_difficulty: DifficultySplit,
}

pub fn build_scoring(items: &[QcmItem]) -> Scoring {
    let mut by_difficulty = DifficultySplit::default();
    for item in items {
        *by_difficulty.slot(item.difficulty) += 1;
    }
    let total_points = items.len() as u32;
    Scoring {
        points_per_item: 1,
        total_points,
        pass_mark: total_points.div_ceil(2),
        by_difficulty,
    }
}

pub const QCM_SYSTEM_PROMPT: &str = "Tu es un concepteur pédagogique pour l'enseignement \
secondaire en Côte d'Ivoire. Tu rédiges des questionnaires à choix multiples en français. \
Réponds uniquement avec un objet JSON de la forme {\"items\": [{\"question\": string, \
\"choices\": [string], \"answer_index\": number, \"explanation\": string, \
\"difficulty\": \"easy\"|\"medium\"|\"hard\"}]}.";

/// User prompt for one generation request.
pub fn build_user_prompt(subject: &str, grade: &str, theme: &str, split: &DifficultySplit) -> String {
    format!(
        "Matière : {subject}\nNiveau : {grade}\nThème : {theme}\n\
         Génère exactement {total} questions : {easy} easy, {medium} medium, {hard} hard. \
         Chaque question a 4 choix et une seule bonne réponse.",
        total = split.total(),
        easy = split.easy,
        medium = split.medium,
        hard = split.hard,
    )
}
