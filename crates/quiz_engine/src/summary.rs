use shared::{QuestionType, QuizParameters, TimerMode};

/// The text shown when a loaded quiz is waiting to be confirmed.
///
/// `category_name` is the resolved name of `params.category`, if known.
pub fn describe(
    params: &QuizParameters,
    question_count: usize,
    category_name: Option<&str>,
) -> String {
    let mut lines = vec![format!(
        "{question_count} question{}",
        if question_count == 1 { "" } else { "s" }
    )];

    lines.push(match (params.category, category_name) {
        (None, _) => "Any category".to_string(),
        (Some(_), Some(name)) => name.to_string(),
        (Some(id), None) => format!("Category {id}"),
    });

    lines.push(match params.difficulty {
        None => "Any difficulty level".to_string(),
        Some(difficulty) => format!("{} difficulty level", difficulty.label()),
    });

    lines.push(
        match params.question_type {
            None => "Multiple choice and true/false questions",
            Some(QuestionType::Boolean) => "True or false questions",
            Some(QuestionType::Multiple) => "Multiple choice questions",
        }
        .to_string(),
    );

    match params.timer_type {
        TimerMode::None => {}
        TimerMode::PerQuestion => {
            lines.push(format!("{} seconds per question", params.timer_value));
        }
        TimerMode::WholeQuiz => {
            lines.push(format!("{} seconds to complete the quiz", params.timer_value));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
#[path = "tests/summary_tests.rs"]
mod tests;
