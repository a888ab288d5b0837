//! 测验自动判分
//!
//! 选择题与判断题按所选选项判分，答对得满分；简答题不自动判分，
//! `is_correct` 为空、得分为 0，等待教师批改。未作答的题目不写入答案。

use std::collections::{HashMap, HashSet};

use crate::models::quizzes::{
    entities::QuizQuestion,
    requests::{AnswerSubmission, ScoredAnswer},
};

pub(crate) fn score_answers(
    questions: &[QuizQuestion],
    answers: &[AnswerSubmission],
) -> Result<(Vec<ScoredAnswer>, f64), String> {
    let by_id: HashMap<i64, &QuizQuestion> = questions.iter().map(|q| (q.id, q)).collect();
    let mut seen = HashSet::new();
    let mut scored = Vec::with_capacity(answers.len());
    let mut total = 0.0;

    for answer in answers {
        let Some(question) = by_id.get(&answer.question_id) else {
            return Err(format!(
                "Question {} does not belong to this quiz",
                answer.question_id
            ));
        };
        if !seen.insert(answer.question_id) {
            return Err(format!("Question {} answered twice", answer.question_id));
        }

        if !question.question_type.has_options() {
            scored.push(ScoredAnswer {
                question_id: question.id,
                selected_option_id: None,
                text_answer: answer
                    .text_answer
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
                is_correct: None,
                points_awarded: 0.0,
            });
            continue;
        }

        let correct = match answer.selected_option_id {
            Some(option_id) => {
                let Some(option) = question.options.iter().find(|o| o.id == option_id) else {
                    return Err(format!(
                        "Option {option_id} does not belong to question {}",
                        question.id
                    ));
                };
                option.is_correct.unwrap_or(false)
            }
            None => false,
        };
        let points = if correct { question.points } else { 0.0 };
        total += points;

        scored.push(ScoredAnswer {
            question_id: question.id,
            selected_option_id: answer.selected_option_id,
            text_answer: None,
            is_correct: Some(correct),
            points_awarded: points,
        });
    }

    Ok((scored, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::entities::{QuestionType, QuizOption};

    fn question(id: i64, kind: QuestionType, points: f64, correct_option: Option<i64>) -> QuizQuestion {
        let options = if kind.has_options() {
            [id * 10 + 1, id * 10 + 2]
                .into_iter()
                .enumerate()
                .map(|(i, option_id)| QuizOption {
                    id: option_id,
                    question_id: id,
                    option_text: format!("option {option_id}"),
                    is_correct: Some(Some(option_id) == correct_option),
                    position: i as i32 + 1,
                })
                .collect()
        } else {
            Vec::new()
        };
        QuizQuestion {
            id,
            quiz_id: 1,
            question_text: format!("question {id}"),
            question_type: kind,
            points,
            position: id as i32,
            options,
        }
    }

    fn pick(question_id: i64, option: Option<i64>, text: Option<&str>) -> AnswerSubmission {
        AnswerSubmission {
            question_id,
            selected_option_id: option,
            text_answer: text.map(str::to_string),
        }
    }

    #[test]
    fn test_score_mixed_quiz() {
        let questions = vec![
            question(1, QuestionType::MultipleChoice, 2.0, Some(11)),
            question(2, QuestionType::TrueFalse, 1.0, Some(21)),
            question(3, QuestionType::ShortAnswer, 5.0, None),
        ];
        let answers = vec![
            pick(1, Some(11), None),
            pick(2, Some(22), None),
            pick(3, None, Some("  photosynthesis ")),
        ];

        let (scored, total) = score_answers(&questions, &answers).unwrap();
        assert_eq!(total, 2.0);
        assert_eq!(scored[0].is_correct, Some(true));
        assert_eq!(scored[0].points_awarded, 2.0);
        assert_eq!(scored[1].is_correct, Some(false));
        assert_eq!(scored[1].points_awarded, 0.0);
        assert_eq!(scored[2].is_correct, None);
        assert_eq!(scored[2].text_answer.as_deref(), Some("photosynthesis"));
    }

    #[test]
    fn test_unanswered_option_scores_zero() {
        let questions = vec![question(1, QuestionType::MultipleChoice, 3.0, Some(11))];
        let (scored, total) = score_answers(&questions, &[pick(1, None, None)]).unwrap();
        assert_eq!(total, 0.0);
        assert_eq!(scored[0].is_correct, Some(false));
    }

    #[test]
    fn test_rejects_foreign_question_and_option() {
        let questions = vec![question(1, QuestionType::MultipleChoice, 1.0, Some(11))];
        assert!(score_answers(&questions, &[pick(9, Some(11), None)]).is_err());
        assert!(score_answers(&questions, &[pick(1, Some(99), None)]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_answers() {
        let questions = vec![question(1, QuestionType::TrueFalse, 1.0, Some(11))];
        let answers = vec![pick(1, Some(11), None), pick(1, Some(12), None)];
        assert!(score_answers(&questions, &answers).is_err());
    }
}
