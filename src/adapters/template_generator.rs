//! Template-based move realization.
//!
//! Questions and propositions can be given explicit wording; anything without
//! a template is realized from its predicate name, so every move has some
//! surface form.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::semantics::{
    AnswerContent, DialogueMove, Icm, IcmContent, IcmLevel, MoveKind, Polarity, Proposition,
    Question,
};
use crate::ports::{GenerationError, Generator};

/// Placeholder replaced by a proposition's argument.
const VALUE_SLOT: &str = "{value}";

#[derive(Debug, Clone, Default)]
pub struct TemplateGenerator {
    questions: HashMap<Question, String>,
    phrases: HashMap<String, String>,
    greeting: Option<String>,
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed wording for asking `question`.
    pub fn with_question(mut self, question: Question, text: impl Into<String>) -> Self {
        self.questions.insert(question, text.into());
        self
    }

    /// Wording for propositions about `predicate`; `{value}` is replaced by the argument.
    pub fn with_phrase(mut self, predicate: impl Into<String>, template: impl Into<String>) -> Self {
        self.phrases.insert(predicate.into(), template.into());
        self
    }

    pub fn with_greeting(mut self, text: impl Into<String>) -> Self {
        self.greeting = Some(text.into());
        self
    }

    fn phrase(&self, proposition: &Proposition) -> String {
        let value = proposition
            .value
            .as_ref()
            .map(|v| v.as_str())
            .unwrap_or_default();
        let body = match self.phrases.get(&proposition.predicate) {
            Some(template) => template.replace(VALUE_SLOT, value),
            None => {
                let predicate = proposition.predicate.replace('_', " ");
                if value.is_empty() {
                    predicate
                } else {
                    format!("{} {}", predicate, value)
                }
            }
        };
        if proposition.positive {
            body
        } else {
            format!("not {}", body)
        }
    }

    fn ask(&self, question: &Question) -> String {
        if let Some(text) = self.questions.get(question) {
            return text.clone();
        }
        match question {
            Question::Wh { predicate, .. } => {
                format!("What is the {}?", predicate.replace('_', " "))
            }
            Question::YesNo(p) => format!("Is it true that {}?", self.phrase(p)),
            Question::Alternative(options) => {
                let phrases: Vec<String> = options.iter().map(|p| self.phrase(p)).collect();
                match phrases.split_last() {
                    Some((last, rest)) if !rest.is_empty() => {
                        format!("Do you mean {} or {}?", rest.join(", "), last)
                    }
                    _ => format!("Do you mean {}?", phrases.concat()),
                }
            }
        }
    }

    fn icm(&self, dialogue_move: &DialogueMove, icm: &Icm) -> Result<String, GenerationError> {
        let no_realization = || GenerationError::NoRealization(dialogue_move.to_string());
        let text = match (icm.level, icm.polarity, &icm.content) {
            (IcmLevel::Perception, Polarity::Negative, _) => "Pardon?".to_string(),
            (IcmLevel::Perception, Polarity::Positive, _) => "I heard you.".to_string(),
            (IcmLevel::Understanding, Polarity::Negative, _) => {
                "I don't quite understand.".to_string()
            }
            (IcmLevel::Understanding, Polarity::Positive, Some(IcmContent::Proposition(p))) => {
                capitalize(&format!("{}.", self.phrase(p)))
            }
            (IcmLevel::Understanding, Polarity::Positive, _) => "I understand.".to_string(),
            (
                IcmLevel::Understanding | IcmLevel::Perception,
                Polarity::Interrogative,
                Some(IcmContent::Proposition(p)),
            ) => capitalize(&format!("{}, is that correct?", self.phrase(p))),
            (IcmLevel::Acceptance, Polarity::Positive, _) => "Okay.".to_string(),
            (IcmLevel::Acceptance, Polarity::Negative, Some(IcmContent::Issue(_))) => {
                "Sorry, I can't answer that.".to_string()
            }
            (IcmLevel::Acceptance, Polarity::Negative, Some(IcmContent::Action(_))) => {
                "Sorry, I can't do that.".to_string()
            }
            (IcmLevel::Acceptance, Polarity::Negative, _) => {
                "Sorry, I can't use that.".to_string()
            }
            (_, Polarity::Interrogative, _) => return Err(no_realization()),
        };
        Ok(text)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl Generator for TemplateGenerator {
    async fn generate(&self, dialogue_move: &DialogueMove) -> Result<String, GenerationError> {
        let text = match &dialogue_move.kind {
            MoveKind::Ask(question) => self.ask(question),
            MoveKind::Answer(answer) => match &answer.content {
                AnswerContent::Proposition(p) => capitalize(&format!("{}.", self.phrase(p))),
                AnswerContent::Value(v) => capitalize(&format!("{}.", v)),
                AnswerContent::Yes => "Yes.".to_string(),
                AnswerContent::No => "No.".to_string(),
            },
            MoveKind::Request(action) => {
                format!("Please {}.", action.as_str().replace('_', " "))
            }
            MoveKind::Assert(p) => capitalize(&format!("{}.", self.phrase(p))),
            MoveKind::Greet => self
                .greeting
                .clone()
                .unwrap_or_else(|| "Welcome!".to_string()),
            MoveKind::Quit => "Goodbye.".to_string(),
            MoveKind::Icm(icm) => self.icm(dialogue_move, icm)?,
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::semantics::{Action, Answer};

    fn system(kind: MoveKind) -> DialogueMove {
        DialogueMove::system(kind)
    }

    async fn say(generator: &TemplateGenerator, kind: MoveKind) -> String {
        generator.generate(&system(kind)).await.unwrap()
    }

    mod questions {
        use super::*;

        #[tokio::test]
        async fn explicit_wording_wins() {
            let generator = TemplateGenerator::new()
                .with_question(Question::wh("dest_city"), "Where do you want to go?");
            let text = say(&generator, MoveKind::Ask(Question::wh("dest_city"))).await;
            assert_eq!(text, "Where do you want to go?");
        }

        #[tokio::test]
        async fn wh_question_falls_back_to_predicate_name() {
            let text = say(&TemplateGenerator::new(), MoveKind::Ask(Question::wh("dept_city"))).await;
            assert_eq!(text, "What is the dept city?");
        }

        #[tokio::test]
        async fn alternative_lists_every_option() {
            let generator = TemplateGenerator::new()
                .with_phrase("dest_city", "to {value}")
                .with_phrase("dept_city", "from {value}");
            let alt = Question::alternative(vec![
                Proposition::new("dest_city", "paris"),
                Proposition::new("dept_city", "paris"),
            ]);
            let text = say(&generator, MoveKind::Ask(alt)).await;
            assert_eq!(text, "Do you mean to paris or from paris?");
        }
    }

    mod statements {
        use super::*;

        #[tokio::test]
        async fn answer_uses_phrase_template() {
            let generator = TemplateGenerator::new().with_phrase("price", "the price is {value} crowns");
            let answer = Answer::proposition(Proposition::new("price", "500"));
            let text = say(&generator, MoveKind::Answer(answer)).await;
            assert_eq!(text, "The price is 500 crowns.");
        }

        #[tokio::test]
        async fn negative_proposition_is_negated() {
            let p = Proposition::nullary("visa_needed").negated();
            let text = say(&TemplateGenerator::new(), MoveKind::Assert(p)).await;
            assert_eq!(text, "Not visa needed.");
        }

        #[tokio::test]
        async fn greet_and_quit_have_fixed_wording() {
            let generator = TemplateGenerator::new().with_greeting("Welcome to the travel agency!");
            assert_eq!(say(&generator, MoveKind::Greet).await, "Welcome to the travel agency!");
            assert_eq!(say(&generator, MoveKind::Quit).await, "Goodbye.");
        }

        #[tokio::test]
        async fn request_names_the_action() {
            let text = say(&TemplateGenerator::new(), MoveKind::Request(Action::new("book_ticket"))).await;
            assert_eq!(text, "Please book ticket.");
        }
    }

    mod feedback {
        use super::*;

        #[tokio::test]
        async fn grounding_feedback_is_realized() {
            let generator = TemplateGenerator::new();
            assert_eq!(say(&generator, MoveKind::Icm(Icm::not_perceived())).await, "Pardon?");
            assert_eq!(
                say(&generator, MoveKind::Icm(Icm::not_understood())).await,
                "I don't quite understand."
            );
            assert_eq!(
                say(&generator, MoveKind::Icm(Icm::accepted(Proposition::new("mode", "plane")))).await,
                "Okay."
            );
        }

        #[tokio::test]
        async fn interrogative_understanding_asks_for_confirmation() {
            let generator = TemplateGenerator::new().with_phrase("mode", "by {value}");
            let icm = Icm::new(IcmLevel::Understanding, Polarity::Interrogative)
                .with_content(IcmContent::Proposition(Proposition::new("mode", "plane")));
            assert_eq!(say(&generator, MoveKind::Icm(icm)).await, "By plane, is that correct?");
        }

        #[tokio::test]
        async fn rejections_distinguish_issues_and_actions() {
            let generator = TemplateGenerator::new();
            let issue = Icm::issue_rejected(Question::wh("weather"));
            let action = Icm::action_rejected(Action::new("fly_plane"));
            assert_eq!(say(&generator, MoveKind::Icm(issue)).await, "Sorry, I can't answer that.");
            assert_eq!(say(&generator, MoveKind::Icm(action)).await, "Sorry, I can't do that.");
        }

        #[tokio::test]
        async fn contentless_check_has_no_realization() {
            let icm = Icm::new(IcmLevel::Acceptance, Polarity::Interrogative);
            let err = TemplateGenerator::new()
                .generate(&system(MoveKind::Icm(icm)))
                .await
                .unwrap_err();
            assert!(matches!(err, GenerationError::NoRealization(_)));
        }
    }
}
