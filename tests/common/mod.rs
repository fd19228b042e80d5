//! Shared helpers for integration tests: a scripted interpreter and two
//! small domains.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use dialogue_manager::adapters::{StaticDomain, TemplateGenerator};
use dialogue_manager::application::DialogueMoveEngine;
use dialogue_manager::domain::information_state::InformationState;
use dialogue_manager::domain::semantics::{
    Action, DialogueMove, Participant, Plan, PlanGoal, Proposition, Question, Subplan,
};
use dialogue_manager::ports::{InterpretationFailure, Interpreter};

/// Maps known utterances to fixed moves; anything else is not understood.
#[derive(Default)]
pub struct ScriptedInterpreter {
    lines: HashMap<String, Vec<DialogueMove>>,
}

impl ScriptedInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, utterance: &str, moves: Vec<DialogueMove>) -> Self {
        self.lines.insert(utterance.to_string(), moves);
        self
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn interpret(
        &self,
        utterance: &str,
        _speaker: Participant,
        _state: &InformationState,
    ) -> Result<Vec<DialogueMove>, InterpretationFailure> {
        self.lines
            .get(utterance)
            .cloned()
            .ok_or_else(|| InterpretationFailure::not_understood(utterance))
    }
}

// -----------------------------------------------------------------------------
// Travel agency
// -----------------------------------------------------------------------------

pub fn mode() -> Question {
    Question::wh("mode")
}

pub fn dest_city() -> Question {
    Question::wh("dest_city")
}

pub fn dept_city() -> Question {
    Question::wh("dept_city")
}

pub fn price() -> Question {
    Question::wh("price")
}

pub fn visa() -> Question {
    Question::yes_no(Proposition::nullary("visa_needed"))
}

pub fn travel_domain() -> StaticDomain {
    StaticDomain::builder()
        .predicate("mode", "means")
        .predicate("dest_city", "city")
        .predicate("dept_city", "city")
        .predicate("citizenship", "nationality")
        .individuals("means", ["plane", "train"])
        .individuals("city", ["paris", "london", "berlin"])
        .individuals("nationality", ["swedish", "american"])
        .plan(Plan::new(
            PlanGoal::Resolve(price()),
            [
                Subplan::Findout(mode()),
                Subplan::Findout(dest_city()),
                Subplan::Findout(dept_city()),
                Subplan::Consult(price()),
            ],
        ))
        .plan(Plan::new(
            PlanGoal::Resolve(visa()),
            [
                Subplan::Findout(Question::wh("citizenship")),
                Subplan::Consult(visa()),
            ],
        ))
        .plan(Plan::new(
            PlanGoal::Perform(Action::new("book_ticket")),
            [
                Subplan::Findout(mode()),
                Subplan::Execute(Action::new("book_ticket")),
            ],
        ))
        .depends(visa(), price())
        .database_entry(
            price(),
            vec![Proposition::new("mode", "plane")],
            Proposition::new("price", "500"),
        )
        .database_entry(
            price(),
            vec![Proposition::new("mode", "train")],
            Proposition::new("price", "200"),
        )
        .database_entry(
            visa(),
            vec![Proposition::new("citizenship", "swedish")],
            Proposition::nullary("visa_needed").negated(),
        )
        .database_entry(visa(), vec![], Proposition::nullary("visa_needed"))
        .action(Action::new("book_ticket"))
        .build()
        .expect("travel domain is valid")
}

pub fn travel_generator() -> TemplateGenerator {
    TemplateGenerator::new()
        .with_question(mode(), "How do you want to travel?")
        .with_question(dest_city(), "Where are you going?")
        .with_question(dept_city(), "Where are you leaving from?")
        .with_phrase("mode", "by {value}")
        .with_phrase("dest_city", "to {value}")
        .with_phrase("dept_city", "from {value}")
        .with_phrase("price", "the price is {value} crowns")
        .with_phrase("done", "that is done")
}

pub fn travel_agent(interpreter: ScriptedInterpreter) -> DialogueMoveEngine {
    DialogueMoveEngine::new(
        Arc::new(travel_domain()),
        Arc::new(interpreter),
        Arc::new(travel_generator()),
    )
}

// -----------------------------------------------------------------------------
// Contract drafting
// -----------------------------------------------------------------------------

pub fn contract() -> Question {
    Question::wh("contract")
}

pub fn parties() -> Question {
    Question::wh("parties")
}

pub fn effective_date() -> Question {
    Question::wh("effective_date")
}

pub fn governing_law() -> Question {
    Question::wh("governing_law")
}

pub fn contract_domain() -> StaticDomain {
    StaticDomain::builder()
        .predicate("parties", "party")
        .predicate("effective_date", "date")
        .predicate("governing_law", "jurisdiction")
        .individuals("party", ["acme_and_smith", "acme_and_jones"])
        .individuals("date", ["jan_1", "feb_1"])
        .individuals("jurisdiction", ["sweden", "delaware"])
        .plan(Plan::new(
            PlanGoal::Resolve(contract()),
            [
                Subplan::Findout(parties()),
                Subplan::Findout(effective_date()),
                Subplan::Findout(governing_law()),
                Subplan::Consult(contract()),
            ],
        ))
        .database_entry(contract(), vec![], Proposition::new("contract", "draft_1"))
        .build()
        .expect("contract domain is valid")
}

pub fn contract_agent(interpreter: ScriptedInterpreter) -> DialogueMoveEngine {
    DialogueMoveEngine::new(
        Arc::new(contract_domain()),
        Arc::new(interpreter),
        Arc::new(
            TemplateGenerator::new()
                .with_question(parties(), "Who are the parties?")
                .with_question(effective_date(), "When does it take effect?")
                .with_question(governing_law(), "Which law governs it?"),
        ),
    )
}
