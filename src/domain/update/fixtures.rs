//! Shared test fixtures: a small travel-agency domain and rule runners.

use crate::adapters::{StaticDomain, StaticDomainBuilder};
use crate::domain::information_state::{InformationState, PendingMove};
use crate::domain::rules::{EngineError, Phase, RuleContext, RuleEngine, UpdatePolicy};
use crate::domain::semantics::{Action, DialogueMove, Plan, PlanGoal, Proposition, Question, Subplan};
use crate::domain::update::standard_rule_set;
use crate::ports::DomainResource;

pub(crate) fn mode() -> Question {
    Question::wh("mode")
}

pub(crate) fn dest_city() -> Question {
    Question::wh("dest_city")
}

pub(crate) fn dept_city() -> Question {
    Question::wh("dept_city")
}

pub(crate) fn citizenship() -> Question {
    Question::wh("citizenship")
}

pub(crate) fn price_question() -> Question {
    Question::wh("price")
}

pub(crate) fn visa_question() -> Question {
    Question::yes_no(Proposition::nullary("visa_needed"))
}

pub(crate) fn price_plan() -> Plan {
    Plan::new(
        PlanGoal::Resolve(price_question()),
        [
            Subplan::Findout(mode()),
            Subplan::Findout(dest_city()),
            Subplan::Findout(dept_city()),
            Subplan::Consult(price_question()),
        ],
    )
}

pub(crate) fn visa_plan() -> Plan {
    Plan::new(
        PlanGoal::Resolve(visa_question()),
        [
            Subplan::Findout(citizenship()),
            Subplan::Consult(visa_question()),
        ],
    )
}

pub(crate) fn booking_plan() -> Plan {
    Plan::new(
        PlanGoal::Perform(Action::new("book_ticket")),
        [
            Subplan::Findout(mode()),
            Subplan::Execute(Action::new("book_ticket")),
        ],
    )
}

pub(crate) fn travel_builder() -> StaticDomainBuilder {
    StaticDomain::builder()
        .predicate("mode", "means")
        .predicate("dest_city", "city")
        .predicate("dept_city", "city")
        .predicate("citizenship", "nationality")
        .individuals("means", ["plane", "train"])
        .individuals("city", ["paris", "london", "berlin"])
        .individuals("nationality", ["swedish", "american"])
        .plan(price_plan())
        .plan(visa_plan())
        .plan(booking_plan())
        .depends(visa_question(), price_question())
        .database_entry(
            price_question(),
            vec![Proposition::new("mode", "plane")],
            Proposition::new("price", "500"),
        )
        .database_entry(
            price_question(),
            vec![Proposition::new("mode", "train")],
            Proposition::new("price", "200"),
        )
        .database_entry(
            visa_question(),
            vec![Proposition::new("citizenship", "swedish")],
            Proposition::nullary("visa_needed").negated(),
        )
        .database_entry(visa_question(), vec![], Proposition::nullary("visa_needed"))
        .action(Action::new("book_ticket"))
}

pub(crate) fn travel_domain() -> StaticDomain {
    travel_builder().build().unwrap()
}

/// A state whose pending queue holds `moves`.
pub(crate) fn queued(moves: Vec<DialogueMove>) -> InformationState {
    queue_onto(InformationState::new(), moves)
}

pub(crate) fn queue_onto(mut state: InformationState, moves: Vec<DialogueMove>) -> InformationState {
    for dialogue_move in moves {
        state.private.pending.push_back(PendingMove::new(dialogue_move));
    }
    state
}

fn engine() -> RuleEngine {
    RuleEngine::new(standard_rule_set(), 200)
}

pub(crate) fn try_run(
    domain: &dyn DomainResource,
    phase: Phase,
    state: InformationState,
) -> Result<(InformationState, Vec<&'static str>), EngineError> {
    let policy = UpdatePolicy::default();
    let ctx = RuleContext::new(domain, &policy);
    let outcome = engine().apply_phase(phase, state, &ctx)?;
    Ok((outcome.state, outcome.fired))
}

pub(crate) fn run(
    domain: &dyn DomainResource,
    phase: Phase,
    state: InformationState,
) -> (InformationState, Vec<&'static str>) {
    try_run(domain, phase, state).unwrap()
}

pub(crate) fn run_cycle(
    domain: &dyn DomainResource,
    phases: &[Phase],
    state: InformationState,
) -> (InformationState, Vec<&'static str>) {
    run_cycle_with_policy(domain, &UpdatePolicy::default(), phases, state)
}

pub(crate) fn run_cycle_with_policy(
    domain: &dyn DomainResource,
    policy: &UpdatePolicy,
    phases: &[Phase],
    state: InformationState,
) -> (InformationState, Vec<&'static str>) {
    let ctx = RuleContext::new(domain, policy);
    let outcome = engine().apply_cycle(phases, state, &ctx).unwrap();
    (outcome.state, outcome.fired)
}
