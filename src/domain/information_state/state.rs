//! The information state: everything the system knows about the dialogue.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::{OpenStack, OrderedSet};
use crate::domain::semantics::{
    DialogueMove, Icm, Participant, Plan, PlanGoal, Proposition, Question,
};

/// Something the system intends to do in an upcoming turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaAction {
    /// Answer a question once the answer is known.
    Respond(Question),
    /// Ask a question from the plan.
    Findout(Question),
    /// Ask a question (plan raise step or clarification).
    Raise(Question),
    Greet,
    Quit,
    Icm(Icm),
    /// Tell the user what was done.
    Report(Proposition),
    /// Repeat the previous system moves.
    RepeatPrevious,
}

impl AgendaAction {
    /// True for actions that end up as an `ask` move.
    pub fn raises_question(&self) -> bool {
        matches!(self, AgendaAction::Findout(_) | AgendaAction::Raise(_))
    }
}

impl fmt::Display for AgendaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgendaAction::Respond(q) => write!(f, "respond({})", q),
            AgendaAction::Findout(q) => write!(f, "findout({})", q),
            AgendaAction::Raise(q) => write!(f, "raise({})", q),
            AgendaAction::Greet => write!(f, "greet"),
            AgendaAction::Quit => write!(f, "quit"),
            AgendaAction::Icm(icm) => write!(f, "{}", icm),
            AgendaAction::Report(p) => write!(f, "report({})", p),
            AgendaAction::RepeatPrevious => write!(f, "repeat"),
        }
    }
}

/// A move waiting to be integrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMove {
    pub dialogue_move: DialogueMove,
    /// Completed update cycles this move survived without being integrated.
    pub attempts: u32,
    /// Whether negative understanding feedback was already given for it.
    pub feedback_given: bool,
}

impl PendingMove {
    pub fn new(dialogue_move: DialogueMove) -> Self {
        Self {
            dialogue_move,
            attempts: 0,
            feedback_given: false,
        }
    }
}

/// The latest utterance and whether its moves were handed to integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Participant,
    pub moves: Vec<DialogueMove>,
    pub grounded: bool,
}

/// Fields only the system can see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivateState {
    pub(crate) agenda: VecDeque<AgendaAction>,
    /// Plan stack, top first.
    pub(crate) plans: Vec<Plan>,
    pub(crate) issues: OpenStack<Question>,
    pub(crate) beliefs: OrderedSet<Proposition>,
    pub(crate) pending: VecDeque<PendingMove>,
    pub(crate) next_moves: Vec<DialogueMove>,
    /// Questions currently on QUD that the system raised to clarify.
    pub(crate) clarifications: OrderedSet<Question>,
}

/// Fields both participants are assumed to share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    pub(crate) qud: OpenStack<Question>,
    pub(crate) commitments: OrderedSet<Proposition>,
    pub(crate) last_utterance: Option<Utterance>,
    pub(crate) previous_moves: Vec<DialogueMove>,
}

/// One dialogue participant's view of the dialogue.
///
/// Rule effects take a state by value and return the replacement, so a
/// failed turn leaves the previous state untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InformationState {
    pub(crate) private: PrivateState,
    pub(crate) shared: SharedState,
}

impl InformationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn qud(&self) -> &OpenStack<Question> {
        &self.shared.qud
    }

    pub fn issues(&self) -> &OpenStack<Question> {
        &self.private.issues
    }

    pub fn agenda(&self) -> &VecDeque<AgendaAction> {
        &self.private.agenda
    }

    /// Plan stack, top first.
    pub fn plans(&self) -> &[Plan] {
        &self.private.plans
    }

    pub fn commitments(&self) -> &OrderedSet<Proposition> {
        &self.shared.commitments
    }

    pub fn beliefs(&self) -> &OrderedSet<Proposition> {
        &self.private.beliefs
    }

    pub fn pending(&self) -> &VecDeque<PendingMove> {
        &self.private.pending
    }

    pub fn next_moves(&self) -> &[DialogueMove] {
        &self.private.next_moves
    }

    pub fn clarifications(&self) -> &OrderedSet<Question> {
        &self.private.clarifications
    }

    pub fn last_utterance(&self) -> Option<&Utterance> {
        self.shared.last_utterance.as_ref()
    }

    pub fn previous_moves(&self) -> &[DialogueMove] {
        &self.shared.previous_moves
    }

    /// True if `question` is on QUD because the system asked it to clarify.
    pub fn is_clarification(&self, question: &Question) -> bool {
        self.private.clarifications.contains(question)
    }

    /// The plan loaded for `goal`, if any.
    pub fn plan_for(&self, goal: &PlanGoal) -> Option<&Plan> {
        self.private.plans.iter().find(|plan| &plan.goal == goal)
    }

    /// Records a new utterance whose moves grounding will hand to integration.
    ///
    /// Returns the replacement state; QUD and issues are left alone.
    pub fn with_utterance(mut self, speaker: Participant, moves: Vec<DialogueMove>) -> Self {
        self.shared.last_utterance = Some(Utterance {
            speaker,
            moves,
            grounded: false,
        });
        self
    }

    /// Takes the selected moves out of the state.
    pub fn take_next_moves(mut self) -> (Self, Vec<DialogueMove>) {
        let moves = std::mem::take(&mut self.private.next_moves);
        (self, moves)
    }

    /// Counts one more failed integration cycle for every pending move.
    pub fn with_attempts_recorded(mut self) -> Self {
        for pending in self.private.pending.iter_mut() {
            pending.attempts += 1;
        }
        self
    }

    /// Adds `proposition` to the shared commitments.
    pub(crate) fn commit(&mut self, proposition: Proposition) {
        self.shared.commitments.insert(proposition);
    }

    /// Removes the pending move at `index`.
    pub(crate) fn take_pending(&mut self, index: usize) -> Option<PendingMove> {
        self.private.pending.remove(index)
    }

    /// Appends `action` unless an equal action is already scheduled.
    pub(crate) fn schedule(&mut self, action: AgendaAction) {
        if !self.private.agenda.contains(&action) {
            self.private.agenda.push_back(action);
        }
    }

    pub(crate) fn unschedule(&mut self, action: &AgendaAction) {
        self.private.agenda.retain(|existing| existing != action);
    }

    /// Facts the system may rely on: commitments, then private beliefs.
    pub(crate) fn facts(&self) -> Vec<Proposition> {
        self.shared
            .commitments
            .iter()
            .chain(self.private.beliefs.iter())
            .cloned()
            .collect()
    }
}

impl fmt::Display for InformationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qud:         {}", self.shared.qud)?;
        writeln!(f, "issues:      {}", self.private.issues)?;
        let agenda: Vec<String> = self.private.agenda.iter().map(|a| a.to_string()).collect();
        writeln!(f, "agenda:      [{}]", agenda.join(", "))?;
        let plans: Vec<String> = self.private.plans.iter().map(|p| p.goal.to_string()).collect();
        writeln!(f, "plans:       [{}]", plans.join(", "))?;
        let com: Vec<String> = self.shared.commitments.iter().map(|p| p.to_string()).collect();
        writeln!(f, "commitments: {{{}}}", com.join(", "))?;
        let bel: Vec<String> = self.private.beliefs.iter().map(|p| p.to_string()).collect();
        write!(f, "beliefs:     {{{}}}", bel.join(", "))
    }
}
