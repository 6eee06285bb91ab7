//! Next-question selection for the collect phase.
//!
//! The selector walks the critical field order first, then the preference
//! order, returning the first topic that is unset and has not been asked.
//! Two exceptions to the plain scan:
//! - an ambiguous micro-location jumps the queue for clarification;
//! - a city that is only inferred gets a confirmation sub-question
//!   instead of counting as answered.

use lead_triage_core::{AskTopic, FieldId, FieldStatus};

use crate::session::SessionState;

/// Picks what to ask next, or `None` when nothing is worth asking.
///
/// `max_asks` bounds only the ambiguity re-ask; regular topics are asked
/// at most once here (the quality gate owns second asks). Never returns
/// the topic asked on the previous turn while an alternative exists.
pub fn next_topic(state: &SessionState, max_asks: u32) -> Option<AskTopic> {
    let candidates = candidate_topics(state, max_asks);
    match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        [first, second, ..] if Some(*first) == state.last_asked => Some(*second),
        [first, ..] => Some(*first),
    }
}

fn candidate_topics(state: &SessionState, max_asks: u32) -> Vec<AskTopic> {
    let mut candidates = Vec::new();

    if let Some(micro) = state.micro_location() {
        if micro.is_ambiguous() && state.asked_count(AskTopic::MicroLocation) < max_asks {
            candidates.push(AskTopic::MicroLocation);
        }
    }

    for field in FieldId::CRITICAL {
        if !state.has(field) {
            push_unasked(&mut candidates, state, field);
        } else if field == FieldId::City
            && state.status(FieldId::City) == Some(FieldStatus::Inferred)
            && state.asked_count(AskTopic::CityConfirm) == 0
        {
            candidates.push(AskTopic::CityConfirm);
        }
    }

    for field in FieldId::PREFERENCE {
        // Identity may carry the name even when the criteria map does not.
        let answered = match field {
            FieldId::LeadName => state.lead_name().is_some(),
            _ => state.has(field),
        };
        if !answered {
            push_unasked(&mut candidates, state, field);
        }
    }

    candidates
}

fn push_unasked(candidates: &mut Vec<AskTopic>, state: &SessionState, field: FieldId) {
    if let Some(topic) = AskTopic::for_field(field) {
        if state.asked_count(topic) == 0 && !candidates.contains(&topic) {
            candidates.push(topic);
        }
    }
}
