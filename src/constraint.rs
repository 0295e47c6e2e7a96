//! Feasibility and scoring of a single candidate (person, table) placement.

use std::collections::BTreeMap;

use crate::model::entity::{PersonId, Round, Roster, TableId};
use crate::model::plan::Seating;
use crate::model::table;

/// Dominates any other scoring factor, so an unmet MC match always wins.
pub const MC_BONUS: i64 = 1000;

/// Whether `person` can be added to `table` in the round being solved.
///
/// Two checks: the table must have room for the person's whole household,
/// and nobody already seated there may have shared a table with the person
/// in another finalized round. Rounds are finalized out of order (round
/// three before rounds one and two), so "another round" means both earlier
/// and later ones.
pub fn is_feasible(
    roster: &Roster,
    person: PersonId,
    table: TableId,
    round: Round,
    finalized: &BTreeMap<Round, Seating>,
    current: &Seating,
) -> bool {
    let household = roster.household(person);
    if current.occupancy(table, roster) + household > table::capacity(table) {
        return false;
    }

    let occupants = current.occupants(table);
    for (&other_round, seating) in finalized {
        if other_round == round {
            continue;
        }
        if let Some(previous_table) = seating.table_of(person) {
            let previous_mates = seating.occupants(previous_table);
            if previous_mates.iter().any(|mate| occupants.contains(mate)) {
                return false;
            }
        }
    }

    true
}

/// Ranks `table` for `person`. Base score zero, plus [`MC_BONUS`] when the
/// person still has to meet their MC and the MC already sits at `table` in
/// the round being solved. Ties are broken by the caller with a random draw.
pub fn score(
    roster: &Roster,
    person: PersonId,
    table: TableId,
    finalized: &BTreeMap<Round, Seating>,
    current: &Seating,
) -> i64 {
    let mut score = 0;

    if let Some(mc) = roster.get(person).and_then(|p| p.mc) {
        if !has_met_mc(person, mc, finalized, current) && current.table_of(mc) == Some(table) {
            score += MC_BONUS;
        }
    }

    score
}

/// Whether `person` and `mc` already share a table in any finalized round or
/// in the round currently being filled.
pub fn has_met_mc(
    person: PersonId,
    mc: PersonId,
    finalized: &BTreeMap<Round, Seating>,
    current: &Seating,
) -> bool {
    let together = |seating: &Seating| match (seating.table_of(person), seating.table_of(mc)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    together(current) || finalized.values().any(together)
}
