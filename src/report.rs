//! Console rendering of per-table occupancy, for the organizers to eyeball.

use itertools::Itertools;

use crate::model::entity::{Round, Roster};
use crate::model::plan::Plan;
use crate::model::table;

/// One round's table-by-table summary: seats used against capacity, then
/// the occupants in id order with their household sizes.
pub fn render(roster: &Roster, plan: &Plan, round: Round) -> String {
    let seating = plan.round(round);
    let mut out = String::new();

    out.push_str(&format!("Ronde {}:\n", round.number()));
    for table in table::all() {
        let occupants = seating.occupants(table).into_iter().sorted().collect_vec();
        let used: u32 = occupants.iter().map(|&person| roster.household(person)).sum();
        out.push_str(&format!(
            "Tafel {} ({}/{} personen):\n",
            table,
            used,
            table::capacity(table)
        ));
        for person in occupants {
            out.push_str(&format!(
                "  - Persoon {} ({} personen)\n",
                person,
                roster.household(person)
            ));
        }
    }

    out
}
