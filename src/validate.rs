//! Independent re-checks over a finished plan.
//!
//! The solver already enforces these rules while building, but the accepted
//! plan is re-checked from scratch and this result is authoritative: a plan
//! that fails here is discarded no matter what the solver believed.

use std::collections::HashMap;

use itertools::Itertools;
use thiserror::Error;

use crate::model::entity::{PersonId, Round, Roster, TableId};
use crate::model::plan::Plan;
use crate::model::table;

/// First rule breach found in a plan; carries the identifiers needed to
/// point at the offending table or pair.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("table {table} holds {seats} seats in {round} (capacity {capacity})")]
    Capacity {
        round: Round,
        table: TableId,
        seats: u32,
        capacity: u32,
    },
    #[error("person {person} never shares a table with MC {mc}")]
    McUnmet { person: PersonId, mc: PersonId },
}

/// Both checks must pass. Reports the first violation found; never repairs.
pub fn validate(roster: &Roster, plan: &Plan) -> Result<(), Violation> {
    check_capacities(roster, plan)?;
    check_mc_meetings(roster, plan)
}

fn check_capacities(roster: &Roster, plan: &Plan) -> Result<(), Violation> {
    for (round, seating) in plan.rounds() {
        let mut loads: HashMap<TableId, u32> = HashMap::new();
        for (person, table) in seating.iter() {
            *loads.entry(table).or_insert(0) += roster.household(person);
        }
        for (&table, &seats) in loads.iter().sorted() {
            let capacity = table::capacity(table);
            if seats > capacity {
                return Err(Violation::Capacity {
                    round,
                    table,
                    seats,
                    capacity,
                });
            }
        }
    }
    Ok(())
}

fn check_mc_meetings(roster: &Roster, plan: &Plan) -> Result<(), Violation> {
    for person in roster.people() {
        if let Some(mc) = person.mc {
            let met = plan.rounds().any(|(_, seating)| {
                match (seating.table_of(person.id), seating.table_of(mc)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            });
            if !met {
                return Err(Violation::McUnmet {
                    person: person.id,
                    mc,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::entity::Person;
    use crate::model::plan::Seating;

    fn plan_of(rounds: [Seating; 3]) -> Plan {
        let map: BTreeMap<_, _> = Round::ALL.into_iter().zip(rounds).collect();
        Plan::from_rounds(map).expect("all rounds present")
    }

    fn seated(pairs: &[(PersonId, TableId)]) -> Seating {
        let mut seating = Seating::new();
        for &(person, table) in pairs {
            seating.assign(person, table);
        }
        seating
    }

    #[test]
    fn test_accepts_a_well_formed_plan() {
        let mut person = Person::new(1, 1);
        person.mc = Some(2);
        let roster = Roster::new(vec![person, Person::new(2, 1)]);
        let plan = plan_of([
            seated(&[(1, 1), (2, 1)]),
            seated(&[(1, 2), (2, 3)]),
            seated(&[(1, 4), (2, 5)]),
        ]);
        assert_eq!(validate(&roster, &plan), Ok(()));
    }

    #[test]
    fn test_rejects_capacity_overflow() {
        // Nine singles at table 5, which seats eight.
        let roster = Roster::new((1..=9).map(|id| Person::new(id, 1)).collect());
        let overfull = seated(&(1..=9).map(|id| (id, 5)).collect::<Vec<_>>());
        let plan = plan_of([overfull, Seating::new(), Seating::new()]);
        assert_eq!(
            validate(&roster, &plan),
            Err(Violation::Capacity {
                round: Round::One,
                table: 5,
                seats: 9,
                capacity: 8,
            })
        );
    }

    #[test]
    fn test_capacity_counts_households_not_rows() {
        let roster = Roster::new(vec![Person::new(1, 6), Person::new(2, 5)]);
        let plan = plan_of([seated(&[(1, 1), (2, 1)]), Seating::new(), Seating::new()]);
        // Two rows, eleven seats, table 1 holds ten.
        assert!(matches!(
            validate(&roster, &plan),
            Err(Violation::Capacity { table: 1, seats: 11, .. })
        ));
    }

    #[test]
    fn test_rejects_unmet_mc() {
        let mut person = Person::new(1, 1);
        person.mc = Some(2);
        let roster = Roster::new(vec![person, Person::new(2, 1)]);
        // 1 and 2 never share a table in any of the three rounds.
        let plan = plan_of([
            seated(&[(1, 1), (2, 2)]),
            seated(&[(1, 3), (2, 4)]),
            seated(&[(1, 5), (2, 6)]),
        ]);
        assert_eq!(
            validate(&roster, &plan),
            Err(Violation::McUnmet { person: 1, mc: 2 })
        );
    }

    #[test]
    fn test_mc_met_in_fixed_round_counts() {
        let mut person = Person::new(1, 1);
        person.mc = Some(2);
        let roster = Roster::new(vec![person, Person::new(2, 1)]);
        let plan = plan_of([
            seated(&[(1, 1), (2, 2)]),
            seated(&[(1, 3), (2, 4)]),
            seated(&[(1, 6), (2, 6)]),
        ]);
        assert_eq!(validate(&roster, &plan), Ok(()));
    }

    #[test]
    fn test_validator_is_idempotent() {
        let mut person = Person::new(1, 1);
        person.mc = Some(2);
        let roster = Roster::new(vec![person, Person::new(2, 1)]);
        let plan = plan_of([
            seated(&[(1, 1), (2, 2)]),
            seated(&[(1, 3), (2, 4)]),
            seated(&[(1, 5), (2, 6)]),
        ]);
        assert_eq!(validate(&roster, &plan), validate(&roster, &plan));
    }
}
