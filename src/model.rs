pub mod entity {
    use std::collections::HashMap;
    use std::fmt;

    pub type PersonId = u32;
    pub type TableId = u32;

    /// The three seating sessions of the evening. Round three arrives fully
    /// assigned in the input data; rounds one and two are solved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Round {
        One,
        Two,
        Three,
    }

    impl Round {
        pub const ALL: [Round; 3] = [Round::One, Round::Two, Round::Three];
        /// Rounds the solver fills, in the order they are solved.
        pub const SOLVED: [Round; 2] = [Round::One, Round::Two];
        /// The round whose seating is taken verbatim from the input.
        pub const FIXED: Round = Round::Three;

        pub fn index(self) -> usize {
            match self {
                Round::One => 0,
                Round::Two => 1,
                Round::Three => 2,
            }
        }

        pub fn number(self) -> u8 {
            self.index() as u8 + 1
        }
    }

    impl fmt::Display for Round {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "round {}", self.number())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Person {
        pub id: PersonId,
        /// Household size (`aantal`): how many seats this record takes.
        pub household: u32,
        /// Mentor/contact who must share a table with this person at least once.
        pub mc: Option<PersonId>,
        fixed: [Option<TableId>; 3],
    }

    impl Person {
        pub fn new(id: PersonId, household: u32) -> Person {
            Person {
                id,
                household,
                mc: None,
                fixed: [None; 3],
            }
        }

        /// Pre-fixed table for `round`, if the input pinned one.
        pub fn fixed_table(&self, round: Round) -> Option<TableId> {
            self.fixed[round.index()]
        }

        pub fn fix_table(&mut self, round: Round, table: TableId) {
            self.fixed[round.index()] = Some(table);
        }
    }

    /// All person records, kept in input order. Input order is the tie-break
    /// when the solver sorts people of equal household size.
    #[derive(Debug, Clone)]
    pub struct Roster {
        people: Vec<Person>,
        by_id: HashMap<PersonId, usize>,
    }

    impl Roster {
        /// Ids are expected to be unique; the CSV loader rejects duplicates
        /// before a roster is ever built.
        pub fn new(people: Vec<Person>) -> Roster {
            let by_id = people
                .iter()
                .enumerate()
                .map(|(index, person)| (person.id, index))
                .collect();
            Roster { people, by_id }
        }

        pub fn people(&self) -> &[Person] {
            &self.people
        }

        pub fn get(&self, id: PersonId) -> Option<&Person> {
            self.by_id.get(&id).map(|&index| &self.people[index])
        }

        /// Seats taken by `id`; zero for an unknown person.
        pub fn household(&self, id: PersonId) -> u32 {
            self.get(id).map_or(0, |person| person.household)
        }

        pub fn len(&self) -> usize {
            self.people.len()
        }

        pub fn is_empty(&self) -> bool {
            self.people.is_empty()
        }
    }
}

pub mod table {
    use super::entity::TableId;

    /// Fixed venue layout: tables 1-4 seat 10, tables 5-10 seat 8.
    pub const TABLE_COUNT: u32 = 10;

    pub fn all() -> impl Iterator<Item = TableId> {
        1..=TABLE_COUNT
    }

    /// Seats at `table`; zero for a table that is not part of the venue,
    /// which makes every placement there infeasible.
    pub fn capacity(table: TableId) -> u32 {
        match table {
            1..=4 => 10,
            5..=10 => 8,
            _ => 0,
        }
    }
}

pub mod plan {
    use std::collections::{BTreeMap, HashMap, HashSet};

    use super::entity::{PersonId, Round, Roster, TableId};

    /// One round's person -> table mapping. Built up incrementally while the
    /// round is being solved, immutable once the round is finalized.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Seating(HashMap<PersonId, TableId>);

    impl Seating {
        pub fn new() -> Seating {
            Seating(HashMap::new())
        }

        pub fn assign(&mut self, person: PersonId, table: TableId) {
            self.0.insert(person, table);
        }

        pub fn table_of(&self, person: PersonId) -> Option<TableId> {
            self.0.get(&person).copied()
        }

        pub fn occupants(&self, table: TableId) -> HashSet<PersonId> {
            self.0
                .iter()
                .filter(|(_, &t)| t == table)
                .map(|(&person, _)| person)
                .collect()
        }

        /// Seats in use at `table`, counting household sizes.
        pub fn occupancy(&self, table: TableId, roster: &Roster) -> u32 {
            self.0
                .iter()
                .filter(|(_, &t)| t == table)
                .map(|(&person, _)| roster.household(person))
                .sum()
        }

        pub fn iter(&self) -> impl Iterator<Item = (PersonId, TableId)> + '_ {
            self.0.iter().map(|(&person, &table)| (person, table))
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    /// The completed plan: a finalized seating for every round.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Plan {
        rounds: [Seating; 3],
    }

    impl Plan {
        /// None unless every round is present.
        pub fn from_rounds(mut rounds: BTreeMap<Round, Seating>) -> Option<Plan> {
            let one = rounds.remove(&Round::One)?;
            let two = rounds.remove(&Round::Two)?;
            let three = rounds.remove(&Round::Three)?;
            Some(Plan {
                rounds: [one, two, three],
            })
        }

        pub fn round(&self, round: Round) -> &Seating {
            &self.rounds[round.index()]
        }

        pub fn rounds(&self) -> impl Iterator<Item = (Round, &Seating)> {
            Round::ALL.into_iter().zip(self.rounds.iter())
        }
    }
}
