//! Test fixtures and data factories

use super::service::UNKNOWN_FIELD;
use bulkforce::Record;

/// Factory for record collections
pub struct RecordFactory;

impl RecordFactory {
    /// A record with just a `Name`
    pub fn named(name: &str) -> Record {
        Record::new().with("Name", name)
    }

    /// A record carrying a field the service does not know
    pub fn invalid() -> Record {
        Record::new().with(UNKNOWN_FIELD, "MADEUPVALUE")
    }

    /// `n` valid records with distinct names
    pub fn collection(prefix: &str, n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| Self::named(&format!("{}{}", prefix, i)))
            .collect()
    }

    /// The 4/3/4 collections of the console sample, two invalid records in total
    pub fn sample() -> Vec<Vec<Record>> {
        vec![
            vec![
                Self::named("TestDtAccount1"),
                Self::named("TestDtAccount2"),
                Self::invalid(),
                Self::named("TestDtAccount3"),
            ],
            Self::collection("TestDtAccount", 3),
            vec![
                Self::invalid(),
                Self::named("TestDtAccount7"),
                Self::named("TestDtAccount8"),
                Self::named("TestDtAccount9"),
            ],
        ]
    }
}
