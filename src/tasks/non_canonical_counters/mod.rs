pub mod executor;

/// Counts the links to non-canonical urls of every source url, for one partition.
#[derive(new)]
pub struct NonCanonicalCountersTask {
    part_id: u32,
}

impl std::fmt::Display for NonCanonicalCountersTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make non-canonical link counters of partition {}", self.part_id)
    }
}
