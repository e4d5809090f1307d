pub mod executor;

/// Counts bad links per source url and http code, for one partition.
#[derive(new)]
pub struct BadLinkCountersTask {
    part_id: u32,
}

impl std::fmt::Display for BadLinkCountersTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make bad link counters of partition {}", self.part_id)
    }
}
