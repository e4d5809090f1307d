use crate::tasks::LinkDirection;

pub mod executor;

/// Builds the link, redirect and canonical counters of one partition.
#[derive(new)]
pub struct LinkCountersTask {
    part_id: u32,
    direction: LinkDirection,
}

impl std::fmt::Display for LinkCountersTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make {}links counters of partition {}", self.direction, self.part_id)
    }
}
