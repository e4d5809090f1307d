use crate::tasks::LinkDirection;

pub mod executor;

/// Builds the per-url link documents of one partition.
#[derive(new)]
pub struct LinkDocumentsTask {
    part_id: u32,
    direction: LinkDirection,
}

impl std::fmt::Display for LinkDocumentsTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make {}links documents of partition {}", self.direction, self.part_id)
    }
}
