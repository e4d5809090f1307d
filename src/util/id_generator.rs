use crate::error::LrError;
use linkrank_api::NodeId;

/// Hands out dense node ids in allocation order.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    next: NodeId,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> Result<NodeId, LrError> {
        let next = self.next;
        self.next = self
            .next
            .checked_add(1)
            .ok_or_else(|| LrError::Generic("Ran out of node ids".to_owned()))?;
        Ok(next)
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> NodeId {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use crate::util::id_generator::IdGenerator;

    #[test]
    fn dense_ids() {
        let mut generator = IdGenerator::default();
        assert_eq!(generator.next_id().expect("id"), 0);
        assert_eq!(generator.next_id().expect("id"), 1);
        assert_eq!(generator.allocated(), 2);
    }
}
