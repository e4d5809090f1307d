use crate::error::LrError;
use crate::streams::datasets::InfoRecord;
use crate::util::id_generator::IdGenerator;
use hashbrown::{HashMap, HashSet};
use linkrank_api::{Counter, NodeId, Observer, UrlId};

/// Http code of urls that were discovered but never fetched.
pub const NOT_FETCHED: u16 = 0;

/// Bijection between sparse url ids and dense node ids `0..N`.
#[derive(Debug, Default, Clone)]
pub struct NodeMapping {
    to_internal: HashMap<UrlId, NodeId>,
    to_external: Vec<UrlId>,
    generator: IdGenerator,
}

impl NodeMapping {
    /// Maps `external` to the next free node id, unless it is already mapped.
    pub fn add(&mut self, external: UrlId) -> Result<NodeId, LrError> {
        if let Some(internal) = self.to_internal.get(&external) {
            return Ok(*internal);
        }
        let internal = self.generator.next_id()?;
        self.to_internal.insert(external, internal);
        self.to_external.push(external);
        Ok(internal)
    }

    pub fn get_internal_id(&self, external: UrlId) -> Option<NodeId> {
        self.to_internal.get(&external).copied()
    }

    pub fn get_external_id(&self, internal: NodeId) -> Option<UrlId> {
        self.to_external.get(internal as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.to_external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_external.is_empty()
    }

    /// External ids in node id order.
    pub fn external_ids(&self) -> &[UrlId] {
        &self.to_external
    }
}

/// Result of the mapping scan over `urlinfos`.
#[derive(Debug, Default)]
pub struct MappingScan {
    pub mapping: NodeMapping,
    /// Mapped ids whose url was never fetched.
    pub extra_non_crawled: HashSet<UrlId>,
}

/// Maps every url id up to `max_crawled_id` in one forward pass over an id-ascending info stream.
/// The scan stops at the first id past the bound; later records are never read.
pub fn build_node_mapping<I>(
    infos: I,
    max_crawled_id: UrlId,
    observer: &dyn Observer,
) -> Result<MappingScan, LrError>
where
    I: Iterator<Item = Result<InfoRecord, LrError>>,
{
    let mut scan = MappingScan::default();
    for info in infos {
        let info = info?;
        if info.id > max_crawled_id {
            break;
        }
        scan.mapping.add(info.id)?;
        if info.http_code == NOT_FETCHED {
            scan.extra_non_crawled.insert(info.id);
        }
    }
    observer.on_counter(Counter::NodesMapped, scan.mapping.len() as u64);
    observer.on_counter(Counter::ExtraNonCrawled, scan.extra_non_crawled.len() as u64);
    Ok(scan)
}
