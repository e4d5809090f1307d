//! Most linked external domains, by full host and by second level domain.

use crate::error::LrError;
use crate::links::edge::{EdgeKind, OutgoingEdge};
use hashbrown::{HashMap, HashSet};
use linkrank_api::{UrlClassifier, UrlId};
use url::{Host, Url};

/// Number of sample urls kept per domain.
pub const NB_SAMPLE_URLS: usize = 10;

/// An external url of a domain with the first crawled url seen linking to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct SampleLink {
    pub url: String,
    pub source_id: UrlId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainLinkStats {
    pub domain: String,
    pub nb_links: u64,
    /// Number of distinct `(source, url)` pairs.
    pub unique_links: u64,
    pub sample_links: Vec<SampleLink>,
}

#[derive(Default)]
struct DomainAccumulator {
    nb_links: u64,
    links: HashSet<(UrlId, String)>,
    sample_links: Vec<SampleLink>,
}

impl DomainAccumulator {
    fn add(&mut self, source: UrlId, url: &str) {
        self.nb_links += 1;
        if self.sample_links.len() < NB_SAMPLE_URLS
            && !self.sample_links.iter().any(|sample| sample.url == url)
        {
            self.sample_links.push(SampleLink::new(url.to_owned(), source));
        }
        self.links.insert((source, url.to_owned()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopDomains {
    pub full_domains: Vec<DomainLinkStats>,
    pub second_level_domains: Vec<DomainLinkStats>,
}

/// The last two labels of a host name. Ip addresses are kept whole.
pub fn second_level_domain(host: &Host<&str>) -> String {
    match host {
        Host::Domain(domain) => {
            let labels = domain.trim_end_matches('.').rsplitn(3, '.').collect::<Vec<_>>();
            labels.iter().take(2).rev().copied().collect::<Vec<_>>().join(".")
        }
        Host::Ipv4(address) => address.to_string(),
        Host::Ipv6(address) => address.to_string(),
    }
}

/// Aggregates followed external anchors and keeps the `nb_top_domains` domains with the most
/// unique links, ties broken by name.
pub fn compute_top_domains<C, I>(
    edges: I,
    classifier: &C,
    nb_top_domains: usize,
) -> Result<TopDomains, LrError>
where
    C: UrlClassifier,
    I: Iterator<Item = Result<OutgoingEdge, LrError>>,
{
    let mut full_domains: HashMap<String, DomainAccumulator> = HashMap::new();
    let mut second_level_domains: HashMap<String, DomainAccumulator> = HashMap::new();
    for edge in edges {
        let edge = edge?;
        let dispositions = edge.dispositions();
        if edge.kind != EdgeKind::Anchor
            || !dispositions.is_follow()
            || classifier.is_internal(edge.destination, dispositions.blocked_by_policy())
        {
            continue;
        }
        let url = match edge.external_url.as_deref() {
            Some(url) => url,
            None => continue,
        };
        // Unparsable destinations are not counted.
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };
        let host = match parsed.host() {
            Some(host) => host,
            None => continue,
        };
        full_domains.entry(host.to_string()).or_default().add(edge.source, url);
        second_level_domains.entry(second_level_domain(&host)).or_default().add(edge.source, url);
    }
    Ok(TopDomains {
        full_domains: top(full_domains, nb_top_domains),
        second_level_domains: top(second_level_domains, nb_top_domains),
    })
}

fn top(domains: HashMap<String, DomainAccumulator>, nb_top_domains: usize) -> Vec<DomainLinkStats> {
    let mut stats = domains
        .into_iter()
        .map(|(domain, accumulator)| DomainLinkStats {
            domain,
            nb_links: accumulator.nb_links,
            unique_links: accumulator.links.len() as u64,
            sample_links: accumulator.sample_links,
        })
        .collect::<Vec<_>>();
    stats.sort_by(|a, b| b.unique_links.cmp(&a.unique_links).then_with(|| a.domain.cmp(&b.domain)));
    stats.truncate(nb_top_domains);
    stats
}
