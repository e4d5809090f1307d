use crate::error::LrError;
use crate::streams::Keyed;
use itertools::Itertools;
use linkrank_api::{Counter, Observer, UrlId};
use std::iter::Peekable;

/// Sample-list caps of the documents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, new)]
pub struct SampleCaps {
    pub links: usize,
    pub error_links: usize,
}

impl Default for SampleCaps {
    fn default() -> Self {
        SampleCaps { links: 300, error_links: 10 }
    }
}

/// Folds all edges sharing a key into one output value.
///
/// `open` is called with the first edge's key, `process` for every edge of that key in stream
/// order, and `finalize` once the key is exhausted. An accumulator only lives while its key is
/// being consumed.
pub trait LinkTransducer {
    type Edge: Keyed;
    type Accumulator;
    type Document;

    fn open(&self, key: UrlId) -> Self::Accumulator;

    fn process(
        &self,
        accumulator: &mut Self::Accumulator,
        edge: Self::Edge,
        observer: &dyn Observer,
    );

    fn finalize(&self, accumulator: Self::Accumulator) -> Self::Document;

    /// Groups a key-sorted edge stream and yields one `(key, document)` pair per key.
    fn documents<'a, I>(self, edges: I, observer: &'a dyn Observer) -> DocumentStream<'a, Self, I>
    where
        Self: Sized,
        I: Iterator<Item = Result<Self::Edge, LrError>>,
    {
        DocumentStream { transducer: self, edges: edges.peekable(), observer }
    }
}

pub struct DocumentStream<'a, T, I: Iterator> {
    transducer: T,
    edges: Peekable<I>,
    observer: &'a dyn Observer,
}

impl<'a, T, I> Iterator for DocumentStream<'a, T, I>
where
    T: LinkTransducer,
    I: Iterator<Item = Result<T::Edge, LrError>>,
{
    type Item = Result<(UrlId, T::Document), LrError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.edges.next()? {
            Ok(edge) => edge,
            Err(e) => return Some(Err(e)),
        };
        let key = first.key();
        let mut accumulator = self.transducer.open(key);
        self.transducer.process(&mut accumulator, first, self.observer);
        let mut consumed = 1;
        loop {
            // A pending error is returned by the next call.
            let same_key = matches!(self.edges.peek(), Some(Ok(edge)) if edge.key() == key);
            if !same_key {
                break;
            }
            if let Some(Ok(edge)) = self.edges.next() {
                self.transducer.process(&mut accumulator, edge, self.observer);
                consumed += 1;
            }
        }
        self.observer.on_counter(Counter::RecordsConsumed, consumed);
        self.observer.on_counter(Counter::DocumentsEmitted, 1);
        Some(Ok((key, self.transducer.finalize(accumulator))))
    }
}

/// Merges two key-sorted streams into one key-sorted stream. Errors are passed through first.
pub fn merge_by_key<T, A, B>(left: A, right: B) -> impl Iterator<Item = Result<T, LrError>>
where
    T: Keyed,
    A: Iterator<Item = Result<T, LrError>>,
    B: Iterator<Item = Result<T, LrError>>,
{
    left.merge_by(right, |a, b| match (a, b) {
        (Ok(a), Ok(b)) => a.key() <= b.key(),
        (Err(_), _) => true,
        (Ok(_), Err(_)) => false,
    })
}

#[cfg(test)]
mod tests {
    use crate::error::LrError;
    use crate::links::transducer::{merge_by_key, LinkTransducer};
    use crate::streams::Keyed;
    use linkrank_api::{Counter, CountingObserver, Observer, UrlId};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Pair(UrlId, u32);

    impl Keyed for Pair {
        fn key(&self) -> UrlId {
            self.0
        }
    }

    struct Sum;

    impl LinkTransducer for Sum {
        type Edge = Pair;
        type Accumulator = u32;
        type Document = u32;

        fn open(&self, _key: UrlId) -> u32 {
            0
        }

        fn process(&self, accumulator: &mut u32, edge: Pair, _observer: &dyn Observer) {
            *accumulator += edge.1;
        }

        fn finalize(&self, accumulator: u32) -> u32 {
            accumulator
        }
    }

    #[test]
    fn groups_consecutive_keys() {
        let observer = CountingObserver::default();
        let edges = vec![Pair(1, 1), Pair(1, 2), Pair(4, 5), Pair(7, 1), Pair(7, 1)];
        let documents = Sum
            .documents(edges.into_iter().map(Ok), &observer)
            .collect::<Result<Vec<_>, _>>()
            .expect("documents");
        assert_eq!(documents, vec![(1, 3), (4, 5), (7, 2)]);
        assert_eq!(observer.counter(Counter::RecordsConsumed), 5);
        assert_eq!(observer.counter(Counter::DocumentsEmitted), 3);
    }

    #[test]
    fn errors_end_the_current_key() {
        let observer = CountingObserver::default();
        let edges = vec![Ok(Pair(1, 1)), Err(LrError::Generic("bad".to_owned())), Ok(Pair(1, 2))];
        let documents = Sum.documents(edges.into_iter(), &observer).collect::<Vec<_>>();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].as_ref().expect("first"), &(1, 1));
        assert!(documents[1].is_err());
    }

    #[test]
    fn merges_sorted_streams() {
        let left = vec![Pair(1, 0), Pair(3, 0), Pair(3, 1)].into_iter().map(Ok);
        let right = vec![Pair(0, 9), Pair(3, 9), Pair(5, 9)].into_iter().map(Ok);
        let merged = merge_by_key(left, right).collect::<Result<Vec<_>, _>>().expect("merged");
        assert_eq!(
            merged,
            vec![Pair(0, 9), Pair(1, 0), Pair(3, 0), Pair(3, 1), Pair(3, 9), Pair(5, 9)]
        );
    }
}
