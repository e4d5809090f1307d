use crate::error::LrError;
use crate::streams::Keyed;
use linkrank_api::UrlId;

/// Fails the stream as soon as a key decreases. Streaming aggregators assume non-decreasing keys
/// and do not check them in their own loops.
pub struct OrderedStream<I> {
    dataset: &'static str,
    inner: I,
    previous: Option<UrlId>,
    failed: bool,
}

pub fn validate_order<T, I>(dataset: &'static str, inner: I) -> OrderedStream<I>
where
    T: Keyed,
    I: Iterator<Item = Result<T, LrError>>,
{
    OrderedStream { dataset, inner, previous: None, failed: false }
}

impl<T, I> Iterator for OrderedStream<I>
where
    T: Keyed,
    I: Iterator<Item = Result<T, LrError>>,
{
    type Item = Result<T, LrError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        if let Ok(record) = &item {
            let key = record.key();
            if let Some(previous) = self.previous {
                if key < previous {
                    self.failed = true;
                    return Some(Err(LrError::OutOfOrder(self.dataset, previous, key)));
                }
            }
            self.previous = Some(key);
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use crate::streams::datasets::BadLinkRecord;
    use crate::streams::validate::validate_order;

    #[test]
    fn rejects_decreasing_keys() {
        let records = vec![
            Ok(BadLinkRecord::new(1, 5, 404)),
            Ok(BadLinkRecord::new(1, 6, 404)),
            Ok(BadLinkRecord::new(0, 7, 500)),
            Ok(BadLinkRecord::new(3, 7, 500)),
        ];
        let results = validate_order("urlbadlinks", records.into_iter()).collect::<Vec<_>>();
        assert_eq!(results.len(), 3);
        assert!(results[..2].iter().all(Result::is_ok));
        let error = results[2].as_ref().expect_err("out of order");
        assert_eq!(
            error.to_string(),
            "[StreamError] Dataset 'urlbadlinks' is not sorted: id 0 found after id 1"
        );
    }
}
