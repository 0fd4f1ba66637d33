//! Order-preserving batch partitioning

use crate::error::{CoreError, Result};

/// Split `items` into consecutive chunks of at most `batch_size`.
///
/// Order is preserved and the final chunk may be short. Index `i` inside
/// chunk `b` maps back to global index `b * batch_size + i`, which is how
/// provider responses are correlated to their documents.
pub fn partition<T>(items: Vec<T>, batch_size: usize) -> Result<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(CoreError::InvalidBatchSize(0));
    }
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size.min(items.len()));
    for item in items {
        if current.len() == batch_size {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(batch_size)));
        }
        current.push(item);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_documents_in_batches_of_25() {
        let batches = partition((0..60).collect(), 25).unwrap();

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![25, 25, 10]);
    }

    #[test]
    fn test_order_is_preserved() {
        let items: Vec<u32> = (0..60).collect();
        let batches = partition(items.clone(), 25).unwrap();

        let rejoined: Vec<u32> = batches.into_iter().flatten().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_batch_local_index_correlation() {
        let batches = partition((0..60).collect::<Vec<u32>>(), 25).unwrap();

        // third batch, first slot holds global document 50
        assert_eq!(batches[2][0], 50);
    }

    #[test]
    fn test_zero_batch_size() {
        assert!(matches!(
            partition(vec![1, 2, 3], 0),
            Err(CoreError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_empty_input() {
        let batches = partition(Vec::<u32>::new(), 25).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        let batches = partition((0..50).collect::<Vec<u32>>(), 25).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].len(), 25);
    }
}
