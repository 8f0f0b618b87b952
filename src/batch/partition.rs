//! Identifier partitioning.

/// Split `items` into consecutive batches of at most `max_batch_size`.
///
/// Order is preserved and every item lands in exactly one batch; only the
/// last batch may be shorter. Returns `None` when `max_batch_size` is zero.
pub fn partition<T>(items: Vec<T>, max_batch_size: usize) -> Option<Vec<Vec<T>>> {
    if max_batch_size == 0 {
        return None;
    }
    let mut batches = Vec::with_capacity(batch_count(items.len(), max_batch_size));
    let mut iter = items.into_iter();
    loop {
        let batch: Vec<T> = iter.by_ref().take(max_batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    Some(batches)
}

/// Number of batches `partition` produces for `len` items.
pub fn batch_count(len: usize, max_batch_size: usize) -> usize {
    if max_batch_size == 0 {
        0
    } else {
        len.div_ceil(max_batch_size)
    }
}
