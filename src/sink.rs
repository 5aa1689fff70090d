//! Batch destinations and the per-batch callback contract.

/// A typed destination for one fetched batch: anything that can take
/// ownership of the batch's rows and report how many elements it received.
/// The reported count drives the fetch loop's termination.
pub trait Destination<T> {
    /// Replace the previous contents with one fetched batch.
    fn fill(&mut self, rows: Vec<T>);

    /// Number of elements populated by the last [`fill`](Destination::fill).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Destination<T> for Vec<T> {
    fn fill(&mut self, rows: Vec<T>) {
        *self = rows;
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// A destination that drops every batch and always reports zero elements.
///
/// A zero count participates in loop termination exactly like a true empty
/// result, so a stream into `Discard` delivers at most one (empty) batch
/// notification and then stops.
#[derive(Debug, Default)]
pub struct Discard;

impl<T> Destination<T> for Discard {
    fn fill(&mut self, rows: Vec<T>) {
        drop(rows);
    }

    fn len(&self) -> usize {
        0
    }
}

/// The per-batch callback contract.
///
/// Each loop iteration the engine calls [`dest`](BatchHandler::dest) to obtain
/// the destination for the next batch, fetches into it, and then calls
/// [`batch_ready`](BatchHandler::batch_ready) once the batch is safely in the
/// caller's hands. `batch_ready` is *not* called for the empty trailing fetch
/// that ends a stream whose row count is an exact multiple of the batch size.
pub trait BatchHandler<T> {
    type Dest: Destination<T>;

    /// Supply the destination container for the next batch.
    fn dest(&mut self) -> &mut Self::Dest;

    /// Completion notifier: the batch in the destination is ready to use.
    fn batch_ready(&mut self);
}

/// Adapter that owns a reusable buffer and invokes a closure per batch.
pub struct EachBatch<T, F> {
    buf: Vec<T>,
    each: F,
}

impl<T, F> EachBatch<T, F>
where
    F: FnMut(&mut Vec<T>),
{
    pub fn new(each: F) -> Self {
        Self {
            buf: Vec::new(),
            each,
        }
    }
}

impl<T, F> BatchHandler<T> for EachBatch<T, F>
where
    F: FnMut(&mut Vec<T>),
{
    type Dest = Vec<T>;

    fn dest(&mut self) -> &mut Vec<T> {
        &mut self.buf
    }

    fn batch_ready(&mut self) {
        (self.each)(&mut self.buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vec_fill_replaces_previous_batch() {
        let mut dest = vec![1, 2, 3];
        Destination::fill(&mut dest, vec![9, 8]);
        assert_eq!(dest, vec![9, 8]);
        assert_eq!(Destination::<i32>::len(&dest), 2);
    }

    #[test]
    fn discard_reports_zero() {
        let mut dest = Discard;
        Destination::fill(&mut dest, vec![1, 2, 3]);
        assert_eq!(Destination::<i32>::len(&dest), 0);
        assert!(Destination::<i32>::is_empty(&dest));
    }

    #[test]
    fn each_batch_forwards_filled_buffer() {
        let mut seen = Vec::new();
        {
            let mut handler = EachBatch::new(|batch: &mut Vec<i32>| {
                seen.push(batch.clone());
            });
            handler.dest().fill(vec![1, 2]);
            handler.batch_ready();
            handler.dest().fill(vec![3]);
            handler.batch_ready();
        }
        assert_eq!(seen, vec![vec![1, 2], vec![3]]);
    }
}
