//! Groups an ordered stream of bets into bounded batches.

use std::iter::Peekable;

use lottery_core::{Batch, Bet};

/// Iterator adapter producing [`Batch`]es of at most `max_size` bets.
///
/// A batch is flushed when it reaches the bound or when the source
/// runs out; the batch that exhausts the source is marked `last`.
/// K records at bound B yield exactly `ceil(K/B)` batches, and an
/// empty source yields none.
pub struct BatchAssembler<I: Iterator<Item = Bet>> {
    source: Peekable<I>,
    max_size: usize,
}

impl<I: Iterator<Item = Bet>> BatchAssembler<I> {
    /// `max_size` must be positive; config validation enforces that
    /// before a session starts.
    pub fn new(source: I, max_size: usize) -> Self {
        debug_assert!(max_size > 0);
        Self {
            source: source.peekable(),
            max_size,
        }
    }
}

impl<I: Iterator<Item = Bet>> Iterator for BatchAssembler<I> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        self.source.peek()?;

        let mut bets = Vec::with_capacity(self.max_size);
        while bets.len() < self.max_size {
            match self.source.next() {
                Some(bet) => bets.push(bet),
                None => break,
            }
        }

        let last = self.source.peek().is_none();
        Some(Batch { bets, last })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bets(n: usize) -> impl Iterator<Item = Bet> {
        (0..n).map(|i| Bet {
            agency_id: "1".to_string(),
            first_name: format!("Name{}", i),
            last_name: "Surname".to_string(),
            document: format!("{}", 30_000_000 + i),
            birth_date: "1990-01-01".to_string(),
            number: format!("{}", i),
        })
    }

    #[test]
    fn produces_ceil_k_over_b_batches() {
        let batches: Vec<Batch> = BatchAssembler::new(bets(5), 2).collect();

        let sizes: Vec<usize> = batches.iter().map(|b| b.bets.len()).collect();
        assert_eq!(sizes, [2, 2, 1]);
    }

    #[test]
    fn only_the_final_batch_is_marked_last() {
        let batches: Vec<Batch> = BatchAssembler::new(bets(5), 2).collect();

        let flags: Vec<bool> = batches.iter().map(|b| b.last).collect();
        assert_eq!(flags, [false, false, true]);
    }

    #[test]
    fn exact_multiple_still_marks_the_final_batch() {
        let batches: Vec<Batch> = BatchAssembler::new(bets(4), 2).collect();

        assert_eq!(batches.len(), 2);
        assert!(!batches[0].last);
        assert!(batches[1].last);
    }

    #[test]
    fn single_short_batch_is_last() {
        let batches: Vec<Batch> = BatchAssembler::new(bets(1), 10).collect();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].bets.len(), 1);
        assert!(batches[0].last);
    }

    #[test]
    fn empty_source_yields_no_batches() {
        let batches: Vec<Batch> = BatchAssembler::new(bets(0), 2).collect();
        assert!(batches.is_empty());
    }

    #[test]
    fn preserves_record_order() {
        let batches: Vec<Batch> = BatchAssembler::new(bets(3), 2).collect();

        assert_eq!(batches[0].bets[0].first_name, "Name0");
        assert_eq!(batches[0].bets[1].first_name, "Name1");
        assert_eq!(batches[1].bets[0].first_name, "Name2");
    }
}
