//! Shuffled question order
//!
//! Every flag is asked once per pass; the order is reshuffled when a pass
//! runs out.

use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffled cycle over `0..len`
#[derive(Debug, Clone)]
pub struct Deck {
    order: Vec<usize>,
    pos: usize,
}

impl Deck {
    pub fn new(len: usize, rng: &mut impl Rng) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        Self { order, pos: 0 }
    }

    /// Next index, reshuffling first when the pass is exhausted
    pub fn draw(&mut self, rng: &mut impl Rng) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        if self.pos >= self.order.len() {
            self.order.shuffle(rng);
            self.pos = 0;
            log::debug!("Deck reshuffled ({} cards)", self.order.len());
        }
        let card = self.order[self.pos];
        self.pos += 1;
        Some(card)
    }
}
