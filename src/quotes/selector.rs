use std::collections::HashSet;

use log::{debug, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::quotes::{Quote, default_quotes};
use crate::store::QuoteSource;

/// Picks the next quote to type. With a script scope, every quote in the
/// script is shown once before any repeats (a rotation).
pub struct QuoteSelector {
    scope: Option<String>,
    processed: HashSet<String>,
    fallback: Vec<Quote>,
    rng: SmallRng,
}

impl QuoteSelector {
    pub fn new(scope: Option<String>) -> Self {
        Self::with_rng(scope, SmallRng::from_entropy())
    }

    pub fn with_rng(scope: Option<String>, rng: SmallRng) -> Self {
        Self {
            scope,
            processed: HashSet::new(),
            fallback: default_quotes(),
            rng,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Switching scope starts a fresh rotation.
    pub fn set_scope(&mut self, scope: Option<String>) {
        if self.scope != scope {
            self.scope = scope;
            self.processed.clear();
        }
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn load_next(&mut self, source: &dyn QuoteSource) -> Quote {
        let Some(scope) = self.scope.clone() else {
            return self.pick_fallback();
        };

        let pool = match source.list_quotes(Some(&scope)) {
            Ok(pool) => pool,
            Err(e) => {
                warn!("quote source failed for script {scope}: {e}; using default quotes");
                return self.pick_fallback();
            }
        };
        if pool.is_empty() {
            warn!("script {scope} has no quotes; using default quotes");
            return self.pick_fallback();
        }

        let unprocessed: Vec<&Quote> = pool
            .iter()
            .filter(|q| !self.processed.contains(&q.id))
            .collect();

        let quote = if unprocessed.is_empty() {
            debug!("rotation for script {scope} exhausted, starting over");
            self.processed.clear();
            pool[self.rng.gen_range(0..pool.len())].clone()
        } else {
            unprocessed[self.rng.gen_range(0..unprocessed.len())].clone()
        };

        self.processed.insert(quote.id.clone());
        quote
    }

    fn pick_fallback(&mut self) -> Quote {
        self.fallback[self.rng.gen_range(0..self.fallback.len())].clone()
    }
}
