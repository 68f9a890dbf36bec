/// Endpoint selection policies
use crate::{
    error::{ResolverError, ResolverResult},
    federation::Selection,
    identity::Endpoint,
};
use rand::seq::index;

/// Queries every discovered endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSelection;

impl Selection for StaticSelection {
    fn select_endpoints(&self, endpoints: Vec<Endpoint>) -> ResolverResult<Vec<Endpoint>> {
        Ok(endpoints)
    }
}

/// Queries a uniformly sampled subset of `count` endpoints
///
/// Sampled endpoints keep their discovery order.
#[derive(Debug, Clone, Copy)]
pub struct RandomSelection {
    count: usize,
}

impl RandomSelection {
    pub fn new(count: usize) -> ResolverResult<Self> {
        if count == 0 {
            return Err(ResolverError::Validation(
                "selection count must be at least 1".to_string(),
            ));
        }
        Ok(Self { count })
    }
}

impl Selection for RandomSelection {
    fn select_endpoints(&self, endpoints: Vec<Endpoint>) -> ResolverResult<Vec<Endpoint>> {
        if endpoints.len() <= self.count {
            return Ok(endpoints);
        }

        let mut picked = index::sample(&mut rand::thread_rng(), endpoints.len(), self.count).into_vec();
        picked.sort_unstable();

        let mut slots: Vec<Option<Endpoint>> = endpoints.into_iter().map(Some).collect();
        Ok(picked
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(n: usize) -> Vec<Endpoint> {
        (0..n)
            .map(|i| Endpoint::new(format!("https://{}.example.com", i), "example.com"))
            .collect()
    }

    #[test]
    fn test_static_selection_keeps_all() {
        let selected = StaticSelection.select_endpoints(endpoints(3)).unwrap();
        assert_eq!(selected, endpoints(3));

        let selected = StaticSelection.select_endpoints(Vec::new()).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_random_selection_size_and_order() {
        let selection = RandomSelection::new(3).unwrap();
        let all = endpoints(10);

        for _ in 0..20 {
            let selected = selection.select_endpoints(all.clone()).unwrap();
            assert_eq!(selected.len(), 3);

            let positions: Vec<usize> = selected
                .iter()
                .map(|e| all.iter().position(|a| a == e).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_random_selection_small_set() {
        let selection = RandomSelection::new(5).unwrap();
        assert_eq!(selection.select_endpoints(endpoints(2)).unwrap(), endpoints(2));
    }

    #[test]
    fn test_random_selection_rejects_zero() {
        assert!(RandomSelection::new(0).is_err());
    }
}
