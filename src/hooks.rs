//! Dependency-tracked recomputation
//!
//! `Memo` caches a value for the last key it saw and `Effect` runs a callback
//! only when its dependencies change. Both compare inputs with `PartialEq`,
//! so handle types decide for themselves what "changed" means.

/// Single-slot memo cell keyed on its inputs
pub struct Memo<K, V> {
    slot: Option<(K, V)>,
    computations: usize,
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            slot: None,
            computations: 0,
        }
    }

    /// Return the cached value for `key`, computing it when the key differs
    /// from the previous call
    pub fn get_or_compute<F>(&mut self, key: &K, compute_fn: F) -> &V
    where
        F: FnOnce(&K) -> V,
    {
        self.get_or_hold(key, false, compute_fn)
    }

    /// Like `get_or_compute`, but while `hold` is set a cached value for an
    /// older key is returned as is. Only an empty memo computes.
    pub fn get_or_hold<F>(&mut self, key: &K, hold: bool, compute_fn: F) -> &V
    where
        F: FnOnce(&K) -> V,
    {
        let current = matches!(&self.slot, Some((cached, _)) if cached == key);
        if !current && !hold {
            self.slot = None;
        }
        let (_, value) = self.slot.get_or_insert_with(|| {
            self.computations += 1;
            (key.clone(), compute_fn(key))
        });
        value
    }

    /// Key of the cached value, if any
    pub fn cached_key(&self) -> Option<&K> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    /// Drop the cached value (forces recomputation)
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Number of times the compute function has run
    #[cfg(test)]
    pub fn computations(&self) -> usize {
        self.computations
    }
}

impl<K: PartialEq + Clone, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Effect that re-runs when its dependency tuple changes
pub struct Effect<D> {
    last: Option<D>,
}

impl<D: PartialEq + Clone> Effect<D> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Run `f` if `deps` differ from the last run. Returns whether it ran.
    pub fn run_if_changed<F>(&mut self, deps: &D, f: F) -> bool
    where
        F: FnOnce(&D),
    {
        if self.last.as_ref() == Some(deps) {
            return false;
        }
        self.last = Some(deps.clone());
        f(deps);
        true
    }

    /// Forget the last dependencies so the next call always runs
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl<D: PartialEq + Clone> Default for Effect<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_hit_and_miss() {
        let mut memo: Memo<(u32, String), usize> = Memo::new();
        let key = (1, "a".to_string());

        assert_eq!(*memo.get_or_compute(&key, |k| k.1.len() + k.0 as usize), 2);
        // Equal key, compute function must not run
        let mut ran = false;
        memo.get_or_compute(&key.clone(), |_| {
            ran = true;
            0
        });
        assert!(!ran, "Should have hit cache");
        assert_eq!(memo.computations(), 1);

        let other = (2, "a".to_string());
        assert_eq!(*memo.get_or_compute(&other, |k| k.0 as usize), 2);
        assert_eq!(memo.computations(), 2);

        // The old key was evicted by the single slot
        memo.get_or_compute(&key, |k| k.0 as usize);
        assert_eq!(memo.computations(), 3);
    }

    #[test]
    fn test_memo_hold() {
        let mut memo: Memo<u8, u8> = Memo::new();
        // An empty memo computes even while holding
        assert_eq!(*memo.get_or_hold(&1, true, |k| k * 10), 10);
        assert_eq!(*memo.get_or_hold(&2, true, |k| k * 10), 10);
        assert_eq!(memo.cached_key(), Some(&1));
        assert_eq!(memo.computations(), 1);

        assert_eq!(*memo.get_or_hold(&2, false, |k| k * 10), 20);
        assert_eq!(memo.cached_key(), Some(&2));
        assert_eq!(memo.computations(), 2);
    }

    #[test]
    fn test_memo_invalidate() {
        let mut memo: Memo<u8, u8> = Memo::new();
        memo.get_or_compute(&1, |k| *k);
        memo.invalidate();
        memo.get_or_compute(&1, |k| *k);
        assert_eq!(memo.computations(), 2);
    }

    #[test]
    fn test_effect_runs_on_change_only() {
        let mut effect: Effect<Option<u64>> = Effect::new();
        let mut runs = Vec::new();

        assert!(effect.run_if_changed(&None, |d| runs.push(*d)));
        assert!(!effect.run_if_changed(&None, |d| runs.push(*d)));
        assert!(effect.run_if_changed(&Some(3), |d| runs.push(*d)));
        effect.reset();
        assert!(effect.run_if_changed(&Some(3), |d| runs.push(*d)));

        assert_eq!(runs, vec![None, Some(3), Some(3)]);
    }
}
