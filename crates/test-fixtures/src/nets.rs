//! Canned symbolic Bayes nets.

use bayes_core::{BayesNet, Factor, Key};

use crate::symbolic::{eliminate_symbolic, SymbolicConditional, SymbolicFactor};

/// Variable keys of the ASIA network, in elimination order.
pub mod asia {
    use bayes_core::Key;

    pub const X: Key = 0;
    pub const T: Key = 1;
    pub const S: Key = 2;
    pub const E: Key = 3;
    pub const L: Key = 4;
    pub const B: Key = 5;
}

/// Three chained variables, root first: `P(1)`, `P(2|1)`, `P(3|1,2)`.
pub fn scenario_a() -> BayesNet<SymbolicConditional> {
    [
        SymbolicConditional::single(1, &[]),
        SymbolicConditional::single(2, &[1]),
        SymbolicConditional::single(3, &[1, 2]),
    ]
    .into_iter()
    .collect()
}

/// The ASIA network after eliminating in key order (leaves first).
///
/// The resulting tree is `B -> L -> {E -> {T, X}, S}`.
pub fn asia() -> BayesNet<SymbolicConditional> {
    use asia::*;
    [
        SymbolicConditional::single(X, &[E]),
        SymbolicConditional::single(T, &[E, L]),
        SymbolicConditional::single(S, &[L, B]),
        SymbolicConditional::single(E, &[L, B]),
        SymbolicConditional::single(L, &[B]),
        SymbolicConditional::single(B, &[]),
    ]
    .into_iter()
    .collect()
}

/// `P(0|1) P(1|2) ... P(n-1)`, leaves first.
pub fn chain(n: usize) -> BayesNet<SymbolicConditional> {
    (0..n)
        .map(|i| {
            if i + 1 < n {
                SymbolicConditional::single(i, &[i + 1])
            } else {
                SymbolicConditional::single(i, &[])
            }
        })
        .collect()
}

/// Eliminate a symbolic factor graph over `0..num_vars` in key order.
///
/// A factor linking every variable to the last one is added so the result is
/// always a single tree. Keys outside `0..num_vars` are dropped.
pub fn eliminate_in_order(num_vars: usize, factors: &[Vec<Key>]) -> BayesNet<SymbolicConditional> {
    assert!(num_vars > 0, "need at least one variable");
    let last = num_vars - 1;

    let mut pool: Vec<SymbolicFactor> = factors
        .iter()
        .map(|keys| SymbolicFactor::new(keys.iter().copied().filter(|&k| k < num_vars)))
        .filter(|f| !f.keys().is_empty())
        .collect();
    pool.extend((0..num_vars).map(|k| SymbolicFactor::new([k, last])));

    let mut net = BayesNet::new();
    for key in 0..num_vars {
        let (involved, rest): (Vec<_>, Vec<_>) = pool.into_iter().partition(|f| f.involves(key));
        pool = rest;
        let eliminated = eliminate_symbolic(&involved, &[key])
            .unwrap_or_else(|e| panic!("symbolic elimination of {key} failed: {e}"));
        net.push(eliminated.conditional);
        pool.extend(eliminated.remaining);
    }
    net
}

#[cfg(test)]
mod tests {
    use super::*;
    use bayes_core::Conditional;

    #[test]
    fn chain_has_one_root() {
        let net = chain(4);
        assert_eq!(net.len(), 4);
        let roots = net.iter().filter(|c| c.parents().is_empty()).count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn elimination_in_order_produces_one_conditional_per_variable() {
        let net = eliminate_in_order(5, &[vec![0, 2], vec![1, 3]]);
        assert_eq!(net.len(), 5);
        let first = net.get(0).unwrap();
        assert_eq!(first.frontals(), &[0]);
        assert_eq!(first.parents(), &[2, 4]);
        assert!(net.get(4).unwrap().parents().is_empty());
    }
}
