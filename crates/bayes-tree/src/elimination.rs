//! Sequential variable elimination over a plain list of factors.
//!
//! Every query reduces to these three helpers; the probability math lives
//! entirely in the caller's [`Eliminate`] function.

use bayes_core::errors::EliminationError;
use bayes_core::{BayesNet, Conditional, Eliminate, Factor, FactorGraph, Key};

/// Eliminate `ordering` one variable at a time.
///
/// For each key, the factors involving it are combined and eliminated; the
/// remaining factor, if any, goes back into the pool. Keys no factor touches
/// are skipped. Returns the conditionals in elimination order and the factors
/// left over.
pub fn eliminate_sequential<C, E>(
    factors: FactorGraph<C::Factor>,
    ordering: &[Key],
    eliminate: &E,
) -> Result<(BayesNet<C>, FactorGraph<C::Factor>), EliminationError>
where
    C: Conditional,
    E: Eliminate<C>,
{
    let mut pool = factors;
    let mut net = BayesNet::new();
    for &key in ordering {
        let (involved, rest): (Vec<_>, Vec<_>) = pool.into_iter().partition(|f| f.involves(key));
        pool = rest;
        if involved.is_empty() {
            continue;
        }
        let eliminated = eliminate.eliminate(&involved, &[key])?;
        net.push(eliminated.conditional);
        pool.extend(eliminated.remaining);
    }
    Ok((net, pool))
}

/// Marginalize `factors` onto `keep` by eliminating every other variable in
/// ascending key order.
pub fn joint_factor_graph<C, E>(
    factors: FactorGraph<C::Factor>,
    keep: &[Key],
    eliminate: &E,
) -> Result<FactorGraph<C::Factor>, EliminationError>
where
    C: Conditional,
    E: Eliminate<C>,
{
    let mut ordering: Vec<Key> = factors
        .iter()
        .flat_map(|f| f.keys().iter().copied())
        .filter(|k| !keep.contains(k))
        .collect();
    ordering.sort_unstable();
    ordering.dedup();

    let (_, remaining) = eliminate_sequential::<C, E>(factors, &ordering, eliminate)?;
    Ok(remaining)
}

/// Marginalize onto `keep`, then eliminate `keep` itself in the given order.
pub fn joint_bayes_net<C, E>(
    factors: FactorGraph<C::Factor>,
    keep: &[Key],
    eliminate: &E,
) -> Result<BayesNet<C>, EliminationError>
where
    C: Conditional,
    E: Eliminate<C>,
{
    let marginal = joint_factor_graph::<C, E>(factors, keep, eliminate)?;
    let (net, _) = eliminate_sequential::<C, E>(marginal, keep, eliminate)?;
    Ok(net)
}
