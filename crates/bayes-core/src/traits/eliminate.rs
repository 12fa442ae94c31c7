use super::conditional::Conditional;
use crate::errors::EliminationError;
use crate::Key;

/// Output of eliminating some variables out of a product of factors.
#[derive(Debug, Clone)]
pub struct Eliminated<C: Conditional> {
    /// P(frontals | remaining variables).
    pub conditional: C,
    /// Factor over the remaining variables, if any remain.
    pub remaining: Option<C::Factor>,
}

/// Elimination procedure supplied by the caller at query time.
///
/// `eliminate(factors, frontals)` combines `factors` and eliminates the
/// `frontals` keys, in order, out of the product. Implemented for every
/// closure or fn item with the matching signature.
pub trait Eliminate<C: Conditional> {
    fn eliminate(
        &self,
        factors: &[C::Factor],
        frontals: &[Key],
    ) -> Result<Eliminated<C>, EliminationError>;
}

impl<C, F> Eliminate<C> for F
where
    C: Conditional,
    F: Fn(&[C::Factor], &[Key]) -> Result<Eliminated<C>, EliminationError>,
{
    fn eliminate(
        &self,
        factors: &[C::Factor],
        frontals: &[Key],
    ) -> Result<Eliminated<C>, EliminationError> {
        self(factors, frontals)
    }
}
