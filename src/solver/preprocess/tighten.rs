use crate::algebra::*;
use crate::solver::infinity;

/// Outcome of [`tighten_row_coefs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowTightening {
    /// number of nonzeros left in the row
    pub nnz: usize,
    pub lhsredundant: bool,
    pub rhsredundant: bool,
    pub nchgcoefs: usize,
}

#[derive(Debug, Clone, Copy)]
struct Activity<T> {
    sum: QuadPrec<T>,
    infinite: bool,
}

impl<T: FloatT> Activity<T> {
    fn new() -> Self {
        Self {
            sum: QuadPrec::default(),
            infinite: false,
        }
    }

    fn add(&mut self, coef: T, bound: T) {
        if is_finite_bound(bound) {
            self.sum.add_product(coef, bound);
        } else {
            self.infinite = true;
        }
    }

    // infinite activities are reported as the signed sentinel
    fn value(&self, sign: T) -> T {
        if self.infinite {
            sign * infinity::<T>()
        } else {
            self.sum.value()
        }
    }
}

#[inline]
fn is_finite_bound<T: FloatT>(v: T) -> bool {
    v < infinity() && v > -infinity::<T>()
}

/// Coefficient tightening of a ranged row `lhs <= Σ val[k] y[ind[k]] <= rhs`
/// using the integrality of its variables.
///
/// For an integer variable whose coefficient is large compared to the
/// activity slack, the coefficient is reduced to the smallest value that
/// still cuts off the same integer points, and the sides are shifted to
/// match.  Coefficients reduced to zero are removed by swapping in the last
/// entry, so the order of the row is not preserved.  Equations are never
/// touched.
#[allow(clippy::too_many_arguments)]
pub fn tighten_row_coefs<T: FloatT>(
    ind: &mut [usize],
    val: &mut [T],
    lhs: &mut T,
    rhs: &mut T,
    lb: &[T],
    ub: &[T],
    isintegral: &[bool],
    epsilon: T,
) -> RowTightening {
    let mut nnz = val.len();
    let mut out = RowTightening {
        nnz,
        ..Default::default()
    };

    if (*lhs - *rhs).abs() < epsilon {
        return out;
    }

    let mut minact = Activity::new();
    let mut maxact = Activity::new();
    let mut maxintabs = T::zero();
    let mut hasint = false;

    for (&j, &a) in ind.iter().zip(val.iter()) {
        if isintegral[j] {
            maxintabs = T::max(maxintabs, a.abs());
            hasint = true;
        }
        if a > T::zero() {
            maxact.add(a, ub[j]);
            minact.add(a, lb[j]);
        } else {
            maxact.add(a, lb[j]);
            minact.add(a, ub[j]);
        }
    }

    if !hasint || (minact.infinite && maxact.infinite) {
        return out;
    }

    let mut minval = minact.value(-T::one());
    let mut maxval = maxact.value(T::one());
    let lhsfinite = *lhs > -infinity::<T>();
    let rhsfinite = *rhs < infinity::<T>();

    out.lhsredundant = !lhsfinite || minval >= *lhs - epsilon;
    out.rhsredundant = !rhsfinite || maxval <= *rhs + epsilon;
    if out.lhsredundant && out.rhsredundant {
        return out;
    }

    // no single integer coefficient can be large enough
    if minval + maxintabs < *lhs - epsilon || maxval - maxintabs > *rhs + epsilon {
        return out;
    }

    let mut k = 0;
    while k < nnz {
        let j = ind[k];
        let a = val[k];
        if !isintegral[j] {
            k += 1;
            continue;
        }

        // candidate coefficient and the bounds shifting lhs and rhs
        let (newval, lhsbound, rhsbound, positive) = if a > T::zero()
            && minval + a >= *lhs - epsilon
            && maxval - a <= *rhs + epsilon
        {
            let newval = match (lhsfinite, rhsfinite) {
                (true, true) => T::max(*lhs - minval, maxval - *rhs),
                (true, false) => *lhs - minval,
                _ => maxval - *rhs,
            };
            (newval, lb[j], ub[j], true)
        } else if a < T::zero()
            && minval - a >= *lhs - epsilon
            && maxval + a <= *rhs + epsilon
        {
            let newval = match (lhsfinite, rhsfinite) {
                (true, true) => T::min(minval - *lhs, *rhs - maxval),
                (true, false) => minval - *lhs,
                _ => *rhs - maxval,
            };
            (newval, ub[j], lb[j], false)
        } else {
            k += 1;
            continue;
        };

        if (newval - a).abs() <= epsilon {
            k += 1;
            continue;
        }

        // shift lhs by (newval - a) * lhsbound, rhs by (newval - a) * rhsbound
        let mut lhsdelta = QuadPrec::new(newval);
        lhsdelta -= a;
        let mut rhsdelta = lhsdelta;
        lhsdelta *= lhsbound;
        rhsdelta *= rhsbound;

        if lhsfinite {
            let mut newlhs = lhsdelta;
            newlhs += *lhs;
            *lhs = newlhs.value();
        }
        if rhsfinite {
            let mut newrhs = rhsdelta;
            newrhs += *rhs;
            *rhs = newrhs.value();
        }

        tracing::debug!(
            component = "preprocess",
            var = j,
            old = %a,
            new = %newval,
            lhs = %*lhs,
            rhs = %*rhs,
            "tightened coefficient"
        );
        out.nchgcoefs += 1;

        let keep = if positive {
            newval > epsilon
        } else {
            newval < -epsilon
        };

        if keep {
            if lhsfinite {
                minact.sum += lhsdelta;
                minval = minact.value(-T::one());
            }
            if rhsfinite {
                maxact.sum += rhsdelta;
                maxval = maxact.value(T::one());
            }
            val[k] = newval;
            k += 1;
        } else {
            nnz -= 1;
            val[k] = val[nnz];
            ind[k] = ind[nnz];
        }
    }

    out.nnz = nnz;
    out
}
