#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(non_snake_case)]
#![allow(clippy::too_many_arguments)]

// standard imports via blas-lapack-rs crates
extern crate blas_src;
extern crate lapack_src;
use lapack::{dsyevr, ssyevr};

use super::SmallestEigen;
use crate::algebra::*;

/// Float types with a LAPACK `?syevr` implementation.
pub trait LapackFloatT: private::LapackFloatSealed + XsyevrScalar {}

impl LapackFloatT for f32 {}
impl LapackFloatT for f64 {}

mod private {
    pub trait LapackFloatSealed {}
    impl LapackFloatSealed for f32 {}
    impl LapackFloatSealed for f64 {}
}

// --------------------------------------
// ?syevr : Symmetric eigen decomposition
// --------------------------------------

pub trait XsyevrScalar: Sized {
    fn xsyevr(
        jobz: u8, range: u8, uplo: u8, n: i32, a: &mut [Self], lda: i32, vl: Self, vu: Self, il: i32, iu: i32,
        abstol: Self, m: &mut i32, w: &mut [Self], z: &mut [Self], ldz: i32, isuppz: &mut [i32],
        work: &mut [Self], lwork: i32, iwork: &mut [i32], liwork: i32, info: &mut i32,
    );
}

macro_rules! impl_lapack_xsyevr {
    ($T:ty, $XSYEVR:path) => {
        impl XsyevrScalar for $T {
            fn xsyevr(
                jobz: u8, range: u8, uplo: u8, n: i32, a: &mut [Self], lda: i32, vl: Self, vu: Self, il: i32, iu: i32,
                abstol: Self, m: &mut i32, w: &mut [Self], z: &mut [Self], ldz: i32, isuppz: &mut [i32],
                work: &mut [$T], lwork: i32, iwork: &mut [i32], liwork: i32, info: &mut i32,
            ) {
                unsafe {
                    $XSYEVR(
                        jobz, range, uplo, n, a, lda, vl, vu, il, iu, abstol, m,
                        w, z, ldz, isuppz, work, lwork, iwork, liwork, info,
                    );
                }
            }
        }
    };
}

impl_lapack_xsyevr!(f32, ssyevr);
impl_lapack_xsyevr!(f64, dsyevr);

/// Smallest eigenpair through `?syevr`, computing only the
/// first eigenvalue in ascending order.
pub struct DenseEigen<T> {
    n: usize,
    w: Vec<T>,
    z: Vec<T>,
    isuppz: Vec<i32>,
    work: Vec<T>,
    iwork: Vec<i32>,
}

impl<T> DenseEigen<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            w: vec![T::zero(); n],
            z: vec![T::zero(); n],
            isuppz: vec![0; 2 * n.max(1)],
            // must be at least 1 element because the
            // required work size is written into the
            // first element
            work: vec![T::one()],
            iwork: vec![1],
        }
    }
}

impl<T> SmallestEigen<T> for DenseEigen<T>
where
    T: FloatT,
{
    fn smallest_eigenpair(
        &mut self,
        A: &mut Matrix<T>,
        want_vector: bool,
    ) -> Result<(T, Option<Vec<T>>), DenseFactorizationError> {
        if A.n() != self.n || self.n == 0 {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }

        let jobz = if want_vector { b'V' } else { b'N' };
        let range = b'I';              // eigenvalues il..=iu
        let uplo = b'L';
        let n: i32 = self.n.try_into().map_err(|_| DenseFactorizationError::IncompatibleDimension)?;
        let a = A.data_mut();
        let lda = n;
        let vl = T::zero();            // (range = I => not used)
        let vu = T::zero();            // (range = I => not used)
        let il = 1_i32;
        let iu = 1_i32;
        let abstol = -T::one();        // forces default tolerance
        let m = &mut 0_i32;
        let ldz = n;
        let mut lwork = -1_i32;        // -1 => request required work size
        let mut liwork = -1_i32;
        let info = &mut 0_i32;

        for i in 0..2 {
            T::xsyevr(
                jobz, range, uplo, n, a, lda, vl, vu, il, iu, abstol, m, &mut self.w, &mut self.z, ldz,
                &mut self.isuppz, &mut self.work, lwork, &mut self.iwork, liwork, info,
            );
            if *info != 0 {
                return Err(DenseFactorizationError::Eigen(*info));
            }
            // resize work vectors and reset lengths
            if i == 0 {
                lwork = self.work[0].to_i32().unwrap_or(1).max(1);
                liwork = self.iwork[0].max(1);
                self.work.resize(lwork as usize, T::zero());
                self.iwork.resize(liwork as usize, 0);
            }
        }

        if *m < 1 {
            return Err(DenseFactorizationError::Eigen(-1));
        }
        let v = want_vector.then(|| self.z.clone());
        Ok((self.w[0], v))
    }
}
