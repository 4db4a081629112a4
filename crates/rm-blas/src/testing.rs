// Test doubles shared by the unit tests of the dispatch modules.

use std::cell::RefCell;

use half::f16;

use crate::backend::{BlasQueue, GemmConfig, Memcpy2d};
use crate::element::Precision;
use crate::error::{BlasError, Result};

/// One recorded kernel call: the precision, the column-major config
/// (converted to f64 scalars) and the operand pointers as addresses.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GemmCall {
    pub precision: Precision,
    pub cfg: GemmConfig<f64>,
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

/// Queue that records calls instead of running them, optionally failing
/// every enqueue with a fixed error.
#[derive(Debug, Default)]
pub(crate) struct RecordingQueue {
    pub gemms: RefCell<Vec<GemmCall>>,
    pub copies: RefCell<Vec<Memcpy2d>>,
    pub fail_with: Option<BlasError>,
}

impl RecordingQueue {
    pub fn failing(err: BlasError) -> Self {
        RecordingQueue {
            fail_with: Some(err),
            ..Default::default()
        }
    }

    fn record<T: Copy + Into<f64>>(
        &self,
        precision: Precision,
        cfg: &GemmConfig<T>,
        a: usize,
        b: usize,
        c: usize,
    ) -> Result<()> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        let cfg = GemmConfig {
            transa: cfg.transa,
            transb: cfg.transb,
            m: cfg.m,
            n: cfg.n,
            k: cfg.k,
            alpha: cfg.alpha.into(),
            lda: cfg.lda,
            ldb: cfg.ldb,
            beta: cfg.beta.into(),
            ldc: cfg.ldc,
        };
        self.gemms.borrow_mut().push(GemmCall {
            precision,
            cfg,
            a,
            b,
            c,
        });
        Ok(())
    }
}

impl BlasQueue for RecordingQueue {
    fn name(&self) -> &str {
        "recording"
    }

    unsafe fn sgemm(&self, cfg: &GemmConfig<f32>, a: *const f32, b: *const f32, c: *mut f32)
        -> Result<()> {
        self.record(Precision::F32, cfg, a as usize, b as usize, c as usize)
    }

    unsafe fn dgemm(&self, cfg: &GemmConfig<f64>, a: *const f64, b: *const f64, c: *mut f64)
        -> Result<()> {
        self.record(Precision::F64, cfg, a as usize, b as usize, c as usize)
    }

    unsafe fn hgemm(&self, cfg: &GemmConfig<f16>, a: *const f16, b: *const f16, c: *mut f16)
        -> Result<()> {
        self.record(Precision::F16, cfg, a as usize, b as usize, c as usize)
    }

    unsafe fn memcpy_2d(&self, copy: &Memcpy2d) -> Result<()> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        self.copies.borrow_mut().push(*copy);
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}
