// CUDA execution queue backed by cuBLAS and the driver copy engine.
//
// Pointers handed to a `CudaQueue` are device addresses (for example the
// `CUdeviceptr` of a `CudaSlice`, cast to `*const T`).

use std::ffi::c_int;
use std::fmt;
use std::ptr;
use std::sync::Arc;

use cudarc::cublas::result::{self as cublas, CublasError};
use cudarc::cublas::sys::{cublasOperation_t, cublasStatus_t};
use cudarc::cublas::CudaBlas;
use cudarc::driver::sys::{
    cuMemcpy2DAsync_v2, cudaError_enum, CUdeviceptr, CUmemorytype, CUDA_MEMCPY2D_st,
};
use cudarc::driver::{CudaContext, CudaStream, DriverError};
use half::f16;
use log::debug;

use crate::backend::{BlasQueue, GemmConfig, Memcpy2d};
use crate::error::{BlasError, Result};
use crate::op::Op;

impl From<CublasError> for BlasError {
    fn from(err: CublasError) -> Self {
        let msg = format!("{:?}", err.0);
        match err.0 {
            cublasStatus_t::CUBLAS_STATUS_INVALID_VALUE => BlasError::InvalidValue(msg),
            cublasStatus_t::CUBLAS_STATUS_EXECUTION_FAILED => BlasError::ExecutionFailed(msg),
            cublasStatus_t::CUBLAS_STATUS_NOT_SUPPORTED => BlasError::NotSupported(msg),
            cublasStatus_t::CUBLAS_STATUS_MAPPING_ERROR => BlasError::MappingError(msg),
            cublasStatus_t::CUBLAS_STATUS_ALLOC_FAILED => BlasError::AllocationFailed(msg),
            cublasStatus_t::CUBLAS_STATUS_ARCH_MISMATCH => BlasError::ArchitectureMismatch(msg),
            _ => BlasError::InternalError(msg),
        }
    }
}

impl From<DriverError> for BlasError {
    fn from(err: DriverError) -> Self {
        let msg = format!("{:?}", err.0);
        match err.0 {
            cudaError_enum::CUDA_ERROR_INVALID_VALUE => BlasError::InvalidValue(msg),
            cudaError_enum::CUDA_ERROR_OUT_OF_MEMORY => BlasError::AllocationFailed(msg),
            cudaError_enum::CUDA_ERROR_NOT_SUPPORTED => BlasError::NotSupported(msg),
            _ => BlasError::ExecutionFailed(msg),
        }
    }
}

fn operation(op: Op) -> cublasOperation_t {
    match op {
        Op::None => cublasOperation_t::CUBLAS_OP_N,
        Op::Transpose => cublasOperation_t::CUBLAS_OP_T,
        Op::ConjugateTranspose => cublasOperation_t::CUBLAS_OP_C,
    }
}

fn int(name: &str, v: usize) -> Result<c_int> {
    c_int::try_from(v)
        .map_err(|_| BlasError::InvalidValue(format!("{}={} does not fit in a C int", name, v)))
}

/// Integer arguments of a cuBLAS GEMM call, in cuBLAS parameter order.
struct Dims {
    m: c_int,
    n: c_int,
    k: c_int,
    lda: c_int,
    ldb: c_int,
    ldc: c_int,
}

impl Dims {
    fn new<T>(cfg: &GemmConfig<T>) -> Result<Self> {
        Ok(Dims {
            m: int("m", cfg.m)?,
            n: int("n", cfg.n)?,
            k: int("k", cfg.k)?,
            lda: int("lda", cfg.lda)?,
            ldb: int("ldb", cfg.ldb)?,
            ldc: int("ldc", cfg.ldc)?,
        })
    }
}

/// A CUDA stream with a cuBLAS handle bound to it.
pub struct CudaQueue {
    stream: Arc<CudaStream>,
    blas: CudaBlas,
}

impl CudaQueue {
    /// Create a queue on the default stream of device `ordinal`.
    pub fn new(ordinal: usize) -> Result<Self> {
        let ctx = CudaContext::new(ordinal)?;
        Self::from_stream(ctx.default_stream())
    }

    /// Bind a new cuBLAS handle to an existing stream.
    pub fn from_stream(stream: Arc<CudaStream>) -> Result<Self> {
        let blas = CudaBlas::new(stream.clone())?;
        debug!("cuda queue created on stream {:?}", stream.cu_stream());
        Ok(CudaQueue { stream, blas })
    }
}

impl fmt::Debug for CudaQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CudaQueue")
            .field("stream", &self.stream.cu_stream())
            .finish()
    }
}

impl BlasQueue for CudaQueue {
    fn name(&self) -> &str {
        "cuda"
    }

    unsafe fn sgemm(
        &self,
        cfg: &GemmConfig<f32>,
        a: *const f32,
        b: *const f32,
        c: *mut f32,
    ) -> Result<()> {
        let d = Dims::new(cfg)?;
        cublas::sgemm(
            *self.blas.handle(),
            operation(cfg.transa),
            operation(cfg.transb),
            d.m,
            d.n,
            d.k,
            &cfg.alpha,
            a,
            d.lda,
            b,
            d.ldb,
            &cfg.beta,
            c,
            d.ldc,
        )?;
        Ok(())
    }

    unsafe fn dgemm(
        &self,
        cfg: &GemmConfig<f64>,
        a: *const f64,
        b: *const f64,
        c: *mut f64,
    ) -> Result<()> {
        let d = Dims::new(cfg)?;
        cublas::dgemm(
            *self.blas.handle(),
            operation(cfg.transa),
            operation(cfg.transb),
            d.m,
            d.n,
            d.k,
            &cfg.alpha,
            a,
            d.lda,
            b,
            d.ldb,
            &cfg.beta,
            c,
            d.ldc,
        )?;
        Ok(())
    }

    unsafe fn hgemm(
        &self,
        cfg: &GemmConfig<f16>,
        a: *const f16,
        b: *const f16,
        c: *mut f16,
    ) -> Result<()> {
        let d = Dims::new(cfg)?;
        cublas::hgemm(
            *self.blas.handle(),
            operation(cfg.transa),
            operation(cfg.transb),
            d.m,
            d.n,
            d.k,
            &cfg.alpha,
            a,
            d.lda,
            b,
            d.ldb,
            &cfg.beta,
            c,
            d.ldc,
        )?;
        Ok(())
    }

    unsafe fn memcpy_2d(&self, copy: &Memcpy2d) -> Result<()> {
        let desc = CUDA_MEMCPY2D_st {
            srcXInBytes: 0,
            srcY: 0,
            srcMemoryType: CUmemorytype::CU_MEMORYTYPE_DEVICE,
            srcHost: ptr::null(),
            srcDevice: copy.src as CUdeviceptr,
            srcArray: ptr::null_mut(),
            srcPitch: copy.src_pitch,
            dstXInBytes: 0,
            dstY: 0,
            dstMemoryType: CUmemorytype::CU_MEMORYTYPE_DEVICE,
            dstHost: ptr::null_mut(),
            dstDevice: copy.dst as CUdeviceptr,
            dstArray: ptr::null_mut(),
            dstPitch: copy.dst_pitch,
            WidthInBytes: copy.width_bytes,
            Height: copy.height,
        };
        cuMemcpy2DAsync_v2(&desc, self.stream.cu_stream()).result()?;
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        self.stream.synchronize()?;
        Ok(())
    }
}
