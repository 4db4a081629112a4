use rm_blas::{BlasQueue, HostQueue, Result};

use crate::types::RmQueueKind;

/// Opaque queue handle owned by the C caller.
#[derive(Debug)]
pub enum RmQueue {
    Host(HostQueue),
    #[cfg(feature = "cuda")]
    Cuda(rm_blas::CudaQueue),
}

impl RmQueue {
    /// Create a queue of the requested kind. `device` selects the CUDA
    /// ordinal and is ignored for host queues.
    pub fn new(kind: RmQueueKind, device: usize) -> Result<Self> {
        match kind {
            RmQueueKind::Host => Ok(RmQueue::Host(HostQueue::new())),
            #[cfg(feature = "cuda")]
            RmQueueKind::Cuda => Ok(RmQueue::Cuda(rm_blas::CudaQueue::new(device)?)),
            #[cfg(not(feature = "cuda"))]
            RmQueueKind::Cuda => Err(rm_blas::BlasError::NotSupported(format!(
                "cuda queue on device {} requested but rm-ffi was built without the `cuda` feature",
                device
            ))),
        }
    }

    pub fn as_blas(&self) -> &dyn BlasQueue {
        match self {
            RmQueue::Host(q) => q,
            #[cfg(feature = "cuda")]
            RmQueue::Cuda(q) => q,
        }
    }
}
