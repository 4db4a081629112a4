pub mod copy;
pub mod gemm;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use half::f16;
use log::{debug, warn};

use crate::backend::{BlasQueue, GemmConfig, Memcpy2d};
use crate::element::Element;
use crate::error::{BlasError, Result};

/// When enqueued host work actually runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Work runs on `synchronize()`, in issue order.
    #[default]
    Deferred,
    /// Work runs inside the enqueue call.
    Immediate,
}

/// Configuration for a [`HostQueue`].
#[derive(Debug, Clone, Default)]
pub struct HostQueueConfig {
    pub mode: ExecutionMode,
}

type Task = Box<dyn FnOnce() -> Result<()>>;

/// Reference execution queue running column-major kernels on host memory.
///
/// Pointers handed to a `HostQueue` are host pointers. Work is kept in a FIFO
/// and, in the default deferred mode, only executes when the queue is
/// synchronized, so callers observe the same asynchrony as with a device
/// stream. The first failing task poisons the queue: later synchronizations
/// keep reporting that error and enqueued work is discarded.
pub struct HostQueue {
    config: HostQueueConfig,
    pending: RefCell<VecDeque<Task>>,
    error: RefCell<Option<BlasError>>,
}

impl HostQueue {
    pub fn new() -> Self {
        Self::with_config(HostQueueConfig::default())
    }

    pub fn with_config(config: HostQueueConfig) -> Self {
        HostQueue {
            config,
            pending: RefCell::new(VecDeque::new()),
            error: RefCell::new(None),
        }
    }

    /// Number of tasks enqueued but not yet executed.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Enqueue an arbitrary host task behind all previously enqueued work.
    ///
    /// A task returning `Err` poisons the queue.
    pub fn enqueue(&self, task: impl FnOnce() -> Result<()> + 'static) {
        match self.config.mode {
            ExecutionMode::Deferred => self.pending.borrow_mut().push_back(Box::new(task)),
            ExecutionMode::Immediate => self.run(Box::new(task)),
        }
    }

    fn run(&self, task: Task) {
        if self.error.borrow().is_some() {
            return;
        }
        if let Err(e) = task() {
            *self.error.borrow_mut() = Some(e);
        }
    }

    fn drain(&self) {
        loop {
            // The borrow must end before the task runs; tasks may enqueue.
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(task) => self.run(task),
                None => break,
            }
        }
    }

    unsafe fn enqueue_gemm<T: Element>(
        &self,
        cfg: &GemmConfig<T>,
        a: *const T,
        b: *const T,
        c: *mut T,
    ) -> Result<()> {
        gemm::check_gemm(cfg)?;
        let cfg = *cfg;
        self.enqueue(move || {
            // SAFETY: the enqueuer guaranteed the buffers outlive the task.
            unsafe { gemm::col_major_gemm(&cfg, a, b, c) };
            Ok(())
        });
        Ok(())
    }
}

impl Default for HostQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostQueue")
            .field("config", &self.config)
            .field("pending", &self.pending())
            .field("error", &self.error.borrow())
            .finish()
    }
}

impl BlasQueue for HostQueue {
    fn name(&self) -> &str {
        "host"
    }

    unsafe fn sgemm(
        &self,
        cfg: &GemmConfig<f32>,
        a: *const f32,
        b: *const f32,
        c: *mut f32,
    ) -> Result<()> {
        self.enqueue_gemm(cfg, a, b, c)
    }

    unsafe fn dgemm(
        &self,
        cfg: &GemmConfig<f64>,
        a: *const f64,
        b: *const f64,
        c: *mut f64,
    ) -> Result<()> {
        self.enqueue_gemm(cfg, a, b, c)
    }

    unsafe fn hgemm(
        &self,
        cfg: &GemmConfig<f16>,
        a: *const f16,
        b: *const f16,
        c: *mut f16,
    ) -> Result<()> {
        self.enqueue_gemm(cfg, a, b, c)
    }

    unsafe fn memcpy_2d(&self, copy: &Memcpy2d) -> Result<()> {
        copy::check_memcpy_2d(copy)?;
        let copy = *copy;
        self.enqueue(move || {
            // SAFETY: the enqueuer guaranteed both regions outlive the task.
            unsafe { copy::memcpy_2d(&copy) };
            Ok(())
        });
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        let n = self.pending();
        self.drain();
        debug!("host queue synchronized after {} task(s)", n);
        match &*self.error.borrow() {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Drop for HostQueue {
    fn drop(&mut self) {
        self.drain();
        if let Some(e) = self.error.get_mut().take() {
            warn!("host queue dropped with failed work: {}", e);
        }
    }
}
