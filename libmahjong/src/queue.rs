//! Single-flight execution of state-mutating sequences.
//!
//! The queue owns the state on a dedicated worker thread. Callers submit a
//! [`Sequence`] of steps; sequences run strictly in submission order and a
//! sequence is never started before the previous one has finished, so
//! nothing outside a step can observe a half-applied sequence.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

type Task<S> = Box<dyn FnOnce(&mut S) -> Result<()> + Send>;

/// One unit of a sequence, run after an optional pacing delay.
pub struct Step<S> {
    delay: Duration,
    task: Task<S>,
}

/// An ordered list of steps consumed by the worker as one exclusive unit.
pub struct Sequence<S> {
    label: String,
    steps: Vec<Step<S>>,
}

struct Job<S> {
    seq: Sequence<S>,
    done: Sender<Result<()>>,
}

/// Completion handle of a submitted sequence.
#[must_use = "a ticket should be waited on before the step is considered done"]
pub struct Ticket {
    label: String,
    rx: Receiver<Result<()>>,
}

pub struct ExclusiveQueue<S> {
    tx: Mutex<Option<Sender<Job<S>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<AtomicUsize>,
}

impl<S: 'static> Step<S> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut S) -> Result<()> + Send + 'static,
    {
        Self::delayed(Duration::ZERO, f)
    }

    pub fn delayed<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce(&mut S) -> Result<()> + Send + 'static,
    {
        Self {
            delay,
            task: Box::new(f),
        }
    }
}

impl<S: 'static> Sequence<S> {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_capacity(label, 0)
    }

    pub fn with_capacity(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            steps: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, step: Step<S>) -> &mut Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn then<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut S) -> Result<()> + Send + 'static,
    {
        self.steps.push(Step::new(f));
        self
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order. The first failing step aborts the rest of
    /// the sequence; a panicking step is caught and reported as an error.
    fn run(self, state: &mut S) -> Result<()> {
        let label = self.label;
        for (idx, step) in self.steps.into_iter().enumerate() {
            if !step.delay.is_zero() {
                thread::sleep(step.delay);
            }
            let task = step.task;
            match panic::catch_unwind(AssertUnwindSafe(|| task(state))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::error!("sequence {label:?} failed at step {idx}: {err:#}");
                    return Err(err).with_context(|| format!("in sequence {label:?}"));
                }
                Err(panic_info) => {
                    let msg = panic_info
                        .downcast_ref::<String>()
                        .map(String::as_str)
                        .or_else(|| panic_info.downcast_ref::<&str>().copied())
                        .unwrap_or("unknown panic");
                    log::error!("sequence {label:?} panicked at step {idx}: {msg}");
                    return Err(anyhow!("sequence {label:?} panicked at step {idx}: {msg}"));
                }
            }
        }
        Ok(())
    }
}

impl Ticket {
    /// Blocks until the sequence has run, returning its outcome.
    pub fn wait(self) -> Result<()> {
        self.rx
            .recv()
            .with_context(|| format!("queue worker dropped sequence {:?}", self.label))?
    }
}

impl<S> ExclusiveQueue<S>
where
    S: Send + 'static,
{
    pub fn new(state: S) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job<S>>();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = Arc::clone(&pending);

        let worker = thread::Builder::new()
            .name("exclusive-queue".to_owned())
            .spawn(move || {
                let mut state = state;
                for Job { seq, done } in rx {
                    let result = seq.run(&mut state);
                    worker_pending.fetch_sub(1, Ordering::AcqRel);
                    // The submitter may not care about the outcome.
                    let _ = done.send(result);
                }
                log::debug!("exclusive queue drained");
            })
            .context("failed to spawn queue worker")?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            pending,
        })
    }

    /// Queues `seq` behind everything submitted before it.
    pub fn run_exclusive(&self, seq: Sequence<S>) -> Result<Ticket> {
        let (done, rx) = channel::bounded(1);
        let label = seq.label.clone();
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(anyhow!("queue is shut down, sequence {label:?} rejected"));
        };
        self.pending.fetch_add(1, Ordering::AcqRel);
        if tx.send(Job { seq, done }).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(anyhow!("queue worker is gone, sequence {label:?} rejected"));
        }
        Ok(Ticket { label, rx })
    }

    /// Runs `seq` and then `f`, waiting for both and returning what `f`
    /// produced.
    pub fn run_then<R, F>(&self, mut seq: Sequence<S>, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut S) -> Result<R> + Send + 'static,
    {
        let (out_tx, out_rx) = channel::bounded(1);
        seq.push(Step::new(move |state: &mut S| {
            let ret = f(state)?;
            let _ = out_tx.send(ret);
            Ok(())
        }));
        self.run_exclusive(seq)?.wait()?;
        out_rx
            .recv()
            .context("sequence finished without producing a value")
    }

    /// Reads the state once every previously submitted sequence is done.
    pub fn snapshot<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&S) -> R + Send + 'static,
    {
        self.run_then(Sequence::new("snapshot"), move |s: &mut S| Ok(f(s)))
    }

    /// Sequences queued or running.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Stops accepting sequences, lets the worker drain what is queued and
    /// joins it.
    pub fn shutdown(&self) {
        drop(self.tx.lock().take());
        if let Some(worker) = self.worker.lock().take()
            && worker.join().is_err()
        {
            log::error!("queue worker panicked outside of a step");
        }
    }
}

impl<S> Drop for ExclusiveQueue<S> {
    fn drop(&mut self) {
        drop(self.tx.get_mut().take());
        if let Some(worker) = self.worker.get_mut().take() {
            let _ = worker.join();
        }
    }
}
