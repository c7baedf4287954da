//! C3: per-object serialized executor (`Actor`) with group-scoped
//! reentrancy (`Group`), per §4.3/§5.
//!
//! Each `Actor` owns a dedicated worker thread and an unbounded command
//! queue. `atomic_do` submits a closure to that queue and blocks the caller
//! until it completes — unless the calling *thread* is already executing
//! inside another actor of the same `Group`, in which case the closure runs
//! inline, sharing that thread's critical section instead of deadlocking
//! against the single-threaded worker.
//!
//! Rust maps actors onto real OS threads rather than goroutines, so the
//! reentrancy bookkeeping is a `thread_local!` stack of `GroupId`s pushed
//! around the point where a closure actually executes (see the module-level
//! comment on `GROUP_STACK` below) rather than literally at the `AtomicDo`
//! call site as worded in the source spec — this is the design decision
//! recorded in `DESIGN.md` resolving that Open Question.

use crate::error::Error;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, Once};
use std::thread::JoinHandle;

pub type GroupId = u64;
pub type ActorId = u64;

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Groups the current thread is presently "inside" (i.e. executing a
    /// closure submitted to, or reentered from, one of that group's actors).
    static GROUP_STACK: RefCell<Vec<GroupId>> = const { RefCell::new(Vec::new()) };
}

fn thread_in_group(gid: GroupId) -> bool {
    GROUP_STACK.with(|s| s.borrow().contains(&gid))
}

fn push_group(gid: GroupId) {
    GROUP_STACK.with(|s| s.borrow_mut().push(gid));
}

fn pop_group() {
    GROUP_STACK.with(|s| {
        s.borrow_mut().pop();
    });
}

/// A reentrancy scope. Distinct groups isolate reentrancy: nesting an
/// `AtomicDo` call on an actor in a *different* group from the one the
/// caller is inside still blocks (and can deadlock, by design, since the
/// caller is telling the library these objects are unrelated).
#[derive(Clone, Debug)]
pub struct Group {
    id: GroupId,
}

impl Group {
    pub fn new() -> Self {
        Self { id: NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed) }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// The process-wide default `Group`, for objects created without an
    /// explicit scope.
    pub static ref DEFAULT_GROUP: Group = Group::new();
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Per-object serialized executor. One dedicated worker thread per actor;
/// submissions are strict FIFO relative to each other.
pub struct Actor {
    id: ActorId,
    group: Group,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    init: Once,
}

impl Actor {
    pub fn new(group: Group) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let worker = std::thread::Builder::new()
            .name("insyra-actor".into())
            .spawn(move || {
                for job in rx {
                    job();
                }
            })
            .expect("failed to spawn actor worker thread");

        Self {
            id: NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed),
            group,
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
            init: Once::new(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Idempotent. Stops accepting new submissions and joins the worker
    /// thread once its current job (if any) finishes.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(tx) = self.sender.lock().expect("actor sender lock poisoned").take() {
            drop(tx);
        }
        if let Some(handle) = self.worker.lock().expect("actor worker lock poisoned").take() {
            let _ = handle.join();
        }
    }

    /// Runs `f` as an atomic critical section of this actor.
    pub fn atomic_do<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.atomic_do_with_init(f, || {})
    }

    /// As `atomic_do`, but on the first successful scheduling of this actor
    /// (ever), runs `init_hook` exactly once before `f`.
    pub fn atomic_do_with_init<F, R, I>(&self, f: F, init_hook: I) -> Result<R, Error>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
        I: FnOnce(),
    {
        if !crate::config::thread_safe() {
            self.init.call_once(init_hook);
            return Ok(f());
        }

        let gid = self.group.id();
        if thread_in_group(gid) {
            self.init.call_once(init_hook);
            push_group(gid);
            let r = f();
            pop_group();
            return Ok(r);
        }

        if self.is_closed() {
            return Err(Error::ResourceClosed);
        }

        let sender = {
            let guard = self.sender.lock().expect("actor sender lock poisoned");
            guard.clone()
        };
        let Some(sender) = sender else {
            return Err(Error::ResourceClosed);
        };

        let init = &self.init;
        // SAFETY net: `Once::call_once` only takes `&self`, so we can call
        // it from the submitted closure which borrows `init` for 'static —
        // instead we run it on the caller's side before submission, which
        // is equivalent for "exactly once" semantics and avoids lifetime
        // gymnastics around the boxed job.
        init.call_once(init_hook);

        let (result_tx, result_rx) = mpsc::sync_channel::<R>(0);
        let job: Job = Box::new(move || {
            push_group(gid);
            let r = f();
            pop_group();
            let _ = result_tx.send(r);
        });

        if sender.send(job).is_err() {
            return Err(Error::ResourceClosed);
        }

        result_rx.recv().map_err(|_| Error::ResourceClosed)
    }
}

impl Drop for Actor {
    fn drop(&mut self) {
        self.close();
    }
}

/// Convenience wrapper bundling an `Arc<Actor>` so `List`/`Table` can clone
/// cheaply while sharing one worker thread.
#[derive(Clone)]
pub struct SharedActor(Arc<Actor>);

impl SharedActor {
    pub fn new(group: Group) -> Self {
        Self(Arc::new(Actor::new(group)))
    }
}

impl std::ops::Deref for SharedActor {
    type Target = Actor;
    fn deref(&self) -> &Actor {
        &self.0
    }
}
