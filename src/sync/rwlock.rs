use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::thread::{self, ThreadId};

use log::trace;
use parking_lot::{Condvar, Mutex};

/// Lock occupancy. Reading counts active readers; Writing remembers the
/// owning thread so a foreign unlock can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockState {
    Dormant,
    Reading(u32),
    Writing(ThreadId),
}

/// A multi-reader / single-writer lock owning the value it protects.
///
/// Any number of readers may hold the lock at once so long as no writer
/// does. The writer is exclusive and its thread identity is recorded;
/// releasing the write half from another thread is a programmer error and
/// panics, as does releasing the read half when no reader holds it.
///
/// Writers may starve while readers churn; no fairness is promised.
pub struct ReadWriteLock<T> {
    state: Mutex<LockState>,
    cond: Condvar,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for ReadWriteLock<T> {}
unsafe impl<T: Send + Sync> Sync for ReadWriteLock<T> {}

impl<T> ReadWriteLock<T> {
    pub fn new(value: T) -> Self {
        ReadWriteLock {
            state: Mutex::new(LockState::Dormant),
            cond: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    pub fn read(&self) -> ReadGuard<'_, T> {
        self.lock_read();
        ReadGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    pub fn write(&self) -> WriteGuard<'_, T> {
        self.lock_write();
        WriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Blocks while a writer is active, then joins the reader count.
    pub fn lock_read(&self) {
        let mut state = self.state.lock();
        while matches!(*state, LockState::Writing(_)) {
            self.cond.wait(&mut state);
        }
        *state = match *state {
            LockState::Dormant => LockState::Reading(1),
            LockState::Reading(n) => LockState::Reading(n + 1),
            LockState::Writing(_) => unreachable!("woke while a writer is active"),
        };
        trace!("read lock acquired: {:?}", *state);
    }

    /// Leaves the reader count; the last reader out wakes every waiter.
    ///
    /// Panics if no reader currently holds the lock.
    pub fn unlock_read(&self) {
        let mut state = self.state.lock();
        *state = match *state {
            LockState::Reading(1) => {
                self.cond.notify_all();
                LockState::Dormant
            }
            LockState::Reading(n) => LockState::Reading(n - 1),
            other => panic!("read unlock without a matching read lock (state {:?})", other),
        };
        trace!("read lock released: {:?}", *state);
    }

    /// Blocks until the lock is dormant, then claims it for this thread.
    pub fn lock_write(&self) {
        let mut state = self.state.lock();
        while *state != LockState::Dormant {
            self.cond.wait(&mut state);
        }
        *state = LockState::Writing(thread::current().id());
        trace!("write lock acquired by {:?}", thread::current().id());
    }

    /// Releases the write half and wakes every waiter.
    ///
    /// Panics unless the calling thread is the one that locked it. The
    /// wake-up happens inside the critical section so a waiting writer
    /// cannot be overtaken by one that never slept.
    pub fn unlock_write(&self) {
        let mut state = self.state.lock();
        match *state {
            LockState::Writing(owner) if owner == thread::current().id() => {
                *state = LockState::Dormant;
                self.cond.notify_all();
            }
            other => panic!(
                "write unlock by a thread that does not hold the lock (state {:?})",
                other
            ),
        }
        trace!("write lock released");
    }
}

pub struct ReadGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock_read();
    }
}

pub struct WriteGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock_write();
    }
}
