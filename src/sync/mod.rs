pub mod rwlock;
pub mod work_queue;

pub use rwlock::ReadWriteLock;
pub use work_queue::WorkQueue;
