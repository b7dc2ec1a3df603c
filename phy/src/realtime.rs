//! Worker Thread Priority
//!
//! Pipeline workers compete with the radio's sample clock, so they ask
//! for a real-time scheduling class. Getting it usually requires
//! elevated privileges; refusal is survivable and only warned about.

/// Try to move the calling thread into `SCHED_FIFO`. Returns whether
/// the request was granted.
#[cfg(target_os = "linux")]
pub fn set_realtime_priority() -> bool {
    unsafe {
        let param = libc::sched_param { sched_priority: 1 };
        libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param) == 0
    }
}

#[cfg(not(target_os = "linux"))]
pub fn set_realtime_priority() -> bool {
    false
}
