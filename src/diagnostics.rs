//! Panic logging and runtime heap diagnostics.
//!
//! The panic hook logs the panic message before the control loop's
//! iteration boundary (or the default handler) deals with it.  Heap figures
//! are logged at the end of every cycle, after the per-cycle buffers have
//! been dropped.

use std::any::Any;

/// Heap figures from the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub free_bytes: u32,
    pub min_free_bytes: u32,
}

impl HeapStats {
    #[cfg(target_os = "espidf")]
    pub fn collect() -> Option<Self> {
        use esp_idf_svc::sys::*;
        // SAFETY: plain allocator statistics reads.
        let free_bytes = unsafe { esp_get_free_heap_size() };
        let min_free_bytes = unsafe { esp_get_minimum_free_heap_size() };
        Some(Self {
            free_bytes,
            min_free_bytes,
        })
    }

    /// The host allocator exposes no comparable figures.
    #[cfg(not(target_os = "espidf"))]
    pub fn collect() -> Option<Self> {
        None
    }
}

/// Log heap usage for the cycle that just finished.
pub fn log_heap(cycle: u64) {
    if let Some(heap) = HeapStats::collect() {
        log::debug!(
            "cycle {} end: heap free={}B min_free={}B",
            cycle,
            heap.free_bytes,
            heap.min_free_bytes
        );
    }
}

/// Extract the message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Install a panic hook that logs the panic reason and location.
///
/// Must be called once during init, after the logger is ready.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = panic_message(info.payload());
        match info.location() {
            Some(loc) => log::error!("PANIC at {}:{}: {}", loc.file(), loc.line(), reason),
            None => log::error!("PANIC: {}", reason),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_static_and_owned_messages() {
        let static_payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(static_payload.as_ref()), "boom");

        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned_payload.as_ref()), "owned boom");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }

    #[cfg(not(target_os = "espidf"))]
    #[test]
    fn host_has_no_heap_stats() {
        assert!(HeapStats::collect().is_none());
        log_heap(1);
    }
}
