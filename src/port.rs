//! Platform services behind one seam.
//!
//! On the ESP-IDF target these map to FreeRTOS primitives. Elsewhere (host
//! tests and the demo binary) they degrade to bounded spin hints — good
//! enough for short test runs, never used on hardware.

#[cfg(target_os = "espidf")]
mod imp {
    /// Sleep one scheduler tick.
    pub fn sleep_tick() {
        unsafe {
            esp_idf_svc::sys::vTaskDelay(1);
        }
    }

    /// Sleep at least `ms` milliseconds.
    pub fn sleep_ms(ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    /// Offer the CPU to an equal-priority task.
    pub fn yield_now() {
        esp_idf_svc::hal::task::do_yield();
    }
}

#[cfg(not(target_os = "espidf"))]
mod imp {
    /// Spin budget standing in for one scheduler tick on the host.
    const SPINS_PER_TICK: usize = 1_000;

    pub fn sleep_tick() {
        for _ in 0..SPINS_PER_TICK {
            core::hint::spin_loop();
        }
    }

    pub fn sleep_ms(ms: u32) {
        for _ in 0..ms {
            sleep_tick();
        }
    }

    pub fn yield_now() {
        core::hint::spin_loop();
    }
}

pub use imp::{sleep_ms, sleep_tick, yield_now};
