//! # Cortex-M4 Port Layer
//!
//! SysTick configuration for ARM Cortex-M targets. SysTick fires at
//! `TICK_HZ` and its exception handler is expected to call
//! [`kernel::on_tick`](crate::kernel::on_tick) (or `on_tick` on whichever
//! `Scheduler` the firmware owns):
//!
//! ```ignore
//! #[exception]
//! fn SysTick() {
//!     tasker::kernel::on_tick();
//! }
//! ```
//!
//! Nothing else runs in interrupt context; dispatch happens in thread mode.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};

/// SysTick reload value for one tick at `TICK_HZ` from a `clock_hz` core
/// clock. SysTick counts `reload + 1` cycles per wrap and holds 24 bits.
pub const fn systick_reload(clock_hz: u32, tick_hz: u32) -> u32 {
    let reload = clock_hz / tick_hz - 1;
    if reload > 0x00FF_FFFF {
        0x00FF_FFFF
    } else {
        reload
    }
}

/// Configure SysTick to interrupt at `TICK_HZ` from the core clock.
pub fn configure_systick(syst: &mut SYST) {
    syst.set_reload(systick_reload(SYSTEM_CLOCK_HZ, TICK_HZ));
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Low-power idle between dispatcher passes. The next SysTick wakes the
/// core, so at worst one tick of latency is added.
#[inline]
pub fn idle() {
    cortex_m::asm::wfi();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_systick_reload() {
        assert_eq!(systick_reload(16_000_000, 1000), 15_999);
        assert_eq!(systick_reload(168_000_000, 1000), 167_999);
        // Clamped to the 24-bit counter
        assert_eq!(systick_reload(168_000_000, 1), 0x00FF_FFFF);
    }
}
