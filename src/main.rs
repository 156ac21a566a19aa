//! # Tasker Example Firmware
//!
//! Demonstrates the cooperative scheduler with four task bodies:
//!
//! | Task | Period | Status | Behavior |
//! |------|--------|--------|----------|
//! | `heartbeat` | 500 ms | Scheduled | Counts heartbeats |
//! | `sample_sensor` | 100 ms | ImmediateStart | Polls a (simulated) sensor |
//! | `self_test` | 10 ms | OneTime | Runs once at boot, then leaves |
//! | `supervisor` | 2 s | Scheduled | Pauses/resumes sampling, slows itself down |
//!
//! SysTick runs at `TICK_HZ` and only advances the tick counter; every
//! body runs in thread mode from the dispatcher loop, which sleeps with
//! `WFI` whenever a pass had nothing to do.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::{entry, exception};
use panic_halt as _;

use tasker::arch::cortex_m4;
use tasker::kernel;
use tasker::TaskStatus;

static HEARTBEATS: AtomicU32 = AtomicU32::new(0);
static SAMPLES: AtomicU32 = AtomicU32::new(0);
static SUPERVISIONS: AtomicU32 = AtomicU32::new(0);

// ---------------------------------------------------------------------------
// Task bodies
// ---------------------------------------------------------------------------

fn heartbeat() {
    HEARTBEATS.fetch_add(1, Ordering::Relaxed);
}

/// Short, non-blocking poll. A real driver would kick off a conversion
/// here and read it back on the next run instead of waiting for it.
fn sample_sensor() {
    let mut acc: u32 = 0;
    for i in 0..200u32 {
        acc = acc.wrapping_add(i);
    }
    SAMPLES.fetch_add(acc & 1, Ordering::Relaxed);
}

/// One-shot boot check. Uses the busy-wait helper, which stalls every
/// other task for 2 ms; acceptable once at boot.
fn self_test() {
    kernel::delay_ms(2);
}

/// Every other run pauses sampling; after a few runs it stretches its own
/// period, which takes effect on its next deadline.
fn supervisor() {
    let runs = SUPERVISIONS.fetch_add(1, Ordering::Relaxed) + 1;

    if let Some(sampler) = kernel::find(sample_sensor) {
        let result = match kernel::task_status(sampler) {
            Ok(TaskStatus::Paused) => kernel::resume_task(sampler),
            Ok(_) => kernel::pause_task(sampler),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            log::warn!("supervisor: {}", e);
        }
    }

    if runs == 4 {
        if let Some(me) = kernel::find(supervisor) {
            if let Err(e) = kernel::modify_task(me, 5_000, None) {
                log::warn!("supervisor: {}", e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Interrupts
// ---------------------------------------------------------------------------

#[exception]
fn SysTick() {
    kernel::on_tick();
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Firmware entry point. Registers the tasks, starts SysTick and runs the
/// dispatcher. Does not return.
#[entry]
fn main() -> ! {
    let mut cp = cortex_m::Peripherals::take().unwrap();

    kernel::init();

    kernel::add_task(heartbeat, 500, TaskStatus::Scheduled).expect("Failed to add heartbeat");
    kernel::add_task(sample_sensor, 100, TaskStatus::ImmediateStart)
        .expect("Failed to add sample_sensor");
    kernel::add_task(self_test, 10, TaskStatus::OneTime).expect("Failed to add self_test");
    kernel::add_task(supervisor, 2_000, TaskStatus::Scheduled).expect("Failed to add supervisor");

    cortex_m4::configure_systick(&mut cp.SYST);

    kernel::run_with_idle(cortex_m4::idle)
}
