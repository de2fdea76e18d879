//! Wait primitive
//!
//! Every polling loop in the driver and SDK goes through [`Wait`], so the
//! target can sleep between checks and tests can advance a simulated
//! peripheral instead.

/// A way to pass time while a hardware condition settles
pub trait Wait {
    /// Pause once (one polling interval)
    fn wait(&mut self);

    /// Pause until `done` returns true
    fn wait_until<F>(&mut self, mut done: F)
    where
        F: FnMut() -> bool,
    {
        while !done() {
            self.wait();
        }
    }
}

impl<W: Wait + ?Sized> Wait for &mut W {
    fn wait(&mut self) {
        (**self).wait()
    }
}

/// Busy-wait with a spin-loop hint
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Wait for Spin {
    #[inline]
    fn wait(&mut self) {
        core::hint::spin_loop();
    }
}

/// Sleep until the next interrupt
///
/// Only correct when the awaited condition raises an interrupt (or when
/// a periodic interrupt is running), otherwise the hart sleeps forever.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct Wfi;

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
impl Wait for Wfi {
    #[inline]
    #[allow(unsafe_code, unused_unsafe)]
    fn wait(&mut self) {
        // SAFETY: wfi only stalls the hart until an interrupt is pending
        unsafe { riscv::asm::wfi() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    impl Wait for Counter {
        fn wait(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_wait_until_counts_polls() {
        let mut w = Counter(0);
        let mut remaining = 3;
        w.wait_until(|| {
            if remaining == 0 {
                true
            } else {
                remaining -= 1;
                false
            }
        });
        assert_eq!(w.0, 3);
    }

    #[test]
    fn test_wait_until_already_true() {
        let mut w = Counter(0);
        w.wait_until(|| true);
        assert_eq!(w.0, 0);
    }
}
