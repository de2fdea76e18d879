//! Simulated SoC for engine tests

use spi_host_core::config::{BoardConfig, SdkConfig};
use spi_host_core::{PeripheralId, SlaveDescriptor};
use spi_host_hal::mock::SimSpiHost;
use spi_host_hal::Wait;

use crate::handle::Spi;
use crate::sdk::SpiSdk;
use crate::sync::{MockState, SharedState};

pub type SimSdk = SpiSdk<&'static SimSpiHost>;

pub const SYS_CLK: u32 = 100_000_000;

pub fn leak(words: &[u32]) -> &'static mut [u32] {
    Box::leak(words.to_vec().into_boxed_slice())
}

pub fn zeroed(words: usize) -> &'static mut [u32] {
    Box::leak(vec![0u32; words].into_boxed_slice())
}

/// Three simulated hosts and an engine over them
pub fn soc() -> (SimSdk, [&'static SimSpiHost; 3]) {
    soc_with(&BoardConfig {
        sdk: SdkConfig::new(SYS_CLK),
        ..BoardConfig::default()
    })
}

/// Like [`soc`], with board parameters that may differ from the hardware
pub fn soc_with(board: &BoardConfig) -> (SimSdk, [&'static SimSpiHost; 3]) {
    let sims = [(); 3].map(|_| -> &'static SimSpiHost { Box::leak(Box::new(SimSpiHost::new())) });
    let sdk = SpiSdk::new(sims, board).unwrap();
    (sdk, sims)
}

/// Engine with peripheral `id` initialized for a 10 MHz slave on CS 0
pub fn ready(id: PeripheralId) -> (SimSdk, &'static SimSpiHost, Spi) {
    let (mut sdk, sims) = soc();
    let spi = sdk.init(id, SlaveDescriptor::new(0, 10_000_000)).unwrap();
    (sdk, sims[id.index()], spi)
}

/// Run the bus and the interrupt handler until `id` leaves Busy
pub fn pump(sdk: &mut SimSdk, sim: &SimSpiHost, id: PeripheralId) -> usize {
    for step in 0..100_000 {
        if sim.irq_pending() {
            sdk.handle_irq(id);
        }
        if !sdk.peripheral(id).state().is_busy() {
            return step;
        }
        sim.tick();
    }
    panic!("transaction did not finish");
}

/// Wait primitive that plays the role of the hardware and the interrupt
pub struct Pump<'a> {
    pub shared: &'a MockState<SimSdk>,
    pub sim: &'static SimSpiHost,
    pub id: PeripheralId,
    pub steps: usize,
    /// Inject these error bits instead of ticking at step `.0`
    pub fault: Option<(usize, u32)>,
}

impl<'a> Pump<'a> {
    pub fn new(shared: &'a MockState<SimSdk>, sim: &'static SimSpiHost, id: PeripheralId) -> Self {
        Self {
            shared,
            sim,
            id,
            steps: 0,
            fault: None,
        }
    }
}

impl Wait for Pump<'_> {
    fn wait(&mut self) {
        self.steps += 1;
        assert!(self.steps < 100_000, "transaction did not finish");
        match self.fault {
            Some((at, bits)) if at == self.steps => self.sim.inject_error(bits),
            _ => {
                self.sim.tick();
            }
        }
        if self.sim.irq_pending() {
            let id = self.id;
            self.shared.with_mut(|sdk| sdk.handle_irq(id));
        }
    }
}
