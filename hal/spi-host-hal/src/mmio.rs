//! Memory-mapped register access

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

use crate::regs::{
    Reg, SpiHostRegs, ALERT_TEST, COMMAND, CONFIGOPTS, CONTROL, ERROR, EVENT_ENABLE, INTR,
    NUM_CS, STATUS,
};

register_structs! {
    // Register block of one SPI host instance
    pub SpiHostRegisterBlock {
        (0x00 => intr_state: ReadWrite<u32, INTR::Register>),
        (0x04 => intr_enable: ReadWrite<u32, INTR::Register>),
        (0x08 => intr_test: WriteOnly<u32, INTR::Register>),
        (0x0c => alert_test: WriteOnly<u32, ALERT_TEST::Register>),
        (0x10 => control: ReadWrite<u32, CONTROL::Register>),
        (0x14 => status: ReadOnly<u32, STATUS::Register>),
        (0x18 => configopts: [ReadWrite<u32, CONFIGOPTS::Register>; NUM_CS]),
        (0x20 => csid: ReadWrite<u32>),
        (0x24 => command: WriteOnly<u32, COMMAND::Register>),
        (0x28 => rxdata: ReadOnly<u32>),
        (0x2c => txdata: WriteOnly<u32>),
        (0x30 => error_enable: ReadWrite<u32, ERROR::Register>),
        (0x34 => error_status: ReadWrite<u32, ERROR::Register>),
        (0x38 => event_enable: ReadWrite<u32, EVENT_ENABLE::Register>),
        (0x3c => @END),
    }
}

/// SPI host behind a fixed base address
///
/// Write-only registers read back as zero; writes to read-only registers
/// are dropped.
pub struct MmioSpiHost {
    ptr: *const SpiHostRegisterBlock,
}

// The block is only reached through volatile accesses.
#[allow(unsafe_code)]
unsafe impl Send for MmioSpiHost {}

impl MmioSpiHost {
    /// Bind to the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the address of an SPI host register block that stays
    /// mapped for the lifetime of the value, and no other owner may issue
    /// conflicting accesses to it.
    #[allow(unsafe_code)]
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            ptr: base as *const SpiHostRegisterBlock,
        }
    }

    /// Base address of the block
    pub fn base(&self) -> usize {
        self.ptr as usize
    }

    #[allow(unsafe_code)]
    fn block(&self) -> &SpiHostRegisterBlock {
        // SAFETY: guaranteed by the contract of `new`
        unsafe { &*self.ptr }
    }
}

impl SpiHostRegs for MmioSpiHost {
    fn read(&self, reg: Reg) -> u32 {
        let b = self.block();
        match reg {
            Reg::IntrState => b.intr_state.get(),
            Reg::IntrEnable => b.intr_enable.get(),
            Reg::Control => b.control.get(),
            Reg::Status => b.status.get(),
            Reg::ConfigOpts(csid) => b
                .configopts
                .get(csid as usize)
                .map(|r| r.get())
                .unwrap_or(0),
            Reg::Csid => b.csid.get(),
            Reg::RxData => b.rxdata.get(),
            Reg::ErrorEnable => b.error_enable.get(),
            Reg::ErrorStatus => b.error_status.get(),
            Reg::EventEnable => b.event_enable.get(),
            Reg::IntrTest | Reg::AlertTest | Reg::Command | Reg::TxData => 0,
        }
    }

    fn write(&self, reg: Reg, value: u32) {
        let b = self.block();
        match reg {
            Reg::IntrState => b.intr_state.set(value),
            Reg::IntrEnable => b.intr_enable.set(value),
            Reg::IntrTest => b.intr_test.set(value),
            Reg::AlertTest => b.alert_test.set(value),
            Reg::Control => b.control.set(value),
            Reg::ConfigOpts(csid) => {
                if let Some(r) = b.configopts.get(csid as usize) {
                    r.set(value);
                }
            }
            Reg::Csid => b.csid.set(value),
            Reg::Command => b.command.set(value),
            Reg::TxData => b.txdata.set(value),
            Reg::ErrorEnable => b.error_enable.set(value),
            Reg::ErrorStatus => b.error_status.set(value),
            Reg::EventEnable => b.event_enable.set(value),
            Reg::Status | Reg::RxData => {}
        }
    }

    #[allow(unsafe_code)]
    fn write_byte(&self, reg: Reg, value: u8) {
        match reg {
            Reg::TxData => {
                let addr = self.base() + reg.offset();
                // SAFETY: TXDATA accepts narrow writes and lies inside the
                // block guaranteed by `new`
                unsafe { core::ptr::write_volatile(addr as *mut u8, value) };
            }
            _ => self.write(reg, value as u32),
        }
    }
}
