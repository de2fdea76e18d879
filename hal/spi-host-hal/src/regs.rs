//! SPI host register map
//!
//! Offsets and bit-field layout of one SPI host instance. The layout is
//! fixed by the hardware: two chip-select configuration registers, a
//! 24-bit command length and word-wide data FIFOs.

use tock_registers::register_bitfields;

/// Number of chip-select lines (and CONFIGOPTS registers) per instance
pub const NUM_CS: usize = 2;

/// Registers of one SPI host instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
    /// Interrupt state (write 1 to clear)
    IntrState,
    /// Interrupt enable
    IntrEnable,
    /// Interrupt test
    IntrTest,
    /// Alert test
    AlertTest,
    /// Control: enable, reset, watermarks
    Control,
    /// Status: queue depths and FIFO flags
    Status,
    /// Per chip-select configuration options
    ConfigOpts(u8),
    /// Chip-select ID used by the next command
    Csid,
    /// Command FIFO
    Command,
    /// Receive data FIFO
    RxData,
    /// Transmit data FIFO
    TxData,
    /// Error interrupt enable
    ErrorEnable,
    /// Error status (write 1 to clear)
    ErrorStatus,
    /// Event interrupt enable
    EventEnable,
}

impl Reg {
    /// Byte offset of the register from the instance base address
    pub const fn offset(self) -> usize {
        match self {
            Reg::IntrState => 0x00,
            Reg::IntrEnable => 0x04,
            Reg::IntrTest => 0x08,
            Reg::AlertTest => 0x0c,
            Reg::Control => 0x10,
            Reg::Status => 0x14,
            Reg::ConfigOpts(csid) => 0x18 + 4 * csid as usize,
            Reg::Csid => 0x18 + 4 * NUM_CS,
            Reg::Command => 0x1c + 4 * NUM_CS,
            Reg::RxData => 0x20 + 4 * NUM_CS,
            Reg::TxData => 0x24 + 4 * NUM_CS,
            Reg::ErrorEnable => 0x28 + 4 * NUM_CS,
            Reg::ErrorStatus => 0x2c + 4 * NUM_CS,
            Reg::EventEnable => 0x30 + 4 * NUM_CS,
        }
    }
}

register_bitfields![u32,
    // INTR_STATE, INTR_ENABLE and INTR_TEST
    pub INTR [
        ERROR OFFSET(0) NUMBITS(1) [],
        SPI_EVENT OFFSET(1) NUMBITS(1) []
    ],
    pub ALERT_TEST [
        FATAL_FAULT OFFSET(0) NUMBITS(1) []
    ],
    pub CONTROL [
        RX_WATERMARK OFFSET(0) NUMBITS(8) [],
        TX_WATERMARK OFFSET(8) NUMBITS(8) [],
        OUTPUT_EN OFFSET(29) NUMBITS(1) [],
        SW_RST OFFSET(30) NUMBITS(1) [],
        SPIEN OFFSET(31) NUMBITS(1) []
    ],
    pub STATUS [
        TXQD OFFSET(0) NUMBITS(8) [],
        RXQD OFFSET(8) NUMBITS(8) [],
        CMDQD OFFSET(16) NUMBITS(4) [],
        RXWM OFFSET(20) NUMBITS(1) [],
        BYTEORDER OFFSET(22) NUMBITS(1) [],
        RXSTALL OFFSET(23) NUMBITS(1) [],
        RXEMPTY OFFSET(24) NUMBITS(1) [],
        RXFULL OFFSET(25) NUMBITS(1) [],
        TXWM OFFSET(26) NUMBITS(1) [],
        TXSTALL OFFSET(27) NUMBITS(1) [],
        TXEMPTY OFFSET(28) NUMBITS(1) [],
        TXFULL OFFSET(29) NUMBITS(1) [],
        ACTIVE OFFSET(30) NUMBITS(1) [],
        READY OFFSET(31) NUMBITS(1) []
    ],
    pub CONFIGOPTS [
        CLKDIV OFFSET(0) NUMBITS(16) [],
        CSNIDLE OFFSET(16) NUMBITS(4) [],
        CSNTRAIL OFFSET(20) NUMBITS(4) [],
        CSNLEAD OFFSET(24) NUMBITS(4) [],
        FULLCYC OFFSET(29) NUMBITS(1) [],
        CPHA OFFSET(30) NUMBITS(1) [],
        CPOL OFFSET(31) NUMBITS(1) []
    ],
    pub COMMAND [
        LEN OFFSET(0) NUMBITS(24) [],
        CSAAT OFFSET(24) NUMBITS(1) [],
        SPEED OFFSET(25) NUMBITS(2) [
            Standard = 0,
            Dual = 1,
            Quad = 2
        ],
        DIRECTION OFFSET(27) NUMBITS(2) [
            Dummy = 0,
            RxOnly = 1,
            TxOnly = 2,
            Bidir = 3
        ]
    ],
    // Shared by ERROR_ENABLE and ERROR_STATUS (ACCESSINVAL is status only)
    pub ERROR [
        CMDBUSY OFFSET(0) NUMBITS(1) [],
        OVERFLOW OFFSET(1) NUMBITS(1) [],
        UNDERFLOW OFFSET(2) NUMBITS(1) [],
        CMDINVAL OFFSET(3) NUMBITS(1) [],
        CSIDINVAL OFFSET(4) NUMBITS(1) [],
        ACCESSINVAL OFFSET(5) NUMBITS(1) []
    ],
    pub EVENT_ENABLE [
        RXFULL OFFSET(0) NUMBITS(1) [],
        TXEMPTY OFFSET(1) NUMBITS(1) [],
        RXWM OFFSET(2) NUMBITS(1) [],
        TXWM OFFSET(3) NUMBITS(1) [],
        READY OFFSET(4) NUMBITS(1) [],
        IDLE OFFSET(5) NUMBITS(1) []
    ]
];

/// Raw register access for one SPI host instance
///
/// This is the only point where the driver touches hardware. Each call is
/// a single, atomic 32-bit access; reads have no side effects except on
/// the RX data FIFO.
pub trait SpiHostRegs {
    /// Read a register
    fn read(&self, reg: Reg) -> u32;

    /// Write a register
    fn write(&self, reg: Reg, value: u32);

    /// Byte-wide write (used for TXDATA byte pushes)
    ///
    /// Implementations that cannot issue narrow accesses fall back to a
    /// word write of the zero-extended byte.
    fn write_byte(&self, reg: Reg, value: u8) {
        self.write(reg, value as u32);
    }

    /// Read-modify-write a register
    fn modify<F>(&self, reg: Reg, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }
}

impl<T: SpiHostRegs + ?Sized> SpiHostRegs for &T {
    fn read(&self, reg: Reg) -> u32 {
        (**self).read(reg)
    }

    fn write(&self, reg: Reg, value: u32) {
        (**self).write(reg, value)
    }

    fn write_byte(&self, reg: Reg, value: u8) {
        (**self).write_byte(reg, value)
    }
}
