//! Simulated SPI host for host-side tests
//!
//! [`SimSpiHost`] models the peripheral at word granularity: every
//! [`tick`](SimSpiHost::tick) moves at most one data word on the active
//! command. The FIFOs, the command queue, the write-1-to-clear registers
//! and the hardware error conditions behave like the real block closely
//! enough to run the transaction engine end to end.
//!
//! Simplifications:
//! - byte writes to TXDATA push one word holding the byte
//! - dummy segments consume eight cycles per tick
//! - received data comes from a scripted MISO queue, then from the
//!   transmitted word when loopback is on, then zero

use core::cell::RefCell;
use std::collections::VecDeque;
use std::vec::Vec;

use tock_registers::LocalRegisterCopy;

use crate::regs::{Reg, SpiHostRegs, COMMAND, CONTROL, ERROR, EVENT_ENABLE, INTR, STATUS};

/// Sizing of the simulated block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimParams {
    /// Number of chip-select lines
    pub num_cs: usize,
    /// TX FIFO depth in words
    pub tx_depth: usize,
    /// RX FIFO depth in words
    pub rx_depth: usize,
    /// Command queue depth
    pub cmd_depth: usize,
    /// Report big-endian byte order in STATUS.BYTEORDER
    pub big_endian: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            num_cs: 2,
            tx_depth: 72,
            rx_depth: 64,
            cmd_depth: 4,
            big_endian: false,
        }
    }
}

/// One accepted command as the simulation decoded it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCommand {
    /// Raw COMMAND word
    pub raw: u32,
    /// CSID latched when the command was written
    pub csid: u32,
    /// Length in bytes (cycles for dummy segments)
    pub len: u32,
    /// Keep chip select asserted after the command
    pub csaat: bool,
    /// Speed code
    pub speed: u32,
    /// Direction code
    pub direction: u32,
}

impl SimCommand {
    fn uses_tx(&self) -> bool {
        self.direction == 2 || self.direction == 3
    }

    fn uses_rx(&self) -> bool {
        self.direction == 1 || self.direction == 3
    }
}

#[derive(Debug, Clone, Copy)]
struct Active {
    cmd: SimCommand,
    remaining: u32,
}

struct SimState {
    params: SimParams,
    control: u32,
    configopts: Vec<u32>,
    csid: u32,
    intr_enable: u32,
    intr_latched: u32,
    error_enable: u32,
    error_status: u32,
    event_enable: u32,
    tx: VecDeque<u32>,
    rx: VecDeque<u32>,
    cmds: VecDeque<SimCommand>,
    current: Option<Active>,
    tx_stall: bool,
    rx_stall: bool,
    miso: VecDeque<u32>,
    loopback: bool,
    sent: Vec<u32>,
    accepted: Vec<SimCommand>,
    writes: Vec<(Reg, u32)>,
    alerts: usize,
    resets: usize,
}

impl SimState {
    fn new(params: SimParams) -> Self {
        let mut configopts = Vec::new();
        configopts.resize(params.num_cs, 0);
        Self {
            params,
            control: 0,
            configopts,
            csid: 0,
            intr_enable: 0,
            intr_latched: 0,
            error_enable: 0,
            error_status: 0,
            event_enable: 0,
            tx: VecDeque::new(),
            rx: VecDeque::new(),
            cmds: VecDeque::new(),
            current: None,
            tx_stall: false,
            rx_stall: false,
            miso: VecDeque::new(),
            loopback: false,
            sent: Vec::new(),
            accepted: Vec::new(),
            writes: Vec::new(),
            alerts: 0,
            resets: 0,
        }
    }

    fn active(&self) -> bool {
        self.current.is_some() || !self.cmds.is_empty()
    }

    fn status(&self) -> u32 {
        let ctrl: LocalRegisterCopy<u32, CONTROL::Register> = LocalRegisterCopy::new(self.control);
        let tx_wm = ctrl.read(CONTROL::TX_WATERMARK) as usize;
        let rx_wm = ctrl.read(CONTROL::RX_WATERMARK) as usize;
        let p = &self.params;

        let mut s: LocalRegisterCopy<u32, STATUS::Register> = LocalRegisterCopy::new(0);
        s.modify(
            STATUS::TXQD.val(self.tx.len() as u32)
                + STATUS::RXQD.val(self.rx.len() as u32)
                + STATUS::CMDQD.val(self.cmds.len() as u32)
                + STATUS::RXWM.val((self.rx.len() >= rx_wm) as u32)
                + STATUS::BYTEORDER.val(p.big_endian as u32)
                + STATUS::RXSTALL.val(self.rx_stall as u32)
                + STATUS::RXEMPTY.val(self.rx.is_empty() as u32)
                + STATUS::RXFULL.val((self.rx.len() >= p.rx_depth) as u32)
                + STATUS::TXWM.val((self.tx.len() < tx_wm) as u32)
                + STATUS::TXSTALL.val(self.tx_stall as u32)
                + STATUS::TXEMPTY.val(self.tx.is_empty() as u32)
                + STATUS::TXFULL.val((self.tx.len() >= p.tx_depth) as u32)
                + STATUS::ACTIVE.val(self.active() as u32)
                + STATUS::READY.val((self.cmds.len() < p.cmd_depth) as u32),
        );
        s.get()
    }

    /// Event conditions currently asserted, in EVENT_ENABLE layout
    fn event_levels(&self) -> u32 {
        let s: LocalRegisterCopy<u32, STATUS::Register> = LocalRegisterCopy::new(self.status());
        let mut e: LocalRegisterCopy<u32, EVENT_ENABLE::Register> = LocalRegisterCopy::new(0);
        e.modify(
            EVENT_ENABLE::RXFULL.val(s.is_set(STATUS::RXFULL) as u32)
                + EVENT_ENABLE::TXEMPTY.val(s.is_set(STATUS::TXEMPTY) as u32)
                + EVENT_ENABLE::RXWM.val(s.is_set(STATUS::RXWM) as u32)
                + EVENT_ENABLE::TXWM.val(s.is_set(STATUS::TXWM) as u32)
                + EVENT_ENABLE::READY.val(s.is_set(STATUS::READY) as u32)
                + EVENT_ENABLE::IDLE.val(!s.is_set(STATUS::ACTIVE) as u32),
        );
        e.get()
    }

    fn intr_state(&self) -> u32 {
        let mut v = self.intr_latched;
        if self.error_status & self.error_enable != 0 {
            v |= INTR::ERROR::SET.value;
        }
        if self.event_levels() & self.event_enable != 0 {
            v |= INTR::SPI_EVENT::SET.value;
        }
        v
    }

    fn raise(&mut self, bit: u32) {
        self.error_status |= bit;
    }

    fn soft_reset(&mut self) {
        self.tx.clear();
        self.rx.clear();
        self.cmds.clear();
        self.current = None;
        self.tx_stall = false;
        self.rx_stall = false;
        self.resets += 1;
    }

    fn push_command(&mut self, raw: u32) {
        if self.cmds.len() >= self.params.cmd_depth {
            self.raise(ERROR::CMDBUSY::SET.value);
            return;
        }
        let word: LocalRegisterCopy<u32, COMMAND::Register> = LocalRegisterCopy::new(raw);
        let cmd = SimCommand {
            raw,
            csid: self.csid,
            len: word.read(COMMAND::LEN) + 1,
            csaat: word.is_set(COMMAND::CSAAT),
            speed: word.read(COMMAND::SPEED),
            direction: word.read(COMMAND::DIRECTION),
        };
        if cmd.speed == 3 || (cmd.direction == 3 && cmd.speed != 0) {
            self.raise(ERROR::CMDINVAL::SET.value);
            return;
        }
        if cmd.csid as usize >= self.params.num_cs {
            self.raise(ERROR::CSIDINVAL::SET.value);
            return;
        }
        self.accepted.push(cmd);
        self.cmds.push_back(cmd);
    }

    fn step(&mut self) -> bool {
        let ctrl: LocalRegisterCopy<u32, CONTROL::Register> = LocalRegisterCopy::new(self.control);
        if !ctrl.is_set(CONTROL::SPIEN) || ctrl.is_set(CONTROL::SW_RST) {
            return false;
        }
        if self.current.is_none() {
            self.current = self.cmds.pop_front().map(|cmd| Active {
                cmd,
                remaining: cmd.len,
            });
        }
        let Some(mut active) = self.current else {
            return false;
        };

        let cmd = active.cmd;
        if cmd.uses_tx() && self.tx.is_empty() {
            self.tx_stall = true;
            return false;
        }
        if cmd.uses_rx() && self.rx.len() >= self.params.rx_depth {
            self.rx_stall = true;
            return false;
        }
        self.tx_stall = false;
        self.rx_stall = false;

        let mosi = if cmd.uses_tx() { self.tx.pop_front() } else { None };
        if let Some(word) = mosi {
            self.sent.push(word);
        }
        if cmd.uses_rx() {
            let word = self
                .miso
                .pop_front()
                .or(if self.loopback { mosi } else { None })
                .unwrap_or(0);
            self.rx.push_back(word);
        }

        let per_tick = if cmd.direction == 0 { 8 } else { 4 };
        active.remaining = active.remaining.saturating_sub(per_tick);
        self.current = if active.remaining == 0 { None } else { Some(active) };
        true
    }
}

/// Simulated SPI host peripheral
pub struct SimSpiHost {
    state: RefCell<SimState>,
}

impl SimSpiHost {
    /// Simulated block with the default sizing
    pub fn new() -> Self {
        Self::with_params(SimParams::default())
    }

    /// Simulated block with custom sizing
    pub fn with_params(params: SimParams) -> Self {
        Self {
            state: RefCell::new(SimState::new(params)),
        }
    }

    /// Block sizing
    pub fn params(&self) -> SimParams {
        self.state.borrow().params
    }

    /// Advance the bus by one word; returns false when nothing moved
    pub fn tick(&self) -> bool {
        self.state.borrow_mut().step()
    }

    /// Tick until the bus stops making progress, at most `limit` times
    pub fn run(&self, limit: usize) -> usize {
        let mut n = 0;
        while n < limit && self.tick() {
            n += 1;
        }
        n
    }

    /// Set bits in ERROR_STATUS as if the hardware had detected them
    pub fn inject_error(&self, bits: u32) {
        self.state.borrow_mut().raise(bits);
    }

    /// Queue words to be returned on MISO
    pub fn push_miso(&self, words: &[u32]) {
        self.state.borrow_mut().miso.extend(words.iter().copied());
    }

    /// Echo transmitted words back on bidirectional segments
    pub fn set_loopback(&self, on: bool) {
        self.state.borrow_mut().loopback = on;
    }

    /// Words shifted out so far
    pub fn sent(&self) -> Vec<u32> {
        self.state.borrow().sent.clone()
    }

    /// Commands accepted into the queue so far
    pub fn commands(&self) -> Vec<SimCommand> {
        self.state.borrow().accepted.clone()
    }

    /// Number of writes issued to `reg`
    pub fn writes_to(&self, reg: Reg) -> usize {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .count()
    }

    /// Number of fatal alerts triggered through ALERT_TEST
    pub fn alerts(&self) -> usize {
        self.state.borrow().alerts
    }

    /// Number of software resets seen
    pub fn resets(&self) -> usize {
        self.state.borrow().resets
    }

    /// Words waiting in the TX FIFO
    pub fn tx_level(&self) -> usize {
        self.state.borrow().tx.len()
    }

    /// Words waiting in the RX FIFO
    pub fn rx_level(&self) -> usize {
        self.state.borrow().rx.len()
    }

    /// Interrupt line: any enabled interrupt pending
    pub fn irq_pending(&self) -> bool {
        let s = self.state.borrow();
        s.intr_state() & s.intr_enable != 0
    }
}

impl Default for SimSpiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiHostRegs for SimSpiHost {
    fn read(&self, reg: Reg) -> u32 {
        let mut s = self.state.borrow_mut();
        match reg {
            Reg::IntrState => s.intr_state(),
            Reg::IntrEnable => s.intr_enable,
            Reg::Control => s.control,
            Reg::Status => s.status(),
            Reg::ConfigOpts(csid) => s.configopts.get(csid as usize).copied().unwrap_or(0),
            Reg::Csid => s.csid,
            Reg::RxData => match s.rx.pop_front() {
                Some(word) => word,
                None => {
                    s.raise(ERROR::UNDERFLOW::SET.value);
                    0
                }
            },
            Reg::ErrorEnable => s.error_enable,
            Reg::ErrorStatus => s.error_status,
            Reg::EventEnable => s.event_enable,
            Reg::IntrTest | Reg::AlertTest | Reg::Command | Reg::TxData => 0,
        }
    }

    fn write(&self, reg: Reg, value: u32) {
        let mut s = self.state.borrow_mut();
        s.writes.push((reg, value));
        match reg {
            Reg::IntrState => s.intr_latched &= !value,
            Reg::IntrEnable => s.intr_enable = value,
            Reg::IntrTest => s.intr_latched |= value,
            Reg::AlertTest => {
                if value & 1 != 0 {
                    s.alerts += 1;
                }
            }
            Reg::Control => {
                let ctrl: LocalRegisterCopy<u32, CONTROL::Register> = LocalRegisterCopy::new(value);
                if ctrl.is_set(CONTROL::SW_RST) {
                    s.soft_reset();
                }
                s.control = value;
            }
            Reg::ConfigOpts(csid) => {
                if let Some(slot) = s.configopts.get_mut(csid as usize) {
                    *slot = value;
                }
            }
            Reg::Csid => s.csid = value,
            Reg::Command => s.push_command(value),
            Reg::TxData => {
                if s.tx.len() >= s.params.tx_depth {
                    s.raise(ERROR::OVERFLOW::SET.value);
                } else {
                    s.tx.push_back(value);
                }
            }
            Reg::ErrorEnable => s.error_enable = value,
            Reg::ErrorStatus => s.error_status &= !value,
            Reg::EventEnable => s.event_enable = value,
            Reg::Status | Reg::RxData => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> SimSpiHost {
        let sim = SimSpiHost::new();
        sim.write(Reg::Control, CONTROL::SPIEN::SET.value);
        sim
    }

    fn tx_cmd(len: u32) -> u32 {
        (COMMAND::LEN.val(len - 1) + COMMAND::DIRECTION::TxOnly).value
    }

    #[test]
    fn test_tx_command_shifts_words() {
        let sim = enabled();
        sim.write(Reg::TxData, 0xAABB_CCDD);
        sim.write(Reg::TxData, 0x1122_3344);
        sim.write(Reg::Command, tx_cmd(8));

        assert_eq!(sim.run(100), 2);
        assert_eq!(sim.sent(), [0xAABB_CCDD, 0x1122_3344]);
        let status: LocalRegisterCopy<u32, STATUS::Register> =
            LocalRegisterCopy::new(sim.read(Reg::Status));
        assert!(!status.is_set(STATUS::ACTIVE));
        assert!(status.is_set(STATUS::TXEMPTY));
    }

    #[test]
    fn test_tx_stall_when_fifo_empty() {
        let sim = enabled();
        sim.write(Reg::Command, tx_cmd(4));
        assert!(!sim.tick());
        let status: LocalRegisterCopy<u32, STATUS::Register> =
            LocalRegisterCopy::new(sim.read(Reg::Status));
        assert!(status.is_set(STATUS::TXSTALL));
        assert!(status.is_set(STATUS::ACTIVE));
    }

    #[test]
    fn test_rx_underflow_sets_error() {
        let sim = enabled();
        assert_eq!(sim.read(Reg::RxData), 0);
        assert_eq!(sim.read(Reg::ErrorStatus), ERROR::UNDERFLOW::SET.value);
        sim.write(Reg::ErrorStatus, ERROR::UNDERFLOW::SET.value);
        assert_eq!(sim.read(Reg::ErrorStatus), 0);
    }

    #[test]
    fn test_invalid_command_rejected() {
        let sim = enabled();
        let bad = (COMMAND::LEN.val(3) + COMMAND::DIRECTION::Bidir + COMMAND::SPEED::Quad).value;
        sim.write(Reg::Command, bad);
        assert!(sim.commands().is_empty());
        assert_eq!(sim.read(Reg::ErrorStatus), ERROR::CMDINVAL::SET.value);
    }

    #[test]
    fn test_command_queue_overflow() {
        let sim = SimSpiHost::new();
        for _ in 0..5 {
            sim.write(Reg::Command, tx_cmd(4));
        }
        assert_eq!(sim.commands().len(), 4);
        assert_eq!(sim.read(Reg::ErrorStatus), ERROR::CMDBUSY::SET.value);
    }

    #[test]
    fn test_error_raises_enabled_interrupt() {
        let sim = SimSpiHost::new();
        sim.write(Reg::ErrorEnable, 0x1f);
        sim.write(Reg::IntrEnable, INTR::ERROR::SET.value);
        assert!(!sim.irq_pending());
        sim.inject_error(ERROR::OVERFLOW::SET.value);
        assert!(sim.irq_pending());
    }

    #[test]
    fn test_loopback_bidir() {
        let sim = enabled();
        sim.set_loopback(true);
        sim.write(Reg::TxData, 0xCAFE_F00D);
        sim.write(
            Reg::Command,
            (COMMAND::LEN.val(3) + COMMAND::DIRECTION::Bidir).value,
        );
        sim.run(10);
        assert_eq!(sim.read(Reg::RxData), 0xCAFE_F00D);
    }

    #[test]
    fn test_sw_reset_clears_fifos() {
        let sim = enabled();
        sim.write(Reg::TxData, 1);
        sim.write(Reg::Command, tx_cmd(64));
        sim.write(Reg::Control, (CONTROL::SPIEN::SET + CONTROL::SW_RST::SET).value);
        assert_eq!(sim.tx_level(), 0);
        assert_eq!(sim.resets(), 1);
        assert!(!sim.tick());
    }
}
