//! Control-bundle register map of the step accelerator.
//!
//! Layout (32-bit words, byte offsets):
//! - 0x00 CTRL, 0x04 GIE, 0x08 IER, 0x0C ISR
//! - 0x10.. one input port every 8 bytes, in [`InputPort::ALL`] order
//! - 0x80.. one output port every 16 bytes: data at +0, valid flag at +4
//!
//! Floats travel as raw IEEE-754 bit patterns.

pub const CTRL: u32 = 0x00;
pub const GIE: u32 = 0x04;
pub const IER: u32 = 0x08;
pub const ISR: u32 = 0x0C;

pub const AP_START: u32 = 1 << 0;
/// Clear-on-read
pub const AP_DONE: u32 = 1 << 1;
pub const AP_IDLE: u32 = 1 << 2;
pub const AP_READY: u32 = 1 << 3;

pub const INPUT_BASE: u32 = 0x10;
pub const INPUT_STRIDE: u32 = 0x08;
pub const INPUT_COUNT: usize = 14;

pub const OUTPUT_BASE: u32 = INPUT_BASE + INPUT_STRIDE * INPUT_COUNT as u32;
pub const OUTPUT_STRIDE: u32 = 0x10;
pub const OUTPUT_COUNT: usize = 5;

/// One past the last mapped byte.
pub const SPAN: u32 = OUTPUT_BASE + OUTPUT_STRIDE * OUTPUT_COUNT as u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputPort {
    VIn,
    PscExIn,
    PscInIn,
    TRefLeftIn,
    IE,
    Dt,
    EL,
    VTh,
    VReset,
    TauM,
    TauEx,
    TauIn,
    CM,
    TRef,
}

impl InputPort {
    pub const ALL: [InputPort; INPUT_COUNT] = [
        InputPort::VIn,
        InputPort::PscExIn,
        InputPort::PscInIn,
        InputPort::TRefLeftIn,
        InputPort::IE,
        InputPort::Dt,
        InputPort::EL,
        InputPort::VTh,
        InputPort::VReset,
        InputPort::TauM,
        InputPort::TauEx,
        InputPort::TauIn,
        InputPort::CM,
        InputPort::TRef,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn offset(self) -> u32 {
        INPUT_BASE + INPUT_STRIDE * self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            InputPort::VIn => "V_in",
            InputPort::PscExIn => "psc_ex_in",
            InputPort::PscInIn => "psc_in_in",
            InputPort::TRefLeftIn => "t_ref_left_in",
            InputPort::IE => "I_e",
            InputPort::Dt => "dt",
            InputPort::EL => "E_L",
            InputPort::VTh => "V_th",
            InputPort::VReset => "V_reset",
            InputPort::TauM => "tau_m",
            InputPort::TauEx => "tau_ex",
            InputPort::TauIn => "tau_in",
            InputPort::CM => "C_m",
            InputPort::TRef => "t_ref_ms",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputPort {
    VOut,
    PscExOut,
    PscInOut,
    TRefLeftOut,
    /// 1 if the neuron fired at the end of the step, else 0
    SpikeOut,
}

impl OutputPort {
    pub const ALL: [OutputPort; OUTPUT_COUNT] = [
        OutputPort::VOut,
        OutputPort::PscExOut,
        OutputPort::PscInOut,
        OutputPort::TRefLeftOut,
        OutputPort::SpikeOut,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn offset(self) -> u32 {
        OUTPUT_BASE + OUTPUT_STRIDE * self as u32
    }

    #[inline]
    pub const fn valid_offset(self) -> u32 {
        self.offset() + 4
    }

    pub const fn name(self) -> &'static str {
        match self {
            OutputPort::VOut => "V_out",
            OutputPort::PscExOut => "psc_ex_out",
            OutputPort::PscInOut => "psc_in_out",
            OutputPort::TRefLeftOut => "t_ref_left_out",
            OutputPort::SpikeOut => "spike_out",
        }
    }
}

/// What lives at a mapped offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    Ctrl,
    Gie,
    Ier,
    Isr,
    Input(InputPort),
    Output(OutputPort),
    OutputValid(OutputPort),
}

/// Resolve a byte offset. `None` for unaligned, reserved or out-of-range offsets.
pub fn decode(offset: u32) -> Option<Register> {
    if offset % 4 != 0 || offset >= SPAN {
        return None;
    }
    match offset {
        CTRL => return Some(Register::Ctrl),
        GIE => return Some(Register::Gie),
        IER => return Some(Register::Ier),
        ISR => return Some(Register::Isr),
        _ => {}
    }
    if offset < OUTPUT_BASE {
        let rel = offset - INPUT_BASE;
        if rel % INPUT_STRIDE != 0 {
            return None;
        }
        return InputPort::ALL.get((rel / INPUT_STRIDE) as usize).copied().map(Register::Input);
    }
    let rel = offset - OUTPUT_BASE;
    let port = OutputPort::ALL.get((rel / OUTPUT_STRIDE) as usize).copied()?;
    match rel % OUTPUT_STRIDE {
        0 => Some(Register::Output(port)),
        4 => Some(Register::OutputValid(port)),
        _ => None,
    }
}

#[inline]
pub fn f32_to_word(x: f32) -> u32 {
    x.to_bits()
}

#[inline]
pub fn word_to_f32(w: u32) -> f32 {
    f32::from_bits(w)
}
