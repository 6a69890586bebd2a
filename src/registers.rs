use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Registers per bank (index digit 0..=9).
pub const BANK_SIZE: usize = 10;
pub const DEFAULT_VALUE: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bank {
    A,
    B,
    C,
    D,
    E,
    Z,
}

impl Bank {
    pub const ALL: [Bank; 6] = [Bank::A, Bank::B, Bank::C, Bank::D, Bank::E, Bank::Z];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Bank::A),
            'B' => Some(Bank::B),
            'C' => Some(Bank::C),
            'D' => Some(Bank::D),
            'E' => Some(Bank::E),
            'Z' => Some(Bank::Z),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Bank::A => 'A',
            Bank::B => 'B',
            Bank::C => 'C',
            Bank::D => 'D',
            Bank::E => 'E',
            Bank::Z => 'Z',
        }
    }
}

/// A register name: bank letter plus a single index digit, e.g. `A0` or `Z9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterId {
    pub bank: Bank,
    pub index: u8,
}

impl RegisterId {
    pub fn new(bank: Bank, index: u8) -> Option<Self> {
        ((index as usize) < BANK_SIZE).then_some(Self { bank, index })
    }

    /// Flat slot in the register array.
    fn slot(self) -> usize {
        self.bank as usize * BANK_SIZE + self.index as usize
    }
}

impl FromStr for RegisterId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(());
        };
        let bank = Bank::from_char(letter).ok_or(())?;
        let index = digit.to_digit(10).ok_or(())?;
        RegisterId::new(bank, index as u8).ok_or(())
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bank.letter(), self.index)
    }
}

pub fn is_valid_register(name: &str) -> bool {
    name.parse::<RegisterId>().is_ok()
}

/// Same bank letter; used to validate `|R1:R2|` ranges.
pub fn are_same_type(a: RegisterId, b: RegisterId) -> bool {
    a.bank == b.bank
}

/// True when `a` has a strictly lower index than `b`. Only meaningful for the fixed 0..=9 range.
pub fn comes_first(a: RegisterId, b: RegisterId) -> bool {
    a.index < b.index
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    cells: Box<[i32]>, // BANK_SIZE cells per bank, in Bank::ALL order; never resized
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            cells: vec![DEFAULT_VALUE; Bank::ALL.len() * BANK_SIZE].into_boxed_slice(),
        }
    }

    pub fn get(&self, reg: RegisterId) -> i32 {
        self.cells[reg.slot()]
    }

    pub fn put(&mut self, reg: RegisterId, value: i32) {
        self.cells[reg.slot()] = value;
    }

    pub fn free(&mut self, reg: RegisterId) {
        self.put(reg, DEFAULT_VALUE);
    }

    /// Exchange two cells; both are read before either is written.
    pub fn swap(&mut self, a: RegisterId, b: RegisterId) {
        self.cells.swap(a.slot(), b.slot());
    }

    /// Non-default cells in bank/index order.
    pub fn nonzero(&self) -> impl Iterator<Item = (RegisterId, i32)> + '_ {
        Bank::ALL.iter().flat_map(move |&bank| {
            (0..BANK_SIZE as u8).filter_map(move |index| {
                let reg = RegisterId { bank, index };
                let v = self.get(reg);
                (v != DEFAULT_VALUE).then_some((reg, v))
            })
        })
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----------------- Registers -----------------")?;
        for index in 0..BANK_SIZE as u8 {
            for bank in Bank::ALL {
                let reg = RegisterId { bank, index };
                write!(f, "{reg}: {}\t", self.get(reg))?;
            }
            writeln!(f)?;
        }
        write!(f, "-------------------- END --------------------")
    }
}
