use alloy::primitives::{Address, U256};

use super::{analysis::CodeBitmap, opcodes};

/// The [`Contract`] struct is the code view of a single call frame: the
/// account whose storage is in scope, the account that called it, the value
/// sent along, the code being executed and its call data.
///
/// For DELEGATECALL and CALLCODE frames, `address` stays the calling
/// account while `code` comes from the target, which is exactly what the
/// storage and environment opcodes need.
#[derive(Clone, Debug)]
pub struct Contract {
    /// The address whose storage and balance are in scope.
    pub address: Address,

    /// The address that caused this frame to execute.
    pub caller: Address,

    /// The wei sent along with the call.
    pub value: U256,

    /// The bytecode being executed.
    pub code: Vec<u8>,

    /// The input data provided to the call.
    pub input: Vec<u8>,

    /// JUMPDEST analysis of `code`.
    jumpdests: CodeBitmap,
}

impl Contract {
    /// Creates a new [`Contract`], analyzing `code` for valid jump
    /// destinations.
    pub fn new(address: Address, caller: Address, value: U256, code: Vec<u8>) -> Contract {
        let jumpdests = CodeBitmap::analyze(&code);
        Contract { address, caller, value, code, input: Vec::new(), jumpdests }
    }

    /// Attach call data to the frame.
    pub fn with_input(mut self, input: Vec<u8>) -> Contract {
        self.input = input;
        self
    }

    /// Returns true if `dest` is a JUMPDEST instruction (not PUSH data)
    /// inside the current code.
    pub fn valid_jumpdest(&self, dest: U256) -> bool {
        let Ok(udest) = usize::try_from(dest) else {
            return false;
        };
        if udest >= self.code.len() || self.code[udest] != opcodes::JUMPDEST {
            return false;
        }
        self.jumpdests.is_code(udest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(code: &[u8]) -> Contract {
        Contract::new(Address::ZERO, Address::ZERO, U256::ZERO, code.to_vec())
    }

    #[test]
    fn test_valid_jumpdest() {
        // JUMPDEST STOP
        let c = contract(&[opcodes::JUMPDEST, opcodes::STOP]);
        assert!(c.valid_jumpdest(U256::ZERO));
        assert!(!c.valid_jumpdest(U256::from(1u8)));
    }

    #[test]
    fn test_jumpdest_in_push_data_is_invalid() {
        // PUSH1 0x5b STOP
        let c = contract(&[opcodes::PUSH1, 0x5b, opcodes::STOP]);
        assert!(!c.valid_jumpdest(U256::from(1u8)));
    }

    #[test]
    fn test_out_of_range_dest_is_invalid() {
        let c = contract(&[opcodes::JUMPDEST]);
        assert!(!c.valid_jumpdest(U256::from(100u8)));
        assert!(!c.valid_jumpdest(U256::MAX));
    }
}
