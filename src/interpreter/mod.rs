pub mod ir_interpreter;

use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

use crate::ir::IrError;

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("IO Error: {0}")]
    StreamIO(
        #[from]
        std::io::Error,
    ),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("access of {len} byte(s) at offset {offset} is outside allocation {allocation}")]
    OutOfBounds {
        allocation: usize,
        offset: i64,
        len: u64,
    },

    #[error("call to unknown function `{0}`")]
    UnknownFunction(String),

    #[error("use of undefined value %t{0}")]
    UndefinedValue(usize),

    #[error("type mismatch: {0}")]
    TypeMismatch(&'static str),

    #[error("gave up after {0} steps")]
    StepLimitExceeded(u64),
}

/// Address into one of the runtime's allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub allocation: usize,
    pub offset: i64,
}

/// Memory & IO for a running program.
///
/// Native code doesn't bounds check cell accesses but we have no choice here,
/// anything out of range is an error rather than undefined behaviour.
pub struct Runtime<'a> {
    /// One zeroed allocation per `alloca`
    allocations: Vec<Vec<u8>>,

    in_stream: Box<dyn Read + 'a>,
    out_stream: Box<dyn Write + 'a>,
}

impl<'a> Runtime<'a> {
    pub fn new(in_stream: Box<dyn Read + 'a>, out_stream: Box<dyn Write + 'a>) -> Self {
        Self {
            allocations: vec![],
            in_stream,
            out_stream,
        }
    }

    /// Drops all memory, the streams are left as they are
    pub fn reset(&mut self) {
        self.allocations.clear();
    }

    pub fn alloca(&mut self, size: u64) -> Pointer {
        self.allocations.push(vec![0; size as usize]);
        Pointer {
            allocation: self.allocations.len() - 1,
            offset: 0,
        }
    }

    /// check that `len` bytes at `ptr` are within its allocation
    fn check_pointer(&mut self, ptr: Pointer, len: u64) -> Result<&mut [u8], InterpretError> {
        let out_of_bounds = InterpretError::OutOfBounds {
            allocation: ptr.allocation,
            offset: ptr.offset,
            len,
        };
        let memory = match self.allocations.get_mut(ptr.allocation) {
            Some(memory) => memory,
            None => return Err(out_of_bounds),
        };
        let start = match usize::try_from(ptr.offset) {
            Ok(start) => start,
            Err(_) => return Err(out_of_bounds),
        };
        match start.checked_add(len as usize) {
            Some(end) if end <= memory.len() => Ok(&mut memory[start..end]),
            _ => Err(out_of_bounds),
        }
    }

    /// Little endian load of up to 8 bytes
    pub fn load(&mut self, ptr: Pointer, len: u64) -> Result<u64, InterpretError> {
        let bytes = self.check_pointer(ptr, len)?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Little endian store of the low `len` bytes of `value`
    pub fn store(&mut self, ptr: Pointer, len: u64, value: u64) -> Result<(), InterpretError> {
        let bytes = self.check_pointer(ptr, len)?;
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (value >> (8 * i)) as u8;
        }
        Ok(())
    }

    pub fn fill(&mut self, ptr: Pointer, value: u8, len: u64) -> Result<(), InterpretError> {
        self.check_pointer(ptr, len)?.fill(value);
        Ok(())
    }

    /// Read one byte from the input stream, the end of the stream reads as 0xFF
    /// (the low byte of C's `EOF`)
    pub fn read_byte(&mut self) -> Result<u8, InterpretError> {
        let mut buf = [0u8; 1];
        match self.in_stream.read_exact(&mut buf) {
            Ok(()) => Ok(buf[0]),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(0xFF),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), InterpretError> {
        self.out_stream.write_all(&[byte])?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out_stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> Runtime<'static> {
        Runtime::new(Box::new(io::empty()), Box::new(io::sink()))
    }

    #[test]
    fn loads_and_stores_little_endian() {
        let mut rt = runtime();
        let ptr = rt.alloca(8);
        rt.store(ptr, 8, 0x0102_0304_0506_0708).unwrap();
        assert_eq!(rt.load(ptr, 8).unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(rt.load(Pointer { offset: 7, ..ptr }, 1).unwrap(), 0x01);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut rt = runtime();
        let ptr = rt.alloca(4);
        assert!(matches!(
            rt.load(Pointer { offset: 4, ..ptr }, 1),
            Err(InterpretError::OutOfBounds { offset: 4, .. })
        ));
        assert!(matches!(
            rt.store(Pointer { offset: -1, ..ptr }, 1, 0),
            Err(InterpretError::OutOfBounds { offset: -1, .. })
        ));
        assert!(rt.fill(ptr, 0, 5).is_err());
    }

    #[test]
    fn stream_errors_keep_their_message() {
        let err = InterpretError::from(io::Error::new(ErrorKind::BrokenPipe, "stdout went away"));
        assert_eq!(err.to_string(), "IO Error: stdout went away");
    }

    #[test]
    fn end_of_input_reads_as_eof_byte() {
        let input = [b'x'];
        let mut rt = Runtime::new(Box::new(&input[..]), Box::new(io::sink()));
        assert_eq!(rt.read_byte().unwrap(), b'x');
        assert_eq!(rt.read_byte().unwrap(), 0xFF);
    }
}
