use crate::ir::{
    Function, Instruction, IntPredicate, IrError, Module, Operand, Terminator, Type, ValueId,
};

use super::{InterpretError, Pointer, Runtime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    /// Always kept sign extended from the width of its type
    Int(i64),
    Ptr(Pointer),
}

/// Truncate to the width of `ty` and sign extend back out
fn normalize(ty: &Type, value: i64) -> i64 {
    match ty {
        Type::I1 => value & 1,
        Type::I8 => value as i8 as i64,
        Type::I32 => value as i32 as i64,
        _ => value,
    }
}

/// What happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Value `main` returned
    pub exit_code: i64,
    /// Instructions & terminators executed
    pub steps: u64,
    /// How many times control entered each block, indexed by block id
    pub block_visits: Vec<u64>,
}

/// Walks the control flow graph of `main` directly
pub struct IrInterpreter {
    step_limit: Option<u64>,
}

impl Default for IrInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl IrInterpreter {
    pub fn new() -> Self {
        Self { step_limit: None }
    }

    /// Stop with `StepLimitExceeded` instead of looping forever
    pub fn with_step_limit(limit: u64) -> Self {
        Self {
            step_limit: Some(limit),
        }
    }

    pub fn run(
        &mut self,
        runtime: &mut Runtime,
        module: &Module,
        entry: &str,
    ) -> Result<Execution, InterpretError> {
        module.verify(entry)?;
        let function = module
            .function(entry)
            .ok_or_else(|| IrError::MissingFunction(entry.to_string()))?;

        runtime.reset();
        let result = Frame::new(function, runtime, self.step_limit).run();
        runtime.flush()?;
        result
    }
}

/// One activation of a function
struct Frame<'f, 'r, 'a> {
    function: &'f Function,
    runtime: &'r mut Runtime<'a>,
    values: Vec<Option<Value>>,
    step_limit: Option<u64>,
    steps: u64,
    block_visits: Vec<u64>,
}

impl<'f, 'r, 'a> Frame<'f, 'r, 'a> {
    fn new(function: &'f Function, runtime: &'r mut Runtime<'a>, step_limit: Option<u64>) -> Self {
        Frame {
            function,
            runtime,
            values: vec![None; function.value_count()],
            step_limit,
            steps: 0,
            block_visits: vec![0; function.blocks.len()],
        }
    }

    fn step(&mut self) -> Result<(), InterpretError> {
        self.steps += 1;
        match self.step_limit {
            Some(limit) if self.steps > limit => Err(InterpretError::StepLimitExceeded(limit)),
            _ => Ok(()),
        }
    }

    fn value(&self, operand: &Operand) -> Result<Value, InterpretError> {
        match operand {
            Operand::Const(c) => Ok(Value::Int(*c)),
            Operand::Value(id) => self
                .values
                .get(id.0)
                .copied()
                .flatten()
                .ok_or(InterpretError::UndefinedValue(id.0)),
        }
    }

    fn int(&self, ty: &Type, operand: &Operand) -> Result<i64, InterpretError> {
        match self.value(operand)? {
            Value::Int(i) => Ok(normalize(ty, i)),
            Value::Ptr(_) => Err(InterpretError::TypeMismatch("expected an integer, found a pointer")),
        }
    }

    fn pointer(&self, operand: &Operand) -> Result<Pointer, InterpretError> {
        match self.value(operand)? {
            Value::Ptr(p) => Ok(p),
            Value::Int(_) => Err(InterpretError::TypeMismatch("expected a pointer, found an integer")),
        }
    }

    fn define(&mut self, dest: ValueId, value: Value) {
        self.values[dest.0] = Some(value);
    }

    fn run(mut self) -> Result<Execution, InterpretError> {
        let function = self.function;
        let mut current = function.entry();
        loop {
            // already verified, every branch target exists
            let block = &function.blocks[current.0];
            self.block_visits[current.0] += 1;

            for instruction in block.instructions.iter() {
                self.step()?;
                self.execute(instruction)?;
            }

            self.step()?;
            match &block.terminator {
                Some(Terminator::Br(target)) => current = *target,
                Some(Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                }) => {
                    current = if self.int(&Type::I1, cond)? != 0 {
                        *then_block
                    } else {
                        *else_block
                    };
                }
                Some(Terminator::Ret { ty, value }) => {
                    return Ok(Execution {
                        exit_code: self.int(ty, value)?,
                        steps: self.steps,
                        block_visits: self.block_visits,
                    });
                }
                None => {
                    return Err(IrError::Unterminated {
                        function: function.name.clone(),
                        block: current.0,
                    }
                    .into())
                }
            }
        }
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<(), InterpretError> {
        match instruction {
            Instruction::Alloca { dest, ty } => {
                let ptr = self.runtime.alloca(ty.size_of());
                self.define(*dest, Value::Ptr(ptr));
            }
            Instruction::Load { dest, ty, ptr } => {
                let ptr = self.pointer(ptr)?;
                let raw = self.runtime.load(ptr, ty.size_of())?;
                self.define(*dest, Value::Int(normalize(ty, raw as i64)));
            }
            Instruction::Store { ty, value, ptr } => {
                let value = self.int(ty, value)?;
                let ptr = self.pointer(ptr)?;
                self.runtime.store(ptr, ty.size_of(), value as u64)?;
            }
            Instruction::GetElementPtr {
                dest,
                source_ty,
                base,
                indices,
            } => {
                let mut ptr = self.pointer(base)?;
                let mut ty = source_ty;
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        ty = match ty {
                            Type::Array(_, elem) => &**elem,
                            _ => return Err(InterpretError::TypeMismatch("gep index into a non-array")),
                        };
                    }
                    let index = self.int(&Type::I64, index)?;
                    ptr.offset = ptr
                        .offset
                        .wrapping_add(index.wrapping_mul(ty.size_of() as i64));
                }
                self.define(*dest, Value::Ptr(ptr));
            }
            Instruction::Add { dest, ty, lhs, rhs } => {
                let sum = self.int(ty, lhs)?.wrapping_add(self.int(ty, rhs)?);
                self.define(*dest, Value::Int(normalize(ty, sum)));
            }
            Instruction::ICmp {
                dest,
                pred,
                ty,
                lhs,
                rhs,
            } => {
                let (lhs, rhs) = (self.int(ty, lhs)?, self.int(ty, rhs)?);
                let result = match pred {
                    IntPredicate::Eq => lhs == rhs,
                    IntPredicate::Ne => lhs != rhs,
                };
                self.define(*dest, Value::Int(result as i64));
            }
            Instruction::Call {
                dest, callee, args, ..
            } => {
                let result = self.call(callee, args)?;
                if let (Some(dest), Some(result)) = (dest, result) {
                    self.define(*dest, result);
                }
            }
        }
        Ok(())
    }

    /// The C runtime functions the translator declares
    fn call(&mut self, callee: &str, args: &[(Type, Operand)]) -> Result<Option<Value>, InterpretError> {
        match (callee, args) {
            ("getchar", []) => {
                let byte = self.runtime.read_byte()?;
                Ok(Some(Value::Int(byte as i8 as i64)))
            }
            ("putchar", [(ty, byte)]) => {
                let byte = self.int(ty, byte)? as u8;
                self.runtime.write_byte(byte)?;
                Ok(Some(Value::Int(i64::from(byte))))
            }
            ("memset", [(_, ptr), (value_ty, value), (len_ty, len)]) => {
                let ptr = self.pointer(ptr)?;
                let value = self.int(value_ty, value)? as u8;
                let len = self.int(len_ty, len)?;
                let len = u64::try_from(len)
                    .map_err(|_| InterpretError::TypeMismatch("negative memset length"))?;
                self.runtime.fill(ptr, value, len)?;
                Ok(None)
            }
            _ => Err(InterpretError::UnknownFunction(callee.to_string())),
        }
    }
}

/// Runs `main` of a translated module against the given streams
pub fn run_module<'a>(
    module: &Module,
    input: Box<dyn std::io::Read + 'a>,
    output: Box<dyn std::io::Write + 'a>,
    step_limit: Option<u64>,
) -> Result<Execution, InterpretError> {
    let mut runtime = Runtime::new(input, output);
    let mut interpreter = match step_limit {
        Some(limit) => IrInterpreter::with_step_limit(limit),
        None => IrInterpreter::new(),
    };
    interpreter.run(&mut runtime, module, crate::translator::ENTRY_FUNCTION)
}
