use std::fmt::{self, Display, Formatter};

use super::{
    BasicBlock, BlockId, Function, FunctionDecl, Instruction, IntPredicate, Module, Operand,
    Terminator, Type, ValueId,
};

// Everything is explicitly named (`%tN`, `bbN`) so clang never has to
// number anything implicitly.

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::I1 => write!(f, "i1"),
            Type::I8 => write!(f, "i8"),
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::Ptr => write!(f, "ptr"),
            Type::Array(len, elem) => write!(f, "[{} x {}]", len, elem),
        }
    }
}

impl Display for ValueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "%t{}", self.0)
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "{}", v),
            Operand::Const(c) => write!(f, "{}", c),
        }
    }
}

impl Display for IntPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IntPredicate::Eq => write!(f, "eq"),
            IntPredicate::Ne => write!(f, "ne"),
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Alloca { dest, ty } => write!(f, "{} = alloca {}", dest, ty),
            Instruction::Load { dest, ty, ptr } => write!(f, "{} = load {}, ptr {}", dest, ty, ptr),
            Instruction::Store { ty, value, ptr } => write!(f, "store {} {}, ptr {}", ty, value, ptr),
            Instruction::GetElementPtr {
                dest,
                source_ty,
                base,
                indices,
            } => {
                write!(f, "{} = getelementptr {}, ptr {}", dest, source_ty, base)?;
                for index in indices {
                    write!(f, ", i64 {}", index)?;
                }
                Ok(())
            }
            Instruction::Add { dest, ty, lhs, rhs } => {
                write!(f, "{} = add {} {}, {}", dest, ty, lhs, rhs)
            }
            Instruction::ICmp {
                dest,
                pred,
                ty,
                lhs,
                rhs,
            } => write!(f, "{} = icmp {} {} {}, {}", dest, pred, ty, lhs, rhs),
            Instruction::Call {
                dest,
                callee,
                ret,
                args,
            } => {
                if let Some(dest) = dest {
                    write!(f, "{} = ", dest)?;
                }
                write!(f, "call {} @{}(", ret, callee)?;
                for (i, (ty, arg)) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", ty, arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Display for Terminator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Br(target) => write!(f, "br label %{}", target),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(
                f,
                "br i1 {}, label %{}, label %{}",
                cond, then_block, else_block
            ),
            Terminator::Ret { ty, value } => write!(f, "ret {} {}", ty, value),
        }
    }
}

impl Display for BasicBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.id)?;
        for instruction in self.instructions.iter() {
            writeln!(f, "  {}", instruction)?;
        }
        match &self.terminator {
            Some(terminator) => writeln!(f, "  {}", terminator),
            // `verify` rejects these before anything reaches the backend
            None => writeln!(f, "  ; no terminator"),
        }
    }
}

impl Display for FunctionDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "declare {} @{}(", self.ret, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "define {} @{}() {{", self.ret, self.name)?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", block)?;
        }
        writeln!(f, "}}")
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for decl in self.declarations.iter() {
            writeln!(f, "{}", decl)?;
        }
        for function in self.functions.iter() {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_types() {
        assert_eq!(Type::Array(65535, Box::new(Type::I8)).to_string(), "[65535 x i8]");
        assert_eq!(Type::Ptr.to_string(), "ptr");
    }

    #[test]
    fn prints_a_small_function() {
        let mut module = Module::new();
        let putchar = FunctionDecl::new("putchar", Type::I32, vec![Type::I8]);
        module.declare(putchar.clone());

        let mut main = Function::new("main", Type::I32);
        let entry = main.entry();
        let slot = main.build_alloca(entry, Type::I8);
        main.build_store(entry, Type::I8, Operand::Const(-1), slot);
        let byte = main.build_load(entry, Type::I8, slot);
        let nonzero = main.build_icmp(entry, IntPredicate::Ne, Type::I8, byte, Operand::Const(0));
        let out = main.new_block();
        let done = main.new_block();
        main.build_cond_br(entry, nonzero, out, done);
        main.build_call(out, &putchar, vec![byte.into()]);
        main.build_br(out, done);
        main.build_ret(done, Type::I32, Operand::Const(0));
        module.define(main);

        let expected = "\
declare i32 @putchar(i8)

define i32 @main() {
bb0:
  %t0 = alloca i8
  store i8 -1, ptr %t0
  %t1 = load i8, ptr %t0
  %t2 = icmp ne i8 %t1, 0
  br i1 %t2, label %bb1, label %bb2

bb1:
  %t3 = call i32 @putchar(i8 %t1)
  br label %bb2

bb2:
  ret i32 0
}
";
        assert_eq!(module.to_string(), expected);
    }
}
