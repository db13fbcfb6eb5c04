//! A small, LLVM shaped intermediate representation.
//!
//! Only the handful of instructions the translator actually emits are modelled.
//! The textual form (see `printer`) is valid LLVM IR that clang accepts directly.

pub mod builder;
pub mod printer;
pub mod verify;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    I1,
    I8,
    I32,
    I64,
    /// Opaque pointer
    Ptr,
    Array(u64, Box<Type>),
}

impl Type {
    /// Size in bytes when stored in memory
    pub fn size_of(&self) -> u64 {
        match self {
            Type::Void => 0,
            Type::I1 | Type::I8 => 1,
            Type::I32 => 4,
            Type::I64 | Type::Ptr => 8,
            Type::Array(len, elem) => len * elem.size_of(),
        }
    }
}

/// An SSA temporary, numbered per function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub usize);

/// Blocks are numbered in creation order, the entry block is always 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Value(ValueId),
    /// Integer constant, its type comes from the instruction using it
    Const(i64),
}

impl From<ValueId> for Operand {
    fn from(value: ValueId) -> Self {
        Operand::Value(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Reserve stack memory for a single `ty`
    Alloca { dest: ValueId, ty: Type },

    Load { dest: ValueId, ty: Type, ptr: Operand },

    Store { ty: Type, value: Operand, ptr: Operand },

    /// `source_ty` is the pointee type of `base`, every index is an i64
    GetElementPtr {
        dest: ValueId,
        source_ty: Type,
        base: Operand,
        indices: Vec<Operand>,
    },

    /// Wrapping add at the width of `ty`
    Add {
        dest: ValueId,
        ty: Type,
        lhs: Operand,
        rhs: Operand,
    },

    ICmp {
        dest: ValueId,
        pred: IntPredicate,
        ty: Type,
        lhs: Operand,
        rhs: Operand,
    },

    /// `dest` is `None` exactly when the callee returns void
    Call {
        dest: Option<ValueId>,
        callee: String,
        ret: Type,
        args: Vec<(Type, Operand)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminator {
    Br(BlockId),
    CondBr {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
    Ret { ty: Type, value: Operand },
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Ret { .. } => vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasicBlock {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    /// Only `None` while the block is still being built
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        BasicBlock {
            id,
            instructions: vec![],
            terminator: None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

/// An external function the runtime provides
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionDecl {
    pub name: String,
    pub ret: Type,
    pub params: Vec<Type>,
}

impl FunctionDecl {
    pub fn new(name: &str, ret: Type, params: Vec<Type>) -> Self {
        FunctionDecl {
            name: name.to_string(),
            ret,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
    pub ret: Type,
    pub blocks: Vec<BasicBlock>,
    next_value: usize,
}

impl Function {
    /// Creates the function along with its entry block
    pub fn new(name: &str, ret: Type) -> Self {
        Function {
            name: name.to_string(),
            ret,
            blocks: vec![BasicBlock::new(BlockId(0))],
            next_value: 0,
        }
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0)
    }

    /// Number of SSA values handed out so far
    pub fn value_count(&self) -> usize {
        self.next_value
    }
}

/// Declarations followed by definitions, only ever appended to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Module {
    pub declarations: Vec<FunctionDecl>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, decl: FunctionDecl) {
        self.declarations.push(decl);
    }

    pub fn define(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn declaration(&self, name: &str) -> Option<&FunctionDecl> {
        self.declarations.iter().find(|d| d.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("no function named `{0}` is defined")]
    MissingFunction(String),

    #[error("block bb{block} in `{function}` has no terminator")]
    Unterminated { function: String, block: usize },

    #[error("block bb{block} in `{function}` branches to missing block bb{target}")]
    MissingBlock {
        function: String,
        block: usize,
        target: usize,
    },

    #[error("block bb{block} in `{function}` calls undeclared function `{callee}`")]
    UndeclaredCallee {
        function: String,
        block: usize,
        callee: String,
    },
}
