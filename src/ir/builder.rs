use super::{
    BasicBlock, BlockId, Function, FunctionDecl, Instruction, IntPredicate, Operand, Terminator,
    Type, ValueId,
};

/// Instruction emission, always targeting an explicit block.
///
/// Block ids only ever come from `new_block`/`entry` so indexing can't go out of range.
/// Only the translator builds functions, which is what keeps a terminated block closed.
impl Function {
    /// Appends a fresh, unterminated block
    pub(crate) fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BasicBlock::new(id));
        id
    }

    fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    fn push(&mut self, block: BlockId, instruction: Instruction) {
        let block = &mut self.blocks[block.0];
        debug_assert!(
            !block.is_terminated(),
            "emitting into terminated block bb{}",
            block.id.0
        );
        block.instructions.push(instruction);
    }

    pub(crate) fn build_alloca(&mut self, block: BlockId, ty: Type) -> ValueId {
        let dest = self.fresh_value();
        self.push(block, Instruction::Alloca { dest, ty });
        dest
    }

    pub(crate) fn build_load(&mut self, block: BlockId, ty: Type, ptr: impl Into<Operand>) -> ValueId {
        let dest = self.fresh_value();
        self.push(
            block,
            Instruction::Load {
                dest,
                ty,
                ptr: ptr.into(),
            },
        );
        dest
    }

    pub(crate) fn build_store(
        &mut self,
        block: BlockId,
        ty: Type,
        value: impl Into<Operand>,
        ptr: impl Into<Operand>,
    ) {
        self.push(
            block,
            Instruction::Store {
                ty,
                value: value.into(),
                ptr: ptr.into(),
            },
        );
    }

    pub(crate) fn build_gep(
        &mut self,
        block: BlockId,
        source_ty: Type,
        base: impl Into<Operand>,
        indices: Vec<Operand>,
    ) -> ValueId {
        let dest = self.fresh_value();
        self.push(
            block,
            Instruction::GetElementPtr {
                dest,
                source_ty,
                base: base.into(),
                indices,
            },
        );
        dest
    }

    pub(crate) fn build_add(
        &mut self,
        block: BlockId,
        ty: Type,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> ValueId {
        let dest = self.fresh_value();
        self.push(
            block,
            Instruction::Add {
                dest,
                ty,
                lhs: lhs.into(),
                rhs: rhs.into(),
            },
        );
        dest
    }

    pub(crate) fn build_icmp(
        &mut self,
        block: BlockId,
        pred: IntPredicate,
        ty: Type,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> ValueId {
        let dest = self.fresh_value();
        self.push(
            block,
            Instruction::ICmp {
                dest,
                pred,
                ty,
                lhs: lhs.into(),
                rhs: rhs.into(),
            },
        );
        dest
    }

    /// Calls a declared function, argument types are taken from its signature
    pub(crate) fn build_call(
        &mut self,
        block: BlockId,
        callee: &FunctionDecl,
        args: Vec<Operand>,
    ) -> Option<ValueId> {
        debug_assert_eq!(callee.params.len(), args.len());
        let dest = match callee.ret {
            Type::Void => None,
            _ => Some(self.fresh_value()),
        };
        self.push(
            block,
            Instruction::Call {
                dest,
                callee: callee.name.clone(),
                ret: callee.ret.clone(),
                args: callee.params.iter().cloned().zip(args).collect(),
            },
        );
        dest
    }

    fn terminate(&mut self, block: BlockId, terminator: Terminator) {
        let block = &mut self.blocks[block.0];
        debug_assert!(
            !block.is_terminated(),
            "bb{} already has a terminator",
            block.id.0
        );
        block.terminator = Some(terminator);
    }

    #[allow(dead_code)]
    pub(crate) fn build_br(&mut self, block: BlockId, target: BlockId) {
        self.terminate(block, Terminator::Br(target));
    }

    pub(crate) fn build_cond_br(
        &mut self,
        block: BlockId,
        cond: impl Into<Operand>,
        then_block: BlockId,
        else_block: BlockId,
    ) {
        self.terminate(
            block,
            Terminator::CondBr {
                cond: cond.into(),
                then_block,
                else_block,
            },
        );
    }

    pub(crate) fn build_ret(&mut self, block: BlockId, ty: Type, value: impl Into<Operand>) {
        self.terminate(
            block,
            Terminator::Ret {
                ty,
                value: value.into(),
            },
        );
    }
}
