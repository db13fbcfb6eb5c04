use crate::{
    ir::{BlockId, Function, FunctionDecl, IntPredicate, Module, Operand, Type, ValueId},
    lexer::{lexer::Lexer, LexerTokenKind, Token},
};

use super::{LoopFrame, TranslateError, CELL_COUNT, ENTRY_FUNCTION};

/// Translates the source into a module in a single pass.
///
/// Loops don't need a parse tree: `[` creates the body & end blocks straight
/// away and pushes them, `]` pops them back off and wires up the back edge.
pub fn translate(source: &[u8]) -> Result<Module, TranslateError> {
    let mut translator = Translator::new();
    let mut current = translator.entry();
    for token in Lexer::new(source) {
        current = translator.emit(current, token)?;
    }
    translator.finish(current)
}

pub(crate) struct Translator {
    function: Function,

    getchar: FunctionDecl,
    putchar: FunctionDecl,
    memset: FunctionDecl,

    /// `[CELL_COUNT x i8]` allocation
    cells: ValueId,
    /// i64 slot holding the data pointer, kept in memory so any block can use it
    pointer: ValueId,

    stack: Vec<LoopFrame>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    /// Sets up the entry block: zeroed cells and a data pointer of 0
    pub(crate) fn new() -> Self {
        let getchar = FunctionDecl::new("getchar", Type::I8, vec![]);
        let putchar = FunctionDecl::new("putchar", Type::I32, vec![Type::I8]);
        let memset = FunctionDecl::new("memset", Type::Void, vec![Type::Ptr, Type::I8, Type::I64]);

        let mut function = Function::new(ENTRY_FUNCTION, Type::I32);
        let entry = function.entry();

        let cells = function.build_alloca(entry, Self::cells_type());
        let first = function.build_gep(
            entry,
            Self::cells_type(),
            cells,
            vec![Operand::Const(0), Operand::Const(0)],
        );
        function.build_call(
            entry,
            &memset,
            vec![first.into(), Operand::Const(0), Operand::Const(CELL_COUNT as i64)],
        );

        let pointer = function.build_alloca(entry, Type::I64);
        function.build_store(entry, Type::I64, Operand::Const(0), pointer);

        Translator {
            function,
            getchar,
            putchar,
            memset,
            cells,
            pointer,
            stack: vec![],
        }
    }

    fn cells_type() -> Type {
        Type::Array(CELL_COUNT, Box::new(Type::I8))
    }

    pub(crate) fn entry(&self) -> BlockId {
        self.function.entry()
    }

    /// Current loop nesting depth
    #[allow(dead_code)]
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Address of the cell the data pointer selects, no bounds checks
    fn cell_at_pointer(&mut self, block: BlockId) -> ValueId {
        let index = self.function.build_load(block, Type::I64, self.pointer);
        self.function.build_gep(
            block,
            Self::cells_type(),
            self.cells,
            vec![Operand::Const(0), index.into()],
        )
    }

    fn add_to_cell(&mut self, block: BlockId, by: i64) {
        let cell = self.cell_at_pointer(block);
        let value = self.function.build_load(block, Type::I8, cell);
        let added = self.function.build_add(block, Type::I8, value, Operand::Const(by));
        self.function.build_store(block, Type::I8, added, cell);
    }

    fn shift_pointer(&mut self, block: BlockId, by: i64) {
        let index = self.function.build_load(block, Type::I64, self.pointer);
        let shifted = self.function.build_add(block, Type::I64, index, Operand::Const(by));
        self.function.build_store(block, Type::I64, shifted, self.pointer);
    }

    /// Always a fresh load, the loop body may have moved the pointer or changed the cell
    fn cell_is_nonzero(&mut self, block: BlockId) -> ValueId {
        let cell = self.cell_at_pointer(block);
        let value = self.function.build_load(block, Type::I8, cell);
        self.function
            .build_icmp(block, IntPredicate::Ne, Type::I8, value, Operand::Const(0))
    }

    /// Emits one instruction into `current` and returns the block emission continues in
    pub(crate) fn emit(&mut self, current: BlockId, token: Token) -> Result<BlockId, TranslateError> {
        match token.kind {
            LexerTokenKind::DerefIncrement => self.add_to_cell(current, 1),
            LexerTokenKind::DerefDecrement => self.add_to_cell(current, -1),
            LexerTokenKind::Increment => self.shift_pointer(current, 1),
            LexerTokenKind::Decrement => self.shift_pointer(current, -1),
            LexerTokenKind::Write => {
                let cell = self.cell_at_pointer(current);
                let value = self.function.build_load(current, Type::I8, cell);
                self.function
                    .build_call(current, &self.putchar, vec![value.into()]);
            }
            LexerTokenKind::Read => {
                // the call result always exists since getchar isn't void
                if let Some(byte) = self.function.build_call(current, &self.getchar, vec![]) {
                    let cell = self.cell_at_pointer(current);
                    self.function.build_store(current, Type::I8, byte, cell);
                }
            }
            LexerTokenKind::JumpStart => {
                let cond = self.cell_is_nonzero(current);
                let frame = LoopFrame {
                    body: self.function.new_block(),
                    end: self.function.new_block(),
                    opened_at: token.position,
                };
                self.stack.push(frame);

                self.function
                    .build_cond_br(current, cond, frame.body, frame.end);
                return Ok(frame.body);
            }
            LexerTokenKind::JumpEnd => {
                let frame = self.stack.pop().ok_or(TranslateError::UnmatchedClose {
                    position: token.position,
                })?;

                let cond = self.cell_is_nonzero(current);
                self.function
                    .build_cond_br(current, cond, frame.body, frame.end);
                return Ok(frame.end);
            }
        }

        Ok(current)
    }

    /// Closes off `current` with `ret i32 0` and hands back the finished module
    pub(crate) fn finish(mut self, current: BlockId) -> Result<Module, TranslateError> {
        if let Some(innermost) = self.stack.last() {
            return Err(TranslateError::UnmatchedOpen {
                position: innermost.opened_at,
                depth: self.stack.len(),
            });
        }

        self.function
            .build_ret(current, Type::I32, Operand::Const(0));

        let mut module = Module::new();
        module.declare(self.getchar);
        module.declare(self.putchar);
        module.declare(self.memset);
        module.define(self.function);
        Ok(module)
    }
}
