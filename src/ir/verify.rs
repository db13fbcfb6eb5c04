use super::{Instruction, IrError, Module};

impl Module {
    /// Structural checks run before a module is handed to the backend:
    /// the entry function exists, every block is terminated, every branch
    /// lands on a real block and every call targets a declaration.
    pub fn verify(&self, entry: &str) -> Result<(), IrError> {
        if self.function(entry).is_none() {
            return Err(IrError::MissingFunction(entry.to_string()));
        }

        for function in self.functions.iter() {
            for block in function.blocks.iter() {
                let terminator = block.terminator.as_ref().ok_or_else(|| IrError::Unterminated {
                    function: function.name.clone(),
                    block: block.id.0,
                })?;

                if let Some(target) = terminator
                    .successors()
                    .into_iter()
                    .find(|target| function.block(*target).is_none())
                {
                    return Err(IrError::MissingBlock {
                        function: function.name.clone(),
                        block: block.id.0,
                        target: target.0,
                    });
                }

                for instruction in block.instructions.iter() {
                    if let Instruction::Call { callee, .. } = instruction {
                        if self.declaration(callee).is_none() && self.function(callee).is_none() {
                            return Err(IrError::UndeclaredCallee {
                                function: function.name.clone(),
                                block: block.id.0,
                                callee: callee.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
