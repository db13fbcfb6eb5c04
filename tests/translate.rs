use bfc::{
    ir::{BlockId, Instruction, Module, Terminator, Type},
    lexer::Position,
    translator::{translate, TranslateError, ENTRY_FUNCTION},
};

fn blocks(module: &Module) -> usize {
    module.function(ENTRY_FUNCTION).unwrap().blocks.len()
}

#[test]
fn declares_the_runtime_primitives() {
    let module = translate(b"").unwrap();
    let names: Vec<_> = module.declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["getchar", "putchar", "memset"]);

    let memset = module.declaration("memset").unwrap();
    assert_eq!(memset.ret, Type::Void);
    assert_eq!(memset.params, vec![Type::Ptr, Type::I8, Type::I64]);
}

#[test]
fn every_block_is_terminated() {
    let module = translate(b"+[>[-]<[.,]]>>[<]").unwrap();
    assert_eq!(module.verify(ENTRY_FUNCTION), Ok(()));
    let main = module.function(ENTRY_FUNCTION).unwrap();
    assert!(main.blocks.iter().all(|b| b.is_terminated()));
    // exactly one return, in the block the scan finished in
    let returns = main
        .blocks
        .iter()
        .filter(|b| matches!(b.terminator, Some(Terminator::Ret { .. })))
        .count();
    assert_eq!(returns, 1);
}

#[test]
fn two_blocks_per_loop() {
    assert_eq!(blocks(&translate(b"+-<>.,").unwrap()), 1);
    assert_eq!(blocks(&translate(b"[]").unwrap()), 3);
    assert_eq!(blocks(&translate(b"[][]").unwrap()), 5);
    assert_eq!(blocks(&translate(b"[[[]]]").unwrap()), 7);
}

#[test]
fn closing_bracket_reloads_the_cell() {
    let module = translate(b"[>]").unwrap();
    let body = &module.function(ENTRY_FUNCTION).unwrap().blocks[1];
    // pointer shift (load, add, store) then the fresh cell load for the back edge
    let loads = body
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::Load { .. }))
        .count();
    assert_eq!(loads, 3);
    assert!(matches!(
        body.terminator,
        Some(Terminator::CondBr { then_block: BlockId(1), else_block: BlockId(2), .. })
    ));
}

#[test]
fn unmatched_close_before_any_open() {
    assert!(matches!(
        translate(b"]["),
        Err(TranslateError::UnmatchedClose { .. })
    ));
    assert!(matches!(
        translate(b"[]]"),
        Err(TranslateError::UnmatchedClose { position: Position { offset: 2, .. } })
    ));
}

#[test]
fn unmatched_open() {
    assert!(matches!(
        translate(b"["),
        Err(TranslateError::UnmatchedOpen { depth: 1, .. })
    ));
    assert!(matches!(
        translate(b"[[]"),
        Err(TranslateError::UnmatchedOpen { depth: 1, position: Position { offset: 0, .. } })
    ));
}

#[test]
fn comments_are_ignored() {
    assert_eq!(translate(b"a+b").unwrap(), translate(b"+").unwrap());
    assert_eq!(
        translate(b"loop: [ - ] // clear").unwrap(),
        translate(b"[-]").unwrap()
    );
}

#[test]
fn ir_text_for_a_clear_loop() {
    let text = translate(b"[-]").unwrap().to_string();
    let expected = "\
declare i8 @getchar()
declare i32 @putchar(i8)
declare void @memset(ptr, i8, i64)

define i32 @main() {
bb0:
  %t0 = alloca [65535 x i8]
  %t1 = getelementptr [65535 x i8], ptr %t0, i64 0, i64 0
  call void @memset(ptr %t1, i8 0, i64 65535)
  %t2 = alloca i64
  store i64 0, ptr %t2
  %t3 = load i64, ptr %t2
  %t4 = getelementptr [65535 x i8], ptr %t0, i64 0, i64 %t3
  %t5 = load i8, ptr %t4
  %t6 = icmp ne i8 %t5, 0
  br i1 %t6, label %bb1, label %bb2

bb1:
  %t7 = load i64, ptr %t2
  %t8 = getelementptr [65535 x i8], ptr %t0, i64 0, i64 %t7
  %t9 = load i8, ptr %t8
  %t10 = add i8 %t9, -1
  store i8 %t10, ptr %t8
  %t11 = load i64, ptr %t2
  %t12 = getelementptr [65535 x i8], ptr %t0, i64 0, i64 %t11
  %t13 = load i8, ptr %t12
  %t14 = icmp ne i8 %t13, 0
  br i1 %t14, label %bb1, label %bb2

bb2:
  ret i32 0
}
";
    assert_eq!(text, expected);
}
