//! Small hand-assembled programs run through the public API.

use chip8vm::memory::CHIP8_FONT;
use chip8vm::{Chip8Error, Chip8Machine};

fn run(m: &mut Chip8Machine, cycles: usize) {
    for _ in 0..cycles {
        m.cycle();
    }
}

#[test]
fn test_hex_digit_strip() -> Result<(), Chip8Error> {
    #[rustfmt::skip]
    let program = [
        0x60, 0x00, // 200  LD V0, 0        x position
        0x61, 0x00, // 202  LD V1, 0        digit
        0x22, 0x10, // 204  CALL 0x210
        0x70, 0x04, // 206  ADD V0, 4
        0x71, 0x01, // 208  ADD V1, 1
        0x31, 0x10, // 20a  SE V1, 16
        0x12, 0x04, // 20c  JP 0x204
        0x12, 0x0e, // 20e  JP 0x20e        halt
        0xf1, 0x29, // 210  LD F, V1
        0xd0, 0x25, // 212  DRW V0, V2, 5
        0x00, 0xee, // 214  RET
    ];
    let mut m = Chip8Machine::with_seed(0);
    m.load_program(&program)?;
    run(&mut m, 500);

    assert_eq!(m.program_counter(), 0x20e);
    assert_eq!(m.stack_pointer(), 0);
    assert_eq!(m.registers()[1], 16);
    // glyphs are four pixels wide, so sixteen of them tile the top row exactly
    let expected: u32 = CHIP8_FONT.iter().map(|b| b.count_ones()).sum();
    assert_eq!(m.framebuffer().lit_count() as u32, expected);
    assert_eq!(m.registers()[0xf], 0);
    Ok(())
}

#[test]
fn test_delay_loop() -> Result<(), Chip8Error> {
    #[rustfmt::skip]
    let program = [
        0x60, 0x03, // 200  LD V0, 3
        0xf0, 0x15, // 202  LD DT, V0
        0xf1, 0x07, // 204  LD V1, DT
        0x31, 0x00, // 206  SE V1, 0
        0x12, 0x04, // 208  JP 0x204
        0x62, 0x01, // 20a  LD V2, 1
        0x12, 0x0c, // 20c  JP 0x20c
    ];
    let mut m = Chip8Machine::with_seed(0);
    m.load_program(&program)?;

    let mut frames = 0;
    while m.registers()[2] == 0 && frames < 10 {
        run(&mut m, 10);
        m.tick_timers();
        frames += 1;
    }
    assert_eq!(m.registers()[2], 1);
    assert_eq!(frames, 4);
    Ok(())
}

#[test]
fn test_wait_for_key_then_draw() -> Result<(), Chip8Error> {
    #[rustfmt::skip]
    let program = [
        0xf3, 0x0a, // 200  LD V3, K
        0xf3, 0x29, // 202  LD F, V3
        0xd0, 0x05, // 204  DRW V0, V0, 5
        0x12, 0x06, // 206  JP 0x206
    ];
    let mut m = Chip8Machine::with_seed(0);
    m.load_program(&program)?;

    run(&mut m, 100);
    assert_eq!(m.program_counter(), 0x200);
    assert!(m.is_waiting_for_key());
    assert_eq!(m.framebuffer().lit_count(), 0);

    m.set_keys(&[
        false, false, false, false, false, false, false, false, true, false, false, false, false,
        false, false, true,
    ]);
    run(&mut m, 3);
    assert_eq!(m.registers()[3], 8);
    // '8' is 0xF0 0x90 0xF0 0x90 0xF0
    assert_eq!(m.framebuffer().lit_count(), 4 + 2 + 4 + 2 + 4);
    Ok(())
}

#[test]
fn test_reload_runs_new_program() -> Result<(), Chip8Error> {
    let mut m = Chip8Machine::with_seed(0);
    m.load_program(&[0x6a, 0x11, 0x12, 0x02])?;
    run(&mut m, 4);
    assert_eq!(m.registers()[0xa], 0x11);

    m.load_program(&[0x6b, 0x22, 0x12, 0x02])?;
    run(&mut m, 4);
    assert_eq!(m.registers()[0xa], 0);
    assert_eq!(m.registers()[0xb], 0x22);
    Ok(())
}
