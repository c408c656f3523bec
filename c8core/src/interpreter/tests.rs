use super::*;
use crate::display::Pixel;
use crate::GeneralRegister as VX;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn program(instructions: &[Instruction]) -> Vec<u8> {
    instructions
        .iter()
        .flat_map(|i| i.to_data().to_bytes())
        .collect()
}

fn loaded(instructions: &[Instruction]) -> Chip8 {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_program(&program(instructions)).unwrap();
    chip8
}

fn run(chip8: &mut Chip8, ticks: usize) {
    for _ in 0..ticks {
        chip8.tick().unwrap();
    }
}

/// Runs a single instruction with some registers preset.
fn after(instruction: Instruction, registers: &[(VX, u8)]) -> Chip8 {
    let mut chip8 = loaded(&[instruction]);
    for &(reg, value) in registers {
        chip8.set_register(reg, Datum(value));
    }
    chip8.tick().unwrap();
    chip8
}

fn addr(at: u16) -> Address {
    Address::new(at)
}

#[test]
fn test_fresh_state() {
    let chip8 = Chip8::new();
    assert_eq!(chip8.program_counter(), 0x200);
    assert_eq!(chip8.registers(), &[Datum(0); 16]);
    assert_eq!(chip8.index(), 0);
    assert!(chip8.stack().is_empty());
    assert_eq!(chip8.delay_timer(), Datum(0));
    assert_eq!(chip8.sound_timer(), Datum(0));
    assert_eq!(chip8.keys(), Keys::NONE);
    assert_eq!(chip8.state(), InterpreterState::Normal);
    assert_eq!(chip8.display(), &Display::blank());
    assert_eq!(chip8.memory(), &Memory::new());
}

#[test]
fn test_load_register_byte() {
    for x in VX::ALL {
        for byte in 0..=u8::MAX {
            let chip8 = after(Instruction::LoadRegByte(x, byte), &[]);
            assert_eq!(chip8.register(x), Datum(byte));
            assert_eq!(chip8.program_counter(), 0x202);
        }
    }
}

#[test]
fn test_add_byte_wraps_and_leaves_flag() {
    let chip8 = after(Instruction::Add(VX::V2, 0x10), &[(VX::V2, 0xF8), (VX::VF, 7)]);
    assert_eq!(chip8.register(VX::V2), Datum(0x08));
    assert_eq!(chip8.register(VX::VF), Datum(7));
}

#[test]
fn test_add_registers_carry() {
    let mut chip8 = loaded(&[Instruction::AddReg { x: VX::V1, y: VX::V2 }]);
    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            chip8.set_program_counter(0x200);
            chip8.set_register(VX::V1, Datum(a));
            chip8.set_register(VX::V2, Datum(b));
            chip8.tick().unwrap();
            let sum = a as u16 + b as u16;
            assert_eq!(chip8.register(VX::V1), Datum((sum % 256) as u8));
            assert_eq!(chip8.register(VX::VF), Datum::from(sum > 255));
            assert_eq!(chip8.program_counter(), 0x202);
        }
    }
}

#[test]
fn test_sub_registers_borrow() {
    let mut chip8 = loaded(&[Instruction::Sub { x: VX::V1, y: VX::V2 }]);
    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            chip8.set_program_counter(0x200);
            chip8.set_register(VX::V1, Datum(a));
            chip8.set_register(VX::V2, Datum(b));
            chip8.tick().unwrap();
            assert_eq!(chip8.register(VX::V1), Datum(a.wrapping_sub(b)));
            assert_eq!(chip8.register(VX::VF), Datum::from(a >= b));
        }
    }
}

#[test]
fn test_reverse_subtraction() {
    let sub_n = Instruction::SubN { x: VX::V1, y: VX::V2 };
    let chip8 = after(sub_n, &[(VX::V1, 3), (VX::V2, 10)]);
    assert_eq!(chip8.register(VX::V1), Datum(7));
    assert_eq!(chip8.register(VX::VF), Datum(1));

    let chip8 = after(sub_n, &[(VX::V1, 10), (VX::V2, 3)]);
    assert_eq!(chip8.register(VX::V1), Datum(249));
    assert_eq!(chip8.register(VX::VF), Datum(0));

    let chip8 = after(sub_n, &[(VX::V1, 10), (VX::V2, 10)]);
    assert_eq!(chip8.register(VX::V1), Datum(0));
    assert_eq!(chip8.register(VX::VF), Datum(1));
}

#[test]
fn test_shifts_flag_the_outgoing_bit() {
    let chip8 = after(Instruction::Shr(VX::V1), &[(VX::V1, 0b1000_0001)]);
    assert_eq!(chip8.register(VX::V1), Datum(0b0100_0000));
    assert_eq!(chip8.register(VX::VF), Datum(1));

    let chip8 = after(Instruction::Shr(VX::V1), &[(VX::V1, 0b1000_0010)]);
    assert_eq!(chip8.register(VX::VF), Datum(0));

    let chip8 = after(Instruction::Shl(VX::V1), &[(VX::V1, 0b1000_0001)]);
    assert_eq!(chip8.register(VX::V1), Datum(0b0000_0010));
    assert_eq!(chip8.register(VX::VF), Datum(1));

    let chip8 = after(Instruction::Shl(VX::V1), &[(VX::V1, 0b0100_0000)]);
    assert_eq!(chip8.register(VX::V1), Datum(0b1000_0000));
    assert_eq!(chip8.register(VX::VF), Datum(0));
}

#[test]
fn test_shift_ignores_vy() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_program(&[0x81, 0x26]).unwrap();
    chip8.set_register(VX::V1, Datum(8));
    chip8.set_register(VX::V2, Datum(0xFF));
    chip8.tick().unwrap();
    assert_eq!(chip8.register(VX::V1), Datum(4));
    assert_eq!(chip8.register(VX::V2), Datum(0xFF));
}

#[test]
fn test_flag_target_keeps_result() {
    let chip8 = after(
        Instruction::AddReg { x: VX::VF, y: VX::V0 },
        &[(VX::VF, 0x10), (VX::V0, 0x02)],
    );
    assert_eq!(chip8.register(VX::VF), Datum(0x12));
}

#[test]
fn test_bitwise_operations() {
    let regs = [(VX::V3, 0b1100), (VX::V4, 0b1010)];
    let or = after(Instruction::Or { x: VX::V3, y: VX::V4 }, &regs);
    let and = after(Instruction::And { x: VX::V3, y: VX::V4 }, &regs);
    let xor = after(Instruction::Xor { x: VX::V3, y: VX::V4 }, &regs);
    let copy = after(Instruction::CopyRegToReg { x: VX::V3, y: VX::V4 }, &regs);
    assert_eq!(or.register(VX::V3), Datum(0b1110));
    assert_eq!(and.register(VX::V3), Datum(0b1000));
    assert_eq!(xor.register(VX::V3), Datum(0b0110));
    assert_eq!(copy.register(VX::V3), Datum(0b1010));
    assert_eq!(copy.register(VX::V4), Datum(0b1010));
}

#[test]
fn test_skips() {
    let regs = [(VX::V0, 5), (VX::V1, 5), (VX::V2, 6)];
    let cases = [
        (Instruction::SkipIfEqual(VX::V0, 5), 0x204),
        (Instruction::SkipIfEqual(VX::V0, 6), 0x202),
        (Instruction::SkipNotEqual(VX::V0, 5), 0x202),
        (Instruction::SkipNotEqual(VX::V0, 6), 0x204),
        (Instruction::SkipRegistersEqual(VX::V0, VX::V1), 0x204),
        (Instruction::SkipRegistersEqual(VX::V0, VX::V2), 0x202),
        (Instruction::SkipRegistersNotEqual(VX::V0, VX::V1), 0x202),
        (Instruction::SkipRegistersNotEqual(VX::V0, VX::V2), 0x204),
    ];
    for (instruction, expected) in cases {
        let chip8 = after(instruction, &regs);
        assert_eq!(
            chip8.program_counter(),
            expected,
            "{:?} went to {:03X}",
            instruction,
            chip8.program_counter()
        );
    }
}

#[test]
fn test_jumps() {
    let chip8 = after(Instruction::Jump(addr(0x345)), &[]);
    assert_eq!(chip8.program_counter(), 0x345);

    let chip8 = after(Instruction::JumpRelative(addr(0x300)), &[(VX::V0, 4)]);
    assert_eq!(chip8.program_counter(), 0x304);
}

#[test]
fn test_call_and_return() {
    let mut chip8 = loaded(&[Instruction::Call(addr(0x300))]);
    chip8.memory[addr(0x300)] = Datum(0x00);
    chip8.memory[addr(0x301)] = Datum(0xEE);

    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x300);
    assert_eq!(chip8.stack().frames(), &[addr(0x200)]);

    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x202);
    assert!(chip8.stack().is_empty());
}

#[test]
fn test_stack_overflow_is_a_fault() {
    let mut chip8 = loaded(&[Instruction::Call(addr(0x200))]);
    run(&mut chip8, 16);
    assert_eq!(chip8.stack().depth(), 16);
    assert_eq!(
        chip8.tick(),
        Err(ExecutionError::StackOverflow { pc: 0x200 })
    );
    assert_eq!(chip8.stack().depth(), 16);
    assert_eq!(chip8.program_counter(), 0x200);
}

#[test]
fn test_return_without_call_is_a_fault() {
    let mut chip8 = loaded(&[Instruction::Return]);
    assert_eq!(
        chip8.tick(),
        Err(ExecutionError::StackUnderflow { pc: 0x200 })
    );
    assert_eq!(chip8.program_counter(), 0x200);
}

#[test]
fn test_running_off_the_end_of_memory() {
    let mut chip8 = loaded(&[Instruction::Jump(addr(0xFFF))]);
    chip8.tick().unwrap();
    assert_eq!(chip8.tick(), Err(ExecutionError::OutOfBounds { pc: 0xFFF }));
}

#[test]
fn test_invalid_opcode_changes_nothing() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_program(&[0x60, 0x05, 0x01, 0x23]).unwrap();
    chip8.tick().unwrap();
    chip8.delay_timer = Datum(9);
    chip8.key_press(0x2);

    let memory = chip8.memory().clone();
    let registers = *chip8.registers();
    let stack = chip8.stack().clone();

    assert_eq!(
        chip8.tick(),
        Err(ExecutionError::InvalidOpcode(OpcodeFault::new(0x0123, 0x202)))
    );
    assert_eq!(chip8.program_counter(), 0x202);
    assert_eq!(chip8.memory(), &memory);
    assert_eq!(chip8.registers(), &registers);
    assert_eq!(chip8.stack(), &stack);
    assert_eq!(chip8.index(), 0);
    assert_eq!(chip8.delay_timer(), Datum(9));

    // Nothing is corrected, so the same fault comes back.
    assert_eq!(
        chip8.tick().map_err(|e| e.pc()),
        Err(0x202)
    );
}

#[test]
fn test_blank_memory_faults_at_entry() {
    let mut chip8 = Chip8::new();
    assert_eq!(
        chip8.tick(),
        Err(ExecutionError::InvalidOpcode(OpcodeFault::new(0x0000, 0x200)))
    );
}

#[test]
fn test_scenario_add_two_registers() {
    let mut chip8 = Chip8::with_seed(0);
    chip8
        .load_program(&[0x60, 0x0A, 0x61, 0x05, 0x80, 0x14])
        .unwrap();
    run(&mut chip8, 3);
    assert_eq!(chip8.register(VX::V0), Datum(15));
    assert_eq!(chip8.register(VX::V1), Datum(5));
    assert_eq!(chip8.register(VX::VF), Datum(0));
    assert_eq!(chip8.program_counter(), 0x206);
}

#[test]
fn test_scenario_draw_twice_collides() {
    let draw = Instruction::DisplaySprite {
        x: VX::V0,
        y: VX::V0,
        number_of_bytes: 1,
    };
    let mut chip8 = loaded(&[
        Instruction::ClearScreen,
        Instruction::LoadImmediate(addr(0x300)),
        draw,
        draw,
    ]);
    chip8.memory[addr(0x300)] = Datum(0xFF);

    let cleared = chip8.tick().unwrap();
    assert!(cleared.screen_modified());
    chip8.tick().unwrap();

    let first = chip8.tick().unwrap();
    assert!(first.screen_modified());
    assert_eq!(chip8.register(VX::VF), Datum(0));
    assert!((0..8).all(|x| chip8.display().pixel(x, 0) == Some(Pixel::White)));

    chip8.tick().unwrap();
    assert_eq!(chip8.register(VX::VF), Datum(1));
    assert_eq!(chip8.display(), &Display::blank());
}

#[test]
fn test_clear_screen() {
    let mut chip8 = loaded(&[Instruction::ClearScreen]);
    chip8
        .display
        .sprite(Datum(10), Datum(10), &[Datum(0xFF)]);
    chip8.tick().unwrap();
    assert_eq!(chip8.display(), &Display::blank());
    assert_eq!(chip8.program_counter(), 0x202);
}

#[test]
fn test_font_glyph_drawing() {
    let mut chip8 = loaded(&[
        Instruction::GetSprite(VX::V0),
        Instruction::DisplaySprite {
            x: VX::V1,
            y: VX::V1,
            number_of_bytes: 5,
        },
    ]);
    chip8.set_register(VX::V0, Datum(0xA));
    chip8.tick().unwrap();
    assert_eq!(chip8.index(), 0x32);
    chip8.tick().unwrap();
    // Top row of "A" is 0xF0.
    assert_eq!(chip8.display().pixel(3, 0), Some(Pixel::White));
    assert_eq!(chip8.display().pixel(4, 0), Some(Pixel::Black));
    assert_eq!(chip8.display().lit(), 4 + 2 + 4 + 2 + 2);
}

#[test]
fn test_binary_coded_decimal() {
    let chip8 = {
        let mut chip8 = loaded(&[Instruction::LoadImmediate(addr(0x300)), Instruction::BCD(VX::V7)]);
        chip8.set_register(VX::V7, Datum(254));
        run(&mut chip8, 2);
        chip8
    };
    assert_eq!(
        chip8.memory().substring(addr(0x300), 3),
        vec![Datum(2), Datum(5), Datum(4)]
    );
    assert_eq!(chip8.index(), 0x300);
}

#[test]
fn test_memory_writes_wrap_at_top() {
    let mut chip8 = loaded(&[Instruction::LoadImmediate(addr(0xFFF)), Instruction::BCD(VX::V0)]);
    chip8.set_register(VX::V0, Datum(123));
    run(&mut chip8, 2);
    assert_eq!(chip8.memory()[addr(0xFFF)], Datum(1));
    assert_eq!(chip8.memory()[addr(0x000)], Datum(2));
    assert_eq!(chip8.memory()[addr(0x001)], Datum(3));
}

#[test]
fn test_register_dump_round_trip() {
    for x in VX::ALL {
        let mut chip8 = loaded(&[
            Instruction::LoadImmediate(addr(0x400)),
            Instruction::WriteMultiple(x),
            Instruction::ReadMultiple(x),
        ]);
        for reg in VX::ALL {
            chip8.set_register(reg, Datum(0x10 + reg.index() as u8));
        }
        let before = *chip8.registers();
        run(&mut chip8, 2);
        for reg in x.through() {
            chip8.set_register(reg, Datum(0));
        }
        chip8.tick().unwrap();
        assert_eq!(chip8.registers(), &before, "round trip through V{:X}", x.index());
        assert_eq!(chip8.index(), 0x400);
    }
}

#[test]
fn test_register_dump_stops_at_x() {
    let mut chip8 = loaded(&[
        Instruction::LoadImmediate(addr(0x400)),
        Instruction::WriteMultiple(VX::V2),
    ]);
    for reg in VX::ALL {
        chip8.set_register(reg, Datum(0xA0 + reg.index() as u8));
    }
    run(&mut chip8, 2);
    assert_eq!(
        chip8.memory().substring(addr(0x400), 4),
        vec![Datum(0xA0), Datum(0xA1), Datum(0xA2), Datum(0x00)]
    );
}

#[test]
fn test_add_to_index_flags_overflow() {
    let chip8 = {
        let mut chip8 = loaded(&[Instruction::LoadImmediate(addr(0xFFE)), Instruction::AddI(VX::V0)]);
        chip8.set_register(VX::V0, Datum(3));
        run(&mut chip8, 2);
        chip8
    };
    assert_eq!(chip8.index(), 0x1001);
    assert_eq!(chip8.register(VX::VF), Datum(1));

    let chip8 = {
        let mut chip8 = loaded(&[Instruction::LoadImmediate(addr(0x100)), Instruction::AddI(VX::V0)]);
        chip8.set_register(VX::V0, Datum(3));
        chip8.set_register(VX::VF, Datum(1));
        run(&mut chip8, 2);
        chip8
    };
    assert_eq!(chip8.index(), 0x103);
    assert_eq!(chip8.register(VX::VF), Datum(0));
}

#[test]
fn test_random_is_masked_and_seeded() {
    let zeroed = after(Instruction::Random(VX::V0, 0x00), &[(VX::V0, 0xFF)]);
    assert_eq!(zeroed.register(VX::V0), Datum(0));

    let mut chip8 = loaded(&[Instruction::Random(VX::V0, 0x0F)]);
    for _ in 0..100 {
        chip8.set_program_counter(0x200);
        chip8.tick().unwrap();
        assert!(chip8.register(VX::V0).inner() <= 0x0F);
    }

    let first = after(Instruction::Random(VX::V0, 0xFF), &[]);
    let second = after(Instruction::Random(VX::V0, 0xFF), &[]);
    assert_eq!(first.register(VX::V0), second.register(VX::V0));
}

#[test]
fn test_key_skips() {
    let mut chip8 = loaded(&[Instruction::SkipPressed(VX::V0)]);
    chip8.set_register(VX::V0, Datum(5));
    chip8.key_press(5);
    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x204);

    chip8.set_program_counter(0x200);
    chip8.key_release(5);
    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x202);

    let mut chip8 = loaded(&[Instruction::SkipNotPressed(VX::V0)]);
    chip8.set_register(VX::V0, Datum(5));
    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x204);

    chip8.set_program_counter(0x200);
    chip8.key_press(5);
    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x202);
}

#[test]
fn test_key_skip_past_the_keypad() {
    let mut chip8 = loaded(&[Instruction::SkipPressed(VX::V0)]);
    chip8.set_register(VX::V0, Datum(0x20));
    for key in 0..16 {
        chip8.key_press(key);
    }
    chip8.tick().unwrap();
    assert_eq!(chip8.program_counter(), 0x202);
}

#[test]
fn test_wait_for_key() {
    let mut chip8 = loaded(&[
        Instruction::WaitForKey(VX::V3),
        Instruction::LoadRegByte(VX::V4, 1),
    ]);
    chip8.delay_timer = Datum(10);

    let report = chip8.tick().unwrap();
    assert!(report.executed());
    assert_eq!(report.waiting_for_key(), Some(VX::V3));
    assert_eq!(chip8.state(), InterpreterState::WaitForKey(VX::V3));
    assert_eq!(chip8.program_counter(), 0x200);
    assert_eq!(chip8.delay_timer(), Datum(9));

    for _ in 0..5 {
        let report = chip8.tick().unwrap();
        assert!(!report.executed());
        assert_eq!(chip8.program_counter(), 0x200);
    }
    assert_eq!(chip8.delay_timer(), Datum(9));

    chip8.key_release(0x1);
    assert!(chip8.is_waiting_for_key());

    chip8.key_press(0xA);
    assert_eq!(chip8.register(VX::V3), Datum(0xA));
    assert_eq!(chip8.state(), InterpreterState::Normal);
    assert_eq!(chip8.program_counter(), 0x202);
    assert!(chip8.keys().is_pressed(0xA));

    chip8.tick().unwrap();
    assert_eq!(chip8.register(VX::V4), Datum(1));
    assert_eq!(chip8.program_counter(), 0x204);
}

#[test]
fn test_key_press_without_wait_only_records_key() {
    let mut chip8 = Chip8::new();
    chip8.key_press(0x7);
    assert_eq!(chip8.registers(), &[Datum(0); 16]);
    assert_eq!(chip8.program_counter(), 0x200);
    assert!(chip8.keys().is_pressed(0x7));
}

#[test]
#[should_panic]
fn test_key_off_the_keypad() {
    Chip8::new().key_press(0x10);
}

#[test]
fn test_delay_timer_counts_down_per_tick() {
    let mut chip8 = loaded(&[
        Instruction::LoadRegByte(VX::V0, 2),
        Instruction::SetDelayTimer(VX::V0),
        Instruction::GetDelayTimer(VX::V1),
        Instruction::GetDelayTimer(VX::V2),
    ]);
    run(&mut chip8, 2);
    assert_eq!(chip8.delay_timer(), Datum(1));
    run(&mut chip8, 2);
    assert_eq!(chip8.register(VX::V1), Datum(1));
    assert_eq!(chip8.register(VX::V2), Datum(0));
    assert_eq!(chip8.delay_timer(), Datum(0));
}

#[test]
fn test_buzzer_plays_once_as_sound_timer_expires() {
    let beeps = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&beeps);
    let mut chip8 = loaded(&[
        Instruction::LoadRegByte(VX::V0, 3),
        Instruction::SetSoundTimer(VX::V0),
        Instruction::Jump(addr(0x204)),
    ]);
    chip8.on_sound(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let reports = (0..6)
        .map(|_| chip8.tick().unwrap().buzzer_played())
        .collect::<Vec<_>>();
    assert_eq!(reports, vec![false, false, false, true, false, false]);
    assert_eq!(beeps.load(Ordering::SeqCst), 1);
    assert_eq!(chip8.sound_timer(), Datum(0));
}

#[test]
fn test_no_buzzer_is_silent() {
    let mut chip8 = loaded(&[Instruction::SetSoundTimer(VX::V0), Instruction::Jump(addr(0x202))]);
    chip8.set_register(VX::V0, Datum(1));
    let report = chip8.tick().unwrap();
    assert!(report.buzzer_played());
    assert_eq!(chip8.sound_timer(), Datum(0));
    assert!(!chip8.tick().unwrap().buzzer_played());
}

#[test]
fn test_oversized_program_leaves_core_alone() {
    let mut chip8 = Chip8::new();
    let result = chip8.load_program(&[0xFF; 4096]);
    assert_eq!(
        result,
        Err(LoadError::ProgramTooLarge {
            requested: 4096,
            capacity: 3584
        })
    );
    assert_eq!(chip8.memory(), &Memory::new());
}

#[test]
fn test_debug_output() {
    let chip8 = Chip8::new();
    let debug = format!("{:?}", chip8);
    assert!(debug.starts_with("Chip8 {"));
    assert!(debug.contains("program_counter: 200"));
}
