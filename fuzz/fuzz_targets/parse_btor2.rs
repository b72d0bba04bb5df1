#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(program) = btor2ex_ir::parse(s) {
            // Printed programs must parse back to the same instructions.
            let text = btor2ex_ir::print_program(&program);
            let reparsed = btor2ex_ir::parse(&text).expect("printed program failed to parse");
            assert_eq!(reparsed, program);
        }
    }
});
