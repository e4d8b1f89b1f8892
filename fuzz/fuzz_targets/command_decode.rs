#![no_main]

use ihop_protocol::decode_command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    match decode_command(&raw) {
        Ok(command) => {
            let again = decode_command(&raw).map(|command| command.kind());
            assert_eq!(again.ok(), Some(command.kind()));
        }
        Err(error) => {
            assert!(!error.to_string().trim().is_empty());
        }
    }
});
