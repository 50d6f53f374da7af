#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modbus_rtu_slave::{
    crc16,
    server::{ModbusSlave, Register, WriteThrough},
};
use std::vec::Vec;

#[derive(Debug, Arbitrary)]
struct FuzzInput<'a> {
    unit_id: u8,
    /// (address, size in registers) of each block
    blocks: Vec<(u16, u8)>,
    /// append a valid CRC to the request so it gets past the frame checks
    fix_crc: bool,
    request_buf: &'a [u8],
}

fuzz_target!(|data: FuzzInput| {
    // we only care about panics so we can ignore results
    fuzz_slave(data);
});

fn fuzz_slave(input: FuzzInput) {
    let mut memory: Vec<Vec<u8>> = input
        .blocks
        .iter()
        .take(16)
        .map(|(_, size)| vec![0; usize::from(*size) * 2])
        .collect();
    let mut handlers: Vec<WriteThrough> = memory.iter().map(|_| WriteThrough).collect();
    let mut slave: ModbusSlave = ModbusSlave::new(input.unit_id);
    for (((address, _), mem), handler) in input
        .blocks
        .iter()
        .zip(memory.iter_mut())
        .zip(handlers.iter_mut())
    {
        let _ = slave.add_register(Register::new(*address, mem).with_handler(handler));
    }
    let mut request = input.request_buf.to_vec();
    if input.fix_crc {
        let crc = crc16(&request);
        request.extend_from_slice(&crc.to_le_bytes());
    }
    let mut response = Vec::new();
    let _ = slave.handle_rtu(&request, &mut response);
}
