use serial::prelude::*;
use std::io::{Read, Write};
use std::time::Duration;

use modbus_rtu_slave::{
    codec::u16_to_reg,
    server::{rtu_status, HandlerError, ModbusSlave, Register, RegisterHandler, Reply, WriteThrough},
    ModbusFrameBuf,
};

/// Counts reads of the register it is attached to
struct ReadCounter(u16);

impl RegisterHandler for ReadCounter {
    fn on_read(&mut self, _address: u16, data: &mut [u8]) -> Result<(), HandlerError> {
        self.0 = self.0.wrapping_add(1);
        u16_to_reg(self.0, data);
        Ok(())
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyS0".to_owned());
    rtuserver(1, &path);
}

pub fn rtuserver(unit: u8, path: &str) {
    let mut port = serial::open(path).unwrap();
    port.reconfigure(&|settings| {
        (settings.set_baud_rate(serial::Baud9600).unwrap());
        settings.set_char_size(serial::Bits8);
        settings.set_parity(serial::ParityNone);
        settings.set_stop_bits(serial::Stop1);
        settings.set_flow_control(serial::FlowNone);
        Ok(())
    })
    .unwrap();
    port.set_timeout(Duration::from_secs(3600)).unwrap();

    // holding registers 0..=1 (read-only counter and a setpoint)
    let mut counter_mem = [0u8; 2];
    let mut setpoint_mem = [0u8; 2];
    let mut counter = ReadCounter(0);
    let mut write_through = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(unit);
    slave
        .add_register(Register::new(1, &mut counter_mem).with_handler(&mut counter))
        .unwrap();
    slave
        .add_register(Register::new(2, &mut setpoint_mem).with_handler(&mut write_through))
        .unwrap();

    let mut response = Vec::new();
    loop {
        let mut buf: ModbusFrameBuf = [0; 256];
        let len = port.read(&mut buf).unwrap();
        if len == 0 {
            continue;
        }
        println!("got frame");
        let result = slave.handle_rtu(&buf[..len], &mut response);
        match result {
            Ok(Reply::Success) => {}
            Ok(Reply::Exception(e)) => println!("exception reply: {}", e),
            Err(ref e) => {
                println!("frame dropped: {} (status {})", e, rtu_status(&result));
                continue;
            }
        }
        println!("{:x?}", response);
        port.write_all(response.as_slice()).unwrap();
    }
}
