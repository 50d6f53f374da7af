use super::{Failing, Recorder};
use crate::codec::{f32_byte_swap, reg_to_u16, reg_to_u32};
use crate::server::*;
use crate::*;

#[test]
fn test_slave_write_multiple_registers() {
    let mut recorder = Recorder::default();
    let mut m1 = [0u8; 2];
    let mut m2 = [0u8; 2];
    let mut w1 = WriteThrough;
    let mut w2 = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x11);
    slave.set_reply_port(&mut recorder);
    slave
        .add_register(Register::new(2, &mut m1).with_handler(&mut w1))
        .unwrap();
    slave
        .add_register(Register::new(3, &mut m2).with_handler(&mut w2))
        .unwrap();
    let mut response = ResponseBuf::new();
    let result = slave.handle_rtu(
        &[
            0x11, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02, 0xC6, 0xF0,
        ],
        &mut response,
    );
    assert_eq!(result, Ok(Reply::Success));
    assert_eq!(
        response.as_slice(),
        &[0x11, 0x10, 0x00, 0x01, 0x00, 0x02, 0x12, 0x98]
    );

    // the written values are served back
    slave
        .handle_rtu(
            &[0x11, 0x03, 0x00, 0x01, 0x00, 0x02, 0x97, 0x5B],
            &mut response,
        )
        .unwrap();
    assert_eq!(
        response.as_slice(),
        &[0x11, 0x03, 0x04, 0x00, 0x0A, 0x01, 0x02, 0x4B, 0xA1]
    );
    drop(slave);
    assert_eq!(reg_to_u16(&m1), 0x000A);
    assert_eq!(reg_to_u16(&m2), 0x0102);
    assert_eq!(recorder.replies.len(), 2);
    // writes are not announced
    assert_eq!(recorder.received.len(), 1);
}

#[test]
fn test_slave_write_u32() {
    let mut mem = [0u8; 4];
    let mut handler = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave
        .add_register(Register::new(1, &mut mem).with_handler(&mut handler))
        .unwrap();
    let mut response = ResponseBuf::new();
    slave
        .handle_rtu(
            &[
                0x01, 0x10, 0x00, 0x00, 0x00, 0x02, 0x04, 0x44, 0x33, 0x22, 0x11, 0xCF, 0xFC,
            ],
            &mut response,
        )
        .unwrap();
    assert_eq!(
        response.as_slice(),
        &[0x01, 0x10, 0x00, 0x00, 0x00, 0x02, 0x41, 0xC8]
    );
    drop(slave);
    assert_eq!(u32::from_le_bytes(mem), 0x1122_3344);
    assert_eq!(reg_to_u32(&mem), 0x4433_2211);
}

#[test]
fn test_slave_write_f32() {
    let mut t1 = [0u8; 4];
    let mut t2 = [0u8; 4];
    let mut handler = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave.add_register(Register::new(1, &mut t1)).unwrap();
    slave
        .add_register(Register::new(3, &mut t2).with_handler(&mut handler))
        .unwrap();
    let mut response = ResponseBuf::new();
    slave
        .handle_rtu(
            &[
                0x01, 0x10, 0x00, 0x02, 0x00, 0x02, 0x04, 0xC3, 0xF5, 0x48, 0x40, 0x69, 0xF0,
            ],
            &mut response,
        )
        .unwrap();
    assert_eq!(
        response.as_slice(),
        &[0x01, 0x10, 0x00, 0x02, 0x00, 0x02, 0xE0, 0x08]
    );
    drop(slave);
    assert_eq!(f32::from_le_bytes(t2).to_bits(), 0x4048_F5C3);
    assert_eq!(f32_byte_swap(&[0xF5, 0xC3, 0x40, 0x48]).to_bits(), 0x4048_F5C3);
}

#[test]
fn test_slave_write_byte_count_mismatch() {
    let mut mem = [0u8; 4];
    let mut handler = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave
        .add_register(Register::new(1, &mut mem).with_handler(&mut handler))
        .unwrap();
    let mut response = ResponseBuf::new();
    // 2 registers, 2 bytes
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x02, 0x02, 0x00, 0x01, 0x67, 0xD4],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalDataValue))
    );
    assert_eq!(response.as_slice(), &[0x01, 0x90, 0x03, 0x0C, 0x01]);
    // 1 register, no data
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x08, 0xC0],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalDataValue))
    );
    drop(slave);
    assert_eq!(mem, [0u8; 4]);
}

#[test]
fn test_slave_write_zero_quantity() {
    let mut mem = [0x12u8, 0x34];
    let mut handler = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave
        .add_register(Register::new(1, &mut mem).with_handler(&mut handler))
        .unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09, 0x50],
            &mut response
        ),
        Ok(Reply::Success)
    );
    assert_eq!(
        response.as_slice(),
        &[0x01, 0x10, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x09]
    );
    drop(slave);
    assert_eq!(mem, [0x12, 0x34]);
}

#[test]
fn test_slave_write_byte_count_before_read_only() {
    let mut mem = [0xAAu8, 0xBB];
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave.add_register(Register::new(1, &mut mem)).unwrap();
    let mut response = ResponseBuf::new();
    // 1 register, 4 bytes
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x01, 0x04, 0x00, 0x01, 0x00, 0x02, 0x23, 0x9D],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalDataValue))
    );
    assert_eq!(response.as_slice(), &[0x01, 0x90, 0x03, 0x0C, 0x01]);
    drop(slave);
    assert_eq!(mem, [0xAA, 0xBB]);
}

#[test]
fn test_slave_write_read_only() {
    let mut mem = [0xAAu8, 0xBB];
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave.add_register(Register::new(1, &mut mem)).unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x01, 0x67, 0x90],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalFunction))
    );
    assert_eq!(response.as_slice(), &[0x01, 0x90, 0x01, 0x8D, 0xC0]);
    drop(slave);
    assert_eq!(mem, [0xAA, 0xBB]);
}

#[test]
fn test_slave_write_handler_failure() {
    let mut mem = [0u8; 2];
    let mut failing = Failing;
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave
        .add_register(Register::new(1, &mut mem).with_handler(&mut failing))
        .unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x01, 0x67, 0x90],
            &mut response
        ),
        Ok(Reply::Exception(Exception::SlaveDeviceFailure))
    );
    assert_eq!(response.as_slice(), &[0x01, 0x90, 0x04, 0x4D, 0xC3]);
}

#[test]
fn test_slave_write_wrong_address() {
    let mut mem = [0u8; 2];
    let mut handler = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave
        .add_register(Register::new(5, &mut mem).with_handler(&mut handler))
        .unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x01, 0x67, 0x90],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalDataAddress))
    );
    assert_eq!(response.as_slice(), &[0x01, 0x90, 0x02, 0xCD, 0xC1]);
}

#[test]
fn test_slave_write_past_last_block() {
    let mut m1 = [0u8; 2];
    let mut m2 = [0u8; 2];
    let mut w1 = WriteThrough;
    let mut w2 = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x11);
    slave
        .add_register(Register::new(2, &mut m1).with_handler(&mut w1))
        .unwrap();
    slave
        .add_register(Register::new(3, &mut m2).with_handler(&mut w2))
        .unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[
                0x11, 0x10, 0x00, 0x01, 0x00, 0x03, 0x06, 0x00, 0x0A, 0x01, 0x02, 0x03, 0x04,
                0xB0, 0xDB,
            ],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalDataValue))
    );
    assert_eq!(response.as_slice(), &[0x11, 0x90, 0x03, 0x0D, 0xC4]);
    drop(slave);
    // blocks before the failure keep the written data
    assert_eq!(m1, [0x00, 0x0A]);
    assert_eq!(m2, [0x01, 0x02]);
}

#[test]
fn test_slave_write_truncated_payload() {
    let mut m1 = [0u8; 2];
    let mut m2 = [0u8; 2];
    let mut w1 = WriteThrough;
    let mut w2 = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x11);
    slave
        .add_register(Register::new(2, &mut m1).with_handler(&mut w1))
        .unwrap();
    slave
        .add_register(Register::new(3, &mut m2).with_handler(&mut w2))
        .unwrap();
    let mut response = ResponseBuf::new();
    // 4 bytes announced, 2 carried
    assert_eq!(
        slave.handle_rtu(
            &[0x11, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x0A, 0x03],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalDataValue))
    );
    assert_eq!(response.as_slice(), &[0x11, 0x90, 0x03, 0x0D, 0xC4]);
    drop(slave);
    assert_eq!(m1, [0x00, 0x0A]);
    assert_eq!(m2, [0x00, 0x00]);
}

#[test]
fn test_slave_write_stops_at_read_only() {
    let mut m1 = [0u8; 2];
    let mut m2 = [0x55u8; 2];
    let mut w1 = WriteThrough;
    let mut slave: ModbusSlave = ModbusSlave::new(0x11);
    slave
        .add_register(Register::new(2, &mut m1).with_handler(&mut w1))
        .unwrap();
    slave.add_register(Register::new(3, &mut m2)).unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[
                0x11, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02, 0xC6, 0xF0,
            ],
            &mut response
        ),
        Ok(Reply::Exception(Exception::IllegalFunction))
    );
    assert_eq!(response.as_slice(), &[0x11, 0x90, 0x01, 0x8C, 0x05]);
    drop(slave);
    assert_eq!(m1, [0x00, 0x0A]);
    assert_eq!(m2, [0x55, 0x55]);
}

#[test]
fn test_slave_write_on_write_sees_old_value() {
    struct Latch {
        previous: u16,
    }

    impl RegisterHandler for Latch {
        fn on_write(
            &mut self,
            _address: u16,
            data: &mut [u8],
            incoming: &[u8],
        ) -> Result<(), HandlerError> {
            self.previous = reg_to_u16(data);
            data.copy_from_slice(incoming);
            Ok(())
        }
    }

    let mut mem = [0x12u8, 0x34];
    let mut latch = Latch { previous: 0 };
    let mut slave: ModbusSlave = ModbusSlave::new(0x01);
    slave
        .add_register(Register::new(1, &mut mem).with_handler(&mut latch))
        .unwrap();
    let mut response = ResponseBuf::new();
    assert_eq!(
        slave.handle_rtu(
            &[0x01, 0x10, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x01, 0x67, 0x90],
            &mut response
        ),
        Ok(Reply::Success)
    );
    drop(slave);
    assert_eq!(latch.previous, 0x1234);
    assert_eq!(mem, [0x00, 0x01]);
}
