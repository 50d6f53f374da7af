//! MODBUS RTU Constants

// MODBUS Functions
pub const MODBUS_GET_HOLDINGS: u8 = 3;
pub const MODBUS_GET_INPUTS: u8 = 4;
pub const MODBUS_SET_HOLDINGS_BULK: u8 = 16;

// MODBUS Errors
pub const MODBUS_ERROR_ILLEGAL_FUNCTION: u8 = 1;
pub const MODBUS_ERROR_ILLEGAL_DATA_ADDRESS: u8 = 2;
pub const MODBUS_ERROR_ILLEGAL_DATA_VALUE: u8 = 3;
pub const MODBUS_ERROR_SLAVE_DEVICE_FAILURE: u8 = 4;

/// Set on the function code of exception replies
pub const MODBUS_EXCEPTION_FLAG: u8 = 0x80;

/// Shortest frame a slave may answer: unit, func, 4 bytes of payload, CRC16
pub const RTU_MIN_FRAME_LEN: usize = 8;

/// Max registers of a single read, limited by the one-byte byte count field
pub const MAX_READ_REGISTERS: u16 = 125;
/// Max registers of a single write
pub const MAX_WRITE_REGISTERS: u16 = 123;
