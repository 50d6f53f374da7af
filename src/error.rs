use crate::consts::{
    MODBUS_ERROR_ILLEGAL_DATA_ADDRESS, MODBUS_ERROR_ILLEGAL_DATA_VALUE,
    MODBUS_ERROR_ILLEGAL_FUNCTION, MODBUS_ERROR_SLAVE_DEVICE_FAILURE,
};

/// Errors which stop a frame before any reply is produced
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// response buffer is full
    OOB,
    /// register chain is full
    OOBChain,
    FrameTooShort,
    /// the frame is addressed to another unit
    NotAddressed,
    FrameCRCError,
}

impl ErrorKind {
    /// Numeric status reported to RTU transports: 1 for frames of other units, 2 for frames
    /// which are broken or could not be answered
    pub fn status(self) -> u8 {
        match self {
            ErrorKind::NotAddressed => 1,
            ErrorKind::OOB
            | ErrorKind::OOBChain
            | ErrorKind::FrameTooShort
            | ErrorKind::FrameCRCError => 2,
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &str = match self {
            ErrorKind::OOB => "OUT OF BUFFER",
            ErrorKind::OOBChain => "OUT OF BUFFER IN REGISTER CHAIN",
            ErrorKind::FrameTooShort => "FRAME TOO SHORT",
            ErrorKind::NotAddressed => "FRAME NOT ADDRESSED TO THIS UNIT",
            ErrorKind::FrameCRCError => "FRAME CRC ERROR",
        };
        write!(f, "{}", msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ErrorKind {}

/// Modbus exception, sent back to the master as an exception reply
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "with_bincode", derive(bincode::Decode, bincode::Encode))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Exception {
    IllegalFunction = MODBUS_ERROR_ILLEGAL_FUNCTION,
    IllegalDataAddress = MODBUS_ERROR_ILLEGAL_DATA_ADDRESS,
    IllegalDataValue = MODBUS_ERROR_ILLEGAL_DATA_VALUE,
    SlaveDeviceFailure = MODBUS_ERROR_SLAVE_DEVICE_FAILURE,
}

impl Exception {
    /// Exception code as sent on the wire
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            MODBUS_ERROR_ILLEGAL_FUNCTION => Some(Exception::IllegalFunction),
            MODBUS_ERROR_ILLEGAL_DATA_ADDRESS => Some(Exception::IllegalDataAddress),
            MODBUS_ERROR_ILLEGAL_DATA_VALUE => Some(Exception::IllegalDataValue),
            MODBUS_ERROR_SLAVE_DEVICE_FAILURE => Some(Exception::SlaveDeviceFailure),
            _ => None,
        }
    }
}

impl core::fmt::Display for Exception {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &str = match self {
            Exception::IllegalFunction => "MODBUS ERROR CODE 01 - ILLEGAL FUNCTION",
            Exception::IllegalDataAddress => "MODBUS ERROR CODE 02 - ILLEGAL DATA ADDRESS",
            Exception::IllegalDataValue => "MODBUS ERROR CODE 03 - ILLEGAL DATA VALUE",
            Exception::SlaveDeviceFailure => "MODBUS ERROR CODE 04 - SLAVE DEVICE FAILURE",
        };
        write!(f, "{}", msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Exception {}
