pub mod chain;
pub mod port;
pub mod register;

pub use chain::{RegisterChain, RegisterId};
pub use port::ReplyPort;
pub use register::{HandlerError, Register, RegisterHandler, WriteThrough};

use log::{debug, trace, warn};

use crate::codec::reg_to_u16;
use crate::consts::{
    MAX_READ_REGISTERS, MAX_WRITE_REGISTERS, MODBUS_EXCEPTION_FLAG, MODBUS_GET_HOLDINGS,
    MODBUS_GET_INPUTS, MODBUS_SET_HOLDINGS_BULK, RTU_MIN_FRAME_LEN,
};
use crate::{check_frame_crc, crc16, ErrorKind, Exception, VectorTrait};

/// Modbus RTU slave
///
/// ```
/// use modbus_rtu_slave::{server::{ModbusSlave, Register, Reply}, ResponseBuf};
///
/// let mut mem = [0x00u8, 0x01];
/// let mut slave: ModbusSlave = ModbusSlave::new(1);
/// slave.add_register(Register::new(1, &mut mem)).unwrap();
///
/// // read one holding register at 0
/// let frame: [u8; 8] = [0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0x84, 0x0A];
/// let mut response = ResponseBuf::new();
/// assert_eq!(slave.handle_rtu(&frame, &mut response), Ok(Reply::Success));
/// assert_eq!(response.as_slice(), &[0x01, 0x03, 0x02, 0x00, 0x01, 0x79, 0x84]);
/// ```
///
/// Requests use 0-based register addresses, blocks are registered with 1-based ones: a
/// request for register 0 is served by the block starting at 1.
///
/// The slave keeps nothing between frames. Requests spanning several blocks are served only if
/// the blocks follow each other without gaps, both by address and in the registration order.
pub struct ModbusSlave<'a, const N: usize = 16> {
    pub unit_id: u8,
    registers: RegisterChain<'a, N>,
    port: Option<&'a mut dyn ReplyPort>,
}

/// Outcome of a handled frame, the reply is already in the response buffer
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "with_bincode", derive(bincode::Decode, bincode::Encode))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Success,
    Exception(Exception),
}

/// Numeric status of [`ModbusSlave::handle_rtu`] for RTU transports
///
/// * **0** the frame is handled (an exception reply counts as handled)
/// * **1** the frame is addressed to another unit
/// * **2** the frame is broken and has been dropped
pub fn rtu_status(result: &Result<Reply, ErrorKind>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => e.status(),
    }
}

impl<'a, const N: usize> ModbusSlave<'a, N> {
    pub fn new(unit_id: u8) -> Self {
        Self {
            unit_id,
            registers: RegisterChain::new(),
            port: None,
        }
    }

    /// Detach all registers and the reply port, unit id is set to 0
    pub fn reset(&mut self) {
        self.unit_id = 0;
        self.registers.clear();
        self.port = None;
    }

    pub fn set_reply_port(&mut self, port: &'a mut dyn ReplyPort) {
        self.port = Some(port);
    }

    pub fn clear_reply_port(&mut self) {
        self.port = None;
    }

    /// Append a register block to the end of the chain
    ///
    /// Blocks must be added in ascending address order for multi-block requests to resolve.
    ///
    /// Errors:
    ///
    /// * **OOBChain** the slave already holds N blocks
    pub fn add_register(&mut self, register: Register<'a>) -> Result<RegisterId, ErrorKind> {
        self.registers.push(register)
    }

    /// Detach a register block. Unknown ids are ignored.
    pub fn remove_register(&mut self, id: RegisterId) -> Option<Register<'a>> {
        self.registers.remove(id)
    }

    /// Find the block starting at the given 1-based address
    pub fn find_register(&self, address: u16) -> Option<&Register<'a>> {
        self.registers.find(address)
    }

    pub fn register(&self, id: RegisterId) -> Option<&Register<'a>> {
        self.registers.get(id)
    }

    pub fn register_mut(&mut self, id: RegisterId) -> Option<&mut Register<'a>> {
        self.registers.get_mut(id)
    }

    pub fn registers(&self) -> impl Iterator<Item = &Register<'a>> {
        self.registers.iter()
    }

    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Handle a received RTU frame
    ///
    /// `frame` must hold exactly the received bytes. The reply (if any) is written into
    /// `response`, which is cleared first, and sent to the reply port.
    ///
    /// Errors (no reply is produced):
    ///
    /// * **FrameTooShort** less than 8 bytes received
    /// * **NotAddressed** the frame is for another unit
    /// * **FrameCRCError** CRC mismatch
    /// * **OOB** the response buffer can not hold even an exception reply
    pub fn handle_rtu<V: VectorTrait<u8>>(
        &mut self,
        frame: &[u8],
        response: &mut V,
    ) -> Result<Reply, ErrorKind> {
        response.clear();
        if frame.len() < RTU_MIN_FRAME_LEN {
            trace!("unit {}: frame too short ({} bytes)", self.unit_id, frame.len());
            return Err(ErrorKind::FrameTooShort);
        }
        if frame[0] != self.unit_id {
            trace!("unit {}: frame for unit {} ignored", self.unit_id, frame[0]);
            return Err(ErrorKind::NotAddressed);
        }
        if !check_frame_crc(frame) {
            trace!("unit {}: frame CRC error", self.unit_id);
            return Err(ErrorKind::FrameCRCError);
        }
        let func = frame[1];
        let result = match func {
            MODBUS_GET_HOLDINGS | MODBUS_GET_INPUTS => {
                if let Some(port) = self.port.as_mut() {
                    port.on_receive(self.unit_id, frame);
                }
                self.process_read(frame, response)
            }
            MODBUS_SET_HOLDINGS_BULK => self.process_write(frame, response),
            _ => Err(Exception::IllegalFunction),
        }
        .and_then(|()| finalize_response(response).map_err(|_| Exception::SlaveDeviceFailure));
        let reply = match result {
            Ok(()) => {
                debug!("unit {}: function 0x{:02x} ok", self.unit_id, func);
                Reply::Success
            }
            Err(e) => {
                warn!("unit {}: function 0x{:02x}: {}", self.unit_id, func, e);
                response.clear();
                response.extend(&[self.unit_id, func | MODBUS_EXCEPTION_FLAG, e.code()])?;
                finalize_response(response)?;
                Reply::Exception(e)
            }
        };
        if let Some(port) = self.port.as_mut() {
            port.on_reply(self.unit_id, response.as_slice());
        }
        Ok(reply)
    }

    /// Read holding / input registers (func 3 / 4)
    fn process_read<V: VectorTrait<u8>>(
        &mut self,
        frame: &[u8],
        response: &mut V,
    ) -> Result<(), Exception> {
        let reg = reg_to_u16(&frame[2..4]);
        let count = reg_to_u16(&frame[4..6]);
        let start = self.locate(reg)?;
        if count > MAX_READ_REGISTERS {
            return Err(Exception::IllegalDataValue);
        }
        debug!("unit {}: read {} registers at {}", self.unit_id, count, reg);
        let expected = usize::from(count) * 2;
        // 2b unit and func, 1b data len (set when done)
        response
            .extend(&[frame[0], frame[1], 0])
            .map_err(|_| Exception::SlaveDeviceFailure)?;
        let mut copied = 0;
        let mut pos = start;
        while copied != expected {
            let register = self
                .registers
                .at_mut(pos)
                .ok_or(Exception::IllegalDataValue)?;
            if !continues_span(register, reg, copied) || copied + register.byte_len() > expected {
                return Err(Exception::IllegalDataValue);
            }
            register.read_into(response)?;
            copied += register.byte_len();
            pos += 1;
        }
        #[allow(clippy::cast_possible_truncation)]
        response.replace(2, copied as u8);
        Ok(())
    }

    /// Write multiple holding registers (func 16)
    fn process_write<V: VectorTrait<u8>>(
        &mut self,
        frame: &[u8],
        response: &mut V,
    ) -> Result<(), Exception> {
        let reg = reg_to_u16(&frame[2..4]);
        let count = reg_to_u16(&frame[4..6]);
        let bytes = usize::from(frame[6]);
        let start = self.locate(reg)?;
        // checked before the walk, so it wins over missing or non-contiguous blocks
        if count > MAX_WRITE_REGISTERS || usize::from(count) * 2 != bytes {
            return Err(Exception::IllegalDataValue);
        }
        debug!("unit {}: write {} registers at {}", self.unit_id, count, reg);
        let data = frame.get(7..frame.len() - 2).unwrap_or_default();
        let mut copied = 0;
        let mut pos = start;
        while copied != bytes {
            let register = self
                .registers
                .at_mut(pos)
                .ok_or(Exception::IllegalDataValue)?;
            let width = register.byte_len();
            if !continues_span(register, reg, copied) || copied + width > bytes {
                return Err(Exception::IllegalDataValue);
            }
            let incoming = data
                .get(copied..copied + width)
                .ok_or(Exception::IllegalDataValue)?;
            register.write_from(incoming)?;
            copied += width;
            pos += 1;
        }
        // 6b unit, func, reg, cnt
        response
            .extend(&frame[0..6])
            .map_err(|_| Exception::SlaveDeviceFailure)
    }

    /// Chain position of the block serving 0-based register `reg`
    fn locate(&self, reg: u16) -> Result<usize, Exception> {
        reg.checked_add(1)
            .and_then(|address| self.registers.position(address))
            .ok_or(Exception::IllegalDataAddress)
    }
}

/// Is `register` the next block of a span starting at 0-based `reg` with `copied` bytes done
#[inline]
fn continues_span(register: &Register, reg: u16, copied: usize) -> bool {
    usize::from(register.address) == usize::from(reg) + 1 + copied / 2
}

/// Append CRC16 to the response
fn finalize_response<V: VectorTrait<u8>>(response: &mut V) -> Result<(), ErrorKind> {
    let crc = crc16(response.as_slice());
    response.extend(&crc.to_le_bytes())
}
