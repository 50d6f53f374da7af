use core::fmt;

use log::warn;

use crate::{Exception, VectorTrait};

/// Failure reported by a [`RegisterHandler`]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerError {
    /// the block does not accept writes, answered with exception 01
    ReadOnly,
    /// application error (e.g. value out of range), answered with exception 04
    Failed,
}

impl From<HandlerError> for Exception {
    fn from(e: HandlerError) -> Self {
        match e {
            HandlerError::ReadOnly => Exception::IllegalFunction,
            HandlerError::Failed => Exception::SlaveDeviceFailure,
        }
    }
}

/// Read/write hooks of a register block
///
/// Both hooks get the block's start address and its backing bytes (exactly `size * 2` of
/// them). The default `on_read` does nothing, the default `on_write` rejects the write, so a
/// handler implementing only `on_read` leaves the block read-only.
pub trait RegisterHandler {
    /// Called before the block is copied into a read response, may update `data`
    fn on_read(&mut self, _address: u16, _data: &mut [u8]) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called with the raw wire bytes (`incoming`) destined for the block
    fn on_write(
        &mut self,
        _address: u16,
        _data: &mut [u8],
        _incoming: &[u8],
    ) -> Result<(), HandlerError> {
        Err(HandlerError::ReadOnly)
    }
}

/// Handler which stores written wire bytes as-is
///
/// ```
/// use modbus_rtu_slave::server::{Register, WriteThrough};
///
/// let mut mem = [0u8; 4];
/// let mut handler = WriteThrough;
/// let reg = Register::new(1, &mut mem).with_handler(&mut handler);
/// assert_eq!(reg.size, 2);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteThrough;

impl RegisterHandler for WriteThrough {
    fn on_write(
        &mut self,
        _address: u16,
        data: &mut [u8],
        incoming: &[u8],
    ) -> Result<(), HandlerError> {
        data.get_mut(..incoming.len())
            .ok_or(HandlerError::Failed)?
            .copy_from_slice(incoming);
        Ok(())
    }
}

/// Contiguous block of 16-bit registers backed by caller-owned memory
///
/// Bytes are copied between the wire and `data` verbatim, the block never reorders them.
#[derive(Default)]
pub struct Register<'a> {
    /// address of the first word, starting from 1
    pub address: u16,
    /// block size in words (2 bytes)
    pub size: u16,
    pub data: &'a mut [u8],
    pub handler: Option<&'a mut dyn RegisterHandler>,
}

impl<'a> Register<'a> {
    /// Create a block covering the whole of `data` (an odd trailing byte is left out)
    pub fn new(address: u16, data: &'a mut [u8]) -> Self {
        let size = u16::try_from(data.len() / 2).unwrap_or(u16::MAX);
        Self {
            address,
            size,
            data,
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: &'a mut dyn RegisterHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Return the block to its empty state, releasing data and handler
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        usize::from(self.size) * 2
    }

    /// Call the read hook and append the block bytes to the response
    pub(crate) fn read_into<V: VectorTrait<u8>>(&mut self, result: &mut V) -> Result<(), Exception> {
        let len = self.byte_len();
        let Some(data) = self.data.get_mut(..len) else {
            warn!("register {}: size exceeds backing data", self.address);
            return Err(Exception::SlaveDeviceFailure);
        };
        if let Some(handler) = self.handler.as_mut() {
            handler.on_read(self.address, data).map_err(|e| {
                warn!("register {}: read hook failed: {:?}", self.address, e);
                Exception::from(e)
            })?;
        }
        result
            .extend(data)
            .map_err(|_| Exception::SlaveDeviceFailure)
    }

    /// Pass incoming wire bytes to the write hook
    pub(crate) fn write_from(&mut self, incoming: &[u8]) -> Result<(), Exception> {
        let len = self.byte_len();
        let Some(handler) = self.handler.as_mut() else {
            return Err(Exception::IllegalFunction);
        };
        let Some(data) = self.data.get_mut(..len) else {
            warn!("register {}: size exceeds backing data", self.address);
            return Err(Exception::SlaveDeviceFailure);
        };
        handler.on_write(self.address, data, incoming).map_err(|e| {
            warn!("register {}: write hook failed: {:?}", self.address, e);
            Exception::from(e)
        })
    }
}

impl fmt::Debug for Register<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("address", &self.address)
            .field("size", &self.size)
            .field("data", &self.data)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
