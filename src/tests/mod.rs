mod test_write;

use crate::server::{HandlerError, RegisterHandler, ReplyPort};

/// Keeps everything the slave sends to the transport
#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) replies: Vec<Vec<u8>>,
    pub(crate) received: Vec<Vec<u8>>,
}

impl ReplyPort for Recorder {
    fn on_reply(&mut self, _unit_id: u8, frame: &[u8]) {
        self.replies.push(frame.to_vec());
    }

    fn on_receive(&mut self, _unit_id: u8, request: &[u8]) {
        self.received.push(request.to_vec());
    }
}

/// Rejects everything as an application error
pub(crate) struct Failing;

impl RegisterHandler for Failing {
    fn on_read(&mut self, _address: u16, _data: &mut [u8]) -> Result<(), HandlerError> {
        Err(HandlerError::Failed)
    }

    fn on_write(
        &mut self,
        _address: u16,
        _data: &mut [u8],
        _incoming: &[u8],
    ) -> Result<(), HandlerError> {
        Err(HandlerError::Failed)
    }
}
