/// Transport side of a slave
///
/// `on_reply` gets every frame the slave answers with, success or exception, exactly once per
/// handled request. Frames dropped before dispatch (too short, other unit, broken CRC) are
/// never answered.
///
/// Any `FnMut(u8, &[u8])` closure is a port:
///
/// ```
/// use modbus_rtu_slave::server::ModbusSlave;
///
/// let mut sent = 0;
/// let mut port = |_unit: u8, frame: &[u8]| sent += frame.len();
/// let mut slave: ModbusSlave = ModbusSlave::new(1);
/// slave.set_reply_port(&mut port);
/// ```
pub trait ReplyPort {
    fn on_reply(&mut self, unit_id: u8, frame: &[u8]);

    /// Called with a validated read request before it is serviced
    fn on_receive(&mut self, _unit_id: u8, _request: &[u8]) {}
}

impl<F> ReplyPort for F
where
    F: FnMut(u8, &[u8]),
{
    #[inline]
    fn on_reply(&mut self, unit_id: u8, frame: &[u8]) {
        self(unit_id, frame);
    }
}
