/// The two bulk endpoints a BOT interface owns.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum BulkEndpoint {
    /// Device to host: read data and CSWs
    In,
    /// Host to device: CBWs and write data
    Out,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum EndpointError {
    /// The endpoint is closed or was never opened
    NotOpen,
    /// A transfer is already queued on the endpoint
    Busy,
    /// Lower level peripheral failure, unrecoverable at this layer
    HardwareFailure,
}

/// The USB peripheral surface the transport drives.
///
/// Implemented by board/stack glue over whatever device controller is in
/// play. The transport never touches the control endpoint through this
/// trait; class-specific EP0 requests arrive via
/// [`BotSession::on_setup_request`](crate::BotSession::on_setup_request).
///
/// Completion of a `transmit` is reported back through
/// [`BotSession::on_bulk_in_complete`](crate::BotSession::on_bulk_in_complete);
/// data armed with `prepare_receive` comes back as the packet argument of
/// [`BotSession::on_bulk_out_complete`](crate::BotSession::on_bulk_out_complete).
pub trait EndpointDriver {
    fn open(&mut self, ep: BulkEndpoint) -> Result<(), EndpointError>;
    fn close(&mut self, ep: BulkEndpoint) -> Result<(), EndpointError>;

    /// Discard anything queued on the endpoint.
    fn flush(&mut self, ep: BulkEndpoint) -> Result<(), EndpointError>;

    /// Halt the endpoint. The halt is cleared by the host via
    /// CLEAR_FEATURE(ENDPOINT_HALT), which the glue reports through
    /// [`BotSession::on_clear_feature`](crate::BotSession::on_clear_feature).
    fn stall(&mut self, ep: BulkEndpoint) -> Result<(), EndpointError>;

    /// Queue `data` for transmission on the IN endpoint.
    fn transmit(&mut self, ep: BulkEndpoint, data: &[u8]) -> Result<(), EndpointError>;

    /// Arm the OUT endpoint to receive up to `len` bytes.
    fn prepare_receive(&mut self, ep: BulkEndpoint, len: usize) -> Result<(), EndpointError>;
}
