/// One decoded input frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Capture time in seconds; drives dwell measurement.
    pub timestamp: f64,
}

/// Supplier of frames for a session, e.g. a video decoder.
///
/// `Ok(None)` marks the end of input. An error is treated as fatal for the
/// session.
pub trait FrameSource {
    type Error;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}
