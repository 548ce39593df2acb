//! Collaborator interfaces the host application implements.

use tessera_protocol::PixelRect;

/// Receives decoded rectangles for display.
//
// Calls always arrive as begin -> write -> end for one rectangle at a time;
// no two tokens are ever outstanding concurrently. Partial results are never
// rolled back once pushed; the final full-frame rect simply paints over them.
// The sink is driven from the update loop's background thread, so an
// implementation bound to a UI thread must proxy synchronously itself.
pub trait DisplaySink: Send {
    type Token;

    fn begin_partial_result(&mut self, x: u32, y: u32, width: u32, height: u32) -> Self::Token;

    fn write_rect(&mut self, token: &mut Self::Token, rect: &PixelRect);

    fn end_partial_result(&mut self, token: Self::Token);
}

/// Progress/error reporting and cooperative cancellation, typically backed by
/// the host application's render session object.
pub trait RenderHost {
    /// Best-effort render progress in `0.0..=1.0`. Written by the producer as
    /// a single byte; ideally monotonic but not guaranteed.
    fn report_progress(&self, fraction: f32);

    fn report_error(&self, message: &str);

    /// Polled once per supervisor tick; returning `true` requests a graceful
    /// stop of the renderer subprocess.
    fn break_requested(&self) -> bool {
        false
    }
}
