/*!
 * Seconds to `H:MM:SS:FF` timecode conversion.
 */

/// Convert elapsed seconds into an `H:MM:SS:FF` timecode.
///
/// Whole seconds are truncated, the frame is `floor(fract(seconds) * fps)`.
/// `fps` must be the rate of the clip the time refers to and must be positive.
pub fn timecode(seconds: f64, fps: f64) -> String {
    debug_assert!(fps > 0.0, "frame rate must be positive");

    let whole = seconds.trunc() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    let frame = (seconds.fract() * fps).floor() as u64;

    format!("{}:{:02}:{:02}:{:02}", hours, minutes, secs, frame)
}
